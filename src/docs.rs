use crate::api::approvals::{ApprovalFilter, PendingApproval, RejectTicket};
use crate::api::attendance::{AttendanceQuery, CheckInReq};
use crate::api::employees::{CreateEmployee, EmployeeListResponse, EmployeeQuery};
use crate::api::queue::{JoinQueueReq, LeaveQueueReq};
use crate::api::reports::{DaySummary, EndOfDayQuery, PayPeriodQuery, TechnicianDaySummary};
use crate::api::services::{CreateService, ServiceQuery};
use crate::api::tickets::{
    CloseTicket, CreateTicket, CreateTicketItem, TicketFilter, TicketListResponse, TicketWithItems,
    UpdateTicket,
};
use crate::model::attendance::AttendanceRecord;
use crate::model::employee::Employee;
use crate::model::queue::QueuedTechnician;
use crate::model::service::Service;
use crate::model::store::Store;
use crate::model::ticket::{ApprovalStatus, PaymentMethod, SaleTicket, TicketItem, TicketStatus};
use crate::utils::payroll::PayPeriod;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salon Operations API",
        version = "1.0.0",
        description = r#"
## Salon Point-of-Sale & Operations

This API powers the front-of-house operations of a nail salon chain.

### Key Features
- **Tickets & Billing**
  - Open, edit, close, and void sale tickets with service line items
- **Technician Ready Queue**
  - Join with same-day check-in, sorted serving order, rotation on assignment
- **Attendance**
  - Daily check-in / check-out with pay type
- **Approval Workflow**
  - Closed tickets await technician or manager sign-off; expired windows auto-approve
- **End-of-Day Reporting**
  - Daily totals, cash/card tip split, per-technician breakdown, CSV export

### Security
Protected endpoints use **JWT Bearer authentication**. Manager-only
operations require a Manager or Admin role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::tickets::create_ticket,
        crate::api::tickets::list_tickets,
        crate::api::tickets::get_ticket,
        crate::api::tickets::update_ticket,
        crate::api::tickets::close_ticket,
        crate::api::tickets::void_ticket,

        crate::api::approvals::pending_approvals,
        crate::api::approvals::approve_ticket,
        crate::api::approvals::reject_ticket,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::list_attendance,

        crate::api::queue::join_queue,
        crate::api::queue::leave_queue,
        crate::api::queue::sorted_technicians,
        crate::api::queue::assign_next,

        crate::api::employees::create_employee,
        crate::api::employees::list_employees,
        crate::api::employees::get_employee,
        crate::api::employees::update_employee,
        crate::api::employees::delete_employee,

        crate::api::services::create_service,
        crate::api::services::list_services,
        crate::api::services::get_service,
        crate::api::services::update_service,
        crate::api::services::delete_service,

        crate::api::stores::get_store,
        crate::api::stores::update_settings,

        crate::api::reports::end_of_day,
        crate::api::reports::export_end_of_day,
        crate::api::reports::payroll_period
    ),
    components(
        schemas(
            SaleTicket,
            TicketItem,
            TicketStatus,
            PaymentMethod,
            ApprovalStatus,
            CreateTicket,
            CreateTicketItem,
            UpdateTicket,
            CloseTicket,
            TicketFilter,
            TicketListResponse,
            TicketWithItems,
            ApprovalFilter,
            PendingApproval,
            RejectTicket,
            CheckInReq,
            AttendanceQuery,
            AttendanceRecord,
            JoinQueueReq,
            LeaveQueueReq,
            QueuedTechnician,
            Employee,
            CreateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            Service,
            CreateService,
            ServiceQuery,
            Store,
            EndOfDayQuery,
            PayPeriodQuery,
            DaySummary,
            TechnicianDaySummary,
            PayPeriod
        )
    ),
    tags(
        (name = "Tickets", description = "Sale ticket and billing APIs"),
        (name = "Approvals", description = "Closed-ticket approval workflow APIs"),
        (name = "Attendance", description = "Check-in / check-out APIs"),
        (name = "Queue", description = "Technician ready queue APIs"),
        (name = "Employees", description = "Employee management APIs"),
        (name = "Services", description = "Service menu APIs"),
        (name = "Stores", description = "Store settings APIs"),
        (name = "Reports", description = "End-of-day and payroll APIs"),
    )
)]
pub struct ApiDoc;
