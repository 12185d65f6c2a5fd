use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "store_id": 1,
        "employee_code": "TECH-001",
        "first_name": "Linh",
        "last_name": "Tran",
        "email": "linh.tran@salon.com",
        "phone": "+14085551234",
        "job_role": "technician",
        "pay_type": "commission",
        "commission_rate": 0.6,
        "hire_date": "2024-01-01",
        "status": "active"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1)]
    pub store_id: u64,

    #[schema(example = "TECH-001")]
    pub employee_code: String,

    #[schema(example = "Linh")]
    pub first_name: String,

    #[schema(example = "Tran")]
    pub last_name: String,

    #[schema(example = "linh.tran@salon.com")]
    pub email: String,

    #[schema(example = "+14085551234", nullable = true)]
    pub phone: Option<String>,

    /// technician | receptionist | manager
    #[schema(example = "technician")]
    pub job_role: String,

    /// hourly | commission
    #[schema(example = "commission")]
    pub pay_type: String,

    #[schema(example = 0.6)]
    pub commission_rate: f64,

    #[schema(
        example = "2024-01-01",
        value_type = String,
        format = "date"
    )]
    pub hire_date: NaiveDate,

    #[schema(example = "active")]
    pub status: String,
}
