use crate::{
    auth::auth::AuthUser,
    model::employee::Employee,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, Serialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = 1)]
    pub store_id: u64,
    #[schema(example = "TECH-001")]
    pub employee_code: String,
    #[schema(example = "Linh")]
    pub first_name: String,
    #[schema(example = "Tran")]
    pub last_name: String,
    #[schema(example = "linh.tran@salon.com", format = "email", value_type = String)]
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
    pub commission_rate: Option<f64>,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub hire_date: chrono::NaiveDate,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct EmployeeQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    pub store_id: Option<u64>,
    /// technician | receptionist | manager
    pub job_role: Option<String>,
    /// active | inactive
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct EmployeeListResponse {
    pub data: Vec<Employee>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

fn valid_job_role(value: &str) -> bool {
    matches!(value, "technician" | "receptionist" | "manager")
}

const EMPLOYEE_COLUMNS: &str = "id, store_id, employee_code, first_name, last_name, email, phone, \
     job_role, pay_type, commission_rate, hire_date, status";

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created"),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Employee code already in use"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    if !valid_job_role(&payload.job_role) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Invalid job role. Allowed: technician, receptionist, manager"
        })));
    }
    if !matches!(payload.pay_type.as_str(), "hourly" | "commission") {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Invalid pay type. Allowed: hourly, commission"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO employees
        (store_id, employee_code, first_name, last_name, email, phone,
         job_role, pay_type, commission_rate, hire_date, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'active')
        "#,
    )
    .bind(payload.store_id)
    .bind(&payload.employee_code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.phone)
    .bind(&payload.job_role)
    .bind(&payload.pay_type)
    .bind(payload.commission_rate.unwrap_or(0.0))
    .bind(payload.hire_date)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(r) => Ok(HttpResponse::Created().json(json!({
            "id": r.last_insert_id(),
            "message": "Employee created"
        }))),
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Employee code or email already in use"
                    })));
                }
            }

            error!(error = %e, "Failed to create employee");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, contact the system admin"
            })))
        }
    }
}

/// List employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(EmployeeQuery),
    responses(
        (status = 200, description = "Paginated employee list", body = EmployeeListResponse),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn list_employees(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_front_desk()?;

    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(store_id) = query.store_id {
        where_sql.push_str(" AND store_id = ?");
        args.push(FilterValue::U64(store_id));
    }
    if let Some(job_role) = query.job_role.as_deref() {
        where_sql.push_str(" AND job_role = ?");
        args.push(FilterValue::Str(job_role));
    }
    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count employees");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT {} FROM employees{} ORDER BY first_name, last_name LIMIT ? OFFSET ?",
        EMPLOYEE_COLUMNS, where_sql
    );

    let mut data_q = sqlx::query_as::<_, Employee>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let employees = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch employee list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(EmployeeListResponse {
        data: employees,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/// Get employee
#[utoipa::path(
    get,
    path = "/api/v1/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, body = Employee),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn get_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_front_desk()?;

    let id = path.into_inner();

    let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);
    let employee = sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to fetch employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match employee {
        Some(e) => Ok(HttpResponse::Ok().json(e)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        }))),
    }
}

/// Partial update via JSON payload; unknown keys are ignored.
#[utoipa::path(
    put,
    path = "/api/v1/employees/{id}",
    request_body = Object,
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "No updatable fields"),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let id = path.into_inner();

    let update = build_update_sql(
        "employees",
        &payload,
        &[
            "store_id",
            "employee_code",
            "first_name",
            "last_name",
            "email",
            "phone",
            "job_role",
            "pay_type",
            "commission_rate",
            "hire_date",
            "status",
        ],
        "id",
        id,
    )?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, id, "Failed to update employee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated"
    })))
}

/// Deactivate employee (soft delete; history stays intact)
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deactivated"),
        (status = 403, description = "Admin only"),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Employees"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let id = path.into_inner();

    let result = sqlx::query("UPDATE employees SET status = 'inactive' WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to deactivate employee");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    // Inactive staff have no business holding a queue slot
    let queued_store: Option<u64> =
        match sqlx::query_scalar("SELECT store_id FROM ready_queue WHERE employee_id = ?")
            .bind(id)
            .fetch_optional(pool.get_ref())
            .await
        {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, id, "Failed to look up queue slot for deactivation");
                None
            }
        };

    if let Some(store_id) = queued_store {
        if let Err(e) = sqlx::query("DELETE FROM ready_queue WHERE employee_id = ?")
            .bind(id)
            .execute(pool.get_ref())
            .await
        {
            tracing::warn!(error = %e, id, "Failed to clear queue slot for deactivation");
        }
        crate::utils::queue_cache::invalidate(store_id).await;
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee deactivated"
    })))
}
