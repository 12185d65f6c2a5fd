use crate::auth::auth::AuthUser;
use crate::model::attendance::AttendanceRecord;
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CheckInReq {
    #[schema(example = 1)]
    pub store_id: u64,

    /// hourly | commission
    #[schema(example = "hourly")]
    pub pay_type: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    #[schema(example = 1)]
    pub store_id: u64,

    /// Defaults to today
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: Option<NaiveDate>,
}

fn valid_pay_type(value: &str) -> bool {
    matches!(value, "hourly" | "commission")
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    request_body = CheckInReq,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CheckInReq>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    if !valid_pay_type(&payload.pay_type) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid pay type. Allowed: hourly, commission"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, store_id, date, pay_type, check_in)
        VALUES (?, ?, CURDATE(), ?, CURTIME())
        "#,
    )
    .bind(employee_id)
    .bind(payload.store_id)
    .bind(&payload.pay_type)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Checked in successfully"
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Check-out endpoint
#[utoipa::path(
    put,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in found for today", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = CURTIME()
        WHERE employee_id = ?
        AND date = CURDATE()
        AND check_out IS NULL
        "#,
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "No active check-in found for today"
        })));
    }

    // Leaving the building means leaving the ready queue too
    let queued_store: Option<u64> =
        match sqlx::query_scalar("SELECT store_id FROM ready_queue WHERE employee_id = ?")
            .bind(employee_id)
            .fetch_optional(pool.get_ref())
            .await
        {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, employee_id, "Failed to look up queue slot at check-out");
                None
            }
        };

    if let Some(store_id) = queued_store {
        if let Err(e) = sqlx::query("DELETE FROM ready_queue WHERE employee_id = ?")
            .bind(employee_id)
            .execute(pool.get_ref())
            .await
        {
            tracing::warn!(error = %e, employee_id, "Failed to clear queue slot at check-out");
        }
        crate::utils::queue_cache::invalidate(store_id).await;
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Checked out successfully"
    })))
}

/// Store attendance sheet for a day
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Attendance records", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_front_desk()?;

    let date = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, store_id, date, pay_type, check_in, check_out
        FROM attendance
        WHERE store_id = ? AND date = ?
        ORDER BY check_in ASC
        "#,
    )
    .bind(query.store_id)
    .bind(date)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(records))
}
