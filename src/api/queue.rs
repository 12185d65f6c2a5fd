use crate::auth::auth::AuthUser;
use crate::model::queue::QueuedTechnician;
use crate::utils::queue_cache;
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct JoinQueueReq {
    #[schema(example = 1)]
    pub store_id: u64,

    /// hourly | commission, forwarded to the attendance check-in
    #[schema(example = "commission")]
    pub pay_type: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LeaveQueueReq {
    #[schema(example = 1)]
    pub store_id: u64,
}

/* =========================
Join ready queue (with check-in)
========================= */
/// One transaction: a technician who taps "I'm ready" is checked in for
/// the day (if not already) and appended to the store's ready queue.
#[utoipa::path(
    post,
    path = "/api/v1/queue/join",
    request_body = JoinQueueReq,
    responses(
        (status = 200, description = "Joined the ready queue", body = Object, example = json!({
            "message": "Joined the ready queue"
        })),
        (status = 400, description = "Already in the queue"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn join_queue(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<JoinQueueReq>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    if !matches!(payload.pay_type.as_str(), "hourly" | "commission") {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid pay type. Allowed: hourly, commission"
        })));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let checked_in: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM attendance WHERE employee_id = ? AND date = CURDATE())",
    )
    .bind(employee_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to check attendance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if !checked_in {
        sqlx::query(
            r#"
            INSERT INTO attendance (employee_id, store_id, date, pay_type, check_in)
            VALUES (?, ?, CURDATE(), ?, CURTIME())
            "#,
        )
        .bind(employee_id)
        .bind(payload.store_id)
        .bind(&payload.pay_type)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Check-in during queue join failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    }

    let result = sqlx::query(
        r#"
        INSERT INTO ready_queue (store_id, employee_id, joined_at, tickets_taken)
        VALUES (?, ?, NOW(), 0)
        "#,
    )
    .bind(payload.store_id)
    .bind(employee_id)
    .execute(&mut *tx)
    .await;

    match result {
        Ok(_) => {}
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                        "message": "Already in the ready queue"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id, "Queue join failed");
            return Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ));
        }
    }

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit queue join");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    queue_cache::invalidate(payload.store_id).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Joined the ready queue"
    })))
}

/* =========================
Leave queue
========================= */
#[utoipa::path(
    delete,
    path = "/api/v1/queue/leave",
    request_body = LeaveQueueReq,
    responses(
        (status = 200, description = "Left the queue"),
        (status = 400, description = "Not in the queue"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn leave_queue(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<LeaveQueueReq>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let result = sqlx::query("DELETE FROM ready_queue WHERE store_id = ? AND employee_id = ?")
        .bind(payload.store_id)
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Queue leave failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Not in the ready queue"
        })));
    }

    queue_cache::invalidate(payload.store_id).await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Left the ready queue"
    })))
}

/* =========================
Sorted technicians
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/queue/{store_id}",
    params(("store_id" = u64, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Technicians in serving order", body = [QueuedTechnician]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn sorted_technicians(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let store_id = path.into_inner();

    let rows = queue_cache::load_sorted(pool.get_ref(), store_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, store_id, "Failed to fetch queue");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(rows))
}

/* =========================
Assign next technician
========================= */
/// Pops the head of the queue for a new customer and rotates them back
/// by bumping their ticket count.
#[utoipa::path(
    post,
    path = "/api/v1/queue/{store_id}/assign",
    params(("store_id" = u64, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Next technician", body = QueuedTechnician),
        (status = 404, description = "Queue is empty"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Queue"
)]
pub async fn assign_next(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_front_desk()?;

    let store_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let next = sqlx::query_as::<_, QueuedTechnician>(
        r#"
        SELECT rq.employee_id, e.first_name, e.last_name, rq.tickets_taken, rq.joined_at
        FROM ready_queue rq
        JOIN employees e ON e.id = rq.employee_id
        WHERE rq.store_id = ? AND e.status = 'active'
        ORDER BY rq.tickets_taken ASC, rq.joined_at ASC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(store_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, store_id, "Failed to pick next technician");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let next = match next {
        Some(t) => t,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "No technicians in the ready queue"
            })));
        }
    };

    sqlx::query(
        r#"
        UPDATE ready_queue
        SET tickets_taken = tickets_taken + 1,
            last_assigned_at = NOW()
        WHERE store_id = ? AND employee_id = ?
        "#,
    )
    .bind(store_id)
    .bind(next.employee_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, store_id, "Failed to rotate queue");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit assignment");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    queue_cache::invalidate(store_id).await;

    Ok(HttpResponse::Ok().json(next))
}
