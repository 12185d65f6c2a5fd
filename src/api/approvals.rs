use crate::auth::auth::AuthUser;
use crate::model::ticket::SaleTicket;
use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use std::time::Duration;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ApprovalFilter {
    #[schema(example = 1)]
    pub store_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct PendingApproval {
    #[serde(flatten)]
    pub ticket: SaleTicket,

    /// Countdown until auto-approval, clamped at zero.
    #[schema(example = 3600)]
    pub seconds_remaining: i64,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectTicket {
    #[schema(example = "Tip entered on the wrong ticket")]
    pub reason: String,
}

/// Zero once the deadline has passed; the sweeper picks it up from there.
pub fn seconds_remaining(deadline: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (deadline - now).num_seconds().max(0)
}

/* =========================
Pending approvals
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/approvals",
    params(ApprovalFilter),
    responses(
        (status = 200, description = "Closed tickets awaiting sign-off", body = [PendingApproval]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Approvals"
)]
pub async fn pending_approvals(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ApprovalFilter>,
) -> actix_web::Result<impl Responder> {
    let mut sql = String::from(
        "SELECT id, store_id, ticket_number, customer_name, technician_id, status, \
         subtotal, discount, total, payment_method, tip_customer, tip_receptionist, \
         approval_status, approval_deadline, approved_by, approved_at, rejection_reason, \
         created_at, closed_at \
         FROM sale_tickets WHERE approval_status = 'pending'",
    );

    // Technicians only ever review their own tickets
    if auth.is_technician() {
        sql.push_str(" AND technician_id = ?");
    }
    if query.store_id.is_some() {
        sql.push_str(" AND store_id = ?");
    }
    sql.push_str(" ORDER BY approval_deadline ASC");

    let mut q = sqlx::query_as::<_, SaleTicket>(&sql);
    if auth.is_technician() {
        let employee_id = auth
            .employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;
        q = q.bind(employee_id);
    }
    if let Some(store_id) = query.store_id {
        q = q.bind(store_id);
    }

    let tickets = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch pending approvals");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let now = Utc::now();
    let pending: Vec<PendingApproval> = tickets
        .into_iter()
        .map(|ticket| {
            let remaining = ticket
                .approval_deadline
                .map(|d| seconds_remaining(d, now))
                .unwrap_or(0);
            PendingApproval {
                ticket,
                seconds_remaining: remaining,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(pending))
}

/// Technician may sign off their own ticket; managers may sign off any.
async fn authorize_reviewer(
    auth: &AuthUser,
    pool: &MySqlPool,
    ticket_id: u64,
) -> actix_web::Result<()> {
    if auth.require_manager().is_ok() {
        return Ok(());
    }

    let employee_id = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let technician_id: Option<u64> =
        sqlx::query_scalar("SELECT technician_id FROM sale_tickets WHERE id = ?")
            .bind(ticket_id)
            .fetch_optional(pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, ticket_id, "Failed to fetch ticket technician");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    match technician_id {
        Some(t) if t == employee_id => Ok(()),
        Some(_) => Err(actix_web::error::ErrorForbidden(
            "Only the ticket's technician or a manager can review it",
        )),
        None => Err(actix_web::error::ErrorNotFound("Ticket not found")),
    }
}

/* =========================
Approve ticket
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/approvals/{ticket_id}/approve",
    params(("ticket_id" = u64, Path, description = "Ticket to approve")),
    responses(
        (status = 200, description = "Ticket approved", body = Object, example = json!({
            "message": "Ticket approved"
        })),
        (status = 400, description = "Ticket not pending", body = Object, example = json!({
            "message": "Ticket not found or already reviewed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Approvals"
)]
pub async fn approve_ticket(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let ticket_id = path.into_inner();

    authorize_reviewer(&auth, pool.get_ref(), ticket_id).await?;

    let result = sqlx::query(
        r#"
        UPDATE sale_tickets
        SET approval_status = 'approved',
            approved_by = ?,
            approved_at = NOW()
        WHERE id = ?
        AND approval_status = 'pending'
        "#,
    )
    .bind(auth.employee_id)
    .bind(ticket_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, ticket_id, "Approve ticket failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Ticket not found or already reviewed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Ticket approved"
    })))
}

/* =========================
Reject ticket
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/approvals/{ticket_id}/reject",
    request_body = RejectTicket,
    params(("ticket_id" = u64, Path, description = "Ticket to reject")),
    responses(
        (status = 200, description = "Ticket rejected", body = Object, example = json!({
            "message": "Ticket rejected"
        })),
        (status = 400, description = "Ticket not pending or missing reason"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Approvals"
)]
pub async fn reject_ticket(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<RejectTicket>,
) -> actix_web::Result<impl Responder> {
    let ticket_id = path.into_inner();

    if body.reason.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "A rejection needs a reason"
        })));
    }

    authorize_reviewer(&auth, pool.get_ref(), ticket_id).await?;

    let result = sqlx::query(
        r#"
        UPDATE sale_tickets
        SET approval_status = 'rejected',
            approved_by = ?,
            approved_at = NOW(),
            rejection_reason = ?
        WHERE id = ?
        AND approval_status = 'pending'
        "#,
    )
    .bind(auth.employee_id)
    .bind(body.reason.trim())
    .bind(ticket_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, ticket_id, "Reject ticket failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Ticket not found or already reviewed"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Ticket rejected"
    })))
}

/* =========================
Auto-approval sweep
========================= */

/// Flip every pending ticket whose window has elapsed. Idempotent: the
/// guarded UPDATE makes concurrent sweeps harmless.
pub async fn auto_approve_expired(pool: &MySqlPool) -> anyhow::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE sale_tickets
        SET approval_status = 'auto_approved',
            approved_at = NOW()
        WHERE approval_status = 'pending'
        AND approval_deadline <= NOW()
        "#,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}

/// Background loop that sweeps for expired review windows.
pub async fn run_approval_sweeper(pool: MySqlPool, sweep_secs: u64) {
    let mut ticker = actix_web::rt::time::interval(Duration::from_secs(sweep_secs.max(1)));

    loop {
        ticker.tick().await;

        match auto_approve_expired(&pool).await {
            Ok(0) => {}
            Ok(n) => tracing::info!(count = n, "Auto-approved expired tickets"),
            Err(e) => tracing::error!(error = %e, "Approval sweep failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn countdown_reports_whole_seconds() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let deadline = Utc.with_ymd_and_hms(2026, 1, 1, 13, 0, 0).unwrap();
        assert_eq!(seconds_remaining(deadline, now), 3600);
    }

    #[test]
    fn expired_deadline_clamps_to_zero() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap();
        let deadline = Utc.with_ymd_and_hms(2026, 1, 1, 11, 0, 0).unwrap();
        assert_eq!(seconds_remaining(deadline, now), 0);
    }
}
