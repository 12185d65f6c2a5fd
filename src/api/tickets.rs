use crate::auth::auth::AuthUser;
use crate::model::ticket::{ApprovalStatus, PaymentMethod, SaleTicket, TicketItem, TicketStatus};
use crate::utils::billing;
use actix_web::{web, HttpResponse, Responder};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{MySql, MySqlPool, Transaction};
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateTicketItem {
    #[schema(example = 12)]
    pub service_id: u64,

    /// Defaults to the ticket's primary technician when omitted.
    #[schema(example = 7, nullable = true)]
    pub technician_id: Option<u64>,

    #[schema(example = 1)]
    pub quantity: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTicket {
    #[schema(example = 1)]
    pub store_id: u64,

    #[schema(example = "Walk-in", nullable = true)]
    pub customer_name: Option<String>,

    #[schema(example = 7)]
    pub technician_id: u64,

    #[schema(example = 0.0)]
    pub discount: Option<f64>,

    pub items: Vec<CreateTicketItem>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateTicket {
    pub customer_name: Option<String>,
    pub technician_id: Option<u64>,
    pub discount: Option<f64>,
    /// Replaces the full item list when present.
    pub items: Option<Vec<CreateTicketItem>>,
}

#[derive(Deserialize, ToSchema)]
pub struct CloseTicket {
    #[schema(example = "card")]
    pub payment_method: PaymentMethod,

    #[schema(example = 15.0)]
    pub tip_customer: f64,

    #[schema(example = 5.0)]
    pub tip_receptionist: f64,
}

#[derive(Serialize, ToSchema)]
pub struct TicketWithItems {
    #[serde(flatten)]
    pub ticket: SaleTicket,
    pub items: Vec<TicketItem>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct TicketFilter {
    #[schema(example = 1)]
    pub store_id: Option<u64>,
    /// open | closed | voided
    #[schema(example = "open")]
    pub status: Option<String>,
    /// pending | approved | rejected | auto_approved
    pub approval_status: Option<String>,
    #[schema(example = 7)]
    pub technician_id: Option<u64>,
    /// Tickets created on this calendar day
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: Option<chrono::NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct TicketListResponse {
    pub data: Vec<SaleTicket>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
    Date(chrono::NaiveDate),
}

const TICKET_COLUMNS: &str = "id, store_id, ticket_number, customer_name, technician_id, status, \
     subtotal, discount, total, payment_method, tip_customer, tip_receptionist, \
     approval_status, approval_deadline, approved_by, approved_at, rejection_reason, \
     created_at, closed_at";

/// Human-facing ticket number, restarting at 1 each day per store.
fn daily_ticket_number(date: chrono::NaiveDate, seq: i64) -> String {
    format!("T-{}-{:04}", date.format("%Y%m%d"), seq)
}

/// Price every requested line against the service list and return
/// (rows to insert, subtotal). Inactive or foreign services are rejected.
async fn price_items(
    tx: &mut Transaction<'_, MySql>,
    store_id: u64,
    default_technician: u64,
    items: &[CreateTicketItem],
) -> Result<(Vec<(u64, u64, u32, f64, f64)>, f64), actix_web::Error> {
    let mut priced = Vec::with_capacity(items.len());
    let mut subtotal = 0.0_f64;

    for item in items {
        if item.quantity == 0 {
            return Err(actix_web::error::ErrorBadRequest(
                "Item quantity must be at least 1",
            ));
        }

        let price: Option<f64> = sqlx::query_scalar(
            "SELECT price FROM services WHERE id = ? AND store_id = ? AND active = TRUE",
        )
        .bind(item.service_id)
        .bind(store_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, service_id = item.service_id, "Failed to price service");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

        let price = price.ok_or_else(|| {
            actix_web::error::ErrorBadRequest("Service not found or inactive for this store")
        })?;

        let line_total = billing::line_total(item.quantity, price);
        subtotal = billing::round_cents(subtotal + line_total);

        priced.push((
            item.service_id,
            item.technician_id.unwrap_or(default_technician),
            item.quantity,
            price,
            line_total,
        ));
    }

    Ok((priced, subtotal))
}

async fn insert_items(
    tx: &mut Transaction<'_, MySql>,
    ticket_id: u64,
    priced: &[(u64, u64, u32, f64, f64)],
) -> Result<(), sqlx::Error> {
    for (service_id, technician_id, quantity, unit_price, line_total) in priced {
        sqlx::query(
            r#"
            INSERT INTO ticket_items
                (ticket_id, service_id, technician_id, quantity, unit_price, line_total)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(ticket_id)
        .bind(service_id)
        .bind(technician_id)
        .bind(quantity)
        .bind(unit_price)
        .bind(line_total)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn fetch_ticket_with_items(
    pool: &MySqlPool,
    ticket_id: u64,
) -> Result<Option<TicketWithItems>, sqlx::Error> {
    let sql = format!("SELECT {} FROM sale_tickets WHERE id = ?", TICKET_COLUMNS);
    let ticket = sqlx::query_as::<_, SaleTicket>(&sql)
        .bind(ticket_id)
        .fetch_optional(pool)
        .await?;

    let ticket = match ticket {
        Some(t) => t,
        None => return Ok(None),
    };

    let items = sqlx::query_as::<_, TicketItem>(
        r#"
        SELECT id, ticket_id, service_id, technician_id, quantity, unit_price, line_total
        FROM ticket_items
        WHERE ticket_id = ?
        ORDER BY id
        "#,
    )
    .bind(ticket_id)
    .fetch_all(pool)
    .await?;

    Ok(Some(TicketWithItems { ticket, items }))
}

/* =========================
Create ticket
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/tickets",
    request_body = CreateTicket,
    responses(
        (status = 201, description = "Ticket opened", body = TicketWithItems),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Tickets"
)]
pub async fn create_ticket(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateTicket>,
) -> actix_web::Result<impl Responder> {
    auth.require_front_desk()?;

    if payload.items.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "A ticket needs at least one service"
        })));
    }

    let discount = payload.discount.unwrap_or(0.0);
    if discount < 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Discount cannot be negative"
        })));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Lock the store row so concurrent creates take numbers one at a time
    let store: Option<u64> = sqlx::query_scalar("SELECT id FROM stores WHERE id = ? FOR UPDATE")
        .bind(payload.store_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, store_id = payload.store_id, "Failed to lock store");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if store.is_none() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Store not found"
        })));
    }

    let (priced, subtotal) = price_items(
        &mut tx,
        payload.store_id,
        payload.technician_id,
        &payload.items,
    )
    .await?;

    let total = billing::ticket_total(subtotal, discount);

    let seq: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) + 1 FROM sale_tickets WHERE store_id = ? AND DATE(created_at) = CURDATE()",
    )
    .bind(payload.store_id)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to number ticket");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let ticket_number = daily_ticket_number(Utc::now().date_naive(), seq);

    let result = sqlx::query(
        r#"
        INSERT INTO sale_tickets
            (store_id, ticket_number, customer_name, technician_id, status,
             subtotal, discount, total, tip_customer, tip_receptionist)
        VALUES (?, ?, ?, ?, 'open', ?, ?, ?, 0, 0)
        "#,
    )
    .bind(payload.store_id)
    .bind(&ticket_number)
    .bind(&payload.customer_name)
    .bind(payload.technician_id)
    .bind(subtotal)
    .bind(discount)
    .bind(total)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to insert ticket");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let ticket_id = result.last_insert_id();

    insert_items(&mut tx, ticket_id, &priced).await.map_err(|e| {
        tracing::error!(error = %e, ticket_id, "Failed to insert ticket items");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit ticket");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match fetch_ticket_with_items(pool.get_ref(), ticket_id).await {
        Ok(Some(full)) => Ok(HttpResponse::Created().json(full)),
        _ => Ok(HttpResponse::Created().json(serde_json::json!({
            "id": ticket_id,
            "ticket_number": ticket_number
        }))),
    }
}

/* =========================
List tickets
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/tickets",
    params(TicketFilter),
    responses(
        (status = 200, description = "Paginated ticket list", body = TicketListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Tickets"
)]
pub async fn list_tickets(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<TicketFilter>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(20).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(store_id) = query.store_id {
        where_sql.push_str(" AND store_id = ?");
        args.push(FilterValue::U64(store_id));
    }
    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }
    if let Some(approval) = query.approval_status.as_deref() {
        where_sql.push_str(" AND approval_status = ?");
        args.push(FilterValue::Str(approval));
    }
    if let Some(technician_id) = query.technician_id {
        where_sql.push_str(" AND technician_id = ?");
        args.push(FilterValue::U64(technician_id));
    }
    if let Some(date) = query.date {
        where_sql.push_str(" AND DATE(created_at) = ?");
        args.push(FilterValue::Date(date));
    }

    let count_sql = format!("SELECT COUNT(*) FROM sale_tickets{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count tickets");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT {} FROM sale_tickets{} ORDER BY created_at DESC LIMIT ? OFFSET ?",
        TICKET_COLUMNS, where_sql
    );

    let mut data_q = sqlx::query_as::<_, SaleTicket>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let tickets = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch ticket list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(TicketListResponse {
        data: tickets,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

/* =========================
Get ticket
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/tickets/{ticket_id}",
    params(("ticket_id" = u64, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket with items", body = TicketWithItems),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tickets"
)]
pub async fn get_ticket(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let ticket_id = path.into_inner();

    let full = fetch_ticket_with_items(pool.get_ref(), ticket_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, ticket_id, "Failed to fetch ticket");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match full {
        Some(data) => Ok(HttpResponse::Ok().json(data)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Ticket not found"
        }))),
    }
}

/* =========================
Edit open ticket
========================= */
#[utoipa::path(
    put,
    path = "/api/v1/tickets/{ticket_id}",
    request_body = UpdateTicket,
    params(("ticket_id" = u64, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket updated", body = TicketWithItems),
        (status = 400, description = "Ticket is not open"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tickets"
)]
pub async fn update_ticket(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<UpdateTicket>,
) -> actix_web::Result<impl Responder> {
    auth.require_front_desk()?;

    let ticket_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to open transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    #[derive(sqlx::FromRow)]
    struct Head {
        store_id: u64,
        technician_id: u64,
        status: String,
        subtotal: f64,
        discount: f64,
    }

    let head = sqlx::query_as::<_, Head>(
        "SELECT store_id, technician_id, status, subtotal, discount
         FROM sale_tickets WHERE id = ? FOR UPDATE",
    )
    .bind(ticket_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, ticket_id, "Failed to fetch ticket for update");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let head = match head {
        Some(h) => h,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Ticket not found"
            })));
        }
    };

    // Closed tickets are frozen; only the approval flow may touch them.
    if head.status != "open" {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Only open tickets can be edited"
        })));
    }

    let technician_id = body.technician_id.unwrap_or(head.technician_id);
    let discount = body.discount.unwrap_or(head.discount);
    if discount < 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Discount cannot be negative"
        })));
    }

    let subtotal = match &body.items {
        Some(items) => {
            if items.is_empty() {
                return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                    "message": "A ticket needs at least one service"
                })));
            }

            sqlx::query("DELETE FROM ticket_items WHERE ticket_id = ?")
                .bind(ticket_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    tracing::error!(error = %e, ticket_id, "Failed to clear ticket items");
                    actix_web::error::ErrorInternalServerError("Internal Server Error")
                })?;

            let (priced, subtotal) =
                price_items(&mut tx, head.store_id, technician_id, items).await?;

            insert_items(&mut tx, ticket_id, &priced).await.map_err(|e| {
                tracing::error!(error = %e, ticket_id, "Failed to insert ticket items");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

            subtotal
        }
        None => head.subtotal,
    };

    let total = billing::ticket_total(subtotal, discount);

    sqlx::query(
        r#"
        UPDATE sale_tickets
        SET customer_name = COALESCE(?, customer_name),
            technician_id = ?,
            subtotal = ?,
            discount = ?,
            total = ?
        WHERE id = ?
        "#,
    )
    .bind(&body.customer_name)
    .bind(technician_id)
    .bind(subtotal)
    .bind(discount)
    .bind(total)
    .bind(ticket_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, ticket_id, "Failed to update ticket");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit ticket update");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match fetch_ticket_with_items(pool.get_ref(), ticket_id).await {
        Ok(Some(full)) => Ok(HttpResponse::Ok().json(full)),
        _ => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Ticket updated"
        }))),
    }
}

/* =========================
Close ticket
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{ticket_id}/close",
    request_body = CloseTicket,
    params(("ticket_id" = u64, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket closed, approval window started", body = TicketWithItems),
        (status = 400, description = "Ticket not open or invalid tips"),
        (status = 404, description = "Ticket not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Tickets"
)]
pub async fn close_ticket(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<CloseTicket>,
) -> actix_web::Result<impl Responder> {
    auth.require_front_desk()?;

    let ticket_id = path.into_inner();

    if body.tip_customer < 0.0 || body.tip_receptionist < 0.0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Tips cannot be negative"
        })));
    }

    // Per-store approval window, read through the ticket's store row
    let window_hours: Option<u32> = sqlx::query_scalar(
        r#"
        SELECT s.approval_window_hours
        FROM sale_tickets t
        JOIN stores s ON s.id = t.store_id
        WHERE t.id = ?
        "#,
    )
    .bind(ticket_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, ticket_id, "Failed to fetch approval window");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let window_hours = match window_hours {
        Some(h) => h,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Ticket not found"
            })));
        }
    };

    let now = Utc::now();
    let deadline = now + Duration::hours(window_hours as i64);

    let result = sqlx::query(
        r#"
        UPDATE sale_tickets
        SET status = ?,
            payment_method = ?,
            tip_customer = ?,
            tip_receptionist = ?,
            approval_status = ?,
            approval_deadline = ?,
            closed_at = ?
        WHERE id = ?
        AND status = 'open'
        "#,
    )
    .bind(TicketStatus::Closed.as_str())
    .bind(body.payment_method.as_str())
    .bind(billing::round_cents(body.tip_customer))
    .bind(billing::round_cents(body.tip_receptionist))
    .bind(ApprovalStatus::Pending.as_str())
    .bind(deadline)
    .bind(now)
    .bind(ticket_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, ticket_id, "Close ticket failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Ticket not found or already closed"
        })));
    }

    match fetch_ticket_with_items(pool.get_ref(), ticket_id).await {
        Ok(Some(full)) => Ok(HttpResponse::Ok().json(full)),
        _ => Ok(HttpResponse::Ok().json(serde_json::json!({
            "message": "Ticket closed"
        }))),
    }
}

/* =========================
Void ticket (manager)
========================= */
#[utoipa::path(
    post,
    path = "/api/v1/tickets/{ticket_id}/void",
    params(("ticket_id" = u64, Path, description = "Ticket ID")),
    responses(
        (status = 200, description = "Ticket voided"),
        (status = 400, description = "Ticket not open"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Tickets"
)]
pub async fn void_ticket(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let ticket_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE sale_tickets
        SET status = ?
        WHERE id = ?
        AND status = 'open'
        "#,
    )
    .bind(TicketStatus::Voided.as_str())
    .bind(ticket_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, ticket_id, "Void ticket failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Ticket not found or not open"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Ticket voided"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn ticket_numbers_are_zero_padded_per_day() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(daily_ticket_number(day, 1), "T-20260101-0001");
        assert_eq!(daily_ticket_number(day, 42), "T-20260101-0042");
    }

    #[test]
    fn busy_days_widen_past_four_digits() {
        let day = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(daily_ticket_number(day, 10_001), "T-20260101-10001");
    }
}
