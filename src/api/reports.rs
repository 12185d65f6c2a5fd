use crate::auth::auth::AuthUser;
use crate::model::ticket::PaymentMethod;
use crate::utils::billing;
use crate::utils::payroll::{period_containing, PayPeriod};
use actix_web::{web, HttpResponse, Responder};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use std::collections::BTreeMap;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct EndOfDayQuery {
    #[schema(example = 1)]
    pub store_id: u64,

    /// Defaults to today
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayPeriodQuery {
    /// Defaults to today
    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: Option<NaiveDate>,
}

/// Closed-ticket row feeding the day summary.
#[derive(Debug, sqlx::FromRow, Serialize)]
pub struct ClosedTicketRow {
    pub id: u64,
    pub ticket_number: String,
    pub customer_name: Option<String>,
    pub technician_id: u64,
    pub subtotal: f64,
    pub discount: f64,
    pub total: f64,
    pub payment_method: Option<String>,
    pub tip_customer: f64,
    pub tip_receptionist: f64,
    pub approval_status: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TechnicianLineRow {
    pub ticket_id: u64,
    pub technician_id: u64,
    pub first_name: String,
    pub last_name: String,
    pub line_total: f64,
}

#[derive(Debug, Serialize, ToSchema, PartialEq)]
pub struct TechnicianDaySummary {
    #[schema(example = 7)]
    pub technician_id: u64,

    #[schema(example = "Linh Tran")]
    pub name: String,

    #[schema(example = 6)]
    pub services: u32,

    #[schema(example = 320.0)]
    pub revenue: f64,

    /// Proportional share of customer tips across this technician's tickets.
    #[schema(example = 42.5)]
    pub tip_share: f64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DaySummary {
    #[schema(example = 1)]
    pub store_id: u64,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    #[schema(example = 24)]
    pub tickets_closed: u32,

    #[schema(example = 1850.0)]
    pub gross_sales: f64,

    #[schema(example = 75.0)]
    pub discounts: f64,

    #[schema(example = 1775.0)]
    pub net_sales: f64,

    #[schema(example = 120.0)]
    pub cash_tips: f64,

    #[schema(example = 210.0)]
    pub card_tips: f64,

    pub technicians: Vec<TechnicianDaySummary>,
}

fn payment_of(row: &ClosedTicketRow) -> PaymentMethod {
    match row.payment_method.as_deref() {
        Some("cash") => PaymentMethod::Cash,
        Some("card") => PaymentMethod::Card,
        _ => PaymentMethod::Other,
    }
}

/// Fold closed tickets and their line items into the end-of-day board.
/// Pure so the arithmetic is testable without a database.
pub fn build_day_summary(
    store_id: u64,
    date: NaiveDate,
    tickets: &[ClosedTicketRow],
    lines: &[TechnicianLineRow],
) -> DaySummary {
    let mut gross_sales = 0.0;
    let mut discounts = 0.0;
    let mut net_sales = 0.0;
    let mut cash_tips = 0.0;
    let mut card_tips = 0.0;

    struct TechAcc {
        name: String,
        services: u32,
        revenue: f64,
        tip_share: f64,
    }

    let mut techs: BTreeMap<u64, TechAcc> = BTreeMap::new();

    for line in lines {
        let acc = techs.entry(line.technician_id).or_insert_with(|| TechAcc {
            name: format!("{} {}", line.first_name, line.last_name),
            services: 0,
            revenue: 0.0,
            tip_share: 0.0,
        });
        acc.services += 1;
        acc.revenue = billing::round_cents(acc.revenue + line.line_total);
    }

    for ticket in tickets {
        gross_sales = billing::round_cents(gross_sales + ticket.subtotal);
        discounts = billing::round_cents(discounts + ticket.discount);
        net_sales = billing::round_cents(net_sales + ticket.total);

        let tips = billing::tip_breakdown(
            payment_of(ticket),
            ticket.tip_customer,
            ticket.tip_receptionist,
        );
        cash_tips = billing::round_cents(cash_tips + tips.cash);
        card_tips = billing::round_cents(card_tips + tips.card);

        // Split this ticket's customer tip across the technicians who
        // worked it, weighted by their line totals.
        let ticket_lines: Vec<&TechnicianLineRow> =
            lines.iter().filter(|l| l.ticket_id == ticket.id).collect();
        if ticket_lines.is_empty() {
            continue;
        }

        let mut per_tech: BTreeMap<u64, f64> = BTreeMap::new();
        for l in &ticket_lines {
            let entry = per_tech.entry(l.technician_id).or_insert(0.0);
            *entry = billing::round_cents(*entry + l.line_total);
        }

        let ids: Vec<u64> = per_tech.keys().copied().collect();
        let weights: Vec<f64> = per_tech.values().copied().collect();
        let shares = billing::split_tip(ticket.tip_customer, &weights);

        for (tech_id, share) in ids.into_iter().zip(shares) {
            if let Some(acc) = techs.get_mut(&tech_id) {
                acc.tip_share = billing::round_cents(acc.tip_share + share);
            }
        }
    }

    DaySummary {
        store_id,
        date,
        tickets_closed: tickets.len() as u32,
        gross_sales,
        discounts,
        net_sales,
        cash_tips,
        card_tips,
        technicians: techs
            .into_iter()
            .map(|(technician_id, acc)| TechnicianDaySummary {
                technician_id,
                name: acc.name,
                services: acc.services,
                revenue: acc.revenue,
                tip_share: acc.tip_share,
            })
            .collect(),
    }
}

async fn fetch_day(
    pool: &MySqlPool,
    store_id: u64,
    date: NaiveDate,
) -> Result<(Vec<ClosedTicketRow>, Vec<TechnicianLineRow>), sqlx::Error> {
    let tickets = sqlx::query_as::<_, ClosedTicketRow>(
        r#"
        SELECT id, ticket_number, customer_name, technician_id, subtotal, discount, total,
               payment_method, tip_customer, tip_receptionist, approval_status
        FROM sale_tickets
        WHERE store_id = ? AND status = 'closed' AND DATE(closed_at) = ?
        ORDER BY closed_at
        "#,
    )
    .bind(store_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    let lines = sqlx::query_as::<_, TechnicianLineRow>(
        r#"
        SELECT ti.ticket_id, ti.technician_id, e.first_name, e.last_name, ti.line_total
        FROM ticket_items ti
        JOIN sale_tickets t ON t.id = ti.ticket_id
        JOIN employees e ON e.id = ti.technician_id
        WHERE t.store_id = ? AND t.status = 'closed' AND DATE(t.closed_at) = ?
        "#,
    )
    .bind(store_id)
    .bind(date)
    .fetch_all(pool)
    .await?;

    Ok((tickets, lines))
}

/* =========================
End-of-day summary
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/reports/end-of-day",
    params(EndOfDayQuery),
    responses(
        (status = 200, description = "Daily totals and per-technician breakdown", body = DaySummary),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn end_of_day(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EndOfDayQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_front_desk()?;

    let date = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let (tickets, lines) = fetch_day(pool.get_ref(), query.store_id, date)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch end-of-day data");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(build_day_summary(query.store_id, date, &tickets, &lines)))
}

/* =========================
End-of-day CSV export
========================= */

pub fn tickets_to_csv(tickets: &[ClosedTicketRow]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record([
        "ticket_number",
        "customer",
        "technician_id",
        "subtotal",
        "discount",
        "total",
        "payment_method",
        "tip_customer",
        "tip_receptionist",
        "approval_status",
    ])?;

    for t in tickets {
        writer.write_record([
            t.ticket_number.as_str(),
            t.customer_name.as_deref().unwrap_or(""),
            &t.technician_id.to_string(),
            &format!("{:.2}", t.subtotal),
            &format!("{:.2}", t.discount),
            &format!("{:.2}", t.total),
            t.payment_method.as_deref().unwrap_or(""),
            &format!("{:.2}", t.tip_customer),
            &format!("{:.2}", t.tip_receptionist),
            t.approval_status.as_deref().unwrap_or(""),
        ])?;
    }

    writer.into_inner().map_err(|e| {
        csv::Error::from(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))
    })
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/end-of-day/export",
    params(EndOfDayQuery),
    responses(
        (status = 200, description = "CSV of the day's closed tickets", body = String, content_type = "text/csv"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn export_end_of_day(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<EndOfDayQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_front_desk()?;

    let date = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    let (tickets, _) = fetch_day(pool.get_ref(), query.store_id, date)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch export data");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let body = tickets_to_csv(&tickets).map_err(|e| {
        error!(error = %e, "Failed to build CSV");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let filename = format!("end_of_day_{}_{}.csv", query.store_id, date);

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body))
}

/* =========================
Payroll period
========================= */
#[utoipa::path(
    get,
    path = "/api/v1/reports/payroll-period",
    params(PayPeriodQuery),
    responses(
        (status = 200, description = "Bi-weekly period containing the date", body = PayPeriod),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn payroll_period(
    _auth: AuthUser,
    query: web::Query<PayPeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let date = query
        .date
        .unwrap_or_else(|| chrono::Utc::now().date_naive());

    Ok(HttpResponse::Ok().json(period_containing(date)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(
        id: u64,
        payment: &str,
        subtotal: f64,
        discount: f64,
        tip_customer: f64,
        tip_receptionist: f64,
    ) -> ClosedTicketRow {
        ClosedTicketRow {
            id,
            ticket_number: format!("T-20260101-{:04}", id),
            customer_name: None,
            technician_id: 1,
            subtotal,
            discount,
            total: billing::ticket_total(subtotal, discount),
            payment_method: Some(payment.to_string()),
            tip_customer,
            tip_receptionist,
            approval_status: Some("pending".to_string()),
        }
    }

    fn line(ticket_id: u64, technician_id: u64, line_total: f64) -> TechnicianLineRow {
        TechnicianLineRow {
            ticket_id,
            technician_id,
            first_name: format!("Tech{}", technician_id),
            last_name: "Nguyen".to_string(),
            line_total,
        }
    }

    #[test]
    fn summary_totals_follow_the_tickets() {
        let tickets = vec![
            ticket(1, "cash", 100.0, 10.0, 20.0, 5.0),
            ticket(2, "card", 50.0, 0.0, 10.0, 0.0),
        ];
        let lines = vec![line(1, 1, 100.0), line(2, 2, 50.0)];

        let s = build_day_summary(1, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), &tickets, &lines);

        assert_eq!(s.tickets_closed, 2);
        assert_eq!(s.gross_sales, 150.0);
        assert_eq!(s.discounts, 10.0);
        assert_eq!(s.net_sales, 140.0);
        // cash ticket: 20 customer + 5 receptionist; card ticket adds nothing to cash
        assert_eq!(s.cash_tips, 25.0);
        assert_eq!(s.card_tips, 10.0);
    }

    #[test]
    fn tips_split_proportionally_between_technicians() {
        let tickets = vec![ticket(1, "card", 100.0, 0.0, 10.0, 0.0)];
        let lines = vec![line(1, 1, 75.0), line(1, 2, 25.0)];

        let s = build_day_summary(1, NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(), &tickets, &lines);

        let tech1 = s.technicians.iter().find(|t| t.technician_id == 1).unwrap();
        let tech2 = s.technicians.iter().find(|t| t.technician_id == 2).unwrap();
        assert_eq!(tech1.tip_share, 7.5);
        assert_eq!(tech2.tip_share, 2.5);
        assert_eq!(tech1.revenue, 75.0);
        assert_eq!(tech2.revenue, 25.0);
    }

    #[test]
    fn empty_day_exports_header_only() {
        let bytes = tickets_to_csv(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text.lines().count(), 1);
        assert!(text.starts_with("ticket_number,customer"));
    }

    #[test]
    fn export_renders_money_with_two_decimals() {
        let tickets = vec![ticket(42, "cash", 85.0, 10.0, 15.0, 5.0)];
        let bytes = tickets_to_csv(&tickets).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let row = text.lines().nth(1).unwrap();
        assert!(row.contains("T-20260101-0042"));
        assert!(row.contains("85.00"));
        assert!(row.contains("75.00"));
    }
}
