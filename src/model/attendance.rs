use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    pub store_id: u64,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    /// hourly | commission, as chosen at check-in
    #[schema(example = "hourly")]
    pub pay_type: String,

    #[schema(example = "09:00:00", value_type = String)]
    pub check_in: Option<NaiveTime>,

    #[schema(example = "17:30:00", value_type = String, nullable = true)]
    pub check_out: Option<NaiveTime>,
}
