use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Store {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Polished Nails - Downtown")]
    pub name: String,

    #[schema(example = "America/Los_Angeles")]
    pub timezone: String,

    /// Hours a closed ticket stays pending before auto-approval.
    #[schema(example = 24)]
    pub approval_window_hours: u32,

    #[schema(example = "2024-01-01T00:00:00Z", format = "date-time", value_type = String)]
    pub created_at: Option<DateTime<Utc>>,
}
