use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Queue row joined with the technician's name, in serving order.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema, Clone)]
pub struct QueuedTechnician {
    #[schema(example = 7)]
    pub employee_id: u64,

    #[schema(example = "Linh")]
    pub first_name: String,

    #[schema(example = "Tran")]
    pub last_name: String,

    #[schema(example = 2)]
    pub tickets_taken: u32,

    #[schema(example = "2026-01-01T09:00:00Z", format = "date-time", value_type = String)]
    pub joined_at: DateTime<Utc>,
}
