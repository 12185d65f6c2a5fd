use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Service {
    #[schema(example = 12)]
    pub id: u64,

    #[schema(example = 1)]
    pub store_id: u64,

    #[schema(example = "Gel Manicure")]
    pub name: String,

    #[schema(example = "Nails", nullable = true)]
    pub category: Option<String>,

    #[schema(example = 45.0)]
    pub price: f64,

    #[schema(example = 45)]
    pub duration_minutes: u32,

    #[schema(example = true)]
    pub active: bool,
}
