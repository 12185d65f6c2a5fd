use crate::{
    auth::auth::AuthUser,
    model::service::Service,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateService {
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
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ServiceQuery {
    #[schema(example = 1)]
    pub store_id: Option<u64>,
    /// Only active services when true
    pub active: Option<bool>,
}

/// Create Service
#[utoipa::path(
    post,
    path = "/api/v1/services",
    request_body = CreateService,
    responses(
        (status = 201, description = "Service created"),
        (status = 400, description = "Validation failed"),
        (status = 401), (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn create_service(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateService>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    if payload.price < 0.0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Price cannot be negative"
        })));
    }
    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Service name is required"
        })));
    }

    let result = sqlx::query(
        r#"
        INSERT INTO services (store_id, name, category, price, duration_minutes, active)
        VALUES (?, ?, ?, ?, ?, TRUE)
        "#,
    )
    .bind(payload.store_id)
    .bind(payload.name.trim())
    .bind(&payload.category)
    .bind(payload.price)
    .bind(payload.duration_minutes)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create service");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "id": result.last_insert_id(),
        "message": "Service created"
    })))
}

/// Service menu
#[utoipa::path(
    get,
    path = "/api/v1/services",
    params(ServiceQuery),
    responses(
        (status = 200, description = "Service list", body = [Service]),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn list_services(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ServiceQuery>,
) -> actix_web::Result<impl Responder> {
    let mut sql = String::from(
        "SELECT id, store_id, name, category, price, duration_minutes, active \
         FROM services WHERE 1=1",
    );
    if query.store_id.is_some() {
        sql.push_str(" AND store_id = ?");
    }
    if query.active.is_some() {
        sql.push_str(" AND active = ?");
    }
    sql.push_str(" ORDER BY category, name");

    let mut q = sqlx::query_as::<_, Service>(&sql);
    if let Some(store_id) = query.store_id {
        q = q.bind(store_id);
    }
    if let Some(active) = query.active {
        q = q.bind(active);
    }

    let services = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch services");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(services))
}

/// Get service
#[utoipa::path(
    get,
    path = "/api/v1/services/{id}",
    params(("id" = u64, Path, description = "Service ID")),
    responses(
        (status = 200, body = Service),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn get_service(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let service = sqlx::query_as::<_, Service>(
        "SELECT id, store_id, name, category, price, duration_minutes, active \
         FROM services WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch service");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match service {
        Some(s) => Ok(HttpResponse::Ok().json(s)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Service not found"
        }))),
    }
}

/// Partial update via JSON payload
#[utoipa::path(
    put,
    path = "/api/v1/services/{id}",
    request_body = Object,
    params(("id" = u64, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service updated"),
        (status = 400, description = "No updatable fields"),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn update_service(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let id = path.into_inner();

    let update = build_update_sql(
        "services",
        &payload,
        &["name", "category", "price", "duration_minutes", "active"],
        "id",
        id,
    )?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, id, "Failed to update service");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Service not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Service updated"
    })))
}

/// Retire service (kept for ticket history, hidden from the menu)
#[utoipa::path(
    delete,
    path = "/api/v1/services/{id}",
    params(("id" = u64, Path, description = "Service ID")),
    responses(
        (status = 200, description = "Service retired"),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Services"
)]
pub async fn delete_service(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let id = path.into_inner();

    let result = sqlx::query("UPDATE services SET active = FALSE WHERE id = ?")
        .bind(id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, id, "Failed to retire service");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Service not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Service retired"
    })))
}
