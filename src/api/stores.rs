use crate::{
    auth::auth::AuthUser,
    model::store::Store,
    utils::db_utils::{build_update_sql, execute_update},
};
use actix_web::{web, HttpResponse, Responder};
use serde_json::{json, Value};
use sqlx::MySqlPool;
use tracing::error;

/// Get store
#[utoipa::path(
    get,
    path = "/api/v1/stores/{id}",
    params(("id" = u64, Path, description = "Store ID")),
    responses(
        (status = 200, body = Store),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn get_store(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let id = path.into_inner();

    let store = sqlx::query_as::<_, Store>(
        "SELECT id, name, timezone, approval_window_hours, created_at FROM stores WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, id, "Failed to fetch store");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match store {
        Some(s) => Ok(HttpResponse::Ok().json(s)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Store not found"
        }))),
    }
}

/// Store settings: approval window, display name, timezone
#[utoipa::path(
    put,
    path = "/api/v1/stores/{id}/settings",
    request_body = Object,
    params(("id" = u64, Path, description = "Store ID")),
    responses(
        (status = 200, description = "Settings updated"),
        (status = 400, description = "No updatable fields"),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Stores"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let id = path.into_inner();

    let update = build_update_sql(
        "stores",
        &payload,
        &["name", "timezone", "approval_window_hours"],
        "id",
        id,
    )?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, id, "Failed to update store settings");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Store not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Settings updated"
    })))
}
