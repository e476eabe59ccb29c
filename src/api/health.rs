use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::engine::ReconciliationEngine;

#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    /// Whether a reconciled view has been published yet
    pub view_ready: bool,
    pub timestamp: i64,
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(engine: web::Data<ReconciliationEngine>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: "user-center-service".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        view_ready: engine.snapshot().is_some(),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
