use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::engine::ReconciliationEngine;
use crate::models::{Diagnostics, EngineState, FilterSet, ReloadOutcome, Stats, View};
use crate::utils::AppError;

// ==================== REQUEST/RESPONSE MODELS ====================

#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UserViewQuery {
    /// Case-insensitive match on username, email or full name
    pub search: Option<String>,
    /// active | inactive | suspended | pending | all
    pub status: Option<String>,
    /// Case-insensitive match on any role
    pub role: Option<String>,
    /// Reconciled center id, or all
    pub center: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl UserViewQuery {
    fn filters(&self) -> FilterSet {
        FilterSet {
            search_term: self.search.clone(),
            status: self.status.clone(),
            role: self.role.clone(),
            center: self.center.clone(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct UserViewResponse {
    pub success: bool,
    pub state: EngineState,
    pub view: View,
    /// Present only when the last reload degraded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Diagnostics>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct StatsResponse {
    pub success: bool,
    pub stats: Stats,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct DiagnosticsResponse {
    pub success: bool,
    pub state: EngineState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnostics: Option<Diagnostics>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ReloadResponse {
    pub success: bool,
    pub state: EngineState,
    pub outcome: ReloadOutcome,
}

fn view_response(engine: &ReconciliationEngine, view: View) -> UserViewResponse {
    UserViewResponse {
        success: true,
        state: engine.state(),
        view,
        warnings: engine.diagnostics().filter(Diagnostics::has_warnings),
    }
}

// ==================== HANDLERS ====================

/// GET /api/v1/users - Reconciled active users, filtered and paginated
#[utoipa::path(
    get,
    path = "/api/v1/users",
    tag = "Users",
    params(UserViewQuery),
    responses(
        (status = 200, description = "One page of reconciled users", body = UserViewResponse),
        (status = 400, description = "Malformed query parameters")
    )
)]
pub async fn get_users(
    engine: web::Data<ReconciliationEngine>,
    config: web::Data<Config>,
    query: web::Query<UserViewQuery>,
) -> impl Responder {
    let page_size = config.effective_page_size(query.page_size);
    let page = query.page.unwrap_or(1);

    log::debug!("📋 GET /users - page {} size {} filters {:?}", page, page_size, query.filters());

    let view = engine.get_view(&query.filters(), page, page_size);
    HttpResponse::Ok().json(view_response(&engine, view))
}

/// GET /api/v1/users/deleted - Soft-deleted users, same filters and paging
#[utoipa::path(
    get,
    path = "/api/v1/users/deleted",
    tag = "Users",
    params(UserViewQuery),
    responses(
        (status = 200, description = "One page of deleted users", body = UserViewResponse),
        (status = 400, description = "Malformed query parameters")
    )
)]
pub async fn get_deleted_users(
    engine: web::Data<ReconciliationEngine>,
    config: web::Data<Config>,
    query: web::Query<UserViewQuery>,
) -> impl Responder {
    let page_size = config.effective_page_size(query.page_size);
    let view = engine.get_deleted_view(&query.filters(), query.page.unwrap_or(1), page_size);
    HttpResponse::Ok().json(view_response(&engine, view))
}

/// GET /api/v1/users/stats - Headline counts, independent of filters
#[utoipa::path(
    get,
    path = "/api/v1/users/stats",
    tag = "Users",
    responses(
        (status = 200, description = "Total, active and inactive counts", body = StatsResponse)
    )
)]
pub async fn get_stats(engine: web::Data<ReconciliationEngine>) -> impl Responder {
    HttpResponse::Ok().json(StatsResponse {
        success: true,
        stats: engine.get_stats(),
    })
}

/// GET /api/v1/users/diagnostics - Engine state and last reload's warnings
#[utoipa::path(
    get,
    path = "/api/v1/users/diagnostics",
    tag = "Users",
    responses(
        (status = 200, description = "Engine state and diagnostics", body = DiagnosticsResponse)
    )
)]
pub async fn get_diagnostics(engine: web::Data<ReconciliationEngine>) -> impl Responder {
    HttpResponse::Ok().json(DiagnosticsResponse {
        success: true,
        state: engine.state(),
        diagnostics: engine.diagnostics(),
    })
}

/// POST /api/v1/users/reload - Refetches every source and republishes the view
///
/// Called by the dashboard after any mutation or center reassignment.
#[utoipa::path(
    post,
    path = "/api/v1/users/reload",
    tag = "Users",
    responses(
        (status = 200, description = "Reload finished; `success` is false when a primary source failed", body = ReloadResponse)
    )
)]
pub async fn reload(engine: web::Data<ReconciliationEngine>) -> impl Responder {
    log::info!("🔄 POST /users/reload");

    let outcome = engine.reload().await;

    if !outcome.ready {
        log::warn!("⚠️  Reload #{} not ready; previous view kept", outcome.generation);
    } else if !outcome.failed_centers.is_empty() || outcome.anomalies > 0 || outcome.ambiguities > 0 {
        log::warn!(
            "⚠️  Reload #{} degraded: {} failed centers, {} anomalies, {} ambiguities",
            outcome.generation,
            outcome.failed_centers.len(),
            outcome.anomalies,
            outcome.ambiguities
        );
    }

    HttpResponse::Ok().json(ReloadResponse {
        success: outcome.ready,
        state: engine.state(),
        outcome,
    })
}

/// JSON body for rejected query strings, in place of actix's plain-text default
pub fn query_error_handler(
    err: actix_web::error::QueryPayloadError,
    _req: &actix_web::HttpRequest,
) -> actix_web::Error {
    let message = AppError::InvalidRequest(err.to_string()).to_string();
    log::debug!("❌ Rejected query: {}", message);

    actix_web::error::InternalError::from_response(
        err,
        HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": message
        })),
    )
    .into()
}

/// Routes under /api/v1/users
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/users")
            .route("", web::get().to(get_users))
            .route("/deleted", web::get().to(get_deleted_users))
            .route("/stats", web::get().to(get_stats))
            .route("/diagnostics", web::get().to(get_diagnostics))
            .route("/reload", web::post().to(reload)),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{engine_over, user, FakeSources};
    use crate::models::CenterRecord;
    use actix_web::{test, App};
    use std::time::Duration;

    fn test_config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "mongodb://localhost/test".to_string(),
            users_collection: "users".to_string(),
            centers_collection: "centers".to_string(),
            memberships_collection: "center_memberships".to_string(),
            default_page_size: 2,
            max_page_size: 5,
            membership_fetch_timeout: Some(Duration::from_secs(1)),
            cors_origins: vec![],
        }
    }

    fn sources() -> std::sync::Arc<FakeSources> {
        let sources = FakeSources::new();
        sources.set_centers(vec![CenterRecord::new("c1", "North"), CenterRecord::new("c3", "East")]);
        sources.set_users(vec![
            user("u1", "alpha", Some("c9")),
            user("u2", "beta", None),
            user("u3", "gamma", None),
        ]);
        sources.add_membership("u1", "c1");
        sources.fail_center("c3");
        sources
    }

    macro_rules! app {
        ($engine:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($engine))
                    .app_data(web::Data::new(test_config()))
                    .app_data(web::QueryConfig::default().error_handler(query_error_handler))
                    .configure(configure),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn test_reload_then_page_through_users() {
        let app = app!(engine_over(&sources()));

        let req = test::TestRequest::post().uri("/api/v1/users/reload").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["state"], "ready");
        assert_eq!(body["outcome"]["failed_centers"], serde_json::json!(["c3"]));

        let req = test::TestRequest::get().uri("/api/v1/users?page=9").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["view"]["total_count"], 3);
        assert_eq!(body["view"]["total_pages"], 2);
        assert_eq!(body["view"]["page"], 2);
        assert_eq!(body["view"]["pages"], serde_json::json!([1, 2]));
        assert_eq!(body["warnings"]["failed_centers"], serde_json::json!(["c3"]));
    }

    #[actix_web::test]
    async fn test_center_filter_uses_reconciled_center() {
        let app = app!(engine_over(&sources()));
        test::call_service(&app, test::TestRequest::post().uri("/api/v1/users/reload").to_request()).await;

        let req = test::TestRequest::get().uri("/api/v1/users?center=c1").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["view"]["total_count"], 1);
        assert_eq!(body["view"]["rows"][0]["id"], "u1");
        assert_eq!(body["view"]["rows"][0]["center_name"], "North");

        let req = test::TestRequest::get().uri("/api/v1/users?center=c9").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["view"]["total_count"], 0);
    }

    #[actix_web::test]
    async fn test_stats_and_diagnostics() {
        let app = app!(engine_over(&sources()));

        let req = test::TestRequest::get().uri("/api/v1/users/diagnostics").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["state"], "idle");
        assert!(body.get("diagnostics").is_none());

        test::call_service(&app, test::TestRequest::post().uri("/api/v1/users/reload").to_request()).await;

        let req = test::TestRequest::get().uri("/api/v1/users/stats?status=inactive").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["stats"], serde_json::json!({ "total": 3, "active": 3, "inactive": 0 }));
    }

    #[actix_web::test]
    async fn test_failed_primary_source_reports_not_ready() {
        let sources = sources();
        sources.users_fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let app = app!(engine_over(&sources));

        let req = test::TestRequest::post().uri("/api/v1/users/reload").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["state"], "partially_failed");

        let req = test::TestRequest::get().uri("/api/v1/users").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["view"]["total_count"], 0);
    }

    #[actix_web::test]
    async fn test_bad_query_is_a_json_400() {
        let app = app!(engine_over(&sources()));

        let req = test::TestRequest::get().uri("/api/v1/users?page=two").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["success"], false);
        let error = body["error"].as_str().unwrap();
        assert!(error.starts_with("Invalid request: "), "{}", error);
    }
}
