use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "User–Center Service API",
        version = "1.0.0",
        description = "Reconciled, filterable and paginated view over dashboard users and their centers.\n\n**Sources:** users, centers and per-center memberships are fetched on reload; the membership join always wins over the center cached on the user.\n\n**Features:**\n- Duplicate user rows collapsed to the newest\n- Search, status, role and center filters\n- Page-number window for the table footer\n- Headline counts independent of filters\n- Degradation diagnostics (failed centers, anomalies, ambiguities)",
        contact(
            name = "Admin Dashboard Team"
        )
    ),
    paths(
        // Health
        crate::api::health::health_check,

        // Users
        crate::api::users::get_users,
        crate::api::users::get_deleted_users,
        crate::api::users::get_stats,
        crate::api::users::get_diagnostics,
        crate::api::users::reload,
    ),
    components(
        schemas(
            // Health
            crate::api::health::HealthResponse,

            // Users
            crate::api::users::UserViewResponse,
            crate::api::users::StatsResponse,
            crate::api::users::DiagnosticsResponse,
            crate::api::users::ReloadResponse,
            crate::models::View,
            crate::models::Stats,
            crate::models::Diagnostics,
            crate::models::ReloadOutcome,
            crate::models::EngineState,
            crate::models::ReconciledUser,
            crate::models::UserRecord,
            crate::models::UserStatus,
        )
    ),
    tags(
        (name = "Health", description = "Liveness and view readiness."),
        (name = "Users", description = "Reconciled user view, deleted users, stats, diagnostics and explicit reload."),
    )
)]
pub struct ApiDoc;
