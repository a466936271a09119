pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod services;
pub mod utils;

use crate::config::AppConfig;
use crate::services::authorization::AuthorizationService;
use crate::services::verifier::IdentityVerifier;
use axum::{
    Router,
    http::HeaderValue,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post},
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::health::health_check,
        api::handlers::files::upload_url,
        api::handlers::files::download_file,
        api::handlers::files::list_files,
        api::handlers::files::delete_file,
        api::handlers::shares::share_file,
        api::handlers::shares::list_shared,
        api::handlers::shares::shared_download,
        api::handlers::audit::query_audit,
    ),
    components(
        schemas(
            api::handlers::health::HealthResponse,
            api::handlers::files::UploadUrlRequest,
            api::handlers::files::UploadUrlResponse,
            api::handlers::files::DownloadResponse,
            api::handlers::files::FileListResponse,
            api::handlers::files::MessageResponse,
            api::handlers::shares::ShareRequest,
            api::handlers::shares::ShareResponse,
            api::handlers::shares::SharesResponse,
            api::handlers::audit::AuditQueryParams,
            api::handlers::audit::LogsResponse,
        )
    ),
    tags(
        (name = "system", description = "Health and metadata"),
        (name = "files", description = "File upload, listing, download, deletion"),
        (name = "shares", description = "Sharing grants"),
        (name = "audit", description = "Audit trail (admin only)")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub authz: Arc<AuthorizationService>,
    pub verifier: Arc<dyn IdentityVerifier>,
    pub config: AppConfig,
}

pub fn create_app(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .allowed_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api/files/upload-url",
            post(api::handlers::files::upload_url).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/files",
            get(api::handlers::files::list_files).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/files/:file_id/download",
            get(api::handlers::files::download_file).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/files/:file_id",
            delete(api::handlers::files::delete_file).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/files/:file_id/share",
            post(api::handlers::shares::share_file).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/shared",
            get(api::handlers::shares::list_shared).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/shared/:share_id/download",
            get(api::handlers::shares::shared_download).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .route(
            "/api/audit",
            get(api::handlers::audit::query_audit).layer(from_fn_with_state(
                state.clone(),
                api::middleware::auth::auth_middleware,
            )),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(from_fn(api::middleware::security::security_headers))
        .with_state(state)
}
