use crate::AppState;
use crate::api::error::AppError;
use crate::entities::share_grants;
use crate::services::verifier::Identity;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::files::DownloadResponse;

#[derive(Deserialize, ToSchema)]
pub struct ShareRequest {
    pub email: Option<String>,
    pub permission: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ShareResponse {
    pub share_id: String,
}

#[derive(Serialize, ToSchema)]
pub struct SharesResponse {
    #[schema(value_type = Vec<Object>)]
    pub shares: Vec<share_grants::Model>,
}

#[utoipa::path(
    post,
    path = "/api/files/{fileId}/share",
    params(
        ("fileId" = String, Path, description = "File ID")
    ),
    request_body = ShareRequest,
    responses(
        (status = 200, description = "Share created", body = ShareResponse),
        (status = 400, description = "Invalid email or permission"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(("jwt" = [])),
    tag = "shares"
)]
pub async fn share_file(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(file_id): Path<String>,
    Json(req): Json<ShareRequest>,
) -> Result<Json<ShareResponse>, AppError> {
    let share_id = state
        .authz
        .share_create(
            &identity,
            &file_id,
            req.email.as_deref().unwrap_or_default(),
            req.permission.as_deref(),
        )
        .await?;

    Ok(Json(ShareResponse { share_id }))
}

#[utoipa::path(
    get,
    path = "/api/shared",
    responses(
        (status = 200, description = "Grants addressed to the caller", body = SharesResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "shares"
)]
pub async fn list_shared(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<SharesResponse>, AppError> {
    let shares = state.authz.list_shared_with_me(&identity).await?;
    Ok(Json(SharesResponse { shares }))
}

#[utoipa::path(
    get,
    path = "/api/shared/{shareId}/download",
    params(
        ("shareId" = String, Path, description = "Share ID")
    ),
    responses(
        (status = 200, description = "Presigned download URL", body = DownloadResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Share not found or orphaned")
    ),
    security(("jwt" = [])),
    tag = "shares"
)]
pub async fn shared_download(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(share_id): Path<String>,
) -> Result<Json<DownloadResponse>, AppError> {
    let grant = state.authz.shared_download(&identity, &share_id).await?;

    Ok(Json(DownloadResponse {
        download_url: grant.download_url,
        file_name: grant.file_name,
    }))
}
