use crate::AppState;
use crate::api::error::AppError;
use crate::entities::file_records;
use crate::services::verifier::Identity;
use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlRequest {
    pub file_name: Option<String>,
    pub file_type: Option<String>,
    pub file_size: Option<i64>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: String,
    pub file_id: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResponse {
    pub download_url: String,
    pub file_name: String,
}

#[derive(Serialize, ToSchema)]
pub struct FileListResponse {
    #[schema(value_type = Vec<Object>)]
    pub files: Vec<file_records::Model>,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[utoipa::path(
    post,
    path = "/api/files/upload-url",
    request_body = UploadUrlRequest,
    responses(
        (status = 200, description = "Presigned upload URL", body = UploadUrlResponse),
        (status = 400, description = "Invalid file name or missing type"),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn upload_url(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UploadUrlRequest>,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let grant = state
        .authz
        .upload_init(
            &identity,
            req.file_name.as_deref().unwrap_or_default(),
            req.file_type.as_deref(),
            req.file_size,
        )
        .await?;

    Ok(Json(UploadUrlResponse {
        upload_url: grant.upload_url,
        file_id: grant.file_id,
    }))
}

#[utoipa::path(
    get,
    path = "/api/files/{fileId}/download",
    params(
        ("fileId" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "Presigned download URL", body = DownloadResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn download_file(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(file_id): Path<String>,
) -> Result<Json<DownloadResponse>, AppError> {
    let grant = state.authz.download(&identity, &file_id).await?;

    Ok(Json(DownloadResponse {
        download_url: grant.download_url,
        file_name: grant.file_name,
    }))
}

#[utoipa::path(
    get,
    path = "/api/files",
    responses(
        (status = 200, description = "Owned files, most recent first", body = FileListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn list_files(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<FileListResponse>, AppError> {
    let files = state.authz.list_owned(&identity).await?;
    Ok(Json(FileListResponse { files }))
}

#[utoipa::path(
    delete,
    path = "/api/files/{fileId}",
    params(
        ("fileId" = String, Path, description = "File ID")
    ),
    responses(
        (status = 200, description = "File deleted", body = MessageResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "File not found")
    ),
    security(("jwt" = [])),
    tag = "files"
)]
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Path(file_id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.authz.delete(&identity, &file_id).await?;

    Ok(Json(MessageResponse {
        message: "Deleted".to_string(),
    }))
}
