use crate::AppState;
use crate::api::error::AppError;
use crate::entities::audit_entries;
use crate::services::verifier::Identity;
use axum::{
    Extension, Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct AuditQueryParams {
    /// Target user; defaults to the caller.
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LogsResponse {
    #[schema(value_type = Vec<Object>)]
    pub logs: Vec<audit_entries::Model>,
}

#[utoipa::path(
    get,
    path = "/api/audit",
    params(
        ("userId" = Option<String>, Query, description = "Target user ID (defaults to caller)")
    ),
    responses(
        (status = 200, description = "Audit trail, most recent first", body = LogsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("jwt" = [])),
    tag = "audit"
)]
pub async fn query_audit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Query(params): Query<AuditQueryParams>,
) -> Result<Json<LogsResponse>, AppError> {
    let logs = state
        .authz
        .audit_query(&identity, params.user_id.as_deref())
        .await?;

    Ok(Json(LogsResponse { logs }))
}
