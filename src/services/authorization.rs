use crate::api::error::AppError;
use crate::entities::{audit_entries, file_records, prelude::*, share_grants};
use crate::services::audit::{AuditAction, AuditService};
use crate::services::capability::ObjectStore;
use crate::services::verifier::Identity;
use crate::utils::validation::{self, Permission};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, sea_query::OnConflict,
};
use serde_json::json;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Cap on file records returned by a single listing.
pub const LIST_LIMIT: u64 = 100;

pub struct UploadGrant {
    pub upload_url: String,
    pub file_id: String,
}

pub struct DownloadGrant {
    pub download_url: String,
    pub file_name: String,
}

/// Orchestrates the record stores, the audit sink, and the capability
/// issuer behind each user-facing operation. Stateless per request; the
/// shared handles are all safe for unsynchronized concurrent use.
pub struct AuthorizationService {
    db: DatabaseConnection,
    store: Arc<dyn ObjectStore>,
    audit: AuditService,
}

impl AuthorizationService {
    pub fn new(db: DatabaseConnection, store: Arc<dyn ObjectStore>, audit: AuditService) -> Self {
        Self { db, store, audit }
    }

    /// Storage keys are namespaced by owner, so no two owners can collide.
    fn storage_key(owner_id: &str, file_id: &str, file_name: &str) -> String {
        format!("{}/{}/{}", owner_id, file_id, file_name)
    }

    /// Ownership proof. The compound key makes a foreign file read as
    /// absent, so non-owners get NotFound rather than Forbidden. The
    /// message differs per endpoint, hence the parameter.
    async fn owned_file(
        &self,
        identity: &Identity,
        file_id: &str,
        missing: &str,
    ) -> Result<file_records::Model, AppError> {
        FileRecords::find_by_id((file_id.to_string(), identity.id.clone()))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound(missing.to_string()))
    }

    /// Mint a write capability and persist the file record. If the caller
    /// never performs the PUT, the record stays behind with no backing
    /// object; no reconciliation happens here.
    pub async fn upload_init(
        &self,
        identity: &Identity,
        file_name: &str,
        content_type: Option<&str>,
        size: Option<i64>,
    ) -> Result<UploadGrant, AppError> {
        if !validation::is_valid_file_name(file_name) {
            return Err(AppError::BadRequest("Invalid file name".to_string()));
        }
        let content_type = match content_type {
            Some(ct) if !ct.is_empty() => ct,
            _ => return Err(AppError::BadRequest("File type is required".to_string())),
        };

        let file_id = Uuid::new_v4().to_string();
        let storage_key = Self::storage_key(&identity.id, &file_id, file_name);

        let upload_url = self
            .store
            .issue_upload_url(&storage_key, content_type)
            .await
            .map_err(|e| AppError::Internal(format!("Upload capability failed: {}", e)))?;

        let record = file_records::ActiveModel {
            file_id: Set(file_id.clone()),
            owner_id: Set(identity.id.clone()),
            file_name: Set(file_name.to_string()),
            content_type: Set(content_type.to_string()),
            size: Set(size.unwrap_or(0)),
            storage_key: Set(storage_key),
            created_at: Set(Utc::now()),
        };

        // Idempotent upsert; storage_key stays immutable after creation.
        FileRecords::insert(record)
            .on_conflict(
                OnConflict::columns([
                    file_records::Column::FileId,
                    file_records::Column::OwnerId,
                ])
                .update_columns([
                    file_records::Column::FileName,
                    file_records::Column::ContentType,
                    file_records::Column::Size,
                    file_records::Column::CreatedAt,
                ])
                .to_owned(),
            )
            .exec(&self.db)
            .await?;

        self.audit.record(
            &identity.id,
            AuditAction::Upload,
            json!({ "fileId": file_id, "fileName": file_name }),
        );
        info!(user_id = %identity.id, file_id = %file_id, "File upload initiated");

        Ok(UploadGrant {
            upload_url,
            file_id,
        })
    }

    pub async fn download(
        &self,
        identity: &Identity,
        file_id: &str,
    ) -> Result<DownloadGrant, AppError> {
        let file = self.owned_file(identity, file_id, "File not found").await?;

        let download_url = self
            .store
            .issue_download_url(&file.storage_key)
            .await
            .map_err(|e| AppError::Internal(format!("Download capability failed: {}", e)))?;

        self.audit.record(
            &identity.id,
            AuditAction::Download,
            json!({ "fileId": file_id }),
        );

        Ok(DownloadGrant {
            download_url,
            file_name: file.file_name,
        })
    }

    /// Owner's files, most recent first, capped at 100.
    pub async fn list_owned(
        &self,
        identity: &Identity,
    ) -> Result<Vec<file_records::Model>, AppError> {
        Ok(FileRecords::find()
            .filter(file_records::Column::OwnerId.eq(&identity.id))
            .order_by_desc(file_records::Column::CreatedAt)
            .limit(LIST_LIMIT)
            .all(&self.db)
            .await?)
    }

    /// Object first, then the record, then the audit entry. The three
    /// steps are not atomic and a failure in between is not compensated.
    pub async fn delete(&self, identity: &Identity, file_id: &str) -> Result<(), AppError> {
        let file = self.owned_file(identity, file_id, "File not found").await?;

        self.store
            .delete_object(&file.storage_key)
            .await
            .map_err(|e| AppError::Internal(format!("Object deletion failed: {}", e)))?;

        FileRecords::delete_by_id((file_id.to_string(), identity.id.clone()))
            .exec(&self.db)
            .await?;

        self.audit.record(
            &identity.id,
            AuditAction::Delete,
            json!({ "fileId": file_id, "fileName": file.file_name }),
        );
        info!(user_id = %identity.id, file_id = %file_id, "File deleted");

        Ok(())
    }

    /// Write a grant carrying owner and file-name snapshots. Repeated
    /// identical grants are allowed to coexist; no deduplication.
    pub async fn share_create(
        &self,
        identity: &Identity,
        file_id: &str,
        email: &str,
        permission: Option<&str>,
    ) -> Result<String, AppError> {
        if !validation::is_valid_email(email) {
            return Err(AppError::BadRequest("Valid email is required".to_string()));
        }
        let permission = Permission::parse(permission).ok_or_else(|| {
            AppError::BadRequest("Permission must be read or write".to_string())
        })?;

        let file = self
            .owned_file(identity, file_id, "File not found or not owned by you")
            .await?;

        let share_id = Uuid::new_v4().to_string();
        let grant = share_grants::ActiveModel {
            share_id: Set(share_id.clone()),
            file_id: Set(file_id.to_string()),
            owner_id: Set(identity.id.clone()),
            grantee_email: Set(email.to_string()),
            permission: Set(permission.as_str().to_string()),
            file_name: Set(file.file_name),
            created_at: Set(Utc::now()),
        };
        grant.insert(&self.db).await?;

        self.audit.record(
            &identity.id,
            AuditAction::Share,
            json!({ "fileId": file_id, "email": email, "permission": permission.as_str() }),
        );
        info!(user_id = %identity.id, file_id = %file_id, shared_with = %email, "File shared");

        Ok(share_id)
    }

    /// Grants addressed to the caller's verified email, newest first.
    pub async fn list_shared_with_me(
        &self,
        identity: &Identity,
    ) -> Result<Vec<share_grants::Model>, AppError> {
        Ok(ShareGrants::find()
            .filter(share_grants::Column::GranteeEmail.eq(&identity.email))
            .order_by_desc(share_grants::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Resolve a grant for the caller. An unknown share and a share
    /// addressed to someone else are indistinguishable; a grant whose
    /// file no longer resolves is orphaned and also reads as NotFound.
    pub async fn shared_download(
        &self,
        identity: &Identity,
        share_id: &str,
    ) -> Result<DownloadGrant, AppError> {
        let grant = ShareGrants::find_by_id(share_id.to_string())
            .one(&self.db)
            .await?;

        // Exact, case-sensitive email match.
        let grant = match grant {
            Some(g) if g.grantee_email == identity.email => g,
            _ => return Err(AppError::NotFound("Share not found".to_string())),
        };

        let file = FileRecords::find_by_id((grant.file_id.clone(), grant.owner_id.clone()))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::NotFound("Original file no longer exists".to_string()))?;

        let download_url = self
            .store
            .issue_download_url(&file.storage_key)
            .await
            .map_err(|e| AppError::Internal(format!("Download capability failed: {}", e)))?;

        self.audit.record(
            &identity.id,
            AuditAction::DownloadShared,
            json!({ "fileId": grant.file_id, "shareId": share_id }),
        );

        Ok(DownloadGrant {
            download_url,
            file_name: file.file_name,
        })
    }

    /// Admin-only trail lookup, defaulting to the caller's own trail.
    pub async fn audit_query(
        &self,
        identity: &Identity,
        target_user_id: Option<&str>,
    ) -> Result<Vec<audit_entries::Model>, AppError> {
        if !identity.is_admin() {
            return Err(AppError::Forbidden("Admin only".to_string()));
        }

        let target = target_user_id.unwrap_or(&identity.id);
        Ok(self.audit.query_for_user(target).await?)
    }
}
