use crate::entities::{audit_entries, prelude::AuditEntries};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use serde_json::Value;
use std::fmt;
use tracing::{error, info};
use uuid::Uuid;

/// Security-relevant actions recorded in the trail.
#[derive(Debug, Clone, Copy)]
pub enum AuditAction {
    Upload,
    Download,
    Delete,
    Share,
    DownloadShared,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuditAction::Upload => "UPLOAD",
            AuditAction::Download => "DOWNLOAD",
            AuditAction::Delete => "DELETE",
            AuditAction::Share => "SHARE",
            AuditAction::DownloadShared => "DOWNLOAD_SHARED",
        };
        f.write_str(s)
    }
}

/// Cap on entries returned by a single audit query.
pub const AUDIT_QUERY_LIMIT: u64 = 50;

#[derive(Clone)]
pub struct AuditService {
    db: DatabaseConnection,
}

impl AuditService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Fire-and-forget append. The write runs on a background task; its
    /// failure is logged and never reaches the triggering operation.
    pub fn record(&self, actor_id: &str, action: AuditAction, details: Value) {
        let db = self.db.clone();
        let actor = actor_id.to_string();
        let action_str = action.to_string();

        info!(
            target: "audit",
            actor_id = %actor,
            action = %action_str,
            "audit event"
        );

        tokio::spawn(async move {
            let entry = audit_entries::ActiveModel {
                log_id: Set(Uuid::new_v4().to_string()),
                timestamp: Set(chrono::Utc::now()),
                actor_id: Set(actor),
                action: Set(action_str),
                details: Set(Some(details.to_string())),
            };

            if let Err(e) = entry.insert(&db).await {
                error!("Audit write failed: {}", e);
            }
        });
    }

    /// Reverse-chronological trail for one user, capped at 50 entries.
    pub async fn query_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<audit_entries::Model>, sea_orm::DbErr> {
        AuditEntries::find()
            .filter(audit_entries::Column::ActorId.eq(user_id))
            .order_by_desc(audit_entries::Column::Timestamp)
            .limit(AUDIT_QUERY_LIMIT)
            .all(&self.db)
            .await
    }
}
