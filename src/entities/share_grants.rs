use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A sharing grant from an owner to a grantee email. `owner_id` and
/// `file_name` are snapshots taken at grant time, not live references;
/// they may diverge from the file record once the file is deleted.
/// No uniqueness is enforced over `(file_id, grantee_email)`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "share_grants")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub share_id: String,
    pub file_id: String,
    pub owner_id: String,
    pub grantee_email: String,
    pub permission: String,
    pub file_name: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
