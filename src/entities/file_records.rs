use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One uploaded file, exclusively owned by one account. The compound key
/// `(file_id, owner_id)` means a lookup under the wrong owner reads as
/// absent rather than revealing that the file exists.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "file_records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub file_id: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub owner_id: String,
    pub file_name: String,
    pub content_type: String,
    pub size: i64,
    /// `{owner_id}/{file_id}/{file_name}`, immutable after creation.
    pub storage_key: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
