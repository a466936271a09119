pub use super::audit_entries::Entity as AuditEntries;
pub use super::file_records::Entity as FileRecords;
pub use super::share_grants::Entity as ShareGrants;
