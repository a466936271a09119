pub mod prelude;

pub mod audit_entries;
pub mod file_records;
pub mod share_grants;
