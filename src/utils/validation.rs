use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

/// Characters never allowed in a file name, plus control chars 0x00-0x1F.
const FORBIDDEN_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Maximum file name length in characters.
pub const MAX_FILE_NAME_LEN: usize = 255;

/// File names are validated, never sanitized: a bad name is rejected
/// outright instead of being rewritten.
pub fn is_valid_file_name(name: &str) -> bool {
    if name.is_empty() || name.chars().count() > MAX_FILE_NAME_LEN {
        return false;
    }
    !name
        .chars()
        .any(|c| FORBIDDEN_CHARS.contains(&c) || (c as u32) < 0x20)
}

pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

/// Access level carried by a share grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    Read,
    Write,
}

impl Permission {
    /// Absent permission defaults to read; anything other than
    /// "read"/"write" is rejected.
    pub fn parse(raw: Option<&str>) -> Option<Permission> {
        match raw {
            None => Some(Permission::Read),
            Some("read") => Some(Permission::Read),
            Some("write") => Some(Permission::Write),
            Some(_) => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::Read => "read",
            Permission::Write => "write",
        }
    }
}
