//! Identity collaborator boundary. Credential checks live outside this crate; the review
//! workflow only needs to look people up and walk the reporting line.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u32);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employee,
    Manager,
    Admin,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    /// Employee code, e.g. `EMP001`.
    pub code: String,
    pub fullname: String,
    pub department: String,
    pub role: Role,
    /// Code of the person this user reports to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_code: Option<String>,
}

impl UserRecord {
    pub fn reports_to(&self, manager: &UserRecord) -> bool {
        self.manager_code.as_deref() == Some(manager.code.as_str())
    }

    /// Whether `self` may record a manager review for `employee`.
    pub fn can_review(&self, employee: &UserRecord) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Manager => employee.reports_to(self),
            Role::Employee => false,
        }
    }
}

/// Lookup surface of the identity store.
pub trait UserDirectory: Send + Sync {
    fn find(&self, id: UserId) -> Result<Option<UserRecord>, DirectoryError>;
    fn direct_reports(&self, manager: &UserRecord) -> Result<Vec<UserRecord>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("user directory unavailable: {0}")]
    Unavailable(String),
}
