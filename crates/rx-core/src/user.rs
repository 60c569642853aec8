//! Signed-in user and privileges

use serde::{Deserialize, Serialize};
use std::fmt;

/// Privileges the export flow cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrivilegeType {
    /// Allows generating reports and exports
    Analytics,
}

impl PrivilegeType {
    pub fn name(&self) -> &'static str {
        match self {
            PrivilegeType::Analytics => "Analytics",
        }
    }
}

impl fmt::Display for PrivilegeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One privilege granted to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Privilege {
    pub privilege_type: String,
}

/// User information as returned by the server
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub privileges: Vec<Privilege>,
}

impl UserInfo {
    pub fn has_privilege(&self, privilege: PrivilegeType) -> bool {
        self.privileges
            .iter()
            .any(|p| p.privilege_type == privilege.name())
    }
}
