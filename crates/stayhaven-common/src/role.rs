//! Account roles and the URL prefixes each one owns.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StayhavenError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Partner,
    Admin,
    Superuser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Partner => "PARTNER",
            Role::Admin => "ADMIN",
            Role::Superuser => "SUPERUSER",
        }
    }

    /// Admin API access is shared by admins and superusers.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Superuser)
    }

    /// Landing page after sign-in.
    pub fn home_prefix(&self) -> &'static str {
        match self {
            Role::Partner => "/dashboard",
            Role::Admin => "/admin",
            Role::Superuser => "/super",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = StayhavenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PARTNER" => Ok(Role::Partner),
            "ADMIN" => Ok(Role::Admin),
            "SUPERUSER" => Ok(Role::Superuser),
            other => Err(StayhavenError::InvalidRole(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = StayhavenError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Pages that stay reachable without a session even under a gated prefix.
const PUBLIC_UNDER_GATE: &[&str] = &["/admin/login"];

/// The single role allowed under `path`, if the path is gated at all.
///
/// Gating is exclusive: an admin cannot open the partner dashboard and a
/// superuser cannot open `/admin` pages.
pub fn gate_for_path(path: &str) -> Option<Role> {
    if PUBLIC_UNDER_GATE.iter().any(|p| path == *p || path.starts_with(&format!("{p}/"))) {
        return None;
    }
    [Role::Partner, Role::Admin, Role::Superuser]
        .into_iter()
        .find(|role| has_prefix(path, role.home_prefix()))
}

fn has_prefix(path: &str, prefix: &str) -> bool {
    path == prefix || path.starts_with(&format!("{prefix}/"))
}
