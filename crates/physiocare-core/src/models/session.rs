//! Session models.

use serde::{Deserialize, Serialize};

/// User role as a closed set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Physio,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Patient => "patient",
            Role::Physio => "physio",
            Role::Admin => "admin",
        }
    }

    /// Parse a backend role string; unknown roles yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "patient" => Some(Role::Patient),
            "physio" => Some(Role::Physio),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Whether this role manages other users' appointments.
    pub fn is_staff(&self) -> bool {
        match self {
            Role::Patient => false,
            Role::Physio | Role::Admin => true,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated identity tuple.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SessionData {
    pub token: Option<String>,
    pub username: Option<String>,
    pub user_id: Option<String>,
    pub role: Option<Role>,
}

impl SessionData {
    /// A session is authenticated iff it carries a non-empty token.
    pub fn is_authenticated(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Token, ignoring empty values.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// User id, ignoring empty values.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|id| !id.is_empty())
    }
}
