//! Caller identity as seen by the business modules.
//!
//! The HTTP middleware authenticates the request, resolves the caller's
//! role, and injects an [`Actor`] into the request extensions. Handlers
//! thread it explicitly into every service call — there is no ambient
//! request context.

use serde::{Deserialize, Serialize};

/// Coarse permission tier.
///
/// The variants are declared in ascending order so the derived `Ord`
/// gives `User < Admin < Root`. Comparisons like `role >= Role::Admin`
/// are the only way tiers are checked — never string comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    User,
    Admin,
    Root,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "User",
            Self::Admin => "Admin",
            Self::Root => "Root",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "User" => Some(Self::User),
            "Admin" => Some(Self::Admin),
            "Root" => Some(Self::Root),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated caller: identity id plus resolved role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}
