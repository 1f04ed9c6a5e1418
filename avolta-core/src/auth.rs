// Avolta Publications - content backend for the Avolta corporate website
// Copyright (C) 2025 Avolta Web Team
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Authorization gate.
//!
//! The current principal is an explicit value handed to every check; nothing
//! here reads ambient session state. Role strings are parsed into [`Role`]
//! once, when the principal is built, and compared as enum values afterwards.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::models::role::{Role, UserStatus};
use crate::models::user::User;

/// The authenticated caller of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: i64,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
}

impl Principal {
    pub fn new(id: i64, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            email: email.into(),
            role,
            status: UserStatus::Active,
        }
    }

    /// Build a principal from a stored user. Users that were never persisted
    /// cannot act.
    pub fn from_user(user: &User) -> Option<Self> {
        Some(Self {
            id: user.id?,
            email: user.email.clone(),
            role: user.role,
            status: user.status,
        })
    }

    pub fn is_superadmin(&self) -> bool {
        self.role == Role::SuperAdmin
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.status.is_active() && self.role.has_permission(role)
    }

    /// Display name derived from the email local part
    pub fn display_name(&self) -> &str {
        self.email.split('@').next().unwrap_or(&self.email)
    }

    /// Fail with `Forbidden` unless the principal holds `role`
    pub fn require(&self, role: Role) -> Result<(), DomainError> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(DomainError::forbidden(format!("{} role required", role)))
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenyReason {
    NotAuthenticated,
    InsufficientRole,
}

impl DenyReason {
    pub fn message(&self) -> &'static str {
        match self {
            DenyReason::NotAuthenticated => "Authentication required",
            DenyReason::InsufficientRole => "Insufficient role",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

pub fn is_authenticated(principal: Option<&Principal>) -> bool {
    principal.is_some_and(|p| p.status.is_active())
}

pub fn has_role(principal: Option<&Principal>, role: Role) -> bool {
    principal.is_some_and(|p| p.has_role(role))
}

/// Allow when there is an active principal and, if a role is required, the
/// principal holds it.
pub fn authorize(principal: Option<&Principal>, required: Option<Role>) -> Decision {
    if !is_authenticated(principal) {
        return Decision::Deny(DenyReason::NotAuthenticated);
    }

    match required {
        Some(role) if !has_role(principal, role) => Decision::Deny(DenyReason::InsufficientRole),
        _ => Decision::Allow,
    }
}
