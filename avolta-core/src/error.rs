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

use thiserror::Error;

/// Failure kinds shared by every domain operation.
///
/// Each variant is scoped to the single requested operation; none of them
/// leaves persisted state modified.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed or logically inconsistent input.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The referenced record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The caller lacks the role or ownership required for the mutation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The operation does not apply to the record's current state.
    #[error("Conflict: {0}")]
    Conflict(String),
}

impl DomainError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// Short machine-readable kind, used in API error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "validation",
            DomainError::NotFound(_) => "not_found",
            DomainError::Forbidden(_) => "forbidden",
            DomainError::Conflict(_) => "conflict",
        }
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = DomainError::validation("validFrom must not be after validTo");
        assert_eq!(
            err.to_string(),
            "Validation failed: validFrom must not be after validTo"
        );
    }

    #[test]
    fn test_kind() {
        assert_eq!(DomainError::not_found("x").kind(), "not_found");
        assert_eq!(DomainError::forbidden("x").kind(), "forbidden");
        assert_eq!(DomainError::conflict("x").kind(), "conflict");
        assert_eq!(DomainError::validation("x").kind(), "validation");
    }
}
