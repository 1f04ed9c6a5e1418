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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::clock;
use crate::error::{DomainError, DomainResult};

/// Display name used when a commenter does not identify themselves
pub const ANONYMOUS_AUTHOR: &str = "Anonymous User";

pub const MAX_COMMENT_LENGTH: usize = 2000;
pub const MAX_AUTHOR_LENGTH: usize = 100;

/// A public comment. Comments are append-only and belong to exactly one
/// publication; they are removed together with it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Option<i64>,
    #[serde(skip)]
    pub publication_id: i64,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Build a validated comment. Content is trimmed; a blank or missing
    /// author falls back to [`ANONYMOUS_AUTHOR`].
    pub fn new(publication_id: i64, content: &str, author: Option<&str>) -> DomainResult<Self> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::validation("Comment cannot be empty"));
        }
        if content.chars().count() > MAX_COMMENT_LENGTH {
            return Err(DomainError::validation(format!(
                "Comment cannot exceed {} characters",
                MAX_COMMENT_LENGTH
            )));
        }

        let author = match author.map(str::trim) {
            Some(name) if !name.is_empty() => {
                if name.chars().count() > MAX_AUTHOR_LENGTH {
                    return Err(DomainError::validation(format!(
                        "Author name cannot exceed {} characters",
                        MAX_AUTHOR_LENGTH
                    )));
                }
                name.to_string()
            }
            _ => ANONYMOUS_AUTHOR.to_string(),
        };

        Ok(Self {
            id: None,
            publication_id,
            content: content.to_string(),
            author,
            created_at: clock::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_comment_defaults_author() {
        let comment = Comment::new(3, "  Great news!  ", None).unwrap();
        assert_eq!(comment.publication_id, 3);
        assert_eq!(comment.content, "Great news!");
        assert_eq!(comment.author, ANONYMOUS_AUTHOR);
        assert!(comment.id.is_none());
    }

    #[test]
    fn test_blank_author_is_anonymous() {
        let comment = Comment::new(3, "Nice", Some("   ")).unwrap();
        assert_eq!(comment.author, ANONYMOUS_AUTHOR);
    }

    #[test]
    fn test_named_author() {
        let comment = Comment::new(3, "Nice", Some(" Marie ")).unwrap();
        assert_eq!(comment.author, "Marie");
    }

    #[test]
    fn test_empty_comment_rejected() {
        let err = Comment::new(3, " \n ", None).unwrap_err();
        assert_eq!(err, DomainError::validation("Comment cannot be empty"));
    }

    #[test]
    fn test_too_long_comment_rejected() {
        let content = "x".repeat(MAX_COMMENT_LENGTH + 1);
        assert!(matches!(
            Comment::new(3, &content, None),
            Err(DomainError::Validation(_))
        ));
    }
}
