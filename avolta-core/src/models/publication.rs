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
use std::fmt;
use std::str::FromStr;

use crate::auth::Principal;
use crate::clock;
use crate::error::{DomainError, DomainResult};
use crate::models::comment::Comment;
use crate::models::role::Role;
use crate::validation;

pub const MAX_TITLE_LENGTH: usize = 255;
pub const MAX_CATEGORY_LENGTH: usize = 50;
pub const MAX_CONTENT_LENGTH: usize = 100_000;
pub const MAX_CAPTION_LENGTH: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicationStatus {
    Pending,   // Waiting for a superadmin decision
    Published, // Visible while inside its validity window
    Rejected,  // Terminal, kept for the author's record
}

impl PublicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublicationStatus::Pending => "pending",
            PublicationStatus::Published => "published",
            PublicationStatus::Rejected => "rejected",
        }
    }

    /// Status a freshly created publication starts in
    pub fn initial_for(role: Role) -> Self {
        match role {
            Role::SuperAdmin => PublicationStatus::Published,
            Role::Admin => PublicationStatus::Pending,
        }
    }
}

impl fmt::Display for PublicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(PublicationStatus::Pending),
            "published" => Ok(PublicationStatus::Published),
            "rejected" => Ok(PublicationStatus::Rejected),
            other => Err(format!("Unknown publication status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Publication {
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub category: String,
    pub valid_from: DateTime<Utc>,
    pub valid_to: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub likes: i64,
    pub comments: Vec<Comment>,
    pub images: Vec<PublicationImage>,
    pub status: PublicationStatus,
    pub author_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub rejection_reason: Option<String>,
    pub rejected_at: Option<DateTime<Utc>>,
}

/// Gallery entry shown below the cover image, ordered by `display_order`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicationImage {
    #[serde(default)]
    pub id: Option<i64>,
    pub image_url: String,
    #[serde(default)]
    pub display_order: i32,
    #[serde(default)]
    pub caption: Option<String>,
}

impl PublicationImage {
    pub fn new(image_url: impl Into<String>, display_order: i32) -> Self {
        Self {
            id: None,
            image_url: image_url.into(),
            display_order,
            caption: None,
        }
    }
}

/// Creation payload as submitted by the admin UI.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewPublication {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub image_url: Option<String>,
    pub category: String,
    #[serde(deserialize_with = "window::deserialize_start")]
    pub valid_from: DateTime<Utc>,
    #[serde(deserialize_with = "window::deserialize_end")]
    pub valid_to: DateTime<Utc>,
    #[serde(default)]
    pub images: Vec<PublicationImage>,
    /// Hint for the notification collaborator; ignored by the lifecycle rules
    #[serde(default)]
    pub send_newsletter: bool,
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub author_email: Option<String>,
}

/// Partial update. Absent fields are left untouched; status is never patched.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicationPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "window::deserialize_start_opt")]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "window::deserialize_end_opt")]
    pub valid_to: Option<DateTime<Utc>>,
    /// Replaces the whole gallery when present
    #[serde(default)]
    pub images: Option<Vec<PublicationImage>>,
}

impl Publication {
    /// Build a publication authored by `author`.
    ///
    /// Superadmin authors publish immediately, admins go through moderation.
    /// Author name/email overrides are only honoured for superadmins.
    pub fn create(input: NewPublication, author: &Principal) -> DomainResult<Self> {
        Self::validate_fields(
            &input.title,
            &input.content,
            &input.category,
            input.image_url.as_deref(),
        )?;
        Self::validate_window(input.valid_from, input.valid_to)?;
        let images = normalize_gallery(input.images)?;

        let has_override = input.author_name.is_some() || input.author_email.is_some();
        if has_override && !author.is_superadmin() {
            return Err(DomainError::forbidden(
                "Only a superadmin may set the author on behalf of someone else",
            ));
        }

        let author_name = match input.author_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => author.display_name().to_string(),
        };
        let author_email = match input.author_email {
            Some(email) => {
                validation::validate_email(&email).map_err(DomainError::Validation)?;
                email
            }
            None => author.email.clone(),
        };

        let now = clock::now();
        Ok(Self {
            id: None,
            title: input.title.trim().to_string(),
            content: input.content,
            image_url: normalize_image_url(input.image_url),
            category: input.category.trim().to_lowercase(),
            valid_from: clock::truncate(input.valid_from),
            valid_to: clock::truncate(input.valid_to),
            created_at: now,
            updated_at: now,
            likes: 0,
            comments: Vec::new(),
            images,
            status: PublicationStatus::initial_for(author.role),
            author_id: author.id,
            author_name,
            author_email,
            rejection_reason: None,
            rejected_at: None,
        })
    }

    /// Apply a partial edit. The validity window is re-checked after merging.
    pub fn apply_patch(&mut self, patch: PublicationPatch) -> DomainResult<()> {
        let title = patch.title.unwrap_or_else(|| self.title.clone());
        let content = patch.content.unwrap_or_else(|| self.content.clone());
        let category = patch.category.unwrap_or_else(|| self.category.clone());
        let image_url = match patch.image_url {
            Some(url) => normalize_image_url(Some(url)),
            None => self.image_url.clone(),
        };
        let valid_from = patch.valid_from.map_or(self.valid_from, clock::truncate);
        let valid_to = patch.valid_to.map_or(self.valid_to, clock::truncate);

        Self::validate_fields(&title, &content, &category, image_url.as_deref())?;
        Self::validate_window(valid_from, valid_to)?;
        let images = patch.images.map(normalize_gallery).transpose()?;

        self.title = title.trim().to_string();
        self.content = content;
        self.category = category.trim().to_lowercase();
        self.image_url = image_url;
        self.valid_from = valid_from;
        self.valid_to = valid_to;
        if let Some(images) = images {
            self.images = images;
        }
        self.updated_at = clock::now();
        Ok(())
    }

    pub fn validate_window(valid_from: DateTime<Utc>, valid_to: DateTime<Utc>) -> DomainResult<()> {
        if valid_from > valid_to {
            return Err(DomainError::validation(
                "validFrom must not be after validTo",
            ));
        }
        Ok(())
    }

    fn validate_fields(
        title: &str,
        content: &str,
        category: &str,
        image_url: Option<&str>,
    ) -> DomainResult<()> {
        validation::require_text("Title", title, MAX_TITLE_LENGTH)
            .and_then(|_| validation::require_text("Content", content, MAX_CONTENT_LENGTH))
            .and_then(|_| validation::require_text("Category", category, MAX_CATEGORY_LENGTH))
            .map_err(DomainError::Validation)?;

        if let Some(url) = image_url.map(str::trim).filter(|u| !u.is_empty()) {
            validation::validate_image_url(url).map_err(DomainError::Validation)?;
        }
        Ok(())
    }

    /// Published and `now` within `[valid_from, valid_to]`, bounds inclusive
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        self.status == PublicationStatus::Published
            && self.valid_from <= now
            && now <= self.valid_to
    }

    pub fn is_visible(&self) -> bool {
        self.is_visible_at(Utc::now())
    }

    /// Authors may edit or delete their own publications; superadmins any.
    pub fn can_be_modified_by(&self, actor: &Principal) -> bool {
        actor.is_superadmin() || actor.id == self.author_id
    }

    pub fn ensure_pending(&self) -> DomainResult<()> {
        if self.status != PublicationStatus::Pending {
            return Err(DomainError::conflict(format!(
                "Publication is {}, not pending",
                self.status
            )));
        }
        Ok(())
    }
}

fn normalize_image_url(image_url: Option<String>) -> Option<String> {
    image_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}

/// Validate gallery entries and sort them by display order.
///
/// Ties keep their submitted order. Ids are dropped: a gallery is always
/// stored as a fresh set of rows.
fn normalize_gallery(images: Vec<PublicationImage>) -> DomainResult<Vec<PublicationImage>> {
    let mut gallery = Vec::with_capacity(images.len());
    for image in images {
        let image_url = image.image_url.trim().to_string();
        if image_url.is_empty() {
            return Err(DomainError::validation("Gallery image URL cannot be empty"));
        }
        validation::validate_image_url(&image_url).map_err(DomainError::Validation)?;

        let caption = image
            .caption
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        if let Some(caption) = &caption {
            validation::require_text("Caption", caption, MAX_CAPTION_LENGTH)
                .map_err(DomainError::Validation)?;
        }

        gallery.push(PublicationImage {
            id: None,
            image_url,
            display_order: image.display_order,
            caption,
        });
    }
    gallery.sort_by_key(|image| image.display_order);
    Ok(gallery)
}

/// Wire parsing for validity bounds.
///
/// Accepts RFC 3339 instants, `YYYY-MM-DDTHH:MM[:SS]` (taken as UTC) and bare
/// dates. A bare date means the start of that day for `validFrom` and the last
/// second of that day for `validTo`.
pub mod window {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
    use serde::{Deserialize, Deserializer};

    use crate::clock;

    pub fn parse_bound(value: &str, end_of_day: bool) -> Result<DateTime<Utc>, String> {
        let value = value.trim();

        if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
            return Ok(clock::truncate(instant.with_timezone(&Utc)));
        }

        for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
                return Ok(naive.and_utc());
            }
        }

        let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date: {}", value))?;
        let time = if end_of_day {
            NaiveTime::from_hms_opt(23, 59, 59)
        } else {
            NaiveTime::from_hms_opt(0, 0, 0)
        }
        .ok_or_else(|| "Invalid time of day".to_string())?;

        Ok(date.and_time(time).and_utc())
    }

    pub fn deserialize_start<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_bound(&raw, false).map_err(serde::de::Error::custom)
    }

    pub fn deserialize_end<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_bound(&raw, true).map_err(serde::de::Error::custom)
    }

    pub fn deserialize_start_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_bound(&raw, false).map_err(serde::de::Error::custom))
            .transpose()
    }

    pub fn deserialize_end_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| parse_bound(&raw, true).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Timelike};
    use pretty_assertions::assert_eq;

    fn admin() -> Principal {
        Principal::new(2, "jane.doe@avolta.be", Role::Admin)
    }

    fn superadmin() -> Principal {
        Principal::new(1, "superadmin@avolta.be", Role::SuperAdmin)
    }

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn input(valid_from: DateTime<Utc>, valid_to: DateTime<Utc>) -> NewPublication {
        NewPublication {
            title: "New store at Brussels Airport".to_string(),
            content: "We are opening a new duty-free store.".to_string(),
            image_url: Some("https://cdn.avolta.be/store.jpg".to_string()),
            category: "News".to_string(),
            valid_from,
            valid_to,
            images: Vec::new(),
            send_newsletter: false,
            author_name: None,
            author_email: None,
        }
    }

    #[test]
    fn test_admin_publication_starts_pending() {
        let publication =
            Publication::create(input(utc(2024, 1, 1), utc(2024, 1, 31)), &admin()).unwrap();

        assert_eq!(publication.status, PublicationStatus::Pending);
        assert_eq!(publication.author_id, 2);
        assert_eq!(publication.author_name, "jane.doe");
        assert_eq!(publication.author_email, "jane.doe@avolta.be");
        assert_eq!(publication.likes, 0);
        assert!(publication.comments.is_empty());
        assert_eq!(publication.category, "news");
    }

    #[test]
    fn test_superadmin_publication_is_published() {
        let publication =
            Publication::create(input(utc(2024, 1, 1), utc(2024, 1, 31)), &superadmin()).unwrap();
        assert_eq!(publication.status, PublicationStatus::Published);
    }

    #[test]
    fn test_initial_status_for_role() {
        assert_eq!(
            PublicationStatus::initial_for(Role::Admin),
            PublicationStatus::Pending
        );
        assert_eq!(
            PublicationStatus::initial_for(Role::SuperAdmin),
            PublicationStatus::Published
        );
    }

    #[test]
    fn test_inverted_window_rejected() {
        let result = Publication::create(input(utc(2024, 2, 1), utc(2024, 1, 1)), &superadmin());
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }

    #[test]
    fn test_single_instant_window_allowed() {
        let at = utc(2024, 1, 1);
        assert!(Publication::create(input(at, at), &admin()).is_ok());
    }

    #[test]
    fn test_missing_title_rejected() {
        let mut payload = input(utc(2024, 1, 1), utc(2024, 1, 31));
        payload.title = "   ".to_string();
        let err = Publication::create(payload, &admin()).unwrap_err();
        assert_eq!(err, DomainError::validation("Title cannot be empty"));
    }

    #[test]
    fn test_invalid_image_url_rejected() {
        let mut payload = input(utc(2024, 1, 1), utc(2024, 1, 31));
        payload.image_url = Some("ftp://files.example.com/a.jpg".to_string());
        assert!(matches!(
            Publication::create(payload, &admin()),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_blank_image_url_is_dropped() {
        let mut payload = input(utc(2024, 1, 1), utc(2024, 1, 31));
        payload.image_url = Some("  ".to_string());
        let publication = Publication::create(payload, &admin()).unwrap();
        assert_eq!(publication.image_url, None);
    }

    #[test]
    fn test_author_override_requires_superadmin() {
        let mut payload = input(utc(2024, 1, 1), utc(2024, 1, 31));
        payload.author_name = Some("Communication team".to_string());
        payload.author_email = Some("press@avolta.be".to_string());

        let err = Publication::create(payload.clone(), &admin()).unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let publication = Publication::create(payload, &superadmin()).unwrap();
        assert_eq!(publication.author_name, "Communication team");
        assert_eq!(publication.author_email, "press@avolta.be");
        assert_eq!(publication.author_id, 1);
    }

    #[test]
    fn test_visibility_window() {
        let publication =
            Publication::create(input(utc(2024, 1, 1), utc(2024, 1, 31)), &superadmin()).unwrap();

        assert!(publication.is_visible_at(utc(2024, 1, 15)));
        assert!(publication.is_visible_at(utc(2024, 1, 1)));
        assert!(publication.is_visible_at(utc(2024, 1, 31)));
        assert!(!publication.is_visible_at(utc(2024, 1, 31) + Duration::seconds(1)));
        assert!(!publication.is_visible_at(utc(2024, 2, 1)));
        assert!(!publication.is_visible_at(utc(2023, 12, 31)));
    }

    #[test]
    fn test_pending_is_never_visible() {
        let publication =
            Publication::create(input(utc(2024, 1, 1), utc(2024, 1, 31)), &admin()).unwrap();
        assert!(!publication.is_visible_at(utc(2024, 1, 15)));
    }

    #[test]
    fn test_can_be_modified_by() {
        let publication =
            Publication::create(input(utc(2024, 1, 1), utc(2024, 1, 31)), &admin()).unwrap();
        let other_admin = Principal::new(3, "other@avolta.be", Role::Admin);

        assert!(publication.can_be_modified_by(&admin()));
        assert!(publication.can_be_modified_by(&superadmin()));
        assert!(!publication.can_be_modified_by(&other_admin));
    }

    #[test]
    fn test_apply_patch() {
        let mut publication =
            Publication::create(input(utc(2024, 1, 1), utc(2024, 1, 31)), &admin()).unwrap();

        publication
            .apply_patch(PublicationPatch {
                title: Some("Updated title".to_string()),
                valid_to: Some(utc(2024, 3, 1)),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(publication.title, "Updated title");
        assert_eq!(publication.valid_to, utc(2024, 3, 1));
        assert_eq!(publication.status, PublicationStatus::Pending);
        assert_eq!(publication.content, "We are opening a new duty-free store.");
    }

    #[test]
    fn test_apply_patch_rechecks_window() {
        let mut publication =
            Publication::create(input(utc(2024, 1, 10), utc(2024, 1, 31)), &admin()).unwrap();
        let before = publication.clone();

        let result = publication.apply_patch(PublicationPatch {
            valid_to: Some(utc(2024, 1, 5)),
            ..Default::default()
        });

        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(publication, before);
    }

    #[test]
    fn test_gallery_is_validated_and_ordered() {
        let mut payload = input(utc(2024, 1, 1), utc(2024, 1, 31));
        payload.images = vec![
            PublicationImage {
                id: Some(99),
                image_url: " https://cdn.avolta.be/b.jpg ".to_string(),
                display_order: 2,
                caption: Some("  ".to_string()),
            },
            PublicationImage {
                caption: Some("Terminal A".to_string()),
                ..PublicationImage::new("/api/uploads/a.jpg", 1)
            },
        ];

        let publication = Publication::create(payload, &admin()).unwrap();
        let urls: Vec<&str> = publication
            .images
            .iter()
            .map(|i| i.image_url.as_str())
            .collect();
        assert_eq!(urls, vec!["/api/uploads/a.jpg", "https://cdn.avolta.be/b.jpg"]);
        assert_eq!(publication.images[0].caption.as_deref(), Some("Terminal A"));
        assert_eq!(publication.images[1].caption, None);
        assert!(publication.images.iter().all(|i| i.id.is_none()));
    }

    #[test]
    fn test_gallery_rejects_bad_urls() {
        for url in ["", "javascript:alert(1)"] {
            let mut payload = input(utc(2024, 1, 1), utc(2024, 1, 31));
            payload.images = vec![PublicationImage::new(url, 0)];
            assert!(
                matches!(
                    Publication::create(payload, &admin()),
                    Err(DomainError::Validation(_))
                ),
                "url {:?}",
                url
            );
        }
    }

    #[test]
    fn test_patch_replaces_gallery_only_when_present() {
        let mut payload = input(utc(2024, 1, 1), utc(2024, 1, 31));
        payload.images = vec![PublicationImage::new("/a.jpg", 0)];
        let mut publication = Publication::create(payload, &admin()).unwrap();

        publication
            .apply_patch(PublicationPatch {
                title: Some("Renamed".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(publication.images.len(), 1);

        publication
            .apply_patch(PublicationPatch {
                images: Some(vec![
                    PublicationImage::new("/c.jpg", 5),
                    PublicationImage::new("/b.jpg", 3),
                ]),
                ..Default::default()
            })
            .unwrap();
        let urls: Vec<&str> = publication
            .images
            .iter()
            .map(|i| i.image_url.as_str())
            .collect();
        assert_eq!(urls, vec!["/b.jpg", "/c.jpg"]);

        publication
            .apply_patch(PublicationPatch {
                images: Some(Vec::new()),
                ..Default::default()
            })
            .unwrap();
        assert!(publication.images.is_empty());
    }

    #[test]
    fn test_ensure_pending() {
        let pending =
            Publication::create(input(utc(2024, 1, 1), utc(2024, 1, 31)), &admin()).unwrap();
        assert!(pending.ensure_pending().is_ok());

        let published =
            Publication::create(input(utc(2024, 1, 1), utc(2024, 1, 31)), &superadmin()).unwrap();
        assert!(matches!(
            published.ensure_pending(),
            Err(DomainError::Conflict(_))
        ));
    }

    #[test]
    fn test_status_parse() {
        assert_eq!(
            "PUBLISHED".parse::<PublicationStatus>().unwrap(),
            PublicationStatus::Published
        );
        assert_eq!(
            "rejected".parse::<PublicationStatus>().unwrap(),
            PublicationStatus::Rejected
        );
        assert!("draft".parse::<PublicationStatus>().is_err());
    }

    #[test]
    fn test_parse_bound_formats() {
        assert_eq!(
            window::parse_bound("2024-01-01", false).unwrap(),
            utc(2024, 1, 1)
        );
        assert_eq!(
            window::parse_bound("2024-01-31", true).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap()
        );
        assert_eq!(
            window::parse_bound("2024-01-01T10:30", false).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 10, 30, 0).unwrap()
        );
        assert_eq!(
            window::parse_bound("2024-01-01T10:30:00+01:00", false).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap()
        );
        assert!(window::parse_bound("01/02/2024", false).is_err());
    }

    #[test]
    fn test_create_keeps_microsecond_precision() {
        let from = utc(2024, 1, 1).with_nanosecond(123_456_789).unwrap();
        let publication = Publication::create(input(from, utc(2024, 1, 31)), &admin()).unwrap();

        assert_eq!(publication.valid_from.nanosecond(), 123_456_000);
        assert_eq!(publication.created_at.nanosecond() % 1_000, 0);

        let mut patched = publication.clone();
        patched
            .apply_patch(PublicationPatch {
                valid_to: Some(utc(2024, 2, 1).with_nanosecond(999_999_999).unwrap()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(patched.valid_to.nanosecond(), 999_999_000);
    }

    #[test]
    fn test_parse_bound_truncates_to_microseconds() {
        let parsed = window::parse_bound("2024-01-01T00:00:00.123456789Z", false).unwrap();
        assert_eq!(parsed.nanosecond(), 123_456_000);
    }

    #[test]
    fn test_new_publication_from_json() {
        let json = r#"{
            "title": "Summer event",
            "content": "Join us",
            "category": "events",
            "validFrom": "2024-06-01",
            "validTo": "2024-06-30",
            "sendNewsletter": true
        }"#;
        let payload: NewPublication = serde_json::from_str(json).unwrap();

        assert_eq!(payload.valid_from, utc(2024, 6, 1));
        assert_eq!(
            payload.valid_to,
            Utc.with_ymd_and_hms(2024, 6, 30, 23, 59, 59).unwrap()
        );
        assert!(payload.send_newsletter);
        assert!(payload.image_url.is_none());
        assert!(payload.images.is_empty());
    }

    #[test]
    fn test_gallery_from_json() {
        let json = r#"{
            "title": "Summer event",
            "content": "Join us",
            "category": "events",
            "validFrom": "2024-06-01",
            "validTo": "2024-06-30",
            "images": [
                {"imageUrl": "/api/uploads/stage.jpg", "displayOrder": 1, "caption": "Main stage"},
                {"imageUrl": "/api/uploads/crowd.jpg"}
            ]
        }"#;
        let payload: NewPublication = serde_json::from_str(json).unwrap();

        assert_eq!(payload.images.len(), 2);
        assert_eq!(payload.images[0].caption.as_deref(), Some("Main stage"));
        assert_eq!(payload.images[1].display_order, 0);

        let patch: PublicationPatch = serde_json::from_str(r#"{"images": []}"#).unwrap();
        assert_eq!(patch.images, Some(Vec::new()));
    }

    #[test]
    fn test_patch_from_json() {
        let json = r#"{"title": "Renamed", "validFrom": "2024-02-01T08:00:00Z"}"#;
        let patch: PublicationPatch = serde_json::from_str(json).unwrap();

        assert_eq!(patch.title.as_deref(), Some("Renamed"));
        assert_eq!(
            patch.valid_from,
            Some(Utc.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap())
        );
        assert!(patch.valid_to.is_none());
        assert!(patch.images.is_none());
    }
}
