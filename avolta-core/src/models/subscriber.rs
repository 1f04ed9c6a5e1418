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
use std::str::FromStr;

use crate::clock;
use crate::error::{DomainError, DomainResult};
use crate::validation;

pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    pub id: Option<i64>,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub confirmed: bool,
    pub last_sent_at: Option<DateTime<Utc>>,
}

impl NewsletterSubscriber {
    /// New subscribers are confirmed straight away; there is no double opt-in.
    pub fn new(
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> DomainResult<Self> {
        let email = email.trim();
        validation::validate_email(email).map_err(DomainError::Validation)?;

        Ok(Self {
            id: None,
            email: email.to_string(),
            first_name: clean_name("First name", first_name)?,
            last_name: clean_name("Last name", last_name)?,
            created_at: clock::now(),
            confirmed: true,
            last_sent_at: None,
        })
    }

    pub fn status_label(&self) -> &'static str {
        if self.confirmed {
            "subscribed"
        } else {
            "unsubscribed"
        }
    }
}

fn clean_name(field: &str, value: Option<&str>) -> DomainResult<Option<String>> {
    match value.map(str::trim) {
        Some(name) if !name.is_empty() => {
            if name.chars().count() > MAX_NAME_LENGTH {
                return Err(DomainError::validation(format!(
                    "{} cannot exceed {} characters",
                    field, MAX_NAME_LENGTH
                )));
            }
            Ok(Some(name.to_string()))
        }
        _ => Ok(None),
    }
}

/// Admin list filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberFilter {
    #[default]
    All,
    Confirmed,
    Unconfirmed,
}

impl SubscriberFilter {
    pub fn matches(&self, subscriber: &NewsletterSubscriber) -> bool {
        match self {
            SubscriberFilter::All => true,
            SubscriberFilter::Confirmed => subscriber.confirmed,
            SubscriberFilter::Unconfirmed => !subscriber.confirmed,
        }
    }
}

impl FromStr for SubscriberFilter {
    type Err = String;

    // The admin screens call these "subscribed"/"unsubscribed".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(SubscriberFilter::All),
            "confirmed" | "subscribed" => Ok(SubscriberFilter::Confirmed),
            "unconfirmed" | "unsubscribed" => Ok(SubscriberFilter::Unconfirmed),
            other => Err(format!("Unknown subscriber filter: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_subscriber() {
        let subscriber =
            NewsletterSubscriber::new(" alice@example.com ", Some("Alice"), Some("  ")).unwrap();

        assert_eq!(subscriber.email, "alice@example.com");
        assert_eq!(subscriber.first_name.as_deref(), Some("Alice"));
        assert_eq!(subscriber.last_name, None);
        assert!(subscriber.confirmed);
        assert!(subscriber.last_sent_at.is_none());
        assert_eq!(subscriber.status_label(), "subscribed");
    }

    #[test]
    fn test_invalid_email_rejected() {
        let err = NewsletterSubscriber::new("alice", None, None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn test_long_name_rejected() {
        let name = "x".repeat(MAX_NAME_LENGTH + 1);
        assert!(NewsletterSubscriber::new("alice@example.com", Some(&name), None).is_err());
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("all".parse::<SubscriberFilter>().unwrap(), SubscriberFilter::All);
        assert_eq!("".parse::<SubscriberFilter>().unwrap(), SubscriberFilter::All);
        assert_eq!(
            "Confirmed".parse::<SubscriberFilter>().unwrap(),
            SubscriberFilter::Confirmed
        );
        assert_eq!(
            "subscribed".parse::<SubscriberFilter>().unwrap(),
            SubscriberFilter::Confirmed
        );
        assert_eq!(
            "unsubscribed".parse::<SubscriberFilter>().unwrap(),
            SubscriberFilter::Unconfirmed
        );
        assert!("pending".parse::<SubscriberFilter>().is_err());
    }

    #[test]
    fn test_filter_matches() {
        let mut subscriber = NewsletterSubscriber::new("alice@example.com", None, None).unwrap();
        assert!(SubscriberFilter::All.matches(&subscriber));
        assert!(SubscriberFilter::Confirmed.matches(&subscriber));
        assert!(!SubscriberFilter::Unconfirmed.matches(&subscriber));

        subscriber.confirmed = false;
        assert!(SubscriberFilter::Unconfirmed.matches(&subscriber));
        assert_eq!(subscriber.status_label(), "unsubscribed");
    }
}
