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

use std::sync::Arc;

use avolta_core::export::subscribers_to_csv;
use avolta_core::models::{NewsletterSubscriber, Publication, SubscriberFilter};
use avolta_core::{clock, validation, DomainError};
use avolta_db::repositories::SubscriberRepository;
use serde::Serialize;
use sqlx::SqlitePool;

use super::{NotificationSender, ServiceResult};

/// Result of a subscribe call
#[derive(Debug, Clone, Serialize)]
pub struct Subscription {
    pub subscriber: NewsletterSubscriber,
    /// False when the email was already registered
    pub created: bool,
}

pub struct NewsletterService {
    subscribers: SubscriberRepository,
    notifier: Arc<dyn NotificationSender>,
}

impl NewsletterService {
    pub fn new(pool: SqlitePool, notifier: Arc<dyn NotificationSender>) -> Self {
        Self {
            subscribers: SubscriberRepository::new(pool),
            notifier,
        }
    }

    /// Register an email. Subscribing twice returns the stored record untouched.
    pub async fn subscribe(
        &self,
        email: &str,
        first_name: Option<&str>,
        last_name: Option<&str>,
    ) -> ServiceResult<Subscription> {
        let candidate = NewsletterSubscriber::new(email, first_name, last_name)?;

        if let Some(id) = self.subscribers.insert_if_absent(&candidate).await? {
            tracing::info!(subscriber_id = id, "New newsletter subscriber");
            return Ok(Subscription {
                subscriber: NewsletterSubscriber {
                    id: Some(id),
                    ..candidate
                },
                created: true,
            });
        }

        let existing = self
            .subscribers
            .find_by_email(&candidate.email)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Subscriber removed while registering"))?;
        tracing::debug!(email = %existing.email, "Already subscribed");

        Ok(Subscription {
            subscriber: existing,
            created: false,
        })
    }

    pub async fn unsubscribe(&self, email: &str) -> ServiceResult<()> {
        if !self.subscribers.delete_by_email(email.trim()).await? {
            return Err(DomainError::not_found("Subscriber not found").into());
        }
        Ok(())
    }

    pub async fn delete(&self, id: i64) -> ServiceResult<()> {
        if self.subscribers.find_by_id(id).await?.is_none() {
            return Err(DomainError::not_found("Subscriber not found").into());
        }
        self.subscribers.delete(id).await?;
        Ok(())
    }

    /// Subscribers matching `filter`, in signup order
    pub async fn list(&self, filter: SubscriberFilter) -> ServiceResult<Vec<NewsletterSubscriber>> {
        let subscribers = self.subscribers.list().await?;
        Ok(subscribers
            .into_iter()
            .filter(|s| filter.matches(s))
            .collect())
    }

    pub async fn export_csv(&self, filter: SubscriberFilter) -> ServiceResult<String> {
        let subscribers = self.list(filter).await?;
        Ok(subscribers_to_csv(&subscribers))
    }

    /// Send `publication` to every confirmed subscriber and record the delivery.
    ///
    /// Returns the number of recipients.
    pub async fn send_publication(&self, publication: &Publication) -> ServiceResult<usize> {
        let recipients = self.subscribers.list_confirmed().await?;
        if recipients.is_empty() {
            tracing::info!("No confirmed subscribers, newsletter not sent");
            return Ok(0);
        }

        self.notifier
            .send_publication(publication, &recipients)
            .await?;

        let ids: Vec<i64> = recipients.iter().filter_map(|s| s.id).collect();
        self.subscribers.mark_sent(&ids, clock::now()).await?;

        Ok(recipients.len())
    }

    pub async fn send_test(&self, email: &str) -> ServiceResult<()> {
        let email = email.trim();
        validation::validate_email(email).map_err(DomainError::Validation)?;
        self.notifier.send_test(email).await?;
        Ok(())
    }
}
