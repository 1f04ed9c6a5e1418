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

use async_trait::async_trait;
use avolta_core::models::{NewsletterSubscriber, Publication};

/// Outbound newsletter delivery.
///
/// The application only decides who should receive what; transport is up to
/// the implementation.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_publication(
        &self,
        publication: &Publication,
        recipients: &[NewsletterSubscriber],
    ) -> anyhow::Result<()>;

    async fn send_test(&self, email: &str) -> anyhow::Result<()>;
}

/// Writes deliveries to the log instead of sending mail
#[derive(Debug, Default, Clone)]
pub struct LogNotificationSender;

#[async_trait]
impl NotificationSender for LogNotificationSender {
    async fn send_publication(
        &self,
        publication: &Publication,
        recipients: &[NewsletterSubscriber],
    ) -> anyhow::Result<()> {
        tracing::info!(
            publication_id = ?publication.id,
            title = %publication.title,
            recipients = recipients.len(),
            "Newsletter dispatched"
        );
        for recipient in recipients {
            tracing::debug!(email = %recipient.email, "Newsletter recipient");
        }
        Ok(())
    }

    async fn send_test(&self, email: &str) -> anyhow::Result<()> {
        tracing::info!(email = %email, "Test newsletter dispatched");
        Ok(())
    }
}
