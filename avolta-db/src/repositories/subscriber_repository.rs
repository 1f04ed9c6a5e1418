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

use anyhow::{Context, Result};
use avolta_core::models::NewsletterSubscriber;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::timestamps::{from_db, from_db_opt, to_db, to_db_opt};

type SubscriberRow = (
    i64,
    String,
    Option<String>,
    Option<String>,
    String,
    bool,
    Option<String>,
);

const SUBSCRIBER_COLUMNS: &str =
    "id, email, first_name, last_name, created_at, confirmed, last_sent_at";

pub struct SubscriberRepository {
    pool: SqlitePool,
}

impl SubscriberRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, subscriber: &NewsletterSubscriber) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO newsletter_subscribers
                (email, first_name, last_name, created_at, confirmed, last_sent_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&subscriber.email)
        .bind(&subscriber.first_name)
        .bind(&subscriber.last_name)
        .bind(to_db(&subscriber.created_at))
        .bind(subscriber.confirmed)
        .bind(to_db_opt(&subscriber.last_sent_at))
        .execute(&self.pool)
        .await
        .context("Failed to create subscriber")?;

        Ok(result.last_insert_rowid())
    }

    /// Insert unless the email is already registered.
    ///
    /// Returns the new id, or None when another row holds the email. The
    /// check and the insert are one statement, so concurrent registrations of
    /// the same address cannot both insert.
    pub async fn insert_if_absent(&self, subscriber: &NewsletterSubscriber) -> Result<Option<i64>> {
        let id: Option<(i64,)> = sqlx::query_as(
            r#"
            INSERT INTO newsletter_subscribers
                (email, first_name, last_name, created_at, confirmed, last_sent_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(email) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(&subscriber.email)
        .bind(&subscriber.first_name)
        .bind(&subscriber.last_name)
        .bind(to_db(&subscriber.created_at))
        .bind(subscriber.confirmed)
        .bind(to_db_opt(&subscriber.last_sent_at))
        .fetch_optional(&self.pool)
        .await
        .context("Failed to register subscriber")?;

        Ok(id.map(|(id,)| id))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<NewsletterSubscriber>> {
        let row = sqlx::query_as::<_, SubscriberRow>(&format!(
            "SELECT {} FROM newsletter_subscribers WHERE id = ?",
            SUBSCRIBER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find subscriber by id")?;

        row.map(row_to_subscriber).transpose()
    }

    /// Exact, case-sensitive match
    pub async fn find_by_email(&self, email: &str) -> Result<Option<NewsletterSubscriber>> {
        let row = sqlx::query_as::<_, SubscriberRow>(&format!(
            "SELECT {} FROM newsletter_subscribers WHERE email = ?",
            SUBSCRIBER_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find subscriber by email")?;

        row.map(row_to_subscriber).transpose()
    }

    /// All subscribers in signup order
    pub async fn list(&self) -> Result<Vec<NewsletterSubscriber>> {
        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            "SELECT {} FROM newsletter_subscribers ORDER BY created_at ASC, id ASC",
            SUBSCRIBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list subscribers")?;

        rows.into_iter().map(row_to_subscriber).collect()
    }

    pub async fn list_confirmed(&self) -> Result<Vec<NewsletterSubscriber>> {
        let rows = sqlx::query_as::<_, SubscriberRow>(&format!(
            "SELECT {} FROM newsletter_subscribers WHERE confirmed = 1 ORDER BY created_at ASC, id ASC",
            SUBSCRIBER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list confirmed subscribers")?;

        rows.into_iter().map(row_to_subscriber).collect()
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM newsletter_subscribers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete subscriber")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Subscriber not found"));
        }

        Ok(())
    }

    /// Remove by exact email. Returns false when nobody matched.
    pub async fn delete_by_email(&self, email: &str) -> Result<bool> {
        let rows_affected = sqlx::query("DELETE FROM newsletter_subscribers WHERE email = ?")
            .bind(email)
            .execute(&self.pool)
            .await
            .context("Failed to unsubscribe")?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Stamp `last_sent_at` on the given subscribers in one transaction
    pub async fn mark_sent(&self, ids: &[i64], sent_at: DateTime<Utc>) -> Result<u64> {
        let sent_at = to_db(&sent_at);
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to start transaction")?;

        let mut updated = 0;
        for &id in ids {
            updated += sqlx::query("UPDATE newsletter_subscribers SET last_sent_at = ? WHERE id = ?")
                .bind(&sent_at)
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("Failed to record newsletter delivery")?
                .rows_affected();
        }

        tx.commit().await.context("Failed to commit transaction")?;
        Ok(updated)
    }
}

fn row_to_subscriber(row: SubscriberRow) -> Result<NewsletterSubscriber> {
    let (id, email, first_name, last_name, created_at, confirmed, last_sent_at) = row;

    Ok(NewsletterSubscriber {
        id: Some(id),
        email,
        first_name,
        last_name,
        created_at: from_db(&created_at, "created_at")?,
        confirmed,
        last_sent_at: from_db_opt(last_sent_at, "last_sent_at")?,
    })
}
