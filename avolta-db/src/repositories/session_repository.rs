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
use avolta_core::clock;
use avolta_core::models::session::Session;
use sqlx::SqlitePool;

use crate::timestamps::{from_db, to_db};

pub struct SessionRepository {
    pool: SqlitePool,
}

impl SessionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, session: &Session) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (id, user_id, expires_at, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&session.id)
        .bind(session.user_id)
        .bind(to_db(&session.expires_at))
        .bind(to_db(&session.created_at))
        .execute(&self.pool)
        .await
        .context("Failed to create session")?;

        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Session>> {
        let row = sqlx::query_as::<_, (String, i64, String, String)>(
            r#"
            SELECT id, user_id, expires_at, created_at
            FROM sessions
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find session by id")?;

        match row {
            Some((id, user_id, expires_at, created_at)) => Ok(Some(Session {
                id,
                user_id,
                expires_at: from_db(&expires_at, "expires_at")?,
                created_at: from_db(&created_at, "created_at")?,
            })),
            None => Ok(None),
        }
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let rows_affected = sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete session")?
            .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("Session not found"));
        }

        Ok(())
    }

    /// Log a user out everywhere, e.g. after a password change or deactivation
    pub async fn delete_for_user(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user sessions")?;

        Ok(result.rows_affected())
    }

    pub async fn delete_expired(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(to_db(&clock::now()))
            .execute(&self.pool)
            .await
            .context("Failed to delete expired sessions")?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::connect_in_memory;
    use crate::repositories::UserRepository;
    use avolta_core::models::{Role, User};
    use chrono::Duration;

    async fn create_test_user(pool: &SqlitePool) -> Result<i64> {
        let user = User::new("jane@avolta.be".to_string(), "password", Role::Admin)?;
        UserRepository::new(pool.clone()).create(&user).await
    }

    #[sqlx::test]
    async fn test_create_and_find_session() -> Result<()> {
        let pool = connect_in_memory().await?;
        let user_id = create_test_user(&pool).await?;
        let repo = SessionRepository::new(pool);

        let session = Session::new(user_id);
        repo.create(&session).await?;

        let found = repo.find_by_id(&session.id).await?.unwrap();
        assert_eq!(found.id, session.id);
        assert_eq!(found.user_id, user_id);
        assert_eq!(
            found.expires_at.timestamp_micros(),
            session.expires_at.timestamp_micros()
        );
        assert!(!found.is_expired());

        Ok(())
    }

    #[sqlx::test]
    async fn test_find_by_id_non_existing() -> Result<()> {
        let repo = SessionRepository::new(connect_in_memory().await?);
        assert!(repo.find_by_id("non-existent-session-id").await?.is_none());
        Ok(())
    }

    #[sqlx::test]
    async fn test_create_session_invalid_user_fails() -> Result<()> {
        let repo = SessionRepository::new(connect_in_memory().await?);
        assert!(repo.create(&Session::new(999)).await.is_err());
        Ok(())
    }

    #[sqlx::test]
    async fn test_delete_session() -> Result<()> {
        let pool = connect_in_memory().await?;
        let user_id = create_test_user(&pool).await?;
        let repo = SessionRepository::new(pool);

        let session = Session::new(user_id);
        repo.create(&session).await?;
        repo.delete(&session.id).await?;

        assert!(repo.find_by_id(&session.id).await?.is_none());
        let again = repo.delete(&session.id).await;
        assert!(again.unwrap_err().to_string().contains("Session not found"));

        Ok(())
    }

    #[sqlx::test]
    async fn test_delete_expired() -> Result<()> {
        let pool = connect_in_memory().await?;
        let user_id = create_test_user(&pool).await?;
        let repo = SessionRepository::new(pool);

        let expired = Session::new_with_expiry(user_id, Duration::hours(-1));
        let live = Session::new(user_id);
        repo.create(&expired).await?;
        repo.create(&live).await?;

        assert_eq!(repo.delete_expired().await?, 1);
        assert!(repo.find_by_id(&expired.id).await?.is_none());
        assert!(repo.find_by_id(&live.id).await?.is_some());

        Ok(())
    }

    #[sqlx::test]
    async fn test_sessions_removed_with_user() -> Result<()> {
        let pool = connect_in_memory().await?;
        let user_id = create_test_user(&pool).await?;
        let repo = SessionRepository::new(pool.clone());

        repo.create(&Session::new(user_id)).await?;
        repo.create(&Session::new(user_id)).await?;
        assert_eq!(repo.delete_for_user(user_id).await?, 2);

        let session = Session::new(user_id);
        repo.create(&session).await?;
        UserRepository::new(pool).delete(user_id).await?;
        assert!(repo.find_by_id(&session.id).await?.is_none());

        Ok(())
    }
}
