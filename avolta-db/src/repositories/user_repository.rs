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
use avolta_core::models::{Role, User, UserStatus};
use sqlx::SqlitePool;

use crate::timestamps::{from_db, from_db_opt, to_db, to_db_opt};

type UserRow = (
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
);

const USER_COLUMNS: &str =
    "id, email, password_hash, role, status, created_at, updated_at, last_login";

pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, user: &User) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, password_hash, role, status, created_at, updated_at, last_login)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.status.as_str())
        .bind(to_db(&user.created_at))
        .bind(to_db(&user.updated_at))
        .bind(to_db_opt(&user.last_login))
        .execute(&self.pool)
        .await
        .context("Failed to create user")?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = ?",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find user by id")?;

        row.map(row_to_user).transpose()
    }

    /// Emails are matched case-insensitively
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = ? COLLATE NOCASE",
            USER_COLUMNS
        ))
        .bind(email.trim())
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find user by email")?;

        row.map(row_to_user).transpose()
    }

    pub async fn find_superadmin(&self) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE role = 'superadmin' LIMIT 1",
            USER_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await
        .context("Failed to find superadmin")?;

        row.map(row_to_user).transpose()
    }

    /// All accounts, oldest first
    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users ORDER BY created_at ASC, id ASC",
            USER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .context("Failed to list users")?;

        rows.into_iter().map(row_to_user).collect()
    }

    /// Persist email, password hash and login time. Role and status have
    /// dedicated guarded updates.
    pub async fn update(&self, user: &User) -> Result<()> {
        let id = user
            .id
            .ok_or_else(|| anyhow::anyhow!("Cannot update user without ID"))?;

        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET email = ?, password_hash = ?, updated_at = ?, last_login = ?
            WHERE id = ?
            "#,
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(to_db(&user.updated_at))
        .bind(to_db_opt(&user.last_login))
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user")?
        .rows_affected();

        if rows_affected == 0 {
            return Err(anyhow::anyhow!("User not found"));
        }

        Ok(())
    }

    /// Change the status of a non-superadmin account.
    ///
    /// Returns false when no such account exists or it is the superadmin.
    pub async fn set_status(&self, id: i64, status: UserStatus) -> Result<bool> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE users
            SET status = ?, updated_at = ?
            WHERE id = ? AND role != 'superadmin'
            "#,
        )
        .bind(status.as_str())
        .bind(to_db(&clock::now()))
        .bind(id)
        .execute(&self.pool)
        .await
        .context("Failed to update user status")?
        .rows_affected();

        Ok(rows_affected > 0)
    }

    /// Delete a non-superadmin account.
    ///
    /// Returns false when no such account exists or it is the superadmin.
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let rows_affected = sqlx::query("DELETE FROM users WHERE id = ? AND role != 'superadmin'")
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to delete user")?
            .rows_affected();

        Ok(rows_affected > 0)
    }

    pub async fn count_by_role(&self, role: Role) -> Result<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE role = ?")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .context("Failed to count users")?;

        Ok(count.0)
    }
}

fn row_to_user(row: UserRow) -> Result<User> {
    let (id, email, password_hash, role, status, created_at, updated_at, last_login) = row;

    Ok(User {
        id: Some(id),
        email,
        password_hash,
        role: role
            .parse()
            .map_err(|e: String| anyhow::anyhow!("Invalid role in database: {}", e))?,
        status: status
            .parse()
            .map_err(|e: String| anyhow::anyhow!("Invalid status in database: {}", e))?,
        created_at: from_db(&created_at, "created_at")?,
        updated_at: from_db(&updated_at, "updated_at")?,
        last_login: from_db_opt(last_login, "last_login")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::init::connect_in_memory;

    fn admin(email: &str) -> User {
        User::new(email.to_string(), "password123", Role::Admin).unwrap()
    }

    #[sqlx::test]
    async fn test_create_and_find_user() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);

        let id = repo.create(&admin("jane@avolta.be")).await?;
        assert!(id > 0);

        let found = repo.find_by_id(id).await?.unwrap();
        assert_eq!(found.id, Some(id));
        assert_eq!(found.email, "jane@avolta.be");
        assert_eq!(found.role, Role::Admin);
        assert_eq!(found.status, UserStatus::Active);
        assert!(found.verify_password("password123")?);
        assert!(found.last_login.is_none());

        Ok(())
    }

    #[sqlx::test]
    async fn test_find_by_id_non_existing() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);
        assert!(repo.find_by_id(999).await?.is_none());
        Ok(())
    }

    #[sqlx::test]
    async fn test_find_by_email_ignores_case() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);
        repo.create(&admin("jane@avolta.be")).await?;

        assert!(repo.find_by_email("Jane@Avolta.BE").await?.is_some());
        assert!(repo.find_by_email("john@avolta.be").await?.is_none());

        Ok(())
    }

    #[sqlx::test]
    async fn test_duplicate_email_fails() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);
        repo.create(&admin("jane@avolta.be")).await?;

        assert!(repo.create(&admin("jane@avolta.be")).await.is_err());
        Ok(())
    }

    #[sqlx::test]
    async fn test_only_one_superadmin() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);
        let root = User::new("root@avolta.be".to_string(), "password", Role::SuperAdmin)?;
        let other = User::new("other@avolta.be".to_string(), "password", Role::SuperAdmin)?;

        repo.create(&root).await?;
        assert!(repo.create(&other).await.is_err());
        assert_eq!(repo.count_by_role(Role::SuperAdmin).await?, 1);
        assert_eq!(
            repo.find_superadmin().await?.map(|u| u.email),
            Some("root@avolta.be".to_string())
        );

        Ok(())
    }

    #[sqlx::test]
    async fn test_list_oldest_first() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);
        repo.create(&admin("first@avolta.be")).await?;
        repo.create(&admin("second@avolta.be")).await?;

        let emails: Vec<String> = repo.list().await?.into_iter().map(|u| u.email).collect();
        assert_eq!(emails, vec!["first@avolta.be", "second@avolta.be"]);

        Ok(())
    }

    #[sqlx::test]
    async fn test_update_password_and_login() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);
        let id = repo.create(&admin("jane@avolta.be")).await?;

        let mut user = repo.find_by_id(id).await?.unwrap();
        user.set_password("new-password")?;
        user.touch_login();
        repo.update(&user).await?;

        let reloaded = repo.find_by_id(id).await?.unwrap();
        assert!(reloaded.verify_password("new-password")?);
        assert!(reloaded.last_login.is_some());

        Ok(())
    }

    #[sqlx::test]
    async fn test_update_without_id_fails() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);
        let result = repo.update(&admin("jane@avolta.be")).await;
        assert!(result.unwrap_err().to_string().contains("without ID"));
        Ok(())
    }

    #[sqlx::test]
    async fn test_set_status_skips_superadmin() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);
        let admin_id = repo.create(&admin("jane@avolta.be")).await?;
        let root_id = repo
            .create(&User::new(
                "root@avolta.be".to_string(),
                "password",
                Role::SuperAdmin,
            )?)
            .await?;

        assert!(repo.set_status(admin_id, UserStatus::Inactive).await?);
        assert_eq!(
            repo.find_by_id(admin_id).await?.unwrap().status,
            UserStatus::Inactive
        );

        assert!(!repo.set_status(root_id, UserStatus::Inactive).await?);
        assert_eq!(
            repo.find_by_id(root_id).await?.unwrap().status,
            UserStatus::Active
        );

        assert!(!repo.set_status(999, UserStatus::Inactive).await?);
        Ok(())
    }

    #[sqlx::test]
    async fn test_delete_skips_superadmin() -> Result<()> {
        let repo = UserRepository::new(connect_in_memory().await?);
        let admin_id = repo.create(&admin("jane@avolta.be")).await?;
        let root_id = repo
            .create(&User::new(
                "root@avolta.be".to_string(),
                "password",
                Role::SuperAdmin,
            )?)
            .await?;

        assert!(repo.delete(admin_id).await?);
        assert!(repo.find_by_id(admin_id).await?.is_none());

        assert!(!repo.delete(root_id).await?);
        assert!(repo.find_by_id(root_id).await?.is_some());

        Ok(())
    }
}
