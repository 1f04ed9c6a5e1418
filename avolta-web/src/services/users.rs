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

use avolta_core::models::{Role, Session, User, UserStatus};
use avolta_core::{DomainError, Principal};
use avolta_db::repositories::{SessionRepository, UserRepository};
use chrono::Duration;
use sqlx::SqlitePool;

use super::{ServiceError, ServiceResult};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Accounts, login sessions and administrator management.
pub struct UserService {
    users: UserRepository,
    sessions: SessionRepository,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            users: UserRepository::new(pool.clone()),
            sessions: SessionRepository::new(pool),
        }
    }

    /// Check credentials and open a session. Records the login time.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        lifetime: Duration,
    ) -> ServiceResult<(User, Session)> {
        let Some(mut user) = self.users.find_by_email(email).await? else {
            tracing::debug!(email = %email, "Login for unknown account");
            return Err(ServiceError::NotAuthenticated(INVALID_CREDENTIALS.to_string()));
        };

        if !user.verify_password(password)? {
            tracing::debug!(email = %email, "Login with wrong password");
            return Err(ServiceError::NotAuthenticated(INVALID_CREDENTIALS.to_string()));
        }

        if !user.is_active() {
            return Err(DomainError::forbidden("Account is disabled").into());
        }

        let user_id = user
            .id
            .ok_or_else(|| anyhow::anyhow!("Stored user has no id"))?;
        let session = Session::new_with_expiry(user_id, lifetime);
        self.sessions.create(&session).await?;

        user.touch_login();
        self.users.update(&user).await?;

        tracing::info!(user_id, "User logged in");
        Ok((user, session))
    }

    pub async fn logout(&self, session_id: &str) -> ServiceResult<()> {
        if self.sessions.find_by_id(session_id).await?.is_some() {
            self.sessions.delete(session_id).await?;
        }
        Ok(())
    }

    pub async fn list(&self, actor: &Principal) -> ServiceResult<Vec<User>> {
        actor.require(Role::SuperAdmin)?;
        Ok(self.users.list().await?)
    }

    /// Create an administrator. New accounts are always plain admins.
    pub async fn create_admin(
        &self,
        actor: &Principal,
        email: &str,
        password: &str,
    ) -> ServiceResult<User> {
        actor.require(Role::SuperAdmin)?;

        let email = email.trim();
        User::validate_email(email).map_err(DomainError::Validation)?;
        User::validate_password(password).map_err(DomainError::Validation)?;

        if self.users.find_by_email(email).await?.is_some() {
            return Err(DomainError::validation("Email is already in use").into());
        }

        let mut user = User::new(email.to_string(), password, Role::Admin)?;
        user.id = Some(self.users.create(&user).await?);

        tracing::info!(email = %user.email, actor = %actor.email, "Admin account created");
        Ok(user)
    }

    pub async fn set_status(
        &self,
        actor: &Principal,
        id: i64,
        status: UserStatus,
    ) -> ServiceResult<User> {
        actor.require(Role::SuperAdmin)?;

        let target = self.load(id).await?;
        if target.is_superadmin() {
            return Err(DomainError::forbidden("The superadmin account cannot be modified").into());
        }

        if !self.users.set_status(id, status).await? {
            return Err(DomainError::not_found("User not found").into());
        }
        if !status.is_active() {
            self.sessions.delete_for_user(id).await?;
        }

        tracing::info!(user_id = id, status = %status, actor = %actor.email, "User status changed");
        self.load(id).await
    }

    /// Superadmin accounts can never be deleted, whoever asks.
    pub async fn delete(&self, actor: &Principal, id: i64) -> ServiceResult<()> {
        actor.require(Role::SuperAdmin)?;

        let target = self.load(id).await?;
        if target.is_superadmin() {
            return Err(DomainError::forbidden("The superadmin account cannot be deleted").into());
        }

        if !self.users.delete(id).await? {
            return Err(DomainError::not_found("User not found").into());
        }

        tracing::info!(user_id = id, actor = %actor.email, "User deleted");
        Ok(())
    }

    pub async fn change_password(
        &self,
        actor: &Principal,
        current_password: &str,
        new_password: &str,
    ) -> ServiceResult<()> {
        let mut user = self.load(actor.id).await?;

        if !user.verify_password(current_password)? {
            return Err(DomainError::validation("Current password is incorrect").into());
        }
        User::validate_password(new_password).map_err(DomainError::Validation)?;

        user.set_password(new_password)?;
        self.users.update(&user).await?;

        tracing::info!(user_id = actor.id, "Password changed");
        Ok(())
    }

    pub async fn find_by_email(&self, actor: &Principal, email: &str) -> ServiceResult<User> {
        actor.require(Role::SuperAdmin)?;
        self.users
            .find_by_email(email.trim())
            .await?
            .ok_or_else(|| DomainError::not_found("User not found").into())
    }

    /// Set a new password without the current one, for operator resets.
    pub async fn reset_password(
        &self,
        actor: &Principal,
        id: i64,
        new_password: &str,
    ) -> ServiceResult<()> {
        actor.require(Role::SuperAdmin)?;
        User::validate_password(new_password).map_err(DomainError::Validation)?;

        let mut user = self.load(id).await?;
        user.set_password(new_password)?;
        self.users.update(&user).await?;

        tracing::info!(user_id = id, actor = %actor.email, "Password reset");
        Ok(())
    }

    async fn load(&self, id: i64) -> ServiceResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("User not found").into())
    }
}
