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

//! First-run account provisioning.

use anyhow::{Context, Result};
use avolta_core::models::{Role, User};
use sqlx::SqlitePool;

use crate::repositories::UserRepository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(i64),
    AlreadyPresent(i64),
}

/// Make sure the single superadmin account exists.
///
/// Does nothing when a superadmin is already stored, whatever its email.
pub async fn ensure_superadmin(
    pool: &SqlitePool,
    email: &str,
    password: &str,
) -> Result<BootstrapOutcome> {
    let repo = UserRepository::new(pool.clone());

    if let Some(existing) = repo.find_superadmin().await? {
        let id = existing
            .id
            .ok_or_else(|| anyhow::anyhow!("Stored superadmin has no id"))?;
        tracing::debug!(email = %existing.email, "Superadmin already present");
        return Ok(BootstrapOutcome::AlreadyPresent(id));
    }

    if repo.find_by_email(email).await?.is_some() {
        anyhow::bail!(
            "Cannot create superadmin: {} is already used by an admin account",
            email
        );
    }

    let user = User::new(email.trim().to_string(), password, Role::SuperAdmin)
        .context("Failed to build superadmin account")?;
    let id = repo.create(&user).await?;

    tracing::info!(email = %user.email, "Created superadmin account");
    Ok(BootstrapOutcome::Created(id))
}

/// Create an admin account unless the email is taken.
pub async fn ensure_admin(pool: &SqlitePool, email: &str, password: &str) -> Result<BootstrapOutcome> {
    let repo = UserRepository::new(pool.clone());

    if let Some(existing) = repo.find_by_email(email).await? {
        let id = existing
            .id
            .ok_or_else(|| anyhow::anyhow!("Stored user has no id"))?;
        return Ok(BootstrapOutcome::AlreadyPresent(id));
    }

    let user = User::new(email.trim().to_string(), password, Role::Admin)
        .context("Failed to build admin account")?;
    let id = repo.create(&user).await?;

    tracing::info!(email = %user.email, "Created admin account");
    Ok(BootstrapOutcome::Created(id))
}
