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

//! Startup check for the moderation account.

use anyhow::Result;
use avolta_db::repositories::UserRepository;
use avolta_db::{ensure_superadmin, BootstrapOutcome};
use sqlx::SqlitePool;

use crate::config::{Config, ENV_PREFIX};

/// Guarantee a superadmin exists before the server accepts requests.
///
/// With a configured password the account is created on first run. Without
/// one an already provisioned superadmin is accepted; otherwise startup fails,
/// since nobody could approve publications or manage admins.
pub async fn ensure_superadmin_account(pool: &SqlitePool, config: &Config) -> Result<BootstrapOutcome> {
    if let Some(password) = &config.superadmin_password {
        return ensure_superadmin(pool, &config.superadmin_email, password).await;
    }

    match UserRepository::new(pool.clone()).find_superadmin().await? {
        Some(existing) => {
            let id = existing
                .id
                .ok_or_else(|| anyhow::anyhow!("Stored superadmin has no id"))?;
            Ok(BootstrapOutcome::AlreadyPresent(id))
        }
        None => anyhow::bail!(
            "No superadmin account exists. Set {}SUPERADMIN_PASSWORD or run `avolta init` before starting the server",
            ENV_PREFIX
        ),
    }
}
