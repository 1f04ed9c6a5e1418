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
use avolta_db::{init_database, BootstrapOutcome};
use avolta_web::bootstrap::ensure_superadmin_account;
use avolta_web::{routes, AppState, Config};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "avolta_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    info!("Starting Avolta publications server");

    info!("Initializing database: {}", config.database_url);
    let db = init_database(&config.database_url).await?;

    match ensure_superadmin_account(&db, &config).await? {
        BootstrapOutcome::Created(id) => {
            info!(user_id = id, email = %config.superadmin_email, "Superadmin account created")
        }
        BootstrapOutcome::AlreadyPresent(id) => {
            info!(user_id = id, "Superadmin account present")
        }
    }

    std::fs::create_dir_all(&config.uploads_dir)
        .with_context(|| format!("Failed to create uploads directory {}", config.uploads_dir))?;
    info!("Uploads directory: {}", config.uploads_dir);

    let state = AppState::with_defaults(db, config.clone());
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
