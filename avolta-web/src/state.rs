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

use axum::extract::FromRef;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::config::Config;
use crate::services::{
    LogNotificationSender, NewsletterService, NotificationSender, PublicationService, UserService,
};
use crate::uploads::{BlobStore, LocalBlobStore};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
    pub notifier: Arc<dyn NotificationSender>,
    pub blobs: Arc<dyn BlobStore>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: Config,
        notifier: Arc<dyn NotificationSender>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            db,
            config,
            notifier,
            blobs,
        }
    }

    /// Logging newsletter sender and local disk uploads, as configured
    pub fn with_defaults(db: SqlitePool, config: Config) -> Self {
        let blobs = LocalBlobStore::new(&config.uploads_dir, &config.uploads_url);
        Self::new(db, config, Arc::new(LogNotificationSender), Arc::new(blobs))
    }

    pub fn publications(&self) -> PublicationService {
        PublicationService::new(self.db.clone(), self.notifier.clone())
    }

    pub fn newsletter(&self) -> NewsletterService {
        NewsletterService::new(self.db.clone(), self.notifier.clone())
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }
}

impl FromRef<AppState> for SqlitePool {
    fn from_ref(state: &AppState) -> Self {
        state.db.clone()
    }
}
