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

//! Business operations on top of the repositories.
//!
//! Every operation takes the acting [`Principal`](avolta_core::Principal)
//! explicitly and re-checks its role, whatever route it was reached from.

pub mod newsletter;
pub mod notifier;
pub mod publications;
pub mod users;

pub use newsletter::{NewsletterService, Subscription};
pub use notifier::{LogNotificationSender, NotificationSender};
pub use publications::PublicationService;
pub use users::UserService;

use avolta_core::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Missing or wrong credentials
    #[error("Not authenticated: {0}")]
    NotAuthenticated(String),

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type ServiceResult<T> = Result<T, ServiceError>;
