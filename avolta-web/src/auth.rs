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

use avolta_core::models::{Role, Session};
use avolta_core::{authorize, Decision, Principal};
use avolta_db::repositories::{SessionRepository, UserRepository};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use axum_extra::{
    extract::CookieJar,
    headers::{authorization::Bearer, Authorization, HeaderMapExt},
};

use crate::{error::AppError, AppState};

pub const SESSION_COOKIE: &str = "session_id";

/// Current authenticated user, extracted from request
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub principal: Principal,
    pub session: Session,
}

impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session_id = session_id_from_headers(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("No session found"))?;

        let app_state = AppState::from_ref(state);

        let session = SessionRepository::new(app_state.db.clone())
            .find_by_id(&session_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("Invalid session"))?;

        if session.is_expired() {
            return Err(AppError::unauthorized("Session expired"));
        }

        let user = UserRepository::new(app_state.db)
            .find_by_id(session.user_id)
            .await?
            .ok_or_else(|| AppError::unauthorized("User not found"))?;

        // A deactivated account loses its open sessions too
        if !user.is_active() {
            return Err(AppError::unauthorized("Account disabled"));
        }

        let principal = Principal::from_user(&user)
            .ok_or_else(|| AppError::internal_server_error("Stored user has no id"))?;

        Ok(CurrentUser { principal, session })
    }
}

/// Optional authenticated user
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<CurrentUser>);

impl<S> FromRequestParts<S> for OptionalUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(OptionalUser(Some(user))),
            Err(e) if e.status == axum::http::StatusCode::UNAUTHORIZED => Ok(OptionalUser(None)),
            Err(e) => Err(e),
        }
    }
}

/// Any logged-in administrator
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalUser(user) = OptionalUser::from_request_parts(parts, state).await?;
        gate(user, Role::Admin).map(RequireAdmin)
    }
}

/// Superadmin only: moderation and account management
#[derive(Debug, Clone)]
pub struct RequireSuperAdmin(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireSuperAdmin
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalUser(user) = OptionalUser::from_request_parts(parts, state).await?;
        gate(user, Role::SuperAdmin).map(RequireSuperAdmin)
    }
}

fn gate(user: Option<CurrentUser>, required: Role) -> Result<CurrentUser, AppError> {
    match (authorize(user.as_ref().map(|u| &u.principal), Some(required)), user) {
        (Decision::Allow, Some(user)) => Ok(user),
        (Decision::Deny(reason), _) => {
            tracing::debug!(?reason, required = %required, "Access denied");
            Err(reason.into())
        }
        (Decision::Allow, None) => Err(AppError::unauthorized("No session found")),
    }
}

/// Session id from the `session_id` cookie, else from a bearer token
pub fn session_id_from_headers(headers: &HeaderMap) -> Option<String> {
    let jar = CookieJar::from_headers(headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }

    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|Authorization(bearer)| bearer.token().to_string())
}
