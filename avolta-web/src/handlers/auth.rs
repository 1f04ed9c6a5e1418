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

use avolta_core::Principal;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use axum_extra::extract::{cookie::Cookie, CookieJar};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    auth::{session_id_from_headers, CurrentUser, SESSION_COOKIE},
    error::AppError,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub user: Principal,
    /// Also usable as a bearer token
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Handle login request
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(form): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, session) = state
        .users()
        .login(&form.email, &form.password, state.config.session_lifetime())
        .await?;

    let principal = Principal::from_user(&user)
        .ok_or_else(|| AppError::internal_server_error("Stored user has no id"))?;

    let cookie = Cookie::build((SESSION_COOKIE, session.id.clone()))
        .path("/")
        .http_only(true)
        .secure(state.config.secure_cookies)
        .same_site(cookie::SameSite::Lax)
        .max_age(cookie::time::Duration::hours(
            state.config.session_timeout_hours,
        ))
        .build();

    let body = LoginResponse {
        user: principal,
        session_id: session.id,
        expires_at: session.expires_at,
    };

    Ok((jar.add(cookie), Json(body)))
}

/// Handle logout
pub async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
) -> Result<impl IntoResponse, AppError> {
    if let Some(session_id) = session_id_from_headers(&headers) {
        state.users().logout(&session_id).await?;
    }

    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, StatusCode::NO_CONTENT))
}

pub async fn me(user: CurrentUser) -> Json<Principal> {
    Json(user.principal)
}

pub async fn change_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(form): Json<ChangePasswordRequest>,
) -> Result<StatusCode, AppError> {
    state
        .users()
        .change_password(&user.principal, &form.current_password, &form.new_password)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
