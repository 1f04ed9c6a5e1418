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

use avolta_core::models::{User, UserStatus};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{auth::RequireSuperAdmin, error::AppError, AppState};

#[derive(Debug, Deserialize)]
pub struct CreateAdminRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: UserStatus,
}

pub async fn list(
    State(state): State<AppState>,
    RequireSuperAdmin(user): RequireSuperAdmin,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.users().list(&user.principal).await?))
}

pub async fn create_admin(
    State(state): State<AppState>,
    RequireSuperAdmin(user): RequireSuperAdmin,
    Json(form): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let created = state
        .users()
        .create_admin(&user.principal, &form.email, &form.password)
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn set_status(
    State(state): State<AppState>,
    RequireSuperAdmin(user): RequireSuperAdmin,
    Path(id): Path<i64>,
    Json(form): Json<StatusRequest>,
) -> Result<Json<User>, AppError> {
    let updated = state
        .users()
        .set_status(&user.principal, id, form.status)
        .await?;
    Ok(Json(updated))
}

pub async fn delete(
    State(state): State<AppState>,
    RequireSuperAdmin(user): RequireSuperAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.users().delete(&user.principal, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
