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

use avolta_core::models::{Comment, NewPublication, Publication, PublicationPatch};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::optional_json;
use crate::{
    auth::{RequireAdmin, RequireSuperAdmin},
    error::AppError,
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
    #[serde(default)]
    pub author: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    #[serde(default)]
    pub send_newsletter: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct RejectRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

/// Publications currently on display, optionally narrowed to one category
pub async fn list_visible(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Publication>>, AppError> {
    let publications = state
        .publications()
        .list_visible(query.category.as_deref())
        .await?;
    Ok(Json(publications))
}

pub async fn get_visible(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Publication>, AppError> {
    Ok(Json(state.publications().get_visible(id).await?))
}

pub async fn like(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Publication>, AppError> {
    Ok(Json(state.publications().like(id).await?))
}

pub async fn add_comment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(form): Json<CommentRequest>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let comment = state
        .publications()
        .add_comment(id, &form.content, form.author.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

/// Admin listing: every status, newest first
pub async fn list_all(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
) -> Result<Json<Vec<Publication>>, AppError> {
    Ok(Json(state.publications().list_all(&user.principal).await?))
}

pub async fn create(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Json(form): Json<NewPublication>,
) -> Result<(StatusCode, Json<Publication>), AppError> {
    let publication = state
        .publications()
        .create(form, &user.principal)
        .await?;
    Ok((StatusCode::CREATED, Json(publication)))
}

pub async fn update(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<i64>,
    Json(patch): Json<PublicationPatch>,
) -> Result<Json<Publication>, AppError> {
    let publication = state
        .publications()
        .update(id, patch, &user.principal)
        .await?;
    Ok(Json(publication))
}

pub async fn delete(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.publications().delete(id, &user.principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_pending(
    State(state): State<AppState>,
    RequireSuperAdmin(user): RequireSuperAdmin,
) -> Result<Json<Vec<Publication>>, AppError> {
    Ok(Json(
        state.publications().list_pending(&user.principal).await?,
    ))
}

/// The body is optional; `{"sendNewsletter": true}` mails subscribers on approval
pub async fn approve(
    State(state): State<AppState>,
    RequireSuperAdmin(user): RequireSuperAdmin,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<Publication>, AppError> {
    let request: ApproveRequest = optional_json(&body)?;
    let publication = state
        .publications()
        .approve(id, &user.principal, request.send_newsletter)
        .await?;
    Ok(Json(publication))
}

pub async fn reject(
    State(state): State<AppState>,
    RequireSuperAdmin(user): RequireSuperAdmin,
    Path(id): Path<i64>,
    body: Bytes,
) -> Result<Json<Publication>, AppError> {
    let request: RejectRequest = optional_json(&body)?;
    let publication = state
        .publications()
        .reject(id, &user.principal, request.reason.as_deref())
        .await?;
    Ok(Json(publication))
}
