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

use avolta_core::models::{NewsletterSubscriber, SubscriberFilter};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::{auth::RequireAdmin, error::AppError, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    #[serde(default)]
    pub filter: Option<String>,
}

impl FilterQuery {
    fn filter(&self) -> Result<SubscriberFilter, AppError> {
        self.filter
            .as_deref()
            .unwrap_or_default()
            .parse()
            .map_err(AppError::bad_request)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeResponse {
    pub subscriber: NewsletterSubscriber,
    pub already_subscribed: bool,
}

/// Public signup. Subscribing an address twice is not an error.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(form): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let subscription = state
        .newsletter()
        .subscribe(
            &form.email,
            form.first_name.as_deref(),
            form.last_name.as_deref(),
        )
        .await?;

    let status = if subscription.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    let body = SubscribeResponse {
        subscriber: subscription.subscriber,
        already_subscribed: !subscription.created,
    };
    Ok((status, Json(body)))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Json(form): Json<EmailRequest>,
) -> Result<StatusCode, AppError> {
    state.newsletter().unsubscribe(&form.email).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_subscribers(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Query(query): Query<FilterQuery>,
) -> Result<Json<Vec<NewsletterSubscriber>>, AppError> {
    let subscribers = state.newsletter().list(query.filter()?).await?;
    Ok(Json(subscribers))
}

pub async fn delete_subscriber(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.newsletter().delete(id).await?;
    tracing::info!(subscriber_id = id, actor = %user.principal.email, "Subscriber removed");
    Ok(StatusCode::NO_CONTENT)
}

/// CSV download, named after the current date
pub async fn export(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Query(query): Query<FilterQuery>,
) -> Result<impl IntoResponse, AppError> {
    let csv = state.newsletter().export_csv(query.filter()?).await?;
    let disposition = format!(
        "attachment; filename=\"newsletter-subscribers-{}.csv\"",
        Utc::now().format("%Y-%m-%d")
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

pub async fn send_test(
    State(state): State<AppState>,
    RequireAdmin(_user): RequireAdmin,
    Json(form): Json<EmailRequest>,
) -> Result<StatusCode, AppError> {
    state.newsletter().send_test(&form.email).await?;
    Ok(StatusCode::ACCEPTED)
}
