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

use crate::{
    handlers::{auth, newsletter, publications, uploads, users},
    request_logging::request_logging_middleware,
    security_headers::{create_security_headers_middleware, HeadersConfig},
    AppState,
};
use axum::extract::DefaultBodyLimit;
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let max_upload_size = state.config.max_upload_size;
    let headers_middleware =
        create_security_headers_middleware(HeadersConfig::from_config(&state.config));

    let public = Router::new()
        .route("/publications", get(publications::list_visible))
        .route("/publications/{id}", get(publications::get_visible))
        .route("/publications/{id}/like", post(publications::like))
        .route("/publications/{id}/comments", post(publications::add_comment))
        .route("/newsletter/subscribe", post(newsletter::subscribe))
        .route("/newsletter/unsubscribe", post(newsletter::unsubscribe))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/auth/password", put(auth::change_password));

    let admin = Router::new()
        .route(
            "/publications",
            get(publications::list_all).post(publications::create),
        )
        .route("/publications/pending", get(publications::list_pending))
        .route(
            "/publications/{id}",
            put(publications::update).delete(publications::delete),
        )
        .route("/publications/{id}/approve", post(publications::approve))
        .route("/publications/{id}/reject", post(publications::reject))
        .route("/newsletter/subscribers", get(newsletter::list_subscribers))
        .route(
            "/newsletter/subscribers/{id}",
            delete(newsletter::delete_subscriber),
        )
        .route("/newsletter/export", get(newsletter::export))
        .route("/newsletter/test", post(newsletter::send_test))
        .route("/uploads", post(uploads::upload_image))
        .route("/users", get(users::list).post(users::create_admin))
        .route("/users/{id}", delete(users::delete))
        .route("/users/{id}/status", put(users::set_status));

    let mut router = Router::new()
        .route("/.health", get(health))
        .nest_service(
            &state.config.uploads_url,
            ServeDir::new(&state.config.uploads_dir),
        )
        .nest("/api", public)
        .nest("/api/admin", admin)
        .layer(middleware::from_fn(request_logging_middleware))
        .layer(middleware::from_fn(headers_middleware));

    // The front-end dev server runs on another origin
    if state.config.development_mode {
        router = router.layer(CorsLayer::very_permissive());
    }

    router
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::max(max_upload_size))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

// Health check handler
async fn health() -> &'static str {
    "OK"
}
