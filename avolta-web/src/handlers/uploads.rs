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

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::{auth::RequireAdmin, error::AppError, AppState};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Store a publication image sent as the multipart field `file`
pub async fn upload_image(
    State(state): State<AppState>,
    RequireAdmin(user): RequireAdmin,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    let mut upload: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid multipart body: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::bad_request("Uploaded file has no name"))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::bad_request(format!("Failed to read upload: {}", e)))?;

        if data.len() > state.config.max_upload_size {
            return Err(AppError::payload_too_large(format!(
                "File exceeds the {} byte limit",
                state.config.max_upload_size
            )));
        }

        upload = Some((filename, data.to_vec()));
    }

    let (filename, data) = upload.ok_or_else(|| AppError::bad_request("No file provided"))?;
    let url = state.blobs.put(&filename, &data).await?;

    tracing::info!(actor = %user.principal.email, url = %url, "Image uploaded");
    Ok((StatusCode::CREATED, Json(UploadResponse { url })))
}
