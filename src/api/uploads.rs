//! Upload Handlers
//!
//! Spreadsheet upload, listing, download and removal.

use axum::{
    body::Body,
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use tracing::warn;

use super::handlers::AppState;
use crate::error::{CacheError, Result};
use crate::models::{DeleteResponse, UploadListResponse};
use crate::uploads::StoredFile;

/// Multipart field carrying the spreadsheet.
const FILE_FIELD: &str = "file";

/// Handler for POST /uploads/excel
///
/// Stores the first `file` field of the form; other fields are ignored.
pub async fn upload_excel_handler(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<StoredFile>)> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| CacheError::InvalidRequest("uploaded file has no name".to_string()))?;
        let data = field.bytes().await.map_err(multipart_error)?;

        let stored = state.uploads.store(&filename, data).await?;
        return Ok((StatusCode::CREATED, Json(stored)));
    }

    Err(CacheError::InvalidRequest(format!(
        "missing multipart field '{FILE_FIELD}'"
    )))
}

/// Handler for GET /uploads/excel
pub async fn list_uploads_handler(State(state): State<AppState>) -> Result<Json<UploadListResponse>> {
    let files = state.uploads.list().await?;
    Ok(Json(UploadListResponse::new(files)))
}

/// Handler for GET /uploads/excel/:name
pub async fn download_upload_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response> {
    let data = state.uploads.read(&name).await?;
    let length = data.len();

    let mut response = Body::from(data).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(content_type_for(&name)));
    headers.insert(CONTENT_LENGTH, HeaderValue::from(length));

    // Stored names are already restricted to a safe ASCII set
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{name}\"")) {
        headers.insert(CONTENT_DISPOSITION, value);
    }

    Ok(response)
}

/// Handler for DELETE /uploads/excel/:name
pub async fn delete_upload_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteResponse>> {
    state.uploads.delete(&name).await?;
    Ok(Json(DeleteResponse::new(name)))
}

fn content_type_for(name: &str) -> &'static str {
    let extension = name.rsplit('.').next().unwrap_or_default();
    match extension.to_ascii_lowercase().as_str() {
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "csv" => "text/csv",
        _ => "application/octet-stream",
    }
}

fn multipart_error(err: MultipartError) -> CacheError {
    let status = err.status();
    warn!(status = status.as_u16(), error = %err, "Failed to read multipart payload");
    match status {
        StatusCode::PAYLOAD_TOO_LARGE => CacheError::PayloadTooLarge(err.body_text()),
        _ => CacheError::InvalidRequest(err.body_text()),
    }
}
