//! Media upload controller.

use crate::{
    extractors::AuthenticatedUser,
    responses::{created, ApiResponse, AppError},
    state::AppState,
};
use agora_core::AgoraError;
use agora_service::MediaUploadResponse;
use axum::{
    extract::{
        multipart::{Multipart, MultipartError},
        State,
    },
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::debug;

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "file";

/// Creates the media router.
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(upload))
}

fn multipart_error(err: &MultipartError) -> AgoraError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AgoraError::PayloadTooLarge(err.body_text())
    } else {
        AgoraError::validation(format!("Invalid multipart body: {}", err.body_text()))
    }
}

async fn upload(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ApiResponse<MediaUploadResponse>>), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(|e| multipart_error(&e))? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let bytes = field.bytes().await.map_err(|e| multipart_error(&e))?;
        debug!("Upload of {} ({} bytes) from {}", file_name, bytes.len(), user.sub);

        let response = state
            .services
            .media
            .upload(&user.uid(), &file_name, &content_type, bytes.to_vec())
            .await?;
        return Ok(created(response));
    }

    Err(AgoraError::validation(format!("Multipart field '{FILE_FIELD}' is required")).into())
}
