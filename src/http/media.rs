//! Download route behind the local backend's signed URLs.

use super::response::ApiError;
use super::AppState;
use crate::ports::StorageError;
use axum::{
    body::Body,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

#[derive(Debug, Deserialize)]
pub struct SignedQuery {
    pub expires: i64,
    pub signature: String,
}

pub async fn serve_media(
    State(state): State<AppState>,
    Path(key): Path<String>,
    query: Result<Query<SignedQuery>, QueryRejection>,
) -> Result<Response, ApiError> {
    let Some(files) = state.local_media.as_ref() else {
        return Err(ApiError::new(StatusCode::NOT_FOUND, "Not found"));
    };
    let Ok(Query(query)) = query else {
        return Err(ApiError::new(StatusCode::FORBIDDEN, "Invalid or expired link"));
    };

    let path = match files.verified_path(&key, query.expires, &query.signature).await {
        Ok(Some(path)) => path,
        Ok(None) => return Err(ApiError::new(StatusCode::FORBIDDEN, "Invalid or expired link")),
        Err(StorageError::NotFound(_)) | Err(StorageError::InvalidKey(_)) => {
            return Err(ApiError::new(StatusCode::NOT_FOUND, "The requested video does not exist"))
        }
        Err(e) => {
            tracing::error!(key = %key, error = %e, "Failed to resolve media file");
            return Err(ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Error while reading video"));
        }
    };

    let file = tokio::fs::File::open(&path).await.map_err(|e| {
        tracing::error!(key = %key, error = %e, "Failed to open media file");
        ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Error while reading video")
    })?;
    let length = file.metadata().await.ok().map(|metadata| metadata.len());

    let mut response = (
        [(header::CONTENT_TYPE, content_type(&key))],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response();
    if let Some(length) = length {
        response
            .headers_mut()
            .insert(header::CONTENT_LENGTH, header::HeaderValue::from(length));
    }
    Ok(response)
}

fn content_type(key: &str) -> &'static str {
    let extension = key.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("mkv") => "video/x-matroska",
        Some("avi") => "video/x-msvideo",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_by_extension() {
        assert_eq!(content_type("videos/clip_1.MP4"), "video/mp4");
        assert_eq!(content_type("videos/clip.webm"), "video/webm");
        assert_eq!(content_type("videos/raw"), "application/octet-stream");
    }
}
