use super::response::{ApiError, ApiResponse, ValidatedJson};
use super::AppState;
use crate::domain::video::{MergeRequest, ShareRequest, TrimOutcome, TrimRequest};
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
};
use serde_json::json;

type ApiResult = Result<ApiResponse, ApiError>;

pub async fn root() -> ApiResponse {
    ApiResponse::success("Welcome to Videoverse Fusion Backend!!").with_data(json!({ "ping": "pong" }))
}

pub async fn health() -> ApiResponse {
    ApiResponse::success("The project is healthy.")
}

/// `multipart/form-data` upload; the video is the `file` field.
pub async fn upload_video(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult {
    const FAILED: &str = "Error while uploading video";

    let mut multipart = multipart.map_err(|e| ApiError::unprocessable(e.body_text()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::unprocessable(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_owned();

        let video = state
            .service
            .upload(&filename, field)
            .await
            .map_err(|e| state.error(e, Some(FAILED)))?;

        return Ok(ApiResponse::success("Video uploaded successfully")
            .with_status(StatusCode::CREATED)
            .with_data(json!({ "id": video.id })));
    }

    Err(ApiError::unprocessable("A video file is required in the `file` field"))
}

pub async fn list_videos(State(state): State<AppState>) -> ApiResult {
    let videos = state
        .service
        .list()
        .await
        .map_err(|e| state.error(e, Some("Error while listing videos")))?;
    Ok(ApiResponse::success("List of videos").with_data(videos))
}

pub async fn trim_video(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<TrimRequest>,
) -> ApiResult {
    let outcome = state
        .service
        .trim(request)
        .await
        .map_err(|e| state.error(e, Some("Error while trimming video")))?;

    Ok(match outcome {
        TrimOutcome::Updated(_) => ApiResponse::success("Video trimmed and updated successfully"),
        TrimOutcome::Copied(video) => {
            ApiResponse::success("Video trimmed and saved as a new copy successfully")
                .with_data(json!({ "new_video_id": video.id }))
        }
    })
}

pub async fn merge_videos(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<MergeRequest>,
) -> ApiResult {
    let merged = state
        .service
        .merge(request)
        .await
        .map_err(|e| state.error(e, Some("Error while merging videos")))?;
    Ok(ApiResponse::success("Videos merged successfully").with_data(merged))
}

pub async fn share_video(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ShareRequest>,
) -> ApiResult {
    // The signing failure already reads as a complete message
    let link = state
        .service
        .share(request)
        .await
        .map_err(|e| state.error(e, None))?;
    Ok(ApiResponse::success("Shareable link generated successfully").with_data(link))
}
