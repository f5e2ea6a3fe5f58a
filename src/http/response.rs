//! Response envelope shared by every endpoint:
//! `{"status": "success" | "error", "message": "...", "data": ...}`.

use crate::error::VideoError;
use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    #[serde(skip)]
    code: StatusCode,
    status: Status,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            code: StatusCode::OK,
            status: Status::Success,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data<T: Serialize>(mut self, data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(value) => self.data = Some(value),
            Err(e) => tracing::error!(error = %e, "Failed to serialize response data"),
        }
        self
    }

    pub fn with_status(mut self, code: StatusCode) -> Self {
        self.code = code;
        self
    }
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.code, Json(self)).into_response()
    }
}

/// Error envelope returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    code: StatusCode,
    message: String,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(code: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            detail: None,
        }
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    /// Render a service error.
    ///
    /// Client errors carry their own message. Server errors are reported
    /// under `fallback` (when given) with the cause in `data.error`, which is
    /// left out when `expose_details` is false.
    pub fn from_video(error: VideoError, fallback: Option<&str>, expose_details: bool) -> Self {
        let code = StatusCode::from_u16(error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if error.is_client_error() {
            tracing::info!(error = %error, code = error.error_code(), "Request rejected");
            return Self::new(code, error.to_string());
        }

        tracing::error!(error = %error, code = error.error_code(), "Request failed");
        match fallback {
            Some(message) => Self {
                code,
                message: message.to_string(),
                detail: expose_details.then(|| error.to_string()),
            },
            None => Self::new(code, error.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse {
            code: self.code,
            status: Status::Error,
            message: self.message,
            data: self.detail.map(|detail| json!({ "error": detail })),
        };
        body.into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::unprocessable(format!("Invalid request body: {}", rejection.body_text()))
    }
}

/// JSON body extractor that answers with the error envelope (422) when the
/// body cannot be deserialized.
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

#[axum::async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(ApiError::from)?;
        Ok(ValidatedJson(inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_success_envelope_omits_missing_data() {
        let response = ApiResponse::success("The project is healthy.").into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!({"status": "success", "message": "The project is healthy."})
        );
    }

    #[tokio::test]
    async fn test_client_error_uses_own_message() {
        let error = VideoError::NotFound("The video you are trying to trim does not exist".into());
        let response = ApiError::from_video(error, Some("Error while trimming video"), true).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            json!({"status": "error", "message": "The video you are trying to trim does not exist"})
        );
    }

    #[tokio::test]
    async fn test_server_error_detail_follows_exposure() {
        let error = || VideoError::ProcessingFailed("exit status 1".into());

        let shown = ApiError::from_video(error(), Some("Error while trimming video"), true).into_response();
        assert_eq!(shown.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(shown).await;
        assert_eq!(body["message"], "Error while trimming video");
        assert_eq!(body["data"]["error"], "Media processing failed: exit status 1");

        let hidden = ApiError::from_video(error(), Some("Error while trimming video"), false).into_response();
        let body = body_json(hidden).await;
        assert_eq!(body["message"], "Error while trimming video");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_server_error_without_fallback() {
        let error = VideoError::LinkGenerationFailed("no credentials".into());
        let response = ApiError::from_video(error, None, true).into_response();
        assert_eq!(
            body_json(response).await,
            json!({"status": "error", "message": "Error generating shareable link: no credentials"})
        );
    }
}
