use super::response::ApiError;
use super::AppState;
use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Static bearer-token check. Passes everything through when no token is
/// configured.
pub async fn require_api_token(State(state): State<AppState>, request: Request, next: Next) -> Response {
    if state.api_tokens.is_empty() {
        return next.run(request).await;
    }

    match check(&state.api_tokens, request.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok())) {
        Ok(()) => next.run(request).await,
        Err(message) => {
            tracing::info!(path = %request.uri().path(), reason = message, "Unauthorized request");
            ApiError::unauthorized(message).into_response()
        }
    }
}

fn check(tokens: &[String], header: Option<&str>) -> Result<(), &'static str> {
    let header = header.filter(|h| !h.is_empty()).ok_or("Missing API Token")?;
    let (scheme, token) = header.split_once(' ').unwrap_or((header, ""));
    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Invalid authentication scheme");
    }
    if !tokens.iter().any(|known| known == token) {
        return Err("Invalid API Token");
    }
    Ok(())
}
