//! Session and bearer-token extraction.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use gatehouse_core::error::AppError;
use gatehouse_service::SessionContext;

use crate::error::ApiError;
use crate::state::AppState;

/// The already-authenticated user injected by the upstream gateway.
///
/// Read from the header named by `auth.session_user_header`; a missing or
/// malformed value rejects the request with 401.
#[derive(Debug, Clone)]
pub struct SessionUser(pub SessionContext);

impl std::ops::Deref for SessionUser {
    type Target = SessionContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.auth.session_user_header.as_str();
        let user_id = parts
            .headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| Uuid::parse_str(v.trim()).ok())
            .ok_or_else(|| AppError::unauthorized("Authentication required"))?;

        Ok(Self(SessionContext::new(user_id)))
    }
}

/// Token for a session check: the `Authorization` header if present,
/// otherwise `fallback` (body or query `token`), with any `Bearer ` prefix
/// removed. Empty when neither is given.
pub fn bearer_token(headers: &HeaderMap, fallback: Option<&str>) -> String {
    header_token(headers).unwrap_or_else(|| strip_bearer(fallback.unwrap_or_default()))
}

/// Token from a non-empty `Authorization` header, prefix removed.
pub fn header_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.trim().is_empty())
        .map(strip_bearer)
}

fn strip_bearer(raw: &str) -> String {
    let raw = raw.trim();
    raw.strip_prefix("Bearer ").unwrap_or(raw).trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_header_wins_over_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers, Some("other")), "abc.def");
    }

    #[test]
    fn test_fallback_used_without_header() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers, Some("Bearer xyz")), "xyz");
        assert_eq!(bearer_token(&headers, Some("raw")), "raw");
        assert_eq!(bearer_token(&headers, None), "");
    }

    #[test]
    fn test_header_without_scheme_is_taken_as_is() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("abc.def"));
        assert_eq!(bearer_token(&headers, None), "abc.def");
    }

    #[test]
    fn test_header_token_ignores_blank_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(header_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("  "));
        assert_eq!(header_token(&headers), None);
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        assert_eq!(header_token(&headers).as_deref(), Some("t"));
    }
}
