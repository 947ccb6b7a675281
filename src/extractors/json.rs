//! JSON body extractor that enforces `Content-Type: application/json` before reading the body.

use crate::error::AppError;
use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::{header, HeaderMap, StatusCode},
};
use serde_json::Value;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Raw JSON payload. Rejects with 415 on a missing or non-JSON content type and 400 on malformed JSON.
#[derive(Debug, Clone)]
pub struct JsonPayload(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonPayload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        check_content_type(req.headers(), JSON_CONTENT_TYPE)?;
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge(rejection.body_text())
            } else {
                AppError::BadRequest(rejection.body_text())
            }
        })?;
        tracing::debug!(bytes = bytes.len(), "payload received");
        serde_json::from_slice(&bytes)
            .map(JsonPayload)
            .map_err(|e| AppError::BadRequest(format!("malformed JSON body: {}", e)))
    }
}

/// Media type of `Content-Type` must equal `expected`. Parameters such as `charset` are ignored.
pub fn check_content_type(headers: &HeaderMap, expected: &str) -> Result<(), AppError> {
    let Some(value) = headers.get(header::CONTENT_TYPE) else {
        tracing::error!("no Content-Type specified");
        return Err(AppError::UnsupportedMediaType(format!("Content-Type must be {}", expected)));
    };
    let media_type = value
        .to_str()
        .ok()
        .and_then(|s| s.split(';').next())
        .map(str::trim)
        .unwrap_or("");
    if media_type.eq_ignore_ascii_case(expected) {
        return Ok(());
    }
    tracing::error!(content_type = ?value, "invalid Content-Type");
    Err(AppError::UnsupportedMediaType(format!("Content-Type must be {}", expected)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(content_type: Option<&'static str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(ct) = content_type {
            h.insert(header::CONTENT_TYPE, HeaderValue::from_static(ct));
        }
        h
    }

    #[test]
    fn accepts_json_with_parameters() {
        assert!(check_content_type(&headers(Some("application/json")), JSON_CONTENT_TYPE).is_ok());
        assert!(check_content_type(&headers(Some("application/json; charset=utf-8")), JSON_CONTENT_TYPE).is_ok());
        assert!(check_content_type(&headers(Some("Application/JSON")), JSON_CONTENT_TYPE).is_ok());
    }

    #[test]
    fn rejects_missing_or_other_media_types() {
        for h in [
            headers(None),
            headers(Some("text/plain")),
            headers(Some("application/xml")),
            headers(Some("application/jsonp")),
        ] {
            assert!(matches!(
                check_content_type(&h, JSON_CONTENT_TYPE),
                Err(AppError::UnsupportedMediaType(_))
            ));
        }
    }
}
