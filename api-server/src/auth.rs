use actix_web::http::header::{HeaderMap, AUTHORIZATION};

pub(crate) const API_KEY_HEADER: &str = "x-api-key";

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let authorization = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = authorization.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let trimmed = token.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed)
}

/// Without a configured key every request passes.
pub(crate) fn is_request_authorized(headers: &HeaderMap, expected_api_key: Option<&str>) -> bool {
    let Some(expected_api_key) = expected_api_key else {
        return true;
    };

    let header_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim);
    if header_key == Some(expected_api_key) {
        return true;
    }

    bearer_token(headers).is_some_and(|token| token == expected_api_key)
}
