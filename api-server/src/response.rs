use actix_web::{http::StatusCode, HttpResponse};
use asteracer_core::VerifyError;

pub(crate) fn json_error_with_code(
    status: StatusCode,
    message: impl Into<String>,
    error_code: Option<&str>,
) -> HttpResponse {
    let mut body = serde_json::json!({
        "success": false,
        "error": message.into(),
    });
    if let Some(code) = error_code {
        body["error_code"] = serde_json::Value::String(code.to_string());
    }
    HttpResponse::build(status).json(body)
}

/// Every verification failure is the caller's fault, so all map to 400.
pub(crate) fn verify_error_response(err: &VerifyError) -> HttpResponse {
    json_error_with_code(StatusCode::BAD_REQUEST, err.to_string(), Some(err.code()))
}
