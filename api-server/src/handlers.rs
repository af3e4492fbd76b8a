use std::time::Instant;

use actix_web::{
    http::StatusCode,
    web::{self, Data, Json},
    HttpResponse, Responder,
};
use asteracer_core::{parse_map, MapDescription};
use host::{run_simulation, run_verification, SimulateOptions};

use crate::response::{json_error_with_code, verify_error_response};
use crate::{AppState, HealthResponse, ReplayRequest, SimulateResponse, VerifyResponse};

/// Returns `(error_message, error_code)` on failure.
pub(crate) fn parse_request_map(text: &str) -> Result<MapDescription, (String, &'static str)> {
    parse_map(text).map_err(|err| (format!("invalid map: {err}"), "invalid_map"))
}

/// Runs `job` on the blocking pool under the replay semaphore and timeout.
async fn run_replay<T, F>(state: &AppState, job: F) -> Result<(T, u64), HttpResponse>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let _permit = state
        .replay_semaphore
        .clone()
        .acquire_owned()
        .await
        .map_err(|_| {
            json_error_with_code(
                StatusCode::SERVICE_UNAVAILABLE,
                "replay pool is shut down",
                Some("unavailable"),
            )
        })?;

    let started = Instant::now();
    let outcome = tokio::time::timeout(state.policy.replay_timeout, web::block(job)).await;
    let elapsed_ms = started.elapsed().as_millis() as u64;

    match outcome {
        Ok(Ok(value)) => Ok((value, elapsed_ms)),
        Ok(Err(err)) => {
            tracing::error!("replay worker failed: {err}");
            Err(json_error_with_code(
                StatusCode::INTERNAL_SERVER_ERROR,
                "replay worker failed",
                Some("internal_error"),
            ))
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = state.policy.replay_timeout.as_secs(),
                "replay timed out"
            );
            Err(json_error_with_code(
                StatusCode::SERVICE_UNAVAILABLE,
                "replay timed out",
                Some("replay_timeout"),
            ))
        }
    }
}

pub(crate) async fn health(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: "asteracer-api",
        version: env!("CARGO_PKG_VERSION"),
        max_instructions: state.policy.max_instructions,
        max_body_bytes: state.max_body_bytes,
        replay_concurrency: state.replay_concurrency,
        available_replay_slots: state.replay_semaphore.available_permits(),
        replay_timeout_secs: state.policy.replay_timeout.as_secs(),
        http_workers: state.http_workers,
        auth_required: state.auth_required,
    })
}

pub(crate) async fn simulate(state: Data<AppState>, body: Json<ReplayRequest>) -> impl Responder {
    let request = body.into_inner();
    if let Err((msg, code)) = state.policy.check_instruction_count(request.instructions.len()) {
        return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code));
    }
    let map = match parse_request_map(&request.map) {
        Ok(map) => map,
        Err((msg, code)) => return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code)),
    };

    let instructions = request.instructions();
    let options = SimulateOptions {
        velocity_mode: request.velocity_mode.unwrap_or_default(),
        ..SimulateOptions::default()
    };

    match run_replay(&state, move || run_simulation(&map, &instructions, options)).await {
        Ok((report, elapsed_ms)) => {
            tracing::info!(
                status = ?report.status,
                ticks = report.ticks,
                elapsed_ms,
                "simulation served"
            );
            HttpResponse::Ok().json(SimulateResponse::from_report(report, elapsed_ms))
        }
        Err(response) => response,
    }
}

pub(crate) async fn verify(state: Data<AppState>, body: Json<ReplayRequest>) -> impl Responder {
    let request = body.into_inner();
    let map = match parse_request_map(&request.map) {
        Ok(map) => map,
        Err((msg, code)) => return json_error_with_code(StatusCode::BAD_REQUEST, msg, Some(code)),
    };

    let instructions = request.instructions();
    let max_instructions = state.policy.max_instructions;

    match run_replay(&state, move || {
        run_verification(&map, &instructions, max_instructions)
    })
    .await
    {
        Ok((Ok(journal), elapsed_ms)) => HttpResponse::Ok().json(VerifyResponse {
            success: true,
            journal,
            elapsed_ms,
        }),
        Ok((Err(err), _)) => verify_error_response(&err),
        Err(response) => response,
    }
}

pub(crate) async fn unauthorized() -> impl Responder {
    json_error_with_code(
        StatusCode::UNAUTHORIZED,
        "unauthorized",
        Some("unauthorized"),
    )
}
