use std::{sync::Arc, time::Duration};

use actix_cors::Cors;
use actix_web::{
    error::{InternalError, JsonPayloadError},
    guard,
    http::StatusCode,
    middleware, web, App, HttpServer,
};

mod auth;
mod config;
mod handlers;
mod response;
mod types;

pub(crate) use config::{AppState, ServerConfig};
pub(crate) use types::{HealthResponse, ReplayRequest, SimulateResponse, VerifyResponse};

use auth::is_request_authorized;
use response::json_error_with_code;

fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(|err, _req| {
            let (status, code) = match &err {
                JsonPayloadError::Overflow { .. }
                | JsonPayloadError::OverflowKnownLength { .. } => {
                    (StatusCode::PAYLOAD_TOO_LARGE, "payload_too_large")
                }
                _ => (StatusCode::BAD_REQUEST, "invalid_request"),
            };
            let message = format!("invalid request body: {err}");
            let response = json_error_with_code(status, message, Some(code));
            InternalError::from_response(err, response).into()
        })
}

/// `/health` stays open; `/api/*` requires the key when one is configured.
fn routes(cfg: &mut web::ServiceConfig, api_key: Option<Arc<str>>) {
    cfg.route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/api")
                .guard(guard::fn_guard(move |ctx| {
                    is_request_authorized(ctx.head().headers(), api_key.as_deref())
                }))
                .route("/simulate", web::post().to(handlers::simulate))
                .route("/verify", web::post().to(handlers::verify)),
        )
        .service(web::scope("/api").default_service(web::to(handlers::unauthorized)));
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ServerConfig::from_env();
    let state = config.app_state();
    let api_key: Option<Arc<str>> = config.api_key.as_deref().map(Arc::from);

    tracing::info!(
        "starting asteracer api: bind_addr={} max_instructions={} max_body_bytes={} replay_concurrency={} auth_required={}",
        config.bind_addr,
        config.policy.max_instructions,
        config.max_body_bytes,
        config.replay_concurrency,
        state.auth_required
    );

    let max_body_bytes = config.max_body_bytes;
    let mut server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);
        let api_key = api_key.clone();

        App::new()
            .app_data(web::Data::new(state.clone()))
            .app_data(json_config(max_body_bytes))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .configure(|cfg| routes(cfg, api_key))
    })
    .keep_alive(Duration::from_secs(config.http_keep_alive_secs));

    if let Some(workers) = config.http_workers {
        server = server.workers(workers);
    }

    server.bind(config.bind_addr.as_str())?.run().await
}
