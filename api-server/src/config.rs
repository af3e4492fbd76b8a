use std::{env, sync::Arc, thread, time::Duration};

use host::MAX_INSTRUCTIONS_DEFAULT;
use tokio::sync::Semaphore;

pub(crate) const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub(crate) const DEFAULT_MAX_BODY_BYTES: usize = 8 * 1024 * 1024;
pub(crate) const DEFAULT_REPLAY_TIMEOUT_SECS: u64 = 30;
pub(crate) const DEFAULT_HTTP_KEEP_ALIVE_SECS: u64 = 75;

#[derive(Debug, Clone, Copy)]
pub(crate) struct ServerPolicy {
    pub(crate) max_instructions: u32,
    pub(crate) replay_timeout: Duration,
}

impl ServerPolicy {
    pub(crate) fn from_env() -> Self {
        Self {
            max_instructions: read_env_u32("MAX_INSTRUCTIONS", MAX_INSTRUCTIONS_DEFAULT),
            replay_timeout: Duration::from_secs(read_env_u64(
                "REPLAY_TIMEOUT_SECS",
                DEFAULT_REPLAY_TIMEOUT_SECS,
            )),
        }
    }

    /// Returns `(error_message, error_code)` on failure.
    pub(crate) fn check_instruction_count(
        &self,
        count: usize,
    ) -> Result<(), (String, &'static str)> {
        if count > self.max_instructions as usize {
            return Err((
                format!(
                    "too many instructions: {count} (max {})",
                    self.max_instructions
                ),
                "too_many_instructions",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ServerConfig {
    pub(crate) bind_addr: String,
    pub(crate) max_body_bytes: usize,
    pub(crate) replay_concurrency: usize,
    pub(crate) http_workers: Option<usize>,
    pub(crate) http_keep_alive_secs: u64,
    pub(crate) api_key: Option<String>,
    pub(crate) policy: ServerPolicy,
}

impl ServerConfig {
    pub(crate) fn from_env() -> Self {
        let default_concurrency = thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);

        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            max_body_bytes: read_env_usize("MAX_BODY_BYTES", DEFAULT_MAX_BODY_BYTES),
            replay_concurrency: read_env_usize("REPLAY_CONCURRENCY", default_concurrency),
            http_workers: read_env_optional_usize("HTTP_WORKERS"),
            http_keep_alive_secs: read_env_u64(
                "HTTP_KEEP_ALIVE_SECS",
                DEFAULT_HTTP_KEEP_ALIVE_SECS,
            ),
            api_key: read_env_secret("API_KEY"),
            policy: ServerPolicy::from_env(),
        }
    }

    pub(crate) fn app_state(&self) -> AppState {
        AppState {
            replay_semaphore: Arc::new(Semaphore::new(self.replay_concurrency)),
            replay_concurrency: self.replay_concurrency,
            max_body_bytes: self.max_body_bytes,
            policy: self.policy,
            http_workers: self.http_workers,
            auth_required: self.api_key.is_some(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) replay_semaphore: Arc<Semaphore>,
    pub(crate) replay_concurrency: usize,
    pub(crate) max_body_bytes: usize,
    pub(crate) policy: ServerPolicy,
    pub(crate) http_workers: Option<usize>,
    pub(crate) auth_required: bool,
}

pub(crate) fn read_env_usize(name: &str, default: usize) -> usize {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_optional_usize(name: &str) -> Option<usize> {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|value| *value > 0)
}

pub(crate) fn read_env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

pub(crate) fn read_env_u32(name: &str, default: u32) -> u32 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

/// Blank values count as unset.
pub(crate) fn read_env_secret(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
