use asteracer_core::{Event, Instruction, TickStatus, VerificationJournal};
pub(crate) use host::{SimulationReport, VelocityMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ReplayRequest {
    /// Map in the plain-text world format.
    pub(crate) map: String,
    pub(crate) instructions: Vec<[i32; 2]>,
    #[serde(default)]
    pub(crate) velocity_mode: Option<VelocityMode>,
}

impl ReplayRequest {
    pub(crate) fn instructions(&self) -> Vec<Instruction> {
        self.instructions.iter().copied().map(Instruction::from).collect()
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct SimulateResponse {
    pub(crate) success: bool,
    pub(crate) status: TickStatus,
    pub(crate) ticks: i32,
    pub(crate) goals_reached: usize,
    pub(crate) goal_count: usize,
    pub(crate) instructions_consumed: usize,
    pub(crate) collision_ticks: usize,
    pub(crate) event_log_checksum: u32,
    pub(crate) velocity_mode: VelocityMode,
    pub(crate) events: Vec<Event>,
    pub(crate) elapsed_ms: u64,
}

impl SimulateResponse {
    pub(crate) fn from_report(report: SimulationReport, elapsed_ms: u64) -> Self {
        Self {
            success: true,
            status: report.status,
            ticks: report.ticks,
            goals_reached: report.goals_reached,
            goal_count: report.goal_count,
            instructions_consumed: report.instructions_consumed,
            collision_ticks: report.collision_ticks,
            event_log_checksum: report.event_log_checksum,
            velocity_mode: report.velocity_mode,
            events: report.events,
            elapsed_ms,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct VerifyResponse {
    pub(crate) success: bool,
    pub(crate) journal: VerificationJournal,
    pub(crate) elapsed_ms: u64,
}

#[derive(Debug, Serialize)]
pub(crate) struct HealthResponse {
    pub(crate) status: &'static str,
    pub(crate) service: &'static str,
    pub(crate) version: &'static str,
    pub(crate) max_instructions: u32,
    pub(crate) max_body_bytes: usize,
    pub(crate) replay_concurrency: usize,
    pub(crate) available_replay_slots: usize,
    pub(crate) replay_timeout_secs: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) http_workers: Option<usize>,
    pub(crate) auth_required: bool,
}
