use std::{fmt, fs, path::Path, str::FromStr};

use anyhow::{anyhow, Context, Result};
use asteracer_core::{
    encode_events, event_log_checksum, parse_instructions, parse_map, replay,
    verify_instructions_with_limit, Event, Instruction, MapDescription, SimConfig, TickStatus,
    VelocitySnapshot, VerificationJournal, VerifyError,
};
use serde::{Deserialize, Serialize};

pub use asteracer_core::constants::{
    GRID_AXIS_CELL_TARGET, MAX_GRID_AXIS_CELLS, MAX_INSTRUCTIONS_DEFAULT,
};

/// Full marks, in thousandths of a point.
pub const MAX_SCORE_MILLIS: u32 = 12_000;

pub fn load_map(path: &Path) -> Result<MapDescription> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read map: {}", path.display()))?;
    parse_map(&text).with_context(|| format!("invalid map file: {}", path.display()))
}

pub fn load_instructions(path: &Path) -> Result<Vec<Instruction>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read instructions: {}", path.display()))?;
    parse_instructions(&text)
        .with_context(|| format!("invalid instruction file: {}", path.display()))
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_vec_pretty(value).context("failed to serialize json")?;
    fs::write(path, json).with_context(|| format!("failed writing {}", path.display()))
}

/// Writes the flat `[kind, x, y, vx, vy, index, tick]` word stream as a JSON
/// array, the layout embedders consume.
pub fn write_event_words(path: &Path, events: &[Event]) -> Result<()> {
    write_json(path, &encode_events(events)).context("failed writing event words")
}

/// Score for a verified run of `length` instructions against a course whose
/// reference solution takes `target_length`.
///
/// At or under the target earns full marks; longer runs earn
/// `target / (length - target)` points, capped at full marks.
pub fn score_millis(length: u32, target_length: u32) -> u32 {
    if length <= target_length {
        return MAX_SCORE_MILLIS;
    }
    let over = u64::from(length - target_length);
    let millis = u64::from(target_length) * 1_000 / over;
    u32::try_from(millis.min(u64::from(MAX_SCORE_MILLIS))).unwrap_or(MAX_SCORE_MILLIS)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationReport {
    #[serde(flatten)]
    pub journal: VerificationJournal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_millis: Option<u32>,
}

impl VerificationReport {
    pub fn new(journal: VerificationJournal, target_length: Option<u32>) -> Self {
        let score_millis =
            target_length.map(|target| score_millis(journal.instructions_submitted, target));
        Self {
            journal,
            score_millis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VelocityMode {
    #[default]
    Actual,
    Legacy,
}

impl VelocityMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Actual => "actual",
            Self::Legacy => "legacy",
        }
    }

    fn snapshot(self) -> VelocitySnapshot {
        match self {
            Self::Actual => VelocitySnapshot::Actual,
            Self::Legacy => VelocitySnapshot::LegacyMirrorY,
        }
    }
}

impl FromStr for VelocityMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "actual" => Ok(Self::Actual),
            "legacy" => Ok(Self::Legacy),
            _ => Err(anyhow!(
                "invalid velocity mode: {value} (expected actual|legacy)"
            )),
        }
    }
}

impl fmt::Display for VelocityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimulateOptions {
    pub velocity_mode: VelocityMode,
    pub grid_axis_cells: i32,
}

impl Default for SimulateOptions {
    fn default() -> Self {
        Self {
            velocity_mode: VelocityMode::Actual,
            grid_axis_cells: GRID_AXIS_CELL_TARGET,
        }
    }
}

impl SimulateOptions {
    pub fn config(&self) -> SimConfig {
        SimConfig::default()
            .with_velocity_snapshot(self.velocity_mode.snapshot())
            .with_grid_axis_cells(self.grid_axis_cells)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub status: TickStatus,
    pub ticks: i32,
    pub goals_reached: usize,
    pub goal_count: usize,
    pub instructions_submitted: usize,
    pub instructions_consumed: usize,
    pub collision_ticks: usize,
    pub event_count: usize,
    pub event_log_checksum: u32,
    pub velocity_mode: VelocityMode,
    pub events: Vec<Event>,
}

pub fn run_simulation(
    map: &MapDescription,
    instructions: &[Instruction],
    options: SimulateOptions,
) -> SimulationReport {
    let world = map.build(options.config());
    let result = replay(&world, instructions);

    tracing::debug!(
        status = ?result.status,
        ticks = result.ticks,
        events = result.events.len(),
        "replay finished"
    );

    SimulationReport {
        status: result.status,
        ticks: result.ticks,
        goals_reached: result.goals_reached,
        goal_count: map.goals.len(),
        instructions_submitted: instructions.len(),
        instructions_consumed: result.instructions_consumed,
        collision_ticks: result.collision_ticks,
        event_count: result.events.len(),
        event_log_checksum: event_log_checksum(&result.events),
        velocity_mode: options.velocity_mode,
        events: result.events,
    }
}

/// Journals always come from the canonical engine settings so they compare
/// across hosts.
pub fn run_verification(
    map: &MapDescription,
    instructions: &[Instruction],
    max_instructions: u32,
) -> Result<VerificationJournal, VerifyError> {
    let world = map.build(SimConfig::default());
    let outcome = verify_instructions_with_limit(&world, instructions, max_instructions);

    match &outcome {
        Ok(journal) => tracing::info!(
            ticks = journal.ticks,
            goals = journal.goals_reached,
            "run verified"
        ),
        Err(err) => tracing::info!(code = err.code(), "run rejected: {err}"),
    }

    outcome
}
