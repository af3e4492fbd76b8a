//! Tick-by-tick replay of an instruction stream over a [`World`].

use alloc::vec::Vec;
use core::fmt;
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::instructions::Instruction;
use crate::world::{Vector2, World};

mod engine;

pub use engine::TickEngine;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TickStatus {
    Running,
    /// Every goal has been reached.
    Completed,
    /// An invalid instruction arrived; nothing was mutated.
    Terminated,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickOutcome {
    pub status: TickStatus,
    pub collided: bool,
    pub goal_reached: bool,
}

impl TickOutcome {
    pub fn should_continue(&self) -> bool {
        self.status == TickStatus::Running
    }
}

/// Read-only copy of the mutable replay state, for save/restore.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub position: Vector2,
    pub velocity: Vector2,
    pub tick: i32,
    pub reached_goals: Vec<bool>,
    pub goals_reached: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SnapshotMismatch {
    pub expected_goals: usize,
    pub found_goals: usize,
}

impl fmt::Display for SnapshotMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "snapshot tracks {} goals but the world has {}",
            self.found_goals, self.expected_goals
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for SnapshotMismatch {}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub events: Vec<Event>,
    /// `Running` when the stream ran out before any terminal tick.
    pub status: TickStatus,
    pub ticks: i32,
    pub goals_reached: usize,
    pub instructions_consumed: usize,
    /// Ticks in which at least one collision was resolved.
    pub collision_ticks: usize,
}

/// Replays `instructions` from the world's initial state and returns the
/// event log.
pub fn simulate(world: &World, instructions: &[Instruction]) -> Vec<Event> {
    TickEngine::new(world).simulate(instructions)
}

pub fn replay(world: &World, instructions: &[Instruction]) -> ReplayResult {
    TickEngine::new(world).replay(instructions)
}
