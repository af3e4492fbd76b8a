//! Engine tunables.
//!
//! Every value that shapes a replay is a named constant here; [`SimConfig`]
//! bundles them so tests can swap in alternates (a coarser grid, fewer
//! collision passes) without touching engine code.

use serde::{Deserialize, Serialize};

/// Cell count along the longer axis of the obstacle grid.
pub const GRID_AXIS_CELL_TARGET: i32 = 128;

/// Upper bound on any grid override; the grid allocates up to its square.
pub const MAX_GRID_AXIS_CELLS: i32 = 1024;

/// Velocity kept per tick before the new acceleration is added (9/10).
pub const DRAG_FRACTION: (i32, i32) = (9, 10);

/// Velocity kept after a tick in which any collision was resolved (1/2).
pub const COLLISION_FRACTION: (i32, i32) = (1, 2);

/// Push-out passes per tick.
pub const MAX_COLLISION_RESOLUTIONS: usize = 5;

pub const INSTRUCTION_MIN: i32 = -128;
pub const INSTRUCTION_MAX: i32 = 127;

/// Instructions must lie inside the disc of radius 127.
pub const MAX_ACCELERATION: i32 = 127;
pub const MAX_ACCELERATION_SQ: i32 = MAX_ACCELERATION * MAX_ACCELERATION;

/// Upper bound on submitted stream length used by the verifier by default.
pub const MAX_INSTRUCTIONS_DEFAULT: u32 = 100_000;

/// Which velocity components a state snapshot reports.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VelocitySnapshot {
    /// `vx` from the x component, `vy` from the y component.
    #[default]
    Actual,
    /// Both fields mirror the y component, reproducing logs written by the
    /// first C++ engine byte for byte.
    LegacyMirrorY,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimConfig {
    pub grid_axis_cells: i32,
    pub drag: (i32, i32),
    pub collision_retention: (i32, i32),
    pub max_collision_resolutions: usize,
    pub instruction_min: i32,
    pub instruction_max: i32,
    pub max_acceleration_sq: i32,
    pub velocity_snapshot: VelocitySnapshot,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid_axis_cells: GRID_AXIS_CELL_TARGET,
            drag: DRAG_FRACTION,
            collision_retention: COLLISION_FRACTION,
            max_collision_resolutions: MAX_COLLISION_RESOLUTIONS,
            instruction_min: INSTRUCTION_MIN,
            instruction_max: INSTRUCTION_MAX,
            max_acceleration_sq: MAX_ACCELERATION_SQ,
            velocity_snapshot: VelocitySnapshot::Actual,
        }
    }
}

impl SimConfig {
    pub fn with_velocity_snapshot(mut self, velocity_snapshot: VelocitySnapshot) -> Self {
        self.velocity_snapshot = velocity_snapshot;
        self
    }

    pub fn with_grid_axis_cells(mut self, cells: i32) -> Self {
        self.grid_axis_cells = cells.clamp(1, MAX_GRID_AXIS_CELLS);
        self
    }
}
