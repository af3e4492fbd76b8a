use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::constants::SimConfig;
use crate::grid::GridLookup;
use crate::map::MapDescription;

/// A positioned disc: obstacles, goals and the racer all share this shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Circle {
    pub x: i32,
    pub y: i32,
    pub r: i32,
}

impl Circle {
    pub const fn new(x: i32, y: i32, r: i32) -> Self {
        Self { x, y, r }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vector2 {
    pub x: i32,
    pub y: i32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned play area. The racer's whole disc must stay inside it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Arena {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Arena {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

/// Immutable snapshot of everything a replay reads.
///
/// Obstacles are copied in at construction; nothing outside the world can
/// reach them afterwards. A `World` is `Sync` and can back any
/// number of independent replays at once.
#[derive(Clone, Debug)]
pub struct World {
    arena: Arena,
    racer: Circle,
    goals: Vec<Circle>,
    obstacles: Vec<Circle>,
    grid: GridLookup,
    config: SimConfig,
}

impl World {
    pub fn new(arena: Arena, obstacles: &[Circle], racer: Circle, goals: &[Circle]) -> Self {
        Self::with_config(arena, obstacles, racer, goals, SimConfig::default())
    }

    pub fn with_config(
        arena: Arena,
        obstacles: &[Circle],
        racer: Circle,
        goals: &[Circle],
        config: SimConfig,
    ) -> Self {
        Self {
            arena,
            racer,
            goals: goals.to_vec(),
            obstacles: obstacles.to_vec(),
            grid: GridLookup::new(obstacles, racer.r, config.grid_axis_cells),
            config,
        }
    }

    pub fn arena(&self) -> Arena {
        self.arena
    }

    /// Starting position and radius of the racer.
    pub fn racer(&self) -> Circle {
        self.racer
    }

    pub fn goals(&self) -> &[Circle] {
        &self.goals
    }

    /// Obstacles in their original order.
    pub fn obstacles(&self) -> &[Circle] {
        &self.obstacles
    }

    pub fn obstacle_grid(&self) -> &GridLookup {
        &self.grid
    }

    /// The map this world was built from.
    pub fn description(&self) -> MapDescription {
        MapDescription {
            racer: self.racer,
            arena: self.arena,
            obstacles: self.obstacles.clone(),
            goals: self.goals.clone(),
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }
}
