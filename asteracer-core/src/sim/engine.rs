use alloc::vec::Vec;

use crate::constants::VelocitySnapshot;
use crate::event::{Event, EventKind};
use crate::instructions::{is_valid_within, Instruction};
use crate::math::{distance, distance_squared, square};
use crate::world::{Circle, Vector2, World};

use super::{ReplayResult, SnapshotMismatch, StateSnapshot, TickOutcome, TickStatus};

#[derive(Clone, Debug)]
struct SimulationState {
    position: Vector2,
    velocity: Vector2,
    tick: i32,
    reached: Vec<bool>,
    reached_count: usize,
}

impl SimulationState {
    fn initial(world: &World) -> Self {
        let racer = world.racer();
        Self {
            position: Vector2::new(racer.x, racer.y),
            velocity: Vector2::ZERO,
            tick: 0,
            reached: alloc::vec![false; world.goals().len()],
            reached_count: 0,
        }
    }
}

/// Advances one racer through a borrowed [`World`].
///
/// The world is never mutated, so any number of engines may share it.
pub struct TickEngine<'w> {
    world: &'w World,
    state: SimulationState,
}

impl<'w> TickEngine<'w> {
    pub fn new(world: &'w World) -> Self {
        Self {
            world,
            state: SimulationState::initial(world),
        }
    }

    pub fn world(&self) -> &'w World {
        self.world
    }

    pub fn reset(&mut self) {
        self.state = SimulationState::initial(self.world);
    }

    pub fn position(&self) -> Vector2 {
        self.state.position
    }

    pub fn velocity(&self) -> Vector2 {
        self.state.velocity
    }

    pub fn tick_count(&self) -> i32 {
        self.state.tick
    }

    pub fn reached_goals(&self) -> &[bool] {
        &self.state.reached
    }

    pub fn goals_reached(&self) -> usize {
        self.state.reached_count
    }

    pub fn finished(&self) -> bool {
        self.state.reached_count == self.world.goals().len()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            position: self.state.position,
            velocity: self.state.velocity,
            tick: self.state.tick,
            reached_goals: self.state.reached.clone(),
            goals_reached: self.state.reached_count,
        }
    }

    pub fn restore(&mut self, snapshot: &StateSnapshot) -> Result<(), SnapshotMismatch> {
        let expected_goals = self.world.goals().len();
        if snapshot.reached_goals.len() != expected_goals {
            return Err(SnapshotMismatch {
                expected_goals,
                found_goals: snapshot.reached_goals.len(),
            });
        }

        self.state = SimulationState {
            position: snapshot.position,
            velocity: snapshot.velocity,
            tick: snapshot.tick,
            reached: snapshot.reached_goals.clone(),
            reached_count: snapshot.reached_goals.iter().filter(|hit| **hit).count(),
        };
        Ok(())
    }

    /// Applies one instruction, appending whatever it produced to `events`.
    ///
    /// An invalid instruction appends a single `InvalidInstruction` record and
    /// leaves the state untouched.
    pub fn tick(&mut self, instruction: Instruction, events: &mut Vec<Event>) -> TickOutcome {
        let config = self.world.config();
        if !is_valid_within(
            instruction,
            config.instruction_min,
            config.instruction_max,
            config.max_acceleration_sq,
        ) {
            events.push(Event {
                kind: EventKind::InvalidInstruction,
                tick: self.state.tick,
                x: instruction.x,
                y: instruction.y,
                vx: 0,
                vy: 0,
                index: u32::try_from(self.state.tick).ok(),
            });
            return TickOutcome {
                status: TickStatus::Terminated,
                collided: false,
                goal_reached: false,
            };
        }

        self.integrate(instruction);
        self.state.tick += 1;
        events.push(self.state_event(EventKind::Move));

        let collided = self.resolve_collisions(events);
        let goal_reached = self.check_goals(events);

        let status = if self.finished() {
            TickStatus::Completed
        } else {
            TickStatus::Running
        };

        TickOutcome {
            status,
            collided,
            goal_reached,
        }
    }

    /// Resets, then replays `instructions` until the stream ends, every goal
    /// is reached, or an invalid instruction shows up.
    pub fn simulate(&mut self, instructions: &[Instruction]) -> Vec<Event> {
        self.replay(instructions).events
    }

    pub fn replay(&mut self, instructions: &[Instruction]) -> ReplayResult {
        self.reset();

        let mut events = Vec::new();
        let mut status = TickStatus::Running;
        let mut consumed = 0;
        let mut collision_ticks = 0;

        for instruction in instructions {
            let outcome = self.tick(*instruction, &mut events);
            consumed += 1;
            if outcome.collided {
                collision_ticks += 1;
            }
            if !outcome.should_continue() {
                status = outcome.status;
                break;
            }
        }

        ReplayResult {
            events,
            status,
            ticks: self.state.tick,
            goals_reached: self.state.reached_count,
            instructions_consumed: consumed,
            collision_ticks,
        }
    }

    fn integrate(&mut self, instruction: Instruction) {
        let drag = self.world.config().drag;
        let velocity = &mut self.state.velocity;
        velocity.x = scale(velocity.x, drag).saturating_add(instruction.x);
        velocity.y = scale(velocity.y, drag).saturating_add(instruction.y);

        let position = &mut self.state.position;
        position.x = position.x.saturating_add(velocity.x);
        position.y = position.y.saturating_add(velocity.y);
    }

    fn resolve_collisions(&mut self, events: &mut Vec<Event>) -> bool {
        let world = self.world;
        let config = world.config();
        let mut collided = false;

        for _ in 0..config.max_collision_resolutions {
            let mut pass_collided = false;

            let candidates = world
                .obstacle_grid()
                .candidates(self.state.position.x, self.state.position.y);
            for obstacle in candidates {
                if self.push_out(obstacle) {
                    pass_collided = true;
                    events.push(self.state_event(EventKind::CollisionResult));
                    break;
                }
            }

            pass_collided |= self.clamp_to_arena(events);

            if !pass_collided {
                break;
            }
            collided = true;
        }

        if collided {
            let retention = config.collision_retention;
            let velocity = &mut self.state.velocity;
            velocity.x = scale(velocity.x, retention);
            velocity.y = scale(velocity.y, retention);

            // The last record of the tick carries the damped velocity.
            if let Some(last) = events.last_mut() {
                last.vx = velocity.x;
                last.vy = velocity.y;
            }
        }

        collided
    }

    /// Moves the racer straight away from `obstacle` until the discs touch.
    fn push_out(&mut self, obstacle: &Circle) -> bool {
        let position = &mut self.state.position;
        let reach = i64::from(self.world.racer().r) + i64::from(obstacle.r);
        let nx = i64::from(position.x) - i64::from(obstacle.x);
        let ny = i64::from(position.y) - i64::from(obstacle.y);

        if distance_squared(nx, ny) >= square(reach) {
            return false;
        }

        let dist = distance(nx, ny);
        if dist == 0 {
            position.x = narrow(i64::from(position.x) + reach);
            return true;
        }

        let (dist, push_by) = (i128::from(dist), i128::from(dist - reach));
        position.x = narrow(i128::from(position.x) - i128::from(nx) * push_by / dist);
        position.y = narrow(i128::from(position.y) - i128::from(ny) * push_by / dist);
        true
    }

    /// Checks min x, min y, max x, max y in that order; each violated edge
    /// logs its own record.
    fn clamp_to_arena(&mut self, events: &mut Vec<Event>) -> bool {
        let arena = self.world.arena();
        let r = i64::from(self.world.racer().r);
        let mut clamped = false;

        if i64::from(self.state.position.x) - r < i64::from(arena.min_x) {
            self.state.position.x = narrow(i64::from(arena.min_x) + r);
            events.push(self.state_event(EventKind::CollisionResult));
            clamped = true;
        }
        if i64::from(self.state.position.y) - r < i64::from(arena.min_y) {
            self.state.position.y = narrow(i64::from(arena.min_y) + r);
            events.push(self.state_event(EventKind::CollisionResult));
            clamped = true;
        }
        if i64::from(self.state.position.x) + r > i64::from(arena.max_x) {
            self.state.position.x = narrow(i64::from(arena.max_x) - r);
            events.push(self.state_event(EventKind::CollisionResult));
            clamped = true;
        }
        if i64::from(self.state.position.y) + r > i64::from(arena.max_y) {
            self.state.position.y = narrow(i64::from(arena.max_y) - r);
            events.push(self.state_event(EventKind::CollisionResult));
            clamped = true;
        }

        clamped
    }

    /// Goals are tested in list order; each one fires at most once per run.
    fn check_goals(&mut self, events: &mut Vec<Event>) -> bool {
        let racer_r = i64::from(self.world.racer().r);
        let mut any = false;

        for (index, goal) in self.world.goals().iter().enumerate() {
            if self.state.reached[index] {
                continue;
            }

            let dx = i64::from(self.state.position.x) - i64::from(goal.x);
            let dy = i64::from(self.state.position.y) - i64::from(goal.y);
            if distance_squared(dx, dy) > square(racer_r + i64::from(goal.r)) {
                continue;
            }

            self.state.reached[index] = true;
            self.state.reached_count += 1;
            any = true;

            let mut event = self.state_event(EventKind::Goal);
            event.index = u32::try_from(index).ok();
            events.push(event);
        }

        any
    }

    fn state_event(&self, kind: EventKind) -> Event {
        let velocity = self.state.velocity;
        let vx = match self.world.config().velocity_snapshot {
            VelocitySnapshot::Actual => velocity.x,
            VelocitySnapshot::LegacyMirrorY => velocity.y,
        };

        Event {
            kind,
            tick: self.state.tick,
            x: self.state.position.x,
            y: self.state.position.y,
            vx,
            vy: velocity.y,
            index: None,
        }
    }
}

/// `value * num / den`, truncating toward zero.
fn scale(value: i32, (num, den): (i32, i32)) -> i32 {
    narrow(i64::from(value) * i64::from(num) / i64::from(den))
}

fn narrow(value: impl Into<i128>) -> i32 {
    value.into().clamp(i128::from(i32::MIN), i128::from(i32::MAX)) as i32
}
