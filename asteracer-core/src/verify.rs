use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::constants::{SimConfig, MAX_INSTRUCTIONS_DEFAULT};
use crate::error::VerifyError;
use crate::event::{event_log_checksum, EventKind};
use crate::instructions::{parse_instructions, Instruction};
use crate::map::parse_map;
use crate::sim::{replay, ReplayResult, TickStatus};
use crate::world::World;

/// Public summary of a run that reached every goal.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationJournal {
    pub ticks: u32,
    pub instructions_submitted: u32,
    pub goals_reached: u32,
    /// Ticks in which at least one collision was resolved.
    pub collisions: u32,
    pub event_count: u32,
    pub event_log_checksum: u32,
    pub map_checksum: u32,
}

pub fn verify_instructions(
    world: &World,
    instructions: &[Instruction],
) -> Result<VerificationJournal, VerifyError> {
    verify_instructions_with_limit(world, instructions, MAX_INSTRUCTIONS_DEFAULT)
}

pub fn verify_instructions_with_limit(
    world: &World,
    instructions: &[Instruction],
    max_instructions: u32,
) -> Result<VerificationJournal, VerifyError> {
    verify_with_replay(world, instructions, max_instructions, replay)
}

/// Parses both text formats, then verifies. Nothing is replayed unless both
/// parse cleanly.
pub fn verify_text(
    map_text: &str,
    instructions_text: &str,
    max_instructions: u32,
) -> Result<VerificationJournal, VerifyError> {
    let map = parse_map(map_text)?;
    let instructions = parse_instructions(instructions_text)?;
    let world = map.build(SimConfig::default());
    verify_instructions_with_limit(&world, &instructions, max_instructions)
}

fn verify_with_replay<F>(
    world: &World,
    instructions: &[Instruction],
    max_instructions: u32,
    replay_fn: F,
) -> Result<VerificationJournal, VerifyError>
where
    F: FnOnce(&World, &[Instruction]) -> ReplayResult,
{
    if instructions.is_empty() {
        return Err(VerifyError::EmptyInstructions);
    }
    if instructions.len() > max_instructions as usize {
        return Err(VerifyError::TooManyInstructions {
            count: instructions.len(),
            max: max_instructions,
        });
    }

    let result = replay_fn(world, instructions);

    match result.status {
        TickStatus::Completed => {}
        TickStatus::Terminated => {
            let rejected = result
                .events
                .iter()
                .rev()
                .find(|event| event.kind == EventKind::InvalidInstruction);
            let (tick, x, y) = rejected
                .map(|event| (event.tick, event.x, event.y))
                .unwrap_or((result.ticks, 0, 0));
            return Err(VerifyError::InvalidInstruction { tick, x, y });
        }
        TickStatus::Running => {
            let missing: Vec<usize> = reached_flags(world, &result)
                .iter()
                .enumerate()
                .filter(|(_, hit)| !**hit)
                .map(|(index, _)| index)
                .collect();
            return Err(VerifyError::GoalsUnreached {
                reached: result.goals_reached,
                total: world.goals().len(),
                missing,
            });
        }
    }

    Ok(VerificationJournal {
        ticks: u32::try_from(result.ticks).unwrap_or(0),
        instructions_submitted: to_u32(instructions.len()),
        goals_reached: to_u32(result.goals_reached),
        collisions: to_u32(result.collision_ticks),
        event_count: to_u32(result.events.len()),
        event_log_checksum: event_log_checksum(&result.events),
        map_checksum: world.description().checksum(),
    })
}

fn reached_flags(world: &World, result: &ReplayResult) -> Vec<bool> {
    let mut flags = alloc::vec![false; world.goals().len()];
    for event in &result.events {
        if event.kind != EventKind::Goal {
            continue;
        }
        if let Some(flag) = event.index.and_then(|index| flags.get_mut(index as usize)) {
            *flag = true;
        }
    }
    flags
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
