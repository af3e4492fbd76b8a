#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod checksum;
pub mod constants;
pub mod error;
pub mod event;
pub mod grid;
pub mod instructions;
pub mod map;
pub mod math;
pub mod sim;
pub mod verify;
pub mod world;

pub use constants::{SimConfig, VelocitySnapshot};
pub use error::{InstructionsError, MapError, VerifyError};
pub use event::{encode_events, event_log_checksum, Event, EventKind};
pub use instructions::{parse_instructions, serialize_instructions, Instruction};
pub use map::{parse_map, MapDescription};
pub use sim::{
    replay, simulate, ReplayResult, SnapshotMismatch, StateSnapshot, TickEngine, TickOutcome,
    TickStatus,
};
pub use verify::{
    verify_instructions, verify_instructions_with_limit, verify_text, VerificationJournal,
};
pub use world::{Arena, Circle, Vector2, World};
