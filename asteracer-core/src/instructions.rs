//! Per-tick acceleration input and its plain-text file format.
//!
//! ```text
//! 4          # number of instructions
//! -16 -127
//! -16 -127
//! -26 -125
//! -30 -124
//! ```
//!
//! Values are read as full `i32`. Range checking is the engine's job: an
//! out-of-range instruction still parses and later ends the run with an
//! `InvalidInstruction` event.

use alloc::{format, string::String, vec::Vec};
use core::fmt::Write;
use serde::{Deserialize, Serialize};

use crate::constants::{
    INSTRUCTION_MAX, INSTRUCTION_MIN, MAX_ACCELERATION, MAX_ACCELERATION_SQ,
};
use crate::error::InstructionsError;
use crate::math::{distance, distance_squared};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instruction {
    pub x: i32,
    pub y: i32,
}

impl Instruction {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Both components in `[-128, 127]` and inside the disc of radius 127.
    pub fn is_valid(&self) -> bool {
        is_valid_within(*self, INSTRUCTION_MIN, INSTRUCTION_MAX, MAX_ACCELERATION_SQ)
    }

    /// Scales `(x, y)` onto the valid disc. Components are truncated toward
    /// zero after scaling, then stepped toward zero until the result is
    /// valid. Valid input comes back untouched.
    pub fn normalized(x: i32, y: i32) -> Self {
        let candidate = Self::new(x, y);
        if candidate.is_valid() {
            return candidate;
        }

        let (wide_x, wide_y) = (i64::from(x), i64::from(y));
        let limit = i64::from(MAX_ACCELERATION);
        let length = distance(wide_x, wide_y).max(1);

        let scale = |component: i64| (component * limit / length).clamp(-limit, limit);
        let mut scaled = Self::new(scale(wide_x) as i32, scale(wide_y) as i32);

        // The integer length can round down and leave the vector just outside.
        while !scaled.is_valid() {
            scaled.x -= scaled.x.signum();
            scaled.y -= scaled.y.signum();
        }

        scaled
    }
}

pub(crate) fn is_valid_within(instruction: Instruction, min: i32, max: i32, max_sq: i32) -> bool {
    if instruction.x > max || instruction.y > max || instruction.x < min || instruction.y < min {
        return false;
    }

    distance_squared(i64::from(instruction.x), i64::from(instruction.y)) <= i128::from(max_sq)
}

impl From<(i32, i32)> for Instruction {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<[i32; 2]> for Instruction {
    fn from([x, y]: [i32; 2]) -> Self {
        Self::new(x, y)
    }
}

pub fn parse_instructions(text: &str) -> Result<Vec<Instruction>, InstructionsError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.split('#').next().unwrap_or("").trim()))
        .filter(|(_, line)| !line.is_empty());

    let (count_line, count_text) = lines.next().ok_or(InstructionsError::MissingCount)?;
    let declared = count_text
        .parse::<usize>()
        .map_err(|_| InstructionsError::InvalidCount { line: count_line })?;

    let mut instructions = Vec::with_capacity(declared.min(1 << 20));
    for (line, content) in lines {
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() != 2 {
            return Err(InstructionsError::FieldCount {
                line,
                found: fields.len(),
            });
        }

        let x = fields[0]
            .parse::<i32>()
            .map_err(|_| InstructionsError::InvalidNumber { line })?;
        let y = fields[1]
            .parse::<i32>()
            .map_err(|_| InstructionsError::InvalidNumber { line })?;
        instructions.push(Instruction::new(x, y));
    }

    if instructions.len() != declared {
        return Err(InstructionsError::CountMismatch {
            declared,
            found: instructions.len(),
        });
    }

    Ok(instructions)
}

pub fn serialize_instructions(instructions: &[Instruction]) -> String {
    let mut out = format!("{}\n", instructions.len());
    for instruction in instructions {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} {}", instruction.x, instruction.y);
    }
    out
}
