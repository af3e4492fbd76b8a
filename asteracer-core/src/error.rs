use alloc::vec::Vec;
use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MapSection {
    Racer,
    Arena,
    ObstacleCount,
    Obstacle,
    GoalCount,
    Goal,
}

impl fmt::Display for MapSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Racer => write!(f, "racer"),
            Self::Arena => write!(f, "arena bounds"),
            Self::ObstacleCount => write!(f, "obstacle count"),
            Self::Obstacle => write!(f, "obstacle"),
            Self::GoalCount => write!(f, "goal count"),
            Self::Goal => write!(f, "goal"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapError {
    UnexpectedEnd { expected: MapSection },
    FieldCount {
        line: usize,
        section: MapSection,
        expected: usize,
        found: usize,
    },
    InvalidNumber { line: usize, section: MapSection },
    NegativeRadius { line: usize, section: MapSection },
    InvertedBounds { line: usize },
    TrailingData { line: usize },
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd { expected } => {
                write!(f, "map ended early: expected {expected}")
            }
            Self::FieldCount {
                line,
                section,
                expected,
                found,
            } => write!(
                f,
                "line {line}: {section} needs {expected} fields, found {found}"
            ),
            Self::InvalidNumber { line, section } => {
                write!(f, "line {line}: {section} field is not an integer")
            }
            Self::NegativeRadius { line, section } => {
                write!(f, "line {line}: {section} radius is negative")
            }
            Self::InvertedBounds { line } => {
                write!(f, "line {line}: arena minimum exceeds maximum")
            }
            Self::TrailingData { line } => write!(f, "line {line}: unexpected data after goals"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InstructionsError {
    MissingCount,
    InvalidCount { line: usize },
    FieldCount { line: usize, found: usize },
    InvalidNumber { line: usize },
    CountMismatch { declared: usize, found: usize },
}

impl fmt::Display for InstructionsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingCount => write!(f, "missing instruction count line"),
            Self::InvalidCount { line } => {
                write!(f, "line {line}: instruction count is not a number")
            }
            Self::FieldCount { line, found } => {
                write!(f, "line {line}: instruction needs 2 numbers, found {found}")
            }
            Self::InvalidNumber { line } => {
                write!(f, "line {line}: instruction component is not an integer")
            }
            Self::CountMismatch { declared, found } => write!(
                f,
                "instruction count mismatch: declared {declared}, found {found}"
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VerifyError {
    Map(MapError),
    Instructions(InstructionsError),
    EmptyInstructions,
    TooManyInstructions { count: usize, max: u32 },
    InvalidInstruction { tick: i32, x: i32, y: i32 },
    GoalsUnreached {
        reached: usize,
        total: usize,
        missing: Vec<usize>,
    },
}

impl VerifyError {
    /// Stable machine-readable code, used by the HTTP API.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Map(_) => "invalid_map",
            Self::Instructions(_) => "invalid_instructions",
            Self::EmptyInstructions => "empty_instructions",
            Self::TooManyInstructions { .. } => "too_many_instructions",
            Self::InvalidInstruction { .. } => "invalid_instruction",
            Self::GoalsUnreached { .. } => "goals_unreached",
        }
    }
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Map(err) => write!(f, "invalid map: {err}"),
            Self::Instructions(err) => write!(f, "invalid instructions: {err}"),
            Self::EmptyInstructions => write!(f, "instruction stream is empty"),
            Self::TooManyInstructions { count, max } => {
                write!(f, "too many instructions: {count} (max {max})")
            }
            Self::InvalidInstruction { tick, x, y } => {
                write!(f, "invalid instruction ({x}, {y}) at tick {tick}")
            }
            Self::GoalsUnreached {
                reached,
                total,
                missing,
            } => {
                write!(f, "reached {reached} of {total} goals; missing")?;
                for (i, goal) in missing.iter().enumerate() {
                    let sep = if i == 0 { " " } else { ", " };
                    write!(f, "{sep}{goal}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<MapError> for VerifyError {
    fn from(err: MapError) -> Self {
        Self::Map(err)
    }
}

impl From<InstructionsError> for VerifyError {
    fn from(err: InstructionsError) -> Self {
        Self::Instructions(err)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for MapError {}

#[cfg(feature = "std")]
impl std::error::Error for InstructionsError {}

#[cfg(feature = "std")]
impl std::error::Error for VerifyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Map(err) => Some(err),
            Self::Instructions(err) => Some(err),
            _ => None,
        }
    }
}
