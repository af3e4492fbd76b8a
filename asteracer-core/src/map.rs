//! Plain-text world description.
//!
//! ```text
//! 0 0 5              # racer x y radius
//! -1000 -1000 1000 1000
//! 2                  # obstacles
//! 100 0 20
//! -40 60 15
//! 1                  # goals
//! 300 0 10
//! ```
//!
//! Blank lines and lines starting with `#` are skipped; a `#` later in a line
//! starts a trailing comment.

use alloc::{string::String, vec::Vec};
use core::fmt::Write;
use serde::{Deserialize, Serialize};

use crate::checksum::crc32;
use crate::constants::SimConfig;
use crate::error::{MapError, MapSection};
use crate::world::{Arena, Circle, World};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDescription {
    pub racer: Circle,
    pub arena: Arena,
    pub obstacles: Vec<Circle>,
    pub goals: Vec<Circle>,
}

impl MapDescription {
    pub fn build(&self, config: SimConfig) -> World {
        World::with_config(self.arena, &self.obstacles, self.racer, &self.goals, config)
    }

    /// Canonical text form; `parse_map(&map.to_text())` gives `map` back.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} {} {}", self.racer.x, self.racer.y, self.racer.r);
        let _ = writeln!(
            out,
            "{} {} {} {}",
            self.arena.min_x, self.arena.min_y, self.arena.max_x, self.arena.max_y
        );
        write_circles(&mut out, &self.obstacles);
        write_circles(&mut out, &self.goals);
        out
    }

    /// CRC-32 of the canonical text; identifies the map in journals.
    pub fn checksum(&self) -> u32 {
        crc32(self.to_text().as_bytes())
    }
}

fn write_circles(out: &mut String, circles: &[Circle]) {
    let _ = writeln!(out, "{}", circles.len());
    for circle in circles {
        let _ = writeln!(out, "{} {} {}", circle.x, circle.y, circle.r);
    }
}

pub fn parse_map(text: &str) -> Result<MapDescription, MapError> {
    let mut reader = MapReader::new(text);

    let [x, y, r] = reader.record::<3>(MapSection::Racer)?;
    let racer = reader.circle(MapSection::Racer, x, y, r)?;

    let [min_x, min_y, max_x, max_y] = reader.record::<4>(MapSection::Arena)?;
    if min_x > max_x || min_y > max_y {
        return Err(MapError::InvertedBounds { line: reader.line });
    }
    let arena = Arena::new(min_x, min_y, max_x, max_y);

    let obstacles = reader.circles(MapSection::ObstacleCount, MapSection::Obstacle)?;
    let goals = reader.circles(MapSection::GoalCount, MapSection::Goal)?;

    if let Some((line, _)) = reader.next_content() {
        return Err(MapError::TrailingData { line });
    }

    Ok(MapDescription {
        racer,
        arena,
        obstacles,
        goals,
    })
}

struct MapReader<'a> {
    lines: core::iter::Enumerate<core::str::Lines<'a>>,
    /// 1-based number of the last line handed out.
    line: usize,
}

impl<'a> MapReader<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines().enumerate(),
            line: 0,
        }
    }

    fn next_content(&mut self) -> Option<(usize, &'a str)> {
        for (idx, raw) in self.lines.by_ref() {
            let content = raw.split('#').next().unwrap_or("").trim();
            if content.is_empty() {
                continue;
            }
            self.line = idx + 1;
            return Some((self.line, content));
        }
        None
    }

    fn fields(&mut self, section: MapSection, expected: usize) -> Result<Vec<&'a str>, MapError> {
        let (line, content) = self
            .next_content()
            .ok_or(MapError::UnexpectedEnd { expected: section })?;
        let fields: Vec<&str> = content.split_whitespace().collect();
        if fields.len() != expected {
            return Err(MapError::FieldCount {
                line,
                section,
                expected,
                found: fields.len(),
            });
        }
        Ok(fields)
    }

    fn record<const N: usize>(&mut self, section: MapSection) -> Result<[i32; N], MapError> {
        let fields = self.fields(section, N)?;
        let mut values = [0i32; N];
        for (value, field) in values.iter_mut().zip(fields) {
            *value = field.parse().map_err(|_| MapError::InvalidNumber {
                line: self.line,
                section,
            })?;
        }
        Ok(values)
    }

    fn count(&mut self, section: MapSection) -> Result<usize, MapError> {
        let fields = self.fields(section, 1)?;
        fields[0].parse().map_err(|_| MapError::InvalidNumber {
            line: self.line,
            section,
        })
    }

    fn circle(&self, section: MapSection, x: i32, y: i32, r: i32) -> Result<Circle, MapError> {
        if r < 0 {
            return Err(MapError::NegativeRadius {
                line: self.line,
                section,
            });
        }
        Ok(Circle::new(x, y, r))
    }

    fn circles(
        &mut self,
        count_section: MapSection,
        section: MapSection,
    ) -> Result<Vec<Circle>, MapError> {
        let count = self.count(count_section)?;
        let mut circles = Vec::with_capacity(count.min(1 << 16));
        for _ in 0..count {
            let [x, y, r] = self.record::<3>(section)?;
            circles.push(self.circle(section, x, y, r)?);
        }
        Ok(circles)
    }
}
