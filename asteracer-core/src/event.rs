//! The replay's only output: an append-only log of tagged records.

use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::checksum::Crc32;

/// Numeric values are the wire discriminators of the flat encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(i32)]
pub enum EventKind {
    Move = 1,
    Goal = 2,
    CollisionResult = 3,
    InvalidInstruction = 4,
}

impl EventKind {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// One emitted record.
///
/// For `InvalidInstruction` the position fields carry the rejected
/// instruction and `index` the tick it arrived on. For `Goal`, `index` is the
/// goal's position in the world's goal list. Other kinds leave it unset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub tick: i32,
    pub x: i32,
    pub y: i32,
    pub vx: i32,
    pub vy: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

pub const EVENT_WORDS: usize = 7;

impl Event {
    /// `index` with the `-1` sentinel used by the flat encoding.
    pub fn raw_index(&self) -> i32 {
        self.index.map(|index| index as i32).unwrap_or(-1)
    }

    /// `[kind, x, y, vx, vy, index, tick]`
    pub fn to_words(&self) -> [i32; EVENT_WORDS] {
        [
            self.kind.code(),
            self.x,
            self.y,
            self.vx,
            self.vy,
            self.raw_index(),
            self.tick,
        ]
    }
}

/// Flattens a log into consecutive `to_words` blocks.
pub fn encode_events(events: &[Event]) -> Vec<i32> {
    let mut out = Vec::with_capacity(events.len() * EVENT_WORDS);
    for event in events {
        out.extend_from_slice(&event.to_words());
    }
    out
}

/// CRC-32 over the little-endian bytes of the flat encoding.
pub fn event_log_checksum(events: &[Event]) -> u32 {
    let mut crc = Crc32::new();
    for event in events {
        for word in event.to_words() {
            crc.update_i32(word);
        }
    }
    crc.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::crc32;

    fn goal_event() -> Event {
        Event {
            kind: EventKind::Goal,
            tick: 3,
            x: -10,
            y: 20,
            vx: 4,
            vy: -5,
            index: Some(2),
        }
    }

    #[test]
    fn flat_encoding_layout() {
        let mut event = goal_event();
        assert_eq!(event.to_words(), [2, -10, 20, 4, -5, 2, 3]);

        event.kind = EventKind::Move;
        event.index = None;
        assert_eq!(event.to_words(), [1, -10, 20, 4, -5, -1, 3]);
    }

    #[test]
    fn encoding_concatenates_blocks_in_log_order() {
        let mut moved = goal_event();
        moved.kind = EventKind::Move;
        moved.index = None;

        let words = encode_events(&[moved, goal_event()]);
        assert_eq!(words.len(), 2 * EVENT_WORDS);
        assert_eq!(words[..EVENT_WORDS], moved.to_words());
        assert_eq!(words[EVENT_WORDS..], goal_event().to_words());
    }

    #[test]
    fn checksum_covers_flat_bytes() {
        let events = [goal_event(), goal_event()];
        let bytes: Vec<u8> = encode_events(&events)
            .iter()
            .flat_map(|word| word.to_le_bytes())
            .collect();
        assert_eq!(event_log_checksum(&events), crc32(&bytes));
        assert_ne!(event_log_checksum(&events[..1]), event_log_checksum(&events));
    }

    #[test]
    fn json_shape() {
        let json = serde_json::to_value(goal_event()).unwrap();
        assert_eq!(json["kind"], "goal");
        assert_eq!(json["index"], 2);

        let mut moved = goal_event();
        moved.kind = EventKind::CollisionResult;
        moved.index = None;
        let json = serde_json::to_value(moved).unwrap();
        assert_eq!(json["kind"], "collision_result");
        assert!(json.get("index").is_none());
    }
}
