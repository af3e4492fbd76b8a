use std::fs;

use asteracer_core::{EventKind, Instruction, TickStatus, VerifyError};
use host::{
    load_instructions, load_map, run_simulation, run_verification, score_millis,
    write_event_words, write_json, SimulateOptions, VelocityMode, VerificationReport,
    MAX_SCORE_MILLIS,
};
use tempfile::TempDir;

const MAP: &str = "\
# finish line pressed against the right wall
0 0 10
-100 -100 100 100
0
1
85 0 5
";

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

#[test]
fn loads_and_simulates_from_disk() {
    let dir = TempDir::new().unwrap();
    let map = load_map(&write(&dir, "wall.map", MAP)).unwrap();
    let instructions = load_instructions(&write(&dir, "run.txt", "1\n100 2\n")).unwrap();

    let report = run_simulation(&map, &instructions, SimulateOptions::default());
    assert_eq!(report.status, TickStatus::Completed);
    assert_eq!(report.ticks, 1);
    assert_eq!(report.collision_ticks, 1);
    assert_eq!(
        report.events.iter().map(|event| event.kind).collect::<Vec<_>>(),
        vec![EventKind::Move, EventKind::CollisionResult, EventKind::Goal]
    );
    assert_eq!(report.events[0].vx, 100);

    let legacy = run_simulation(
        &map,
        &instructions,
        SimulateOptions {
            velocity_mode: VelocityMode::Legacy,
            ..SimulateOptions::default()
        },
    );
    assert_eq!(legacy.events[0].vx, 2);
    assert_ne!(legacy.event_log_checksum, report.event_log_checksum);
}

#[test]
fn missing_files_name_the_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.map");

    let err = load_map(&missing).unwrap_err();
    assert!(format!("{err:#}").contains("nope.map"));

    let bad = write(&dir, "bad.txt", "2\n1 1\n");
    let err = load_instructions(&bad).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("bad.txt"));
    assert!(message.contains("declared 2, found 1"));
}

#[test]
fn verification_reports_codes() {
    let dir = TempDir::new().unwrap();
    let map = load_map(&write(&dir, "wall.map", MAP)).unwrap();

    let journal = run_verification(&map, &[Instruction::new(100, 0)], 10).unwrap();
    assert_eq!(journal.ticks, 1);
    assert_eq!(journal.map_checksum, map.checksum());

    let err = run_verification(&map, &[Instruction::new(0, 0)], 10).unwrap_err();
    assert_eq!(err.code(), "goals_unreached");

    let err = run_verification(&map, &[Instruction::new(0, 0); 3], 2).unwrap_err();
    assert_eq!(err, VerifyError::TooManyInstructions { count: 3, max: 2 });
}

#[test]
fn writes_pretty_json() {
    let dir = TempDir::new().unwrap();
    let map = load_map(&write(&dir, "wall.map", MAP)).unwrap();
    let journal = run_verification(&map, &[Instruction::new(100, 0)], 10).unwrap();

    let out = dir.path().join("journal.json");
    write_json(&out, &journal).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(parsed["ticks"], 1);
    assert_eq!(parsed["goals_reached"], 1);
}

#[test]
fn writes_flat_event_words() {
    let dir = TempDir::new().unwrap();
    let map = load_map(&write(&dir, "wall.map", MAP)).unwrap();
    let report = run_simulation(&map, &[Instruction::new(100, 0)], SimulateOptions::default());

    let out = dir.path().join("words.json");
    write_event_words(&out, &report.events).unwrap();

    let words: Vec<i32> = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(words.len(), 7 * report.events.len());
    // move, then the wall clamp, then goal 0
    assert_eq!(words[..7], [1, 100, 0, 100, 0, -1, 1]);
    assert_eq!(words[7..14], [3, 90, 0, 50, 0, -1, 1]);
    assert_eq!(words[14..], [2, 90, 0, 50, 0, 0, 1]);
}

#[test]
fn scores_by_run_length() {
    assert_eq!(score_millis(900, 1151), MAX_SCORE_MILLIS);
    assert_eq!(score_millis(1151, 1151), MAX_SCORE_MILLIS);
    // Just over the target would be worth more than full marks uncapped.
    assert_eq!(score_millis(1152, 1151), MAX_SCORE_MILLIS);
    assert_eq!(score_millis(2302, 1151), 1_000);
    assert_eq!(score_millis(4604, 1151), 333);
    assert_eq!(score_millis(u32::MAX, 0), 0);
}

#[test]
fn scored_journal_flattens_into_json() {
    let dir = TempDir::new().unwrap();
    let map = load_map(&write(&dir, "wall.map", MAP)).unwrap();
    let journal = run_verification(&map, &[Instruction::new(100, 0); 3], 10).unwrap();

    let scored = serde_json::to_value(VerificationReport::new(journal.clone(), Some(1))).unwrap();
    assert_eq!(scored["instructions_submitted"], 3);
    assert_eq!(scored["score_millis"], 500);

    let unscored = serde_json::to_value(VerificationReport::new(journal, None)).unwrap();
    assert!(unscored.get("score_millis").is_none());
}
