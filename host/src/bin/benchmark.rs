use std::{env, path::PathBuf, process, time::Instant};

use anyhow::{anyhow, Context, Result};
use asteracer_core::{event_log_checksum, SimConfig, TickEngine};
use host::{load_instructions, load_map, write_json};
use serde::Serialize;

#[derive(Debug)]
struct Cli {
    map_path: PathBuf,
    instructions_path: PathBuf,
    iterations: u32,
    json_out: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BenchmarkJson {
    iterations: u32,
    ticks_per_run: i32,
    events_per_run: usize,
    event_log_checksum: u32,
    obstacles: usize,
    grid_cells: usize,
    total_ms: u128,
    ticks_per_second: u64,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut map_path: Option<PathBuf> = None;
        let mut instructions_path: Option<PathBuf> = None;
        let mut iterations = 100u32;
        let mut json_out: Option<PathBuf> = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--map" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--map requires a file path"))?;
                    map_path = Some(PathBuf::from(value));
                }
                "--instructions" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--instructions requires a file path"))?;
                    instructions_path = Some(PathBuf::from(value));
                }
                "--iterations" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--iterations requires a number"))?;
                    iterations = value
                        .parse::<u32>()
                        .with_context(|| format!("invalid --iterations value: {value}"))?
                        .max(1);
                }
                "--json-out" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--json-out requires a file path"))?;
                    json_out = Some(PathBuf::from(value));
                }
                "-h" | "--help" => {
                    println!(
                        "Usage: cargo run --release -p asteracer-host --bin benchmark -- --map <file> --instructions <file> [--iterations <n>] [--json-out <file.json>]"
                    );
                    process::exit(0);
                }
                other => return Err(anyhow!("unknown argument: {other}. Use --help for usage.")),
            }
        }

        let map_path = map_path.ok_or_else(|| anyhow!("--map is required"))?;
        let instructions_path =
            instructions_path.ok_or_else(|| anyhow!("--instructions is required"))?;
        Ok(Self {
            map_path,
            instructions_path,
            iterations,
            json_out,
        })
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse()?;
    let map = load_map(&cli.map_path)?;
    let instructions = load_instructions(&cli.instructions_path)?;
    let world = map.build(SimConfig::default());
    let mut engine = TickEngine::new(&world);

    let reference = engine.replay(&instructions);
    let expected_checksum = event_log_checksum(&reference.events);

    let started = Instant::now();
    for iteration in 0..cli.iterations {
        let events = engine.simulate(&instructions);
        let checksum = event_log_checksum(&events);
        if checksum != expected_checksum {
            return Err(anyhow!(
                "replay diverged on iteration {iteration}: checksum {checksum:#010x} != {expected_checksum:#010x}"
            ));
        }
    }
    let elapsed = started.elapsed();

    let total_ticks = u64::try_from(reference.ticks).unwrap_or(0) * u64::from(cli.iterations);
    let ticks_per_second = if elapsed.as_nanos() == 0 {
        0
    } else {
        (u128::from(total_ticks) * 1_000_000_000 / elapsed.as_nanos()) as u64
    };

    let grid = world.obstacle_grid();
    let summary = BenchmarkJson {
        iterations: cli.iterations,
        ticks_per_run: reference.ticks,
        events_per_run: reference.events.len(),
        event_log_checksum: expected_checksum,
        obstacles: world.obstacles().len(),
        grid_cells: grid.cells_x() * grid.cells_y(),
        total_ms: elapsed.as_millis(),
        ticks_per_second,
    };

    if let Some(path) = cli.json_out.as_ref() {
        write_json(path, &summary).context("failed writing benchmark summary")?;
    }

    println!("Benchmark complete.");
    println!("  Iterations:    {}", summary.iterations);
    println!("  Ticks/run:     {}", summary.ticks_per_run);
    println!("  Events/run:    {}", summary.events_per_run);
    println!("  Log checksum:  0x{:08x}", summary.event_log_checksum);
    println!("  Obstacles:     {}", summary.obstacles);
    println!("  Grid cells:    {}", summary.grid_cells);
    println!("  Total ms:      {}", summary.total_ms);
    println!("  Ticks/second:  {}", summary.ticks_per_second);

    Ok(())
}
