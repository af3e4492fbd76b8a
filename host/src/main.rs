use std::{env, path::PathBuf, process, str::FromStr};

use anyhow::{anyhow, Context, Result};
use host::{
    load_instructions, load_map, run_simulation, run_verification, write_event_words, write_json,
    SimulateOptions, VelocityMode, VerificationReport, GRID_AXIS_CELL_TARGET, MAX_GRID_AXIS_CELLS,
    MAX_INSTRUCTIONS_DEFAULT,
};

const USAGE: &str = "\
Usage:
  asteracer simulate --map <file> --instructions <file> [--events-out <file.json>]
                     [--words-out <file.json>] [--velocity-mode actual|legacy]
                     [--legacy-velocity] [--grid-cells <1..=1024>]
  asteracer verify --map <file> --instructions <file> [--max-instructions <n>]
                   [--target-length <n>] [--journal-out <file.json>]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Simulate,
    Verify,
}

#[derive(Debug)]
struct Cli {
    command: Command,
    map_path: PathBuf,
    instructions_path: PathBuf,
    events_out: Option<PathBuf>,
    words_out: Option<PathBuf>,
    journal_out: Option<PathBuf>,
    max_instructions: u32,
    target_length: Option<u32>,
    velocity_mode: VelocityMode,
    grid_axis_cells: i32,
}

impl Cli {
    fn parse() -> Result<Self> {
        Self::parse_from(env::args().skip(1))
    }

    fn parse_from(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut args = args.into_iter();

        let command = match args.next().as_deref() {
            Some("simulate") => Command::Simulate,
            Some("verify") => Command::Verify,
            Some("-h" | "--help") => {
                println!("{USAGE}");
                process::exit(0);
            }
            Some(other) => return Err(anyhow!("unknown command: {other}. Use --help for usage.")),
            None => return Err(anyhow!("missing command.\n{USAGE}")),
        };

        let mut map_path: Option<PathBuf> = None;
        let mut instructions_path: Option<PathBuf> = None;
        let mut events_out: Option<PathBuf> = None;
        let mut words_out: Option<PathBuf> = None;
        let mut journal_out: Option<PathBuf> = None;
        let mut max_instructions = MAX_INSTRUCTIONS_DEFAULT;
        let mut target_length: Option<u32> = None;
        let mut velocity_mode = VelocityMode::Actual;
        let mut grid_axis_cells = GRID_AXIS_CELL_TARGET;

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
                "--events-out" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--events-out requires a file path"))?;
                    events_out = Some(PathBuf::from(value));
                }
                "--words-out" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--words-out requires a file path"))?;
                    words_out = Some(PathBuf::from(value));
                }
                "--journal-out" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--journal-out requires a file path"))?;
                    journal_out = Some(PathBuf::from(value));
                }
                "--max-instructions" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--max-instructions requires a number"))?;
                    max_instructions = value
                        .parse::<u32>()
                        .with_context(|| format!("invalid --max-instructions value: {value}"))?;
                }
                "--target-length" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--target-length requires a number"))?;
                    target_length = Some(
                        value
                            .parse::<u32>()
                            .with_context(|| format!("invalid --target-length value: {value}"))?,
                    );
                }
                "--velocity-mode" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--velocity-mode requires a value"))?;
                    velocity_mode = VelocityMode::from_str(&value)?;
                }
                "--legacy-velocity" => {
                    velocity_mode = VelocityMode::Legacy;
                }
                "--grid-cells" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--grid-cells requires a number"))?;
                    grid_axis_cells = value
                        .parse::<i32>()
                        .with_context(|| format!("invalid --grid-cells value: {value}"))?;
                    if !(1..=MAX_GRID_AXIS_CELLS).contains(&grid_axis_cells) {
                        return Err(anyhow!(
                            "--grid-cells must be between 1 and {MAX_GRID_AXIS_CELLS}"
                        ));
                    }
                }
                "-h" | "--help" => {
                    println!("{USAGE}");
                    process::exit(0);
                }
                other => return Err(anyhow!("unknown argument: {other}. Use --help for usage.")),
            }
        }

        let map_path = map_path.ok_or_else(|| anyhow!("--map is required"))?;
        let instructions_path =
            instructions_path.ok_or_else(|| anyhow!("--instructions is required"))?;

        Ok(Self {
            command,
            map_path,
            instructions_path,
            events_out,
            words_out,
            journal_out,
            max_instructions,
            target_length,
            velocity_mode,
            grid_axis_cells,
        })
    }
}

fn simulate(cli: &Cli) -> Result<()> {
    let map = load_map(&cli.map_path)?;
    let instructions = load_instructions(&cli.instructions_path)?;

    let report = run_simulation(
        &map,
        &instructions,
        SimulateOptions {
            velocity_mode: cli.velocity_mode,
            grid_axis_cells: cli.grid_axis_cells,
        },
    );

    println!("Simulation finished.");
    println!("  Status:        {:?}", report.status);
    println!("  Ticks:         {}", report.ticks);
    println!(
        "  Goals:         {} / {}",
        report.goals_reached, report.goal_count
    );
    println!(
        "  Instructions:  {} used of {}",
        report.instructions_consumed, report.instructions_submitted
    );
    println!("  Collisions:    {}", report.collision_ticks);
    println!("  Events:        {}", report.event_count);
    println!("  Log checksum:  0x{:08x}", report.event_log_checksum);
    println!("  Velocity mode: {}", report.velocity_mode);

    if let Some(path) = cli.events_out.as_ref() {
        write_json(path, &report.events).context("failed writing event log")?;
        println!("  Events JSON:   {}", path.display());
    }
    if let Some(path) = cli.words_out.as_ref() {
        write_event_words(path, &report.events)?;
        println!("  Event words:   {}", path.display());
    }

    Ok(())
}

fn verify(cli: &Cli) -> Result<()> {
    let map = load_map(&cli.map_path)?;
    let instructions = load_instructions(&cli.instructions_path)?;

    let journal = run_verification(&map, &instructions, cli.max_instructions)
        .map_err(|err| anyhow!("verification failed [{}]: {err}", err.code()))?;

    println!("Run verified.");
    println!("  Ticks:         {}", journal.ticks);
    println!("  Instructions:  {}", journal.instructions_submitted);
    println!("  Goals:         {}", journal.goals_reached);
    println!("  Collisions:    {}", journal.collisions);
    println!("  Events:        {}", journal.event_count);
    println!("  Log checksum:  0x{:08x}", journal.event_log_checksum);
    println!("  Map checksum:  0x{:08x}", journal.map_checksum);

    let report = VerificationReport::new(journal, cli.target_length);
    if let Some(millis) = report.score_millis {
        println!("  Score:         {}.{:03} / 12", millis / 1_000, millis % 1_000);
    }

    if let Some(path) = cli.journal_out.as_ref() {
        write_json(path, &report).context("failed writing journal")?;
        println!("  Journal JSON:  {}", path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::filter::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse()?;
    match cli.command {
        Command::Simulate => simulate(&cli),
        Command::Verify => verify(&cli),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli> {
        Cli::parse_from(args.iter().map(|arg| arg.to_string()))
    }

    #[test]
    fn parses_simulate_flags() {
        let cli = parse(&[
            "simulate",
            "--map",
            "course.map",
            "--instructions",
            "run.txt",
            "--legacy-velocity",
            "--events-out",
            "events.json",
            "--words-out",
            "words.json",
        ])
        .unwrap();

        assert_eq!(cli.command, Command::Simulate);
        assert_eq!(cli.map_path, PathBuf::from("course.map"));
        assert_eq!(cli.velocity_mode, VelocityMode::Legacy);
        assert_eq!(cli.events_out, Some(PathBuf::from("events.json")));
        assert_eq!(cli.words_out, Some(PathBuf::from("words.json")));
        assert_eq!(cli.grid_axis_cells, GRID_AXIS_CELL_TARGET);
    }

    #[test]
    fn parses_verify_flags() {
        let cli = parse(&[
            "verify",
            "--map",
            "a.map",
            "--instructions",
            "b.txt",
            "--max-instructions",
            "42",
            "--target-length",
            "1151",
        ])
        .unwrap();

        assert_eq!(cli.command, Command::Verify);
        assert_eq!(cli.max_instructions, 42);
        assert_eq!(cli.target_length, Some(1151));
        assert!(cli.journal_out.is_none());
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["race"]).is_err());
        assert!(parse(&["verify", "--map", "a.map"]).is_err());
        assert!(parse(&["verify", "--map"]).is_err());

        let simulate = |flag: &str, value: &str| {
            parse(&["simulate", "--map", "a", "--instructions", "b", flag, value])
        };
        assert!(simulate("--velocity-mode", "y").is_err());

        let err = parse(&[
            "verify",
            "--map",
            "a",
            "--instructions",
            "b",
            "--max-instructions",
            "-1",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--max-instructions"));
    }

    #[test]
    fn grid_cells_must_stay_in_range() {
        let simulate = |cells: &str| {
            parse(&["simulate", "--map", "a", "--instructions", "b", "--grid-cells", cells])
        };

        assert_eq!(simulate("1").unwrap().grid_axis_cells, 1);
        assert_eq!(simulate("1024").unwrap().grid_axis_cells, MAX_GRID_AXIS_CELLS);
        assert!(simulate("0").is_err());
        let err = simulate("1000000").unwrap_err();
        assert!(err.to_string().contains("between 1 and 1024"));
    }
}
