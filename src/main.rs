//! Rebound command-line entry point
//!
//! Level-author tooling: check whether a level can be won, generate solvable
//! levels, and trace the ball path of a winning shot.
//!
//! Logging goes through `RUST_LOG`.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use rebound::generate::{GeneratorParams, generate_solvable};
use rebound::sim::{Level, SolverOptions, find_winning_shot, trace_shot};
use rebound::{PhysicsSettings, TieBreak};

#[derive(Parser, Debug)]
#[command(name = "rebound")]
#[command(about = "Check, generate and trace ball-launch levels")]
struct Cli {
    /// Physics settings JSON; missing or invalid files fall back to defaults
    #[arg(long, global = true, env = "REBOUND_SETTINGS")]
    settings: Option<PathBuf>,
    /// Multi-hit policy (nearest, last_in_order); overrides the settings file
    #[arg(long, global = true, value_parser = parse_tie_break)]
    tie_break: Option<TieBreak>,
    #[command(flatten)]
    solver: SolverArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Search budget overrides; unset flags keep the solver defaults
#[derive(Args, Debug)]
struct SolverArgs {
    /// Frames simulated per shot
    #[arg(long, global = true)]
    max_frames: Option<u32>,
    /// Horizontal launch velocity grid spacing (pixels/s)
    #[arg(long, global = true)]
    velocity_step: Option<f32>,
    /// Phase samples per launch velocity
    #[arg(long, global = true)]
    phase_samples: Option<u32>,
    /// Phase window in seconds; zero or less uses the longest obstacle period
    #[arg(long, global = true, allow_negative_numbers = true)]
    phase_duration: Option<f32>,
}

impl SolverArgs {
    fn options(&self) -> SolverOptions {
        let defaults = SolverOptions::default();
        SolverOptions {
            max_simulated_frames: self.max_frames.unwrap_or(defaults.max_simulated_frames),
            velocity_step: self.velocity_step.unwrap_or(defaults.velocity_step),
            phase_samples: self.phase_samples.unwrap_or(defaults.phase_samples),
            phase_duration_seconds: self
                .phase_duration
                .unwrap_or(defaults.phase_duration_seconds),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search for a winning shot and print the verdict as JSON
    Check { level: PathBuf },
    /// Print the ball path of the first winning shot, one point per tick
    Trace { level: PathBuf },
    /// Generate solvable levels from consecutive seeds
    Generate {
        seed: u64,
        #[arg(default_value_t = 1)]
        count: u32,
        /// Candidate seeds tried per generated level
        #[arg(long, default_value_t = 50)]
        attempts: u32,
        /// Write each level to `<dir>/level_<seed>.json` instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the effective physics settings
    Settings,
}

fn parse_tie_break(s: &str) -> Result<TieBreak, String> {
    TieBreak::from_str(s).ok_or_else(|| format!("unknown tie-break policy '{s}'"))
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => PhysicsSettings::load(path),
        None => PhysicsSettings::default(),
    };
    if let Some(tie_break) = cli.tie_break {
        settings.tie_break = tie_break;
    }
    log::debug!("Tie-break policy: {}", settings.tie_break.as_str());
    let options = cli.solver.options();

    match cli.command {
        Commands::Check { level } => check(&level, &options, &settings),
        Commands::Trace { level } => trace(&level, &options, &settings),
        Commands::Generate {
            seed,
            count,
            attempts,
            out,
        } => generate(seed, count, attempts, out.as_deref(), &options, &settings),
        Commands::Settings => {
            println!("{}", settings.to_json());
            ExitCode::SUCCESS
        }
    }
}

fn load(path: &Path) -> Option<Level> {
    match Level::load(path) {
        Ok(level) => Some(level),
        Err(e) => {
            eprintln!("{}: {e}", path.display());
            None
        }
    }
}

fn check(path: &Path, options: &SolverOptions, settings: &PhysicsSettings) -> ExitCode {
    let Some(level) = load(path) else {
        return ExitCode::from(2);
    };
    let verdict = find_winning_shot(&level, options, settings);
    match serde_json::to_string_pretty(&verdict) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Cannot encode verdict: {e}"),
    }
    if verdict.solvable() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn trace(path: &Path, options: &SolverOptions, settings: &PhysicsSettings) -> ExitCode {
    let Some(level) = load(path) else {
        return ExitCode::from(2);
    };
    let Some(shot) = find_winning_shot(&level, options, settings).shot else {
        eprintln!("{}: no winning shot found", path.display());
        return ExitCode::FAILURE;
    };
    let (outcome, points) = trace_shot(&level, &shot, options.max_simulated_frames, settings);
    log::info!(
        "Traced {} frames, {} bounces, result {:?}",
        outcome.frames,
        outcome.bounces,
        outcome.result
    );
    for p in points {
        println!("{:.2} {:.2}", p.x, p.y);
    }
    ExitCode::SUCCESS
}

fn generate(
    seed: u64,
    count: u32,
    attempts: u32,
    out: Option<&Path>,
    options: &SolverOptions,
    settings: &PhysicsSettings,
) -> ExitCode {
    let params = GeneratorParams::default();
    let mut next_seed = seed;
    for _ in 0..count {
        let Some((level, shot, used_seed)) =
            generate_solvable(next_seed, attempts, &params, options, settings)
        else {
            eprintln!("no solvable level within {attempts} seeds of {next_seed}");
            return ExitCode::FAILURE;
        };
        log::info!(
            "Seed {used_seed}: solvable with v=({:.1}, {:.1}) phase={:.2}s",
            shot.vx,
            shot.vy,
            shot.phase_offset_seconds
        );

        let written = match out {
            Some(dir) => level.save(dir.join(format!("level_{used_seed}.json"))),
            None => level.to_json().map(|json| println!("{json}")),
        };
        if let Err(e) = written {
            eprintln!("{e}");
            return ExitCode::from(2);
        }
        next_seed = used_seed.wrapping_add(1);
    }
    ExitCode::SUCCESS
}
