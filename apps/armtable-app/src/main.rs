//! Arm table CLI.
//!
//! Loads an arm (the built-in 6-joint arm unless a session config or
//! description file says otherwise) and exposes the library operations:
//! - `info`: crate versions and the active arm's size
//! - `describe`: print the arm as a TOML description
//! - `init`: linearize the arm and print the chain
//! - `fk`: joint positions for the current or given angles
//! - `turn`: apply `NAME=DEG` moves and print the notifications
//! - `sweep`: enumerate the workspace and summarize it
//! - `lookup`: enumerate, then find the angle that reaches a point
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); results go to stdout.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use nalgebra::Point3;
use tracing_subscriber::EnvFilter;

use armtable_core::{ArmError, SessionConfig, WorkspaceConfig};
use armtable_kinematics::{ArmController, ArmEvent, WorkspaceEnumerator, WorkspaceTable};
use armtable_model::{load_arm, Arm, ArmDescription};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

/// Serial-link robotic arm kinematics.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Session config (TOML).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Arm description file; overrides the config's `arm_path`.
    #[arg(short, long, global = true)]
    arm: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print crate information.
    Info,

    /// Print the arm as a TOML description.
    Describe,

    /// Linearize the arm and print the ordered chain.
    Init,

    /// Print every joint position.
    Fk {
        /// Angles in chain order (comma separated). Defaults to current angles.
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        angles: Vec<i16>,
    },

    /// Turn joints by name, e.g. `Elbow=45 WristBend=-10`.
    Turn {
        #[arg(required = true, value_parser = parse_move, allow_hyphen_values = true)]
        moves: Vec<(String, i16)>,
    },

    /// Enumerate the workspace and print a summary.
    Sweep {
        #[command(flatten)]
        sweep: SweepArgs,
    },

    /// Find the angle of a chain joint that reaches a point.
    Lookup {
        /// Chain index of the swept joint.
        #[arg(short, long)]
        joint: usize,

        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,

        #[command(flatten)]
        sweep: SweepArgs,
    },
}

/// Overrides for the `[workspace]` section.
#[derive(clap::Args)]
struct SweepArgs {
    /// Sweep step in degrees.
    #[arg(long)]
    step: Option<u16>,

    /// Quantization grid size.
    #[arg(long)]
    resolution: Option<f64>,

    /// Lower bound of the global sweep range.
    #[arg(long, allow_negative_numbers = true)]
    min: Option<i16>,

    /// Upper bound of the global sweep range.
    #[arg(long, allow_negative_numbers = true)]
    max: Option<i16>,
}

impl SweepArgs {
    fn apply(&self, base: &WorkspaceConfig) -> WorkspaceConfig {
        let mut config = base.clone();
        if let Some(step) = self.step {
            config.step_degrees = step;
        }
        if let Some(resolution) = self.resolution {
            config.resolution = resolution;
        }
        config.min_angle = self.min.or(config.min_angle);
        config.max_angle = self.max.or(config.max_angle);
        config
    }
}

fn parse_move(s: &str) -> Result<(String, i16), String> {
    let (name, degrees) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=DEGREES, got '{s}'"))?;
    let degrees = degrees
        .trim()
        .parse()
        .map_err(|e| format!("bad angle in '{s}': {e}"))?;
    Ok((name.trim().to_owned(), degrees))
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

fn load_session(cli: &Cli) -> Result<SessionConfig, ArmError> {
    let mut session = match &cli.config {
        Some(path) => SessionConfig::from_file(path)?,
        None => SessionConfig::default(),
    };
    if let Some(arm) = &cli.arm {
        session.arm_path = Some(arm.clone());
    }
    Ok(session)
}

fn format_point(p: &Point3<f64>) -> String {
    format!("({:>9.3}, {:>9.3}, {:>9.3})", p.x, p.y, p.z)
}

// ---------------------------------------------------------------------------
// Mode implementations
// ---------------------------------------------------------------------------

fn run_info(session: &SessionConfig) -> Result<(), ArmError> {
    println!("armtable v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("crates:");
    println!("  armtable-core       {}", env!("CARGO_PKG_VERSION"));
    println!("  armtable-model      {}", env!("CARGO_PKG_VERSION"));
    println!("  armtable-kinematics {}", env!("CARGO_PKG_VERSION"));
    println!();

    let controller = ArmController::from_session(session)?;
    let arm = controller.arm();
    println!(
        "arm: {} ({} joints, {} linkages)",
        arm.name(),
        arm.joint_count(),
        arm.linkage_count()
    );
    match &session.arm_path {
        Some(path) => println!("source: {}", path.display()),
        None => println!("source: built-in"),
    }
    Ok(())
}

fn run_describe(session: &SessionConfig) -> Result<(), ArmError> {
    let arm = match &session.arm_path {
        Some(path) => load_arm(path)?,
        None => Arm::six_joint(),
    };
    print!("{}", ArmDescription::from_arm(&arm)?.to_toml_string()?);
    Ok(())
}

fn run_init(session: &SessionConfig) -> Result<(), ArmError> {
    let mut controller = ArmController::from_session(session)?;
    controller.initialize_arm()?;
    let positions = controller.joint_positions()?;
    let arm = controller.arm();

    println!("{:>5}  {:<20} {:>6}  position", "index", "joint", "angle");
    let order = controller.chain().into_iter().flat_map(|c| c.joints());
    for (index, &id) in order.enumerate() {
        let joint = arm.joint(id)?;
        println!(
            "{index:>5}  {:<20} {:>6}  {}",
            joint.name(),
            joint.angle(),
            format_point(&positions[index])
        );
    }
    Ok(())
}

/// Joint positions for `angles`, or the current pose when none are given.
/// Given angles must respect every joint's limits.
fn fk_positions(
    controller: &mut ArmController,
    angles: &[i16],
) -> Result<Vec<Point3<f64>>, ArmError> {
    controller.initialize_arm()?;
    match controller.chain() {
        Some(chain) if !angles.is_empty() => {
            chain.check_angles(controller.arm(), angles)?;
            Ok(chain.joint_positions(angles)?)
        }
        _ => controller.joint_positions(),
    }
}

fn run_fk(session: &SessionConfig, angles: &[i16]) -> Result<(), ArmError> {
    let mut controller = ArmController::from_session(session)?;
    let positions = fk_positions(&mut controller, angles)?;
    for (index, p) in positions.iter().enumerate() {
        println!("{index:>3}  {}", format_point(p));
    }
    Ok(())
}

fn run_turn(session: &SessionConfig, moves: &[(String, i16)]) -> Result<(), ArmError> {
    let mut controller = ArmController::from_session(session)?;
    controller.subscribe(|event: &ArmEvent| match event {
        ArmEvent::Initialized { joints, linkages } => {
            println!("initialized: {joints} joints, {linkages} linkages");
        }
        ArmEvent::JointTurned {
            joint, from, to, ..
        } => println!("turned: {joint} {from} -> {to}"),
        ArmEvent::Moved { end_effector } => {
            println!("moved: end effector at {}", format_point(end_effector));
        }
    });
    controller.initialize_arm()?;

    for (name, degrees) in moves {
        controller.turn_named(name, *degrees)?;
    }
    Ok(())
}

fn build_table(
    session: &SessionConfig,
    sweep: &SweepArgs,
) -> Result<WorkspaceTable, ArmError> {
    let mut controller = ArmController::from_session(session)?;
    controller.initialize_arm()?;
    let enumerator = WorkspaceEnumerator::new(sweep.apply(&session.workspace));
    controller.enumerate_workspace(&enumerator)
}

fn run_sweep(session: &SessionConfig, sweep: &SweepArgs) -> Result<(), ArmError> {
    let table = build_table(session, sweep)?;
    let (min, max) = table.range();
    println!("range:      [{min}, {max}]");
    println!("resolution: {}", table.resolution());
    println!("samples:    {}", table.len());
    println!("keys:       {}", table.key_count());

    let n = table.baseline().len();
    for solving in 0..n {
        for joint in (0..n).filter(|&j| j != solving) {
            println!(
                "  solve {solving} / sweep {joint}: {}",
                table.entries_for(solving, joint).count()
            );
        }
    }
    Ok(())
}

fn run_lookup(
    session: &SessionConfig,
    joint: usize,
    target: &Point3<f64>,
    sweep: &SweepArgs,
) -> Result<(), ArmError> {
    let table = build_table(session, sweep)?;
    match table.lookup(joint, target) {
        Some(angle) => println!("exact: joint {joint} at {angle} deg"),
        None => println!("exact: none"),
    }
    match table.nearest(joint, target) {
        Some(entry) => println!(
            "nearest: joint {joint} at {} deg reaches {} (distance {:.3})",
            entry.angle,
            format_point(&entry.position),
            (entry.position - *target).norm()
        ),
        None => println!("nearest: none"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn run(cli: &Cli) -> Result<(), ArmError> {
    let session = load_session(cli)?;
    match &cli.command {
        Some(Commands::Info) | None => run_info(&session),
        Some(Commands::Describe) => run_describe(&session),
        Some(Commands::Init) => run_init(&session),
        Some(Commands::Fk { angles }) => run_fk(&session, angles),
        Some(Commands::Turn { moves }) => run_turn(&session, moves),
        Some(Commands::Sweep { sweep }) => run_sweep(&session, sweep),
        Some(Commands::Lookup {
            joint,
            x,
            y,
            z,
            sweep,
        }) => run_lookup(&session, *joint, &Point3::new(*x, *y, *z), sweep),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use armtable_core::RangeError;

    #[test]
    fn parse_move_accepts_negative_angles() {
        assert_eq!(parse_move("Elbow=-30").unwrap(), ("Elbow".to_owned(), -30));
        assert_eq!(parse_move(" Wrist = 15 ").unwrap(), ("Wrist".to_owned(), 15));
    }

    #[test]
    fn parse_move_rejects_garbage() {
        assert!(parse_move("Elbow").is_err());
        assert!(parse_move("Elbow=far").is_err());
    }

    #[test]
    fn sweep_args_override_config() {
        let args = SweepArgs {
            step: Some(5),
            resolution: None,
            min: Some(-10),
            max: None,
        };
        let base = WorkspaceConfig::default().with_range(0, 90);
        let config = args.apply(&base);
        assert_eq!(config.step_degrees, 5);
        assert_eq!(config.min_angle, Some(-10));
        assert_eq!(config.max_angle, Some(90));
        assert!((config.resolution - base.resolution).abs() < f64::EPSILON);
    }

    #[test]
    fn fk_rejects_angles_outside_limits() {
        let mut controller = ArmController::with_defaults();
        let err = fk_positions(&mut controller, &[0, 0, 90, 300, 90, 0]).unwrap_err();
        assert!(matches!(
            err,
            ArmError::Range(RangeError::OutOfRangeAngle { requested: 300, .. })
        ));
        assert_eq!(fk_positions(&mut controller, &[0, 0, 90, 90, 90, 0]).unwrap().len(), 6);
        assert_eq!(fk_positions(&mut controller, &[]).unwrap().len(), 6);
    }

    #[test]
    fn cli_parses_lookup() {
        let cli = Cli::try_parse_from(["armtable", "lookup", "-j", "1", "10", "-2.5", "0"]).unwrap();
        match cli.command {
            Some(Commands::Lookup { joint, y, .. }) => {
                assert_eq!(joint, 1);
                assert!((y + 2.5).abs() < f64::EPSILON);
            }
            _ => panic!("expected lookup"),
        }
    }
}
