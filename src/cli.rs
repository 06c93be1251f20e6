use std::fs;
use std::path::PathBuf;

use clap::Parser;
use colored::Colorize;

use crate::display::{board_display, print_error, render_profile, render_profile_aggregated};
use crate::error::SolverResult;
use crate::notation::parse_position;
use crate::solve::{solve, GeometricOptions, SolveMethod, SolveOptions};
use crate::strategy::StrategyProfile;

#[derive(Parser)]
#[command(
    name = "gto-solver",
    version,
    about = "Heads-up postflop GTO solver \u{2014} CFR/MCCFR over betting abstractions."
)]
struct Cli {
    /// Position notation, e.g. "BTN:AsKd:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN"
    position: Option<String>,

    /// Number of solver iterations
    #[arg(long, default_value_t = 10_000)]
    iterations: usize,

    /// RNG seed for MCCFR sampling and rollouts
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Card-abstraction bucket count (0 = disabled)
    #[arg(long, default_value_t = 0)]
    buckets: usize,

    /// Monte-Carlo samples per bucket assignment (0 = exact enumeration)
    #[arg(long, default_value_t = 0)]
    bucket_samples: usize,

    /// Use geometric bet sizing instead of fixed pot fractions
    #[arg(long)]
    geometric: bool,

    /// Target pot in bb for geometric sizing
    #[arg(long, default_value_t = 30.0)]
    target_pot: f64,

    /// Number of geometric bet sizes to generate
    #[arg(long, default_value_t = 1)]
    num_sizes: usize,

    /// Save the strategy profile to a JSON file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Load a strategy profile from a JSON file; with a position it warm
    /// starts the solve, alone it just prints the profile
    #[arg(long)]
    load: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(e) = run_inner(cli) {
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run_inner(cli: Cli) -> SolverResult<()> {
    let loaded = match &cli.load {
        Some(path) => {
            let data = fs::read_to_string(path)?;
            Some(StrategyProfile::from_json(&data)?)
        }
        None => None,
    };

    let position = match &cli.position {
        Some(position) => position,
        None => {
            // Load-only mode: print the stored profile and stop.
            if let Some(profile) = loaded {
                println!(
                    "Loaded strategy profile with {} information sets\n",
                    profile.len()
                );
                print!("{}", render_profile(&profile));
                return Ok(());
            }
            eprintln!("Usage: gto-solver [flags] <position>");
            eprintln!();
            eprintln!("Examples:");
            eprintln!("  # River (vanilla CFR)");
            eprintln!("  gto-solver \"BTN:AsKd:S100/BB:QhQd:S100|P10|Kh9s4c7d2s|>BTN\"");
            eprintln!();
            eprintln!("  # Turn (MCCFR with river rollouts)");
            eprintln!("  gto-solver \"BTN:AA:S100/BB:QQ:S100|P10|Kh9s4c7d|>BTN\"");
            eprintln!();
            eprintln!("  # Flop with geometric sizing and bucketing");
            eprintln!("  gto-solver --geometric --target-pot 30 --buckets 100 \\");
            eprintln!("    \"BTN:AA,KK:S97.5/BB:QQ,JJ:S97.5|P5.5|Th9h2c|>BTN\"");
            std::process::exit(1);
        }
    };

    let state = parse_position(position)?;
    let range_vs_range = state.players.iter().any(|p| p.range.len() > 1);

    if cli.verbose {
        println!("Game state:");
        for player in &state.players {
            if player.range.len() == 1 {
                println!(
                    "  {}: {} ({:.1}bb)",
                    player.position, player.range[0], player.stack
                );
            } else {
                println!(
                    "  {}: {} combos ({:.1}bb)",
                    player.position,
                    player.range.len(),
                    player.stack
                );
            }
        }
        println!("  Pot: {:.1}bb", state.pot);
        println!("  Board: {}", board_display(&state.board));
        println!("  To act: {}\n", state.players[state.to_act].position);
    }

    let options = SolveOptions {
        iterations: cli.iterations,
        seed: cli.seed,
        buckets: cli.buckets,
        bucket_samples: cli.bucket_samples,
        geometric: cli.geometric.then_some(GeometricOptions {
            target_pot: cli.target_pot,
            num_sizes: cli.num_sizes,
        }),
        warm_start: loaded,
    };
    let requested = options.iterations;

    let outcome = solve(&state, options)?;

    let method = match outcome.method {
        SolveMethod::VanillaCfr => "CFR",
        SolveMethod::OutcomeSamplingMccfr => "MCCFR",
    };
    println!(
        "{} {} iterations, {} information sets",
        method.bold(),
        outcome.applied_iterations,
        outcome.profile.len()
    );
    if outcome.applied_iterations < requested {
        println!(
            "(requested {} iterations; capped at {})",
            requested, outcome.applied_iterations
        );
    }
    println!();

    if let Some(path) = &cli.save {
        fs::write(path, outcome.profile.to_json()?)?;
        println!("Strategy saved to {}\n", path.display());
    }

    if range_vs_range {
        print!("{}", render_profile_aggregated(&outcome.profile));
    } else {
        print!("{}", render_profile(&outcome.profile));
    }

    Ok(())
}
