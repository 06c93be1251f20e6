//! Solve orchestration: builds the tree for a parsed spot and picks the
//! right solver for it. Vanilla CFR handles fully-enumerated river trees;
//! MCCFR handles everything containing chance nodes (range roots) or
//! rollout nodes (flop/turn showdowns).

use crate::actions::{ActionConfig, GeometricSizing};
use crate::bucketing::Bucketer;
use crate::cfr::Cfr;
use crate::error::{SolverError, SolverResult};
use crate::game_tree::{Builder, NodeKind, TreeNode};
use crate::mccfr::Mccfr;
use crate::notation::{GameState, Street};
use crate::strategy::StrategyProfile;

#[derive(Debug, Clone, Copy)]
pub struct GeometricOptions {
    pub target_pot: f64,
    pub num_sizes: usize,
}

#[derive(Debug, Clone)]
pub struct SolveOptions {
    pub iterations: usize,
    pub seed: u64,
    /// Card-abstraction bucket count; 0 disables bucketing.
    pub buckets: usize,
    /// Monte-Carlo sample count for bucketing; 0 means exact enumeration.
    pub bucket_samples: usize,
    pub geometric: Option<GeometricOptions>,
    /// Warm start: accumulators carried over from an earlier solve.
    pub warm_start: Option<StrategyProfile>,
}

impl Default for SolveOptions {
    fn default() -> SolveOptions {
        SolveOptions {
            iterations: 10_000,
            seed: 42,
            buckets: 0,
            bucket_samples: 0,
            geometric: None,
            warm_start: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveMethod {
    VanillaCfr,
    OutcomeSamplingMccfr,
}

pub struct SolveOutcome {
    pub profile: StrategyProfile,
    /// Iterations actually run; smaller than requested when the cap hit.
    pub applied_iterations: usize,
    pub method: SolveMethod,
}

/// Build and solve a spot end to end.
pub fn solve(state: &GameState, options: SolveOptions) -> SolverResult<SolveOutcome> {
    if state.players.len() != 2 {
        return Err(SolverError::PlayerCount(state.players.len()));
    }
    let street = state
        .street()
        .ok_or(SolverError::BoardSize(state.board.len()))?;

    let config = action_config(state, street, &options)?;
    let mut builder = Builder::new(config);

    if options.buckets > 0 {
        let opponent = 1 - state.to_act;
        let opponent_range = &state.players[opponent].range;
        let bucketer = if options.bucket_samples > 0 {
            Bucketer::sampled(
                &state.board,
                opponent_range,
                options.buckets,
                options.bucket_samples,
            )
        } else {
            Bucketer::new(&state.board, opponent_range, options.buckets)
        };
        builder.set_bucketer(bucketer);
    }

    let range0 = &state.players[0].range;
    let range1 = &state.players[1].range;
    let range_vs_range = range0.len() != 1 || range1.len() != 1;

    let root = if range_vs_range {
        builder.build_range(state, range0, range1)?
    } else {
        builder.build(state, range0[0], range1[0])?
    };

    let method = if street == Street::River && !range_vs_range {
        SolveMethod::VanillaCfr
    } else {
        SolveMethod::OutcomeSamplingMccfr
    };

    let warm = options.warm_start.unwrap_or_default();
    let (profile, applied_iterations) = match method {
        SolveMethod::VanillaCfr => {
            let mut solver = Cfr::with_profile(options.seed, warm);
            let applied = solver.train(&root, options.iterations);
            (solver.into_profile(), applied)
        }
        SolveMethod::OutcomeSamplingMccfr => {
            let mut solver = Mccfr::with_profile(options.seed, warm);
            let applied = solver.train(&root, options.iterations);
            (solver.into_profile(), applied)
        }
    };

    Ok(SolveOutcome {
        profile,
        applied_iterations,
        method,
    })
}

/// True if the subtree contains any rollout node.
pub fn has_rollout(node: &TreeNode) -> bool {
    match &node.kind {
        NodeKind::Rollout { .. } => true,
        NodeKind::Decision { children, .. } => children.values().any(has_rollout),
        NodeKind::Chance { outcomes } => outcomes.iter().any(|o| has_rollout(&o.child)),
        NodeKind::Terminal { .. } => false,
    }
}

fn action_config(
    state: &GameState,
    street: Street,
    options: &SolveOptions,
) -> SolverResult<ActionConfig> {
    match options.geometric {
        Some(geo) => {
            let effective_stack = state
                .players
                .iter()
                .map(|p| p.stack)
                .fold(f64::INFINITY, f64::min);
            let sizing =
                GeometricSizing::new(geo.target_pot, street.streets_remaining(), effective_stack);
            sizing.validate()?;
            Ok(ActionConfig::geometric(sizing, geo.num_sizes))
        }
        None => Ok(ActionConfig::default_river()),
    }
}
