use crate::error::{SolverError, SolverResult};
use crate::notation::Action;

/// Bets smaller than this (in bb) are dropped from the action set.
pub const MIN_BET: f64 = 0.01;

/// Bet sizes that grow the pot geometrically toward a target across the
/// remaining streets.
#[derive(Debug, Clone, Copy)]
pub struct GeometricSizing {
    /// Desired pot size (in bb) after all remaining streets.
    pub target_pot: f64,
    /// Betting rounds remaining (river = 1, turn = 2, flop = 3).
    pub num_streets: usize,
    /// Effective stack; every size is capped here.
    pub all_in: f64,
}

impl GeometricSizing {
    pub fn new(target_pot: f64, num_streets: usize, all_in: f64) -> GeometricSizing {
        GeometricSizing {
            target_pot,
            num_streets,
            all_in,
        }
    }

    pub fn validate(&self) -> SolverResult<()> {
        if self.target_pot <= 0.0 {
            return Err(SolverError::InvalidTargetPot(self.target_pot));
        }
        if self.all_in <= 0.0 {
            return Err(SolverError::NonPositiveStack(self.all_in));
        }
        Ok(())
    }

    /// Pot fraction achieving per-street growth g = (target/current)^(1/n):
    /// after a bet and a call the pot is current * (1 + 2f), so f = (g-1)/2.
    pub fn bet_fraction(&self, current_pot: f64) -> f64 {
        if self.num_streets == 0 || current_pot <= 0.0 {
            return 0.0;
        }
        let growth = (self.target_pot / current_pot).powf(1.0 / self.num_streets as f64);
        let fraction = (growth - 1.0) / 2.0;
        if fraction * current_pot > self.all_in {
            self.all_in / current_pot
        } else {
            fraction
        }
    }

    /// One or more fractions centered on the geometric size.
    pub fn bet_fractions(&self, current_pot: f64, num_sizes: usize) -> Vec<f64> {
        if num_sizes == 0 {
            return Vec::new();
        }

        let geo = self.bet_fraction(current_pot);
        let mut sizes = match num_sizes {
            1 => vec![geo],
            2 => vec![geo * 0.75, geo * 1.25],
            3 => vec![geo * 0.66, geo, geo * 1.5],
            n => (0..n)
                .map(|i| geo * (0.5 + i as f64 / (n - 1) as f64))
                .collect(),
        };

        for size in &mut sizes {
            if *size * current_pot > self.all_in {
                *size = self.all_in / current_pot;
            }
        }
        sizes
    }
}

/// The betting abstraction: which actions exist at each decision point.
#[derive(Debug, Clone)]
pub struct ActionConfig {
    /// Pot-relative bet sizes (0.5 = half pot). Ignored when geometric
    /// sizing is configured.
    pub bet_sizes: Vec<f64>,
    pub geometric: Option<GeometricSizing>,
    pub num_geometric_sizes: usize,
    pub allow_check: bool,
    pub allow_call: bool,
    pub allow_fold: bool,
}

impl ActionConfig {
    /// Standard sizes for river play: 50%, 75%, and 150% pot.
    pub fn default_river() -> ActionConfig {
        ActionConfig {
            bet_sizes: vec![0.5, 0.75, 1.5],
            geometric: None,
            num_geometric_sizes: 0,
            allow_check: true,
            allow_call: true,
            allow_fold: true,
        }
    }

    pub fn with_bet_sizes(bet_sizes: Vec<f64>) -> ActionConfig {
        ActionConfig {
            bet_sizes,
            ..ActionConfig::default_river()
        }
    }

    pub fn geometric(sizing: GeometricSizing, num_sizes: usize) -> ActionConfig {
        ActionConfig {
            bet_sizes: Vec::new(),
            geometric: Some(sizing),
            num_geometric_sizes: num_sizes.max(1),
            allow_check: true,
            allow_call: true,
            allow_fold: true,
        }
    }
}

/// Legal actions for the acting player. Facing a bet or raise the set is
/// {Fold, Call}; otherwise {Check} plus the configured bet sizes, capped
/// at the remaining stack, with an all-in appended when it is not already
/// among the sizes.
pub fn generate_actions(
    pot: f64,
    stack: f64,
    last_action: Option<&Action>,
    config: &ActionConfig,
) -> Vec<Action> {
    let mut actions = Vec::new();

    if last_action.map_or(false, |a| a.is_bet_or_raise()) {
        if config.allow_fold {
            actions.push(Action::Fold);
        }
        if config.allow_call {
            actions.push(Action::Call);
        }
        return actions;
    }

    if config.allow_check {
        actions.push(Action::Check);
    }

    let fractions = match &config.geometric {
        Some(sizing) => sizing.bet_fractions(pot, config.num_geometric_sizes),
        None => config.bet_sizes.clone(),
    };

    for fraction in &fractions {
        let amount = (pot * fraction).min(stack);
        if amount < MIN_BET {
            continue;
        }
        actions.push(Action::Bet(amount));
    }

    if stack > MIN_BET && !fractions.is_empty() {
        let has_all_in = actions
            .iter()
            .any(|a| matches!(a, Action::Bet(amount) if *amount >= stack - MIN_BET));
        if !has_all_in {
            actions.push(Action::Bet(stack));
        }
    }

    actions
}
