//! Vanilla Counterfactual Regret Minimization.
//!
//! Walks the whole tree every iteration, so it is deterministic on trees
//! without rollout nodes and is the solver of choice for fully-enumerated
//! river spots. Rollout nodes, if present, are realized by sampling and
//! break that determinism; flop/turn trees belong to MCCFR.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::game_tree::{NodeKind, TreeNode};
use crate::mccfr::realize_rollout;
use crate::strategy::StrategyProfile;

/// Iteration cap applied by `train`, protecting embedded hosts from
/// unbounded solve requests.
pub const MAX_ITERATIONS: usize = 100_000;

pub struct Cfr {
    profile: StrategyProfile,
    rng: StdRng,
}

impl Cfr {
    pub fn new(seed: u64) -> Cfr {
        Cfr {
            profile: StrategyProfile::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Run up to `iterations` iterations (clamped to `MAX_ITERATIONS`).
    /// Returns the number actually applied so callers can detect capping.
    pub fn train(&mut self, root: &TreeNode, iterations: usize) -> usize {
        let applied = iterations.min(MAX_ITERATIONS);
        for _ in 0..applied {
            self.iterate(root);
        }
        applied
    }

    /// A single iteration. Exposed so a host can report progress or poll
    /// cancellation between iterations.
    pub fn iterate(&mut self, root: &TreeNode) {
        self.walk(root, 1.0, 1.0);
    }

    /// Recursive traversal returning the expected value per player.
    /// `reach0`/`reach1` are each player's probability of reaching this
    /// node under the current strategy profile.
    fn walk(&mut self, node: &TreeNode, reach0: f64, reach1: f64) -> [f64; 2] {
        match &node.kind {
            NodeKind::Terminal { payoffs } => *payoffs,

            NodeKind::Rollout { combos } => {
                realize_rollout(node.pot, &node.board, combos, &mut self.rng)
            }

            NodeKind::Chance { outcomes } => {
                let mut value = [0.0, 0.0];
                for outcome in outcomes {
                    let p = outcome.probability;
                    let child_value = self.walk(&outcome.child, reach0 * p, reach1 * p);
                    value[0] += p * child_value[0];
                    value[1] += p * child_value[1];
                }
                value
            }

            NodeKind::Decision {
                player,
                info_set,
                actions,
                children,
            } => {
                let player = *player;
                let current = self
                    .profile
                    .get_or_create(info_set, actions)
                    .current_strategy();

                let mut action_values = vec![[0.0, 0.0]; actions.len()];
                let mut node_value = [0.0, 0.0];

                for (i, action) in actions.iter().enumerate() {
                    let child = match children.get(&action.token()) {
                        Some(child) => child,
                        None => continue,
                    };
                    let child_value = if player == 0 {
                        self.walk(child, reach0 * current[i], reach1)
                    } else {
                        self.walk(child, reach0, reach1 * current[i])
                    };
                    action_values[i] = child_value;
                    node_value[0] += current[i] * child_value[0];
                    node_value[1] += current[i] * child_value[1];
                }

                // Regrets scale with the opponent's reach, the strategy
                // sum with the acting player's own reach.
                let (own_reach, opp_reach) = if player == 0 {
                    (reach0, reach1)
                } else {
                    (reach1, reach0)
                };

                let regrets: Vec<f64> = action_values
                    .iter()
                    .map(|q| opp_reach * (q[player] - node_value[player]))
                    .collect();

                let strategy = self.profile.get_or_create(info_set, actions);
                strategy.add_regrets(&regrets);
                strategy.add_strategy(&current, own_reach);

                node_value
            }
        }
    }

    pub fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    pub fn into_profile(self) -> StrategyProfile {
        self.profile
    }

    /// Seed an existing profile (e.g., loaded from disk) for a warm start.
    pub fn with_profile(seed: u64, profile: StrategyProfile) -> Cfr {
        Cfr {
            profile,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}
