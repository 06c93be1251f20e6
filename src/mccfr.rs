//! Monte-Carlo CFR with outcome sampling.
//!
//! Each iteration follows a single path: one action sampled per decision
//! node according to the current strategy, one outcome per chance node
//! (uniformly, with an importance-sampling correction), and one rollout
//! draw per unresolved showdown. Required whenever the tree contains
//! chance or rollout nodes; deterministic for a fixed seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cards::{remaining_cards, Card};
use crate::cfr::MAX_ITERATIONS;
use crate::game_tree::{NodeKind, TreeNode};
use crate::hand_evaluator::evaluate_with_board;
use crate::ranges::Combo;
use crate::strategy::StrategyProfile;

pub struct Mccfr {
    profile: StrategyProfile,
    rng: StdRng,
}

impl Mccfr {
    pub fn new(seed: u64) -> Mccfr {
        Mccfr {
            profile: StrategyProfile::new(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Run up to `iterations` iterations (clamped to `MAX_ITERATIONS`).
    /// Returns the number actually applied.
    pub fn train(&mut self, root: &TreeNode, iterations: usize) -> usize {
        let applied = iterations.min(MAX_ITERATIONS);
        for _ in 0..applied {
            self.iterate(root);
        }
        applied
    }

    pub fn iterate(&mut self, root: &TreeNode) {
        self.walk(root, 1.0, 1.0, 1.0);
    }

    /// `sample_prob` is the cumulative probability of having sampled this
    /// path, threaded down for the importance-sampling correction.
    fn walk(
        &mut self,
        node: &TreeNode,
        reach0: f64,
        reach1: f64,
        sample_prob: f64,
    ) -> [f64; 2] {
        match &node.kind {
            NodeKind::Terminal { payoffs } => *payoffs,

            NodeKind::Rollout { combos } => {
                realize_rollout(node.pot, &node.board, combos, &mut self.rng)
            }

            NodeKind::Chance { outcomes } => {
                if outcomes.is_empty() {
                    return [0.0, 0.0];
                }
                // Sample uniformly; the true outcome probability enters the
                // reach terms, and the value is corrected by true/uniform.
                let uniform = 1.0 / outcomes.len() as f64;
                let outcome = &outcomes[self.rng.gen_range(0..outcomes.len())];
                let p = outcome.probability;

                let child_value = self.walk(
                    &outcome.child,
                    reach0 * p,
                    reach1 * p,
                    sample_prob * uniform,
                );
                let correction = p / uniform;
                [child_value[0] * correction, child_value[1] * correction]
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

                let sampled = self.sample_action(&current);
                let action = actions[sampled];
                let child = match children.get(&action.token()) {
                    Some(child) => child,
                    None => return [0.0, 0.0],
                };

                let action_prob = current[sampled];
                let (child_reach0, child_reach1) = if player == 0 {
                    (reach0 * action_prob, reach1)
                } else {
                    (reach0, reach1 * action_prob)
                };

                let child_value =
                    self.walk(child, child_reach0, child_reach1, sample_prob * action_prob);

                // Only the sampled action accrues regret this iteration.
                // Unsampled action values are treated as zero, so the node
                // value estimate is sigma[a*] * Q[a*]; the difference is
                // scaled by 1/sample_prob to stay unbiased.
                let node_value_est = action_prob * child_value[player];
                let mut regrets = vec![0.0; actions.len()];
                regrets[sampled] = (child_value[player] - node_value_est) / sample_prob;

                let (own_reach, opp_reach) = if player == 0 {
                    (reach0, reach1)
                } else {
                    (reach1, reach0)
                };
                for regret in &mut regrets {
                    *regret *= opp_reach;
                }

                let strategy = self.profile.get_or_create(info_set, actions);
                strategy.add_regrets(&regrets);
                strategy.add_strategy(&current, own_reach);

                child_value
            }
        }
    }

    /// Sample an action index from a probability distribution.
    fn sample_action(&mut self, strategy: &[f64]) -> usize {
        let r: f64 = self.rng.gen();
        let mut cumulative = 0.0;
        for (i, &p) in strategy.iter().enumerate() {
            cumulative += p;
            if r <= cumulative {
                return i;
            }
        }
        strategy.len() - 1
    }

    pub fn profile(&self) -> &StrategyProfile {
        &self.profile
    }

    pub fn into_profile(self) -> StrategyProfile {
        self.profile
    }

    /// Seed an existing profile (e.g., loaded from disk) for a warm start.
    pub fn with_profile(seed: u64, profile: StrategyProfile) -> Mccfr {
        Mccfr {
            profile,
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

/// Realize an unresolved showdown: draw the missing community cards
/// uniformly without replacement from the cards unseen by either combo,
/// then award the pot to the better seven-card hand (split on a tie).
/// An impossibly short deck falls back to an even split.
pub fn realize_rollout(
    pot: f64,
    board: &[Card],
    combos: &[Combo; 2],
    rng: &mut StdRng,
) -> [f64; 2] {
    let missing = match board.len() {
        3 => 2,
        4 => 1,
        _ => return [pot / 2.0, pot / 2.0],
    };

    let mut dead: Vec<Card> = board.to_vec();
    dead.extend_from_slice(&combos[0].cards());
    dead.extend_from_slice(&combos[1].cards());
    let mut deck = remaining_cards(&dead);

    if deck.len() < missing {
        return [pot / 2.0, pot / 2.0];
    }

    let mut full_board = board.to_vec();
    for _ in 0..missing {
        let drawn = deck.swap_remove(rng.gen_range(0..deck.len()));
        full_board.push(drawn);
    }

    let value0 = evaluate_with_board(combos[0].cards(), &full_board);
    let value1 = evaluate_with_board(combos[1].cards(), &full_board);
    match value0.compare(&value1) {
        1 => [pot, 0.0],
        -1 => [0.0, pot],
        _ => [pot / 2.0, pot / 2.0],
    }
}
