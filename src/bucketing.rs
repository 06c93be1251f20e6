//! Card abstraction: maps hole-card combos to a small set of buckets via a
//! two-dimensional (equity x potential) histogram, so that flop and turn
//! trees key their info sets on `BUCKET_<n>` instead of specific cards.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::cards::{remaining_cards, Card};
use crate::equity::{equity_vs_range, flop_potential};
use crate::hand_evaluator::evaluate_with_board;
use crate::ranges::Combo;

const DEFAULT_SAMPLES: usize = 200;

/// Assigns combos to buckets for a fixed (board, opponent range) context.
///
/// The bucket id is stable per combo: repeated calls return the same id,
/// and the memoization cache can be cleared without changing assignments.
pub struct Bucketer {
    board: Vec<Card>,
    opponent_range: Vec<Combo>,
    equity_bins: usize,
    potential_bins: usize,
    /// Monte-Carlo sample count; 0 means exact enumeration.
    samples: usize,
    range_key: String,
    cache: HashMap<Combo, usize>,
    eq_cache: HashMap<Combo, (f64, f64)>,
}

impl Bucketer {
    /// Exact-enumeration bucketer. `num_buckets` is mapped to a square
    /// grid of side floor(sqrt(num_buckets)).
    pub fn new(board: &[Card], opponent_range: &[Combo], num_buckets: usize) -> Bucketer {
        let grid = (num_buckets as f64).sqrt().floor().max(1.0) as usize;
        Bucketer {
            board: board.to_vec(),
            opponent_range: opponent_range.to_vec(),
            equity_bins: grid,
            potential_bins: grid,
            samples: 0,
            range_key: range_key(opponent_range),
            cache: HashMap::new(),
            eq_cache: HashMap::new(),
        }
    }

    /// Monte-Carlo bucketer. Sampling is seeded deterministically from
    /// (hero combo, board, opponent range) so assignments are identical
    /// across runs.
    pub fn sampled(
        board: &[Card],
        opponent_range: &[Combo],
        num_buckets: usize,
        samples: usize,
    ) -> Bucketer {
        let mut bucketer = Bucketer::new(board, opponent_range, num_buckets);
        bucketer.samples = if samples == 0 { DEFAULT_SAMPLES } else { samples };
        bucketer
    }

    pub fn num_buckets(&self) -> usize {
        self.equity_bins * self.potential_bins
    }

    /// Bucket id in [0, num_buckets) for a combo.
    pub fn bucket(&mut self, combo: Combo) -> usize {
        if let Some(&id) = self.cache.get(&combo) {
            return id;
        }

        let (equity, potential) = if self.samples > 0 {
            self.sample_equity_potential(combo)
        } else {
            (
                equity_vs_range(combo, &self.board, &self.opponent_range).equity,
                flop_potential(combo, &self.board, &self.opponent_range),
            )
        };

        let equity_bin = ((equity * self.equity_bins as f64) as usize).min(self.equity_bins - 1);
        let potential_bin =
            ((potential * self.potential_bins as f64) as usize).min(self.potential_bins - 1);
        let id = equity_bin * self.potential_bins + potential_bin;

        self.cache.insert(combo, id);
        id
    }

    /// Human-readable description of a bucket's equity/potential window.
    pub fn bucket_label(&self, id: usize) -> String {
        let equity_bin = id / self.potential_bins;
        let potential_bin = id % self.potential_bins;
        format!(
            "Bucket {}: equity [{:.2}-{:.2}], potential [{:.2}-{:.2}]",
            id,
            equity_bin as f64 / self.equity_bins as f64,
            (equity_bin + 1) as f64 / self.equity_bins as f64,
            potential_bin as f64 / self.potential_bins as f64,
            (potential_bin + 1) as f64 / self.potential_bins as f64,
        )
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
        self.eq_cache.clear();
    }

    /// Monte-Carlo estimate of (equity, potential): sample board runouts,
    /// measure equity against the surviving opponent combos on each, and
    /// report the mean and normalized variance of the per-runout equities.
    fn sample_equity_potential(&mut self, combo: Combo) -> (f64, f64) {
        if let Some(&cached) = self.eq_cache.get(&combo) {
            return cached;
        }

        let mut dead: Vec<Card> = self.board.to_vec();
        dead.extend_from_slice(&combo.cards());
        let remaining = remaining_cards(&dead);

        let mut rng = StdRng::seed_from_u64(self.seed_for(combo));
        let mut eq_samples: Vec<f64> = Vec::with_capacity(self.samples);

        for _ in 0..self.samples {
            let mut runout = self.board.clone();
            match self.board.len() {
                5 => {}
                4 => {
                    if remaining.is_empty() {
                        continue;
                    }
                    runout.push(remaining[rng.gen_range(0..remaining.len())]);
                }
                3 => {
                    if remaining.len() < 2 {
                        continue;
                    }
                    let turn_idx = rng.gen_range(0..remaining.len());
                    let mut river_idx = rng.gen_range(0..remaining.len() - 1);
                    if river_idx >= turn_idx {
                        river_idx += 1;
                    }
                    runout.push(remaining[turn_idx]);
                    runout.push(remaining[river_idx]);
                }
                _ => continue,
            }

            let hero_value = evaluate_with_board(combo.cards(), &runout);

            let mut wins = 0.0;
            let mut ties = 0.0;
            let mut total = 0.0;
            for opp in &self.opponent_range {
                if opp.overlaps(&combo) || runout.iter().any(|&c| opp.contains(c)) {
                    continue;
                }
                let opp_value = evaluate_with_board(opp.cards(), &runout);
                match hero_value.compare(&opp_value) {
                    1 => wins += 1.0,
                    0 => ties += 1.0,
                    _ => {}
                }
                total += 1.0;
            }

            if total == 0.0 {
                continue;
            }
            eq_samples.push(wins / total + ties / (2.0 * total));
        }

        let result = if eq_samples.is_empty() {
            (
                equity_vs_range(combo, &self.board, &self.opponent_range).equity,
                flop_potential(combo, &self.board, &self.opponent_range),
            )
        } else {
            let mean = eq_samples.iter().sum::<f64>() / eq_samples.len() as f64;
            let variance = eq_samples
                .iter()
                .map(|eq| (eq - mean) * (eq - mean))
                .sum::<f64>()
                / eq_samples.len() as f64;
            (mean, (variance / 0.25).clamp(0.0, 1.0))
        };

        self.eq_cache.insert(combo, result);
        result
    }

    /// Repeatable seed hashed from hero combo, board, and opponent range.
    fn seed_for(&self, combo: Combo) -> u64 {
        let mut text = combo.to_string();
        for card in &self.board {
            text.push_str(&card.to_string());
        }
        text.push_str(&self.range_key);

        let mut hash: u64 = 0;
        for b in text.bytes() {
            hash = hash.wrapping_mul(31).wrapping_add(b as u64);
        }
        hash
    }
}

fn range_key(range: &[Combo]) -> String {
    let mut parts: Vec<String> = range.iter().map(|c| c.to_string()).collect();
    parts.sort();
    parts.join(",")
}
