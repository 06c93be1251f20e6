use std::fmt;

use rayon::prelude::*;

use crate::cards::{remaining_cards, Card};
use crate::hand_evaluator::evaluate_with_board;
use crate::ranges::Combo;

/// Number of candidate turn cards sampled for the flop potential metric.
const POTENTIAL_TURN_SAMPLES: usize = 10;

/// Theoretical maximum variance of an equity distribution (at a 50/50 split).
const MAX_EQUITY_VARIANCE: f64 = 0.25;

pub struct EquityResult {
    pub win: f64,
    pub tie: f64,
    pub equity: f64,
}

impl fmt::Display for EquityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Win {:.1}% | Tie {:.1}% (equity: {:.1}%)",
            self.win * 100.0,
            self.tie * 100.0,
            self.equity * 100.0,
        )
    }
}

/// Hero's equity (win + tie/2) against an opponent range on a 3/4/5-card
/// board. Partial boards are resolved by enumerating every remaining
/// runout; runouts and opponent combos that collide with known cards are
/// skipped. If no valid (runout, opponent) pair exists the result is the
/// defined 0.5 default.
pub fn equity_vs_range(hero: Combo, board: &[Card], opponent_range: &[Combo]) -> EquityResult {
    let (wins, ties, total) = match board.len() {
        5 => river_tally(hero, board, opponent_range),
        4 => turn_tally(hero, board, opponent_range),
        _ => flop_tally(hero, board, opponent_range),
    };

    if total == 0.0 {
        return EquityResult {
            win: 0.0,
            tie: 0.0,
            equity: 0.5,
        };
    }

    let win = wins / total;
    let tie = ties / total;
    EquityResult {
        win,
        tie,
        equity: win + tie / 2.0,
    }
}

fn river_tally(hero: Combo, board: &[Card], opponent_range: &[Combo]) -> (f64, f64, f64) {
    let hero_value = evaluate_with_board(hero.cards(), board);

    let mut wins = 0.0;
    let mut ties = 0.0;
    let mut total = 0.0;

    for opp in opponent_range {
        if combo_conflicts(opp, &hero, board) {
            continue;
        }
        let opp_value = evaluate_with_board(opp.cards(), board);
        match hero_value.compare(&opp_value) {
            1 => wins += 1.0,
            0 => ties += 1.0,
            _ => {}
        }
        total += 1.0;
    }

    (wins, ties, total)
}

fn turn_tally(hero: Combo, board: &[Card], opponent_range: &[Combo]) -> (f64, f64, f64) {
    let mut dead: Vec<Card> = board.to_vec();
    dead.extend_from_slice(&hero.cards());

    let mut wins = 0.0;
    let mut ties = 0.0;
    let mut total = 0.0;

    let mut full_board = [board[0], board[1], board[2], board[3], board[0]];
    for river in remaining_cards(&dead) {
        full_board[4] = river;
        let hero_value = evaluate_with_board(hero.cards(), &full_board);

        for opp in opponent_range {
            if opp.contains(river) || combo_conflicts(opp, &hero, board) {
                continue;
            }
            let opp_value = evaluate_with_board(opp.cards(), &full_board);
            match hero_value.compare(&opp_value) {
                1 => wins += 1.0,
                0 => ties += 1.0,
                _ => {}
            }
            total += 1.0;
        }
    }

    (wins, ties, total)
}

fn flop_tally(hero: Combo, board: &[Card], opponent_range: &[Combo]) -> (f64, f64, f64) {
    let mut dead: Vec<Card> = board.to_vec();
    dead.extend_from_slice(&hero.cards());
    let candidates = remaining_cards(&dead);

    // Each turn card contributes an independent partial tally.
    candidates
        .par_iter()
        .map(|&turn| {
            let mut wins = 0.0;
            let mut ties = 0.0;
            let mut total = 0.0;

            let mut full_board = [board[0], board[1], board[2], turn, turn];
            for &river in &candidates {
                if river == turn {
                    continue;
                }
                full_board[4] = river;
                let hero_value = evaluate_with_board(hero.cards(), &full_board);

                for opp in opponent_range {
                    if opp.contains(turn)
                        || opp.contains(river)
                        || combo_conflicts(opp, &hero, board)
                    {
                        continue;
                    }
                    let opp_value = evaluate_with_board(opp.cards(), &full_board);
                    match hero_value.compare(&opp_value) {
                        1 => wins += 1.0,
                        0 => ties += 1.0,
                        _ => {}
                    }
                    total += 1.0;
                }
            }

            (wins, ties, total)
        })
        .reduce(
            || (0.0, 0.0, 0.0),
            |a, b| (a.0 + b.0, a.1 + b.1, a.2 + b.2),
        )
}

/// Hand volatility on the flop: the variance of hero's equity across
/// sampled turn cards, normalized by the theoretical maximum (0.25) and
/// clamped to [0, 1]. Turn and river inputs return zero. High values mark
/// drawing hands, low values made hands.
pub fn flop_potential(hero: Combo, board: &[Card], opponent_range: &[Combo]) -> f64 {
    if board.len() != 3 {
        return 0.0;
    }

    let mut dead: Vec<Card> = board.to_vec();
    dead.extend_from_slice(&hero.cards());

    let equities: Vec<f64> = remaining_cards(&dead)
        .into_iter()
        .take(POTENTIAL_TURN_SAMPLES)
        .map(|turn| {
            let turn_board = [board[0], board[1], board[2], turn];
            equity_vs_range(hero, &turn_board, opponent_range).equity
        })
        .collect();

    if equities.is_empty() {
        return 0.0;
    }

    let mean = equities.iter().sum::<f64>() / equities.len() as f64;
    let variance = equities
        .iter()
        .map(|eq| (eq - mean) * (eq - mean))
        .sum::<f64>()
        / equities.len() as f64;

    (variance / MAX_EQUITY_VARIANCE).clamp(0.0, 1.0)
}

fn combo_conflicts(opp: &Combo, hero: &Combo, board: &[Card]) -> bool {
    opp.overlaps(hero) || board.iter().any(|&c| opp.contains(c))
}
