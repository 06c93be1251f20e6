//! Heads-up No-Limit Hold'em postflop GTO solver.
//!
//! Pipeline: parse a position (`notation`), expand ranges (`ranges`),
//! optionally bucket hands (`bucketing`), build an extensive-form tree
//! over the betting abstraction (`actions`, `game_tree`), then run CFR or
//! outcome-sampling MCCFR (`cfr`, `mccfr`) and read the converged average
//! strategy out of the `StrategyProfile`.

pub mod actions;
pub mod bucketing;
pub mod cards;
pub mod cfr;
pub mod cli;
pub mod display;
pub mod equity;
pub mod error;
pub mod game_tree;
pub mod hand_evaluator;
pub mod mccfr;
pub mod notation;
pub mod ranges;
pub mod solve;
pub mod strategy;
