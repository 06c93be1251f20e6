use thiserror::Error;

use crate::cards::Card;

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid rank: {0}")]
    InvalidRank(char),

    #[error("Invalid suit: {0}")]
    InvalidSuit(char),

    #[error("Invalid card notation: {0}")]
    InvalidCardNotation(String),

    #[error("Invalid board notation: {0}")]
    InvalidBoardNotation(String),

    #[error("Invalid range term: {0}")]
    InvalidRangeTerm(String),

    #[error("Ambiguous hand {0} (use 's' for suited or 'o' for offsuit)")]
    AmbiguousHand(String),

    #[error("Pair {0} cannot have a suited/offsuit suffix")]
    PairWithSuffix(String),

    #[error("Mismatched suited/offsuit in range {0}")]
    SuitednessMismatch(String),

    #[error("Invalid range {0} (first rank must match across endpoints)")]
    RangeHighCardMismatch(String),

    #[error("Invalid position: {0}")]
    InvalidPosition(String),

    #[error("Invalid position notation: {0}")]
    InvalidNotation(String),

    #[error("Invalid pot: {0}")]
    InvalidPot(String),

    #[error("Invalid stack: {0}")]
    InvalidStack(String),

    #[error("Invalid action history: {0}")]
    InvalidHistory(String),

    #[error("Position {0} not found among players")]
    UnknownActor(String),

    #[error("Expected exactly 2 players, got {0}")]
    PlayerCount(usize),

    #[error("Board must have 3, 4, or 5 cards, got {0}")]
    BoardSize(usize),

    #[error("Duplicate card: {0}")]
    DuplicateCard(Card),

    #[error("Action amount must be positive, got {0}")]
    NonPositiveAmount(f64),

    #[error("Pot must be non-negative, got {0}")]
    NegativePot(f64),

    #[error("Stack must be positive for the player to act, got {0}")]
    NonPositiveStack(f64),

    #[error("No valid combo matchups (all conflict with the board or each other)")]
    NoValidMatchups,

    #[error("Target pot must be positive, got {0}")]
    InvalidTargetPot(f64),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type SolverResult<T> = Result<T, SolverError>;
