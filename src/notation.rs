use std::fmt;

use crate::cards::{parse_cards, Card};
use crate::error::{SolverError, SolverResult};
use crate::ranges::{expand_range, Combo};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Check,
    Call,
    Fold,
    /// Additional chips put in by the acting player, in bb.
    Bet(f64),
    Raise(f64),
}

impl Action {
    /// History token: "x", "c", "f", "b<amount>", "r<amount>" with one decimal.
    pub fn token(&self) -> String {
        match self {
            Action::Check => "x".to_string(),
            Action::Call => "c".to_string(),
            Action::Fold => "f".to_string(),
            Action::Bet(amount) => format!("b{:.1}", amount),
            Action::Raise(amount) => format!("r{:.1}", amount),
        }
    }

    pub fn amount(&self) -> f64 {
        match self {
            Action::Bet(a) | Action::Raise(a) => *a,
            _ => 0.0,
        }
    }

    pub fn is_bet_or_raise(&self) -> bool {
        matches!(self, Action::Bet(_) | Action::Raise(_))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Concatenated history tokens ("xb5.0c").
pub fn history_string(history: &[Action]) -> String {
    history.iter().map(|a| a.token()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    UTG,
    MP,
    CO,
    BTN,
    SB,
    BB,
}

impl Position {
    pub fn as_str(&self) -> &'static str {
        match self {
            Position::UTG => "UTG",
            Position::MP => "MP",
            Position::CO => "CO",
            Position::BTN => "BTN",
            Position::SB => "SB",
            Position::BB => "BB",
        }
    }

    pub fn parse(s: &str) -> SolverResult<Position> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UTG" => Ok(Position::UTG),
            "MP" => Ok(Position::MP),
            "CO" => Ok(Position::CO),
            "BTN" => Ok(Position::BTN),
            "SB" => Ok(Position::SB),
            "BB" => Ok(Position::BB),
            other => Err(SolverError::InvalidPosition(other.to_string())),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Street {
    Flop,
    Turn,
    River,
}

impl Street {
    pub fn from_board_len(n: usize) -> Option<Street> {
        match n {
            3 => Some(Street::Flop),
            4 => Some(Street::Turn),
            5 => Some(Street::River),
            _ => None,
        }
    }

    /// Betting rounds remaining, this one included.
    pub fn streets_remaining(&self) -> usize {
        match self {
            Street::Flop => 3,
            Street::Turn => 2,
            Street::River => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Street::Flop => "flop",
            Street::Turn => "turn",
            Street::River => "river",
        }
    }
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One player in a parsed position: label, range (empty for "??"), stack.
#[derive(Debug, Clone)]
pub struct PlayerSpec {
    pub position: Position,
    pub range: Vec<Combo>,
    pub stack: f64,
}

/// A parsed postflop spot.
#[derive(Debug, Clone)]
pub struct GameState {
    pub players: Vec<PlayerSpec>,
    pub pot: f64,
    pub board: Vec<Card>,
    pub history: Vec<Action>,
    pub to_act: usize,
}

impl GameState {
    pub fn street(&self) -> Option<Street> {
        Street::from_board_len(self.board.len())
    }

    /// Re-emit the position notation. Parsing the result yields a state
    /// semantically equal to this one (ranges come back as combo lists).
    pub fn fen(&self) -> String {
        let players = self
            .players
            .iter()
            .map(|p| {
                let hand = if p.range.is_empty() {
                    "??".to_string()
                } else {
                    p.range
                        .iter()
                        .map(|c| c.to_string())
                        .collect::<Vec<_>>()
                        .join(",")
                };
                format!("{}:{}:S{}", p.position, hand, format_bb(p.stack))
            })
            .collect::<Vec<_>>()
            .join("/");

        let board: String = self.board.iter().map(|c| c.to_string()).collect();
        let actor = self.players[self.to_act].position;

        if self.history.is_empty() {
            format!("{}|P{}|{}|>{}", players, format_bb(self.pot), board, actor)
        } else {
            format!(
                "{}|P{}|{}|{}|>{}",
                players,
                format_bb(self.pot),
                board,
                history_string(&self.history),
                actor
            )
        }
    }
}

fn format_bb(x: f64) -> String {
    if x.fract() == 0.0 {
        format!("{}", x as i64)
    } else {
        format!("{}", x)
    }
}

/// Parse a position notation string into a GameState.
///
/// Format: `<players>|<pot>|<board>|<history>|<action>` with the history
/// section optional.
/// Example: `BTN:AsKd:S98/BB:??:S97|P3|Th9h2c|>BTN`
/// Example with range: `BTN:AA,KK:S100/BB:QQ-JJ:S100|P20|Kh9s4c7d2s|>BTN`
pub fn parse_position(fen: &str) -> SolverResult<GameState> {
    let fen = fen.trim();
    if fen.is_empty() {
        return Err(SolverError::InvalidNotation("empty input".to_string()));
    }

    let parts: Vec<&str> = fen.split('|').collect();
    let (players_str, pot_str, board_str, history_str, actor_str) = match parts.len() {
        4 => (parts[0], parts[1], parts[2], "", parts[3]),
        5 => (parts[0], parts[1], parts[2], parts[3], parts[4]),
        n => {
            return Err(SolverError::InvalidNotation(format!(
                "expected 4 or 5 |-separated sections, got {}",
                n
            )))
        }
    };

    let players = parse_players(players_str)?;
    let pot = parse_pot(pot_str)?;
    let board = parse_board_section(board_str)?;
    let history = parse_history(history_str)?;
    let to_act = parse_actor(actor_str, &players)?;

    Ok(GameState {
        players,
        pot,
        board,
        history,
        to_act,
    })
}

fn parse_players(s: &str) -> SolverResult<Vec<PlayerSpec>> {
    let s = s.trim();
    if s.is_empty() {
        return Err(SolverError::InvalidNotation("empty players section".to_string()));
    }
    s.split('/').map(parse_player).collect()
}

fn parse_player(s: &str) -> SolverResult<PlayerSpec> {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 3 {
        return Err(SolverError::InvalidNotation(format!(
            "player {:?} (expected POS:HAND:Sstack)",
            s
        )));
    }

    let position = Position::parse(parts[0])?;
    let hand = parts[1].trim();
    let stack_str = parts[2].trim();

    if !stack_str.starts_with('S') || stack_str.len() < 2 {
        return Err(SolverError::InvalidStack(stack_str.to_string()));
    }
    let stack: f64 = stack_str[1..]
        .parse()
        .map_err(|_| SolverError::InvalidStack(stack_str.to_string()))?;

    let range = if hand == "??" {
        Vec::new()
    } else {
        expand_range(hand)?
    };

    Ok(PlayerSpec {
        position,
        range,
        stack,
    })
}

fn parse_pot(s: &str) -> SolverResult<f64> {
    let s = s.trim();
    if !s.starts_with('P') || s.len() < 2 {
        return Err(SolverError::InvalidPot(s.to_string()));
    }
    s[1..]
        .parse()
        .map_err(|_| SolverError::InvalidPot(s.to_string()))
}

fn parse_board_section(s: &str) -> SolverResult<Vec<Card>> {
    let s = s.trim();
    if s.is_empty() || s == "-" {
        return Ok(Vec::new());
    }
    let board = parse_cards(s)?;
    if !matches!(board.len(), 3 | 4 | 5) {
        return Err(SolverError::InvalidBoardNotation(s.to_string()));
    }
    Ok(board)
}

fn parse_history(s: &str) -> SolverResult<Vec<Action>> {
    let s = s.trim();
    let mut actions = Vec::new();
    let bytes = s.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i].to_ascii_lowercase() {
            b'x' => {
                actions.push(Action::Check);
                i += 1;
            }
            b'c' => {
                actions.push(Action::Call);
                i += 1;
            }
            b'f' => {
                actions.push(Action::Fold);
                i += 1;
            }
            b'b' => {
                let (amount, consumed) = parse_amount(&s[i + 1..])
                    .ok_or_else(|| SolverError::InvalidHistory(s.to_string()))?;
                actions.push(Action::Bet(amount));
                i += 1 + consumed;
            }
            b'r' => {
                let (amount, consumed) = parse_amount(&s[i + 1..])
                    .ok_or_else(|| SolverError::InvalidHistory(s.to_string()))?;
                actions.push(Action::Raise(amount));
                i += 1 + consumed;
            }
            _ => return Err(SolverError::InvalidHistory(s.to_string())),
        }
    }

    Ok(actions)
}

/// Parse the numeric amount following a bet/raise token. Returns the
/// amount and the number of bytes consumed.
fn parse_amount(s: &str) -> Option<(f64, usize)> {
    let end = s
        .bytes()
        .position(|b| !(b.is_ascii_digit() || b == b'.'))
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    s[..end].parse().ok().map(|amount| (amount, end))
}

fn parse_actor(s: &str, players: &[PlayerSpec]) -> SolverResult<usize> {
    let s = s.trim();
    if !s.starts_with('>') || s.len() < 2 {
        return Err(SolverError::InvalidNotation(format!(
            "action indicator {:?} (expected >POS)",
            s
        )));
    }
    let position = Position::parse(&s[1..])?;
    players
        .iter()
        .position(|p| p.position == position)
        .ok_or_else(|| SolverError::UnknownActor(position.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tokens_have_one_decimal() {
        assert_eq!(Action::Bet(3.5).token(), "b3.5");
        assert_eq!(Action::Raise(9.0).token(), "r9.0");
        assert_eq!(Action::Check.token(), "x");
    }

    #[test]
    fn history_parses_amounts() {
        let h = parse_history("b3.5c").unwrap();
        assert_eq!(h.len(), 2);
        assert_eq!(h[0], Action::Bet(3.5));
        assert_eq!(h[1], Action::Call);
    }

    #[test]
    fn missing_amount_is_rejected() {
        assert!(parse_history("bx").is_err());
        assert!(parse_history("b").is_err());
    }
}
