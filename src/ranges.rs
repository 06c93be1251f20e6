use std::fmt;

use itertools::Itertools;

use crate::cards::{parse_card, Card, Rank, Suit, ALL_SUITS};
use crate::error::{SolverError, SolverResult};

/// A specific two-card hole-card combination. Unordered: the constructor
/// canonicalizes so that `Combo::new(a, b) == Combo::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Combo {
    pub card1: Card,
    pub card2: Card,
}

impl Combo {
    pub fn new(a: Card, b: Card) -> Combo {
        let key = |c: &Card| (std::cmp::Reverse(c.value()), c.suit as u8);
        if key(&a) <= key(&b) {
            Combo { card1: a, card2: b }
        } else {
            Combo { card1: b, card2: a }
        }
    }

    pub fn cards(&self) -> [Card; 2] {
        [self.card1, self.card2]
    }

    pub fn contains(&self, card: Card) -> bool {
        self.card1 == card || self.card2 == card
    }

    pub fn overlaps(&self, other: &Combo) -> bool {
        self.contains(other.card1) || self.contains(other.card2)
    }
}

impl fmt::Display for Combo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.card1, self.card2)
    }
}

/// Expand a range expression into concrete combos.
///
/// Grammar (comma-separated terms, whitespace ignored):
///   - pair          "AA"        -> 6 combos
///   - suited        "AKs"       -> 4 combos
///   - offsuit       "AKo"       -> 12 combos
///   - pair range    "KK-JJ"     -> KK, QQ, JJ
///   - suited/offsuit range "AKs-ATs" / "KQo-KJo" (shared high rank)
///   - specific combo "AsKd"     -> 1 combo
pub fn expand_range(expr: &str) -> SolverResult<Vec<Combo>> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(SolverError::InvalidRangeTerm(expr.to_string()));
    }

    let mut combos = Vec::new();
    for term in expr.split(',') {
        let term: String = term.chars().filter(|c| !c.is_whitespace()).collect();
        if term.is_empty() {
            continue;
        }
        if term.contains('-') {
            combos.extend(expand_dash_range(&term)?);
        } else if is_specific_cards(&term) {
            let c1 = parse_card(&term[..2])?;
            let c2 = parse_card(&term[2..])?;
            if c1 == c2 {
                return Err(SolverError::DuplicateCard(c1));
            }
            combos.push(Combo::new(c1, c2));
        } else {
            let (r1, r2, suited) = parse_hand_term(&term)?;
            combos.extend(generate_combos(r1, r2, suited));
        }
    }
    Ok(combos)
}

/// Parse a single hand term into (rank1, rank2, suited). Pairs report
/// `suited = false`; the flag is meaningless for them.
fn parse_hand_term(term: &str) -> SolverResult<(Rank, Rank, bool)> {
    let chars: Vec<char> = term.chars().collect();
    if chars.len() < 2 || chars.len() > 3 {
        return Err(SolverError::InvalidRangeTerm(term.to_string()));
    }

    let r1 = Rank::from_char(chars[0])?;
    let r2 = Rank::from_char(chars[1])?;

    if chars.len() == 3 {
        if r1 == r2 {
            return Err(SolverError::PairWithSuffix(term.to_string()));
        }
        match chars[2].to_ascii_lowercase() {
            's' => Ok((r1, r2, true)),
            'o' => Ok((r1, r2, false)),
            _ => Err(SolverError::InvalidRangeTerm(term.to_string())),
        }
    } else {
        if r1 != r2 {
            return Err(SolverError::AmbiguousHand(term.to_string()));
        }
        Ok((r1, r2, false))
    }
}

fn expand_dash_range(term: &str) -> SolverResult<Vec<Combo>> {
    let parts: Vec<&str> = term.split('-').collect();
    if parts.len() != 2 {
        return Err(SolverError::InvalidRangeTerm(term.to_string()));
    }

    let (s1, s2, start_suited) = parse_hand_term(parts[0])?;
    let (e1, e2, end_suited) = parse_hand_term(parts[1])?;

    let start_is_pair = s1 == s2;
    let end_is_pair = e1 == e2;

    // Pair range: "KK-JJ".
    if start_is_pair && end_is_pair {
        let hi = s1.value().max(e1.value());
        let lo = s1.value().min(e1.value());
        let mut combos = Vec::new();
        for v in (lo..=hi).rev() {
            let rank = Rank::from_value(v).ok_or_else(|| {
                SolverError::InvalidRangeTerm(term.to_string())
            })?;
            combos.extend(generate_combos(rank, rank, false));
        }
        return Ok(combos);
    }

    if start_is_pair != end_is_pair {
        return Err(SolverError::InvalidRangeTerm(term.to_string()));
    }

    // Non-pair range: both endpoints share the high rank and the suffix.
    if start_suited != end_suited {
        return Err(SolverError::SuitednessMismatch(term.to_string()));
    }
    if s1 != e1 {
        return Err(SolverError::RangeHighCardMismatch(term.to_string()));
    }

    let hi = s2.value().max(e2.value());
    let lo = s2.value().min(e2.value());
    let mut combos = Vec::new();
    for v in (lo..=hi).rev() {
        let rank = Rank::from_value(v)
            .ok_or_else(|| SolverError::InvalidRangeTerm(term.to_string()))?;
        combos.extend(generate_combos(s1, rank, start_suited));
    }
    Ok(combos)
}

fn generate_combos(r1: Rank, r2: Rank, suited: bool) -> Vec<Combo> {
    if r1 == r2 {
        ALL_SUITS
            .iter()
            .tuple_combinations()
            .map(|(&a, &b)| Combo::new(Card::new(r1, a), Card::new(r2, b)))
            .collect()
    } else if suited {
        ALL_SUITS
            .iter()
            .map(|&s| Combo::new(Card::new(r1, s), Card::new(r2, s)))
            .collect()
    } else {
        let mut combos = Vec::with_capacity(12);
        for &a in &ALL_SUITS {
            for &b in &ALL_SUITS {
                if a != b {
                    combos.push(Combo::new(Card::new(r1, a), Card::new(r2, b)));
                }
            }
        }
        combos
    }
}

/// True if the term looks like two specific cards (e.g., "AsKd").
fn is_specific_cards(term: &str) -> bool {
    let chars: Vec<char> = term.chars().collect();
    chars.len() == 4
        && Rank::from_char(chars[0]).is_ok()
        && Suit::from_char(chars[1]).is_ok()
        && Rank::from_char(chars[2]).is_ok()
        && Suit::from_char(chars[3]).is_ok()
}
