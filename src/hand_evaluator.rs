use std::cmp::Ordering;
use std::fmt;

use itertools::Itertools;
use once_cell::sync::Lazy;

use crate::cards::Card;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HandCategory {
    HighCard,
    OnePair,
    TwoPair,
    Trips,
    Straight,
    Flush,
    FullHouse,
    Quads,
    StraightFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandCategory::HighCard => write!(f, "High Card"),
            HandCategory::OnePair => write!(f, "One Pair"),
            HandCategory::TwoPair => write!(f, "Two Pair"),
            HandCategory::Trips => write!(f, "Three of a Kind"),
            HandCategory::Straight => write!(f, "Straight"),
            HandCategory::Flush => write!(f, "Flush"),
            HandCategory::FullHouse => write!(f, "Full House"),
            HandCategory::Quads => write!(f, "Four of a Kind"),
            HandCategory::StraightFlush => write!(f, "Straight Flush"),
        }
    }
}

/// Value of a five-card hand: category plus tiebreaker ranks, padded to
/// length 5 with zeros. The derived ordering (category first, then
/// tiebreakers lexicographically) is the total order over all hands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct HandValue {
    pub category: HandCategory,
    pub tiebreakers: [u8; 5],
}

impl HandValue {
    /// Three-way comparison: -1 if self < other, 0 if equal, 1 if greater.
    pub fn compare(&self, other: &HandValue) -> i32 {
        match self.cmp(other) {
            Ordering::Less => -1,
            Ordering::Equal => 0,
            Ordering::Greater => 1,
        }
    }
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

/// Index table of the C(7,5) = 21 five-card subsets of a seven-card hand,
/// built once so the hot evaluation path does no allocation.
static FIVE_OF_SEVEN: Lazy<Vec<[usize; 5]>> = Lazy::new(|| {
    (0..7usize)
        .combinations(5)
        .map(|c| [c[0], c[1], c[2], c[3], c[4]])
        .collect()
});

/// Best five-card value over all 21 subsets of seven distinct cards.
pub fn evaluate_seven(cards: &[Card; 7]) -> HandValue {
    let mut best = HandValue {
        category: HandCategory::HighCard,
        tiebreakers: [0; 5],
    };
    let mut five = [cards[0]; 5];
    for subset in FIVE_OF_SEVEN.iter() {
        for (slot, &i) in five.iter_mut().zip(subset.iter()) {
            *slot = cards[i];
        }
        let value = evaluate_five(&five);
        if value > best {
            best = value;
        }
    }
    best
}

/// Evaluate two hole cards against a complete 5-card board.
pub fn evaluate_with_board(hole: [Card; 2], board: &[Card]) -> HandValue {
    debug_assert_eq!(board.len(), 5);
    let cards = [
        hole[0], hole[1], board[0], board[1], board[2], board[3], board[4],
    ];
    evaluate_seven(&cards)
}

fn evaluate_five(cards: &[Card; 5]) -> HandValue {
    let mut rank_counts = [0u8; 15];
    let mut suit_counts = [0u8; 4];
    for c in cards {
        rank_counts[c.value() as usize] += 1;
        suit_counts[c.suit as usize] += 1;
    }

    let is_flush = suit_counts.iter().any(|&n| n == 5);
    let straight_high = straight_high(&rank_counts);

    if is_flush {
        if let Some(high) = straight_high {
            return HandValue {
                category: HandCategory::StraightFlush,
                tiebreakers: [high, 0, 0, 0, 0],
            };
        }
    }

    // Rank groups sorted by (count desc, rank desc). At most 5 groups.
    let mut groups = [(0u8, 0u8); 5];
    let mut n = 0;
    for r in (2..=14u8).rev() {
        let count = rank_counts[r as usize];
        if count > 0 {
            groups[n] = (count, r);
            n += 1;
        }
    }
    let groups = &mut groups[..n];
    groups.sort_unstable_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    if groups[0].0 == 4 {
        return HandValue {
            category: HandCategory::Quads,
            tiebreakers: [groups[0].1, groups[1].1, 0, 0, 0],
        };
    }

    if groups[0].0 == 3 && groups[1].0 == 2 {
        return HandValue {
            category: HandCategory::FullHouse,
            tiebreakers: [groups[0].1, groups[1].1, 0, 0, 0],
        };
    }

    if is_flush {
        // All five ranks are distinct in a flush.
        return HandValue {
            category: HandCategory::Flush,
            tiebreakers: [groups[0].1, groups[1].1, groups[2].1, groups[3].1, groups[4].1],
        };
    }

    if let Some(high) = straight_high {
        return HandValue {
            category: HandCategory::Straight,
            tiebreakers: [high, 0, 0, 0, 0],
        };
    }

    if groups[0].0 == 3 {
        return HandValue {
            category: HandCategory::Trips,
            tiebreakers: [groups[0].1, groups[1].1, groups[2].1, 0, 0],
        };
    }

    if groups[0].0 == 2 && groups[1].0 == 2 {
        return HandValue {
            category: HandCategory::TwoPair,
            tiebreakers: [groups[0].1, groups[1].1, groups[2].1, 0, 0],
        };
    }

    if groups[0].0 == 2 {
        return HandValue {
            category: HandCategory::OnePair,
            tiebreakers: [groups[0].1, groups[1].1, groups[2].1, groups[3].1, 0],
        };
    }

    HandValue {
        category: HandCategory::HighCard,
        tiebreakers: [groups[0].1, groups[1].1, groups[2].1, groups[3].1, groups[4].1],
    }
}

/// Straight high card, if the ranks contain one. Checks the A-high window
/// down to the 6-high window, then the wheel (A-5-4-3-2) whose high card
/// is 5, not A.
fn straight_high(rank_counts: &[u8; 15]) -> Option<u8> {
    for high in (6..=14u8).rev() {
        let mut found = true;
        for offset in 0..5 {
            if rank_counts[(high - offset) as usize] == 0 {
                found = false;
                break;
            }
        }
        if found {
            return Some(high);
        }
    }

    if rank_counts[14] > 0
        && rank_counts[2] > 0
        && rank_counts[3] > 0
        && rank_counts[4] > 0
        && rank_counts[5] > 0
    {
        return Some(5);
    }

    None
}
