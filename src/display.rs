use std::collections::BTreeMap;

use colored::Colorize;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};

use crate::cards::{Card, Suit};
use crate::notation::Action;
use crate::strategy::{Strategy, StrategyProfile};

/// Frequencies below this are omitted from reports.
const MIN_REPORTED_FREQ: f64 = 0.001;

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "Error:".red().bold(), msg);
}

pub fn board_display(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| {
            let text = card.pretty();
            match card.suit {
                Suit::Spades => text.white().to_string(),
                Suit::Hearts => text.red().to_string(),
                Suit::Diamonds => text.blue().to_string(),
                Suit::Clubs => text.green().to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Per-info-set report for combo-vs-combo solves: one block per info set,
/// sorted by key, listing each action's average frequency.
pub fn render_profile(profile: &StrategyProfile) -> String {
    let mut entries: Vec<(&String, &Strategy)> = profile.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));

    let mut out = String::new();
    for (key, strategy) in entries {
        out.push_str(&format!("{}\n", key.bold()));
        out.push_str(&strategy_table(strategy));
        out.push('\n');
    }
    out
}

fn strategy_table(strategy: &Strategy) -> String {
    let average = strategy.average_strategy();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Action").set_alignment(CellAlignment::Left),
        Cell::new("Frequency").set_alignment(CellAlignment::Right),
    ]);

    for (action, freq) in strategy.actions.iter().zip(&average) {
        if *freq < MIN_REPORTED_FREQ {
            continue;
        }
        table.add_row(vec![
            Cell::new(styled_action(action)),
            Cell::new(format!("{:.1}%", freq * 100.0)).set_alignment(CellAlignment::Right),
        ]);
    }

    format!("{}\n", table)
}

/// Range-vs-range report: info sets aggregated by (player, history, hand
/// class), frequencies averaged across the combos in each class.
pub fn render_profile_aggregated(profile: &StrategyProfile) -> String {
    struct Aggregate {
        actions: Vec<Action>,
        freq_sums: Vec<f64>,
        count: usize,
    }

    // BTreeMap keeps (player, history, class) groups in a stable order.
    let mut groups: BTreeMap<(String, String, String), Aggregate> = BTreeMap::new();

    for (key, strategy) in profile.iter() {
        let parts: Vec<&str> = key.split('|').collect();
        if parts.len() != 4 {
            continue;
        }
        let player = parts[2].trim_start_matches('>').to_string();
        let history = parts[1].to_string();
        let class = hand_class(parts[3]);

        let average = strategy.average_strategy();
        let entry = groups
            .entry((player, history, class))
            .or_insert_with(|| Aggregate {
                actions: strategy.actions.clone(),
                freq_sums: vec![0.0; strategy.actions.len()],
                count: 0,
            });
        if entry.freq_sums.len() == average.len() {
            for (sum, f) in entry.freq_sums.iter_mut().zip(&average) {
                *sum += f;
            }
            entry.count += 1;
        }
    }

    let mut out = String::new();
    let mut last_player: Option<String> = None;

    for ((player, history, class), aggregate) in &groups {
        if last_player.as_deref() != Some(player.as_str()) {
            out.push_str(&format!("{}\n", player.cyan().bold()));
            last_player = Some(player.clone());
        }

        let situation = if history.is_empty() {
            "acts first".to_string()
        } else {
            format!("facing {}", history)
        };
        out.push_str(&format!("  {} ({}):\n", class.bold(), situation));

        for (action, sum) in aggregate.actions.iter().zip(&aggregate.freq_sums) {
            let freq = sum / aggregate.count as f64;
            if freq < 0.01 {
                continue;
            }
            out.push_str(&format!(
                "    {}: {:.1}%\n",
                styled_action(action),
                freq * 100.0
            ));
        }
    }
    out
}

/// Canonical hand class for the info-set hand field: "AsAh" -> "AA",
/// "KdQd" -> "KQs", "QsKd" -> "KQo". Bucket labels pass through.
pub fn hand_class(hand: &str) -> String {
    if hand.starts_with("BUCKET_") || hand.len() != 4 {
        return hand.to_string();
    }

    let bytes = hand.as_bytes();
    let (r1, s1, r2, s2) = (bytes[0], bytes[1], bytes[2], bytes[3]);

    if r1 == r2 {
        return format!("{}{}", r1 as char, r2 as char);
    }

    const RANK_ORDER: &str = "AKQJT98765432";
    let idx1 = RANK_ORDER.find(r1 as char);
    let idx2 = RANK_ORDER.find(r2 as char);
    let (high, low) = match (idx1, idx2) {
        (Some(i1), Some(i2)) if i1 <= i2 => (r1, r2),
        (Some(_), Some(_)) => (r2, r1),
        _ => return hand.to_string(),
    };
    let suffix = if s1 == s2 { 's' } else { 'o' };
    format!("{}{}{}", high as char, low as char, suffix)
}

fn styled_action(action: &Action) -> String {
    match action {
        Action::Check => action.token().yellow().to_string(),
        Action::Call => action.token().green().to_string(),
        Action::Fold => action.token().dimmed().to_string(),
        Action::Bet(_) | Action::Raise(_) => action.token().red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hand_class_canonicalizes() {
        assert_eq!(hand_class("AsAh"), "AA");
        assert_eq!(hand_class("KdQd"), "KQs");
        assert_eq!(hand_class("QsKd"), "KQo");
        assert_eq!(hand_class("BUCKET_7"), "BUCKET_7");
    }
}
