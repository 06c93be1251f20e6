use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;

use gto_solver::actions::ActionConfig;
use gto_solver::cards::parse_cards;
use gto_solver::error::SolverError;
use gto_solver::game_tree::{info_set_key, Builder, NodeKind, TreeNode};
use gto_solver::mccfr::realize_rollout;
use gto_solver::notation::{parse_position, Action, Position};
use gto_solver::ranges::expand_range;
use gto_solver::solve::has_rollout;

fn collect_info_sets(node: &TreeNode, out: &mut HashSet<String>) {
    match &node.kind {
        NodeKind::Decision {
            info_set, children, ..
        } => {
            out.insert(info_set.clone());
            for child in children.values() {
                collect_info_sets(child, out);
            }
        }
        NodeKind::Chance { outcomes } => {
            for outcome in outcomes {
                collect_info_sets(&outcome.child, out);
            }
        }
        _ => {}
    }
}

fn check_terminal_conservation(node: &TreeNode) {
    match &node.kind {
        NodeKind::Terminal { payoffs } => {
            assert!(
                (payoffs[0] + payoffs[1] - node.pot).abs() < 1e-9,
                "terminal payoffs {:?} do not sum to pot {}",
                payoffs,
                node.pot
            );
        }
        NodeKind::Decision { children, .. } => {
            for child in children.values() {
                check_terminal_conservation(child);
            }
        }
        NodeKind::Chance { outcomes } => {
            for outcome in outcomes {
                check_terminal_conservation(&outcome.child);
            }
        }
        NodeKind::Rollout { .. } => {}
    }
}

#[test]
fn test_info_set_key_format() {
    let board = parse_cards("Kh9s4c").unwrap();
    let history = vec![Action::Check, Action::Bet(5.0)];
    let key = info_set_key(&board, &history, Position::BTN, "AsAh");
    assert_eq!(key, "Kh9s4c|xb5.0|>BTN|AsAh");

    let empty_history = info_set_key(&board, &[], Position::BB, "BUCKET_7");
    assert_eq!(empty_history, "Kh9s4c||>BB|BUCKET_7");
}

#[test]
fn test_river_tree_structure() {
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::with_bet_sizes(vec![0.5, 1.0]));
    let root = builder
        .build(&gs, gs.players[0].range[0], gs.players[1].range[0])
        .unwrap();

    match &root.kind {
        NodeKind::Decision {
            player,
            info_set,
            actions,
            ..
        } => {
            assert_eq!(*player, 0);
            assert_eq!(info_set, "Kh9s4c7d2s||>BTN|AdAc");
            assert_eq!(
                actions,
                &vec![
                    Action::Check,
                    Action::Bet(5.0),
                    Action::Bet(10.0),
                    Action::Bet(100.0),
                ]
            );
        }
        _ => panic!("root should be a decision node"),
    }

    let mut info_sets = HashSet::new();
    collect_info_sets(&root, &mut info_sets);
    assert!(
        (2..=10).contains(&info_sets.len()),
        "expected 2..=10 info sets, got {}",
        info_sets.len()
    );
    assert!(root.num_decisions() >= info_sets.len());

    check_terminal_conservation(&root);
}

#[test]
fn test_fold_awards_pot_to_non_folder() {
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::with_bet_sizes(vec![0.5]));
    let root = builder
        .build(&gs, gs.players[0].range[0], gs.players[1].range[0])
        .unwrap();

    // BTN bets half pot, BB folds: BTN collects the 15bb pot.
    let bet_child = match &root.kind {
        NodeKind::Decision { children, .. } => &children["b5.0"],
        _ => panic!("root should be a decision node"),
    };
    let fold_child = match &bet_child.kind {
        NodeKind::Decision { children, .. } => &children["f"],
        _ => panic!("bet child should be a decision node"),
    };
    match &fold_child.kind {
        NodeKind::Terminal { payoffs } => {
            assert_eq!(payoffs[0], 15.0);
            assert_eq!(payoffs[1], 0.0);
        }
        _ => panic!("fold should terminate the hand"),
    }
}

#[test]
fn test_showdown_split_on_tie() {
    // Both players play the board straight.
    let gs = parse_position("BTN:2c3c:S100/BB:4d5d:S100|P10|AhKhQdJsTs|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::with_bet_sizes(vec![]));
    let root = builder
        .build(&gs, gs.players[0].range[0], gs.players[1].range[0])
        .unwrap();

    let check_child = match &root.kind {
        NodeKind::Decision { children, .. } => &children["x"],
        _ => panic!("root should be a decision node"),
    };
    let showdown = match &check_child.kind {
        NodeKind::Decision { children, .. } => &children["x"],
        _ => panic!("check child should be a decision node"),
    };
    match &showdown.kind {
        NodeKind::Terminal { payoffs } => {
            assert_eq!(payoffs[0], 5.0);
            assert_eq!(payoffs[1], 5.0);
        }
        _ => panic!("check-check should reach showdown"),
    }
}

#[test]
fn test_range_root_children_and_probabilities() {
    // No board card blocks either range: 12 x 12 valid pairs.
    let gs = parse_position("BTN:AA,KK:S100/BB:QQ,JJ:S100|P10|Th9s4c7d2s|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::default_river());
    let root = builder
        .build_range(&gs, &gs.players[0].range, &gs.players[1].range)
        .unwrap();

    match &root.kind {
        NodeKind::Chance { outcomes } => {
            assert_eq!(outcomes.len(), 144);
            let total: f64 = outcomes.iter().map(|o| o.probability).sum();
            assert!((total - 1.0).abs() < 1e-6);
            for outcome in outcomes {
                assert!(outcome.probability > 0.0);
            }
        }
        _ => panic!("range build should produce a chance root"),
    }
}

#[test]
fn test_range_root_skips_blocked_combos() {
    // The board king removes 3 of KK's 6 combos: (6 + 3) x 12 pairs.
    let gs = parse_position("BTN:AA,KK:S100/BB:QQ,JJ:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::default_river());
    let root = builder
        .build_range(&gs, &gs.players[0].range, &gs.players[1].range)
        .unwrap();

    match &root.kind {
        NodeKind::Chance { outcomes } => assert_eq!(outcomes.len(), 108),
        _ => panic!("range build should produce a chance root"),
    }
}

#[test]
fn test_turn_tree_contains_rollout() {
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::default_river());
    let root = builder
        .build(&gs, gs.players[0].range[0], gs.players[1].range[0])
        .unwrap();
    assert!(has_rollout(&root));
    check_terminal_conservation(&root);
}

#[test]
fn test_flop_tree_contains_rollout() {
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::default_river());
    let root = builder
        .build(&gs, gs.players[0].range[0], gs.players[1].range[0])
        .unwrap();
    assert!(has_rollout(&root));
}

#[test]
fn test_river_tree_has_no_rollout() {
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::default_river());
    let root = builder
        .build(&gs, gs.players[0].range[0], gs.players[1].range[0])
        .unwrap();
    assert!(!has_rollout(&root));
}

#[test]
fn test_rollout_payoff_sums_to_pot() {
    let board = parse_cards("Kh9s4c7d").unwrap();
    let combos = [
        expand_range("AdAc").unwrap()[0],
        expand_range("QdQh").unwrap()[0],
    ];
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..50 {
        let payoffs = realize_rollout(10.0, &board, &combos, &mut rng);
        assert!((payoffs[0] + payoffs[1] - 10.0).abs() < 1e-9);
    }
}

#[test]
fn test_flop_rollout_draws_two_cards() {
    let board = parse_cards("Kh9s4c").unwrap();
    let combos = [
        expand_range("AdAc").unwrap()[0],
        expand_range("QdQh").unwrap()[0],
    ];
    let mut rng = StdRng::seed_from_u64(11);
    let mut p0_total = 0.0;
    for _ in 0..200 {
        let payoffs = realize_rollout(10.0, &board, &combos, &mut rng);
        assert!((payoffs[0] + payoffs[1] - 10.0).abs() < 1e-9);
        p0_total += payoffs[0];
    }
    // AA should win most rollouts against QQ on this dry board.
    assert!(p0_total / 200.0 > 5.0);
}

#[test]
fn test_duplicate_cards_rejected() {
    let gs = parse_position("BTN:KhKs:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::default_river());
    let result = builder.build(&gs, gs.players[0].range[0], gs.players[1].range[0]);
    assert!(matches!(result, Err(SolverError::DuplicateCard(_))));
}

#[test]
fn test_zero_matchups_rejected() {
    // Villain's range is unknown (empty) so no pair is valid.
    let gs = parse_position("BTN:AA:S100/BB:??:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::default_river());
    let result = builder.build_range(&gs, &gs.players[0].range, &gs.players[1].range);
    assert!(matches!(result, Err(SolverError::NoValidMatchups)));
}

#[test]
fn test_shape_errors_rejected() {
    let mut builder = Builder::new(ActionConfig::default_river());

    let negative_pot = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P-5|Kh9s4c7d2s|>BTN").unwrap();
    let result = builder.build(
        &negative_pot,
        negative_pot.players[0].range[0],
        negative_pot.players[1].range[0],
    );
    assert!(matches!(result, Err(SolverError::NegativePot(_))));

    let zero_stack = parse_position("BTN:AdAc:S0/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let result = builder.build(
        &zero_stack,
        zero_stack.players[0].range[0],
        zero_stack.players[1].range[0],
    );
    assert!(matches!(result, Err(SolverError::NonPositiveStack(_))));

    let zero_bet = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|b0|>BB").unwrap();
    let result = builder.build(
        &zero_bet,
        zero_bet.players[0].range[0],
        zero_bet.players[1].range[0],
    );
    assert!(matches!(result, Err(SolverError::NonPositiveAmount(_))));
}

#[test]
fn test_bucketed_tree_keys_use_buckets() {
    use gto_solver::bucketing::Bucketer;

    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let villain = expand_range("QQ,JJ").unwrap();
    let mut builder = Builder::new(ActionConfig::with_bet_sizes(vec![0.5]));
    builder.set_bucketer(Bucketer::new(&gs.board, &villain, 16));

    let root = builder
        .build(&gs, gs.players[0].range[0], gs.players[1].range[0])
        .unwrap();
    let mut info_sets = HashSet::new();
    collect_info_sets(&root, &mut info_sets);
    assert!(!info_sets.is_empty());
    for key in &info_sets {
        assert!(
            key.rsplit('|').next().unwrap().starts_with("BUCKET_"),
            "expected bucketed hand field in {}",
            key
        );
    }
}
