use gto_solver::actions::ActionConfig;
use gto_solver::cfr::{Cfr, MAX_ITERATIONS};
use gto_solver::game_tree::Builder;
use gto_solver::mccfr::Mccfr;
use gto_solver::notation::{parse_position, Action};
use gto_solver::solve::{solve, SolveMethod, SolveOptions};
use gto_solver::strategy::StrategyProfile;

fn assert_profile_normalized(profile: &StrategyProfile, tolerance: f64) {
    for (key, strategy) in profile.iter() {
        let average = strategy.average_strategy();
        let total: f64 = average.iter().sum();
        assert!(
            (total - 1.0).abs() < tolerance,
            "average strategy at {} sums to {}",
            key,
            total
        );
        assert!(average.iter().all(|&p| p >= 0.0));
    }
}

#[test]
fn test_river_value_hand_prefers_betting() {
    // AA over QQ on a dry river: the nuts-ish hand should bet far more
    // often than it checks.
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::with_bet_sizes(vec![0.5, 1.0]));
    let root = builder
        .build(&gs, gs.players[0].range[0], gs.players[1].range[0])
        .unwrap();

    let mut solver = Cfr::new(42);
    let applied = solver.train(&root, 10_000);
    assert_eq!(applied, 10_000);

    let profile = solver.profile();
    assert!(
        (2..=10).contains(&profile.len()),
        "expected 2..=10 info sets, got {}",
        profile.len()
    );
    assert_profile_normalized(profile, 1e-9);

    let strategy = profile.get("Kh9s4c7d2s||>BTN|AdAc").unwrap();
    let average = strategy.average_strategy();
    let mut check_prob = 0.0;
    let mut bet_prob = 0.0;
    for (action, freq) in strategy.actions.iter().zip(&average) {
        match action {
            Action::Check => check_prob += freq,
            Action::Bet(_) => bet_prob += freq,
            _ => {}
        }
    }
    assert!(
        bet_prob > check_prob,
        "bet {} should exceed check {}",
        bet_prob,
        check_prob
    );
}

#[test]
fn test_beaten_hand_folds_to_bets() {
    // 72 on a bricked river loses to AA at every showdown, so facing any
    // bet its fold frequency stays well above the 0.2 floor.
    let gs = parse_position("BTN:AA:S20/BB:7h2s:S20|P10|Kh9s4c3d2h|>BTN").unwrap();
    let outcome = solve(
        &gs,
        SolveOptions {
            iterations: 3_000,
            seed: 42,
            ..SolveOptions::default()
        },
    )
    .unwrap();

    let mut checked = 0;
    for (key, strategy) in outcome.profile.iter() {
        let parts: Vec<&str> = key.split('|').collect();
        let facing_bet = parts[1]
            .rsplit(|c: char| c == 'x' || c == 'c' || c == 'f')
            .next()
            .map(|tail| tail.starts_with('b'))
            .unwrap_or(false);
        if parts[2] != ">BB" || !facing_bet {
            continue;
        }

        let fold_idx = strategy
            .actions
            .iter()
            .position(|a| *a == Action::Fold)
            .expect("facing a bet, folding must be legal");
        let average = strategy.average_strategy();
        assert!(
            average[fold_idx] > 0.2,
            "fold frequency {} at {} too low",
            average[fold_idx],
            key
        );
        checked += 1;
    }
    assert!(checked > 0, "no BB-facing-bet info sets found");
}

#[test]
fn test_range_vs_range_mccfr_profile_normalized() {
    let gs = parse_position("BTN:AA,KK:S100/BB:QQ,JJ:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let outcome = solve(
        &gs,
        SolveOptions {
            iterations: 5_000,
            seed: 1234,
            ..SolveOptions::default()
        },
    )
    .unwrap();

    assert_eq!(outcome.method, SolveMethod::OutcomeSamplingMccfr);
    assert_eq!(outcome.applied_iterations, 5_000);
    assert!(!outcome.profile.is_empty());
    assert_profile_normalized(&outcome.profile, 0.01);
}

#[test]
fn test_turn_spot_uses_mccfr() {
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d|>BTN").unwrap();
    let outcome = solve(
        &gs,
        SolveOptions {
            iterations: 2_000,
            seed: 42,
            ..SolveOptions::default()
        },
    )
    .unwrap();
    assert_eq!(outcome.method, SolveMethod::OutcomeSamplingMccfr);
    assert!(!outcome.profile.is_empty());
    assert_profile_normalized(&outcome.profile, 0.01);
}

#[test]
fn test_river_combo_spot_uses_vanilla_cfr() {
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let outcome = solve(
        &gs,
        SolveOptions {
            iterations: 100,
            seed: 42,
            ..SolveOptions::default()
        },
    )
    .unwrap();
    assert_eq!(outcome.method, SolveMethod::VanillaCfr);
}

#[test]
fn test_mccfr_is_deterministic_for_fixed_seed() {
    let gs = parse_position("BTN:AA,KK:S100/BB:QQ,JJ:S100|P10|Kh9s4c7d2s|>BTN").unwrap();

    let run = |seed: u64| {
        let mut builder = Builder::new(ActionConfig::default_river());
        let root = builder
            .build_range(&gs, &gs.players[0].range, &gs.players[1].range)
            .unwrap();
        let mut solver = Mccfr::new(seed);
        solver.train(&root, 1_000);
        solver.into_profile()
    };

    let first = run(99);
    let second = run(99);

    assert_eq!(first.len(), second.len());
    for (key, strategy) in first.iter() {
        let other = second.get(key).expect("info set missing in rerun");
        assert_eq!(strategy.regret_sum, other.regret_sum, "regrets at {}", key);
        assert_eq!(
            strategy.strategy_sum, other.strategy_sum,
            "strategy sums at {}",
            key
        );
    }

    let different_seed = run(100);
    assert_eq!(first.len(), different_seed.len());
}

#[test]
fn test_player_relabeling_symmetry() {
    // The same physical game with the player list re-ordered must produce
    // the same strategies per info set.
    let run = |fen: &str| {
        let gs = parse_position(fen).unwrap();
        let mut builder = Builder::new(ActionConfig::with_bet_sizes(vec![0.5, 1.0]));
        let combo0 = gs.players[0].range[0];
        let combo1 = gs.players[1].range[0];
        let root = builder.build(&gs, combo0, combo1).unwrap();
        let mut solver = Cfr::new(42);
        solver.train(&root, 2_000);
        solver.into_profile()
    };

    let original = run("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN");
    let relabeled = run("BB:QdQh:S100/BTN:AdAc:S100|P10|Kh9s4c7d2s|>BTN");

    assert_eq!(original.len(), relabeled.len());
    for (key, strategy) in original.iter() {
        let other = relabeled.get(key).expect("info set missing after relabel");
        let a = strategy.average_strategy();
        let b = other.average_strategy();
        for (pa, pb) in a.iter().zip(&b) {
            assert!((pa - pb).abs() < 1e-9, "strategies diverge at {}", key);
        }
    }
}

#[test]
fn test_iteration_cap_applies() {
    // A check-only tree keeps the capped run cheap.
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();
    let mut builder = Builder::new(ActionConfig::with_bet_sizes(vec![]));
    let root = builder
        .build(&gs, gs.players[0].range[0], gs.players[1].range[0])
        .unwrap();

    let mut solver = Cfr::new(42);
    let applied = solver.train(&root, MAX_ITERATIONS + 5_000);
    assert_eq!(applied, MAX_ITERATIONS);
}

#[test]
fn test_warm_start_roundtrip() {
    let gs = parse_position("BTN:AdAc:S100/BB:QdQh:S100|P10|Kh9s4c7d2s|>BTN").unwrap();

    let first = solve(
        &gs,
        SolveOptions {
            iterations: 500,
            seed: 42,
            ..SolveOptions::default()
        },
    )
    .unwrap();
    let info_sets = first.profile.len();

    let json = first.profile.to_json().unwrap();
    let restored = StrategyProfile::from_json(&json).unwrap();
    assert_eq!(restored.len(), info_sets);

    let resumed = solve(
        &gs,
        SolveOptions {
            iterations: 500,
            seed: 43,
            warm_start: Some(restored),
            ..SolveOptions::default()
        },
    )
    .unwrap();
    assert_eq!(resumed.profile.len(), info_sets);
    assert_profile_normalized(&resumed.profile, 1e-9);
}

#[test]
fn test_bucketed_solve_shrinks_info_sets() {
    let gs = parse_position("BTN:AA,KK,QQ:S100/BB:JJ,TT:S100|P10|Kh9s4c7d2s|>BTN").unwrap();

    let exact = solve(
        &gs,
        SolveOptions {
            iterations: 500,
            seed: 42,
            ..SolveOptions::default()
        },
    )
    .unwrap();

    let bucketed = solve(
        &gs,
        SolveOptions {
            iterations: 500,
            seed: 42,
            buckets: 9,
            ..SolveOptions::default()
        },
    )
    .unwrap();

    assert!(!bucketed.profile.is_empty());
    assert!(
        bucketed.profile.len() <= exact.profile.len(),
        "bucketing should not grow the info-set count here ({} vs {})",
        bucketed.profile.len(),
        exact.profile.len()
    );
}

#[test]
fn test_geometric_solve_runs() {
    use gto_solver::solve::GeometricOptions;

    let gs = parse_position("BTN:AdAc:S97/BB:QdQh:S97|P6|Kh9s4c7d|>BTN").unwrap();
    let outcome = solve(
        &gs,
        SolveOptions {
            iterations: 1_000,
            seed: 42,
            geometric: Some(GeometricOptions {
                target_pot: 30.0,
                num_sizes: 2,
            }),
            ..SolveOptions::default()
        },
    )
    .unwrap();
    assert!(!outcome.profile.is_empty());
    assert_profile_normalized(&outcome.profile, 0.01);
}
