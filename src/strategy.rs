use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SolverResult;
use crate::notation::Action;

/// Accumulated CFR state for one information set. The current strategy is
/// derived from `regret_sum` by regret matching; the reported strategy is
/// `strategy_sum` normalized.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub info_set: String,
    pub actions: Vec<Action>,
    pub regret_sum: Vec<f64>,
    pub strategy_sum: Vec<f64>,
}

impl Strategy {
    pub fn new(info_set: &str, actions: &[Action]) -> Strategy {
        Strategy {
            info_set: info_set.to_string(),
            actions: actions.to_vec(),
            regret_sum: vec![0.0; actions.len()],
            strategy_sum: vec![0.0; actions.len()],
        }
    }

    /// Regret matching: proportional to positive regrets, uniform when no
    /// regret is positive.
    pub fn current_strategy(&self) -> Vec<f64> {
        let n = self.actions.len();
        let mut strategy = vec![0.0; n];

        let mut normalizer = 0.0;
        for (i, &regret) in self.regret_sum.iter().enumerate() {
            if regret > 0.0 {
                strategy[i] = regret;
                normalizer += regret;
            }
        }

        if normalizer > 0.0 {
            for s in &mut strategy {
                *s /= normalizer;
            }
        } else {
            let uniform = 1.0 / n as f64;
            strategy.fill(uniform);
        }

        strategy
    }

    /// The average strategy over all iterations; converges toward a Nash
    /// equilibrium of the abstracted game.
    pub fn average_strategy(&self) -> Vec<f64> {
        let n = self.actions.len();
        let normalizer: f64 = self.strategy_sum.iter().sum();

        if normalizer > 0.0 {
            self.strategy_sum.iter().map(|s| s / normalizer).collect()
        } else {
            vec![1.0 / n as f64; n]
        }
    }

    pub fn add_regrets(&mut self, regrets: &[f64]) {
        for (sum, regret) in self.regret_sum.iter_mut().zip(regrets) {
            *sum += regret;
        }
    }

    pub fn add_strategy(&mut self, strategy: &[f64], reach: f64) {
        for (sum, s) in self.strategy_sum.iter_mut().zip(strategy) {
            *sum += reach * s;
        }
    }
}

/// All strategies accumulated during a solve, keyed by info-set string.
/// Created empty; entries appear lazily on first visit.
#[derive(Debug, Clone, Default)]
pub struct StrategyProfile {
    strategies: HashMap<String, Strategy>,
}

impl StrategyProfile {
    pub fn new() -> StrategyProfile {
        StrategyProfile {
            strategies: HashMap::new(),
        }
    }

    pub fn get_or_create(&mut self, info_set: &str, actions: &[Action]) -> &mut Strategy {
        self.strategies
            .entry(info_set.to_string())
            .or_insert_with(|| Strategy::new(info_set, actions))
    }

    pub fn get(&self, info_set: &str) -> Option<&Strategy> {
        self.strategies.get(info_set)
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Strategy)> {
        self.strategies.iter()
    }

    pub fn average_strategies(&self) -> HashMap<String, Vec<f64>> {
        self.strategies
            .iter()
            .map(|(k, s)| (k.clone(), s.average_strategy()))
            .collect()
    }

    /// Serialize to the wire form, info sets sorted for stable output.
    pub fn to_json(&self) -> SolverResult<String> {
        let mut keys: Vec<&String> = self.strategies.keys().collect();
        keys.sort();

        let records = keys
            .into_iter()
            .map(|key| {
                let strategy = &self.strategies[key];
                StrategyRecord {
                    infoset: strategy.info_set.clone(),
                    actions: strategy.actions.iter().map(ActionRecord::from).collect(),
                    regret_sum: strategy.regret_sum.clone(),
                    strategy_sum: strategy.strategy_sum.clone(),
                }
            })
            .collect();

        let file = ProfileFile {
            version: PROFILE_VERSION.to_string(),
            strategies: records,
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Rebuild a profile from the wire form, permitting warm starts.
    pub fn from_json(data: &str) -> SolverResult<StrategyProfile> {
        let file: ProfileFile = serde_json::from_str(data)?;

        let mut profile = StrategyProfile::new();
        for record in file.strategies {
            let actions: Vec<Action> = record.actions.iter().map(ActionRecord::to_action).collect();
            let mut strategy = Strategy::new(&record.infoset, &actions);
            strategy.regret_sum = record.regret_sum;
            strategy.strategy_sum = record.strategy_sum;
            profile.strategies.insert(record.infoset, strategy);
        }
        Ok(profile)
    }
}

const PROFILE_VERSION: &str = "1.0";

#[derive(Serialize, Deserialize)]
struct ProfileFile {
    version: String,
    strategies: Vec<StrategyRecord>,
}

#[derive(Serialize, Deserialize)]
struct StrategyRecord {
    infoset: String,
    actions: Vec<ActionRecord>,
    regret_sum: Vec<f64>,
    strategy_sum: Vec<f64>,
}

#[derive(Serialize, Deserialize)]
struct ActionRecord {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    amount: f64,
}

fn is_zero(x: &f64) -> bool {
    *x == 0.0
}

impl From<&Action> for ActionRecord {
    fn from(action: &Action) -> ActionRecord {
        let (kind, amount) = match action {
            Action::Check => ("check", 0.0),
            Action::Call => ("call", 0.0),
            Action::Fold => ("fold", 0.0),
            Action::Bet(a) => ("bet", *a),
            Action::Raise(a) => ("raise", *a),
        };
        ActionRecord {
            kind: kind.to_string(),
            amount,
        }
    }
}

impl ActionRecord {
    fn to_action(&self) -> Action {
        match self.kind.as_str() {
            "call" => Action::Call,
            "fold" => Action::Fold,
            "bet" => Action::Bet(self.amount),
            "raise" => Action::Raise(self.amount),
            _ => Action::Check,
        }
    }
}
