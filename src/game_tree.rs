//! Extensive-form game tree for heads-up postflop spots.
//!
//! Nodes are a sum type over four kinds: decision, chance (range roots),
//! terminal, and rollout (a showdown on an incomplete board whose payoff
//! is realized by sampling the remaining community cards). Decision nodes
//! carry the info-set key that ties them to shared strategy state.

use std::collections::HashMap;

use crate::actions::{generate_actions, ActionConfig};
use crate::bucketing::Bucketer;
use crate::cards::Card;
use crate::error::{SolverError, SolverResult};
use crate::hand_evaluator::evaluate_with_board;
use crate::notation::{history_string, Action, GameState, Position};
use crate::ranges::Combo;

pub struct TreeNode {
    pub pot: f64,
    pub board: Vec<Card>,
    pub stacks: [f64; 2],
    pub kind: NodeKind,
}

pub enum NodeKind {
    Decision {
        /// Acting player index (0 or 1).
        player: usize,
        info_set: String,
        actions: Vec<Action>,
        /// Children keyed by action token.
        children: HashMap<String, TreeNode>,
    },
    Chance {
        outcomes: Vec<ChanceOutcome>,
    },
    Terminal {
        /// Gross pot awards per player; always sums to `pot`.
        payoffs: [f64; 2],
    },
    Rollout {
        combos: [Combo; 2],
    },
}

pub struct ChanceOutcome {
    pub key: String,
    pub probability: f64,
    pub child: TreeNode,
}

impl TreeNode {
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, NodeKind::Terminal { .. })
    }

    pub fn is_rollout(&self) -> bool {
        matches!(self.kind, NodeKind::Rollout { .. })
    }

    /// Count of decision nodes in the subtree.
    pub fn num_decisions(&self) -> usize {
        match &self.kind {
            NodeKind::Decision { children, .. } => {
                1 + children.values().map(|c| c.num_decisions()).sum::<usize>()
            }
            NodeKind::Chance { outcomes } => {
                outcomes.iter().map(|o| o.child.num_decisions()).sum()
            }
            _ => 0,
        }
    }
}

/// Info-set key: `board|history|>POS|hand`. Two decision points with the
/// same key share strategy and regrets.
pub fn info_set_key(
    board: &[Card],
    history: &[Action],
    position: Position,
    hand: &str,
) -> String {
    let board_str: String = board.iter().map(|c| c.to_string()).collect();
    format!("{}|{}|>{}|{}", board_str, history_string(history), position, hand)
}

/// Constructs game trees from a parsed spot, applying the betting
/// abstraction and, when a bucketer is set, the card abstraction.
pub struct Builder {
    pub config: ActionConfig,
    bucketer: Option<Bucketer>,
}

impl Builder {
    pub fn new(config: ActionConfig) -> Builder {
        Builder {
            config,
            bucketer: None,
        }
    }

    /// Key info sets on `BUCKET_<n>` instead of specific hole cards.
    pub fn set_bucketer(&mut self, bucketer: Bucketer) {
        self.bucketer = Some(bucketer);
    }

    /// Full tree for one specific combo-vs-combo matchup.
    pub fn build(
        &mut self,
        state: &GameState,
        combo0: Combo,
        combo1: Combo,
    ) -> SolverResult<TreeNode> {
        self.validate_state(state)?;
        validate_cards(&state.board, combo0, combo1)?;

        let stacks = [state.players[0].stack, state.players[1].stack];
        let positions = [state.players[0].position, state.players[1].position];

        Ok(self.build_node(
            &state.board,
            state.history.clone(),
            state.pot,
            stacks,
            state.to_act,
            [combo0, combo1],
            positions,
        ))
    }

    /// Range-vs-range tree: a chance root whose children are the subtrees
    /// for every valid (combo0, combo1) pair, weighted uniformly. Pairs
    /// that collide with the board or each other are skipped; zero valid
    /// pairs is an error.
    pub fn build_range(
        &mut self,
        state: &GameState,
        range0: &[Combo],
        range1: &[Combo],
    ) -> SolverResult<TreeNode> {
        self.validate_state(state)?;

        let stacks = [state.players[0].stack, state.players[1].stack];
        let positions = [state.players[0].position, state.players[1].position];

        let mut outcomes = Vec::new();
        for &combo0 in range0 {
            for &combo1 in range1 {
                if validate_cards(&state.board, combo0, combo1).is_err() {
                    continue;
                }
                let child = self.build_node(
                    &state.board,
                    state.history.clone(),
                    state.pot,
                    stacks,
                    state.to_act,
                    [combo0, combo1],
                    positions,
                );
                outcomes.push(ChanceOutcome {
                    key: format!("{}:{}", combo0, combo1),
                    probability: 0.0,
                    child,
                });
            }
        }

        if outcomes.is_empty() {
            return Err(SolverError::NoValidMatchups);
        }

        let probability = 1.0 / outcomes.len() as f64;
        for outcome in &mut outcomes {
            outcome.probability = probability;
        }

        Ok(TreeNode {
            pot: state.pot,
            board: state.board.clone(),
            stacks,
            kind: NodeKind::Chance { outcomes },
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn build_node(
        &mut self,
        board: &[Card],
        history: Vec<Action>,
        pot: f64,
        stacks: [f64; 2],
        to_act: usize,
        combos: [Combo; 2],
        positions: [Position; 2],
    ) -> TreeNode {
        // The acting player flips after every action, so at a fold
        // terminal `to_act` is the player who did not fold.
        if matches!(history.last(), Some(Action::Fold)) {
            let mut payoffs = [0.0, 0.0];
            payoffs[to_act] = pot;
            return TreeNode {
                pot,
                board: board.to_vec(),
                stacks,
                kind: NodeKind::Terminal { payoffs },
            };
        }

        if is_showdown(&history) {
            if board.len() < 5 {
                return TreeNode {
                    pot,
                    board: board.to_vec(),
                    stacks,
                    kind: NodeKind::Rollout { combos },
                };
            }
            let payoffs = showdown_payoffs(board, &combos, pot);
            return TreeNode {
                pot,
                board: board.to_vec(),
                stacks,
                kind: NodeKind::Terminal { payoffs },
            };
        }

        let hand = match &mut self.bucketer {
            Some(bucketer) => format!("BUCKET_{}", bucketer.bucket(combos[to_act])),
            None => combos[to_act].to_string(),
        };
        let info_set = info_set_key(board, &history, positions[to_act], &hand);

        let actions = generate_actions(pot, stacks[to_act], history.last(), &self.config);

        let mut children = HashMap::with_capacity(actions.len());
        for &action in &actions {
            let mut new_history = history.clone();
            new_history.push(action);
            let mut new_pot = pot;
            let mut new_stacks = stacks;

            match action {
                Action::Bet(amount) | Action::Raise(amount) => {
                    new_pot += amount;
                    new_stacks[to_act] -= amount;
                }
                Action::Call => {
                    let amount = call_amount(&history, stacks[to_act]);
                    new_pot += amount;
                    new_stacks[to_act] -= amount;
                }
                Action::Check | Action::Fold => {}
            }

            let child = self.build_node(
                board,
                new_history,
                new_pot,
                new_stacks,
                1 - to_act,
                combos,
                positions,
            );
            children.insert(action.token(), child);
        }

        TreeNode {
            pot,
            board: board.to_vec(),
            stacks,
            kind: NodeKind::Decision {
                player: to_act,
                info_set,
                actions,
                children,
            },
        }
    }

    fn validate_state(&self, state: &GameState) -> SolverResult<()> {
        if state.players.len() != 2 {
            return Err(SolverError::PlayerCount(state.players.len()));
        }
        if !matches!(state.board.len(), 3 | 4 | 5) {
            return Err(SolverError::BoardSize(state.board.len()));
        }
        if state.pot < 0.0 {
            return Err(SolverError::NegativePot(state.pot));
        }
        let acting_stack = state.players[state.to_act].stack;
        if acting_stack <= 0.0 {
            return Err(SolverError::NonPositiveStack(acting_stack));
        }
        for action in &state.history {
            if action.is_bet_or_raise() && action.amount() <= 0.0 {
                return Err(SolverError::NonPositiveAmount(action.amount()));
            }
        }
        if let Some(sizing) = &self.config.geometric {
            sizing.validate()?;
        }
        Ok(())
    }
}

/// The street is closed for showdown after two consecutive checks or a
/// call of a bet/raise.
fn is_showdown(history: &[Action]) -> bool {
    if history.len() < 2 {
        return false;
    }
    let last = history[history.len() - 1];
    let second_last = history[history.len() - 2];

    matches!((second_last, last), (Action::Check, Action::Check))
        || (last == Action::Call && second_last.is_bet_or_raise())
}

fn showdown_payoffs(board: &[Card], combos: &[Combo; 2], pot: f64) -> [f64; 2] {
    let value0 = evaluate_with_board(combos[0].cards(), board);
    let value1 = evaluate_with_board(combos[1].cards(), board);
    match value0.compare(&value1) {
        1 => [pot, 0.0],
        -1 => [0.0, pot],
        _ => [pot / 2.0, pot / 2.0],
    }
}

/// Amount needed to call: the most recent bet/raise, capped at the stack.
fn call_amount(history: &[Action], stack: f64) -> f64 {
    for action in history.iter().rev() {
        if action.is_bet_or_raise() {
            return action.amount().min(stack);
        }
    }
    0.0
}

fn validate_cards(board: &[Card], combo0: Combo, combo1: Combo) -> SolverResult<()> {
    let mut seen: Vec<Card> = Vec::with_capacity(board.len() + 4);
    for &card in board
        .iter()
        .chain(combo0.cards().iter())
        .chain(combo1.cards().iter())
    {
        if seen.contains(&card) {
            return Err(SolverError::DuplicateCard(card));
        }
        seen.push(card);
    }
    Ok(())
}
