//! Builds the LALR(1) action/goto tables: canonical LR(1) automaton
//! construction followed by core-signature merging, then compaction into
//! dense per-state arrays.
//!
//! Construction is two-phase:
//! 1. Enumerate the canonical LR(1) item sets via BFS over GOTO.
//! 2. Merge states whose item sets share a core signature (same
//!    production/dot pairs, different lookaheads) the way an LALR(1)
//!    build does, unioning lookaheads and remapping transitions.
//!
//! Both phases are driven off sorted `BTreeMap`/`Vec` iteration, so two
//! runs over the same grammar always produce byte-identical tables.

use std::collections::HashMap;

use formula_lex::TokenKind;
use rustc_hash::FxHashMap;

use crate::first_follow::FirstFollow;
use crate::grammar::{precedence_of, Associativity, BuilderTag, Grammar, Production};
use crate::lr_item::{closure, core_signature, goto, is_complete, symbol_after_dot, ItemCore, ItemSet, LookaheadSet};
use crate::symbol::{terminal_index, NonTerminal, Symbol, ALL_TERMINALS};
use crate::error::ParserTableError;

const MAX_STATES: usize = 10_000;
const MAX_ITEMS_PER_STATE: usize = 1_000;
const MAX_TRANSITIONS_PER_STATE: usize = 500;

/// An action-table cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Shift(usize),
    Reduce(i32),
    Accept,
}

/// A non-fatal note recorded while resolving a conflict (or about the
/// absence of one). Surfaced so callers can assert the grammar is free of
/// silently-resolved ambiguity.
#[derive(Clone, Debug)]
pub struct ConflictNote {
    pub state: usize,
    pub terminal: TokenKind,
    pub description: String,
}

/// The compacted LALR(1) parser tables: dense `[state][terminal]` action
/// array, dense `[state][non_terminal]` goto array, and the grammar's
/// productions (needed by the driver to know how many symbols to pop and
/// which builder to invoke on reduce).
pub struct ParserTables {
    pub num_states: usize,
    action: Vec<[Option<Action>; ALL_TERMINALS.len()]>,
    goto_table: Vec<[Option<usize>; NonTerminal::ALL.len()]>,
    pub productions: Vec<Production>,
    pub conflicts: Vec<ConflictNote>,
}

impl ParserTables {
    pub fn action(&self, state: usize, terminal: TokenKind) -> Option<Action> {
        self.action[state][terminal_index(terminal)]
    }

    pub fn goto(&self, state: usize, nt: NonTerminal) -> Option<usize> {
        self.goto_table[state][nt.index()]
    }

    pub fn production(&self, id: i32) -> &Production {
        self.productions.iter().find(|p| p.id == id).expect("production id always valid")
    }

    pub fn build(grammar: &Grammar) -> Result<Self, ParserTableError> {
        let first_follow = FirstFollow::compute(grammar);
        let (states, transitions) = build_canonical_automaton(grammar, &first_follow)?;
        let (states, transitions) = merge_lalr(states, transitions);
        compact(grammar, states, transitions)
    }
}

fn build_canonical_automaton(
    grammar: &Grammar,
    first_follow: &FirstFollow,
) -> Result<(Vec<ItemSet>, Vec<FxHashMap<Symbol, usize>>), ParserTableError> {
    let augmented = grammar.augmented_production();
    let mut initial = ItemSet::new();
    initial.insert((augmented.id, 0), LookaheadSet::single(TokenKind::Dollar));
    let initial = closure(grammar, first_follow, initial);

    let mut states: Vec<ItemSet> = vec![initial];
    let mut index_of: HashMap<ItemSet, usize> = HashMap::new();
    index_of.insert(states[0].clone(), 0);
    let mut transitions: Vec<FxHashMap<Symbol, usize>> = vec![FxHashMap::default()];

    let mut frontier = vec![0usize];
    while let Some(state_id) = frontier.pop() {
        if states[state_id].len() > MAX_ITEMS_PER_STATE {
            return Err(ParserTableError::TooManyItems { count: states[state_id].len(), limit: MAX_ITEMS_PER_STATE });
        }

        let mut outgoing: Vec<Symbol> = Vec::new();
        for &core in states[state_id].keys() {
            if let Some(symbol) = symbol_after_dot(grammar, core) {
                if !outgoing.contains(&symbol) {
                    outgoing.push(symbol);
                }
            }
        }
        if outgoing.len() > MAX_TRANSITIONS_PER_STATE {
            return Err(ParserTableError::TooManyTransitions { count: outgoing.len(), limit: MAX_TRANSITIONS_PER_STATE });
        }

        for symbol in outgoing {
            let target_items = goto(grammar, first_follow, &states[state_id], symbol);
            if target_items.is_empty() {
                continue;
            }
            let target_id = match index_of.get(&target_items) {
                Some(&id) => id,
                None => {
                    let id = states.len();
                    if id >= MAX_STATES {
                        return Err(ParserTableError::TooManyStates { count: id + 1, limit: MAX_STATES });
                    }
                    index_of.insert(target_items.clone(), id);
                    states.push(target_items);
                    transitions.push(FxHashMap::default());
                    frontier.push(id);
                    id
                }
            };
            transitions[state_id].insert(symbol, target_id);
        }
    }

    Ok((states, transitions))
}

/// Merge states sharing an LR(0) core signature, unioning lookaheads and
/// remapping transitions. Processes original state ids in ascending order
/// so the canonical representative of each merged group, and therefore
/// the resulting numbering, is deterministic.
fn merge_lalr(
    states: Vec<ItemSet>,
    transitions: Vec<FxHashMap<Symbol, usize>>,
) -> (Vec<ItemSet>, Vec<FxHashMap<Symbol, usize>>) {
    let mut signature_to_canonical: HashMap<Vec<ItemCore>, usize> = HashMap::new();
    let mut old_to_new = vec![0usize; states.len()];
    let mut next_canonical = 0usize;

    for (i, state) in states.iter().enumerate() {
        let signature = core_signature(state);
        let canonical = *signature_to_canonical.entry(signature).or_insert_with(|| {
            let id = next_canonical;
            next_canonical += 1;
            id
        });
        old_to_new[i] = canonical;
    }

    let mut merged_states: Vec<ItemSet> = vec![ItemSet::new(); next_canonical];
    for (i, state) in states.iter().enumerate() {
        let new_id = old_to_new[i];
        for (core, lookaheads) in state {
            merged_states[new_id].entry(*core).or_insert_with(LookaheadSet::new).union_with(lookaheads);
        }
    }

    let mut merged_transitions: Vec<FxHashMap<Symbol, usize>> = vec![FxHashMap::default(); next_canonical];
    for (i, trans) in transitions.iter().enumerate() {
        let new_id = old_to_new[i];
        for (&symbol, &target) in trans {
            merged_transitions[new_id].insert(symbol, old_to_new[target]);
        }
    }

    (merged_states, merged_transitions)
}

/// Map a production's trailing operator back to its terminal, for
/// precedence-based shift/reduce resolution. Productions with no
/// operator (e.g. `Identity`) never participate in a genuine conflict in
/// this grammar, since every precedence level is its own non-terminal.
fn production_operator(production: &Production) -> Option<TokenKind> {
    use crate::ast::{BinOp, UnOp};
    match production.builder {
        BuilderTag::BinaryOp(BinOp::Or) => Some(TokenKind::Or),
        BuilderTag::BinaryOp(BinOp::And) => Some(TokenKind::And),
        BuilderTag::BinaryOp(BinOp::Eq) => Some(TokenKind::Equal),
        BuilderTag::BinaryOp(BinOp::NotEq) => Some(TokenKind::NotEqual),
        BuilderTag::BinaryOp(BinOp::Lt) => Some(TokenKind::Less),
        BuilderTag::BinaryOp(BinOp::LtEq) => Some(TokenKind::LessEqual),
        BuilderTag::BinaryOp(BinOp::Gt) => Some(TokenKind::Greater),
        BuilderTag::BinaryOp(BinOp::GtEq) => Some(TokenKind::GreaterEqual),
        BuilderTag::BinaryOp(BinOp::Add) => Some(TokenKind::Plus),
        BuilderTag::BinaryOp(BinOp::Sub) => Some(TokenKind::Minus),
        BuilderTag::BinaryOp(BinOp::Mul) => Some(TokenKind::Multiply),
        BuilderTag::BinaryOp(BinOp::Div) => Some(TokenKind::Divide),
        BuilderTag::BinaryOp(BinOp::Mod) => Some(TokenKind::Modulo),
        BuilderTag::BinaryOp(BinOp::Pow) => Some(TokenKind::Power),
        BuilderTag::UnaryOp(UnOp::Not) => Some(TokenKind::Not),
        _ => None,
    }
}

/// Outcome of resolving a shift/reduce conflict: keep the shift, take the
/// reduce, or (only for a `NONE`-associativity tie) leave it unresolved.
enum ShiftReduceOutcome {
    Shift,
    Reduce(i32),
    Unresolved,
}

/// Decide whether a shift/reduce conflict resolves to the shift or to the
/// reduce, using the precedence/associativity table. A missing precedence
/// entry on either side defaults to shift, per the table builder's
/// conflict-resolution rule; only an equal-precedence `NONE`-associativity
/// tie is genuinely unresolved.
fn resolve_shift_reduce(terminal: TokenKind, production: &Production) -> ShiftReduceOutcome {
    let (Some(shift_prec), Some(reduce_prec)) =
        (precedence_of(terminal), production_operator(production).and_then(precedence_of))
    else {
        return ShiftReduceOutcome::Shift;
    };
    match shift_prec.level.cmp(&reduce_prec.level) {
        std::cmp::Ordering::Greater => ShiftReduceOutcome::Shift,
        std::cmp::Ordering::Less => ShiftReduceOutcome::Reduce(production.id),
        std::cmp::Ordering::Equal => match reduce_prec.associativity {
            Associativity::Left => ShiftReduceOutcome::Reduce(production.id),
            Associativity::Right => ShiftReduceOutcome::Shift,
            Associativity::None => ShiftReduceOutcome::Unresolved,
        },
    }
}

fn compact(
    grammar: &Grammar,
    states: Vec<ItemSet>,
    transitions: Vec<FxHashMap<Symbol, usize>>,
) -> Result<ParserTables, ParserTableError> {
    let num_states = states.len();
    let mut action: Vec<[Option<Action>; ALL_TERMINALS.len()]> = vec![[None; ALL_TERMINALS.len()]; num_states];
    let mut goto_table: Vec<[Option<usize>; NonTerminal::ALL.len()]> =
        vec![[None; NonTerminal::ALL.len()]; num_states];
    let mut conflicts = Vec::new();

    for (state_id, trans) in transitions.iter().enumerate() {
        for (&symbol, &target) in trans {
            match symbol {
                Symbol::Terminal(kind) => action[state_id][terminal_index(kind)] = Some(Action::Shift(target)),
                Symbol::NonTerminal(nt) => goto_table[state_id][nt.index()] = Some(target),
            }
        }
    }

    for (state_id, item_set) in states.iter().enumerate() {
        for (&core, lookaheads) in item_set {
            if !is_complete(grammar, core) {
                continue;
            }
            let (production_id, _) = core;
            let production = grammar.productions.iter().find(|p| p.id == production_id).unwrap();

            for lookahead in lookaheads.iter() {
                let idx = terminal_index(lookahead);
                let reduce_action = if production.is_augmented() && lookahead == TokenKind::Dollar {
                    Action::Accept
                } else {
                    Action::Reduce(production_id)
                };

                match action[state_id][idx] {
                    None => action[state_id][idx] = Some(reduce_action),
                    Some(Action::Accept) => {}
                    Some(Action::Shift(_)) if matches!(reduce_action, Action::Accept) => {
                        conflicts.push(ConflictNote {
                            state: state_id,
                            terminal: lookahead,
                            description: "accept/shift on end of input resolved in favor of accept".to_string(),
                        });
                        action[state_id][idx] = Some(Action::Accept);
                    }
                    Some(Action::Shift(_)) => match resolve_shift_reduce(lookahead, production) {
                        ShiftReduceOutcome::Reduce(id) => {
                            conflicts.push(ConflictNote {
                                state: state_id,
                                terminal: lookahead,
                                description: format!(
                                    "shift/reduce on {lookahead} resolved in favor of reduce over production {id}"
                                ),
                            });
                            action[state_id][idx] = Some(Action::Reduce(id));
                        }
                        ShiftReduceOutcome::Shift => {
                            conflicts.push(ConflictNote {
                                state: state_id,
                                terminal: lookahead,
                                description: format!(
                                    "shift/reduce on {lookahead} resolved in favor of shift over production {production_id}"
                                ),
                            });
                        }
                        ShiftReduceOutcome::Unresolved => {
                            return Err(ParserTableError::UnresolvedShiftReduce {
                                state: state_id,
                                terminal: lookahead.to_string(),
                            });
                        }
                    },
                    Some(Action::Reduce(existing_id)) if matches!(reduce_action, Action::Accept) => {
                        conflicts.push(ConflictNote {
                            state: state_id,
                            terminal: lookahead,
                            description: format!(
                                "accept/reduce on {lookahead} resolved in favor of accept over production {existing_id}"
                            ),
                        });
                        action[state_id][idx] = Some(Action::Accept);
                    }
                    Some(Action::Reduce(existing_id)) if existing_id != production_id => {
                        let existing_production = grammar.productions.iter().find(|p| p.id == existing_id).unwrap();
                        let winner = match existing_production.rhs.len().cmp(&production.rhs.len()) {
                            std::cmp::Ordering::Greater => existing_id,
                            std::cmp::Ordering::Less => production_id,
                            std::cmp::Ordering::Equal => existing_id.min(production_id),
                        };
                        if winner != existing_id {
                            action[state_id][idx] = Some(Action::Reduce(winner));
                        }
                        conflicts.push(ConflictNote {
                            state: state_id,
                            terminal: lookahead,
                            description: format!(
                                "reduce/reduce between production {existing_id} and {production_id} resolved in favor of {winner}"
                            ),
                        });
                    }
                    _ => {}
                }
            }
        }
    }

    Ok(ParserTables { num_states, action, goto_table, productions: grammar.productions.clone(), conflicts })
}
