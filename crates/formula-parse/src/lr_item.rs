//! LR(1) items, item sets, closure, and goto.
//!
//! Item sets are represented as a `BTreeMap` keyed by *core*
//! (`production_id`, `dot`), each core mapping to the set of lookaheads
//! seen for it. Two item sets with the same cores but different
//! lookaheads are exactly the states an LALR(1) build merges; keeping the
//! map sorted by core also makes the whole automaton construction
//! deterministic, which the table builder's tests rely on.

use std::collections::BTreeMap;

use formula_lex::TokenKind;
use rustc_hash::FxHashSet;

use crate::first_follow::FirstFollow;
use crate::grammar::Grammar;
use crate::symbol::{terminal_index, Symbol, ALL_TERMINALS};

/// A fixed-size lookahead set, one bit per terminal in [`ALL_TERMINALS`].
/// Backed by an array rather than a hash set so item cores are directly
/// `Ord`, which keeps state enumeration deterministic.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct LookaheadSet([bool; ALL_TERMINALS.len()]);

impl LookaheadSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(kind: TokenKind) -> Self {
        let mut set = Self::new();
        set.insert(kind);
        set
    }

    /// Returns `true` if this set changed (the terminal was newly added).
    pub fn insert(&mut self, kind: TokenKind) -> bool {
        let idx = terminal_index(kind);
        let changed = !self.0[idx];
        self.0[idx] = true;
        changed
    }

    pub fn contains(&self, kind: TokenKind) -> bool {
        self.0[terminal_index(kind)]
    }

    /// Union `other` into `self`, returning `true` if anything new was added.
    pub fn union_with(&mut self, other: &LookaheadSet) -> bool {
        let mut changed = false;
        for (i, &present) in other.0.iter().enumerate() {
            if present && !self.0[i] {
                self.0[i] = true;
                changed = true;
            }
        }
        changed
    }

    pub fn iter(&self) -> impl Iterator<Item = TokenKind> + '_ {
        ALL_TERMINALS.iter().copied().filter(move |k| self.contains(*k))
    }

    pub fn from_set(set: &FxHashSet<TokenKind>) -> Self {
        let mut la = Self::new();
        for kind in set {
            la.insert(*kind);
        }
        la
    }
}

/// `(production_id, dot position)`: the part of an item that an LALR
/// build treats as identifying the same underlying state.
pub type ItemCore = (i32, usize);

/// A set of LR(1) items sharing (by construction) a single parser state,
/// keyed by core with merged lookaheads.
pub type ItemSet = BTreeMap<ItemCore, LookaheadSet>;

/// The symbol immediately after the dot in a core, if any.
pub fn symbol_after_dot(grammar: &Grammar, core: ItemCore) -> Option<Symbol> {
    let (production_id, dot) = core;
    let production = grammar.productions.iter().find(|p| p.id == production_id)?;
    production.rhs.get(dot).copied()
}

pub fn is_complete(grammar: &Grammar, core: ItemCore) -> bool {
    symbol_after_dot(grammar, core).is_none()
}

/// Close an item set under the grammar: for every item with the dot
/// before a non-terminal `B`, add `B -> . gamma` for every production of
/// `B`, with lookaheads `FIRST(beta a)` for every lookahead `a` already on
/// the item, where `beta` is the text following `B` in the original item.
pub fn closure(grammar: &Grammar, first_follow: &FirstFollow, mut items: ItemSet) -> ItemSet {
    let mut changed = true;
    while changed {
        changed = false;
        let snapshot: Vec<(ItemCore, LookaheadSet)> = items.iter().map(|(c, l)| (*c, *l)).collect();

        for (core, lookaheads) in snapshot {
            let (production_id, dot) = core;
            let production = grammar.productions.iter().find(|p| p.id == production_id).unwrap();
            let Some(Symbol::NonTerminal(b)) = production.rhs.get(dot).copied() else { continue };
            let beta = &production.rhs[dot + 1..];

            for lookahead in lookaheads.iter() {
                let fallback: FxHashSet<TokenKind> = [lookahead].into_iter().collect();
                let first_set = first_follow.first_of_sequence(beta, &fallback);

                for b_production in grammar.productions_for(b) {
                    let new_core = (b_production.id, 0);
                    let entry = items.entry(new_core).or_insert_with(LookaheadSet::new);
                    for kind in &first_set {
                        if entry.insert(*kind) {
                            changed = true;
                        }
                    }
                }
            }
        }
    }
    items
}

/// GOTO(items, symbol): shift every item whose post-dot symbol is
/// `symbol`, then close the result. Empty if no item in `items` has
/// `symbol` after its dot.
pub fn goto(grammar: &Grammar, first_follow: &FirstFollow, items: &ItemSet, symbol: Symbol) -> ItemSet {
    let mut kernel = ItemSet::new();
    for (&(production_id, dot), lookaheads) in items {
        if symbol_after_dot(grammar, (production_id, dot)) == Some(symbol) {
            let entry = kernel.entry((production_id, dot + 1)).or_insert_with(LookaheadSet::new);
            entry.union_with(lookaheads);
        }
    }
    if kernel.is_empty() {
        return kernel;
    }
    closure(grammar, first_follow, kernel)
}

/// The core signature of an item set: just the cores, ignoring
/// lookaheads. Two states with the same core signature are exactly the
/// states an LALR(1) build merges.
pub fn core_signature(items: &ItemSet) -> Vec<ItemCore> {
    items.keys().copied().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn initial_set(grammar: &Grammar, first_follow: &FirstFollow) -> ItemSet {
        let augmented = grammar.augmented_production();
        let mut kernel = ItemSet::new();
        kernel.insert((augmented.id, 0), LookaheadSet::single(TokenKind::Dollar));
        closure(grammar, first_follow, kernel)
    }

    #[test]
    fn closure_of_initial_state_contains_every_primary_production() {
        let grammar = Grammar::build().unwrap();
        let ff = FirstFollow::compute(&grammar);
        let items = initial_set(&grammar, &ff);

        for production in grammar.productions_for(crate::symbol::NonTerminal::Primary) {
            assert!(items.contains_key(&(production.id, 0)), "missing PRIMARY production {}", production.id);
        }
    }

    #[test]
    fn goto_on_number_reaches_a_complete_primary_item() {
        let grammar = Grammar::build().unwrap();
        let ff = FirstFollow::compute(&grammar);
        let items = initial_set(&grammar, &ff);

        let next = goto(&grammar, &ff, &items, Symbol::Terminal(TokenKind::Number));
        assert!(!next.is_empty());
        assert!(next.keys().any(|&core| is_complete(&grammar, core)));
    }

    #[test]
    fn goto_on_absent_symbol_is_empty() {
        let grammar = Grammar::build().unwrap();
        let ff = FirstFollow::compute(&grammar);
        let items = initial_set(&grammar, &ff);
        let next = goto(&grammar, &ff, &items, Symbol::Terminal(TokenKind::Comma));
        assert!(next.is_empty());
    }

    #[test]
    fn lookahead_set_tracks_membership() {
        let mut set = LookaheadSet::new();
        assert!(!set.contains(TokenKind::Plus));
        assert!(set.insert(TokenKind::Plus));
        assert!(!set.insert(TokenKind::Plus));
        assert!(set.contains(TokenKind::Plus));
    }
}
