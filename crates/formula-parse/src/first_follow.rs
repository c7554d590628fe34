//! Nullable / FIRST / FOLLOW fixed-point computation over a [`Grammar`].
//!
//! None of the non-terminals in this grammar are nullable (every
//! production has at least one symbol on its right-hand side), but the
//! computation is written generically rather than special-cased, since the
//! LR(1) closure needs a working FIRST-of-a-symbol-sequence regardless.

use rustc_hash::{FxHashMap, FxHashSet};

use formula_lex::TokenKind;

use crate::grammar::Grammar;
use crate::symbol::{NonTerminal, Symbol};

/// FIRST and FOLLOW sets for every non-terminal in a grammar, plus
/// nullability. Terminals are their own (singleton) FIRST set by
/// definition and are not stored here.
pub struct FirstFollow {
    nullable: FxHashSet<NonTerminal>,
    first: FxHashMap<NonTerminal, FxHashSet<TokenKind>>,
    follow: FxHashMap<NonTerminal, FxHashSet<TokenKind>>,
}

impl FirstFollow {
    pub fn compute(grammar: &Grammar) -> Self {
        let nullable = compute_nullable(grammar);
        let first = compute_first(grammar, &nullable);
        let follow = compute_follow(grammar, &nullable, &first);
        FirstFollow { nullable, first, follow }
    }

    pub fn is_nullable(&self, nt: NonTerminal) -> bool {
        self.nullable.contains(&nt)
    }

    pub fn first_of(&self, nt: NonTerminal) -> &FxHashSet<TokenKind> {
        &self.first[&nt]
    }

    pub fn follow_of(&self, nt: NonTerminal) -> &FxHashSet<TokenKind> {
        &self.follow[&nt]
    }

    /// FIRST of a symbol sequence, accounting for nullability: if every
    /// leading symbol is nullable the whole sequence is nullable, and
    /// `fallback` (normally the surrounding lookahead set) is folded in.
    pub fn first_of_sequence(&self, symbols: &[Symbol], fallback: &FxHashSet<TokenKind>) -> FxHashSet<TokenKind> {
        let mut result = FxHashSet::default();
        for symbol in symbols {
            match symbol {
                Symbol::Terminal(kind) => {
                    result.insert(*kind);
                    return result;
                }
                Symbol::NonTerminal(nt) => {
                    result.extend(self.first_of(*nt));
                    if !self.is_nullable(*nt) {
                        return result;
                    }
                }
            }
        }
        result.extend(fallback);
        result
    }
}

fn compute_nullable(grammar: &Grammar) -> FxHashSet<NonTerminal> {
    let mut nullable = FxHashSet::default();
    let mut changed = true;
    while changed {
        changed = false;
        for production in &grammar.productions {
            if nullable.contains(&production.lhs) {
                continue;
            }
            let is_nullable = production.rhs.iter().all(|s| match s {
                Symbol::Terminal(_) => false,
                Symbol::NonTerminal(nt) => nullable.contains(nt),
            });
            if is_nullable && nullable.insert(production.lhs) {
                changed = true;
            }
        }
    }
    nullable
}

fn compute_first(
    grammar: &Grammar,
    nullable: &FxHashSet<NonTerminal>,
) -> FxHashMap<NonTerminal, FxHashSet<TokenKind>> {
    let mut first: FxHashMap<NonTerminal, FxHashSet<TokenKind>> =
        NonTerminal::ALL.iter().map(|nt| (*nt, FxHashSet::default())).collect();

    let mut changed = true;
    while changed {
        changed = false;
        for production in &grammar.productions {
            let mut all_nullable_so_far = true;
            for symbol in &production.rhs {
                if !all_nullable_so_far {
                    break;
                }
                match symbol {
                    Symbol::Terminal(kind) => {
                        if first.get_mut(&production.lhs).unwrap().insert(*kind) {
                            changed = true;
                        }
                        all_nullable_so_far = false;
                    }
                    Symbol::NonTerminal(nt) => {
                        let addition: Vec<TokenKind> = first[nt].iter().copied().collect();
                        let entry = first.get_mut(&production.lhs).unwrap();
                        for kind in addition {
                            if entry.insert(kind) {
                                changed = true;
                            }
                        }
                        all_nullable_so_far = nullable.contains(nt);
                    }
                }
            }
        }
    }
    first
}

fn compute_follow(
    grammar: &Grammar,
    nullable: &FxHashSet<NonTerminal>,
    first: &FxHashMap<NonTerminal, FxHashSet<TokenKind>>,
) -> FxHashMap<NonTerminal, FxHashSet<TokenKind>> {
    let mut follow: FxHashMap<NonTerminal, FxHashSet<TokenKind>> =
        NonTerminal::ALL.iter().map(|nt| (*nt, FxHashSet::default())).collect();
    follow.get_mut(&grammar.start).unwrap().insert(TokenKind::Dollar);

    let mut changed = true;
    while changed {
        changed = false;
        for production in &grammar.productions {
            for (i, symbol) in production.rhs.iter().enumerate() {
                let Symbol::NonTerminal(nt) = symbol else { continue };
                let rest = &production.rhs[i + 1..];

                let mut first_of_rest = FxHashSet::default();
                let mut rest_nullable = true;
                for s in rest {
                    match s {
                        Symbol::Terminal(kind) => {
                            first_of_rest.insert(*kind);
                            rest_nullable = false;
                            break;
                        }
                        Symbol::NonTerminal(rnt) => {
                            first_of_rest.extend(&first[rnt]);
                            if !nullable.contains(rnt) {
                                rest_nullable = false;
                                break;
                            }
                        }
                    }
                }

                let entry = follow.get_mut(nt).unwrap();
                for kind in &first_of_rest {
                    if entry.insert(*kind) {
                        changed = true;
                    }
                }
                if rest_nullable {
                    let lhs_follow: Vec<TokenKind> = follow[&production.lhs].iter().copied().collect();
                    let entry = follow.get_mut(nt).unwrap();
                    for kind in lhs_follow {
                        if entry.insert(kind) {
                            changed = true;
                        }
                    }
                }
            }
        }
    }
    follow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_non_terminal_is_nullable() {
        let grammar = Grammar::build().unwrap();
        let ff = FirstFollow::compute(&grammar);
        for nt in NonTerminal::ALL {
            assert!(!ff.is_nullable(nt), "{nt} should not be nullable");
        }
    }

    #[test]
    fn first_of_primary_includes_leaf_tokens() {
        let grammar = Grammar::build().unwrap();
        let ff = FirstFollow::compute(&grammar);
        let first = ff.first_of(NonTerminal::Primary);
        for kind in [
            TokenKind::Number,
            TokenKind::Variable,
            TokenKind::Identifier,
            TokenKind::True,
            TokenKind::False,
            TokenKind::LeftParen,
            TokenKind::Minus,
            TokenKind::Not,
            TokenKind::If,
        ] {
            assert!(first.contains(&kind), "FIRST(PRIMARY) missing {kind}");
        }
    }

    #[test]
    fn follow_of_expr_includes_dollar_comma_and_right_paren() {
        let grammar = Grammar::build().unwrap();
        let ff = FirstFollow::compute(&grammar);
        let follow = ff.follow_of(NonTerminal::Expr);
        assert!(follow.contains(&TokenKind::Dollar));
        assert!(follow.contains(&TokenKind::RightParen));
        assert!(follow.contains(&TokenKind::Comma));
    }

    #[test]
    fn first_of_sequence_stops_at_first_non_nullable_symbol() {
        let grammar = Grammar::build().unwrap();
        let ff = FirstFollow::compute(&grammar);
        let fallback: FxHashSet<TokenKind> = [TokenKind::Dollar].into_iter().collect();
        let seq = [Symbol::NonTerminal(NonTerminal::Primary), Symbol::Terminal(TokenKind::Power)];
        let result = ff.first_of_sequence(&seq, &fallback);
        assert!(!result.contains(&TokenKind::Power));
        assert!(result.contains(&TokenKind::Number));
    }
}
