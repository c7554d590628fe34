//! The fixed grammar for the formula expression language: productions,
//! operator precedence/associativity, and the per-production builder tags
//! the LR driver uses to assemble an [`crate::ast::Ast`].
//!
//! The grammar is a straight left-recursive encoding of the precedence
//! ladder `||` < `&&` < comparisons < `+ -` < `* / %` < unary < `^`, with
//! comparisons kept non-associative by construction (`COMP_EXPR` never
//! recurses into itself) rather than via a precedence-table tie-break.

use formula_lex::TokenKind;

use crate::ast::{BinOp, UnOp};
use crate::error::GrammarError;
use crate::symbol::{NonTerminal, Symbol};

/// Associativity used to resolve a shift/reduce conflict between two
/// operators at the same precedence level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Associativity {
    Left,
    Right,
    /// Operators at this level may not be chained; encountering a second
    /// one at the same level is a syntax error, never a silent parse.
    None,
}

/// Precedence level (higher binds tighter) and associativity for a single
/// operator token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Precedence {
    pub level: u8,
    pub associativity: Associativity,
}

/// The operator precedence table, ordered from loosest to tightest
/// binding. Unary operators bind tighter than every binary operator.
pub const PRECEDENCE_TABLE: &[(TokenKind, Precedence)] = &[
    (TokenKind::Or, Precedence { level: 1, associativity: Associativity::Left }),
    (TokenKind::And, Precedence { level: 2, associativity: Associativity::Left }),
    (TokenKind::Equal, Precedence { level: 3, associativity: Associativity::None }),
    (TokenKind::NotEqual, Precedence { level: 3, associativity: Associativity::None }),
    (TokenKind::Less, Precedence { level: 4, associativity: Associativity::None }),
    (TokenKind::LessEqual, Precedence { level: 4, associativity: Associativity::None }),
    (TokenKind::Greater, Precedence { level: 4, associativity: Associativity::None }),
    (TokenKind::GreaterEqual, Precedence { level: 4, associativity: Associativity::None }),
    (TokenKind::Plus, Precedence { level: 5, associativity: Associativity::Left }),
    (TokenKind::Minus, Precedence { level: 5, associativity: Associativity::Left }),
    (TokenKind::Multiply, Precedence { level: 6, associativity: Associativity::Left }),
    (TokenKind::Divide, Precedence { level: 6, associativity: Associativity::Left }),
    (TokenKind::Modulo, Precedence { level: 6, associativity: Associativity::Left }),
    (TokenKind::Not, Precedence { level: 8, associativity: Associativity::Right }),
    (TokenKind::Power, Precedence { level: 7, associativity: Associativity::Right }),
];

pub fn precedence_of(kind: TokenKind) -> Option<Precedence> {
    PRECEDENCE_TABLE.iter().find(|(k, _)| *k == kind).map(|(_, p)| *p)
}

/// What the LR driver does with the matched symbols when a production
/// reduces, expressed as a tag rather than a closure so tables stay
/// serializable and comparable in tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuilderTag {
    /// Pass the single child node through unchanged.
    Identity,
    BinaryOp(BinOp),
    UnaryOp(UnOp),
    /// `( EXPR )`: drop the parentheses, keep the inner node.
    Parenthesized,
    Number,
    /// `{name}`: a braced variable reference.
    Variable,
    /// A bare identifier used as a value, resolved the same way as a
    /// braced variable reference.
    Identifier,
    BooleanTrue,
    BooleanFalse,
    FunctionCall,
    FunctionCallEmpty,
    If,
    ArgsSingle,
    ArgsMultiple,
    /// The augmented start production; yields the underlying `EXPR` node.
    Start,
}

/// A single grammar production: `lhs -> rhs`, tagged with the builder the
/// driver invokes on reduction.
#[derive(Clone, Debug)]
pub struct Production {
    pub id: i32,
    pub lhs: NonTerminal,
    pub rhs: Vec<Symbol>,
    pub builder: BuilderTag,
}

impl Production {
    pub fn new(id: i32, lhs: NonTerminal, rhs: Vec<Symbol>, builder: BuilderTag) -> Self {
        Production { id, lhs, rhs, builder }
    }

    pub fn is_augmented(&self) -> bool {
        self.id < 0
    }
}

impl std::fmt::Display for Production {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        if self.rhs.is_empty() {
            write!(f, " \u{03b5}")?;
        }
        for sym in &self.rhs {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

const MAX_PRODUCTION_LENGTH: usize = 50;

fn t(kind: TokenKind) -> Symbol {
    Symbol::Terminal(kind)
}

fn n(nt: NonTerminal) -> Symbol {
    Symbol::NonTerminal(nt)
}

/// Every non-terminal must be reachable from `start` by following
/// right-hand sides transitively; one that isn't can never appear in a
/// derivation and signals a typo in the production list above.
fn check_reachability(productions: &[Production], start: NonTerminal) -> Result<(), GrammarError> {
    let mut reached = std::collections::BTreeSet::new();
    let mut frontier = vec![start];
    reached.insert(start);
    while let Some(nt) = frontier.pop() {
        for production in productions.iter().filter(|p| p.lhs == nt) {
            for symbol in &production.rhs {
                if let Symbol::NonTerminal(next) = symbol {
                    if reached.insert(*next) {
                        frontier.push(*next);
                    }
                }
            }
        }
    }
    for nt in NonTerminal::ALL {
        if !reached.contains(&nt) {
            return Err(GrammarError::UnreachableNonTerminal(nt));
        }
    }
    Ok(())
}

/// The grammar: the ordered production list plus helpers used by the
/// table builder (productions by LHS, terminal/non-terminal universes).
pub struct Grammar {
    pub productions: Vec<Production>,
    pub start: NonTerminal,
}

impl Grammar {
    /// Build the fixed formula grammar. Infallible in practice since the
    /// production list below is a compile-time constant shape, but returns
    /// a `Result` so a future data-driven grammar can reuse the same
    /// validation path.
    pub fn build() -> Result<Self, GrammarError> {
        use BuilderTag::*;
        use NonTerminal::*;

        let productions = vec![
            // Augmented start: accept fires when this production is
            // complete (EXPR shifted, then the Dollar sentinel shifted)
            // with lookahead Dollar.
            Production::new(-1, Start, vec![n(Expr), t(TokenKind::Dollar)], Start),
            // EXPR -> EXPR || AND_EXPR | AND_EXPR
            Production::new(0, Expr, vec![n(Expr), t(TokenKind::Or), n(AndExpr)], BinaryOp(BinOp::Or)),
            Production::new(1, Expr, vec![n(AndExpr)], Identity),
            // AND_EXPR -> AND_EXPR && COMP_EXPR | COMP_EXPR
            Production::new(2, AndExpr, vec![n(AndExpr), t(TokenKind::And), n(CompExpr)], BinaryOp(BinOp::And)),
            Production::new(3, AndExpr, vec![n(CompExpr)], Identity),
            // COMP_EXPR -> ARITH_EXPR (cmp-op ARITH_EXPR)? -- non-associative
            Production::new(4, CompExpr, vec![n(ArithExpr), t(TokenKind::Equal), n(ArithExpr)], BinaryOp(BinOp::Eq)),
            Production::new(5, CompExpr, vec![n(ArithExpr), t(TokenKind::NotEqual), n(ArithExpr)], BinaryOp(BinOp::NotEq)),
            Production::new(6, CompExpr, vec![n(ArithExpr), t(TokenKind::Less), n(ArithExpr)], BinaryOp(BinOp::Lt)),
            Production::new(7, CompExpr, vec![n(ArithExpr), t(TokenKind::LessEqual), n(ArithExpr)], BinaryOp(BinOp::LtEq)),
            Production::new(8, CompExpr, vec![n(ArithExpr), t(TokenKind::Greater), n(ArithExpr)], BinaryOp(BinOp::Gt)),
            Production::new(9, CompExpr, vec![n(ArithExpr), t(TokenKind::GreaterEqual), n(ArithExpr)], BinaryOp(BinOp::GtEq)),
            Production::new(10, CompExpr, vec![n(ArithExpr)], Identity),
            // ARITH_EXPR -> ARITH_EXPR (+|-) TERM | TERM
            Production::new(11, ArithExpr, vec![n(ArithExpr), t(TokenKind::Plus), n(Term)], BinaryOp(BinOp::Add)),
            Production::new(12, ArithExpr, vec![n(ArithExpr), t(TokenKind::Minus), n(Term)], BinaryOp(BinOp::Sub)),
            Production::new(13, ArithExpr, vec![n(Term)], Identity),
            // TERM -> TERM (*|/|%) FACTOR | FACTOR
            Production::new(14, Term, vec![n(Term), t(TokenKind::Multiply), n(Factor)], BinaryOp(BinOp::Mul)),
            Production::new(15, Term, vec![n(Term), t(TokenKind::Divide), n(Factor)], BinaryOp(BinOp::Div)),
            Production::new(16, Term, vec![n(Term), t(TokenKind::Modulo), n(Factor)], BinaryOp(BinOp::Mod)),
            Production::new(17, Term, vec![n(Factor)], Identity),
            // FACTOR -> PRIMARY ^ FACTOR | PRIMARY -- right-associative
            Production::new(18, Factor, vec![n(Primary), t(TokenKind::Power), n(Factor)], BinaryOp(BinOp::Pow)),
            Production::new(19, Factor, vec![n(Primary)], Identity),
            // PRIMARY -> ...
            Production::new(20, Primary, vec![t(TokenKind::LeftParen), n(Expr), t(TokenKind::RightParen)], Parenthesized),
            Production::new(21, Primary, vec![t(TokenKind::Plus), n(Primary)], UnaryOp(UnOp::Plus)),
            Production::new(22, Primary, vec![t(TokenKind::Minus), n(Primary)], UnaryOp(UnOp::Neg)),
            Production::new(23, Primary, vec![t(TokenKind::Not), n(Primary)], UnaryOp(UnOp::Not)),
            Production::new(24, Primary, vec![t(TokenKind::Number)], Number),
            Production::new(25, Primary, vec![t(TokenKind::Variable)], Variable),
            Production::new(26, Primary, vec![t(TokenKind::Identifier)], Identifier),
            Production::new(
                27,
                Primary,
                vec![t(TokenKind::Identifier), t(TokenKind::LeftParen), t(TokenKind::RightParen)],
                FunctionCallEmpty,
            ),
            Production::new(
                28,
                Primary,
                vec![t(TokenKind::Identifier), t(TokenKind::LeftParen), n(Args), t(TokenKind::RightParen)],
                FunctionCall,
            ),
            Production::new(29, Primary, vec![t(TokenKind::True)], BooleanTrue),
            Production::new(30, Primary, vec![t(TokenKind::False)], BooleanFalse),
            Production::new(
                31,
                Primary,
                vec![
                    t(TokenKind::If),
                    t(TokenKind::LeftParen),
                    n(Expr),
                    t(TokenKind::Comma),
                    n(Expr),
                    t(TokenKind::Comma),
                    n(Expr),
                    t(TokenKind::RightParen),
                ],
                If,
            ),
            // ARGS -> ARGS , EXPR | EXPR
            Production::new(32, Args, vec![n(Args), t(TokenKind::Comma), n(Expr)], ArgsMultiple),
            Production::new(33, Args, vec![n(Expr)], ArgsSingle),
        ];

        for production in &productions {
            if production.rhs.len() > MAX_PRODUCTION_LENGTH {
                return Err(GrammarError::ProductionTooLong {
                    len: production.rhs.len(),
                    limit: MAX_PRODUCTION_LENGTH,
                });
            }
        }

        check_reachability(&productions, Start)?;

        Ok(Grammar { productions, start: Start })
    }

    pub fn productions_for(&self, lhs: NonTerminal) -> impl Iterator<Item = &Production> {
        self.productions.iter().filter(move |p| p.lhs == lhs)
    }

    pub fn augmented_production(&self) -> &Production {
        self.productions.iter().find(|p| p.is_augmented()).expect("augmented production always present")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_without_error() {
        assert!(Grammar::build().is_ok());
    }

    #[test]
    fn every_non_terminal_has_at_least_one_production() {
        let grammar = Grammar::build().unwrap();
        for nt in NonTerminal::ALL {
            if nt == NonTerminal::Start {
                continue;
            }
            assert!(grammar.productions_for(nt).next().is_some(), "{nt} has no productions");
        }
    }

    #[test]
    fn comparison_operators_are_non_associative() {
        for (kind, prec) in PRECEDENCE_TABLE {
            let is_comparison = matches!(
                kind,
                TokenKind::Equal
                    | TokenKind::NotEqual
                    | TokenKind::Less
                    | TokenKind::LessEqual
                    | TokenKind::Greater
                    | TokenKind::GreaterEqual
            );
            if is_comparison {
                assert_eq!(prec.associativity, Associativity::None);
            }
        }
    }

    #[test]
    fn power_binds_tighter_than_unary_minus_application_order() {
        let power = precedence_of(TokenKind::Power).unwrap();
        let minus = precedence_of(TokenKind::Minus).unwrap();
        assert!(power.level > minus.level);
        assert_eq!(power.associativity, Associativity::Right);
    }

    #[test]
    fn augmented_production_is_present_and_first() {
        let grammar = Grammar::build().unwrap();
        assert_eq!(grammar.augmented_production().id, -1);
    }
}
