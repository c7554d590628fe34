//! Errors raised while building parser tables, running the LR driver, and
//! validating the resulting AST.

use formula_lex::Token;
use formula_util::Position;
use thiserror::Error;

use crate::symbol::{NonTerminal, Symbol};

/// Raised while validating an already-reduced AST.
#[derive(Debug, Error, PartialEq)]
pub enum AstError {
    #[error("'{name}' is not a valid variable name")]
    InvalidVariableName { name: String },

    #[error("'{name}' is a reserved word and cannot be used as a variable name")]
    ReservedVariableName { name: String },

    #[error("expression tree depth {depth} exceeds the limit of {limit}")]
    DepthExceeded { depth: usize, limit: usize },

    #[error("expression tree has {count} nodes, exceeding the limit of {limit}")]
    NodeCountExceeded { count: usize, limit: usize },

    #[error("numeric literal '{text}' is not finite")]
    NonFiniteNumber { text: String },
}

/// Raised while constructing the grammar or its derived tables.
#[derive(Debug, Error)]
pub enum GrammarError {
    #[error("production right-hand side has {len} symbols, exceeding the limit of {limit}")]
    ProductionTooLong { len: usize, limit: usize },

    #[error("non-terminal {0} is never reachable from the start symbol")]
    UnreachableNonTerminal(NonTerminal),
}

/// Raised while enumerating LR(1)/LALR(1) states.
#[derive(Debug, Error)]
pub enum ParserTableError {
    #[error("state count {count} exceeds the limit of {limit}")]
    TooManyStates { count: usize, limit: usize },

    #[error("state has {count} items, exceeding the limit of {limit}")]
    TooManyItems { count: usize, limit: usize },

    #[error("state has {count} outgoing transitions, exceeding the limit of {limit}")]
    TooManyTransitions { count: usize, limit: usize },

    #[error(
        "shift/reduce conflict in state {state} on {terminal}: could not resolve via \
         precedence/associativity"
    )]
    UnresolvedShiftReduce { state: usize, terminal: String },

    #[error("reduce/reduce conflict in state {state} between production {a} and {b}")]
    ReduceReduceConflict { state: usize, a: i32, b: i32 },
}

/// Raised by the LR driver while consuming a token stream.
#[derive(Debug, Error)]
pub enum SyntaxError {
    #[error("unexpected token {found} at {position}, expected one of: {expected}")]
    UnexpectedToken { found: String, expected: String, position: Position },

    #[error("unexpected end of input, expected one of: {expected}")]
    UnexpectedEof { expected: String },
}

impl SyntaxError {
    pub fn unexpected(token: &Token, expected: Vec<Symbol>) -> Self {
        let expected = expected
            .iter()
            .map(Symbol::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        SyntaxError::UnexpectedToken {
            found: token.kind.to_string(),
            expected,
            position: token.position,
        }
    }
}
