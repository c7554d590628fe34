//! Resource limits shared by the lexer, parser, and evaluator.
//!
//! These mirror the closed option set from the specification (`strictMode`
//! lives at the evaluator/engine level and is not part of this struct since
//! it changes semantics rather than bounding resource use).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Bounds enforced while lexing, parsing, and walking the AST.
///
/// Exceeding any of these raises `LimitExceeded` rather than recursing
/// without bound or allocating unboundedly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Limits {
    pub max_formula_length: usize,
    pub max_steps: usize,
    pub max_variables: usize,
    pub max_token_length: usize,
    pub max_ast_nodes: usize,
    pub max_ast_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_formula_length: 10_000,
            max_steps: 50,
            max_variables: 1_000,
            max_token_length: 1_000,
            max_ast_nodes: 1_000,
            max_ast_depth: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_specification() {
        let limits = Limits::default();
        assert_eq!(limits.max_formula_length, 10_000);
        assert_eq!(limits.max_steps, 50);
        assert_eq!(limits.max_variables, 1_000);
        assert_eq!(limits.max_token_length, 1_000);
        assert_eq!(limits.max_ast_nodes, 1_000);
        assert_eq!(limits.max_ast_depth, 50);
    }
}
