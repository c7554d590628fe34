//! Diagnostic plumbing shared by every phase of the engine.
//!
//! Each phase (lexer, parser, table builder, evaluator) raises its own
//! `thiserror` error enum, but all of them can be lowered into a
//! [`Diagnostic`] for reporting: a severity [`Level`], a human message, a
//! stable [`ErrorCode`], and an optional source [`Position`].

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::Position;

/// Severity of a [`Diagnostic`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Level {
    /// Fails the call; surfaced to the caller as an error.
    Error,
    /// Does not fail the call unless `strictMode` promotes it.
    Warning,
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// A stable, documentable error code such as `E_LEXER_UNCLOSED_VARIABLE`.
///
/// # Examples
///
/// ```
/// use formula_util::ErrorCode;
///
/// let code = ErrorCode::new(1001, "unclosed_variable");
/// assert_eq!(format!("{code}"), "E1001 (unclosed_variable)");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ErrorCode {
    /// Numeric code, grouped by phase (1xxx lexer, 2xxx parser, 3xxx table
    /// builder, 4xxx evaluator, 5xxx multi-step, 9xxx limits).
    pub number: u32,
    /// Short machine-friendly name.
    pub name: &'static str,
}

impl ErrorCode {
    /// Build a new error code.
    pub const fn new(number: u32, name: &'static str) -> Self {
        Self { number, name }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E{} ({})", self.number, self.name)
    }
}

/// Error codes used across the engine; grouped by phase as documented on
/// [`ErrorCode`].
pub mod codes {
    use super::ErrorCode;

    pub const E_UNEXPECTED_CHARACTER: ErrorCode = ErrorCode::new(1001, "unexpected_character");
    pub const E_UNCLOSED_VARIABLE: ErrorCode = ErrorCode::new(1002, "unclosed_variable");
    pub const E_TOKEN_TOO_LONG: ErrorCode = ErrorCode::new(1003, "token_too_long");

    pub const E_SYNTAX_ERROR: ErrorCode = ErrorCode::new(2001, "syntax_error");
    pub const E_UNEXPECTED_EOF: ErrorCode = ErrorCode::new(2002, "unexpected_end_of_input");

    pub const E_GRAMMAR_CONFLICT: ErrorCode = ErrorCode::new(3001, "grammar_conflict");
    pub const E_PARSER_TABLE: ErrorCode = ErrorCode::new(3002, "parser_table_error");
    pub const E_AST_BUILDER: ErrorCode = ErrorCode::new(3003, "ast_builder_error");

    pub const E_UNDEFINED_VARIABLE: ErrorCode = ErrorCode::new(4001, "undefined_variable");
    pub const E_DIVISION_BY_ZERO: ErrorCode = ErrorCode::new(4002, "division_by_zero");
    pub const E_COERCION: ErrorCode = ErrorCode::new(4003, "coercion_error");
    pub const E_FUNCTION: ErrorCode = ErrorCode::new(4004, "function_error");

    pub const E_STEP: ErrorCode = ErrorCode::new(5001, "step_error");

    pub const E_LIMIT_EXCEEDED: ErrorCode = ErrorCode::new(9001, "limit_exceeded");
    pub const W_COERCION: ErrorCode = ErrorCode::new(9002, "lenient_coercion");
}

/// A structured diagnostic: severity, message, code, and an optional
/// source position.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Diagnostic {
    pub level: Level,
    pub message: String,
    pub code: ErrorCode,
    pub position: Option<Position>,
}

impl Diagnostic {
    pub fn error(message: impl Into<String>, code: ErrorCode, position: Option<Position>) -> Self {
        Self { level: Level::Error, message: message.into(), code, position }
    }

    pub fn warning(message: impl Into<String>, code: ErrorCode, position: Option<Position>) -> Self {
        Self { level: Level::Warning, message: message.into(), code, position }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "{} [{}] at {}: {}", self.level, self.code, pos, self.message),
            None => write!(f, "{} [{}]: {}", self.level, self.code, self.message),
        }
    }
}
