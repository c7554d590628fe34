//! `EngineError`: the single error type the public API returns, lowering
//! every phase's own error enum into a `{kind, message, position,
//! error_code}` shape with a stable process exit code.

use formula_lex::LexError;
use formula_parse::{AstError, ParseError, SyntaxError};
use formula_eval::EvalError;
use formula_util::codes;
use formula_util::{ErrorCode, Position};

/// Which phase raised an [`EngineError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineErrorKind {
    Lex,
    Syntax,
    Ast,
    Eval,
    Step,
}

/// The unified error the engine's public entry points return.
#[derive(Clone, Debug, PartialEq)]
pub struct EngineError {
    pub kind: EngineErrorKind,
    pub message: String,
    pub position: Option<Position>,
    pub code: ErrorCode,
}

impl EngineError {
    /// The process exit code convention: 0 success, 1 syntax error, 2
    /// evaluation error, 3 configuration/limit violation, 4 internal
    /// (grammar/table) error. Limit violations are recognized by error
    /// code rather than by phase, since any phase can raise one.
    pub fn exit_code(&self) -> i32 {
        if self.code == codes::E_LIMIT_EXCEEDED {
            return 3;
        }
        match self.kind {
            EngineErrorKind::Lex | EngineErrorKind::Syntax | EngineErrorKind::Ast => 1,
            EngineErrorKind::Eval => 2,
            EngineErrorKind::Step => 3,
        }
    }
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.position {
            Some(pos) => write!(f, "[{}] at {}: {}", self.code, pos, self.message),
            None => write!(f, "[{}]: {}", self.code, self.message),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<LexError> for EngineError {
    fn from(err: LexError) -> Self {
        let code = match &err {
            LexError::UnexpectedCharacter { .. } => codes::E_UNEXPECTED_CHARACTER,
            LexError::UnclosedVariable { .. } => codes::E_UNCLOSED_VARIABLE,
            LexError::TokenTooLong { .. } => codes::E_TOKEN_TOO_LONG,
            LexError::FormulaTooLong { .. } => codes::E_LIMIT_EXCEEDED,
        };
        EngineError { kind: EngineErrorKind::Lex, message: err.to_string(), position: err.position(), code }
    }
}

impl From<ParseError> for EngineError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::Syntax(syntax) => {
                let position = match &syntax {
                    SyntaxError::UnexpectedToken { position, .. } => Some(*position),
                    _ => None,
                };
                EngineError {
                    kind: EngineErrorKind::Syntax,
                    message: syntax.to_string(),
                    position,
                    code: codes::E_SYNTAX_ERROR,
                }
            }
            ParseError::Ast(ast) => {
                let code = match &ast {
                    AstError::InvalidVariableName { .. }
                    | AstError::ReservedVariableName { .. }
                    | AstError::NonFiniteNumber { .. } => codes::E_AST_BUILDER,
                    AstError::DepthExceeded { .. } | AstError::NodeCountExceeded { .. } => codes::E_LIMIT_EXCEEDED,
                };
                EngineError { kind: EngineErrorKind::Ast, message: ast.to_string(), position: None, code }
            }
        }
    }
}

impl From<EvalError> for EngineError {
    fn from(err: EvalError) -> Self {
        let code = match &err {
            EvalError::UndefinedVariable { .. } => codes::E_UNDEFINED_VARIABLE,
            EvalError::DivisionByZero => codes::E_DIVISION_BY_ZERO,
            EvalError::CoercionError { .. } => codes::E_COERCION,
            EvalError::UnknownFunction { .. } | EvalError::ArityError { .. } | EvalError::FunctionError { .. } => {
                codes::E_FUNCTION
            }
        };
        EngineError { kind: EngineErrorKind::Eval, message: err.to_string(), position: None, code }
    }
}
