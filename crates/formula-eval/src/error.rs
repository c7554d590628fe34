//! Errors raised while evaluating an AST against a binding environment.

use thiserror::Error;

use crate::value::Value;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("undefined variable '{name}'")]
    UndefinedVariable { name: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("cannot coerce {} value '{value}' to {target}", value.type_name())]
    CoercionError { value: Value, target: &'static str },

    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },

    #[error("function '{name}' expects {expected}, got {actual} argument(s)")]
    ArityError { name: String, expected: String, actual: usize },

    #[error("function '{name}' received an invalid argument: {reason}")]
    FunctionError { name: String, reason: String },
}
