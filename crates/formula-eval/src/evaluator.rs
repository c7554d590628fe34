//! Walks a validated [`Ast`] against a binding environment, producing a
//! [`Value`].
//!
//! `&&` and `||` are deliberately **not** short-circuiting: both operands
//! are always evaluated, so a formula like `false && 1/0 == 0` still
//! raises `DivisionByZero`. `IF` *is* a short-circuiting ternary -- only
//! the taken branch is evaluated -- since it is the language's control
//! construct, not a boolean combinator.

use indexmap::IndexMap;

use formula_parse::{Ast, BinOp, UnOp};

use crate::builtins;
use crate::error::EvalError;
use crate::value::{numbers_equal, Value};

/// The binding environment: variable name -> value, insertion-ordered so
/// diagnostics and serialized output are stable.
pub type Bindings = IndexMap<String, Value>;

pub fn evaluate(ast: &Ast, bindings: &Bindings) -> Result<Value, EvalError> {
    match ast {
        Ast::Number(n) => Ok(Value::Number(*n)),
        Ast::Boolean(b) => Ok(Value::Boolean(*b)),
        Ast::Variable(name) => bindings
            .get(name)
            .cloned()
            .ok_or_else(|| EvalError::UndefinedVariable { name: name.clone() }),
        Ast::UnaryOp(op, operand) => eval_unary(*op, evaluate(operand, bindings)?),
        Ast::BinaryOp(left, op, right) => {
            let left = evaluate(left, bindings)?;
            let right = evaluate(right, bindings)?;
            eval_binary(*op, left, right)
        }
        Ast::FunctionCall(name, args) => {
            let values: Vec<Value> =
                args.iter().map(|arg| evaluate(arg, bindings)).collect::<Result<_, _>>()?;
            builtins::call(name, &values)
        }
        Ast::If(condition, then_branch, else_branch) => {
            if evaluate(condition, bindings)?.to_bool()? {
                evaluate(then_branch, bindings)
            } else {
                evaluate(else_branch, bindings)
            }
        }
        Ast::Arguments(_) => unreachable!("Arguments nodes never survive AST validation"),
    }
}

fn eval_unary(op: UnOp, value: Value) -> Result<Value, EvalError> {
    match op {
        UnOp::Plus => Ok(Value::Number(value.to_number()?)),
        UnOp::Neg => Ok(Value::Number(-value.to_number()?)),
        UnOp::Not => Ok(Value::Boolean(!value.to_bool()?)),
    }
}

fn eval_binary(op: BinOp, left: Value, right: Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => match (&left, &right) {
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{a}{b}"))),
            _ => Ok(Value::Number(left.to_number()? + right.to_number()?)),
        },
        BinOp::Sub => Ok(Value::Number(left.to_number()? - right.to_number()?)),
        BinOp::Mul => Ok(Value::Number(left.to_number()? * right.to_number()?)),
        BinOp::Div => {
            let divisor = right.to_number()?;
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Number(left.to_number()? / divisor))
        }
        BinOp::Mod => {
            let divisor = right.to_number()?;
            if divisor == 0.0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Number(left.to_number()? % divisor))
        }
        BinOp::Pow => Ok(Value::Number(left.to_number()?.powf(right.to_number()?))),
        BinOp::Eq => Ok(Value::Boolean(values_equal(&left, &right)?)),
        BinOp::NotEq => Ok(Value::Boolean(!values_equal(&left, &right)?)),
        BinOp::Lt => Ok(Value::Boolean(left.to_number()? < right.to_number()?)),
        BinOp::LtEq => Ok(Value::Boolean(left.to_number()? <= right.to_number()?)),
        BinOp::Gt => Ok(Value::Boolean(left.to_number()? > right.to_number()?)),
        BinOp::GtEq => Ok(Value::Boolean(left.to_number()? >= right.to_number()?)),
        BinOp::And => Ok(Value::Boolean(left.to_bool()? & right.to_bool()?)),
        BinOp::Or => Ok(Value::Boolean(left.to_bool()? | right.to_bool()?)),
    }
}

/// `==`/`!=` compare same-typed booleans and strings directly; any other
/// combination (including mixed types) coerces both sides to a number and
/// compares within [`crate::value::EPSILON`].
fn values_equal(left: &Value, right: &Value) -> Result<bool, EvalError> {
    match (left, right) {
        (Value::Boolean(a), Value::Boolean(b)) => Ok(a == b),
        (Value::String(a), Value::String(b)) => Ok(a == b),
        _ => Ok(numbers_equal(left.to_number()?, right.to_number()?)),
    }
}
