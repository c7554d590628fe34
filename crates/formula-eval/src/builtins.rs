//! Built-in functions callable from a formula: `ABS`, `SQRT`, `ROUND`,
//! `MIN`, `MAX`, `SUM`, `AVG`/`AVERAGE`. Names are matched
//! case-insensitively, matching the lexer's keyword folding.

use crate::error::EvalError;
use crate::value::Value;

/// Round `x` to `decimals` places, ties away from zero (`2.5 -> 3`,
/// `-2.5 -> -3`). `f64::round` already rounds half away from zero at zero
/// decimals; this just extends that tie-break to arbitrary precision by
/// scaling, rounding, and unscaling.
fn round_half_away_from_zero(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (x * factor).round() / factor
}

/// Dispatch a call to a built-in function. `name` should already be the
/// raw identifier text from the AST; matching is case-insensitive.
pub fn call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name.to_ascii_uppercase().as_str() {
        "ABS" => unary_numeric(name, args, f64::abs),
        // Negative input yields NaN (IEEE semantics), not an error.
        "SQRT" => unary_numeric(name, args, f64::sqrt),
        "ROUND" => round(args),
        "MIN" => variadic_numeric(name, args, f64::min, f64::INFINITY),
        "MAX" => variadic_numeric(name, args, f64::max, f64::NEG_INFINITY),
        "SUM" => variadic_numeric(name, args, |a, b| a + b, 0.0),
        "AVG" | "AVERAGE" => average(name, args),
        other => Err(EvalError::UnknownFunction { name: other.to_string() }),
    }
}

fn unary_numeric(name: &str, args: &[Value], f: impl Fn(f64) -> f64) -> Result<Value, EvalError> {
    expect_arity(name, args, 1..=1)?;
    Ok(Value::Number(f(args[0].to_number()?)))
}

fn round(args: &[Value]) -> Result<Value, EvalError> {
    expect_arity("ROUND", args, 1..=2)?;
    let n = args[0].to_number()?;
    let decimals = if args.len() == 2 { args[1].to_number()? as i32 } else { 0 };
    Ok(Value::Number(round_half_away_from_zero(n, decimals)))
}

fn variadic_numeric(name: &str, args: &[Value], combine: impl Fn(f64, f64) -> f64, identity: f64) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::ArityError { name: name.to_string(), expected: "at least 1".to_string(), actual: 0 });
    }
    let mut acc = identity;
    for arg in args {
        acc = combine(acc, arg.to_number()?);
    }
    Ok(Value::Number(acc))
}

fn average(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    if args.is_empty() {
        return Err(EvalError::ArityError { name: name.to_string(), expected: "at least 1".to_string(), actual: 0 });
    }
    let mut sum = 0.0;
    for arg in args {
        sum += arg.to_number()?;
    }
    Ok(Value::Number(sum / args.len() as f64))
}

fn expect_arity(name: &str, args: &[Value], range: std::ops::RangeInclusive<usize>) -> Result<(), EvalError> {
    if range.contains(&args.len()) {
        return Ok(());
    }
    let expected = if range.start() == range.end() {
        format!("{}", range.start())
    } else {
        format!("{}-{}", range.start(), range.end())
    };
    Err(EvalError::ArityError { name: name.to_string(), expected, actual: args.len() })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn abs_of_negative() {
        assert_eq!(call("ABS", &[num(-5.0)]).unwrap(), num(5.0));
    }

    #[test]
    fn sqrt_of_negative_is_nan_not_an_error() {
        let result = call("SQRT", &[num(-1.0)]).unwrap();
        assert!(matches!(result, Value::Number(n) if n.is_nan()));
    }

    #[test]
    fn sqrt_of_four_is_two() {
        assert_eq!(call("SQRT", &[num(4.0)]).unwrap(), num(2.0));
    }

    #[test]
    fn round_defaults_to_zero_decimals() {
        assert_eq!(call("ROUND", &[num(2.5)]).unwrap(), num(3.0));
        assert_eq!(call("round", &[num(-2.5)]).unwrap(), num(-3.0));
    }

    #[test]
    fn round_with_explicit_decimals() {
        assert_eq!(call("ROUND", &[num(3.14159), num(2.0)]).unwrap(), num(3.14));
    }

    #[test]
    fn min_max_sum_avg_are_variadic() {
        let args = [num(1.0), num(2.0), num(3.0)];
        assert_eq!(call("MIN", &args).unwrap(), num(1.0));
        assert_eq!(call("MAX", &args).unwrap(), num(3.0));
        assert_eq!(call("SUM", &args).unwrap(), num(6.0));
        assert_eq!(call("AVG", &args).unwrap(), num(2.0));
        assert_eq!(call("AVERAGE", &args).unwrap(), num(2.0));
    }

    #[test]
    fn unknown_function_is_reported() {
        assert!(matches!(call("BOGUS", &[]), Err(EvalError::UnknownFunction { .. })));
    }

    #[test]
    fn wrong_arity_is_reported() {
        assert!(matches!(call("ABS", &[]), Err(EvalError::ArityError { .. })));
        assert!(matches!(call("ABS", &[num(1.0), num(2.0)]), Err(EvalError::ArityError { .. })));
    }
}
