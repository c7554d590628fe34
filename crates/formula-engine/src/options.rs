//! The closed set of options accepted by [`crate::evaluate`] and
//! [`crate::evaluate_multi_step`].

use formula_util::Limits;
use serde::{Deserialize, Serialize};

/// Options controlling lexing, parsing, and evaluation of a single
/// formula (or of every step in a multi-step run).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluateOptions {
    /// Resource limits enforced by the lexer, parser, and step
    /// orchestrator.
    pub limits: Limits,
    /// Accept Unicode letters in identifiers and variable names, not just
    /// ASCII. Off by default to keep variable names portable.
    pub allow_unicode_identifiers: bool,
    /// Promote lenient-coercion warnings to hard errors. On by default; no
    /// coercion rule in this engine currently takes the lenient path (each
    /// either succeeds outright or raises `CoercionError`), so this has no
    /// observable effect yet but is carried for forward compatibility with
    /// the option's intended meaning.
    pub strict_mode: bool,
}

impl Default for EvaluateOptions {
    fn default() -> Self {
        EvaluateOptions { limits: Limits::default(), allow_unicode_identifiers: false, strict_mode: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_ascii_only_and_strict() {
        let opts = EvaluateOptions::default();
        assert!(!opts.allow_unicode_identifiers);
        assert!(opts.strict_mode);
        assert_eq!(opts.limits.max_formula_length, 10_000);
    }

    #[test]
    fn round_trips_through_json() {
        let opts = EvaluateOptions::default();
        let json = serde_json::to_string(&opts).unwrap();
        let back: EvaluateOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back.limits.max_formula_length, opts.limits.max_formula_length);
    }
}
