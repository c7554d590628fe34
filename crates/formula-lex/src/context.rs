//! Lexer configuration.

/// Small context the lexer consults while scanning: whether unicode
/// identifiers are allowed, and the maximum length of a single token.
///
/// `strict_mode` and `skip_whitespace` are carried through for parity with
/// the specification's closed option set even though, in this
/// implementation, whitespace is always skipped and strict mode only
/// affects the evaluator's coercion policy (not lexing itself).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LexerContext {
    pub strict_mode: bool,
    pub allow_unicode_identifiers: bool,
    pub max_token_length: usize,
    pub skip_whitespace: bool,
}

impl Default for LexerContext {
    fn default() -> Self {
        Self {
            strict_mode: true,
            allow_unicode_identifiers: false,
            max_token_length: 1_000,
            skip_whitespace: true,
        }
    }
}
