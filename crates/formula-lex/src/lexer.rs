//! The lexer: text -> token stream.
//!
//! Direct-coded (not table-driven): each branch of `next_token` dispatches
//! to a small scanning routine. Whitespace is skipped before every token;
//! two-character operators (`==`, `!=`, `<=`, `>=`, `&&`, `||`) are checked
//! before falling back to their one-character prefix.

use formula_util::Position;

use crate::context::LexerContext;
use crate::cursor::Cursor;
use crate::error::LexError;
use crate::token::{Token, TokenKind};

/// Scans a formula's source text into a token stream, one token at a time.
pub struct Lexer<'a> {
    cursor: Cursor<'a>,
    context: LexerContext,
    /// Set once a `Dollar` token has been produced, so repeated calls keep
    /// returning it instead of re-reading past the end of the source.
    exhausted: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, context: LexerContext) -> Self {
        Self { cursor: Cursor::new(source), context, exhausted: false }
    }

    /// Tokenize the entire input, returning a stream terminated by exactly
    /// one `Dollar` token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token()?;
            let is_dollar = token.kind == TokenKind::Dollar;
            tokens.push(token);
            if is_dollar {
                break;
            }
        }
        Ok(tokens)
    }

    /// Produce the next token, or a `Dollar` sentinel at end of input.
    pub fn next_token(&mut self) -> Result<Token, LexError> {
        if self.exhausted {
            return Ok(Token::dollar(self.cursor.position()));
        }

        self.skip_whitespace();

        let start = self.cursor.position();

        if self.cursor.is_at_end() {
            self.exhausted = true;
            return Ok(Token::dollar(start));
        }

        let token = match self.cursor.current() {
            '(' => self.single(TokenKind::LeftParen),
            ')' => self.single(TokenKind::RightParen),
            ',' => self.single(TokenKind::Comma),
            '+' => self.single(TokenKind::Plus),
            '-' => self.single(TokenKind::Minus),
            '*' => self.single(TokenKind::Multiply),
            '/' => self.single(TokenKind::Divide),
            '%' => self.single(TokenKind::Modulo),
            '^' => self.single(TokenKind::Power),
            '=' => self.two_char_or_error('=', TokenKind::Equal, start)?,
            '!' => self.bang(start),
            '<' => self.maybe_eq('<', TokenKind::Less, TokenKind::LessEqual),
            '>' => self.maybe_eq('>', TokenKind::Greater, TokenKind::GreaterEqual),
            '&' => self.two_char_or_error('&', TokenKind::And, start)?,
            '|' => self.two_char_or_error('|', TokenKind::Or, start)?,
            '{' => return self.variable(start),
            c if c.is_ascii_digit() => return self.number(start),
            c if self.is_identifier_start(c) => return Ok(self.identifier(start)),
            c => {
                self.cursor.advance();
                return Err(LexError::UnexpectedCharacter { character: c, position: start });
            }
        };

        self.with_text(token, start)
    }

    fn is_identifier_start(&self, c: char) -> bool {
        if self.context.allow_unicode_identifiers {
            c.is_alphabetic() || c == '_'
        } else {
            c.is_ascii_alphabetic() || c == '_'
        }
    }

    fn is_identifier_continue(&self, c: char) -> bool {
        if self.context.allow_unicode_identifiers {
            c.is_alphanumeric() || c == '_'
        } else {
            c.is_ascii_alphanumeric() || c == '_'
        }
    }

    /// Wrap `kind` into a `Token`, taking its text from `[start, cursor)`
    /// and enforcing `maxTokenLength`.
    fn with_text(&self, kind: TokenKind, start: Position) -> Result<Token, LexError> {
        let text = self.cursor.slice(start.offset, self.cursor.offset());
        if text.len() > self.context.max_token_length {
            return Err(LexError::TokenTooLong { position: start, limit: self.context.max_token_length });
        }
        Ok(Token::new(kind, text, start))
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        kind
    }

    /// Consume `!`; `!=` becomes `NotEqual`, a bare `!` becomes `Not`.
    fn bang(&mut self, _start: Position) -> TokenKind {
        self.cursor.advance();
        if self.cursor.eat('=') {
            TokenKind::NotEqual
        } else {
            TokenKind::Not
        }
    }

    /// Consume the current char; if followed by `second` consume that too
    /// and return `double_kind`, else return `single_kind`.
    fn maybe_eq(&mut self, second: char, single_kind: TokenKind, double_kind: TokenKind) -> TokenKind {
        self.cursor.advance();
        if self.cursor.eat(second) {
            double_kind
        } else {
            single_kind
        }
    }

    /// Operators that only exist in their doubled form (`==`, `&&`, `||`);
    /// the lone character is not a valid token on its own.
    fn two_char_or_error(
        &mut self,
        second: char,
        double_kind: TokenKind,
        start: Position,
    ) -> Result<TokenKind, LexError> {
        let first = self.cursor.advance();
        if self.cursor.eat(second) {
            Ok(double_kind)
        } else {
            Err(LexError::UnexpectedCharacter { character: first, position: start })
        }
    }

    /// `[A-Za-z_][A-Za-z0-9_]*`, mapped case-insensitively to keywords.
    fn identifier(&mut self, start: Position) -> Token {
        while self.is_identifier_continue(self.cursor.current()) {
            self.cursor.advance();
        }
        let text = self.cursor.slice(start.offset, self.cursor.offset());
        let kind = match text.to_ascii_lowercase().as_str() {
            "if" => TokenKind::If,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            "and" => TokenKind::And,
            "or" => TokenKind::Or,
            "not" => TokenKind::Not,
            _ => TokenKind::Identifier,
        };
        Token::new(kind, text, start)
    }

    /// Digits with an optional single `.`.
    fn number(&mut self, start: Position) -> Result<Token, LexError> {
        while self.cursor.current().is_ascii_digit() {
            self.cursor.advance();
        }
        if self.cursor.current() == '.' && self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
            while self.cursor.current().is_ascii_digit() {
                self.cursor.advance();
            }
        }
        self.with_text(TokenKind::Number, start)
    }

    /// `{identifier}`; the opening brace's position is reported if the
    /// closing brace is missing.
    fn variable(&mut self, start: Position) -> Result<Token, LexError> {
        self.cursor.advance(); // consume '{'
        let name_start = self.cursor.offset();
        while self.cursor.current() != '}' && !self.cursor.is_at_end() {
            self.cursor.advance();
        }
        if self.cursor.is_at_end() {
            return Err(LexError::UnclosedVariable { position: start });
        }
        let name = self.cursor.slice(name_start, self.cursor.offset()).to_string();
        self.cursor.advance(); // consume '}'
        let full_text = self.cursor.slice(start.offset, self.cursor.offset());
        if full_text.len() > self.context.max_token_length {
            return Err(LexError::TokenTooLong { position: start, limit: self.context.max_token_length });
        }
        Ok(Token::new(TokenKind::Variable, name, start))
    }

    fn skip_whitespace(&mut self) {
        if !self.context.skip_whitespace {
            return;
        }
        while self.cursor.current().is_whitespace() {
            self.cursor.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(src: &str) -> Vec<TokenKind> {
        Lexer::new(src, LexerContext::default())
            .tokenize()
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn empty_input_is_just_dollar() {
        assert_eq!(tokenize(""), vec![TokenKind::Dollar]);
    }

    #[test]
    fn tokenizes_arithmetic() {
        assert_eq!(
            tokenize("1 + 2 * 3"),
            vec![
                TokenKind::Number,
                TokenKind::Plus,
                TokenKind::Number,
                TokenKind::Multiply,
                TokenKind::Number,
                TokenKind::Dollar,
            ]
        );
    }

    #[test]
    fn tokenizes_two_char_operators() {
        assert_eq!(
            tokenize("1 <= 2 && 3 >= 3 || false == true != !x"),
            vec![
                TokenKind::Number,
                TokenKind::LessEqual,
                TokenKind::Number,
                TokenKind::And,
                TokenKind::Number,
                TokenKind::GreaterEqual,
                TokenKind::Number,
                TokenKind::Or,
                TokenKind::False,
                TokenKind::Equal,
                TokenKind::True,
                TokenKind::NotEqual,
                TokenKind::Not,
                TokenKind::Identifier,
                TokenKind::Dollar,
            ]
        );
    }

    #[test]
    fn variable_reads_braced_name() {
        let tokens = Lexer::new("{my_var}", LexerContext::default()).tokenize().unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Variable);
        assert_eq!(tokens[0].text, "my_var");
    }

    #[test]
    fn unclosed_variable_errors_at_opening_brace() {
        let err = Lexer::new("{x", LexerContext::default()).tokenize().unwrap_err();
        match err {
            LexError::UnclosedVariable { position } => assert_eq!(position.offset, 0),
            other => panic!("expected UnclosedVariable, got {other:?}"),
        }
    }

    #[test]
    fn unexpected_character_is_reported() {
        let err = Lexer::new("1 ? 2", LexerContext::default()).tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnexpectedCharacter { character: '?', .. }));
    }

    #[test]
    fn lone_ampersand_is_an_error() {
        let err = Lexer::new("1 & 2", LexerContext::default()).tokenize().unwrap_err();
        assert!(matches!(err, LexError::UnexpectedCharacter { character: '&', .. }));
    }

    #[test]
    fn number_accepts_single_decimal_point() {
        let tokens = Lexer::new("3.14", LexerContext::default()).tokenize().unwrap();
        assert_eq!(tokens[0].text, "3.14");
    }

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(tokenize("IF"), vec![TokenKind::If, TokenKind::Dollar]);
        assert_eq!(tokenize("TRUE"), vec![TokenKind::True, TokenKind::Dollar]);
    }

    #[test]
    fn whitespace_is_skipped_including_newlines() {
        assert_eq!(tokenize("1\n+\t2"), vec![TokenKind::Number, TokenKind::Plus, TokenKind::Number, TokenKind::Dollar]);
    }

    #[test]
    fn token_too_long_is_reported() {
        let ctx = LexerContext { max_token_length: 2, ..LexerContext::default() };
        let err = Lexer::new("12345", ctx).tokenize().unwrap_err();
        assert!(matches!(err, LexError::TokenTooLong { .. }));
    }
}
