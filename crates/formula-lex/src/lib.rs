//! formula-lex - Lexical analysis for the formula evaluation engine.
//!
//! Turns formula text into a stream of [`Token`]s terminated by a single
//! `Dollar` sentinel. The scanner is hand-written and single-pass: one
//! character of lookahead, plus a one-character peek for two-character
//! operators (`==`, `!=`, `<=`, `>=`, `&&`, `||`).

mod context;
mod cursor;
mod error;
mod lexer;
mod token;

pub use context::LexerContext;
pub use cursor::Cursor;
pub use error::LexError;
pub use lexer::Lexer;
pub use token::{Token, TokenKind};
