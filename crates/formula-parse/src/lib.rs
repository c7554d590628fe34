//! formula-parse - Grammar, LALR(1) table builder, and LR driver for the
//! formula evaluation engine.
//!
//! The grammar is a layered precedence ladder (see [`grammar`]), so the
//! table builder never actually needs its precedence-based conflict
//! resolution in practice; it is still implemented in full, since a
//! future grammar change should not have to rediscover it.

mod ast;
mod driver;
mod error;
mod first_follow;
mod grammar;
mod lr_item;
mod symbol;
mod table_builder;

pub use ast::{validate_variable_name, Ast, BinOp, UnOp, RESERVED_WORDS};
pub use error::{AstError, GrammarError, ParserTableError, SyntaxError};
pub use grammar::{Associativity, BuilderTag, Grammar, Precedence, Production};
pub use symbol::{NonTerminal, Symbol};
pub use table_builder::{Action, ConflictNote, ParserTables};

use formula_lex::Token;
use formula_util::Limits;
use once_cell::sync::Lazy;

/// The parser tables for the fixed grammar, built once per process.
static TABLES: Lazy<ParserTables> = Lazy::new(|| {
    let grammar = Grammar::build().expect("the built-in grammar is always well-formed");
    ParserTables::build(&grammar).expect("the built-in grammar always produces a conflict-free table")
});

/// Errors that can occur while turning a token stream into a validated AST.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Ast(#[from] AstError),
}

/// Parse an already-lexed token stream into a validated [`Ast`], using the
/// process-wide cached parser tables.
pub fn parse(tokens: Vec<Token>, limits: &Limits) -> Result<Ast, ParseError> {
    let ast = driver::parse(&TABLES, tokens)?;
    ast.validate(limits)?;
    Ok(ast)
}

/// Access the shared parser tables directly, e.g. for diagnostics tooling
/// that wants to inspect state counts or conflicts.
pub fn tables() -> &'static ParserTables {
    &TABLES
}

#[cfg(test)]
mod tests {
    use super::*;
    use formula_lex::{Lexer, LexerContext};

    #[test]
    fn parses_and_validates_a_simple_formula() {
        let tokens = Lexer::new("1 + {x} * 2", LexerContext::default()).tokenize().unwrap();
        let ast = parse(tokens, &Limits::default()).unwrap();
        assert_eq!(ast.node_count(), 5);
    }

    #[test]
    fn rejects_reserved_word_as_variable() {
        let tokens = Lexer::new("{if}", LexerContext::default()).tokenize().unwrap();
        let err = parse(tokens, &Limits::default()).unwrap_err();
        assert!(matches!(err, ParseError::Ast(AstError::ReservedVariableName { .. })));
    }

    #[test]
    fn shared_tables_have_no_conflicts() {
        assert!(tables().conflicts.is_empty());
    }
}
