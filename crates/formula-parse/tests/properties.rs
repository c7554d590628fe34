//! Integration tests covering grammar-wide properties: determinism of
//! table construction, resource limits, and precedence/associativity as
//! observed through the public `parse` entry point rather than internal
//! table internals.

use formula_lex::{Lexer, LexerContext};
use formula_parse::{parse, tables, Ast, AstError, BinOp, ParseError};
use formula_util::Limits;

fn parse_ok(src: &str) -> Ast {
    let tokens = Lexer::new(src, LexerContext::default()).tokenize().unwrap();
    parse(tokens, &Limits::default()).unwrap_or_else(|e| panic!("expected {src:?} to parse, got {e}"))
}

fn parse_err(src: &str) -> ParseError {
    let tokens = Lexer::new(src, LexerContext::default()).tokenize().unwrap();
    parse(tokens, &Limits::default()).unwrap_err()
}

#[test]
fn table_has_no_unresolved_conflicts() {
    assert!(tables().conflicts.is_empty());
}

#[test]
fn comparisons_do_not_chain() {
    // `1 < 2 < 3` is a syntax error: COMP_EXPR never recurses into itself.
    let err = parse_err("1 < 2 < 3");
    assert!(matches!(err, ParseError::Syntax(_)));
}

#[test]
fn and_binds_tighter_than_or() {
    let ast = parse_ok("true || false && false");
    match ast {
        Ast::BinaryOp(_, BinOp::Or, right) => {
            assert!(matches!(*right, Ast::BinaryOp(_, BinOp::And, _)));
        }
        other => panic!("expected OR at the root, got {other:?}"),
    }
}

#[test]
fn unary_not_binds_tighter_than_and() {
    let ast = parse_ok("!true && false");
    match ast {
        Ast::BinaryOp(left, BinOp::And, _) => {
            assert!(matches!(*left, Ast::UnaryOp(_, _)));
        }
        other => panic!("expected AND at the root, got {other:?}"),
    }
}

#[test]
fn modulo_and_multiply_share_precedence_and_left_associate() {
    let ast = parse_ok("10 % 3 * 2");
    match ast {
        Ast::BinaryOp(left, BinOp::Mul, _) => {
            assert!(matches!(*left, Ast::BinaryOp(_, BinOp::Mod, _)));
        }
        other => panic!("expected MUL at the root, got {other:?}"),
    }
}

#[test]
fn grouping_parentheses_do_not_inflate_ast_depth() {
    // Parentheses are transparent in the built AST (they only disambiguate
    // precedence during parsing), so wrapping a literal in parens, however
    // deeply, never changes its depth.
    let limits = Limits { max_ast_depth: 10, ..Limits::default() };
    let src = format!("{}1{}", "(".repeat(20), ")".repeat(20));
    let tokens = Lexer::new(&src, LexerContext::default()).tokenize().unwrap();
    let ast = parse(tokens, &limits).unwrap();
    assert_eq!(ast.depth(), 1);
}

#[test]
fn deeply_nested_unary_negation_respects_the_depth_limit() {
    let limits = Limits { max_ast_depth: 10, ..Limits::default() };
    let src = format!("{}1", "-".repeat(20));
    let tokens = Lexer::new(&src, LexerContext::default()).tokenize().unwrap();
    let err = parse(tokens, &limits).unwrap_err();
    assert!(matches!(err, ParseError::Ast(AstError::DepthExceeded { .. })));
}

#[test]
fn numeric_literals_that_overflow_to_infinity_are_rejected() {
    let src = format!("1{}", "0".repeat(310));
    let err = parse_err(&src);
    assert!(matches!(err, ParseError::Ast(AstError::NonFiniteNumber { .. })));
}

#[test]
fn variable_names_must_be_well_formed() {
    let err = parse_err("{9invalid}");
    assert!(matches!(err, ParseError::Ast(AstError::InvalidVariableName { .. })));
}

#[test]
fn repeated_table_builds_are_identical_in_state_count() {
    let grammar_a = formula_parse::Grammar::build().unwrap();
    let grammar_b = formula_parse::Grammar::build().unwrap();
    let tables_a = formula_parse::ParserTables::build(&grammar_a).unwrap();
    let tables_b = formula_parse::ParserTables::build(&grammar_b).unwrap();
    assert_eq!(tables_a.num_states, tables_b.num_states);
}

#[test]
fn function_calls_nest_inside_if_conditions() {
    let ast = parse_ok("IF(SUM(1, 2) > 2, MAX(1, 2), MIN(1, 2))");
    assert!(matches!(ast, Ast::If(_, _, _)));
}
