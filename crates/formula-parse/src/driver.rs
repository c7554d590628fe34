//! The LR driver: walks a token stream against a [`ParserTables`],
//! maintaining a state stack and a symbol stack, and invokes the
//! per-production builder on every reduce to assemble an [`Ast`].

use formula_lex::{Token, TokenKind};

use crate::ast::Ast;
use crate::error::SyntaxError;
use crate::grammar::BuilderTag;
use crate::symbol::{Symbol, ALL_TERMINALS};
use crate::table_builder::{Action, ParserTables};

/// A value on the symbol stack: either a token that was shifted, or an
/// AST node produced by a previous reduce.
#[derive(Clone, Debug)]
enum StackValue {
    Token(Token),
    Node(Ast),
}

impl StackValue {
    fn into_node(self) -> Ast {
        match self {
            StackValue::Node(node) => node,
            StackValue::Token(token) => panic!("expected a node on the stack, found token {:?}", token.kind),
        }
    }

    fn into_token(self) -> Token {
        match self {
            StackValue::Token(token) => token,
            StackValue::Node(_) => panic!("expected a token on the stack, found a node"),
        }
    }
}

/// A token stream that keeps yielding its final `Dollar` once exhausted,
/// so the driver can shift the augmented production's trailing `$` symbol
/// without a special case at end of input.
struct TokenCursor {
    tokens: Vec<Token>,
    index: usize,
}

impl TokenCursor {
    fn new(tokens: Vec<Token>) -> Self {
        debug_assert!(tokens.last().is_some_and(|t| t.kind == TokenKind::Dollar));
        TokenCursor { tokens, index: 0 }
    }

    fn current(&self) -> &Token {
        let idx = self.index.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn advance(&mut self) {
        if self.index < self.tokens.len() - 1 {
            self.index += 1;
        }
    }
}

/// Drive `tokens` through `tables`, producing the root [`Ast`] node.
pub fn parse(tables: &ParserTables, tokens: Vec<Token>) -> Result<Ast, SyntaxError> {
    let mut states: Vec<usize> = vec![0];
    let mut values: Vec<StackValue> = Vec::new();
    let mut cursor = TokenCursor::new(tokens);

    loop {
        let state = *states.last().unwrap();
        let token = cursor.current().clone();
        let action = tables.action(state, token.kind).ok_or_else(|| {
            if token.kind == TokenKind::Dollar {
                let expected = expected_symbols(tables, state)
                    .iter()
                    .map(Symbol::to_string)
                    .collect::<Vec<_>>()
                    .join(", ");
                SyntaxError::UnexpectedEof { expected }
            } else {
                SyntaxError::unexpected(&token, expected_symbols(tables, state))
            }
        })?;

        match action {
            Action::Shift(next) => {
                values.push(StackValue::Token(token));
                states.push(next);
                cursor.advance();
            }
            Action::Reduce(production_id) => {
                let production = tables.production(production_id);
                let arity = production.rhs.len();
                let start = values.len() - arity;
                let children: Vec<StackValue> = values.split_off(start);
                states.truncate(states.len() - arity);

                let node = build(production.builder, children);

                let return_state = *states.last().unwrap();
                let goto_state = tables
                    .goto(return_state, production.lhs)
                    .unwrap_or_else(|| panic!("missing GOTO for state {return_state} on {}", production.lhs));
                values.push(StackValue::Node(node));
                states.push(goto_state);
            }
            Action::Accept => {
                let dollar = values.pop().expect("accept with empty stack").into_token();
                debug_assert_eq!(dollar.kind, TokenKind::Dollar);
                return Ok(values.pop().expect("accept with no result node").into_node());
            }
        }
    }
}

fn expected_symbols(tables: &ParserTables, state: usize) -> Vec<Symbol> {
    ALL_TERMINALS
        .iter()
        .filter(|&&kind| tables.action(state, kind).is_some())
        .map(|&kind| Symbol::Terminal(kind))
        .collect()
}

/// Assemble the AST node a single reduction produces. `children` is in
/// left-to-right order and has exactly `production.rhs.len()` entries.
fn build(builder: BuilderTag, mut children: Vec<StackValue>) -> Ast {
    match builder {
        BuilderTag::Identity | BuilderTag::Start => children.remove(0).into_node(),
        BuilderTag::Parenthesized => children.remove(1).into_node(),
        BuilderTag::BinaryOp(op) => {
            let right = children.remove(2).into_node();
            let token = children.remove(1).into_token();
            let _ = token;
            let left = children.remove(0).into_node();
            Ast::BinaryOp(Box::new(left), op, Box::new(right))
        }
        BuilderTag::UnaryOp(op) => {
            let operand = children.remove(1).into_node();
            Ast::UnaryOp(op, Box::new(operand))
        }
        BuilderTag::Number => {
            let token = children.remove(0).into_token();
            let value: f64 = token.text.parse().expect("lexer guarantees numeric token text");
            Ast::Number(value)
        }
        BuilderTag::Variable | BuilderTag::Identifier => {
            let token = children.remove(0).into_token();
            Ast::Variable(token.text)
        }
        BuilderTag::BooleanTrue => Ast::Boolean(true),
        BuilderTag::BooleanFalse => Ast::Boolean(false),
        BuilderTag::FunctionCallEmpty => {
            let name = children.remove(0).into_token().text;
            Ast::FunctionCall(name, Vec::new())
        }
        BuilderTag::FunctionCall => {
            let name = children.remove(0).into_token().text;
            let args_node = children.remove(1).into_node();
            let args = match args_node {
                Ast::Arguments(items) => items,
                other => vec![other],
            };
            Ast::FunctionCall(name, args)
        }
        BuilderTag::If => {
            let condition = children.remove(2).into_node();
            let then_branch = children.remove(3).into_node();
            let else_branch = children.remove(4).into_node();
            Ast::If(Box::new(condition), Box::new(then_branch), Box::new(else_branch))
        }
        BuilderTag::ArgsSingle => Ast::Arguments(vec![children.remove(0).into_node()]),
        BuilderTag::ArgsMultiple => {
            let next = children.remove(2).into_node();
            let mut items = match children.remove(0).into_node() {
                Ast::Arguments(items) => items,
                other => vec![other],
            };
            items.push(next);
            Ast::Arguments(items)
        }
    }
}
