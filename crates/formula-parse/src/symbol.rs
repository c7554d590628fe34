//! Grammar symbols: terminals (re-exported from `formula_lex`) and the
//! non-terminals of the expression grammar.

use formula_lex::TokenKind;

/// The non-terminals of the formula grammar, encoding the C-family
/// precedence ladder described in the grammar design: `Start` sits above
/// `Expr`, which descends through `AndExpr` / `CompExpr` / `ArithExpr` /
/// `Term` / `Factor` down to `Primary`, with `Args` for call argument
/// lists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NonTerminal {
    Start,
    Expr,
    AndExpr,
    CompExpr,
    ArithExpr,
    Term,
    Factor,
    Primary,
    Args,
}

impl NonTerminal {
    pub const ALL: [NonTerminal; 9] = [
        NonTerminal::Start,
        NonTerminal::Expr,
        NonTerminal::AndExpr,
        NonTerminal::CompExpr,
        NonTerminal::ArithExpr,
        NonTerminal::Term,
        NonTerminal::Factor,
        NonTerminal::Primary,
        NonTerminal::Args,
    ];

    /// Dense index used by the compacted GOTO table.
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NonTerminal::Start => "START",
            NonTerminal::Expr => "EXPR",
            NonTerminal::AndExpr => "AND_EXPR",
            NonTerminal::CompExpr => "COMP_EXPR",
            NonTerminal::ArithExpr => "ARITH_EXPR",
            NonTerminal::Term => "TERM",
            NonTerminal::Factor => "FACTOR",
            NonTerminal::Primary => "PRIMARY",
            NonTerminal::Args => "ARGS",
        };
        write!(f, "{name}")
    }
}

/// A grammar symbol: either a terminal (a `TokenKind` the lexer can
/// produce) or a non-terminal that only appears inside parser productions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    Terminal(TokenKind),
    NonTerminal(NonTerminal),
}

impl Symbol {
    pub const fn is_terminal(self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub const fn as_terminal(self) -> Option<TokenKind> {
        match self {
            Symbol::Terminal(t) => Some(t),
            Symbol::NonTerminal(_) => None,
        }
    }

    pub const fn as_non_terminal(self) -> Option<NonTerminal> {
        match self {
            Symbol::Terminal(_) => None,
            Symbol::NonTerminal(nt) => Some(nt),
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Symbol::Terminal(t) => write!(f, "{t}"),
            Symbol::NonTerminal(nt) => write!(f, "{nt}"),
        }
    }
}

/// All terminals that can appear in a lookahead set, in a fixed order used
/// to build dense action-table indices. `Dollar` is included since it is a
/// terminal per the specification.
pub const ALL_TERMINALS: [TokenKind; 25] = [
    TokenKind::Number,
    TokenKind::Identifier,
    TokenKind::Variable,
    TokenKind::True,
    TokenKind::False,
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Multiply,
    TokenKind::Divide,
    TokenKind::Modulo,
    TokenKind::Power,
    TokenKind::Equal,
    TokenKind::NotEqual,
    TokenKind::Less,
    TokenKind::LessEqual,
    TokenKind::Greater,
    TokenKind::GreaterEqual,
    TokenKind::And,
    TokenKind::Or,
    TokenKind::Not,
    TokenKind::LeftParen,
    TokenKind::RightParen,
    TokenKind::Comma,
    TokenKind::If,
    TokenKind::Dollar,
];

/// Dense index of a terminal, used to index the compacted action table.
pub fn terminal_index(kind: TokenKind) -> usize {
    ALL_TERMINALS.iter().position(|&t| t == kind).expect("TokenKind not in ALL_TERMINALS")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_terminal_has_a_unique_index() {
        let mut seen = std::collections::HashSet::new();
        for t in ALL_TERMINALS {
            assert!(seen.insert(terminal_index(t)));
        }
    }

    #[test]
    fn non_terminal_indices_are_dense() {
        for (i, nt) in NonTerminal::ALL.iter().enumerate() {
            assert_eq!(nt.index(), i);
        }
    }
}
