// Copyright (C) 2025 The gloss authors. This program is free software: you can
// redistribute it and/or modify it under the terms of the GNU General Public
// License as published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

/// The abstract syntax tree produced by the parser and walked by the renderer.
use std::fmt::Display;

/// Position of a construct in the physical source, 1-based, as reported by
/// the parser.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Span {
    pub line: usize,
    pub column: usize,
    pub end_line: usize,
    pub end_column: usize,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Program {
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Stmt {
    pub node: StmtNode,
    pub span: Span,
}

impl Stmt {
    pub fn new(node: StmtNode, span: Span) -> Self {
        Stmt { node, span }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum StmtNode {
    Function {
        name: String,
        params: Vec<String>,
        body: Box<Stmt>,
    },
    Decl {
        kind: DeclKind,
        declarators: Vec<Declarator>,
    },
    Expr(Expr),
    If {
        arms: Vec<CondArm>,
        otherwise: Option<ElseArm>,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
    },
    DoWhile {
        body: Box<Stmt>,
        condition: Expr,
        /// Position of the trailing `while` keyword; the test renders there,
        /// not at the `do`.
        test_span: Span,
    },
    For {
        init: Option<ForInit>,
        test: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },
    Return(Option<Expr>),
    Block(Vec<Stmt>),
}

/// One `if` or `else if` arm. The span points at the keyword introducing the
/// arm, so a continuation arm is located at its `else`, not at the nested `if`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct CondArm {
    pub condition: Expr,
    pub body: Stmt,
    pub span: Span,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ElseArm {
    pub body: Box<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Declarator {
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ForInit {
    Decl {
        kind: DeclKind,
        declarators: Vec<Declarator>,
    },
    Expr(Expr),
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum DeclKind {
    Let,
    Const,
    Var,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Expr {
    Id(String),
    Value(Literal),
    Array(Vec<Expr>),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Update {
        op: UpdateOp,
        prefix: bool,
        target: String,
    },
    Index(Box<Expr>, Box<Expr>),
    Assign {
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float { text: String, value: f64 },
    Str { text: String, value: String },
    Bool(bool),
}

// Floats never hold NaN here (they come from successful literal parses), so
// the reflexive equality Eq promises does hold.
impl Eq for Literal {}

impl Literal {
    /// The literal as it appeared in the source text.
    pub fn source(&self) -> String {
        match self {
            Literal::Int(i) => i.to_string(),
            Literal::Float { text, .. } => text.clone(),
            Literal::Str { text, .. } => text.clone(),
            Literal::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Gt,
    LtE,
    GtE,
    Eq,
    NEq,
    StrictEq,
    StrictNEq,
    BitAnd,
    BitOr,
    BitXor,
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Add => write!(f, "+"),
            Self::Sub => write!(f, "-"),
            Self::Mul => write!(f, "*"),
            Self::Div => write!(f, "/"),
            Self::Mod => write!(f, "%"),
            Self::Lt => write!(f, "<"),
            Self::Gt => write!(f, ">"),
            Self::LtE => write!(f, "<="),
            Self::GtE => write!(f, ">="),
            Self::Eq => write!(f, "=="),
            Self::NEq => write!(f, "!="),
            Self::StrictEq => write!(f, "==="),
            Self::StrictNEq => write!(f, "!=="),
            Self::BitAnd => write!(f, "&"),
            Self::BitOr => write!(f, "|"),
            Self::BitXor => write!(f, "^"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UnaryOp {
    Not,
    Neg,
    Pos,
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Not => write!(f, "!"),
            Self::Neg => write!(f, "-"),
            Self::Pos => write!(f, "+"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum UpdateOp {
    Inc,
    Dec,
}

impl Display for UpdateOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Inc => write!(f, "++"),
            Self::Dec => write!(f, "--"),
        }
    }
}
