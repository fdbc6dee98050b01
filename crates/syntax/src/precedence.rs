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

use crate::ast::{BinaryOp, Expr};

/// Operator binding strength, used when printing to decide where parentheses
/// are required. Must stay in agreement with the Pratt rows in the parser.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
#[repr(u8)]
pub enum Precedence {
    Assign = 1,
    Or = 2,
    And = 3,
    BitOr = 4,
    BitXor = 5,
    BitAnd = 6,
    Equality = 7,
    Relational = 8,
    Additive = 9,
    Multiplicative = 10,
    Unary = 11,
    Primary = 12,
}

pub fn get_precedence(expr: &Expr) -> Precedence {
    match expr {
        Expr::Assign { .. } => Precedence::Assign,
        Expr::Or(..) => Precedence::Or,
        Expr::And(..) => Precedence::And,
        Expr::Binary(op, ..) => match op {
            BinaryOp::BitOr => Precedence::BitOr,
            BinaryOp::BitXor => Precedence::BitXor,
            BinaryOp::BitAnd => Precedence::BitAnd,
            BinaryOp::Eq | BinaryOp::NEq | BinaryOp::StrictEq | BinaryOp::StrictNEq => {
                Precedence::Equality
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtE | BinaryOp::GtE => Precedence::Relational,
            BinaryOp::Add | BinaryOp::Sub => Precedence::Additive,
            BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => Precedence::Multiplicative,
        },
        Expr::Unary(..) | Expr::Update { .. } => Precedence::Unary,
        Expr::Id(_) | Expr::Value(_) | Expr::Array(_) | Expr::Index(..) => Precedence::Primary,
    }
}
