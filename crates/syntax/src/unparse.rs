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

//! Plain, substitution-free expression printing. The item table and error
//! messages use this; the annotated rendering has its own printer in the
//! engine crate.

use itertools::Itertools;

use crate::ast::Expr;
use crate::precedence::get_precedence;

pub fn unparse_expr(expr: &Expr) -> String {
    // Parenthesize a child that binds more loosely than its parent. The
    // right operand of a binary also parenthesizes on equal strength, to
    // preserve left association.
    let brace_if_lower = |e: &Expr| -> String {
        if get_precedence(e) < get_precedence(expr) {
            format!("({})", unparse_expr(e))
        } else {
            unparse_expr(e)
        }
    };
    let brace_if_lower_eq = |e: &Expr| -> String {
        if get_precedence(e) <= get_precedence(expr) {
            format!("({})", unparse_expr(e))
        } else {
            unparse_expr(e)
        }
    };

    match expr {
        Expr::Id(name) => name.clone(),
        Expr::Value(literal) => literal.source(),
        Expr::Array(elements) => {
            format!("[{}]", elements.iter().map(unparse_expr).join(", "))
        }
        Expr::Unary(op, operand) => format!("{op}{}", brace_if_lower(operand)),
        Expr::Binary(op, left, right) => {
            format!("{} {op} {}", brace_if_lower(left), brace_if_lower_eq(right))
        }
        Expr::And(left, right) => {
            format!("{} && {}", brace_if_lower(left), brace_if_lower_eq(right))
        }
        Expr::Or(left, right) => {
            format!("{} || {}", brace_if_lower(left), brace_if_lower_eq(right))
        }
        Expr::Update { op, prefix, target } => {
            if *prefix {
                format!("{op}{target}")
            } else {
                format!("{target}{op}")
            }
        }
        Expr::Index(base, index) => {
            format!("{}[{}]", brace_if_lower(base), unparse_expr(index))
        }
        Expr::Assign { left, right } => {
            format!("{} = {}", unparse_expr(left), unparse_expr(right))
        }
    }
}
