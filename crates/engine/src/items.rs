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

//! The flat, substitution-free item view: every declaration, assignment,
//! update and control header in the program as one row, in traversal order.

use gloss_syntax::ast::{Expr, ForInit, Program, Stmt, StmtNode};
use gloss_syntax::unparse_expr;

#[derive(Debug, Clone, Copy, Eq, PartialEq, strum::Display)]
pub enum ItemKind {
    #[strum(serialize = "function declaration")]
    FunctionDeclaration,
    #[strum(serialize = "variable declaration")]
    VariableDeclaration,
    #[strum(serialize = "assignment expression")]
    AssignmentExpression,
    #[strum(serialize = "update expression")]
    UpdateExpression,
    #[strum(serialize = "if statement")]
    IfStatement,
    #[strum(serialize = "else if statement")]
    ElseIfStatement,
    #[strum(serialize = "while statement")]
    WhileStatement,
    #[strum(serialize = "do while statement")]
    DoWhileStatement,
    #[strum(serialize = "for statement")]
    ForStatement,
    #[strum(serialize = "return statement")]
    ReturnStatement,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Item {
    pub line: usize,
    pub kind: ItemKind,
    pub name: String,
    pub condition: String,
    pub value: String,
}

fn row(line: usize, kind: ItemKind) -> Item {
    Item {
        line,
        kind,
        name: String::new(),
        condition: String::new(),
        value: String::new(),
    }
}

pub fn items(program: &Program) -> Vec<Item> {
    let mut rows = vec![];
    for stmt in &program.body {
        flatten_stmt(stmt, &mut rows);
    }
    rows
}

fn flatten_stmt(stmt: &Stmt, rows: &mut Vec<Item>) {
    let line = stmt.span.line;
    match &stmt.node {
        StmtNode::Function { name, params, body } => {
            let mut item = row(line, ItemKind::FunctionDeclaration);
            item.name = name.clone();
            rows.push(item);
            // Parameters are declarations bound at the header line.
            for param in params {
                let mut item = row(line, ItemKind::VariableDeclaration);
                item.name = param.clone();
                rows.push(item);
            }
            flatten_stmt(body, rows);
        }
        StmtNode::Decl { declarators, .. } => {
            for declarator in declarators {
                let mut item = row(line, ItemKind::VariableDeclaration);
                item.name = declarator.name.clone();
                if let Some(init) = &declarator.init {
                    item.value = unparse_expr(init);
                }
                rows.push(item);
            }
        }
        StmtNode::Expr(expr) => flatten_expr_stmt(line, expr, rows),
        StmtNode::If { arms, otherwise } => {
            for (i, arm) in arms.iter().enumerate() {
                let kind = if i == 0 {
                    ItemKind::IfStatement
                } else {
                    ItemKind::ElseIfStatement
                };
                let mut item = row(arm.span.line, kind);
                item.condition = unparse_expr(&arm.condition);
                rows.push(item);
                flatten_stmt(&arm.body, rows);
            }
            if let Some(arm) = otherwise {
                flatten_stmt(&arm.body, rows);
            }
        }
        StmtNode::While { condition, body } => {
            let mut item = row(line, ItemKind::WhileStatement);
            item.condition = unparse_expr(condition);
            rows.push(item);
            flatten_stmt(body, rows);
        }
        StmtNode::DoWhile {
            body, condition, ..
        } => {
            let mut item = row(line, ItemKind::DoWhileStatement);
            item.condition = unparse_expr(condition);
            rows.push(item);
            flatten_stmt(body, rows);
        }
        StmtNode::For {
            init,
            test,
            update,
            body,
        } => {
            let mut item = row(line, ItemKind::ForStatement);
            if let Some(test) = test {
                item.condition = unparse_expr(test);
            }
            rows.push(item);
            match init {
                Some(ForInit::Decl { declarators, .. }) => {
                    for declarator in declarators {
                        let mut item = row(line, ItemKind::VariableDeclaration);
                        item.name = declarator.name.clone();
                        if let Some(init) = &declarator.init {
                            item.value = unparse_expr(init);
                        }
                        rows.push(item);
                    }
                }
                Some(ForInit::Expr(expr)) => flatten_expr_stmt(line, expr, rows),
                None => {}
            }
            if let Some(update) = update {
                flatten_expr_stmt(line, update, rows);
            }
            flatten_stmt(body, rows);
        }
        StmtNode::Return(value) => {
            let mut item = row(line, ItemKind::ReturnStatement);
            if let Some(value) = value {
                item.value = unparse_expr(value);
            }
            rows.push(item);
        }
        StmtNode::Block(body) => {
            for child in body {
                flatten_stmt(child, rows);
            }
        }
    }
}

fn flatten_expr_stmt(line: usize, expr: &Expr, rows: &mut Vec<Item>) {
    match expr {
        Expr::Assign { left, right } => {
            let mut item = row(line, ItemKind::AssignmentExpression);
            item.name = unparse_expr(left);
            item.value = unparse_expr(right);
            rows.push(item);
        }
        Expr::Update { .. } => {
            let mut item = row(line, ItemKind::UpdateExpression);
            item.value = unparse_expr(expr);
            rows.push(item);
        }
        // Bare expressions contribute no row.
        _ => {}
    }
}
