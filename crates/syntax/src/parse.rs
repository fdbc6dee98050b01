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

/// Kicks off the Pest parser and converts its output into the AST.
use pest::Parser as PestParser;
use pest::error::LineColLocation;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use thiserror::Error;

use crate::ast::{
    CondArm, DeclKind, Declarator, ElseArm, Expr, ForInit, Literal, Program, Span, Stmt, StmtNode,
    UnaryOp, UpdateOp,
};
use crate::unparse::unparse_expr;

pub mod script {
    #[derive(Parser)]
    #[grammar = "src/script.pest"]
    pub struct ScriptParser;
}

use crate::ast::BinaryOp;
use crate::parse::script::{Rule, ScriptParser};

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column}: {message} in `{context}`")]
    Syntax {
        line: usize,
        column: usize,
        context: String,
        message: String,
    },
    #[error("line {line}: `{found}` cannot be the target of `{op}`")]
    InvalidUpdateTarget {
        line: usize,
        op: String,
        found: String,
    },
}

fn lower_pest_error(err: pest::error::Error<Rule>) -> ParseError {
    let (line, column) = match err.line_col {
        LineColLocation::Pos(lc) => lc,
        LineColLocation::Span(begin, _) => begin,
    };
    let context = err.line().to_string();
    let message = err.variant.message().to_string();
    ParseError::Syntax {
        line,
        column,
        context,
        message,
    }
}

/// Walks the pest pair tree and builds the AST out of it.
struct TreeTransformer;

impl TreeTransformer {
    fn span(pair: &Pair<Rule>) -> Span {
        let (line, column) = pair.line_col();
        let (end_line, end_column) = pair.as_span().end_pos().line_col();
        Span {
            line,
            column,
            end_line,
            end_column,
        }
    }

    fn transform_program(&self, pairs: Pairs<Rule>) -> Result<Program, ParseError> {
        let mut body = vec![];
        for pair in pairs {
            if pair.as_rule() == Rule::EOI {
                break;
            }
            body.push(self.parse_statement(pair)?);
        }
        Ok(Program { body })
    }

    fn parse_statement(&self, pair: Pair<Rule>) -> Result<Stmt, ParseError> {
        let span = Self::span(&pair);
        match pair.as_rule() {
            Rule::function_decl => {
                let mut parts = pair.into_inner();
                parts.next(); // kw_function
                let name = parts.next().unwrap().as_str().to_string();
                let mut params = vec![];
                let mut body = None;
                for part in parts {
                    match part.as_rule() {
                        Rule::param_list => {
                            params = part.into_inner().map(|p| p.as_str().to_string()).collect();
                        }
                        Rule::block => body = Some(self.parse_statement(part)?),
                        _ => unreachable!("unexpected function part: {:?}", part.as_rule()),
                    }
                }
                let body = Box::new(body.unwrap());
                Ok(Stmt::new(StmtNode::Function { name, params, body }, span))
            }
            Rule::decl_statement => {
                let decl = pair.into_inner().next().unwrap();
                let (kind, declarators) = self.parse_decl(decl)?;
                Ok(Stmt::new(StmtNode::Decl { kind, declarators }, span))
            }
            Rule::if_statement => {
                let (arms, otherwise) = self.parse_if(pair)?;
                Ok(Stmt::new(StmtNode::If { arms, otherwise }, span))
            }
            Rule::while_statement => {
                let mut parts = pair.into_inner();
                let condition = self.parse_expr(parts.next().unwrap().into_inner())?;
                let body = Box::new(self.parse_statement(parts.next().unwrap())?);
                Ok(Stmt::new(StmtNode::While { condition, body }, span))
            }
            Rule::do_while_statement => {
                let mut parts = pair.into_inner();
                parts.next(); // kw_do
                let body = Box::new(self.parse_statement(parts.next().unwrap())?);
                let while_clause = parts.next().unwrap();
                let test_span = Self::span(&while_clause);
                let condition =
                    self.parse_expr(while_clause.into_inner().next().unwrap().into_inner())?;
                Ok(Stmt::new(
                    StmtNode::DoWhile {
                        body,
                        condition,
                        test_span,
                    },
                    span,
                ))
            }
            Rule::for_statement => {
                let mut init = None;
                let mut test = None;
                let mut update = None;
                let mut body = None;
                for part in pair.into_inner() {
                    match part.as_rule() {
                        Rule::for_init => {
                            let inner = part.into_inner().next().unwrap();
                            init = Some(match inner.as_rule() {
                                Rule::decl => {
                                    let (kind, declarators) = self.parse_decl(inner)?;
                                    ForInit::Decl { kind, declarators }
                                }
                                Rule::expr => ForInit::Expr(self.parse_expr(inner.into_inner())?),
                                _ => unreachable!("unexpected for-init: {:?}", inner.as_rule()),
                            });
                        }
                        Rule::for_test => {
                            let expr = part.into_inner().next().unwrap();
                            test = Some(self.parse_expr(expr.into_inner())?);
                        }
                        Rule::for_update => {
                            let expr = part.into_inner().next().unwrap();
                            update = Some(self.parse_expr(expr.into_inner())?);
                        }
                        _ => body = Some(self.parse_statement(part)?),
                    }
                }
                let body = Box::new(body.unwrap());
                Ok(Stmt::new(
                    StmtNode::For {
                        init,
                        test,
                        update,
                        body,
                    },
                    span,
                ))
            }
            Rule::return_statement => {
                let mut parts = pair.into_inner();
                parts.next(); // kw_return
                let value = match parts.next() {
                    Some(expr) => Some(self.parse_expr(expr.into_inner())?),
                    None => None,
                };
                Ok(Stmt::new(StmtNode::Return(value), span))
            }
            Rule::block => {
                let mut body = vec![];
                for part in pair.into_inner() {
                    body.push(self.parse_statement(part)?);
                }
                Ok(Stmt::new(StmtNode::Block(body), span))
            }
            Rule::expr_statement => {
                let expr = pair.into_inner().next().unwrap();
                Ok(Stmt::new(
                    StmtNode::Expr(self.parse_expr(expr.into_inner())?),
                    span,
                ))
            }
            _ => unreachable!("unexpected statement rule: {:?}", pair.as_rule()),
        }
    }

    fn parse_decl(&self, pair: Pair<Rule>) -> Result<(DeclKind, Vec<Declarator>), ParseError> {
        let mut parts = pair.into_inner();
        let kind = match parts.next().unwrap().as_str() {
            "let" => DeclKind::Let,
            "const" => DeclKind::Const,
            "var" => DeclKind::Var,
            other => unreachable!("unexpected declaration keyword: {other}"),
        };
        let mut declarators = vec![];
        for declarator in parts {
            let mut inner = declarator.into_inner();
            let name = inner.next().unwrap().as_str().to_string();
            let init = match inner.next() {
                Some(expr) => Some(self.parse_expr(expr.into_inner())?),
                None => None,
            };
            declarators.push(Declarator { name, init });
        }
        Ok((kind, declarators))
    }

    /// Flatten an `if` / `else if` ladder into a list of arms plus an
    /// optional trailing `else`. A continuation arm's span is overridden to
    /// the position of its `else` keyword, which is where the arm's header
    /// line actually starts in the source.
    fn parse_if(&self, pair: Pair<Rule>) -> Result<(Vec<CondArm>, Option<ElseArm>), ParseError> {
        let arm_span = Self::span(&pair);
        let mut parts = pair.into_inner();
        let condition = self.parse_expr(parts.next().unwrap().into_inner())?;
        let body = self.parse_statement(parts.next().unwrap())?;
        let mut arms = vec![CondArm {
            condition,
            body,
            span: arm_span,
        }];
        let mut otherwise = None;
        if let Some(else_clause) = parts.next() {
            let else_span = Self::span(&else_clause);
            let mut inner = else_clause.into_inner();
            inner.next(); // kw_else
            let alternate = inner.next().unwrap();
            if alternate.as_rule() == Rule::if_statement {
                let (mut nested, nested_otherwise) = self.parse_if(alternate)?;
                nested[0].span = else_span;
                arms.append(&mut nested);
                otherwise = nested_otherwise;
            } else {
                otherwise = Some(ElseArm {
                    body: Box::new(self.parse_statement(alternate)?),
                    span: else_span,
                });
            }
        }
        Ok((arms, otherwise))
    }

    fn parse_expr(&self, pairs: Pairs<Rule>) -> Result<Expr, ParseError> {
        let pratt = PrattParser::new()
            // Lowest binding strength first, mirroring `Precedence`.
            .op(Op::infix(Rule::assign, Assoc::Right))
            .op(Op::infix(Rule::lor, Assoc::Left))
            .op(Op::infix(Rule::land, Assoc::Left))
            .op(Op::infix(Rule::bitor, Assoc::Left))
            .op(Op::infix(Rule::bitxor, Assoc::Left))
            .op(Op::infix(Rule::bitand, Assoc::Left))
            .op(Op::infix(Rule::strict_eq, Assoc::Left)
                | Op::infix(Rule::strict_neq, Assoc::Left)
                | Op::infix(Rule::eq, Assoc::Left)
                | Op::infix(Rule::neq, Assoc::Left))
            .op(Op::infix(Rule::lt, Assoc::Left)
                | Op::infix(Rule::gt, Assoc::Left)
                | Op::infix(Rule::lte, Assoc::Left)
                | Op::infix(Rule::gte, Assoc::Left))
            .op(Op::infix(Rule::add, Assoc::Left) | Op::infix(Rule::sub, Assoc::Left))
            .op(Op::infix(Rule::mul, Assoc::Left)
                | Op::infix(Rule::div, Assoc::Left)
                | Op::infix(Rule::modulus, Assoc::Left))
            .op(Op::prefix(Rule::not)
                | Op::prefix(Rule::neg)
                | Op::prefix(Rule::pos)
                | Op::prefix(Rule::pre_inc)
                | Op::prefix(Rule::pre_dec))
            .op(Op::postfix(Rule::index)
                | Op::postfix(Rule::post_inc)
                | Op::postfix(Rule::post_dec));

        pratt
            .map_primary(|primary| match primary.as_rule() {
                Rule::paren_expr => self.parse_expr(primary.into_inner().next().unwrap().into_inner()),
                Rule::array => {
                    let mut elements = vec![];
                    if let Some(list) = primary.into_inner().next() {
                        for element in list.into_inner() {
                            elements.push(self.parse_expr(element.into_inner())?);
                        }
                    }
                    Ok(Expr::Array(elements))
                }
                Rule::atom => self.parse_atom(primary.into_inner().next().unwrap()),
                _ => unreachable!("unexpected primary: {:?}", primary.as_rule()),
            })
            .map_prefix(|op, rhs| {
                let rhs = rhs?;
                match op.as_rule() {
                    Rule::not => Ok(Expr::Unary(UnaryOp::Not, Box::new(rhs))),
                    Rule::neg => Ok(Expr::Unary(UnaryOp::Neg, Box::new(rhs))),
                    Rule::pos => Ok(Expr::Unary(UnaryOp::Pos, Box::new(rhs))),
                    Rule::pre_inc | Rule::pre_dec => self.update_expr(op, rhs, true),
                    _ => unreachable!("unexpected prefix: {:?}", op.as_rule()),
                }
            })
            .map_postfix(|lhs, op| {
                let lhs = lhs?;
                match op.as_rule() {
                    Rule::index => {
                        let index =
                            self.parse_expr(op.into_inner().next().unwrap().into_inner())?;
                        Ok(Expr::Index(Box::new(lhs), Box::new(index)))
                    }
                    Rule::post_inc | Rule::post_dec => self.update_expr(op, lhs, false),
                    _ => unreachable!("unexpected postfix: {:?}", op.as_rule()),
                }
            })
            .map_infix(|lhs, op, rhs| {
                let (lhs, rhs) = (lhs?, rhs?);
                Ok(match op.as_rule() {
                    Rule::assign => Expr::Assign {
                        left: Box::new(lhs),
                        right: Box::new(rhs),
                    },
                    Rule::lor => Expr::Or(Box::new(lhs), Box::new(rhs)),
                    Rule::land => Expr::And(Box::new(lhs), Box::new(rhs)),
                    other => {
                        let op = match other {
                            Rule::add => BinaryOp::Add,
                            Rule::sub => BinaryOp::Sub,
                            Rule::mul => BinaryOp::Mul,
                            Rule::div => BinaryOp::Div,
                            Rule::modulus => BinaryOp::Mod,
                            Rule::lt => BinaryOp::Lt,
                            Rule::gt => BinaryOp::Gt,
                            Rule::lte => BinaryOp::LtE,
                            Rule::gte => BinaryOp::GtE,
                            Rule::eq => BinaryOp::Eq,
                            Rule::neq => BinaryOp::NEq,
                            Rule::strict_eq => BinaryOp::StrictEq,
                            Rule::strict_neq => BinaryOp::StrictNEq,
                            Rule::bitand => BinaryOp::BitAnd,
                            Rule::bitor => BinaryOp::BitOr,
                            Rule::bitxor => BinaryOp::BitXor,
                            _ => unreachable!("unexpected infix: {other:?}"),
                        };
                        Expr::Binary(op, Box::new(lhs), Box::new(rhs))
                    }
                })
            })
            .parse(pairs)
    }

    fn update_expr(&self, op: Pair<Rule>, target: Expr, prefix: bool) -> Result<Expr, ParseError> {
        let update = match op.as_rule() {
            Rule::pre_inc | Rule::post_inc => UpdateOp::Inc,
            _ => UpdateOp::Dec,
        };
        let (line, _) = op.line_col();
        let Expr::Id(name) = target else {
            return Err(ParseError::InvalidUpdateTarget {
                line,
                op: update.to_string(),
                found: unparse_expr(&target),
            });
        };
        Ok(Expr::Update {
            op: update,
            prefix,
            target: name,
        })
    }

    fn parse_atom(&self, pair: Pair<Rule>) -> Result<Expr, ParseError> {
        match pair.as_rule() {
            Rule::ident => Ok(Expr::Id(pair.as_str().to_string())),
            Rule::integer => {
                let text = pair.as_str();
                match text.parse::<i64>() {
                    Ok(i) => Ok(Expr::Value(Literal::Int(i))),
                    Err(e) => {
                        let (line, column) = pair.line_col();
                        Err(ParseError::Syntax {
                            line,
                            column,
                            context: text.to_string(),
                            message: format!("invalid integer literal: {e}"),
                        })
                    }
                }
            }
            Rule::float => {
                let text = pair.as_str().to_string();
                match text.parse::<f64>() {
                    Ok(value) => Ok(Expr::Value(Literal::Float { text, value })),
                    Err(e) => {
                        let (line, column) = pair.line_col();
                        Err(ParseError::Syntax {
                            line,
                            column,
                            context: text,
                            message: format!("invalid float literal: {e}"),
                        })
                    }
                }
            }
            Rule::string => {
                let text = pair.as_str().to_string();
                let value = text[1..text.len() - 1].to_string();
                Ok(Expr::Value(Literal::Str { text, value }))
            }
            Rule::boolean => Ok(Expr::Value(Literal::Bool(pair.as_str() == "true"))),
            _ => unreachable!("unexpected atom: {:?}", pair.as_rule()),
        }
    }
}

pub fn parse_program(source: &str) -> Result<Program, ParseError> {
    let mut pairs = match ScriptParser::parse(Rule::program, source) {
        Ok(pairs) => pairs,
        Err(e) => return Err(lower_pest_error(e)),
    };
    let program = pairs.next().unwrap();
    TreeTransformer.transform_program(program.into_inner())
}

/// Parse a free-standing expression. The renderer re-parses substituted
/// condition texts through this when deciding whether a condition folds to a
/// literal boolean.
pub fn parse_expression(source: &str) -> Result<Expr, ParseError> {
    let mut pairs = match ScriptParser::parse(Rule::expression_input, source) {
        Ok(pairs) => pairs,
        Err(e) => return Err(lower_pest_error(e)),
    };
    let input = pairs.next().unwrap();
    let expr = input.into_inner().next().unwrap();
    TreeTransformer.parse_expr(expr.into_inner())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use unindent::unindent;

    use crate::ast::{
        BinaryOp, DeclKind, Expr, ForInit, Literal, StmtNode, UnaryOp, UpdateOp,
    };
    use crate::parse::{ParseError, parse_expression, parse_program};

    #[test]
    fn test_declaration_with_two_declarators() {
        let program = parse_program("let x = 1, y;").unwrap();
        assert_eq!(program.body.len(), 1);
        let StmtNode::Decl { kind, declarators } = &program.body[0].node else {
            panic!("expected a declaration, got {:?}", program.body[0].node);
        };
        assert_eq!(*kind, DeclKind::Let);
        assert_eq!(declarators.len(), 2);
        assert_eq!(declarators[0].name, "x");
        assert_eq!(
            declarators[0].init,
            Some(Expr::Value(Literal::Int(1)))
        );
        assert_eq!(declarators[1].name, "y");
        assert_eq!(declarators[1].init, None);
    }

    #[test]
    fn test_function_params_and_body() {
        let program = parse_program(&unindent(
            r#"
            function func(x, y){
              return x;
            }
            "#,
        ))
        .unwrap();
        let StmtNode::Function { name, params, body } = &program.body[0].node else {
            panic!("expected a function");
        };
        assert_eq!(name, "func");
        assert_eq!(params, &["x".to_string(), "y".to_string()]);
        let StmtNode::Block(statements) = &body.node else {
            panic!("expected a block body");
        };
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0].node, StmtNode::Return(Some(_))));
    }

    #[test]
    fn test_multiplication_binds_tighter_than_addition() {
        let expr = parse_expression("1 + 2 * 3").unwrap();
        let Expr::Binary(BinaryOp::Add, left, right) = expr else {
            panic!("expected addition at the root, got {expr:?}");
        };
        assert_eq!(*left, Expr::Value(Literal::Int(1)));
        assert!(matches!(*right, Expr::Binary(BinaryOp::Mul, _, _)));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let expr = parse_expression("a = b = 1").unwrap();
        let Expr::Assign { left, right } = expr else {
            panic!("expected an assignment");
        };
        assert_eq!(*left, Expr::Id("a".to_string()));
        assert!(matches!(*right, Expr::Assign { .. }));
    }

    #[test]
    fn test_strict_equality_is_not_two_tokens() {
        let expr = parse_expression("a === b").unwrap();
        assert!(matches!(expr, Expr::Binary(BinaryOp::StrictEq, _, _)));
        let expr = parse_expression("a !== b").unwrap();
        assert!(matches!(expr, Expr::Binary(BinaryOp::StrictNEq, _, _)));
    }

    #[test]
    fn test_updates_prefix_and_postfix() {
        assert_eq!(
            parse_expression("x++").unwrap(),
            Expr::Update {
                op: UpdateOp::Inc,
                prefix: false,
                target: "x".to_string()
            }
        );
        assert_eq!(
            parse_expression("--x").unwrap(),
            Expr::Update {
                op: UpdateOp::Dec,
                prefix: true,
                target: "x".to_string()
            }
        );
    }

    #[test]
    fn test_update_of_non_identifier_is_rejected() {
        let err = parse_expression("arr[0]++").unwrap_err();
        assert!(matches!(err, ParseError::InvalidUpdateTarget { .. }));
    }

    #[test]
    fn test_unary_and_index_chain() {
        let expr = parse_expression("!arr[i][0]").unwrap();
        let Expr::Unary(UnaryOp::Not, operand) = expr else {
            panic!("expected a negation");
        };
        let Expr::Index(base, _) = *operand else {
            panic!("expected an index");
        };
        assert!(matches!(*base, Expr::Index(_, _)));
    }

    #[test]
    fn test_else_if_chain_flattens_to_arms() {
        let program = parse_program(&unindent(
            r#"
            if (x > 0)
              y = 1;
            else if (x > 1)
              y = 2;
            else
              y = 3;
            "#,
        ))
        .unwrap();
        let StmtNode::If { arms, otherwise } = &program.body[0].node else {
            panic!("expected an if statement");
        };
        assert_eq!(arms.len(), 2);
        // The continuation arm is located at its `else` keyword.
        assert_eq!(arms[0].span.line, 1);
        assert_eq!(arms[1].span.line, 3);
        assert_eq!(otherwise.as_ref().unwrap().span.line, 5);
    }

    #[test]
    fn test_keyword_needs_a_break_before_identifier() {
        // `returnx` is an identifier, not `return x`.
        let program = parse_program("returnx;").unwrap();
        assert!(matches!(
            program.body[0].node,
            StmtNode::Expr(Expr::Id(_))
        ));
    }

    #[test]
    fn test_for_with_declaration_init() {
        let program = parse_program("for (let i = 0; i < 3; i++) x = i;").unwrap();
        let StmtNode::For {
            init, test, update, ..
        } = &program.body[0].node
        else {
            panic!("expected a for statement");
        };
        assert!(matches!(init, Some(ForInit::Decl { .. })));
        assert!(matches!(test, Some(Expr::Binary(BinaryOp::Lt, _, _))));
        assert!(matches!(update, Some(Expr::Update { .. })));
    }

    #[test]
    fn test_do_while_test_position() {
        let program = parse_program(&unindent(
            r#"
            do
              x = x + 1;
            while (x < 10);
            "#,
        ))
        .unwrap();
        let StmtNode::DoWhile { test_span, .. } = &program.body[0].node else {
            panic!("expected a do-while statement");
        };
        assert_eq!(test_span.line, 3);
        assert_eq!(test_span.column, 1);
    }

    #[test]
    fn test_comments_are_skipped() {
        let program = parse_program("let x = 1; // trailing\n/* block */ let y = 2;").unwrap();
        assert_eq!(program.body.len(), 2);
    }

    #[test]
    fn test_syntax_error_carries_position() {
        let err = parse_program("function (){}").unwrap_err();
        let ParseError::Syntax { line, column, .. } = err else {
            panic!("expected a syntax error, got {err:?}");
        };
        assert_eq!(line, 1);
        assert!(column >= 1);
    }

    #[test]
    fn test_syntax_error_message_shows_the_offending_line() {
        let err = parse_program("let x = 0;\nlet y = ;").unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.contains("line 2"), "got: {rendered}");
        assert!(rendered.contains("`let y = ;`"), "got: {rendered}");
    }

    #[test]
    fn test_block_span_covers_both_braces() {
        let program = parse_program("function f(){\n}").unwrap();
        let StmtNode::Function { body, .. } = &program.body[0].node else {
            panic!("expected a function");
        };
        assert_eq!(body.span.line, 1);
        assert_eq!(body.span.column, 13);
        assert_eq!(body.span.end_line, 2);
        assert_eq!(body.span.end_column, 2);
    }
}
