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

//! Literal evaluation of substituted condition texts. A condition whose
//! every leaf resolves to a literal folds to a value and tags its line;
//! anything unresolved leaves the line untagged. Semantics follow the source
//! language: truthiness, int-to-float promotion, `/` always producing a
//! float, loose equality coercing across numeric variants and strict
//! equality not crossing into strings or booleans.

use gloss_syntax::ast::{BinaryOp, Expr, Literal, UnaryOp};

/// Ceiling on re-resolution through recorded binding texts. A binding whose
/// value refers back to itself (`x = x + 1` recorded under a loop) would
/// otherwise recurse forever; hitting the ceiling leaves the condition
/// untagged.
pub const MAX_EVAL_DEPTH: usize = 32;

/// Verdict attached to an output line.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Tag {
    None,
    True,
    False,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Str(String),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0 && !f.is_nan(),
            Value::Bool(b) => *b,
            Value::Str(s) => !s.is_empty(),
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Bool(b) => Some(*b as i64),
            _ => None,
        }
    }

    fn as_float(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::Bool(b) => Some(*b as i64 as f64),
            _ => None,
        }
    }
}

/// Resolution of identifiers and indexed reads during evaluation. The
/// colorizer supplies one backed by the binding store; `NoBindings` resolves
/// nothing, folding only pure literal expressions.
pub trait Lookup {
    fn scalar(&self, name: &str, depth: usize) -> Option<Value>;
    fn element(&self, name: &str, index: usize, depth: usize) -> Option<Value>;
}

pub struct NoBindings;

impl Lookup for NoBindings {
    fn scalar(&self, _name: &str, _depth: usize) -> Option<Value> {
        None
    }

    fn element(&self, _name: &str, _index: usize, _depth: usize) -> Option<Value> {
        None
    }
}

pub fn evaluate(expr: &Expr, lookup: &dyn Lookup, depth: usize) -> Option<Value> {
    if depth > MAX_EVAL_DEPTH {
        return None;
    }
    match expr {
        Expr::Value(literal) => Some(match literal {
            Literal::Int(i) => Value::Int(*i),
            Literal::Float { value, .. } => Value::Float(*value),
            Literal::Str { value, .. } => Value::Str(value.clone()),
            Literal::Bool(b) => Value::Bool(*b),
        }),
        Expr::Id(name) => lookup.scalar(name, depth),
        Expr::Unary(op, operand) => {
            let operand = evaluate(operand, lookup, depth)?;
            match op {
                UnaryOp::Not => Some(Value::Bool(!operand.is_truthy())),
                UnaryOp::Neg => match operand {
                    Value::Int(i) => Some(Value::Int(i.checked_neg()?)),
                    Value::Float(f) => Some(Value::Float(-f)),
                    Value::Bool(b) => Some(Value::Int(-(b as i64))),
                    Value::Str(_) => None,
                },
                UnaryOp::Pos => match operand {
                    Value::Int(_) | Value::Float(_) => Some(operand),
                    Value::Bool(b) => Some(Value::Int(b as i64)),
                    Value::Str(_) => None,
                },
            }
        }
        // Conjunction and disjunction return an operand value, not a
        // boolean, and short-circuit: `1 || x` folds with `x` unresolved.
        Expr::And(left, right) => {
            let left = evaluate(left, lookup, depth)?;
            if left.is_truthy() {
                evaluate(right, lookup, depth)
            } else {
                Some(left)
            }
        }
        Expr::Or(left, right) => {
            let left = evaluate(left, lookup, depth)?;
            if left.is_truthy() {
                Some(left)
            } else {
                evaluate(right, lookup, depth)
            }
        }
        Expr::Binary(op, left, right) => {
            let left = evaluate(left, lookup, depth)?;
            let right = evaluate(right, lookup, depth)?;
            binary_op(*op, &left, &right)
        }
        Expr::Index(base, index) => {
            let Expr::Id(name) = &**base else {
                return None;
            };
            let Value::Int(i) = evaluate(index, lookup, depth)? else {
                return None;
            };
            let index = usize::try_from(i).ok()?;
            lookup.element(name, index, depth)
        }
        Expr::Array(_) | Expr::Update { .. } | Expr::Assign { .. } => None,
    }
}

fn binary_op(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    match op {
        BinaryOp::Add => match (left, right) {
            (Value::Str(a), Value::Str(b)) => Some(Value::Str(format!("{a}{b}"))),
            _ => arith(left, right, i64::checked_add, |a, b| a + b),
        },
        BinaryOp::Sub => arith(left, right, i64::checked_sub, |a, b| a - b),
        BinaryOp::Mul => arith(left, right, i64::checked_mul, |a, b| a * b),
        // Division always promotes; dividing by zero stays unresolved.
        BinaryOp::Div => {
            let (a, b) = (left.as_float()?, right.as_float()?);
            if b == 0.0 { None } else { Some(Value::Float(a / b)) }
        }
        BinaryOp::Mod => {
            let (a, b) = (left.as_int()?, right.as_int()?);
            a.checked_rem(b).map(Value::Int)
        }
        BinaryOp::BitAnd => Some(Value::Int(left.as_int()? & right.as_int()?)),
        BinaryOp::BitOr => Some(Value::Int(left.as_int()? | right.as_int()?)),
        BinaryOp::BitXor => Some(Value::Int(left.as_int()? ^ right.as_int()?)),
        BinaryOp::Lt | BinaryOp::LtE | BinaryOp::Gt | BinaryOp::GtE => compare(op, left, right),
        BinaryOp::Eq => Some(Value::Bool(loose_eq(left, right))),
        BinaryOp::NEq => Some(Value::Bool(!loose_eq(left, right))),
        BinaryOp::StrictEq => Some(Value::Bool(strict_eq(left, right))),
        BinaryOp::StrictNEq => Some(Value::Bool(!strict_eq(left, right))),
    }
}

fn arith(
    left: &Value,
    right: &Value,
    int_op: fn(i64, i64) -> Option<i64>,
    float_op: fn(f64, f64) -> f64,
) -> Option<Value> {
    match (left, right) {
        (Value::Int(_) | Value::Bool(_), Value::Int(_) | Value::Bool(_)) => {
            int_op(left.as_int()?, right.as_int()?).map(Value::Int)
        }
        _ => Some(Value::Float(float_op(left.as_float()?, right.as_float()?))),
    }
}

fn compare(op: BinaryOp, left: &Value, right: &Value) -> Option<Value> {
    let ordering = match (left, right) {
        (Value::Str(a), Value::Str(b)) => a.cmp(b),
        _ => left.as_float()?.partial_cmp(&right.as_float()?)?,
    };
    Some(Value::Bool(match op {
        BinaryOp::Lt => ordering.is_lt(),
        BinaryOp::LtE => ordering.is_le(),
        BinaryOp::Gt => ordering.is_gt(),
        BinaryOp::GtE => ordering.is_ge(),
        _ => unreachable!("not a relational operator: {op:?}"),
    }))
}

fn loose_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        // Mixed numeric variants coerce; strings against numbers do not.
        _ => match (left.as_float(), right.as_float()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
    }
}

fn strict_eq(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Str(a), Value::Str(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Int(_) | Value::Float(_), Value::Int(_) | Value::Float(_)) => {
            left.as_float() == right.as_float()
        }
        _ => false,
    }
}
