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

//! Frontend for the JS-like imperative subset: pest grammar, AST, parser and
//! a plain (substitution-free) expression printer.

#[macro_use]
extern crate pest_derive;

pub mod ast;
mod parse;
mod precedence;
mod unparse;

pub use crate::parse::{ParseError, parse_expression, parse_program};
pub use crate::precedence::{Precedence, get_precedence};
pub use crate::unparse::unparse_expr;
