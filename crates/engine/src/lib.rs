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

//! The symbolic substitution engine. `run` re-renders a program with every
//! non-input variable replaced by its most recent known value and with
//! branch conditions that fold to a literal tagged true or false; `items`
//! flattens a program into its substitution-free row view.

mod bindings;
mod eval;
mod items;
mod regions;
mod render;

pub use crate::bindings::{Binding, BindingStore, Rendered};
pub use crate::eval::{Lookup, MAX_EVAL_DEPTH, NoBindings, Tag, Value, evaluate};
pub use crate::items::{Item, ItemKind, items};
pub use crate::regions::{ConditionStack, RegionId, RegionRegistry};
pub use crate::render::{
    EngineError, RenderError, RenderOptions, RenderedLine, SeedBinding, SymbolTable, run,
    run_with_options,
};
