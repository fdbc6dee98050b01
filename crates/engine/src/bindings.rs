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

//! Per-variable binding histories and the resolver that picks which recorded
//! value represents a variable at a given use site.

use std::collections::HashMap;

use itertools::Itertools;
use tracing::trace;

use crate::regions::{RegionId, RegionRegistry};

/// An already-substituted value as it will appear in the output. Arrays keep
/// their elements apart so indexed reads can fold to a single element.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Rendered {
    Scalar(String),
    Array(Vec<String>),
}

impl Rendered {
    pub fn display(&self) -> String {
        match self {
            Rendered::Scalar(text) => text.clone(),
            Rendered::Array(elements) => format!("[{}]", elements.iter().join(",")),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Binding {
    pub line: usize,
    /// Region chain open when the binding was recorded.
    pub conditions: Vec<RegionId>,
    /// `None` records "declared but not initialized".
    pub value: Option<Rendered>,
}

/// Append-only store of every binding recorded during one render run.
#[derive(Debug, Default)]
pub struct BindingStore {
    histories: HashMap<String, Vec<Binding>>,
}

impl BindingStore {
    pub fn record(
        &mut self,
        name: &str,
        line: usize,
        conditions: Vec<RegionId>,
        value: Option<Rendered>,
    ) {
        trace!(name, line, ?conditions, "recording binding");
        self.histories
            .entry(name.to_string())
            .or_default()
            .push(Binding {
                line,
                conditions,
                value,
            });
    }

    /// Every binding recorded for `name`, in record order. Empty for names
    /// never assigned; resolution then leaves the identifier symbolic.
    pub fn history(&self, name: &str) -> &[Binding] {
        self.histories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The value representing `name` at a use site. A binding is eligible
    /// when every region it was recorded under is either still open at the
    /// use site or belongs to a closed multi-arm ladder. Among eligible
    /// bindings the one closest by line distance wins, later-recorded on a
    /// tie. An eligible but uninitialized winner resolves to `None`.
    pub fn resolve(
        &self,
        name: &str,
        line: usize,
        conditions: &[RegionId],
        regions: &RegionRegistry,
    ) -> Option<&Rendered> {
        self.resolve_bounded(name, line, usize::MAX, conditions, regions)
    }

    /// Resolution for condition coloring. When a condition is tested, only
    /// assignments at or before its line can have executed, so bindings
    /// recorded further down (including ones inside the arms the header
    /// guards) are not candidates.
    pub fn resolve_executed(
        &self,
        name: &str,
        line: usize,
        conditions: &[RegionId],
        regions: &RegionRegistry,
    ) -> Option<&Rendered> {
        self.resolve_bounded(name, line, line, conditions, regions)
    }

    fn resolve_bounded(
        &self,
        name: &str,
        line: usize,
        latest: usize,
        conditions: &[RegionId],
        regions: &RegionRegistry,
    ) -> Option<&Rendered> {
        let mut best: Option<&Binding> = None;
        let mut best_distance = usize::MAX;
        for binding in self.history(name) {
            if binding.line > latest {
                continue;
            }
            let eligible = binding.conditions.iter().all(|&region| {
                conditions.contains(&region) || regions.is_excludable(region, conditions)
            });
            if !eligible {
                continue;
            }
            let distance = line.abs_diff(binding.line);
            if distance <= best_distance {
                best = Some(binding);
                best_distance = distance;
            }
        }
        best?.value.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use crate::bindings::{BindingStore, Rendered};
    use crate::regions::RegionRegistry;

    fn scalar(text: &str) -> Option<Rendered> {
        Some(Rendered::Scalar(text.to_string()))
    }

    #[test]
    fn test_closest_binding_wins() {
        let mut store = BindingStore::default();
        store.record("x", 1, vec![], scalar("1"));
        store.record("x", 8, vec![], scalar("8"));
        let regions = RegionRegistry::default();
        assert_eq!(store.resolve("x", 3, &[], &regions), scalar("1").as_ref());
        assert_eq!(store.resolve("x", 7, &[], &regions), scalar("8").as_ref());
    }

    #[test]
    fn test_later_recorded_wins_a_distance_tie() {
        let mut store = BindingStore::default();
        store.record("x", 4, vec![], scalar("first"));
        store.record("x", 6, vec![], scalar("second"));
        let regions = RegionRegistry::default();
        assert_eq!(
            store.resolve("x", 5, &[], &regions),
            scalar("second").as_ref()
        );
    }

    #[test]
    fn test_conditional_binding_confined_to_its_region() {
        let mut store = BindingStore::default();
        store.record("x", 2, vec![], scalar("outer"));
        store.record("x", 4, vec![3], scalar("inner"));
        let mut regions = RegionRegistry::default();
        regions.declare(3);
        // Inside the arm the conditional binding is nearest and eligible.
        assert_eq!(
            store.resolve("x", 5, &[3], &regions),
            scalar("inner").as_ref()
        );
        // After the single-arm if closes it cannot escape.
        assert_eq!(
            store.resolve("x", 6, &[], &regions),
            scalar("outer").as_ref()
        );
    }

    #[test]
    fn test_closed_ladder_binding_escapes() {
        let mut store = BindingStore::default();
        store.record("a", 2, vec![], scalar("0"));
        store.record("a", 4, vec![3], scalar("1"));
        store.record("a", 6, vec![5], scalar("2"));
        let mut regions = RegionRegistry::default();
        regions.declare(3);
        regions.declare_continuation(5, 3);
        // Past the ladder, the closest escaping arm binding wins.
        assert_eq!(store.resolve("a", 7, &[], &regions), scalar("2").as_ref());
        // Inside one arm, the sibling arm's binding stays invisible.
        assert_eq!(store.resolve("a", 4, &[3], &regions), scalar("1").as_ref());
    }

    #[test]
    fn test_executed_resolution_ignores_later_bindings() {
        let mut store = BindingStore::default();
        store.record("x", 1, vec![], scalar("1"));
        store.record("x", 4, vec![3], scalar("10"));
        let mut regions = RegionRegistry::default();
        regions.declare(3);
        regions.declare_continuation(5, 3);
        // At the header line only the earlier binding has run, even though
        // the closed-ladder rule would let the arm binding escape.
        assert_eq!(
            store.resolve_executed("x", 3, &[], &regions),
            scalar("1").as_ref()
        );
        assert_eq!(store.resolve("x", 3, &[], &regions), scalar("10").as_ref());
    }

    #[test]
    fn test_uninitialized_winner_resolves_to_nothing() {
        let mut store = BindingStore::default();
        store.record("y", 3, vec![], None);
        let regions = RegionRegistry::default();
        assert_eq!(store.resolve("y", 4, &[], &regions), None);
        assert_eq!(store.history("y").len(), 1);
    }

    #[test]
    fn test_unknown_name_has_empty_history() {
        let store = BindingStore::default();
        let regions = RegionRegistry::default();
        assert!(store.history("missing").is_empty());
        assert_eq!(store.resolve("missing", 1, &[], &regions), None);
    }

    #[test]
    fn test_array_display_is_compact() {
        let value = Rendered::Array(vec!["1".to_string(), "2".to_string(), "3".to_string()]);
        assert_eq!(value.display(), "[1,2,3]");
    }
}
