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

//! Control-flow regions. Every conditional arm and loop body entered during
//! a render run opens a region; bindings recorded inside it carry the open
//! region chain, and the resolver later consults the registry to decide
//! whether such a binding can reach a given use site.

use std::collections::HashMap;

/// Regions are identified by the source line of their introducing keyword.
pub type RegionId = usize;

/// The chain of regions currently open, oldest first.
#[derive(Debug, Default)]
pub struct ConditionStack {
    stack: Vec<RegionId>,
}

impl ConditionStack {
    pub fn push(&mut self, region: RegionId) {
        self.stack.push(region);
    }

    pub fn pop(&mut self) {
        self.stack.pop();
    }

    /// Copy of the current chain. Bindings capture this at record time and
    /// must not observe later pushes or pops.
    pub fn snapshot(&self) -> Vec<RegionId> {
        self.stack.clone()
    }

    pub fn as_slice(&self) -> &[RegionId] {
        &self.stack
    }
}

/// Registry of every region entered during one run, with else/else-if arms
/// linked into sibling chains as they are visited.
#[derive(Debug, Default)]
pub struct RegionRegistry {
    chains: Vec<Vec<RegionId>>,
    membership: HashMap<RegionId, usize>,
}

impl RegionRegistry {
    /// Open a fresh region with no siblings: a bare `if` arm or a loop body.
    pub fn declare(&mut self, region: RegionId) {
        let chain = self.chains.len();
        self.chains.push(vec![region]);
        self.membership.insert(region, chain);
    }

    /// Open a region continuing an if ladder (`else if` / `else`). It is
    /// mutually exclusive with every arm already in the predecessor's chain.
    pub fn declare_continuation(&mut self, region: RegionId, predecessor: RegionId) {
        match self.membership.get(&predecessor) {
            Some(&chain) => {
                self.chains[chain].push(region);
                self.membership.insert(region, chain);
            }
            None => self.declare(region),
        }
    }

    /// Whether a region recorded on a binding but absent from the current
    /// stack still lets the binding through: true when the region belongs to
    /// a multi-arm ladder none of whose arms is currently open. The ladder
    /// has closed, and exactly one of its arms ran, so its bindings are
    /// reachable at the use site. Single-arm `if`s and loop bodies never
    /// qualify.
    pub fn is_excludable(&self, region: RegionId, current: &[RegionId]) -> bool {
        let Some(&chain) = self.membership.get(&region) else {
            return false;
        };
        let chain = &self.chains[chain];
        chain.len() >= 2 && chain.iter().all(|arm| !current.contains(arm))
    }
}
