// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The value arena
//!
//! [`Dom`] owns every value node. Callers hold [`ValueId`] handles and
//! perform all reads and mutations through the arena, which keeps the
//! tree-shape invariants in one place:
//!
//! * a contained node's element index equals its slot in the parent,
//! * a node has at most one container,
//! * a read-only container has only read-only descendants.

mod annotations;
mod container;
mod copy;
pub mod cursor;
mod factory;
mod read_only;
mod structs;
pub mod symbols;

use crate::config::DomConfig;
use crate::error::{IonError, Result};
use crate::model::node::{Content, Context, ValueNode};
use crate::model::{IonType, Scalar, ValueId};

pub use cursor::{Children, Cursor};
pub use symbols::SymbolPropagator;

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<ValueNode>,
}

/// Arena owning a forest of value trees
#[derive(Debug)]
pub struct Dom {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
    config: DomConfig,
}

impl Default for Dom {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom {
    /// Create an arena with the default configuration
    pub fn new() -> Self {
        Self::with_config(DomConfig::default())
    }

    /// Create an arena with a custom configuration
    pub fn with_config(config: DomConfig) -> Self {
        Self {
            slots: Vec::with_capacity(config.initial_arena_capacity),
            free: Vec::new(),
            live: 0,
            config,
        }
    }

    /// Active configuration
    pub fn config(&self) -> &DomConfig {
        &self.config
    }

    /// Number of live nodes in the arena
    pub fn live_count(&self) -> usize {
        self.live
    }

    /// Check if `id` refers to a live node
    pub fn contains(&self, id: ValueId) -> bool {
        self.node(id).is_ok()
    }

    pub(crate) fn alloc(&mut self, node: ValueNode) -> ValueId {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            return ValueId::new(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        ValueId::new(index, 0)
    }

    pub(crate) fn node(&self, id: ValueId) -> Result<&ValueNode> {
        self.slots
            .get(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_ref())
            .ok_or(IonError::StaleHandle {
                index: id.index(),
                generation: id.generation(),
            })
    }

    pub(crate) fn node_mut(&mut self, id: ValueId) -> Result<&mut ValueNode> {
        self.slots
            .get_mut(id.index() as usize)
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.node.as_mut())
            .ok_or(IonError::StaleHandle {
                index: id.index(),
                generation: id.generation(),
            })
    }

    /// Free the slot of a single node; children are not touched
    fn free_slot(&mut self, id: ValueId) {
        if let Some(slot) = self.slots.get_mut(id.index() as usize) {
            if slot.generation == id.generation() && slot.node.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index());
                self.live -= 1;
            }
        }
    }

    /// Release an unattached value and its whole subtree
    ///
    /// Handles to any node of the subtree become stale.
    pub fn discard(&mut self, id: ValueId) -> Result<()> {
        if self.node(id)?.context.container().is_some() {
            return Err(IonError::ContainedValue);
        }
        let subtree = self.subtree_post_order(id)?;
        for node in &subtree {
            self.free_slot(*node);
        }
        log::trace!("discarded {} node(s) rooted at {id}", subtree.len());
        Ok(())
    }

    /// Every node under `root` (inclusive), children before parents
    pub(crate) fn subtree_post_order(&self, root: ValueId) -> Result<Vec<ValueId>> {
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = self.node(id)?;
            order.push(id);
            if let Some(children) = node.children() {
                stack.extend(children.ids());
            }
        }
        order.reverse();
        Ok(order)
    }

    /// Type of the value
    pub fn ion_type(&self, id: ValueId) -> Result<IonType> {
        Ok(self.node(id)?.ion_type)
    }

    /// Check if the value is null (a container can be null or empty)
    pub fn is_null_value(&self, id: ValueId) -> Result<bool> {
        Ok(self.node(id)?.is_null)
    }

    /// Check if the value is locked
    pub fn is_read_only(&self, id: ValueId) -> Result<bool> {
        Ok(self.node(id)?.is_read_only())
    }

    /// Check if the value is a datagram
    pub fn is_datagram(&self, id: ValueId) -> Result<bool> {
        Ok(self.node(id)?.ion_type == IonType::Datagram)
    }

    /// Owning container, or `None` for a top-level value
    pub fn container(&self, id: ValueId) -> Result<Option<ValueId>> {
        Ok(self.node(id)?.context.container())
    }

    /// Position among siblings, or `None` for a top-level value
    pub fn element_index(&self, id: ValueId) -> Result<Option<usize>> {
        let node = self.node(id)?;
        Ok(node.context.container().map(|_| node.element_index))
    }

    /// The outermost container of the tree holding `id` (or `id` itself)
    pub fn top_level(&self, id: ValueId) -> Result<ValueId> {
        let mut current = id;
        loop {
            match &self.node(current)?.context {
                Context::Nested { container } => current = *container,
                Context::TopLevel { .. } => return Ok(current),
            }
        }
    }

    /// Scalar payload; `None` when the value is null
    pub fn scalar(&self, id: ValueId) -> Result<Option<&Scalar>> {
        let node = self.node(id)?;
        match &node.content {
            Content::Scalar(value) => Ok(value.as_ref()),
            Content::Container(_) => Err(IonError::Unsupported {
                operation: "scalar",
                ion_type: node.ion_type,
            }),
        }
    }

    pub(crate) fn check_mutable(&self, id: ValueId) -> Result<&ValueNode> {
        let node = self.node(id)?;
        if node.is_read_only() {
            return Err(IonError::ReadOnlyValue);
        }
        Ok(node)
    }

    /// Audit element indices and back-references of a container's children
    ///
    /// Only runs when `verify_invariants` is set. A failure is an
    /// implementation bug and aborts.
    pub(crate) fn audit_indices(&self, container: ValueId) {
        if !self.config.verify_invariants {
            return;
        }
        let Ok(node) = self.node(container) else {
            panic!("invariant violation: audited container {container} is not live");
        };
        let Some(children) = node.children() else {
            return;
        };
        if node.is_null {
            assert!(
                children.len() == 0 && children.capacity() == 0,
                "invariant violation: null container {container} has backing storage"
            );
        }
        for (position, child) in children.ids().enumerate() {
            let Ok(child_node) = self.node(child) else {
                panic!("invariant violation: container {container} holds stale child {child}");
            };
            assert_eq!(
                child_node.element_index, position,
                "invariant violation: child {child} of {container} has element index {} at slot {position}",
                child_node.element_index
            );
            assert_eq!(
                child_node.context.container(),
                Some(container),
                "invariant violation: child {child} does not point back at {container}"
            );
        }
    }
}
