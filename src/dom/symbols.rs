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

//! Symbol table resolution and symbol id propagation
//!
//! A node never caches its symbol table. [`Dom::symbol_table`] walks the
//! context chain to the tree's top-level value every time, so re-parenting
//! a subtree can never leave it pointing at a stale table.
//!
//! Resolved symbol ids on tokens are only valid for the table of the tree
//! that holds them. Whenever a subtree changes tree (add, remove, clear) or
//! gets locked, a [`SymbolPropagator`] clear pass first recovers any missing
//! text from the old table and then drops the ids. Codecs run the assign
//! pass through [`Dom::populate_symbol_ids`] right before encoding.

use std::sync::Arc;

use super::Dom;
use crate::error::{IonError, Result};
use crate::model::node::Context;
use crate::model::{SymbolTable, SymbolTableRef, SymbolToken, ValueId, global_interner_stats};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PropagationMode {
    Assign,
    Clear,
}

/// Subtree walker that assigns or clears resolved symbol ids
#[derive(Debug, Clone)]
pub struct SymbolPropagator {
    mode: PropagationMode,
    table: SymbolTableRef,
}

impl SymbolPropagator {
    /// Pass assigning an id to every token with known text, interning into
    /// `table` as needed
    pub fn assign(table: SymbolTableRef) -> Self {
        Self {
            mode: PropagationMode::Assign,
            table,
        }
    }

    /// Pass recovering missing text from `table` and then dropping ids
    pub fn clear(table: SymbolTableRef) -> Self {
        Self {
            mode: PropagationMode::Clear,
            table,
        }
    }

    /// Walk the subtree rooted at `root`, returning the number of nodes
    /// visited
    ///
    /// Read-only subtrees are skipped: locked nodes hold no ids.
    pub fn run(&self, dom: &mut Dom, root: ValueId) -> Result<usize> {
        match self.mode {
            PropagationMode::Assign => {
                let mut table = self.table.write();
                Self::walk(dom, root, |token| {
                    if let Some(text) = token.text() {
                        let sid = table.intern(text)?;
                        token.set_sid(sid);
                    }
                    Ok(())
                })
            }
            PropagationMode::Clear => {
                let table = self.table.read();
                Self::walk(dom, root, |token| {
                    token.clear_sid(Some(&*table));
                    Ok(())
                })
            }
        }
    }

    fn walk(
        dom: &mut Dom,
        root: ValueId,
        mut visit: impl FnMut(&mut SymbolToken) -> Result<()>,
    ) -> Result<usize> {
        let mut visited = 0;
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let node = dom.node_mut(id)?;
            if node.is_read_only() {
                continue;
            }
            let mut outcome = Ok(());
            node.for_each_token_mut(|token| {
                if outcome.is_ok() {
                    outcome = visit(token);
                }
            });
            outcome?;
            if let Some(children) = node.children() {
                stack.extend(children.ids());
            }
            visited += 1;
        }
        Ok(visited)
    }
}

impl Dom {
    /// The symbol table governing `id`, found by delegating up the
    /// context chain to the tree's top-level value
    pub fn symbol_table(&self, id: ValueId) -> Result<SymbolTableRef> {
        let top = self.top_level(id)?;
        match &self.node(top)?.context {
            Context::TopLevel { symbols } => Ok(Arc::clone(symbols)),
            Context::Nested { .. } => unreachable!("top_level returned a nested value"),
        }
    }

    /// Replace the table of a top-level value
    ///
    /// Ids resolved against the previous table are cleared first.
    pub fn set_symbol_table(&mut self, id: ValueId, table: SymbolTableRef) -> Result<()> {
        let node = self.check_mutable(id)?;
        if node.context.container().is_some() {
            return Err(IonError::ContainedValue);
        }
        self.clear_symbol_ids(id)?;
        self.node_mut(id)?.context = Context::TopLevel { symbols: table };
        Ok(())
    }

    /// Make sure the tree holding `id` is governed by a local table
    ///
    /// A tree still on the shared system table gets a fresh local table.
    /// Locked trees keep whatever they have.
    pub fn ensure_local_symbol_table(&mut self, id: ValueId) -> Result<SymbolTableRef> {
        let top = self.top_level(id)?;
        let current = self.symbol_table(top)?;
        if current.read().is_local() || self.node(top)?.is_read_only() {
            return Ok(current);
        }
        let local = SymbolTable::new_local_ref();
        self.node_mut(top)?.context = Context::TopLevel {
            symbols: Arc::clone(&local),
        };
        log::debug!("created local symbol table for tree rooted at {top}");
        Ok(local)
    }

    /// Assign symbol ids throughout the subtree at `id`, interning unknown
    /// text into the tree's local table
    pub fn populate_symbol_ids(&mut self, id: ValueId) -> Result<SymbolTableRef> {
        let table = self.ensure_local_symbol_table(id)?;
        let visited = SymbolPropagator::assign(Arc::clone(&table)).run(self, id)?;
        log::trace!(
            "assigned symbol ids across {visited} value(s) under {id}; max id {}, {} interned spelling(s)",
            table.read().max_id(),
            global_interner_stats().entries
        );
        Ok(table)
    }

    pub(crate) fn clear_symbol_ids(&mut self, root: ValueId) -> Result<usize> {
        let table = self.symbol_table(root)?;
        self.clear_symbol_ids_with(root, &table)
    }

    pub(crate) fn clear_symbol_ids_with(
        &mut self,
        root: ValueId,
        table: &SymbolTableRef,
    ) -> Result<usize> {
        SymbolPropagator::clear(Arc::clone(table)).run(self, root)
    }
}
