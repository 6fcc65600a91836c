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

//! Traversal over the children of a container
//!
//! [`Children`] is a plain borrowing iterator for read-only walks.
//! [`Cursor`] is a detached, bidirectional position that survives
//! mutation of the container between calls: before every positional
//! query it checks that the element it last returned is still where it
//! expects, and re-locates it if the container was changed through some
//! other path. Under [`CursorSyncPolicy::FailFast`] any such change is
//! reported instead.

use std::iter::FusedIterator;

use super::Dom;
use crate::config::CursorSyncPolicy;
use crate::error::{IonError, Result};
use crate::model::ValueId;

/// Borrowing iterator over the children of a container, in slot order
#[derive(Debug, Clone)]
pub struct Children<'a> {
    slots: std::slice::Iter<'a, Option<ValueId>>,
}

impl Iterator for Children<'_> {
    type Item = ValueId;

    fn next(&mut self) -> Option<ValueId> {
        self.slots.next().copied().flatten()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl DoubleEndedIterator for Children<'_> {
    fn next_back(&mut self) -> Option<ValueId> {
        self.slots.next_back().copied().flatten()
    }
}

impl ExactSizeIterator for Children<'_> {}

impl FusedIterator for Children<'_> {}

/// Bidirectional cursor over one container
///
/// The cursor does not borrow the arena; every call takes the [`Dom`]
/// explicitly, so the container may be mutated between calls.
#[derive(Debug, Clone)]
pub struct Cursor {
    container: ValueId,
    /// Index of the element `next` would return
    position: usize,
    /// Element returned by the last `next` or `previous`
    current: Option<ValueId>,
    last_move_was_previous: bool,
    read_only: bool,
    policy: CursorSyncPolicy,
}

impl Dom {
    /// Iterate the children of `container`; empty for a null container
    pub fn children(&self, container: ValueId) -> Result<Children<'_>> {
        let node = self.container_node(container)?;
        let slots: &[Option<ValueId>] = match node.children() {
            Some(children) if !node.is_null => children.live_slots(),
            _ => &[],
        };
        Ok(Children {
            slots: slots.iter(),
        })
    }

    /// Open a read-only cursor before child `index`
    pub fn cursor(&self, container: ValueId, index: usize) -> Result<Cursor> {
        self.open_cursor(container, index, true)
    }

    /// Open a cursor that may remove and insert children
    pub fn cursor_mut(&self, container: ValueId, index: usize) -> Result<Cursor> {
        if self.node(container)?.is_read_only() {
            return Err(IonError::ReadOnlyValue);
        }
        self.open_cursor(container, index, false)
    }

    fn open_cursor(&self, container: ValueId, index: usize, read_only: bool) -> Result<Cursor> {
        let node = self.container_node(container)?;
        let len = self.size(container)?;
        if index > len {
            return Err(IonError::IndexOutOfBounds { index, len });
        }
        Ok(Cursor {
            container,
            position: index,
            current: None,
            last_move_was_previous: false,
            read_only: read_only || node.is_read_only() || node.is_null,
            policy: self.config().cursor_sync,
        })
    }
}

impl Cursor {
    /// Container this cursor walks
    pub fn container(&self) -> ValueId {
        self.container
    }

    /// Whether `remove` and `insert` are refused
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Element returned by the last move, if it has not been removed
    pub fn current(&self) -> Option<ValueId> {
        self.current
    }

    /// Slot the current element is expected at
    fn expected_slot(&self) -> usize {
        if self.last_move_was_previous {
            self.position
        } else {
            self.position.saturating_sub(1)
        }
    }

    fn position_after(&self, slot: usize) -> usize {
        if self.last_move_was_previous {
            slot
        } else {
            slot + 1
        }
    }

    /// Position consistent with the container as it is now
    fn synced_position(&self, dom: &Dom) -> Result<usize> {
        let len = dom.size(self.container)?;
        let Some(current) = self.current else {
            return Ok(self.position.min(len));
        };
        let slot = self.expected_slot();
        if slot < len && dom.get(self.container, slot)? == current {
            return Ok(self.position);
        }
        if self.policy == CursorSyncPolicy::FailFast {
            return Err(IonError::desync(format!(
                "container {} changed outside the cursor",
                self.container
            )));
        }
        match (dom.container(current), dom.element_index(current)) {
            (Ok(Some(owner)), Ok(Some(found))) if owner == self.container => {
                Ok(self.position_after(found))
            }
            _ => Err(IonError::desync(format!(
                "element {current} is no longer a child of {}",
                self.container
            ))),
        }
    }

    /// Re-locate the current element after an outside mutation
    pub fn sync(&mut self, dom: &Dom) -> Result<()> {
        let position = self.synced_position(dom)?;
        if position != self.position {
            log::debug!(
                "cursor over {} resynchronised from {} to {position}",
                self.container,
                self.position
            );
            self.position = position;
        }
        Ok(())
    }

    pub fn has_next(&self, dom: &Dom) -> Result<bool> {
        Ok(self.synced_position(dom)? < dom.size(self.container)?)
    }

    pub fn has_previous(&self, dom: &Dom) -> Result<bool> {
        Ok(self.synced_position(dom)? > 0)
    }

    /// Index of the element `next` would return
    pub fn next_index(&self, dom: &Dom) -> Result<usize> {
        self.synced_position(dom)
    }

    /// Index of the element `previous` would return, `None` at the start
    pub fn previous_index(&self, dom: &Dom) -> Result<Option<usize>> {
        Ok(self.synced_position(dom)?.checked_sub(1))
    }

    /// Advance and return the next element
    pub fn next(&mut self, dom: &Dom) -> Result<ValueId> {
        self.sync(dom)?;
        if self.position >= dom.size(self.container)? {
            return Err(IonError::NoSuchElement);
        }
        let element = dom.get(self.container, self.position)?;
        self.position += 1;
        self.current = Some(element);
        self.last_move_was_previous = false;
        Ok(element)
    }

    /// Step back and return the previous element
    pub fn previous(&mut self, dom: &Dom) -> Result<ValueId> {
        self.sync(dom)?;
        if self.position == 0 {
            return Err(IonError::NoSuchElement);
        }
        self.position -= 1;
        let element = dom.get(self.container, self.position)?;
        self.current = Some(element);
        self.last_move_was_previous = true;
        Ok(element)
    }

    /// Remove the element returned by the last move
    ///
    /// The removed value stays alive, unattached. Later moves behave as if
    /// it had never been there.
    pub fn remove(&mut self, dom: &mut Dom) -> Result<ValueId> {
        if self.read_only {
            return Err(IonError::ReadOnlyValue);
        }
        if self.current.is_none() {
            return Err(IonError::NoCurrentElement);
        }
        self.sync(dom)?;
        let slot = self.expected_slot();
        let removed = dom.remove_at(self.container, slot)?;
        if !self.last_move_was_previous {
            self.position -= 1;
        }
        self.current = None;
        Ok(removed)
    }

    /// Insert `child` before the cursor position
    ///
    /// A following `next` is unaffected; `previous` returns `child`.
    pub fn insert(&mut self, dom: &mut Dom, child: ValueId) -> Result<()> {
        if self.read_only {
            return Err(IonError::ReadOnlyValue);
        }
        self.sync(dom)?;
        dom.insert(self.container, self.position, child)?;
        self.position += 1;
        self.current = None;
        Ok(())
    }
}
