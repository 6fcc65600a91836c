//! Arena node representation
//!
//! Nodes never point at each other directly. A container lists its
//! children by [`ValueId`]; a child names its container through its
//! [`Context`]. The arena in [`Dom`](crate::Dom) owns every node.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use super::scalar::Scalar;
use super::symbol::{SymbolTableRef, SymbolToken, system_symbol_table};
use super::types::{ContainerKind, IonType};

/// Stable, generation-checked handle to a node in a [`Dom`](crate::Dom)
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValueId {
    index: u32,
    generation: u32,
}

impl ValueId {
    pub(crate) fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index inside the arena
    pub fn index(self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}v{}", self.index, self.generation)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a node looks for its symbol table
#[derive(Debug, Clone)]
pub enum Context {
    /// Unattached value or anchor of a tree: owns the table reference
    TopLevel {
        /// Table governing this tree
        symbols: SymbolTableRef,
    },
    /// Contained value: asks its container
    Nested {
        /// The owning container
        container: ValueId,
    },
}

impl Context {
    /// Fresh top-level context governed by the system table
    pub fn detached() -> Self {
        Context::TopLevel {
            symbols: system_symbol_table(),
        }
    }

    /// Owning container, if nested
    pub fn container(&self) -> Option<ValueId> {
        match self {
            Context::Nested { container } => Some(*container),
            Context::TopLevel { .. } => None,
        }
    }

    /// Check if this context anchors a tree
    pub fn is_top_level(&self) -> bool {
        matches!(self, Context::TopLevel { .. })
    }
}

/// Lock state of a node; only ever moves from `Mutable` to `ReadOnly`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    /// Accepts mutation
    Mutable,
    /// Locked for shared reading
    ReadOnly,
}

/// Fixed-capacity child slots with a separate logical count
///
/// Capacity grows only through [`ChildArray::grow_to`], driven by the
/// per-kind growth table.
#[derive(Debug, Clone, Default)]
pub(crate) struct ChildArray {
    slots: Box<[Option<ValueId>]>,
    count: usize,
}

impl ChildArray {
    pub(crate) fn with_exact_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity].into_boxed_slice(),
            count: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.count
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn is_full(&self) -> bool {
        self.count >= self.slots.len()
    }

    pub(crate) fn get(&self, index: usize) -> Option<ValueId> {
        if index < self.count {
            self.slots[index]
        } else {
            None
        }
    }

    pub(crate) fn live_slots(&self) -> &[Option<ValueId>] {
        &self.slots[..self.count]
    }

    pub(crate) fn ids(&self) -> impl DoubleEndedIterator<Item = ValueId> + '_ {
        self.live_slots().iter().flatten().copied()
    }

    pub(crate) fn grow_to(&mut self, capacity: usize) {
        let mut slots = vec![None; capacity].into_boxed_slice();
        slots[..self.count].copy_from_slice(&self.slots[..self.count]);
        self.slots = slots;
    }

    /// Caller guarantees spare capacity and `index <= len`
    pub(crate) fn insert(&mut self, index: usize, id: ValueId) {
        if index < self.count {
            self.slots.copy_within(index..self.count, index + 1);
        }
        self.slots[index] = Some(id);
        self.count += 1;
    }

    /// Caller guarantees `index < len`
    pub(crate) fn remove(&mut self, index: usize) -> Option<ValueId> {
        let removed = self.slots[index].take();
        if index + 1 < self.count {
            self.slots.copy_within(index + 1..self.count, index);
        }
        self.count -= 1;
        self.slots[self.count] = None;
        removed
    }

    /// Empty the logical range, keeping the allocation
    pub(crate) fn take_all(&mut self) -> Vec<ValueId> {
        let taken = self.ids().collect();
        self.slots[..self.count].fill(None);
        self.count = 0;
        taken
    }

    pub(crate) fn release(&mut self) {
        self.slots = Box::default();
        self.count = 0;
    }
}

/// Struct field name to ascending child positions
#[derive(Debug, Clone, Default)]
pub(crate) struct FieldIndex {
    positions: FxHashMap<Arc<str>, SmallVec<[usize; 2]>>,
}

impl FieldIndex {
    pub(crate) fn build<'a>(fields: impl Iterator<Item = (usize, Option<&'a Arc<str>>)>) -> Self {
        let mut index = Self::default();
        for (position, name) in fields {
            if let Some(name) = name {
                index
                    .positions
                    .entry(Arc::clone(name))
                    .or_default()
                    .push(position);
            }
        }
        index
    }

    pub(crate) fn first(&self, name: &str) -> Option<usize> {
        self.positions.get(name).and_then(|list| list.first().copied())
    }

    pub(crate) fn all(&self, name: &str) -> &[usize] {
        self.positions.get(name).map_or(&[][..], |list| list.as_slice())
    }

    pub(crate) fn inserted(&mut self, position: usize, name: Option<&Arc<str>>) {
        for list in self.positions.values_mut() {
            for p in list.iter_mut() {
                if *p >= position {
                    *p += 1;
                }
            }
        }
        if let Some(name) = name {
            let list = self.positions.entry(Arc::clone(name)).or_default();
            let at = list.partition_point(|p| *p < position);
            list.insert(at, position);
        }
    }

    pub(crate) fn removed(&mut self, position: usize, name: Option<&str>) {
        if let Some(name) = name {
            let now_empty = match self.positions.get_mut(name) {
                Some(list) => {
                    list.retain(|p| *p != position);
                    list.is_empty()
                }
                None => false,
            };
            if now_empty {
                self.positions.remove(name);
            }
        }
        for list in self.positions.values_mut() {
            for p in list.iter_mut() {
                if *p > position {
                    *p -= 1;
                }
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.positions.values().map(|list| list.len()).sum()
    }
}

/// Child storage of a container node
#[derive(Debug, Clone)]
pub(crate) struct ContainerData {
    pub(crate) kind: ContainerKind,
    pub(crate) children: ChildArray,
    pub(crate) field_index: Option<FieldIndex>,
}

/// What a node holds besides its common attributes
#[derive(Debug, Clone)]
pub(crate) enum Content {
    /// `None` when the scalar is null
    Scalar(Option<Scalar>),
    Container(ContainerData),
}

/// A value in the tree: common attributes plus content
#[derive(Debug, Clone)]
pub(crate) struct ValueNode {
    pub(crate) ion_type: IonType,
    pub(crate) is_null: bool,
    pub(crate) mutability: Mutability,
    pub(crate) annotations: SmallVec<[SymbolToken; 2]>,
    pub(crate) field_name: Option<SymbolToken>,
    pub(crate) element_index: usize,
    pub(crate) context: Context,
    pub(crate) content: Content,
}

impl ValueNode {
    pub(crate) fn scalar(ion_type: IonType, value: Option<Scalar>) -> Self {
        Self {
            ion_type,
            is_null: value.is_none(),
            mutability: Mutability::Mutable,
            annotations: SmallVec::new(),
            field_name: None,
            element_index: 0,
            context: Context::detached(),
            content: Content::Scalar(value),
        }
    }

    pub(crate) fn container(kind: ContainerKind, is_null: bool, context: Context) -> Self {
        Self {
            ion_type: kind.ion_type(),
            is_null,
            mutability: Mutability::Mutable,
            annotations: SmallVec::new(),
            field_name: None,
            element_index: 0,
            context,
            content: Content::Container(ContainerData {
                kind,
                children: ChildArray::default(),
                field_index: None,
            }),
        }
    }

    pub(crate) fn is_read_only(&self) -> bool {
        self.mutability == Mutability::ReadOnly
    }

    pub(crate) fn container_data(&self) -> Option<&ContainerData> {
        match &self.content {
            Content::Container(data) => Some(data),
            Content::Scalar(_) => None,
        }
    }

    pub(crate) fn container_data_mut(&mut self) -> Option<&mut ContainerData> {
        match &mut self.content {
            Content::Container(data) => Some(data),
            Content::Scalar(_) => None,
        }
    }

    pub(crate) fn children(&self) -> Option<&ChildArray> {
        self.container_data().map(|data| &data.children)
    }

    pub(crate) fn child_count(&self) -> usize {
        self.children().map_or(0, ChildArray::len)
    }

    /// Annotations, field name and symbol payload, in that order
    pub(crate) fn for_each_token_mut(&mut self, mut f: impl FnMut(&mut SymbolToken)) {
        for token in self.annotations.iter_mut() {
            f(token);
        }
        if let Some(token) = self.field_name.as_mut() {
            f(token);
        }
        if let Content::Scalar(Some(scalar)) = &mut self.content {
            if let Some(token) = scalar.symbol_mut() {
                f(token);
            }
        }
    }
}
