//! Container mutation: insertion, removal, clearing and growth

use std::sync::Arc;

use super::Dom;
use crate::error::{IonError, Result};
use crate::model::node::{Content, Context, FieldIndex, ValueNode};
use crate::model::{ContainerKind, IonType, STRUCT_FIELD_INDEX_THRESHOLD, SymbolToken, ValueId};

impl Dom {
    pub(crate) fn container_node(&self, id: ValueId) -> Result<&ValueNode> {
        let node = self.node(id)?;
        match node.content {
            Content::Container(_) => Ok(node),
            Content::Scalar(_) => Err(IonError::NotAContainer {
                ion_type: node.ion_type,
            }),
        }
    }

    /// Number of children; 0 for a null container
    pub fn size(&self, container: ValueId) -> Result<usize> {
        let node = self.container_node(container)?;
        Ok(if node.is_null { 0 } else { node.child_count() })
    }

    /// Check if a non-null container has no children
    pub fn is_empty(&self, container: ValueId) -> Result<bool> {
        let node = self.container_node(container)?;
        if node.is_null {
            return Err(IonError::NullValue {
                ion_type: node.ion_type,
            });
        }
        Ok(node.child_count() == 0)
    }

    /// Child at `index`
    pub fn get(&self, container: ValueId, index: usize) -> Result<ValueId> {
        let node = self.container_node(container)?;
        if node.is_null {
            return Err(IonError::NullValue {
                ion_type: node.ion_type,
            });
        }
        let len = node.child_count();
        node.children()
            .and_then(|children| children.get(index))
            .ok_or(IonError::IndexOutOfBounds { index, len })
    }

    /// Append `child` to a list, sexp or datagram
    pub fn add(&mut self, container: ValueId, child: ValueId) -> Result<()> {
        let index = self.validate_insert(container, None, child, None)?;
        self.attach_child(container, index, child, None)
    }

    /// Insert `child` before position `index` of a list, sexp or datagram
    pub fn insert(&mut self, container: ValueId, index: usize, child: ValueId) -> Result<()> {
        let index = self.validate_insert(container, Some(index), child, None)?;
        self.attach_child(container, index, child, None)
    }

    /// Detach `child` from `container`
    ///
    /// Returns `false` when `child` is not a child of `container`. The
    /// detached value stays alive as an unattached top-level value.
    pub fn remove(&mut self, container: ValueId, child: ValueId) -> Result<bool> {
        self.check_mutable(container)?;
        self.container_node(container)?;
        let child_node = self.node(child)?;
        if child_node.context.container() != Some(container) {
            return Ok(false);
        }
        let position = child_node.element_index;
        let slot = self
            .node(container)?
            .children()
            .and_then(|children| children.get(position));
        assert_eq!(
            slot,
            Some(child),
            "invariant violation: element index {position} of {child} does not match its slot"
        );
        self.check_mutable(child)?;
        self.detach_child_at(container, position)?;
        Ok(true)
    }

    /// Detach and return the child at `index`
    pub fn remove_at(&mut self, container: ValueId, index: usize) -> Result<ValueId> {
        self.check_mutable(container)?;
        let node = self.container_node(container)?;
        let len = if node.is_null { 0 } else { node.child_count() };
        if index >= len {
            return Err(IonError::IndexOutOfBounds { index, len });
        }
        self.check_mutable(self.get(container, index)?)?;
        self.detach_child_at(container, index)
    }

    /// Detach every child; a null container becomes empty instead
    pub fn clear(&mut self, container: ValueId) -> Result<()> {
        self.check_mutable(container)?;
        let node = self.container_node(container)?;
        if node.is_null {
            self.node_mut(container)?.is_null = false;
            return Ok(());
        }
        if node.child_count() == 0 {
            return Ok(());
        }
        self.check_children_mutable(container)?;

        let table = self.symbol_table(container)?;
        let detached = {
            let node = self.node_mut(container)?;
            let Some(data) = node.container_data_mut() else {
                return Ok(());
            };
            data.field_index = None;
            data.children.take_all()
        };
        for child in detached {
            self.clear_symbol_ids_with(child, &table)?;
            Self::reset_detached(self.node_mut(child)?);
        }
        self.audit_indices(container);
        Ok(())
    }

    /// Make the value null, detaching any children
    pub fn make_null(&mut self, id: ValueId) -> Result<()> {
        let node = self.check_mutable(id)?;
        let ion_type = node.ion_type;
        if let Content::Scalar(_) = node.content {
            let node = self.node_mut(id)?;
            node.content = Content::Scalar(None);
            node.is_null = true;
            return Ok(());
        }
        if ion_type == IonType::Datagram {
            return Err(IonError::Unsupported {
                operation: "make_null",
                ion_type,
            });
        }

        self.clear(id)?;
        let node = self.node_mut(id)?;
        node.is_null = true;
        if let Some(data) = node.container_data_mut() {
            data.children.release();
            data.field_index = None;
        }
        self.audit_indices(id);
        Ok(())
    }

    /// Check everything an insertion needs, returning the resolved index
    ///
    /// Read-only state of the container is checked before anything else.
    pub(crate) fn validate_insert(
        &self,
        container: ValueId,
        index: Option<usize>,
        child: ValueId,
        field_name: Option<&str>,
    ) -> Result<usize> {
        self.check_mutable(container)?;
        let node = self.container_node(container)?;
        match (node.ion_type, field_name) {
            (IonType::Struct, None) => return Err(IonError::FieldNameRequired),
            (IonType::Struct, Some("")) => return Err(IonError::EmptySymbol),
            (ion_type, Some(_)) if ion_type != IonType::Struct => {
                return Err(IonError::NotAStruct { ion_type });
            }
            _ => {}
        }
        self.validate_new_child(container, child)?;

        let len = if node.is_null { 0 } else { node.child_count() };
        match index {
            None => Ok(len),
            Some(index) if index <= len => Ok(index),
            Some(index) => Err(IonError::IndexOutOfBounds { index, len }),
        }
    }

    /// A new child must be live, unowned, mutable, not a datagram and not
    /// an ancestor of the container
    pub(crate) fn validate_new_child(&self, container: ValueId, child: ValueId) -> Result<()> {
        let child_node = self.node(child)?;
        if child_node.context.container().is_some() {
            return Err(IonError::ContainedValue);
        }
        if child_node.is_read_only() {
            return Err(IonError::ReadOnlyValue);
        }
        if child_node.ion_type == IonType::Datagram {
            return Err(IonError::DatagramNesting);
        }
        if self.top_level(container)? == child {
            return Err(IonError::CyclicContainment);
        }
        Ok(())
    }

    /// Bind a validated child at `index`; no checks are repeated here
    pub(crate) fn attach_child(
        &mut self,
        container: ValueId,
        index: usize,
        child: ValueId,
        field_name: Option<SymbolToken>,
    ) -> Result<()> {
        // Ids resolved against the child's old table mean nothing here.
        self.clear_symbol_ids(child)?;

        let name = field_name.as_ref().and_then(|token| token.text_arc().cloned());
        {
            let child_node = self.node_mut(child)?;
            child_node.context = Context::Nested { container };
            child_node.element_index = index;
            child_node.field_name = field_name;
        }

        let node = self.node_mut(container)?;
        node.is_null = false;
        let ion_type = node.ion_type;
        let Some(data) = node.container_data_mut() else {
            return Err(IonError::NotAContainer { ion_type });
        };
        if data.children.is_full() {
            let old_capacity = data.children.capacity();
            let new_capacity = data.kind.next_capacity(old_capacity);
            log::trace!(
                "growing {:?} children of {container} from {old_capacity} to {new_capacity}",
                data.kind
            );
            data.children.grow_to(new_capacity);
        }
        data.children.insert(index, child);
        if let Some(field_index) = data.field_index.as_mut() {
            field_index.inserted(index, name.as_ref());
        }
        let needs_field_index = data.kind == ContainerKind::Struct
            && data.field_index.is_none()
            && data.children.len() > STRUCT_FIELD_INDEX_THRESHOLD;

        self.renumber_from(container, index + 1)?;
        if needs_field_index {
            self.build_field_index(container)?;
        }
        self.audit_indices(container);
        Ok(())
    }

    /// A locked child keeps its container, so no child may be locked
    /// before the container is emptied
    pub(crate) fn check_children_mutable(&self, container: ValueId) -> Result<()> {
        let Some(children) = self.node(container)?.children() else {
            return Ok(());
        };
        for child in children.ids() {
            self.check_mutable(child)?;
        }
        Ok(())
    }

    /// Unbind the child at `index`, which the caller has bounds-checked
    /// and whose lock the caller has checked
    pub(crate) fn detach_child_at(&mut self, container: ValueId, index: usize) -> Result<ValueId> {
        let table = self.symbol_table(container)?;
        let child = self.get(container, index)?;
        self.clear_symbol_ids_with(child, &table)?;

        let name = self
            .node(child)?
            .field_name
            .as_ref()
            .and_then(|token| token.text_arc().cloned());
        if let Some(data) = self.node_mut(container)?.container_data_mut() {
            data.children.remove(index);
            if let Some(field_index) = data.field_index.as_mut() {
                field_index.removed(index, name.as_deref());
            }
        }
        Self::reset_detached(self.node_mut(child)?);

        self.renumber_from(container, index)?;
        self.audit_indices(container);
        Ok(child)
    }

    fn reset_detached(node: &mut ValueNode) {
        node.context = Context::detached();
        node.field_name = None;
        node.element_index = 0;
    }

    /// Re-establish `element_index == slot` for every child at or after `from`
    pub(crate) fn renumber_from(&mut self, container: ValueId, from: usize) -> Result<()> {
        let len = self.node(container)?.child_count();
        for position in from..len {
            let child = self.get(container, position)?;
            self.node_mut(child)?.element_index = position;
        }
        Ok(())
    }

    pub(crate) fn build_field_index(&mut self, container: ValueId) -> Result<()> {
        let node = self.node(container)?;
        let mut names: Vec<(usize, Option<Arc<str>>)> = Vec::with_capacity(node.child_count());
        if let Some(children) = node.children() {
            for (position, child) in children.ids().enumerate() {
                let name = self
                    .node(child)?
                    .field_name
                    .as_ref()
                    .and_then(|token| token.text_arc().cloned());
                names.push((position, name));
            }
        }
        let index = FieldIndex::build(names.iter().map(|(position, name)| (*position, name.as_ref())));
        log::debug!(
            "struct {container} switched to indexed field lookup at {} fields",
            names.len()
        );
        if let Some(data) = self.node_mut(container)?.container_data_mut() {
            data.field_index = Some(index);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DomConfig;
    use crate::model::Scalar;

    fn dom() -> Dom {
        Dom::with_config(DomConfig::testing())
    }

    fn int_values(dom: &Dom, container: ValueId) -> Vec<i64> {
        dom.children(container)
            .unwrap()
            .map(|child| dom.scalar(child).unwrap().and_then(Scalar::as_int).unwrap())
            .collect()
    }

    #[test]
    fn test_add_assigns_contiguous_indices() {
        let mut dom = dom();
        let list = dom.new_empty_list();
        let values: Vec<_> = (1..=3).map(|i| dom.new_int(i)).collect();
        for value in &values {
            dom.add(list, *value).unwrap();
        }

        assert_eq!(dom.size(list).unwrap(), 3);
        for (position, value) in values.iter().enumerate() {
            assert_eq!(dom.element_index(*value).unwrap(), Some(position));
            assert_eq!(dom.container(*value).unwrap(), Some(list));
        }
    }

    #[test]
    fn test_insert_renumbers_tail() {
        let mut dom = dom();
        let list = dom.new_list_of_ints(&[1, 3]).unwrap();
        let two = dom.new_int(2);
        dom.insert(list, 1, two).unwrap();

        assert_eq!(int_values(&dom, list), vec![1, 2, 3]);
        let last = dom.get(list, 2).unwrap();
        assert_eq!(dom.element_index(last).unwrap(), Some(2));
    }

    #[test]
    fn test_insert_out_of_bounds_leaves_tree_unchanged() {
        let mut dom = dom();
        let list = dom.new_list_of_ints(&[1]).unwrap();
        let child = dom.new_int(2);

        assert_eq!(
            dom.insert(list, 3, child),
            Err(IonError::IndexOutOfBounds { index: 3, len: 1 })
        );
        assert_eq!(dom.size(list).unwrap(), 1);
        assert_eq!(dom.container(child).unwrap(), None);
    }

    #[test]
    fn test_growth_follows_kind_table() {
        let mut dom = dom();
        let list = dom.new_empty_list();
        let mut capacities = Vec::new();
        for i in 0..9 {
            let value = dom.new_int(i);
            dom.add(list, value).unwrap();
            let capacity = dom.node(list).unwrap().children().unwrap().capacity();
            if capacities.last() != Some(&capacity) {
                capacities.push(capacity);
            }
        }
        assert_eq!(capacities, vec![1, 4, 8, 16]);
    }

    #[test]
    fn test_remove_by_identity() {
        let mut dom = dom();
        let list = dom.new_list_of_ints(&[1, 2, 3]).unwrap();
        let other = dom.new_list_of_ints(&[2]).unwrap();
        let foreign = dom.get(other, 0).unwrap();

        assert_eq!(dom.remove(list, foreign), Ok(false));

        let two = dom.get(list, 1).unwrap();
        assert_eq!(dom.remove(list, two), Ok(true));
        assert_eq!(int_values(&dom, list), vec![1, 3]);
        assert_eq!(dom.container(two).unwrap(), None);
        assert_eq!(dom.element_index(two).unwrap(), None);
    }

    #[test]
    fn test_containment_violations() {
        let mut dom = dom();
        let a = dom.new_empty_list();
        let b = dom.new_empty_list();
        let child = dom.new_int(1);
        dom.add(a, child).unwrap();

        assert_eq!(dom.add(b, child), Err(IonError::ContainedValue));
        assert_eq!(dom.size(b).unwrap(), 0);
        assert_eq!(dom.container(child).unwrap(), Some(a));

        assert_eq!(dom.add(a, a), Err(IonError::CyclicContainment));

        let datagram = dom.new_datagram();
        assert_eq!(dom.add(a, datagram), Err(IonError::DatagramNesting));
    }

    #[test]
    fn test_add_to_scalar_fails() {
        let mut dom = dom();
        let scalar = dom.new_string("text");
        let child = dom.new_int(1);
        assert_eq!(
            dom.add(scalar, child),
            Err(IonError::NotAContainer {
                ion_type: IonType::String
            })
        );
    }

    #[test]
    fn test_clear_and_make_null() {
        let mut dom = dom();
        let list = dom.new_list_of_ints(&[1, 2]).unwrap();
        let first = dom.get(list, 0).unwrap();

        dom.clear(list).unwrap();
        assert_eq!(dom.size(list).unwrap(), 0);
        assert_eq!(dom.is_empty(list), Ok(true));
        assert_eq!(dom.container(first).unwrap(), None);

        dom.make_null(list).unwrap();
        assert!(dom.is_null_value(list).unwrap());
        assert_eq!(dom.size(list).unwrap(), 0);
        assert_eq!(
            dom.is_empty(list),
            Err(IonError::NullValue {
                ion_type: IonType::List
            })
        );
        assert_eq!(dom.node(list).unwrap().children().unwrap().capacity(), 0);

        dom.clear(list).unwrap();
        assert!(!dom.is_null_value(list).unwrap());
    }

    #[test]
    fn test_null_container_element_access() {
        let mut dom = dom();
        let list = dom.new_null_list();
        assert_eq!(dom.size(list).unwrap(), 0);
        assert!(matches!(dom.get(list, 0), Err(IonError::NullValue { .. })));

        let value = dom.new_int(5);
        dom.add(list, value).unwrap();
        assert!(!dom.is_null_value(list).unwrap());
        assert_eq!(dom.size(list).unwrap(), 1);
    }

    #[test]
    fn test_make_null_scalar_and_datagram() {
        let mut dom = dom();
        let value = dom.new_int(3);
        dom.make_null(value).unwrap();
        assert!(dom.is_null_value(value).unwrap());
        assert_eq!(dom.scalar(value).unwrap(), None);

        let datagram = dom.new_datagram();
        assert!(matches!(
            dom.make_null(datagram),
            Err(IonError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_remove_at() {
        let mut dom = dom();
        let list = dom.new_list_of_ints(&[10, 20, 30]).unwrap();
        let removed = dom.remove_at(list, 0).unwrap();
        assert_eq!(dom.scalar(removed).unwrap(), Some(&Scalar::Int(10)));
        assert_eq!(int_values(&dom, list), vec![20, 30]);
        assert_eq!(
            dom.remove_at(list, 2),
            Err(IonError::IndexOutOfBounds { index: 2, len: 2 })
        );
    }

    #[test]
    fn test_locked_child_stays_attached() {
        let mut dom = dom();
        let list = dom.new_list_of_ints(&[1, 2, 3]).unwrap();
        let locked = dom.get(list, 1).unwrap();
        dom.make_read_only(locked).unwrap();

        assert_eq!(dom.remove(list, locked), Err(IonError::ReadOnlyValue));
        assert_eq!(dom.remove_at(list, 1), Err(IonError::ReadOnlyValue));
        assert_eq!(dom.clear(list), Err(IonError::ReadOnlyValue));
        assert_eq!(dom.make_null(list), Err(IonError::ReadOnlyValue));

        assert_eq!(int_values(&dom, list), vec![1, 2, 3]);
        assert_eq!(dom.container(locked).unwrap(), Some(list));
        assert_eq!(dom.element_index(locked).unwrap(), Some(1));

        let first = dom.remove_at(list, 0).unwrap();
        assert_eq!(dom.scalar(first).unwrap(), Some(&Scalar::Int(1)));
        assert_eq!(dom.element_index(locked).unwrap(), Some(0));
    }
}
