//! Named field access on structs
//!
//! Small structs are searched linearly. Once a struct grows past
//! [`STRUCT_FIELD_INDEX_THRESHOLD`](crate::model::STRUCT_FIELD_INDEX_THRESHOLD)
//! children it carries a name to positions map which is kept current on
//! every insertion and removal.

use std::sync::Arc;

use super::Dom;
use crate::error::{IonError, Result};
use crate::model::node::ValueNode;
use crate::model::{IonType, SymbolToken, ValueId};

impl Dom {
    fn struct_node(&self, id: ValueId) -> Result<&ValueNode> {
        let node = self.node(id)?;
        if node.ion_type != IonType::Struct {
            return Err(IonError::NotAStruct {
                ion_type: node.ion_type,
            });
        }
        Ok(node)
    }

    /// Positions of every child named `name`, in slot order
    fn field_positions(&self, record: ValueId, name: &str) -> Result<Vec<usize>> {
        let node = self.struct_node(record)?;
        if node.is_null {
            return Ok(Vec::new());
        }
        if let Some(index) = node.container_data().and_then(|data| data.field_index.as_ref()) {
            return Ok(index.all(name).to_vec());
        }
        let mut positions = Vec::new();
        if let Some(children) = node.children() {
            for (position, child) in children.ids().enumerate() {
                let matches = self
                    .node(child)?
                    .field_name
                    .as_ref()
                    .is_some_and(|token| token.matches_text(name));
                if matches {
                    positions.push(position);
                }
            }
        }
        Ok(positions)
    }

    /// Append `child` under `name`; duplicate names are allowed
    pub fn add_field(&mut self, record: ValueId, name: &str, child: ValueId) -> Result<()> {
        let index = self.validate_insert(record, None, child, Some(name))?;
        self.attach_child(record, index, child, Some(SymbolToken::from_text(name)))
    }

    /// Replace every field named `name` with `child`
    ///
    /// Returns the values that were detached.
    pub fn put_field(&mut self, record: ValueId, name: &str, child: ValueId) -> Result<Vec<ValueId>> {
        self.validate_insert(record, None, child, Some(name))?;
        let removed = self.remove_field(record, name)?;
        let index = self.size(record)?;
        self.attach_child(record, index, child, Some(SymbolToken::from_text(name)))?;
        Ok(removed)
    }

    /// First child named `name`, or `None`; a null struct has no fields
    pub fn get_field(&self, record: ValueId, name: &str) -> Result<Option<ValueId>> {
        let node = self.struct_node(record)?;
        if node.is_null {
            return Ok(None);
        }
        if let Some(index) = node.container_data().and_then(|data| data.field_index.as_ref()) {
            return match index.first(name) {
                Some(position) => self.get(record, position).map(Some),
                None => Ok(None),
            };
        }
        Ok(self
            .field_positions(record, name)?
            .first()
            .and_then(|position| node.children().and_then(|children| children.get(*position))))
    }

    /// Every child named `name`, in slot order
    pub fn get_all_fields(&self, record: ValueId, name: &str) -> Result<Vec<ValueId>> {
        self.field_positions(record, name)?
            .into_iter()
            .map(|position| self.get(record, position))
            .collect()
    }

    /// Check if any child is named `name`
    pub fn contains_field(&self, record: ValueId, name: &str) -> Result<bool> {
        Ok(self.get_field(record, name)?.is_some())
    }

    /// Detach every child named `name`, returning them in slot order
    pub fn remove_field(&mut self, record: ValueId, name: &str) -> Result<Vec<ValueId>> {
        self.check_mutable(record)?;
        let positions = self.field_positions(record, name)?;
        for position in &positions {
            self.check_mutable(self.get(record, *position)?)?;
        }
        let mut removed = Vec::with_capacity(positions.len());
        // Highest slot first so the remaining positions stay valid.
        for position in positions.into_iter().rev() {
            removed.push(self.detach_child_at(record, position)?);
        }
        removed.reverse();
        Ok(removed)
    }

    /// Field names in slot order
    pub fn field_names(&self, record: ValueId) -> Result<Vec<Option<Arc<str>>>> {
        let node = self.struct_node(record)?;
        let Some(children) = node.children() else {
            return Ok(Vec::new());
        };
        if node.is_null {
            return Ok(Vec::new());
        }
        children.ids().map(|child| self.field_name(child)).collect()
    }

    #[cfg(test)]
    pub(crate) fn has_field_index(&self, record: ValueId) -> Result<bool> {
        Ok(self
            .struct_node(record)?
            .container_data()
            .is_some_and(|data| data.field_index.is_some()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DomConfig;
    use crate::model::Scalar;
    use pretty_assertions::assert_eq;

    fn dom() -> Dom {
        Dom::with_config(DomConfig::testing())
    }

    fn int_of(dom: &Dom, id: ValueId) -> i64 {
        dom.scalar(id).unwrap().and_then(Scalar::as_int).unwrap()
    }

    #[test]
    fn test_field_lookup_small_struct() {
        let mut dom = dom();
        let record = dom.new_empty_struct();
        for (name, value) in [("a", 1), ("b", 2), ("a", 3)] {
            let child = dom.new_int(value);
            dom.add_field(record, name, child).unwrap();
        }
        assert!(!dom.has_field_index(record).unwrap());

        let first = dom.get_field(record, "a").unwrap().unwrap();
        assert_eq!(int_of(&dom, first), 1);
        let all: Vec<i64> = dom
            .get_all_fields(record, "a")
            .unwrap()
            .into_iter()
            .map(|id| int_of(&dom, id))
            .collect();
        assert_eq!(all, vec![1, 3]);
        assert_eq!(dom.get_field(record, "zzz").unwrap(), None);
        assert!(dom.contains_field(record, "b").unwrap());
    }

    #[test]
    fn test_field_index_built_past_threshold() {
        let mut dom = dom();
        let record = dom.new_empty_struct();
        for i in 0..5 {
            let child = dom.new_int(i);
            dom.add_field(record, &format!("f{i}"), child).unwrap();
        }
        assert!(!dom.has_field_index(record).unwrap());

        let sixth = dom.new_int(5);
        dom.add_field(record, "f5", sixth).unwrap();
        assert!(dom.has_field_index(record).unwrap());

        for i in 0..6 {
            let found = dom.get_field(record, &format!("f{i}")).unwrap().unwrap();
            assert_eq!(int_of(&dom, found), i);
        }
    }

    #[test]
    fn test_field_index_tracks_removals_and_inserts() {
        let mut dom = dom();
        let record = dom.new_empty_struct();
        for i in 0..8 {
            let child = dom.new_int(i);
            let name = if i % 2 == 0 { "even" } else { "odd" };
            dom.add_field(record, name, child).unwrap();
        }
        assert!(dom.has_field_index(record).unwrap());

        let first_even = dom.get(record, 0).unwrap();
        assert_eq!(dom.remove(record, first_even), Ok(true));

        let evens: Vec<i64> = dom
            .get_all_fields(record, "even")
            .unwrap()
            .into_iter()
            .map(|id| int_of(&dom, id))
            .collect();
        assert_eq!(evens, vec![2, 4, 6]);

        let extra = dom.new_int(100);
        dom.add_field(record, "extra", extra).unwrap();
        assert_eq!(dom.get_field(record, "extra").unwrap(), Some(extra));
        assert_eq!(dom.element_index(extra).unwrap(), Some(7));
    }

    #[test]
    fn test_remove_and_put_field() {
        let mut dom = dom();
        let record = dom.new_empty_struct();
        for (name, value) in [("x", 1), ("y", 2), ("x", 3)] {
            let child = dom.new_int(value);
            dom.add_field(record, name, child).unwrap();
        }

        let replacement = dom.new_int(9);
        let removed = dom.put_field(record, "x", replacement).unwrap();
        assert_eq!(removed.len(), 2);
        for value in &removed {
            assert_eq!(dom.container(*value).unwrap(), None);
            assert_eq!(dom.field_name(*value).unwrap(), None);
        }
        assert_eq!(dom.size(record).unwrap(), 2);
        assert_eq!(dom.get_field(record, "x").unwrap(), Some(replacement));
        assert_eq!(dom.element_index(replacement).unwrap(), Some(1));

        let gone = dom.remove_field(record, "y").unwrap();
        assert_eq!(gone.len(), 1);
        assert!(dom.remove_field(record, "y").unwrap().is_empty());
    }

    #[test]
    fn test_put_field_validates_before_removing() {
        let mut dom = dom();
        let record = dom.new_empty_struct();
        let existing = dom.new_int(1);
        dom.add_field(record, "k", existing).unwrap();

        let elsewhere = dom.new_empty_list();
        let taken = dom.new_int(2);
        dom.add(elsewhere, taken).unwrap();

        assert_eq!(dom.put_field(record, "k", taken), Err(IonError::ContainedValue));
        assert_eq!(dom.get_field(record, "k").unwrap(), Some(existing));
    }

    #[test]
    fn test_struct_requires_field_names() {
        let mut dom = dom();
        let record = dom.new_empty_struct();
        let list = dom.new_empty_list();
        let child = dom.new_int(1);

        assert_eq!(dom.add(record, child), Err(IonError::FieldNameRequired));
        assert_eq!(dom.add_field(record, "", child), Err(IonError::EmptySymbol));
        assert_eq!(
            dom.add_field(list, "name", child),
            Err(IonError::NotAStruct {
                ion_type: IonType::List
            })
        );
        assert_eq!(
            dom.get_field(list, "name"),
            Err(IonError::NotAStruct {
                ion_type: IonType::List
            })
        );
    }

    #[test]
    fn test_null_struct_has_no_fields() {
        let mut dom = dom();
        let record = dom.new_null_struct();
        assert_eq!(dom.get_field(record, "a").unwrap(), None);
        assert!(dom.field_names(record).unwrap().is_empty());

        let child = dom.new_bool(true);
        dom.add_field(record, "a", child).unwrap();
        assert!(!dom.is_null_value(record).unwrap());
        assert_eq!(dom.field_names(record).unwrap(), vec![Some("a".into())]);
    }

    #[test]
    fn test_locked_field_is_not_removed() {
        let mut dom = dom();
        let record = dom.new_empty_struct();
        let free = dom.new_int(1);
        let locked = dom.new_int(2);
        dom.add_field(record, "f", free).unwrap();
        dom.add_field(record, "f", locked).unwrap();
        dom.make_read_only(locked).unwrap();

        assert_eq!(dom.remove_field(record, "f"), Err(IonError::ReadOnlyValue));
        let replacement = dom.new_int(3);
        assert_eq!(
            dom.put_field(record, "f", replacement),
            Err(IonError::ReadOnlyValue)
        );

        assert_eq!(dom.get_all_fields(record, "f").unwrap(), vec![free, locked]);
        assert_eq!(dom.field_name(locked).unwrap().as_deref(), Some("f"));
        assert_eq!(dom.container(locked).unwrap(), Some(record));
        assert_eq!(dom.container(replacement).unwrap(), None);
    }
}
