//! One-way transition to the read-only state

use super::Dom;
use crate::error::Result;
use crate::model::ValueId;
use crate::model::node::Mutability;

impl Dom {
    /// Lock `id` and every descendant
    ///
    /// Children are locked before their parents. Each node first gets its
    /// symbol text resolved and its ids discarded, then its flag set. A
    /// value that is already read-only is left alone. Nothing ever unlocks.
    pub fn make_read_only(&mut self, id: ValueId) -> Result<()> {
        if self.node(id)?.is_read_only() {
            return Ok(());
        }
        let table = self.symbol_table(id)?;
        let order = self.subtree_post_order(id)?;

        let table = table.read();
        let mut locked = 0;
        for node_id in &order {
            let node = self.node_mut(*node_id)?;
            if node.is_read_only() {
                continue;
            }
            node.for_each_token_mut(|token| token.clear_sid(Some(&*table)));
            node.mutability = Mutability::ReadOnly;
            locked += 1;
        }
        log::debug!("locked {locked} node(s) under {id}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IonError;
    use crate::model::{Scalar, SymbolToken};

    #[test]
    fn test_lock_is_transitive() {
        let mut dom = Dom::new();
        let record = dom.new_empty_struct();
        let list = dom.new_empty_list();
        let leaf = dom.new_int(1);
        dom.add(list, leaf).unwrap();
        dom.add_field(record, "items", list).unwrap();

        dom.make_read_only(record).unwrap();
        for id in [record, list, leaf] {
            assert!(dom.is_read_only(id).unwrap());
        }

        let extra = dom.new_int(2);
        assert_eq!(dom.add(list, extra), Err(IonError::ReadOnlyValue));
        assert_eq!(dom.remove(list, leaf), Err(IonError::ReadOnlyValue));
        assert_eq!(dom.clear(record), Err(IonError::ReadOnlyValue));
        assert_eq!(dom.make_null(leaf), Err(IonError::ReadOnlyValue));
        assert_eq!(dom.set_scalar(leaf, Scalar::Int(9)), Err(IonError::ReadOnlyValue));
        assert_eq!(
            dom.add_type_annotation(leaf, "x"),
            Err(IonError::ReadOnlyValue)
        );
        assert_eq!(dom.container(extra).unwrap(), None);
    }

    #[test]
    fn test_lock_is_idempotent() {
        let mut dom = Dom::new();
        let list = dom.new_list_of_ints(&[1, 2]).unwrap();
        dom.make_read_only(list).unwrap();
        dom.make_read_only(list).unwrap();
        assert!(dom.is_read_only(list).unwrap());
    }

    #[test]
    fn test_locked_child_can_not_be_added() {
        let mut dom = Dom::new();
        let list = dom.new_empty_list();
        let locked = dom.new_int(1);
        dom.make_read_only(locked).unwrap();
        assert_eq!(dom.add(list, locked), Err(IonError::ReadOnlyValue));
    }

    #[test]
    fn test_lock_discards_resolution_state() {
        let mut dom = Dom::new();
        let datagram = dom.new_datagram();
        let symbol = dom.new_symbol("kept").unwrap();
        dom.add(datagram, symbol).unwrap();
        let table = dom.symbol_table(datagram).unwrap();
        let sid = table.write().intern("decoded").unwrap();
        let by_sid = dom.new_symbol_token(SymbolToken::from_sid(sid));
        dom.add(datagram, by_sid).unwrap();
        dom.populate_symbol_ids(datagram).unwrap();

        dom.make_read_only(datagram).unwrap();

        let kept = dom.scalar(symbol).unwrap().and_then(Scalar::as_symbol).unwrap();
        assert_eq!(kept.text(), Some("kept"));
        assert!(!kept.is_resolved());

        let decoded = dom.scalar(by_sid).unwrap().and_then(Scalar::as_symbol).unwrap();
        assert_eq!(decoded.text(), Some("decoded"));
        assert!(!decoded.is_resolved());
    }
}
