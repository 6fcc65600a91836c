//! Deep copy of value trees

use smallvec::SmallVec;

use super::Dom;
use crate::error::{IonError, Result};
use crate::model::node::{ChildArray, ContainerData, Content, Context, ValueNode};
use crate::model::{
    IonType, Mutability, STRUCT_FIELD_INDEX_THRESHOLD, SymbolTable, SymbolTableRef, SymbolToken,
    ValueId,
};

/// Text-only copy of `token`, resolving a bare id through `table`
fn resolve_token(token: &SymbolToken, table: &SymbolTable) -> Result<SymbolToken> {
    match (token.text_arc(), token.sid()) {
        (Some(text), _) => Ok(SymbolToken::new(Some(text.clone()), None)),
        (None, Some(sid)) => table
            .find_text(sid)
            .map(|text| SymbolToken::new(Some(text), None))
            .ok_or(IonError::UnknownSymbol { sid }),
        (None, None) => token.unresolved_copy(),
    }
}

impl Dom {
    /// Independent deep copy of `id`
    ///
    /// The copy is unattached and mutable even when the source is read-only.
    /// Symbols are carried by text; an id without known text fails with
    /// [`IonError::UnknownSymbol`] and nothing is allocated. A cloned
    /// datagram anchors its own new local symbol table.
    pub fn clone_value(&mut self, id: ValueId) -> Result<ValueId> {
        let table = self.symbol_table(id)?;
        let copy = self.clone_subtree(id, &table, false)?;
        if self.node(copy)?.ion_type == IonType::Datagram {
            self.node_mut(copy)?.context = Context::TopLevel {
                symbols: SymbolTable::new_local_ref(),
            };
        }
        Ok(copy)
    }

    /// Replace the annotations, null state and children of `dest` with
    /// copies of those of `source`
    ///
    /// Field names are carried over only into a struct. All copies are
    /// built before `dest` is touched; the previous children of `dest`
    /// are left unattached.
    pub fn copy_from(&mut self, dest: ValueId, source: ValueId) -> Result<()> {
        let dest_node = self.check_mutable(dest)?;
        let dest_type = dest_node.ion_type;
        self.container_node(dest)?;
        let source_node = self.container_node(source)?;
        let source_null = source_node.is_null;
        if dest_type == IonType::Struct && source_node.ion_type != IonType::Struct {
            return Err(IonError::NotAStruct {
                ion_type: source_node.ion_type,
            });
        }
        if source_null && dest_type == IonType::Datagram {
            return Err(IonError::Unsupported {
                operation: "make_null",
                ion_type: dest_type,
            });
        }
        self.check_children_mutable(dest)?;
        let sources: Vec<ValueId> = source_node
            .children()
            .map(|children| children.ids().collect())
            .unwrap_or_default();

        let table = self.symbol_table(source)?;
        let annotations = {
            let guard = table.read();
            self.node(source)?
                .annotations
                .iter()
                .map(|token| resolve_token(token, &guard))
                .collect::<Result<SmallVec<[SymbolToken; 2]>>>()?
        };

        let keep_names = dest_type == IonType::Struct;
        let mut copies = Vec::with_capacity(sources.len());
        for child in &sources {
            match self.clone_subtree(*child, &table, keep_names) {
                Ok(copy) => copies.push(copy),
                Err(err) => {
                    for copy in copies {
                        self.discard(copy)?;
                    }
                    return Err(err);
                }
            }
        }

        self.clear(dest)?;
        self.node_mut(dest)?.annotations = annotations;
        if source_null {
            return self.make_null(dest);
        }
        if let Some(data) = self.node_mut(dest)?.container_data_mut() {
            data.children = ChildArray::with_exact_capacity(copies.len());
        }
        for (index, copy) in copies.into_iter().enumerate() {
            let name = self.node_mut(copy)?.field_name.take();
            self.attach_child(dest, index, copy, name)?;
        }
        Ok(())
    }

    /// Copy `id` and everything below it, releasing partial work on failure
    ///
    /// With `keep_name` the root copy holds its field name until the caller
    /// attaches it. The walk keeps its own work stack, so depth is bounded
    /// only by memory.
    fn clone_subtree(
        &mut self,
        id: ValueId,
        table: &SymbolTableRef,
        keep_name: bool,
    ) -> Result<ValueId> {
        let root = self.clone_node(id, table, keep_name)?;
        let mut indexed_structs = Vec::new();
        let mut pending = vec![(id, root)];
        while let Some((source, copy)) = pending.pop() {
            let source_node = self.node(source)?;
            let keep_child_names = source_node.ion_type == IonType::Struct;
            let children: Vec<ValueId> = source_node
                .children()
                .map(|children| children.ids().collect())
                .unwrap_or_default();
            if keep_child_names && children.len() > STRUCT_FIELD_INDEX_THRESHOLD {
                indexed_structs.push(copy);
            }
            for child in children {
                let child_copy = match self.clone_node(child, table, keep_child_names) {
                    Ok(child_copy) => child_copy,
                    Err(err) => {
                        self.discard(root)?;
                        return Err(err);
                    }
                };
                self.append_copy(copy, child_copy)?;
                pending.push((child, child_copy));
            }
            self.audit_indices(copy);
        }
        for record in indexed_structs {
            self.build_field_index(record)?;
        }
        Ok(root)
    }

    /// Allocate an unattached, childless copy of one node
    fn clone_node(
        &mut self,
        id: ValueId,
        table: &SymbolTableRef,
        keep_name: bool,
    ) -> Result<ValueId> {
        let source = self.node(id)?;
        let guard = table.read();
        let annotations = source
            .annotations
            .iter()
            .map(|token| resolve_token(token, &guard))
            .collect::<Result<SmallVec<[SymbolToken; 2]>>>()?;
        let field_name = match source.field_name.as_ref() {
            Some(token) if keep_name => Some(resolve_token(token, &guard)?),
            _ => None,
        };
        let content = match &source.content {
            Content::Scalar(value) => {
                let mut value = value.clone();
                if let Some(token) = value.as_mut().and_then(|scalar| scalar.symbol_mut()) {
                    *token = resolve_token(token, &guard)?;
                }
                Content::Scalar(value)
            }
            Content::Container(data) => {
                let capacity = if source.is_null { 0 } else { data.children.len() };
                Content::Container(ContainerData {
                    kind: data.kind,
                    children: ChildArray::with_exact_capacity(capacity),
                    field_index: None,
                })
            }
        };
        drop(guard);
        let ion_type = source.ion_type;
        let is_null = source.is_null;

        Ok(self.alloc(ValueNode {
            ion_type,
            is_null,
            mutability: Mutability::Mutable,
            annotations,
            field_name,
            element_index: 0,
            context: Context::detached(),
            content,
        }))
    }

    /// Append a fresh copy to a copied container sized for it
    ///
    /// Copies carry text-only tokens, so no symbol pass is needed.
    fn append_copy(&mut self, container: ValueId, child: ValueId) -> Result<()> {
        let index = self.node(container)?.child_count();
        {
            let child_node = self.node_mut(child)?;
            child_node.context = Context::Nested { container };
            child_node.element_index = index;
        }
        let node = self.node_mut(container)?;
        let ion_type = node.ion_type;
        let Some(data) = node.container_data_mut() else {
            return Err(IonError::NotAContainer { ion_type });
        };
        data.children.insert(index, child);
        Ok(())
    }
}
