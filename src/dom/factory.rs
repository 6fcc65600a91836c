//! Value constructors
//!
//! Every constructor returns an unattached, mutable value governed by the
//! system symbol table. Datagrams are the exception: each one anchors its
//! own fresh local table.

use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use rustc_hash::FxHashSet;

use super::Dom;
use crate::error::{IonError, Result};
use crate::model::node::{ChildArray, Context, ValueNode};
use crate::model::{ContainerKind, IonType, Scalar, SymbolTable, SymbolToken, ValueId};

impl Dom {
    fn new_scalar(&mut self, value: Scalar) -> ValueId {
        self.alloc(ValueNode::scalar(value.ion_type(), Some(value)))
    }

    /// `null`
    pub fn new_null(&mut self) -> ValueId {
        self.alloc(ValueNode::scalar(IonType::Null, None))
    }

    /// Typed null such as `null.int` or `null.list`
    ///
    /// A datagram is never null; asking for one yields an empty datagram.
    pub fn new_null_of(&mut self, ion_type: IonType) -> ValueId {
        match ion_type.container_kind() {
            Some(ContainerKind::Datagram) => self.new_datagram(),
            Some(kind) => self.alloc(ValueNode::container(kind, true, Context::detached())),
            None => self.alloc(ValueNode::scalar(ion_type, None)),
        }
    }

    pub fn new_bool(&mut self, value: bool) -> ValueId {
        self.new_scalar(Scalar::Bool(value))
    }

    pub fn new_int(&mut self, value: i64) -> ValueId {
        self.new_scalar(Scalar::Int(value))
    }

    pub fn new_float(&mut self, value: f64) -> ValueId {
        self.new_scalar(Scalar::Float(value))
    }

    pub fn new_decimal(&mut self, value: Decimal) -> ValueId {
        self.new_scalar(Scalar::Decimal(value))
    }

    /// Decimal from a binary float; non-finite input is rejected
    pub fn new_decimal_from_f64(&mut self, value: f64) -> Result<ValueId> {
        let decimal = Decimal::try_from(value).map_err(|_| IonError::Unsupported {
            operation: "new_decimal_from_f64",
            ion_type: IonType::Float,
        })?;
        Ok(self.new_decimal(decimal))
    }

    pub fn new_timestamp(&mut self, value: DateTime<FixedOffset>) -> ValueId {
        self.new_scalar(Scalar::Timestamp(value))
    }

    pub fn new_string(&mut self, value: impl Into<String>) -> ValueId {
        self.new_scalar(Scalar::String(value.into()))
    }

    /// Symbol with known text
    pub fn new_symbol(&mut self, text: &str) -> Result<ValueId> {
        if text.is_empty() {
            return Err(IonError::EmptySymbol);
        }
        Ok(self.new_scalar(Scalar::Symbol(SymbolToken::from_text(text))))
    }

    /// Symbol from a token that may carry only an id
    pub fn new_symbol_token(&mut self, token: SymbolToken) -> ValueId {
        self.new_scalar(Scalar::Symbol(token))
    }

    pub fn new_blob(&mut self, bytes: &[u8]) -> ValueId {
        self.new_scalar(Scalar::Blob(bytes.to_vec()))
    }

    /// Blob from `bytes[offset..offset + length]`
    pub fn new_blob_range(&mut self, bytes: &[u8], offset: usize, length: usize) -> Result<ValueId> {
        let range = byte_range(bytes, offset, length)?;
        Ok(self.new_blob(range))
    }

    pub fn new_clob(&mut self, bytes: &[u8]) -> ValueId {
        self.new_scalar(Scalar::Clob(bytes.to_vec()))
    }

    /// Clob from `bytes[offset..offset + length]`
    pub fn new_clob_range(&mut self, bytes: &[u8], offset: usize, length: usize) -> Result<ValueId> {
        let range = byte_range(bytes, offset, length)?;
        Ok(self.new_clob(range))
    }

    pub fn new_null_list(&mut self) -> ValueId {
        self.new_null_of(IonType::List)
    }

    pub fn new_empty_list(&mut self) -> ValueId {
        self.alloc(ValueNode::container(ContainerKind::List, false, Context::detached()))
    }

    /// List owning `elements`, in order
    pub fn new_list(&mut self, elements: &[ValueId]) -> Result<ValueId> {
        self.new_sequence(ContainerKind::List, elements)
    }

    pub fn new_list_of_ints(&mut self, values: &[i64]) -> Result<ValueId> {
        let elements: Vec<ValueId> = values.iter().map(|value| self.new_int(*value)).collect();
        self.new_list(&elements)
    }

    pub fn new_null_sexp(&mut self) -> ValueId {
        self.new_null_of(IonType::Sexp)
    }

    pub fn new_empty_sexp(&mut self) -> ValueId {
        self.alloc(ValueNode::container(ContainerKind::Sexp, false, Context::detached()))
    }

    /// S-expression owning `elements`, in order
    pub fn new_sexp(&mut self, elements: &[ValueId]) -> Result<ValueId> {
        self.new_sequence(ContainerKind::Sexp, elements)
    }

    pub fn new_sexp_of_ints(&mut self, values: &[i64]) -> Result<ValueId> {
        let elements: Vec<ValueId> = values.iter().map(|value| self.new_int(*value)).collect();
        self.new_sexp(&elements)
    }

    pub fn new_null_struct(&mut self) -> ValueId {
        self.new_null_of(IonType::Struct)
    }

    pub fn new_empty_struct(&mut self) -> ValueId {
        self.alloc(ValueNode::container(ContainerKind::Struct, false, Context::detached()))
    }

    /// Empty datagram anchoring a new local symbol table
    pub fn new_datagram(&mut self) -> ValueId {
        let context = Context::TopLevel {
            symbols: SymbolTable::new_local_ref(),
        };
        self.alloc(ValueNode::container(ContainerKind::Datagram, false, context))
    }

    fn new_sequence(&mut self, kind: ContainerKind, elements: &[ValueId]) -> Result<ValueId> {
        let mut seen = FxHashSet::default();
        for element in elements {
            let node = self.node(*element)?;
            if node.context.container().is_some() || !seen.insert(*element) {
                return Err(IonError::ContainedValue);
            }
            if node.is_read_only() {
                return Err(IonError::ReadOnlyValue);
            }
            if node.ion_type == IonType::Datagram {
                return Err(IonError::DatagramNesting);
            }
        }

        let mut node = ValueNode::container(kind, false, Context::detached());
        if let Some(data) = node.container_data_mut() {
            data.children = ChildArray::with_exact_capacity(elements.len());
        }
        let container = self.alloc(node);
        for (index, element) in elements.iter().enumerate() {
            self.attach_child(container, index, *element, None)?;
        }
        Ok(container)
    }
}

fn byte_range(bytes: &[u8], offset: usize, length: usize) -> Result<&[u8]> {
    offset
        .checked_add(length)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(IonError::InvalidRange {
            offset,
            length,
            len: bytes.len(),
        })
}
