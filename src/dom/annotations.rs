//! Annotations, field names and scalar content

use std::sync::Arc;

use super::Dom;
use crate::error::{IonError, Result};
use crate::model::node::Content;
use crate::model::{Scalar, SymbolToken, ValueId};

impl Dom {
    /// Annotation tokens in order, as stored
    pub fn annotation_tokens(&self, id: ValueId) -> Result<&[SymbolToken]> {
        Ok(&self.node(id)?.annotations)
    }

    /// Annotation text in order
    ///
    /// Tokens known only by id are resolved against the governing table;
    /// an id with no text there is an error.
    pub fn type_annotations(&self, id: ValueId) -> Result<Vec<Arc<str>>> {
        let node = self.node(id)?;
        if node.annotations.iter().all(|token| token.text().is_some()) {
            return Ok(node
                .annotations
                .iter()
                .filter_map(|token| token.text_arc().cloned())
                .collect());
        }
        let table = self.symbol_table(id)?;
        let table = table.read();
        node.annotations
            .iter()
            .map(|token| match (token.text_arc(), token.sid()) {
                (Some(text), _) => Ok(Arc::clone(text)),
                (None, Some(sid)) => table.find_text(sid).ok_or(IonError::UnknownSymbol { sid }),
                (None, None) => Err(IonError::EmptySymbol),
            })
            .collect()
    }

    /// Check if any annotation spells `text`
    pub fn has_type_annotation(&self, id: ValueId, text: &str) -> Result<bool> {
        Ok(self.type_annotations(id)?.iter().any(|a| a.as_ref() == text))
    }

    /// Append an annotation
    pub fn add_type_annotation(&mut self, id: ValueId, text: &str) -> Result<()> {
        self.check_mutable(id)?;
        if text.is_empty() {
            return Err(IonError::EmptySymbol);
        }
        self.node_mut(id)?
            .annotations
            .push(SymbolToken::from_text(text));
        Ok(())
    }

    /// Replace all annotations
    pub fn set_type_annotations<S: AsRef<str>>(&mut self, id: ValueId, texts: &[S]) -> Result<()> {
        self.check_mutable(id)?;
        if texts.iter().any(|text| text.as_ref().is_empty()) {
            return Err(IonError::EmptySymbol);
        }
        let node = self.node_mut(id)?;
        node.annotations.clear();
        node.annotations
            .extend(texts.iter().map(|text| SymbolToken::from_text(text.as_ref())));
        Ok(())
    }

    /// Remove every annotation spelling `text`; returns whether any was removed
    pub fn remove_type_annotation(&mut self, id: ValueId, text: &str) -> Result<bool> {
        self.check_mutable(id)?;
        let node = self.node_mut(id)?;
        let before = node.annotations.len();
        node.annotations.retain(|token| !token.matches_text(text));
        Ok(node.annotations.len() != before)
    }

    /// Remove all annotations
    pub fn clear_type_annotations(&mut self, id: ValueId) -> Result<()> {
        self.check_mutable(id)?;
        self.node_mut(id)?.annotations.clear();
        Ok(())
    }

    /// Field name token of a struct member
    pub fn field_name_token(&self, id: ValueId) -> Result<Option<&SymbolToken>> {
        Ok(self.node(id)?.field_name.as_ref())
    }

    /// Field name text of a struct member, resolved if only the id is known
    pub fn field_name(&self, id: ValueId) -> Result<Option<Arc<str>>> {
        let Some(token) = self.node(id)?.field_name.as_ref() else {
            return Ok(None);
        };
        if let Some(text) = token.text_arc() {
            return Ok(Some(Arc::clone(text)));
        }
        match token.sid() {
            Some(sid) => self
                .symbol_table(id)?
                .read()
                .find_text(sid)
                .map(Some)
                .ok_or(IonError::UnknownSymbol { sid }),
            None => Ok(None),
        }
    }

    /// Overwrite the content of a scalar; the payload type must match
    pub fn set_scalar(&mut self, id: ValueId, value: Scalar) -> Result<()> {
        let node = self.check_mutable(id)?;
        if let Content::Container(_) = node.content {
            return Err(IonError::Unsupported {
                operation: "set_scalar",
                ion_type: node.ion_type,
            });
        }
        if node.ion_type != value.ion_type() {
            return Err(IonError::TypeMismatch {
                expected: node.ion_type,
                found: value.ion_type(),
            });
        }
        let node = self.node_mut(id)?;
        node.content = Content::Scalar(Some(value));
        node.is_null = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IonType;

    #[test]
    fn test_annotation_editing() {
        let mut dom = Dom::new();
        let value = dom.new_int(1);
        dom.add_type_annotation(value, "a").unwrap();
        dom.add_type_annotation(value, "b").unwrap();
        dom.add_type_annotation(value, "a").unwrap();

        let texts: Vec<String> = dom
            .type_annotations(value)
            .unwrap()
            .iter()
            .map(|a| a.to_string())
            .collect();
        assert_eq!(texts, vec!["a", "b", "a"]);
        assert!(dom.has_type_annotation(value, "b").unwrap());

        assert!(dom.remove_type_annotation(value, "a").unwrap());
        assert!(!dom.remove_type_annotation(value, "zzz").unwrap());
        assert_eq!(dom.annotation_tokens(value).unwrap().len(), 1);

        dom.set_type_annotations(value, &["x", "y"]).unwrap();
        assert_eq!(dom.annotation_tokens(value).unwrap().len(), 2);
        dom.clear_type_annotations(value).unwrap();
        assert!(dom.annotation_tokens(value).unwrap().is_empty());

        assert_eq!(dom.add_type_annotation(value, ""), Err(IonError::EmptySymbol));
    }

    #[test]
    fn test_set_scalar_type_checks() {
        let mut dom = Dom::new();
        let value = dom.new_null_of(IonType::Int);
        assert!(dom.is_null_value(value).unwrap());

        dom.set_scalar(value, Scalar::Int(12)).unwrap();
        assert!(!dom.is_null_value(value).unwrap());
        assert_eq!(dom.scalar(value).unwrap(), Some(&Scalar::Int(12)));

        assert_eq!(
            dom.set_scalar(value, Scalar::Bool(true)),
            Err(IonError::TypeMismatch {
                expected: IonType::Int,
                found: IonType::Bool
            })
        );

        let list = dom.new_empty_list();
        assert!(matches!(
            dom.set_scalar(list, Scalar::Int(1)),
            Err(IonError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_field_name_of_struct_member() {
        let mut dom = Dom::new();
        let record = dom.new_empty_struct();
        let value = dom.new_string("v");
        dom.add_field(record, "name", value).unwrap();
        assert_eq!(dom.field_name(value).unwrap().as_deref(), Some("name"));

        let loose = dom.new_string("w");
        assert_eq!(dom.field_name(loose).unwrap(), None);
    }
}
