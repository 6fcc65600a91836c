//! Rendering value trees as Ion text or JSON

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::SecondsFormat;

use super::{print_code_point, print_json_string, print_string, print_symbol, EscapeMode};
use crate::dom::Dom;
use crate::error::{IonError, Result};
use crate::model::{IonType, Scalar, SymbolTable, SymbolToken, ValueId};

/// Ion text for `id` and its subtree
///
/// A datagram renders as its top-level values separated by spaces.
pub fn to_ion_text(dom: &Dom, id: ValueId) -> Result<String> {
    render(dom, id, false)
}

/// JSON for `id` and its subtree
///
/// Annotations are dropped, s-expressions become arrays, and symbols,
/// timestamps and lobs become strings. Non-finite floats become `null`.
pub fn to_json_text(dom: &Dom, id: ValueId) -> Result<String> {
    render(dom, id, true)
}

fn render(dom: &Dom, id: ValueId, json: bool) -> Result<String> {
    let table = dom.symbol_table(id)?;
    let table = table.read();
    let mut renderer = Renderer {
        dom,
        table: &table,
        json,
        out: String::new(),
    };
    renderer.tree(id)?;
    Ok(renderer.out)
}

/// Pending output; the walk keeps its own stack instead of recursing
enum Step {
    Value(ValueId),
    FieldName(ValueId),
    Literal(&'static str),
}

struct Renderer<'a> {
    dom: &'a Dom,
    table: &'a SymbolTable,
    json: bool,
    out: String,
}

impl Renderer<'_> {
    fn symbol(&mut self, token: &SymbolToken) -> Result<()> {
        let text = match (token.text(), token.sid()) {
            (Some(text), _) => text.to_string(),
            (None, Some(sid)) => match self.table.find_text(sid) {
                Some(text) => text.to_string(),
                None => {
                    self.unknown_symbol(sid);
                    return Ok(());
                }
            },
            (None, None) => String::new(),
        };
        if self.json {
            print_json_string(&mut self.out, Some(&text));
            return Ok(());
        }
        print_symbol(&mut self.out, Some(&text))
    }

    /// An id with no text in the table is written as `$<sid>`
    fn unknown_symbol(&mut self, sid: u32) {
        let text = format!("${sid}");
        if self.json {
            print_json_string(&mut self.out, Some(&text));
        } else {
            self.out.push_str(&text);
        }
    }

    fn tree(&mut self, root: ValueId) -> Result<()> {
        let mut steps = vec![Step::Value(root)];
        while let Some(step) = steps.pop() {
            match step {
                Step::Literal(text) => self.out.push_str(text),
                Step::FieldName(child) => self.field_name(child)?,
                Step::Value(id) => self.value(id, &mut steps)?,
            }
        }
        Ok(())
    }

    fn value(&mut self, id: ValueId, steps: &mut Vec<Step>) -> Result<()> {
        let dom = self.dom;
        if !self.json {
            for token in dom.annotation_tokens(id)? {
                self.symbol(token)?;
                self.out.push_str("::");
            }
        }

        let ion_type = dom.ion_type(id)?;
        if dom.is_null_value(id)? {
            if self.json || ion_type == IonType::Null {
                self.out.push_str("null");
            } else {
                self.out.push_str("null.");
                self.out.push_str(ion_type.name());
            }
            return Ok(());
        }

        match ion_type {
            IonType::List => self.open(id, ["[", ",", "]"], false, steps),
            IonType::Sexp if self.json => self.open(id, ["[", ",", "]"], false, steps),
            IonType::Sexp => self.open(id, ["(", " ", ")"], false, steps),
            IonType::Datagram => self.open(id, ["", " ", ""], false, steps),
            IonType::Struct => self.open(id, ["{", ",", "}"], true, steps),
            _ => match dom.scalar(id)? {
                Some(scalar) => self.scalar(scalar),
                None => {
                    self.out.push_str("null");
                    Ok(())
                }
            },
        }
    }

    /// Write the opening delimiter and queue the children, separators and
    /// closing delimiter
    fn open(
        &mut self,
        id: ValueId,
        [open, separator, close]: [&'static str; 3],
        named: bool,
        steps: &mut Vec<Step>,
    ) -> Result<()> {
        let dom = self.dom;
        self.out.push_str(open);
        steps.push(Step::Literal(close));
        for (position, child) in dom.children(id)?.enumerate().rev() {
            steps.push(Step::Value(child));
            if named {
                steps.push(Step::FieldName(child));
            }
            if position > 0 {
                steps.push(Step::Literal(separator));
            }
        }
        Ok(())
    }

    fn field_name(&mut self, child: ValueId) -> Result<()> {
        let dom = self.dom;
        match dom.field_name_token(child)? {
            Some(token) => self.symbol(token)?,
            None if self.json => print_json_string(&mut self.out, Some("")),
            None => return Err(IonError::EmptySymbol),
        }
        self.out.push(':');
        Ok(())
    }

    fn scalar(&mut self, scalar: &Scalar) -> Result<()> {
        match scalar {
            Scalar::Bool(value) => self.out.push_str(if *value { "true" } else { "false" }),
            Scalar::Int(value) => self.out.push_str(&value.to_string()),
            Scalar::Float(value) => self.float(*value),
            Scalar::Decimal(value) => {
                let text = value.to_string();
                self.out.push_str(&text);
                if !self.json && !text.contains('.') {
                    self.out.push_str("d0");
                }
            }
            Scalar::Timestamp(value) => {
                let text = value.to_rfc3339_opts(SecondsFormat::AutoSi, true);
                if self.json {
                    print_json_string(&mut self.out, Some(&text));
                } else {
                    self.out.push_str(&text);
                }
            }
            Scalar::Symbol(token) => self.symbol(token)?,
            Scalar::String(text) => {
                if self.json {
                    print_json_string(&mut self.out, Some(text));
                } else {
                    print_string(&mut self.out, Some(text));
                }
            }
            Scalar::Clob(bytes) => {
                let text: String = bytes.iter().map(|byte| char::from(*byte)).collect();
                if self.json {
                    print_json_string(&mut self.out, Some(&text));
                } else {
                    self.out.push_str("{{\"");
                    for c in text.chars() {
                        print_code_point(&mut self.out, c, EscapeMode::IonString);
                    }
                    self.out.push_str("\"}}");
                }
            }
            Scalar::Blob(bytes) => {
                let encoded = BASE64.encode(bytes);
                if self.json {
                    print_json_string(&mut self.out, Some(&encoded));
                } else {
                    self.out.push_str("{{");
                    self.out.push_str(&encoded);
                    self.out.push_str("}}");
                }
            }
        }
        Ok(())
    }

    fn float(&mut self, value: f64) {
        if value.is_finite() {
            if self.json {
                self.out.push_str(&value.to_string());
            } else {
                self.out.push_str(&format!("{value:e}"));
            }
            return;
        }
        let text = match (self.json, value.is_nan(), value.is_sign_positive()) {
            (true, _, _) => "null",
            (false, true, _) => "nan",
            (false, false, true) => "+inf",
            (false, false, false) => "-inf",
        };
        self.out.push_str(text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    #[test]
    fn test_ion_text_of_nested_tree() {
        let mut dom = Dom::new();
        let record = dom.new_empty_struct();
        let list = dom.new_list_of_ints(&[1, 2]).unwrap();
        dom.add_type_annotation(list, "ids").unwrap();
        dom.add_field(record, "items", list).unwrap();
        let name = dom.new_string("a\nb");
        dom.add_field(record, "name", name).unwrap();
        let symbol = dom.new_symbol("null").unwrap();
        dom.add_field(record, "tag", symbol).unwrap();
        let empty = dom.new_null_of(IonType::Int);
        dom.add_field(record, "missing", empty).unwrap();

        assert_eq!(
            to_ion_text(&dom, record).unwrap(),
            "{items:ids::[1,2],name:\"a\\nb\",tag:'null',missing:null.int}"
        );
    }

    #[test]
    fn test_json_text_of_nested_tree() {
        let mut dom = Dom::new();
        let record = dom.new_empty_struct();
        let sexp = dom.new_sexp_of_ints(&[1, 2]).unwrap();
        dom.add_type_annotation(sexp, "dropped").unwrap();
        dom.add_field(record, "s", sexp).unwrap();
        let symbol = dom.new_symbol("sym").unwrap();
        dom.add_field(record, "y", symbol).unwrap();
        let blob = dom.new_blob(b"hi");
        dom.add_field(record, "b", blob).unwrap();

        assert_eq!(
            to_json_text(&dom, record).unwrap(),
            "{\"s\":[1,2],\"y\":\"sym\",\"b\":\"aGk=\"}"
        );
    }

    #[test]
    fn test_scalar_forms() {
        let mut dom = Dom::new();
        let datagram = dom.new_datagram();
        let values = [
            dom.new_float(1.5),
            dom.new_float(f64::NEG_INFINITY),
            dom.new_decimal(Decimal::new(15, 1)),
            dom.new_decimal(Decimal::new(7, 0)),
            dom.new_blob(b"hi"),
            dom.new_clob(b"x\"y"),
            dom.new_null(),
            dom.new_symbol_token(SymbolToken::from_sid(4)),
            dom.new_symbol("+").unwrap(),
        ];
        for value in values {
            dom.add(datagram, value).unwrap();
        }

        assert_eq!(
            to_ion_text(&dom, datagram).unwrap(),
            "1.5e0 -inf 1.5 7d0 {{aGk=}} {{\"x\\\"y\"}} null name '+'"
        );
    }

    #[test]
    fn test_unknown_symbol_id_renders_as_reference() {
        let mut dom = Dom::new();
        let value = dom.new_symbol_token(SymbolToken::from_sid(42));
        assert_eq!(to_ion_text(&dom, value).unwrap(), "$42");
        assert_eq!(to_json_text(&dom, value).unwrap(), "\"$42\"");
    }
}
