//! Ion text helpers: symbol classification and string escaping
//!
//! All printers append to a `String`. Inputs of `None` print the typed
//! null for the target (`null.string`, `null.symbol`, or plain `null`
//! for JSON).

pub mod render;

use crate::error::{IonError, Result, SurrogateKind};

pub use render::{to_ion_text, to_json_text};

/// How a symbol must be written in Ion text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SymbolVariant {
    /// Bare identifier such as `abc_1`
    Identifier,
    /// Bare operator run such as `+=`, legal only inside s-expressions
    Operator,
    /// Needs single quotes
    Quoted,
}

/// Escaping rules for each kind of quoted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    Json,
    IonSymbol,
    IonString,
    IonLongString,
}

const OPERATOR_CHARS: &[char] = &[
    '<', '>', '=', '+', '-', '*', '&', '^', '%', '~', '/', '?', '.', ';', '!', '|', '@', '`', '#',
];

pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Characters that terminate a numeric token; `None` stands for end of input
pub fn is_numeric_stop(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => matches!(c, '{' | '}' | '[' | ']' | '(' | ')' | ',' | '"' | '\'') || is_whitespace(c),
    }
}

/// Digit test for radix 8, 10 or 16; any other radix accepts nothing
pub fn is_digit(c: char, radix: u32) -> bool {
    matches!(radix, 8 | 10 | 16) && c.is_ascii() && c.is_digit(radix)
}

pub fn is_identifier_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

pub fn is_identifier_part(c: char) -> bool {
    is_identifier_start(c) || c.is_ascii_digit()
}

pub fn is_operator_part(c: char) -> bool {
    OPERATOR_CHARS.contains(&c)
}

/// Identifier text that the reader would take as a literal
pub fn is_identifier_keyword(text: &str) -> bool {
    matches!(text, "true" | "false" | "null" | "nan")
}

/// Classify `text` by the form it must take in Ion text
pub fn symbol_variant(text: &str) -> Result<SymbolVariant> {
    let Some(first) = text.chars().next() else {
        return Err(IonError::EmptySymbol);
    };
    if is_identifier_keyword(text) {
        return Ok(SymbolVariant::Quoted);
    }
    if is_identifier_start(first) {
        return Ok(if text.chars().all(is_identifier_part) {
            SymbolVariant::Identifier
        } else {
            SymbolVariant::Quoted
        });
    }
    if is_operator_part(first) {
        return Ok(if text.chars().all(is_operator_part) {
            SymbolVariant::Operator
        } else {
            SymbolVariant::Quoted
        });
    }
    Ok(SymbolVariant::Quoted)
}

fn push_hex(out: &mut String, prefix: &str, width: usize, value: u32) {
    out.push_str(prefix);
    out.push_str(&format!("{value:0width$x}"));
}

/// Append `c`, escaped as `mode` requires
pub fn print_code_point(out: &mut String, c: char, mode: EscapeMode) {
    let json = mode == EscapeMode::Json;
    match c {
        '\0' if json => return out.push_str("\\u0000"),
        '\0' => return out.push_str("\\0"),
        '\t' => return out.push_str("\\t"),
        '\n' if mode == EscapeMode::IonLongString => return out.push('\n'),
        '\n' => return out.push_str("\\n"),
        '\r' => return out.push_str("\\r"),
        '\u{0C}' => return out.push_str("\\f"),
        '\u{08}' => return out.push_str("\\b"),
        '\u{07}' if json => return out.push_str("\\u0007"),
        '\u{07}' => return out.push_str("\\a"),
        '\u{0B}' => return out.push_str("\\v"),
        '\\' => return out.push_str("\\\\"),
        '"' if matches!(mode, EscapeMode::Json | EscapeMode::IonString) => {
            return out.push_str("\\\"");
        }
        '\'' if matches!(mode, EscapeMode::IonSymbol | EscapeMode::IonLongString) => {
            return out.push_str("\\'");
        }
        _ => {}
    }

    let code = u32::from(c);
    match code {
        0..=0x1F | 0x7F..=0xFF if json => push_hex(out, "\\u", 4, code),
        0..=0x1F | 0x7F..=0xFF => push_hex(out, "\\x", 2, code),
        0x20..=0x7E => out.push(c),
        0x100..=0xFFFF => push_hex(out, "\\u", 4, code),
        _ => push_hex(out, "\\U", 8, code),
    }
}

fn print_code_points(out: &mut String, text: &str, mode: EscapeMode) {
    for c in text.chars() {
        print_code_point(out, c, mode);
    }
}

/// Double-quoted Ion string
pub fn print_string(out: &mut String, text: Option<&str>) {
    match text {
        None => out.push_str("null.string"),
        Some(text) => {
            out.push('"');
            print_code_points(out, text, EscapeMode::IonString);
            out.push('"');
        }
    }
}

/// Triple-quoted Ion string; newlines stay literal
pub fn print_long_string(out: &mut String, text: Option<&str>) {
    match text {
        None => out.push_str("null.string"),
        Some(text) => {
            out.push_str("'''");
            print_code_points(out, text, EscapeMode::IonLongString);
            out.push_str("'''");
        }
    }
}

pub fn print_json_string(out: &mut String, text: Option<&str>) {
    match text {
        None => out.push_str("null"),
        Some(text) => {
            out.push('"');
            print_code_points(out, text, EscapeMode::Json);
            out.push('"');
        }
    }
}

/// Symbol text, quoted unless it is a plain identifier
///
/// Operators are quoted as well since they are only legal inside
/// s-expressions.
pub fn print_symbol(out: &mut String, text: Option<&str>) -> Result<()> {
    match text {
        None => out.push_str("null.symbol"),
        Some(text) => match symbol_variant(text)? {
            SymbolVariant::Identifier => out.push_str(text),
            SymbolVariant::Operator | SymbolVariant::Quoted => print_quoted_symbol(out, Some(text)),
        },
    }
    Ok(())
}

/// Symbol text, always single-quoted
pub fn print_quoted_symbol(out: &mut String, text: Option<&str>) {
    match text {
        None => out.push_str("null.symbol"),
        Some(text) => {
            out.push('\'');
            print_code_points(out, text, EscapeMode::IonSymbol);
            out.push('\'');
        }
    }
}

/// A single code point as a quoted Ion string
pub fn print_code_point_as_string(c: char) -> String {
    let mut out = String::with_capacity(12);
    out.push('"');
    print_code_point(&mut out, c, EscapeMode::IonString);
    out.push('"');
    out
}

/// Decode UTF-16, rejecting unmatched surrogate halves
pub fn decode_utf16(units: &[u16]) -> Result<String> {
    let mut out = String::with_capacity(units.len());
    let mut index = 0;
    for decoded in char::decode_utf16(units.iter().copied()) {
        match decoded {
            Ok(c) => {
                out.push(c);
                index += c.len_utf16();
            }
            Err(err) => {
                let code_unit = err.unpaired_surrogate();
                let kind = if (0xD800..0xDC00).contains(&code_unit) {
                    SurrogateKind::UnmatchedHigh
                } else {
                    SurrogateKind::UnmatchedLow
                };
                return Err(IonError::InvalidEncoding {
                    code_unit,
                    index,
                    kind,
                });
            }
        }
    }
    Ok(out)
}

/// Double-quoted Ion string from UTF-16 input
pub fn print_string_utf16(out: &mut String, units: Option<&[u16]>) -> Result<()> {
    match units {
        None => out.push_str("null.string"),
        Some(units) => {
            let text = decode_utf16(units)?;
            print_string(out, Some(&text));
        }
    }
    Ok(())
}
