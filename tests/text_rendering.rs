//! Rendering and text escaping through the public API

use chrono::{FixedOffset, TimeZone};
use ion_dom::text::{
    self, SymbolVariant, decode_utf16, print_quoted_symbol, print_string_utf16, symbol_variant,
    to_ion_text, to_json_text,
};
use ion_dom::{Dom, IonError, IonType, SurrogateKind, SymbolToken};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_render_datagram_with_annotations() {
    let mut dom = Dom::new();
    let datagram = dom.new_datagram();
    let point = dom.new_empty_struct();
    let x = dom.new_int(3);
    let y = dom.new_int(-4);
    dom.add_field(point, "x", x).unwrap();
    dom.add_field(point, "y", y).unwrap();
    dom.set_type_annotations(point, &["geo", "point 2d"]).unwrap();
    dom.add(datagram, point).unwrap();

    let ops = dom.new_empty_sexp();
    let plus = dom.new_symbol("+").unwrap();
    let one = dom.new_int(1);
    dom.add(ops, plus).unwrap();
    dom.add(ops, one).unwrap();
    dom.add(datagram, ops).unwrap();

    let nothing = dom.new_null_of(IonType::Struct);
    dom.add(datagram, nothing).unwrap();

    assert_eq!(
        to_ion_text(&dom, datagram).unwrap(),
        "geo::'point 2d'::{x:3,y:-4} ('+' 1) null.struct"
    );
    assert_eq!(
        to_json_text(&dom, datagram).unwrap(),
        "{\"x\":3,\"y\":-4} [\"+\",1] null"
    );
}

#[test]
fn test_render_timestamp() {
    let mut dom = Dom::new();
    let offset = FixedOffset::east_opt(0).unwrap();
    let when = offset.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
    let value = dom.new_timestamp(when);
    assert_eq!(to_ion_text(&dom, value).unwrap(), "2024-03-01T12:30:00Z");
    assert_eq!(to_json_text(&dom, value).unwrap(), "\"2024-03-01T12:30:00Z\"");
}

#[rstest]
#[case("plain", SymbolVariant::Identifier, "'plain'")]
#[case("false", SymbolVariant::Quoted, "'false'")]
#[case("it's", SymbolVariant::Quoted, "'it\\'s'")]
#[case("<=", SymbolVariant::Operator, "'<='")]
fn test_symbol_forms(#[case] input: &str, #[case] variant: SymbolVariant, #[case] quoted: &str) {
    assert_eq!(symbol_variant(input).unwrap(), variant);
    let mut out = String::new();
    print_quoted_symbol(&mut out, Some(input));
    assert_eq!(out, quoted);
}

#[test]
fn test_unmatched_surrogates_are_reported() {
    let err = decode_utf16(&[0x41, 0xDBFF]).unwrap_err();
    assert_eq!(
        err,
        IonError::InvalidEncoding {
            code_unit: 0xDBFF,
            index: 1,
            kind: SurrogateKind::UnmatchedHigh,
        }
    );

    let mut out = String::new();
    assert!(print_string_utf16(&mut out, Some(&[0xDC01])).is_err());
    print_string_utf16(&mut out, None).unwrap();
    assert_eq!(out, "null.string");
    assert_eq!(text::print_code_point_as_string('\u{e9}'), "\"\\xe9\"");
}

#[test]
fn test_symbol_ids_render_through_the_table() {
    let mut dom = Dom::new();
    let datagram = dom.new_datagram();
    let table = dom.symbol_table(datagram).unwrap();
    let spaced = table.write().intern("$a b").unwrap();
    let plain = table.write().intern("plain").unwrap();

    for sid in [spaced, plain, 99] {
        let value = dom.new_symbol_token(SymbolToken::from_sid(sid));
        dom.add(datagram, value).unwrap();
    }

    assert_eq!(to_ion_text(&dom, datagram).unwrap(), "'$a b' plain $99");
    assert_eq!(
        to_json_text(&dom, datagram).unwrap(),
        "\"$a b\" \"plain\" \"$99\""
    );
}

#[test]
fn test_render_deeply_nested_lists() {
    const DEPTH: usize = 4_000;
    let mut dom = Dom::new();
    let root = dom.new_empty_list();
    let mut innermost = root;
    for _ in 0..DEPTH {
        let next = dom.new_empty_list();
        dom.add(innermost, next).unwrap();
        innermost = next;
    }
    let leaf = dom.new_int(7);
    dom.add(innermost, leaf).unwrap();

    let expected = format!("{}7{}", "[".repeat(DEPTH + 1), "]".repeat(DEPTH + 1));
    assert_eq!(to_ion_text(&dom, root).unwrap(), expected);
    assert_eq!(to_json_text(&dom, root).unwrap(), expected);
}
