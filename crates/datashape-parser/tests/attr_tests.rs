//! Keyword attribute validation across the productions that accept
//! attribute lists.

use datashape_common::ErrorKind;
use datashape_parser::parse;
use datashape_types::{Type, TypeKind};

fn parse_err(source: &str) -> ErrorKind {
    match parse(source) {
        Ok(t) => panic!("expected `{source}` to fail, got {t}"),
        Err(err) => err.kind,
    }
}

#[test]
fn unknown_keywords_are_rejected() {
    assert_eq!(parse_err("var(strid=8) * int32"), ErrorKind::InvalidArgument);
    assert_eq!(parse_err("bytes(alignment=2)"), ErrorKind::InvalidArgument);
    assert_eq!(
        parse_err("{a : int32 (offset=8)}"),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        parse_err("2 * int32 &(layout='F')"),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn repeated_keywords_are_rejected() {
    assert_eq!(
        parse_err("fixed(2, stride=8, stride=8) * int32"),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        parse_err("{a : int32 (align=4, align=4)}"),
        ErrorKind::InvalidArgument
    );
    assert_eq!(
        parse_err("fixed_bytes(size=8, size=8)"),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn keyword_value_types_are_checked() {
    assert_eq!(parse_err("var(stride='8') * int32"), ErrorKind::InvalidArgument);
    assert_eq!(parse_err("bytes(align='2')"), ErrorKind::InvalidArgument);
    assert_eq!(parse_err("2 * int32 &(order=70)"), ErrorKind::InvalidArgument);
    assert_eq!(
        parse_err("bytes(align=int32)"),
        ErrorKind::InvalidArgument
    );
}

#[test]
fn missing_required_keywords_are_rejected() {
    assert_eq!(parse_err("fixed_bytes(align=2)"), ErrorKind::InvalidArgument);
}

#[test]
fn integer_ranges_are_enforced() {
    assert_eq!(parse_err("bytes(align=256)"), ErrorKind::Value);
    assert_eq!(parse_err("bytes(align=-1)"), ErrorKind::Value);
    assert_eq!(parse_err("{a : int32 (align=300)}"), ErrorKind::Value);
    assert_eq!(parse_err("{a : int32 (pad=300)}"), ErrorKind::Value);
    assert_eq!(parse_err("fixed_bytes(size=-1, align=2)"), ErrorKind::Value);
    // In range for the keyword but not a valid alignment.
    assert_eq!(parse_err("bytes(align=0)"), ErrorKind::InvalidArgument);
    assert_eq!(parse_err("bytes(align=3)"), ErrorKind::InvalidArgument);
}

#[test]
fn order_values_are_restricted() {
    assert_eq!(parse_err("2 * int32 &(order='X')"), ErrorKind::InvalidArgument);
    assert!(parse("2 * int32 &(order='C')").is_ok());
    assert!(parse("2 * int32 &(order='F')").is_ok());
}

#[test]
fn field_attributes_reach_the_layout() {
    let t = parse("{a : int32 (align=1), b : int8 (align=1)}").unwrap();
    let TypeKind::Record { fields, .. } = t.kind() else {
        panic!("expected a record");
    };
    assert_eq!(fields[0].offset(), 0);
    assert_eq!(fields[1].offset(), 4);
    assert_eq!(t.size(), 5);
    assert_eq!(t.align(), 1);

    let t = parse("(int8 (pad=3), int8)").unwrap();
    let TypeKind::Tuple { fields, .. } = t.kind() else {
        panic!("expected a tuple");
    };
    assert_eq!(fields[1].offset(), 4);

    let t = parse("(int32 (align=8), int8)").unwrap();
    let TypeKind::Tuple { fields, .. } = t.kind() else {
        panic!("expected a tuple");
    };
    assert_eq!(fields[0].align(), 8);
    assert_eq!(t.align(), 8);
}

#[test]
fn stride_attributes_accept_the_full_signed_range() {
    assert!(parse("fixed(2, stride=-16) * int32").is_ok());
    assert!(parse("var(stride=-16) * int32").is_ok());
    // i64 overflow in the literal itself.
    assert_eq!(
        parse_err("fixed(2, stride=9223372036854775808) * int32"),
        ErrorKind::Value
    );
}

#[test]
fn fixed_bytes_align_defaults_to_one() {
    let t = parse("fixed_bytes(size=10)").unwrap();
    assert_eq!(t, Type::fixed_bytes(10, 1).unwrap());
}
