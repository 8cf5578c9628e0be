use datashape_common::ErrorKind;
use datashape_parser::parse;
use datashape_types::{DimKind, Dimension, Encoding, Order, Type, TypeKind, matches};

fn parse_ok(source: &str) -> Type {
    match parse(source) {
        Ok(t) => t,
        Err(err) => panic!("expected `{source}` to parse, got {err}"),
    }
}

fn parse_err(source: &str) -> ErrorKind {
    match parse(source) {
        Ok(t) => panic!("expected `{source}` to fail, got {t}"),
        Err(err) => err.kind,
    }
}

#[test]
fn parses_primitive_scalars() {
    assert_eq!(parse_ok("int32"), Type::int32());
    assert_eq!(parse_ok("complex128"), Type::complex128());
    assert_eq!(parse_ok("void"), Type::void());
    assert_eq!(parse_ok("string"), Type::string());
}

#[test]
fn parses_kind_wildcards() {
    assert_eq!(parse_ok("Any"), Type::any_kind());
    assert_eq!(parse_ok("Signed"), Type::signed_kind());
    assert_eq!(parse_ok("FixedBytesKind"), Type::fixed_bytes_kind());
}

#[test]
fn parses_a_fixed_array_with_layout() {
    let t = parse_ok("10 * 20 * float64");
    assert!(t.is_concrete());
    assert_eq!(t.size(), 1600);
    assert_eq!(t.align(), 8);
    let TypeKind::Array { order, dims, dtype } = t.kind() else {
        panic!("expected an array");
    };
    assert_eq!(*order, Order::C);
    assert_eq!(dims.len(), 2);
    assert!(matches!(dims[0].kind(), DimKind::FixedDim { shape: 10, .. }));
    assert!(matches!(dims[1].kind(), DimKind::FixedDim { shape: 20, .. }));
    assert_eq!(**dtype, Type::float64());
}

#[test]
fn parses_dimension_kinds() {
    let t = parse_ok("... * var * fixed * N * int8");
    let TypeKind::Array { dims, .. } = t.kind() else {
        panic!("expected an array");
    };
    assert!(matches!(dims[0].kind(), DimKind::EllipsisDim));
    assert!(matches!(dims[1].kind(), DimKind::VarDim { stride: None }));
    assert!(matches!(dims[2].kind(), DimKind::FixedDimKind));
    assert!(matches!(dims[3].kind(), DimKind::SymbolicDim(n) if n == "N"));
    assert!(t.is_abstract());
}

#[test]
fn parses_explicit_strides() {
    let t = parse_ok("fixed(10, stride=320) * 20 * float64");
    assert_eq!(
        t,
        Type::array(
            Order::C,
            vec![Dimension::fixed_with_stride(10, 320), Dimension::fixed(20)],
            Type::float64(),
        )
        .unwrap()
    );

    let t = parse_ok("var(stride=16) * int32");
    let TypeKind::Array { dims, .. } = t.kind() else {
        panic!("expected an array");
    };
    assert!(matches!(dims[0].kind(), DimKind::VarDim { stride: Some(16) }));
}

#[test]
fn parses_column_major_order() {
    let t = parse_ok("10 * 20 * float64 &(order='F')");
    let TypeKind::Array { order, .. } = t.kind() else {
        panic!("expected an array");
    };
    assert_eq!(*order, Order::F);

    let c = parse_ok("10 * 20 * float64 &(order='C')");
    assert_eq!(c, parse_ok("10 * 20 * float64"));
}

#[test]
fn parses_a_record_with_field_layout() {
    let t = parse_ok("{a : int32, b : ?string}");
    let TypeKind::Record { fields, .. } = t.kind() else {
        panic!("expected a record");
    };
    assert_eq!(fields[0].name(), "a");
    assert_eq!(fields[0].offset(), 0);
    assert_eq!(fields[0].align(), 4);
    assert_eq!(fields[1].name(), "b");
    assert_eq!(fields[1].offset(), std::mem::align_of::<usize>() as u64);
    assert_eq!(t.align(), std::mem::align_of::<usize>() as u8);
}

#[test]
fn parses_symbolic_dims_as_abstract() {
    let t = parse_ok("N * M * ?complex64");
    assert!(t.is_abstract());
    assert_eq!(t.size(), 0);
    let TypeKind::Array { dims, dtype, .. } = t.kind() else {
        panic!("expected an array");
    };
    assert!(matches!(dims[0].kind(), DimKind::SymbolicDim(n) if n == "N"));
    assert!(matches!(dtype.kind(), TypeKind::Option(_)));
}

#[test]
fn parses_categoricals() {
    let t = parse_ok("categorical('up', 'down', 'left', 'right')");
    let TypeKind::Categorical(values) = t.kind() else {
        panic!("expected a categorical");
    };
    assert_eq!(values.len(), 4);
    assert_eq!(*values[0].ty(), Type::string());

    assert_eq!(parse_err("categorical('up', 'down', 'up')"), ErrorKind::Value);

    let t = parse_ok("categorical(1 : uint8, 2 : uint8)");
    let TypeKind::Categorical(values) = t.kind() else {
        panic!("expected a categorical");
    };
    assert_eq!(*values[0].ty(), Type::uint8());

    assert_eq!(parse_err("categorical(256 : uint8)"), ErrorKind::Value);
    assert_eq!(parse_err("categorical(1 : float16)"), ErrorKind::NotImplemented);

    let t = parse_ok("categorical(1.5, -2.5)");
    let TypeKind::Categorical(values) = t.kind() else {
        panic!("expected a categorical");
    };
    assert_eq!(*values[0].ty(), Type::float64());

    let t = parse_ok("categorical(true, false)");
    assert!(t.is_concrete());
}

#[test]
fn parses_functions() {
    let t = parse_ok("(int32, float64) -> bool");
    let TypeKind::Function { ret, pos, kwds } = t.kind() else {
        panic!("expected a function");
    };
    assert_eq!(**ret, Type::bool());
    let TypeKind::Tuple { fields, .. } = pos.kind() else {
        panic!("expected a tuple");
    };
    assert_eq!(fields.len(), 2);
    let TypeKind::Record { fields, .. } = kwds.kind() else {
        panic!("expected a record");
    };
    assert!(fields.is_empty());
}

#[test]
fn parses_function_keyword_parameters() {
    let t = parse_ok("(int32, scale : float64) -> bool");
    let TypeKind::Function { pos, kwds, .. } = t.kind() else {
        panic!("expected a function");
    };
    let TypeKind::Tuple { fields, .. } = pos.kind() else {
        panic!("expected a tuple");
    };
    assert_eq!(fields.len(), 1);
    let TypeKind::Record { fields, .. } = kwds.kind() else {
        panic!("expected a record");
    };
    assert_eq!(fields[0].name(), "scale");

    // Named parameters outside a function head are rejected.
    assert_eq!(parse_err("(scale : float64)"), ErrorKind::Parse);
}

#[test]
fn parses_variadic_markers() {
    let t = parse_ok("(int32, ...)");
    assert!(t.is_abstract());
    let TypeKind::Tuple { variadic, .. } = t.kind() else {
        panic!("expected a tuple");
    };
    assert!(*variadic);

    let t = parse_ok("{a : int32, ...}");
    let TypeKind::Record { variadic, .. } = t.kind() else {
        panic!("expected a record");
    };
    assert!(*variadic);

    let t = parse_ok("(int32, ..., scale : float64, ...) -> bool");
    let TypeKind::Function { pos, kwds, .. } = t.kind() else {
        panic!("expected a function");
    };
    assert!(pos.is_abstract());
    assert!(kwds.is_abstract());
}

#[test]
fn parses_options_and_wrappers() {
    assert_eq!(parse_ok("?int32"), Type::option(Type::int32()).unwrap());
    assert_eq!(parse_err("??int32"), ErrorKind::Type);
    assert_eq!(parse_ok("pointer(int64)"), Type::pointer(Type::int64()));
    assert_eq!(
        parse_ok("matrix(10 * 10 * float64)").kind(),
        Type::constr(
            "matrix",
            parse_ok("10 * 10 * float64"),
        )
        .unwrap()
        .kind()
    );
}

#[test]
fn parses_typevars_and_binds_them_in_matching() {
    let t = parse_ok("T");
    assert_eq!(t, Type::typevar("T").unwrap());

    let pattern = parse_ok("(T, T)");
    assert!(matches(&pattern, &parse_ok("(int32, int32)")));
    assert!(!matches(&pattern, &parse_ok("(int32, int64)")));
}

#[test]
fn parses_char_and_string_scalars() {
    assert_eq!(parse_ok("char(utf32)"), Type::char(Encoding::Utf32));
    assert_eq!(parse_ok("char('ascii')"), Type::char(Encoding::Ascii));
    assert_eq!(parse_err("char(latin1)"), ErrorKind::Value);

    assert_eq!(
        parse_ok("fixed_string(10, utf16)"),
        Type::fixed_string(10, Encoding::Utf16).unwrap()
    );
    assert_eq!(
        parse_ok("fixed_string(10)"),
        Type::fixed_string(10, Encoding::Utf8).unwrap()
    );
    assert_eq!(parse_ok("bytes(align=2)"), Type::bytes(2).unwrap());
    assert_eq!(
        parse_ok("fixed_bytes(size=10, align=2)"),
        Type::fixed_bytes(10, 2).unwrap()
    );
}

#[test]
fn structural_violations_keep_their_kinds() {
    // Ellipsis not leftmost.
    assert_eq!(parse_err("2 * ... * int32"), ErrorKind::Type);
    // Unregistered nominal reference.
    assert_eq!(parse_err("no_such_typedef_anywhere"), ErrorKind::Value);
}

#[test]
fn reports_parse_errors_with_positions() {
    let err = parse("10 * * int32").unwrap_err();
    assert_eq!(err.kind, ErrorKind::Parse);
    assert!(err.message.contains("line 1"), "{err}");
    assert!(err.span.is_some());

    assert_eq!(parse_err(""), ErrorKind::Parse);
    assert_eq!(parse_err("int32 int64"), ErrorKind::Parse);
    assert_eq!(parse_err("{a int32}"), ErrorKind::Parse);
    assert_eq!(parse_err("(int32"), ErrorKind::Parse);
}

#[test]
fn rejects_reserved_names_as_dimensions() {
    assert_eq!(parse_err("int32 * float64"), ErrorKind::Parse);
}

#[test]
fn negative_shapes_are_value_errors() {
    assert_eq!(parse_err("-3 * int32"), ErrorKind::Value);
}
