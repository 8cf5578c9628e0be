use crate::ast::{DimKind, Dimension, Order, RecordField, TupleField, Type, TypeKind};
use crate::encoding::Encoding;

fn ptr_size() -> u64 {
    std::mem::size_of::<usize>() as u64
}

fn ptr_align() -> u8 {
    std::mem::align_of::<usize>() as u8
}

fn fixed_strides(t: &Type) -> Vec<i64> {
    let TypeKind::Array { dims, .. } = t.kind() else {
        panic!("expected an array, got {t}");
    };
    dims.iter()
        .map(|d| match d.kind() {
            DimKind::FixedDim { stride, .. } => stride.expect("stride must be materialized"),
            other => panic!("expected a fixed dimension, got {other:?}"),
        })
        .collect()
}

#[test]
fn test_primitive_layout_table() {
    let cases = [
        (Type::void(), 0, 1),
        (Type::bool(), 1, 1),
        (Type::int8(), 1, 1),
        (Type::int16(), 2, 2),
        (Type::int32(), 4, 4),
        (Type::int64(), 8, 8),
        (Type::uint8(), 1, 1),
        (Type::uint64(), 8, 8),
        (Type::float16(), 2, 2),
        (Type::float32(), 4, 4),
        (Type::float64(), 8, 8),
        (Type::complex64(), 8, 4),
        (Type::complex128(), 16, 8),
    ];
    for (t, size, align) in cases {
        assert_eq!(t.size(), size, "{t}");
        assert_eq!(t.align(), align, "{t}");
        assert!(t.is_concrete());
    }
}

#[test]
fn test_string_and_bytes_use_a_two_word_head() {
    let s = Type::string();
    assert_eq!(s.size(), 2 * ptr_size());
    assert_eq!(s.align(), ptr_align());

    let b = Type::bytes(16).unwrap();
    assert_eq!(b.size(), 2 * ptr_size());
    assert_eq!(b.align(), ptr_align());
}

#[test]
fn test_pointer_and_char_layout() {
    let p = Type::pointer(Type::float64());
    assert_eq!(p.size(), ptr_size());
    assert_eq!(p.align(), ptr_align());

    let c = Type::char(Encoding::Utf32);
    assert_eq!(c.size(), 4);
    assert_eq!(c.align(), 4);
}

#[test]
fn test_fixed_string_scales_by_code_unit() {
    let t = Type::fixed_string(10, Encoding::Utf16).unwrap();
    assert_eq!(t.size(), 20);
    assert_eq!(t.align(), 2);

    let t = Type::fixed_string(10, Encoding::Utf8).unwrap();
    assert_eq!(t.size(), 10);
    assert_eq!(t.align(), 1);
}

#[test]
fn test_fixed_bytes_size_need_not_be_a_multiple_of_align() {
    let t = Type::fixed_bytes(10, 4).unwrap();
    assert_eq!(t.size(), 10);
    assert_eq!(t.align(), 4);
}

#[test]
fn test_record_default_layout() {
    let t = Type::record(
        false,
        vec![
            RecordField::new("a", Type::int32(), None, None).unwrap(),
            RecordField::new("b", Type::int8(), None, None).unwrap(),
        ],
    )
    .unwrap();
    let TypeKind::Record { fields, .. } = t.kind() else {
        panic!("expected a record");
    };
    assert_eq!(fields[0].offset(), 0);
    assert_eq!(fields[1].offset(), 4);
    assert_eq!(t.size(), 8);
    assert_eq!(t.align(), 4);
}

#[test]
fn test_record_with_explicit_packing() {
    let t = Type::record(
        false,
        vec![
            RecordField::new("a", Type::int32(), Some(1), None).unwrap(),
            RecordField::new("b", Type::int8(), Some(1), None).unwrap(),
        ],
    )
    .unwrap();
    let TypeKind::Record { fields, .. } = t.kind() else {
        panic!("expected a record");
    };
    assert_eq!(fields[0].offset(), 0);
    assert_eq!(fields[1].offset(), 4);
    assert_eq!(t.size(), 5);
    assert_eq!(t.align(), 1);
}

#[test]
fn test_tuple_pad_shifts_the_next_field() {
    let t = Type::tuple(
        false,
        vec![
            TupleField::new(Type::int8(), None, Some(3)).unwrap(),
            TupleField::new(Type::int8(), None, None).unwrap(),
        ],
    )
    .unwrap();
    let TypeKind::Tuple { fields, .. } = t.kind() else {
        panic!("expected a tuple");
    };
    assert_eq!(fields[0].offset(), 0);
    // 1 byte of int8 plus 3 bytes of requested pad
    assert_eq!(fields[1].offset(), 4);
    assert_eq!(t.size(), 5);
    assert_eq!(t.align(), 1);
}

#[test]
fn test_record_with_pointer_aligned_field() {
    let t = Type::record(
        false,
        vec![
            RecordField::new("a", Type::int32(), None, None).unwrap(),
            RecordField::new("b", Type::option(Type::string()).unwrap(), None, None).unwrap(),
        ],
    )
    .unwrap();
    let TypeKind::Record { fields, .. } = t.kind() else {
        panic!("expected a record");
    };
    assert_eq!(fields[0].offset(), 0);
    let b_offset = fields[1].offset();
    assert_eq!(b_offset % ptr_align() as u64, 0);
    assert_eq!(b_offset, ptr_align() as u64);
    assert_eq!(t.align(), ptr_align());
}

#[test]
fn test_c_order_array_layout() {
    let t = Type::array(
        Order::C,
        vec![Dimension::fixed(10), Dimension::fixed(20)],
        Type::float64(),
    )
    .unwrap();
    assert_eq!(t.size(), 1600);
    assert_eq!(t.align(), 8);

    let TypeKind::Array { dims, .. } = t.kind() else {
        panic!("expected an array");
    };
    assert_eq!(dims[0].itemsize(), 160);
    assert_eq!(dims[1].itemsize(), 8);
    assert_eq!(dims[0].itemalign(), 8);

    assert_eq!(fixed_strides(&t), vec![160, 8]);
}

#[test]
fn test_f_order_array_strides_walk_outer_dims_fastest() {
    let t = Type::array(
        Order::F,
        vec![Dimension::fixed(10), Dimension::fixed(20)],
        Type::float64(),
    )
    .unwrap();
    assert_eq!(t.size(), 1600);
    assert_eq!(fixed_strides(&t), vec![8, 80]);
}

#[test]
fn test_explicit_strides_are_preserved() {
    let t = Type::array(
        Order::C,
        vec![Dimension::fixed_with_stride(10, 320), Dimension::fixed(20)],
        Type::float64(),
    )
    .unwrap();
    assert_eq!(fixed_strides(&t), vec![320, 8]);
}

#[test]
fn test_abstract_arrays_have_zero_layout() {
    let t = Type::array(
        Order::C,
        vec![
            Dimension::symbolic("N").unwrap(),
            Dimension::symbolic("M").unwrap(),
        ],
        Type::option(Type::complex64()).unwrap(),
    )
    .unwrap();
    assert!(t.is_abstract());
    assert_eq!(t.size(), 0);
    assert_eq!(t.align(), 0);

    let t = Type::array(Order::C, vec![Dimension::var()], Type::int32()).unwrap();
    assert!(t.is_abstract());
    assert_eq!(t.size(), 0);
}

#[test]
fn test_option_and_constr_pass_layout_through() {
    let t = Type::option(Type::string()).unwrap();
    assert_eq!(t.size(), Type::string().size());
    assert_eq!(t.align(), Type::string().align());

    let t = Type::constr("matrix", Type::float64()).unwrap();
    assert_eq!(t.size(), 8);
    assert_eq!(t.align(), 8);
}

#[test]
fn test_empty_tuple_is_the_unit_layout() {
    let t = Type::tuple(false, vec![]).unwrap();
    assert!(t.is_concrete());
    assert_eq!(t.size(), 0);
    assert_eq!(t.align(), 1);
}
