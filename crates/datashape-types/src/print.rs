//! Printers: canonical (via `Display`), indented, and meta-annotated.
//!
//! The canonical form round-trips through the parser to an equal type.
//! Nodes that carry their natural layout print without attributes;
//! explicit strides, field alignments and pads, column-major order, and
//! non-default encodings print their attribute forms.

use std::fmt::{self, Write};

use crate::ast::{DimKind, Dimension, Order, RecordField, TupleField, Type, TypeKind};
use crate::encoding::Encoding;
use crate::layout;
use crate::value::{TypedValue, Value};

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_type(self, f)
    }
}

fn write_type<W: Write>(t: &Type, out: &mut W) -> fmt::Result {
    match t.kind() {
        TypeKind::AnyKind => out.write_str("Any"),
        TypeKind::ScalarKind => out.write_str("Scalar"),
        TypeKind::SignedKind => out.write_str("Signed"),
        TypeKind::UnsignedKind => out.write_str("Unsigned"),
        TypeKind::RealKind => out.write_str("Real"),
        TypeKind::ComplexKind => out.write_str("Complex"),
        TypeKind::FixedStringKind => out.write_str("FixedStringKind"),
        TypeKind::FixedBytesKind => out.write_str("FixedBytesKind"),

        TypeKind::Void => out.write_str("void"),
        TypeKind::Bool => out.write_str("bool"),
        TypeKind::Int8 => out.write_str("int8"),
        TypeKind::Int16 => out.write_str("int16"),
        TypeKind::Int32 => out.write_str("int32"),
        TypeKind::Int64 => out.write_str("int64"),
        TypeKind::Uint8 => out.write_str("uint8"),
        TypeKind::Uint16 => out.write_str("uint16"),
        TypeKind::Uint32 => out.write_str("uint32"),
        TypeKind::Uint64 => out.write_str("uint64"),
        TypeKind::Float16 => out.write_str("float16"),
        TypeKind::Float32 => out.write_str("float32"),
        TypeKind::Float64 => out.write_str("float64"),
        TypeKind::Complex64 => out.write_str("complex64"),
        TypeKind::Complex128 => out.write_str("complex128"),

        TypeKind::Char(enc) => write!(out, "char({})", enc.as_str()),
        TypeKind::String => out.write_str("string"),
        TypeKind::Bytes { target_align } => write!(out, "bytes(align={target_align})"),
        TypeKind::FixedString { size, encoding } => {
            if *encoding == Encoding::Utf8 {
                write!(out, "fixed_string({size})")
            } else {
                write!(out, "fixed_string({size}, {})", encoding.as_str())
            }
        }
        TypeKind::FixedBytes { size, align } => {
            write!(out, "fixed_bytes(size={size}, align={align})")
        }
        TypeKind::Categorical(values) => {
            out.write_str("categorical(")?;
            for (i, v) in values.iter().enumerate() {
                if i > 0 {
                    out.write_str(", ")?;
                }
                write_value(v, out)?;
            }
            out.write_str(")")
        }
        TypeKind::Pointer(inner) => {
            out.write_str("pointer(")?;
            write_type(inner, out)?;
            out.write_str(")")
        }

        TypeKind::Option(inner) => {
            out.write_str("?")?;
            write_type(inner, out)
        }
        TypeKind::Nominal(name) | TypeKind::Typevar(name) => out.write_str(name),
        TypeKind::Constr { name, arg } => {
            write!(out, "{name}(")?;
            write_type(arg, out)?;
            out.write_str(")")
        }

        TypeKind::Tuple { variadic, fields } => write_tuple(*variadic, fields, out),
        TypeKind::Record { variadic, fields } => write_record(*variadic, fields, out),
        TypeKind::Function { ret, pos, kwds } => write_function(ret, pos, kwds, out),
        TypeKind::Array { order, dims, dtype } => write_array(*order, dims, dtype, t, out),
    }
}

fn write_tuple<W: Write>(variadic: bool, fields: &[TupleField], out: &mut W) -> fmt::Result {
    out.write_str("(")?;
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write_type(field.ty(), out)?;
        write_field_attrs(field.align(), field.pad(), field.ty(), out)?;
    }
    if variadic {
        if !fields.is_empty() {
            out.write_str(", ")?;
        }
        out.write_str("...")?;
    }
    out.write_str(")")
}

fn write_record<W: Write>(variadic: bool, fields: &[RecordField], out: &mut W) -> fmt::Result {
    out.write_str("{")?;
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.write_str(", ")?;
        }
        write!(out, "{} : ", field.name())?;
        write_type(field.ty(), out)?;
        write_field_attrs(field.align(), field.pad(), field.ty(), out)?;
    }
    if variadic {
        if !fields.is_empty() {
            out.write_str(", ")?;
        }
        out.write_str("...")?;
    }
    out.write_str("}")
}

/// Attribute suffix for a field whose layout departs from the natural
/// one: an alignment override or a nonzero trailing pad.
fn write_field_attrs<W: Write>(align: u8, pad: u8, ty: &Type, out: &mut W) -> fmt::Result {
    let explicit_align = align != 0 && align != ty.align();
    let mut attrs = Vec::with_capacity(2);
    if explicit_align {
        attrs.push(format!("align={align}"));
    }
    if pad != 0 {
        attrs.push(format!("pad={pad}"));
    }
    if attrs.is_empty() {
        return Ok(());
    }
    write!(out, " ({})", attrs.join(", "))
}

fn write_function<W: Write>(ret: &Type, pos: &Type, kwds: &Type, out: &mut W) -> fmt::Result {
    let TypeKind::Tuple {
        variadic: pos_variadic,
        fields: pos_fields,
    } = pos.kind()
    else {
        return Err(fmt::Error);
    };
    let TypeKind::Record {
        variadic: kwds_variadic,
        fields: kwds_fields,
    } = kwds.kind()
    else {
        return Err(fmt::Error);
    };

    if kwds_fields.is_empty() && !kwds_variadic {
        write_tuple(*pos_variadic, pos_fields, out)?;
    } else {
        let mut parts = Vec::new();
        for field in pos_fields {
            let mut s = String::new();
            write_type(field.ty(), &mut s)?;
            write_field_attrs(field.align(), field.pad(), field.ty(), &mut s)?;
            parts.push(s);
        }
        if *pos_variadic {
            parts.push("...".to_string());
        }
        for field in kwds_fields {
            let mut s = format!("{} : ", field.name());
            write_type(field.ty(), &mut s)?;
            write_field_attrs(field.align(), field.pad(), field.ty(), &mut s)?;
            parts.push(s);
        }
        if *kwds_variadic {
            parts.push("...".to_string());
        }
        write!(out, "({})", parts.join(", "))?;
    }
    out.write_str(" -> ")?;
    write_type(ret, out)
}

fn write_array<W: Write>(
    order: Order,
    dims: &[Dimension],
    dtype: &Type,
    array: &Type,
    out: &mut W,
) -> fmt::Result {
    let naturals = if array.is_abstract() {
        None
    } else {
        layout::natural_strides(order, dims, dtype).ok()
    };
    for (i, dim) in dims.iter().enumerate() {
        let natural = naturals.as_ref().map(|n| n[i]);
        write_dim(dim, natural, out)?;
        out.write_str(" * ")?;
    }
    write_type(dtype, out)?;
    if order == Order::F {
        out.write_str(" &(order='F')")?;
    }
    Ok(())
}

fn write_dim<W: Write>(dim: &Dimension, natural: Option<i64>, out: &mut W) -> fmt::Result {
    match dim.kind() {
        DimKind::FixedDimKind => out.write_str("fixed"),
        DimKind::FixedDim { shape, stride } => match stride {
            Some(s) if natural != Some(*s) => write!(out, "fixed({shape}, stride={s})"),
            _ => write!(out, "{shape}"),
        },
        DimKind::VarDim { stride } => match stride {
            Some(s) => write!(out, "var(stride={s})"),
            None => out.write_str("var"),
        },
        DimKind::SymbolicDim(name) => out.write_str(name),
        DimKind::EllipsisDim => out.write_str("..."),
    }
}

fn write_value<W: Write>(v: &TypedValue, out: &mut W) -> fmt::Result {
    // Values whose type is the one a bare literal would infer print bare;
    // everything else is annotated with its type.
    match (v.value(), v.ty().kind()) {
        (Value::Int64(i), TypeKind::Int64) => write!(out, "{i}"),
        (Value::Float64(x), TypeKind::Float64) => write!(out, "{x:?}"),
        (Value::Bool(b), TypeKind::Bool) => write!(out, "{b}"),
        (Value::String(s), TypeKind::String) => write!(out, "'{s}'"),
        (value, _) => write!(out, "{} : {}", value_lexeme(value), v.ty()),
    }
}

fn value_lexeme(v: &Value) -> String {
    match v {
        Value::Bool(b) => b.to_string(),
        Value::Int8(i) => i.to_string(),
        Value::Int16(i) => i.to_string(),
        Value::Int32(i) => i.to_string(),
        Value::Int64(i) => i.to_string(),
        Value::Uint8(u) => u.to_string(),
        Value::Uint16(u) => u.to_string(),
        Value::Uint32(u) => u.to_string(),
        Value::Uint64(u) => u.to_string(),
        Value::Float32(x) => format!("{x:?}"),
        Value::Float64(x) => format!("{x:?}"),
        Value::String(s) => format!("'{s}'"),
    }
}

/// Indented multi-line form: tuples, records, and function heads print
/// one field per line with two-space indentation.
#[must_use]
pub fn indent(t: &Type) -> String {
    let mut out = String::new();
    let _ = write_pretty(t, &mut out, 0, false);
    out
}

/// The indented form with ` # size=…, align=…` comments on the lines
/// that introduce a laid-out node.
#[must_use]
pub fn as_string_with_meta(t: &Type) -> String {
    let mut out = String::new();
    let _ = write_pretty(t, &mut out, 0, true);
    out
}

fn meta_comment(t: &Type) -> String {
    if t.is_abstract() {
        "  # abstract".to_string()
    } else {
        format!("  # size={}, align={}", t.size(), t.align())
    }
}

fn pad_lines(level: usize) -> String {
    "  ".repeat(level)
}

fn write_pretty<W: Write>(t: &Type, out: &mut W, level: usize, meta: bool) -> fmt::Result {
    match t.kind() {
        TypeKind::Record { variadic, fields } if !fields.is_empty() => {
            out.write_str("{")?;
            if meta {
                out.write_str(&meta_comment(t))?;
            }
            for (i, field) in fields.iter().enumerate() {
                write!(out, "\n{}{} : ", pad_lines(level + 1), field.name())?;
                write_pretty(field.ty(), out, level + 1, meta)?;
                write_field_attrs(field.align(), field.pad(), field.ty(), out)?;
                if i + 1 < fields.len() || *variadic {
                    out.write_str(",")?;
                }
                if meta && field.ty().is_concrete() {
                    write!(out, "  # offset={}, align={}", field.offset(), field.align())?;
                }
            }
            if *variadic {
                write!(out, "\n{}...", pad_lines(level + 1))?;
            }
            write!(out, "\n{}}}", pad_lines(level))
        }
        TypeKind::Tuple { variadic, fields } if !fields.is_empty() => {
            out.write_str("(")?;
            if meta {
                out.write_str(&meta_comment(t))?;
            }
            for (i, field) in fields.iter().enumerate() {
                write!(out, "\n{}", pad_lines(level + 1))?;
                write_pretty(field.ty(), out, level + 1, meta)?;
                write_field_attrs(field.align(), field.pad(), field.ty(), out)?;
                if i + 1 < fields.len() || *variadic {
                    out.write_str(",")?;
                }
                if meta && field.ty().is_concrete() {
                    write!(out, "  # offset={}, align={}", field.offset(), field.align())?;
                }
            }
            if *variadic {
                write!(out, "\n{}...", pad_lines(level + 1))?;
            }
            write!(out, "\n{})", pad_lines(level))
        }
        TypeKind::Option(inner) => {
            out.write_str("?")?;
            write_pretty(inner, out, level, meta)
        }
        TypeKind::Array { order, dims, dtype } => {
            let naturals = if t.is_abstract() {
                None
            } else {
                layout::natural_strides(*order, dims, dtype).ok()
            };
            for (i, dim) in dims.iter().enumerate() {
                write_dim(dim, naturals.as_ref().map(|n| n[i]), out)?;
                out.write_str(" * ")?;
            }
            write_pretty(dtype, out, level, meta)?;
            if *order == Order::F {
                out.write_str(" &(order='F')")?;
            }
            if meta && !matches!(dtype.kind(), TypeKind::Record { .. } | TypeKind::Tuple { .. }) {
                out.write_str(&meta_comment(t))?;
            }
            Ok(())
        }
        TypeKind::Function { ret, pos, kwds } => {
            write_function(ret, pos, kwds, out)?;
            if meta {
                out.write_str(&meta_comment(t))?;
            }
            Ok(())
        }
        _ => {
            write_type(t, out)?;
            if meta && level == 0 {
                out.write_str(&meta_comment(t))?;
            }
            Ok(())
        }
    }
}
