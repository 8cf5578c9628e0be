//! Typed scalar values, the element type of categoricals.

use datashape_common::{Error, Result, numeric};

use crate::ast::{Type, TypeKind};

/// A scalar bit-pattern tagged by width.
#[derive(Clone, Debug)]
pub enum Value {
    Bool(bool),
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    Uint8(u8),
    Uint16(u16),
    Uint32(u32),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
}

/// Values compare bitwise; floats by IEEE bit pattern, except that a NaN
/// is never equal to anything, including itself.
impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int8(a), Value::Int8(b)) => a == b,
            (Value::Int16(a), Value::Int16(b)) => a == b,
            (Value::Int32(a), Value::Int32(b)) => a == b,
            (Value::Int64(a), Value::Int64(b)) => a == b,
            (Value::Uint8(a), Value::Uint8(b)) => a == b,
            (Value::Uint16(a), Value::Uint16(b)) => a == b,
            (Value::Uint32(a), Value::Uint32(b)) => a == b,
            (Value::Uint64(a), Value::Uint64(b)) => a == b,
            (Value::Float32(a), Value::Float32(b)) => {
                !a.is_nan() && !b.is_nan() && a.to_bits() == b.to_bits()
            }
            (Value::Float64(a), Value::Float64(b)) => {
                !a.is_nan() && !b.is_nan() && a.to_bits() == b.to_bits()
            }
            (Value::String(a), Value::String(b)) => a == b,
            _ => false,
        }
    }
}

/// A value paired with its type, as stored by `categorical(...)`.
///
/// The type must be a concrete primitive scalar or `string`; the
/// constructors below enforce this.
#[derive(Clone, Debug, PartialEq)]
pub struct TypedValue {
    ty: Type,
    value: Value,
}

impl TypedValue {
    /// Build a typed value from a numeric literal, range-checked against
    /// the target type. `float16` has no value representation and reports
    /// `NotImplementedError`.
    pub fn from_number(lexeme: &str, ty: Type) -> Result<TypedValue> {
        let value = match ty.kind() {
            TypeKind::Int8 => Value::Int8(int_in_range(lexeme, i8::MIN as i64, i8::MAX as i64)? as i8),
            TypeKind::Int16 => {
                Value::Int16(int_in_range(lexeme, i16::MIN as i64, i16::MAX as i64)? as i16)
            }
            TypeKind::Int32 => {
                Value::Int32(int_in_range(lexeme, i32::MIN as i64, i32::MAX as i64)? as i32)
            }
            TypeKind::Int64 => Value::Int64(numeric::parse_i64(lexeme)?),
            TypeKind::Uint8 => Value::Uint8(uint_in_range(lexeme, u8::MAX as u64)? as u8),
            TypeKind::Uint16 => Value::Uint16(uint_in_range(lexeme, u16::MAX as u64)? as u16),
            TypeKind::Uint32 => Value::Uint32(uint_in_range(lexeme, u32::MAX as u64)? as u32),
            TypeKind::Uint64 => Value::Uint64(numeric::parse_u64(lexeme)?),
            TypeKind::Float32 => Value::Float32(numeric::parse_f64(lexeme)? as f32),
            TypeKind::Float64 => Value::Float64(numeric::parse_f64(lexeme)?),
            TypeKind::Float16 => {
                return Err(Error::not_implemented("float16 values are not representable"));
            }
            _ => {
                return Err(Error::invalid_argument(format!(
                    "'{lexeme}' requires a numeric scalar type"
                )));
            }
        };
        Ok(TypedValue { ty, value })
    }

    /// Build a typed value from a `true`/`false` literal; the type must be `bool`.
    pub fn from_bool(lexeme: &str, ty: Type) -> Result<TypedValue> {
        if !matches!(ty.kind(), TypeKind::Bool) {
            return Err(Error::invalid_argument(format!(
                "'{lexeme}' requires the bool type"
            )));
        }
        Ok(TypedValue {
            ty,
            value: Value::Bool(numeric::parse_bool(lexeme)?),
        })
    }

    /// Build a typed value from a string literal; the type must be `string`.
    pub fn from_string(contents: impl Into<String>, ty: Type) -> Result<TypedValue> {
        if !matches!(ty.kind(), TypeKind::String) {
            return Err(Error::invalid_argument("a quoted value requires the string type"));
        }
        Ok(TypedValue {
            ty,
            value: Value::String(contents.into()),
        })
    }

    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

fn int_in_range(lexeme: &str, min: i64, max: i64) -> Result<i64> {
    numeric::parse_i64_range(lexeme, min, max)
}

fn uint_in_range(lexeme: &str, max: u64) -> Result<u64> {
    let v = numeric::parse_u64(lexeme)?;
    if v > max {
        return Err(Error::value(format!("integer '{lexeme}' out of range [0, {max}]")));
    }
    Ok(v)
}
