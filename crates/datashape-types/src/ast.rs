//! The recursive datashape type representation.
//!
//! A [`Type`] is a tagged kind plus layout metadata (`size`, `align`) and
//! an abstractness flag, all computed at construction time. Nodes are
//! immutable once built; every constructor validates its arguments, runs
//! the layout engine, and classifies the node as abstract or concrete.
//!
//! Abstractness follows one uniform rule: a node is abstract iff any child
//! is abstract or the node itself is a kind wildcard, a symbolic or
//! ellipsis dimension, a typevar, or a variadic tuple/record. Abstract
//! nodes carry `size = 0` and `align = 0`.

use datashape_common::{Error, Result};

use crate::encoding::Encoding;
use crate::layout;
use crate::registry;
use crate::value::TypedValue;

/// Element order of an array: row-major (`C`) or column-major (`F`).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Order {
    C,
    F,
}

impl Order {
    #[must_use]
    pub const fn as_char(self) -> char {
        match self {
            Order::C => 'C',
            Order::F => 'F',
        }
    }
}

/// A dimension of an array.
///
/// `itemsize`/`itemalign` are filled in by the containing array's layout
/// pass: the innermost dimension's itemsize is the element size, each
/// outer dimension's itemsize is the product of everything inside it.
#[derive(Clone, Debug, PartialEq)]
pub struct Dimension {
    pub(crate) kind: DimKind,
    pub(crate) itemsize: u64,
    pub(crate) itemalign: u8,
    pub(crate) is_abstract: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DimKind {
    /// Wildcard matching any fixed dimension.
    FixedDimKind,
    /// Fixed shape. `stride` is `None` until the containing array is laid
    /// out, at which point concrete arrays materialize the natural stride.
    FixedDim { shape: u64, stride: Option<i64> },
    /// Variable-length dimension; shape is a runtime property.
    VarDim { stride: Option<i64> },
    /// Named shape variable, bound during matching.
    SymbolicDim(String),
    /// Matches zero or more dimensions; leftmost only, at most one.
    EllipsisDim,
}

impl Dimension {
    fn make(kind: DimKind, is_abstract: bool) -> Dimension {
        Dimension {
            kind,
            itemsize: 0,
            itemalign: 0,
            is_abstract,
        }
    }

    #[must_use]
    pub fn fixed(shape: u64) -> Dimension {
        Dimension::make(DimKind::FixedDim { shape, stride: None }, false)
    }

    #[must_use]
    pub fn fixed_with_stride(shape: u64, stride: i64) -> Dimension {
        Dimension::make(
            DimKind::FixedDim {
                shape,
                stride: Some(stride),
            },
            false,
        )
    }

    #[must_use]
    pub fn fixed_kind() -> Dimension {
        Dimension::make(DimKind::FixedDimKind, true)
    }

    #[must_use]
    pub fn var() -> Dimension {
        Dimension::make(DimKind::VarDim { stride: None }, true)
    }

    #[must_use]
    pub fn var_with_stride(stride: i64) -> Dimension {
        Dimension::make(
            DimKind::VarDim {
                stride: Some(stride),
            },
            true,
        )
    }

    pub fn symbolic(name: impl Into<String>) -> Result<Dimension> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument("symbolic dimension name must be non-empty"));
        }
        Ok(Dimension::make(DimKind::SymbolicDim(name), true))
    }

    #[must_use]
    pub fn ellipsis() -> Dimension {
        Dimension::make(DimKind::EllipsisDim, true)
    }

    #[must_use]
    pub fn kind(&self) -> &DimKind {
        &self.kind
    }

    #[must_use]
    pub fn itemsize(&self) -> u64 {
        self.itemsize
    }

    #[must_use]
    pub fn itemalign(&self) -> u8 {
        self.itemalign
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }
}

/// A positional field of a tuple.
///
/// `align`/`pad` overrides come from the surface syntax or the builder;
/// `offset` and the effective alignment are assigned by the tuple's
/// layout pass. An `align` of 0 means "use the field type's alignment".
#[derive(Clone, Debug, PartialEq)]
pub struct TupleField {
    pub(crate) ty: Type,
    pub(crate) offset: u64,
    pub(crate) align: u8,
    pub(crate) pad: u8,
}

impl TupleField {
    pub fn new(ty: Type, align: Option<u8>, pad: Option<u8>) -> Result<TupleField> {
        if let Some(a) = align {
            validate_field_align(a)?;
        }
        Ok(TupleField {
            ty,
            offset: 0,
            align: align.unwrap_or(0),
            pad: pad.unwrap_or(0),
        })
    }

    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn align(&self) -> u8 {
        self.align
    }

    #[must_use]
    pub fn pad(&self) -> u8 {
        self.pad
    }
}

/// A named field of a record. Layout slots behave as for [`TupleField`].
#[derive(Clone, Debug, PartialEq)]
pub struct RecordField {
    pub(crate) name: String,
    pub(crate) ty: Type,
    pub(crate) offset: u64,
    pub(crate) align: u8,
    pub(crate) pad: u8,
}

impl RecordField {
    pub fn new(
        name: impl Into<String>,
        ty: Type,
        align: Option<u8>,
        pad: Option<u8>,
    ) -> Result<RecordField> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument("record field name must be non-empty"));
        }
        if let Some(a) = align {
            validate_field_align(a)?;
        }
        Ok(RecordField {
            name,
            ty,
            offset: 0,
            align: align.unwrap_or(0),
            pad: pad.unwrap_or(0),
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn ty(&self) -> &Type {
        &self.ty
    }

    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    #[must_use]
    pub fn align(&self) -> u8 {
        self.align
    }

    #[must_use]
    pub fn pad(&self) -> u8 {
        self.pad
    }
}

fn validate_field_align(align: u8) -> Result<()> {
    if !align.is_power_of_two() {
        return Err(Error::invalid_argument(format!(
            "alignment must be a power of two in [1, 255], got {align}"
        )));
    }
    Ok(())
}

/// A datashape type.
///
/// Equality is structural over the kind and the computed metadata; since
/// the metadata is a function of the kind, two types are equal exactly
/// when their kinds are structurally equal. Nominal types compare by
/// name without consulting the registry.
#[derive(Clone, Debug, PartialEq)]
pub struct Type {
    pub(crate) kind: TypeKind,
    pub(crate) size: u64,
    pub(crate) align: u8,
    pub(crate) is_abstract: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TypeKind {
    /// Top of the lattice; matches anything.
    AnyKind,
    Array {
        order: Order,
        dims: Vec<Dimension>,
        dtype: Box<Type>,
    },
    Option(Box<Type>),
    /// Reference to a typedef by name; resolvable at construction time.
    Nominal(String),
    Constr {
        name: String,
        arg: Box<Type>,
    },
    Tuple {
        variadic: bool,
        fields: Vec<TupleField>,
    },
    Record {
        variadic: bool,
        fields: Vec<RecordField>,
    },
    Function {
        ret: Box<Type>,
        /// Positional parameters; always a `Tuple`.
        pos: Box<Type>,
        /// Keyword parameters; always a `Record`.
        kwds: Box<Type>,
    },
    Typevar(String),

    // Kind wildcards
    ScalarKind,
    SignedKind,
    UnsignedKind,
    RealKind,
    ComplexKind,
    FixedStringKind,
    FixedBytesKind,

    // Primitive scalars
    Void,
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float16,
    Float32,
    Float64,
    Complex64,
    Complex128,

    Char(Encoding),
    /// Variable-length UTF-8 string (pointer + size head).
    String,
    /// Variable-length bytes (pointer + size head); `target_align` is the
    /// alignment of the pointed-to buffer.
    Bytes {
        target_align: u8,
    },
    FixedString {
        size: u64,
        encoding: Encoding,
    },
    FixedBytes {
        size: u64,
        align: u8,
    },
    Categorical(Vec<TypedValue>),
    Pointer(Box<Type>),
}

impl Type {
    fn abstract_node(kind: TypeKind) -> Type {
        Type {
            kind,
            size: 0,
            align: 0,
            is_abstract: true,
        }
    }

    fn concrete_node(kind: TypeKind, size: u64, align: u8) -> Type {
        Type {
            kind,
            size,
            align,
            is_abstract: false,
        }
    }

    // ------------------------------------------------------------------
    // Wildcards
    // ------------------------------------------------------------------

    #[must_use]
    pub fn any_kind() -> Type {
        Type::abstract_node(TypeKind::AnyKind)
    }

    #[must_use]
    pub fn scalar_kind() -> Type {
        Type::abstract_node(TypeKind::ScalarKind)
    }

    #[must_use]
    pub fn signed_kind() -> Type {
        Type::abstract_node(TypeKind::SignedKind)
    }

    #[must_use]
    pub fn unsigned_kind() -> Type {
        Type::abstract_node(TypeKind::UnsignedKind)
    }

    #[must_use]
    pub fn real_kind() -> Type {
        Type::abstract_node(TypeKind::RealKind)
    }

    #[must_use]
    pub fn complex_kind() -> Type {
        Type::abstract_node(TypeKind::ComplexKind)
    }

    #[must_use]
    pub fn fixed_string_kind() -> Type {
        Type::abstract_node(TypeKind::FixedStringKind)
    }

    #[must_use]
    pub fn fixed_bytes_kind() -> Type {
        Type::abstract_node(TypeKind::FixedBytesKind)
    }

    pub fn typevar(name: impl Into<String>) -> Result<Type> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument("typevar name must be non-empty"));
        }
        Ok(Type::abstract_node(TypeKind::Typevar(name)))
    }

    // ------------------------------------------------------------------
    // Primitive scalars
    // ------------------------------------------------------------------

    #[must_use]
    pub fn void() -> Type {
        Type::primitive(TypeKind::Void)
    }

    #[must_use]
    pub fn bool() -> Type {
        Type::primitive(TypeKind::Bool)
    }

    #[must_use]
    pub fn int8() -> Type {
        Type::primitive(TypeKind::Int8)
    }

    #[must_use]
    pub fn int16() -> Type {
        Type::primitive(TypeKind::Int16)
    }

    #[must_use]
    pub fn int32() -> Type {
        Type::primitive(TypeKind::Int32)
    }

    #[must_use]
    pub fn int64() -> Type {
        Type::primitive(TypeKind::Int64)
    }

    #[must_use]
    pub fn uint8() -> Type {
        Type::primitive(TypeKind::Uint8)
    }

    #[must_use]
    pub fn uint16() -> Type {
        Type::primitive(TypeKind::Uint16)
    }

    #[must_use]
    pub fn uint32() -> Type {
        Type::primitive(TypeKind::Uint32)
    }

    #[must_use]
    pub fn uint64() -> Type {
        Type::primitive(TypeKind::Uint64)
    }

    #[must_use]
    pub fn float16() -> Type {
        Type::primitive(TypeKind::Float16)
    }

    #[must_use]
    pub fn float32() -> Type {
        Type::primitive(TypeKind::Float32)
    }

    #[must_use]
    pub fn float64() -> Type {
        Type::primitive(TypeKind::Float64)
    }

    #[must_use]
    pub fn complex64() -> Type {
        Type::primitive(TypeKind::Complex64)
    }

    #[must_use]
    pub fn complex128() -> Type {
        Type::primitive(TypeKind::Complex128)
    }

    fn primitive(kind: TypeKind) -> Type {
        let (size, align) = layout::primitive(&kind)
            .unwrap_or((0, 1));
        Type::concrete_node(kind, size, align)
    }

    /// Signed integer selected by width in bytes.
    pub fn signed_int(nbytes: u8) -> Result<Type> {
        match nbytes {
            1 => Ok(Type::int8()),
            2 => Ok(Type::int16()),
            4 => Ok(Type::int32()),
            8 => Ok(Type::int64()),
            _ => Err(Error::value(format!("invalid signed integer width {nbytes}"))),
        }
    }

    /// Unsigned integer selected by width in bytes.
    pub fn unsigned_int(nbytes: u8) -> Result<Type> {
        match nbytes {
            1 => Ok(Type::uint8()),
            2 => Ok(Type::uint16()),
            4 => Ok(Type::uint32()),
            8 => Ok(Type::uint64()),
            _ => Err(Error::value(format!("invalid unsigned integer width {nbytes}"))),
        }
    }

    // ------------------------------------------------------------------
    // Other scalars
    // ------------------------------------------------------------------

    #[must_use]
    pub fn char(encoding: Encoding) -> Type {
        let unit = encoding.unit();
        Type::concrete_node(TypeKind::Char(encoding), unit, unit as u8)
    }

    #[must_use]
    pub fn string() -> Type {
        Type::concrete_node(TypeKind::String, 2 * layout::PTR_SIZE, layout::PTR_ALIGN)
    }

    pub fn bytes(target_align: u8) -> Result<Type> {
        validate_field_align(target_align)?;
        Ok(Type::concrete_node(
            TypeKind::Bytes { target_align },
            2 * layout::PTR_SIZE,
            layout::PTR_ALIGN,
        ))
    }

    pub fn fixed_string(size: u64, encoding: Encoding) -> Result<Type> {
        let nbytes = size
            .checked_mul(encoding.unit())
            .ok_or_else(layout::size_overflow)?;
        Ok(Type::concrete_node(
            TypeKind::FixedString { size, encoding },
            nbytes,
            encoding.unit() as u8,
        ))
    }

    /// `size` is in bytes and need not be a multiple of `align`.
    pub fn fixed_bytes(size: u64, align: u8) -> Result<Type> {
        validate_field_align(align)?;
        Ok(Type::concrete_node(
            TypeKind::FixedBytes { size, align },
            size,
            align,
        ))
    }

    /// A categorical over a non-empty, duplicate-free sequence of values
    /// of one concrete scalar type.
    pub fn categorical(values: Vec<TypedValue>) -> Result<Type> {
        if values.is_empty() {
            return Err(Error::value("categorical requires at least one value"));
        }
        let first_ty = values[0].ty().clone();
        for v in &values[1..] {
            if *v.ty() != first_ty {
                return Err(Error::type_error("categorical values must share one type"));
            }
        }
        for (i, v) in values.iter().enumerate() {
            if values[..i].contains(v) {
                return Err(Error::value("duplicate categorical value"));
            }
        }
        let (size, align) = (first_ty.size(), first_ty.align());
        Ok(Type::concrete_node(TypeKind::Categorical(values), size, align))
    }

    #[must_use]
    pub fn pointer(inner: Type) -> Type {
        if inner.is_abstract {
            return Type::abstract_node(TypeKind::Pointer(Box::new(inner)));
        }
        Type::concrete_node(
            TypeKind::Pointer(Box::new(inner)),
            layout::PTR_SIZE,
            layout::PTR_ALIGN,
        )
    }

    // ------------------------------------------------------------------
    // Wrappers and named types
    // ------------------------------------------------------------------

    /// Nullable wrapper. Options do not nest.
    pub fn option(inner: Type) -> Result<Type> {
        if matches!(inner.kind, TypeKind::Option(_)) {
            return Err(Error::type_error("option types cannot be nested"));
        }
        let (size, align, is_abstract) = (inner.size, inner.align, inner.is_abstract);
        Ok(Type {
            kind: TypeKind::Option(Box::new(inner)),
            size,
            align,
            is_abstract,
        })
    }

    /// Named reference to a typedef; the name must be registered.
    pub fn nominal(name: impl Into<String>) -> Result<Type> {
        let name = name.into();
        let (size, align, is_abstract) = registry::layout_of(&name)?;
        Ok(Type {
            kind: TypeKind::Nominal(name),
            size,
            align,
            is_abstract,
        })
    }

    /// Named reference to a typedef whose definition is still being
    /// built, e.g. a list node pointing at itself. The reference is
    /// opaque and carries no layout of its own; it is only meaningful
    /// behind `pointer(...)`.
    pub fn nominal_forward(name: impl Into<String>) -> Result<Type> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument("typedef name must be non-empty"));
        }
        Ok(Type {
            kind: TypeKind::Nominal(name),
            size: 0,
            align: 1,
            is_abstract: false,
        })
    }

    /// Named single-argument constructor, e.g. `matrix(10 * 10 * float64)`.
    pub fn constr(name: impl Into<String>, arg: Type) -> Result<Type> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::invalid_argument("constructor name must be non-empty"));
        }
        let (size, align, is_abstract) = (arg.size, arg.align, arg.is_abstract);
        Ok(Type {
            kind: TypeKind::Constr {
                name,
                arg: Box::new(arg),
            },
            size,
            align,
            is_abstract,
        })
    }

    // ------------------------------------------------------------------
    // Aggregates
    // ------------------------------------------------------------------

    pub fn tuple(variadic: bool, fields: Vec<TupleField>) -> Result<Type> {
        let is_abstract = variadic || fields.iter().any(|f| f.ty.is_abstract);
        let mut fields = fields;
        let (size, align) = if is_abstract {
            (0, 0)
        } else {
            layout::aggregate_layout(&mut fields)?
        };
        Ok(Type {
            kind: TypeKind::Tuple { variadic, fields },
            size,
            align,
            is_abstract,
        })
    }

    pub fn record(variadic: bool, fields: Vec<RecordField>) -> Result<Type> {
        for (i, f) in fields.iter().enumerate() {
            if fields[..i].iter().any(|g| g.name == f.name) {
                return Err(Error::invalid_argument(format!(
                    "duplicate record field '{}'",
                    f.name
                )));
            }
        }
        let is_abstract = variadic || fields.iter().any(|f| f.ty.is_abstract);
        let mut fields = fields;
        let (size, align) = if is_abstract {
            (0, 0)
        } else {
            layout::aggregate_layout(&mut fields)?
        };
        Ok(Type {
            kind: TypeKind::Record { variadic, fields },
            size,
            align,
            is_abstract,
        })
    }

    /// A function signature. `pos` must be a tuple and `kwds` a record.
    pub fn function(ret: Type, pos: Type, kwds: Type) -> Result<Type> {
        if !matches!(pos.kind, TypeKind::Tuple { .. }) {
            return Err(Error::invalid_argument("function positional parameters must be a tuple"));
        }
        if !matches!(kwds.kind, TypeKind::Record { .. }) {
            return Err(Error::invalid_argument("function keyword parameters must be a record"));
        }
        let is_abstract = ret.is_abstract || pos.is_abstract || kwds.is_abstract;
        Ok(Type {
            kind: TypeKind::Function {
                ret: Box::new(ret),
                pos: Box::new(pos),
                kwds: Box::new(kwds),
            },
            // A signature describes no storage of its own.
            size: 0,
            align: if is_abstract { 0 } else { 1 },
            is_abstract,
        })
    }

    // ------------------------------------------------------------------
    // Arrays
    // ------------------------------------------------------------------

    pub fn array(order: Order, dims: Vec<Dimension>, dtype: Type) -> Result<Type> {
        if dims.is_empty() {
            return Err(Error::invalid_argument("array requires at least one dimension"));
        }
        if matches!(dtype.kind, TypeKind::Array { .. }) {
            return Err(Error::type_error("array element type cannot itself be an array"));
        }
        let ellipses = dims
            .iter()
            .filter(|d| matches!(d.kind, DimKind::EllipsisDim))
            .count();
        if ellipses > 1 {
            return Err(Error::type_error("at most one ellipsis dimension is allowed"));
        }
        if ellipses == 1 && !matches!(dims[0].kind, DimKind::EllipsisDim) {
            return Err(Error::type_error("an ellipsis must be the leftmost dimension"));
        }
        let is_abstract = dtype.is_abstract || dims.iter().any(|d| d.is_abstract);
        let mut dims = dims;
        let (size, align) = if is_abstract {
            (0, 0)
        } else {
            layout::array_layout(order, &mut dims, &dtype)?
        };
        Ok(Type {
            kind: TypeKind::Array {
                order,
                dims,
                dtype: Box::new(dtype),
            },
            size,
            align,
            is_abstract,
        })
    }

    // ------------------------------------------------------------------
    // Accessors and predicates
    // ------------------------------------------------------------------

    #[must_use]
    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    /// Size in bytes; 0 for abstract types.
    #[must_use]
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Alignment in bytes; 0 for abstract types.
    #[must_use]
    pub fn align(&self) -> u8 {
        self.align
    }

    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    #[must_use]
    pub fn is_concrete(&self) -> bool {
        !self.is_abstract
    }

    #[must_use]
    pub fn is_signed(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Int8 | TypeKind::Int16 | TypeKind::Int32 | TypeKind::Int64
        )
    }

    #[must_use]
    pub fn is_unsigned(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Uint8 | TypeKind::Uint16 | TypeKind::Uint32 | TypeKind::Uint64
        )
    }

    #[must_use]
    pub fn is_real(&self) -> bool {
        matches!(
            self.kind,
            TypeKind::Float16 | TypeKind::Float32 | TypeKind::Float64
        )
    }

    #[must_use]
    pub fn is_complex(&self) -> bool {
        matches!(self.kind, TypeKind::Complex64 | TypeKind::Complex128)
    }

    /// True for every scalar: the primitives, characters, strings, bytes,
    /// categoricals, and pointers.
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.is_signed()
            || self.is_unsigned()
            || self.is_real()
            || self.is_complex()
            || matches!(
                self.kind,
                TypeKind::Void
                    | TypeKind::Bool
                    | TypeKind::Char(_)
                    | TypeKind::String
                    | TypeKind::Bytes { .. }
                    | TypeKind::FixedString { .. }
                    | TypeKind::FixedBytes { .. }
                    | TypeKind::Categorical(_)
                    | TypeKind::Pointer(_)
            )
    }
}
