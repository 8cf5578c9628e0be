//! Layout engine: sizes, alignments, offsets, and strides.
//!
//! Constructors call into this module while building a node. All
//! arithmetic is checked; overflowing a `u64` reports `ValueError`.

use datashape_common::{Error, Result};

use crate::ast::{DimKind, Dimension, Order, RecordField, TupleField, Type, TypeKind};

/// Size of a machine pointer on the build target.
pub(crate) const PTR_SIZE: u64 = std::mem::size_of::<usize>() as u64;
pub(crate) const PTR_ALIGN: u8 = std::mem::align_of::<usize>() as u8;

pub(crate) fn size_overflow() -> Error {
    Error::value("datashape size too large")
}

/// `x` rounded up to the next multiple of `align` (`align >= 1`).
pub(crate) fn round_up(x: u64, align: u64) -> Result<u64> {
    let bumped = x.checked_add(align - 1).ok_or_else(size_overflow)?;
    Ok(bumped / align * align)
}

/// The fixed size/align table for primitive scalars; `None` for
/// everything that is not a primitive.
pub(crate) fn primitive(kind: &TypeKind) -> Option<(u64, u8)> {
    Some(match kind {
        TypeKind::Void => (0, 1),
        TypeKind::Bool => (1, 1),
        TypeKind::Int8 | TypeKind::Uint8 => (1, 1),
        TypeKind::Int16 | TypeKind::Uint16 | TypeKind::Float16 => (2, 2),
        TypeKind::Int32 | TypeKind::Uint32 | TypeKind::Float32 => (4, 4),
        TypeKind::Int64 | TypeKind::Uint64 | TypeKind::Float64 => (8, 8),
        TypeKind::Complex64 => (8, 4),
        TypeKind::Complex128 => (16, 8),
        _ => return None,
    })
}

/// Fields that participate in C-struct layout.
pub(crate) trait AggregateField {
    fn ty(&self) -> &Type;
    fn align_slot(&mut self) -> &mut u8;
    fn offset_slot(&mut self) -> &mut u64;
    fn pad(&self) -> u8;
}

impl AggregateField for TupleField {
    fn ty(&self) -> &Type {
        &self.ty
    }
    fn align_slot(&mut self) -> &mut u8 {
        &mut self.align
    }
    fn offset_slot(&mut self) -> &mut u64 {
        &mut self.offset
    }
    fn pad(&self) -> u8 {
        self.pad
    }
}

impl AggregateField for RecordField {
    fn ty(&self) -> &Type {
        &self.ty
    }
    fn align_slot(&mut self) -> &mut u8 {
        &mut self.align
    }
    fn offset_slot(&mut self) -> &mut u64 {
        &mut self.offset
    }
    fn pad(&self) -> u8 {
        self.pad
    }
}

/// C-struct layout over a concrete field sequence.
///
/// Each field is placed at the previous end (including that field's
/// requested trailing pad) rounded up to the field's effective alignment;
/// the aggregate's alignment is the max of the effective field alignments
/// and its size is the final end rounded up to that alignment.
pub(crate) fn aggregate_layout<F: AggregateField>(fields: &mut [F]) -> Result<(u64, u8)> {
    let mut end: u64 = 0;
    let mut maxalign: u8 = 1;
    for field in fields.iter_mut() {
        let align = match *field.align_slot() {
            0 => field.ty().align(),
            explicit => explicit,
        };
        maxalign = maxalign.max(align);
        let offset = round_up(end, align as u64)?;
        *field.offset_slot() = offset;
        *field.align_slot() = align;
        end = offset
            .checked_add(field.ty().size())
            .and_then(|e| e.checked_add(field.pad() as u64))
            .ok_or_else(size_overflow)?;
    }
    let size = round_up(end, maxalign as u64)?;
    Ok((size, maxalign))
}

/// Layout for a concrete array: assigns itemsize/itemalign to every
/// dimension from the innermost out, materializes natural strides where
/// the user supplied none, and returns the array's total size/align.
///
/// The caller guarantees every dimension is a `FixedDim` and the dtype is
/// concrete.
pub(crate) fn array_layout(
    order: Order,
    dims: &mut [Dimension],
    dtype: &Type,
) -> Result<(u64, u8)> {
    let mut itemsize = dtype.size();
    let itemalign = dtype.align();
    for dim in dims.iter_mut().rev() {
        dim.itemsize = itemsize;
        dim.itemalign = itemalign;
        let shape = match &dim.kind {
            DimKind::FixedDim { shape, .. } => *shape,
            _ => return Err(Error::runtime("concrete array with an abstract dimension")),
        };
        itemsize = itemsize.checked_mul(shape).ok_or_else(size_overflow)?;
    }
    let naturals = natural_strides(order, dims, dtype)?;
    for (dim, natural) in dims.iter_mut().zip(naturals) {
        if let DimKind::FixedDim { stride, .. } = &mut dim.kind {
            if stride.is_none() {
                *stride = Some(natural);
            }
        }
    }
    Ok((itemsize, itemalign))
}

/// Natural byte strides of a concrete dimension sequence.
///
/// Row-major (`C`): a dimension steps by its own itemsize. Column-major
/// (`F`): the leftmost dimension varies fastest, stepping by the element
/// size, and each dimension to the right steps by the previous stride
/// times the previous shape.
pub(crate) fn natural_strides(
    order: Order,
    dims: &[Dimension],
    dtype: &Type,
) -> Result<Vec<i64>> {
    let shape_of = |dim: &Dimension| -> Result<u64> {
        match &dim.kind {
            DimKind::FixedDim { shape, .. } => Ok(*shape),
            _ => Err(Error::runtime("concrete array with an abstract dimension")),
        }
    };
    match order {
        Order::C => dims
            .iter()
            .map(|d| {
                i64::try_from(d.itemsize).map_err(|_| size_overflow())
            })
            .collect(),
        Order::F => {
            let mut strides = Vec::with_capacity(dims.len());
            let mut stride = i64::try_from(dtype.size()).map_err(|_| size_overflow())?;
            for dim in dims {
                strides.push(stride);
                let shape = i64::try_from(shape_of(dim)?).map_err(|_| size_overflow())?;
                stride = stride.checked_mul(shape).ok_or_else(size_overflow)?;
            }
            Ok(strides)
        }
    }
}
