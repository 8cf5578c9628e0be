//! The datashape type algebra.
//!
//! This crate holds the recursive type representation and everything that
//! operates on it without going through text:
//! - Type, dimension, and field nodes with validated constructors (`ast`)
//! - The layout engine computing size/align during construction (`layout`)
//! - Structural equality (derived) and structural matching (`matching`)
//! - The process-wide typedef registry (`registry`)
//! - The canonical, indented, and meta-annotated printers (`print`)
//!
//! Types are immutable after construction and `Send + Sync`; all sharing
//! is by deep clone or shared reference.

pub mod ast;
pub use ast::{DimKind, Dimension, Order, RecordField, TupleField, Type, TypeKind};

pub mod encoding;
pub use encoding::Encoding;

pub mod value;
pub use value::{TypedValue, Value};

mod layout;

pub mod matching;
pub use matching::matches;

pub mod registry;
pub use registry::{finalize, init, typedef_add, typedef_find};

pub mod print;
pub use print::{as_string_with_meta, indent};

#[cfg(test)]
mod tests;
