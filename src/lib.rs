//! Datashape: a type system for describing the memory layout of
//! multidimensional, heterogeneous, possibly-abstract data.
//!
//! The crate parses the datashape surface syntax into an immutable type
//! representation, computes sizes and alignments during construction,
//! and exposes structural equality and pattern matching over the result:
//!
//! ```
//! use datashape::{matches, parse, Type};
//!
//! datashape::init().unwrap();
//!
//! let t = parse("10 * 20 * float64").unwrap();
//! assert_eq!(t.size(), 1600);
//! assert_eq!(t.align(), 8);
//!
//! // Kind wildcards, typevars, and ellipsis dimensions match schemas.
//! let pattern = parse("... * Scalar").unwrap();
//! assert!(matches(&pattern, &t));
//!
//! // Canonical printing round-trips.
//! assert_eq!(parse(&t.to_string()).unwrap(), t);
//! ```
//!
//! Functionality lives in the member crates and is re-exported here:
//! `datashape-common` (errors, spans), `datashape-scanner` (tokens),
//! `datashape-types` (the type algebra), and `datashape-parser`.

pub use datashape_common::{Error, ErrorKind, Result, Span};

pub use datashape_types::{
    DimKind, Dimension, Encoding, Order, RecordField, TupleField, Type, TypeKind, TypedValue,
    Value, as_string_with_meta, finalize, indent, init, matches, typedef_add, typedef_find,
};

pub use datashape_parser::{parse, parse_file};
