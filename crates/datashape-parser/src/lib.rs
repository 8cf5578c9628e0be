//! Recursive-descent parser for the datashape surface syntax.
//!
//! The parser consumes the scanner's token stream and builds types
//! through the validating constructors in `datashape-types`, so every
//! parsed value satisfies the same invariants as a programmatically
//! constructed one. Keyword attributes (`name=value` lists) are checked
//! against per-production tables; `typedef` statements register their
//! binding in the process-wide registry as they are parsed.

mod attrs;
mod parser;

pub use parser::{parse, parse_file};
