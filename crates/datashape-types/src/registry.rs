//! The process-wide typedef registry.
//!
//! Nominal types refer to their definitions by name only; this registry
//! maps names to resolved types. Readers may run concurrently; writers
//! (`typedef_add`, `init`, `finalize`) take the write half of the lock.
//! `init` must happen-before any other use, which is the caller's
//! obligation exactly as in the C API this mirrors.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

use datashape_common::{Error, Result};

use crate::ast::Type;

static REGISTRY: Lazy<RwLock<IndexMap<String, Type>>> =
    Lazy::new(|| RwLock::new(IndexMap::new()));

/// Bind `name` to `ty`.
///
/// Rebinding to an equal type is idempotent; rebinding to a different
/// type reports `ValueError`.
pub fn typedef_add(name: &str, ty: Type) -> Result<()> {
    if name.is_empty() {
        return Err(Error::value("typedef name must be a non-empty identifier"));
    }
    let mut map = REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    match map.get(name) {
        Some(existing) if *existing == ty => Ok(()),
        Some(_) => Err(Error::value(format!("cannot redefine typedef '{name}'"))),
        None => {
            debug!(name, "registering typedef");
            map.insert(name.to_string(), ty);
            Ok(())
        }
    }
}

/// Look up a typedef, returning a deep copy of the bound type.
pub fn typedef_find(name: &str) -> Result<Type> {
    let map = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    map.get(name)
        .cloned()
        .ok_or_else(|| Error::value(format!("undefined typedef '{name}'")))
}

/// Layout metadata of a binding, without copying the whole type.
pub(crate) fn layout_of(name: &str) -> Result<(u64, u8, bool)> {
    let map = REGISTRY.read().unwrap_or_else(PoisonError::into_inner);
    map.get(name)
        .map(|ty| (ty.size(), ty.align(), ty.is_abstract()))
        .ok_or_else(|| Error::value(format!("undefined typedef '{name}'")))
}

/// Populate the registry with the platform aliases `size`, `intptr`, and
/// `uintptr`, sized from the target pointer width. Idempotent.
pub fn init() -> Result<()> {
    let (size, intptr, uintptr) = match std::mem::size_of::<usize>() {
        8 => (Type::uint64(), Type::int64(), Type::uint64()),
        4 => (Type::uint32(), Type::int32(), Type::uint32()),
        other => {
            return Err(Error::runtime(format!(
                "unsupported pointer width {other}"
            )));
        }
    };
    typedef_add("size", size)?;
    typedef_add("intptr", intptr)?;
    typedef_add("uintptr", uintptr)
}

/// Empty the registry.
pub fn finalize() {
    let mut map = REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner);
    debug!(count = map.len(), "clearing typedef registry");
    map.clear();
}
