//! Table-driven validation of `name=value` attribute lists.
//!
//! Each production that accepts attributes declares a table of
//! [`AttrSpec`] entries; [`validate_attrs`] checks the parsed list
//! against the table and hands the values back in table order. Unknown
//! names, repeated names, and wrong value types all report
//! `InvalidArgumentError` naming the offending keyword; values outside a
//! declared integer range report `ValueError`.

use smallvec::SmallVec;

use datashape_common::{Error, Result, Span};
use datashape_types::Type;

/// A parsed `name=value` pair.
#[derive(Debug)]
pub(crate) struct Attr {
    pub name: String,
    pub value: AttrValue,
    pub span: Span,
}

#[derive(Debug)]
pub(crate) enum AttrValue {
    Int(i64),
    Str(String),
    Ty(Type),
}

impl AttrValue {
    fn describe(&self) -> &'static str {
        match self {
            AttrValue::Int(_) => "an integer",
            AttrValue::Str(_) => "a string",
            AttrValue::Ty(_) => "a type",
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum AttrTag {
    Int64,
    Str,
}

/// One recognized attribute of a production.
pub(crate) struct AttrSpec {
    pub name: &'static str,
    pub tag: AttrTag,
    pub required: bool,
}

pub(crate) const fn required(name: &'static str, tag: AttrTag) -> AttrSpec {
    AttrSpec {
        name,
        tag,
        required: true,
    }
}

pub(crate) const fn optional(name: &'static str, tag: AttrTag) -> AttrSpec {
    AttrSpec {
        name,
        tag,
        required: false,
    }
}

pub(crate) type AttrList = SmallVec<[Attr; 2]>;

/// Check `attrs` against `specs` and return the values in table order.
pub(crate) fn validate_attrs(
    production: &str,
    specs: &[AttrSpec],
    attrs: AttrList,
) -> Result<Vec<Option<AttrValue>>> {
    let mut slots: Vec<Option<AttrValue>> = specs.iter().map(|_| None).collect();
    for attr in attrs {
        let Some(index) = specs.iter().position(|s| s.name == attr.name) else {
            return Err(Error::invalid_argument(format!(
                "unknown keyword '{}' in {production}",
                attr.name
            ))
            .with_span(attr.span));
        };
        if slots[index].is_some() {
            return Err(Error::invalid_argument(format!(
                "repeated keyword '{}' in {production}",
                attr.name
            ))
            .with_span(attr.span));
        }
        let matches_tag = match specs[index].tag {
            AttrTag::Int64 => matches!(attr.value, AttrValue::Int(_)),
            AttrTag::Str => matches!(attr.value, AttrValue::Str(_)),
        };
        if !matches_tag {
            return Err(Error::invalid_argument(format!(
                "keyword '{}' in {production} expects {}, got {}",
                attr.name,
                match specs[index].tag {
                    AttrTag::Int64 => "an integer",
                    AttrTag::Str => "a string",
                },
                attr.value.describe()
            ))
            .with_span(attr.span));
        }
        slots[index] = Some(attr.value);
    }
    for (spec, slot) in specs.iter().zip(&slots) {
        if spec.required && slot.is_none() {
            return Err(Error::invalid_argument(format!(
                "missing keyword '{}' in {production}",
                spec.name
            )));
        }
    }
    Ok(slots)
}

/// Extract an integer slot.
pub(crate) fn int_slot(slot: Option<AttrValue>) -> Option<i64> {
    match slot {
        Some(AttrValue::Int(v)) => Some(v),
        _ => None,
    }
}

/// Extract a string slot.
pub(crate) fn str_slot(slot: Option<AttrValue>) -> Option<String> {
    match slot {
        Some(AttrValue::Str(s)) => Some(s),
        _ => None,
    }
}

/// Extract an integer slot that `validate_attrs` has already checked as
/// required; an empty slot is an internal invariant violation.
pub(crate) fn required_int(slot: Option<AttrValue>, name: &str) -> Result<i64> {
    int_slot(slot).ok_or_else(|| Error::runtime(format!("validated keyword '{name}' is missing")))
}

/// Narrow an attribute value into `[0, 255]`.
pub(crate) fn int_to_u8(name: &str, value: i64) -> Result<u8> {
    u8::try_from(value)
        .map_err(|_| Error::value(format!("keyword '{name}' out of range [0, 255], got {value}")))
}
