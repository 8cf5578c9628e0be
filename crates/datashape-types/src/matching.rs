//! Structural matching of a concrete type against a possibly-abstract
//! pattern.
//!
//! `matches(p, c)` answers whether `c` inhabits the schema `p`:
//! kind wildcards match their lattice subtrees, typevars bind on first
//! use and must agree on reuse, symbolic dimensions bind shapes the same
//! way, and a leading ellipsis absorbs zero or more dimensions (greedy,
//! backtracking to shorter expansions). Neither input is mutated; the
//! substitution environment lives for one call.

use rustc_hash::FxHashMap;

use crate::ast::{DimKind, Dimension, Type, TypeKind};

/// Does concrete `c` inhabit the schema described by pattern `p`?
#[must_use]
pub fn matches(pattern: &Type, concrete: &Type) -> bool {
    let mut env = Substitutions::default();
    match_type(pattern, concrete, &mut env)
}

/// Bindings accumulated during one match: typevars over types and
/// symbolic dimensions over shapes, in independent namespaces.
#[derive(Clone, Default)]
struct Substitutions {
    types: FxHashMap<String, Type>,
    shapes: FxHashMap<String, u64>,
}

impl Substitutions {
    fn bind_type(&mut self, name: &str, ty: &Type) -> bool {
        match self.types.get(name) {
            Some(bound) => bound == ty,
            None => {
                self.types.insert(name.to_string(), ty.clone());
                true
            }
        }
    }

    fn bind_shape(&mut self, name: &str, shape: u64) -> bool {
        match self.shapes.get(name) {
            Some(bound) => *bound == shape,
            None => {
                self.shapes.insert(name.to_string(), shape);
                true
            }
        }
    }
}

fn match_type(p: &Type, c: &Type, env: &mut Substitutions) -> bool {
    match p.kind() {
        TypeKind::AnyKind => true,
        TypeKind::ScalarKind => c.is_scalar(),
        TypeKind::SignedKind => c.is_signed(),
        TypeKind::UnsignedKind => c.is_unsigned(),
        TypeKind::RealKind => c.is_real(),
        TypeKind::ComplexKind => c.is_complex(),
        TypeKind::FixedStringKind => matches!(c.kind(), TypeKind::FixedString { .. }),
        TypeKind::FixedBytesKind => matches!(c.kind(), TypeKind::FixedBytes { .. }),
        TypeKind::Typevar(name) => env.bind_type(name, c),

        TypeKind::Array {
            order: porder,
            dims: pdims,
            dtype: pdtype,
        } => match c.kind() {
            TypeKind::Array {
                order: corder,
                dims: cdims,
                dtype: cdtype,
            } => {
                porder == corder
                    && match_dims(pdims, cdims, env)
                    && match_type(pdtype, cdtype, env)
            }
            // A pattern whose dimensions can all expand to nothing also
            // covers a dimensionless value, e.g. `... * int32` vs `int32`.
            _ => match_dims(pdims, &[], env) && match_type(pdtype, c, env),
        },

        TypeKind::Option(pi) => match c.kind() {
            TypeKind::Option(ci) => match_type(pi, ci, env),
            _ => false,
        },
        TypeKind::Pointer(pi) => match c.kind() {
            TypeKind::Pointer(ci) => match_type(pi, ci, env),
            _ => false,
        },
        TypeKind::Constr { name: pn, arg: pa } => match c.kind() {
            TypeKind::Constr { name: cn, arg: ca } => pn == cn && match_type(pa, ca, env),
            _ => false,
        },
        // Nominal references match by name; resolution is not consulted.
        TypeKind::Nominal(pn) => matches!(c.kind(), TypeKind::Nominal(cn) if cn == pn),

        TypeKind::Tuple {
            variadic: pvar,
            fields: pfields,
        } => match c.kind() {
            TypeKind::Tuple {
                variadic: cvar,
                fields: cfields,
            } => {
                let arity_ok = if *pvar {
                    cfields.len() >= pfields.len()
                } else {
                    !*cvar && cfields.len() == pfields.len()
                };
                arity_ok
                    && pfields
                        .iter()
                        .zip(cfields)
                        .all(|(pf, cf)| match_type(pf.ty(), cf.ty(), env))
            }
            _ => false,
        },

        TypeKind::Record {
            variadic: pvar,
            fields: pfields,
        } => match c.kind() {
            TypeKind::Record {
                variadic: cvar,
                fields: cfields,
            } => {
                let arity_ok = if *pvar {
                    cfields.len() >= pfields.len()
                } else {
                    !*cvar && cfields.len() == pfields.len()
                };
                arity_ok
                    && pfields.iter().zip(cfields).all(|(pf, cf)| {
                        pf.name() == cf.name() && match_type(pf.ty(), cf.ty(), env)
                    })
            }
            _ => false,
        },

        TypeKind::Function {
            ret: pret,
            pos: ppos,
            kwds: pkwds,
        } => match c.kind() {
            TypeKind::Function {
                ret: cret,
                pos: cpos,
                kwds: ckwds,
            } => {
                match_type(pret, cret, env)
                    && match_type(ppos, cpos, env)
                    && match_type(pkwds, ckwds, env)
            }
            _ => false,
        },

        // Scalar leaves have no abstract descendants; structural equality
        // of the kind payload is the whole judgment.
        _ => p.kind() == c.kind(),
    }
}

fn match_dims(p: &[Dimension], c: &[Dimension], env: &mut Substitutions) -> bool {
    let Some((pfirst, prest)) = p.split_first() else {
        return c.is_empty();
    };
    if matches!(pfirst.kind(), DimKind::EllipsisDim) {
        // Greedy: absorb as many leading dimensions as possible, backing
        // off one at a time until the remaining pattern fits.
        for taken in (0..=c.len()).rev() {
            let mut trial = env.clone();
            if match_dims(prest, &c[taken..], &mut trial) {
                *env = trial;
                return true;
            }
        }
        return false;
    }
    let Some((cfirst, crest)) = c.split_first() else {
        return false;
    };
    match_dim(pfirst, cfirst, env) && match_dims(prest, crest, env)
}

fn match_dim(p: &Dimension, c: &Dimension, env: &mut Substitutions) -> bool {
    match (p.kind(), c.kind()) {
        (DimKind::FixedDimKind, DimKind::FixedDim { .. }) => true,
        // Shapes must agree; strides are storage detail, not schema.
        (DimKind::FixedDim { shape: ps, .. }, DimKind::FixedDim { shape: cs, .. }) => ps == cs,
        (DimKind::VarDim { .. }, DimKind::VarDim { .. }) => true,
        (DimKind::SymbolicDim(name), DimKind::FixedDim { shape, .. }) => {
            env.bind_shape(name, *shape)
        }
        _ => false,
    }
}
