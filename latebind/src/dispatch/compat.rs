//! Type compatibility and hierarchy distance.
//!
//! Two modes of assignability exist. Strict mode allows identity, primitive
//! widening, and reference-hierarchy walks. Relaxed mode additionally boxes
//! a primitive source before the reference walk and unboxes a boxed source
//! before the widening check. A `None` source (a null argument) is
//! assignable to any reference type in both modes and never to a primitive.

use rustc_hash::FxHashSet;

use crate::metadata::{TypeId, TypeProvider};

/// Whether a single argument type is assignable to a parameter type.
///
/// `from = None` represents a null/unknown argument.
pub fn is_assignable<P: TypeProvider>(
    provider: &P,
    from: Option<TypeId>,
    to: TypeId,
    relaxed: bool,
) -> bool {
    let Some(mut from) = from else {
        return !provider.is_primitive(to);
    };
    if from == to {
        return true;
    }

    if relaxed {
        if provider.is_primitive(from) && !provider.is_primitive(to) {
            from = provider.boxed_equivalent(from);
            if from == to {
                return true;
            }
        }
        if provider.is_primitive(to) && !provider.is_primitive(from) {
            match provider.unboxed_equivalent(from) {
                Some(primitive) => from = primitive,
                None => return false,
            }
            if from == to {
                return true;
            }
        }
    }

    if provider.is_primitive(to) {
        return provider.is_primitive(from) && provider.widens_to(from, to);
    }
    if provider.is_primitive(from) {
        // Boxing is a relaxation; in strict mode a primitive never crosses
        // into the reference hierarchy.
        return false;
    }
    reference_assignable(provider, from, to)
}

/// Whether every positional pair in two equal-length lists is assignable.
/// Lists of different lengths are never compatible.
pub fn lists_assignable<P: TypeProvider>(
    provider: &P,
    from: &[Option<TypeId>],
    to: &[TypeId],
    relaxed: bool,
) -> bool {
    from.len() == to.len()
        && from
            .iter()
            .zip(to)
            .all(|(f, t)| is_assignable(provider, *f, *t, relaxed))
}

/// Aggregate hierarchy distance between an argument-type list and a
/// parameter-type list. Lower is a tighter fit.
///
/// Returns `-1` when the lists are not assignable even in relaxed mode.
/// Otherwise sums per pair: 0 for an identical or absent argument type,
/// 1 for a strict (no-relaxation) assignment, 2 for an assignment that
/// needs boxing relaxation.
pub fn distance<P: TypeProvider>(provider: &P, from: &[Option<TypeId>], to: &[TypeId]) -> i32 {
    if !lists_assignable(provider, from, to, true) {
        return -1;
    }
    let mut total = 0;
    for (f, t) in from.iter().zip(to) {
        let Some(f) = *f else { continue };
        if f == *t {
            continue;
        }
        if is_assignable(provider, Some(f), *t, false) {
            total += 1;
        } else {
            total += 2;
        }
    }
    total
}

/// Walk `from`'s superclass chain and interface closure looking for `to`.
///
/// Explicit worklist with a visited set, so deep or (hypothetically)
/// cyclic interface graphs cannot overflow the stack.
fn reference_assignable<P: TypeProvider>(provider: &P, from: TypeId, to: TypeId) -> bool {
    if is_hierarchy_root(provider, to) {
        return true;
    }
    let mut visited: FxHashSet<TypeId> = FxHashSet::default();
    let mut stack = vec![from];
    while let Some(ty) = stack.pop() {
        if !visited.insert(ty) {
            continue;
        }
        if ty == to {
            return true;
        }
        if let Some(superclass) = provider.superclass(ty) {
            stack.push(superclass);
        }
        stack.extend(provider.interfaces(ty).iter().copied());
    }
    false
}

fn is_hierarchy_root<P: TypeProvider>(provider: &P, ty: TypeId) -> bool {
    !provider.is_primitive(ty) && !provider.is_interface(ty) && provider.superclass(ty).is_none()
}
