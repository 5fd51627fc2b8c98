//! Locating an accessible (invokable) form of a member.
//!
//! A member can exist and be externally visible itself while its declaring
//! type is not. Such a member cannot be invoked through its declaration;
//! an equivalent declaration must be found on a publicly visible interface
//! or ancestor. The search is ordered: the implemented-interface graph
//! first (each class level's direct interfaces, depth first, before
//! ascending the superclass chain), then the first publicly visible
//! superclass.

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::metadata::{Member, TypeId, TypeProvider};

/// Find a usable form of `member` starting from `ty`.
///
/// Returns `None` when the member is not externally visible at the member
/// level, or when no publicly visible declaration of the same name and
/// parameter list can be reached. Absence is a normal outcome, not an
/// error.
pub fn find_accessible<P: TypeProvider>(provider: &P, ty: TypeId, member: &Member) -> Option<Member> {
    if !member.visibility().is_public() {
        return None;
    }
    if provider.is_public(ty) {
        return Some(member.clone());
    }
    debug!(
        member = member.name(),
        declaring = provider.type_name(ty),
        "declaring type hidden, searching interfaces and ancestors"
    );
    from_interface_nest(provider, ty, member.name(), member.param_types())
        .or_else(|| from_public_superclass(provider, ty, member.name(), member.param_types()))
}

/// Find a usable member by name and exact parameter types.
///
/// Resolves the externally visible member first (including inherited
/// declarations), then runs the accessibility search from its declaring
/// type.
pub fn find_accessible_by_name<P: TypeProvider>(
    provider: &P,
    ty: TypeId,
    name: &str,
    param_types: &[TypeId],
) -> Option<Member> {
    let member = public_member(provider, ty, name, param_types)?;
    find_accessible(provider, member.declaring_type(), &member)
}

/// The externally visible member of `ty` (including inherited ones) with
/// this exact name and parameter list.
pub fn public_member<P: TypeProvider>(
    provider: &P,
    ty: TypeId,
    name: &str,
    param_types: &[TypeId],
) -> Option<Member> {
    provider
        .members(ty, false)
        .into_iter()
        .find(|m| m.name() == name && m.param_types() == param_types && m.visibility().is_public())
}

/// A member declared directly on `ty` with this exact signature, if it is
/// externally visible at the member level.
fn declared_public_member<P: TypeProvider>(
    provider: &P,
    ty: TypeId,
    name: &str,
    param_types: &[TypeId],
) -> Option<Member> {
    provider
        .members(ty, true)
        .into_iter()
        .find(|m| m.name() == name && m.param_types() == param_types && m.visibility().is_public())
}

/// Search the implemented-interface graph for a public interface declaring
/// the signature.
///
/// For each level of the superclass chain, the level's directly declared
/// interfaces are searched depth first (each interface before its
/// siblings, superinterfaces before the next sibling) before ascending.
/// Non-public interfaces are pruned together with their superinterface
/// subtrees. Explicit worklist with a visited set; the graph may be
/// arbitrarily deep and the walk stays cycle safe.
fn from_interface_nest<P: TypeProvider>(
    provider: &P,
    ty: TypeId,
    name: &str,
    param_types: &[TypeId],
) -> Option<Member> {
    let mut visited: FxHashSet<TypeId> = FxHashSet::default();
    let mut cursor = Some(ty);
    while let Some(current) = cursor {
        let mut stack: Vec<TypeId> = provider.interfaces(current).iter().rev().copied().collect();
        while let Some(iface) = stack.pop() {
            if !visited.insert(iface) {
                continue;
            }
            if !provider.is_public(iface) {
                continue;
            }
            if let Some(member) = declared_public_member(provider, iface, name, param_types) {
                return Some(member);
            }
            stack.extend(provider.interfaces(iface).iter().rev().copied());
        }
        cursor = provider.superclass(current);
    }
    None
}

/// Walk to the first publicly visible superclass and re-resolve the
/// signature there.
fn from_public_superclass<P: TypeProvider>(
    provider: &P,
    ty: TypeId,
    name: &str,
    param_types: &[TypeId],
) -> Option<Member> {
    let mut parent = provider.superclass(ty);
    while let Some(ancestor) = parent {
        if provider.is_public(ancestor) {
            return public_member(provider, ancestor, name, param_types);
        }
        parent = provider.superclass(ancestor);
    }
    None
}
