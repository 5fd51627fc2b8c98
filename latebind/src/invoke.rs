//! Name-based invocation over resolved members.
//!
//! [`Invoker`] composes the locator, the overload resolver, and the
//! variadic packer into "invoke this member on this receiver" operations,
//! for both exact-type and best-fit matching, and for both instance and
//! static targets. Lookup absence stays an `Option` inside the resolution
//! layers; it becomes a signalled [`InvokeError`] only here, at the
//! facade boundary.

use rustc_hash::FxHashSet;
use thiserror::Error;
use tracing::debug;

use crate::dispatch::resolver::known_types;
use crate::dispatch::{access, pack_varargs, OverloadResolver};
use crate::metadata::{signature, CallError, Member, TypeId, TypeProvider};
use crate::value::Value;

/// Failure modes of a late-bound invocation.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// No member with the name is visible and compatible on the type.
    /// A variadic best match discarded by the trailing-argument veto also
    /// surfaces here.
    #[error("no accessible method `{name}` on `{type_name}`")]
    NotFound { type_name: String, name: String },

    /// The signature exists but has no invokable form even after the
    /// accessibility search.
    #[error("method `{signature}` exists but is not accessible")]
    AccessRejected { signature: String },

    /// The call target rejected the packed argument list.
    #[error("argument mismatch for `{signature}`: {detail}")]
    ArgumentMismatch { signature: String, detail: String },

    /// The invoked member itself failed; the underlying failure is
    /// carried as the source, never swallowed.
    #[error("method `{signature}` failed")]
    TargetFailure {
        signature: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An instance member was invoked without a receiver.
    #[error("receiver required for instance method `{name}`")]
    MissingReceiver { name: String },
}

/// Invocation result type.
pub type InvokeResult<T> = Result<T, InvokeError>;

/// Late-bound invocation facade over a [`TypeProvider`].
pub struct Invoker<'a, P: TypeProvider> {
    provider: &'a P,
}

impl<'a, P: TypeProvider> Invoker<'a, P> {
    /// Create an invoker reading from the given provider.
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    fn resolver(&self) -> OverloadResolver<'a, P> {
        OverloadResolver::new(self.provider)
    }

    // === Lookups ===

    /// Find a usable form of `member` starting from `ty`; see
    /// [`access::find_accessible`].
    pub fn find_accessible_member(&self, ty: TypeId, member: &Member) -> Option<Member> {
        access::find_accessible(self.provider, ty, member)
    }

    /// Find a usable member by name and exact parameter types.
    pub fn find_accessible_by_name(
        &self,
        ty: TypeId,
        name: &str,
        param_types: &[TypeId],
    ) -> Option<Member> {
        access::find_accessible_by_name(self.provider, ty, name, param_types)
    }

    /// Resolve the best-fitting accessible overload for the given
    /// argument types (`None` entries are null/unknown arguments).
    pub fn find_best_match(
        &self,
        ty: TypeId,
        name: &str,
        arg_types: &[Option<TypeId>],
    ) -> Option<Member> {
        self.resolver().resolve(ty, name, arg_types)
    }

    /// Resolve against declared members of the type and its superclass
    /// chain, ignoring visibility. Backs [`Invoker::invoke_forced`].
    pub fn find_matching_member(
        &self,
        ty: TypeId,
        name: &str,
        arg_types: &[Option<TypeId>],
    ) -> Option<Member> {
        self.resolver().resolve_declared(ty, name, arg_types)
    }

    // === Instance invocation ===

    /// Best-fit invocation; argument types are inferred from each
    /// argument's runtime type, null arguments acting as wildcards.
    /// Variadic arguments are packed before the call.
    pub fn invoke(&self, receiver: &Value, name: &str, args: &[Value]) -> InvokeResult<Value> {
        let arg_types = self.runtime_types(args);
        self.invoke_with_types(receiver, name, args, &arg_types)
    }

    /// Best-fit invocation with explicitly supplied parameter types.
    pub fn invoke_with_types(
        &self,
        receiver: &Value,
        name: &str,
        args: &[Value],
        param_types: &[Option<TypeId>],
    ) -> InvokeResult<Value> {
        let ty = self.receiver_type(receiver, name)?;
        let member = self
            .resolver()
            .resolve(ty, name, param_types)
            .ok_or_else(|| self.not_found(ty, name))?;
        self.call(&member, Some(receiver), args, true)
    }

    /// Exact-type invocation; the argument runtime types must literally
    /// equal a member's declared parameter types. No variadic packing.
    pub fn invoke_exact(&self, receiver: &Value, name: &str, args: &[Value]) -> InvokeResult<Value> {
        let ty = self.receiver_type(receiver, name)?;
        let member = self.exact_member(ty, name, &self.runtime_types(args))?;
        self.call(&member, Some(receiver), args, false)
    }

    /// Exact-type invocation with explicitly supplied parameter types.
    pub fn invoke_exact_with_types(
        &self,
        receiver: &Value,
        name: &str,
        args: &[Value],
        param_types: &[TypeId],
    ) -> InvokeResult<Value> {
        let ty = self.receiver_type(receiver, name)?;
        let member = self.exact_member_typed(ty, name, param_types)?;
        self.call(&member, Some(receiver), args, false)
    }

    /// Best-fit invocation of a declared member, ignoring visibility.
    /// Resolution searches declared members of the receiver's type and
    /// its superclass chain; the accessibility machinery is bypassed
    /// deliberately.
    pub fn invoke_forced(&self, receiver: &Value, name: &str, args: &[Value]) -> InvokeResult<Value> {
        let ty = self.receiver_type(receiver, name)?;
        let arg_types = self.runtime_types(args);
        let member = self
            .resolver()
            .resolve_declared(ty, name, &arg_types)
            .ok_or_else(|| self.not_found(ty, name))?;
        self.call(&member, Some(receiver), args, true)
    }

    // === Static invocation ===

    /// Best-fit static invocation; argument types inferred as in
    /// [`Invoker::invoke`].
    pub fn invoke_static(&self, ty: TypeId, name: &str, args: &[Value]) -> InvokeResult<Value> {
        let arg_types = self.runtime_types(args);
        self.invoke_static_with_types(ty, name, args, &arg_types)
    }

    /// Best-fit static invocation with explicitly supplied parameter
    /// types.
    pub fn invoke_static_with_types(
        &self,
        ty: TypeId,
        name: &str,
        args: &[Value],
        param_types: &[Option<TypeId>],
    ) -> InvokeResult<Value> {
        let member = self
            .resolver()
            .resolve(ty, name, param_types)
            .ok_or_else(|| self.not_found(ty, name))?;
        self.call(&member, None, args, true)
    }

    /// Exact-type static invocation.
    pub fn invoke_exact_static(&self, ty: TypeId, name: &str, args: &[Value]) -> InvokeResult<Value> {
        let member = self.exact_member(ty, name, &self.runtime_types(args))?;
        self.call(&member, None, args, false)
    }

    /// Exact-type static invocation with explicitly supplied parameter
    /// types.
    pub fn invoke_exact_static_with_types(
        &self,
        ty: TypeId,
        name: &str,
        args: &[Value],
        param_types: &[TypeId],
    ) -> InvokeResult<Value> {
        let member = self.exact_member_typed(ty, name, param_types)?;
        self.call(&member, None, args, false)
    }

    // === Annotation scans ===

    /// All members of `ty` carrying the marker annotation.
    ///
    /// With `search_ancestors`, the superclass chain and the interface
    /// closure are scanned too, interleaved interface-first; inherited
    /// members seen through several ancestors are reported each time they
    /// are seen.
    pub fn members_with_annotation(
        &self,
        ty: TypeId,
        marker: &str,
        search_ancestors: bool,
        include_non_public: bool,
    ) -> Vec<Member> {
        let mut scope = if search_ancestors {
            all_superclasses_and_interfaces(self.provider, ty)
        } else {
            Vec::new()
        };
        scope.insert(0, ty);

        let mut found = Vec::new();
        for scanned in scope {
            for member in self.provider.members(scanned, include_non_public) {
                if member.has_annotation(marker) {
                    found.push(member);
                }
            }
        }
        found
    }

    // === Plumbing ===

    fn runtime_types(&self, args: &[Value]) -> Vec<Option<TypeId>> {
        args.iter().map(|a| self.provider.type_of_value(a)).collect()
    }

    fn receiver_type(&self, receiver: &Value, name: &str) -> InvokeResult<TypeId> {
        self.provider
            .type_of_value(receiver)
            .ok_or_else(|| InvokeError::MissingReceiver {
                name: name.to_string(),
            })
    }

    /// Exact lookup against inferred types; a null argument has no type
    /// and therefore can never satisfy an exact signature.
    fn exact_member(
        &self,
        ty: TypeId,
        name: &str,
        arg_types: &[Option<TypeId>],
    ) -> InvokeResult<Member> {
        match known_types(arg_types) {
            Some(types) => self.exact_member_typed(ty, name, &types),
            None => Err(self.not_found(ty, name)),
        }
    }

    fn exact_member_typed(
        &self,
        ty: TypeId,
        name: &str,
        param_types: &[TypeId],
    ) -> InvokeResult<Member> {
        let member = access::public_member(self.provider, ty, name, param_types)
            .ok_or_else(|| self.not_found(ty, name))?;
        access::find_accessible(self.provider, member.declaring_type(), &member).ok_or_else(|| {
            InvokeError::AccessRejected {
                signature: signature(self.provider, &member),
            }
        })
    }

    fn call(
        &self,
        member: &Member,
        receiver: Option<&Value>,
        args: &[Value],
        pack: bool,
    ) -> InvokeResult<Value> {
        if !member.is_static() {
            match receiver {
                Some(r) if !r.is_null() => {}
                _ => {
                    return Err(InvokeError::MissingReceiver {
                        name: member.name().to_string(),
                    })
                }
            }
        }
        let packed;
        let actuals: &[Value] = if pack && member.is_variadic() {
            packed = pack_varargs(self.provider, args.to_vec(), member.param_types());
            &packed
        } else {
            args
        };
        debug!(member = %signature(self.provider, member), "invoking");
        member
            .call(receiver, actuals)
            .map_err(|e| self.call_failure(member, e))
    }

    fn call_failure(&self, member: &Member, err: CallError) -> InvokeError {
        let signature = signature(self.provider, member);
        match err {
            CallError::ArgumentMismatch(detail) => InvokeError::ArgumentMismatch { signature, detail },
            CallError::Failure(source) => InvokeError::TargetFailure { signature, source },
        }
    }

    fn not_found(&self, ty: TypeId, name: &str) -> InvokeError {
        InvokeError::NotFound {
            type_name: self.provider.type_name(ty).to_string(),
            name: name.to_string(),
        }
    }
}

/// The superclass chain of `ty`, nearest first, excluding `ty` itself.
fn all_superclasses<P: TypeProvider>(provider: &P, ty: TypeId) -> Vec<TypeId> {
    let mut out = Vec::new();
    let mut cursor = provider.superclass(ty);
    while let Some(superclass) = cursor {
        out.push(superclass);
        cursor = provider.superclass(superclass);
    }
    out
}

/// Every interface reachable from `ty`, depth first per class level,
/// nearest level first, each interface reported once.
fn all_interfaces<P: TypeProvider>(provider: &P, ty: TypeId) -> Vec<TypeId> {
    let mut out = Vec::new();
    let mut seen: FxHashSet<TypeId> = FxHashSet::default();
    let mut cursor = Some(ty);
    while let Some(current) = cursor {
        let mut stack: Vec<TypeId> = provider.interfaces(current).iter().rev().copied().collect();
        while let Some(iface) = stack.pop() {
            if seen.insert(iface) {
                out.push(iface);
                stack.extend(provider.interfaces(iface).iter().rev().copied());
            }
        }
        cursor = provider.superclass(current);
    }
    out
}

/// Superclasses and interfaces merged into one ancestor list, starting
/// with an interface and alternating by index. The annotation scan
/// depends on this enumeration order.
fn all_superclasses_and_interfaces<P: TypeProvider>(provider: &P, ty: TypeId) -> Vec<TypeId> {
    let superclasses = all_superclasses(provider, ty);
    let interfaces = all_interfaces(provider, ty);
    let mut merged = Vec::with_capacity(superclasses.len() + interfaces.len());
    let mut super_index = 0;
    let mut iface_index = 0;
    while iface_index < interfaces.len() || super_index < superclasses.len() {
        if iface_index >= interfaces.len()
            || (super_index < superclasses.len() && super_index < iface_index)
        {
            merged.push(superclasses[super_index]);
            super_index += 1;
        } else {
            merged.push(interfaces[iface_index]);
            iface_index += 1;
        }
    }
    merged
}
