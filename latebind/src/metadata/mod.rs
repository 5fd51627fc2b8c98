//! Type and member metadata for late-bound dispatch.
//!
//! Resolution never talks to a host type system directly; it reads
//! everything through the [`TypeProvider`] capability trait. A provider can
//! be backed by whatever introspection mechanism the host has, or by the
//! hand-rolled [`registry::TypeRegistry`] when there is none.
//!
//! Members are represented as small immutable records ([`Member`]) carrying
//! a name, a parameter-type list, flags, and an opaque invocation handle.
//! Cloning a member is cheap; the record is shared behind an `Arc`.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::value::Value;

pub mod registry;

/// Opaque handle to a type known to a [`TypeProvider`].
///
/// Ids are only meaningful to the provider that issued them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeId(u32);

impl TypeId {
    /// Create a type id from a raw index.
    pub fn new(index: u32) -> Self {
        TypeId(index)
    }

    /// The raw index backing this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Visibility of a type or member.
///
/// Resolution only ever asks one question of a visibility: whether it is
/// externally visible. `Internal` models "visible inside its own
/// package/module but not outside"; `Private` is visible nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    Public,
    Internal,
    Private,
}

impl Visibility {
    /// Whether this visibility is externally visible.
    pub fn is_public(self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// Error signalled by a member's native body.
///
/// The invocation facade maps these onto its own error type; see
/// `InvokeError`. A body reports `ArgumentMismatch` when the argument list
/// it received has the wrong shape, and `Failure` when the invoked code
/// itself failed.
#[derive(Debug, Error)]
pub enum CallError {
    #[error("argument mismatch: {0}")]
    ArgumentMismatch(String),

    #[error("{0}")]
    Failure(Box<dyn std::error::Error + Send + Sync>),
}

impl CallError {
    /// Convenience constructor for a target failure carrying a message.
    pub fn failure(message: impl Into<String>) -> Self {
        let message: String = message.into();
        CallError::Failure(message.into())
    }
}

/// The invocation entry point of a member.
///
/// Receives the receiver (`None` for static members) and the canonical
/// argument list (variadic arguments already packed into their trailing
/// array).
pub type NativeFn = dyn Fn(Option<&Value>, &[Value]) -> Result<Value, CallError> + Send + Sync;

struct MemberInner {
    name: String,
    declaring: TypeId,
    param_types: Vec<TypeId>,
    variadic: bool,
    is_static: bool,
    visibility: Visibility,
    annotations: Vec<String>,
    body: Box<NativeFn>,
}

/// An immutable descriptor for a named, invokable member of a type.
///
/// Equality is signature identity (declaring type, name, parameter types,
/// static flag), so a member located through an accessibility search
/// compares equal to the declaration it was re-resolved from.
#[derive(Clone)]
pub struct Member {
    inner: Arc<MemberInner>,
}

impl Member {
    /// The member's name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The type that declares this member.
    pub fn declaring_type(&self) -> TypeId {
        self.inner.declaring
    }

    /// Declared parameter types, in order. For a variadic member the last
    /// entry is the trailing array type.
    pub fn param_types(&self) -> &[TypeId] {
        &self.inner.param_types
    }

    /// Whether the last parameter absorbs a variable number of trailing
    /// arguments.
    pub fn is_variadic(&self) -> bool {
        self.inner.variadic
    }

    /// Whether the member is invoked without a receiver.
    pub fn is_static(&self) -> bool {
        self.inner.is_static
    }

    /// The member's declared visibility.
    pub fn visibility(&self) -> Visibility {
        self.inner.visibility
    }

    /// Marker annotations attached to this member.
    pub fn annotations(&self) -> &[String] {
        &self.inner.annotations
    }

    /// Whether the given marker annotation is present.
    pub fn has_annotation(&self, marker: &str) -> bool {
        self.inner.annotations.iter().any(|a| a == marker)
    }

    /// Perform the raw call. Argument canonicalization and visibility
    /// enforcement are the caller's responsibility; this goes straight to
    /// the native body.
    pub fn call(&self, receiver: Option<&Value>, args: &[Value]) -> Result<Value, CallError> {
        (self.inner.body)(receiver, args)
    }
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.inner.name)
            .field("declaring", &self.inner.declaring)
            .field("param_types", &self.inner.param_types)
            .field("variadic", &self.inner.variadic)
            .field("is_static", &self.inner.is_static)
            .field("visibility", &self.inner.visibility)
            .finish_non_exhaustive()
    }
}

impl PartialEq for Member {
    fn eq(&self, other: &Self) -> bool {
        self.inner.declaring == other.inner.declaring
            && self.inner.name == other.inner.name
            && self.inner.param_types == other.inner.param_types
            && self.inner.is_static == other.inner.is_static
    }
}

impl Eq for Member {}

/// Builder for a [`Member`].
///
/// Defaults: public, instance, no parameters, no annotations, and a body
/// that returns [`Value::Null`] (a metadata-only stub).
pub struct MethodDef {
    name: String,
    params: Vec<TypeId>,
    variadic: bool,
    is_static: bool,
    visibility: Visibility,
    annotations: Vec<String>,
    body: Option<Box<NativeFn>>,
}

impl MethodDef {
    /// Start a definition for a member with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        MethodDef {
            name: name.into(),
            params: Vec::new(),
            variadic: false,
            is_static: false,
            visibility: Visibility::Public,
            annotations: Vec::new(),
            body: None,
        }
    }

    /// Declared parameter types, in order.
    pub fn params(mut self, params: &[TypeId]) -> Self {
        self.params = params.to_vec();
        self
    }

    /// Mark the last parameter as a variadic trailing array.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    /// Mark the member as static (no receiver).
    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Set the member's visibility.
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Attach a marker annotation.
    pub fn annotate(mut self, marker: impl Into<String>) -> Self {
        self.annotations.push(marker.into());
        self
    }

    /// Set the native body invoked when the member is called.
    pub fn body(
        mut self,
        body: impl Fn(Option<&Value>, &[Value]) -> Result<Value, CallError> + Send + Sync + 'static,
    ) -> Self {
        self.body = Some(Box::new(body));
        self
    }

    /// Finish the definition as a member declared on `declaring`.
    pub fn into_member(self, declaring: TypeId) -> Member {
        Member {
            inner: Arc::new(MemberInner {
                name: self.name,
                declaring,
                param_types: self.params,
                variadic: self.variadic,
                is_static: self.is_static,
                visibility: self.visibility,
                annotations: self.annotations,
                body: self.body.unwrap_or_else(|| Box::new(|_, _| Ok(Value::Null))),
            }),
        }
    }
}

/// Capability interface over the host type system.
///
/// Everything the resolution engine knows about types flows through this
/// trait. The data behind it must be immutable while resolution runs;
/// given that, every engine operation is a pure function and concurrent
/// resolution needs no locking.
///
/// Hierarchy contract: a non-interface, non-primitive type with no
/// superclass is the hierarchy root, and every reference type (class,
/// interface, array) is assignable to it.
pub trait TypeProvider {
    /// The type's name. Names are also the currency of the variadic
    /// trailing-argument veto, so they must be stable and unique.
    fn type_name(&self, ty: TypeId) -> &str;

    /// Whether the type is externally visible.
    fn is_public(&self, ty: TypeId) -> bool;

    /// Whether the type is an interface.
    fn is_interface(&self, ty: TypeId) -> bool;

    /// The direct superclass, if any. Interfaces, primitives, and the
    /// hierarchy root have none.
    fn superclass(&self, ty: TypeId) -> Option<TypeId>;

    /// Directly declared interfaces, in declaration order.
    fn interfaces(&self, ty: TypeId) -> &[TypeId];

    /// Enumerate members.
    ///
    /// With `include_non_public = false`: externally visible members
    /// including inherited ones, the type's own declarations first, then
    /// the superclass chain, then the interface closure; on signature
    /// clashes the first declaration wins. With `true`: only members
    /// declared directly on `ty`, all visibilities.
    fn members(&self, ty: TypeId, include_non_public: bool) -> Vec<Member>;

    /// Whether the type is a primitive value type.
    fn is_primitive(&self, ty: TypeId) -> bool;

    /// Whether the type is a primitive or the boxed form of one.
    fn is_primitive_or_boxed(&self, ty: TypeId) -> bool;

    /// The boxed form of a primitive; identity for everything else.
    fn boxed_equivalent(&self, ty: TypeId) -> TypeId;

    /// The primitive behind a boxed type, if `ty` is one.
    fn unboxed_equivalent(&self, ty: TypeId) -> Option<TypeId>;

    /// Whether `from` widens to `to` (strict primitive widening pairs;
    /// identity is not a widening).
    fn widens_to(&self, from: TypeId, to: TypeId) -> bool;

    /// The component type if `ty` is an array type.
    fn component_type(&self, ty: TypeId) -> Option<TypeId>;

    /// The runtime type of a value. `None` only for [`Value::Null`], which
    /// resolution treats as an unknown/wildcard argument.
    fn type_of_value(&self, value: &Value) -> Option<TypeId>;
}

/// Deterministic textual signature of a member, e.g. `Calc.add(int, int)`.
///
/// Candidate ranking sorts by this string so that resolution is
/// reproducible regardless of the provider's enumeration order.
pub fn signature<P: TypeProvider>(provider: &P, member: &Member) -> String {
    let params: Vec<&str> = member
        .param_types()
        .iter()
        .map(|p| provider.type_name(*p))
        .collect();
    format!(
        "{}.{}({})",
        provider.type_name(member.declaring_type()),
        member.name(),
        params.join(", ")
    )
}
