//! Late-bound member dispatch: overload resolution, accessible-member
//! lookup, and name-based invocation over an abstract type system.
//!
//! Given a type, a member name, and caller-supplied argument values (or
//! their static types), `latebind` finds the single best-matching member,
//! accounting for hierarchy compatibility, boxing, visibility, and
//! variadic absorption, and performs the call through the member's opaque
//! invocation handle. The engine owns no type metadata: everything
//! it knows arrives through the [`TypeProvider`] capability trait, and the
//! bundled [`TypeRegistry`] is a ready-made provider for hosts without
//! runtime introspection.
//!
//! Resolution is deterministic (equal-fit candidates are ordered by their
//! textual signatures), stateless, and cache-free; concurrent use needs no
//! locking because nothing is ever mutated.
//!
//! # Example
//!
//! ```
//! use latebind::{Invoker, MethodDef, ObjRef, TypeRegistry, Value, Visibility};
//!
//! let mut registry = TypeRegistry::new();
//! let string_ty = registry.builtins().string;
//! let greeter = registry.define_class("Greeter", Visibility::Public);
//! registry.define_method(
//!     greeter,
//!     MethodDef::new("greet").params(&[string_ty]).body(|_, args| {
//!         let name = args[0].as_str().unwrap_or("world");
//!         Ok(Value::Str(format!("hello, {name}")))
//!     }),
//! );
//!
//! let invoker = Invoker::new(&registry);
//! let receiver = Value::Obj(ObjRef::new(greeter, ()));
//! let out = invoker.invoke(&receiver, "greet", &[Value::from("crow")])?;
//! assert_eq!(out, Value::Str("hello, crow".into()));
//! # Ok::<(), latebind::InvokeError>(())
//! ```
//!
//! # Module Structure
//!
//! - [`metadata`] - type/member descriptors, the [`TypeProvider`] trait,
//!   and the hand-rolled [`TypeRegistry`]
//! - [`dispatch`] - the resolution core: compatibility, accessibility,
//!   best-match selection, variadic packing
//! - [`invoke`] - the invocation facade and its error taxonomy
//! - [`value`] - the runtime [`Value`] representation

pub mod dispatch;
pub mod invoke;
pub mod metadata;
pub mod value;

pub use dispatch::{
    distance, find_accessible, find_accessible_by_name, is_assignable, lists_assignable,
    pack_varargs, public_member, OverloadResolver,
};
pub use invoke::{InvokeError, InvokeResult, Invoker};
pub use metadata::registry::{BuiltinTypes, TypeRegistry};
pub use metadata::{signature, CallError, Member, MethodDef, NativeFn, TypeId, TypeProvider, Visibility};
pub use value::{ArrayValue, ObjRef, Value};
