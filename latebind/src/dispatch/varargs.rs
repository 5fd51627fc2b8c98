//! Canonicalizing argument lists for variadic members.

use crate::metadata::{TypeId, TypeProvider};
use crate::value::{ArrayValue, Value};

/// Repackage a flat argument list into the fixed + trailing-array shape a
/// variadic member expects.
///
/// If the list already has the declared arity and its last element is
/// either null or an array of the declared trailing type, it is already
/// canonical and returned unchanged. Otherwise the leading fixed arguments
/// are copied verbatim and the remaining trailing arguments (possibly
/// zero) are collected into a freshly allocated array tagged with the
/// declared trailing array type. Boxed and primitive element payloads
/// share a representation in this value model, so unboxing a collected
/// array reduces to tagging it with the declared (possibly
/// primitive-component) type.
///
/// Callers guarantee `args.len() >= param_types.len() - 1`; the resolver
/// only hands over argument lists that satisfy it.
pub fn pack_varargs<P: TypeProvider>(
    provider: &P,
    args: Vec<Value>,
    param_types: &[TypeId],
) -> Vec<Value> {
    let Some((&trailing, fixed)) = param_types.split_last() else {
        return args;
    };
    if args.len() == param_types.len() {
        match args.last() {
            Some(Value::Null) => return args,
            Some(last) if provider.type_of_value(last) == Some(trailing) => return args,
            _ => {}
        }
    }
    if provider.component_type(trailing).is_none() {
        // Not actually a variadic shape; leave the list untouched and let
        // the call surface the mismatch.
        return args;
    }

    let mut packed: Vec<Value> = Vec::with_capacity(param_types.len());
    let mut rest = args.into_iter();
    packed.extend(rest.by_ref().take(fixed.len()));
    let trailing_elems: Vec<Value> = rest.collect();
    packed.push(Value::Array(ArrayValue::new(trailing, trailing_elems)));
    packed
}
