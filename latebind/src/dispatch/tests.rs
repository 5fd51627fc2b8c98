//! Tests for the resolution core: compatibility, accessibility,
//! best-match selection, and variadic packing.

use pretty_assertions::assert_eq;

use super::resolver::OverloadResolver;
use super::{access, compat, varargs};
use crate::metadata::registry::TypeRegistry;
use crate::metadata::{MethodDef, TypeId, Visibility};
use crate::value::{ArrayValue, Value};

// === Compatibility ===

#[test]
fn assignable_identity_and_null() {
    let reg = TypeRegistry::new();
    let b = *reg.builtins();
    assert!(compat::is_assignable(&reg, Some(b.string), b.string, false));
    assert!(compat::is_assignable(&reg, None, b.string, false));
    assert!(compat::is_assignable(&reg, None, b.object, true));
    // null never matches a primitive parameter
    assert!(!compat::is_assignable(&reg, None, b.int, true));
}

#[test]
fn assignable_walks_hierarchy() {
    let mut reg = TypeRegistry::new();
    let animal = reg.define_class("Animal", Visibility::Public);
    let dog = reg.define_class_extending("Dog", Visibility::Public, animal);
    let pet = reg.define_interface("Pet", Visibility::Public);
    reg.implement(dog, pet);
    let b = *reg.builtins();

    assert!(compat::is_assignable(&reg, Some(dog), animal, false));
    assert!(compat::is_assignable(&reg, Some(dog), pet, false));
    assert!(compat::is_assignable(&reg, Some(dog), b.object, false));
    assert!(!compat::is_assignable(&reg, Some(animal), dog, true));
    // interfaces reach the root like any other reference type
    assert!(compat::is_assignable(&reg, Some(pet), b.object, false));
}

#[test]
fn boxing_requires_relaxed_mode() {
    let reg = TypeRegistry::new();
    let b = *reg.builtins();
    assert!(compat::is_assignable(&reg, Some(b.int), b.boxed_int, true));
    assert!(!compat::is_assignable(&reg, Some(b.int), b.boxed_int, false));
    assert!(compat::is_assignable(&reg, Some(b.boxed_int), b.int, true));
    assert!(!compat::is_assignable(&reg, Some(b.boxed_int), b.int, false));
    // primitive widening holds in both modes
    assert!(compat::is_assignable(&reg, Some(b.int), b.long, false));
    assert!(!compat::is_assignable(&reg, Some(b.long), b.int, false));
    // unbox-then-widen needs relaxation
    assert!(compat::is_assignable(&reg, Some(b.boxed_int), b.long, true));
    assert!(!compat::is_assignable(&reg, Some(b.boxed_int), b.long, false));
    // box-then-reference-walk needs relaxation
    assert!(compat::is_assignable(&reg, Some(b.int), b.object, true));
    assert!(!compat::is_assignable(&reg, Some(b.int), b.object, false));
}

#[test]
fn list_lengths_must_agree() {
    let reg = TypeRegistry::new();
    let b = *reg.builtins();
    assert!(!compat::lists_assignable(&reg, &[Some(b.string)], &[b.string, b.string], true));
    assert_eq!(compat::distance(&reg, &[Some(b.string)], &[b.string, b.string]), -1);
}

#[test]
fn distance_scores_fit_tightness() {
    let mut reg = TypeRegistry::new();
    let animal = reg.define_class("Animal", Visibility::Public);
    let dog = reg.define_class_extending("Dog", Visibility::Public, animal);
    let b = *reg.builtins();

    assert_eq!(compat::distance(&reg, &[Some(b.string)], &[b.string]), 0);
    assert_eq!(compat::distance(&reg, &[None], &[b.string]), 0);
    // strict subclass costs 1
    assert_eq!(compat::distance(&reg, &[Some(dog)], &[animal]), 1);
    // boxing relaxation costs 2
    assert_eq!(compat::distance(&reg, &[Some(b.boxed_int)], &[b.int]), 2);
    assert_eq!(compat::distance(&reg, &[Some(b.boxed_int)], &[b.long]), 2);
    // costs accumulate per position
    assert_eq!(
        compat::distance(&reg, &[Some(dog), Some(b.boxed_int)], &[animal, b.int]),
        3
    );
    assert_eq!(compat::distance(&reg, &[Some(b.string)], &[b.int]), -1);
}

// === Accessibility ===

#[test]
fn member_on_public_type_is_usable_directly() {
    let mut reg = TypeRegistry::new();
    let ty = reg.define_class("Open", Visibility::Public);
    let m = reg.define_method(ty, MethodDef::new("run"));
    assert_eq!(access::find_accessible(&reg, ty, &m), Some(m.clone()));
}

#[test]
fn non_public_member_is_rejected_outright() {
    let mut reg = TypeRegistry::new();
    let ty = reg.define_class("Open", Visibility::Public);
    let m = reg.define_method(ty, MethodDef::new("run").visibility(Visibility::Private));
    assert_eq!(access::find_accessible(&reg, ty, &m), None);
}

#[test]
fn hidden_class_resolves_through_public_interface() {
    let mut reg = TypeRegistry::new();
    let greeter = reg.define_interface("Greeter", Visibility::Public);
    let iface_decl = reg.define_method(greeter, MethodDef::new("greet"));
    let hidden = reg.define_class("HiddenGreeter", Visibility::Internal);
    reg.implement(hidden, greeter);
    let hidden_decl = reg.define_method(hidden, MethodDef::new("greet"));

    let found = access::find_accessible(&reg, hidden, &hidden_decl).expect("interface nest");
    assert_eq!(found, iface_decl);
    assert_eq!(found.declaring_type(), greeter);
}

#[test]
fn hidden_class_resolves_through_public_superclass() {
    let mut reg = TypeRegistry::new();
    let counter = reg.define_class("Counter", Visibility::Public);
    let base_decl = reg.define_method(counter, MethodDef::new("count"));
    let secret = reg.define_class_extending("SecretCounter", Visibility::Internal, counter);
    let hidden_decl = reg.define_method(secret, MethodDef::new("count"));

    let found = access::find_accessible(&reg, secret, &hidden_decl).expect("public ancestor");
    assert_eq!(found, base_decl);
    assert_eq!(found.declaring_type(), counter);
}

#[test]
fn nest_search_reaches_superinterfaces() {
    let mut reg = TypeRegistry::new();
    let readable = reg.define_interface("Readable", Visibility::Public);
    let root_decl = reg.define_method(readable, MethodDef::new("read"));
    let buffered = reg.define_interface("Buffered", Visibility::Public);
    reg.extend_interface(buffered, readable);
    let hidden = reg.define_class("HiddenStream", Visibility::Internal);
    reg.implement(hidden, buffered);
    let hidden_decl = reg.define_method(hidden, MethodDef::new("read"));

    let found = access::find_accessible(&reg, hidden, &hidden_decl).expect("superinterface");
    assert_eq!(found, root_decl);
}

#[test]
fn non_public_interface_prunes_its_nest() {
    // A hidden interface hides its public superinterfaces too; the search
    // does not look behind it.
    let mut reg = TypeRegistry::new();
    let readable = reg.define_interface("Readable", Visibility::Public);
    reg.define_method(readable, MethodDef::new("read"));
    let mid = reg.define_interface("MidReadable", Visibility::Internal);
    reg.extend_interface(mid, readable);
    let hidden = reg.define_class("HiddenStream", Visibility::Internal);
    reg.implement(hidden, mid);
    let hidden_decl = reg.define_method(hidden, MethodDef::new("read"));

    assert_eq!(access::find_accessible(&reg, hidden, &hidden_decl), None);
}

#[test]
fn by_name_lookup_resolves_inherited_declarations() {
    let mut reg = TypeRegistry::new();
    let animal = reg.define_class("Animal", Visibility::Public);
    let speak = reg.define_method(animal, MethodDef::new("speak"));
    let dog = reg.define_class_extending("Dog", Visibility::Public, animal);

    assert_eq!(access::find_accessible_by_name(&reg, dog, "speak", &[]), Some(speak));
    assert_eq!(access::find_accessible_by_name(&reg, dog, "fetch", &[]), None);
}

// === Overload resolution ===

fn calculator() -> (TypeRegistry, TypeId) {
    let mut reg = TypeRegistry::new();
    let b = *reg.builtins();
    let calc = reg.define_class("Calc", Visibility::Public);
    reg.define_method(calc, MethodDef::new("add").params(&[b.int, b.int]));
    reg.define_method(calc, MethodDef::new("add").params(&[b.long, b.long]));
    reg.define_method(calc, MethodDef::new("add").params(&[b.double, b.double]));
    reg.define_method(calc, MethodDef::new("describe").params(&[b.object]));
    reg.define_method(calc, MethodDef::new("describe").params(&[b.string]));
    (reg, calc)
}

#[test]
fn exact_match_fast_path() {
    let (reg, calc) = calculator();
    let b = *reg.builtins();
    let resolver = OverloadResolver::new(&reg);
    let m = resolver
        .resolve(calc, "add", &[Some(b.int), Some(b.int)])
        .expect("exact match");
    assert_eq!(m.param_types(), &[b.int, b.int]);
}

#[test]
fn tighter_overload_wins() {
    let (reg, calc) = calculator();
    let b = *reg.builtins();
    let resolver = OverloadResolver::new(&reg);
    let m = resolver
        .resolve(calc, "describe", &[Some(b.string)])
        .expect("best match");
    assert_eq!(m.param_types(), &[b.string]);
}

#[test]
fn null_argument_ties_break_deterministically() {
    // A null argument fits describe(Object) and describe(String) at
    // distance 0; signature order keeps describe(Object).
    let (reg, calc) = calculator();
    let b = *reg.builtins();
    let resolver = OverloadResolver::new(&reg);
    let m = resolver.resolve(calc, "describe", &[None]).expect("wildcard match");
    assert_eq!(m.param_types(), &[b.object]);
}

#[test]
fn boxed_arguments_tie_break_by_signature() {
    // A boxed Int fits all three add overloads at equal distance; the
    // deterministic signature order keeps add(double, double).
    let (reg, calc) = calculator();
    let b = *reg.builtins();
    let resolver = OverloadResolver::new(&reg);
    let m = resolver
        .resolve(calc, "add", &[Some(b.boxed_int), Some(b.boxed_int)])
        .expect("relaxed match");
    assert_eq!(m.param_types(), &[b.double, b.double]);
}

#[test]
fn resolution_is_repeatable() {
    let (reg, calc) = calculator();
    let b = *reg.builtins();
    let resolver = OverloadResolver::new(&reg);
    let first = resolver.resolve(calc, "add", &[Some(b.boxed_int), Some(b.boxed_int)]);
    let second = resolver.resolve(calc, "add", &[Some(b.boxed_int), Some(b.boxed_int)]);
    assert_eq!(first, second);
}

#[test]
fn incompatible_arguments_resolve_to_none() {
    let (reg, calc) = calculator();
    let b = *reg.builtins();
    let resolver = OverloadResolver::new(&reg);
    assert!(resolver.resolve(calc, "add", &[Some(b.string), Some(b.string)]).is_none());
    assert!(resolver.resolve(calc, "add", &[Some(b.int)]).is_none());
    assert!(resolver.resolve(calc, "missing", &[]).is_none());
}

#[test]
fn inaccessible_candidates_are_skipped() {
    let mut reg = TypeRegistry::new();
    let hidden = reg.define_class("Hidden", Visibility::Internal);
    reg.define_method(hidden, MethodDef::new("poke"));
    let resolver = OverloadResolver::new(&reg);
    assert!(resolver.resolve(hidden, "poke", &[]).is_none());
}

#[test]
fn variadic_absorbs_any_trailing_arity() {
    let mut reg = TypeRegistry::new();
    let b = *reg.builtins();
    let text = reg.define_class("Text", Visibility::Public);
    let str_array = reg.array_of(b.string);
    reg.define_method(
        text,
        MethodDef::new("concat").params(&[b.string, str_array]).variadic(),
    );
    let resolver = OverloadResolver::new(&reg);

    let three = resolver
        .resolve(text, "concat", &[Some(b.string), Some(b.string), Some(b.string)])
        .expect("absorbs two trailing");
    assert!(three.is_variadic());
    // zero trailing arguments are fine too
    assert!(resolver.resolve(text, "concat", &[Some(b.string)]).is_some());
    // the fixed part still has to fit
    assert!(resolver.resolve(text, "concat", &[]).is_none());
}

#[test]
fn fixed_arity_overload_beats_variadic_on_tie() {
    let mut reg = TypeRegistry::new();
    let b = *reg.builtins();
    let fmt = reg.define_class("Fmt", Visibility::Public);
    let str_array = reg.array_of(b.string);
    reg.define_method(fmt, MethodDef::new("rate").params(&[b.string]));
    reg.define_method(fmt, MethodDef::new("rate").params(&[str_array]).variadic());
    let resolver = OverloadResolver::new(&reg);

    let m = resolver.resolve(fmt, "rate", &[Some(b.string)]).expect("match");
    assert!(!m.is_variadic());
}

#[test]
fn variadic_veto_rejects_distant_trailing_argument() {
    // The trailing-argument veto compares type names against the
    // argument's immediate superclass only: Animal (directly under the
    // root) passes, Dog (two levels down) is rejected even though it is
    // genuinely assignable.
    let mut reg = TypeRegistry::new();
    let b = *reg.builtins();
    let animal = reg.define_class("Animal", Visibility::Public);
    let dog = reg.define_class_extending("Dog", Visibility::Public, animal);
    let sink = reg.define_class("Sink", Visibility::Public);
    let obj_array = reg.array_of(b.object);
    reg.define_method(sink, MethodDef::new("keep").params(&[obj_array]).variadic());
    let resolver = OverloadResolver::new(&reg);

    assert!(resolver.resolve(sink, "keep", &[Some(animal)]).is_some());
    assert!(resolver.resolve(sink, "keep", &[Some(dog)]).is_none());
    // a type with no superclass never triggers the veto
    assert!(resolver.resolve(sink, "keep", &[Some(b.object)]).is_some());
    // nor does a null trailing argument
    assert!(resolver.resolve(sink, "keep", &[None]).is_some());
}

#[test]
fn declared_resolution_ignores_visibility() {
    let mut reg = TypeRegistry::new();
    let base = reg.define_class("Base", Visibility::Public);
    let secret = reg.define_method(base, MethodDef::new("secret").visibility(Visibility::Private));
    let derived = reg.define_class_extending("Derived", Visibility::Public, base);
    let resolver = OverloadResolver::new(&reg);

    assert!(resolver.resolve(derived, "secret", &[]).is_none());
    assert_eq!(resolver.resolve_declared(derived, "secret", &[]), Some(secret));
}

// === Variadic packing ===

#[test]
fn packs_trailing_arguments() {
    let mut reg = TypeRegistry::new();
    let b = *reg.builtins();
    let str_array = reg.array_of(b.string);
    let params = [b.int, str_array];

    let packed = varargs::pack_varargs(
        &reg,
        vec![Value::Int(1), "a".into(), "b".into()],
        &params,
    );
    assert_eq!(packed.len(), 2);
    assert_eq!(packed[0], Value::Int(1));
    let arr = packed[1].as_array().expect("trailing array");
    assert_eq!(arr.type_id(), str_array);
    assert_eq!(arr.elems(), &[Value::Str("a".into()), Value::Str("b".into())]);
}

#[test]
fn packs_zero_trailing_arguments() {
    let mut reg = TypeRegistry::new();
    let b = *reg.builtins();
    let str_array = reg.array_of(b.string);
    let params = [b.int, str_array];

    let packed = varargs::pack_varargs(&reg, vec![Value::Int(1)], &params);
    assert_eq!(packed.len(), 2);
    let arr = packed[1].as_array().expect("trailing array");
    assert_eq!(arr.type_id(), str_array);
    assert!(arr.is_empty());
}

#[test]
fn canonical_argument_lists_pass_through() {
    let mut reg = TypeRegistry::new();
    let b = *reg.builtins();
    let str_array = reg.array_of(b.string);
    let params = [b.int, str_array];

    let canonical = vec![
        Value::Int(1),
        Value::Array(ArrayValue::new(str_array, vec!["a".into()])),
    ];
    assert_eq!(varargs::pack_varargs(&reg, canonical.clone(), &params), canonical);

    let with_null = vec![Value::Int(1), Value::Null];
    assert_eq!(varargs::pack_varargs(&reg, with_null.clone(), &params), with_null);
}

#[test]
fn packs_primitive_component_arrays() {
    let mut reg = TypeRegistry::new();
    let b = *reg.builtins();
    let int_array = reg.array_of(b.int);
    let params = [int_array];

    let packed = varargs::pack_varargs(&reg, vec![Value::Int(1), Value::Int(2)], &params);
    assert_eq!(packed.len(), 1);
    let arr = packed[0].as_array().expect("trailing array");
    assert_eq!(arr.type_id(), int_array);
    assert_eq!(arr.elems(), &[Value::Int(1), Value::Int(2)]);
}

// === Properties ===

mod properties {
    use proptest::prelude::*;

    use super::*;

    fn fixture() -> (TypeRegistry, Vec<TypeId>) {
        let mut reg = TypeRegistry::new();
        let b = *reg.builtins();
        let animal = reg.define_class("Animal", Visibility::Public);
        let dog = reg.define_class_extending("Dog", Visibility::Public, animal);
        let pet = reg.define_interface("Pet", Visibility::Public);
        reg.implement(dog, pet);
        let pool = vec![
            b.object,
            b.string,
            b.int,
            b.long,
            b.double,
            b.boxed_int,
            b.boxed_long,
            animal,
            dog,
            pet,
        ];
        (reg, pool)
    }

    proptest! {
        #[test]
        fn distance_is_reflexively_zero(indices in prop::collection::vec(0usize..10, 0..5)) {
            let (reg, pool) = fixture();
            let types: Vec<TypeId> = indices.iter().map(|i| pool[*i]).collect();
            let from: Vec<Option<TypeId>> = types.iter().copied().map(Some).collect();
            prop_assert_eq!(compat::distance(&reg, &from, &types), 0);
        }

        #[test]
        fn distance_never_falls_below_sentinel(
            from_indices in prop::collection::vec(proptest::option::of(0usize..10), 0..4),
            to_indices in prop::collection::vec(0usize..10, 0..4),
        ) {
            let (reg, pool) = fixture();
            let from: Vec<Option<TypeId>> = from_indices.iter().map(|o| o.map(|i| pool[i])).collect();
            let to: Vec<TypeId> = to_indices.iter().map(|i| pool[*i]).collect();
            prop_assert!(compat::distance(&reg, &from, &to) >= -1);
        }

        #[test]
        fn resolution_is_deterministic(
            arg_indices in prop::collection::vec(proptest::option::of(0usize..10), 0..3),
        ) {
            let (mut reg, pool) = fixture();
            let b = *reg.builtins();
            let calc = reg.define_class("Calc", Visibility::Public);
            reg.define_method(calc, MethodDef::new("take").params(&[b.object]));
            reg.define_method(calc, MethodDef::new("take").params(&[b.string]));
            reg.define_method(calc, MethodDef::new("take").params(&[b.int, b.int]));
            let args: Vec<Option<TypeId>> = arg_indices.iter().map(|o| o.map(|i| pool[i])).collect();

            let resolver = OverloadResolver::new(&reg);
            prop_assert_eq!(
                resolver.resolve(calc, "take", &args),
                resolver.resolve(calc, "take", &args)
            );
        }
    }
}
