//! A hand-rolled type registry implementing [`TypeProvider`].
//!
//! Hosts with a real introspection facility can implement [`TypeProvider`]
//! over it directly; everyone else (including every test in this crate)
//! builds a `TypeRegistry` up front and hands it to the engine. The
//! registry is mutable only during setup; resolution takes `&self` and the
//! registry is never mutated afterwards.
//!
//! `TypeRegistry::new` seeds a small built-in world: the `Object` root,
//! `String`, the primitives `int`/`long`/`float`/`double`/`bool`, their
//! boxed classes `Int`/`Long`/`Float`/`Double`/`Bool`, and the numeric
//! widening table.

use indexmap::IndexMap;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::metadata::{Member, MethodDef, TypeId, TypeProvider, Visibility};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TypeKind {
    Class,
    Interface,
    Primitive,
    Array(TypeId),
}

#[derive(Debug)]
struct TypeData {
    name: String,
    kind: TypeKind,
    visibility: Visibility,
    superclass: Option<TypeId>,
    interfaces: Vec<TypeId>,
    members: Vec<Member>,
}

/// Ids of the types every registry is seeded with.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinTypes {
    pub object: TypeId,
    pub string: TypeId,
    pub int: TypeId,
    pub long: TypeId,
    pub float: TypeId,
    pub double: TypeId,
    pub boolean: TypeId,
    pub boxed_int: TypeId,
    pub boxed_long: TypeId,
    pub boxed_float: TypeId,
    pub boxed_double: TypeId,
    pub boxed_bool: TypeId,
}

/// An explicit registry of types and members.
pub struct TypeRegistry {
    types: Vec<TypeData>,
    by_name: IndexMap<String, TypeId>,
    boxed_of: FxHashMap<TypeId, TypeId>,
    unboxed_of: FxHashMap<TypeId, TypeId>,
    widenings: FxHashSet<(TypeId, TypeId)>,
    builtins: BuiltinTypes,
}

impl TypeRegistry {
    /// Create a registry seeded with the built-in types.
    pub fn new() -> Self {
        let mut registry = TypeRegistry {
            types: Vec::new(),
            by_name: IndexMap::new(),
            boxed_of: FxHashMap::default(),
            unboxed_of: FxHashMap::default(),
            widenings: FxHashSet::default(),
            builtins: BuiltinTypes::default(),
        };

        let object = registry.insert("Object", TypeKind::Class, Visibility::Public, None);
        let string = registry.insert("String", TypeKind::Class, Visibility::Public, Some(object));

        let int = registry.insert("int", TypeKind::Primitive, Visibility::Public, None);
        let long = registry.insert("long", TypeKind::Primitive, Visibility::Public, None);
        let float = registry.insert("float", TypeKind::Primitive, Visibility::Public, None);
        let double = registry.insert("double", TypeKind::Primitive, Visibility::Public, None);
        let boolean = registry.insert("bool", TypeKind::Primitive, Visibility::Public, None);

        let boxed_int = registry.insert("Int", TypeKind::Class, Visibility::Public, Some(object));
        let boxed_long = registry.insert("Long", TypeKind::Class, Visibility::Public, Some(object));
        let boxed_float = registry.insert("Float", TypeKind::Class, Visibility::Public, Some(object));
        let boxed_double =
            registry.insert("Double", TypeKind::Class, Visibility::Public, Some(object));
        let boxed_bool = registry.insert("Bool", TypeKind::Class, Visibility::Public, Some(object));

        registry.pair(int, boxed_int);
        registry.pair(long, boxed_long);
        registry.pair(float, boxed_float);
        registry.pair(double, boxed_double);
        registry.pair(boolean, boxed_bool);

        for (from, to) in [
            (int, long),
            (int, float),
            (int, double),
            (long, float),
            (long, double),
            (float, double),
        ] {
            registry.widenings.insert((from, to));
        }

        registry.builtins = BuiltinTypes {
            object,
            string,
            int,
            long,
            float,
            double,
            boolean,
            boxed_int,
            boxed_long,
            boxed_float,
            boxed_double,
            boxed_bool,
        };
        registry
    }

    /// Ids of the seeded built-in types.
    pub fn builtins(&self) -> &BuiltinTypes {
        &self.builtins
    }

    /// Look up a type by name.
    pub fn type_id(&self, name: &str) -> Option<TypeId> {
        self.by_name.get(name).copied()
    }

    /// Define a class extending the root.
    pub fn define_class(&mut self, name: &str, visibility: Visibility) -> TypeId {
        let object = self.builtins.object;
        self.insert(name, TypeKind::Class, visibility, Some(object))
    }

    /// Define a class with an explicit superclass.
    pub fn define_class_extending(
        &mut self,
        name: &str,
        visibility: Visibility,
        superclass: TypeId,
    ) -> TypeId {
        self.insert(name, TypeKind::Class, visibility, Some(superclass))
    }

    /// Define an interface. Interfaces have no superclass.
    pub fn define_interface(&mut self, name: &str, visibility: Visibility) -> TypeId {
        self.insert(name, TypeKind::Interface, visibility, None)
    }

    /// Record that `iface` extends `super_iface`.
    pub fn extend_interface(&mut self, iface: TypeId, super_iface: TypeId) {
        self.types[iface.index()].interfaces.push(super_iface);
    }

    /// Record that `ty` implements `iface`.
    pub fn implement(&mut self, ty: TypeId, iface: TypeId) {
        self.types[ty.index()].interfaces.push(iface);
    }

    /// Intern the array type of `component`, named `Component[]`.
    ///
    /// Array types are public classes under the root and declare no
    /// members of their own.
    pub fn array_of(&mut self, component: TypeId) -> TypeId {
        let name = format!("{}[]", self.types[component.index()].name);
        if let Some(existing) = self.by_name.get(&name) {
            return *existing;
        }
        let object = self.builtins.object;
        self.insert(&name, TypeKind::Array(component), Visibility::Public, Some(object))
    }

    /// Declare a member on `owner` and return its descriptor.
    ///
    /// Declaration order is preserved and is the order `members` reports.
    pub fn define_method(&mut self, owner: TypeId, def: MethodDef) -> Member {
        let member = def.into_member(owner);
        self.types[owner.index()].members.push(member.clone());
        member
    }

    fn insert(
        &mut self,
        name: &str,
        kind: TypeKind,
        visibility: Visibility,
        superclass: Option<TypeId>,
    ) -> TypeId {
        assert!(
            !self.by_name.contains_key(name),
            "duplicate type name: {name}"
        );
        let id = TypeId::new(self.types.len() as u32);
        self.types.push(TypeData {
            name: name.to_string(),
            kind,
            visibility,
            superclass,
            interfaces: Vec::new(),
            members: Vec::new(),
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    fn pair(&mut self, primitive: TypeId, boxed: TypeId) {
        self.boxed_of.insert(primitive, boxed);
        self.unboxed_of.insert(boxed, primitive);
    }

    fn data(&self, ty: TypeId) -> &TypeData {
        &self.types[ty.index()]
    }

    fn collect_visible(&self, ty: TypeId, out: &mut Vec<Member>) {
        for member in &self.data(ty).members {
            if !member.visibility().is_public() {
                continue;
            }
            let clash = out
                .iter()
                .any(|m| m.name() == member.name() && m.param_types() == member.param_types());
            if !clash {
                out.push(member.clone());
            }
        }
    }

    fn visible_members(&self, ty: TypeId) -> Vec<Member> {
        let mut out = Vec::new();

        let mut cursor = Some(ty);
        while let Some(current) = cursor {
            self.collect_visible(current, &mut out);
            cursor = self.data(current).superclass;
        }

        // Interface closure, per class level, declaration order first.
        let mut seen: FxHashSet<TypeId> = FxHashSet::default();
        let mut cursor = Some(ty);
        while let Some(current) = cursor {
            let mut stack: Vec<TypeId> =
                self.data(current).interfaces.iter().rev().copied().collect();
            while let Some(iface) = stack.pop() {
                if !seen.insert(iface) {
                    continue;
                }
                self.collect_visible(iface, &mut out);
                stack.extend(self.data(iface).interfaces.iter().rev().copied());
            }
            cursor = self.data(current).superclass;
        }
        out
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeProvider for TypeRegistry {
    fn type_name(&self, ty: TypeId) -> &str {
        &self.data(ty).name
    }

    fn is_public(&self, ty: TypeId) -> bool {
        self.data(ty).visibility.is_public()
    }

    fn is_interface(&self, ty: TypeId) -> bool {
        self.data(ty).kind == TypeKind::Interface
    }

    fn superclass(&self, ty: TypeId) -> Option<TypeId> {
        self.data(ty).superclass
    }

    fn interfaces(&self, ty: TypeId) -> &[TypeId] {
        &self.data(ty).interfaces
    }

    fn members(&self, ty: TypeId, include_non_public: bool) -> Vec<Member> {
        if include_non_public {
            self.data(ty).members.clone()
        } else {
            self.visible_members(ty)
        }
    }

    fn is_primitive(&self, ty: TypeId) -> bool {
        self.data(ty).kind == TypeKind::Primitive
    }

    fn is_primitive_or_boxed(&self, ty: TypeId) -> bool {
        self.is_primitive(ty) || self.unboxed_of.contains_key(&ty)
    }

    fn boxed_equivalent(&self, ty: TypeId) -> TypeId {
        self.boxed_of.get(&ty).copied().unwrap_or(ty)
    }

    fn unboxed_equivalent(&self, ty: TypeId) -> Option<TypeId> {
        self.unboxed_of.get(&ty).copied()
    }

    fn widens_to(&self, from: TypeId, to: TypeId) -> bool {
        self.widenings.contains(&(from, to))
    }

    fn component_type(&self, ty: TypeId) -> Option<TypeId> {
        match self.data(ty).kind {
            TypeKind::Array(component) => Some(component),
            _ => None,
        }
    }

    fn type_of_value(&self, value: &Value) -> Option<TypeId> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(self.builtins.boxed_bool),
            Value::Int(_) => Some(self.builtins.boxed_int),
            Value::Long(_) => Some(self.builtins.boxed_long),
            Value::Float(_) => Some(self.builtins.boxed_float),
            Value::Double(_) => Some(self.builtins.boxed_double),
            Value::Str(_) => Some(self.builtins.string),
            Value::Array(a) => Some(a.type_id()),
            Value::Obj(o) => Some(o.type_id()),
        }
    }
}
