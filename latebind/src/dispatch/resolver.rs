//! Best-fit overload resolution.
//!
//! Given a type, a member name, and a list of argument types (possibly
//! unknown), selects the unique best-matching overload:
//!
//! 1. **Fast path**: an exact parameter-type match is located and returned
//!    directly.
//! 2. **Collect**: every externally visible member with the name whose
//!    parameter list can absorb the arguments (including variadic
//!    absorption) becomes a candidate.
//! 3. **Order**: candidates are sorted by their textual signature so the
//!    outcome never depends on the provider's enumeration order.
//! 4. **Rank**: each candidate's accessible form is ranked by hierarchy
//!    distance; ties keep the earliest candidate in signature order.
//! 5. **Veto**: a winning variadic member is discarded when its trailing
//!    component type cannot absorb the last argument (see
//!    [`OverloadResolver::resolve`] for the exact rule).

use tracing::debug;

use crate::dispatch::{access, compat};
use crate::metadata::{signature, Member, TypeId, TypeProvider};

/// Overload resolution over a [`TypeProvider`].
pub struct OverloadResolver<'a, P: TypeProvider> {
    provider: &'a P,
}

impl<'a, P: TypeProvider> OverloadResolver<'a, P> {
    /// Create a resolver reading from the given provider.
    pub fn new(provider: &'a P) -> Self {
        Self { provider }
    }

    /// Resolve the best-matching accessible overload of `name` on `ty`.
    ///
    /// `arg_types` are the argument types in call order; `None` entries
    /// are null/unknown arguments and match any reference-typed
    /// parameter at zero cost.
    ///
    /// Known sharp edge: the variadic trailing-argument veto compares the
    /// trailing component type's (boxed) name against the last argument's
    /// own type name and the name of its *immediate* superclass only. An
    /// argument whose type sits two or more levels below the component
    /// type is therefore rejected even though it is genuinely assignable.
    pub fn resolve(&self, ty: TypeId, name: &str, arg_types: &[Option<TypeId>]) -> Option<Member> {
        // Fast path: exact parameter-type match, usable directly. When the
        // exact signature exists but has no accessible form, fall through
        // to the scan rather than failing outright.
        if let Some(exact) = known_types(arg_types) {
            if let Some(member) = access::public_member(self.provider, ty, name, &exact) {
                if let Some(found) =
                    access::find_accessible(self.provider, member.declaring_type(), &member)
                {
                    return Some(found);
                }
            }
        }

        let mut candidates: Vec<Member> = self
            .provider
            .members(ty, false)
            .into_iter()
            .filter(|m| m.name() == name && self.is_match(m, arg_types))
            .collect();
        candidates.sort_by_cached_key(|m| signature(self.provider, m));
        debug!(
            method = name,
            candidates = candidates.len(),
            "ranking overload candidates"
        );

        let mut best: Option<(Member, i32)> = None;
        for candidate in candidates {
            let Some(usable) =
                access::find_accessible(self.provider, candidate.declaring_type(), &candidate)
            else {
                continue;
            };
            let fit = self.fit_distance(arg_types, &usable);
            if fit < 0 {
                continue;
            }
            // Strict less-than: on a tie the earliest candidate in
            // signature order stays the winner.
            match &best {
                Some((_, best_fit)) if fit >= *best_fit => {}
                _ => best = Some((usable, fit)),
            }
        }

        let (member, fit) = best?;
        if self.vetoes_variadic(&member, arg_types) {
            debug!(
                method = name,
                best = %signature(self.provider, &member),
                "variadic trailing-argument veto rejected best match"
            );
            return None;
        }
        debug!(best = %signature(self.provider, &member), fit, "selected best match");
        Some(member)
    }

    /// Resolve against *declared* members of `ty` and its superclass
    /// chain, ignoring visibility entirely. Exact signature match first,
    /// then the same distance ranking and deterministic tie-break as
    /// [`OverloadResolver::resolve`]; no variadic veto.
    ///
    /// This backs force-access invocation, where the caller deliberately
    /// bypasses accessibility.
    pub fn resolve_declared(
        &self,
        ty: TypeId,
        name: &str,
        arg_types: &[Option<TypeId>],
    ) -> Option<Member> {
        let mut declared: Vec<Member> = Vec::new();
        let mut cursor = Some(ty);
        while let Some(current) = cursor {
            declared.extend(
                self.provider
                    .members(current, true)
                    .into_iter()
                    .filter(|m| m.name() == name),
            );
            cursor = self.provider.superclass(current);
        }

        if let Some(exact) = known_types(arg_types) {
            if let Some(member) = declared.iter().find(|m| m.param_types() == exact.as_slice()) {
                return Some(member.clone());
            }
        }

        declared.retain(|m| self.is_match(m, arg_types));
        declared.sort_by_cached_key(|m| signature(self.provider, m));

        let mut best: Option<(Member, i32)> = None;
        for candidate in declared {
            let fit = self.fit_distance(arg_types, &candidate);
            if fit < 0 {
                continue;
            }
            match &best {
                Some((_, best_fit)) if fit >= *best_fit => {}
                _ => best = Some((candidate, fit)),
            }
        }
        best.map(|(member, _)| member)
    }

    /// Whether the member's parameter list can absorb the argument list,
    /// either positionally or through variadic absorption of any number
    /// (>= 0) of trailing arguments.
    fn is_match(&self, member: &Member, arg_types: &[Option<TypeId>]) -> bool {
        let params = member.param_types();
        if compat::lists_assignable(self.provider, arg_types, params, true) {
            return true;
        }
        if !member.is_variadic() || params.is_empty() {
            return false;
        }
        let fixed = params.len() - 1;
        if arg_types.len() < fixed {
            return false;
        }
        let Some(component) = self.provider.component_type(params[fixed]) else {
            return false;
        };
        for (arg, param) in arg_types[..fixed].iter().zip(&params[..fixed]) {
            if !compat::is_assignable(self.provider, *arg, *param, true) {
                return false;
            }
        }
        arg_types[fixed..]
            .iter()
            .all(|arg| compat::is_assignable(self.provider, *arg, component, true))
    }

    /// Distance of the argument list to the member, accounting for
    /// variadic arity: when the declared list does not fit directly, the
    /// trailing component type is repeated to the supplied arity and the
    /// distance is computed against that effective list.
    fn fit_distance(&self, arg_types: &[Option<TypeId>], member: &Member) -> i32 {
        let params = member.param_types();
        let direct = compat::distance(self.provider, arg_types, params);
        if direct >= 0 || !member.is_variadic() || params.is_empty() {
            return direct;
        }
        let fixed = params.len() - 1;
        if arg_types.len() < fixed {
            return -1;
        }
        let Some(component) = self.provider.component_type(params[fixed]) else {
            return -1;
        };
        let mut effective: Vec<TypeId> = params[..fixed].to_vec();
        effective.resize(arg_types.len(), component);
        compat::distance(self.provider, arg_types, &effective)
    }

    /// The final variadic compatibility veto (see [`OverloadResolver::resolve`]
    /// for the sharp edge it carries). Fires only when the last argument's
    /// type is known *and* has a superclass, and neither its own name nor
    /// its superclass's name equals the boxed name of the trailing
    /// component type.
    fn vetoes_variadic(&self, member: &Member, arg_types: &[Option<TypeId>]) -> bool {
        let params = member.param_types();
        if !member.is_variadic() || params.is_empty() || arg_types.is_empty() {
            return false;
        }
        let Some(component) = self.provider.component_type(params[params.len() - 1]) else {
            return false;
        };
        let component_name = self.provider.type_name(self.provider.boxed_equivalent(component));
        let Some(last) = arg_types[arg_types.len() - 1] else {
            return false;
        };
        let last_name = self.provider.type_name(last);
        let Some(last_superclass) = self.provider.superclass(last) else {
            return false;
        };
        let super_name = self.provider.type_name(last_superclass);
        component_name != last_name && component_name != super_name
    }
}

/// The fully known argument types, or `None` if any entry is unknown.
pub(crate) fn known_types(arg_types: &[Option<TypeId>]) -> Option<Vec<TypeId>> {
    arg_types.iter().copied().collect()
}
