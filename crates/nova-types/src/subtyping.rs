//! Subtyping, assignment and cast compatibility.
//!
//! Unknown and error types are compatible with everything so that a single unresolved symbol
//! doesn't cascade into a wall of follow-up diagnostics.

use std::collections::HashSet;

use crate::{
    canonicalize_named, erasure, instantiate_as_supertype, is_inheritor, ClassType, PrimitiveType,
    Type, TypeEnv, TypeVarId, WildcardBound,
};

/// `sub <: sup` (JLS 4.10). Primitive types are only subtypes of themselves here; widening is an
/// assignment concern.
pub fn is_subtype(env: &dyn TypeEnv, sub: &Type, sup: &Type) -> bool {
    Subtyping::new(env, false).subtype(sub, sup)
}

/// Whether a value of type `source` may be assigned to `target` (JLS 5.2), including
/// boxing/unboxing and unchecked conversion from raw types.
pub fn is_assignable(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    if target.is_errorish() || source.is_errorish() {
        return true;
    }
    let target = canonicalize_named(env, target);
    let source = canonicalize_named(env, source);
    match (&target, &source) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(t), Type::Primitive(s)) => s == t || s.widens_to(*t),
        (Type::Primitive(t), _) => match unboxed_type(env, &source) {
            Some(s) => s == *t || s.widens_to(*t),
            None => false,
        },
        (_, Type::Primitive(s)) => match boxed_type(env, *s) {
            Some(boxed) => Subtyping::new(env, true).subtype(&boxed, &target),
            None => false,
        },
        _ => Subtyping::new(env, true).subtype(&source, &target),
    }
}

/// Whether `source` can be cast to `target` (JLS 5.5), at erasure granularity.
pub fn is_castable(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    if target.is_errorish() || source.is_errorish() || target == source {
        return true;
    }
    let target = canonicalize_named(env, target);
    let source = canonicalize_named(env, source);
    match (&target, &source) {
        (Type::Void, _) | (_, Type::Void) => false,
        (Type::Primitive(t), Type::Primitive(s)) => t.is_numeric() == s.is_numeric(),
        (Type::Primitive(t), _) => {
            if let Some(s) = unboxed_type(env, &source) {
                return s == *t || s.widens_to(*t);
            }
            // `(int) obj` downcasts to `Integer` and unboxes.
            match boxed_type(env, *t) {
                Some(boxed) => is_subtype(env, &boxed, &erasure(env, &source)),
                None => false,
            }
        }
        (_, Type::Primitive(s)) => match boxed_type(env, *s) {
            Some(boxed) => is_subtype(env, &boxed, &erasure(env, &target)),
            None => false,
        },
        (_, Type::Null) => true,
        (Type::Null, _) => false,
        (Type::Intersection(parts), _) => parts.iter().all(|p| is_castable(env, p, &source)),
        (_, Type::Intersection(parts)) => parts.iter().all(|p| is_castable(env, &target, p)),
        (Type::TypeVar(_), _) | (_, Type::TypeVar(_)) | (Type::Wildcard(_), _) | (_, Type::Wildcard(_)) => {
            is_castable(env, &erasure(env, &target), &erasure(env, &source))
        }
        (Type::Array(t), Type::Array(s)) => {
            if t.is_primitive() || s.is_primitive() {
                t == s
            } else {
                is_castable(env, t, s)
            }
        }
        (Type::Array(_), Type::Class(ct)) | (Type::Class(ct), Type::Array(_)) => {
            let wk = env.well_known();
            ct.def == wk.object || ct.def == wk.cloneable || ct.def == wk.serializable
        }
        (Type::Class(t), Type::Class(s)) => classes_castable(env, t, s),
        _ => false,
    }
}

fn classes_castable(env: &dyn TypeEnv, target: &ClassType, source: &ClassType) -> bool {
    if target.def == source.def
        || is_inheritor(env, target.def, source.def, true)
        || is_inheritor(env, source.def, target.def, true)
    {
        return true;
    }
    let (Some(t), Some(s)) = (env.class(target.def), env.class(source.def)) else {
        return true;
    };
    match (t.is_interface(), s.is_interface()) {
        (true, true) => true,
        (true, false) => !s.is_final,
        (false, true) => !t.is_final,
        (false, false) => false,
    }
}

/// The wrapper class type of a primitive, when the environment defines it.
pub fn boxed_type(env: &dyn TypeEnv, primitive: PrimitiveType) -> Option<Type> {
    env.lookup_class(primitive.boxed_class_name())
        .map(|id| Type::class(id, vec![]))
}

/// The primitive a wrapper class type unboxes to.
pub fn unboxed_type(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    let Type::Class(ClassType { def, .. }) = canonicalize_named(env, ty) else {
        return None;
    };
    let class = env.class(def)?;
    PrimitiveType::ALL
        .into_iter()
        .find(|p| p.boxed_class_name() == class.name)
}

/// Unary numeric promotion (JLS 5.6.1): `byte`, `short` and `char` become `int`.
pub fn unary_numeric_promotion(env: &dyn TypeEnv, ty: &Type) -> Option<PrimitiveType> {
    let primitive = match ty {
        Type::Primitive(p) => *p,
        other => unboxed_type(env, other)?,
    };
    if !primitive.is_numeric() {
        return None;
    }
    Some(if primitive.rank() < PrimitiveType::Int.rank() {
        PrimitiveType::Int
    } else {
        primitive
    })
}

/// Binary numeric promotion (JLS 5.6.2) of two operands, after unboxing.
pub fn binary_numeric_promotion(env: &dyn TypeEnv, lhs: &Type, rhs: &Type) -> Option<PrimitiveType> {
    let lhs = unary_numeric_promotion(env, lhs)?;
    let rhs = unary_numeric_promotion(env, rhs)?;
    Some(if lhs.rank() >= rhs.rank() { lhs } else { rhs })
}

/// Subclasses of `RuntimeException` and `Error` need not be declared or caught.
pub fn is_unchecked_exception(env: &dyn TypeEnv, ty: &Type) -> bool {
    let wk = env.well_known();
    let erased = erasure(env, ty);
    is_subtype(env, &erased, &Type::class(wk.runtime_exception, vec![]))
        || is_subtype(env, &erased, &Type::class(wk.error, vec![]))
}

struct Subtyping<'a> {
    env: &'a dyn TypeEnv,
    /// Accept a raw type where a parameterization is expected (unchecked conversion).
    unchecked: bool,
    visiting: HashSet<TypeVarId>,
}

impl<'a> Subtyping<'a> {
    fn new(env: &'a dyn TypeEnv, unchecked: bool) -> Self {
        Self {
            env,
            unchecked,
            visiting: HashSet::new(),
        }
    }

    fn subtype(&mut self, sub: &Type, sup: &Type) -> bool {
        if sub == sup || sub.is_errorish() || sup.is_errorish() {
            return true;
        }
        if matches!(sub, Type::Named(_)) || matches!(sup, Type::Named(_)) {
            let sub = canonicalize_named(self.env, sub);
            let sup = canonicalize_named(self.env, sup);
            if matches!(sub, Type::Named(_)) || matches!(sup, Type::Named(_)) {
                return sub == sup;
            }
            return self.subtype(&sub, &sup);
        }

        match (sub, sup) {
            (Type::Null, sup) => sup.is_reference(),
            (_, Type::Intersection(parts)) => parts.iter().all(|p| self.subtype(sub, p)),
            (Type::Intersection(parts), _) => parts.iter().any(|p| self.subtype(p, sup)),
            (Type::TypeVar(id), _) => {
                if !self.visiting.insert(*id) {
                    return false;
                }
                let bounds = self
                    .env
                    .type_param(*id)
                    .map(|tp| tp.upper_bounds.clone())
                    .unwrap_or_default();
                let result = if bounds.is_empty() {
                    matches!(sup, Type::Class(ct) if ct.def == self.env.well_known().object)
                } else {
                    bounds.iter().any(|b| self.subtype(b, sup))
                };
                self.visiting.remove(id);
                result
            }
            (_, Type::TypeVar(id)) => {
                let lower = self.env.type_param(*id).and_then(|tp| tp.lower_bound.clone());
                match lower {
                    Some(lower) => self.subtype(sub, &lower),
                    None => false,
                }
            }
            (Type::Array(a), Type::Array(b)) => {
                if a.is_primitive() || b.is_primitive() {
                    a == b
                } else {
                    self.subtype(a, b)
                }
            }
            (Type::Array(_), Type::Class(ct)) => {
                let wk = self.env.well_known();
                ct.def == wk.object || ct.def == wk.cloneable || ct.def == wk.serializable
            }
            (Type::Class(_), Type::Class(target)) => {
                let Some(Type::Class(view)) = instantiate_as_supertype(self.env, sub, target.def)
                else {
                    return false;
                };
                if target.args.is_empty() {
                    return true;
                }
                if view.args.is_empty() {
                    return self.unchecked;
                }
                view.args.len() == target.args.len()
                    && target
                        .args
                        .iter()
                        .zip(&view.args)
                        .all(|(formal, actual)| self.contains(formal, actual))
            }
            _ => false,
        }
    }

    /// Type argument containment (JLS 4.5.1): does `formal` contain `actual`?
    fn contains(&mut self, formal: &Type, actual: &Type) -> bool {
        if formal.is_errorish() || actual.is_errorish() {
            return true;
        }
        let object = Type::class(self.env.well_known().object, vec![]);
        match formal {
            Type::Wildcard(WildcardBound::Unbounded) => true,
            Type::Wildcard(WildcardBound::Extends(bound)) => match actual {
                Type::Wildcard(WildcardBound::Extends(a)) => self.subtype(a, bound),
                Type::Wildcard(_) => **bound == object,
                a => self.subtype(a, bound),
            },
            Type::Wildcard(WildcardBound::Super(bound)) => match actual {
                Type::Wildcard(WildcardBound::Super(a)) => self.subtype(bound, a),
                Type::Wildcard(_) => false,
                a => self.subtype(bound, a),
            },
            formal => {
                let unchecked = std::mem::replace(&mut self.unchecked, false);
                let result = match (formal, actual) {
                    (Type::Class(_), Type::Class(_)) | (Type::Array(_), Type::Array(_)) => {
                        self.subtype(actual, formal) && self.subtype(formal, actual)
                    }
                    _ => formal == actual,
                };
                self.unchecked = unchecked;
                result
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TypeStore;

    fn class(env: &TypeStore, name: &str, args: Vec<Type>) -> Type {
        Type::class(env.lookup_class(name).unwrap(), args)
    }

    #[test]
    fn primitive_widening_and_boxing() {
        let env = TypeStore::with_minimal_jdk();
        let int = Type::Primitive(PrimitiveType::Int);
        let long = Type::Primitive(PrimitiveType::Long);
        let integer = class(&env, "Integer", vec![]);
        let object = class(&env, "Object", vec![]);

        assert!(is_assignable(&env, &long, &int));
        assert!(!is_assignable(&env, &int, &long));
        assert!(is_assignable(&env, &integer, &int));
        assert!(is_assignable(&env, &object, &int));
        assert!(is_assignable(&env, &long, &integer));
        assert!(!is_assignable(&env, &int, &Type::Primitive(PrimitiveType::Boolean)));
    }

    #[test]
    fn generics_are_invariant_but_raw_is_unchecked() {
        let env = TypeStore::with_minimal_jdk();
        let string = class(&env, "String", vec![]);
        let object = class(&env, "Object", vec![]);
        let list_string = class(&env, "java.util.List", vec![string.clone()]);
        let list_object = class(&env, "java.util.List", vec![object]);
        let raw_list = class(&env, "java.util.List", vec![]);
        let array_list_string = class(&env, "java.util.ArrayList", vec![string.clone()]);

        assert!(is_assignable(&env, &list_string, &array_list_string));
        assert!(!is_assignable(&env, &list_object, &list_string));
        assert!(is_assignable(&env, &raw_list, &list_string));
        assert!(is_assignable(&env, &list_string, &raw_list));
        assert!(!is_subtype(&env, &raw_list, &list_string));

        let wildcard = class(
            &env,
            "java.util.List",
            vec![Type::Wildcard(WildcardBound::Extends(Box::new(
                class(&env, "Object", vec![]),
            )))],
        );
        assert!(is_assignable(&env, &wildcard, &list_string));
    }

    #[test]
    fn casts_between_unrelated_classes_are_rejected() {
        let env = TypeStore::with_minimal_jdk();
        let string = class(&env, "String", vec![]);
        let integer = class(&env, "Integer", vec![]);
        let object = class(&env, "Object", vec![]);
        let comparable = class(&env, "Comparable", vec![]);

        assert!(!is_castable(&env, &integer, &string));
        assert!(is_castable(&env, &string, &object));
        assert!(is_castable(&env, &comparable, &object));
        assert!(is_castable(&env, &Type::Primitive(PrimitiveType::Int), &object));
        assert!(!is_castable(
            &env,
            &Type::Primitive(PrimitiveType::Boolean),
            &Type::Primitive(PrimitiveType::Int)
        ));
    }

    #[test]
    fn runtime_exceptions_are_unchecked() {
        let env = TypeStore::with_minimal_jdk();
        assert!(is_unchecked_exception(
            &env,
            &class(&env, "java.lang.IllegalArgumentException", vec![])
        ));
        assert!(!is_unchecked_exception(
            &env,
            &class(&env, "java.io.IOException", vec![])
        ));
    }
}
