//! Hierarchy queries over method signatures: overridden methods, unimplemented abstract methods
//! and clashes between inherited signatures.

use std::collections::{HashSet, VecDeque};

use nova_types::java::overload::MethodCandidate;
use nova_types::{
    direct_supertypes, erasure, is_assignable, supertype_substitutor, ClassId, MethodDef,
    Substitutor, Type, TypeEnv, Visibility,
};

/// Supertypes of `class`, breadth-first and without `class` itself, each with the substitution
/// viewing its members from `class`.
pub(crate) fn ancestors(env: &dyn TypeEnv, class: ClassId) -> Vec<(ClassId, Substitutor)> {
    let mut seen = HashSet::from([class]);
    let mut out = Vec::new();
    let mut queue = VecDeque::from([class]);
    while let Some(current) = queue.pop_front() {
        for sup in direct_supertypes(env, current) {
            let Some(def) = nova_types::canonicalize_named(env, &sup).as_class().map(|ct| ct.def) else {
                continue;
            };
            if !seen.insert(def) {
                continue;
            }
            let subst = supertype_substitutor(env, class, def).unwrap_or_default();
            out.push((def, subst));
            queue.push_back(def);
        }
    }
    out
}

pub(crate) fn erased(env: &dyn TypeEnv, params: &[Type]) -> Vec<Type> {
    params.iter().map(|p| erasure(env, p)).collect()
}

/// Whether `mine` is a subsignature of `theirs` (JLS 8.4.2); both are viewed from the same class.
pub(crate) fn is_subsignature(env: &dyn TypeEnv, mine: &[Type], theirs: &[Type], generic: bool) -> bool {
    if mine.len() != theirs.len() {
        return false;
    }
    if mine == theirs {
        return true;
    }
    let theirs_erased = erased(env, theirs);
    if mine == theirs_erased.as_slice() {
        return true;
    }
    generic && erased(env, mine) == theirs_erased
}

fn same_package(env: &dyn TypeEnv, a: ClassId, b: ClassId) -> bool {
    match (env.class(a), env.class(b)) {
        (Some(a), Some(b)) => a.package_name() == b.package_name(),
        _ => true,
    }
}

fn candidate(owner: ClassId, index: usize, substitutor: Substitutor) -> MethodCandidate {
    MethodCandidate {
        owner,
        index,
        is_constructor: false,
        substitutor,
    }
}

/// Methods of `class`'s supertypes that `method` (declared in `class`) overrides or hides.
pub(crate) fn super_methods(env: &dyn TypeEnv, class: ClassId, method: &MethodDef) -> Vec<MethodCandidate> {
    let mut out = Vec::new();
    for (owner, subst) in ancestors(env, class) {
        let Some(def) = env.class(owner) else {
            continue;
        };
        for (index, other) in def.methods.iter().enumerate() {
            if other.name != method.name || other.visibility == Visibility::Private {
                continue;
            }
            if other.visibility == Visibility::Package && !same_package(env, owner, class) {
                continue;
            }
            let theirs: Vec<Type> = other.params.iter().map(|p| subst.apply(env, p)).collect();
            let generic = !method.type_params.is_empty() && !other.type_params.is_empty();
            if is_subsignature(env, &method.params, &theirs, generic) {
                out.push(candidate(owner, index, subst.clone()));
            }
        }
    }
    out
}

/// Methods in `class`'s supertypes with the same name and erasure as `method` that it does not
/// override.
pub(crate) fn erasure_clashes(env: &dyn TypeEnv, class: ClassId, method: &MethodDef) -> Vec<MethodCandidate> {
    let mine = erased(env, &method.params);
    let mut out = Vec::new();
    for (owner, subst) in ancestors(env, class) {
        let Some(def) = env.class(owner) else {
            continue;
        };
        for (index, other) in def.methods.iter().enumerate() {
            if other.name != method.name || other.visibility == Visibility::Private || other.is_static {
                continue;
            }
            if erased(env, &other.params) != mine {
                continue;
            }
            let theirs: Vec<Type> = other.params.iter().map(|p| subst.apply(env, p)).collect();
            let generic = !method.type_params.is_empty() && !other.type_params.is_empty();
            if !is_subsignature(env, &method.params, &theirs, generic) {
                out.push(candidate(owner, index, subst.clone()));
            }
        }
    }
    out
}

/// The first abstract method reachable from `class` with no concrete implementation in its
/// superclass chain.
pub(crate) fn first_unimplemented(env: &dyn TypeEnv, class: ClassId) -> Option<MethodCandidate> {
    let mut all = vec![(class, Substitutor::empty())];
    all.extend(ancestors(env, class));

    let concrete: Vec<(String, Vec<Type>)> = all
        .iter()
        .filter_map(|(owner, subst)| env.class(*owner).map(|def| (def, subst)))
        .flat_map(|(def, subst)| {
            def.methods
                .iter()
                .filter(|m| !m.is_abstract && !m.is_static)
                .map(move |m| {
                    let params: Vec<Type> = m.params.iter().map(|p| subst.apply(env, p)).collect();
                    (m.name.clone(), erased(env, &params))
                })
        })
        .collect();

    for (owner, subst) in &all {
        let Some(def) = env.class(*owner) else {
            continue;
        };
        for (index, method) in def.methods.iter().enumerate() {
            if !method.is_abstract {
                continue;
            }
            let params: Vec<Type> = method.params.iter().map(|p| subst.apply(env, p)).collect();
            let params = erased(env, &params);
            let implemented = concrete
                .iter()
                .any(|(name, theirs)| *name == method.name && *theirs == params);
            if !implemented {
                return Some(candidate(*owner, index, subst.clone()));
            }
        }
    }
    None
}

/// Two inherited methods with the same signature and return types neither of which is a subtype
/// of the other. Methods `class` declares itself take precedence and are skipped.
pub(crate) fn inherited_return_clash(env: &dyn TypeEnv, class: ClassId) -> Option<(MethodCandidate, MethodCandidate)> {
    let own: Vec<(String, Vec<Type>)> = env
        .class(class)?
        .methods
        .iter()
        .map(|m| (m.name.clone(), erased(env, &m.params)))
        .collect();

    let mut inherited: Vec<(MethodCandidate, Vec<Type>)> = Vec::new();
    for (owner, subst) in ancestors(env, class) {
        let Some(def) = env.class(owner) else {
            continue;
        };
        for (index, method) in def.methods.iter().enumerate() {
            if method.is_static || method.visibility == Visibility::Private {
                continue;
            }
            let params: Vec<Type> = method.params.iter().map(|p| subst.apply(env, p)).collect();
            let params = erased(env, &params);
            if own.iter().any(|(name, p)| *name == method.name && *p == params) {
                continue;
            }
            let current = candidate(owner, index, subst.clone());
            for (earlier, earlier_params) in &inherited {
                if earlier.owner == owner
                    || earlier.name(env) != method.name
                    || *earlier_params != params
                {
                    continue;
                }
                let a = earlier.return_type(env);
                let b = current.return_type(env);
                if !returns_related(env, &a, &b) {
                    return Some((earlier.clone(), current));
                }
            }
            inherited.push((current, params));
        }
    }
    None
}

fn returns_related(env: &dyn TypeEnv, a: &Type, b: &Type) -> bool {
    if a.is_errorish() || b.is_errorish() {
        return true;
    }
    if a.is_primitive() || b.is_primitive() || a.is_void() || b.is_void() {
        return a == b;
    }
    is_assignable(env, a, b) || is_assignable(env, b, a)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::{ClassDef, ClassKind, PrimitiveType, TypeStore};
    use pretty_assertions::assert_eq;

    fn abstract_method(name: &str, params: Vec<Type>, ret: Type) -> MethodDef {
        MethodDef {
            name: name.to_string(),
            params,
            return_type: ret,
            is_abstract: true,
            visibility: Visibility::Public,
            ..MethodDef::default()
        }
    }

    #[test]
    fn abstract_methods_through_generic_interfaces() {
        let mut store = TypeStore::with_minimal_jdk();
        let comparable = store.class_id("java.lang.Comparable").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let a = store.add_class(ClassDef {
            name: "A".to_string(),
            interfaces: vec![Type::class(comparable, vec![string.clone()])],
            ..ClassDef::default()
        });
        let missing = first_unimplemented(&store, a).unwrap();
        assert_eq!(missing.owner, comparable);
        assert_eq!(missing.params(&store), vec![string.clone()]);

        let b = store.add_class(ClassDef {
            name: "B".to_string(),
            interfaces: vec![Type::class(comparable, vec![string.clone()])],
            methods: vec![MethodDef {
                is_abstract: false,
                ..abstract_method("compareTo", vec![string], Type::Primitive(PrimitiveType::Int))
            }],
            ..ClassDef::default()
        });
        assert_eq!(first_unimplemented(&store, b), None);
    }

    #[test]
    fn unrelated_inherited_returns_clash() {
        let mut store = TypeStore::with_minimal_jdk();
        let string = Type::class(store.well_known().string, vec![]);
        let i = store.add_class(ClassDef {
            name: "I".to_string(),
            kind: ClassKind::Interface,
            methods: vec![abstract_method("f", vec![], string)],
            ..ClassDef::default()
        });
        let j = store.add_class(ClassDef {
            name: "J".to_string(),
            kind: ClassKind::Interface,
            methods: vec![abstract_method("f", vec![], Type::Primitive(PrimitiveType::Int))],
            ..ClassDef::default()
        });
        let c = store.add_class(ClassDef {
            name: "C".to_string(),
            kind: ClassKind::Interface,
            interfaces: vec![Type::class(i, vec![]), Type::class(j, vec![])],
            ..ClassDef::default()
        });
        let (a, b) = inherited_return_clash(&store, c).unwrap();
        assert_eq!((a.owner, b.owner), (i, j));
    }
}
