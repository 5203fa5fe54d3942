use std::collections::{HashMap, HashSet, VecDeque};

use crate::{ClassId, ClassType, Substitutor, Type, TypeEnv, TypeVarId, Visibility};

/// Return `ty` viewed as `target` by walking the supertype graph and applying type argument
/// substitution along the way.
///
/// Missing class metadata simply yields `None`. A raw type stays raw on every edge.
///
/// Example: `ArrayList<String>` instantiated as `Iterable` returns `Iterable<String>`.
pub fn instantiate_as_supertype(env: &dyn TypeEnv, ty: &Type, target: ClassId) -> Option<Type> {
    fn inner(
        env: &dyn TypeEnv,
        ty: &Type,
        target: ClassId,
        seen_type_vars: &mut HashSet<TypeVarId>,
    ) -> Option<Type> {
        match ty {
            Type::Array(_) => {
                let wk = env.well_known();
                if target == wk.object || target == wk.cloneable || target == wk.serializable {
                    return Some(Type::class(target, vec![]));
                }
                return None;
            }
            Type::Intersection(parts) => {
                return parts
                    .iter()
                    .find_map(|part| inner(env, part, target, seen_type_vars));
            }
            Type::TypeVar(id) => {
                if !seen_type_vars.insert(*id) {
                    return None;
                }
                let found = match env.type_param(*id) {
                    Some(tp) if !tp.upper_bounds.is_empty() => tp
                        .upper_bounds
                        .iter()
                        .find_map(|bound| inner(env, bound, target, seen_type_vars)),
                    _ if target == env.well_known().object => {
                        Some(Type::class(target, vec![]))
                    }
                    _ => None,
                };
                seen_type_vars.remove(id);
                return found;
            }
            _ => {}
        }

        let ty = crate::canonicalize_named(env, ty);
        let Type::Class(ClassType { def, args }) = ty else {
            return None;
        };

        let mut queue: VecDeque<Type> = VecDeque::new();
        let mut seen: HashSet<(ClassId, Vec<Type>)> = HashSet::new();
        queue.push_back(Type::class(def, args));

        while let Some(current) = queue.pop_front() {
            let Type::Class(ClassType { def, args }) = current.clone() else {
                continue;
            };
            if !seen.insert((def, args.clone())) {
                continue;
            }
            if def == target {
                return Some(current);
            }
            let Some(class_def) = env.class(def) else {
                continue;
            };

            let raw = args.is_empty() && !class_def.type_params.is_empty();
            let subst: HashMap<TypeVarId, Type> = class_def
                .type_params
                .iter()
                .copied()
                .enumerate()
                .map(|(idx, formal)| (formal, args.get(idx).cloned().unwrap_or(Type::Unknown)))
                .collect();

            for sup in direct_supertypes(env, def) {
                let next = if raw {
                    raw_class_type(env, &sup)
                } else {
                    Some(crate::canonicalize_named(env, &crate::substitute(&sup, &subst)))
                };
                if let Some(next) = next {
                    queue.push_back(next);
                }
            }
        }

        None
    }

    let mut seen_type_vars = HashSet::new();
    inner(env, ty, target, &mut seen_type_vars)
}

fn raw_class_type(env: &dyn TypeEnv, ty: &Type) -> Option<Type> {
    match crate::canonicalize_named(env, ty) {
        Type::Class(ClassType { def, .. }) => Some(Type::class(def, vec![])),
        _ => None,
    }
}

/// Declared supertypes of `class`, with the implicit `java.lang.Object` supertype made explicit.
pub fn direct_supertypes(env: &dyn TypeEnv, class: ClassId) -> Vec<Type> {
    let Some(def) = env.class(class) else {
        return Vec::new();
    };
    let object = env.well_known().object;
    let mut out = Vec::with_capacity(def.interfaces.len() + 1);
    match &def.super_class {
        Some(sc) => out.push(sc.clone()),
        None if class != object && !def.is_interface() => out.push(Type::class(object, vec![])),
        None => {}
    }
    out.extend(def.interfaces.iter().cloned());
    if def.is_interface() {
        out.push(Type::class(object, vec![]));
    }
    out
}

/// Whether `class` inherits from `base`. With `deep == false` only direct supertypes count.
///
/// Cyclic hierarchies terminate: every class is visited once.
pub fn is_inheritor(env: &dyn TypeEnv, class: ClassId, base: ClassId, deep: bool) -> bool {
    let mut seen = HashSet::new();
    let mut stack = vec![class];
    while let Some(current) = stack.pop() {
        if !seen.insert(current) {
            continue;
        }
        for sup in direct_supertypes(env, current) {
            let Some(sup) = raw_class_type(env, &sup) else {
                continue;
            };
            let Type::Class(ClassType { def, .. }) = sup else {
                continue;
            };
            if def == base {
                return true;
            }
            if deep {
                stack.push(def);
            }
        }
    }
    false
}

/// The substitution mapping `ancestor`'s type parameters as seen from `class` (with `class`'s own
/// parameters left as type variables). Raw inheritance edges produce raw mappings.
pub fn supertype_substitutor(
    env: &dyn TypeEnv,
    class: ClassId,
    ancestor: ClassId,
) -> Option<Substitutor> {
    let def = env.class(class)?;
    let own = Type::class(
        class,
        def.type_params.iter().map(|tp| Type::TypeVar(*tp)).collect(),
    );
    match instantiate_as_supertype(env, &own, ancestor)? {
        Type::Class(ct) => Some(Substitutor::for_class_type(env, &ct)),
        _ => None,
    }
}

/// Classes reachable from `class` through supertypes, breadth-first, `class` first.
fn hierarchy(env: &dyn TypeEnv, class: ClassId) -> Vec<ClassId> {
    let mut seen = HashSet::new();
    let mut order = Vec::new();
    let mut queue = VecDeque::from([class]);
    while let Some(current) = queue.pop_front() {
        if !seen.insert(current) {
            continue;
        }
        order.push(current);
        for sup in direct_supertypes(env, current) {
            if let Some(Type::Class(ClassType { def, .. })) = raw_class_type(env, &sup) {
                queue.push_back(def);
            }
        }
    }
    order
}

/// The nearest class in `class`'s hierarchy declaring a field `name`, with the field's index.
pub fn find_field(env: &dyn TypeEnv, class: ClassId, name: &str) -> Option<(ClassId, usize)> {
    hierarchy(env, class).into_iter().find_map(|owner| {
        let def = env.class(owner)?;
        let index = def.fields.iter().position(|f| f.name == name)?;
        Some((owner, index))
    })
}

/// A member class `name` declared in `class` or inherited from one of its supertypes.
pub fn find_member_class(env: &dyn TypeEnv, class: ClassId, name: &str) -> Option<ClassId> {
    hierarchy(env, class).into_iter().find_map(|owner| {
        let def = env.class(owner)?;
        env.lookup_class(&format!("{}${name}", def.name))
            .filter(|found| env.class(*found).and_then(|c| c.enclosing) == Some(owner))
    })
}

/// The top-level class `class` is nested in (itself when top-level).
pub fn outermost_class(env: &dyn TypeEnv, class: ClassId) -> ClassId {
    let mut current = class;
    let mut steps = 0;
    while let Some(parent) = env.class(current).and_then(|c| c.enclosing) {
        current = parent;
        steps += 1;
        if steps > 64 {
            break;
        }
    }
    current
}

/// Whether a member of `owner` with `visibility` can be accessed from code in `from`.
pub fn is_accessible(env: &dyn TypeEnv, owner: ClassId, visibility: Visibility, from: ClassId) -> bool {
    match visibility {
        Visibility::Public => true,
        Visibility::Private => outermost_class(env, owner) == outermost_class(env, from),
        Visibility::Package => same_package(env, owner, from),
        Visibility::Protected => {
            if same_package(env, owner, from) {
                return true;
            }
            let mut current = Some(from);
            while let Some(class) = current {
                if class == owner || is_inheritor(env, class, owner, true) {
                    return true;
                }
                current = env.class(class).and_then(|c| c.enclosing);
            }
            false
        }
    }
}

fn same_package(env: &dyn TypeEnv, a: ClassId, b: ClassId) -> bool {
    match (env.class(a), env.class(b)) {
        (Some(a), Some(b)) => a.package_name() == b.package_name(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassDef, ClassKind, TypeStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn array_list_is_viewed_as_iterable_with_arguments() {
        let env = TypeStore::with_minimal_jdk();
        let array_list = env.class_id("java.util.ArrayList").unwrap();
        let iterable = env.well_known().iterable;
        let string = Type::class(env.well_known().string, vec![]);

        let view = instantiate_as_supertype(
            &env,
            &Type::class(array_list, vec![string.clone()]),
            iterable,
        );
        assert_eq!(view, Some(Type::class(iterable, vec![string])));
    }

    #[test]
    fn raw_types_stay_raw() {
        let env = TypeStore::with_minimal_jdk();
        let array_list = env.class_id("java.util.ArrayList").unwrap();
        let list = env.class_id("java.util.List").unwrap();

        let view = instantiate_as_supertype(&env, &Type::class(array_list, vec![]), list);
        assert_eq!(view, Some(Type::class(list, vec![])));
    }

    #[test]
    fn private_members_are_visible_within_the_same_top_level_class() {
        let mut env = TypeStore::with_minimal_jdk();
        let outer = env.add_class(ClassDef {
            name: "p.Outer".to_string(),
            ..ClassDef::default()
        });
        let inner = env.add_class(ClassDef {
            name: "p.Outer$Inner".to_string(),
            enclosing: Some(outer),
            ..ClassDef::default()
        });
        let other = env.add_class(ClassDef {
            name: "q.Other".to_string(),
            ..ClassDef::default()
        });

        assert!(is_accessible(&env, outer, Visibility::Private, inner));
        assert!(!is_accessible(&env, outer, Visibility::Private, other));
        assert!(!is_accessible(&env, outer, Visibility::Package, other));
        assert!(is_accessible(&env, inner, Visibility::Package, outer));
    }

    #[test]
    fn fields_and_member_classes_are_found_through_supertypes() {
        let mut env = TypeStore::with_minimal_jdk();
        let base = env.add_class(ClassDef {
            name: "p.Base".to_string(),
            fields: vec![crate::FieldDef {
                name: "count".to_string(),
                ty: Type::Primitive(crate::PrimitiveType::Int),
                ..crate::FieldDef::default()
            }],
            ..ClassDef::default()
        });
        let nested = env.add_class(ClassDef {
            name: "p.Base$Node".to_string(),
            enclosing: Some(base),
            ..ClassDef::default()
        });
        let derived = env.add_class(ClassDef {
            name: "p.Derived".to_string(),
            super_class: Some(Type::class(base, vec![])),
            ..ClassDef::default()
        });

        assert_eq!(find_field(&env, derived, "count"), Some((base, 0)));
        assert_eq!(find_field(&env, derived, "missing"), None);
        assert_eq!(find_member_class(&env, derived, "Node"), Some(nested));
    }

    #[test]
    fn cyclic_hierarchy_terminates() {
        let mut env = TypeStore::with_minimal_jdk();
        let a = env.intern_class_id("A");
        let b = env.intern_class_id("B");
        env.define_class(
            a,
            ClassDef {
                name: "A".to_string(),
                kind: ClassKind::Class,
                super_class: Some(Type::class(b, vec![])),
                ..ClassDef::default()
            },
        );
        env.define_class(
            b,
            ClassDef {
                name: "B".to_string(),
                kind: ClassKind::Class,
                super_class: Some(Type::class(a, vec![])),
                ..ClassDef::default()
            },
        );

        assert!(is_inheritor(&env, a, a, true));
        assert!(!is_inheritor(&env, a, env.well_known().string, true));
        assert_eq!(
            instantiate_as_supertype(&env, &Type::class(a, vec![]), env.well_known().string),
            None
        );
    }
}
