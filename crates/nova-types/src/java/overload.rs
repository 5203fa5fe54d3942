//! Method and constructor overload resolution (JLS 15.12.2), best-effort.
//!
//! Candidates carry the substitution from their declaring class to the receiver so parameter and
//! return types can be viewed at the call site. Accessibility and static-context rules are left to
//! callers: they need use-site information this crate does not have.

use std::collections::{HashSet, VecDeque};

use crate::{
    boxed_type, erasure, instantiate_as_supertype, is_assignable, is_subtype, ClassId, ClassType,
    ConstructorDef, MethodDef, Substitutor, Type, TypeEnv, TypeVarId, Visibility, WildcardBound,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodCandidate {
    pub owner: ClassId,
    pub index: usize,
    pub is_constructor: bool,
    /// Declaring-class type parameters (and, once instantiated, method type parameters) to
    /// call-site types.
    pub substitutor: Substitutor,
}

impl MethodCandidate {
    pub fn method<'e>(&self, env: &'e dyn TypeEnv) -> Option<&'e MethodDef> {
        if self.is_constructor {
            return None;
        }
        env.class(self.owner)?.methods.get(self.index)
    }

    pub fn constructor<'e>(&self, env: &'e dyn TypeEnv) -> Option<&'e ConstructorDef> {
        if !self.is_constructor {
            return None;
        }
        env.class(self.owner)?.constructors.get(self.index)
    }

    /// Declared name; constructors use their class's simple name.
    pub fn name(&self, env: &dyn TypeEnv) -> String {
        match self.method(env) {
            Some(m) => m.name.clone(),
            None => env
                .class(self.owner)
                .map(|c| c.simple_name().to_string())
                .unwrap_or_default(),
        }
    }

    pub fn declared_params<'e>(&self, env: &'e dyn TypeEnv) -> &'e [Type] {
        if let Some(m) = self.method(env) {
            return &m.params;
        }
        self.constructor(env).map_or(&[], |c| c.params.as_slice())
    }

    /// Parameter types at the call site.
    pub fn params(&self, env: &dyn TypeEnv) -> Vec<Type> {
        self.declared_params(env)
            .iter()
            .map(|p| self.substitutor.apply(env, p))
            .collect()
    }

    pub fn type_params(&self, env: &dyn TypeEnv) -> Vec<TypeVarId> {
        self.method(env).map(|m| m.type_params.clone()).unwrap_or_default()
    }

    pub fn is_varargs(&self, env: &dyn TypeEnv) -> bool {
        match self.method(env) {
            Some(m) => m.is_varargs,
            None => self.constructor(env).is_some_and(|c| c.is_varargs),
        }
    }

    pub fn is_static(&self, env: &dyn TypeEnv) -> bool {
        self.method(env).is_some_and(|m| m.is_static)
    }

    pub fn is_abstract(&self, env: &dyn TypeEnv) -> bool {
        self.method(env).is_some_and(|m| m.is_abstract)
    }

    pub fn visibility(&self, env: &dyn TypeEnv) -> Visibility {
        match self.method(env) {
            Some(m) => m.visibility,
            None => self
                .constructor(env)
                .map_or(Visibility::Public, |c| c.visibility),
        }
    }

    pub fn throws(&self, env: &dyn TypeEnv) -> Vec<Type> {
        let declared = match self.method(env) {
            Some(m) => m.throws.clone(),
            None => self.constructor(env).map(|c| c.throws.clone()).unwrap_or_default(),
        };
        declared
            .iter()
            .map(|t| self.substitutor.apply(env, t))
            .collect()
    }

    pub fn return_type(&self, env: &dyn TypeEnv) -> Type {
        match self.method(env) {
            Some(m) => self.substitutor.apply(env, &m.return_type),
            None => Type::Void,
        }
    }
}

/// Applicability phases, tried in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Phase {
    /// Subtyping only.
    Strict,
    /// Boxing and unboxing allowed.
    Loose,
    /// Variable arity expansion.
    Varargs,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OverloadResolution {
    Resolved(MethodCandidate),
    Ambiguous(MethodCandidate, MethodCandidate),
    /// Candidates exist but none accepts the arguments.
    Inapplicable(Vec<MethodCandidate>),
    NotFound,
}

/// Methods named `name` visible on `receiver`, walking supertypes breadth-first. A method that is
/// overridden (same erased parameters) by an earlier candidate is skipped.
pub fn collect_methods(env: &dyn TypeEnv, receiver: &Type, name: &str) -> Vec<MethodCandidate> {
    let mut out: Vec<MethodCandidate> = Vec::new();
    let mut erased_seen: Vec<Vec<Type>> = Vec::new();
    for (class, substitutor) in hierarchy(env, receiver) {
        let Some(def) = env.class(class) else {
            continue;
        };
        for (index, method) in def.methods.iter().enumerate() {
            if method.name != name {
                continue;
            }
            let erased: Vec<Type> = method.params.iter().map(|p| erasure(env, p)).collect();
            if erased_seen.contains(&erased) {
                continue;
            }
            erased_seen.push(erased);
            out.push(MethodCandidate {
                owner: class,
                index,
                is_constructor: false,
                substitutor: substitutor.clone(),
            });
        }
    }
    out
}

/// Constructors of the class denoted by `class_type`.
pub fn collect_constructors(env: &dyn TypeEnv, class_type: &Type) -> Vec<MethodCandidate> {
    let Type::Class(ct) = class_type else {
        return Vec::new();
    };
    let Some(def) = env.class(ct.def) else {
        return Vec::new();
    };
    let substitutor = Substitutor::for_class_type(env, ct);
    (0..def.constructors.len())
        .map(|index| MethodCandidate {
            owner: ct.def,
            index,
            is_constructor: true,
            substitutor: substitutor.clone(),
        })
        .collect()
}

/// `receiver`'s class and all its superclasses/superinterfaces, each with the substitution viewing
/// it from `receiver`.
fn hierarchy(env: &dyn TypeEnv, receiver: &Type) -> Vec<(ClassId, Substitutor)> {
    let start = match receiver {
        Type::Class(ct) => ct.def,
        Type::TypeVar(_) | Type::Intersection(_) => {
            let erased = erasure(env, receiver);
            match erased {
                Type::Class(ct) => ct.def,
                _ => return Vec::new(),
            }
        }
        Type::Array(_) => env.well_known().object,
        _ => return Vec::new(),
    };

    let mut out = Vec::new();
    let mut seen = HashSet::new();
    let mut queue = VecDeque::from([start]);
    while let Some(class) = queue.pop_front() {
        if !seen.insert(class) {
            continue;
        }
        let substitutor = match instantiate_as_supertype(env, receiver, class) {
            Some(Type::Class(ct)) => Substitutor::for_class_type(env, &ct),
            _ => Substitutor::for_class_type(env, &ClassType { def: class, args: vec![] }),
        };
        out.push((class, substitutor));
        for sup in crate::direct_supertypes(env, class) {
            if let Type::Class(ClassType { def, .. }) = crate::canonicalize_named(env, &sup) {
                queue.push_back(def);
            }
        }
    }
    out
}

/// Bind the candidate's method type parameters from the argument types. Parameters that cannot be
/// inferred are bound to their erasure.
pub fn instantiate(env: &dyn TypeEnv, candidate: &MethodCandidate, args: &[Type]) -> MethodCandidate {
    let type_params = candidate.type_params(env);
    if type_params.is_empty() {
        return candidate.clone();
    }
    let params = candidate.params(env);
    let varargs = candidate.is_varargs(env);
    let mut inferred: Vec<(TypeVarId, Type)> = Vec::new();
    for (idx, arg) in args.iter().enumerate() {
        let param = if varargs && idx + 1 >= params.len() {
            match params.last() {
                Some(Type::Array(component))
                    if idx + 1 > params.len() || !matches!(arg, Type::Array(_)) =>
                {
                    (**component).clone()
                }
                Some(last) => last.clone(),
                None => continue,
            }
        } else {
            match params.get(idx) {
                Some(p) => p.clone(),
                None => continue,
            }
        };
        infer_from(env, &param, arg, &type_params, &mut inferred);
    }

    let mut substitutor = candidate.substitutor.clone();
    for tp in type_params {
        let ty = inferred
            .iter()
            .find(|(var, _)| *var == tp)
            .map(|(_, ty)| ty.clone())
            .unwrap_or_else(|| erasure(env, &Type::TypeVar(tp)));
        substitutor.put(tp, ty);
    }
    MethodCandidate {
        substitutor,
        ..candidate.clone()
    }
}

fn infer_from(
    env: &dyn TypeEnv,
    param: &Type,
    arg: &Type,
    vars: &[TypeVarId],
    out: &mut Vec<(TypeVarId, Type)>,
) {
    match param {
        Type::TypeVar(var) if vars.contains(var) => {
            if out.iter().any(|(v, _)| v == var) || matches!(arg, Type::Null) || arg.is_errorish()
            {
                return;
            }
            let arg = match arg {
                Type::Primitive(p) => boxed_type(env, *p).unwrap_or(Type::Unknown),
                other => other.clone(),
            };
            out.push((*var, arg));
        }
        Type::Array(param_component) => {
            if let Type::Array(arg_component) = arg {
                infer_from(env, param_component, arg_component, vars, out);
            }
        }
        Type::Class(ClassType { def, args }) if !args.is_empty() => {
            let Some(Type::Class(view)) = instantiate_as_supertype(env, arg, *def) else {
                return;
            };
            for (formal, actual) in args.iter().zip(&view.args) {
                let formal = match formal {
                    Type::Wildcard(WildcardBound::Extends(b))
                    | Type::Wildcard(WildcardBound::Super(b)) => b.as_ref(),
                    other => other,
                };
                let actual = match actual {
                    Type::Wildcard(WildcardBound::Extends(b))
                    | Type::Wildcard(WildcardBound::Super(b)) => b.as_ref(),
                    other => other,
                };
                infer_from(env, formal, actual, vars, out);
            }
        }
        _ => {}
    }
}

/// Whether `candidate` (already instantiated) accepts `args` in `phase`.
pub fn is_applicable(env: &dyn TypeEnv, candidate: &MethodCandidate, args: &[Type], phase: Phase) -> bool {
    let params = candidate.params(env);
    let compatible = |param: &Type, arg: &Type| match phase {
        Phase::Strict => {
            if arg.is_primitive() != param.is_primitive() && !arg.is_errorish() && !matches!(arg, Type::Null) {
                return false;
            }
            is_assignable(env, param, arg)
        }
        Phase::Loose | Phase::Varargs => is_assignable(env, param, arg),
    };

    if phase != Phase::Varargs {
        return params.len() == args.len() && params.iter().zip(args).all(|(p, a)| compatible(p, a));
    }

    if !candidate.is_varargs(env) || params.is_empty() || args.len() + 1 < params.len() {
        return false;
    }
    let fixed = params.len() - 1;
    let Some(Type::Array(component)) = params.last() else {
        return false;
    };
    params[..fixed].iter().zip(args).all(|(p, a)| compatible(p, a))
        && args[fixed..].iter().all(|a| compatible(component, a))
}

/// Pick the applicable candidate for `args`, trying each phase in turn.
pub fn resolve_overload(env: &dyn TypeEnv, candidates: &[MethodCandidate], args: &[Type]) -> OverloadResolution {
    if candidates.is_empty() {
        return OverloadResolution::NotFound;
    }
    let instantiated: Vec<MethodCandidate> =
        candidates.iter().map(|c| instantiate(env, c, args)).collect();
    for phase in [Phase::Strict, Phase::Loose, Phase::Varargs] {
        let applicable: Vec<&MethodCandidate> = instantiated
            .iter()
            .filter(|c| is_applicable(env, c, args, phase))
            .collect();
        if applicable.is_empty() {
            continue;
        }
        return match most_specific(env, &applicable, args.len(), phase) {
            Ok(found) => OverloadResolution::Resolved(found.clone()),
            Err((a, b)) => OverloadResolution::Ambiguous(a.clone(), b.clone()),
        };
    }
    OverloadResolution::Inapplicable(instantiated)
}

fn most_specific<'c>(
    env: &dyn TypeEnv,
    applicable: &[&'c MethodCandidate],
    arity: usize,
    phase: Phase,
) -> Result<&'c MethodCandidate, (&'c MethodCandidate, &'c MethodCandidate)> {
    let expanded = |c: &MethodCandidate| -> Vec<Type> {
        let mut params = c.params(env);
        if phase == Phase::Varargs {
            if let Some(Type::Array(component)) = params.pop() {
                while params.len() < arity.max(1) {
                    params.push((*component).clone());
                }
            }
        }
        params
    };
    let more_specific = |a: &MethodCandidate, b: &MethodCandidate| -> bool {
        let pa = expanded(a);
        let pb = expanded(b);
        pa.len() == pb.len()
            && pa.iter().zip(&pb).all(|(x, y)| {
                if x.is_primitive() && y.is_primitive() {
                    is_assignable(env, y, x)
                } else {
                    is_subtype(env, x, y)
                }
            })
    };

    let maximal: Vec<&'c MethodCandidate> = applicable
        .iter()
        .copied()
        .filter(|a| {
            applicable
                .iter()
                .all(|b| std::ptr::eq(*a, *b) || more_specific(a, b))
        })
        .collect();
    if let Some(first) = maximal.first() {
        return Ok(*first);
    }

    // Same erased signatures (e.g. one abstract method inherited twice) are not ambiguous.
    let erased = |c: &MethodCandidate| -> Vec<Type> {
        c.params(env).iter().map(|p| erasure(env, p)).collect()
    };
    let first = applicable[0];
    let first_erased = erased(first);
    match applicable.iter().find(|c| erased(c) != first_erased) {
        Some(other) => Err((first, *other)),
        None => Ok(first),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClassDef, ClassKind, PrimitiveType, TypeStore};
    use pretty_assertions::assert_eq;

    fn class_with_methods(store: &mut TypeStore, methods: Vec<MethodDef>) -> ClassId {
        store.add_class(ClassDef {
            name: "Calls".to_string(),
            kind: ClassKind::Class,
            methods,
            ..ClassDef::default()
        })
    }

    fn method(name: &str, params: Vec<Type>) -> MethodDef {
        MethodDef {
            name: name.to_string(),
            params,
            return_type: Type::Void,
            visibility: Visibility::Public,
            ..MethodDef::default()
        }
    }

    #[test]
    fn strict_phase_wins_over_boxing() {
        let mut store = TypeStore::with_minimal_jdk();
        let integer = boxed_type(&store, PrimitiveType::Int).unwrap();
        let long = Type::Primitive(PrimitiveType::Long);
        let calls = class_with_methods(
            &mut store,
            vec![method("f", vec![integer]), method("f", vec![long])],
        );
        let receiver = Type::class(calls, vec![]);
        let candidates = collect_methods(&store, &receiver, "f");
        assert_eq!(candidates.len(), 2);

        let resolved = resolve_overload(&store, &candidates, &[Type::Primitive(PrimitiveType::Int)]);
        match resolved {
            OverloadResolution::Resolved(c) => assert_eq!(c.index, 1),
            other => panic!("expected resolved, got {other:?}"),
        }
    }

    #[test]
    fn ambiguous_when_neither_is_more_specific() {
        let mut store = TypeStore::with_minimal_jdk();
        let string = Type::class(store.well_known().string, vec![]);
        let integer = boxed_type(&store, PrimitiveType::Int).unwrap();
        let calls = class_with_methods(
            &mut store,
            vec![method("f", vec![string]), method("f", vec![integer])],
        );
        let candidates = collect_methods(&store, &Type::class(calls, vec![]), "f");

        assert!(matches!(
            resolve_overload(&store, &candidates, &[Type::Null]),
            OverloadResolution::Ambiguous(_, _)
        ));
        assert!(matches!(
            resolve_overload(&store, &candidates, &[Type::Primitive(PrimitiveType::Boolean)]),
            OverloadResolution::Inapplicable(_)
        ));
    }

    #[test]
    fn inherited_generic_method_is_viewed_through_receiver() {
        let store = TypeStore::with_minimal_jdk();
        let array_list = store.class_id("java.util.ArrayList").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let receiver = Type::class(array_list, vec![string.clone()]);

        let candidates = collect_methods(&store, &receiver, "get");
        let OverloadResolution::Resolved(found) =
            resolve_overload(&store, &candidates, &[Type::Primitive(PrimitiveType::Int)])
        else {
            panic!("get(int) should resolve");
        };
        assert_eq!(found.return_type(&store), string);
    }

    #[test]
    fn varargs_accept_zero_arguments() {
        let mut store = TypeStore::with_minimal_jdk();
        let string = Type::class(store.well_known().string, vec![]);
        let calls = class_with_methods(
            &mut store,
            vec![MethodDef {
                is_varargs: true,
                ..method("f", vec![Type::array(string)])
            }],
        );
        let candidates = collect_methods(&store, &Type::class(calls, vec![]), "f");
        assert!(matches!(
            resolve_overload(&store, &candidates, &[]),
            OverloadResolution::Resolved(_)
        ));
    }
}
