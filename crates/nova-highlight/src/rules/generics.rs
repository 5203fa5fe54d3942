//! Type arguments, type parameters, wildcards and the language-level gates for generics,
//! variable arity and foreach.

use nova_core::{JavaLanguageLevel, TextRange};
use nova_hir::{
    ClassDeclId, ExprId, ExprKind, NodeId, StmtId, StmtKind, TypeParamId, TypeRefId, TypeRefKind,
    TypeRefTarget,
};
use nova_types::{format_type, is_assignable, ClassKind, Substitutor, Type, TypeEnv};

use super::{kind_word, level_gate};
use crate::codes;
use crate::context::FileContext;
use crate::diagnostic::Diagnostic;

/// `<...>` in a type reference below 1.5.
pub(crate) fn type_arguments_level(ctx: &FileContext<'_>, id: TypeRefId) -> Option<Diagnostic> {
    match &ctx.file.type_refs[id].kind {
        TypeRefKind::Class {
            arg_list_range: Some(range),
            ..
        } => level_gate(ctx, JavaLanguageLevel::Jdk1_5, "Generics", *range),
        _ => None,
    }
}

pub(crate) fn type_parameter_level(ctx: &FileContext<'_>, id: TypeParamId) -> Option<Diagnostic> {
    level_gate(
        ctx,
        JavaLanguageLevel::Jdk1_5,
        "Generics",
        ctx.file.type_params[id].range,
    )
}

pub(crate) fn foreach_level(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let file = ctx.file;
    let StmtKind::Foreach { param, .. } = file.stmts[id].kind else {
        return None;
    };
    level_gate(ctx, JavaLanguageLevel::Jdk1_5, "Foreach loops", file.vars[param].range)
}

/// Argument count, primitive arguments and bounds for a parameterized class reference.
pub(crate) fn type_arguments(ctx: &FileContext<'_>, id: TypeRefId) -> Vec<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let type_ref = &file.type_refs[id];
    let TypeRefKind::Class {
        args,
        arg_list_range: Some(arg_list_range),
        resolved: Some(TypeRefTarget::Class(def)),
        ..
    } = &type_ref.kind
    else {
        return Vec::new();
    };
    if args.is_empty() {
        return Vec::new();
    }
    let Some(class) = env.class(*def) else {
        return Vec::new();
    };

    if class.type_params.is_empty() {
        return vec![Diagnostic::error(
            codes::NO_TYPE_PARAMETERS,
            format!(
                "{} '{}' does not have type parameters",
                kind_word(class.kind),
                class.qualified_name()
            ),
            *arg_list_range,
        )];
    }
    if class.type_params.len() != args.len() {
        return vec![Diagnostic::error(
            codes::WRONG_TYPE_ARGUMENT_COUNT,
            format!(
                "Wrong number of type arguments: {}; required: {}",
                args.len(),
                class.type_params.len()
            ),
            *arg_list_range,
        )];
    }

    let primitives: Vec<Diagnostic> = args
        .iter()
        .filter(|arg| matches!(file.type_refs[**arg].kind, TypeRefKind::Primitive(_)))
        .map(|arg| {
            Diagnostic::error(
                codes::PRIMITIVE_TYPE_ARGUMENT,
                "Type argument cannot be of primitive type",
                file.type_refs[*arg].range,
            )
        })
        .collect();
    if !primitives.is_empty() {
        return primitives;
    }

    let Some(ct) = type_ref.ty.as_class() else {
        return Vec::new();
    };
    let subst = Substitutor::for_class_type(env, ct);
    for (param, arg) in class.type_params.iter().zip(args) {
        if let Some(diagnostic) = bound_violation(env, &subst, *param, &file.type_refs[*arg].ty, file.type_refs[*arg].range) {
            return vec![diagnostic];
        }
    }
    Vec::new()
}

fn is_interface_type(env: &dyn TypeEnv, ty: &Type) -> bool {
    ty.as_class()
        .and_then(|ct| env.class(ct.def))
        .is_some_and(|c| c.is_interface())
}

/// The first bound of `param` that `arg` does not satisfy.
fn bound_violation(
    env: &dyn TypeEnv,
    subst: &Substitutor,
    param: nova_types::TypeVarId,
    arg: &Type,
    range: TextRange,
) -> Option<Diagnostic> {
    if arg.is_errorish() || arg.is_primitive() || matches!(arg, Type::Wildcard(_)) {
        return None;
    }
    let bounds = &env.type_param(param)?.upper_bounds;
    for bound in bounds {
        let bound = subst.apply(env, bound);
        if bound.is_errorish() || is_assignable(env, &bound, arg) {
            continue;
        }
        let verb = if is_interface_type(env, &bound) && !is_interface_type(env, arg) {
            "implement"
        } else {
            "extend"
        };
        return Some(Diagnostic::error(
            codes::TYPE_ARGUMENT_OUT_OF_BOUNDS,
            format!(
                "Type parameter '{}' is not within its bound; should {verb} '{}'",
                format_type(env, arg),
                format_type(env, &bound)
            ),
            range,
        ));
    }
    None
}

/// Wildcards are type arguments only, never in a supertype list or an instantiated type.
pub(crate) fn wildcard_placement(ctx: &FileContext<'_>, id: TypeRefId) -> Option<Diagnostic> {
    let file = ctx.file;
    let type_ref = &file.type_refs[id];
    if !matches!(type_ref.kind, TypeRefKind::Wildcard(_)) {
        return None;
    }
    let range = type_ref.range;
    let parent = match ctx.parent() {
        Some(NodeId::TypeRef(parent)) if matches!(file.type_refs[parent].kind, TypeRefKind::Class { .. }) => parent,
        _ => {
            return Some(Diagnostic::error(
                codes::WILDCARD_NOT_ALLOWED,
                "Wildcards may be used only as reference parameters",
                range,
            ))
        }
    };
    match ctx.grandparent() {
        Some(NodeId::Class(class)) => {
            let decl = &file.classes[class];
            decl.extends
                .iter()
                .chain(&decl.implements)
                .any(|t| *t == parent)
                .then(|| Diagnostic::error(codes::NO_WILDCARD_EXPECTED, "No wildcard expected", range))
        }
        Some(NodeId::Expr(expr)) => match file.exprs[expr].kind {
            ExprKind::New { class, .. } if class == parent => Some(Diagnostic::error(
                codes::WILDCARD_INSTANTIATION,
                format!(
                    "Wildcard type '{}' cannot be instantiated directly",
                    ctx.text(range)
                ),
                range,
            )),
            _ => None,
        },
        _ => None,
    }
}

fn is_reifiable(ctx: &FileContext<'_>, id: TypeRefId) -> bool {
    let file = ctx.file;
    match &file.type_refs[id].kind {
        TypeRefKind::Class {
            resolved: Some(TypeRefTarget::TypeParam(_)),
            ..
        } => false,
        TypeRefKind::Class { args, .. } => args
            .iter()
            .all(|a| matches!(file.type_refs[*a].kind, TypeRefKind::Wildcard(None))),
        TypeRefKind::Array(component) => is_reifiable(ctx, *component),
        _ => true,
    }
}

/// `new T[n]` and `new List<String>[n]`.
pub(crate) fn generic_array_creation(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    let ExprKind::NewArray { element, .. } = file.exprs[id].kind else {
        return None;
    };
    (!is_reifiable(ctx, element)).then(|| {
        Diagnostic::error(
            codes::GENERIC_ARRAY_CREATION,
            "Generic array creation",
            file.exprs[id].range,
        )
    })
}

/// `x instanceof List<String>`.
pub(crate) fn generic_instanceof(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    let ExprKind::InstanceOf { ty, .. } = file.exprs[id].kind else {
        return None;
    };
    (!is_reifiable(ctx, ty)).then(|| {
        Diagnostic::error(
            codes::ILLEGAL_GENERIC_INSTANCEOF,
            "Illegal generic type for instanceof",
            file.type_refs[ty].range,
        )
    })
}

/// `new T()` for a type variable `T`.
pub(crate) fn type_parameter_instantiation(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    let ExprKind::New { class, .. } = file.exprs[id].kind else {
        return None;
    };
    match &file.type_refs[class].kind {
        TypeRefKind::Class {
            name,
            resolved: Some(TypeRefTarget::TypeParam(_)),
            ..
        } => Some(Diagnostic::error(
            codes::TYPE_PARAMETER_INSTANTIATION,
            format!("Type parameter '{name}' cannot be instantiated directly"),
            file.type_refs[class].range,
        )),
        _ => None,
    }
}

pub(crate) fn duplicate_type_parameter(ctx: &FileContext<'_>, id: TypeParamId) -> Option<Diagnostic> {
    let file = ctx.file;
    let siblings: &[TypeParamId] = match ctx.parent()? {
        NodeId::Class(class) => &file.classes[class].type_params,
        NodeId::Method(method) => &file.methods[method].type_params,
        _ => return None,
    };
    let param = &file.type_params[id];
    siblings
        .iter()
        .take_while(|other| **other != id)
        .any(|other| file.type_params[*other].name == param.name)
        .then(|| {
            Diagnostic::error(
                codes::DUPLICATE_TYPE_PARAMETER,
                format!("Duplicate type parameter: '{}'", param.name),
                param.name_range,
            )
        })
}

/// Enums and annotation types declare no type parameters.
pub(crate) fn class_type_parameters(ctx: &FileContext<'_>, id: ClassDeclId) -> Option<Diagnostic> {
    let file = ctx.file;
    let decl = &file.classes[id];
    let first = file.type_params[*decl.type_params.first()?].range;
    let last = file.type_params[*decl.type_params.last()?].range;
    let message = match decl.kind {
        ClassKind::Enum => "Enum may not have type parameters",
        ClassKind::Annotation => "@interface may not have type parameters",
        _ => return None,
    };
    Some(Diagnostic::error(
        codes::TYPE_PARAMETERS_NOT_ALLOWED,
        message,
        first.cover(last),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::{ClassDef, TypeStore};
    use pretty_assertions::assert_eq;

    #[test]
    fn bound_messages_pick_extend_or_implement() {
        let mut store = TypeStore::with_minimal_jdk();
        let number = store.class_id("java.lang.Number").unwrap();
        let comparable = store.class_id("java.lang.Comparable").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let t = store.add_type_param("T", vec![Type::class(number, vec![])]);
        let u = store.add_type_param("U", vec![Type::class(comparable, vec![string.clone()])]);
        let box_class = store.add_class(ClassDef {
            name: "Box".to_string(),
            ..ClassDef::default()
        });
        let range = TextRange::default();
        let subst = Substitutor::empty();

        let found = bound_violation(&store, &subst, t, &string, range).unwrap();
        assert_eq!(
            found.message,
            "Type parameter 'java.lang.String' is not within its bound; should extend 'java.lang.Number'"
        );

        let found = bound_violation(&store, &subst, u, &Type::class(box_class, vec![]), range).unwrap();
        assert_eq!(
            found.message,
            "Type parameter 'Box' is not within its bound; should implement 'java.lang.Comparable<java.lang.String>'"
        );
        assert_eq!(bound_violation(&store, &subst, u, &string, range), None);
    }
}
