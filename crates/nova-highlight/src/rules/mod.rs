//! Rule families.
//!
//! Every check is a function from a node (and the [`FileContext`]) to zero or more diagnostics.
//! The traversal engine decides which checks run at which node and in what order; the checks
//! themselves never touch the holder.

pub(crate) mod annotations;
pub(crate) mod classes;
pub(crate) mod exceptions;
pub(crate) mod expressions;
pub(crate) mod generics;
pub(crate) mod imports;
pub(crate) mod methods;
pub(crate) mod modifiers;
pub(crate) mod statements;
pub(crate) mod variables;

use nova_core::{JavaLanguageLevel, TextRange};
use nova_hir::{ExprId, ExprKind, JavaFile, TypeRefId, TypeRefKind, TypeRefTarget};
use nova_types::{
    format_type, is_assignable, is_subtype, presentable_type, ClassId, ClassKind, Type, TypeEnv,
    WildcardBound,
};

use crate::codes;
use crate::constant::{self, Value};
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, QuickFix, Severity};
use crate::format::incompatible_types_tooltip;

/// `{what} are not supported at this language level`, with a fix raising the level.
pub(crate) fn level_gate(
    ctx: &FileContext<'_>,
    required: JavaLanguageLevel,
    what: &str,
    range: TextRange,
) -> Option<Diagnostic> {
    if ctx.level.is_at_least(required) {
        return None;
    }
    Some(
        Diagnostic::builder(Severity::Error, codes::LANGUAGE_LEVEL, range)
            .message(format!("{what} are not supported at this language level"))
            .fix(QuickFix::SetLanguageLevel { level: required })
            .build(),
    )
}

/// The class a type reference resolved to.
pub(crate) fn type_ref_class(file: &JavaFile, id: TypeRefId) -> Option<ClassId> {
    match &file.type_refs[id].kind {
        TypeRefKind::Class {
            resolved: Some(TypeRefTarget::Class(def)),
            ..
        } => Some(*def),
        _ => None,
    }
}

/// A class name in a type reference that resolves to nothing.
pub(crate) fn unresolved_type(ctx: &FileContext<'_>, id: TypeRefId) -> Option<Diagnostic> {
    match &ctx.file.type_refs[id].kind {
        TypeRefKind::Class {
            name,
            name_range,
            resolved: None,
            ..
        } => Some(Diagnostic::error(
            codes::CANNOT_RESOLVE_SYMBOL,
            format!("Cannot resolve symbol '{name}'"),
            *name_range,
        )),
        _ => None,
    }
}

pub(crate) fn kind_word(kind: ClassKind) -> &'static str {
    match kind {
        ClassKind::Class => "Class",
        ClassKind::Interface => "Interface",
        ClassKind::Enum => "Enum",
        ClassKind::Annotation => "@interface",
    }
}

pub(crate) fn incompatible_types(env: &dyn TypeEnv, required: &Type, found: &Type, range: TextRange) -> Diagnostic {
    Diagnostic::builder(Severity::Error, codes::INCOMPATIBLE_TYPES, range)
        .message(format!(
            "Incompatible types. Found: '{}', required: '{}'",
            format_type(env, found),
            format_type(env, required)
        ))
        .tooltip(incompatible_types_tooltip(env, required, found))
        .fix(QuickFix::AddCast {
            to: presentable_type(env, required),
        })
        .build()
}

/// Assignment from `source` to `target` only type-checks through unchecked conversion: a raw
/// type where a parameterization is required.
pub(crate) fn is_unchecked_conversion(env: &dyn TypeEnv, target: &Type, source: &Type) -> bool {
    if !target.is_reference() || !source.is_reference() || matches!(source, Type::Null) {
        return false;
    }
    match (target, source) {
        (Type::Array(t), Type::Array(s)) => is_unchecked_conversion(env, t, s),
        (Type::Class(ct), _) => {
            let all_unbounded = ct
                .args
                .iter()
                .all(|a| matches!(a, Type::Wildcard(WildcardBound::Unbounded)));
            !all_unbounded && is_assignable(env, target, source) && !is_subtype(env, source, target)
        }
        _ => false,
    }
}

/// The shared assignability check: `expr` assigned to a variable of type `target`.
///
/// Integral constants narrow to `byte`, `short` and `char` when they fit; array initializers are
/// checked element by element where they appear.
pub(crate) fn check_assignable(ctx: &FileContext<'_>, target: &Type, expr: ExprId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let inner = file.skip_parens(expr);
    if matches!(file.exprs[inner].kind, ExprKind::ArrayInit(_)) {
        return None;
    }
    let source = ctx.expr_type(expr);
    if target.is_errorish() || source.is_errorish() || target.is_void() {
        return None;
    }
    if on_reported_cycle(ctx, target) || on_reported_cycle(ctx, source) {
        return None;
    }
    let range = file.exprs[expr].range;
    if !is_assignable(env, target, source) {
        if narrows_constant(ctx, target, source, expr) {
            return None;
        }
        return Some(incompatible_types(env, target, source, range));
    }
    if ctx.config.report_unchecked && is_unchecked_conversion(env, target, source) {
        return Some(Diagnostic::unchecked(
            codes::UNCHECKED_ASSIGNMENT,
            format!(
                "Unchecked assignment: '{}' to '{}'",
                format_type(env, source),
                format_type(env, target)
            ),
            range,
        ));
    }
    None
}

/// Subtyping through a reported inheritance cycle is undefined.
fn on_reported_cycle(ctx: &FileContext<'_>, ty: &Type) -> bool {
    ty.deep_component()
        .as_class()
        .is_some_and(|ct| ctx.reported_cycles.contains(&ct.def))
}

/// JLS 5.2: a constant of type `int` (or narrower) may be assigned to `byte`, `short` or `char`
/// (or their boxes) when its value fits.
fn narrows_constant(ctx: &FileContext<'_>, target: &Type, source: &Type, expr: ExprId) -> bool {
    use nova_types::PrimitiveType::*;

    let Some(source) = source.as_primitive() else {
        return false;
    };
    if !matches!(source, Byte | Short | Char | Int) {
        return false;
    }
    let target = match target {
        Type::Primitive(p) => *p,
        other => match nova_types::unboxed_type(ctx.env, other) {
            Some(p @ (Byte | Short | Char)) => p,
            _ => return false,
        },
    };
    if !matches!(target, Byte | Short | Char) {
        return false;
    }
    match constant::evaluate(ctx.file, expr) {
        Some(Value::Integral(value)) => constant::fits(value, target),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::TypeStore;

    #[test]
    fn raw_to_parameterized_is_unchecked() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let string = Type::class(store.well_known().string, vec![]);
        let list_string = Type::class(list, vec![string]);
        let raw = Type::class(list, vec![]);
        let unbounded = Type::class(list, vec![Type::Wildcard(WildcardBound::Unbounded)]);

        assert!(is_unchecked_conversion(&store, &list_string, &raw));
        assert!(!is_unchecked_conversion(&store, &list_string, &list_string));
        assert!(!is_unchecked_conversion(&store, &raw, &list_string));
        assert!(!is_unchecked_conversion(&store, &unbounded, &raw));
        assert!(is_unchecked_conversion(
            &store,
            &Type::array(list_string),
            &Type::array(raw)
        ));
    }
}
