//! Annotation usages: resolution, attribute names and values, missing attributes, `@Target`
//! applicability, duplicates and repeated targets.

use nova_core::{JavaLanguageLevel, TextRange};
use nova_hir::{AnnotationId, AnnotationValue, ExprKind, NodeId, Symbol, VarKind};
use nova_types::{format_type, ClassDef, ClassId, ClassKind, MethodDef, Type};

use super::{check_assignable, incompatible_types, level_gate};
use crate::codes;
use crate::constant;
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, QuickFix, Severity};
use crate::error::{HighlightError, Result};

const TARGET: &str = "java.lang.annotation.Target";
const ELEMENT_TYPE: &str = "java.lang.annotation.ElementType";

/// Attribute methods of an annotation type.
fn attributes(class: &ClassDef) -> impl Iterator<Item = &MethodDef> {
    class.methods.iter().filter(|m| !m.is_static && m.params.is_empty())
}

/// The annotation resolves to an annotation type, and annotations are available at all. The
/// remaining checks only run when this one passes.
pub(crate) fn resolution(ctx: &FileContext<'_>, id: AnnotationId) -> Option<Diagnostic> {
    let annotation = &ctx.file.annotations[id];
    if let Some(gate) = level_gate(ctx, JavaLanguageLevel::Jdk1_5, "Annotations", annotation.range) {
        return Some(gate);
    }
    let Some(def) = annotation.resolved else {
        return Some(Diagnostic::error(
            codes::CANNOT_RESOLVE_SYMBOL,
            format!("Cannot resolve symbol '{}'", annotation.name),
            annotation.name_range,
        ));
    };
    let is_annotation_type = ctx.env.class(def).is_some_and(|c| c.kind == ClassKind::Annotation);
    (!is_annotation_type).then(|| {
        Diagnostic::error(
            codes::ANNOTATION_TYPE_EXPECTED,
            "Annotation type expected",
            annotation.name_range,
        )
    })
}

fn annotation_type<'e>(ctx: &FileContext<'e>, id: AnnotationId) -> Option<&'e ClassDef> {
    let def = ctx.file.annotations[id].resolved?;
    ctx.env.class(def).filter(|c| c.kind == ClassKind::Annotation)
}

/// Attribute names exist on the annotation type and their values match the declared types.
pub(crate) fn attribute_values(ctx: &FileContext<'_>, id: AnnotationId) -> Result<Vec<Diagnostic>> {
    let Some(class) = annotation_type(ctx, id) else {
        return Ok(Vec::new());
    };
    let mut out = Vec::new();
    for arg in &ctx.file.annotations[id].args {
        let name = arg.name.as_deref().unwrap_or("value");
        let Some(method) = attributes(class).find(|m| m.name == name) else {
            out.push(Diagnostic::error(
                codes::CANNOT_RESOLVE_METHOD,
                format!("Cannot resolve method '{name}'"),
                arg.name_range.unwrap_or(arg.range),
            ));
            continue;
        };
        out.extend(member_value(ctx, &arg.value, &method.return_type)?);
    }
    Ok(out)
}

/// Checks one member value against its expected type, unwrapping arrays.
fn member_value(ctx: &FileContext<'_>, value: &AnnotationValue, expected: &Type) -> Result<Option<Diagnostic>> {
    let env = ctx.env;
    let file = ctx.file;
    if expected.is_errorish() {
        return Ok(None);
    }
    if let Type::Array(component) = expected {
        if !matches!(value, AnnotationValue::Array { .. }) {
            return member_value(ctx, value, component);
        }
    }
    match value {
        AnnotationValue::Array { elements, range } => {
            let Type::Array(component) = expected else {
                return Ok(Some(Diagnostic::error(
                    codes::INCOMPATIBLE_TYPES,
                    format!("Illegal initializer for '{}'", format_type(env, expected)),
                    *range,
                )));
            };
            for element in elements {
                if let Some(diagnostic) = member_value(ctx, element, component)? {
                    return Ok(Some(diagnostic));
                }
            }
            Ok(None)
        }
        AnnotationValue::Annotation(nested) => {
            let annotation = &file.annotations[*nested];
            let Some(def) = annotation.resolved else {
                return Ok(None);
            };
            let found = Type::class(def, vec![]);
            let matches = expected.as_class().is_some_and(|ct| ct.def == def);
            Ok((!matches).then(|| incompatible_types(env, expected, &found, annotation.range)))
        }
        AnnotationValue::Expr(expr) => {
            let node = &file.exprs[file.skip_parens(*expr)];
            if matches!(node.kind, ExprKind::ArrayInit(_)) {
                return Err(HighlightError::UnexpectedAnnotationValue { range: node.range });
            }
            let is_enum_constant = matches!(
                ctx.symbol(*expr),
                Some(Symbol::Field { owner, index })
                    if env.class(*owner).and_then(|c| c.fields.get(*index)).is_some_and(|f| f.is_enum_constant)
            );
            let is_class_literal = matches!(node.kind, ExprKind::ClassLiteral(_));
            let unknown = ctx.expr_type(*expr).is_errorish();
            if !is_enum_constant && !is_class_literal && !unknown && !constant::is_constant(file, *expr) {
                return Ok(Some(Diagnostic::error(
                    codes::ANNOTATION_VALUE_NOT_CONSTANT,
                    "Attribute value must be constant",
                    node.range,
                )));
            }
            Ok(check_assignable(ctx, expected, *expr))
        }
    }
}

/// Every attribute without a default value is given, reported in one diagnostic.
pub(crate) fn missing_attributes(ctx: &FileContext<'_>, id: AnnotationId) -> Option<Diagnostic> {
    let class = annotation_type(ctx, id)?;
    let annotation = &ctx.file.annotations[id];
    let given: Vec<&str> = annotation
        .args
        .iter()
        .map(|arg| arg.name.as_deref().unwrap_or("value"))
        .collect();
    let missing: Vec<String> = attributes(class)
        .filter(|m| !m.has_default_value && !given.contains(&m.name.as_str()))
        .map(|m| m.name.clone())
        .collect();
    if missing.is_empty() {
        return None;
    }
    let quoted: Vec<String> = missing.iter().map(|name| format!("'{name}'")).collect();
    Some(
        Diagnostic::builder(Severity::Error, codes::MISSING_ANNOTATION_ATTRIBUTE, annotation.range)
            .message(format!("missing attribute {}", quoted.join(", ")))
            .fix(QuickFix::AddMissingAttributes { names: missing })
            .build(),
    )
}

/// `ElementType` constant names a `@Target` value lists, with their ranges.
fn target_elements(ctx: &FileContext<'_>, target: AnnotationId, element_type: ClassId) -> Vec<(String, TextRange)> {
    let file = ctx.file;
    let Some(arg) = file.annotations[target]
        .args
        .iter()
        .find(|arg| arg.name.as_deref().unwrap_or("value") == "value")
    else {
        return Vec::new();
    };
    let values: Vec<&AnnotationValue> = match &arg.value {
        AnnotationValue::Array { elements, .. } => elements.iter().collect(),
        single => vec![single],
    };
    values
        .into_iter()
        .filter_map(|value| match value {
            AnnotationValue::Expr(expr) => match ctx.symbol(*expr) {
                Some(Symbol::Field { owner, index }) if *owner == element_type => {
                    let field = ctx.env.class(*owner)?.fields.get(*index)?;
                    Some((field.name.clone(), file.exprs[*expr].range))
                }
                _ => None,
            },
            _ => None,
        })
        .collect()
}

/// Element kinds of the declaration owning the current annotation, with the wording used in
/// messages.
fn annotated_element(ctx: &FileContext<'_>) -> Option<(&'static [&'static str], &'static str)> {
    let file = ctx.file;
    let kinds: (&'static [&'static str], &'static str) = match ctx.parent() {
        None => (&["PACKAGE"], "package"),
        Some(NodeId::Class(id)) => match file.classes[id].kind {
            ClassKind::Annotation => (&["ANNOTATION_TYPE", "TYPE"], "annotation type"),
            _ => (&["TYPE"], "type"),
        },
        Some(NodeId::Method(id)) if file.methods[id].is_constructor() => (&["CONSTRUCTOR"], "constructor"),
        Some(NodeId::Method(_)) => (&["METHOD"], "method"),
        Some(NodeId::Var(id)) => match file.vars[id].kind {
            VarKind::Field { .. } => (&["FIELD"], "field"),
            VarKind::Parameter { .. } | VarKind::CatchParameter => (&["PARAMETER"], "parameter"),
            VarKind::Local | VarKind::ForeachParameter => (&["LOCAL_VARIABLE"], "local variable"),
        },
        Some(NodeId::EnumConstant(_)) => (&["FIELD"], "field"),
        Some(NodeId::TypeParam(_)) => (&["TYPE_PARAMETER"], "type parameter"),
        _ => return None,
    };
    Some(kinds)
}

/// `@Target` of annotation types declared in this file.
pub(crate) fn applicability(ctx: &FileContext<'_>, id: AnnotationId) -> Option<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let annotation = &file.annotations[id];
    let def = annotation.resolved?;
    let element_type = env.lookup_class(ELEMENT_TYPE)?;
    let target_class = env.lookup_class(TARGET)?;
    let decl = file.class_decl(def)?;
    let target = file.classes[decl]
        .modifiers
        .annotations
        .iter()
        .copied()
        .find(|a| file.annotations[*a].resolved == Some(target_class))?;
    let allowed = target_elements(ctx, target, element_type);
    let (kinds, description) = annotated_element(ctx)?;
    let applicable = allowed.iter().any(|(name, _)| kinds.contains(&name.as_str()));
    (!applicable).then(|| {
        Diagnostic::builder(Severity::Error, codes::ANNOTATION_NOT_APPLICABLE, annotation.range)
            .message(format!("'@{}' not applicable to {description}", annotation.name))
            .fix(QuickFix::RemoveAnnotation {
                name: annotation.name.clone(),
            })
            .build()
    })
}

fn sibling_annotations<'f>(ctx: &FileContext<'f>) -> &'f [AnnotationId] {
    let file = ctx.file;
    match ctx.parent() {
        None => file.package.as_ref().map_or(&[][..], |p| p.annotations.as_slice()),
        Some(NodeId::Class(id)) => file.classes[id].modifiers.annotations.as_slice(),
        Some(NodeId::Method(id)) => file.methods[id].modifiers.annotations.as_slice(),
        Some(NodeId::Var(id)) => file.vars[id].modifiers.annotations.as_slice(),
        Some(NodeId::EnumConstant(id)) => file.enum_constants[id].annotations.as_slice(),
        _ => &[],
    }
}

pub(crate) fn duplicate(ctx: &FileContext<'_>, id: AnnotationId) -> Option<Diagnostic> {
    let file = ctx.file;
    let annotation = &file.annotations[id];
    let def = annotation.resolved?;
    let repeated = sibling_annotations(ctx)
        .iter()
        .take_while(|other| **other != id)
        .any(|other| file.annotations[*other].resolved == Some(def));
    repeated.then(|| Diagnostic::error(codes::DUPLICATE_ANNOTATION, "Duplicate annotation", annotation.range))
}

/// The same `ElementType` listed twice in one `@Target`.
pub(crate) fn repeated_target(ctx: &FileContext<'_>, id: AnnotationId) -> Vec<Diagnostic> {
    let env = ctx.env;
    let (Some(target_class), Some(element_type)) = (env.lookup_class(TARGET), env.lookup_class(ELEMENT_TYPE)) else {
        return Vec::new();
    };
    if ctx.file.annotations[id].resolved != Some(target_class) {
        return Vec::new();
    }
    let elements = target_elements(ctx, id, element_type);
    elements
        .iter()
        .enumerate()
        .filter(|(idx, (name, _))| elements[..*idx].iter().any(|(earlier, _)| earlier == name))
        .map(|(_, (_, range))| {
            Diagnostic::error(codes::REPEATED_ANNOTATION_TARGET, "Repeated annotation target", *range)
        })
        .collect()
}
