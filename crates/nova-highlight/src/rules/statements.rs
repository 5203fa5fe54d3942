//! Statements: returns, conditions, switch blocks, labels with `break`/`continue`, foreach and
//! `throw`.

use nova_core::{JavaLanguageLevel, TextRange};
use nova_hir::{ExprId, ExprKind, Label, NodeId, StmtId, StmtKind, Symbol};
use nova_types::{
    format_type, instantiate_as_supertype, is_assignable, unboxed_type, ClassKind, PrimitiveType, Type,
    WildcardBound,
};

use super::{check_assignable, incompatible_types};
use crate::codes;
use crate::constant;
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, QuickFix, Severity};

/// The ancestors of the current statement up to (not including) the enclosing member.
fn statement_ancestors<'p>(ctx: &'p FileContext<'_>) -> impl Iterator<Item = StmtId> + 'p {
    ctx.path
        .iter()
        .rev()
        .take_while(|node| matches!(node, NodeId::Stmt(_) | NodeId::Expr(_)))
        .filter_map(|node| match node {
            NodeId::Stmt(id) => Some(*id),
            _ => None,
        })
}

pub(crate) fn return_statement(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let file = ctx.file;
    let StmtKind::Return(value) = file.stmts[id].kind else {
        return None;
    };
    let range = file.stmts[id].range;
    let Some(method) = ctx.enclosing_method() else {
        return Some(Diagnostic::error(
            codes::RETURN_OUTSIDE_METHOD,
            "'return' outside method",
            range,
        ));
    };
    let method = &file.methods[method];
    let return_type = match method.return_type {
        Some(ty) => file.type_refs[ty].ty.clone(),
        None if method.is_constructor() => Type::Void,
        None => return None,
    };
    match value {
        Some(value) if return_type.is_void() => Some(
            Diagnostic::builder(Severity::Error, codes::RETURN_VALUE_FROM_VOID, file.exprs[value].range)
                .message("Cannot return a value from a method with void result type")
                .fix(QuickFix::DeleteElement)
                .build(),
        ),
        Some(value) => check_assignable(ctx, &return_type, value),
        None if !return_type.is_void() && !return_type.is_errorish() => Some(Diagnostic::error(
            codes::MISSING_RETURN_VALUE,
            "Missing return value",
            range,
        )),
        None => None,
    }
}

/// `if`, `while`, `do` and `for` conditions are boolean.
pub(crate) fn condition(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let condition = match ctx.file.stmts[id].kind {
        StmtKind::If { condition, .. }
        | StmtKind::While { condition, .. }
        | StmtKind::DoWhile { condition, .. } => condition,
        StmtKind::For {
            condition: Some(condition),
            ..
        } => condition,
        _ => return None,
    };
    check_assignable(ctx, &Type::Primitive(PrimitiveType::Boolean), condition)
}

/// Only assignments, increments, calls and instance creation can stand alone.
pub(crate) fn expression_statement(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let file = ctx.file;
    let StmtKind::Expr(expr) = file.stmts[id].kind else {
        return None;
    };
    let allowed = match &file.exprs[expr].kind {
        ExprKind::Assign { .. }
        | ExprKind::MethodCall { .. }
        | ExprKind::ConstructorCall { .. }
        | ExprKind::New { .. } => true,
        ExprKind::Unary { op, .. } => op.is_increment(),
        _ => false,
    };
    (!allowed).then(|| Diagnostic::error(codes::NOT_A_STATEMENT, "Not a statement", file.exprs[expr].range))
}

/// `throw` takes a `Throwable`.
pub(crate) fn throw_statement(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let StmtKind::Throw(expr) = ctx.file.stmts[id].kind else {
        return None;
    };
    let throwable = Type::class(ctx.env.well_known().throwable, vec![]);
    check_assignable(ctx, &throwable, expr)
}

fn enum_class(ctx: &FileContext<'_>, selector: ExprId) -> Option<nova_types::ClassId> {
    let def = ctx.expr_type(selector).as_class()?.def;
    ctx.env
        .class(def)
        .is_some_and(|c| c.kind == ClassKind::Enum)
        .then_some(def)
}

/// Selectors are `char`, `byte`, `short`, `int` (or their boxes), an enum, or from 1.7 a
/// `String`.
pub(crate) fn switch_selector(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let StmtKind::Switch { selector, .. } = file.stmts[id].kind else {
        return None;
    };
    let ty = ctx.expr_type(selector);
    if ty.is_errorish() || enum_class(ctx, selector).is_some() {
        return None;
    }
    let primitive = match ty {
        Type::Primitive(p) => Some(*p),
        other => unboxed_type(env, other),
    };
    let integral = primitive.is_some_and(|p| {
        matches!(
            p,
            PrimitiveType::Char | PrimitiveType::Byte | PrimitiveType::Short | PrimitiveType::Int
        )
    });
    if integral {
        return None;
    }
    let strings = ctx.level.is_at_least(JavaLanguageLevel::Jdk1_7);
    if strings && ty.as_class().is_some_and(|ct| ct.def == env.well_known().string) {
        return None;
    }
    let required = if strings {
        "char, byte, short, int, Character, Byte, Short, Integer, String, or an enum"
    } else {
        "char, byte, short, int, Character, Byte, Short, Integer, or an enum"
    };
    Some(Diagnostic::error(
        codes::INCOMPATIBLE_TYPES,
        format!(
            "Incompatible types. Found: '{}', required: '{required}'",
            format_type(env, ty)
        ),
        file.exprs[selector].range,
    ))
}

/// A `case` label: placement, then the label value.
pub(crate) fn case_label(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let file = ctx.file;
    let StmtKind::Case { value, .. } = file.stmts[id].kind else {
        return None;
    };
    let selector = match ctx.parent() {
        Some(NodeId::Stmt(parent)) => match file.stmts[parent].kind {
            StmtKind::Switch { selector, .. } => selector,
            _ => return Some(case_outside_switch(ctx, id)),
        },
        _ => return Some(case_outside_switch(ctx, id)),
    };
    let value = value?;
    let range = file.exprs[value].range;
    if let Some(enum_def) = enum_class(ctx, selector) {
        let is_constant_name = matches!(file.exprs[value].kind, ExprKind::Name { .. })
            && matches!(ctx.symbol(value), Some(Symbol::Field { owner, .. }) if *owner == enum_def);
        let unresolved_name = matches!(
            &file.exprs[value].kind,
            ExprKind::Name { resolution, .. } if resolution.symbol.is_none()
        );
        return (!is_constant_name && !unresolved_name).then(|| {
            Diagnostic::error(
                codes::ENUM_CASE_LABEL,
                "An enum switch case label must be the unqualified name of an enumeration constant",
                range,
            )
        });
    }
    if ctx.expr_type(value).is_errorish() {
        return None;
    }
    if !constant::is_constant(file, value) {
        return Some(Diagnostic::error(
            codes::CONSTANT_EXPRESSION_REQUIRED,
            "Constant expression required",
            range,
        ));
    }
    let selector_ty = ctx.expr_type(selector).clone();
    check_assignable(ctx, &selector_ty, value)
}

fn case_outside_switch(ctx: &FileContext<'_>, id: StmtId) -> Diagnostic {
    Diagnostic::error(
        codes::CASE_OUTSIDE_SWITCH,
        "Case statement outside switch",
        ctx.file.stmts[id].range,
    )
}

/// `case 1` with no `:` before the next token.
pub(crate) fn case_colon(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let stmt = &ctx.file.stmts[id];
    let StmtKind::Case { has_colon: false, .. } = stmt.kind else {
        return None;
    };
    let end = stmt.range.end();
    Some(
        Diagnostic::builder(Severity::Error, codes::COLON_EXPECTED, TextRange::empty(end))
            .message("':' expected")
            .after_end_of_line(ctx.at_line_end(end))
            .fix(QuickFix::InsertColon)
            .build(),
    )
}

/// Repeated `default` labels and repeated case values; the first occurrence wins.
pub(crate) fn duplicate_labels(ctx: &FileContext<'_>, id: StmtId) -> Vec<Diagnostic> {
    let file = ctx.file;
    let StmtKind::Switch { selector, body } = &file.stmts[id].kind else {
        return Vec::new();
    };
    let is_enum = enum_class(ctx, *selector).is_some();
    let mut out = Vec::new();
    let mut seen_default = false;
    let mut constants: Vec<constant::Value> = Vec::new();
    let mut enum_constants: Vec<usize> = Vec::new();
    for stmt in body {
        let StmtKind::Case { value, .. } = file.stmts[*stmt].kind else {
            continue;
        };
        let Some(value) = value else {
            if seen_default {
                out.push(Diagnostic::error(
                    codes::DUPLICATE_DEFAULT_LABEL,
                    "Duplicate default label",
                    file.stmts[*stmt].range,
                ));
            }
            seen_default = true;
            continue;
        };
        let duplicate = if is_enum {
            match ctx.symbol(value) {
                Some(Symbol::Field { index, .. }) => {
                    let repeated = enum_constants.contains(index);
                    enum_constants.push(*index);
                    repeated
                }
                _ => false,
            }
        } else {
            match constant::evaluate(file, value) {
                Some(found) => {
                    let repeated = constants.contains(&found);
                    constants.push(found);
                    repeated
                }
                None => false,
            }
        };
        if duplicate {
            out.push(Diagnostic::error(
                codes::DUPLICATE_SWITCH_LABEL,
                "duplicate switch label",
                file.exprs[value].range,
            ));
        }
    }
    out
}

fn labeled_statement(ctx: &FileContext<'_>, name: &str) -> Option<(StmtId, Option<StmtId>)> {
    let file = ctx.file;
    statement_ancestors(ctx).find_map(|stmt| match &file.stmts[stmt].kind {
        StmtKind::Labeled { label, body } if label.name == name => Some((stmt, *body)),
        _ => None,
    })
}

fn undefined_label(label: &Label) -> Diagnostic {
    Diagnostic::error(
        codes::UNDEFINED_LABEL,
        format!("Undefined label: '{}'", label.name),
        label.range,
    )
}

/// `break` and `continue`, with or without a label.
pub(crate) fn jump(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let file = ctx.file;
    let range = file.stmts[id].range;
    match &file.stmts[id].kind {
        StmtKind::Break(Some(label)) => labeled_statement(ctx, &label.name)
            .is_none()
            .then(|| undefined_label(label)),
        StmtKind::Continue(Some(label)) => match labeled_statement(ctx, &label.name) {
            None => Some(undefined_label(label)),
            Some((_, body)) => {
                let is_loop = body.is_some_and(|body| file.stmts[body].kind.is_loop());
                (!is_loop).then(|| {
                    Diagnostic::error(
                        codes::NOT_A_LOOP_LABEL,
                        format!("Not a loop label: '{}'", label.name),
                        label.range,
                    )
                })
            }
        },
        StmtKind::Break(None) => {
            let target = statement_ancestors(ctx).any(|stmt| {
                let kind = &file.stmts[stmt].kind;
                kind.is_loop() || matches!(kind, StmtKind::Switch { .. })
            });
            (!target).then(|| Diagnostic::error(codes::BREAK_OUTSIDE, "Break outside switch or loop", range))
        }
        StmtKind::Continue(None) => {
            let target = statement_ancestors(ctx).any(|stmt| file.stmts[stmt].kind.is_loop());
            (!target).then(|| Diagnostic::error(codes::CONTINUE_OUTSIDE, "Continue outside of loop", range))
        }
        _ => None,
    }
}

/// A label reused by an enclosing labeled statement, or a label with nothing after it.
pub(crate) fn labeled(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let file = ctx.file;
    let StmtKind::Labeled { label, body } = &file.stmts[id].kind else {
        return None;
    };
    if labeled_statement(ctx, &label.name).is_some() {
        return Some(Diagnostic::error(
            codes::DUPLICATE_LABEL,
            format!("Label '{}' already in use", label.name),
            label.range,
        ));
    }
    body.is_none()
        .then(|| Diagnostic::error(codes::LABEL_WITHOUT_STATEMENT, "Label without statement", label.range))
}

/// Element type produced by iterating over `ty`, if it can be iterated.
fn iterated_element(ctx: &FileContext<'_>, ty: &Type) -> Option<Type> {
    let env = ctx.env;
    let well_known = env.well_known();
    let object = || Type::class(well_known.object, vec![]);
    match ty {
        Type::Array(component) => Some((**component).clone()),
        Type::Class(_) | Type::TypeVar(_) => {
            let Type::Class(iterable) = instantiate_as_supertype(env, ty, well_known.iterable)? else {
                return None;
            };
            Some(match iterable.args.first() {
                None => object(),
                Some(Type::Wildcard(WildcardBound::Extends(bound))) => (**bound).clone(),
                Some(Type::Wildcard(_)) => object(),
                Some(arg) => arg.clone(),
            })
        }
        _ => None,
    }
}

/// `for (T x : expr)`: `expr` is an array or an `Iterable`, and its elements fit `T`.
pub(crate) fn foreach(ctx: &FileContext<'_>, id: StmtId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let StmtKind::Foreach { param, iterable, .. } = file.stmts[id].kind else {
        return None;
    };
    let ty = ctx.expr_type(iterable);
    if ty.is_errorish() {
        return None;
    }
    let Some(element) = iterated_element(ctx, ty) else {
        return Some(Diagnostic::error(
            codes::FOREACH_NOT_APPLICABLE,
            format!("foreach not applicable to type '{}'", format_type(env, ty)),
            file.exprs[iterable].range,
        ));
    };
    let declared = &file.type_refs[file.vars[param].ty].ty;
    if declared.is_errorish() || element.is_errorish() || is_assignable(env, declared, &element) {
        return None;
    }
    Some(incompatible_types(env, declared, &element, file.vars[param].range))
}
