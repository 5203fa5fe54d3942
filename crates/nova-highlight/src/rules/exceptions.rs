//! Checked exceptions: unhandled throws, catch clauses for exceptions the try block cannot throw,
//! and catch clauses already covered by an earlier one.

use nova_core::TextRange;
use nova_hir::{ExprKind, NodeId, StmtId, StmtKind};
use nova_types::{format_type, is_subtype, is_unchecked_exception, Type, TypeEnv};

use crate::calls::{call_site, enum_constant_site, thrown_types};
use crate::codes;
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, QuickFix, Severity};

fn checked(env: &dyn TypeEnv, types: &[Type]) -> Vec<Type> {
    types
        .iter()
        .filter(|ty| !ty.is_errorish() && !is_unchecked_exception(env, ty))
        .cloned()
        .collect()
}

fn handled_by(env: &dyn TypeEnv, ty: &Type, handlers: &[Type]) -> bool {
    handlers.iter().any(|h| is_subtype(env, ty, h))
}

fn report(ctx: &FileContext<'_>, unhandled: &[Type], range: TextRange, in_method: bool) -> Option<Diagnostic> {
    let first = unhandled.first()?;
    let names: Vec<String> = unhandled.iter().map(|ty| format_type(ctx.env, ty)).collect();
    let message = match names.as_slice() {
        [only] => format!("Unhandled exception: {only}"),
        _ => format!("Unhandled exceptions: {}", names.join(", ")),
    };
    let mut builder = Diagnostic::builder(Severity::Error, codes::UNHANDLED_EXCEPTION, range).message(message);
    if in_method {
        builder = builder
            .fix(QuickFix::AddExceptionToThrows {
                exception: format_type(ctx.env, first),
            })
            .fix(QuickFix::SurroundWithTryCatch);
    }
    Some(builder.build())
}

/// Checked exceptions thrown where nothing can catch them, such as a generated constructor.
pub(crate) fn unhandled(ctx: &FileContext<'_>, thrown: &[Type], range: TextRange, in_method: bool) -> Option<Diagnostic> {
    report(ctx, &checked(ctx.env, thrown), range, in_method)
}

/// Exceptions thrown directly by `node` itself (not by its children).
fn thrown_by(ctx: &FileContext<'_>, node: NodeId) -> Vec<Type> {
    let file = ctx.file;
    match node {
        NodeId::Expr(id) => match file.exprs[id].kind {
            ExprKind::MethodCall { .. } | ExprKind::New { .. } | ExprKind::ConstructorCall { .. } => {
                call_site(ctx, id).map(|site| thrown_types(ctx, &site)).unwrap_or_default()
            }
            _ => Vec::new(),
        },
        NodeId::Stmt(id) => match file.stmts[id].kind {
            StmtKind::Throw(expr) => vec![ctx.expr_type(expr).clone()],
            _ => Vec::new(),
        },
        NodeId::EnumConstant(id) => enum_constant_site(ctx, id)
            .map(|site| thrown_types(ctx, &site))
            .unwrap_or_default(),
        _ => Vec::new(),
    }
}

/// Checked exceptions thrown by `node` at the current position, minus those a surrounding `try`
/// catches or the enclosing method declares.
pub(crate) fn unhandled_at(ctx: &FileContext<'_>, node: NodeId, range: TextRange) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let mut pending = checked(env, &thrown_by(ctx, node));
    if pending.is_empty() {
        return None;
    }

    let mut chain = ctx.path.clone();
    chain.push(node);
    let mut in_method = false;
    for idx in (0..chain.len()).rev() {
        match chain[idx] {
            NodeId::Stmt(stmt) => {
                if let StmtKind::Try { body, catches, .. } = &file.stmts[stmt].kind {
                    if chain.get(idx + 1) == Some(&NodeId::Stmt(*body)) {
                        let caught: Vec<Type> = catches
                            .iter()
                            .map(|c| file.type_refs[file.vars[c.param].ty].ty.clone())
                            .collect();
                        pending.retain(|ty| !handled_by(env, ty, &caught));
                    }
                }
            }
            NodeId::Method(method) => {
                let declared: Vec<Type> = file.methods[method]
                    .throws
                    .iter()
                    .map(|t| file.type_refs[*t].ty.clone())
                    .collect();
                if declared.iter().any(Type::is_errorish) {
                    return None;
                }
                pending.retain(|ty| !handled_by(env, ty, &declared));
                in_method = true;
                break;
            }
            NodeId::Initializer(init) => {
                let decl = &file.initializers[init];
                let anonymous = file.classes[decl.owner].container == nova_hir::ClassContainer::Anonymous;
                if !decl.is_static() && anonymous {
                    return None;
                }
                break;
            }
            NodeId::Var(var) if file.vars[var].is_field() => break,
            NodeId::Class(_) | NodeId::EnumConstant(_) if idx + 1 < chain.len() => break,
            _ => {}
        }
        if pending.is_empty() {
            return None;
        }
    }
    report(ctx, &pending, range, in_method)
}

/// Checked exceptions that can escape `node`, skipping nested class bodies.
fn escaping(ctx: &FileContext<'_>, node: NodeId, out: &mut Vec<Type>) {
    let env = ctx.env;
    let file = ctx.file;
    match node {
        NodeId::Class(_) => return,
        NodeId::Stmt(id) => {
            if let StmtKind::Try {
                body,
                catches,
                finally,
            } = &file.stmts[id].kind
            {
                let mut inner = Vec::new();
                escaping(ctx, NodeId::Stmt(*body), &mut inner);
                let caught: Vec<Type> = catches
                    .iter()
                    .map(|c| file.type_refs[file.vars[c.param].ty].ty.clone())
                    .collect();
                out.extend(inner.into_iter().filter(|ty| !handled_by(env, ty, &caught)));
                for catch in catches {
                    escaping(ctx, NodeId::Stmt(catch.body), out);
                }
                if let Some(finally) = finally {
                    escaping(ctx, NodeId::Stmt(*finally), out);
                }
                return;
            }
        }
        _ => {}
    }
    out.extend(checked(env, &thrown_by(ctx, node)));
    for child in file.children(node) {
        escaping(ctx, child, out);
    }
}

/// Catch clauses of the `try` statement `id`: repeats of an earlier clause, and checked
/// exceptions the body cannot throw.
pub(crate) fn catch_clauses(ctx: &FileContext<'_>, id: StmtId) -> Vec<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let StmtKind::Try { body, catches, .. } = &file.stmts[id].kind else {
        return Vec::new();
    };
    let mut thrown = Vec::new();
    escaping(ctx, NodeId::Stmt(*body), &mut thrown);

    let well_known = env.well_known();
    let mut out = Vec::new();
    let mut earlier: Vec<Type> = Vec::new();
    for catch in catches {
        let type_ref = &file.type_refs[file.vars[catch.param].ty];
        let ty = &type_ref.ty;
        if ty.is_errorish() {
            continue;
        }
        let name = format_type(env, ty);
        if handled_by(env, ty, &earlier) {
            out.push(
                Diagnostic::builder(Severity::Error, codes::EXCEPTION_ALREADY_CAUGHT, type_ref.range)
                    .message(format!("Exception '{name}' has already been caught"))
                    .fix(QuickFix::DeleteCatch { exception: name })
                    .build(),
            );
            continue;
        }
        earlier.push(ty.clone());

        let always_allowed = ty.as_class().is_some_and(|ct| {
            ct.def == well_known.throwable || ct.def == well_known.exception || ct.def == well_known.object
        });
        if always_allowed || is_unchecked_exception(env, ty) {
            continue;
        }
        let possible = thrown
            .iter()
            .any(|t| is_subtype(env, t, ty) || is_subtype(env, ty, t));
        if !possible {
            out.push(
                Diagnostic::builder(Severity::Error, codes::EXCEPTION_NEVER_THROWN, type_ref.range)
                    .message(format!(
                        "Exception '{name}' is never thrown in the corresponding try block"
                    ))
                    .fix(QuickFix::DeleteCatch { exception: name })
                    .build(),
            );
        }
    }
    out
}
