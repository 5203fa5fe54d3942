//! Variable declarations: redeclared names and initializer types.

use nova_hir::{Member, NodeId, StmtId, StmtKind, VarId, VarKind};

use super::expressions::variable_initializer;
use crate::codes;
use crate::context::FileContext;
use crate::diagnostic::Diagnostic;

/// Variables declared before `child` by `node` and still in scope below it.
fn declared_before(ctx: &FileContext<'_>, node: NodeId, child: NodeId, out: &mut Vec<VarId>) {
    let file = ctx.file;
    let locals_until = |stmts: &[StmtId], out: &mut Vec<VarId>| {
        for stmt in stmts {
            if NodeId::Stmt(*stmt) == child {
                break;
            }
            if let StmtKind::LocalVars(vars) = &file.stmts[*stmt].kind {
                out.extend(vars.iter().copied());
            }
        }
    };
    match node {
        NodeId::Method(id) => out.extend(
            file.methods[id]
                .params
                .iter()
                .copied()
                .take_while(|param| NodeId::Var(*param) != child),
        ),
        NodeId::Stmt(id) => match &file.stmts[id].kind {
            StmtKind::Block(stmts) => locals_until(stmts, out),
            StmtKind::Switch { body, .. } => locals_until(body, out),
            StmtKind::For { init, .. } => locals_until(init, out),
            StmtKind::LocalVars(vars) => out.extend(
                vars.iter()
                    .copied()
                    .take_while(|var| NodeId::Var(*var) != child),
            ),
            StmtKind::Foreach { param, .. } if NodeId::Var(*param) != child => out.push(*param),
            StmtKind::Try { catches, .. } => out.extend(
                catches
                    .iter()
                    .filter(|catch| NodeId::Stmt(catch.body) == child)
                    .map(|catch| catch.param),
            ),
            _ => {}
        },
        _ => {}
    }
}

/// A local, parameter or field whose name is already taken in the same scope.
pub(crate) fn duplicate(ctx: &FileContext<'_>, id: VarId) -> Option<Diagnostic> {
    let file = ctx.file;
    let var = &file.vars[id];
    let clash = match var.kind {
        VarKind::Field { owner, .. } => file.classes[owner]
            .members
            .iter()
            .take_while(|member| **member != Member::Field(id))
            .any(|member| match member {
                Member::Field(other) => file.vars[*other].name == var.name,
                Member::EnumConstant(other) => file.enum_constants[*other].name == var.name,
                _ => false,
            }),
        _ => {
            let mut visible = Vec::new();
            let mut child = NodeId::Var(id);
            for node in ctx.path.iter().rev() {
                if matches!(node, NodeId::Class(_) | NodeId::Initializer(_)) {
                    break;
                }
                declared_before(ctx, *node, child, &mut visible);
                if matches!(node, NodeId::Method(_)) {
                    break;
                }
                child = *node;
            }
            visible.iter().any(|other| file.vars[*other].name == var.name)
        }
    };
    clash.then(|| {
        Diagnostic::error(
            codes::DUPLICATE_VARIABLE,
            format!("Variable '{}' is already defined in the scope", var.name),
            var.name_range,
        )
    })
}

/// The initializer fits the declared type.
pub(crate) fn initializer(ctx: &FileContext<'_>, id: VarId) -> Option<Diagnostic> {
    let file = ctx.file;
    let var = &file.vars[id];
    let init = var.initializer?;
    variable_initializer(ctx, &file.type_refs[var.ty].ty, init)
}
