//! Expressions: name references, operators, assignments to variables (final ones included),
//! casts, array access and instance creation.

use nova_core::TextRange;
use nova_hir::{
    AssignOp, BinaryOp, ClassDeclId, ConstructorCallKind, ExprId, ExprKind, Member, MethodDeclId,
    Modifier, NodeId, Resolution, StmtId, StmtKind, Symbol, UnaryOp, VarKind,
};
use nova_types::{
    binary_numeric_promotion, format_type, is_castable, is_inheritor, is_subtype, unary_numeric_promotion,
    unboxed_type, ClassId, ClassKind, PrimitiveType, Type, TypeEnv, Visibility, WildcardBound,
};

use super::{check_assignable, type_ref_class};
use crate::calls::{call_site, check_call};
use crate::codes;
use crate::constant;
use crate::context::{FileContext, VarKey};
use crate::diagnostic::{Diagnostic, QuickFix, Severity};

fn is_string(env: &dyn TypeEnv, ty: &Type) -> bool {
    ty.as_class().is_some_and(|ct| ct.def == env.well_known().string)
}

fn is_boolean(env: &dyn TypeEnv, ty: &Type) -> bool {
    *ty == Type::Primitive(PrimitiveType::Boolean) || unboxed_type(env, ty) == Some(PrimitiveType::Boolean)
}

fn is_integral(env: &dyn TypeEnv, ty: &Type) -> bool {
    unary_numeric_promotion(env, ty).is_some_and(|p| p.is_integral())
}

/// JLS 15.17 to 15.24: whether `lhs op rhs` is well typed.
pub(crate) fn binary_applicable(env: &dyn TypeEnv, op: BinaryOp, lhs: &Type, rhs: &Type) -> bool {
    match op {
        BinaryOp::Add if is_string(env, lhs) || is_string(env, rhs) => !lhs.is_void() && !rhs.is_void(),
        BinaryOp::Add
        | BinaryOp::Sub
        | BinaryOp::Mul
        | BinaryOp::Div
        | BinaryOp::Rem
        | BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::Le
        | BinaryOp::Ge => binary_numeric_promotion(env, lhs, rhs).is_some(),
        BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => is_integral(env, lhs) && is_integral(env, rhs),
        BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
            (is_boolean(env, lhs) && is_boolean(env, rhs)) || (is_integral(env, lhs) && is_integral(env, rhs))
        }
        BinaryOp::And | BinaryOp::Or => is_boolean(env, lhs) && is_boolean(env, rhs),
        BinaryOp::Eq | BinaryOp::Ne => {
            if lhs.is_primitive() || rhs.is_primitive() {
                return binary_numeric_promotion(env, lhs, rhs).is_some()
                    || (is_boolean(env, lhs) && is_boolean(env, rhs));
            }
            if lhs.is_void() || rhs.is_void() {
                return false;
            }
            matches!(lhs, Type::Null)
                || matches!(rhs, Type::Null)
                || is_castable(env, lhs, rhs)
                || is_castable(env, rhs, lhs)
        }
    }
}

fn unary_applicable(env: &dyn TypeEnv, op: UnaryOp, operand: &Type) -> bool {
    match op {
        UnaryOp::Not => is_boolean(env, operand),
        UnaryOp::BitNot => is_integral(env, operand),
        _ => unary_numeric_promotion(env, operand).is_some(),
    }
}

/// Operand types of binary and unary operators, and of compound assignments.
pub(crate) fn operator(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let range = file.exprs[id].range;
    let (op, text, lhs, rhs) = match &file.exprs[id].kind {
        ExprKind::Binary { op, lhs, rhs, .. } => (*op, op.text().to_string(), *lhs, *rhs),
        ExprKind::Assign {
            op: AssignOp(Some(op)),
            target,
            value,
            ..
        } => {
            if *op == BinaryOp::Add && is_string(env, ctx.expr_type(*target)) {
                return None;
            }
            (*op, format!("{}=", op.text()), *target, *value)
        }
        ExprKind::Unary { op, operand, .. } => {
            let ty = ctx.expr_type(*operand);
            if ty.is_errorish() || unary_applicable(env, *op, ty) {
                return None;
            }
            return Some(Diagnostic::error(
                codes::OPERATOR_NOT_APPLICABLE,
                format!("Operator '{}' cannot be applied to '{}'", op.text(), format_type(env, ty)),
                range,
            ));
        }
        _ => return None,
    };
    let (lhs_ty, rhs_ty) = (ctx.expr_type(lhs), ctx.expr_type(rhs));
    if lhs_ty.is_errorish() || rhs_ty.is_errorish() {
        return None;
    }
    (!binary_applicable(env, op, lhs_ty, rhs_ty)).then(|| {
        Diagnostic::error(
            codes::OPERATOR_NOT_APPLICABLE,
            format!(
                "Operator '{text}' cannot be applied to '{}', '{}'",
                format_type(env, lhs_ty),
                format_type(env, rhs_ty)
            ),
            range,
        )
    })
}

/// The value of a simple assignment against the target's type.
pub(crate) fn assignment_type(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    match ctx.file.exprs[id].kind {
        ExprKind::Assign {
            op: AssignOp(None),
            target,
            value,
            ..
        } => {
            let target_ty = ctx.expr_type(target).clone();
            check_assignable(ctx, &target_ty, value)
        }
        _ => None,
    }
}

/// A `?:` condition must be boolean.
pub(crate) fn conditional(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    match ctx.file.exprs[id].kind {
        ExprKind::Conditional { condition, .. } => {
            check_assignable(ctx, &Type::Primitive(PrimitiveType::Boolean), condition)
        }
        _ => None,
    }
}

/// The expression written to by an assignment or increment.
fn write_target(ctx: &FileContext<'_>, id: ExprId) -> Option<ExprId> {
    match &ctx.file.exprs[id].kind {
        ExprKind::Assign { target, .. } => Some(*target),
        ExprKind::Unary { op, operand, .. } if op.is_increment() => Some(*operand),
        _ => None,
    }
}

/// The left side of an assignment (or the operand of `++`/`--`) must denote a variable.
pub(crate) fn variable_expected(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    let target = write_target(ctx, id)?;
    let inner = file.skip_parens(target);
    let is_variable = match &file.exprs[inner].kind {
        ExprKind::ArrayAccess { .. } => true,
        ExprKind::Name { resolution, .. } | ExprKind::FieldAccess { resolution, .. } => match &resolution.symbol {
            Some(Symbol::Local(_)) | Some(Symbol::Field { .. }) => true,
            Some(_) => false,
            None => true,
        },
        _ => false,
    };
    (!is_variable).then(|| Diagnostic::error(codes::VARIABLE_EXPECTED, "Variable expected", file.exprs[target].range))
}

/// A final field reached as `x` or `this.x`, the forms allowed to initialize a blank final.
fn is_simple_field_reference(ctx: &FileContext<'_>, expr: ExprId) -> bool {
    let file = ctx.file;
    match &file.exprs[expr].kind {
        ExprKind::Name { .. } => true,
        ExprKind::FieldAccess { qualifier, .. } => {
            matches!(file.exprs[file.skip_parens(*qualifier)].kind, ExprKind::This(None))
        }
        _ => false,
    }
}

/// Whether the current member may initialize a blank final field of `owner`.
fn initializes_fields_of(ctx: &FileContext<'_>, owner: ClassDeclId, is_static: bool) -> Option<NodeId> {
    let file = ctx.file;
    let member = ctx.enclosing_member()?;
    let allowed = match member {
        NodeId::Method(method) => {
            let method = &file.methods[method];
            !is_static && method.is_constructor() && method.owner == owner
        }
        NodeId::Initializer(init) => {
            let init = &file.initializers[init];
            init.owner == owner && init.is_static() == is_static
        }
        _ => false,
    };
    allowed.then_some(member)
}

/// Two writes sit in opposite branches of one `if` or `?:`.
fn mutually_exclusive(ctx: &FileContext<'_>, first: &[NodeId], second: &[NodeId]) -> bool {
    let file = ctx.file;
    let shared = first.iter().zip(second).take_while(|(a, b)| a == b).count();
    let (Some(fork), Some(a), Some(b)) = (
        shared.checked_sub(1).and_then(|idx| first.get(idx)),
        first.get(shared),
        second.get(shared),
    ) else {
        return false;
    };
    match *fork {
        NodeId::Stmt(stmt) => match file.stmts[stmt].kind {
            StmtKind::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => {
                let branches = [NodeId::Stmt(then_branch), NodeId::Stmt(else_branch)];
                branches.contains(a) && branches.contains(b)
            }
            _ => false,
        },
        NodeId::Expr(expr) => match file.exprs[expr].kind {
            ExprKind::Conditional {
                then_expr, else_expr, ..
            } => {
                let branches = [NodeId::Expr(then_expr), NodeId::Expr(else_expr)];
                branches.contains(a) && branches.contains(b)
            }
            _ => false,
        },
        _ => false,
    }
}

fn cannot_assign(name: &str, range: TextRange) -> Diagnostic {
    Diagnostic::builder(Severity::Error, codes::FINAL_ASSIGNMENT, range)
        .message(format!("Cannot assign a value to final variable '{name}'"))
        .fix(QuickFix::RemoveModifier { modifier: "final" })
        .build()
}

/// Records a write to a blank final in `member`, reporting a second write on the same path.
fn blank_final_write(
    ctx: &mut FileContext<'_>,
    member: NodeId,
    key: VarKey,
    name: &str,
    write: ExprId,
    range: TextRange,
) -> Option<Diagnostic> {
    let mut path = ctx.path.clone();
    path.push(NodeId::Expr(write));
    match ctx.final_writes.get(&(member, key)) {
        Some(first) if !mutually_exclusive(ctx, first, &path) => Some(Diagnostic::error(
            codes::FINAL_ALREADY_ASSIGNED,
            format!("Variable '{name}' might already have been assigned to"),
            range,
        )),
        Some(_) => None,
        None => {
            ctx.final_writes.insert((member, key), path);
            None
        }
    }
}

/// Writes to final locals, parameters and fields.
pub(crate) fn final_assignment(ctx: &mut FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let target = file.skip_parens(write_target(ctx, id)?);
    let range = file.exprs[target].range;
    let compound = !matches!(
        file.exprs[id].kind,
        ExprKind::Assign {
            op: AssignOp(None),
            ..
        }
    );
    match ctx.symbol(target)?.clone() {
        Symbol::Local(var) => {
            let decl = &file.vars[var];
            if !decl.modifiers.has(Modifier::Final) {
                return None;
            }
            let blank = matches!(decl.kind, VarKind::Local) && decl.initializer.is_none();
            if !blank || compound {
                return Some(cannot_assign(&decl.name, range));
            }
            let member = ctx.enclosing_member()?;
            blank_final_write(ctx, member, VarKey::Local(var), &decl.name, id, range)
        }
        Symbol::Field { owner, index } => {
            let field = env.class(owner)?.fields.get(index)?;
            if !field.is_final {
                return None;
            }
            let blank_decl = constant::field_decl(file, owner, index)
                .filter(|var| file.vars[*var].initializer.is_none());
            let member = match blank_decl {
                Some(var) if !compound && is_simple_field_reference(ctx, target) => {
                    let VarKind::Field { owner: class, .. } = file.vars[var].kind else {
                        return None;
                    };
                    initializes_fields_of(ctx, class, field.is_static)
                }
                _ => None,
            };
            match member {
                Some(member) => {
                    let name = field.name.clone();
                    blank_final_write(ctx, member, VarKey::Field(owner, index), &name, id, range)
                }
                None => Some(cannot_assign(&field.name, range)),
            }
        }
        _ => None,
    }
}

/// Definite assignment (JLS 16) of one blank final field over a constructor or initializer
/// body. Loop, switch and labeled bodies, and the right operand of `&&`/`||`, earn no credit.
struct FieldAssignment<'c, 'a> {
    ctx: &'c FileContext<'a>,
    owner: ClassId,
    index: usize,
}

impl FieldAssignment<'_, '_> {
    fn is_target(&self, target: ExprId) -> bool {
        let target = self.ctx.file.skip_parens(target);
        matches!(
            self.ctx.symbol(target),
            Some(Symbol::Field { owner, index }) if *owner == self.owner && *index == self.index
        ) && is_simple_field_reference(self.ctx, target)
    }

    /// Whether the field is assigned after `stmt` completes normally. A statement that cannot
    /// complete normally assigns it vacuously.
    fn after_stmt(&self, stmt: StmtId, assigned: bool) -> bool {
        let file = self.ctx.file;
        match &file.stmts[stmt].kind {
            StmtKind::Block(stmts) => stmts.iter().fold(assigned, |da, s| self.after_stmt(*s, da)),
            StmtKind::LocalVars(vars) => vars.iter().fold(assigned, |da, var| {
                file.vars[*var]
                    .initializer
                    .map_or(da, |init| self.after_expr(init, da))
            }),
            StmtKind::Expr(expr) => self.after_expr(*expr, assigned),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let da = self.after_expr(*condition, assigned);
                let then_da = self.after_stmt(*then_branch, da);
                let else_da = else_branch.map_or(da, |e| self.after_stmt(e, da));
                then_da && else_da
            }
            StmtKind::While { condition, .. } => self.after_expr(*condition, assigned),
            StmtKind::DoWhile { .. } | StmtKind::Labeled { .. } | StmtKind::Case { .. } => assigned,
            StmtKind::For { init, condition, .. } => {
                let da = init.iter().fold(assigned, |da, s| self.after_stmt(*s, da));
                condition.map_or(da, |c| self.after_expr(c, da))
            }
            StmtKind::Foreach { iterable, .. } => self.after_expr(*iterable, assigned),
            StmtKind::Switch { selector, .. } => self.after_expr(*selector, assigned),
            StmtKind::Synchronized { lock, body } => {
                let da = self.after_expr(*lock, assigned);
                self.after_stmt(*body, da)
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                let finally_da = finally.is_some_and(|f| self.after_stmt(f, assigned));
                let handled = self.after_stmt(*body, assigned)
                    && catches.iter().all(|c| self.after_stmt(c.body, assigned));
                finally_da || handled
            }
            StmtKind::Return(_) | StmtKind::Throw(_) | StmtKind::Break(_) | StmtKind::Continue(_) => true,
            StmtKind::LocalClass(_) | StmtKind::Empty => assigned,
        }
    }

    fn after_expr(&self, expr: ExprId, assigned: bool) -> bool {
        let file = self.ctx.file;
        match &file.exprs[expr].kind {
            ExprKind::Assign {
                op: AssignOp(None),
                target,
                value,
                ..
            } if self.is_target(*target) => {
                self.after_expr(*value, assigned);
                true
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                let da = self.after_expr(*condition, assigned);
                self.after_expr(*then_expr, da) && self.after_expr(*else_expr, da)
            }
            ExprKind::Binary {
                op: BinaryOp::And | BinaryOp::Or,
                lhs,
                ..
            } => self.after_expr(*lhs, assigned),
            _ => file
                .children(NodeId::Expr(expr))
                .into_iter()
                .fold(assigned, |da, child| match child {
                    NodeId::Expr(child) => self.after_expr(child, da),
                    _ => da,
                }),
        }
    }
}

/// Whether the body of `node`, a constructor or initializer, definitely assigns the field.
fn assigns_field(ctx: &FileContext<'_>, node: NodeId, owner: ClassId, index: usize) -> bool {
    let body = match node {
        NodeId::Method(method) => ctx.file.methods[method].body,
        NodeId::Initializer(init) => Some(ctx.file.initializers[init].body),
        _ => None,
    };
    let walk = FieldAssignment { ctx, owner, index };
    body.is_some_and(|body| walk.after_stmt(body, false))
}

/// A constructor delegating with `this(...)` leaves initialization to the delegate.
fn delegates(ctx: &FileContext<'_>, method: MethodDeclId) -> bool {
    let file = ctx.file;
    let Some(body) = file.methods[method].body else {
        return false;
    };
    let StmtKind::Block(stmts) = &file.stmts[body].kind else {
        return false;
    };
    stmts.first().is_some_and(|first| match file.stmts[*first].kind {
        StmtKind::Expr(expr) => matches!(
            file.exprs[expr].kind,
            ExprKind::ConstructorCall {
                kind: ConstructorCallKind::This,
                ..
            }
        ),
        _ => false,
    })
}

/// Blank final fields of class `id` that some path leaves unassigned.
pub(crate) fn uninitialized_finals(ctx: &FileContext<'_>, id: ClassDeclId) -> Vec<Diagnostic> {
    let file = ctx.file;
    let decl = &file.classes[id];
    if decl.kind.is_interface() {
        return Vec::new();
    }
    let def = decl.def;
    let constructors: Vec<_> = decl
        .members
        .iter()
        .filter_map(|m| match m {
            Member::Method(method) if file.methods[*method].is_constructor() => Some(*method),
            _ => None,
        })
        .collect();

    let mut out = Vec::new();
    for member in &decl.members {
        let Member::Field(var) = member else {
            continue;
        };
        let field = &file.vars[*var];
        let VarKind::Field { index, .. } = field.kind else {
            continue;
        };
        if !field.modifiers.has(Modifier::Final) || field.initializer.is_some() {
            continue;
        }
        let is_static = field.modifiers.has(Modifier::Static);
        let in_initializer = decl.members.iter().any(|m| match m {
            Member::Initializer(init) => {
                file.initializers[*init].is_static() == is_static
                    && assigns_field(ctx, NodeId::Initializer(*init), def, index)
            }
            _ => false,
        });
        let initialized = in_initializer
            || (!is_static
                && !constructors.is_empty()
                && constructors
                    .iter()
                    .all(|c| delegates(ctx, *c) || assigns_field(ctx, NodeId::Method(*c), def, index)));
        if !initialized {
            out.push(Diagnostic::error(
                codes::FINAL_NOT_INITIALIZED,
                format!("Variable '{}' might not have been initialized", field.name),
                field.name_range,
            ));
        }
    }
    out
}

/// `(T) e` and `e instanceof T` between inconvertible types, and unchecked casts.
pub(crate) fn cast(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let (ty, expr, is_cast) = match file.exprs[id].kind {
        ExprKind::Cast { ty, expr } => (ty, expr, true),
        ExprKind::InstanceOf { expr, ty } => (ty, expr, false),
        _ => return None,
    };
    let target = &file.type_refs[ty].ty;
    let source = ctx.expr_type(expr);
    if target.is_errorish() || source.is_errorish() {
        return None;
    }
    if !is_castable(env, target, source) {
        return Some(Diagnostic::error(
            codes::INCONVERTIBLE_TYPES,
            format!(
                "Inconvertible types; cannot cast '{}' to '{}'",
                format_type(env, source),
                format_type(env, target)
            ),
            file.exprs[id].range,
        ));
    }
    if !is_cast || !ctx.config.report_unchecked || is_subtype(env, source, target) {
        return None;
    }
    let unchecked = match target {
        Type::TypeVar(_) => true,
        Type::Class(ct) => ct.args.iter().any(|a| !matches!(a, Type::Wildcard(WildcardBound::Unbounded))),
        Type::Array(component) => matches!(component.deep_component(), Type::TypeVar(_))
            || component
                .deep_component()
                .as_class()
                .is_some_and(|ct| !ct.args.is_empty()),
        _ => false,
    };
    unchecked.then(|| {
        Diagnostic::unchecked(
            codes::UNCHECKED_CAST,
            format!(
                "Unchecked cast: '{}' to '{}'",
                format_type(env, source),
                format_type(env, target)
            ),
            file.exprs[id].range,
        )
    })
}

/// `a[i]` where `a` is not an array, and non-integral indexes.
pub(crate) fn array_access(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let ExprKind::ArrayAccess { array, index } = file.exprs[id].kind else {
        return None;
    };
    let ty = ctx.expr_type(array);
    if !ty.is_errorish() && !matches!(ty, Type::Array(_)) {
        return Some(Diagnostic::error(
            codes::ARRAY_TYPE_EXPECTED,
            format!("Array type expected; found: '{}'", format_type(env, ty)),
            file.exprs[array].range,
        ));
    }
    check_assignable(ctx, &Type::Primitive(PrimitiveType::Int), index)
}

/// Elements of an array initializer against the component type.
pub(crate) fn array_initializer(ctx: &FileContext<'_>, id: ExprId) -> Vec<Diagnostic> {
    let file = ctx.file;
    let ExprKind::ArrayInit(elements) = &file.exprs[id].kind else {
        return Vec::new();
    };
    let Type::Array(component) = &file.exprs[id].ty else {
        return Vec::new();
    };
    elements
        .iter()
        .filter_map(|element| match &file.exprs[*element].kind {
            ExprKind::ArrayInit(_) if !matches!(**component, Type::Array(_)) => Some(illegal_initializer(ctx, component, *element)),
            _ => check_assignable(ctx, component, *element),
        })
        .collect()
}

/// `{...}` where the declared type is not an array.
pub(crate) fn illegal_initializer(ctx: &FileContext<'_>, declared: &Type, init: ExprId) -> Diagnostic {
    Diagnostic::error(
        codes::INCOMPATIBLE_TYPES,
        format!("Illegal initializer for '{}'", format_type(ctx.env, declared)),
        ctx.file.exprs[init].range,
    )
}

/// `new E()` for an enum, and `new A()` for an abstract class or interface without a body.
pub(crate) fn instantiation(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let ExprKind::New { class, anonymous, .. } = file.exprs[id].kind else {
        return None;
    };
    let def = type_ref_class(file, class)?;
    let target = env.class(def)?;
    let range = file.type_refs[class].range;
    if target.kind == ClassKind::Enum {
        return Some(Diagnostic::error(
            codes::ENUM_INSTANTIATION,
            "Enum types may not be instantiated",
            range,
        ));
    }
    if anonymous.is_none() && (target.is_abstract || target.is_interface()) {
        return Some(Diagnostic::error(
            codes::ABSTRACT_INSTANTIATION,
            format!("'{}' is abstract; cannot be instantiated", target.qualified_name()),
            range,
        ));
    }
    None
}

/// Method calls, instance creation and explicit constructor calls.
pub(crate) fn call(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let site = call_site(ctx, id)?;
    check_call(ctx, &site)
}

fn reference_parts<'f>(
    ctx: &FileContext<'f>,
    id: ExprId,
) -> Option<(&'f str, &'f Resolution, TextRange, bool)> {
    let expr = &ctx.file.exprs[id];
    match &expr.kind {
        ExprKind::Name { name, resolution } => Some((name, resolution, expr.range, true)),
        ExprKind::FieldAccess {
            name,
            name_range,
            resolution,
            ..
        } => Some((name, resolution, *name_range, false)),
        _ => None,
    }
}

/// Names and field accesses: resolution, then construction order, static context, access and
/// enum static access.
pub(crate) fn reference(ctx: &FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let (name, resolution, range, unqualified) = reference_parts(ctx, id)?;
    if !resolution.is_valid {
        return Some(Diagnostic::error(
            codes::CANNOT_RESOLVE_SYMBOL,
            format!("Cannot resolve symbol '{name}'"),
            range,
        ));
    }
    let Some(Symbol::Field { owner, index }) = &resolution.symbol else {
        return None;
    };
    let (owner, index) = (*owner, *index);
    let owner_def = env.class(owner)?;
    let field = owner_def.fields.get(index)?;

    if unqualified && !field.is_static {
        if let Some(prologue) = ctx.constructor_prologue() {
            let under_construction = file.classes[prologue].def;
            if under_construction == owner || is_inheritor(env, under_construction, owner, true) {
                return Some(Diagnostic::error(
                    codes::REFERENCE_BEFORE_SUPER,
                    format!("Cannot reference '{name}' before supertype constructor has been called"),
                    range,
                ));
            }
        }
    }
    if !resolution.is_static_context_ok {
        return Some(Diagnostic::error(
            codes::STATIC_CONTEXT,
            format!("Non-static field '{name}' cannot be referenced from a static context"),
            range,
        ));
    }
    if !resolution.is_accessible {
        let owner_name = owner_def.simple_name();
        let message = match field.visibility {
            Visibility::Private => format!("'{name}' has private access in '{owner_name}'"),
            Visibility::Protected => format!("'{name}' has protected access in '{owner_name}'"),
            _ => format!("'{name}' is not public in '{owner_name}'. Cannot be accessed from outside package"),
        };
        return Some(Diagnostic::error(codes::INACCESSIBLE, message, range));
    }
    enum_static_access(ctx, owner, index, range)
}

/// Enum constructors and instance initializers run before the enum's static fields are set,
/// so only constants may be read there.
fn enum_static_access(
    ctx: &FileContext<'_>,
    owner: ClassId,
    index: usize,
    range: TextRange,
) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let class = env.class(owner)?;
    let field = class.fields.get(index)?;
    if class.kind != ClassKind::Enum || !field.is_static {
        return None;
    }
    let in_instance_code = match ctx.enclosing_member()? {
        NodeId::Method(method) => {
            let method = &file.methods[method];
            method.is_constructor() && file.classes[method.owner].def == owner
        }
        NodeId::Initializer(init) => {
            let init = &file.initializers[init];
            !init.is_static() && file.classes[init.owner].def == owner
        }
        _ => false,
    };
    if !in_instance_code {
        return None;
    }
    let is_constant = field.is_final
        && !field.is_enum_constant
        && constant::field_decl(file, owner, index)
            .and_then(|var| file.vars[var].initializer)
            .is_some_and(|init| constant::is_constant(file, init));
    (!is_constant).then(|| {
        Diagnostic::error(
            codes::ILLEGAL_ENUM_STATIC_ACCESS,
            format!(
                "It is illegal to access static member '{}' from enum constructor or instance initializer",
                field.name
            ),
            range,
        )
    })
}

/// References to a parameter that is assigned somewhere in the file.
pub(crate) fn reassigned_parameter(ctx: &mut FileContext<'_>, id: ExprId) -> Option<Diagnostic> {
    if !ctx.config.report_reassigned_parameters {
        return None;
    }
    let file = ctx.file;
    let ExprKind::Name {
        name,
        resolution:
            Resolution {
                symbol: Some(Symbol::Local(var)),
                ..
            },
    } = &file.exprs[id].kind
    else {
        return None;
    };
    if !matches!(file.vars[*var].kind, VarKind::Parameter { .. }) || !ctx.is_reassigned(*var) {
        return None;
    }
    Some(Diagnostic::info(
        codes::REASSIGNED_PARAMETER,
        format!("Reassigned parameter '{name}'"),
        file.exprs[id].range,
    ))
}

/// `int x = {1, 2}` and similar initializers on variables.
pub(crate) fn variable_initializer(ctx: &FileContext<'_>, declared: &Type, init: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    if declared.is_errorish() {
        return None;
    }
    match file.exprs[file.skip_parens(init)].kind {
        ExprKind::ArrayInit(_) if !matches!(declared, Type::Array(_)) => Some(illegal_initializer(ctx, declared, init)),
        _ => check_assignable(ctx, declared, init),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::TypeStore;

    #[test]
    fn operator_tables() {
        let store = TypeStore::with_minimal_jdk();
        let int = Type::Primitive(PrimitiveType::Int);
        let boolean = Type::Primitive(PrimitiveType::Boolean);
        let double = Type::Primitive(PrimitiveType::Double);
        let string = Type::class(store.well_known().string, vec![]);
        let object = Type::class(store.well_known().object, vec![]);

        assert!(binary_applicable(&store, BinaryOp::Add, &string, &boolean));
        assert!(binary_applicable(&store, BinaryOp::Sub, &int, &double));
        assert!(!binary_applicable(&store, BinaryOp::Sub, &string, &int));
        assert!(!binary_applicable(&store, BinaryOp::Shl, &double, &int));
        assert!(binary_applicable(&store, BinaryOp::BitAnd, &boolean, &boolean));
        assert!(!binary_applicable(&store, BinaryOp::And, &int, &boolean));
        assert!(binary_applicable(&store, BinaryOp::Eq, &string, &object));
        assert!(binary_applicable(&store, BinaryOp::Eq, &string, &Type::Null));
        assert!(!binary_applicable(&store, BinaryOp::Eq, &int, &boolean));
        assert!(!unary_applicable(&store, UnaryOp::Not, &int));
        assert!(unary_applicable(&store, UnaryOp::Minus, &double));
    }
}
