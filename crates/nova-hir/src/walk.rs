use crate::hir::*;
use crate::ids::*;

/// Any node of a [`JavaFile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    Import(ImportId),
    Class(ClassDeclId),
    Method(MethodDeclId),
    Var(VarId),
    Initializer(InitializerId),
    EnumConstant(EnumConstantId),
    TypeParam(TypeParamId),
    TypeRef(TypeRefId),
    Annotation(AnnotationId),
    Stmt(StmtId),
    Expr(ExprId),
}

impl JavaFile {
    /// Root nodes in source order: package annotations, imports, top-level types.
    pub fn roots(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        if let Some(package) = &self.package {
            out.extend(package.annotations.iter().map(|a| NodeId::Annotation(*a)));
        }
        out.extend(self.imports.iter().map(|i| NodeId::Import(*i)));
        out.extend(self.types.iter().map(|c| NodeId::Class(*c)));
        out
    }

    pub fn node_range(&self, node: NodeId) -> nova_core::TextRange {
        match node {
            NodeId::Import(id) => self.import_decls[id].range,
            NodeId::Class(id) => self.classes[id].range,
            NodeId::Method(id) => self.methods[id].range,
            NodeId::Var(id) => self.vars[id].range,
            NodeId::Initializer(id) => self.initializers[id].range,
            NodeId::EnumConstant(id) => self.enum_constants[id].range,
            NodeId::TypeParam(id) => self.type_params[id].range,
            NodeId::TypeRef(id) => self.type_refs[id].range,
            NodeId::Annotation(id) => self.annotations[id].range,
            NodeId::Stmt(id) => self.stmts[id].range,
            NodeId::Expr(id) => self.exprs[id].range,
        }
    }

    /// Direct children of `node` in source order.
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        match node {
            NodeId::Import(_) => {}
            NodeId::Class(id) => {
                let class = &self.classes[id];
                push_annotations(&mut out, &class.modifiers);
                out.extend(class.type_params.iter().map(|t| NodeId::TypeParam(*t)));
                out.extend(class.extends.iter().map(|t| NodeId::TypeRef(*t)));
                out.extend(class.implements.iter().map(|t| NodeId::TypeRef(*t)));
                out.extend(class.members.iter().map(|m| match *m {
                    Member::Field(v) => NodeId::Var(v),
                    Member::Method(m) => NodeId::Method(m),
                    Member::Class(c) => NodeId::Class(c),
                    Member::Initializer(i) => NodeId::Initializer(i),
                    Member::EnumConstant(e) => NodeId::EnumConstant(e),
                }));
            }
            NodeId::Method(id) => {
                let method = &self.methods[id];
                push_annotations(&mut out, &method.modifiers);
                out.extend(method.type_params.iter().map(|t| NodeId::TypeParam(*t)));
                out.extend(method.return_type.map(NodeId::TypeRef));
                out.extend(method.params.iter().map(|p| NodeId::Var(*p)));
                out.extend(method.throws.iter().map(|t| NodeId::TypeRef(*t)));
                out.extend(method.body.map(NodeId::Stmt));
                if let Some(value) = &method.default_value {
                    push_annotation_value(&mut out, value);
                }
            }
            NodeId::Var(id) => {
                let var = &self.vars[id];
                push_annotations(&mut out, &var.modifiers);
                out.push(NodeId::TypeRef(var.ty));
                out.extend(var.initializer.map(NodeId::Expr));
            }
            NodeId::Initializer(id) => out.push(NodeId::Stmt(self.initializers[id].body)),
            NodeId::EnumConstant(id) => {
                let constant = &self.enum_constants[id];
                out.extend(constant.annotations.iter().map(|a| NodeId::Annotation(*a)));
                out.extend(constant.args.iter().map(|a| NodeId::Expr(*a)));
                out.extend(constant.body.map(NodeId::Class));
            }
            NodeId::TypeParam(id) => {
                out.extend(self.type_params[id].bounds.iter().map(|b| NodeId::TypeRef(*b)));
            }
            NodeId::TypeRef(id) => match &self.type_refs[id].kind {
                TypeRefKind::Class { args, .. } => {
                    out.extend(args.iter().map(|a| NodeId::TypeRef(*a)));
                }
                TypeRefKind::Array(component) => out.push(NodeId::TypeRef(*component)),
                TypeRefKind::Wildcard(Some((_, bound))) => out.push(NodeId::TypeRef(*bound)),
                TypeRefKind::Wildcard(None) | TypeRefKind::Primitive(_) | TypeRefKind::Void => {}
            },
            NodeId::Annotation(id) => {
                for arg in &self.annotations[id].args {
                    push_annotation_value(&mut out, &arg.value);
                }
            }
            NodeId::Stmt(id) => self.stmt_children(id, &mut out),
            NodeId::Expr(id) => self.expr_children(id, &mut out),
        }
        out
    }

    fn stmt_children(&self, id: StmtId, out: &mut Vec<NodeId>) {
        let stmt = |s: &StmtId| NodeId::Stmt(*s);
        let expr = |e: &ExprId| NodeId::Expr(*e);
        match &self.stmts[id].kind {
            StmtKind::Block(stmts) => out.extend(stmts.iter().map(stmt)),
            StmtKind::LocalVars(vars) => out.extend(vars.iter().map(|v| NodeId::Var(*v))),
            StmtKind::LocalClass(class) => out.push(NodeId::Class(*class)),
            StmtKind::Expr(e) | StmtKind::Throw(e) => out.push(expr(e)),
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                out.push(expr(condition));
                out.push(stmt(then_branch));
                out.extend(else_branch.iter().map(stmt));
            }
            StmtKind::While { condition, body } => {
                out.push(expr(condition));
                out.push(stmt(body));
            }
            StmtKind::DoWhile { body, condition } => {
                out.push(stmt(body));
                out.push(expr(condition));
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                out.extend(init.iter().map(stmt));
                out.extend(condition.iter().map(expr));
                out.extend(update.iter().map(expr));
                out.push(stmt(body));
            }
            StmtKind::Foreach {
                param,
                iterable,
                body,
            } => {
                out.push(NodeId::Var(*param));
                out.push(expr(iterable));
                out.push(stmt(body));
            }
            StmtKind::Switch { selector, body } => {
                out.push(expr(selector));
                out.extend(body.iter().map(stmt));
            }
            StmtKind::Case { value, .. } => out.extend(value.iter().map(expr)),
            StmtKind::Labeled { body, .. } => out.extend(body.iter().map(stmt)),
            StmtKind::Return(value) => out.extend(value.iter().map(expr)),
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                out.push(stmt(body));
                for catch in catches {
                    out.push(NodeId::Var(catch.param));
                    out.push(stmt(&catch.body));
                }
                out.extend(finally.iter().map(stmt));
            }
            StmtKind::Synchronized { lock, body } => {
                out.push(expr(lock));
                out.push(stmt(body));
            }
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => {}
        }
    }

    fn expr_children(&self, id: ExprId, out: &mut Vec<NodeId>) {
        let expr = |e: &ExprId| NodeId::Expr(*e);
        match &self.exprs[id].kind {
            ExprKind::Literal(_) | ExprKind::Name { .. } => {}
            ExprKind::FieldAccess { qualifier, .. } => out.push(expr(qualifier)),
            ExprKind::MethodCall {
                qualifier, args, ..
            } => {
                out.extend(qualifier.iter().map(expr));
                out.extend(args.iter().map(expr));
            }
            ExprKind::ConstructorCall {
                qualifier, args, ..
            } => {
                out.extend(qualifier.iter().map(expr));
                out.extend(args.iter().map(expr));
            }
            ExprKind::New {
                qualifier,
                class,
                args,
                anonymous,
                ..
            } => {
                out.extend(qualifier.iter().map(expr));
                out.push(NodeId::TypeRef(*class));
                out.extend(args.iter().map(expr));
                out.extend(anonymous.map(NodeId::Class));
            }
            ExprKind::NewArray {
                element,
                dims,
                init,
                ..
            } => {
                out.push(NodeId::TypeRef(*element));
                out.extend(dims.iter().map(expr));
                out.extend(init.iter().map(expr));
            }
            ExprKind::ArrayInit(elements) => out.extend(elements.iter().map(expr)),
            ExprKind::Assign { target, value, .. } => {
                out.push(expr(target));
                out.push(expr(value));
            }
            ExprKind::Binary { lhs, rhs, .. } => {
                out.push(expr(lhs));
                out.push(expr(rhs));
            }
            ExprKind::Unary { operand, .. } => out.push(expr(operand)),
            ExprKind::Cast { ty, expr: inner } => {
                out.push(NodeId::TypeRef(*ty));
                out.push(expr(inner));
            }
            ExprKind::InstanceOf { expr: inner, ty } => {
                out.push(expr(inner));
                out.push(NodeId::TypeRef(*ty));
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                out.push(expr(condition));
                out.push(expr(then_expr));
                out.push(expr(else_expr));
            }
            ExprKind::ArrayAccess { array, index } => {
                out.push(expr(array));
                out.push(expr(index));
            }
            ExprKind::This(q) | ExprKind::Super(q) => out.extend(q.map(NodeId::TypeRef)),
            ExprKind::ClassLiteral(ty) => out.push(NodeId::TypeRef(*ty)),
            ExprKind::Paren(inner) => out.push(expr(inner)),
        }
    }
}

fn push_annotations(out: &mut Vec<NodeId>, modifiers: &ModifierList) {
    out.extend(modifiers.annotations.iter().map(|a| NodeId::Annotation(*a)));
}

fn push_annotation_value(out: &mut Vec<NodeId>, value: &AnnotationValue) {
    match value {
        AnnotationValue::Expr(e) => out.push(NodeId::Expr(*e)),
        AnnotationValue::Annotation(a) => out.push(NodeId::Annotation(*a)),
        AnnotationValue::Array { elements, .. } => {
            for element in elements {
                push_annotation_value(out, element);
            }
        }
    }
}
