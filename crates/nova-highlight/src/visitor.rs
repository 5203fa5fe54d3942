//! The traversal engine.
//!
//! One pre-order walk over the file in source order. At every node the applicable checks run in a
//! fixed order, split into groups: inside a group, checks after the first one that records an
//! error are skipped. Annotations are the exception and always run every check once the
//! annotation itself resolves.

use nova_hir::{AnnotationId, ClassDeclId, ExprId, ExprKind, MethodDeclId, NodeId, StmtId, StmtKind};

use crate::calls::{check_call, enum_constant_site};
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, Severity};
use crate::error::{HighlightError, Result};
use crate::holder::HighlightHolder;
use crate::rules::{
    annotations, classes, exceptions, expressions, generics, imports, methods, modifiers, statements,
    unresolved_type, variables,
};

/// Runs each check in turn until one of them records an error.
macro_rules! group {
    ($visitor:ident, $($check:expr),+ $(,)?) => {{
        let errors = $visitor.holder.error_count();
        $(
            if $visitor.holder.error_count() == errors {
                let found = $check;
                $visitor.emit(found)?;
            }
        )+
    }};
}

pub(crate) struct Visitor<'a, 'h> {
    ctx: FileContext<'a>,
    holder: &'h mut HighlightHolder,
}

impl<'a, 'h> Visitor<'a, 'h> {
    pub fn new(ctx: FileContext<'a>, holder: &'h mut HighlightHolder) -> Self {
        Self { ctx, holder }
    }

    pub fn run(mut self) -> Result<()> {
        for root in self.ctx.file.roots() {
            self.visit(root)?;
        }
        Ok(())
    }

    fn emit(&mut self, found: impl IntoIterator<Item = Diagnostic>) -> Result<()> {
        for diagnostic in found {
            if diagnostic.severity == Severity::UncheckedWarning && !self.ctx.config.report_unchecked {
                continue;
            }
            self.holder.add(Some(diagnostic))?;
        }
        Ok(())
    }

    fn poll_cancelled(&self) -> Result<()> {
        if self.ctx.model.is_cancelled() {
            return Err(HighlightError::Cancelled);
        }
        Ok(())
    }

    fn visit(&mut self, node: NodeId) -> Result<()> {
        self.check(node)?;
        self.ctx.path.push(node);
        let result = self
            .ctx
            .file
            .children(node)
            .into_iter()
            .try_for_each(|child| self.visit(child));
        self.ctx.path.pop();
        result
    }

    fn check(&mut self, node: NodeId) -> Result<()> {
        match node {
            NodeId::Import(id) => {
                tracing::trace!(target: "nova.highlight", family = "imports", ?id);
                group!(
                    self,
                    imports::static_import_level(&self.ctx, id),
                    imports::resolution(&self.ctx, id),
                    imports::single_type_conflict(&mut self.ctx, id),
                );
            }
            NodeId::Class(id) => {
                self.poll_cancelled()?;
                self.check_class(id)?;
            }
            NodeId::Method(id) => {
                self.poll_cancelled()?;
                self.check_method(id)?;
            }
            NodeId::Var(id) => {
                tracing::trace!(target: "nova.highlight", family = "variables", ?id);
                group!(
                    self,
                    modifiers::check_var(&self.ctx, id),
                    classes::inner_static_declaration(&self.ctx, node),
                    variables::duplicate(&self.ctx, id),
                    variables::initializer(&self.ctx, id),
                );
            }
            NodeId::Initializer(id) => {
                group!(
                    self,
                    modifiers::check_initializer(&self.ctx, id),
                    classes::inner_static_declaration(&self.ctx, node),
                );
            }
            NodeId::EnumConstant(id) => {
                let range = self.ctx.file.enum_constants[id].name_range;
                group!(
                    self,
                    enum_constant_site(&self.ctx, id).and_then(|site| check_call(&self.ctx, &site)),
                    exceptions::unhandled_at(&self.ctx, node, range),
                );
            }
            NodeId::TypeParam(id) => {
                tracing::trace!(target: "nova.highlight", family = "generics", ?id);
                group!(
                    self,
                    generics::type_parameter_level(&self.ctx, id),
                    generics::duplicate_type_parameter(&self.ctx, id),
                );
            }
            NodeId::TypeRef(id) => {
                group!(
                    self,
                    unresolved_type(&self.ctx, id),
                    generics::type_arguments_level(&self.ctx, id),
                    generics::wildcard_placement(&self.ctx, id),
                    generics::type_arguments(&self.ctx, id),
                );
            }
            NodeId::Annotation(id) => self.check_annotation(id)?,
            NodeId::Stmt(id) => self.check_stmt(id)?,
            NodeId::Expr(id) => self.check_expr(id)?,
        }
        Ok(())
    }

    fn check_class(&mut self, id: ClassDeclId) -> Result<()> {
        tracing::trace!(target: "nova.highlight", family = "classes", ?id);
        let file = self.ctx.file;
        let decl = &file.classes[id];
        if self.ctx.env.class(decl.def).is_none() {
            return Err(HighlightError::MissingDeclaration {
                what: format!("class '{}'", decl.name),
            });
        }
        group!(
            self,
            classes::language_level(&self.ctx, id),
            classes::local_enum(&self.ctx, id),
            generics::class_type_parameters(&self.ctx, id),
            modifiers::check_class(&self.ctx, id),
            classes::inner_static_declaration(&self.ctx, NodeId::Class(id)),
            classes::public_class_file_name(&self.ctx, id),
            classes::duplicate_class(&self.ctx, id),
        );
        let cycle = classes::cyclic_inheritance(&mut self.ctx, id);
        self.emit(cycle)?;
        if !classes::in_reported_cycle(&self.ctx, id) {
            group!(
                self,
                classes::supertype_lists(&self.ctx, id),
                classes::inconsistent_inheritance(&self.ctx, id),
                classes::unrelated_return_types(&self.ctx, id),
                classes::abstract_methods_implemented(&self.ctx, id),
                classes::default_constructor(&self.ctx, id),
            );
        }
        let uninitialized = expressions::uninitialized_finals(&self.ctx, id);
        self.emit(uninitialized)
    }

    fn check_method(&mut self, id: MethodDeclId) -> Result<()> {
        tracing::trace!(target: "nova.highlight", family = "methods", ?id);
        group!(
            self,
            modifiers::check_method(&self.ctx, id),
            classes::inner_static_declaration(&self.ctx, NodeId::Method(id)),
            methods::varargs_level(&self.ctx, id),
            methods::vararg_not_last(&self.ctx, id),
            methods::return_type_required(&self.ctx, id),
            methods::annotation_member_parameters(&self.ctx, id),
            methods::body(&self.ctx, id),
            methods::abstract_in_concrete_class(&self.ctx, id),
            methods::duplicate_method(&self.ctx, id),
            methods::inherited_erasure_clash(&self.ctx, id),
        );
        group!(
            self,
            methods::overrides(&self.ctx, id),
            methods::override_annotation(&self.ctx, id),
        );
        if self.ctx.file.methods[id].is_constructor() {
            group!(
                self,
                methods::recursive_constructor(&self.ctx, id),
                methods::implicit_super_call(&self.ctx, id),
            );
        }
        Ok(())
    }

    fn check_annotation(&mut self, id: AnnotationId) -> Result<()> {
        tracing::trace!(target: "nova.highlight", family = "annotations", ?id);
        if let Some(problem) = annotations::resolution(&self.ctx, id) {
            return self.emit(Some(problem));
        }
        let values = annotations::attribute_values(&self.ctx, id)?;
        self.emit(values)?;
        let missing = annotations::missing_attributes(&self.ctx, id);
        self.emit(missing)?;
        let applicability = annotations::applicability(&self.ctx, id);
        self.emit(applicability)?;
        let duplicate = annotations::duplicate(&self.ctx, id);
        self.emit(duplicate)?;
        let repeated = annotations::repeated_target(&self.ctx, id);
        self.emit(repeated)
    }

    fn check_stmt(&mut self, id: StmtId) -> Result<()> {
        tracing::trace!(target: "nova.highlight", family = "statements", ?id);
        let file = self.ctx.file;
        let stmt = &file.stmts[id];
        let range = stmt.range;
        match stmt.kind {
            StmtKind::Expr(_) => group!(self, statements::expression_statement(&self.ctx, id)),
            StmtKind::If { .. } | StmtKind::While { .. } | StmtKind::DoWhile { .. } | StmtKind::For { .. } => {
                group!(self, statements::condition(&self.ctx, id))
            }
            StmtKind::Foreach { .. } => group!(
                self,
                generics::foreach_level(&self.ctx, id),
                statements::foreach(&self.ctx, id),
            ),
            StmtKind::Switch { .. } => group!(
                self,
                statements::switch_selector(&self.ctx, id),
                statements::duplicate_labels(&self.ctx, id),
            ),
            StmtKind::Case { .. } => group!(
                self,
                statements::case_label(&self.ctx, id),
                statements::case_colon(&self.ctx, id),
            ),
            StmtKind::Break(_) | StmtKind::Continue(_) => group!(self, statements::jump(&self.ctx, id)),
            StmtKind::Labeled { .. } => group!(self, statements::labeled(&self.ctx, id)),
            StmtKind::Return(_) => group!(self, statements::return_statement(&self.ctx, id)),
            StmtKind::Throw(_) => group!(
                self,
                statements::throw_statement(&self.ctx, id),
                exceptions::unhandled_at(&self.ctx, NodeId::Stmt(id), range),
            ),
            StmtKind::Try { .. } => group!(self, exceptions::catch_clauses(&self.ctx, id)),
            StmtKind::Block(_)
            | StmtKind::LocalVars(_)
            | StmtKind::LocalClass(_)
            | StmtKind::Synchronized { .. }
            | StmtKind::Empty => {}
        }
        Ok(())
    }

    fn check_expr(&mut self, id: ExprId) -> Result<()> {
        let file = self.ctx.file;
        let expr = &file.exprs[id];
        let range = expr.range;
        let node = NodeId::Expr(id);
        match expr.kind {
            ExprKind::Name { .. } | ExprKind::FieldAccess { .. } => group!(
                self,
                expressions::reference(&self.ctx, id),
                expressions::reassigned_parameter(&mut self.ctx, id),
            ),
            ExprKind::MethodCall { .. } => group!(
                self,
                expressions::call(&self.ctx, id),
                exceptions::unhandled_at(&self.ctx, node, range),
            ),
            ExprKind::New { .. } => group!(
                self,
                generics::type_parameter_instantiation(&self.ctx, id),
                expressions::instantiation(&self.ctx, id),
                classes::new_enclosing_instance(&self.ctx, id),
                expressions::call(&self.ctx, id),
                exceptions::unhandled_at(&self.ctx, node, range),
            ),
            ExprKind::ConstructorCall { .. } => group!(
                self,
                methods::constructor_call_placement(&self.ctx, id),
                classes::super_enclosing_instance(&self.ctx, id),
                expressions::call(&self.ctx, id),
                exceptions::unhandled_at(&self.ctx, node, range),
            ),
            ExprKind::NewArray { .. } => group!(self, generics::generic_array_creation(&self.ctx, id)),
            ExprKind::ArrayInit(_) => group!(self, expressions::array_initializer(&self.ctx, id)),
            ExprKind::Assign { .. } => group!(
                self,
                expressions::variable_expected(&self.ctx, id),
                expressions::final_assignment(&mut self.ctx, id),
                expressions::operator(&self.ctx, id),
                expressions::assignment_type(&self.ctx, id),
            ),
            ExprKind::Unary { .. } => group!(
                self,
                expressions::variable_expected(&self.ctx, id),
                expressions::final_assignment(&mut self.ctx, id),
                expressions::operator(&self.ctx, id),
            ),
            ExprKind::Binary { .. } => group!(self, expressions::operator(&self.ctx, id)),
            ExprKind::Cast { .. } => group!(self, expressions::cast(&self.ctx, id)),
            ExprKind::InstanceOf { .. } => group!(
                self,
                generics::generic_instanceof(&self.ctx, id),
                expressions::cast(&self.ctx, id),
            ),
            ExprKind::Conditional { .. } => group!(self, expressions::conditional(&self.ctx, id)),
            ExprKind::ArrayAccess { .. } => group!(self, expressions::array_access(&self.ctx, id)),
            ExprKind::This(_) | ExprKind::Super(_) => group!(self, classes::this_reference(&self.ctx, id)),
            ExprKind::Literal(_) | ExprKind::ClassLiteral(_) | ExprKind::Paren(_) => {}
        }
        Ok(())
    }
}
