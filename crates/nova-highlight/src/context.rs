//! Per-file state threaded through one highlighting pass.
//!
//! A [`FileContext`] is created fresh for every pass and dropped when the pass ends. Besides the
//! inputs it carries the traversal path and the cross-reference accumulators some rules need
//! (single-type imports seen so far, reported inheritance cycles, writes to final variables,
//! reassigned parameters).

use std::collections::{HashMap, HashSet};

use nova_config::HighlightingConfig;
use nova_core::{JavaLanguageLevel, LineIndex, TextRange};
use nova_hir::{
    ClassContainer, ClassDeclId, ExprId, ExprKind, JavaFile, MethodDeclId, Modifier, NodeId,
    Symbol, VarId, VarKind,
};
use nova_types::{ClassId, Type, TypeEnv};

use crate::model::ProgramModel;

/// A lexically enclosing class, seen from the current node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ClassFrame {
    pub decl: ClassDeclId,
    pub def: ClassId,
    /// An instance of this class is available at the current node.
    pub has_instance: bool,
}

/// A variable that can be written: a local (or parameter) or a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum VarKey {
    Local(VarId),
    Field(ClassId, usize),
}

pub(crate) struct FileContext<'a> {
    pub model: &'a dyn ProgramModel,
    pub env: &'a dyn TypeEnv,
    pub file: &'a JavaFile,
    pub level: JavaLanguageLevel,
    pub config: &'a HighlightingConfig,
    pub line_index: LineIndex,
    /// Ancestors of the node being checked, outermost first.
    pub path: Vec<NodeId>,
    /// Simple name to class for the single-type imports visited so far.
    pub single_imports: HashMap<String, ClassId>,
    /// Classes already reported as part of an inheritance cycle.
    pub reported_cycles: HashSet<ClassId>,
    /// Path to the first write of a final variable, per enclosing member.
    pub final_writes: HashMap<(NodeId, VarKey), Vec<NodeId>>,
    reassigned: Option<HashSet<VarId>>,
}

impl<'a> FileContext<'a> {
    pub fn new(
        model: &'a dyn ProgramModel,
        file: &'a JavaFile,
        config: &'a HighlightingConfig,
    ) -> Self {
        Self {
            model,
            env: model.env(),
            file,
            level: model.language_level(file).unwrap_or(config.language_level),
            config,
            line_index: LineIndex::new(&file.text),
            path: Vec::new(),
            single_imports: HashMap::new(),
            reported_cycles: HashSet::new(),
            final_writes: HashMap::new(),
            reassigned: None,
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.path.last().copied()
    }

    pub fn grandparent(&self) -> Option<NodeId> {
        self.path.len().checked_sub(2).map(|idx| self.path[idx])
    }

    /// The innermost class around the current node.
    pub fn enclosing_class(&self) -> Option<ClassDeclId> {
        self.path.iter().rev().find_map(|node| match node {
            NodeId::Class(id) => Some(*id),
            _ => None,
        })
    }

    pub fn current_class_def(&self) -> Option<ClassId> {
        self.enclosing_class().map(|id| self.file.classes[id].def)
    }

    /// The innermost member (method, initializer, field or enum constant) around the current
    /// node, without crossing a class boundary.
    pub fn enclosing_member(&self) -> Option<NodeId> {
        for node in self.path.iter().rev() {
            match *node {
                NodeId::Method(_) | NodeId::Initializer(_) | NodeId::EnumConstant(_) => {
                    return Some(*node)
                }
                NodeId::Var(id) if self.file.vars[id].is_field() => return Some(*node),
                NodeId::Class(_) => return None,
                _ => {}
            }
        }
        None
    }

    pub fn enclosing_method(&self) -> Option<MethodDeclId> {
        match self.enclosing_member() {
            Some(NodeId::Method(id)) => Some(id),
            _ => None,
        }
    }

    /// Enclosing classes, innermost first, with whether an instance of each is in scope.
    pub fn class_chain(&self) -> Vec<ClassFrame> {
        let file = self.file;
        let mut frames = Vec::new();
        let mut member_static = false;
        let mut blocked = false;
        for node in self.path.iter().rev() {
            match *node {
                NodeId::Method(id) => member_static |= file.methods[id].modifiers.has(Modifier::Static),
                NodeId::Initializer(id) => member_static |= file.initializers[id].is_static(),
                NodeId::Var(id) => {
                    let var = &file.vars[id];
                    if let VarKind::Field { owner, .. } = var.kind {
                        member_static |= var.modifiers.has(Modifier::Static)
                            || file.classes[owner].kind.is_interface();
                    }
                }
                NodeId::EnumConstant(_) => member_static = true,
                NodeId::Class(id) => {
                    let decl = &file.classes[id];
                    frames.push(ClassFrame {
                        decl: id,
                        def: decl.def,
                        has_instance: !blocked && !member_static && !decl.kind.is_interface(),
                    });
                    let nested_static = !matches!(
                        decl.container,
                        ClassContainer::Local | ClassContainer::Anonymous
                    ) && decl.is_static_context();
                    if member_static || nested_static {
                        blocked = true;
                    }
                    member_static = false;
                }
                _ => {}
            }
        }
        frames
    }

    /// The class under construction when the current node sits in the arguments of an explicit
    /// `this(...)` or `super(...)` call.
    pub fn constructor_prologue(&self) -> Option<ClassDeclId> {
        let mut inside = false;
        for node in self.path.iter().rev() {
            match *node {
                NodeId::Expr(id) => {
                    if matches!(self.file.exprs[id].kind, ExprKind::ConstructorCall { .. }) {
                        inside = true;
                    }
                }
                NodeId::Method(id) => {
                    let method = &self.file.methods[id];
                    return (inside && method.is_constructor()).then_some(method.owner);
                }
                NodeId::Class(_) | NodeId::Initializer(_) | NodeId::Var(_) => return None,
                _ => {}
            }
        }
        None
    }

    /// Whether parameter `var` is assigned anywhere in the file.
    pub fn is_reassigned(&mut self, var: VarId) -> bool {
        let file = self.file;
        self.reassigned
            .get_or_insert_with(|| {
                file.expr_ids()
                    .filter_map(|id| match &file.exprs[id].kind {
                        ExprKind::Assign { target, .. } => Some(*target),
                        ExprKind::Unary { op, operand, .. } if op.is_increment() => Some(*operand),
                        _ => None,
                    })
                    .filter_map(|target| match &file.exprs[file.skip_parens(target)].kind {
                        ExprKind::Name {
                            resolution, ..
                        } => match resolution.symbol {
                            Some(Symbol::Local(var))
                                if matches!(file.vars[var].kind, VarKind::Parameter { .. }) =>
                            {
                                Some(var)
                            }
                            _ => None,
                        },
                        _ => None,
                    })
                    .collect()
            })
            .contains(&var)
    }

    /// `def` parameterized by its own type variables, as `this` sees it.
    pub fn class_type(&self, def: ClassId) -> Type {
        let args = self
            .env
            .class(def)
            .map(|c| c.type_params.iter().map(|tp| Type::TypeVar(*tp)).collect())
            .unwrap_or_default();
        Type::class(def, args)
    }

    pub fn expr_type(&self, expr: ExprId) -> &Type {
        &self.file.exprs[self.file.skip_parens(expr)].ty
    }

    /// The symbol a (possibly parenthesized) name or field access resolved to.
    pub fn symbol(&self, expr: ExprId) -> Option<&Symbol> {
        match &self.file.exprs[self.file.skip_parens(expr)].kind {
            ExprKind::Name { resolution, .. } | ExprKind::FieldAccess { resolution, .. } => {
                resolution.symbol.as_ref()
            }
            _ => None,
        }
    }

    pub fn class_name(&self, def: ClassId) -> String {
        self.env
            .class(def)
            .map(|c| c.qualified_name())
            .unwrap_or_default()
    }

    pub fn text(&self, range: TextRange) -> &str {
        self.file.slice(range)
    }

    /// Whether diagnostics at `offset` render after the end of the line.
    pub fn at_line_end(&self, offset: nova_core::TextSize) -> bool {
        self.line_index.is_line_end(offset)
    }
}
