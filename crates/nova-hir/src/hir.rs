//! The resolved program tree.
//!
//! Nodes live in per-kind arenas on [`JavaFile`] and reference each other by typed ids. Every node
//! carries its source range; resolved facts (types, resolution results, registered class ids) are
//! stored inline so rules never need to re-resolve.

use nova_core::TextRange;
use nova_types::{ClassId, ClassKind, PrimitiveType, Substitutor, Type, TypeVarId};

use crate::ids::*;

#[derive(Debug, Clone, PartialEq)]
pub struct JavaFile {
    pub file_name: String,
    pub text: String,
    pub package: Option<PackageDecl>,
    pub imports: Vec<ImportId>,
    /// Top-level type declarations in source order.
    pub types: Vec<ClassDeclId>,

    pub classes: Arena<ClassDecl>,
    pub methods: Arena<MethodDecl>,
    pub vars: Arena<VarDecl>,
    pub initializers: Arena<InitializerDecl>,
    pub enum_constants: Arena<EnumConstantDecl>,
    pub type_params: Arena<TypeParamDecl>,
    pub type_refs: Arena<TypeRef>,
    pub annotations: Arena<Annotation>,
    pub import_decls: Arena<ImportDecl>,
    pub stmts: Arena<Stmt>,
    pub exprs: Arena<Expr>,
}

impl JavaFile {
    pub fn new(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            text: text.into(),
            package: None,
            imports: Vec::new(),
            types: Vec::new(),
            classes: Arena::default(),
            methods: Arena::default(),
            vars: Arena::default(),
            initializers: Arena::default(),
            enum_constants: Arena::default(),
            type_params: Arena::default(),
            type_refs: Arena::default(),
            annotations: Arena::default(),
            import_decls: Arena::default(),
            stmts: Arena::default(),
            exprs: Arena::default(),
        }
    }

    pub fn package_name(&self) -> &str {
        self.package.as_ref().map_or("", |p| p.name.as_str())
    }

    /// Source text covered by `range`.
    pub fn slice(&self, range: TextRange) -> &str {
        &self.text[range]
    }

    /// The file name without directories and extension (`Foo` for `src/p/Foo.java`).
    pub fn file_stem(&self) -> &str {
        let name = self
            .file_name
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.file_name.as_str());
        name.strip_suffix(".java").unwrap_or(name)
    }

    pub fn class_ids(&self) -> impl Iterator<Item = ClassDeclId> + '_ {
        self.classes.iter().map(|(idx, _)| ClassDeclId::from_raw(idx))
    }

    pub fn method_ids(&self) -> impl Iterator<Item = MethodDeclId> + '_ {
        self.methods.iter().map(|(idx, _)| MethodDeclId::from_raw(idx))
    }

    pub fn expr_ids(&self) -> impl Iterator<Item = ExprId> + '_ {
        self.exprs.iter().map(|(idx, _)| ExprId::from_raw(idx))
    }

    /// The declaration registered under `def`, if it was declared in this file.
    pub fn class_decl(&self, def: ClassId) -> Option<ClassDeclId> {
        self.classes
            .iter()
            .find(|(_, decl)| decl.def == def)
            .map(|(idx, _)| ClassDeclId::from_raw(idx))
    }

    /// Strip parentheses around an expression.
    pub fn skip_parens(&self, mut expr: ExprId) -> ExprId {
        while let ExprKind::Paren(inner) = self.exprs[expr].kind {
            expr = inner;
        }
        expr
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PackageDecl {
    pub name: String,
    pub range: TextRange,
    pub annotations: Vec<AnnotationId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportDecl {
    /// Dotted path without the trailing `.*`.
    pub path: String,
    pub path_range: TextRange,
    pub range: TextRange,
    pub is_static: bool,
    pub is_on_demand: bool,
    pub resolved: Option<ImportTarget>,
}

impl ImportDecl {
    /// Last path segment (the imported simple name for single-type imports).
    pub fn simple_name(&self) -> &str {
        self.path.rsplit('.').next().unwrap_or(self.path.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportTarget {
    Class(ClassId),
    Package(String),
    /// `import static p.A.m;`: `exists` records whether `A` declares a static member `m`.
    StaticMember { owner: ClassId, name: String, exists: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
}

impl Modifier {
    pub const ALL: [Modifier; 11] = [
        Modifier::Public,
        Modifier::Protected,
        Modifier::Private,
        Modifier::Static,
        Modifier::Abstract,
        Modifier::Final,
        Modifier::Native,
        Modifier::Synchronized,
        Modifier::Transient,
        Modifier::Volatile,
        Modifier::Strictfp,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Protected => "protected",
            Modifier::Private => "private",
            Modifier::Static => "static",
            Modifier::Abstract => "abstract",
            Modifier::Final => "final",
            Modifier::Native => "native",
            Modifier::Synchronized => "synchronized",
            Modifier::Transient => "transient",
            Modifier::Volatile => "volatile",
            Modifier::Strictfp => "strictfp",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.keyword() == keyword)
    }

    #[inline]
    pub fn is_access(self) -> bool {
        matches!(self, Modifier::Public | Modifier::Protected | Modifier::Private)
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModifierList {
    pub range: TextRange,
    /// Keywords in source order, repeats included.
    pub keywords: Vec<(Modifier, TextRange)>,
    pub annotations: Vec<AnnotationId>,
}

impl ModifierList {
    pub fn has(&self, modifier: Modifier) -> bool {
        self.keywords.iter().any(|(m, _)| *m == modifier)
    }

    pub fn range_of(&self, modifier: Modifier) -> Option<TextRange> {
        self.keywords
            .iter()
            .find(|(m, _)| *m == modifier)
            .map(|(_, r)| *r)
    }

    pub fn visibility(&self) -> Option<nova_types::Visibility> {
        use nova_types::Visibility;
        self.keywords.iter().find_map(|(m, _)| match m {
            Modifier::Public => Some(Visibility::Public),
            Modifier::Protected => Some(Visibility::Protected),
            Modifier::Private => Some(Visibility::Private),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassContainer {
    TopLevel,
    Member,
    Local,
    Anonymous,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassDecl {
    /// Empty for anonymous classes.
    pub name: String,
    pub name_range: TextRange,
    pub range: TextRange,
    pub kind: ClassKind,
    pub container: ClassContainer,
    pub modifiers: ModifierList,
    pub type_params: Vec<TypeParamId>,
    pub extends: Vec<TypeRefId>,
    pub implements: Vec<TypeRefId>,
    /// For anonymous classes: the instantiated class or interface.
    pub anonymous_base: Option<TypeRefId>,
    pub members: Vec<Member>,
    /// Lexically enclosing class.
    pub parent: Option<ClassDeclId>,
    /// For local classes: the method the class is declared in, if any.
    pub enclosing_method: Option<MethodDeclId>,
    pub def: ClassId,
}

impl ClassDecl {
    pub fn is_static_context(&self) -> bool {
        self.modifiers.has(Modifier::Static)
            || self.kind != ClassKind::Class
            || self.container == ClassContainer::TopLevel
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Field(VarId),
    Method(MethodDeclId),
    Class(ClassDeclId),
    Initializer(InitializerId),
    EnumConstant(EnumConstantId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodSlot {
    Method(usize),
    Constructor(usize),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub name_range: TextRange,
    pub range: TextRange,
    pub modifiers: ModifierList,
    pub type_params: Vec<TypeParamId>,
    /// `None` for constructors (and for malformed methods missing their return type).
    pub return_type: Option<TypeRefId>,
    pub params: Vec<VarId>,
    pub param_list_range: TextRange,
    pub throws: Vec<TypeRefId>,
    /// The body block, absent for `;`-terminated declarations.
    pub body: Option<StmtId>,
    /// Annotation type elements: the `default` value.
    pub default_value: Option<AnnotationValue>,
    pub owner: ClassDeclId,
    pub slot: MethodSlot,
}

impl MethodDecl {
    #[inline]
    pub fn is_constructor(&self) -> bool {
        matches!(self.slot, MethodSlot::Constructor(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Field { owner: ClassDeclId, index: usize },
    Local,
    Parameter { method: MethodDeclId },
    CatchParameter,
    ForeachParameter,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: String,
    pub name_range: TextRange,
    pub range: TextRange,
    pub kind: VarKind,
    pub modifiers: ModifierList,
    pub ty: TypeRefId,
    pub initializer: Option<ExprId>,
    /// `String... args`
    pub is_varargs: bool,
}

impl VarDecl {
    #[inline]
    pub fn is_field(&self) -> bool {
        matches!(self.kind, VarKind::Field { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InitializerDecl {
    pub range: TextRange,
    pub modifiers: ModifierList,
    pub body: StmtId,
    pub owner: ClassDeclId,
}

impl InitializerDecl {
    #[inline]
    pub fn is_static(&self) -> bool {
        self.modifiers.has(Modifier::Static)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstantDecl {
    pub name: String,
    pub name_range: TextRange,
    pub range: TextRange,
    pub annotations: Vec<AnnotationId>,
    pub args: Vec<ExprId>,
    pub arg_list_range: Option<TextRange>,
    pub body: Option<ClassDeclId>,
    pub owner: ClassDeclId,
    /// Index of the backing field in the owner's `ClassDef::fields`.
    pub field_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeParamDecl {
    pub name: String,
    pub name_range: TextRange,
    pub range: TextRange,
    pub bounds: Vec<TypeRefId>,
    pub def: TypeVarId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WildcardKind {
    Extends,
    Super,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeRefTarget {
    Class(ClassId),
    TypeParam(TypeVarId),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TypeRefKind {
    Primitive(PrimitiveType),
    Void,
    Class {
        /// The written name, possibly qualified (`java.util.List`, `Outer.Inner`).
        name: String,
        name_range: TextRange,
        args: Vec<TypeRefId>,
        /// Range of `<...>` when written.
        arg_list_range: Option<TextRange>,
        resolved: Option<TypeRefTarget>,
    },
    Array(TypeRefId),
    Wildcard(Option<(WildcardKind, TypeRefId)>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub range: TextRange,
    /// The type this reference denotes; `Unknown` when unresolved.
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// As written, without `@`.
    pub name: String,
    pub name_range: TextRange,
    pub range: TextRange,
    pub args: Vec<AnnotationArg>,
    pub resolved: Option<ClassId>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationArg {
    /// `None` for the shorthand `@A(x)` form.
    pub name: Option<String>,
    pub name_range: Option<TextRange>,
    pub range: TextRange,
    pub value: AnnotationValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationValue {
    Expr(ExprId),
    Annotation(AnnotationId),
    Array {
        range: TextRange,
        elements: Vec<AnnotationValue>,
    },
}

impl AnnotationValue {
    pub fn range(&self, file: &JavaFile) -> TextRange {
        match self {
            AnnotationValue::Expr(expr) => file.exprs[*expr].range,
            AnnotationValue::Annotation(ann) => file.annotations[*ann].range,
            AnnotationValue::Array { range, .. } => *range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub param: VarId,
    pub body: StmtId,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub name: String,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    LocalVars(Vec<VarId>),
    LocalClass(ClassDeclId),
    Expr(ExprId),
    If {
        condition: ExprId,
        then_branch: StmtId,
        else_branch: Option<StmtId>,
    },
    While {
        condition: ExprId,
        body: StmtId,
    },
    DoWhile {
        body: StmtId,
        condition: ExprId,
    },
    For {
        init: Vec<StmtId>,
        condition: Option<ExprId>,
        update: Vec<ExprId>,
        body: StmtId,
    },
    Foreach {
        param: VarId,
        iterable: ExprId,
        body: StmtId,
    },
    Switch {
        selector: ExprId,
        body: Vec<StmtId>,
    },
    /// `case v:` or `default:` (when `value` is `None`).
    Case {
        value: Option<ExprId>,
        has_colon: bool,
    },
    Break(Option<Label>),
    Continue(Option<Label>),
    Labeled {
        label: Label,
        body: Option<StmtId>,
    },
    Return(Option<ExprId>),
    Throw(ExprId),
    Try {
        body: StmtId,
        catches: Vec<CatchClause>,
        finally: Option<StmtId>,
    },
    Synchronized {
        lock: ExprId,
        body: StmtId,
    },
    Empty,
}

impl StmtKind {
    #[inline]
    pub fn is_loop(&self) -> bool {
        matches!(
            self,
            StmtKind::While { .. }
                | StmtKind::DoWhile { .. }
                | StmtKind::For { .. }
                | StmtKind::Foreach { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Char(char),
    String(String),
    Boolean(bool),
    Null,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    And,
    Or,
}

impl BinaryOp {
    pub const ALL: [BinaryOp; 19] = [
        BinaryOp::Add,
        BinaryOp::Sub,
        BinaryOp::Mul,
        BinaryOp::Div,
        BinaryOp::Rem,
        BinaryOp::Shl,
        BinaryOp::Shr,
        BinaryOp::UShr,
        BinaryOp::Lt,
        BinaryOp::Gt,
        BinaryOp::Le,
        BinaryOp::Ge,
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::BitAnd,
        BinaryOp::BitOr,
        BinaryOp::BitXor,
        BinaryOp::And,
        BinaryOp::Or,
    ];

    pub fn text(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Shl => "<<",
            BinaryOp::Shr => ">>",
            BinaryOp::UShr => ">>>",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::Le => "<=",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::BitAnd => "&",
            BinaryOp::BitOr => "|",
            BinaryOp::BitXor => "^",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }

    pub fn from_text(text: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.text() == text)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    BitNot,
    Not,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn text(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Minus => "-",
            UnaryOp::BitNot => "~",
            UnaryOp::Not => "!",
            UnaryOp::PreInc | UnaryOp::PostInc => "++",
            UnaryOp::PreDec | UnaryOp::PostDec => "--",
        }
    }

    #[inline]
    pub fn is_increment(self) -> bool {
        matches!(
            self,
            UnaryOp::PreInc | UnaryOp::PreDec | UnaryOp::PostInc | UnaryOp::PostDec
        )
    }
}

/// `=` or a compound assignment (`+=` carries `Some(BinaryOp::Add)`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssignOp(pub Option<BinaryOp>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorCallKind {
    This,
    Super,
}

impl ConstructorCallKind {
    pub fn keyword(self) -> &'static str {
        match self {
            ConstructorCallKind::This => "this",
            ConstructorCallKind::Super => "super",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Symbol {
    Local(VarId),
    Field { owner: ClassId, index: usize },
    Class(ClassId),
    TypeParam(TypeVarId),
    Package(String),
}

/// Outcome of resolving a name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub symbol: Option<Symbol>,
    /// Type-parameter substitution active at the reference (e.g. the qualifier's arguments).
    pub substitutor: Substitutor,
    pub is_valid: bool,
    pub is_accessible: bool,
    pub is_static_context_ok: bool,
}

impl Resolution {
    pub fn unresolved() -> Self {
        Self {
            symbol: None,
            substitutor: Substitutor::empty(),
            is_valid: false,
            is_accessible: true,
            is_static_context_ok: true,
        }
    }

    pub fn resolved(symbol: Symbol) -> Self {
        Self {
            symbol: Some(symbol),
            substitutor: Substitutor::empty(),
            is_valid: true,
            is_accessible: true,
            is_static_context_ok: true,
        }
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::unresolved()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub range: TextRange,
    /// Computed type; `Unknown` when it could not be determined.
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Name {
        name: String,
        resolution: Resolution,
    },
    FieldAccess {
        qualifier: ExprId,
        name: String,
        name_range: TextRange,
        resolution: Resolution,
    },
    MethodCall {
        qualifier: Option<ExprId>,
        name: String,
        name_range: TextRange,
        args: Vec<ExprId>,
        arg_list_range: TextRange,
    },
    /// `this(...)` / `super(...)` inside a constructor.
    ConstructorCall {
        kind: ConstructorCallKind,
        qualifier: Option<ExprId>,
        args: Vec<ExprId>,
        arg_list_range: TextRange,
    },
    New {
        qualifier: Option<ExprId>,
        class: TypeRefId,
        args: Vec<ExprId>,
        arg_list_range: TextRange,
        anonymous: Option<ClassDeclId>,
    },
    NewArray {
        element: TypeRefId,
        dims: Vec<ExprId>,
        /// Dimensions written without a size (`new int[3][]` has one).
        extra_dims: usize,
        init: Option<ExprId>,
    },
    ArrayInit(Vec<ExprId>),
    Assign {
        op: AssignOp,
        op_range: TextRange,
        target: ExprId,
        value: ExprId,
    },
    Binary {
        op: BinaryOp,
        op_range: TextRange,
        lhs: ExprId,
        rhs: ExprId,
    },
    Unary {
        op: UnaryOp,
        op_range: TextRange,
        operand: ExprId,
    },
    Cast {
        ty: TypeRefId,
        expr: ExprId,
    },
    InstanceOf {
        expr: ExprId,
        ty: TypeRefId,
    },
    Conditional {
        condition: ExprId,
        then_expr: ExprId,
        else_expr: ExprId,
    },
    ArrayAccess {
        array: ExprId,
        index: ExprId,
    },
    This(Option<TypeRefId>),
    Super(Option<TypeRefId>),
    ClassLiteral(TypeRefId),
    Paren(ExprId),
}
