//! Java type model shared by the highlighting crates.
//!
//! The model is deliberately "resolved": classes, methods and type variables are interned in a
//! [`TypeStore`] and referenced by id. Checks query it through the [`TypeEnv`] trait so hosts can
//! layer their own environments on top of a store.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

pub mod java;
mod jdk;
mod subtyping;

pub use java::format::{format_type, presentable_type};
pub use java::helpers::{
    direct_supertypes, find_field, find_member_class, instantiate_as_supertype, is_accessible,
    is_inheritor, outermost_class, supertype_substitutor,
};
pub use subtyping::{
    binary_numeric_promotion, boxed_type, is_assignable, is_castable, is_subtype,
    is_unchecked_exception, unary_numeric_promotion, unboxed_type,
};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u32);

impl ClassId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        ClassId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassId({})", self.0)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVarId(u32);

impl TypeVarId {
    pub(crate) fn from_raw(raw: u32) -> Self {
        TypeVarId(raw)
    }

    #[must_use]
    pub fn idx(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for TypeVarId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeVarId({})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveType {
    pub const ALL: [PrimitiveType; 8] = [
        PrimitiveType::Boolean,
        PrimitiveType::Byte,
        PrimitiveType::Short,
        PrimitiveType::Char,
        PrimitiveType::Int,
        PrimitiveType::Long,
        PrimitiveType::Float,
        PrimitiveType::Double,
    ];

    pub fn keyword(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "boolean",
            PrimitiveType::Byte => "byte",
            PrimitiveType::Short => "short",
            PrimitiveType::Char => "char",
            PrimitiveType::Int => "int",
            PrimitiveType::Long => "long",
            PrimitiveType::Float => "float",
            PrimitiveType::Double => "double",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == keyword)
    }

    pub fn boxed_class_name(self) -> &'static str {
        match self {
            PrimitiveType::Boolean => "java.lang.Boolean",
            PrimitiveType::Byte => "java.lang.Byte",
            PrimitiveType::Short => "java.lang.Short",
            PrimitiveType::Char => "java.lang.Character",
            PrimitiveType::Int => "java.lang.Integer",
            PrimitiveType::Long => "java.lang.Long",
            PrimitiveType::Float => "java.lang.Float",
            PrimitiveType::Double => "java.lang.Double",
        }
    }

    #[inline]
    pub fn is_numeric(self) -> bool {
        self != PrimitiveType::Boolean
    }

    #[inline]
    pub fn is_integral(self) -> bool {
        matches!(
            self,
            PrimitiveType::Byte
                | PrimitiveType::Short
                | PrimitiveType::Char
                | PrimitiveType::Int
                | PrimitiveType::Long
        )
    }

    /// Conversion rank used for numeric promotion and switch selector checks.
    ///
    /// `boolean` sorts after every numeric type.
    pub fn rank(self) -> u8 {
        match self {
            PrimitiveType::Byte => 1,
            PrimitiveType::Short => 2,
            PrimitiveType::Char => 3,
            PrimitiveType::Int => 4,
            PrimitiveType::Long => 5,
            PrimitiveType::Float => 6,
            PrimitiveType::Double => 7,
            PrimitiveType::Boolean => 10,
        }
    }

    /// Widening primitive conversion (JLS 5.1.2), excluding identity.
    pub fn widens_to(self, target: PrimitiveType) -> bool {
        use PrimitiveType::*;
        match self {
            Byte => matches!(target, Short | Int | Long | Float | Double),
            Short | Char => matches!(target, Int | Long | Float | Double),
            Int => matches!(target, Long | Float | Double),
            Long => matches!(target, Float | Double),
            Float => target == Double,
            Double | Boolean => false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum WildcardBound {
    Unbounded,
    Extends(Box<Type>),
    Super(Box<Type>),
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ClassType {
    pub def: ClassId,
    pub args: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Type {
    Void,
    Primitive(PrimitiveType),
    Class(ClassType),
    Array(Box<Type>),
    TypeVar(TypeVarId),
    Wildcard(WildcardBound),
    Intersection(Vec<Type>),
    Null,
    /// A source spelling that has not been resolved to a class yet.
    Named(String),
    #[default]
    Unknown,
    Error,
}

impl Type {
    #[inline]
    pub fn class(def: ClassId, args: Vec<Type>) -> Self {
        Type::Class(ClassType { def, args })
    }

    #[inline]
    pub fn array(component: Type) -> Self {
        Type::Array(Box::new(component))
    }

    #[inline]
    pub fn is_errorish(&self) -> bool {
        matches!(self, Type::Unknown | Type::Error)
    }

    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Primitive(_))
    }

    pub fn is_reference(&self) -> bool {
        matches!(
            self,
            Type::Class(_)
                | Type::Array(_)
                | Type::TypeVar(_)
                | Type::Intersection(_)
                | Type::Null
                | Type::Named(_)
        )
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Type::Void)
    }

    pub fn as_class(&self) -> Option<&ClassType> {
        match self {
            Type::Class(ct) => Some(ct),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<PrimitiveType> {
        match self {
            Type::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Strip every array dimension.
    pub fn deep_component(&self) -> &Type {
        let mut ty = self;
        while let Type::Array(component) = ty {
            ty = component;
        }
        ty
    }

    /// A class type with no type arguments whose class declares type parameters.
    pub fn is_raw(&self, env: &dyn TypeEnv) -> bool {
        match self {
            Type::Class(ClassType { def, args }) => {
                args.is_empty() && env.class(*def).is_some_and(|c| !c.type_params.is_empty())
            }
            _ => false,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum ClassKind {
    #[default]
    Class,
    Interface,
    Enum,
    Annotation,
}

impl ClassKind {
    /// Annotation types are interfaces too.
    #[inline]
    pub fn is_interface(self) -> bool {
        matches!(self, ClassKind::Interface | ClassKind::Annotation)
    }
}

/// Access level, ordered from most to least restrictive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Visibility {
    Private,
    #[default]
    Package,
    Protected,
    Public,
}

impl Visibility {
    pub fn keyword(self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Package => "package-private",
            Visibility::Protected => "protected",
            Visibility::Public => "public",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct TypeParamDef {
    pub name: String,
    pub upper_bounds: Vec<Type>,
    pub lower_bound: Option<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FieldDef {
    pub name: String,
    pub ty: Type,
    pub is_static: bool,
    pub is_final: bool,
    pub visibility: Visibility,
    pub is_enum_constant: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct MethodDef {
    pub name: String,
    pub type_params: Vec<TypeVarId>,
    pub params: Vec<Type>,
    pub return_type: Type,
    pub is_static: bool,
    pub is_varargs: bool,
    pub is_abstract: bool,
    pub is_final: bool,
    pub visibility: Visibility,
    pub throws: Vec<Type>,
    /// Annotation type elements only: whether a `default` value is declared.
    pub has_default_value: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ConstructorDef {
    pub params: Vec<Type>,
    pub is_varargs: bool,
    pub visibility: Visibility,
    pub throws: Vec<Type>,
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ClassDef {
    /// Binary-style name: package segments separated by `.`, nesting by `$`
    /// (`com.example.Outer$Inner`).
    pub name: String,
    pub kind: ClassKind,
    pub type_params: Vec<TypeVarId>,
    pub super_class: Option<Type>,
    pub interfaces: Vec<Type>,
    pub fields: Vec<FieldDef>,
    pub constructors: Vec<ConstructorDef>,
    pub methods: Vec<MethodDef>,
    pub visibility: Visibility,
    pub is_abstract: bool,
    pub is_final: bool,
    pub is_static: bool,
    pub enclosing: Option<ClassId>,
}

impl ClassDef {
    /// The unqualified name; empty for anonymous classes.
    pub fn simple_name(&self) -> &str {
        let tail = match self.name.rfind(['$', '.']) {
            Some(idx) => &self.name[idx + 1..],
            None => self.name.as_str(),
        };
        tail.trim_start_matches(|c: char| c.is_ascii_digit())
    }

    /// Source-style qualified name (`com.example.Outer.Inner`).
    pub fn qualified_name(&self) -> String {
        self.name.replace('$', ".")
    }

    pub fn package_name(&self) -> &str {
        let top_level = match self.name.find('$') {
            Some(idx) => &self.name[..idx],
            None => self.name.as_str(),
        };
        match top_level.rfind('.') {
            Some(idx) => &top_level[..idx],
            None => "",
        }
    }

    #[inline]
    pub fn is_interface(&self) -> bool {
        self.kind.is_interface()
    }

    #[inline]
    pub fn is_anonymous(&self) -> bool {
        self.simple_name().is_empty()
    }

    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WellKnownTypes {
    pub object: ClassId,
    pub string: ClassId,
    pub class: ClassId,
    pub cloneable: ClassId,
    pub serializable: ClassId,
    pub enum_: ClassId,
    pub throwable: ClassId,
    pub exception: ClassId,
    pub runtime_exception: ClassId,
    pub error: ClassId,
    pub iterable: ClassId,
    pub annotation: ClassId,
}

pub trait TypeEnv {
    fn class(&self, id: ClassId) -> Option<&ClassDef>;
    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef>;
    fn lookup_class(&self, name: &str) -> Option<ClassId>;
    fn well_known(&self) -> &WellKnownTypes;
}

/// An owned, mutable type environment.
#[derive(Debug, Clone)]
pub struct TypeStore {
    classes: Vec<ClassDef>,
    class_by_name: HashMap<String, ClassId>,
    type_params: Vec<TypeParamDef>,
    well_known: Option<WellKnownTypes>,
}

impl Default for TypeStore {
    fn default() -> Self {
        Self::with_minimal_jdk()
    }
}

impl TypeStore {
    /// An empty store without `java.lang`; `well_known()` panics until a JDK is added.
    pub fn empty() -> Self {
        Self {
            classes: Vec::new(),
            class_by_name: HashMap::new(),
            type_params: Vec::new(),
            well_known: None,
        }
    }

    /// A store pre-populated with the handful of platform classes the checks rely on.
    pub fn with_minimal_jdk() -> Self {
        let mut store = Self::empty();
        let well_known = jdk::populate(&mut store);
        store.well_known = Some(well_known);
        store
    }

    /// Register a class. The first class registered under a name owns the name lookup; later
    /// duplicates still get their own id.
    pub fn add_class(&mut self, def: ClassDef) -> ClassId {
        let id = ClassId::from_raw(self.classes.len() as u32);
        self.class_by_name.entry(def.name.clone()).or_insert(id);
        self.classes.push(def);
        id
    }

    /// Id for `name`, creating an empty placeholder definition if the class is not known yet.
    pub fn intern_class_id(&mut self, name: &str) -> ClassId {
        if let Some(id) = self.class_by_name.get(name) {
            return *id;
        }
        self.add_class(ClassDef {
            name: name.to_string(),
            ..ClassDef::default()
        })
    }

    /// Replace the definition behind `id` (e.g. a placeholder from [`Self::intern_class_id`]).
    pub fn define_class(&mut self, id: ClassId, def: ClassDef) {
        if let Some(slot) = self.classes.get_mut(id.idx()) {
            self.class_by_name.entry(def.name.clone()).or_insert(id);
            *slot = def;
        }
    }

    pub fn class_mut(&mut self, id: ClassId) -> Option<&mut ClassDef> {
        self.classes.get_mut(id.idx())
    }

    /// Exact binary-name lookup.
    pub fn class_id(&self, name: &str) -> Option<ClassId> {
        self.class_by_name.get(name).copied()
    }

    pub fn add_type_param(&mut self, name: impl Into<String>, upper_bounds: Vec<Type>) -> TypeVarId {
        let id = TypeVarId::from_raw(self.type_params.len() as u32);
        self.type_params.push(TypeParamDef {
            name: name.into(),
            upper_bounds,
            lower_bound: None,
        });
        id
    }

    pub fn type_param_mut(&mut self, id: TypeVarId) -> Option<&mut TypeParamDef> {
        self.type_params.get_mut(id.idx())
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &ClassDef)> {
        self.classes
            .iter()
            .enumerate()
            .map(|(idx, def)| (ClassId::from_raw(idx as u32), def))
    }
}

impl TypeEnv for TypeStore {
    fn class(&self, id: ClassId) -> Option<&ClassDef> {
        self.classes.get(id.idx())
    }

    fn type_param(&self, id: TypeVarId) -> Option<&TypeParamDef> {
        self.type_params.get(id.idx())
    }

    fn lookup_class(&self, name: &str) -> Option<ClassId> {
        if let Some(id) = self.class_by_name.get(name) {
            return Some(*id);
        }
        if !name.contains('.') {
            if let Some(id) = self.class_by_name.get(&format!("java.lang.{name}")) {
                return Some(*id);
            }
        }
        // Source spelling of a nested class: try turning trailing dots into `$`.
        let mut candidate = name.to_string();
        while let Some(idx) = candidate.rfind('.') {
            candidate.replace_range(idx..idx + 1, "$");
            if let Some(id) = self.class_by_name.get(&candidate) {
                return Some(*id);
            }
        }
        None
    }

    fn well_known(&self) -> &WellKnownTypes {
        self.well_known
            .as_ref()
            .expect("TypeStore::well_known called on a store without a JDK")
    }
}

/// Resolve a [`Type::Named`] spelling to a class type when the environment knows it.
pub fn canonicalize_named(env: &dyn TypeEnv, ty: &Type) -> Type {
    match ty {
        Type::Named(name) => match env.lookup_class(name) {
            Some(id) => Type::class(id, vec![]),
            None => ty.clone(),
        },
        other => other.clone(),
    }
}

/// Plain substitution of type variables; unmapped variables are left untouched.
pub fn substitute(ty: &Type, subst: &HashMap<TypeVarId, Type>) -> Type {
    match ty {
        Type::TypeVar(id) => subst.get(id).cloned().unwrap_or_else(|| ty.clone()),
        Type::Class(ClassType { def, args }) => {
            Type::class(*def, args.iter().map(|a| substitute(a, subst)).collect())
        }
        Type::Array(component) => Type::array(substitute(component, subst)),
        Type::Wildcard(WildcardBound::Extends(bound)) => {
            Type::Wildcard(WildcardBound::Extends(Box::new(substitute(bound, subst))))
        }
        Type::Wildcard(WildcardBound::Super(bound)) => {
            Type::Wildcard(WildcardBound::Super(Box::new(substitute(bound, subst))))
        }
        Type::Intersection(parts) => {
            Type::Intersection(parts.iter().map(|p| substitute(p, subst)).collect())
        }
        other => other.clone(),
    }
}

/// Type erasure (JLS 4.6).
pub fn erasure(env: &dyn TypeEnv, ty: &Type) -> Type {
    fn inner(env: &dyn TypeEnv, ty: &Type, seen: &mut HashSet<TypeVarId>) -> Type {
        match ty {
            Type::Class(ClassType { def, .. }) => Type::class(*def, vec![]),
            Type::Array(component) => Type::array(inner(env, component, seen)),
            Type::TypeVar(id) => {
                let object = Type::class(env.well_known().object, vec![]);
                if !seen.insert(*id) {
                    return object;
                }
                let erased = env
                    .type_param(*id)
                    .and_then(|tp| tp.upper_bounds.first())
                    .map(|bound| inner(env, bound, seen))
                    .unwrap_or(object);
                seen.remove(id);
                erased
            }
            Type::Intersection(parts) => match parts.first() {
                Some(first) => inner(env, first, seen),
                None => Type::class(env.well_known().object, vec![]),
            },
            Type::Wildcard(WildcardBound::Extends(bound)) => inner(env, bound, seen),
            Type::Wildcard(_) => Type::class(env.well_known().object, vec![]),
            Type::Named(_) => inner(env, &canonicalize_named(env, ty), seen),
            other => other.clone(),
        }
    }

    if let Type::Named(_) = ty {
        let canonical = canonicalize_named(env, ty);
        if let Type::Named(_) = canonical {
            return canonical;
        }
        return erasure(env, &canonical);
    }
    inner(env, ty, &mut HashSet::new())
}

/// A type-variable substitution with support for raw mappings.
///
/// A raw mapping (`None`) records that the variable belongs to a class used raw: substituting
/// it yields its erasure, and any parameterized type mentioning it becomes raw.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitutor {
    map: BTreeMap<TypeVarId, Option<Type>>,
}

impl Substitutor {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The substitution induced by a class type: formal parameters to actual arguments, or raw
    /// mappings when the type has no arguments.
    pub fn for_class_type(env: &dyn TypeEnv, ty: &ClassType) -> Self {
        let mut subst = Self::empty();
        let Some(class) = env.class(ty.def) else {
            return subst;
        };
        let raw = ty.args.is_empty();
        for (idx, param) in class.type_params.iter().enumerate() {
            match ty.args.get(idx) {
                Some(arg) if !raw => subst.put(*param, arg.clone()),
                _ => subst.put_raw(*param),
            }
        }
        subst
    }

    pub fn put(&mut self, var: TypeVarId, ty: Type) {
        self.map.insert(var, Some(ty));
    }

    pub fn put_raw(&mut self, var: TypeVarId) {
        self.map.insert(var, None);
    }

    /// `None` when unmapped, `Some(None)` for a raw mapping.
    pub fn get(&self, var: TypeVarId) -> Option<Option<&Type>> {
        self.map.get(&var).map(Option::as_ref)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Whether any mapping is raw.
    pub fn is_raw(&self) -> bool {
        self.map.values().any(Option::is_none)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TypeVarId, Option<&Type>)> {
        self.map.iter().map(|(k, v)| (*k, v.as_ref()))
    }

    /// Apply `self` first and `outer` to the results; mappings only present in `outer` are kept.
    ///
    /// Walking an inheritance edge `C -> P -> G` composes `C->P` with `P->G` in that order.
    pub fn compose(&self, env: &dyn TypeEnv, outer: &Substitutor) -> Substitutor {
        let mut map = BTreeMap::new();
        for (var, value) in &self.map {
            let mapped = value.as_ref().map(|ty| outer.apply(env, ty));
            map.insert(*var, mapped);
        }
        for (var, value) in &outer.map {
            map.entry(*var).or_insert_with(|| value.clone());
        }
        Substitutor { map }
    }

    pub fn apply(&self, env: &dyn TypeEnv, ty: &Type) -> Type {
        match ty {
            Type::TypeVar(id) => match self.map.get(id) {
                Some(Some(mapped)) => mapped.clone(),
                Some(None) => erasure(env, ty),
                None => ty.clone(),
            },
            Type::Class(ClassType { def, args }) => {
                let mentions_raw = args.iter().any(|arg| self.mentions_raw(arg));
                if mentions_raw {
                    return Type::class(*def, vec![]);
                }
                Type::class(*def, args.iter().map(|a| self.apply(env, a)).collect())
            }
            Type::Array(component) => Type::array(self.apply(env, component)),
            Type::Wildcard(WildcardBound::Extends(bound)) => {
                Type::Wildcard(WildcardBound::Extends(Box::new(self.apply(env, bound))))
            }
            Type::Wildcard(WildcardBound::Super(bound)) => {
                Type::Wildcard(WildcardBound::Super(Box::new(self.apply(env, bound))))
            }
            Type::Intersection(parts) => {
                Type::Intersection(parts.iter().map(|p| self.apply(env, p)).collect())
            }
            other => other.clone(),
        }
    }

    fn mentions_raw(&self, ty: &Type) -> bool {
        match ty {
            Type::TypeVar(id) => matches!(self.map.get(id), Some(None)),
            Type::Class(ClassType { args, .. }) => args.iter().any(|a| self.mentions_raw(a)),
            Type::Array(component) => self.mentions_raw(component),
            Type::Wildcard(WildcardBound::Extends(b)) | Type::Wildcard(WildcardBound::Super(b)) => {
                self.mentions_raw(b)
            }
            Type::Intersection(parts) => parts.iter().any(|p| self.mentions_raw(p)),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn simple_and_package_names() {
        let def = ClassDef {
            name: "com.example.Outer$Inner".to_string(),
            ..ClassDef::default()
        };
        assert_eq!(def.simple_name(), "Inner");
        assert_eq!(def.package_name(), "com.example");
        assert_eq!(def.qualified_name(), "com.example.Outer.Inner");

        let anon = ClassDef {
            name: "Outer$1".to_string(),
            ..ClassDef::default()
        };
        assert!(anon.is_anonymous());
        assert_eq!(anon.package_name(), "");
    }

    #[test]
    fn raw_substitution_makes_dependent_types_raw() {
        let store = TypeStore::with_minimal_jdk();
        let list = store.class_id("java.util.List").unwrap();
        let e = store.class(list).unwrap().type_params[0];

        let raw = Substitutor::for_class_type(&store, &ClassType { def: list, args: vec![] });
        assert!(raw.is_raw());

        let applied = raw.apply(&store, &Type::class(list, vec![Type::TypeVar(e)]));
        assert_eq!(applied, Type::class(list, vec![]));
        assert_eq!(
            raw.apply(&store, &Type::TypeVar(e)),
            Type::class(store.well_known().object, vec![])
        );
    }

    #[test]
    fn compose_applies_inner_then_outer() {
        let mut store = TypeStore::with_minimal_jdk();
        let string = Type::class(store.well_known().string, vec![]);
        let a = store.add_type_param("A", vec![]);
        let b = store.add_type_param("B", vec![]);

        let mut inner = Substitutor::empty();
        inner.put(a, Type::TypeVar(b));
        let mut outer = Substitutor::empty();
        outer.put(b, string.clone());

        let composed = inner.compose(&store, &outer);
        assert_eq!(composed.apply(&store, &Type::TypeVar(a)), string);
        assert_eq!(composed.apply(&store, &Type::TypeVar(b)), string);
    }
}
