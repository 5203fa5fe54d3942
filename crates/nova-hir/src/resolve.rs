//! Resolution pass run by [`crate::FileBuilder::finish`].
//!
//! Order matters: imports, then class-header type references (so supertypes are known), then every
//! other type reference (which may name inherited member classes), then member signatures, and
//! finally the attribution of names and expression types in bodies.

use std::collections::HashMap;

use nova_types::java::overload::{collect_methods, resolve_overload, OverloadResolution};
use nova_types::{
    binary_numeric_promotion, boxed_type, erasure, find_field, find_member_class,
    instantiate_as_supertype, is_accessible, is_assignable, unary_numeric_promotion, unboxed_type,
    ClassId, ClassKind, ConstructorDef, FieldDef, MethodDef, PrimitiveType, Substitutor, Type,
    TypeEnv, TypeStore, Visibility, WildcardBound,
};

use crate::hir::*;
use crate::ids::*;

/// Lexical position of a type reference, recorded while building.
#[derive(Debug, Clone, Copy)]
pub(crate) struct RefScope {
    pub class: Option<ClassDeclId>,
    pub method: Option<MethodDeclId>,
    /// Part of a class header (supertypes, class type parameter bounds).
    pub in_header: bool,
}

pub(crate) fn resolve_file(store: &mut TypeStore, file: &mut JavaFile, scopes: &[RefScope]) {
    resolve_imports(store, file);
    resolve_type_refs(store, file, scopes, true);
    fill_class_headers(store, file);
    resolve_type_refs(store, file, scopes, false);
    resolve_annotations(store, file);
    fill_members(store, file);

    let (types, resolutions) = {
        let mut attribution = Attribution::new(store, file);
        attribution.run();
        (attribution.types, attribution.resolutions)
    };
    for (idx, ty) in types.into_iter().enumerate() {
        file.exprs[ExprId::from_raw(idx as u32)].ty = ty;
    }
    for (id, resolved) in resolutions {
        match &mut file.exprs[id].kind {
            ExprKind::Name { resolution, .. } | ExprKind::FieldAccess { resolution, .. } => {
                *resolution = resolved;
            }
            _ => {}
        }
    }
}

// ---- lookups -------------------------------------------------------------------------------

/// Exact binary-name lookup through the environment.
fn exact_class(env: &dyn TypeEnv, name: &str) -> Option<ClassId> {
    env.lookup_class(name)
        .filter(|id| env.class(*id).is_some_and(|c| c.name == name))
}

fn package_exists(store: &TypeStore, name: &str) -> bool {
    store
        .classes()
        .any(|(_, c)| c.name.len() > name.len() && c.name.starts_with(name) && c.name[name.len()..].starts_with('.'))
}

/// Resolve a (possibly qualified) type name as seen from `class`/`method`.
fn lookup_type(
    env: &dyn TypeEnv,
    file: &JavaFile,
    name: &str,
    class: Option<ClassDeclId>,
    method: Option<MethodDeclId>,
) -> Option<TypeRefTarget> {
    let mut segments = name.split('.');
    let first = segments.next()?;
    let rest: Vec<&str> = segments.collect();
    if let Some(target) = lookup_simple_type(env, file, first, class, method) {
        if rest.is_empty() {
            return Some(target);
        }
        let TypeRefTarget::Class(mut current) = target else {
            return None;
        };
        for segment in rest {
            current = find_member_class(env, current, segment)?;
        }
        return Some(TypeRefTarget::Class(current));
    }
    if rest.is_empty() {
        return None;
    }
    env.lookup_class(name).map(TypeRefTarget::Class)
}

fn lookup_simple_type(
    env: &dyn TypeEnv,
    file: &JavaFile,
    name: &str,
    mut class: Option<ClassDeclId>,
    mut method: Option<MethodDeclId>,
) -> Option<TypeRefTarget> {
    while let Some(current) = class {
        if let Some(m) = method {
            let found = file.methods[m]
                .type_params
                .iter()
                .find(|tp| file.type_params[**tp].name == name);
            if let Some(tp) = found {
                return Some(TypeRefTarget::TypeParam(file.type_params[*tp].def));
            }
        }
        let local = file.class_ids().find(|id| {
            let decl = &file.classes[*id];
            decl.container == ClassContainer::Local
                && decl.parent == Some(current)
                && decl.enclosing_method == method
                && decl.name == name
        });
        if let Some(local) = local {
            return Some(TypeRefTarget::Class(file.classes[local].def));
        }
        let decl = &file.classes[current];
        if decl.name == name {
            return Some(TypeRefTarget::Class(decl.def));
        }
        if let Some(tp) = decl
            .type_params
            .iter()
            .find(|tp| file.type_params[**tp].name == name)
        {
            return Some(TypeRefTarget::TypeParam(file.type_params[*tp].def));
        }
        if let Some(member) = find_member_class(env, decl.def, name) {
            return Some(TypeRefTarget::Class(member));
        }
        method = decl.enclosing_method;
        class = decl.parent;
    }

    if let Some(top) = file.types.iter().find(|id| file.classes[**id].name == name) {
        return Some(TypeRefTarget::Class(file.classes[*top].def));
    }
    let imports = || file.imports.iter().map(|id| &file.import_decls[*id]);
    for import in imports() {
        if !import.is_static && !import.is_on_demand && import.simple_name() == name {
            if let Some(ImportTarget::Class(def)) = import.resolved {
                return Some(TypeRefTarget::Class(def));
            }
        }
    }
    let same_package = match file.package_name() {
        "" => name.to_string(),
        package => format!("{package}.{name}"),
    };
    if let Some(def) = exact_class(env, &same_package) {
        return Some(TypeRefTarget::Class(def));
    }
    for import in imports() {
        if !import.is_on_demand {
            continue;
        }
        let found = match &import.resolved {
            Some(ImportTarget::Package(package)) => exact_class(env, &format!("{package}.{name}")),
            Some(ImportTarget::Class(owner)) => find_member_class(env, *owner, name),
            _ => None,
        };
        if let Some(def) = found {
            return Some(TypeRefTarget::Class(def));
        }
    }
    exact_class(env, &format!("java.lang.{name}")).map(TypeRefTarget::Class)
}

fn has_static_member(env: &dyn TypeEnv, owner: ClassId, name: &str) -> bool {
    let Some(class) = env.class(owner) else {
        return false;
    };
    class.fields.iter().any(|f| f.is_static && f.name == name)
        || class.methods.iter().any(|m| m.is_static && m.name == name)
        || find_member_class(env, owner, name).is_some()
}

// ---- declarations --------------------------------------------------------------------------

fn resolve_imports(store: &TypeStore, file: &mut JavaFile) {
    for id in file.imports.clone() {
        let decl = &file.import_decls[id];
        let resolved = if decl.is_static {
            if decl.is_on_demand {
                store.lookup_class(&decl.path).map(ImportTarget::Class)
            } else {
                decl.path.rsplit_once('.').and_then(|(owner, member)| {
                    let owner = store.lookup_class(owner)?;
                    Some(ImportTarget::StaticMember {
                        owner,
                        name: member.to_string(),
                        exists: has_static_member(store, owner, member),
                    })
                })
            }
        } else if decl.is_on_demand {
            match store.lookup_class(&decl.path) {
                Some(owner) if decl.path.contains('.') => Some(ImportTarget::Class(owner)),
                _ if package_exists(store, &decl.path) => Some(ImportTarget::Package(decl.path.clone())),
                _ => None,
            }
        } else if decl.path.contains('.') {
            store.lookup_class(&decl.path).map(ImportTarget::Class)
        } else {
            None
        };
        file.import_decls[id].resolved = resolved;
    }
}

fn resolve_type_refs(store: &TypeStore, file: &mut JavaFile, scopes: &[RefScope], header: bool) {
    for (idx, scope) in scopes.iter().enumerate() {
        if scope.in_header != header {
            continue;
        }
        let id = TypeRefId::from_raw(idx as u32);
        let (target, ty) = match &file.type_refs[id].kind {
            TypeRefKind::Primitive(p) => (None, Type::Primitive(*p)),
            TypeRefKind::Void => (None, Type::Void),
            TypeRefKind::Array(component) => {
                let component = &file.type_refs[*component].ty;
                let ty = if component.is_errorish() {
                    Type::Unknown
                } else {
                    Type::array(component.clone())
                };
                (None, ty)
            }
            TypeRefKind::Wildcard(bound) => {
                let bound = match bound {
                    None => WildcardBound::Unbounded,
                    Some((WildcardKind::Extends, b)) => {
                        WildcardBound::Extends(Box::new(file.type_refs[*b].ty.clone()))
                    }
                    Some((WildcardKind::Super, b)) => {
                        WildcardBound::Super(Box::new(file.type_refs[*b].ty.clone()))
                    }
                };
                (None, Type::Wildcard(bound))
            }
            TypeRefKind::Class { name, args, .. } => {
                match lookup_type(store, file, name, scope.class, scope.method) {
                    Some(TypeRefTarget::Class(def)) => {
                        let args = args.iter().map(|a| file.type_refs[*a].ty.clone()).collect();
                        (Some(TypeRefTarget::Class(def)), Type::class(def, args))
                    }
                    Some(TypeRefTarget::TypeParam(var)) => {
                        (Some(TypeRefTarget::TypeParam(var)), Type::TypeVar(var))
                    }
                    None => (None, Type::Unknown),
                }
            }
        };
        let type_ref = &mut file.type_refs[id];
        type_ref.ty = ty;
        if let TypeRefKind::Class { resolved, .. } = &mut type_ref.kind {
            *resolved = target;
        }
    }
}

fn resolve_annotations(store: &TypeStore, file: &mut JavaFile) {
    for idx in 0..file.annotations.len() {
        let id = AnnotationId::from_raw(idx as u32);
        let name = &file.annotations[id].name;
        let resolved = match lookup_type(store, file, name, None, None) {
            Some(TypeRefTarget::Class(def)) => Some(def),
            _ => file
                .class_ids()
                .find(|c| file.classes[*c].name == *name)
                .map(|c| file.classes[c].def),
        };
        file.annotations[id].resolved = resolved;
    }
}

fn type_of(file: &JavaFile, id: TypeRefId) -> Type {
    file.type_refs[id].ty.clone()
}

fn usable_supertype(ty: Type) -> Option<Type> {
    matches!(ty, Type::Class(_)).then_some(ty)
}

fn fill_class_headers(store: &mut TypeStore, file: &JavaFile) {
    let enum_bodies: HashMap<ClassDeclId, ClassDeclId> = file
        .enum_constants
        .iter()
        .filter_map(|(_, constant)| constant.body.map(|body| (body, constant.owner)))
        .collect();

    for id in file.class_ids() {
        let decl = &file.classes[id];
        let mut super_class = None;
        let mut interfaces = Vec::new();
        match decl.kind {
            ClassKind::Class if decl.container == ClassContainer::Anonymous => {
                if let Some(owner) = enum_bodies.get(&id) {
                    super_class = Some(Type::class(file.classes[*owner].def, vec![]));
                } else if let Some(base) = decl.anonymous_base.and_then(|b| usable_supertype(type_of(file, b))) {
                    let is_interface = base
                        .as_class()
                        .and_then(|ct| store.class(ct.def))
                        .is_some_and(|c| c.is_interface());
                    if is_interface {
                        interfaces.push(base);
                    } else {
                        super_class = Some(base);
                    }
                }
            }
            ClassKind::Class => {
                super_class = decl
                    .extends
                    .first()
                    .and_then(|t| usable_supertype(type_of(file, *t)));
                interfaces.extend(decl.implements.iter().filter_map(|t| usable_supertype(type_of(file, *t))));
            }
            ClassKind::Interface => {
                interfaces.extend(decl.extends.iter().filter_map(|t| usable_supertype(type_of(file, *t))));
            }
            ClassKind::Enum => {
                let enum_ = store.well_known().enum_;
                super_class = Some(Type::class(enum_, vec![Type::class(decl.def, vec![])]));
                interfaces.extend(decl.implements.iter().filter_map(|t| usable_supertype(type_of(file, *t))));
            }
            ClassKind::Annotation => {
                interfaces.push(Type::class(store.well_known().annotation, vec![]));
            }
        }

        let in_interface = decl
            .parent
            .is_some_and(|p| file.classes[p].kind.is_interface());
        let modifiers = &decl.modifiers;
        let visibility = modifiers.visibility().unwrap_or(if in_interface {
            Visibility::Public
        } else {
            Visibility::Package
        });
        let has_constant_bodies = enum_bodies.values().any(|owner| *owner == id);
        let type_params: Vec<_> = decl
            .type_params
            .iter()
            .map(|tp| file.type_params[*tp].def)
            .collect();

        for tp in &decl.type_params {
            set_bounds(store, file, *tp);
        }
        if let Some(class) = store.class_mut(decl.def) {
            class.super_class = super_class;
            class.interfaces = interfaces;
            class.type_params = type_params;
            class.visibility = visibility;
            class.is_abstract = modifiers.has(Modifier::Abstract) || decl.kind.is_interface();
            class.is_final = modifiers.has(Modifier::Final)
                || (decl.kind == ClassKind::Enum && !has_constant_bodies)
                || decl.container == ClassContainer::Anonymous;
            class.is_static = modifiers.has(Modifier::Static)
                || in_interface
                || (decl.container == ClassContainer::Member && decl.kind != ClassKind::Class);
        }
    }
}

fn set_bounds(store: &mut TypeStore, file: &JavaFile, tp: TypeParamId) {
    let decl = &file.type_params[tp];
    let bounds = decl
        .bounds
        .iter()
        .map(|b| type_of(file, *b))
        .filter(|ty| !ty.is_errorish())
        .collect();
    if let Some(def) = store.type_param_mut(decl.def) {
        def.upper_bounds = bounds;
    }
}

fn fill_members(store: &mut TypeStore, file: &JavaFile) {
    for id in file.class_ids() {
        let decl = &file.classes[id];
        let in_interface = decl.kind.is_interface();
        let default_visibility = if in_interface {
            Visibility::Public
        } else {
            Visibility::Package
        };
        let mut fields = Vec::new();
        let mut methods = Vec::new();
        let mut constructors = Vec::new();

        for member in &decl.members {
            match *member {
                Member::Field(v) => {
                    let var = &file.vars[v];
                    fields.push(FieldDef {
                        name: var.name.clone(),
                        ty: type_of(file, var.ty),
                        is_static: var.modifiers.has(Modifier::Static) || in_interface,
                        is_final: var.modifiers.has(Modifier::Final) || in_interface,
                        visibility: var.modifiers.visibility().unwrap_or(default_visibility),
                        is_enum_constant: false,
                    });
                }
                Member::EnumConstant(e) => fields.push(FieldDef {
                    name: file.enum_constants[e].name.clone(),
                    ty: Type::class(decl.def, vec![]),
                    is_static: true,
                    is_final: true,
                    visibility: Visibility::Public,
                    is_enum_constant: true,
                }),
                Member::Method(m) => {
                    let method = &file.methods[m];
                    for tp in &method.type_params {
                        set_bounds(store, file, *tp);
                    }
                    let params = method.params.iter().map(|p| type_of(file, file.vars[*p].ty)).collect();
                    let is_varargs = method.params.last().is_some_and(|p| file.vars[*p].is_varargs);
                    let throws = method.throws.iter().map(|t| type_of(file, *t)).collect();
                    let visibility = method.modifiers.visibility().unwrap_or(default_visibility);
                    if method.is_constructor() {
                        constructors.push(ConstructorDef {
                            params,
                            is_varargs,
                            visibility,
                            throws,
                        });
                    } else {
                        let is_static = method.modifiers.has(Modifier::Static);
                        methods.push(MethodDef {
                            name: method.name.clone(),
                            type_params: method
                                .type_params
                                .iter()
                                .map(|tp| file.type_params[*tp].def)
                                .collect(),
                            params,
                            return_type: method
                                .return_type
                                .map_or(Type::Unknown, |t| type_of(file, t)),
                            is_static,
                            is_varargs,
                            is_abstract: method.modifiers.has(Modifier::Abstract)
                                || (in_interface && !is_static && method.body.is_none()),
                            is_final: method.modifiers.has(Modifier::Final),
                            visibility,
                            throws,
                            has_default_value: method.default_value.is_some(),
                        });
                    }
                }
                Member::Class(_) | Member::Initializer(_) => {}
            }
        }

        let self_type = Type::class(decl.def, vec![]);
        if decl.kind == ClassKind::Enum {
            methods.push(MethodDef {
                name: "values".to_string(),
                return_type: Type::array(self_type.clone()),
                is_static: true,
                visibility: Visibility::Public,
                ..MethodDef::default()
            });
            methods.push(MethodDef {
                name: "valueOf".to_string(),
                params: vec![Type::class(store.well_known().string, vec![])],
                return_type: self_type,
                is_static: true,
                visibility: Visibility::Public,
                ..MethodDef::default()
            });
        }
        let needs_default_constructor = matches!(decl.kind, ClassKind::Class | ClassKind::Enum)
            && decl.container != ClassContainer::Anonymous
            && constructors.is_empty();
        let class_visibility = store.class(decl.def).map_or(Visibility::Package, |c| c.visibility);

        if let Some(class) = store.class_mut(decl.def) {
            if needs_default_constructor {
                constructors.push(ConstructorDef {
                    visibility: if decl.kind == ClassKind::Enum {
                        Visibility::Private
                    } else {
                        class_visibility
                    },
                    ..ConstructorDef::default()
                });
            }
            class.fields = fields;
            class.methods = methods;
            class.constructors = constructors;
        }
    }
}

// ---- attribution ---------------------------------------------------------------------------

struct ClassFrame {
    decl: ClassDeclId,
    def: ClassId,
    /// No instance of this class is available at the current point.
    static_ctx: bool,
}

struct Attribution<'a> {
    store: &'a TypeStore,
    file: &'a JavaFile,
    types: Vec<Type>,
    resolutions: HashMap<ExprId, Resolution>,
    scopes: Vec<Vec<(String, VarId)>>,
    frames: Vec<ClassFrame>,
    method: Option<MethodDeclId>,
}

fn opaque_resolution() -> Resolution {
    Resolution {
        symbol: None,
        substitutor: Substitutor::empty(),
        is_valid: true,
        is_accessible: true,
        is_static_context_ok: true,
    }
}

impl<'a> Attribution<'a> {
    fn new(store: &'a TypeStore, file: &'a JavaFile) -> Self {
        Self {
            store,
            file,
            types: vec![Type::Unknown; file.exprs.len()],
            resolutions: HashMap::new(),
            scopes: Vec::new(),
            frames: Vec::new(),
            method: None,
        }
    }

    fn env(&self) -> &'a dyn TypeEnv {
        self.store
    }

    fn run(&mut self) {
        let file = self.file;
        if let Some(package) = &file.package {
            for annotation in &package.annotations {
                self.attr_annotation(*annotation);
            }
        }
        for class in &file.types {
            self.attr_class(*class);
        }
    }

    fn class_type(&self, def: ClassId) -> Type {
        let args = self
            .env()
            .class(def)
            .map(|c| c.type_params.iter().map(|tp| Type::TypeVar(*tp)).collect())
            .unwrap_or_default();
        Type::class(def, args)
    }

    fn var_type(&self, var: VarId) -> Type {
        type_of(self.file, self.file.vars[var].ty)
    }

    fn current_class(&self) -> Option<ClassId> {
        self.frames.last().map(|f| f.def)
    }

    fn set_static(&mut self, value: bool) {
        if let Some(frame) = self.frames.last_mut() {
            frame.static_ctx = value;
        }
    }

    // ---- declarations ----

    fn attr_class(&mut self, id: ClassDeclId) {
        let file = self.file;
        let decl = &file.classes[id];
        let saved: Vec<bool> = self.frames.iter().map(|f| f.static_ctx).collect();
        if decl.container == ClassContainer::Member && decl.is_static_context() {
            for frame in &mut self.frames {
                frame.static_ctx = true;
            }
        }
        self.frames.push(ClassFrame {
            decl: id,
            def: decl.def,
            static_ctx: false,
        });
        let saved_method = self.method.take();
        self.attr_modifiers(&decl.modifiers);

        for member in &decl.members {
            match *member {
                Member::Field(v) => {
                    let var = &file.vars[v];
                    self.set_static(var.modifiers.has(Modifier::Static) || decl.kind.is_interface());
                    self.attr_modifiers(&var.modifiers);
                    if let Some(init) = var.initializer {
                        let declared = self.var_type(v);
                        self.attr_with_expected(init, &declared);
                    }
                }
                Member::Method(m) => {
                    let method = &file.methods[m];
                    self.set_static(method.modifiers.has(Modifier::Static));
                    self.method = Some(m);
                    self.attr_modifiers(&method.modifiers);
                    let params = method
                        .params
                        .iter()
                        .map(|p| {
                            self.attr_modifiers(&file.vars[*p].modifiers);
                            (file.vars[*p].name.clone(), *p)
                        })
                        .collect();
                    self.scopes.push(params);
                    if let Some(body) = method.body {
                        self.attr_stmt(body);
                    }
                    self.scopes.pop();
                    if let Some(value) = &method.default_value {
                        self.attr_annotation_value(value);
                    }
                    self.method = None;
                }
                Member::Class(c) => self.attr_class(c),
                Member::Initializer(i) => {
                    let initializer = &file.initializers[i];
                    self.set_static(initializer.is_static());
                    self.attr_stmt(initializer.body);
                }
                Member::EnumConstant(e) => {
                    let constant = &file.enum_constants[e];
                    self.set_static(true);
                    for annotation in &constant.annotations {
                        self.attr_annotation(*annotation);
                    }
                    for arg in &constant.args {
                        self.attr_expr(*arg);
                    }
                    if let Some(body) = constant.body {
                        self.attr_class(body);
                    }
                }
            }
        }

        self.method = saved_method;
        self.frames.pop();
        for (frame, value) in self.frames.iter_mut().zip(saved) {
            frame.static_ctx = value;
        }
    }

    fn attr_modifiers(&mut self, modifiers: &ModifierList) {
        for annotation in &modifiers.annotations {
            self.attr_annotation(*annotation);
        }
    }

    fn attr_annotation(&mut self, id: AnnotationId) {
        let file = self.file;
        for arg in &file.annotations[id].args {
            self.attr_annotation_value(&arg.value);
        }
    }

    fn attr_annotation_value(&mut self, value: &AnnotationValue) {
        match value {
            AnnotationValue::Expr(e) => {
                self.attr_expr(*e);
            }
            AnnotationValue::Annotation(a) => self.attr_annotation(*a),
            AnnotationValue::Array { elements, .. } => {
                for element in elements {
                    self.attr_annotation_value(element);
                }
            }
        }
    }

    // ---- statements ----

    fn attr_stmt(&mut self, id: StmtId) {
        let file = self.file;
        match &file.stmts[id].kind {
            StmtKind::Block(stmts) => {
                self.scopes.push(Vec::new());
                for stmt in stmts {
                    self.attr_stmt(*stmt);
                }
                self.scopes.pop();
            }
            StmtKind::LocalVars(vars) => {
                for var in vars {
                    let decl = &file.vars[*var];
                    self.attr_modifiers(&decl.modifiers);
                    if let Some(init) = decl.initializer {
                        let declared = self.var_type(*var);
                        self.attr_with_expected(init, &declared);
                    }
                    self.declare(&decl.name, *var);
                }
            }
            StmtKind::LocalClass(class) => self.attr_class(*class),
            StmtKind::Expr(e) | StmtKind::Throw(e) => {
                self.attr_expr(*e);
            }
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.attr_expr(*condition);
                self.attr_nested(*then_branch);
                if let Some(else_branch) = else_branch {
                    self.attr_nested(*else_branch);
                }
            }
            StmtKind::While { condition, body } => {
                self.attr_expr(*condition);
                self.attr_nested(*body);
            }
            StmtKind::DoWhile { body, condition } => {
                self.attr_nested(*body);
                self.attr_expr(*condition);
            }
            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                self.scopes.push(Vec::new());
                for stmt in init {
                    self.attr_stmt(*stmt);
                }
                if let Some(condition) = condition {
                    self.attr_expr(*condition);
                }
                for expr in update {
                    self.attr_expr(*expr);
                }
                self.attr_nested(*body);
                self.scopes.pop();
            }
            StmtKind::Foreach {
                param,
                iterable,
                body,
            } => {
                self.attr_expr(*iterable);
                self.scopes.push(vec![(file.vars[*param].name.clone(), *param)]);
                self.attr_nested(*body);
                self.scopes.pop();
            }
            StmtKind::Switch { selector, body } => {
                let selector_ty = self.attr_expr(*selector);
                let enum_class = selector_ty
                    .as_class()
                    .map(|ct| ct.def)
                    .filter(|def| self.env().class(*def).is_some_and(|c| c.kind == ClassKind::Enum));
                self.scopes.push(Vec::new());
                for stmt in body {
                    match (&file.stmts[*stmt].kind, enum_class) {
                        (StmtKind::Case { value: Some(value), .. }, Some(enum_class)) => {
                            self.attr_enum_label(*value, enum_class);
                        }
                        _ => self.attr_stmt(*stmt),
                    }
                }
                self.scopes.pop();
            }
            StmtKind::Case { value, .. } => {
                if let Some(value) = value {
                    self.attr_expr(*value);
                }
            }
            StmtKind::Labeled { body, .. } => {
                if let Some(body) = body {
                    self.attr_stmt(*body);
                }
            }
            StmtKind::Return(value) => {
                if let Some(value) = value {
                    self.attr_expr(*value);
                }
            }
            StmtKind::Try {
                body,
                catches,
                finally,
            } => {
                self.attr_stmt(*body);
                for catch in catches {
                    self.attr_modifiers(&file.vars[catch.param].modifiers);
                    self.scopes.push(vec![(file.vars[catch.param].name.clone(), catch.param)]);
                    self.attr_stmt(catch.body);
                    self.scopes.pop();
                }
                if let Some(finally) = finally {
                    self.attr_stmt(*finally);
                }
            }
            StmtKind::Synchronized { lock, body } => {
                self.attr_expr(*lock);
                self.attr_stmt(*body);
            }
            StmtKind::Break(_) | StmtKind::Continue(_) | StmtKind::Empty => {}
        }
    }

    /// A sub-statement gets its own scope (`if (c) int x = 1;` declares nothing outside).
    fn attr_nested(&mut self, id: StmtId) {
        self.scopes.push(Vec::new());
        self.attr_stmt(id);
        self.scopes.pop();
    }

    fn declare(&mut self, name: &str, var: VarId) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.push((name.to_string(), var));
        }
    }

    /// `case RED:` in a switch over an enum names a constant of the selector's enum.
    fn attr_enum_label(&mut self, value: ExprId, enum_class: ClassId) {
        let file = self.file;
        let ExprKind::Name { name, .. } = &file.exprs[value].kind else {
            self.attr_expr(value);
            return;
        };
        let found = self
            .env()
            .class(enum_class)
            .and_then(|c| c.fields.iter().position(|f| f.is_enum_constant && f.name == *name));
        let resolution = match found {
            Some(index) => Resolution::resolved(Symbol::Field {
                owner: enum_class,
                index,
            }),
            None => Resolution::unresolved(),
        };
        if found.is_some() {
            self.types[value.idx()] = Type::class(enum_class, vec![]);
        }
        self.resolutions.insert(value, resolution);
    }

    // ---- expressions ----

    /// Attribute an initializer; array initializers take their type from the declaration.
    fn attr_with_expected(&mut self, id: ExprId, expected: &Type) -> Type {
        let file = self.file;
        if let ExprKind::ArrayInit(elements) = &file.exprs[id].kind {
            let component = match expected {
                Type::Array(component) => (**component).clone(),
                _ => Type::Unknown,
            };
            for element in elements {
                self.attr_with_expected(*element, &component);
            }
            let ty = if matches!(expected, Type::Array(_)) {
                expected.clone()
            } else {
                Type::Unknown
            };
            self.types[id.idx()] = ty.clone();
            return ty;
        }
        self.attr_expr(id)
    }

    fn attr_expr(&mut self, id: ExprId) -> Type {
        let ty = self.compute_expr(id);
        self.types[id.idx()] = ty.clone();
        ty
    }

    fn symbol_of(&self, id: ExprId) -> Option<&Symbol> {
        let id = self.file.skip_parens(id);
        self.resolutions.get(&id).and_then(|r| r.symbol.as_ref())
    }

    fn compute_expr(&mut self, id: ExprId) -> Type {
        let file = self.file;
        let env = self.env();
        let wk = env.well_known();
        match &file.exprs[id].kind {
            ExprKind::Literal(literal) => match literal {
                Literal::Int(_) => Type::Primitive(PrimitiveType::Int),
                Literal::Long(_) => Type::Primitive(PrimitiveType::Long),
                Literal::Float(_) => Type::Primitive(PrimitiveType::Float),
                Literal::Double(_) => Type::Primitive(PrimitiveType::Double),
                Literal::Char(_) => Type::Primitive(PrimitiveType::Char),
                Literal::Boolean(_) => Type::Primitive(PrimitiveType::Boolean),
                Literal::String(_) => Type::class(wk.string, vec![]),
                Literal::Null => Type::Null,
            },
            ExprKind::Name { name, .. } => {
                let (resolution, ty) = self.resolve_name(name);
                self.resolutions.insert(id, resolution);
                ty
            }
            ExprKind::FieldAccess {
                qualifier, name, ..
            } => {
                self.attr_expr(*qualifier);
                let (resolution, ty) = self.resolve_field_access(*qualifier, name);
                self.resolutions.insert(id, resolution);
                ty
            }
            ExprKind::MethodCall {
                qualifier,
                name,
                args,
                ..
            } => {
                if let Some(qualifier) = qualifier {
                    self.attr_expr(*qualifier);
                }
                let arg_types: Vec<Type> = args.iter().map(|a| self.attr_expr(*a)).collect();
                self.call_type(*qualifier, name, &arg_types)
            }
            ExprKind::ConstructorCall {
                qualifier, args, ..
            } => {
                if let Some(qualifier) = qualifier {
                    self.attr_expr(*qualifier);
                }
                for arg in args {
                    self.attr_expr(*arg);
                }
                Type::Void
            }
            ExprKind::New {
                qualifier,
                class,
                args,
                anonymous,
                ..
            } => {
                if let Some(qualifier) = qualifier {
                    self.attr_expr(*qualifier);
                }
                for arg in args {
                    self.attr_expr(*arg);
                }
                if let Some(anonymous) = anonymous {
                    self.attr_class(*anonymous);
                }
                type_of(file, *class)
            }
            ExprKind::NewArray {
                element,
                dims,
                extra_dims,
                init,
            } => {
                for dim in dims {
                    self.attr_expr(*dim);
                }
                let mut ty = type_of(file, *element);
                if !ty.is_errorish() {
                    for _ in 0..dims.len() + extra_dims {
                        ty = Type::array(ty);
                    }
                }
                if let Some(init) = init {
                    self.attr_with_expected(*init, &ty);
                }
                ty
            }
            ExprKind::ArrayInit(elements) => {
                for element in elements {
                    self.attr_expr(*element);
                }
                Type::Unknown
            }
            ExprKind::Assign { target, value, .. } => {
                let target_ty = self.attr_expr(*target);
                self.attr_with_expected(*value, &target_ty);
                target_ty
            }
            ExprKind::Binary { op, lhs, rhs, .. } => {
                let lhs = self.attr_expr(*lhs);
                let rhs = self.attr_expr(*rhs);
                self.binary_type(*op, &lhs, &rhs)
            }
            ExprKind::Unary { op, operand, .. } => {
                let operand = self.attr_expr(*operand);
                match op {
                    UnaryOp::Not => Type::Primitive(PrimitiveType::Boolean),
                    UnaryOp::BitNot => unary_numeric_promotion(env, &operand)
                        .filter(|p| p.is_integral())
                        .map_or(Type::Unknown, Type::Primitive),
                    UnaryOp::Plus | UnaryOp::Minus => unary_numeric_promotion(env, &operand)
                        .map_or(Type::Unknown, Type::Primitive),
                    _ => operand,
                }
            }
            ExprKind::Cast { ty, expr } => {
                self.attr_expr(*expr);
                type_of(file, *ty)
            }
            ExprKind::InstanceOf { expr, .. } => {
                self.attr_expr(*expr);
                Type::Primitive(PrimitiveType::Boolean)
            }
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                self.attr_expr(*condition);
                let then_ty = self.attr_expr(*then_expr);
                let else_ty = self.attr_expr(*else_expr);
                self.conditional_type(then_ty, else_ty)
            }
            ExprKind::ArrayAccess { array, index } => {
                let array = self.attr_expr(*array);
                self.attr_expr(*index);
                match array {
                    Type::Array(component) => *component,
                    _ => Type::Unknown,
                }
            }
            ExprKind::This(qualifier) => match qualifier {
                None => self
                    .current_class()
                    .map_or(Type::Unknown, |def| self.class_type(def)),
                Some(q) => match type_of(file, *q) {
                    Type::Class(ct) => self.class_type(ct.def),
                    _ => Type::Unknown,
                },
            },
            ExprKind::Super(qualifier) => {
                let class = match qualifier {
                    None => self.current_class(),
                    Some(q) => type_of(file, *q).as_class().map(|ct| ct.def),
                };
                class
                    .and_then(|def| env.class(def))
                    .map(|c| {
                        c.super_class
                            .clone()
                            .unwrap_or_else(|| Type::class(wk.object, vec![]))
                    })
                    .unwrap_or(Type::Unknown)
            }
            ExprKind::ClassLiteral(ty) => {
                let arg = match type_of(file, *ty) {
                    Type::Primitive(p) => boxed_type(env, p),
                    t if t.is_reference() => Some(t),
                    _ => None,
                };
                Type::class(wk.class, arg.into_iter().collect())
            }
            ExprKind::Paren(inner) => self.attr_expr(*inner),
        }
    }

    fn field_resolution(
        &self,
        owner: ClassId,
        index: usize,
        view_from: Option<&Type>,
        static_ctx: bool,
    ) -> (Resolution, Type) {
        let env = self.env();
        let Some(field) = env.class(owner).and_then(|c| c.fields.get(index)) else {
            return (Resolution::unresolved(), Type::Unknown);
        };
        let substitutor = match view_from {
            Some(receiver) => match instantiate_as_supertype(env, receiver, owner) {
                Some(Type::Class(ct)) => Substitutor::for_class_type(env, &ct),
                _ => Substitutor::empty(),
            },
            None => Substitutor::empty(),
        };
        let ty = substitutor.apply(env, &field.ty);
        let resolution = Resolution {
            symbol: Some(Symbol::Field { owner, index }),
            substitutor,
            is_valid: true,
            is_accessible: self
                .current_class()
                .map_or(true, |from| is_accessible(env, owner, field.visibility, from)),
            is_static_context_ok: field.is_static || !static_ctx,
        };
        (resolution, ty)
    }

    fn static_imports(&self) -> impl Iterator<Item = &'a ImportDecl> + 'a {
        let file = self.file;
        file.imports
            .iter()
            .map(move |id| &file.import_decls[*id])
            .filter(|i| i.is_static)
    }

    /// Class owning a statically imported member `name`.
    fn static_import_owner(&self, name: &str, has_member: impl Fn(ClassId) -> bool) -> Option<ClassId> {
        self.static_imports().find_map(|import| match &import.resolved {
            Some(ImportTarget::StaticMember { owner, name: member, .. }) if member == name && has_member(*owner) => {
                Some(*owner)
            }
            Some(ImportTarget::Class(owner)) if import.is_on_demand && has_member(*owner) => Some(*owner),
            _ => None,
        })
    }

    fn resolve_name(&self, name: &str) -> (Resolution, Type) {
        let env = self.env();
        for scope in self.scopes.iter().rev() {
            if let Some((_, var)) = scope.iter().rev().find(|(n, _)| n == name) {
                return (Resolution::resolved(Symbol::Local(*var)), self.var_type(*var));
            }
        }
        for frame in self.frames.iter().rev() {
            if let Some((owner, index)) = find_field(env, frame.def, name) {
                let this = self.class_type(frame.def);
                return self.field_resolution(owner, index, Some(&this), frame.static_ctx);
            }
        }
        let static_field = |owner: ClassId| {
            env.class(owner)
                .is_some_and(|c| c.fields.iter().any(|f| f.is_static && f.name == name))
        };
        if let Some(owner) = self.static_import_owner(name, static_field) {
            if let Some((field_owner, index)) = find_field(env, owner, name) {
                return self.field_resolution(field_owner, index, None, false);
            }
        }
        let class = self.frames.last().map(|f| f.decl);
        match lookup_type(env, self.file, name, class, self.method) {
            Some(TypeRefTarget::Class(def)) => (Resolution::resolved(Symbol::Class(def)), Type::Unknown),
            Some(TypeRefTarget::TypeParam(var)) => {
                (Resolution::resolved(Symbol::TypeParam(var)), Type::Unknown)
            }
            None if package_exists(self.store, name) => (
                Resolution::resolved(Symbol::Package(name.to_string())),
                Type::Unknown,
            ),
            None => (Resolution::unresolved(), Type::Unknown),
        }
    }

    fn resolve_field_access(&self, qualifier: ExprId, name: &str) -> (Resolution, Type) {
        let env = self.env();
        match self.symbol_of(qualifier) {
            Some(Symbol::Package(package)) => {
                let full = format!("{package}.{name}");
                if let Some(def) = exact_class(env, &full) {
                    (Resolution::resolved(Symbol::Class(def)), Type::Unknown)
                } else if package_exists(self.store, &full) {
                    (Resolution::resolved(Symbol::Package(full)), Type::Unknown)
                } else {
                    (Resolution::unresolved(), Type::Unknown)
                }
            }
            Some(Symbol::Class(owner)) => {
                if let Some(member) = find_member_class(env, *owner, name) {
                    return (Resolution::resolved(Symbol::Class(member)), Type::Unknown);
                }
                match find_field(env, *owner, name) {
                    Some((field_owner, index)) => {
                        let this = self.class_type(*owner);
                        self.field_resolution(field_owner, index, Some(&this), true)
                    }
                    None => (Resolution::unresolved(), Type::Unknown),
                }
            }
            Some(Symbol::TypeParam(_)) => (Resolution::unresolved(), Type::Unknown),
            _ => {
                let receiver = &self.types[self.file.skip_parens(qualifier).idx()];
                match receiver {
                    Type::Array(_) if name == "length" => {
                        (opaque_resolution(), Type::Primitive(PrimitiveType::Int))
                    }
                    ty if ty.is_errorish() => (opaque_resolution(), Type::Unknown),
                    ty => {
                        let class = match erasure(env, ty) {
                            Type::Class(ct) => Some(ct.def),
                            _ => None,
                        };
                        match class.and_then(|c| find_field(env, c, name)) {
                            Some((owner, index)) => self.field_resolution(owner, index, Some(ty), false),
                            None => (Resolution::unresolved(), Type::Unknown),
                        }
                    }
                }
            }
        }
    }

    fn call_type(&self, qualifier: Option<ExprId>, name: &str, args: &[Type]) -> Type {
        let env = self.env();
        let receiver = match qualifier {
            Some(q) => match self.symbol_of(q) {
                Some(Symbol::Class(def)) => Some(self.class_type(*def)),
                Some(Symbol::Package(_)) | Some(Symbol::TypeParam(_)) => None,
                _ => Some(self.types[self.file.skip_parens(q).idx()].clone()),
            },
            None => self.implicit_receiver(name),
        };
        let Some(receiver) = receiver.filter(|r| !r.is_errorish()) else {
            return Type::Unknown;
        };
        let candidates = collect_methods(env, &receiver, name);
        match resolve_overload(env, &candidates, args) {
            OverloadResolution::Resolved(candidate) => {
                let ret = candidate.return_type(env);
                if receiver.is_raw(env) {
                    erasure(env, &ret)
                } else {
                    ret
                }
            }
            OverloadResolution::Inapplicable(candidates) if candidates.len() == 1 => {
                candidates[0].return_type(env)
            }
            _ => Type::Unknown,
        }
    }

    /// Receiver of an unqualified call: the innermost enclosing class with a method `name`, then
    /// static imports.
    fn implicit_receiver(&self, name: &str) -> Option<Type> {
        let env = self.env();
        for frame in self.frames.iter().rev() {
            let this = self.class_type(frame.def);
            if !collect_methods(env, &this, name).is_empty() {
                return Some(this);
            }
        }
        let static_method = |owner: ClassId| {
            env.class(owner)
                .is_some_and(|c| c.methods.iter().any(|m| m.is_static && m.name == name))
        };
        self.static_import_owner(name, static_method)
            .map(|owner| self.class_type(owner))
    }

    fn is_string(&self, ty: &Type) -> bool {
        matches!(ty, Type::Class(ct) if ct.def == self.env().well_known().string)
    }

    fn is_boolean(&self, ty: &Type) -> bool {
        *ty == Type::Primitive(PrimitiveType::Boolean)
            || unboxed_type(self.env(), ty) == Some(PrimitiveType::Boolean)
    }

    fn binary_type(&self, op: BinaryOp, lhs: &Type, rhs: &Type) -> Type {
        let env = self.env();
        let boolean = Type::Primitive(PrimitiveType::Boolean);
        if op == BinaryOp::Add && (self.is_string(lhs) || self.is_string(rhs)) {
            return Type::class(env.well_known().string, vec![]);
        }
        match op {
            BinaryOp::Eq | BinaryOp::Ne | BinaryOp::And | BinaryOp::Or => boolean,
            _ if lhs.is_errorish() || rhs.is_errorish() => Type::Unknown,
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => {
                binary_numeric_promotion(env, lhs, rhs).map_or(Type::Unknown, Type::Primitive)
            }
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::UShr => {
                match (unary_numeric_promotion(env, lhs), unary_numeric_promotion(env, rhs)) {
                    (Some(l), Some(r)) if l.is_integral() && r.is_integral() => Type::Primitive(l),
                    _ => Type::Unknown,
                }
            }
            BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
                match binary_numeric_promotion(env, lhs, rhs) {
                    Some(_) => boolean,
                    None => Type::Unknown,
                }
            }
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor => {
                if self.is_boolean(lhs) && self.is_boolean(rhs) {
                    return boolean;
                }
                match binary_numeric_promotion(env, lhs, rhs) {
                    Some(p) if p.is_integral() => Type::Primitive(p),
                    _ => Type::Unknown,
                }
            }
        }
    }

    fn conditional_type(&self, then_ty: Type, else_ty: Type) -> Type {
        let env = self.env();
        if then_ty == else_ty {
            return then_ty;
        }
        if then_ty.is_errorish() || else_ty.is_errorish() {
            return Type::Unknown;
        }
        if self.is_boolean(&then_ty) && self.is_boolean(&else_ty) {
            return Type::Primitive(PrimitiveType::Boolean);
        }
        if then_ty.is_primitive() || else_ty.is_primitive() {
            if let Some(p) = binary_numeric_promotion(env, &then_ty, &else_ty) {
                return Type::Primitive(p);
            }
        }
        match (&then_ty, &else_ty) {
            (Type::Null, other) | (other, Type::Null) => {
                if let Type::Primitive(p) = other {
                    boxed_type(env, *p).unwrap_or(Type::Unknown)
                } else {
                    other.clone()
                }
            }
            _ if is_assignable(env, &else_ty, &then_ty) => else_ty,
            _ if is_assignable(env, &then_ty, &else_ty) => then_ty,
            _ => Type::class(env.well_known().object, vec![]),
        }
    }
}
