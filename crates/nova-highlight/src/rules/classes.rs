//! Class-level checks: declaration placement, the supertype lists, inheritance cycles and
//! conflicts, abstract-method completeness, implicit constructors and enclosing instances.

use std::collections::{HashMap, HashSet};

use nova_core::{JavaLanguageLevel, TextRange};
use nova_hir::{
    ClassContainer, ClassDeclId, ConstructorCallKind, ExprId, ExprKind, Member, Modifier, NodeId,
    StmtKind, VarKind,
};
use nova_types::java::overload::{collect_constructors, resolve_overload, MethodCandidate, OverloadResolution};
use nova_types::{
    canonicalize_named, direct_supertypes, format_type, is_accessible, is_inheritor, ClassId, ClassKind,
    Substitutor, Type, TypeEnv, Visibility,
};

use super::{exceptions, level_gate, type_ref_class};
use crate::codes;
use crate::constant;
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, QuickFix, Severity};
use crate::format::{candidate_signature, param_list};
use crate::signature::{first_unimplemented, inherited_return_clash};

pub(crate) fn language_level(ctx: &FileContext<'_>, id: ClassDeclId) -> Option<Diagnostic> {
    let decl = &ctx.file.classes[id];
    match decl.kind {
        ClassKind::Enum => level_gate(ctx, JavaLanguageLevel::Jdk1_5, "Enums", decl.name_range),
        ClassKind::Annotation => level_gate(ctx, JavaLanguageLevel::Jdk1_5, "Annotations", decl.name_range),
        _ => None,
    }
}

pub(crate) fn local_enum(ctx: &FileContext<'_>, id: ClassDeclId) -> Option<Diagnostic> {
    let decl = &ctx.file.classes[id];
    (decl.kind == ClassKind::Enum && decl.container == ClassContainer::Local)
        .then(|| Diagnostic::error(codes::LOCAL_ENUM, "Enum must not be local", decl.name_range))
}

pub(crate) fn public_class_file_name(ctx: &FileContext<'_>, id: ClassDeclId) -> Option<Diagnostic> {
    let decl = &ctx.file.classes[id];
    let stem = ctx.file.file_stem();
    if decl.container != ClassContainer::TopLevel || !decl.modifiers.has(Modifier::Public) || decl.name == stem {
        return None;
    }
    Some(
        Diagnostic::builder(Severity::Error, codes::PUBLIC_CLASS_FILE_NAME, decl.name_range)
            .message(format!(
                "Class '{0}' is public, should be declared in a file named '{0}.java'",
                decl.name
            ))
            .fix(QuickFix::RenameFile { to: decl.name.clone() })
            .build(),
    )
}

fn duplicate(ctx: &FileContext<'_>, id: ClassDeclId, name: String) -> Diagnostic {
    Diagnostic::error(
        codes::DUPLICATE_CLASS,
        format!("Duplicate class: '{name}'"),
        ctx.file.classes[id].name_range,
    )
}

/// Top-level classes clash with same-named classes in other files of the program and with earlier
/// ones in this file. Nested classes clash with earlier siblings and with any enclosing class.
pub(crate) fn duplicate_class(ctx: &FileContext<'_>, id: ClassDeclId) -> Option<Diagnostic> {
    let file = ctx.file;
    let decl = &file.classes[id];
    match decl.container {
        ClassContainer::Anonymous => None,
        ClassContainer::TopLevel => {
            let qualified = ctx.class_name(decl.def);
            let elsewhere = ctx
                .model
                .declaring_files(&qualified)
                .iter()
                .any(|other| *other != file.file_name);
            let earlier = file
                .types
                .iter()
                .take_while(|other| **other != id)
                .any(|other| file.classes[*other].name == decl.name);
            (elsewhere || earlier).then(|| duplicate(ctx, id, qualified))
        }
        ClassContainer::Member => {
            let parent = decl.parent?;
            let earlier_sibling = file.classes[parent]
                .members
                .iter()
                .take_while(|member| **member != Member::Class(id))
                .any(|member| matches!(member, Member::Class(other) if file.classes[*other].name == decl.name));
            (earlier_sibling || shadows_enclosing(ctx, id)).then(|| duplicate(ctx, id, decl.name.clone()))
        }
        ClassContainer::Local => {
            let earlier_in_block = match ctx.grandparent() {
                Some(NodeId::Stmt(block)) => match &file.stmts[block].kind {
                    StmtKind::Block(stmts) => stmts
                        .iter()
                        .take_while(|stmt| Some(NodeId::Stmt(**stmt)) != ctx.parent())
                        .any(|stmt| {
                            matches!(&file.stmts[*stmt].kind,
                                StmtKind::LocalClass(other) if file.classes[*other].name == decl.name)
                        }),
                    _ => false,
                },
                _ => false,
            };
            (earlier_in_block || shadows_enclosing(ctx, id)).then(|| duplicate(ctx, id, decl.name.clone()))
        }
    }
}

fn shadows_enclosing(ctx: &FileContext<'_>, id: ClassDeclId) -> bool {
    let file = ctx.file;
    let name = &file.classes[id].name;
    let mut current = file.classes[id].parent;
    while let Some(outer) = current {
        if file.classes[outer].name == *name {
            return true;
        }
        current = file.classes[outer].parent;
    }
    false
}

fn supertype_classes(env: &dyn TypeEnv, class: ClassId) -> Vec<ClassId> {
    let object = env.well_known().object;
    direct_supertypes(env, class)
        .iter()
        .filter_map(|ty| canonicalize_named(env, ty).as_class().map(|ct| ct.def))
        .filter(|def| *def != object)
        .collect()
}

/// Depth-first search for a path from `from` back to `target`. `visiting` backtracks so shared
/// ancestors reached along two paths are not mistaken for a cycle.
fn reaches(
    env: &dyn TypeEnv,
    from: ClassId,
    target: ClassId,
    visiting: &mut HashSet<ClassId>,
    done: &mut HashSet<ClassId>,
    path: &mut Vec<ClassId>,
) -> bool {
    if from == target {
        return true;
    }
    if done.contains(&from) || !visiting.insert(from) {
        return false;
    }
    path.push(from);
    for sup in supertype_classes(env, from) {
        if reaches(env, sup, target, visiting, done, path) {
            return true;
        }
    }
    path.pop();
    visiting.remove(&from);
    done.insert(from);
    false
}

/// Reported once per cycle, on the first member visited and at the supertype reference leading
/// into the cycle.
pub(crate) fn cyclic_inheritance(ctx: &mut FileContext<'_>, id: ClassDeclId) -> Option<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let decl = &file.classes[id];
    if ctx.reported_cycles.contains(&decl.def) {
        return None;
    }
    let mut done = HashSet::new();
    for reference in decl.extends.iter().chain(&decl.implements) {
        let Some(sup) = type_ref_class(file, *reference) else {
            continue;
        };
        let mut visiting = HashSet::new();
        let mut path = Vec::new();
        if reaches(env, sup, decl.def, &mut visiting, &mut done, &mut path) {
            ctx.reported_cycles.insert(decl.def);
            ctx.reported_cycles.extend(path);
            return Some(Diagnostic::error(
                codes::CYCLIC_INHERITANCE,
                format!("Cyclic inheritance involving '{}'", ctx.class_name(decl.def)),
                file.type_refs[*reference].range,
            ));
        }
    }
    None
}

/// Whether `class` sits on a cycle that was already reported; hierarchy checks skip those.
pub(crate) fn in_reported_cycle(ctx: &FileContext<'_>, id: ClassDeclId) -> bool {
    ctx.reported_cycles.contains(&ctx.file.classes[id].def)
}

/// `extends` and `implements` name the right kind of type, and nothing extends a final class or an
/// enum.
pub(crate) fn supertype_lists(ctx: &FileContext<'_>, id: ClassDeclId) -> Vec<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let decl = &file.classes[id];
    let mut out = Vec::new();

    let check_extends_class = |reference, out: &mut Vec<Diagnostic>| {
        let Some(def) = type_ref_class(file, reference) else {
            return;
        };
        let Some(class) = env.class(def) else {
            return;
        };
        let range = file.type_refs[reference].range;
        if class.is_interface() {
            if decl.container != ClassContainer::Anonymous {
                out.push(Diagnostic::error(codes::NO_INTERFACE_EXPECTED, "No interface expected here", range));
            }
        } else if def == env.well_known().enum_ {
            out.push(Diagnostic::error(
                codes::INHERIT_FROM_ENUM,
                "Classes cannot directly extend 'java.lang.Enum'",
                range,
            ));
        } else if class.kind == ClassKind::Enum {
            if decl.container != ClassContainer::Anonymous {
                out.push(Diagnostic::error(
                    codes::INHERIT_FROM_ENUM,
                    format!("Cannot inherit from enum '{}'", class.qualified_name()),
                    range,
                ));
            }
        } else if class.is_final {
            out.push(Diagnostic::error(
                codes::INHERIT_FROM_FINAL,
                format!("Cannot inherit from final '{}'", class.qualified_name()),
                range,
            ));
        }
    };
    let check_interface = |reference, out: &mut Vec<Diagnostic>| {
        let Some(class) = type_ref_class(file, reference).and_then(|def| env.class(def)) else {
            return;
        };
        if !class.is_interface() {
            out.push(Diagnostic::error(
                codes::INTERFACE_EXPECTED,
                "Interface expected here",
                file.type_refs[reference].range,
            ));
        }
    };

    match decl.kind {
        ClassKind::Class if decl.container == ClassContainer::Anonymous => {
            if let Some(base) = decl.anonymous_base {
                check_extends_class(base, &mut out);
            }
        }
        ClassKind::Class => {
            for reference in &decl.extends {
                check_extends_class(*reference, &mut out);
            }
            for reference in &decl.implements {
                check_interface(*reference, &mut out);
            }
        }
        ClassKind::Interface | ClassKind::Annotation => {
            for reference in &decl.extends {
                check_interface(*reference, &mut out);
            }
        }
        ClassKind::Enum => {
            for reference in &decl.implements {
                check_interface(*reference, &mut out);
            }
        }
    }
    out
}

fn type_args(env: &dyn TypeEnv, ty: &Type) -> String {
    match ty {
        Type::Class(ct) => {
            let args: Vec<String> = ct.args.iter().map(|a| format_type(env, a)).collect();
            args.join(", ")
        }
        other => format_type(env, other),
    }
}

/// The same generic interface reached along two paths with different type arguments.
pub(crate) fn inconsistent_inheritance(ctx: &FileContext<'_>, id: ClassDeclId) -> Option<Diagnostic> {
    let env = ctx.env;
    let decl = &ctx.file.classes[id];
    let mut reached: HashMap<ClassId, Type> = HashMap::new();
    let mut seen: HashSet<Type> = HashSet::new();
    let mut stack: Vec<Type> = direct_supertypes(env, decl.def)
        .iter()
        .map(|ty| canonicalize_named(env, ty))
        .collect();
    stack.reverse();

    while let Some(ty) = stack.pop() {
        let Some(ct) = ty.as_class() else {
            continue;
        };
        if !seen.insert(ty.clone()) {
            continue;
        }
        let Some(class) = env.class(ct.def) else {
            continue;
        };
        if class.is_interface() && !ty.is_raw(env) && !ct.args.is_empty() {
            match reached.get(&ct.def) {
                Some(previous) if *previous != ty => {
                    return Some(Diagnostic::error(
                        codes::INCONSISTENT_INHERITANCE,
                        format!(
                            "'{}' cannot be inherited with different type arguments: '{}' and '{}'",
                            class.qualified_name(),
                            type_args(env, previous),
                            type_args(env, &ty)
                        ),
                        decl.name_range,
                    ));
                }
                Some(_) => {}
                None => {
                    reached.insert(ct.def, ty.clone());
                }
            }
        }
        let subst = Substitutor::for_class_type(env, ct);
        let mut supers: Vec<Type> = direct_supertypes(env, ct.def)
            .iter()
            .map(|sup| subst.apply(env, &canonicalize_named(env, sup)))
            .collect();
        supers.reverse();
        stack.extend(supers);
    }
    None
}

fn class_header_range(ctx: &FileContext<'_>, id: ClassDeclId) -> TextRange {
    let decl = &ctx.file.classes[id];
    match (decl.container, decl.anonymous_base) {
        (ClassContainer::Anonymous, Some(base)) => ctx.file.type_refs[base].range,
        (ClassContainer::Anonymous, None) => decl.name_range,
        _ => TextRange::new(decl.range.start(), decl.name_range.end()),
    }
}

fn enum_constant_of_body(ctx: &FileContext<'_>, id: ClassDeclId) -> Option<String> {
    ctx.file
        .enum_constants
        .iter()
        .find(|(_, constant)| constant.body == Some(id))
        .map(|(_, constant)| constant.name.clone())
}

fn unimplemented_message(ctx: &FileContext<'_>, subject: &str, missing: &MethodCandidate) -> String {
    format!(
        "{subject} must either be declared abstract or implement abstract method '{}' in '{}'",
        candidate_signature(ctx.env, missing),
        ctx.env
            .class(missing.owner)
            .map(|c| c.simple_name().to_string())
            .unwrap_or_default()
    )
}

/// Concrete classes implement every inherited abstract method.
pub(crate) fn abstract_methods_implemented(ctx: &FileContext<'_>, id: ClassDeclId) -> Vec<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let decl = &file.classes[id];
    if decl.kind.is_interface() || decl.modifiers.has(Modifier::Abstract) {
        return Vec::new();
    }

    if decl.kind == ClassKind::Enum {
        let constants: Vec<_> = decl
            .members
            .iter()
            .filter_map(|member| match member {
                Member::EnumConstant(c) => Some(&file.enum_constants[*c]),
                _ => None,
            })
            .collect();
        if constants.iter().any(|c| c.body.is_some()) {
            let Some(missing) = first_unimplemented(env, decl.def) else {
                return Vec::new();
            };
            return constants
                .iter()
                .filter(|c| c.body.is_none())
                .map(|c| {
                    Diagnostic::error(
                        codes::ABSTRACT_METHOD_NOT_IMPLEMENTED,
                        unimplemented_message(ctx, &format!("Enum constant '{}'", c.name), &missing),
                        c.name_range,
                    )
                })
                .collect();
        }
    }

    let Some(missing) = first_unimplemented(env, decl.def) else {
        return Vec::new();
    };
    if missing.owner == decl.def {
        // Reported on the method itself.
        return Vec::new();
    }
    let subject = match decl.container {
        ClassContainer::Anonymous => match enum_constant_of_body(ctx, id) {
            Some(constant) => format!("Enum constant '{constant}'"),
            None => {
                let base = decl
                    .anonymous_base
                    .map(|b| format_type(env, &file.type_refs[b].ty))
                    .unwrap_or_default();
                format!("Anonymous class derived from {base}")
            }
        },
        _ => format!("Class '{}'", decl.name),
    };
    let mut builder = Diagnostic::builder(
        Severity::Error,
        codes::ABSTRACT_METHOD_NOT_IMPLEMENTED,
        class_header_range(ctx, id),
    )
    .message(unimplemented_message(ctx, &subject, &missing))
    .fix(QuickFix::ImplementMethods);
    if decl.container != ClassContainer::Anonymous && decl.kind == ClassKind::Class {
        builder = builder.fix(QuickFix::MakeClassAbstract {
            class: decl.name.clone(),
        });
    }
    vec![builder.build()]
}

/// Outcome of looking for the superclass constructor an implicit `super()` would call.
pub(crate) enum SuperConstructor {
    Found(MethodCandidate),
    /// The superclass has constructors but none accepts zero arguments.
    Missing(ClassId),
    Unknown,
}

pub(crate) fn implicit_super_constructor(ctx: &FileContext<'_>, id: ClassDeclId) -> SuperConstructor {
    let env = ctx.env;
    let decl = &ctx.file.classes[id];
    if decl.kind != ClassKind::Class {
        return SuperConstructor::Unknown;
    }
    let Some(sup) = env.class(decl.def).and_then(|c| c.super_class.clone()) else {
        return SuperConstructor::Unknown;
    };
    let sup = canonicalize_named(env, &sup);
    let Some(sup_def) = sup.as_class().map(|ct| ct.def) else {
        return SuperConstructor::Unknown;
    };
    match resolve_overload(env, &collect_constructors(env, &sup), &[]) {
        OverloadResolution::Resolved(candidate) => SuperConstructor::Found(candidate),
        OverloadResolution::Inapplicable(_) => SuperConstructor::Missing(sup_def),
        _ => SuperConstructor::Unknown,
    }
}

/// Problems with the constructor the compiler generates for a class declaring none.
pub(crate) fn default_constructor(ctx: &FileContext<'_>, id: ClassDeclId) -> Option<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let decl = &file.classes[id];
    if decl.container == ClassContainer::Anonymous {
        return None;
    }
    let declares_constructor = decl
        .members
        .iter()
        .any(|member| matches!(member, Member::Method(m) if file.methods[*m].is_constructor()));
    if declares_constructor {
        return None;
    }
    match implicit_super_constructor(ctx, id) {
        SuperConstructor::Missing(sup) => Some(
            Diagnostic::builder(Severity::Error, codes::NO_DEFAULT_CONSTRUCTOR, decl.name_range)
                .message(format!(
                    "There is no default constructor available in '{}'",
                    ctx.class_name(sup)
                ))
                .fix(QuickFix::AddDefaultConstructor)
                .build(),
        ),
        SuperConstructor::Found(candidate) => {
            if !is_accessible(env, candidate.owner, candidate.visibility(env), decl.def) {
                let owner = env
                    .class(candidate.owner)
                    .map(|c| c.simple_name().to_string())
                    .unwrap_or_default();
                let signature = format!("{owner}{}", param_list(env, &candidate.params(env)));
                let message = match candidate.visibility(env) {
                    Visibility::Private => format!("'{signature}' has private access in '{owner}'"),
                    Visibility::Protected => format!("'{signature}' has protected access in '{owner}'"),
                    _ => format!("'{signature}' is not public in '{owner}'. Cannot be accessed from outside package"),
                };
                return Some(Diagnostic::error(codes::INACCESSIBLE, message, decl.name_range));
            }
            exceptions::unhandled(ctx, &candidate.throws(env), decl.name_range, false)
        }
        SuperConstructor::Unknown => None,
    }
}

pub(crate) fn unrelated_return_types(ctx: &FileContext<'_>, id: ClassDeclId) -> Option<Diagnostic> {
    let env = ctx.env;
    let decl = &ctx.file.classes[id];
    let (a, b) = inherited_return_clash(env, decl.def)?;
    let owner = |c: &MethodCandidate| ctx.class_name(c.owner);
    Some(Diagnostic::error(
        codes::UNRELATED_RETURN_TYPES,
        format!(
            "'{}' in '{}' clashes with '{}' in '{}'; methods have unrelated return types",
            candidate_signature(env, &a),
            owner(&a),
            candidate_signature(env, &b),
            owner(&b)
        ),
        class_header_range(ctx, id),
    ))
}

/// Inner classes are non-static classes nested in a class: members without `static`, local and
/// anonymous classes.
fn is_inner(ctx: &FileContext<'_>, id: ClassDeclId) -> bool {
    let decl = &ctx.file.classes[id];
    if decl.kind != ClassKind::Class {
        return false;
    }
    match decl.container {
        ClassContainer::TopLevel => false,
        ClassContainer::Local | ClassContainer::Anonymous => true,
        ClassContainer::Member => {
            !decl.modifiers.has(Modifier::Static)
                && decl
                    .parent
                    .is_some_and(|p| ctx.file.classes[p].kind == ClassKind::Class)
        }
    }
}

/// Static members of inner classes, other than constant fields.
pub(crate) fn inner_static_declaration(ctx: &FileContext<'_>, node: NodeId) -> Option<Diagnostic> {
    let file = ctx.file;
    let (owner, range) = match node {
        NodeId::Method(id) => {
            let method = &file.methods[id];
            (method.owner, method.modifiers.range_of(Modifier::Static)?)
        }
        NodeId::Initializer(id) => {
            let init = &file.initializers[id];
            (init.owner, init.modifiers.range_of(Modifier::Static)?)
        }
        NodeId::Var(id) => {
            let var = &file.vars[id];
            let VarKind::Field { owner, .. } = var.kind else {
                return None;
            };
            let range = var.modifiers.range_of(Modifier::Static)?;
            let constant = var.modifiers.has(Modifier::Final)
                && var.initializer.is_some_and(|init| constant::is_constant(file, init));
            if constant {
                return None;
            }
            (owner, range)
        }
        NodeId::Class(id) => {
            let decl = &file.classes[id];
            if decl.container != ClassContainer::Member {
                return None;
            }
            let range = match decl.modifiers.range_of(Modifier::Static) {
                Some(range) => range,
                None if decl.kind != ClassKind::Class => decl.name_range,
                None => return None,
            };
            (decl.parent?, range)
        }
        _ => return None,
    };
    is_inner(ctx, owner).then(|| {
        Diagnostic::error(
            codes::INNER_CLASS_STATIC_DECLARATION,
            "Inner classes cannot have static declarations",
            range,
        )
    })
}

/// The class whose instance an inner member class `def` needs, if it needs one.
fn required_outer(ctx: &FileContext<'_>, def: ClassId) -> Option<ClassId> {
    let class = ctx.env.class(def)?;
    if class.is_static || class.kind != ClassKind::Class || class.is_anonymous() {
        return None;
    }
    let outer = class.enclosing?;
    match ctx.file.class_decl(def) {
        Some(decl) if ctx.file.classes[decl].container != ClassContainer::Member => None,
        _ => Some(outer),
    }
}

/// Whether an instance of `outer` (or of a subclass of it) is available at the current node.
fn has_enclosing_instance(ctx: &FileContext<'_>, outer: ClassId, skip_innermost: bool) -> bool {
    let env = ctx.env;
    ctx.class_chain()
        .into_iter()
        .skip(usize::from(skip_innermost))
        .find(|frame| frame.def == outer || is_inheritor(env, frame.def, outer, true))
        .is_some_and(|frame| frame.has_instance)
}

fn no_enclosing_instance(ctx: &FileContext<'_>, outer: ClassId, range: TextRange) -> Diagnostic {
    Diagnostic::error(
        codes::NO_ENCLOSING_INSTANCE,
        format!("No enclosing instance of type '{}' is in scope", ctx.class_name(outer)),
        range,
    )
}

/// `this`, `super`, `Outer.this` and `Outer.super` need an instance of the class they name, and
/// may not appear before the superclass constructor has run.
pub(crate) fn this_reference(ctx: &FileContext<'_>, expr: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let node = &file.exprs[expr];
    let (qualifier, keyword) = match node.kind {
        ExprKind::This(q) => (q, "this"),
        ExprKind::Super(q) => (q, "super"),
        _ => return None,
    };
    let chain = ctx.class_chain();
    let frame = match qualifier {
        None => *chain.first()?,
        Some(q) => {
            let def = type_ref_class(file, q)?;
            if keyword == "super" && env.class(def).is_some_and(|c| c.is_interface()) {
                return None;
            }
            match chain.iter().find(|frame| frame.def == def) {
                Some(frame) => *frame,
                None => {
                    return Some(Diagnostic::error(
                        codes::NOT_ENCLOSING_CLASS,
                        format!("'{}' is not an enclosing class", ctx.class_name(def)),
                        file.type_refs[q].range,
                    ))
                }
            }
        }
    };
    let text = ctx.text(node.range);
    if !frame.has_instance {
        return Some(Diagnostic::error(
            codes::STATIC_CONTEXT,
            format!("'{text}' cannot be referenced from a static context"),
            node.range,
        ));
    }
    if ctx.constructor_prologue() == Some(frame.decl) {
        let is_call_receiver = matches!(
            ctx.parent(),
            Some(NodeId::Expr(parent)) if matches!(file.exprs[parent].kind, ExprKind::ConstructorCall { qualifier: Some(q), .. } if q == expr)
        );
        if !is_call_receiver {
            return Some(Diagnostic::error(
                codes::REFERENCE_BEFORE_SUPER,
                format!("Cannot reference '{text}' before supertype constructor has been called"),
                node.range,
            ));
        }
    }
    None
}

/// Unqualified `new Inner()` of an inner member class needs an instance of its outer class.
pub(crate) fn new_enclosing_instance(ctx: &FileContext<'_>, expr: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    let ExprKind::New {
        qualifier: None,
        class,
        ..
    } = file.exprs[expr].kind
    else {
        return None;
    };
    let def = type_ref_class(file, class)?;
    let outer = required_outer(ctx, def)?;
    (!has_enclosing_instance(ctx, outer, false))
        .then(|| no_enclosing_instance(ctx, outer, file.type_refs[class].range))
}

/// Unqualified `super()` to an inner superclass needs an instance of the superclass's outer class,
/// looked up outside the class being constructed.
pub(crate) fn super_enclosing_instance(ctx: &FileContext<'_>, expr: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let ExprKind::ConstructorCall {
        kind: ConstructorCallKind::Super,
        qualifier: None,
        ..
    } = file.exprs[expr].kind
    else {
        return None;
    };
    let current = ctx.current_class_def()?;
    let sup = env.class(current)?.super_class.clone()?;
    let sup = canonicalize_named(env, &sup).as_class()?.def;
    let outer = required_outer(ctx, sup)?;
    (!has_enclosing_instance(ctx, outer, true)).then(|| no_enclosing_instance(ctx, outer, file.exprs[expr].range))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_types::{ClassDef, TypeStore};

    fn class(store: &mut TypeStore, name: &str, super_name: Option<ClassId>) -> ClassId {
        store.add_class(ClassDef {
            name: name.to_string(),
            super_class: super_name.map(|s| Type::class(s, vec![])),
            ..ClassDef::default()
        })
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut store = TypeStore::with_minimal_jdk();
        let c = class(&mut store, "C", None);
        let b = class(&mut store, "B", Some(c));
        let a = class(&mut store, "A", Some(b));

        let mut done = HashSet::new();
        let mut path = Vec::new();
        assert!(!reaches(&store, b, a, &mut HashSet::new(), &mut done, &mut path));
        assert!(path.is_empty());
        assert!(reaches(&store, a, c, &mut HashSet::new(), &mut HashSet::new(), &mut path));
    }

    #[test]
    fn cycle_path_lists_the_members() {
        let mut store = TypeStore::with_minimal_jdk();
        let a = store.intern_class_id("A");
        let b = class(&mut store, "B", Some(a));
        store.define_class(
            a,
            ClassDef {
                name: "A".to_string(),
                super_class: Some(Type::class(b, vec![])),
                ..ClassDef::default()
            },
        );

        let mut path = Vec::new();
        assert!(reaches(&store, b, a, &mut HashSet::new(), &mut HashSet::new(), &mut path));
        assert_eq!(path, vec![b]);
    }
}
