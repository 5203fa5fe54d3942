//! Method and constructor declarations: bodies, signatures, duplicates and erasure clashes, the
//! override suite, and explicit constructor calls.

use std::collections::HashSet;

use nova_core::JavaLanguageLevel;
use nova_hir::{
    ClassContainer, ConstructorCallKind, ExprId, ExprKind, Member, MethodDeclId, MethodSlot, Modifier,
    NodeId, StmtKind,
};
use nova_types::java::overload::MethodCandidate;
use nova_types::{erasure, format_type, is_subtype, is_unchecked_exception, ClassKind, MethodDef, Type};

use super::classes::{implicit_super_constructor, SuperConstructor};
use super::{exceptions, is_unchecked_conversion, level_gate};
use crate::calls::call_site;
use crate::codes;
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, QuickFix, Severity};
use crate::format::{candidate_signature, method_signature, param_list};
use crate::signature::{erased, erasure_clashes, super_methods};

fn method_def<'e>(ctx: &FileContext<'e>, id: MethodDeclId) -> Option<&'e MethodDef> {
    let method = &ctx.file.methods[id];
    let MethodSlot::Method(index) = method.slot else {
        return None;
    };
    let def = ctx.file.classes[method.owner].def;
    ctx.env.class(def)?.methods.get(index)
}

/// Parameter types of a method or constructor declaration, as registered.
fn declared_params(ctx: &FileContext<'_>, id: MethodDeclId) -> Vec<Type> {
    let file = ctx.file;
    file.methods[id]
        .params
        .iter()
        .map(|p| file.type_refs[file.vars[*p].ty].ty.clone())
        .collect()
}

/// `name(P1, P2)` for a declaration; constructors use the class name.
fn signature_of(ctx: &FileContext<'_>, id: MethodDeclId) -> String {
    let method = &ctx.file.methods[id];
    match method_def(ctx, id) {
        Some(def) => method_signature(ctx.env, def),
        None => format!("{}{}", method.name, param_list(ctx.env, &declared_params(ctx, id))),
    }
}

pub(crate) fn varargs_level(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let file = ctx.file;
    let vararg = file.methods[id].params.iter().find(|p| file.vars[**p].is_varargs)?;
    level_gate(
        ctx,
        JavaLanguageLevel::Jdk1_5,
        "Variable arity methods",
        file.vars[*vararg].range,
    )
}

pub(crate) fn body(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let file = ctx.file;
    let method = &file.methods[id];
    let owner = &file.classes[method.owner];
    let modifiers = &method.modifiers;
    let range = method.name_range;

    if owner.kind.is_interface() {
        let static_allowed = modifiers.has(Modifier::Static)
            && owner.kind == ClassKind::Interface
            && ctx.level.is_at_least(JavaLanguageLevel::Jdk1_8);
        return match (method.body.is_some(), static_allowed) {
            (true, false) => Some(
                Diagnostic::builder(Severity::Error, codes::INTERFACE_METHOD_BODY, range)
                    .message("Interface methods cannot have body")
                    .fix(QuickFix::DeleteMethodBody)
                    .build(),
            ),
            (false, true) => Some(
                Diagnostic::builder(Severity::Error, codes::MISSING_METHOD_BODY, range)
                    .message("Missing method body, or declare abstract")
                    .fix(QuickFix::AddMethodBody)
                    .build(),
            ),
            _ => None,
        };
    }
    if method.body.is_some() {
        if modifiers.has(Modifier::Abstract) {
            return Some(
                Diagnostic::builder(Severity::Error, codes::ABSTRACT_METHOD_BODY, range)
                    .message("Abstract methods cannot have a body")
                    .fix(QuickFix::DeleteMethodBody)
                    .fix(QuickFix::RemoveModifier { modifier: "abstract" })
                    .build(),
            );
        }
        if modifiers.has(Modifier::Native) {
            return Some(
                Diagnostic::builder(Severity::Error, codes::NATIVE_METHOD_BODY, range)
                    .message("Native methods cannot have a body")
                    .fix(QuickFix::DeleteMethodBody)
                    .fix(QuickFix::RemoveModifier { modifier: "native" })
                    .build(),
            );
        }
        return None;
    }
    if modifiers.has(Modifier::Abstract) || modifiers.has(Modifier::Native) {
        return None;
    }
    Some(
        Diagnostic::builder(Severity::Error, codes::MISSING_METHOD_BODY, range)
            .message("Missing method body, or declare abstract")
            .fix(QuickFix::AddMethodBody)
            .fix(QuickFix::AddModifier { modifier: "abstract" })
            .build(),
    )
}

pub(crate) fn abstract_in_concrete_class(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let file = ctx.file;
    let method = &file.methods[id];
    let owner = &file.classes[method.owner];
    let keyword = method.modifiers.range_of(Modifier::Abstract)?;
    if owner.kind != ClassKind::Class || owner.modifiers.has(Modifier::Abstract) {
        return None;
    }
    let mut builder = Diagnostic::builder(
        Severity::Error,
        codes::ABSTRACT_METHOD_IN_NON_ABSTRACT_CLASS,
        keyword,
    )
    .message("Abstract method in non-abstract class")
    .fix(QuickFix::RemoveModifier { modifier: "abstract" });
    if owner.container != ClassContainer::Anonymous {
        builder = builder.fix(QuickFix::MakeClassAbstract {
            class: owner.name.clone(),
        });
    }
    Some(builder.build())
}

pub(crate) fn return_type_required(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let method = &ctx.file.methods[id];
    (!method.is_constructor() && method.return_type.is_none()).then(|| {
        Diagnostic::builder(Severity::Error, codes::MISSING_RETURN_TYPE, method.name_range)
            .message("Invalid method declaration; return type required")
            .fix(QuickFix::AddReturnType)
            .build()
    })
}

pub(crate) fn vararg_not_last(ctx: &FileContext<'_>, id: MethodDeclId) -> Vec<Diagnostic> {
    let file = ctx.file;
    let params = &file.methods[id].params;
    let Some((_, init)) = params.split_last() else {
        return Vec::new();
    };
    init.iter()
        .filter(|p| file.vars[**p].is_varargs)
        .map(|p| {
            Diagnostic::error(
                codes::VARARG_NOT_LAST,
                "Vararg parameter must be the last in the list",
                file.vars[*p].range,
            )
        })
        .collect()
}

pub(crate) fn annotation_member_parameters(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let method = &ctx.file.methods[id];
    let owner = &ctx.file.classes[method.owner];
    (owner.kind == ClassKind::Annotation && !method.params.is_empty()).then(|| {
        Diagnostic::error(
            codes::ANNOTATION_MEMBER_PARAMETERS,
            "@interface members may not have parameters",
            method.param_list_range,
        )
    })
}

/// Earlier declarations in the same class with the same name and erased parameters. Identical
/// parameter lists are duplicates; lists that only erase alike are erasure clashes.
pub(crate) fn duplicate_method(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let file = ctx.file;
    let env = ctx.env;
    let method = &file.methods[id];
    let owner = &file.classes[method.owner];
    let mine = declared_params(ctx, id);
    if mine.iter().any(Type::is_errorish) {
        return None;
    }
    let mine_erased = erased(env, &mine);

    for member in &owner.members {
        let Member::Method(other) = *member else {
            continue;
        };
        if other == id {
            break;
        }
        let other_decl = &file.methods[other];
        if other_decl.is_constructor() != method.is_constructor() || other_decl.name != method.name {
            continue;
        }
        let theirs = declared_params(ctx, other);
        if erased(env, &theirs) != mine_erased {
            continue;
        }
        let diagnostic = if theirs == mine {
            Diagnostic::error(
                codes::DUPLICATE_METHOD,
                format!(
                    "'{}' is already defined in '{}'",
                    signature_of(ctx, id),
                    ctx.class_name(owner.def)
                ),
                method.name_range,
            )
        } else {
            Diagnostic::error(
                codes::SAME_ERASURE,
                format!(
                    "'{}' clashes with '{}'; both methods have same erasure",
                    signature_of(ctx, id),
                    signature_of(ctx, other)
                ),
                method.name_range,
            )
        };
        return Some(diagnostic);
    }
    None
}

/// An inherited method with the same erasure that this one does not override.
pub(crate) fn inherited_erasure_clash(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let env = ctx.env;
    let method = &ctx.file.methods[id];
    let def = method_def(ctx, id)?;
    if def.is_static || def.params.iter().any(Type::is_errorish) {
        return None;
    }
    let class = ctx.file.classes[method.owner].def;
    let clash = erasure_clashes(env, class, def).into_iter().next()?;
    Some(Diagnostic::error(
        codes::SAME_ERASURE,
        format!(
            "'{}' in '{}' clashes with '{}' in '{}'; both methods have same erasure, yet neither overrides the other",
            method_signature(env, def),
            ctx.class_name(class),
            candidate_signature(env, &clash),
            ctx.class_name(clash.owner)
        ),
        method.name_range,
    ))
}

struct Override<'a> {
    mine: &'a MethodDef,
    mine_owner: String,
    theirs: &'a MethodCandidate,
    theirs_owner: String,
}

impl Override<'_> {
    fn clash(&self, ctx: &FileContext<'_>) -> String {
        format!(
            "'{}' in '{}' clashes with '{}' in '{}'",
            method_signature(ctx.env, self.mine),
            self.mine_owner,
            candidate_signature(ctx.env, self.theirs),
            self.theirs_owner
        )
    }
}

/// Static/instance mismatch, overriding a final method, weaker access, incompatible return types
/// and new checked exceptions, against each overridden method in turn.
pub(crate) fn overrides(ctx: &FileContext<'_>, id: MethodDeclId) -> Vec<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let method = &file.methods[id];
    let Some(mine) = method_def(ctx, id) else {
        return Vec::new();
    };
    let class = file.classes[method.owner].def;
    let mut out = Vec::new();

    for theirs in super_methods(env, class, mine) {
        let Some(super_def) = theirs.method(env) else {
            continue;
        };
        let o = Override {
            mine,
            mine_owner: ctx.class_name(class),
            theirs: &theirs,
            theirs_owner: ctx.class_name(theirs.owner),
        };
        let mine_sig = method_signature(env, mine);
        let theirs_sig = candidate_signature(env, &theirs);

        if mine.is_static != super_def.is_static {
            let message = if mine.is_static {
                format!(
                    "Static method '{mine_sig}' in '{}' cannot override instance method '{theirs_sig}' in '{}'",
                    o.mine_owner, o.theirs_owner
                )
            } else {
                format!(
                    "Instance method '{mine_sig}' in '{}' cannot override static method '{theirs_sig}' in '{}'",
                    o.mine_owner, o.theirs_owner
                )
            };
            out.push(Diagnostic::error(codes::STATIC_OVERRIDE, message, method.name_range));
            break;
        }
        if super_def.is_final {
            out.push(
                Diagnostic::builder(Severity::Error, codes::FINAL_OVERRIDE, method.name_range)
                    .message(format!(
                        "'{mine_sig}' cannot override '{theirs_sig}' in '{}'; overridden method is final",
                        o.theirs_owner
                    ))
                    .build(),
            );
            break;
        }
        if mine.is_static {
            continue;
        }
        if mine.visibility < super_def.visibility {
            let range = method.modifiers.keywords.iter().find(|(m, _)| m.is_access()).map_or(method.name_range, |(_, r)| *r);
            out.push(
                Diagnostic::builder(Severity::Error, codes::WEAKER_ACCESS, range)
                    .message(format!(
                        "{}; attempting to assign weaker access privileges ('{}'); was '{}'",
                        o.clash(ctx),
                        mine.visibility.keyword(),
                        super_def.visibility.keyword()
                    ))
                    .fix(QuickFix::AddModifier {
                        modifier: super_def.visibility.keyword(),
                    })
                    .build(),
            );
            break;
        }
        if let Some(diagnostic) = return_type(ctx, id, &o) {
            let is_error = diagnostic.is_error();
            out.push(diagnostic);
            if is_error {
                break;
            }
        }
        if let Some(diagnostic) = throws(ctx, id, &o) {
            out.push(diagnostic);
            break;
        }
    }
    out
}

fn return_type(ctx: &FileContext<'_>, id: MethodDeclId, o: &Override<'_>) -> Option<Diagnostic> {
    let env = ctx.env;
    let method = &ctx.file.methods[id];
    let mine = &o.mine.return_type;
    let theirs = o.theirs.return_type(env);
    if mine.is_errorish() || theirs.is_errorish() {
        return None;
    }
    let range = method
        .return_type
        .map_or(method.name_range, |t| ctx.file.type_refs[t].range);
    let incompatible = || {
        Diagnostic::builder(Severity::Error, codes::INCOMPATIBLE_RETURN_TYPE, range)
            .message(format!("{}; attempting to use incompatible return type", o.clash(ctx)))
    };

    if mine.is_primitive() || mine.is_void() || theirs.is_primitive() || theirs.is_void() {
        return (*mine != theirs).then(|| incompatible().build());
    }
    if !ctx.level.is_at_least(JavaLanguageLevel::Jdk1_5) {
        if erasure(env, mine) == erasure(env, &theirs) {
            return None;
        }
        let mut builder = incompatible();
        if is_subtype(env, mine, &theirs) {
            builder = builder.fix(QuickFix::SetLanguageLevel {
                level: JavaLanguageLevel::Jdk1_5,
            });
        }
        return Some(builder.build());
    }
    if is_subtype(env, mine, &theirs) {
        return None;
    }
    if is_unchecked_conversion(env, &theirs, mine) {
        return ctx.config.report_unchecked.then(|| {
            Diagnostic::unchecked(
                codes::UNCHECKED_OVERRIDE,
                format!(
                    "Unchecked overriding: return type requires unchecked conversion. Found '{}', required '{}'",
                    format_type(env, mine),
                    format_type(env, &theirs)
                ),
                range,
            )
        });
    }
    if is_subtype(env, &erasure(env, mine), &erasure(env, &theirs)) {
        return None;
    }
    Some(incompatible().build())
}

fn throws(ctx: &FileContext<'_>, id: MethodDeclId, o: &Override<'_>) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let allowed = o.theirs.throws(env);
    if allowed.iter().any(Type::is_errorish) {
        return None;
    }
    file.methods[id].throws.iter().find_map(|reference| {
        let thrown = &file.type_refs[*reference].ty;
        if thrown.is_errorish() || is_unchecked_exception(env, thrown) {
            return None;
        }
        if allowed.iter().any(|a| is_subtype(env, thrown, a)) {
            return None;
        }
        Some(Diagnostic::error(
            codes::OVERRIDE_THROWS,
            format!(
                "{}; overridden method does not throw '{}'",
                o.clash(ctx),
                format_type(env, thrown)
            ),
            file.type_refs[*reference].range,
        ))
    })
}

/// `@Override` on a method that overrides nothing.
pub(crate) fn override_annotation(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let method = &file.methods[id];
    let override_class = env.lookup_class("java.lang.Override")?;
    let annotation = method
        .modifiers
        .annotations
        .iter()
        .find(|a| file.annotations[**a].resolved == Some(override_class))?;
    let def = method_def(ctx, id)?;
    if def.params.iter().any(Type::is_errorish) {
        return None;
    }
    let class = file.classes[method.owner].def;
    let overrides_something = !def.is_static && !super_methods(env, class, def).is_empty();
    (!overrides_something).then(|| {
        Diagnostic::builder(
            Severity::Error,
            codes::METHOD_DOES_NOT_OVERRIDE,
            file.annotations[*annotation].range,
        )
        .message("Method does not override method from its superclass")
        .fix(QuickFix::RemoveAnnotation {
            name: "Override".to_string(),
        })
        .build()
    })
}

/// The explicit `this(...)` or `super(...)` call opening a constructor body.
fn leading_constructor_call(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<ExprId> {
    let file = ctx.file;
    let body = file.methods[id].body?;
    let StmtKind::Block(stmts) = &file.stmts[body].kind else {
        return None;
    };
    let StmtKind::Expr(expr) = file.stmts[*stmts.first()?].kind else {
        return None;
    };
    matches!(file.exprs[expr].kind, ExprKind::ConstructorCall { .. }).then_some(expr)
}

/// Constructors whose `this(...)` chain leads back to themselves.
pub(crate) fn recursive_constructor(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let file = ctx.file;
    let owner = &file.classes[file.methods[id].owner];
    let constructors: Vec<(usize, MethodDeclId)> = owner
        .members
        .iter()
        .filter_map(|member| match *member {
            Member::Method(m) => match file.methods[m].slot {
                MethodSlot::Constructor(index) => Some((index, m)),
                MethodSlot::Method(_) => None,
            },
            Member::Field(_) | Member::Class(_) | Member::Initializer(_) | Member::EnumConstant(_) => None,
        })
        .collect();
    let this_target = |m: MethodDeclId| -> Option<(MethodDeclId, ExprId)> {
        let call = leading_constructor_call(ctx, m)?;
        if !matches!(
            file.exprs[call].kind,
            ExprKind::ConstructorCall {
                kind: ConstructorCallKind::This,
                ..
            }
        ) {
            return None;
        }
        let site = call_site(ctx, call)?;
        let target = site.resolved()?;
        let next = constructors
            .iter()
            .find(|(index, _)| *index == target.index)
            .map(|(_, m)| *m)?;
        Some((next, call))
    };

    let (mut current, call) = this_target(id)?;
    let mut seen = HashSet::from([id]);
    loop {
        if current == id {
            return Some(Diagnostic::error(
                codes::RECURSIVE_CONSTRUCTOR_CALL,
                "Recursive constructor invocation",
                file.exprs[call].range,
            ));
        }
        if !seen.insert(current) {
            return None;
        }
        current = this_target(current)?.0;
    }
}

/// A constructor without an explicit `this(...)` or `super(...)` calls the superclass's no-arg
/// constructor, which must exist and whose checked exceptions the constructor must declare.
pub(crate) fn implicit_super_call(ctx: &FileContext<'_>, id: MethodDeclId) -> Option<Diagnostic> {
    let env = ctx.env;
    let file = ctx.file;
    let method = &file.methods[id];
    if !method.is_constructor() || method.body.is_none() || leading_constructor_call(ctx, id).is_some() {
        return None;
    }
    match implicit_super_constructor(ctx, method.owner) {
        SuperConstructor::Missing(sup) => Some(
            Diagnostic::builder(Severity::Error, codes::NO_DEFAULT_CONSTRUCTOR, method.name_range)
                .message(format!(
                    "There is no default constructor available in '{}'",
                    ctx.class_name(sup)
                ))
                .build(),
        ),
        SuperConstructor::Found(candidate) => {
            let declared: Vec<Type> = method
                .throws
                .iter()
                .map(|t| file.type_refs[*t].ty.clone())
                .collect();
            if declared.iter().any(Type::is_errorish) {
                return None;
            }
            let thrown: Vec<Type> = candidate
                .throws(env)
                .into_iter()
                .filter(|ty| !declared.iter().any(|d| is_subtype(env, ty, d)))
                .collect();
            exceptions::unhandled(ctx, &thrown, method.name_range, true)
        }
        SuperConstructor::Unknown => None,
    }
}

/// `this(...)` and `super(...)` only open a constructor body, and enums never call `super(...)`.
pub(crate) fn constructor_call_placement(ctx: &FileContext<'_>, expr: ExprId) -> Option<Diagnostic> {
    let file = ctx.file;
    let ExprKind::ConstructorCall { kind, .. } = file.exprs[expr].kind else {
        return None;
    };
    let range = file.exprs[expr].range;
    let n = ctx.path.len();
    let placed_first = n >= 3
        && match (ctx.path[n - 1], ctx.path[n - 2], ctx.path[n - 3]) {
            (NodeId::Stmt(stmt), NodeId::Stmt(block), NodeId::Method(method)) => {
                let method = &file.methods[method];
                let first = match &file.stmts[block].kind {
                    StmtKind::Block(stmts) => stmts.first() == Some(&stmt),
                    _ => false,
                };
                method.is_constructor() && method.body == Some(block) && first
            }
            _ => false,
        };
    if !placed_first {
        return Some(Diagnostic::error(
            codes::CONSTRUCTOR_CALL_NOT_FIRST,
            format!(
                "Call to '{}()' must be first statement in constructor body",
                kind.keyword()
            ),
            range,
        ));
    }
    let owner = ctx.enclosing_class()?;
    (kind == ConstructorCallKind::Super && file.classes[owner].kind == ClassKind::Enum).then(|| {
        Diagnostic::error(
            codes::ENUM_SUPER_CALL,
            "Call to super is not allowed in enum constructor",
            range,
        )
    })
}

