//! Call sites: method calls, instance creation, explicit constructor calls and enum constant
//! arguments.
//!
//! Resolution is recomputed from the tree rather than cached: the builder only records the type
//! of a call, not the candidate it picked. Diagnostics follow a fixed precedence: a missing
//! method, then ambiguity, then inapplicable arguments, and for a resolved call static context,
//! access, abstract `super` access and finally raw-receiver unchecked calls.

use nova_core::TextRange;
use nova_hir::{ConstructorCallKind, EnumConstantId, ExprId, ExprKind, ImportTarget, Symbol};
use nova_types::java::overload::{
    collect_constructors, collect_methods, resolve_overload, MethodCandidate, OverloadResolution,
};
use nova_types::{format_type, is_accessible, ClassId, ClassKind, Type, TypeEnv, Visibility};

use crate::codes;
use crate::context::{ClassFrame, FileContext};
use crate::diagnostic::{Diagnostic, Severity};
use crate::format::{arg_list, candidate_signature, declared_signature, mismatch_tooltip};
use crate::signature::erased;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CallKind {
    Method,
    New,
    Constructor(ConstructorCallKind),
    EnumConstant,
}

#[derive(Debug, Clone)]
pub(crate) struct CallSite {
    pub kind: CallKind,
    /// Method name, or the simple name of the instantiated class.
    pub name: String,
    pub receiver: Type,
    /// Qualified by a class name (or reached through a static import): only static methods apply.
    pub static_only: bool,
    pub via_super: bool,
    /// The enclosing class an unqualified call was resolved in.
    pub frame: Option<ClassFrame>,
    pub args: Vec<Type>,
    pub resolution: OverloadResolution,
    pub range: TextRange,
    pub name_range: TextRange,
    pub arg_list_range: TextRange,
}

impl CallSite {
    fn is_constructor(&self) -> bool {
        !matches!(self.kind, CallKind::Method)
    }

    /// The method or constructor the call resolved to, if resolution succeeded.
    pub fn resolved(&self) -> Option<&MethodCandidate> {
        match &self.resolution {
            OverloadResolution::Resolved(candidate) => Some(candidate),
            _ => None,
        }
    }
}

fn arg_types(ctx: &FileContext<'_>, args: &[ExprId]) -> Vec<Type> {
    args.iter().map(|a| ctx.expr_type(*a).clone()).collect()
}

/// Resolve the call at `expr`. `None` when the expression is not a call or when the receiver
/// could not be typed (that is reported where the receiver is).
pub(crate) fn call_site(ctx: &FileContext<'_>, expr: ExprId) -> Option<CallSite> {
    let file = ctx.file;
    let env = ctx.env;
    let node = &file.exprs[expr];
    match &node.kind {
        ExprKind::MethodCall {
            qualifier,
            name,
            name_range,
            args,
            arg_list_range,
        } => {
            let args = arg_types(ctx, args);
            let mut static_only = false;
            let mut via_super = false;
            let mut frame = None;
            let receiver = match qualifier {
                Some(q) => {
                    let q = file.skip_parens(*q);
                    if matches!(file.exprs[q].kind, ExprKind::Super(_)) {
                        via_super = true;
                    }
                    match ctx.symbol(q) {
                        Some(Symbol::Class(def)) => {
                            static_only = true;
                            ctx.class_type(*def)
                        }
                        Some(Symbol::Package(_)) | Some(Symbol::TypeParam(_)) => return None,
                        _ => {
                            let ty = ctx.expr_type(q);
                            if ty.is_errorish() || ty.is_primitive() || ty.is_void() {
                                return None;
                            }
                            ty.clone()
                        }
                    }
                }
                None => match implicit_receiver(ctx, name) {
                    Some((ty, found, is_import)) => {
                        frame = found;
                        static_only = is_import;
                        ty
                    }
                    None => ctx
                        .current_class_def()
                        .map_or(Type::Unknown, |def| ctx.class_type(def)),
                },
            };
            let candidates = if receiver.is_errorish() {
                Vec::new()
            } else {
                collect_methods(env, &receiver, name)
            };
            Some(CallSite {
                kind: CallKind::Method,
                name: name.clone(),
                resolution: resolve_overload(env, &candidates, &args),
                receiver,
                static_only,
                via_super,
                frame,
                args,
                range: node.range,
                name_range: *name_range,
                arg_list_range: *arg_list_range,
            })
        }
        ExprKind::New {
            class,
            args,
            arg_list_range,
            anonymous,
            ..
        } => {
            let type_ref = &file.type_refs[*class];
            let ty = type_ref.ty.clone();
            let def = env.class(ty.as_class()?.def)?;
            if def.kind == ClassKind::Enum || def.is_interface() || (def.is_abstract && anonymous.is_none()) {
                return None;
            }
            let args = arg_types(ctx, args);
            let candidates = collect_constructors(env, &ty);
            Some(CallSite {
                kind: CallKind::New,
                name: def.simple_name().to_string(),
                resolution: resolve_overload(env, &candidates, &args),
                receiver: ty,
                static_only: false,
                via_super: false,
                frame: None,
                args,
                range: node.range,
                name_range: type_ref.range,
                arg_list_range: *arg_list_range,
            })
        }
        ExprKind::ConstructorCall {
            kind,
            args,
            arg_list_range,
            ..
        } => {
            let current = ctx.current_class_def()?;
            let class = env.class(current)?;
            let receiver = match kind {
                ConstructorCallKind::This => ctx.class_type(current),
                ConstructorCallKind::Super if class.kind == ClassKind::Enum => return None,
                ConstructorCallKind::Super => class
                    .super_class
                    .clone()
                    .unwrap_or_else(|| Type::class(env.well_known().object, vec![])),
            };
            let name = receiver
                .as_class()
                .and_then(|ct| env.class(ct.def))
                .map(|c| c.simple_name().to_string())?;
            let args = arg_types(ctx, args);
            let candidates = collect_constructors(env, &receiver);
            Some(CallSite {
                kind: CallKind::Constructor(*kind),
                name,
                resolution: resolve_overload(env, &candidates, &args),
                receiver,
                static_only: false,
                via_super: false,
                frame: None,
                args,
                range: node.range,
                name_range: node.range,
                arg_list_range: *arg_list_range,
            })
        }
        _ => None,
    }
}

/// The enum constructor invoked by constant `id`.
pub(crate) fn enum_constant_site(ctx: &FileContext<'_>, id: EnumConstantId) -> Option<CallSite> {
    let file = ctx.file;
    let constant = &file.enum_constants[id];
    let def = file.classes[constant.owner].def;
    let receiver = Type::class(def, vec![]);
    let args = arg_types(ctx, &constant.args);
    let candidates = collect_constructors(ctx.env, &receiver);
    Some(CallSite {
        kind: CallKind::EnumConstant,
        name: ctx.env.class(def)?.simple_name().to_string(),
        resolution: resolve_overload(ctx.env, &candidates, &args),
        receiver,
        static_only: false,
        via_super: false,
        frame: None,
        args,
        range: constant.range,
        name_range: constant.name_range,
        arg_list_range: constant.arg_list_range.unwrap_or(constant.name_range),
    })
}

/// Receiver of an unqualified call: the innermost enclosing class declaring or inheriting a
/// method `name`, then single and on-demand static imports.
fn implicit_receiver(ctx: &FileContext<'_>, name: &str) -> Option<(Type, Option<ClassFrame>, bool)> {
    let env = ctx.env;
    for frame in ctx.class_chain() {
        let this = ctx.class_type(frame.def);
        if !collect_methods(env, &this, name).is_empty() {
            return Some((this, Some(frame), false));
        }
    }
    let has_static = |owner: ClassId| {
        env.class(owner)
            .is_some_and(|c| c.methods.iter().any(|m| m.is_static && m.name == name))
    };
    ctx.file
        .imports
        .iter()
        .map(|id| &ctx.file.import_decls[*id])
        .filter(|import| import.is_static)
        .find_map(|import| match &import.resolved {
            Some(ImportTarget::StaticMember { owner, name: member, .. })
                if member == name && has_static(*owner) =>
            {
                Some(*owner)
            }
            Some(ImportTarget::Class(owner)) if import.is_on_demand && has_static(*owner) => Some(*owner),
            _ => None,
        })
        .map(|owner| (ctx.class_type(owner), None, true))
}

fn owner_name(ctx: &FileContext<'_>, candidate: &MethodCandidate) -> String {
    ctx.env
        .class(candidate.owner)
        .map(|c| c.simple_name().to_string())
        .unwrap_or_default()
}

fn is_candidate_accessible(ctx: &FileContext<'_>, candidate: &MethodCandidate) -> bool {
    match ctx.current_class_def() {
        Some(from) => is_accessible(ctx.env, candidate.owner, candidate.visibility(ctx.env), from),
        None => true,
    }
}

fn is_static_ok(site: &CallSite, candidate: &MethodCandidate, env: &dyn TypeEnv) -> bool {
    if site.is_constructor() || candidate.is_static(env) {
        return true;
    }
    !site.static_only && site.frame.map_or(true, |f| f.has_instance)
}

/// Diagnostics for the call at `site`, in precedence order; at most one is produced.
pub(crate) fn check_call(ctx: &FileContext<'_>, site: &CallSite) -> Option<Diagnostic> {
    let env = ctx.env;
    match &site.resolution {
        OverloadResolution::NotFound => cannot_resolve(ctx, site),
        OverloadResolution::Ambiguous(a, b) => {
            let first = format!("{}.{}", owner_name(ctx, a), candidate_signature(env, a));
            let second = format!("{}.{}", owner_name(ctx, b), candidate_signature(env, b));
            Some(Diagnostic::error(
                codes::AMBIGUOUS_CALL,
                format!("Ambiguous method call: both '{first}' and '{second}' match"),
                site.arg_list_range,
            ))
        }
        OverloadResolution::Inapplicable(candidates) => {
            let usable: Vec<&MethodCandidate> = candidates
                .iter()
                .filter(|c| is_candidate_accessible(ctx, c) && is_static_ok(site, c, env))
                .collect();
            let closest = match (candidates.as_slice(), usable.as_slice()) {
                ([only], _) => Some(only),
                (_, [only]) => Some(*only),
                _ => None,
            };
            match closest {
                Some(candidate) => Some(argument_mismatch(ctx, site, candidate)),
                None => cannot_resolve(ctx, site),
            }
        }
        OverloadResolution::Resolved(candidate) => check_resolved(ctx, site, candidate),
    }
}

fn cannot_resolve(ctx: &FileContext<'_>, site: &CallSite) -> Option<Diagnostic> {
    if site.args.iter().any(Type::is_errorish) {
        return None;
    }
    let args = arg_list(ctx.env, &site.args);
    let diagnostic = if site.is_constructor() {
        Diagnostic::error(
            codes::CANNOT_RESOLVE_CONSTRUCTOR,
            format!("Cannot resolve constructor '{}{args}'", site.name),
            site.arg_list_range,
        )
    } else {
        Diagnostic::error(
            codes::CANNOT_RESOLVE_METHOD,
            format!("Cannot resolve method '{}{args}'", site.name),
            site.name_range,
        )
    };
    Some(diagnostic)
}

fn argument_mismatch(ctx: &FileContext<'_>, site: &CallSite, candidate: &MethodCandidate) -> Diagnostic {
    let env = ctx.env;
    let owner = owner_name(ctx, candidate);
    let signature = candidate_signature(env, candidate);
    Diagnostic::builder(Severity::Error, codes::ARGUMENT_MISMATCH, site.arg_list_range)
        .message(format!(
            "'{signature}' in '{owner}' cannot be applied to '{}'",
            arg_list(env, &site.args)
        ))
        .tooltip(mismatch_tooltip(env, candidate, &owner, &site.args))
        .build()
}

fn check_resolved(ctx: &FileContext<'_>, site: &CallSite, candidate: &MethodCandidate) -> Option<Diagnostic> {
    let env = ctx.env;
    let signature = candidate_signature(env, candidate);

    if !site.is_constructor() && !candidate.is_static(env) {
        if let (Some(frame), Some(prologue)) = (site.frame, ctx.constructor_prologue()) {
            if frame.decl == prologue {
                return Some(Diagnostic::error(
                    codes::REFERENCE_BEFORE_SUPER,
                    format!("Cannot reference '{signature}' before supertype constructor has been called"),
                    site.name_range,
                ));
            }
        }
    }
    if !is_static_ok(site, candidate, env) {
        return Some(Diagnostic::error(
            codes::STATIC_CONTEXT,
            format!("Non-static method '{signature}' cannot be referenced from a static context"),
            site.name_range,
        ));
    }
    if !is_candidate_accessible(ctx, candidate) {
        let owner = owner_name(ctx, candidate);
        let message = match candidate.visibility(env) {
            Visibility::Private => format!("'{signature}' has private access in '{owner}'"),
            Visibility::Protected => format!("'{signature}' has protected access in '{owner}'"),
            _ => format!("'{signature}' is not public in '{owner}'. Cannot be accessed from outside package"),
        };
        let range = if site.is_constructor() {
            site.arg_list_range
        } else {
            site.name_range
        };
        return Some(Diagnostic::error(codes::INACCESSIBLE, message, range));
    }
    if site.via_super && candidate.is_abstract(env) {
        return Some(Diagnostic::error(
            codes::ABSTRACT_SUPER_CALL,
            format!("Abstract method '{signature}' cannot be accessed directly"),
            site.range,
        ));
    }
    if matches!(site.kind, CallKind::Method | CallKind::New) && site.receiver.is_raw(env) {
        let declared = candidate.declared_params(env);
        if erased(env, declared).as_slice() != declared {
            return Some(Diagnostic::unchecked(
                codes::UNCHECKED_CALL,
                format!(
                    "Unchecked call to '{}' as a member of raw type '{}'",
                    declared_signature(env, candidate),
                    format_type(env, &site.receiver)
                ),
                site.range,
            ));
        }
    }
    None
}

/// The exceptions a resolved call may throw, as seen at the call site.
pub(crate) fn thrown_types(ctx: &FileContext<'_>, site: &CallSite) -> Vec<Type> {
    site.resolved()
        .map(|candidate| candidate.throws(ctx.env))
        .unwrap_or_default()
}
