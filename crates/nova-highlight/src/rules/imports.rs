//! Import declarations: the static import gate, unresolved imports and single-type import
//! conflicts.

use nova_core::JavaLanguageLevel;
use nova_hir::{ImportId, ImportTarget};

use super::level_gate;
use crate::codes;
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, QuickFix, Severity};

pub(crate) fn static_import_level(ctx: &FileContext<'_>, id: ImportId) -> Option<Diagnostic> {
    let import = &ctx.file.import_decls[id];
    if !import.is_static {
        return None;
    }
    level_gate(ctx, JavaLanguageLevel::Jdk1_5, "Static imports", import.range)
}

/// Single imports naming a class or static member that does not exist.
pub(crate) fn resolution(ctx: &FileContext<'_>, id: ImportId) -> Option<Diagnostic> {
    let import = &ctx.file.import_decls[id];
    let missing = match &import.resolved {
        None => !import.is_on_demand,
        Some(ImportTarget::StaticMember { exists, .. }) => !exists,
        Some(_) => false,
    };
    missing.then(|| {
        Diagnostic::error(
            codes::CANNOT_RESOLVE_SYMBOL,
            format!("Cannot resolve symbol '{}'", import.simple_name()),
            import.path_range,
        )
    })
}

/// A single-type import clashing with an earlier one or with a class of this file. Accepted
/// imports are remembered for the ones that follow.
pub(crate) fn single_type_conflict(ctx: &mut FileContext<'_>, id: ImportId) -> Option<Diagnostic> {
    let file = ctx.file;
    let import = &file.import_decls[id];
    if import.is_static || import.is_on_demand {
        return None;
    }
    let Some(ImportTarget::Class(def)) = import.resolved else {
        return None;
    };
    let simple = import.simple_name();
    let conflict = |message: String| {
        Diagnostic::builder(Severity::Error, codes::IMPORT_CONFLICT, import.range)
            .message(message)
            .fix(QuickFix::RemoveImport)
            .build()
    };

    let local = file
        .types
        .iter()
        .map(|class| &file.classes[*class])
        .find(|class| class.name == simple);
    if let Some(local) = local {
        if local.def != def {
            return Some(conflict(format!(
                "'{}' is already defined in this compilation unit",
                ctx.class_name(def)
            )));
        }
    }
    match ctx.single_imports.get(simple) {
        Some(earlier) if *earlier != def => Some(conflict(format!(
            "'{}' is already defined in a single-type import",
            ctx.class_name(*earlier)
        ))),
        Some(_) => None,
        None => {
            ctx.single_imports.insert(simple.to_string(), def);
            None
        }
    }
}
