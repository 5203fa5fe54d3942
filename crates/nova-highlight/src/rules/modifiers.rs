//! Modifier lists: repeats, modifiers not allowed in a context, and illegal combinations.

use nova_hir::{
    ClassContainer, ClassDeclId, InitializerId, MethodDeclId, Modifier, ModifierList, VarId, VarKind,
};
use nova_core::JavaLanguageLevel;
use nova_types::ClassKind;

use crate::codes;
use crate::context::FileContext;
use crate::diagnostic::{Diagnostic, QuickFix, Severity};

use Modifier::*;

const TOP_LEVEL_CLASS: &[Modifier] = &[Public, Abstract, Final, Strictfp];
const TOP_LEVEL_INTERFACE: &[Modifier] = &[Public, Abstract, Strictfp];
const TOP_LEVEL_ENUM: &[Modifier] = &[Public, Strictfp];
const MEMBER_CLASS: &[Modifier] = &[Public, Protected, Private, Abstract, Static, Final, Strictfp];
const MEMBER_INTERFACE: &[Modifier] = &[Public, Protected, Private, Abstract, Static, Strictfp];
const MEMBER_ENUM: &[Modifier] = &[Public, Protected, Private, Static, Strictfp];
const LOCAL_CLASS: &[Modifier] = &[Abstract, Final, Strictfp];

const CLASS_METHOD: &[Modifier] = &[
    Public, Protected, Private, Abstract, Static, Final, Synchronized, Native, Strictfp,
];
const INTERFACE_METHOD: &[Modifier] = &[Public, Abstract];
const INTERFACE_METHOD_8: &[Modifier] = &[Public, Abstract, Static, Strictfp];
const CONSTRUCTOR: &[Modifier] = &[Public, Protected, Private];
const ENUM_CONSTRUCTOR: &[Modifier] = &[Private];

const CLASS_FIELD: &[Modifier] = &[Public, Protected, Private, Static, Final, Transient, Volatile];
const INTERFACE_FIELD: &[Modifier] = &[Public, Static, Final];
const LOCAL: &[Modifier] = &[Final];
const INITIALIZER: &[Modifier] = &[Static];

const CLASS_CONFLICTS: &[(Modifier, Modifier)] = &[(Abstract, Final)];
const METHOD_CONFLICTS: &[(Modifier, Modifier)] = &[
    (Abstract, Static),
    (Abstract, Final),
    (Abstract, Private),
    (Abstract, Native),
    (Abstract, Synchronized),
    (Abstract, Strictfp),
    (Native, Strictfp),
];
const FIELD_CONFLICTS: &[(Modifier, Modifier)] = &[(Final, Volatile)];

fn conflicts(table: &[(Modifier, Modifier)], a: Modifier, b: Modifier) -> bool {
    if a == b {
        return false;
    }
    if a.is_access() && b.is_access() {
        return true;
    }
    table
        .iter()
        .any(|&(x, y)| (x == a && y == b) || (x == b && y == a))
}

/// Checks for one list, in order: repeats, then disallowed modifiers, then combinations. Each
/// stage only runs when the previous one found nothing.
fn check_list(list: &ModifierList, allowed: &[Modifier], table: &[(Modifier, Modifier)]) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for (idx, (modifier, range)) in list.keywords.iter().enumerate() {
        if list.keywords[..idx].iter().any(|(m, _)| m == modifier) {
            out.push(
                Diagnostic::builder(Severity::Error, codes::REPEATED_MODIFIER, *range)
                    .message("Repeated modifier")
                    .fix(QuickFix::RemoveModifier {
                        modifier: modifier.keyword(),
                    })
                    .build(),
            );
        }
    }
    if !out.is_empty() {
        return out;
    }

    for (modifier, range) in &list.keywords {
        if !allowed.contains(modifier) {
            out.push(
                Diagnostic::builder(Severity::Error, codes::MODIFIER_NOT_ALLOWED, *range)
                    .message(format!("Modifier '{}' not allowed here", modifier.keyword()))
                    .fix(QuickFix::RemoveModifier {
                        modifier: modifier.keyword(),
                    })
                    .build(),
            );
        }
    }
    if !out.is_empty() {
        return out;
    }

    for (modifier, range) in &list.keywords {
        let other = list
            .keywords
            .iter()
            .map(|(m, _)| *m)
            .find(|other| conflicts(table, *modifier, *other));
        if let Some(other) = other {
            out.push(
                Diagnostic::builder(Severity::Error, codes::ILLEGAL_MODIFIER_COMBINATION, *range)
                    .message(format!(
                        "Illegal combination of modifiers: '{}' and '{}'",
                        modifier.keyword(),
                        other.keyword()
                    ))
                    .fix(QuickFix::RemoveModifier {
                        modifier: modifier.keyword(),
                    })
                    .build(),
            );
        }
    }
    out
}

pub(crate) fn check_class(ctx: &FileContext<'_>, id: ClassDeclId) -> Vec<Diagnostic> {
    let decl = &ctx.file.classes[id];
    let allowed = match (decl.container, decl.kind) {
        (ClassContainer::Anonymous, _) => &[][..],
        (ClassContainer::Local, _) => LOCAL_CLASS,
        (ClassContainer::TopLevel, ClassKind::Class) => TOP_LEVEL_CLASS,
        (ClassContainer::TopLevel, ClassKind::Interface | ClassKind::Annotation) => TOP_LEVEL_INTERFACE,
        (ClassContainer::TopLevel, ClassKind::Enum) => TOP_LEVEL_ENUM,
        (ClassContainer::Member, ClassKind::Class) => MEMBER_CLASS,
        (ClassContainer::Member, ClassKind::Interface | ClassKind::Annotation) => MEMBER_INTERFACE,
        (ClassContainer::Member, ClassKind::Enum) => MEMBER_ENUM,
    };
    check_list(&decl.modifiers, allowed, CLASS_CONFLICTS)
}

pub(crate) fn check_method(ctx: &FileContext<'_>, id: MethodDeclId) -> Vec<Diagnostic> {
    let method = &ctx.file.methods[id];
    let owner = &ctx.file.classes[method.owner];
    let allowed = if method.is_constructor() {
        if owner.kind == ClassKind::Enum {
            ENUM_CONSTRUCTOR
        } else {
            CONSTRUCTOR
        }
    } else if owner.kind.is_interface() {
        if ctx.level.is_at_least(JavaLanguageLevel::Jdk1_8) && owner.kind == ClassKind::Interface {
            INTERFACE_METHOD_8
        } else {
            INTERFACE_METHOD
        }
    } else {
        CLASS_METHOD
    };
    check_list(&method.modifiers, allowed, METHOD_CONFLICTS)
}

pub(crate) fn check_var(ctx: &FileContext<'_>, id: VarId) -> Vec<Diagnostic> {
    let var = &ctx.file.vars[id];
    let allowed = match var.kind {
        VarKind::Field { owner, .. } if ctx.file.classes[owner].kind.is_interface() => INTERFACE_FIELD,
        VarKind::Field { .. } => CLASS_FIELD,
        _ => LOCAL,
    };
    check_list(&var.modifiers, allowed, FIELD_CONFLICTS)
}

pub(crate) fn check_initializer(ctx: &FileContext<'_>, id: InitializerId) -> Vec<Diagnostic> {
    check_list(&ctx.file.initializers[id].modifiers, INITIALIZER, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::{TextRange, TextSize};
    use pretty_assertions::assert_eq;

    fn list(modifiers: &[Modifier]) -> ModifierList {
        let keywords = modifiers
            .iter()
            .enumerate()
            .map(|(idx, m)| {
                let start = TextSize::from(idx as u32 * 10);
                (*m, TextRange::at(start, TextSize::from(m.keyword().len() as u32)))
            })
            .collect();
        ModifierList {
            keywords,
            ..ModifierList::default()
        }
    }

    fn messages(diagnostics: &[Diagnostic]) -> Vec<&str> {
        diagnostics.iter().map(|d| d.message.as_str()).collect()
    }

    #[test]
    fn both_sides_of_a_conflict_are_reported() {
        let found = check_list(&list(&[Public, Abstract, Final]), CLASS_METHOD, METHOD_CONFLICTS);
        assert_eq!(
            messages(&found),
            vec![
                "Illegal combination of modifiers: 'abstract' and 'final'",
                "Illegal combination of modifiers: 'final' and 'abstract'",
            ]
        );
    }

    #[test]
    fn repeats_win_over_other_problems() {
        let found = check_list(&list(&[Static, Static, Transient]), CLASS_METHOD, METHOD_CONFLICTS);
        assert_eq!(messages(&found), vec!["Repeated modifier"]);
        assert_eq!(found[0].range.start(), TextSize::from(10));

        let found = check_list(&list(&[Transient]), CLASS_METHOD, METHOD_CONFLICTS);
        assert_eq!(messages(&found), vec!["Modifier 'transient' not allowed here"]);
    }

    #[test]
    fn access_modifiers_are_exclusive() {
        let found = check_list(&list(&[Private, Public]), CLASS_FIELD, FIELD_CONFLICTS);
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].code, codes::ILLEGAL_MODIFIER_COMBINATION);
    }
}
