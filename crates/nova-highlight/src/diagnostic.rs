//! The diagnostic record produced by the highlighting pass.

use std::fmt;

use nova_core::{JavaLanguageLevel, TextRange};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
    /// Generic type-safety warnings (raw types, unchecked casts and calls).
    UncheckedWarning,
    /// Informational markers such as reassigned parameters.
    Info,
}

impl Severity {
    pub(crate) const ALL: [Severity; 4] = [
        Severity::Error,
        Severity::Warning,
        Severity::UncheckedWarning,
        Severity::Info,
    ];

    pub(crate) fn idx(self) -> usize {
        match self {
            Severity::Error => 0,
            Severity::Warning => 1,
            Severity::UncheckedWarning => 2,
            Severity::Info => 3,
        }
    }
}

/// A corrective action offered alongside a diagnostic.
///
/// Fixes are descriptors only; applying them is up to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuickFix {
    AddModifier { modifier: &'static str },
    RemoveModifier { modifier: &'static str },
    MakeClassAbstract { class: String },
    ImplementMethods,
    RenameFile { to: String },
    AddDefaultConstructor,
    DeleteMethodBody,
    AddMethodBody,
    AddReturnType,
    ChangeVariableType { to: String },
    AddCast { to: String },
    AddExceptionToThrows { exception: String },
    SurroundWithTryCatch,
    RemoveAnnotation { name: String },
    AddMissingAttributes { names: Vec<String> },
    SetLanguageLevel { level: JavaLanguageLevel },
    InsertColon,
    DeleteCatch { exception: String },
    RemoveImport,
    DeleteElement,
}

impl QuickFix {
    /// The label shown to the user.
    pub fn text(&self) -> String {
        match self {
            QuickFix::AddModifier { modifier } => format!("Make '{modifier}'"),
            QuickFix::RemoveModifier { modifier } => format!("Remove '{modifier}' modifier"),
            QuickFix::MakeClassAbstract { class } => format!("Make '{class}' abstract"),
            QuickFix::ImplementMethods => "Implement methods".to_string(),
            QuickFix::RenameFile { to } => format!("Rename file to '{to}.java'"),
            QuickFix::AddDefaultConstructor => "Create constructor matching super".to_string(),
            QuickFix::DeleteMethodBody => "Delete method body".to_string(),
            QuickFix::AddMethodBody => "Add method body".to_string(),
            QuickFix::AddReturnType => "Add return type".to_string(),
            QuickFix::ChangeVariableType { to } => format!("Change variable type to '{to}'"),
            QuickFix::AddCast { to } => format!("Cast to '{to}'"),
            QuickFix::AddExceptionToThrows { exception } => {
                format!("Add '{exception}' to method signature")
            }
            QuickFix::SurroundWithTryCatch => "Surround with try/catch".to_string(),
            QuickFix::RemoveAnnotation { name } => format!("Remove '@{name}'"),
            QuickFix::AddMissingAttributes { names } => {
                format!("Add missing attributes: {}", names.join(", "))
            }
            QuickFix::SetLanguageLevel { level } => format!("Set language level to {level}"),
            QuickFix::InsertColon => "Insert ':'".to_string(),
            QuickFix::DeleteCatch { exception } => format!("Delete catch for '{exception}'"),
            QuickFix::RemoveImport => "Remove unused import".to_string(),
            QuickFix::DeleteElement => "Delete".to_string(),
        }
    }
}

impl fmt::Display for QuickFix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Fix {
    pub action: QuickFix,
    /// Where the fix applies when it differs from the diagnostic range.
    pub range: Option<TextRange>,
    pub options: Vec<String>,
    pub display_name: Option<String>,
}

impl From<QuickFix> for Fix {
    fn from(action: QuickFix) -> Self {
        Self {
            action,
            range: None,
            options: Vec::new(),
            display_name: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: &'static str,
    pub range: TextRange,
    pub message: String,
    /// Rich HTML rendering of the message, when there is one.
    pub tooltip: Option<String>,
    pub fixes: Vec<Fix>,
    /// Offset from the range start where editor navigation should land.
    pub navigation_shift: u32,
    /// Render after the last character of the line (zero-length ranges at line ends).
    pub after_end_of_line: bool,
}

impl Diagnostic {
    pub fn builder(severity: Severity, code: &'static str, range: TextRange) -> DiagnosticBuilder {
        DiagnosticBuilder {
            diagnostic: Diagnostic {
                severity,
                code,
                range,
                message: String::new(),
                tooltip: None,
                fixes: Vec::new(),
                navigation_shift: 0,
                after_end_of_line: false,
            },
        }
    }

    pub fn error(code: &'static str, message: impl Into<String>, range: TextRange) -> Self {
        Self::builder(Severity::Error, code, range).message(message).build()
    }

    pub fn warning(code: &'static str, message: impl Into<String>, range: TextRange) -> Self {
        Self::builder(Severity::Warning, code, range).message(message).build()
    }

    pub fn unchecked(code: &'static str, message: impl Into<String>, range: TextRange) -> Self {
        Self::builder(Severity::UncheckedWarning, code, range)
            .message(message)
            .build()
    }

    pub fn info(code: &'static str, message: impl Into<String>, range: TextRange) -> Self {
        Self::builder(Severity::Info, code, range).message(message).build()
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[derive(Clone, Debug)]
#[must_use]
pub struct DiagnosticBuilder {
    diagnostic: Diagnostic,
}

impl DiagnosticBuilder {
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.diagnostic.message = message.into();
        self
    }

    pub fn tooltip(mut self, tooltip: impl Into<String>) -> Self {
        self.diagnostic.tooltip = Some(tooltip.into());
        self
    }

    pub fn fix(mut self, fix: impl Into<Fix>) -> Self {
        self.diagnostic.fixes.push(fix.into());
        self
    }

    pub fn navigation_shift(mut self, shift: u32) -> Self {
        self.diagnostic.navigation_shift = shift;
        self
    }

    pub fn after_end_of_line(mut self, value: bool) -> Self {
        self.diagnostic.after_end_of_line = value;
        self
    }

    pub fn build(self) -> Diagnostic {
        self.diagnostic
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::TextSize;
    use pretty_assertions::assert_eq;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn builder_collects_fixes_in_order() {
        let diagnostic = Diagnostic::builder(Severity::Error, "X", range(1, 4))
            .message("m")
            .fix(QuickFix::RemoveModifier { modifier: "static" })
            .fix(Fix {
                display_name: Some("Change to 'int'".to_string()),
                ..Fix::from(QuickFix::ChangeVariableType { to: "int".to_string() })
            })
            .navigation_shift(2)
            .build();

        assert_eq!(diagnostic.message, "m");
        assert_eq!(diagnostic.navigation_shift, 2);
        let labels: Vec<String> = diagnostic.fixes.iter().map(|f| f.action.text()).collect();
        assert_eq!(
            labels,
            vec![
                "Remove 'static' modifier".to_string(),
                "Change variable type to 'int'".to_string()
            ]
        );
    }

    #[test]
    fn quick_fix_labels_mention_their_arguments() {
        assert_eq!(
            QuickFix::SetLanguageLevel {
                level: JavaLanguageLevel::Jdk1_5
            }
            .text(),
            "Set language level to 1.5"
        );
        assert_eq!(
            QuickFix::RenameFile { to: "Foo".to_string() }.to_string(),
            "Rename file to 'Foo.java'"
        );
    }
}
