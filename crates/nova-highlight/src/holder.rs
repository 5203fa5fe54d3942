//! The per-file diagnostic sink.

use std::fmt;

use nova_core::TextSize;

use crate::diagnostic::{Diagnostic, Severity};
use crate::error::{HighlightError, Result};

type Filter = Box<dyn Fn(&Diagnostic) -> bool + Send + Sync>;

/// Append-only log of the diagnostics found in one file.
///
/// The holder must be writable for any mutation; hosts flip it writable for a pass and freeze it
/// before handing the results to a presentation layer. Per-severity counters always match the
/// records: they grow by one per accepted record and only drop back to zero on [`Self::clear`].
pub struct HighlightHolder {
    file_name: String,
    file_len: TextSize,
    records: Vec<Diagnostic>,
    counts: [usize; 4],
    writable: bool,
    suppressed_codes: Vec<String>,
    filter: Option<Filter>,
}

impl HighlightHolder {
    /// A writable holder for a file of `file_len` bytes.
    pub fn new(file_name: impl Into<String>, file_len: TextSize) -> Self {
        Self {
            file_name: file_name.into(),
            file_len,
            records: Vec::new(),
            counts: [0; 4],
            writable: true,
            suppressed_codes: Vec::new(),
            filter: None,
        }
    }

    /// Drop diagnostics whose code is listed.
    pub fn with_suppressed_codes(mut self, codes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.suppressed_codes = codes.into_iter().map(Into::into).collect();
        self
    }

    /// Install an acceptance predicate; rejected diagnostics are silently dropped.
    pub fn with_filter(mut self, filter: impl Fn(&Diagnostic) -> bool + Send + Sync + 'static) -> Self {
        self.filter = Some(Box::new(filter));
        self
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Record `diagnostic`. Returns `Ok(false)` for `None` and for filtered diagnostics.
    pub fn add(&mut self, diagnostic: Option<Diagnostic>) -> Result<bool> {
        if !self.writable {
            return Err(HighlightError::SinkNotWritable);
        }
        let Some(diagnostic) = diagnostic else {
            return Ok(false);
        };
        if diagnostic.range.end() > self.file_len {
            return Err(HighlightError::RangeOutOfBounds {
                range: diagnostic.range,
                file_len: self.file_len,
            });
        }
        if !self.accepts(&diagnostic) {
            tracing::trace!(
                target: "nova.highlight",
                code = diagnostic.code,
                "diagnostic rejected by filter"
            );
            return Ok(false);
        }
        self.counts[diagnostic.severity.idx()] += 1;
        self.records.push(diagnostic);
        Ok(true)
    }

    /// [`Self::add`] each diagnostic in order; returns whether any was accepted.
    ///
    /// A holder can never be passed to itself: the borrow checker rejects `h.add_all(h.diagnostics())`.
    pub fn add_all(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) -> Result<bool> {
        let mut any = false;
        for diagnostic in diagnostics {
            any |= self.add(Some(diagnostic))?;
        }
        Ok(any)
    }

    /// Reset the records and the counters.
    pub fn clear(&mut self) -> Result<()> {
        if !self.writable {
            return Err(HighlightError::SinkNotWritable);
        }
        self.records.clear();
        self.counts = [0; 4];
        Ok(())
    }

    fn accepts(&self, diagnostic: &Diagnostic) -> bool {
        if self.suppressed_codes.iter().any(|c| c.trim() == diagnostic.code) {
            return false;
        }
        self.filter.as_ref().map_or(true, |filter| filter(diagnostic))
    }

    #[inline]
    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    #[inline]
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    #[inline]
    pub fn count(&self, severity: Severity) -> usize {
        self.counts[severity.idx()]
    }

    #[inline]
    pub fn error_count(&self) -> usize {
        self.count(Severity::Error)
    }

    #[inline]
    pub fn has_error_results(&self) -> bool {
        self.error_count() > 0
    }

    /// Warnings of either tier (plain or unchecked).
    #[inline]
    pub fn has_warning_results(&self) -> bool {
        self.count(Severity::Warning) + self.count(Severity::UncheckedWarning) > 0
    }

    #[inline]
    pub fn has_info_results(&self) -> bool {
        self.count(Severity::Info) > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.records
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.records
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl fmt::Debug for HighlightHolder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: Vec<(Severity, usize)> = Severity::ALL
            .into_iter()
            .map(|s| (s, self.counts[s.idx()]))
            .collect();
        f.debug_struct("HighlightHolder")
            .field("file_name", &self.file_name)
            .field("file_len", &self.file_len)
            .field("records", &self.records.len())
            .field("counts", &counts)
            .field("writable", &self.writable)
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codes;
    use nova_core::TextRange;
    use pretty_assertions::assert_eq;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn counters_follow_accepted_records() {
        let mut holder = HighlightHolder::new("A.java", TextSize::from(20));
        assert!(holder
            .add(Some(Diagnostic::error(codes::DUPLICATE_CLASS, "x", range(0, 1))))
            .unwrap());
        assert!(holder
            .add(Some(Diagnostic::unchecked(codes::UNCHECKED_CALL, "y", range(2, 3))))
            .unwrap());
        assert!(!holder.add(None).unwrap());

        assert_eq!(holder.len(), 2);
        assert!(holder.has_error_results());
        assert!(holder.has_warning_results());
        assert!(!holder.has_info_results());

        holder.clear().unwrap();
        assert_eq!(holder.error_count(), 0);
        assert!(holder.is_empty());
    }

    #[test]
    fn frozen_holder_rejects_mutation() {
        let mut holder = HighlightHolder::new("A.java", TextSize::from(20));
        holder.set_writable(false);
        let err = holder.add(None).unwrap_err();
        assert_eq!(err, HighlightError::SinkNotWritable);
        assert_eq!(holder.clear().unwrap_err(), HighlightError::SinkNotWritable);

        holder.set_writable(true);
        holder.set_writable(false);
        assert_eq!(holder.error_count(), 0);
    }

    #[test]
    fn ranges_past_the_end_are_faults() {
        let mut holder = HighlightHolder::new("A.java", TextSize::from(4));
        let err = holder
            .add(Some(Diagnostic::error(codes::NOT_A_STATEMENT, "x", range(2, 5))))
            .unwrap_err();
        assert!(matches!(err, HighlightError::RangeOutOfBounds { .. }));
        assert!(holder
            .add(Some(Diagnostic::error(codes::NOT_A_STATEMENT, "x", range(4, 4))))
            .unwrap());
    }

    #[test]
    fn filters_and_suppressed_codes_drop_diagnostics() {
        let mut holder = HighlightHolder::new("A.java", TextSize::from(10))
            .with_suppressed_codes(["DUPLICATE_CLASS"])
            .with_filter(|d| d.severity != Severity::Info);
        let accepted = holder
            .add_all([
                Diagnostic::error(codes::DUPLICATE_CLASS, "dup", range(0, 1)),
                Diagnostic::info(codes::REASSIGNED_PARAMETER, "p", range(1, 2)),
                Diagnostic::warning(codes::EXCEPTION_NEVER_THROWN, "w", range(2, 3)),
            ])
            .unwrap();
        assert!(accepted);
        let kept: Vec<&str> = holder.diagnostics().iter().map(|d| d.code).collect();
        assert_eq!(kept, vec![codes::EXCEPTION_NEVER_THROWN]);
        assert_eq!(holder.count(Severity::Warning), 1);
    }
}
