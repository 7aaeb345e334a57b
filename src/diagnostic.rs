//! Positioned, severity-tagged messages produced by every stage of the
//! pipeline.
//!
//! Every top-level function in this crate returns `(Output, Vec<Diagnostic>)`
//! rather than threading a `Result` through partial successes: a malformed
//! `CHECK` constraint or an unresolved column does not stop the rest of a
//! file from being parsed and analyzed. The only fatal case is a lexical
//! scanner error (see [`crate::token::ScanError`]), which aborts the whole
//! file with no partial output.

use std::path::{Path, PathBuf};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    #[serde(serialize_with = "serialize_path_forward_slash")]
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub severity: Severity,
    pub message: String,
}

fn serialize_path_forward_slash<S: serde::Serializer>(
    path: &Path,
    s: S,
) -> Result<S::Ok, S::Error> {
    s.serialize_str(&path.to_string_lossy().replace('\\', "/"))
}

impl Diagnostic {
    pub fn new(
        path: impl Into<PathBuf>,
        line: usize,
        column: usize,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            line,
            column,
            severity,
            message: message.into(),
        }
    }

    pub fn error(path: impl Into<PathBuf>, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::new(path, line, column, Severity::Error, message)
    }

    pub fn warning(path: impl Into<PathBuf>, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self::new(path, line, column, Severity::Warning, message)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    fn dedup_key(&self) -> (std::path::PathBuf, usize, usize, String) {
        (self.path.clone(), self.line, self.column, self.message.clone())
    }
}

/// Drop duplicate `(path, line, column, message)` entries, keeping the
/// first occurrence and the original relative ordering of the rest.
///
/// Diagnostics accumulate across parser and analyzer passes that may
/// independently notice the same problem (e.g. an unresolved column
/// flagged both while splitting result columns and while inferring a
/// parameter type next to it); this is the single place that collapses
/// them, per spec §4.G "Diagnostic dedup".
pub fn dedup(diagnostics: Vec<Diagnostic>) -> Vec<Diagnostic> {
    let mut seen = ahash::AHashSet::new();
    let mut out = Vec::with_capacity(diagnostics.len());
    for d in diagnostics {
        if seen.insert(d.dedup_key()) {
            out.push(d);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_drops_exact_duplicates_keeps_distinct() {
        let ds = vec![
            Diagnostic::error("a.sql", 1, 1, "boom"),
            Diagnostic::error("a.sql", 1, 1, "boom"),
            Diagnostic::warning("a.sql", 1, 1, "boom"),
            Diagnostic::error("a.sql", 2, 1, "boom"),
        ];
        let deduped = dedup(ds);
        assert_eq!(deduped.len(), 3);
    }

    #[test]
    fn dedup_preserves_order_of_first_occurrence() {
        let ds = vec![
            Diagnostic::error("a.sql", 1, 1, "first"),
            Diagnostic::error("a.sql", 2, 1, "second"),
            Diagnostic::error("a.sql", 1, 1, "first"),
        ];
        let deduped = dedup(ds);
        assert_eq!(deduped[0].message, "first");
        assert_eq!(deduped[1].message, "second");
    }
}
