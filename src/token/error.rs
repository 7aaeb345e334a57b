use std::path::PathBuf;

use thiserror::Error;

/// The only fatal error in this crate's pipeline (spec §7): invalid UTF-8,
/// an unterminated string/block comment, or a control character outside
/// any recognized token shape. Aborts the containing file with no partial
/// Catalog/Query output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{path}:{line}:{column}: {kind}")]
pub struct ScanError {
    pub path: PathBuf,
    pub line: usize,
    pub column: usize,
    pub kind: ScanErrorKind,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScanErrorKind {
    #[error("invalid UTF-8")]
    InvalidUtf8,
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated quoted identifier")]
    UnterminatedQuotedIdentifier,
    #[error("unterminated block comment")]
    UnterminatedBlockComment,
    #[error("unterminated blob literal")]
    UnterminatedBlob,
    #[error("unexpected control character {0:?}")]
    UnexpectedControlCharacter(char),
}
