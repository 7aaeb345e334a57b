//! Query-file block splitting (spec §4.E).

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::diagnostic::Diagnostic;
use crate::token::ScanError;

use super::annotation::{classify_comment, CacheAnnotation, CommentLine, ParamTypeOverride};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    One,
    Many,
    Exec,
    ExecResult,
    Unknown,
}

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "one" => Ok(Command::One),
            "many" => Ok(Command::Many),
            "exec" => Ok(Command::Exec),
            "execresult" => Ok(Command::ExecResult),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryBlock {
    pub path: PathBuf,
    pub name: String,
    pub command: Command,
    pub sql: String,
    /// Trailing whitespace trimmed off `sql`, kept for position reconstruction.
    pub suffix: String,
    pub doc: Option<String>,
    pub param_overrides: Vec<ParamTypeOverride>,
    pub cache: Option<CacheAnnotation>,
    pub start: usize,
    pub end: usize,
    pub marker_line: usize,
}

struct Line {
    start: usize,
    end: usize,
}

fn compute_lines(text: &str) -> Vec<Line> {
    let bytes = text.as_bytes();
    let mut lines = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    while i < bytes.len() {
        match bytes[i] {
            b'\n' => {
                lines.push(Line { start, end: i });
                i += 1;
                start = i;
            }
            b'\r' => {
                lines.push(Line { start, end: i });
                i += 1;
                if i < bytes.len() && bytes[i] == b'\n' {
                    i += 1;
                }
                start = i;
            }
            _ => i += 1,
        }
    }
    lines.push(Line {
        start,
        end: bytes.len(),
    });
    lines
}

struct Marker {
    name: String,
    cmd_text: String,
}

/// Recognizes a `-- name: <ident> :<cmd>` marker line. Returns `None` if
/// the line isn't shaped like a marker at all (not every `--` comment is
/// one); an unrecognized `<cmd>` still counts as a marker match, with
/// classification left to the caller.
fn parse_marker(line: &str) -> Option<Marker> {
    let trimmed = line.trim();
    if !trimmed.starts_with("--") {
        return None;
    }
    let after_dashes = trimmed[2..].trim_start();
    let lower = after_dashes.to_ascii_lowercase();
    if !lower.starts_with("name:") {
        return None;
    }
    let after_name = after_dashes["name:".len()..].trim();
    let fields: Vec<&str> = after_name.split_whitespace().collect();
    if fields.len() != 2 {
        return None;
    }
    let name = fields[0];
    if !is_identifier(name) {
        return None;
    }
    let cmd_field = fields[1];
    let cmd_text = cmd_field.strip_prefix(':')?;
    Some(Marker {
        name: name.to_string(),
        cmd_text: cmd_text.to_string(),
    })
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

fn is_comment_line(line: &str) -> bool {
    line.trim_start().starts_with("--")
}

fn comment_content(line: &str) -> &str {
    line.trim().trim_start_matches("--").trim()
}

/// Splits a query file into its named blocks. Only a scanner-shaped
/// failure (invalid UTF-8) is fatal; everything else becomes a
/// [`Diagnostic`] alongside whatever blocks were still recognized.
pub fn split_blocks(
    path: &Path,
    buf: &[u8],
) -> Result<(Vec<QueryBlock>, Vec<Diagnostic>), ScanError> {
    let text = std::str::from_utf8(buf).map_err(|e| {
        let mut line = 1usize;
        let mut column = 1usize;
        for &b in &buf[..e.valid_up_to().min(buf.len())] {
            if b == b'\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        ScanError {
            path: path.to_path_buf(),
            line,
            column,
            kind: crate::token::ScanErrorKind::InvalidUtf8,
        }
    })?;

    let lines = compute_lines(text);
    let mut diags = Vec::new();

    // Locate markers and, for each, the start of its immediately-preceding
    // "doc region" run of `--` comment lines.
    struct MarkerSite {
        line_idx: usize,
        doc_start_line_idx: usize,
        marker: Marker,
    }

    let mut markers: Vec<MarkerSite> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        let text_line = &text[line.start..line.end];
        if let Some(marker) = parse_marker(text_line) {
            let mut doc_start = idx;
            let mut walk = idx;
            while walk > 0 {
                let candidate = walk - 1;
                let candidate_text = &text[lines[candidate].start..lines[candidate].end];
                if candidate_text.trim().is_empty() {
                    break;
                }
                if !is_comment_line(candidate_text) {
                    break;
                }
                if parse_marker(candidate_text).is_some() {
                    break;
                }
                doc_start = candidate;
                walk = candidate;
            }
            markers.push(MarkerSite {
                line_idx: idx,
                doc_start_line_idx: doc_start,
                marker,
            });
        }
    }

    if markers.is_empty() {
        if text.trim().is_empty() {
            return Ok((Vec::new(), diags));
        }
        if !text.lines().all(|l| l.trim().is_empty() || is_comment_line(l)) {
            diags.push(Diagnostic::error(
                path,
                1,
                1,
                "query file content before the first block marker",
            ));
        }
        return Ok((Vec::new(), diags));
    }

    // Content before the first marker's doc region must be blank/comment-only.
    let first_doc_start = markers[0].doc_start_line_idx;
    for line in &lines[..first_doc_start] {
        let text_line = &text[line.start..line.end];
        if !text_line.trim().is_empty() && !is_comment_line(text_line) {
            diags.push(Diagnostic::error(
                path,
                1,
                1,
                "query file content before the first block marker",
            ));
            break;
        }
    }

    let mut blocks = Vec::with_capacity(markers.len());
    for (i, site) in markers.iter().enumerate() {
        let command = match Command::from_str(&site.marker.cmd_text) {
            Ok(cmd) => cmd,
            Err(()) => {
                diags.push(Diagnostic::error(
                    path,
                    site.line_idx + 1,
                    1,
                    format!("unrecognized block command ':{}'", site.marker.cmd_text),
                ));
                Command::Unknown
            }
        };

        let mut doc_lines = Vec::new();
        let mut param_overrides = Vec::new();
        let mut cache = None;
        for line in &lines[site.doc_start_line_idx..site.line_idx] {
            let content = comment_content(&text[line.start..line.end]);
            match classify_comment(content) {
                CommentLine::Doc(text) => doc_lines.push(text),
                CommentLine::ParamOverride(o) => param_overrides.push(o),
                CommentLine::Cache(c) => cache = Some(c),
            }
        }

        let sql_start = lines
            .get(site.line_idx + 1)
            .map(|l| l.start)
            .unwrap_or(text.len());
        let sql_end = markers
            .get(i + 1)
            .map(|next| lines[next.doc_start_line_idx].start)
            .unwrap_or(text.len());

        let raw_sql = &text[sql_start.min(sql_end)..sql_end];
        let trimmed_len = raw_sql.trim_end().len();
        let sql = raw_sql[..trimmed_len].to_string();
        let suffix = raw_sql[trimmed_len..].to_string();

        blocks.push(QueryBlock {
            path: path.to_path_buf(),
            name: site.marker.name.clone(),
            command,
            sql,
            suffix,
            doc: (!doc_lines.is_empty()).then(|| doc_lines.join("\n")),
            param_overrides,
            cache,
            start: sql_start,
            end: sql_start + trimmed_len,
            marker_line: site.line_idx + 1,
        });
    }

    Ok((blocks, diags))
}
