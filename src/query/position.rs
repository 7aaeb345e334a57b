//! Byte-offset recovery from (line, column) token positions (spec
//! glossary "PositionIndex"), used to slice byte-exact substrings of a
//! block's SQL text for CTE bodies and result-column expressions.

use crate::token::Token;

pub struct PositionIndex<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> PositionIndex<'a> {
    pub fn new(text: &'a str) -> Self {
        let bytes = text.as_bytes();
        let mut line_starts = vec![0usize];
        let mut i = 0usize;
        while i < bytes.len() {
            match bytes[i] {
                b'\n' => {
                    i += 1;
                    line_starts.push(i);
                }
                b'\r' => {
                    i += 1;
                    if i < bytes.len() && bytes[i] == b'\n' {
                        i += 1;
                    }
                    line_starts.push(i);
                }
                _ => i += 1,
            }
        }
        Self { text, line_starts }
    }

    fn byte_offset(&self, line: usize, column: usize) -> usize {
        let line_start = self
            .line_starts
            .get(line.saturating_sub(1))
            .copied()
            .unwrap_or(0);
        let line_text = &self.text[line_start..];
        for (count, (idx, _)) in line_text.char_indices().enumerate() {
            if count + 1 == column {
                return line_start + idx;
            }
        }
        line_start + line_text.len()
    }

    pub fn offset_of(&self, token: &Token) -> usize {
        self.byte_offset(token.line, token.column)
    }

    pub fn end_offset_of(&self, token: &Token) -> usize {
        self.offset_of(token) + token.text.len()
    }

    /// The verbatim source substring spanning `first` through `last`
    /// (inclusive), exactly as it appears in the original block SQL —
    /// not a reconstruction from token text, which would lose original
    /// spacing and casing.
    pub fn substring(&self, first: &Token, last: &Token) -> &'a str {
        let start = self.offset_of(first);
        let end = self.end_offset_of(last);
        if start <= end && end <= self.text.len() {
            &self.text[start..end]
        } else {
            ""
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::path::Path;

    #[test]
    fn substring_recovers_original_spacing() {
        let sql = "SELECT   id,  name\nFROM users";
        let tokens = tokenize(Path::new("t.sql"), sql.as_bytes(), false).unwrap();
        let pos = PositionIndex::new(sql);
        // tokens[1]="id", tokens[3]="name" (after the comma)
        let id_tok = &tokens[1];
        let name_tok = &tokens[3];
        assert_eq!(pos.substring(id_tok, name_tok), "id,  name");
    }

    #[test]
    fn offsets_account_for_multiple_lines() {
        let sql = "SELECT id\nFROM users";
        let tokens = tokenize(Path::new("t.sql"), sql.as_bytes(), false).unwrap();
        let pos = PositionIndex::new(sql);
        let from_tok = tokens.iter().find(|t| t.text == "FROM").unwrap();
        assert_eq!(pos.offset_of(from_tok), sql.find("FROM").unwrap());
    }
}
