//! A small token-stream cursor shared by the DDL parser and the query
//! parser. Neither parser owns its own ad hoc lookahead logic — both walk
//! the same `&[Token]` shape produced by [`crate::token::tokenize`].

use super::keywords::Keyword;
use super::token::{Token, TokenKind};

#[derive(Clone)]
pub struct TokenCursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenCursor<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn set_pos(&mut self, pos: usize) {
        self.pos = pos.min(self.tokens.len().saturating_sub(1));
    }

    pub fn tokens(&self) -> &'t [Token] {
        self.tokens
    }

    pub fn peek(&self) -> &'t Token {
        self.peek_at(0)
    }

    pub fn peek_at(&self, offset: usize) -> &'t Token {
        self.tokens
            .get(self.pos + offset)
            .unwrap_or_else(|| &self.tokens[self.tokens.len() - 1])
    }

    pub fn is_eof(&self) -> bool {
        self.peek().is_eof()
    }

    pub fn advance(&mut self) -> &'t Token {
        let tok = self.peek();
        if !self.is_eof() {
            self.pos += 1;
        }
        tok
    }

    pub fn check_keyword(&self, kw: Keyword) -> bool {
        self.peek().is_keyword(kw)
    }

    pub fn check_symbol(&self, sym: &str) -> bool {
        self.peek().is_symbol(sym)
    }

    pub fn eat_keyword(&mut self, kw: Keyword) -> bool {
        if self.check_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn eat_symbol(&mut self, sym: &str) -> bool {
        if self.check_symbol(sym) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn expect_symbol(&mut self, sym: &str) -> Result<&'t Token, &'t Token> {
        if self.check_symbol(sym) {
            Ok(self.advance())
        } else {
            Err(self.peek())
        }
    }

    pub fn expect_keyword(&mut self, kw: Keyword) -> Result<&'t Token, &'t Token> {
        if self.check_keyword(kw) {
            Ok(self.advance())
        } else {
            Err(self.peek())
        }
    }

    /// Consumes an identifier token (quoted or not) and returns its
    /// normalized text, or `None` if the current token is not identifier
    /// shaped. A keyword used as a name (e.g. a column literally called
    /// `key`) is rejected — callers needing that should quote it in SQL.
    pub fn eat_identifier(&mut self) -> Option<String> {
        if self.peek().kind == TokenKind::Identifier {
            Some(self.advance().normalized_identifier())
        } else {
            None
        }
    }

    /// Advances past tokens until a top-level (paren-depth 0) `;`, then
    /// consumes that `;` too if present. Used for error recovery after a
    /// malformed statement (spec §4.D, §7).
    pub fn resync_to_statement_end(&mut self) {
        let mut depth = 0usize;
        loop {
            if self.is_eof() {
                return;
            }
            if self.check_symbol("(") {
                depth += 1;
            } else if self.check_symbol(")") {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && self.check_symbol(";") {
                self.advance();
                return;
            }
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;
    use std::path::Path;

    #[test]
    fn resync_stops_after_top_level_semicolon() {
        let tokens = tokenize(Path::new("t.sql"), b"(a, b); SELECT 1", false).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.resync_to_statement_end();
        assert!(cursor.check_keyword(Keyword::Select));
    }

    #[test]
    fn resync_ignores_semicolons_inside_parens() {
        // a malformed CHECK body containing a literal ';' shouldn't stop early
        let tokens = tokenize(Path::new("t.sql"), b"(a ; b); SELECT 1", false).unwrap();
        let mut cursor = TokenCursor::new(&tokens);
        cursor.resync_to_statement_end();
        assert!(cursor.check_keyword(Keyword::Select));
    }
}
