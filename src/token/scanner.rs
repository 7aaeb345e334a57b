//! UTF-8 scanner: byte buffer -> `Vec<Token>` terminated by EOF (spec §4.A).

use std::path::Path;
use std::rc::Rc;

use super::error::{ScanError, ScanErrorKind};
use super::keywords::Keyword;
use super::token::{Token, TokenKind};

const MULTI_CHAR_SYMBOLS: &[&str] = &["<=", ">=", "<>", "!="];

pub struct Scanner<'a> {
    path: Rc<Path>,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    track_doc_comments: bool,
    _buf: &'a [u8],
}

impl<'a> Scanner<'a> {
    pub fn new(path: &Path, buf: &'a [u8], track_doc_comments: bool) -> Result<Self, ScanError> {
        let text = std::str::from_utf8(buf).map_err(|e| {
            let (line, column) = position_of_byte(buf, e.valid_up_to());
            ScanError {
                path: path.to_path_buf(),
                line,
                column,
                kind: ScanErrorKind::InvalidUtf8,
            }
        })?;
        Ok(Self {
            path: Rc::from(path),
            chars: text.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            track_doc_comments,
            _buf: buf,
        })
    }

    fn err(&self, kind: ScanErrorKind) -> ScanError {
        ScanError {
            path: self.path.to_path_buf(),
            line: self.line,
            column: self.column,
            kind,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else if c == '\r' {
            // Treat CR and CRLF as a single break; only bump the line
            // counter here if this CR is not immediately followed by LF
            // (that case is handled when the LF itself is consumed above,
            // by not double-counting — see `advance` call sites below).
            if self.peek() != Some('\n') {
                self.line += 1;
                self.column = 1;
            }
        } else {
            self.column += 1;
        }
        Some(c)
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ScanError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace_and_comments(&mut tokens)?;
            let (line, column) = (self.line, self.column);
            let Some(c) = self.peek() else {
                tokens.push(Token::eof(line, column).with_path(self.path.clone()));
                break;
            };

            let tok = if c == '_' || c.is_alphabetic() {
                self.scan_unquoted_identifier(line, column)
            } else if c == '"' || c == '`' || c == '[' {
                self.scan_quoted_identifier(line, column)?
            } else if c == '\'' {
                self.scan_string(line, column)?
            } else if (c == 'x' || c == 'X') && self.peek_at(1) == Some('\'') {
                self.scan_blob(line, column)?
            } else if c.is_ascii_digit() {
                self.scan_number(line, column)
            } else if c == '$' && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
                self.scan_param(line, column)
            } else if c.is_control() {
                return Err(self.err(ScanErrorKind::UnexpectedControlCharacter(c)));
            } else {
                self.scan_symbol(line, column)
            };
            tokens.push(tok.with_path(self.path.clone()));
        }
        Ok(tokens)
    }

    fn skip_whitespace_and_comments(&mut self, tokens: &mut Vec<Token>) -> Result<(), ScanError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.advance();
                }
                Some('-') if self.peek_at(1) == Some('-') => {
                    let (line, column) = (self.line, self.column);
                    self.advance();
                    self.advance();
                    let mut text = String::new();
                    while let Some(c) = self.peek() {
                        if c == '\n' || c == '\r' {
                            break;
                        }
                        text.push(c);
                        self.advance();
                    }
                    if self.track_doc_comments {
                        tokens.push(
                            Token::new(TokenKind::DocComment, text.trim(), line, column)
                                .with_path(self.path.clone()),
                        );
                    }
                }
                Some('/') if self.peek_at(1) == Some('*') => {
                    self.advance();
                    self.advance();
                    let mut closed = false;
                    while let Some(c) = self.peek() {
                        if c == '*' && self.peek_at(1) == Some('/') {
                            self.advance();
                            self.advance();
                            closed = true;
                            break;
                        }
                        self.advance();
                    }
                    if !closed {
                        return Err(self.err(ScanErrorKind::UnterminatedBlockComment));
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn scan_unquoted_identifier(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphanumeric() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        match Keyword::lookup(&text) {
            Some(kw) => Token::new(TokenKind::Keyword, kw.canonical(), line, column),
            None => Token::new(TokenKind::Identifier, text, line, column),
        }
    }

    fn scan_quoted_identifier(&mut self, line: usize, column: usize) -> Result<Token, ScanError> {
        let open = self.advance().expect("caller checked peek");
        let close = match open {
            '"' => '"',
            '`' => '`',
            '[' => ']',
            _ => unreachable!(),
        };
        let mut text = String::new();
        text.push(open);
        loop {
            match self.peek() {
                None => return Err(self.err(ScanErrorKind::UnterminatedQuotedIdentifier)),
                Some(c) if c == close => {
                    self.advance();
                    // A doubled closing quote (only possible when open == close)
                    // is an escaped literal quote character, not a terminator.
                    if open == close && self.peek() == Some(close) {
                        text.push(close);
                        text.push(close);
                        self.advance();
                        continue;
                    }
                    text.push(close);
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(TokenKind::Identifier, text, line, column))
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Result<Token, ScanError> {
        let mut text = String::new();
        text.push(self.advance().expect("caller checked peek"));
        loop {
            match self.peek() {
                None => return Err(self.err(ScanErrorKind::UnterminatedString)),
                Some('\'') => {
                    self.advance();
                    if self.peek() == Some('\'') {
                        text.push('\'');
                        text.push('\'');
                        self.advance();
                        continue;
                    }
                    text.push('\'');
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(TokenKind::String, text, line, column))
    }

    fn scan_blob(&mut self, line: usize, column: usize) -> Result<Token, ScanError> {
        let mut text = String::new();
        text.push(self.advance().expect("caller checked peek")); // X or x
        text.push(self.advance().expect("caller checked peek")); // opening '
        loop {
            match self.peek() {
                None => return Err(self.err(ScanErrorKind::UnterminatedBlob)),
                Some('\'') => {
                    text.push('\'');
                    self.advance();
                    break;
                }
                Some(c) => {
                    text.push(c);
                    self.advance();
                }
            }
        }
        Ok(Token::new(TokenKind::Number, text, line, column))
    }

    fn scan_number(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        if self.peek() == Some('0') && matches!(self.peek_at(1), Some('x') | Some('X')) {
            text.push(self.advance().unwrap());
            text.push(self.advance().unwrap());
            while let Some(c) = self.peek() {
                if c.is_ascii_hexdigit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
            return Token::new(TokenKind::Number, text, line, column);
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|d| d.is_ascii_digit()) {
            text.push(self.advance().unwrap());
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    text.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        Token::new(TokenKind::Number, text, line, column)
    }

    fn scan_param(&mut self, line: usize, column: usize) -> Token {
        let mut text = String::new();
        text.push(self.advance().unwrap()); // '$'
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                text.push(c);
                self.advance();
            } else {
                break;
            }
        }
        Token::new(TokenKind::Param, text, line, column)
    }

    fn scan_symbol(&mut self, line: usize, column: usize) -> Token {
        if let Some(c1) = self.peek()
            && let Some(c2) = self.peek_at(1)
        {
            let two: String = [c1, c2].iter().collect();
            if MULTI_CHAR_SYMBOLS.contains(&two.as_str()) {
                self.advance();
                self.advance();
                return Token::new(TokenKind::Symbol, two, line, column);
            }
        }
        let c = self.advance().expect("caller checked peek");
        Token::new(TokenKind::Symbol, c.to_string(), line, column)
    }
}

fn position_of_byte(buf: &[u8], up_to: usize) -> (usize, usize) {
    let mut line = 1;
    let mut column = 1;
    for &b in &buf[..up_to.min(buf.len())] {
        if b == b'\n' {
            line += 1;
            column = 1;
        } else {
            column += 1;
        }
    }
    (line, column)
}

/// Tokenize `buf` (the contents of the file at `path`) into an ordered
/// token stream terminated by EOF, or the first scanner error encountered.
pub fn tokenize(path: &Path, buf: &[u8], track_doc_comments: bool) -> Result<Vec<Token>, ScanError> {
    Scanner::new(path, buf, track_doc_comments)?.tokenize()
}
