// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! The scanner that produces tokens from module source text.

use super::token::keyword;
use super::{Span, Token, TokenKind};

/// Multi-character operators, longest first so the scan is greedy.
const OPERATORS: &[&str] = &[
    ">>>=", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "==", "!=", "<=",
    ">=", "&&", "||", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<", ">>",
    "**", "-", "/", "%", "<", ">", "!", "&", "|", "^", "~",
];

/// A scanner that tokenizes script source code.
///
/// Comments and whitespace are skipped; string, template and regular
/// expression literals are consumed whole so that keywords and quotes inside
/// them never surface as tokens.
pub struct Scanner<'a> {
    source: &'a str,
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    current_pos: usize,
    /// Whether a `/` at this point starts a regex rather than a division.
    regex_allowed: bool,
}

impl<'a> Scanner<'a> {
    /// Creates a new scanner for the given source code.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            chars: source.char_indices().peekable(),
            current_pos: 0,
            regex_allowed: true,
        }
    }

    /// Returns the next token from the source.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace_and_comments();

        let start = self.current_pos;

        let Some((_pos, ch)) = self.advance() else {
            return Token::new(TokenKind::Eof, Span::new(start, start));
        };

        let kind = match ch {
            '{' => TokenKind::LeftBrace,
            '}' => TokenKind::RightBrace,
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '[' => TokenKind::LeftBracket,
            ']' => TokenKind::RightBracket,
            ';' => TokenKind::Semicolon,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,

            '.' => self.scan_dot(),
            '=' => self.scan_equal(),
            '?' => self.scan_question(),
            '*' if self.peek() != Some('*') && self.peek() != Some('=') => TokenKind::Star,
            '+' if self.peek() != Some('+') && self.peek() != Some('=') => TokenKind::Plus,

            '"' | '\'' => self.scan_string(ch),
            '`' => self.scan_template(),
            '/' if self.regex_allowed => self.scan_regex(start),

            '0'..='9' => self.scan_number(ch),

            _ if is_id_start(ch) => self.scan_identifier(ch),

            _ => self.scan_operator(start),
        };

        self.regex_allowed = !ends_operand(&kind);
        Token::new(kind, Span::new(start, self.current_pos))
    }

    fn advance(&mut self) -> Option<(usize, char)> {
        let result = self.chars.next();
        if let Some((pos, ch)) = result {
            self.current_pos = pos + ch.len_utf8();
        }
        result
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, ch)| *ch)
    }

    fn peek_next(&self) -> Option<char> {
        let mut iter = self.chars.clone();
        iter.next();
        iter.next().map(|(_, ch)| ch)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            match self.peek() {
                Some(ch) if ch.is_whitespace() => {
                    self.advance();
                }
                Some('/') => match self.peek_next() {
                    Some('/') => {
                        self.advance();
                        self.advance();
                        while let Some(ch) = self.peek() {
                            if ch == '\n' || ch == '\r' {
                                break;
                            }
                            self.advance();
                        }
                    }
                    Some('*') => {
                        self.advance();
                        self.advance();
                        let mut prev = ' ';
                        while let Some((_, ch)) = self.advance() {
                            if prev == '*' && ch == '/' {
                                break;
                            }
                            prev = ch;
                        }
                    }
                    _ => break,
                },
                _ => break,
            }
        }
    }

    fn scan_dot(&mut self) -> TokenKind {
        if self.peek() == Some('.') && self.peek_next() == Some('.') {
            self.advance();
            self.advance();
            TokenKind::Ellipsis
        } else if self.peek().is_some_and(|ch| ch.is_ascii_digit()) {
            self.scan_number('.')
        } else {
            TokenKind::Dot
        }
    }

    fn scan_equal(&mut self) -> TokenKind {
        match self.peek() {
            Some('>') => {
                self.advance();
                TokenKind::Arrow
            }
            Some('=') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Operator("===")
                } else {
                    TokenKind::Operator("==")
                }
            }
            _ => TokenKind::Equal,
        }
    }

    fn scan_question(&mut self) -> TokenKind {
        match self.peek() {
            Some('?') => {
                self.advance();
                if self.peek() == Some('=') {
                    self.advance();
                    TokenKind::Operator("??=")
                } else {
                    TokenKind::QuestionQuestion
                }
            }
            Some('.') if !self.peek_next().is_some_and(|ch| ch.is_ascii_digit()) => {
                self.advance();
                TokenKind::QuestionDot
            }
            _ => TokenKind::Question,
        }
    }

    fn scan_operator(&mut self, start: usize) -> TokenKind {
        let rest = &self.source[start..];
        let Some(op) = OPERATORS.iter().find(|op| rest.starts_with(**op)) else {
            return TokenKind::Invalid;
        };
        // The first character is already consumed.
        for _ in op.chars().skip(1) {
            self.advance();
        }
        TokenKind::Operator(*op)
    }

    fn scan_string(&mut self, quote: char) -> TokenKind {
        let mut value = String::new();

        loop {
            match self.advance() {
                None | Some((_, '\n')) => return TokenKind::Invalid,
                Some((_, ch)) if ch == quote => break,
                Some((_, '\\')) => {
                    if let Some((_, escaped)) = self.advance() {
                        match escaped {
                            'n' => value.push('\n'),
                            'r' => value.push('\r'),
                            't' => value.push('\t'),
                            '0' => value.push('\0'),
                            '\n' => {}
                            _ => value.push(escaped),
                        }
                    }
                }
                Some((_, ch)) => value.push(ch),
            }
        }

        TokenKind::String(value)
    }

    /// Consumes a whole template literal, including nested `${ ... }`
    /// substitutions, so backticks and braces inside them stay balanced.
    fn scan_template(&mut self) -> TokenKind {
        let body_start = self.current_pos;

        loop {
            match self.advance() {
                None => return TokenKind::Invalid,
                Some((pos, '`')) => {
                    return TokenKind::Template(self.source[body_start..pos].to_string());
                }
                Some((_, '\\')) => {
                    self.advance();
                }
                Some((_, '$')) if self.peek() == Some('{') => {
                    self.advance();
                    if !self.skip_substitution() {
                        return TokenKind::Invalid;
                    }
                }
                Some(_) => {}
            }
        }
    }

    /// Skips a template substitution up to its closing brace.
    fn skip_substitution(&mut self) -> bool {
        let mut depth = 1usize;
        loop {
            let token = self.next_token();
            match token.kind {
                TokenKind::Eof | TokenKind::Invalid => return false,
                TokenKind::LeftBrace => depth += 1,
                TokenKind::RightBrace => {
                    depth -= 1;
                    if depth == 0 {
                        return true;
                    }
                }
                _ => {}
            }
        }
    }

    /// Consumes `/body/flags`. The opening slash is already consumed; a `/`
    /// inside a `[...]` class or after a backslash does not close the body.
    fn scan_regex(&mut self, start: usize) -> TokenKind {
        let mut in_class = false;

        loop {
            match self.advance() {
                None | Some((_, '\n' | '\r')) => return TokenKind::Invalid,
                Some((_, '\\')) => {
                    if matches!(self.advance(), None | Some((_, '\n' | '\r'))) {
                        return TokenKind::Invalid;
                    }
                }
                Some((_, '[')) => in_class = true,
                Some((_, ']')) => in_class = false,
                Some((_, '/')) if !in_class => break,
                Some(_) => {}
            }
        }

        while self.peek().is_some_and(is_id_continue) {
            self.advance();
        }

        TokenKind::Regex(self.source[start..self.current_pos].to_string())
    }

    fn scan_number(&mut self, first: char) -> TokenKind {
        let mut value = String::from(first);

        if first == '0' {
            let radix = match self.peek() {
                Some('x' | 'X') => 16,
                Some('o' | 'O') => 8,
                Some('b' | 'B') => 2,
                _ => 10,
            };
            if radix != 10 {
                self.advance();
                return self.scan_radix_number(radix);
            }
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() || ch == '_' || (ch == '.' && !value.contains('.')) {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }

        if matches!(self.peek(), Some('e' | 'E')) {
            value.push('e');
            self.advance();
            if let Some(sign @ ('+' | '-')) = self.peek() {
                value.push(sign);
                self.advance();
            }
            while let Some(ch) = self.peek().filter(|ch| ch.is_ascii_digit()) {
                value.push(ch);
                self.advance();
            }
        }

        // BigInt suffix: the module layer only needs the token boundary.
        if self.peek() == Some('n') {
            self.advance();
        }

        match value.parse::<f64>() {
            Ok(n) => TokenKind::Number(n),
            Err(_) => TokenKind::Invalid,
        }
    }

    fn scan_radix_number(&mut self, radix: u32) -> TokenKind {
        let mut value = String::new();

        while let Some(ch) = self.peek() {
            if ch.is_digit(radix) || ch == '_' {
                if ch != '_' {
                    value.push(ch);
                }
                self.advance();
            } else {
                break;
            }
        }

        if self.peek() == Some('n') {
            self.advance();
        }

        match u64::from_str_radix(&value, radix) {
            Ok(n) => TokenKind::Number(n as f64),
            Err(_) => TokenKind::Invalid,
        }
    }

    fn scan_identifier(&mut self, first: char) -> TokenKind {
        let mut name = String::from(first);

        while let Some(ch) = self.peek() {
            if is_id_continue(ch) {
                name.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        keyword(&name).unwrap_or(TokenKind::Identifier(name))
    }
}

/// Returns true if `kind` completes an operand, so a following `/` divides.
fn ends_operand(kind: &TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier(_)
            | TokenKind::Number(_)
            | TokenKind::String(_)
            | TokenKind::Template(_)
            | TokenKind::Regex(_)
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null
            | TokenKind::This
            | TokenKind::RightParen
            | TokenKind::RightBracket
            | TokenKind::RightBrace
            | TokenKind::Operator("++" | "--")
    )
}

/// Checks if a character can start an identifier.
fn is_id_start(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_start(ch)
}

/// Checks if a character can continue an identifier.
fn is_id_continue(ch: char) -> bool {
    ch == '_' || ch == '$' || unicode_xid::UnicodeXID::is_xid_continue(ch)
}

impl Iterator for Scanner<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

/// Tokenizes a whole source text (the trailing `Eof` is not included).
pub fn tokenize(source: &str) -> Vec<Token> {
    Scanner::new(source).collect()
}
