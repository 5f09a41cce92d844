// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Token definitions for the module lexer.

/// A span in the source code, representing a range of bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    /// Creates a new span.
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Returns the length of this span in bytes.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if this span is empty.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    /// The kind of token
    pub kind: TokenKind,
    /// The span in the source code
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Returns the raw source text covered by this token.
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        &source[self.span.start..self.span.end]
    }
}

/// The kinds of tokens the module lexer distinguishes.
///
/// Only the keywords that matter for module rewriting and for the implicit
/// dialect's statement forms get their own variant; every other reserved word
/// is reported as an [`TokenKind::Identifier`].
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Literals
    /// Numeric literal
    Number(f64),
    /// String literal (cooked value, quotes stripped)
    String(String),
    /// Template literal (raw text between the backticks)
    Template(String),
    /// Regular expression literal (raw text, slashes and flags included)
    Regex(String),
    /// Boolean true
    True,
    /// Boolean false
    False,
    /// null
    Null,

    /// Identifier (including contextual words such as `from` and `as`)
    Identifier(String),

    // Keywords
    Async,
    Await,
    Class,
    Const,
    Default,
    Export,
    Function,
    Import,
    Let,
    New,
    Return,
    This,
    Throw,
    Typeof,
    Var,

    // Punctuation
    /// {
    LeftBrace,
    /// }
    RightBrace,
    /// (
    LeftParen,
    /// )
    RightParen,
    /// [
    LeftBracket,
    /// ]
    RightBracket,
    /// .
    Dot,
    /// ...
    Ellipsis,
    /// ;
    Semicolon,
    /// ,
    Comma,
    /// :
    Colon,
    /// =
    Equal,
    /// =>
    Arrow,
    /// *
    Star,
    /// +
    Plus,
    /// ?
    Question,
    /// ??
    QuestionQuestion,
    /// ?.
    QuestionDot,
    /// Any other operator, kept verbatim
    Operator(&'static str),

    // Special
    /// End of input
    Eof,
    /// Unterminated literal or unknown character
    Invalid,
}

impl TokenKind {
    /// Returns true if this token is a keyword.
    pub fn is_keyword(&self) -> bool {
        matches!(
            self,
            TokenKind::Async
                | TokenKind::Await
                | TokenKind::Class
                | TokenKind::Const
                | TokenKind::Default
                | TokenKind::Export
                | TokenKind::Function
                | TokenKind::Import
                | TokenKind::Let
                | TokenKind::New
                | TokenKind::Return
                | TokenKind::This
                | TokenKind::Throw
                | TokenKind::Typeof
                | TokenKind::Var
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }

    /// Returns true if this token can be used as a property name after `.`.
    pub fn is_name(&self) -> bool {
        matches!(self, TokenKind::Identifier(_)) || self.is_keyword()
    }

    /// Returns true if this token is the identifier `word`.
    pub fn is_word(&self, word: &str) -> bool {
        matches!(self, TokenKind::Identifier(name) if name == word)
    }
}

/// Maps a scanned word to its keyword token, if it is one.
pub(crate) fn keyword(word: &str) -> Option<TokenKind> {
    let kind = match word {
        "async" => TokenKind::Async,
        "await" => TokenKind::Await,
        "class" => TokenKind::Class,
        "const" => TokenKind::Const,
        "default" => TokenKind::Default,
        "export" => TokenKind::Export,
        "false" => TokenKind::False,
        "function" => TokenKind::Function,
        "import" => TokenKind::Import,
        "let" => TokenKind::Let,
        "new" => TokenKind::New,
        "null" => TokenKind::Null,
        "return" => TokenKind::Return,
        "this" => TokenKind::This,
        "throw" => TokenKind::Throw,
        "true" => TokenKind::True,
        "typeof" => TokenKind::Typeof,
        "var" => TokenKind::Var,
        _ => return None,
    };
    Some(kind)
}
