// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module dialect detection

use crate::config::DetectionMode;
use crate::lexer::{Scanner, Token, TokenKind};

/// The two module dialects a source file can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// `import` / `export` declarations
    Declarative,
    /// An ambient `exports` object filled by the module body
    Implicit,
}

impl Dialect {
    /// Lower-case name, as printed by the CLI
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Declarative => "declarative",
            Dialect::Implicit => "implicit",
        }
    }
}

/// Classify source text using the default (lexical) strategy.
pub fn detect(source: &str) -> Dialect {
    detect_with(source, DetectionMode::Lexical)
}

/// Classify source text with an explicit strategy.
pub fn detect_with(source: &str, mode: DetectionMode) -> Dialect {
    let declarative = match mode {
        DetectionMode::Textual => source.contains("export ") || source.contains("import "),
        DetectionMode::Lexical => has_module_declaration(source),
    };

    if declarative {
        Dialect::Declarative
    } else {
        Dialect::Implicit
    }
}

fn has_module_declaration(source: &str) -> bool {
    let mut prev: Option<Token> = None;
    let mut scanner = Scanner::new(source).peekable();

    while let Some(token) = scanner.next() {
        let after_dot = matches!(
            prev.as_ref().map(|t| &t.kind),
            Some(TokenKind::Dot | TokenKind::QuestionDot)
        );

        if !after_dot {
            match token.kind {
                TokenKind::Export => return true,
                // import(...) and import.meta are expressions, not declarations
                TokenKind::Import => {
                    let next = scanner.peek().map(|t| &t.kind);
                    if !matches!(next, Some(TokenKind::LeftParen | TokenKind::Dot)) {
                        return true;
                    }
                }
                _ => {}
            }
        }

        prev = Some(token);
    }

    false
}
