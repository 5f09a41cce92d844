// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Static dependency scanning.
//!
//! Lists the specifiers a module requests without executing it. Only string
//! literal specifiers are visible; computed ones (`load(name)`) are not.

use crate::lexer::{tokenize, Token, TokenKind};

/// Functions that load a module by specifier in the implicit dialect.
const LOADER_CALLS: &[&str] = &["load", "importAsync"];

/// Specifiers requested by `source`, in source order, without duplicates.
pub fn dependencies(source: &str) -> Vec<String> {
    let tokens = tokenize(source);
    let mut found: Vec<String> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        if i > 0 && matches!(tokens[i - 1].kind, TokenKind::Dot | TokenKind::QuestionDot) {
            continue;
        }

        let specifier = match &token.kind {
            TokenKind::Import => match kind_at(&tokens, i + 1) {
                Some(TokenKind::LeftParen) => call_argument(&tokens, i + 1),
                Some(TokenKind::String(spec)) => Some(spec.clone()),
                _ => from_specifier(&tokens, i + 1),
            },
            TokenKind::Export => from_specifier(&tokens, i + 1),
            TokenKind::Identifier(name) if LOADER_CALLS.contains(&name.as_str()) => {
                call_argument(&tokens, i + 1)
            }
            _ => None,
        };

        if let Some(specifier) = specifier {
            if !found.contains(&specifier) {
                found.push(specifier);
            }
        }
    }

    found
}

fn kind_at(tokens: &[Token], i: usize) -> Option<&TokenKind> {
    tokens.get(i).map(|t| &t.kind)
}

/// `("spec")` starting at the opening parenthesis.
fn call_argument(tokens: &[Token], open: usize) -> Option<String> {
    match (kind_at(tokens, open)?, kind_at(tokens, open + 1)?, kind_at(tokens, open + 2)?) {
        (TokenKind::LeftParen, TokenKind::String(spec), TokenKind::RightParen) => Some(spec.clone()),
        _ => None,
    }
}

/// The `from "spec"` clause ending the declaration that starts at `start`.
fn from_specifier(tokens: &[Token], start: usize) -> Option<String> {
    for i in start..tokens.len() {
        match &tokens[i].kind {
            TokenKind::Semicolon | TokenKind::Import | TokenKind::Export => return None,
            kind if kind.is_word("from") => {
                return match kind_at(tokens, i + 1) {
                    Some(TokenKind::String(spec)) => Some(spec.clone()),
                    _ => None,
                };
            }
            _ => {}
        }
    }
    None
}
