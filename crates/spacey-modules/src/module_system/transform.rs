// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Declarative-to-implicit dialect rewriting.
//!
//! Five declaration shapes are recognized on the token stream and rewritten
//! in place:
//!
//! | Declarative                          | Implicit                                              |
//! |--------------------------------------|-------------------------------------------------------|
//! | `import { a, b as c } from "m";`     | `const { a, b: c } = load("m");`                      |
//! | `import x from "m";`                 | `const x = load("m").default ?? load("m");`           |
//! | `export const x = ...`               | `const x = exports.x = ...`                           |
//! | `export function f(...) {...}`       | `function f(...) {...} exports.f = f;`                |
//! | `export default ...`                 | `exports.default = ...`                               |
//!
//! Source between matches is copied byte for byte, so comments, formatting
//! and any construct outside these shapes survive untouched. The pass walks
//! the original tokens once and never rescans its own output.

use crate::lexer::{tokenize, Token, TokenKind};

/// A matched declaration and what replaces it.
struct Rewrite {
    /// Replacement text
    text: String,
    /// Byte offset just past the replaced source
    end: usize,
    /// Index of the first token after the match
    next: usize,
}

/// Rewrite declarative module syntax into the implicit dialect.
pub fn transform(source: &str) -> String {
    let tokens = tokenize(source);
    let mut out = String::with_capacity(source.len() + 64);
    let mut copied = 0;
    let mut i = 0;

    while i < tokens.len() {
        let after_dot = i > 0 && matches!(tokens[i - 1].kind, TokenKind::Dot | TokenKind::QuestionDot);

        let rewrite = if after_dot {
            None
        } else {
            match tokens[i].kind {
                TokenKind::Import => named_import(source, &tokens, i)
                    .or_else(|| default_import(source, &tokens, i)),
                TokenKind::Export => export_const(&tokens, i)
                    .or_else(|| export_function(source, &tokens, i))
                    .or_else(|| export_default(&tokens, i)),
                _ => None,
            }
        };

        match rewrite {
            Some(rewrite) => {
                out.push_str(&source[copied..tokens[i].span.start]);
                out.push_str(&rewrite.text);
                copied = rewrite.end;
                i = rewrite.next;
            }
            None => i += 1,
        }
    }

    out.push_str(&source[copied..]);
    out
}

fn kind_at(tokens: &[Token], i: usize) -> Option<&TokenKind> {
    tokens.get(i).map(|t| &t.kind)
}

fn identifier_at(tokens: &[Token], i: usize) -> Option<&str> {
    match kind_at(tokens, i) {
        Some(TokenKind::Identifier(name)) => Some(name),
        _ => None,
    }
}

/// `from "spec" [;]` starting at `i`: returns the raw literal text, the end
/// offset and the index after the clause.
fn from_clause<'s>(source: &'s str, tokens: &[Token], i: usize) -> Option<(&'s str, usize, usize)> {
    if !kind_at(tokens, i)?.is_word("from") {
        return None;
    }
    let spec = tokens.get(i + 1)?;
    if !matches!(spec.kind, TokenKind::String(_)) {
        return None;
    }
    match tokens.get(i + 2) {
        Some(semi) if semi.kind == TokenKind::Semicolon => {
            Some((spec.text(source), semi.span.end, i + 3))
        }
        _ => Some((spec.text(source), spec.span.end, i + 2)),
    }
}

/// `import { a, b as c } from "spec"`
fn named_import(source: &str, tokens: &[Token], start: usize) -> Option<Rewrite> {
    if kind_at(tokens, start + 1)? != &TokenKind::LeftBrace {
        return None;
    }

    let mut bindings = Vec::new();
    let mut i = start + 2;
    loop {
        let token = tokens.get(i)?;
        if token.kind == TokenKind::RightBrace {
            i += 1;
            break;
        }
        if !token.kind.is_name() {
            return None;
        }
        let imported = token.text(source);
        i += 1;

        if kind_at(tokens, i)?.is_word("as") {
            let local = identifier_at(tokens, i + 1)?;
            bindings.push(format!("{}: {}", imported, local));
            i += 2;
        } else if token.kind.is_keyword() {
            // `import { default }` has no usable local name
            return None;
        } else {
            bindings.push(imported.to_string());
        }

        match kind_at(tokens, i)? {
            TokenKind::Comma => i += 1,
            TokenKind::RightBrace => {}
            _ => return None,
        }
    }

    let (spec, end, next) = from_clause(source, tokens, i)?;
    let text = if bindings.is_empty() {
        format!("load({});", spec)
    } else {
        format!("const {{ {} }} = load({});", bindings.join(", "), spec)
    };

    Some(Rewrite { text, end, next })
}

/// `import name from "spec"`
fn default_import(source: &str, tokens: &[Token], start: usize) -> Option<Rewrite> {
    let name = identifier_at(tokens, start + 1)?;
    let (spec, end, next) = from_clause(source, tokens, start + 2)?;

    Some(Rewrite {
        text: format!("const {} = load({}).default ?? load({});", name, spec, spec),
        end,
        next,
    })
}

/// `export const name =`
fn export_const(tokens: &[Token], start: usize) -> Option<Rewrite> {
    if kind_at(tokens, start + 1)? != &TokenKind::Const {
        return None;
    }
    let name = identifier_at(tokens, start + 2)?;
    let equal = tokens.get(start + 3)?;
    if equal.kind != TokenKind::Equal {
        return None;
    }

    Some(Rewrite {
        text: format!("const {} = exports.{} =", name, name),
        end: equal.span.end,
        next: start + 4,
    })
}

/// `export function name(...) { ... }`
fn export_function(source: &str, tokens: &[Token], start: usize) -> Option<Rewrite> {
    let function = tokens.get(start + 1)?;
    if function.kind != TokenKind::Function {
        return None;
    }
    let name = identifier_at(tokens, start + 2)?;
    if kind_at(tokens, start + 3)? != &TokenKind::LeftParen {
        return None;
    }

    let body = matching(tokens, start + 3, &TokenKind::LeftParen, &TokenKind::RightParen)
        .map(|close| close + 1)
        .filter(|&open| kind_at(tokens, open) == Some(&TokenKind::LeftBrace))
        .and_then(|open| matching(tokens, open, &TokenKind::LeftBrace, &TokenKind::RightBrace));

    match body {
        Some(close) => {
            let end = tokens[close].span.end;
            Some(Rewrite {
                text: format!(
                    "{} exports.{} = {};",
                    &source[function.span.start..end],
                    name,
                    name
                ),
                end,
                next: close + 1,
            })
        }
        None => Some(Rewrite {
            text: format!("exports.{} = function {}", name, name),
            end: tokens[start + 2].span.end,
            next: start + 3,
        }),
    }
}

/// `export default`
fn export_default(tokens: &[Token], start: usize) -> Option<Rewrite> {
    let default = tokens.get(start + 1)?;
    if default.kind != TokenKind::Default {
        return None;
    }

    Some(Rewrite {
        text: "exports.default =".to_string(),
        end: default.span.end,
        next: start + 2,
    })
}

/// Index of the token closing the bracket opened at `open_index`.
fn matching(tokens: &[Token], open_index: usize, open: &TokenKind, close: &TokenKind) -> Option<usize> {
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open_index) {
        if &token.kind == open {
            depth += 1;
        } else if &token.kind == close {
            depth -= 1;
            if depth == 0 {
                return Some(i);
            }
        }
    }
    None
}
