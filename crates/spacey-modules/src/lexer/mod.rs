// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Lexical analysis for module source text.
//!
//! The module layer never parses whole programs. It only needs to know where
//! `import`/`export` declarations start and end, and it must not be fooled by
//! keywords that sit inside comments or string literals. The scanner gives it
//! exactly that: a token stream with byte spans back into the source.
//!
//! ## Usage
//!
//! ```rust
//! use spacey_modules::lexer::{Scanner, TokenKind};
//!
//! let mut scanner = Scanner::new("export const x = 42;");
//!
//! loop {
//!     let token = scanner.next_token();
//!     if matches!(token.kind, TokenKind::Eof) {
//!         break;
//!     }
//!     println!("{:?}", token.kind);
//! }
//! ```

mod scanner;
mod token;

pub use scanner::{tokenize, Scanner};
pub use token::{Span, Token, TokenKind};
