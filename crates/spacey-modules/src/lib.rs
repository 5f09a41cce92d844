// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! # spacey-modules
//!
//! A module loader for scripts running inside an embedding host.
//!
//! Script files reference each other either with `import`/`export`
//! declarations or with an ambient `exports` object and a `load` function.
//! This crate resolves specifiers, rewrites the declarative form into the
//! implicit one, executes each module once through a host-supplied
//! evaluator, and publishes exported bindings into a shared global namespace.
//!
//! The host provides two things:
//!
//! - a [`SourceProvider`] returning source text for a resolved path
//! - a [`ScriptEvaluator`] that runs text with module-local bindings
//!
//! ## Quick Start
//!
//! ```rust
//! use spacey_modules::{evaluator_fn, MemorySources, ModuleSystem, Value};
//!
//! let sources = MemorySources::new().with("greeting", "exports.text = 'hello';");
//!
//! // A real host hands the text to its interpreter
//! let evaluator = evaluator_fn(|_source, scope| {
//!     scope.exports().set("text", Value::from("hello"));
//!     Ok(Value::Undefined)
//! });
//!
//! let system = ModuleSystem::new(sources, evaluator);
//! let exports = system.load("greeting").unwrap();
//!
//! assert_eq!(exports.get("text"), Some(Value::from("hello")));
//! assert_eq!(system.globals().get("text"), Some(Value::from("hello")));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod lexer;
pub mod module_system;
pub mod value;

// Re-exports
pub use config::{DetectionMode, LoaderConfig, PublishScope};
pub use error::{ModuleError, Result, ScriptError};
pub use module_system::{
    dependencies, detect, evaluator_fn, resolve, transform, Dialect, FsSources, GlobalNamespace,
    MemorySources, ModuleScope, ModuleSystem, ScriptEvaluator, SourceProvider,
};
pub use value::{Exports, NativeFunction, ObjectRef, Value};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
