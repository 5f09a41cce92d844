// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module loading for embedded scripts
//!
//! Supports two module dialects:
//!
//! ## Declarative
//! - `import { a, b as c } from "m"` / `import x from "m"`
//! - `export const`, `export function`, `export default`
//! - Rewritten into the implicit dialect before execution
//!
//! ## Implicit
//! - An ambient `exports` object filled by the module body
//! - `load(specifier)` / `importAsync(specifier)`
//! - `__filename` / `__dirname`
//!
//! Every loaded module is registered by resolved path and executed once.
//! Its exports are then published into the global namespace.

mod bridge;
mod cache;
pub mod deps;
mod dialect;
mod executor;
mod loader;
pub mod resolver;
mod sources;
mod transform;

pub use bridge::{publish, GlobalNamespace, DEFAULT_EXPORT};
pub use cache::{ModuleRecord, ModuleRegistry};
pub use deps::dependencies;
pub use dialect::{detect, detect_with, Dialect};
pub use executor::{
    evaluator_fn, execute, ContextGuard, FnEvaluator, LoaderContext, ModuleScope, ScriptEvaluator,
    DIRNAME, EXPORTS, FILENAME, IMPORT_ASYNC, LOAD, MODULE,
};
pub use loader::{ModuleSystem, ModuleSystemBuilder};
pub use resolver::{dirname, is_relative, resolve};
pub use sources::{FsSources, MemorySources, SourceProvider};
pub use transform::transform;
