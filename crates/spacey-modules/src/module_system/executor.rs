// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Sandboxed module execution.
//!
//! The host's interpreter is reached through [`ScriptEvaluator`]. Each module
//! body is evaluated with a [`ModuleScope`] that supplies its local bindings:
//!
//! - `exports` - the module's exports object
//! - `module` - an object whose `exports` property starts as the same object;
//!   reassigning `module.exports` replaces what the module exports
//! - `load` - synchronous loader resolving relative to the module
//! - `importAsync` - the same loader returning a ready future
//! - `__filename` / `__dirname` - the module's resolved path and directory

use crate::error::{ModuleError, Result, ScriptError};
use crate::module_system::bridge::{GlobalNamespace, DEFAULT_EXPORT};
use crate::module_system::loader::ModuleSystem;
use crate::module_system::resolver;
use crate::value::{Exports, ObjectRef, Value};
use futures::future::Ready;
use parking_lot::Mutex;
use tracing::error;

/// Binding name of the exports object
pub const EXPORTS: &str = "exports";
/// Binding name of the module object
pub const MODULE: &str = "module";
/// Binding name of the synchronous loader
pub const LOAD: &str = "load";
/// Binding name of the asynchronous loader
pub const IMPORT_ASYNC: &str = "importAsync";
/// Binding name of the module path
pub const FILENAME: &str = "__filename";
/// Binding name of the module directory
pub const DIRNAME: &str = "__dirname";

const PARAMETERS: &[&str] = &[EXPORTS, MODULE, LOAD, IMPORT_ASYNC, FILENAME, DIRNAME];

/// Stack of module paths whose bodies are currently executing
#[derive(Debug, Default)]
pub struct LoaderContext {
    stack: Mutex<Vec<String>>,
}

impl LoaderContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `path` for as long as the returned guard lives
    pub fn enter(&self, path: &str) -> ContextGuard<'_> {
        self.stack.lock().push(path.to_string());
        ContextGuard { context: self }
    }

    /// Innermost executing module
    pub fn current(&self) -> Option<String> {
        self.stack.lock().last().cloned()
    }

    /// Number of module bodies currently executing
    pub fn depth(&self) -> usize {
        self.stack.lock().len()
    }

    /// Executing modules, outermost first
    pub fn stack(&self) -> Vec<String> {
        self.stack.lock().clone()
    }
}

/// Pops the context entry pushed by [`LoaderContext::enter`]
#[must_use = "the context entry is popped when the guard is dropped"]
pub struct ContextGuard<'a> {
    context: &'a LoaderContext,
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        self.context.stack.lock().pop();
    }
}

/// Module-local bindings handed to the evaluator
pub struct ModuleScope<'a> {
    system: &'a ModuleSystem,
    path: &'a str,
    exports: &'a Exports,
    module: ObjectRef,
}

impl<'a> ModuleScope<'a> {
    pub(crate) fn new(system: &'a ModuleSystem, path: &'a str, exports: &'a Exports) -> Self {
        let module = ObjectRef::new();
        module.set(EXPORTS, Value::Object(exports.clone()));
        Self {
            system,
            path,
            exports,
            module,
        }
    }

    /// Names bound in every module body
    pub fn parameter_names() -> &'static [&'static str] {
        PARAMETERS
    }

    /// The module's exports object
    pub fn exports(&self) -> &Exports {
        self.exports
    }

    /// Resolved path of the module (`__filename`)
    pub fn filename(&self) -> &str {
        self.path
    }

    /// Directory of the module (`__dirname`)
    pub fn dirname(&self) -> &str {
        resolver::dirname(self.path)
    }

    /// Value of a data binding. `load` and `importAsync` are callables the
    /// evaluator dispatches to [`load`](Self::load) and
    /// [`import_async`](Self::import_async), so they have no value here.
    pub fn binding(&self, name: &str) -> Option<Value> {
        match name {
            EXPORTS => Some(Value::Object(self.exports.clone())),
            MODULE => Some(Value::Object(self.module.clone())),
            FILENAME => Some(Value::from(self.filename())),
            DIRNAME => Some(Value::from(self.dirname())),
            _ => None,
        }
    }

    /// The `load` binding
    pub fn load(&self, specifier: &str) -> Result<Exports> {
        self.system.load_from(self.path, specifier)
    }

    /// The `importAsync` binding
    pub fn import_async(&self, specifier: &str) -> Ready<Result<Exports>> {
        futures::future::ready(self.load(specifier))
    }

    /// The shared global namespace
    pub fn globals(&self) -> &GlobalNamespace {
        self.system.globals()
    }

    /// Fold a reassigned `module.exports` back into the exports object. The
    /// registry keeps the original object, so an object replacement has its
    /// entries copied over and any other value becomes the `default` export.
    fn adopt_module_exports(&self) {
        match self.module.get(EXPORTS) {
            Some(Value::Object(object)) if object.ptr_eq(self.exports) => {}
            Some(Value::Object(object)) => {
                for (name, value) in object.entries() {
                    self.exports.set(name, value);
                }
            }
            Some(Value::Undefined) | None => {}
            Some(value) => self.exports.set(DEFAULT_EXPORT, value),
        }
    }
}

/// Runs script text. Supplied by the host.
pub trait ScriptEvaluator {
    /// Evaluate `source` with the bindings of `scope` in effect
    fn evaluate(&self, source: &str, scope: &ModuleScope<'_>) -> std::result::Result<Value, ScriptError>;
}

/// [`ScriptEvaluator`] backed by a closure, see [`evaluator_fn`]
pub struct FnEvaluator<F>(F);

impl<F> ScriptEvaluator for FnEvaluator<F>
where
    F: Fn(&str, &ModuleScope<'_>) -> std::result::Result<Value, ScriptError>,
{
    fn evaluate(&self, source: &str, scope: &ModuleScope<'_>) -> std::result::Result<Value, ScriptError> {
        (self.0)(source, scope)
    }
}

/// Wrap a closure as a [`ScriptEvaluator`]
pub fn evaluator_fn<F>(f: F) -> FnEvaluator<F>
where
    F: Fn(&str, &ModuleScope<'_>) -> std::result::Result<Value, ScriptError>,
{
    FnEvaluator(f)
}

/// Execute a module body, filling `exports` in place.
///
/// A nested load failure surfacing through the evaluator is returned as-is;
/// any other evaluator failure is logged and wrapped with the module path.
pub fn execute(system: &ModuleSystem, source: &str, path: &str, exports: &Exports) -> Result<()> {
    let _guard = system.context().enter(path);
    let scope = ModuleScope::new(system, path, exports);
    let outcome = system.evaluator().evaluate(source, &scope);
    scope.adopt_module_exports();

    match outcome {
        Ok(_) => Ok(()),
        Err(ScriptError::Load(inner)) => Err(*inner),
        Err(source) => {
            error!(path, error = %source, "Module execution failed");
            Err(ModuleError::Execution {
                path: path.to_string(),
                source,
            })
        }
    }
}
