// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module system - resolves, caches, executes and publishes modules

use crate::config::{LoaderConfig, PublishScope};
use crate::error::{ModuleError, Result};
use crate::module_system::bridge::{self, GlobalNamespace};
use crate::module_system::cache::{ModuleRecord, ModuleRegistry};
use crate::module_system::dialect::{detect_with, Dialect};
use crate::module_system::executor::{self, LoaderContext, ScriptEvaluator};
use crate::module_system::resolver::resolve;
use crate::module_system::sources::SourceProvider;
use crate::module_system::transform::transform;
use crate::value::Exports;
use futures::future::Ready;
use std::borrow::Cow;
use std::fmt;
use tracing::{debug, instrument};

/// A module system: one registry, one global namespace, one execution
/// context.
///
/// Independent systems share nothing.
pub struct ModuleSystem {
    config: LoaderConfig,
    sources: Box<dyn SourceProvider>,
    evaluator: Box<dyn ScriptEvaluator>,
    registry: ModuleRegistry,
    globals: GlobalNamespace,
    context: LoaderContext,
}

impl ModuleSystem {
    /// Create a module system with the default configuration
    pub fn new<S, E>(sources: S, evaluator: E) -> Self
    where
        S: SourceProvider + 'static,
        E: ScriptEvaluator + 'static,
    {
        Self::builder(sources, evaluator).build()
    }

    /// Start configuring a module system
    pub fn builder<S, E>(sources: S, evaluator: E) -> ModuleSystemBuilder
    where
        S: SourceProvider + 'static,
        E: ScriptEvaluator + 'static,
    {
        ModuleSystemBuilder {
            config: LoaderConfig::default(),
            sources: Box::new(sources),
            evaluator: Box::new(evaluator),
            globals: None,
        }
    }

    /// Load `specifier`, resolving it relative to the module currently
    /// executing (or as-is at top level).
    pub fn load(&self, specifier: &str) -> Result<Exports> {
        let base = self.context.current().unwrap_or_default();
        self.load_from(&base, specifier)
    }

    /// Load `specifier` as requested by the module at `base`.
    #[instrument(level = "debug", skip(self))]
    pub fn load_from(&self, base: &str, specifier: &str) -> Result<Exports> {
        let path = resolve(base, specifier);
        debug!(%path, "Resolved module");

        let top_level = self.context.depth() == 0;
        let exports = self.get_or_load(&path)?;

        if self.publishes(top_level) {
            bridge::publish(&self.globals, &exports);
        }

        Ok(exports)
    }

    /// [`load`](Self::load) as an already-completed future
    pub fn import_async(&self, specifier: &str) -> Ready<Result<Exports>> {
        futures::future::ready(self.load(specifier))
    }

    /// Exports of the module at a resolved path, loading it on first use.
    ///
    /// A module that is still executing (a cycle) returns its partial exports.
    pub fn get_or_load(&self, path: &str) -> Result<Exports> {
        if let Some(record) = self.registry.get(path) {
            debug!(path, loaded = record.loaded, "Module cache hit");
            return Ok(record.exports);
        }

        let source = self
            .sources
            .load_source(path)
            .ok_or_else(|| ModuleError::not_found(path))?;

        let dialect = detect_with(&source, self.config.detection);
        debug!(path, dialect = dialect.as_str(), "Detected module dialect");

        let body = match dialect {
            Dialect::Declarative => Cow::Owned(transform(&source)),
            Dialect::Implicit => Cow::Borrowed(source.as_str()),
        };

        let record = self
            .registry
            .insert(ModuleRecord::new(path, self.context.current()));
        executor::execute(self, &body, path, &record.exports)?;
        self.registry.mark_loaded(path);

        Ok(record.exports)
    }

    fn publishes(&self, top_level: bool) -> bool {
        self.config.publish_to_global
            && match self.config.publish_scope {
                PublishScope::EveryLoad => true,
                PublishScope::TopLevel => top_level,
            }
    }

    /// Loaded modules
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The global namespace exports are published into
    pub fn globals(&self) -> &GlobalNamespace {
        &self.globals
    }

    /// Active configuration
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub(crate) fn context(&self) -> &LoaderContext {
        &self.context
    }

    pub(crate) fn evaluator(&self) -> &dyn ScriptEvaluator {
        self.evaluator.as_ref()
    }
}

impl fmt::Debug for ModuleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSystem")
            .field("config", &self.config)
            .field("modules", &self.registry.paths())
            .field("globals", &self.globals.keys())
            .finish_non_exhaustive()
    }
}

/// Builder for [`ModuleSystem`]
pub struct ModuleSystemBuilder {
    config: LoaderConfig,
    sources: Box<dyn SourceProvider>,
    evaluator: Box<dyn ScriptEvaluator>,
    globals: Option<GlobalNamespace>,
}

impl ModuleSystemBuilder {
    /// Use `config` instead of the defaults
    pub fn config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Publish into an existing namespace
    pub fn globals(mut self, globals: GlobalNamespace) -> Self {
        self.globals = Some(globals);
        self
    }

    /// Build the module system
    pub fn build(self) -> ModuleSystem {
        ModuleSystem {
            config: self.config,
            sources: self.sources,
            evaluator: self.evaluator,
            registry: ModuleRegistry::new(),
            globals: self.globals.unwrap_or_default(),
            context: LoaderContext::new(),
        }
    }
}
