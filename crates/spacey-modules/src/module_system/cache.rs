// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module registry: resolved path to module record

use crate::value::Exports;
use dashmap::DashMap;

/// Registered module entry
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    /// Resolved path
    pub path: String,
    /// The module's exports (shared with every loader of the module)
    pub exports: Exports,
    /// Whether the module body has finished executing
    pub loaded: bool,
    /// Module that was executing when this one was first requested
    pub parent: Option<String>,
}

impl ModuleRecord {
    /// Create a record for a module about to execute
    pub fn new(path: impl Into<String>, parent: Option<String>) -> Self {
        Self {
            path: path.into(),
            exports: Exports::new(),
            loaded: false,
            parent,
        }
    }
}

/// Registry of every module loaded by a module system.
///
/// Entries are never evicted: a path maps to the same record for the life of
/// the registry.
pub struct ModuleRegistry {
    modules: DashMap<String, ModuleRecord>,
}

impl ModuleRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
        }
    }

    /// Get a registered module by path
    pub fn get(&self, path: &str) -> Option<ModuleRecord> {
        self.modules.get(path).map(|entry| entry.clone())
    }

    /// Check if a module is registered
    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    /// Register a module. An existing record for the same path wins and is
    /// returned unchanged.
    pub fn insert(&self, record: ModuleRecord) -> ModuleRecord {
        self.modules
            .entry(record.path.clone())
            .or_insert(record)
            .value()
            .clone()
    }

    /// Mark a module as fully executed
    pub fn mark_loaded(&self, path: &str) {
        if let Some(mut entry) = self.modules.get_mut(path) {
            entry.loaded = true;
        }
    }

    /// All registered paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.modules.iter().map(|entry| entry.key().clone()).collect();
        paths.sort();
        paths
    }

    /// Number of registered modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Check if the registry is empty
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
