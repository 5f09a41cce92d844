// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Global namespace and the export bridge that fills it.
//!
//! Loading a module copies its exports into the namespace shared by every
//! script, which makes `load` behave like classic script inclusion. Whether
//! and when that happens is governed by [`LoaderConfig`](crate::LoaderConfig).

use crate::value::{Exports, Value};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Reserved export key and global name for default exports
pub const DEFAULT_EXPORT: &str = "default";

/// Bindings visible to all executed script text.
///
/// Cloning yields another handle to the same namespace.
#[derive(Debug, Clone, Default)]
pub struct GlobalNamespace {
    bindings: Arc<RwLock<HashMap<String, Value>>>,
}

impl GlobalNamespace {
    /// Create a new empty namespace
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a global binding
    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.read().get(name).cloned()
    }

    /// Check if a global binding exists
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.read().contains_key(name)
    }

    /// All bound names, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.bindings.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.bindings.read().len()
    }

    /// Check if nothing has been published yet
    pub fn is_empty(&self) -> bool {
        self.bindings.read().is_empty()
    }

    fn bind(&self, name: String, value: Value) {
        self.bindings.write().insert(name, value);
    }
}

/// Copy a module's exports into the global namespace.
///
/// Named exports are bound under their own names. A composite default
/// export has its own keys flattened into the namespace; any other default
/// value is bound as `default`.
pub fn publish(globals: &GlobalNamespace, exports: &Exports) {
    let mut default = None;

    for (name, value) in exports.entries() {
        if name == DEFAULT_EXPORT {
            default = Some(value);
        } else {
            globals.bind(name, value);
        }
    }

    if let Some(value) = default {
        match value.as_object() {
            Some(object) => {
                for (name, value) in object.entries() {
                    globals.bind(name, value);
                }
            }
            None => globals.bind(DEFAULT_EXPORT.to_string(), value),
        }
    }

    debug!(bindings = globals.len(), "Published module exports");
}
