// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Loader configuration.
//!
//! Defaults reproduce the classic behaviour: every load publishes its exports
//! into the global namespace, and dialect detection is lexical. Values can be
//! overridden from a JSON file and from `SPACEY_MODULES_*` environment
//! variables, in that order.

use crate::error::{ModuleError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Environment variable prefix for configuration overrides.
pub const ENV_PREFIX: &str = "SPACEY_MODULES_";

/// How a module's dialect is decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMode {
    /// Look for `import`/`export` keyword tokens outside comments and strings
    #[default]
    Lexical,
    /// Look for the raw substrings `"import "` / `"export "` anywhere
    Textual,
}

impl FromStr for DetectionMode {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "lexical" => Ok(DetectionMode::Lexical),
            "textual" => Ok(DetectionMode::Textual),
            other => Err(ModuleError::Config(format!(
                "unknown detection mode '{}' (expected 'lexical' or 'textual')",
                other
            ))),
        }
    }
}

/// Which load requests publish exports into the global namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublishScope {
    /// Every successful `load`, nested ones and cache hits included
    #[default]
    EveryLoad,
    /// Only requests made while no module body is executing
    TopLevel,
}

impl FromStr for PublishScope {
    type Err = ModuleError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "every-load" => Ok(PublishScope::EveryLoad),
            "top-level" => Ok(PublishScope::TopLevel),
            other => Err(ModuleError::Config(format!(
                "unknown publish scope '{}' (expected 'every-load' or 'top-level')",
                other
            ))),
        }
    }
}

/// Configuration for a [`ModuleSystem`](crate::ModuleSystem).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct LoaderConfig {
    /// Copy exported bindings into the global namespace after a load
    pub publish_to_global: bool,

    /// Which loads trigger publication
    pub publish_scope: PublishScope,

    /// Dialect detection strategy
    pub detection: DetectionMode,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            publish_to_global: true,
            publish_scope: PublishScope::EveryLoad,
            detection: DetectionMode::Lexical,
        }
    }
}

impl LoaderConfig {
    /// Load configuration: defaults, then an optional JSON file, then the
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with(path, std::env::vars())
    }

    /// Like [`LoaderConfig::load`], reading overrides from `vars` instead of
    /// the process environment.
    pub fn load_with<I>(path: Option<&Path>, vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut config = match path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_env(vars)?;
        Ok(config)
    }

    /// Read configuration from a JSON file. Missing keys keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Parse configuration from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Apply `SPACEY_MODULES_*` pairs from an arbitrary variable source.
    pub fn apply_env<I>(&mut self, vars: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        for (key, value) in vars {
            if let Some(config_key) = key.strip_prefix(ENV_PREFIX) {
                let config_key = config_key.to_lowercase().replace('_', "-");
                self.set(&config_key, &value)?;
            }
        }
        Ok(())
    }

    /// Set a configuration value by its kebab-case key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "publish-to-global" => self.publish_to_global = parse_bool(key, value)?,
            "publish-scope" => self.publish_scope = value.parse()?,
            "detection" => self.detection = value.parse()?,
            _ => {
                return Err(ModuleError::Config(format!(
                    "unknown configuration key '{}'",
                    key
                )));
            }
        }
        Ok(())
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        other => Err(ModuleError::Config(format!(
            "'{}' expects true or false, got '{}'",
            key, other
        ))),
    }
}
