// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the module system

use thiserror::Error;

/// Result type for module system operations
pub type Result<T> = std::result::Result<T, ModuleError>;

/// Errors surfaced by a load request
#[derive(Debug, Error)]
pub enum ModuleError {
    /// The source provider has no source for a resolved path
    #[error("Cannot find module '{0}'")]
    NotFound(String),

    /// The module body failed while it was being evaluated
    #[error("Error executing module '{path}': {source}")]
    Execution {
        /// Resolved path of the failing module
        path: String,
        /// Failure reported by the evaluator
        #[source]
        source: ScriptError,
    },

    /// Invalid configuration value
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system error
    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModuleError {
    /// Create a module not found error
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound(path.into())
    }

    /// Returns the missing path if this is a resolution failure.
    pub fn missing_path(&self) -> Option<&str> {
        match self {
            Self::NotFound(path) => Some(path),
            _ => None,
        }
    }
}

/// Failures reported by a script evaluator
#[derive(Debug, Error)]
pub enum ScriptError {
    /// Source text could not be parsed
    #[error("SyntaxError: {0}")]
    Syntax(String),

    /// Reference to an unbound name
    #[error("ReferenceError: {0}")]
    Reference(String),

    /// Operation applied to a value of the wrong type
    #[error("TypeError: {0}")]
    Type(String),

    /// Exception thrown by script code
    #[error("Uncaught {0}")]
    Thrown(String),

    /// A nested `load` failed while the body was running
    #[error(transparent)]
    Load(Box<ModuleError>),
}

impl ScriptError {
    /// Create a new SyntaxError
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax(msg.into())
    }

    /// Create a new ReferenceError
    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    /// Create a new TypeError
    pub fn type_error(msg: impl Into<String>) -> Self {
        Self::Type(msg.into())
    }
}

impl From<ModuleError> for ScriptError {
    fn from(err: ModuleError) -> Self {
        ScriptError::Load(Box::new(err))
    }
}
