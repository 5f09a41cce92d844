// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Script values exchanged between the module layer and the evaluator.
//!
//! The module layer does not run scripts itself, but it has to hold exported
//! bindings, hand them to other modules and publish them globally. This is
//! the shape those bindings take on the Rust side of the boundary.

use crate::error::ScriptError;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A script value.
///
/// Values are cheap to clone: objects and functions are shared references.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// undefined
    #[default]
    Undefined,
    /// null
    Null,
    /// Boolean value
    Boolean(bool),
    /// Number (IEEE 754 double)
    Number(f64),
    /// String
    String(String),
    /// Shared, mutable object
    Object(ObjectRef),
    /// Callable value
    Function(Arc<NativeFunction>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Function(a), Value::Function(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Value {
    /// Returns true if this value is nullish (null or undefined).
    pub fn is_nullish(&self) -> bool {
        matches!(self, Value::Undefined | Value::Null)
    }

    /// Returns true if this value is a function.
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Returns the object behind this value, if it is one. Only objects are
    /// composite: their own keys can be enumerated.
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Calls this value with `args`.
    pub fn call(&self, args: &[Value]) -> Result<Value, ScriptError> {
        match self {
            Value::Function(function) => function.call(args),
            other => Err(ScriptError::Type(format!("{} is not a function", other))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => write!(f, "undefined"),
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => write!(f, "{}", s),
            Value::Object(_) => write!(f, "[object Object]"),
            Value::Function(function) => match function.name() {
                Some(name) => write!(f, "[Function: {}]", name),
                None => write!(f, "[Function (anonymous)]"),
            },
        }
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<ObjectRef> for Value {
    fn from(object: ObjectRef) -> Self {
        Value::Object(object)
    }
}

/// A shared handle to a mutable property map.
///
/// Clones point at the same object, so a module's exports object can be
/// handed out while the module body is still filling it in.
#[derive(Clone, Default)]
pub struct ObjectRef(Arc<RwLock<HashMap<String, Value>>>);

impl ObjectRef {
    /// Create a new empty object
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a property
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.read().get(key).cloned()
    }

    /// Set a property
    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.0.write().insert(key.into(), value);
    }

    /// Check if a property exists
    pub fn has(&self, key: &str) -> bool {
        self.0.read().contains_key(key)
    }

    /// Own property names, sorted for stable iteration
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.0.read().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Copy of all properties
    pub fn entries(&self) -> Vec<(String, Value)> {
        let mut entries: Vec<(String, Value)> = self
            .0
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Number of own properties
    pub fn len(&self) -> usize {
        self.0.read().len()
    }

    /// Check if the object has no properties
    pub fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    /// Whether two handles refer to the same object
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Keys only: cyclic objects would recurse forever.
        f.debug_set().entries(self.keys()).finish()
    }
}

impl FromIterator<(String, Value)> for ObjectRef {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        ObjectRef(Arc::new(RwLock::new(iter.into_iter().collect())))
    }
}

/// A module's exports object.
pub type Exports = ObjectRef;

type NativeFn = dyn Fn(&[Value]) -> Result<Value, ScriptError> + Send + Sync;

/// A function value provided by the evaluator or the host.
pub struct NativeFunction {
    name: Option<String>,
    func: Box<NativeFn>,
}

impl NativeFunction {
    /// Wrap a Rust closure as a script function.
    pub fn new<F>(name: Option<String>, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, ScriptError> + Send + Sync + 'static,
    {
        Self {
            name,
            func: Box::new(func),
        }
    }

    /// The function name (if any)
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the function.
    pub fn call(&self, args: &[Value]) -> Result<Value, ScriptError> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeFunction({:?})", self.name)
    }
}
