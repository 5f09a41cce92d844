// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Source providers: where module text comes from

use parking_lot::RwLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Supplies raw source text for a resolved module path.
///
/// `None` means the module does not exist. The loader asks at most once per
/// path unless the answer was `None`.
pub trait SourceProvider {
    /// Source text for `path`, if any
    fn load_source(&self, path: &str) -> Option<String>;
}

impl<F> SourceProvider for F
where
    F: Fn(&str) -> Option<String>,
{
    fn load_source(&self, path: &str) -> Option<String> {
        self(path)
    }
}

/// In-memory sources keyed by resolved path.
///
/// Clones share the same table, so sources can be added after the provider
/// has been handed to a module system.
#[derive(Debug, Clone, Default)]
pub struct MemorySources {
    sources: Arc<RwLock<HashMap<String, String>>>,
}

impl MemorySources {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`insert`](Self::insert)
    pub fn with(self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }

    /// Add or replace the source for a path
    pub fn insert(&self, path: impl Into<String>, source: impl Into<String>) {
        self.sources.write().insert(path.into(), source.into());
    }

    /// Remove the source for a path
    pub fn remove(&self, path: &str) -> Option<String> {
        self.sources.write().remove(path)
    }

    /// Number of stored sources
    pub fn len(&self) -> usize {
        self.sources.read().len()
    }

    /// Check if no sources are stored
    pub fn is_empty(&self) -> bool {
        self.sources.read().is_empty()
    }
}

impl SourceProvider for MemorySources {
    fn load_source(&self, path: &str) -> Option<String> {
        self.sources.read().get(path).cloned()
    }
}

impl<K, V> FromIterator<(K, V)> for MemorySources
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let sources = MemorySources::new();
        for (path, source) in iter {
            sources.insert(path, source);
        }
        sources
    }
}

/// Reads modules from a directory tree.
///
/// A path is looked up under the root as given, then with each configured
/// extension appended, then as a directory. Paths not found locally are
/// tried as packages in the `node_modules` directories.
#[derive(Debug, Clone)]
pub struct FsSources {
    root: PathBuf,
    extensions: Vec<String>,
    node_modules: Vec<PathBuf>,
}

impl FsSources {
    /// Serve modules from `root`, with packages from `root/node_modules`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            node_modules: vec![root.join("node_modules")],
            root,
            extensions: vec![".js".to_string(), ".mjs".to_string()],
        }
    }

    /// Replace the extensions tried for extensionless paths
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    /// Also search `dir` for packages
    pub fn with_node_modules(mut self, dir: impl Into<PathBuf>) -> Self {
        self.node_modules.push(dir.into());
        self
    }

    /// Root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File that serves `path`, if any. Paths with `..` segments are
    /// refused so lookups stay under the root.
    pub fn locate(&self, path: &str) -> Option<PathBuf> {
        if climbs(path) {
            debug!(path, root = %self.root.display(), "Refusing path outside the root");
            return None;
        }

        let local = self.root.join(path.trim_start_matches('/'));
        if let Some(file) = self.find_file(&local) {
            return Some(file);
        }

        if path.starts_with('.') || path.starts_with('/') {
            return None;
        }
        self.find_package(path)
    }

    fn find_package(&self, specifier: &str) -> Option<PathBuf> {
        let (name, subpath) = parse_package_specifier(specifier);

        for dir in &self.node_modules {
            let package = dir.join(name);
            if !package.is_dir() {
                continue;
            }
            debug!(package = name, dir = %dir.display(), "Found package");
            return match subpath {
                Some(sub) => self.find_file(&package.join(sub)),
                None => self.find_in_directory(&package),
            };
        }

        None
    }

    fn find_file(&self, candidate: &Path) -> Option<PathBuf> {
        if candidate.is_file() {
            return Some(candidate.to_path_buf());
        }

        for ext in &self.extensions {
            let mut name = candidate.as_os_str().to_os_string();
            name.push(ext);
            let with_ext = PathBuf::from(name);
            if with_ext.is_file() {
                return Some(with_ext);
            }
        }

        if candidate.is_dir() {
            return self.find_in_directory(candidate);
        }
        None
    }

    /// Entry point of a directory: `package.json` `module`, then `main`,
    /// then `index`.
    fn find_in_directory(&self, dir: &Path) -> Option<PathBuf> {
        if let Some(manifest) = read_manifest(dir) {
            for entry in [manifest.module, manifest.main].into_iter().flatten() {
                if climbs(&entry) {
                    warn!(
                        dir = %dir.display(),
                        entry = %entry,
                        "Ignoring package entry outside the package"
                    );
                    continue;
                }
                let entry_path = dir.join(&entry);
                if entry_path == dir {
                    continue;
                }
                if let Some(file) = self.find_file(&entry_path) {
                    return Some(file);
                }
            }
        }

        let index = dir.join("index");
        self.extensions.iter().find_map(|ext| {
            let file = index.with_extension(ext.trim_start_matches('.'));
            file.is_file().then_some(file)
        })
    }
}

fn climbs(path: &str) -> bool {
    path.split(['/', '\\']).any(|segment| segment == "..")
}

impl SourceProvider for FsSources {
    fn load_source(&self, path: &str) -> Option<String> {
        let file = self.locate(path)?;
        match std::fs::read_to_string(&file) {
            Ok(source) => Some(source),
            Err(err) => {
                warn!(file = %file.display(), error = %err, "Failed to read module source");
                None
            }
        }
    }
}

/// The fields of `package.json` that pick a package entry point
#[derive(Debug, Default, Deserialize)]
struct PackageManifest {
    module: Option<String>,
    main: Option<String>,
}

fn read_manifest(dir: &Path) -> Option<PackageManifest> {
    let path = dir.join("package.json");
    if !path.is_file() {
        return None;
    }

    let parsed = std::fs::read_to_string(&path)
        .map_err(|err| err.to_string())
        .and_then(|content| serde_json::from_str(&content).map_err(|err| err.to_string()));

    match parsed {
        Ok(manifest) => Some(manifest),
        Err(err) => {
            warn!(file = %path.display(), error = %err, "Ignoring unreadable package.json");
            None
        }
    }
}

/// Split a bare specifier into package name and optional subpath.
fn parse_package_specifier(specifier: &str) -> (&str, Option<&str>) {
    let name_end = if specifier.starts_with('@') {
        // @scope/name[/subpath]
        specifier
            .find('/')
            .and_then(|scope_end| {
                specifier[scope_end + 1..]
                    .find('/')
                    .map(|pos| scope_end + 1 + pos)
            })
    } else {
        specifier.find('/')
    };

    match name_end {
        Some(end) => (&specifier[..end], Some(&specifier[end + 1..])),
        None => (specifier, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, path: &str, content: &str) {
        let file = root.join(path);
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(file, content).unwrap();
    }

    #[test]
    fn test_memory_sources_are_shared() {
        let sources = MemorySources::new().with("a", "exports.a = 1;");
        let handle = sources.clone();
        handle.insert("b", "exports.b = 2;");

        assert_eq!(sources.load_source("b").as_deref(), Some("exports.b = 2;"));
        assert_eq!(sources.len(), 2);
        assert_eq!(handle.remove("a").as_deref(), Some("exports.a = 1;"));
        assert_eq!(sources.load_source("a"), None);
    }

    #[test]
    fn test_closure_provider() {
        let provider = |path: &str| (path == "x").then(|| "exports.x = 1;".to_string());
        assert!(provider.load_source("x").is_some());
        assert!(provider.load_source("y").is_none());
    }

    #[test]
    fn test_parse_package_specifier() {
        assert_eq!(parse_package_specifier("lodash"), ("lodash", None));
        assert_eq!(parse_package_specifier("lodash/get"), ("lodash", Some("get")));
        assert_eq!(parse_package_specifier("@types/node"), ("@types/node", None));
        assert_eq!(
            parse_package_specifier("@babel/core/lib/index"),
            ("@babel/core", Some("lib/index"))
        );
    }

    #[test]
    fn test_local_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "main.js", "main");
        write(dir.path(), "lib/util.mjs", "util");
        write(dir.path(), "lib/data.txt", "data");
        write(dir.path(), "widgets/index.js", "widgets");

        let sources = FsSources::new(dir.path());
        assert_eq!(sources.load_source("main").as_deref(), Some("main"));
        assert_eq!(sources.load_source("main.js").as_deref(), Some("main"));
        assert_eq!(sources.load_source("lib/util").as_deref(), Some("util"));
        assert_eq!(sources.load_source("lib/data.txt").as_deref(), Some("data"));
        assert_eq!(sources.load_source("widgets").as_deref(), Some("widgets"));
        assert_eq!(sources.load_source("missing"), None);
    }

    #[test]
    fn test_extensions_are_configurable() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.mjs", "a");

        let sources = FsSources::new(dir.path()).with_extensions([".js"]);
        assert_eq!(sources.load_source("a"), None);
    }

    #[test]
    fn test_package_entry_points() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "node_modules/esm-pkg/package.json", r#"{"main": "cjs.js", "module": "esm.js"}"#);
        write(root, "node_modules/esm-pkg/esm.js", "esm");
        write(root, "node_modules/esm-pkg/cjs.js", "cjs");
        write(root, "node_modules/main-pkg/package.json", r#"{"main": "lib/entry"}"#);
        write(root, "node_modules/main-pkg/lib/entry.js", "entry");
        write(root, "node_modules/plain/index.js", "plain");
        write(root, "node_modules/broken/package.json", "{ not json");
        write(root, "node_modules/broken/index.js", "broken");

        let sources = FsSources::new(root);
        assert_eq!(sources.load_source("esm-pkg").as_deref(), Some("esm"));
        assert_eq!(sources.load_source("main-pkg").as_deref(), Some("entry"));
        assert_eq!(sources.load_source("plain").as_deref(), Some("plain"));
        assert_eq!(sources.load_source("broken").as_deref(), Some("broken"));
        assert_eq!(sources.load_source("absent-pkg"), None);
    }

    #[test]
    fn test_scoped_packages_and_subpaths() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        write(root, "node_modules/@acme/tools/index.js", "tools");
        write(root, "node_modules/@acme/tools/fmt/date.js", "date");
        write(root, "node_modules/lodash/get.js", "get");

        let sources = FsSources::new(root);
        assert_eq!(sources.load_source("@acme/tools").as_deref(), Some("tools"));
        assert_eq!(sources.load_source("@acme/tools/fmt/date").as_deref(), Some("date"));
        assert_eq!(sources.load_source("lodash/get").as_deref(), Some("get"));
    }

    #[test]
    fn test_relative_paths_skip_packages() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "node_modules/shared/index.js", "shared");

        let sources = FsSources::new(dir.path());
        assert_eq!(sources.load_source("./shared"), None);
    }

    #[test]
    fn test_paths_outside_root_are_refused() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "secret.js", "secret");
        write(dir.path(), "app/lib/util.js", "util");
        write(
            dir.path(),
            "app/node_modules/sneaky/package.json",
            r#"{"main": "../../../secret.js"}"#,
        );
        write(dir.path(), "app/node_modules/sneaky/index.js", "index");

        let sources = FsSources::new(dir.path().join("app"));
        assert_eq!(sources.load_source("lib/util").as_deref(), Some("util"));
        assert_eq!(sources.load_source("../secret"), None);
        assert_eq!(sources.load_source("lib/../../secret.js"), None);
        assert_eq!(sources.load_source("/../secret"), None);
        assert_eq!(sources.load_source("sneaky").as_deref(), Some("index"));
    }

    #[test]
    fn test_extra_node_modules_dir() {
        let project = TempDir::new().unwrap();
        let global = TempDir::new().unwrap();
        write(global.path(), "helper/index.js", "helper");

        let sources = FsSources::new(project.path()).with_node_modules(global.path());
        assert_eq!(sources.load_source("helper").as_deref(), Some("helper"));
    }
}
