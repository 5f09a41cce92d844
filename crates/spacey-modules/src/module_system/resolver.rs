// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Module path resolution.
//!
//! Resolution is purely textual: relative specifiers are joined to the
//! requesting module's directory, everything else is passed through for the
//! source provider to interpret. Nothing here touches the file system.

/// Check whether a specifier carries a relative marker (`./` or `../`).
pub fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

/// Directory component of a module path: everything before the final `/`.
///
/// Returns an empty string when the path has no directory component.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) => "/",
        Some(pos) => &path[..pos],
        None => "",
    }
}

/// Resolve `specifier` as requested by the module at `base`.
///
/// `base` is empty for top-level requests.
pub fn resolve(base: &str, specifier: &str) -> String {
    if !is_relative(specifier) {
        return specifier.to_string();
    }

    let dir = dirname(base);
    let joined = if dir.is_empty() {
        specifier.to_string()
    } else if dir.ends_with('/') {
        format!("{}{}", dir, specifier)
    } else {
        format!("{}/{}", dir, specifier)
    };

    normalize(&joined)
}

/// Collapse `.` segments and `..` segments that have a parent to pop.
///
/// `..` segments that would climb past the start of a relative path are kept.
fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            other => segments.push(other),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{}", joined)
    } else {
        joined
    }
}
