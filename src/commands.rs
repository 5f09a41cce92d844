// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Subcommand implementations.

use crate::cli::{DepsArgs, DetectArgs, ResolveArgs, TransformArgs};
use anyhow::{bail, Context, Result};
use owo_colors::OwoColorize;
use spacey_modules::{
    dependencies, module_system::detect_with, resolve, transform, DetectionMode, Dialect,
    FsSources, LoaderConfig, SourceProvider,
};
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

/// Run the detect command.
pub fn detect_cmd(args: &DetectArgs, config: &LoaderConfig) -> Result<()> {
    let source = read_input(args.file.as_deref())?;
    let dialect = detect_with(&source, detection_mode(args, config));
    println!("{}", dialect.as_str());
    Ok(())
}

/// `--textual` wins over the configured mode.
fn detection_mode(args: &DetectArgs, config: &LoaderConfig) -> DetectionMode {
    if args.textual {
        DetectionMode::Textual
    } else {
        config.detection
    }
}

/// Run the transform command.
pub fn transform_cmd(args: &TransformArgs, config: &LoaderConfig) -> Result<()> {
    let source = read_input(args.file.as_deref())?;
    match detect_with(&source, config.detection) {
        Dialect::Declarative => print!("{}", transform(&source)),
        Dialect::Implicit => print!("{}", source),
    }
    Ok(())
}

/// Run the resolve command.
pub fn resolve_cmd(args: &ResolveArgs) -> Result<()> {
    println!("{}", resolve(&args.base, &args.specifier));
    Ok(())
}

/// Run the deps command.
pub fn deps_cmd(args: &DepsArgs) -> Result<()> {
    let mut sources = FsSources::new(&args.root);
    if let Some(dir) = &args.node_modules {
        sources = sources.with_node_modules(dir);
    }

    let entry = resolve("", &args.entry);
    if sources.locate(&entry).is_none() {
        bail!(
            "Cannot find module '{}' under {}",
            entry,
            sources.root().display()
        );
    }

    println!("{}", entry.cyan().bold());

    let mut walk = DependencyWalk {
        sources: &sources,
        stack: vec![entry.clone()],
        expanded: HashSet::new(),
        missing: 0,
    };
    walk.print_children(&entry, "");

    if walk.missing > 0 {
        bail!("{} missing module(s)", walk.missing);
    }
    Ok(())
}

struct DependencyWalk<'a> {
    sources: &'a FsSources,
    /// Modules on the path from the entry to the current node
    stack: Vec<String>,
    expanded: HashSet<String>,
    missing: usize,
}

impl DependencyWalk<'_> {
    fn print_children(&mut self, path: &str, prefix: &str) {
        let Some(source) = self.sources.load_source(path) else {
            return;
        };
        self.expanded.insert(path.to_string());

        let specifiers = dependencies(&source);
        for (i, specifier) in specifiers.iter().enumerate() {
            let last = i + 1 == specifiers.len();
            let branch = if last { "└── " } else { "├── " };
            let child = resolve(path, specifier);

            if self.stack.contains(&child) {
                println!("{}{}{} {}", prefix, branch, child, "(cycle)".yellow());
            } else if self.sources.locate(&child).is_none() {
                println!("{}{}{} {}", prefix, branch, child.red(), "(missing)".red());
                self.missing += 1;
            } else if self.expanded.contains(&child) {
                println!("{}{}{}", prefix, branch, child.dimmed());
            } else {
                println!("{}{}{}", prefix, branch, child.cyan());
                let nested = format!("{}{}", prefix, if last { "    " } else { "│   " });
                self.stack.push(child.clone());
                self.print_children(&child, &nested);
                self.stack.pop();
            }
        }
    }
}

/// Read a module from `file`, or from standard input for `-` or when no file
/// is given and input is piped.
fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        Some(_) => read_stdin(),
        None if atty::is(atty::Stream::Stdin) => {
            bail!("No input: pass a FILE or pipe a module on standard input")
        }
        None => read_stdin(),
    }
}

fn read_stdin() -> Result<String> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read standard input")?;
    Ok(source)
}
