// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CLI argument parsing for spacey-modules.

use clap::{Args, Parser, Subcommand};
use spacey_modules::VERSION;
use std::path::PathBuf;

/// Inspect how script modules are detected, rewritten and resolved
#[derive(Parser, Debug)]
#[command(name = "spacey-modules", version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Loader configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the dialect of a module (declarative or implicit)
    Detect(DetectArgs),

    /// Print a module rewritten into the implicit dialect
    Transform(TransformArgs),

    /// Resolve a specifier against the module that requests it
    Resolve(ResolveArgs),

    /// Print the static dependency tree of a module graph
    #[command(alias = "tree")]
    Deps(DepsArgs),
}

#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Module file (`-` or omitted reads piped standard input)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Use the raw substring check instead of scanning tokens
    #[arg(long)]
    pub textual: bool,
}

#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Module file (`-` or omitted reads piped standard input)
    #[arg(value_name = "FILE")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ResolveArgs {
    /// Path of the requesting module (empty for a top-level request)
    pub base: String,

    /// Specifier as written in the requesting module
    pub specifier: String,
}

#[derive(Args, Debug)]
pub struct DepsArgs {
    /// Entry module path, relative to the root
    pub entry: String,

    /// Directory module paths are resolved under
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Additional directory to search for packages
    #[arg(long, value_name = "DIR")]
    pub node_modules: Option<PathBuf>,
}
