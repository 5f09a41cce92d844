// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! spacey-modules CLI - inspect module detection, rewriting and resolution

mod cli;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use owo_colors::OwoColorize;
use spacey_modules::LoaderConfig;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "spacey_modules=debug"
    } else {
        "spacey_modules=warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config =
        LoaderConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match &cli.command {
        Commands::Detect(args) => commands::detect_cmd(args, &config),
        Commands::Transform(args) => commands::transform_cmd(args, &config),
        Commands::Resolve(args) => commands::resolve_cmd(args),
        Commands::Deps(args) => commands::deps_cmd(args),
    }
}
