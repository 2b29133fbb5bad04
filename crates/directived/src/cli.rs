// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Argument parsing for the `directived` operational entry point.
//!
//! This binary is deliberately narrow: it exposes the execution loop's
//! `run`/`runSingle` operations plus the two setup operations (`init`,
//! `decompose`) and a read-only `status` view. A full interactive
//! command/REPL surface over the directive pipeline is out of scope
//! (spec.md §1); this is the thing a scheduler or cron job shells out to.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "directived", about = "Run the directive pipeline against a project directory")]
pub struct Cli {
    /// Project root containing (or to contain) the `directives/` and
    /// `sessions/` folders. Defaults to the current directory.
    #[arg(short = 'C', long = "project", global = true)]
    pub project: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the five lifecycle folders plus the claim staging directory.
    Init,
    /// Decompose a free-form prompt into a directive chain and write it to `new/`.
    Decompose {
        /// The prompt text to decompose.
        prompt: String,
        /// Override the (platform) every emitted directive dispatches through.
        #[arg(long)]
        platform: Option<String>,
        /// Override the model every emitted directive dispatches through.
        #[arg(long)]
        model: Option<String>,
    },
    /// Run passes until none are ready (`run`, §4.6).
    Run {
        /// Dispatch every ready directive through the batch coordinator
        /// instead of one call per directive.
        #[arg(long)]
        batch: bool,
    },
    /// Run exactly one pass and exit (`runSingle`, §4.6). Exit code 0 means
    /// a directive was processed; exit code 2 means nothing was ready
    /// (`SPEC_FULL.md` §C's exit-code convention for cooperative polling).
    RunSingle {
        #[arg(long)]
        batch: bool,
    },
    /// Print a count of directives currently sitting in each lifecycle folder.
    Status,
}
