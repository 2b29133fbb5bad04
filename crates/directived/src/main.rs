// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `directived`: the operational entry point for the directive pipeline.
//! A thin shell over the execution loop (C7) plus the setup operations a
//! scheduler needs before that loop has anything to run — the interactive
//! command/REPL surface over the pipeline is explicitly out of scope
//! (spec.md §1); this binary is what a cron job or systemd timer shells
//! out to.

mod cli;
mod commands;
mod setup;

use clap::Parser;

use cli::{Cli, Command};
use setup::Project;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let project = Project::load(cli.project)?;

    let code = match cli.command {
        Command::Init => commands::init::run(&project)?,
        Command::Decompose { prompt, platform, model } => commands::decompose::run(&project, prompt, platform, model).await?,
        Command::Run { batch } => commands::run::run(&project, batch).await?,
        Command::RunSingle { batch } => commands::run::run_single(&project, batch).await?,
        Command::Status => commands::status::run(&project)?,
    };

    std::process::exit(code);
}
