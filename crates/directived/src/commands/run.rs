// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use directive_core::{PlaceholderRenderer, TemplateRenderer};
use directive_engine::{Dispatch, ExecutionLoop, PassOutcome};
use directive_log::PerformanceTracker;

use crate::setup::Project;

fn build_loop(project: &Project, batch: bool) -> ExecutionLoop {
    let dispatch = if batch { Dispatch::Batch(project.batch_coordinator()) } else { Dispatch::Sequential(project.gateway()) };
    let template: Arc<dyn TemplateRenderer> = Arc::new(PlaceholderRenderer::new());
    ExecutionLoop::new(
        project.store.clone(),
        project.sessions.clone(),
        template,
        dispatch,
        Arc::clone(&project.logger),
        PerformanceTracker::default(),
        project.config.clone(),
    )
}

/// `run`: loop passes until one finds nothing ready (§4.6).
pub async fn run(project: &Project, batch: bool) -> anyhow::Result<i32> {
    let engine = build_loop(project, batch);
    engine.run().await?;
    Ok(0)
}

/// `runSingle`: one pass, exit code communicates whether it found work
/// (`SPEC_FULL.md` §C's exit-code convention: 0 worked, 2 idle).
pub async fn run_single(project: &Project, batch: bool) -> anyhow::Result<i32> {
    let engine = build_loop(project, batch);
    match engine.run_single().await? {
        PassOutcome::Worked => Ok(0),
        PassOutcome::Idle => Ok(2),
    }
}
