// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Execution Loop (C7, §4.6): one worker, one pass at a time.
//!
//! A pass asks the store for the next ready directive (or, in batch mode,
//! every currently ready directive), claims it, enriches its prompt with
//! the session context block, dispatches it to a provider (sequentially or
//! via the batch coordinator), writes the result back to the paired output
//! artifact and the session's completion log, and relocates the directive
//! file to whichever terminal folder its outcome and duration select.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use parking_lot::Mutex;

use directive_core::{
    CompletedDirectiveSummary, Config, Directive, DirectiveId, DirectiveStatus, Event, OutputArtifact,
    Platform, SessionContext, SessionId, TemplateRenderer,
};
use directive_compose::{Bridge, ExternalTodo};
use directive_gateway::{BatchCoordinator, BatchRequest, BatchResult, GatewayRequest, GatewayResult, ProviderGateway};
use directive_log::{Logger, PerformanceTracker};
use directive_store::{ClaimedDirective, DirectiveStore, LifecycleState};

use crate::context::{context_block, SessionStore};
use crate::error::EngineError;

/// Whether a pass found and processed a directive, or found nothing ready.
/// The `run` entry point loops on `Worked`; the `runSingle` convention
/// (§4.6) maps this to a process exit code distinguishing work from no-work
/// so external schedulers can run workers cooperatively without polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Worked,
    Idle,
}

/// How this loop reaches a provider: one call per directive, or every
/// ready directive handed to the batch coordinator as a set (§4.6).
pub enum Dispatch {
    Sequential(Arc<ProviderGateway>),
    Batch(Arc<BatchCoordinator>),
}

/// Ties the store (C3), session persistence (C6), a dispatch mode (C1 or
/// C2), the bridge (C5), and the event log (C8) together into one worker.
/// Collaborators are constructor arguments, never global state (§9).
pub struct ExecutionLoop {
    store: DirectiveStore,
    sessions: SessionStore,
    template: Arc<dyn TemplateRenderer>,
    dispatch: Dispatch,
    logger: Arc<dyn Logger>,
    tracker: PerformanceTracker,
    config: Config,
    todos: Option<Arc<Mutex<Vec<ExternalTodo>>>>,
}

impl ExecutionLoop {
    pub fn new(
        store: DirectiveStore,
        sessions: SessionStore,
        template: Arc<dyn TemplateRenderer>,
        dispatch: Dispatch,
        logger: Arc<dyn Logger>,
        tracker: PerformanceTracker,
        config: Config,
    ) -> Self {
        Self { store, sessions, template, dispatch, logger, tracker, config, todos: None }
    }

    /// Wire up an external to-do list for the bridge's `sync` step (§4.6
    /// step 8). Optional: a loop with no to-do list attached simply skips
    /// that step, since the full to-do-list lifecycle lives outside this
    /// crate.
    pub fn with_todos(mut self, todos: Arc<Mutex<Vec<ExternalTodo>>>) -> Self {
        self.todos = Some(todos);
        self
    }

    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    /// Run exactly one pass (`runSingle`, §4.6).
    pub async fn run_single(&self) -> Result<PassOutcome, EngineError> {
        match &self.dispatch {
            Dispatch::Sequential(gateway) => self.run_single_sequential(Arc::clone(gateway)).await,
            Dispatch::Batch(coordinator) => self.run_single_batch(Arc::clone(coordinator)).await,
        }
    }

    /// Loop passes until one finds nothing ready (`run`, §4.6). A pass that
    /// errors out (a filesystem failure mid-pass, for instance) stops the
    /// loop rather than spinning silently; the caller decides whether to
    /// retry the whole loop on its next invocation.
    pub async fn run(&self) -> Result<(), EngineError> {
        loop {
            match self.run_single().await {
                Ok(PassOutcome::Worked) => continue,
                Ok(PassOutcome::Idle) => return Ok(()),
                Err(err) => {
                    tracing::warn!(error = %err, "execution pass failed, stopping loop for this invocation");
                    return Err(err);
                }
            }
        }
    }

    async fn run_single_sequential(&self, gateway: Arc<ProviderGateway>) -> Result<PassOutcome, EngineError> {
        let Some(candidate) = self.store.enumerate_ready().into_iter().next() else {
            return Ok(PassOutcome::Idle);
        };
        let Some(claimed) = self.store.claim(&candidate.id)? else {
            return Ok(PassOutcome::Idle);
        };

        let mut session = self.session_for(&claimed.directive)?;
        self.logger.log("execution-loop", Event::DirectiveStarted { directive_id: claimed.directive.id });

        let prompt = format!("{}\n\n{}", context_block(&session, &claimed.directive), claimed.task);
        let (platform, model) = resolve_selector(&claimed.directive, &self.config);

        self.logger.log(
            "provider-gateway",
            Event::ProviderRequest { directive_id: Some(claimed.directive.id), platform: platform.to_string(), model: model.clone() },
        );

        let request = GatewayRequest::new(claimed.directive.id.to_string(), prompt, platform.clone(), model.clone());
        let started = Instant::now();
        let call_result = gateway.call(&request).await;
        let duration_ms = started.elapsed().as_millis() as u64;
        let success = call_result.is_ok();
        self.tracker.record_provider_call(success);

        self.logger.log(
            "provider-gateway",
            Event::ProviderResponse {
                directive_id: Some(claimed.directive.id),
                platform: platform.to_string(),
                model,
                success,
                tokens_in: call_result.as_ref().ok().map(|r| r.tokens_in),
                tokens_out: call_result.as_ref().ok().map(|r| r.tokens_out),
                cost: call_result.as_ref().ok().map(|r| r.cost),
                error: call_result.as_ref().err().map(|e| e.to_string()),
            },
        );

        let outcome = call_result.map_err(|e| e.to_string());
        self.finalize(&claimed, &mut session, &outcome, duration_ms)?;

        Ok(PassOutcome::Worked)
    }

    async fn run_single_batch(&self, coordinator: Arc<BatchCoordinator>) -> Result<PassOutcome, EngineError> {
        let ready = self.store.enumerate_ready();
        if ready.is_empty() {
            return Ok(PassOutcome::Idle);
        }

        let mut claims = Vec::new();
        for candidate in &ready {
            if let Some(claimed) = self.store.claim(&candidate.id)? {
                claims.push(claimed);
            }
        }
        if claims.is_empty() {
            return Ok(PassOutcome::Idle);
        }

        let mut sessions = Vec::with_capacity(claims.len());
        let mut requests = Vec::with_capacity(claims.len());
        for claimed in &claims {
            let session = self.session_for(&claimed.directive)?;
            self.logger.log("execution-loop", Event::DirectiveStarted { directive_id: claimed.directive.id });
            let prompt = format!("{}\n\n{}", context_block(&session, &claimed.directive), claimed.task);
            let (platform, model) = resolve_selector(&claimed.directive, &self.config);
            requests.push(BatchRequest { directive_id: claimed.directive.id, platform, model, prompt });
            sessions.push(session);
        }

        let started = Instant::now();
        let results: Vec<BatchResult> = coordinator.run(requests).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let mut by_id: HashMap<DirectiveId, BatchResult> =
            results.into_iter().map(|r| (r.directive_id, r)).collect();

        for (claimed, mut session) in claims.into_iter().zip(sessions.into_iter()) {
            let outcome: Result<GatewayResult, String> = match by_id.remove(&claimed.directive.id) {
                Some(result) => result.outcome,
                None => Err("no batch result returned for this directive".to_string()),
            };
            self.tracker.record_provider_call(outcome.is_ok());
            self.finalize(&claimed, &mut session, &outcome, duration_ms)?;
        }

        Ok(PassOutcome::Worked)
    }

    /// Resolve a directive's own session (by its `session_id` header field)
    /// rather than the most-recently-modified file on disk; a directive
    /// with no recorded session gets an ephemeral, unpersisted one, since
    /// directives authored outside a decomposition call aren't required to
    /// carry a session.
    fn session_for(&self, directive: &Directive) -> Result<SessionContext, EngineError> {
        match &directive.session_id {
            Some(id) => self.sessions.load_or_create(id),
            None => Ok(SessionContext::new(SessionId::new(format!("session-{}", directive.id)))),
        }
    }

    /// Steps 6-10 of §4.6, shared by both dispatch modes: write the output
    /// artifact, append the completion summary, mirror the to-do status,
    /// rewrite the header, relocate to the chosen terminal folder, and
    /// emit the completion event.
    fn finalize(
        &self,
        claimed: &ClaimedDirective,
        session: &mut SessionContext,
        outcome: &Result<GatewayResult, String>,
        duration_ms: u64,
    ) -> Result<(), EngineError> {
        let success = outcome.is_ok();
        let new_status = if success { DirectiveStatus::Completed } else { DirectiveStatus::Failed };
        let (tokens_in, tokens_out, cost) = match outcome {
            Ok(result) => (Some(result.tokens_in), Some(result.tokens_out), Some(result.cost)),
            Err(_) => (None, None, None),
        };
        let result_text = match outcome {
            Ok(result) => result.content.clone(),
            Err(message) => message.clone(),
        };

        let mut artifact = OutputArtifact::placeholder(&claimed.directive)
            .status(new_status)
            .result(result_text.clone())
            .processing_time_ms(duration_ms)
            .completed_at(Utc::now());
        if let Some(v) = tokens_in {
            artifact = artifact.tokens_in(v);
        }
        if let Some(v) = tokens_out {
            artifact = artifact.tokens_out(v);
        }
        if let Some(v) = cost {
            artifact = artifact.cost(v);
        }
        self.store.write_artifact(&claimed.artifact_path, &artifact, self.template.as_ref())?;

        let mut summary =
            CompletedDirectiveSummary::new(claimed.directive.id, &claimed.directive.slug, &claimed.directive.task, &result_text)
            .success(success)
            .duration_ms(duration_ms);
        if let Some(v) = tokens_in {
            summary = summary.tokens_in(v);
        }
        if let Some(v) = tokens_out {
            summary = summary.tokens_out(v);
        }
        if let Some(v) = cost {
            summary = summary.cost(v);
        }
        session.record_completion(summary);
        session.record_history(claimed.directive.id, if success { "completed" } else { "failed" }, duration_ms);
        self.sessions.persist(session)?;

        if claimed.directive.todo_id.is_some() {
            if let Some(todos) = &self.todos {
                let mut todos = todos.lock();
                Bridge::sync(&mut todos, session, claimed.directive.id, new_status);
            }
        }

        self.store.rewrite_status(&claimed.directive_path, new_status)?;
        let duration_secs = (duration_ms / 1000) as i64;
        let target = classify_terminal(&self.config, success, duration_secs);
        self.store.relocate(&claimed.directive_path, &claimed.artifact_path, target)?;

        self.tracker.record_directive_completed(success, tokens_in, tokens_out, cost);
        self.logger.log(
            "execution-loop",
            Event::DirectiveCompleted { directive_id: claimed.directive.id, success, duration_ms, tokens_in, tokens_out, cost },
        );

        Ok(())
    }
}

/// Step 9's terminal-folder decision (§4.6): failure always goes to
/// `failed`; otherwise duration against the exemplar and slow thresholds
/// picks `exemplar`, `slow`, or plain `success`. Pulled out as a pure
/// function so the boundary behavior (exact-threshold ties, the disabled
/// exemplar toggle) is directly unit-testable without an async dispatch.
fn classify_terminal(config: &Config, success: bool, duration_secs: i64) -> LifecycleState {
    if !success {
        return LifecycleState::Failed;
    }
    if config.exemplar_enabled && duration_secs <= config.exemplar_threshold_seconds {
        return LifecycleState::Exemplar;
    }
    if duration_secs > config.slow_threshold_seconds {
        return LifecycleState::Slow;
    }
    LifecycleState::Success
}

/// The (platform, model) a directive dispatches through: its own header
/// fields if present, else the configured defaults (§4.4).
fn resolve_selector(directive: &Directive, config: &Config) -> (Platform, String) {
    let platform_str = directive.platform.as_deref().unwrap_or(&config.default_platform);
    let platform = match platform_str.parse::<Platform>() {
        Ok(platform) => platform,
        Err(never) => match never {},
    };
    let model = directive.model.clone().unwrap_or_else(|| config.default_model.clone());
    (platform, model)
}

#[cfg(test)]
#[path = "executor_tests.rs"]
mod tests;
