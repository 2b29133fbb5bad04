// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Batch Coordinator (C2): groups ready requests by (platform, model),
//! chunks them under the provider's max batch size, submits, polls to
//! terminal, and demultiplexes results back to directives (§4.5).

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use directive_core::{DirectiveId, Event, Platform, ProviderTable};
use directive_log::Logger;

use crate::error::BatchError;
use crate::request::GatewayResult;

/// One ready request handed to the coordinator by the execution loop; the
/// prompt is already context-enriched.
#[derive(Debug, Clone)]
pub struct BatchRequest {
    pub directive_id: DirectiveId,
    pub platform: Platform,
    pub model: String,
    pub prompt: String,
}

/// Remote batch lifecycle state (§3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteBatchStatus {
    Submitted,
    Processing,
    Completed,
    Failed(String),
}

/// One per-request outcome once a remote batch completes, keyed by the
/// custom id the coordinator assigned at submission time (the directive's
/// own id, stringified).
pub struct RawBatchResult {
    pub custom_id: String,
    pub content: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

/// Provider-specific submission/polling mechanics (§4.5, §6): one family
/// submits an inline array in a single call, another needs an upload step
/// first. Both shapes collapse to this trait; the coordinator itself never
/// cares which.
#[async_trait]
pub trait BatchBackend: Send + Sync {
    async fn submit(&self, platform: &Platform, model: &str, requests: &[BatchRequest]) -> Result<String, BatchError>;
    async fn poll(&self, remote_batch_id: &str) -> Result<RemoteBatchStatus, BatchError>;
    async fn fetch_results(&self, remote_batch_id: &str) -> Result<Vec<RawBatchResult>, BatchError>;
}

/// Ephemeral local record for one submitted batch (§3).
pub struct BatchJob {
    pub batch_id: String,
    pub platform: Platform,
    pub model: String,
    pub directive_ids: Vec<DirectiveId>,
    pub remote_batch_id: String,
}

/// The outcome the execution loop folds back in as if it had come from a
/// sequential call (§4.5's "handed back to the execution loop as if each
/// had been produced by a sequential call").
pub struct BatchResult {
    pub directive_id: DirectiveId,
    pub outcome: Result<GatewayResult, String>,
}

pub struct BatchCoordinator {
    backend: Arc<dyn BatchBackend>,
    table: ProviderTable,
    poll_interval: Duration,
    max_total_wait: Duration,
    logger: Option<Arc<dyn Logger>>,
}

impl BatchCoordinator {
    pub fn new(backend: Arc<dyn BatchBackend>, table: ProviderTable, poll_interval: Duration, max_total_wait: Duration) -> Self {
        Self { backend, table, poll_interval, max_total_wait, logger: None }
    }

    /// Attach a [`Logger`] so every submitted/completed batch also emits
    /// the structured `BatchSubmitted`/`BatchCompleted` events (§4.8), on
    /// top of the `tracing` calls this coordinator already makes. Optional:
    /// a coordinator with no logger attached just keeps the bare `tracing`
    /// behavior, since not every caller (e.g. the batch test suite) needs
    /// the structured event stream.
    pub fn with_logger(mut self, logger: Arc<dyn Logger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Partition by (platform, model), chunk by the provider's max batch
    /// size, submit every chunk, and run each to completion concurrently.
    /// Order of the returned results is unspecified; callers key off
    /// `directive_id`.
    pub async fn run(&self, requests: Vec<BatchRequest>) -> Vec<BatchResult> {
        let mut groups: HashMap<(Platform, String), Vec<BatchRequest>> = HashMap::new();
        for req in requests {
            groups.entry((req.platform.clone(), req.model.clone())).or_default().push(req);
        }

        let mut all_results = Vec::new();
        for ((platform, model), group) in groups {
            let max_size = ProviderTable::max_batch_size(&platform);
            for chunk in group.chunks(max_size) {
                all_results.extend(self.run_one_batch(&platform, &model, chunk.to_vec()).await);
            }
        }
        all_results
    }

    async fn run_one_batch(&self, platform: &Platform, model: &str, chunk: Vec<BatchRequest>) -> Vec<BatchResult> {
        let (batch_id, results) = self.run_one_batch_inner(platform, model, chunk).await;
        if let Some(logger) = &self.logger {
            let success_count = results.iter().filter(|r| r.outcome.is_ok()).count();
            let failure_count = results.len() - success_count;
            logger.log("batch-coordinator", Event::BatchCompleted { batch_id, success_count, failure_count });
        }
        results
    }

    /// Does the actual submit/poll/fetch/demultiplex work; returns the
    /// local batch id alongside the results so the caller can emit one
    /// `BatchCompleted` event regardless of which path produced them.
    async fn run_one_batch_inner(&self, platform: &Platform, model: &str, chunk: Vec<BatchRequest>) -> (String, Vec<BatchResult>) {
        let directive_ids: Vec<DirectiveId> = chunk.iter().map(|r| r.directive_id).collect();

        let remote_batch_id = match self.backend.submit(platform, model, &chunk).await {
            Ok(id) => id,
            Err(err) => {
                let batch_id = format!("batch-{}-{}", platform, directive_ids.len());
                return (batch_id, fail_all(&directive_ids, err.to_string()));
            }
        };
        let job = BatchJob {
            batch_id: format!("batch-{}-{}", platform, directive_ids.len()),
            platform: platform.clone(),
            model: model.to_string(),
            directive_ids: directive_ids.clone(),
            remote_batch_id,
        };
        tracing::info!(batch_id = %job.batch_id, platform = %platform, model, count = job.directive_ids.len(), "batch submitted");
        if let Some(logger) = &self.logger {
            logger.log(
                "batch-coordinator",
                Event::BatchSubmitted {
                    batch_id: job.batch_id.clone(),
                    platform: platform.to_string(),
                    model: model.to_string(),
                    directive_count: job.directive_ids.len(),
                },
            );
        }

        let started = Instant::now();
        loop {
            if started.elapsed() > self.max_total_wait {
                tracing::warn!(batch_id = %job.batch_id, "batch exceeded maximum total wait, marking timeout");
                let failures = fail_all(&directive_ids, BatchError::TimedOut { batch_id: job.batch_id.clone() }.to_string());
                return (job.batch_id, failures);
            }
            match self.backend.poll(&job.remote_batch_id).await {
                Ok(RemoteBatchStatus::Completed) => break,
                Ok(RemoteBatchStatus::Failed(message)) => {
                    let failures = fail_all(&directive_ids, BatchError::RemoteFailure { batch_id: job.batch_id.clone(), message }.to_string());
                    return (job.batch_id, failures);
                }
                Ok(RemoteBatchStatus::Submitted) | Ok(RemoteBatchStatus::Processing) => {
                    tokio::time::sleep(self.poll_interval).await;
                }
                Err(err) => {
                    let failures = fail_all(&directive_ids, err.to_string());
                    return (job.batch_id, failures);
                }
            }
        }

        let raw_results = match self.backend.fetch_results(&job.remote_batch_id).await {
            Ok(results) => results,
            Err(err) => {
                let failures = fail_all(&directive_ids, err.to_string());
                return (job.batch_id, failures);
            }
        };

        (job.batch_id, self.demultiplex(&chunk, raw_results))
    }

    fn demultiplex(&self, chunk: &[BatchRequest], raw_results: Vec<RawBatchResult>) -> Vec<BatchResult> {
        let mut by_custom_id: HashMap<String, RawBatchResult> =
            raw_results.into_iter().map(|r| (r.custom_id.clone(), r)).collect();

        chunk
            .iter()
            .map(|request| {
                let custom_id = request.directive_id.to_string();
                match by_custom_id.remove(&custom_id) {
                    Some(raw) => {
                        let cost = self
                            .table
                            .cost(&request.platform, &request.model, raw.tokens_in, raw.tokens_out)
                            .unwrap_or_else(|| {
                                tracing::warn!(platform = %request.platform, model = %request.model, "model absent from provider table, cost recorded as zero");
                                0.0
                            });
                        BatchResult {
                            directive_id: request.directive_id,
                            outcome: Ok(GatewayResult::ok(raw.content, raw.tokens_in, raw.tokens_out, cost)),
                        }
                    }
                    None => BatchResult {
                        directive_id: request.directive_id,
                        outcome: Err("no result returned for this directive in the batch response".to_string()),
                    },
                }
            })
            .collect()
    }
}

fn fail_all(directive_ids: &[DirectiveId], message: String) -> Vec<BatchResult> {
    directive_ids.iter().map(|id| BatchResult { directive_id: *id, outcome: Err(message.clone()) }).collect()
}

/// A scripted backend for tests, matching the `test-support` gate used
/// throughout the workspace.
#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    pub struct FakeBatchBackend {
        submit_id: String,
        poll_sequence: Mutex<VecDeque<RemoteBatchStatus>>,
        results: Mutex<Vec<RawBatchResult>>,
    }

    impl FakeBatchBackend {
        pub fn new(submit_id: impl Into<String>, poll_sequence: Vec<RemoteBatchStatus>, results: Vec<RawBatchResult>) -> Self {
            Self { submit_id: submit_id.into(), poll_sequence: Mutex::new(poll_sequence.into()), results: Mutex::new(results) }
        }
    }

    #[async_trait]
    impl BatchBackend for FakeBatchBackend {
        async fn submit(&self, _platform: &Platform, _model: &str, _requests: &[BatchRequest]) -> Result<String, BatchError> {
            Ok(self.submit_id.clone())
        }

        async fn poll(&self, _remote_batch_id: &str) -> Result<RemoteBatchStatus, BatchError> {
            Ok(self.poll_sequence.lock().pop_front().unwrap_or(RemoteBatchStatus::Completed))
        }

        async fn fetch_results(&self, _remote_batch_id: &str) -> Result<Vec<RawBatchResult>, BatchError> {
            Ok(std::mem::take(&mut self.results.lock()))
        }
    }
}

#[cfg(test)]
#[path = "batch_tests.rs"]
mod tests;
