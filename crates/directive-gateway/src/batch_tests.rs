// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use directive_core::{DirectiveId, Platform, ProviderTable};

use super::*;
use crate::batch::fake::FakeBatchBackend;

fn request(id: DirectiveId, platform: Platform, model: &str) -> BatchRequest {
    BatchRequest { directive_id: id, platform, model: model.to_string(), prompt: "do the thing".to_string() }
}

#[tokio::test]
async fn three_ready_directives_demultiplex_into_three_results() {
    let ids: Vec<DirectiveId> = (0..3).map(|_| DirectiveId::new()).collect();
    let requests: Vec<BatchRequest> =
        ids.iter().map(|id| request(*id, Platform::Claude, "claude-3-5-sonnet")).collect();

    let results = ids
        .iter()
        .map(|id| RawBatchResult { custom_id: id.to_string(), content: "done".to_string(), tokens_in: 10, tokens_out: 10 })
        .collect();
    let backend = Arc::new(FakeBatchBackend::new("remote-batch-1", vec![RemoteBatchStatus::Completed], results));
    let coordinator = BatchCoordinator::new(backend, ProviderTable::default_table(), Duration::from_millis(1), Duration::from_secs(60));

    let outcomes = coordinator.run(requests).await;

    assert_eq!(outcomes.len(), 3);
    for outcome in &outcomes {
        assert!(ids.contains(&outcome.directive_id));
        assert!(outcome.outcome.is_ok());
    }
}

#[tokio::test]
async fn distinct_platform_model_pairs_never_share_a_batch() {
    let claude_id = DirectiveId::new();
    let openai_id = DirectiveId::new();
    let requests = vec![
        request(claude_id, Platform::Claude, "claude-3-5-sonnet"),
        request(openai_id, Platform::OpenAi, "gpt-4o"),
    ];
    let results = vec![
        RawBatchResult { custom_id: claude_id.to_string(), content: "a".to_string(), tokens_in: 1, tokens_out: 1 },
        RawBatchResult { custom_id: openai_id.to_string(), content: "b".to_string(), tokens_in: 1, tokens_out: 1 },
    ];
    let backend = Arc::new(FakeBatchBackend::new("remote-batch", vec![RemoteBatchStatus::Completed], results));
    let coordinator = BatchCoordinator::new(backend, ProviderTable::default_table(), Duration::from_millis(1), Duration::from_secs(60));

    let outcomes = coordinator.run(requests).await;
    assert_eq!(outcomes.len(), 2);
}

#[tokio::test]
async fn pending_then_completed_poll_sequence_resolves() {
    let id = DirectiveId::new();
    let requests = vec![request(id, Platform::Claude, "claude-3-5-sonnet")];
    let results = vec![RawBatchResult { custom_id: id.to_string(), content: "done".to_string(), tokens_in: 5, tokens_out: 5 }];
    let backend = Arc::new(FakeBatchBackend::new(
        "remote-batch",
        vec![RemoteBatchStatus::Submitted, RemoteBatchStatus::Processing, RemoteBatchStatus::Completed],
        results,
    ));
    let coordinator = BatchCoordinator::new(backend, ProviderTable::default_table(), Duration::from_millis(1), Duration::from_secs(60));

    let outcomes = coordinator.run(requests).await;
    assert_eq!(outcomes.len(), 1);
    assert!(outcomes[0].outcome.is_ok());
}

#[tokio::test]
async fn remote_failure_fails_every_directive_in_the_batch() {
    let ids: Vec<DirectiveId> = (0..2).map(|_| DirectiveId::new()).collect();
    let requests: Vec<BatchRequest> =
        ids.iter().map(|id| request(*id, Platform::Claude, "claude-3-5-sonnet")).collect();
    let backend = Arc::new(FakeBatchBackend::new(
        "remote-batch",
        vec![RemoteBatchStatus::Failed("provider outage".to_string())],
        vec![],
    ));
    let coordinator = BatchCoordinator::new(backend, ProviderTable::default_table(), Duration::from_millis(1), Duration::from_secs(60));

    let outcomes = coordinator.run(requests).await;
    assert_eq!(outcomes.len(), 2);
    for outcome in outcomes {
        let err = outcome.outcome.expect_err("remote failure should fail every directive");
        assert!(err.contains("provider outage"));
    }
}

#[tokio::test]
async fn exceeding_max_total_wait_times_out_remaining_directives() {
    let id = DirectiveId::new();
    let requests = vec![request(id, Platform::Claude, "claude-3-5-sonnet")];
    // Never resolves to Completed within the allotted window.
    let backend = Arc::new(FakeBatchBackend::new(
        "remote-batch",
        vec![RemoteBatchStatus::Processing; 50],
        vec![],
    ));
    let coordinator = BatchCoordinator::new(backend, ProviderTable::default_table(), Duration::from_millis(2), Duration::from_millis(5));

    let outcomes = coordinator.run(requests).await;
    assert_eq!(outcomes.len(), 1);
    let err = outcomes[0].outcome.as_ref().expect_err("should time out");
    assert!(err.contains("maximum total wait") || err.contains("timeout") || err.contains("timed out"));
}
