// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Real HTTPS [`BatchBackend`] covering both submission families named in
//! spec.md §6: one platform accepts a single call with an inline array of
//! per-request bodies, another needs a two-step upload-then-submit. Routing
//! is on `platform`, same as [`crate::client::HttpProviderClient`].

use async_trait::async_trait;
use directive_core::Platform;
use serde_json::json;

use crate::batch::{BatchBackend, BatchRequest, RawBatchResult, RemoteBatchStatus};
use crate::credential::{resolve, Credential};
use crate::error::BatchError;

pub struct HttpBatchBackend {
    http: reqwest::Client,
}

impl HttpBatchBackend {
    pub fn new() -> Self {
        Self { http: reqwest::Client::new() }
    }

    fn credential(platform: &Platform) -> Result<Credential, BatchError> {
        resolve(platform).ok_or_else(|| BatchError::SubmissionFailed {
            platform: platform.to_string(),
            model: String::new(),
            message: "no credential configured for this platform".to_string(),
        })
    }

    fn apply_credential(builder: reqwest::RequestBuilder, credential: &Credential, platform: &Platform) -> reqwest::RequestBuilder {
        match credential {
            Credential::Bearer(token) => builder.bearer_auth(token),
            Credential::ApiKeyHeader { header, value } => {
                let builder = builder.header(*header, value);
                if matches!(platform, Platform::Claude) {
                    builder.header("anthropic-version", "2023-06-01")
                } else {
                    builder
                }
            }
        }
    }
}

impl Default for HttpBatchBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BatchBackend for HttpBatchBackend {
    /// Claude's Message Batches API takes the whole array in one call;
    /// OpenAI's Batches API needs the JSONL request file uploaded first
    /// (§4.5, §6).
    async fn submit(&self, platform: &Platform, model: &str, requests: &[BatchRequest]) -> Result<String, BatchError> {
        let credential = Self::credential(platform)?;
        let submission_failed = |message: String| BatchError::SubmissionFailed {
            platform: platform.to_string(),
            model: model.to_string(),
            message,
        };

        match platform {
            Platform::Claude => {
                let body = json!({
                    "requests": requests.iter().map(|r| json!({
                        "custom_id": r.directive_id.to_string(),
                        "params": {
                            "model": model,
                            "max_tokens": 4096,
                            "messages": [{ "role": "user", "content": r.prompt }],
                        }
                    })).collect::<Vec<_>>(),
                });
                let builder = self.http.post("https://api.anthropic.com/v1/messages/batches").json(&body);
                let builder = Self::apply_credential(builder, &credential, platform);
                let response = builder.send().await.map_err(|e| submission_failed(e.to_string()))?;
                if !response.status().is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(submission_failed(text));
                }
                let parsed: serde_json::Value = response.json().await.map_err(|e| submission_failed(e.to_string()))?;
                parsed["id"].as_str().map(str::to_string).ok_or_else(|| submission_failed("missing batch id in response".to_string()))
            }
            _ => {
                let jsonl: String = requests
                    .iter()
                    .map(|r| {
                        json!({
                            "custom_id": r.directive_id.to_string(),
                            "method": "POST",
                            "url": "/v1/chat/completions",
                            "body": {
                                "model": model,
                                "messages": [{ "role": "user", "content": r.prompt }],
                            }
                        })
                        .to_string()
                    })
                    .collect::<Vec<_>>()
                    .join("\n");

                let upload_form = reqwest::multipart::Form::new()
                    .text("purpose", "batch")
                    .part("file", reqwest::multipart::Part::bytes(jsonl.into_bytes()).file_name("batch.jsonl"));
                let builder = self.http.post("https://api.openai.com/v1/files").multipart(upload_form);
                let builder = Self::apply_credential(builder, &credential, platform);
                let upload_response = builder.send().await.map_err(|e| submission_failed(e.to_string()))?;
                if !upload_response.status().is_success() {
                    let text = upload_response.text().await.unwrap_or_default();
                    return Err(submission_failed(text));
                }
                let uploaded: serde_json::Value = upload_response.json().await.map_err(|e| submission_failed(e.to_string()))?;
                let file_id = uploaded["id"].as_str().ok_or_else(|| submission_failed("missing file id in upload response".to_string()))?;

                let batch_body = json!({
                    "input_file_id": file_id,
                    "endpoint": "/v1/chat/completions",
                    "completion_window": "24h",
                });
                let builder = self.http.post("https://api.openai.com/v1/batches").json(&batch_body);
                let builder = Self::apply_credential(builder, &credential, platform);
                let response = builder.send().await.map_err(|e| submission_failed(e.to_string()))?;
                if !response.status().is_success() {
                    let text = response.text().await.unwrap_or_default();
                    return Err(submission_failed(text));
                }
                let parsed: serde_json::Value = response.json().await.map_err(|e| submission_failed(e.to_string()))?;
                parsed["id"].as_str().map(str::to_string).ok_or_else(|| submission_failed("missing batch id in response".to_string()))
            }
        }
    }

    async fn poll(&self, remote_batch_id: &str) -> Result<RemoteBatchStatus, BatchError> {
        let poll_failed = |message: String| BatchError::PollFailed { batch_id: remote_batch_id.to_string(), message };

        // The status endpoint shape is platform-specific, but a batch id
        // prefix ("msgbatch_" for Claude, "batch_" for OpenAI) is enough to
        // route without the caller threading the platform through.
        let url = if remote_batch_id.starts_with("msgbatch_") {
            format!("https://api.anthropic.com/v1/messages/batches/{remote_batch_id}")
        } else {
            format!("https://api.openai.com/v1/batches/{remote_batch_id}")
        };

        let response = self.http.get(&url).send().await.map_err(|e| poll_failed(e.to_string()))?;
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(poll_failed(text));
        }
        let body: serde_json::Value = response.json().await.map_err(|e| poll_failed(e.to_string()))?;

        let status = body["processing_status"].as_str().or_else(|| body["status"].as_str()).unwrap_or("");
        Ok(match status {
            "in_progress" | "validating" | "finalizing" => RemoteBatchStatus::Processing,
            "ended" | "completed" => RemoteBatchStatus::Completed,
            "failed" | "expired" | "cancelled" | "canceled" | "canceling" => {
                RemoteBatchStatus::Failed(format!("remote batch reported status {status:?}"))
            }
            other => RemoteBatchStatus::Failed(format!("unrecognized remote batch status {other:?}")),
        })
    }

    /// Both families expose a downloadable line-delimited results file of
    /// one result object per line, keyed by custom id (§6).
    async fn fetch_results(&self, remote_batch_id: &str) -> Result<Vec<RawBatchResult>, BatchError> {
        let fetch_failed = |message: String| BatchError::PollFailed { batch_id: remote_batch_id.to_string(), message };

        let results_url = if remote_batch_id.starts_with("msgbatch_") {
            format!("https://api.anthropic.com/v1/messages/batches/{remote_batch_id}/results")
        } else {
            // OpenAI requires resolving the batch's output_file_id first.
            let batch_url = format!("https://api.openai.com/v1/batches/{remote_batch_id}");
            let batch_body: serde_json::Value = self
                .http
                .get(&batch_url)
                .send()
                .await
                .map_err(|e| fetch_failed(e.to_string()))?
                .json()
                .await
                .map_err(|e| fetch_failed(e.to_string()))?;
            let file_id = batch_body["output_file_id"]
                .as_str()
                .ok_or_else(|| fetch_failed("batch has no output_file_id".to_string()))?;
            format!("https://api.openai.com/v1/files/{file_id}/content")
        };

        let response = self.http.get(&results_url).send().await.map_err(|e| fetch_failed(e.to_string()))?;
        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(fetch_failed(text));
        }
        let text = response.text().await.map_err(|e| fetch_failed(e.to_string()))?;

        let mut results = Vec::new();
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let record: serde_json::Value = match serde_json::from_str(line) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if let Some(result) = parse_result_line(&record) {
                results.push(result);
            }
        }
        Ok(results)
    }
}

/// Parse one line of either family's results format into a
/// platform-agnostic [`RawBatchResult`]; a line this backend doesn't
/// recognize is skipped rather than failing the whole batch (its absence
/// surfaces as a per-directive "no result returned" outcome downstream).
fn parse_result_line(record: &serde_json::Value) -> Option<RawBatchResult> {
    let custom_id = record["custom_id"].as_str()?.to_string();

    // Claude: { custom_id, result: { type: "succeeded", message: { content: [...], usage: {...} } } }
    if let Some(message) = record["result"]["message"].as_object() {
        let content = message
            .get("content")?
            .as_array()?
            .first()?
            .get("text")?
            .as_str()?
            .to_string();
        let usage = message.get("usage")?;
        let tokens_in = usage["input_tokens"].as_u64().unwrap_or(0);
        let tokens_out = usage["output_tokens"].as_u64().unwrap_or(0);
        return Some(RawBatchResult { custom_id, content, tokens_in, tokens_out });
    }

    // OpenAI: { custom_id, response: { body: { choices: [...], usage: {...} } } }
    if let Some(body) = record["response"]["body"].as_object() {
        let content = body
            .get("choices")?
            .as_array()?
            .first()?
            .get("message")?
            .get("content")?
            .as_str()?
            .to_string();
        let usage = body.get("usage")?;
        let tokens_in = usage["prompt_tokens"].as_u64().unwrap_or(0);
        let tokens_out = usage["completion_tokens"].as_u64().unwrap_or(0);
        return Some(RawBatchResult { custom_id, content, tokens_in, tokens_out });
    }

    None
}
