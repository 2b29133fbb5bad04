// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transport layer a single provider call routes through. Routing on
//! endpoint kind (chat vs. completion payload shape) and credential
//! injection live here; retry/backoff is the gateway's concern, not the
//! client's (§4.4).

use std::time::Duration;

use async_trait::async_trait;
use directive_core::{Capabilities, EndpointKind, Platform};
use serde_json::json;

use crate::credential::{resolve, Credential};
use crate::error::GatewayError;

/// The minimal per-call context the client needs to build a request.
pub struct ProviderCallSpec<'a> {
    pub platform: &'a Platform,
    pub model: &'a str,
    pub endpoint: EndpointKind,
    pub capabilities: Capabilities,
    pub prompt: &'a str,
    pub timeout: Duration,
}

/// The generated text plus whatever token-usage breakdown the provider's
/// response exposed (spec.md §6).
#[derive(Debug, Clone)]
pub struct RawProviderResponse {
    pub content: String,
    pub tokens_in: u64,
    pub tokens_out: u64,
}

/// Consumed by [`crate::gateway::ProviderGateway`]; swapped for a fake in
/// tests so retry/cost-accounting logic doesn't need a live network call.
#[async_trait]
pub trait ProviderClient: Send + Sync {
    async fn send(&self, spec: &ProviderCallSpec<'_>) -> Result<RawProviderResponse, GatewayError>;
}

/// Real HTTPS client over `reqwest`. Builds a chat-style messages payload
/// or a completion-style raw-prompt payload depending on `endpoint`;
/// `max_tokens`/`temperature` follow spec.md §6 ("temperature omitted for
/// reasoning-class models").
pub struct HttpProviderClient {
    http: reqwest::Client,
}

impl HttpProviderClient {
    pub fn new() -> Self {
        Self { http: reqwest::Client::new() }
    }

    fn base_url(platform: &Platform, endpoint: EndpointKind) -> String {
        match platform {
            Platform::Claude => "https://api.anthropic.com/v1/messages".to_string(),
            Platform::OpenAi => match endpoint {
                EndpointKind::Completion => "https://api.openai.com/v1/completions".to_string(),
                _ => "https://api.openai.com/v1/chat/completions".to_string(),
            },
            Platform::Other(name) => format!("https://api.{name}.example/v1/chat/completions"),
        }
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

    fn build_body(spec: &ProviderCallSpec<'_>) -> serde_json::Value {
        let mut body = match spec.endpoint {
            EndpointKind::Completion => json!({
                "model": spec.model,
                "prompt": spec.prompt,
                "max_tokens": 4096,
            }),
            _ => json!({
                "model": spec.model,
                "messages": [{ "role": "user", "content": spec.prompt }],
                "max_tokens": 4096,
            }),
        };
        if !spec.capabilities.reasoning_class {
            body["temperature"] = json!(1.0);
        }
        body
    }

    fn parse_response(platform: &Platform, body: &serde_json::Value) -> Result<RawProviderResponse, GatewayError> {
        let malformed = |reason: &str| GatewayError::MalformedResponse {
            platform: platform.to_string(),
            model: String::new(),
            reason: reason.to_string(),
        };
        match platform {
            Platform::Claude => {
                let content = body["content"]
                    .as_array()
                    .and_then(|blocks| blocks.first())
                    .and_then(|block| block["text"].as_str())
                    .ok_or_else(|| malformed("missing content[0].text"))?
                    .to_string();
                let tokens_in = body["usage"]["input_tokens"].as_u64().unwrap_or(0);
                let tokens_out = body["usage"]["output_tokens"].as_u64().unwrap_or(0);
                Ok(RawProviderResponse { content, tokens_in, tokens_out })
            }
            _ => {
                let content = body["choices"]
                    .as_array()
                    .and_then(|choices| choices.first())
                    .and_then(|choice| {
                        choice["message"]["content"].as_str().or_else(|| choice["text"].as_str())
                    })
                    .ok_or_else(|| malformed("missing choices[0].message.content"))?
                    .to_string();
                let tokens_in = body["usage"]["prompt_tokens"].as_u64().unwrap_or(0);
                let tokens_out = body["usage"]["completion_tokens"].as_u64().unwrap_or(0);
                Ok(RawProviderResponse { content, tokens_in, tokens_out })
            }
        }
    }
}

impl Default for HttpProviderClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProviderClient for HttpProviderClient {
    async fn send(&self, spec: &ProviderCallSpec<'_>) -> Result<RawProviderResponse, GatewayError> {
        if !spec.endpoint.is_executable() {
            return Err(GatewayError::NotExecutable(spec.endpoint));
        }
        let credential = resolve(spec.platform).ok_or_else(|| GatewayError::MissingCredential(spec.platform.to_string()))?;

        let url = Self::base_url(spec.platform, spec.endpoint);
        let body = Self::build_body(spec);
        let mut builder = self.http.post(&url).timeout(spec.timeout).json(&body);
        builder = Self::apply_credential(builder, &credential, spec.platform);

        let response = builder.send().await.map_err(|err| GatewayError::Transport {
            platform: spec.platform.to_string(),
            model: spec.model.to_string(),
            message: err.to_string(),
        })?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(GatewayError::Transient { platform: spec.platform.to_string(), model: spec.model.to_string(), status: status.as_u16() });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GatewayError::Permanent {
                platform: spec.platform.to_string(),
                model: spec.model.to_string(),
                status: status.as_u16(),
                message,
            });
        }

        let body: serde_json::Value = response.json().await.map_err(|err| GatewayError::MalformedResponse {
            platform: spec.platform.to_string(),
            model: spec.model.to_string(),
            reason: err.to_string(),
        })?;
        Self::parse_response(spec.platform, &body)
    }
}

/// A scripted client for tests: replies in call order, never touches the
/// network. Available to other crates under `test-support`, matching the
/// teacher's `FakeAdapter` gate.
#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    pub struct FakeProviderClient {
        responses: Mutex<VecDeque<Result<RawProviderResponse, GatewayError>>>,
        calls: Mutex<Vec<String>>,
    }

    impl FakeProviderClient {
        pub fn new(responses: Vec<Result<RawProviderResponse, GatewayError>>) -> Self {
            Self { responses: Mutex::new(responses.into()), calls: Mutex::new(Vec::new()) }
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }
    }

    #[async_trait]
    impl ProviderClient for FakeProviderClient {
        async fn send(&self, spec: &ProviderCallSpec<'_>) -> Result<RawProviderResponse, GatewayError> {
            self.calls.lock().push(spec.prompt.to_string());
            self.responses.lock().pop_front().unwrap_or_else(|| {
                Err(GatewayError::Transport {
                    platform: spec.platform.to_string(),
                    model: spec.model.to_string(),
                    message: "fake client exhausted".to_string(),
                })
            })
        }
    }
}
