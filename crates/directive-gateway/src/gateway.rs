// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Provider Gateway (C1): one call in, a result with success flag,
//! content, token counts, and cost out. Retries transient failures with
//! exponential backoff; surfaces permanent failures immediately (§4.4, §7).

use std::sync::Arc;
use std::time::Duration;

use directive_core::ProviderTable;

use crate::client::{ProviderCallSpec, ProviderClient};
use crate::error::{ErrorClass, GatewayError};
use crate::request::{GatewayRequest, GatewayResult};
use crate::retry::RetryPolicy;

pub struct ProviderGateway {
    client: Arc<dyn ProviderClient>,
    table: ProviderTable,
    retry: RetryPolicy,
    timeout: Duration,
}

impl ProviderGateway {
    pub fn new(client: Arc<dyn ProviderClient>, table: ProviderTable, retry: RetryPolicy, timeout: Duration) -> Self {
        Self { client, table, retry, timeout }
    }

    pub fn table(&self) -> &ProviderTable {
        &self.table
    }

    /// Dispatch one request, retrying transient failures up to
    /// `retry.attempts` times with doubling backoff; a permanent failure
    /// or the last transient failure after all attempts is surfaced
    /// verbatim (§4.4).
    pub async fn call(&self, request: &GatewayRequest) -> Result<GatewayResult, GatewayError> {
        let descriptor = self.table.get(&request.platform, &request.model);
        let endpoint = descriptor.map(|d| d.endpoint).unwrap_or(directive_core::EndpointKind::Chat);
        let capabilities = descriptor.map(|d| d.capabilities).unwrap_or_default();

        if !endpoint.is_executable() {
            return Err(GatewayError::NotExecutable(endpoint));
        }

        let mut last_err: Option<GatewayError> = None;
        for attempt in 1..=self.retry.attempts {
            if attempt > 1 {
                tokio::time::sleep(self.retry.delay_before_retry(attempt - 1)).await;
            }
            let spec = ProviderCallSpec {
                platform: &request.platform,
                model: &request.model,
                endpoint,
                capabilities,
                prompt: &request.prompt,
                timeout: self.timeout,
            };
            match self.client.send(&spec).await {
                Ok(raw) => {
                    let cost = self.table.cost(&request.platform, &request.model, raw.tokens_in, raw.tokens_out).unwrap_or_else(|| {
                        tracing::warn!(platform = %request.platform, model = %request.model, "model absent from provider table, cost recorded as zero");
                        0.0
                    });
                    return Ok(GatewayResult::ok(raw.content, raw.tokens_in, raw.tokens_out, cost));
                }
                Err(err) => {
                    let class = err.class();
                    last_err = Some(err);
                    if class == ErrorClass::Permanent {
                        break;
                    }
                }
            }
        }
        Err(last_err.unwrap_or(GatewayError::MissingCredential(request.platform.to_string())))
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
