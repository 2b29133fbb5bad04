// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The provider descriptor table: an immutable, per-process map from
//! (platform, model) to endpoint shape and pricing, read once at startup.
//! Maintaining or fetching live prices is explicitly out of scope; this
//! module only holds a small built-in table and looks values up in it.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Remote LLM platform. `Other` covers any platform reachable through the
/// gateway's generic chat/completion path without a dedicated variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Claude,
    OpenAi,
    Other(String),
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Claude => write!(f, "claude"),
            Self::OpenAi => write!(f, "openai"),
            Self::Other(name) => write!(f, "{name}"),
        }
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "claude" | "anthropic" => Self::Claude,
            "openai" => Self::OpenAi,
            other => Self::Other(other.to_string()),
        })
    }
}

/// The kind of endpoint a (platform, model) pair targets. Only `Chat` and
/// `Completion` are valid directive-execution targets; the rest are
/// recognized so the gateway can fail fast instead of misrouting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Chat,
    Completion,
    Embedding,
    Audio,
    Image,
}

impl EndpointKind {
    pub fn is_executable(&self) -> bool {
        matches!(self, Self::Chat | Self::Completion)
    }
}

/// Capability flags relevant to request construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    /// Reasoning-class models omit the `temperature` parameter entirely.
    pub reasoning_class: bool,
}

/// Immutable per-(platform, model) entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderDescriptor {
    pub platform: Platform,
    pub model: String,
    pub endpoint: EndpointKind,
    pub max_context: u32,
    pub capabilities: Capabilities,
    /// USD per 1,000 input tokens.
    pub price_in_per_1k: f64,
    /// USD per 1,000 output tokens.
    pub price_out_per_1k: f64,
}

impl ProviderDescriptor {
    /// `tokens_in * price_in/1000 + tokens_out * price_out/1000`.
    pub fn cost(&self, tokens_in: u64, tokens_out: u64) -> f64 {
        (tokens_in as f64) * self.price_in_per_1k / 1000.0
            + (tokens_out as f64) * self.price_out_per_1k / 1000.0
    }
}

/// Lookup table keyed by (platform, model).
#[derive(Debug, Clone, Default)]
pub struct ProviderTable {
    entries: HashMap<(Platform, String), ProviderDescriptor>,
}

impl ProviderTable {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn insert(&mut self, descriptor: ProviderDescriptor) {
        self.entries.insert((descriptor.platform.clone(), descriptor.model.clone()), descriptor);
    }

    pub fn get(&self, platform: &Platform, model: &str) -> Option<&ProviderDescriptor> {
        self.entries.get(&(platform.clone(), model.to_string()))
    }

    /// Cost for a call, or `None` with the caller expected to log a warning
    /// and treat cost as zero, per spec: "If the model is absent from the
    /// table, cost is zero and a warning is emitted."
    pub fn cost(&self, platform: &Platform, model: &str, tokens_in: u64, tokens_out: u64) -> Option<f64> {
        self.get(platform, model).map(|d| d.cost(tokens_in, tokens_out))
    }

    /// A small built-in table seeding the platforms/models this workspace
    /// is grounded against; real deployments are expected to extend this
    /// via [`ProviderTable::insert`] at startup (outside this crate's
    /// scope — maintaining the live cost table is a Non-goal).
    pub fn default_table() -> Self {
        let mut table = Self::new();
        table.insert(ProviderDescriptor {
            platform: Platform::Claude,
            model: "claude-3-5-sonnet".to_string(),
            endpoint: EndpointKind::Chat,
            max_context: 200_000,
            capabilities: Capabilities { reasoning_class: false },
            price_in_per_1k: 0.003,
            price_out_per_1k: 0.015,
        });
        table.insert(ProviderDescriptor {
            platform: Platform::Claude,
            model: "claude-3-haiku".to_string(),
            endpoint: EndpointKind::Chat,
            max_context: 200_000,
            capabilities: Capabilities { reasoning_class: false },
            price_in_per_1k: 0.00025,
            price_out_per_1k: 0.00125,
        });
        table.insert(ProviderDescriptor {
            platform: Platform::OpenAi,
            model: "gpt-4o".to_string(),
            endpoint: EndpointKind::Chat,
            max_context: 128_000,
            capabilities: Capabilities { reasoning_class: false },
            price_in_per_1k: 0.0025,
            price_out_per_1k: 0.01,
        });
        table.insert(ProviderDescriptor {
            platform: Platform::OpenAi,
            model: "o1".to_string(),
            endpoint: EndpointKind::Chat,
            max_context: 200_000,
            capabilities: Capabilities { reasoning_class: true },
            price_in_per_1k: 0.015,
            price_out_per_1k: 0.06,
        });
        table
    }

    /// Provider-specific maximum requests per batch submission (§4.5).
    pub fn max_batch_size(platform: &Platform) -> usize {
        match platform {
            Platform::Claude => 10_000,
            Platform::OpenAi => 50_000,
            Platform::Other(_) => 1_000,
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
