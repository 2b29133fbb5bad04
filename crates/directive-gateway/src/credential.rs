// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential resolution for outbound provider calls.
//!
//! The gateway never asks the caller for a key directly: platform
//! selection "defaults to whichever credential is configured" (spec.md
//! §4.4), so resolution walks a small fallback chain per platform and the
//! first match wins.

use directive_core::Platform;

/// A resolved credential, carrying the header scheme it authenticates
/// with (spec.md §6: "Bearer token, or key + version header").
#[derive(Debug, Clone)]
pub enum Credential {
    Bearer(String),
    ApiKeyHeader { header: &'static str, value: String },
}

/// Resolve a credential for `platform` from the process environment.
/// Returns `None` if nothing is configured; the caller surfaces that as a
/// permanent (non-retriable) authentication error rather than guessing.
pub fn resolve(platform: &Platform) -> Option<Credential> {
    match platform {
        Platform::Claude => std::env::var("ANTHROPIC_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .map(|key| Credential::ApiKeyHeader { header: "x-api-key", value: key }),
        Platform::OpenAi => {
            std::env::var("OPENAI_API_KEY").ok().filter(|s| !s.is_empty()).map(Credential::Bearer)
        }
        Platform::Other(name) => {
            let env_key = format!("{}_API_KEY", name.to_ascii_uppercase());
            std::env::var(&env_key).ok().filter(|s| !s.is_empty()).map(Credential::Bearer)
        }
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
