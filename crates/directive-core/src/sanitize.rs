// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The sanitizer collaborator interface (§6). The real input-sanitization
//! filter is explicitly out of scope; this is the minimal default the core
//! depends on so that filename/prompt safety isn't a hidden assumption.

#[derive(Debug, thiserror::Error)]
#[error("sanitizer rejected input: {0}")]
pub struct SanitizeError(pub String);

/// External collaborator consumed, not implemented, by the core (§6).
pub trait Sanitizer: Send + Sync {
    fn sanitize_filename(&self, raw: &str) -> Result<String, SanitizeError>;
    fn sanitize_prompt(&self, raw: &str) -> Result<String, SanitizeError>;
    fn generate_safe_id(&self, raw: &str, prefix: &str) -> String;
}

/// Minimal default: strips path separators and control characters.
/// Deliberately not a security boundary — the real filter lives elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicSanitizer;

impl Sanitizer for BasicSanitizer {
    fn sanitize_filename(&self, raw: &str) -> Result<String, SanitizeError> {
        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, '/' | '\\' | '\0') && !c.is_control())
            .collect();
        if cleaned.trim().is_empty() {
            return Err(SanitizeError("filename empty after sanitization".to_string()));
        }
        Ok(cleaned)
    }

    fn sanitize_prompt(&self, raw: &str) -> Result<String, SanitizeError> {
        Ok(raw.chars().filter(|c| !c.is_control() || *c == '\n' || *c == '\t').collect())
    }

    fn generate_safe_id(&self, raw: &str, prefix: &str) -> String {
        let cleaned: String = raw
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
            .collect();
        format!("{prefix}{cleaned}")
    }
}

#[cfg(test)]
#[path = "sanitize_tests.rs"]
mod tests;
