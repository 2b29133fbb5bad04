// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway and batch-coordinator error taxonomy (§7: Transient provider,
//! Permanent provider, Batch).

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Network failure, timeout, 429, or 5xx — retried with backoff.
    Transient,
    /// 401/403/400-class or a malformed response — never retried.
    Permanent,
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error calling {platform}/{model}: {message}")]
    Transport { platform: String, model: String, message: String },
    #[error("provider {platform}/{model} returned rate-limit or transient status {status}")]
    Transient { platform: String, model: String, status: u16 },
    #[error("provider {platform}/{model} returned permanent error status {status}: {message}")]
    Permanent { platform: String, model: String, status: u16, message: String },
    #[error("malformed response from {platform}/{model}: {reason}")]
    MalformedResponse { platform: String, model: String, reason: String },
    #[error("endpoint kind {0:?} is not a valid directive-execution target")]
    NotExecutable(directive_core::EndpointKind),
    #[error("no credential configured for platform {0}")]
    MissingCredential(String),
}

impl GatewayError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Transport { .. } | Self::Transient { .. } => ErrorClass::Transient,
            Self::Permanent { .. } | Self::MalformedResponse { .. } | Self::NotExecutable(_) | Self::MissingCredential(_) => {
                ErrorClass::Permanent
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("batch submission failed for {platform}/{model}: {message}")]
    SubmissionFailed { platform: String, model: String, message: String },
    #[error("batch {batch_id} polling failed: {message}")]
    PollFailed { batch_id: String, message: String },
    #[error("batch {batch_id} exceeded maximum total wait")]
    TimedOut { batch_id: String },
    #[error("batch {batch_id} reported remote failure: {message}")]
    RemoteFailure { batch_id: String, message: String },
}
