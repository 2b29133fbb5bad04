// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by session persistence and the execution loop.

use directive_store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("session store I/O failed: {0}")]
    SessionIo(#[from] std::io::Error),
    #[error("session file is not valid JSON: {0}")]
    SessionFormat(#[from] serde_json::Error),
    #[error("directive store operation failed: {0}")]
    Store(#[from] StoreError),
}
