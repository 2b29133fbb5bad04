// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Store-level errors (§7: Parse, Filesystem error classes).

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("header parse error: {0}")]
    HeaderParse(#[from] crate::header::HeaderError),
    #[error("filesystem error at {path}: {source}")]
    Filesystem { path: String, #[source] source: std::io::Error },
    #[error("directive {0} not found in the new folder (already claimed, or never existed)")]
    NotFound(String),
    #[error("template rendering failed: {0}")]
    Template(#[from] directive_core::TemplateError),
    #[error("sanitizer rejected a filename: {0}")]
    Sanitize(#[from] directive_core::SanitizeError),
}

impl StoreError {
    pub fn fs(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Filesystem { path: path.into(), source }
    }
}
