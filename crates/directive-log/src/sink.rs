// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sinks for structured events. `TextLogger` forwards each event as a
//! `tracing` event (so it's free to route through whatever subscriber the
//! binary has installed); `JsonLogger` appends a line-delimited JSON
//! record, matching the "downloadable results file of one result object
//! per line" idiom already used for provider batch results (§6).

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use directive_core::event::LogEvent;
use directive_core::Event;

#[derive(Debug, thiserror::Error)]
pub enum LogSinkError {
    #[error("failed to write event log: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize event: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Consumed by the execution loop and gateway: accepts one event per call.
/// Implementors must not panic — logging failures are never allowed to
/// escape into the pipeline's control flow (§7's "no exception escapes").
pub trait Logger: Send + Sync {
    fn log(&self, component: &str, event: Event);
}

/// Routes every event through `tracing`, one line per event at `info`
/// (failures logged at `warn`), using the same "component" field style the
/// rest of the workspace uses for span/event context.
#[derive(Debug, Clone, Default)]
pub struct TextLogger;

impl Logger for TextLogger {
    fn log(&self, component: &str, event: Event) {
        let kind = event.kind_name();
        match &event {
            Event::ProviderResponse { success: false, error, .. } => {
                tracing::warn!(component, kind, error = ?error, "{kind}");
            }
            Event::DirectiveCompleted { success: false, .. } => {
                tracing::warn!(component, kind, "{kind}");
            }
            _ => tracing::info!(component, kind, "{kind}"),
        }
    }
}

/// Appends one JSON object per line to a file, matching `directive-out`
/// artifacts' own newline-delimited conventions. Failures are logged via
/// `tracing::warn!` rather than propagated — a broken log sink must never
/// abort a pipeline pass.
pub struct JsonLogger {
    path: PathBuf,
    file: Arc<Mutex<std::fs::File>>,
}

impl JsonLogger {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, LogSinkError> {
        let path = path.into();
        let file = std::fs::OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self { path, file: Arc::new(Mutex::new(file)) })
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }
}

impl Logger for JsonLogger {
    fn log(&self, component: &str, event: Event) {
        let record = LogEvent::new(component, event);
        let line = match serde_json::to_string(&record) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(error = %err, "failed to serialize event");
                return;
            }
        };
        let mut file = self.file.lock();
        if let Err(err) = writeln!(file, "{line}") {
            tracing::warn!(error = %err, path = %self.path.display(), "failed to append to event log");
        }
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
