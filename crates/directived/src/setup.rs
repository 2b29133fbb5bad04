// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wires the collaborators every command needs from a project root and a
//! loaded [`Config`]: the store, the session store, and a logger. Built
//! once per invocation and handed to whichever command is running —
//! nothing here is global state (`SPEC_FULL.md` §9).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use directive_core::{Config, ProviderTable};
use directive_engine::SessionStore;
use directive_gateway::{BatchCoordinator, HttpBatchBackend, HttpProviderClient, ProviderGateway, RetryPolicy};
use directive_log::{JsonLogger, Logger, TextLogger};
use directive_store::DirectiveStore;

pub struct Project {
    pub root: PathBuf,
    pub config: Config,
    pub store: DirectiveStore,
    pub sessions: SessionStore,
    pub logger: Arc<dyn Logger>,
}

impl Project {
    pub fn load(project_root: Option<PathBuf>) -> anyhow::Result<Self> {
        let root = project_root.map(Ok).unwrap_or_else(std::env::current_dir)?;
        let config = Config::load(&config_path(&root))?;
        let store = DirectiveStore::new(root.join("directives"));
        let sessions = SessionStore::new(root.join("sessions"));
        let logger: Arc<dyn Logger> = match &config.log_file {
            Some(path) => Arc::new(JsonLogger::open(root.join(path))?),
            None => Arc::new(TextLogger),
        };
        Ok(Self { root, config, store, sessions, logger })
    }

    pub fn gateway(&self) -> Arc<ProviderGateway> {
        Arc::new(ProviderGateway::new(
            Arc::new(HttpProviderClient::new()),
            ProviderTable::default_table(),
            RetryPolicy::new(self.config.retry_attempts, Duration::from_secs_f64(self.config.api_retry_delay)),
            Duration::from_secs(self.config.api_timeout),
        ))
    }

    pub fn batch_coordinator(&self) -> Arc<BatchCoordinator> {
        Arc::new(
            BatchCoordinator::new(
                Arc::new(HttpBatchBackend::new()),
                ProviderTable::default_table(),
                Duration::from_secs(5),
                Duration::from_secs(self.config.max_processing_time_seconds),
            )
            .with_logger(Arc::clone(&self.logger)),
        )
    }
}

fn config_path(root: &Path) -> PathBuf {
    root.join("directived.toml")
}
