// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! directive-log: structured event emission for the pipeline (C8).
//!
//! Every lifecycle transition and provider call produces a
//! [`directive_core::Event`]; this crate turns those into either a
//! `tracing`-backed text sink or a line-delimited JSON sink, and
//! accumulates the per-process counters the performance tracker reports
//! on demand.

pub mod sink;
pub mod tracker;

pub use sink::{JsonLogger, Logger, TextLogger};
pub use tracker::PerformanceTracker;
