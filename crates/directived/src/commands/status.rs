// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use directive_store::LifecycleState;

use crate::setup::Project;

/// Count directives in each lifecycle folder, counting the legacy
/// `possible-exemplars` alias alongside `exemplar` (both feed the same
/// logical state, `SPEC_FULL.md` §C).
pub fn run(project: &Project) -> anyhow::Result<i32> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for (directive, state) in project.store.scan_all() {
        let _ = directive;
        match counts.iter_mut().find(|(name, _)| *name == state.dir_name()) {
            Some((_, count)) => *count += 1,
            None => counts.push((state.dir_name(), 1)),
        }
    }
    for state in LifecycleState::all() {
        let count = counts.iter().find(|(name, _)| *name == state.dir_name()).map(|(_, c)| *c).unwrap_or(0);
        println!("{:<10} {}", state.dir_name(), count);
    }
    Ok(0)
}
