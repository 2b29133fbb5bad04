// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::setup::Project;

pub fn run(project: &Project) -> anyhow::Result<i32> {
    project.store.init()?;
    println!("initialized directive store at {}", project.store.root().display());
    Ok(0)
}
