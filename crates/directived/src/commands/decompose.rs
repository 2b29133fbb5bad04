// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use directive_core::{BasicSanitizer, Event, Platform, PlaceholderRenderer, SystemClock};
use directive_compose::Decomposer;

use crate::setup::Project;

pub async fn run(project: &Project, prompt: String, platform: Option<String>, model: Option<String>) -> anyhow::Result<i32> {
    let sanitizer = BasicSanitizer;
    let renderer = PlaceholderRenderer::new();
    let clock = SystemClock;

    let session = project.sessions.resume_or_create(&clock)?;

    let selector = match (platform, model) {
        (None, None) => None,
        (p, m) => {
            let platform = match p.unwrap_or_else(|| project.config.default_platform.clone()).parse::<Platform>() {
                Ok(platform) => platform,
                Err(never) => match never {},
            };
            let model = m.unwrap_or_else(|| project.config.default_model.clone());
            Some((platform, model))
        }
    };

    let directives = Decomposer::new().decompose(&prompt, session.session_id.clone(), selector, &sanitizer).await;

    for directive in &directives {
        project.store.write_new(directive, &sanitizer, &renderer)?;
        project.logger.log(
            "decompose",
            Event::DirectiveCreated {
                directive_id: directive.id,
                session_id: directive.session_id.clone(),
                slug: directive.slug.clone(),
            },
        );
    }

    project.sessions.persist(&session)?;

    println!("wrote {} directive(s) to {}", directives.len(), project.store.root().join("new").display());
    Ok(0)
}
