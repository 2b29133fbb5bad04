// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn interpolate_substitutes_known_vars() {
    let out = interpolate("hello {{NAME}}", &vars(&[("NAME", "world")]));
    assert_eq!(out, "hello world");
}

#[test]
fn interpolate_fills_unknown_vars_with_na() {
    let out = interpolate("value: {{MISSING}}", &HashMap::new());
    assert_eq!(out, "value: N/A");
}

#[test]
fn renders_directive_prompt_template() {
    let renderer = PlaceholderRenderer::new();
    let out = renderer
        .render("directive-prompt", &vars(&[("SLUG", "fix-login"), ("TASK", "fix the login bug")]))
        .unwrap();
    assert!(out.contains("fix-login"));
    assert!(out.contains("fix the login bug"));
}

#[test]
fn renders_directive_out_template_with_missing_metrics_as_na() {
    let renderer = PlaceholderRenderer::new();
    let out = renderer
        .render(
            "directive-out",
            &vars(&[("SLUG", "fix-login"), ("STATUS", "pending"), ("PRIORITY", "high")]),
        )
        .unwrap();
    assert!(out.contains("tokens in: N/A"));
}

#[test]
fn unknown_template_name_errors() {
    let renderer = PlaceholderRenderer::new();
    assert!(renderer.render("not-a-template", &HashMap::new()).is_err());
}

#[test]
fn registered_domain_template_is_reachable() {
    let mut renderer = PlaceholderRenderer::new();
    renderer.register("api-design", "API: {{NAME}}");
    let out = renderer.render("api-design", &vars(&[("NAME", "users")])).unwrap();
    assert_eq!(out, "API: users");
}
