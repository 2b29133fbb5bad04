// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn scenario_cost_accounting_100_in_50_out_sonnet() {
    let table = ProviderTable::default_table();
    let cost = table.cost(&Platform::Claude, "claude-3-5-sonnet", 100, 50).unwrap();
    // 100*0.003/1000 + 50*0.015/1000 = 0.0003 + 0.00075 = 0.00105
    assert!((cost - 0.00105).abs() < 1e-9);
}

#[test]
fn unknown_model_yields_no_cost() {
    let table = ProviderTable::default_table();
    assert!(table.cost(&Platform::Claude, "nonexistent-model", 100, 50).is_none());
}

#[test]
fn platform_parses_known_aliases() {
    assert_eq!("claude".parse::<Platform>().unwrap(), Platform::Claude);
    assert_eq!("anthropic".parse::<Platform>().unwrap(), Platform::Claude);
    assert_eq!("openai".parse::<Platform>().unwrap(), Platform::OpenAi);
    assert_eq!("mistral".parse::<Platform>().unwrap(), Platform::Other("mistral".to_string()));
}

#[test]
fn non_text_endpoints_are_not_executable() {
    assert!(EndpointKind::Chat.is_executable());
    assert!(EndpointKind::Completion.is_executable());
    assert!(!EndpointKind::Embedding.is_executable());
    assert!(!EndpointKind::Audio.is_executable());
    assert!(!EndpointKind::Image.is_executable());
}

#[test]
fn max_batch_size_matches_provider_families() {
    assert_eq!(ProviderTable::max_batch_size(&Platform::Claude), 10_000);
    assert_eq!(ProviderTable::max_batch_size(&Platform::OpenAi), 50_000);
}
