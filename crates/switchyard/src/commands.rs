// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot CLI commands: generate, usage, performance, pricing.

use std::fmt::Write as _;

use switchyard_core::{
    DateRange, GenerationRequest, PerformanceAggregate, PricingEntry, ReasoningEffort,
    SwitchyardError, UsageAggregate, UsageStore,
};

use crate::bootstrap::Runtime;

/// Options for `switchyard generate`.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    pub prompt: String,
    pub profile: Option<String>,
    pub web_search: bool,
    pub deep_research: bool,
    pub effort: ReasoningEffort,
    pub caller: String,
}

/// Generate once and print the answer. Returns whether a live provider answered.
pub async fn run_generate(
    runtime: &Runtime,
    options: GenerateOptions,
) -> Result<bool, SwitchyardError> {
    let mut request = GenerationRequest::new(options.prompt, options.caller)?
        .with_web_search(options.web_search)
        .with_deep_research(options.deep_research)
        .with_reasoning_effort(options.effort);
    if let Some(profile) = options.profile {
        request = request.with_preferred_provider(profile);
    }

    let outcome = runtime.orchestrator.generate(&request).await?;
    println!("{}", outcome.text);
    eprintln!(
        "\n[provider: {}, fallback: {}]",
        outcome.provider_used, outcome.fallback_used
    );
    Ok(!outcome.is_static_fallback())
}

pub async fn run_usage(
    runtime: &Runtime,
    caller: &str,
    days: Option<u32>,
) -> Result<(), SwitchyardError> {
    let range = days.map_or_else(DateRange::all_time, DateRange::last_days);
    let rows = runtime.storage.aggregate_usage(caller, range).await?;
    print!("{}", format_usage(&rows));
    Ok(())
}

pub async fn run_performance(runtime: &Runtime, agent: &str) -> Result<(), SwitchyardError> {
    let rows = runtime.storage.aggregate_performance(agent).await?;
    print!("{}", format_performance(&rows));
    Ok(())
}

pub async fn run_pricing(runtime: &Runtime) -> Result<(), SwitchyardError> {
    let table = runtime.orchestrator.costs().refresh().await?;
    let entries: Vec<PricingEntry> = table.entries().into_iter().cloned().collect();
    print!("{}", format_pricing(&entries));
    Ok(())
}

pub fn format_usage(rows: &[UsageAggregate]) -> String {
    if rows.is_empty() {
        return "no usage recorded\n".to_string();
    }
    let mut out = format!(
        "{:<12} {:<16} {:>8} {:>12} {:>12}\n",
        "PROVIDER", "AGENT", "CALLS", "TOKENS", "COST_USD"
    );
    for row in rows {
        let _ = writeln!(
            out,
            "{:<12} {:<16} {:>8} {:>12} {:>12.6}",
            row.provider, row.agent_id, row.count, row.total_tokens, row.total_cost_usd
        );
    }
    out
}

pub fn format_performance(rows: &[PerformanceAggregate]) -> String {
    if rows.is_empty() {
        return "no attempts recorded\n".to_string();
    }
    let mut out = format!(
        "{:<12} {:<28} {:>12} {:>12}  {}\n",
        "PROVIDER", "MODEL", "AVG_MS", "AVG_COST", "STATUS"
    );
    for row in rows {
        let statuses = row
            .count_by_status
            .iter()
            .map(|(status, n)| format!("{status}={n}"))
            .collect::<Vec<_>>()
            .join(" ");
        let _ = writeln!(
            out,
            "{:<12} {:<28} {:>12.1} {:>12.6}  {}",
            row.provider, row.model, row.avg_latency_ms, row.avg_cost_usd, statuses
        );
    }
    out
}

pub fn format_pricing(entries: &[PricingEntry]) -> String {
    let mut out = format!(
        "{:<12} {:<28} {:>10} {:>10}\n",
        "PROVIDER", "MODEL", "IN/1K", "OUT/1K"
    );
    for entry in entries {
        let _ = writeln!(
            out,
            "{:<12} {:<28} {:>10.4} {:>10.4}",
            entry.provider, entry.model, entry.input_cost_per_1k, entry.output_cost_per_1k
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[test]
    fn usage_table_lists_each_group() {
        let rows = vec![UsageAggregate {
            provider: "openai".into(),
            agent_id: "agent-cloud".into(),
            total_tokens: 1500,
            total_cost_usd: 0.0125,
            count: 3,
        }];
        let text = format_usage(&rows);
        assert!(text.starts_with("PROVIDER"));
        assert!(text.contains("agent-cloud"));
        assert!(text.contains("0.012500"));
        assert_eq!(format_usage(&[]), "no usage recorded\n");
    }

    #[test]
    fn performance_table_shows_status_counts() {
        let rows = vec![PerformanceAggregate {
            provider: "anthropic".into(),
            model: "claude-sonnet-4-20250514".into(),
            avg_latency_ms: 812.5,
            avg_cost_usd: 0.004,
            count_by_status: BTreeMap::from([("failed".into(), 1), ("success".into(), 3)]),
        }];
        let text = format_performance(&rows);
        assert!(text.contains("failed=1 success=3"));
        assert!(text.contains("812.5"));
    }
}
