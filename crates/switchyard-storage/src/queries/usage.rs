// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Usage ledger writes and aggregations.

use std::collections::BTreeMap;

use rusqlite::params;
use switchyard_core::{
    DateRange, PerformanceAggregate, SwitchyardError, UsageAggregate, UsageRecord,
};

use crate::database::{Database, map_tr_err};

/// Append one usage record. Rows are never updated afterwards.
pub async fn insert_usage(db: &Database, record: &UsageRecord) -> Result<(), SwitchyardError> {
    let record = record.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO usage_records (id, caller_id, agent_id, provider, model, \
                 input_tokens, output_tokens, cost_usd, latency_ms, status, error_message, \
                 created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                params![
                    record.id,
                    record.caller_id,
                    record.agent_id,
                    record.provider,
                    record.model,
                    record.input_tokens,
                    record.output_tokens,
                    record.cost_usd,
                    i64::try_from(record.latency_ms).unwrap_or(i64::MAX),
                    record.status.to_string(),
                    record.error_message,
                    record.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Totals for `caller_id` within `range`, grouped by `(provider, agent_id)`.
pub async fn aggregate_usage(
    db: &Database,
    caller_id: &str,
    range: DateRange,
) -> Result<Vec<UsageAggregate>, SwitchyardError> {
    let caller_id = caller_id.to_string();
    let since = range.since_str();
    let until = range.until_str();
    db.connection()
        .call(move |conn| -> Result<Vec<UsageAggregate>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT provider, agent_id, \
                        COALESCE(SUM(input_tokens + output_tokens), 0), \
                        COALESCE(SUM(cost_usd), 0.0), \
                        COUNT(*) \
                 FROM usage_records \
                 WHERE caller_id = ?1 \
                   AND (?2 IS NULL OR created_at >= ?2) \
                   AND (?3 IS NULL OR created_at < ?3) \
                 GROUP BY provider, agent_id \
                 ORDER BY provider, agent_id",
            )?;
            let rows = stmt.query_map(params![caller_id, since, until], |row| {
                Ok(UsageAggregate {
                    provider: row.get(0)?,
                    agent_id: row.get(1)?,
                    total_tokens: non_negative(row.get(2)?),
                    total_cost_usd: row.get(3)?,
                    count: non_negative(row.get(4)?),
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Latency and cost profile of `agent_id`, grouped by `(provider, model)`.
pub async fn aggregate_performance(
    db: &Database,
    agent_id: &str,
) -> Result<Vec<PerformanceAggregate>, SwitchyardError> {
    let agent_id = agent_id.to_string();
    let groups = db
        .connection()
        .call(move |conn| -> Result<Vec<StatusGroup>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT provider, model, status, COUNT(*), \
                        COALESCE(SUM(latency_ms), 0), COALESCE(SUM(cost_usd), 0.0) \
                 FROM usage_records \
                 WHERE agent_id = ?1 \
                 GROUP BY provider, model, status",
            )?;
            let rows = stmt.query_map(params![agent_id], |row| {
                Ok(StatusGroup {
                    provider: row.get(0)?,
                    model: row.get(1)?,
                    status: row.get(2)?,
                    count: non_negative(row.get(3)?),
                    latency_sum: row.get::<_, i64>(4)? as f64,
                    cost_sum: row.get(5)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)?;

    Ok(fold_performance(groups))
}

/// One `(provider, model, status)` bucket before folding.
struct StatusGroup {
    provider: String,
    model: String,
    status: String,
    count: u64,
    latency_sum: f64,
    cost_sum: f64,
}

#[derive(Default)]
struct Accumulator {
    count: u64,
    latency_sum: f64,
    cost_sum: f64,
    by_status: BTreeMap<String, u64>,
}

fn fold_performance(groups: Vec<StatusGroup>) -> Vec<PerformanceAggregate> {
    let mut acc: BTreeMap<(String, String), Accumulator> = BTreeMap::new();
    for group in groups {
        let entry = acc.entry((group.provider, group.model)).or_default();
        entry.count += group.count;
        entry.latency_sum += group.latency_sum;
        entry.cost_sum += group.cost_sum;
        *entry.by_status.entry(group.status).or_default() += group.count;
    }

    acc.into_iter()
        .map(|((provider, model), a)| {
            let n = a.count.max(1) as f64;
            PerformanceAggregate {
                provider,
                model,
                avg_latency_ms: a.latency_sum / n,
                avg_cost_usd: a.cost_sum / n,
                count_by_status: a.by_status,
            }
        })
        .collect()
}

fn non_negative(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use switchyard_core::{TokenUsage, UsageStatus};
    use tempfile::tempdir;

    async fn setup() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("usage.db");
        let db = Database::open(path.to_str().unwrap(), true).await.unwrap();
        (db, dir)
    }

    fn record(
        caller: &str,
        agent: &str,
        provider: &str,
        model: &str,
        status: UsageStatus,
        created_at: &str,
    ) -> UsageRecord {
        let mut r = UsageRecord::new(caller, agent, provider, model, status);
        r.created_at = created_at.to_string();
        r
    }

    #[tokio::test]
    async fn aggregates_usage_by_provider_and_agent() {
        let (db, _dir) = setup().await;
        let ts = "2026-03-01T10:00:00.000Z";
        let rows = [
            record("alice", "agent-cloud", "anthropic", "m1", UsageStatus::Success, ts)
                .with_usage(TokenUsage::new(100, 50), 0.01),
            record("alice", "agent-cloud", "anthropic", "m1", UsageStatus::Failed, ts),
            record("alice", "agent-cloud", "openai", "m2", UsageStatus::Success, ts)
                .with_usage(TokenUsage::new(10, 5), 0.002),
            record("bob", "agent-cloud", "anthropic", "m1", UsageStatus::Success, ts)
                .with_usage(TokenUsage::new(999, 999), 9.0),
        ];
        for r in &rows {
            insert_usage(&db, r).await.unwrap();
        }

        let aggs = aggregate_usage(&db, "alice", DateRange::all_time()).await.unwrap();
        assert_eq!(aggs.len(), 2);
        assert_eq!(aggs[0].provider, "anthropic");
        assert_eq!(aggs[0].count, 2);
        assert_eq!(aggs[0].total_tokens, 150);
        assert!((aggs[0].total_cost_usd - 0.01).abs() < 1e-12);
        assert_eq!(aggs[1].provider, "openai");
        assert_eq!(aggs[1].total_tokens, 15);
    }

    #[tokio::test]
    async fn date_range_is_half_open() {
        let (db, _dir) = setup().await;
        for ts in [
            "2026-02-28T23:59:59.999Z",
            "2026-03-01T00:00:00.000Z",
            "2026-03-15T12:00:00.000Z",
            "2026-04-01T00:00:00.000Z",
        ] {
            insert_usage(
                &db,
                &record("alice", "a", "openai", "m", UsageStatus::Success, ts),
            )
            .await
            .unwrap();
        }

        let march = DateRange::between(
            Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 4, 1, 0, 0, 0).unwrap(),
        );
        let aggs = aggregate_usage(&db, "alice", march).await.unwrap();
        assert_eq!(aggs.len(), 1);
        assert_eq!(aggs[0].count, 2);
    }

    #[tokio::test]
    async fn unknown_caller_yields_nothing() {
        let (db, _dir) = setup().await;
        let aggs = aggregate_usage(&db, "nobody", DateRange::all_time()).await.unwrap();
        assert!(aggs.is_empty());
    }

    #[tokio::test]
    async fn performance_counts_every_status() {
        let (db, _dir) = setup().await;
        let ts = "2026-03-01T10:00:00.000Z";
        let rows = [
            record("c", "agent-cloud", "anthropic", "m1", UsageStatus::Success, ts)
                .with_usage(TokenUsage::new(10, 10), 0.02)
                .with_latency_ms(100),
            record("c", "agent-cloud", "anthropic", "m1", UsageStatus::Failed, ts)
                .with_latency_ms(300)
                .with_error("HTTP 500"),
            record("c", "agent-cloud", "anthropic", "m1", UsageStatus::Cancelled, ts)
                .with_latency_ms(200),
            record("c", "agent-local", "ollama", "m3", UsageStatus::Success, ts),
        ];
        for r in &rows {
            insert_usage(&db, r).await.unwrap();
        }

        let perf = aggregate_performance(&db, "agent-cloud").await.unwrap();
        assert_eq!(perf.len(), 1);
        let p = &perf[0];
        assert_eq!(p.provider, "anthropic");
        assert_eq!(p.model, "m1");
        assert_eq!(p.total_count(), 3);
        assert_eq!(p.count_by_status.get("success"), Some(&1));
        assert_eq!(p.count_by_status.get("failed"), Some(&1));
        assert_eq!(p.count_by_status.get("cancelled"), Some(&1));
        assert!((p.avg_latency_ms - 200.0).abs() < 1e-9);
        assert!((p.avg_cost_usd - 0.02 / 3.0).abs() < 1e-12);
    }
}
