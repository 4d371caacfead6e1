// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pricing reference data.

use rusqlite::params;
use switchyard_core::types::timestamp_now;
use switchyard_core::{PricingEntry, SwitchyardError};

use crate::database::{Database, map_tr_err};

pub async fn load_pricing(db: &Database) -> Result<Vec<PricingEntry>, SwitchyardError> {
    db.connection()
        .call(|conn| -> Result<Vec<PricingEntry>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT provider, model, input_cost_per_1k, output_cost_per_1k \
                 FROM pricing_entries ORDER BY provider, model",
            )?;
            let rows = stmt.query_map([], |row| {
                Ok(PricingEntry {
                    provider: row.get(0)?,
                    model: row.get(1)?,
                    input_cost_per_1k: row.get(2)?,
                    output_cost_per_1k: row.get(3)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace the rates for `(provider, model)`.
pub async fn upsert_pricing(db: &Database, entry: &PricingEntry) -> Result<(), SwitchyardError> {
    let entry = entry.clone();
    let updated_at = timestamp_now();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO pricing_entries \
                 (provider, model, input_cost_per_1k, output_cost_per_1k, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5) \
                 ON CONFLICT(provider, model) DO UPDATE SET \
                 input_cost_per_1k = excluded.input_cost_per_1k, \
                 output_cost_per_1k = excluded.output_cost_per_1k, \
                 updated_at = excluded.updated_at",
                params![
                    entry.provider,
                    entry.model,
                    entry.input_cost_per_1k,
                    entry.output_cost_per_1k,
                    updated_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}
