// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed queries over the usage ledger and the pricing table.

pub mod pricing;
pub mod usage;
