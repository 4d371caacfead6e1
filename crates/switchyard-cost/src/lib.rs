// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cost accounting for the Switchyard gateway.
//!
//! [`CostCalculator`] prices a call from a cached [`PricingTable`];
//! [`UsageRecorder`] persists one usage record per attempt off the request path.

pub mod pricing;
pub mod recorder;

pub use pricing::{CostCalculator, PricingTable};
pub use recorder::UsageRecorder;
