// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Switchyard gateway: process wiring, CLI commands and HTTP surface.

pub mod bootstrap;
pub mod commands;
pub mod serve;
pub mod shutdown;

pub use bootstrap::Runtime;
