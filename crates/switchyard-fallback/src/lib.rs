// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline answers for when every provider in a chain has failed.

pub mod classifier;
pub mod responder;

pub use classifier::{TopicBucket, TopicClassifier, TopicRule};
pub use responder::{StaticFallbackResponder, truncate_chars};
