// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword topic classification for offline answers.
//!
//! Rules are checked top to bottom and the first rule with a matching
//! keyword wins. No rule matching means [`TopicBucket::Generic`].

use strum::{Display, EnumString};

/// Topic of a prompt, used to pick the offline answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum TopicBucket {
    Pricing,
    Technical,
    Service,
    Generic,
}

const PRICING_KEYWORDS: &[&str] = &[
    "price", "pricing", "cost", "how much", "quote", "budget", "fees", "billing", "invoice",
    "subscription", "discount", "payment", "afford", "cheap", "expensive",
];

const TECHNICAL_KEYWORDS: &[&str] = &[
    "api", "integrat", "webhook", "sdk", "install", "setup", "set up", "configur", "deploy",
    "error", "bug", "crash", "database", "technical", "code", "server", "endpoint",
];

const SERVICE_KEYWORDS: &[&str] = &[
    "service", "feature", "offer", "support", "appointment", "book", "schedule", "consult",
    "demo", "team", "what do you do", "help with", "capabilit",
];

/// One `(keywords, bucket)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRule {
    pub bucket: TopicBucket,
    /// Lowercase substrings.
    pub keywords: Vec<String>,
}

impl TopicRule {
    pub fn new(bucket: TopicBucket, keywords: &[&str]) -> Self {
        Self {
            bucket,
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    /// `haystack` must already be lowercase.
    pub fn matches(&self, haystack: &str) -> bool {
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// Ordered rule list.
#[derive(Debug, Clone)]
pub struct TopicClassifier {
    rules: Vec<TopicRule>,
}

impl Default for TopicClassifier {
    fn default() -> Self {
        Self::with_rules(vec![
            TopicRule::new(TopicBucket::Pricing, PRICING_KEYWORDS),
            TopicRule::new(TopicBucket::Technical, TECHNICAL_KEYWORDS),
            TopicRule::new(TopicBucket::Service, SERVICE_KEYWORDS),
        ])
    }
}

impl TopicClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<TopicRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[TopicRule] {
        &self.rules
    }

    pub fn classify(&self, prompt: &str) -> TopicBucket {
        let lower = prompt.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&lower))
            .map_or(TopicBucket::Generic, |rule| rule.bucket)
    }
}
