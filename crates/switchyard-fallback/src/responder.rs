// SPDX-FileCopyrightText: 2026 Switchyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Offline answer rendering.
//!
//! Output depends only on the inputs and the timestamp, and rendering
//! never fails.

use chrono::{DateTime, SecondsFormat, Utc};
use switchyard_config::model::FallbackConfig;

use crate::classifier::{TopicBucket, TopicClassifier};

const ELLIPSIS: char = '…';

const PRICING_TEXT: &str = "Our pricing depends on the scope of work. Packages are quoted \
individually, and we are happy to prepare a detailed quote once we know more about what you \
need. Reply with your budget range and timeline and we will follow up with pricing options.";

const TECHNICAL_TEXT: &str = "For technical and integration questions, our documentation \
covers setup, API access and common troubleshooting steps. If you share the error or the \
system you are integrating with, an engineer will follow up with specific guidance.";

const SERVICE_TEXT: &str = "We offer consulting, implementation and ongoing support services. \
You can request a demo or schedule a call with the team, and we will walk you through the \
features that fit your needs.";

const GENERIC_TEXT: &str = "Thanks for your message. We received your question and will get \
back to you with a full answer as soon as possible.";

fn paragraph(bucket: TopicBucket) -> &'static str {
    match bucket {
        TopicBucket::Pricing => PRICING_TEXT,
        TopicBucket::Technical => TECHNICAL_TEXT,
        TopicBucket::Service => SERVICE_TEXT,
        TopicBucket::Generic => GENERIC_TEXT,
    }
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `…`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_string(),
        Some((byte_idx, _)) => {
            let mut out = String::with_capacity(byte_idx + ELLIPSIS.len_utf8());
            out.push_str(&text[..byte_idx]);
            out.push(ELLIPSIS);
            out
        }
    }
}

/// Renders the templated answer returned when every provider failed.
#[derive(Debug, Clone)]
pub struct StaticFallbackResponder {
    classifier: TopicClassifier,
    max_prompt_chars: usize,
    max_error_chars: usize,
}

impl StaticFallbackResponder {
    pub fn new(config: &FallbackConfig) -> Self {
        Self::with_classifier(TopicClassifier::new(), config)
    }

    pub fn with_classifier(classifier: TopicClassifier, config: &FallbackConfig) -> Self {
        Self {
            classifier,
            max_prompt_chars: config.max_prompt_chars,
            max_error_chars: config.max_error_chars,
        }
    }

    pub fn classify(&self, prompt: &str) -> TopicBucket {
        self.classifier.classify(prompt)
    }

    /// Render with the current time.
    pub fn render(&self, prompt: &str, agent_id: &str, last_error: &str) -> String {
        self.render_at(prompt, agent_id, last_error, Utc::now())
    }

    /// Render with an explicit timestamp.
    pub fn render_at(
        &self,
        prompt: &str,
        agent_id: &str,
        last_error: &str,
        at: DateTime<Utc>,
    ) -> String {
        let bucket = self.classifier.classify(prompt);
        let prompt = truncate_chars(prompt.trim(), self.max_prompt_chars);
        let error = truncate_chars(last_error.trim(), self.max_error_chars);
        let error = if error.is_empty() { "unknown error".to_string() } else { error };
        let timestamp = at.to_rfc3339_opts(SecondsFormat::Secs, true);

        format!(
            "[Offline response from {agent_id} at {timestamp}]\n\n\
             {body}\n\n\
             Your question: \"{prompt}\"\n\n\
             Our AI assistants are temporarily unavailable (last error: {error}). \
             This answer was prepared without them; please try again shortly for a full reply.",
            body = paragraph(bucket),
        )
    }
}
