use crate::dispatch::{Handler, HandlerContext, Response};
use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

static TOPIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:facts?|statistics)\s+(?:about|on|for)\s+(.+)").expect("topic regex is valid")
});

/// Topic named after "facts about" and friends, stripped of punctuation and a leading article
pub fn extract_topic(query: &str) -> String {
    let raw = TOPIC
        .captures(query)
        .and_then(|captures| captures.get(1))
        .map_or(query, |m| m.as_str());

    let topic = raw
        .trim()
        .trim_end_matches(|c: char| matches!(c, '?' | '.' | '!' | ','))
        .trim()
        .to_lowercase();
    topic.strip_prefix("the ").unwrap_or(&topic).trim().to_string()
}

/// Looks topics up in the fact store
pub struct FactsHandler;

#[async_trait]
impl Handler for FactsHandler {
    async fn handle(&self, query: &str, ctx: &HandlerContext) -> Result<Response> {
        let topic = extract_topic(query);
        if topic.is_empty() {
            return Ok(Response::text("Please name a topic to look up facts for."));
        }

        let facts = ctx
            .facts
            .lookup(&topic)
            .await
            .with_context(|| format!("Fact lookup for '{}' failed", topic))?;

        if facts.is_empty() {
            return Ok(Response::text(format!("No facts found for '{}'.", topic)));
        }

        let summary = facts
            .iter()
            .map(|fact| format!("- {}", fact))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Response::structured(
            summary,
            json!({ "topic": topic, "facts": facts }),
        ))
    }
}
