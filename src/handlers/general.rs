use crate::core::llm::ChatMessage;
use crate::dispatch::{Handler, HandlerContext, Response};
use anyhow::{Context, Result};
use async_trait::async_trait;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Fallback handler: forwards the query, with prior turns, to the text generator
pub struct GeneralHandler {
    system_prompt: String,
}

impl GeneralHandler {
    pub fn new() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }
}

impl Default for GeneralHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for GeneralHandler {
    async fn handle(&self, query: &str, ctx: &HandlerContext) -> Result<Response> {
        let mut messages = Vec::with_capacity(ctx.history.len() + 2);
        messages.push(ChatMessage::system(&self.system_prompt));
        messages.extend(ctx.history.iter().cloned());
        messages.push(ChatMessage::user(query));

        let reply = ctx
            .llm
            .generate(messages)
            .await
            .context("Text generation failed")?;
        Ok(Response::text(reply))
    }
}
