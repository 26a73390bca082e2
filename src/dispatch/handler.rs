use super::response::Response;
use crate::core::llm::{ChatMessage, TextGenerator};
use crate::core::weather::WeatherSource;
use crate::storage::{FactStore, Retriever};
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Collaborators and per-call state handed to every handler.
///
/// Built once by the composition root; handlers never own clients themselves.
#[derive(Clone)]
pub struct HandlerContext {
    pub llm: Arc<dyn TextGenerator>,
    pub weather: Arc<dyn WeatherSource>,
    pub retriever: Arc<dyn Retriever>,
    pub facts: Arc<dyn FactStore>,
    /// Prior conversation turns, oldest first
    pub history: Vec<ChatMessage>,
    pub retrieval_top_k: usize,
    pub default_city: String,
}

impl HandlerContext {
    pub fn new(
        llm: Arc<dyn TextGenerator>,
        weather: Arc<dyn WeatherSource>,
        retriever: Arc<dyn Retriever>,
        facts: Arc<dyn FactStore>,
    ) -> Self {
        Self {
            llm,
            weather,
            retriever,
            facts,
            history: Vec::new(),
            retrieval_top_k: 2,
            default_city: "London".to_string(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatMessage>) -> Self {
        self.history = history;
        self
    }

    pub fn with_retrieval_top_k(mut self, top_k: usize) -> Self {
        self.retrieval_top_k = top_k;
        self
    }

    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }
}

impl fmt::Debug for HandlerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("history_len", &self.history.len())
            .field("retrieval_top_k", &self.retrieval_top_k)
            .field("default_city", &self.default_city)
            .finish_non_exhaustive()
    }
}

/// Produces the response for one intent
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, query: &str, ctx: &HandlerContext) -> Result<Response>;
}

/// Adapter for synchronous closures that need no collaborators
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&str) -> Result<Response> + Send + Sync,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> Handler for FnHandler<F>
where
    F: Fn(&str) -> Result<Response> + Send + Sync,
{
    async fn handle(&self, query: &str, _ctx: &HandlerContext) -> Result<Response> {
        (self.func)(query)
    }
}
