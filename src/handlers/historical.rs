use crate::dispatch::{Handler, HandlerContext, Response};
use anyhow::{Context, Result};
use async_trait::async_trait;

/// Answers climate-history questions straight from the retriever
pub struct HistoricalHandler;

#[async_trait]
impl Handler for HistoricalHandler {
    async fn handle(&self, query: &str, ctx: &HandlerContext) -> Result<Response> {
        let snippets = ctx
            .retriever
            .search(query, ctx.retrieval_top_k)
            .await
            .context("Historical weather search failed")?;

        if snippets.is_empty() {
            return Ok(Response::text("No historical data found."));
        }

        let text = snippets
            .iter()
            .map(|snippet| snippet.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        Ok(Response::text(text))
    }
}
