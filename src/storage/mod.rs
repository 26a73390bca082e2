//! Retrieval and Fact Storage Abstractions
//!
//! Information Hiding:
//! - Index and table layouts hidden behind traits
//! - Allows swapping the in-memory index for a vector store without touching handlers
//! - Each backend encapsulates its own scoring and matching rules

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub mod memory;
pub mod seed;
pub mod sqlite;

pub use memory::{InMemoryFactStore, InMemoryRetriever};
pub use sqlite::SqliteFactStore;

/// One retrieved passage with its relevance score and metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snippet {
    pub text: String,
    pub score: f32,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Similarity search over a document collection
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return at most `k` snippets, best match first
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Snippet>>;
}

/// Keyed lookup of short facts by topic
#[async_trait]
pub trait FactStore: Send + Sync {
    /// Facts whose stored topic contains `topic`, case-insensitively
    async fn lookup(&self, topic: &str) -> Result<Vec<String>>;

    /// Check if any fact matches a topic
    async fn has_topic(&self, topic: &str) -> Result<bool> {
        Ok(!self.lookup(topic).await?.is_empty())
    }
}
