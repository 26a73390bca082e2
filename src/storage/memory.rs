//! In-Memory Retrieval and Fact Storage
//!
//! Information Hiding:
//! - Document list and term scoring hidden from users
//! - Thread-safe access via RwLock hidden behind async interface
//! - Suitable for testing and small seeded corpora

use super::seed::{CLIMATE_HISTORY, DEBATE_FACTS};
use super::{FactStore, Retriever, Snippet};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Clone)]
struct Document {
    text: String,
    terms: HashSet<String>,
    metadata: HashMap<String, String>,
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| word.chars().count() > 2)
        .map(str::to_lowercase)
        .collect()
}

/// Term-overlap retriever; a document scores the share of query terms it contains
pub struct InMemoryRetriever {
    documents: Arc<RwLock<Vec<Document>>>,
}

impl InMemoryRetriever {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn with_climate_history() -> Self {
        let retriever = Self::new();
        for (index, text) in CLIMATE_HISTORY.iter().enumerate() {
            let metadata = HashMap::from([
                ("collection".to_string(), "weather_history".to_string()),
                ("id".to_string(), index.to_string()),
            ]);
            retriever.add(*text, metadata).await;
        }
        retriever
    }

    pub async fn add(&self, text: impl Into<String>, metadata: HashMap<String, String>) {
        let text = text.into();
        let mut documents = self.documents.write().await;
        documents.push(Document {
            terms: terms(&text),
            text,
            metadata,
        });
        tracing::debug!("[InMemoryRetriever] Indexed document #{}", documents.len());
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

impl Default for InMemoryRetriever {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Retriever for InMemoryRetriever {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Snippet>> {
        let query_terms = terms(query);
        if query_terms.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let documents = self.documents.read().await;
        let mut scored: Vec<Snippet> = documents
            .iter()
            .filter_map(|doc| {
                let hits = query_terms.intersection(&doc.terms).count();
                (hits > 0).then(|| Snippet {
                    text: doc.text.clone(),
                    score: hits as f32 / query_terms.len() as f32,
                    metadata: doc.metadata.clone(),
                })
            })
            .collect();

        // Stable sort keeps insertion order among equal scores
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(k);

        tracing::debug!(
            "[InMemoryRetriever] {} snippet(s) for '{}'",
            scored.len(),
            query
        );
        Ok(scored)
    }
}

/// Fact table held in a Vec, matching topics by substring
pub struct InMemoryFactStore {
    facts: Arc<RwLock<Vec<(String, String)>>>,
}

impl InMemoryFactStore {
    pub fn new() -> Self {
        Self {
            facts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn with_debate_facts() -> Self {
        let facts = DEBATE_FACTS
            .iter()
            .map(|(topic, fact)| (topic.to_string(), fact.to_string()))
            .collect();
        Self {
            facts: Arc::new(RwLock::new(facts)),
        }
    }

    pub async fn insert(&self, topic: impl Into<String>, fact: impl Into<String>) {
        self.facts.write().await.push((topic.into(), fact.into()));
    }
}

impl Default for InMemoryFactStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FactStore for InMemoryFactStore {
    async fn lookup(&self, topic: &str) -> Result<Vec<String>> {
        let needle = topic.trim().to_lowercase();
        let facts = self.facts.read().await;
        Ok(facts
            .iter()
            .filter(|(stored, _)| stored.to_lowercase().contains(&needle))
            .map(|(_, fact)| fact.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_ranks_by_term_overlap() {
        let retriever = InMemoryRetriever::with_climate_history().await;
        let results = retriever
            .search("historical climate of Coimbatore", 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].text.starts_with("Coimbatore historical climate"));
        assert!(results[1].text.starts_with("Coimbatore temperature trends"));
        assert!(results[0].score > results[1].score);
        assert_eq!(results[0].metadata["collection"], "weather_history");
    }

    #[tokio::test]
    async fn test_search_drops_unrelated_documents() {
        let retriever = InMemoryRetriever::with_climate_history().await;
        let results = retriever.search("stock market crash", 5).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_with_zero_k() {
        let retriever = InMemoryRetriever::with_climate_history().await;
        assert!(retriever.search("Coimbatore", 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fact_lookup_matches_substring() {
        let store = InMemoryFactStore::with_debate_facts();
        let facts = store.lookup("Renewable").await.unwrap();
        assert_eq!(facts.len(), 3);

        let facts = store.lookup("healthcare").await.unwrap();
        assert_eq!(facts.len(), 3);
        assert!(!store.has_topic("astrology").await.unwrap());
    }

    #[tokio::test]
    async fn test_fact_insert() {
        let store = InMemoryFactStore::new();
        store.insert("rust", "Rust 1.0 shipped in 2015.").await;
        assert_eq!(store.lookup("rust").await.unwrap(), vec!["Rust 1.0 shipped in 2015."]);
    }
}
