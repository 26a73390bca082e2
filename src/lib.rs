//! Intentus - rule-based query routing for LLM-backed assistants
//!
//! This library classifies free-text queries into a fixed set of intents and
//! hands each one to the handler registered for it, together with an explicit
//! context that carries the external service clients.

pub mod cli;
pub mod config;
pub mod core;
pub mod dispatch;
pub mod handlers;
pub mod storage;
pub mod utils;

pub use config::Settings;
pub use dispatch::{
    Classification, Classifier, DispatchError, Dispatcher, FnHandler, Handler, HandlerContext,
    Intent, Response,
};

use crate::core::{LLMClient, WeatherClient};
use crate::dispatch::RuleError;
use crate::storage::{FactStore, InMemoryRetriever, SqliteFactStore};
use anyhow::{Context, Result};
use std::sync::Arc;

/// Classifier described by the settings: configured rules, or the built-in ones
pub fn build_classifier(settings: &Settings) -> Result<Classifier, RuleError> {
    match &settings.dispatch.rules {
        Some(rules) => Classifier::from_configs(rules, Intent::General),
        None => Ok(Classifier::standard()),
    }
}

/// Composition root: owns the dispatcher and the collaborators its handlers use
pub struct Runtime {
    settings: Settings,
    dispatcher: Dispatcher,
    context: HandlerContext,
}

impl Runtime {
    /// Build every collaborator from settings and environment credentials
    pub async fn init(settings: Settings) -> Result<Self> {
        let llm = LLMClient::new(Settings::api_key(), settings.llm.clone())?
            .with_secondary_key(Settings::secondary_api_key());
        let weather = WeatherClient::new(&settings.weather, Settings::weather_api_key())?;
        let retriever = InMemoryRetriever::with_climate_history().await;
        let facts = open_fact_store(&settings)?;

        let context = HandlerContext::new(
            Arc::new(llm),
            Arc::new(weather),
            Arc::new(retriever),
            facts,
        )
        .with_retrieval_top_k(settings.retrieval.top_k)
        .with_default_city(settings.weather.default_city.clone());

        let runtime = Self::with_context(settings, context)?;
        tracing::info!("Intentus runtime initialized");
        Ok(runtime)
    }

    /// Wire the default handlers around an already built context
    pub fn with_context(settings: Settings, context: HandlerContext) -> Result<Self> {
        let classifier = build_classifier(&settings).context("Invalid dispatch rules")?;
        let mut dispatcher = Dispatcher::new(classifier);
        handlers::register_defaults(&mut dispatcher);

        Ok(Self {
            settings,
            dispatcher,
            context,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn dispatcher_mut(&mut self) -> &mut Dispatcher {
        &mut self.dispatcher
    }

    pub fn context(&self) -> &HandlerContext {
        &self.context
    }

    pub async fn dispatch(&self, query: &str) -> Result<Response, DispatchError> {
        self.dispatcher.dispatch(query, &self.context).await
    }

    pub async fn dispatch_all(&self, queries: Vec<String>) -> Vec<Result<Response, DispatchError>> {
        self.dispatcher
            .dispatch_all(queries, &self.context, self.settings.dispatch.concurrency)
            .await
    }

    /// Release collaborators; the fact database closes when its last handle drops
    pub fn teardown(self) {
        drop(self.context);
        tracing::info!("Intentus runtime shutdown complete");
    }
}

fn open_fact_store(settings: &Settings) -> Result<Arc<dyn FactStore>> {
    let store = match &settings.facts.database_path {
        Some(path) => SqliteFactStore::open(path)?,
        None => SqliteFactStore::open_in_memory()?,
    };
    if settings.facts.seed {
        store.seed_defaults()?;
    }
    Ok(Arc::new(store))
}
