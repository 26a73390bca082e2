//! Query Dispatcher - rule-based intent classification and handler routing
//!
//! - Classifies each query into exactly one intent with an ordered rule list
//! - Hands the query and an explicit `HandlerContext` to the registered handler
//! - "One-way ticket": one classification, one handler call, no retries
//!
//! Information Hiding:
//! - Hides rule evaluation and handler lookup
//! - Handler errors pass through untouched; retry policy belongs to handlers

pub mod classifier;
pub mod error;
pub mod handler;
pub mod intent;
pub mod response;

pub use classifier::{Classification, Classifier, Predicate, Rule, RuleConfig};
pub use error::{DispatchError, ParseIntentError, RuleError};
pub use handler::{FnHandler, Handler, HandlerContext};
pub use intent::Intent;
pub use response::Response;

use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;

/// Classifier plus intent → handler registry
pub struct Dispatcher {
    classifier: Classifier,
    handlers: HashMap<Intent, Arc<dyn Handler>>,
}

impl Dispatcher {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            handlers: HashMap::new(),
        }
    }

    /// Bind a handler to an intent.
    ///
    /// Registering the same intent again replaces the earlier handler (last
    /// write wins); the replaced handler is returned.
    pub fn register(
        &mut self,
        intent: Intent,
        handler: Arc<dyn Handler>,
    ) -> Option<Arc<dyn Handler>> {
        let previous = self.handlers.insert(intent, handler);
        if previous.is_some() {
            tracing::info!("[Dispatcher] Replaced handler for intent '{}'", intent);
        } else {
            tracing::info!("[Dispatcher] Registered handler for intent '{}'", intent);
        }
        previous
    }

    pub fn has_handler(&self, intent: Intent) -> bool {
        self.handlers.contains_key(&intent)
    }

    /// Intents with a handler, in enum order
    pub fn registered_intents(&self) -> Vec<Intent> {
        let mut intents: Vec<Intent> = self.handlers.keys().copied().collect();
        intents.sort();
        intents
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn classify(&self, query: &str) -> Intent {
        self.classifier.classify(query)
    }

    pub fn explain(&self, query: &str) -> Classification {
        self.classifier.explain(query)
    }

    /// Classify `query` and return whatever its handler returns
    pub async fn dispatch(
        &self,
        query: &str,
        ctx: &HandlerContext,
    ) -> Result<Response, DispatchError> {
        let classification = self.classifier.explain(query);
        let intent = classification.intent;

        tracing::debug!(
            "[Dispatcher] Routing to '{}' via {}",
            intent,
            classification.rule.as_deref().unwrap_or("default")
        );
        if classification.is_ambiguous() {
            tracing::debug!(
                "[Dispatcher] Query also matched {:?}; kept '{}' by rule order",
                classification.shadowed,
                intent
            );
        }

        let handler = self
            .handlers
            .get(&intent)
            .ok_or(DispatchError::Configuration { intent })?;

        handler
            .handle(query, ctx)
            .await
            .map_err(DispatchError::Handler)
    }

    /// Dispatch independent queries concurrently; results keep input order
    pub async fn dispatch_all(
        &self,
        queries: Vec<String>,
        ctx: &HandlerContext,
        concurrency: usize,
    ) -> Vec<Result<Response, DispatchError>> {
        let mut results: Vec<(usize, Result<Response, DispatchError>)> =
            stream::iter(queries.into_iter().enumerate())
                .map(|(index, query)| async move { (index, self.dispatch(&query, ctx).await) })
                .buffer_unordered(concurrency.max(1))
                .collect()
                .await;

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, result)| result).collect()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(Classifier::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::handler::testing;
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls and answers with its own label
    struct Tagged {
        label: &'static str,
        calls: AtomicUsize,
    }

    impl Tagged {
        fn new(label: &'static str) -> Arc<Self> {
            Arc::new(Self {
                label,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl Handler for Tagged {
        async fn handle(&self, query: &str, _ctx: &HandlerContext) -> anyhow::Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Response::text(format!("{}: {}", self.label, query)))
        }
    }

    struct Failing {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Handler for Failing {
        async fn handle(&self, _query: &str, _ctx: &HandlerContext) -> anyhow::Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow::anyhow!("quota exceeded"))
        }
    }

    #[tokio::test]
    async fn test_dispatch_routes_to_classified_handler() {
        let general = Tagged::new("general");
        let financial = Tagged::new("financial");
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(Intent::General, general.clone());
        dispatcher.register(Intent::Financial, financial.clone());

        let ctx = testing::context();
        let response = dispatcher
            .dispatch("simple interest on 100 at 5% for 2 years", &ctx)
            .await
            .unwrap();

        assert_eq!(
            response,
            Response::text("financial: simple interest on 100 at 5% for 2 years")
        );
        assert_eq!(financial.calls.load(Ordering::SeqCst), 1);
        assert_eq!(general.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_register_overwrites_previous_handler() {
        let first = Tagged::new("first");
        let second = Tagged::new("second");
        let mut dispatcher = Dispatcher::default();

        assert!(dispatcher.register(Intent::General, first.clone()).is_none());
        assert!(dispatcher.register(Intent::General, second.clone()).is_some());

        let ctx = testing::context();
        let response = dispatcher.dispatch("hello there", &ctx).await.unwrap();

        assert_eq!(response.summary(), "second: hello there");
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_handler_is_configuration_error() {
        let general = Tagged::new("general");
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(Intent::General, general.clone());

        let ctx = testing::context();
        let err = dispatcher
            .dispatch("current weather in Paris", &ctx)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            DispatchError::Configuration {
                intent: Intent::RealtimeWeather
            }
        ));
        assert_eq!(
            err.to_string(),
            "no handler registered for intent 'realtime-weather'"
        );
        assert_eq!(general.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_handler_failure_passes_through_without_retry() {
        let failing = Arc::new(Failing {
            calls: AtomicUsize::new(0),
        });
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(Intent::General, failing.clone());

        let ctx = testing::context();
        let err = dispatcher.dispatch("tell me a story", &ctx).await.unwrap_err();

        assert!(matches!(err, DispatchError::Handler(_)));
        assert_eq!(err.to_string(), "quota exceeded");
        assert_eq!(failing.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_dispatch_is_repeatable_for_pure_handlers() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(
            Intent::General,
            Arc::new(FnHandler::new(|query: &str| {
                Ok(Response::text(query.to_uppercase()))
            })),
        );

        let ctx = testing::context();
        let first = dispatcher.dispatch("same input", &ctx).await.unwrap();
        let second = dispatcher.dispatch("same input", &ctx).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_dispatch_all_keeps_input_order() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(Intent::General, Tagged::new("general"));
        dispatcher.register(Intent::Financial, Tagged::new("financial"));

        let ctx = testing::context();
        let queries = vec![
            "hello".to_string(),
            "future value of 10 at 1% for 1 year".to_string(),
            "current weather in Paris".to_string(),
        ];
        let results = dispatcher.dispatch_all(queries, &ctx, 3).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().summary(), "general: hello");
        assert!(results[1].as_ref().unwrap().summary().starts_with("financial:"));
        assert!(results[2].as_ref().unwrap_err().is_configuration());
    }

    #[test]
    fn test_registered_intents_sorted() {
        let mut dispatcher = Dispatcher::default();
        dispatcher.register(Intent::Facts, Tagged::new("facts"));
        dispatcher.register(Intent::Financial, Tagged::new("financial"));

        assert_eq!(
            dispatcher.registered_intents(),
            vec![Intent::Financial, Intent::Facts]
        );
        assert!(dispatcher.has_handler(Intent::Facts));
        assert!(!dispatcher.has_handler(Intent::General));
    }
}
