//! Integration tests for Intentus
//!
//! These tests exercise the full dispatch path without real API keys: the
//! weather service is mocked over HTTP and the text generator is a fake.

use anyhow::Result;
use async_trait::async_trait;
use intentus::config::WeatherConfig;
use intentus::core::{ChatMessage, TextGenerator, WeatherClient};
use intentus::storage::{InMemoryRetriever, SqliteFactStore};
use intentus::{DispatchError, HandlerContext, Intent, Response, Runtime, Settings};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::tempdir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers every prompt with the last user message reversed
#[derive(Default)]
struct MirrorGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl TextGenerator for MirrorGenerator {
    async fn generate(&self, messages: Vec<ChatMessage>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(last.chars().rev().collect())
    }
}

struct DownGenerator;

#[async_trait]
impl TextGenerator for DownGenerator {
    async fn generate(&self, _messages: Vec<ChatMessage>) -> Result<String> {
        Err(anyhow::anyhow!("API error 429: quota exhausted"))
    }
}

async fn runtime_with(server: &MockServer, llm: Arc<dyn TextGenerator>) -> Runtime {
    let weather_config = WeatherConfig {
        base_url: server.uri(),
        ..WeatherConfig::default()
    };
    let weather = WeatherClient::new(&weather_config, "test-key".to_string()).unwrap();
    let facts = SqliteFactStore::open_in_memory().unwrap();
    facts.seed_defaults().unwrap();

    let context = HandlerContext::new(
        llm,
        Arc::new(weather),
        Arc::new(InMemoryRetriever::with_climate_history().await),
        Arc::new(facts),
    );

    Runtime::with_context(Settings::default(), context).unwrap()
}

#[tokio::test]
async fn test_compound_interest_scenario() {
    let server = MockServer::start().await;
    let llm = Arc::new(MirrorGenerator::default());
    let runtime = runtime_with(&server, llm.clone()).await;

    let query = "What is the compound interest on 1000 at 5% for 2 years with 4 periods?";
    assert_eq!(runtime.dispatcher().classify(query), Intent::Financial);

    let response = runtime.dispatch(query).await.unwrap();
    assert_eq!(response.summary(), "Compound Interest = 104.49");
    assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_current_weather_scenario() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("appid", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Paris",
            "main": {"temp": 17.8, "humidity": 71},
            "weather": [{"description": "broken clouds"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let runtime = runtime_with(&server, Arc::new(MirrorGenerator::default())).await;
    let query = "current weather in Paris";
    assert_eq!(runtime.dispatcher().classify(query), Intent::RealtimeWeather);

    let response = runtime.dispatch(query).await.unwrap();
    assert_eq!(
        response.summary(),
        "Current weather in Paris is 18°C with broken clouds. Humidity: 71%"
    );
    let payload = response.payload().unwrap();
    assert_eq!(payload["city"], "Paris");
    assert_eq!(payload["mode"], "current");
}

#[tokio::test]
async fn test_forecast_for_unknown_city() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let runtime = runtime_with(&server, Arc::new(MirrorGenerator::default())).await;
    let response = runtime
        .dispatch("What's the weather forecast for Atlantis?")
        .await
        .unwrap();

    assert_eq!(response, Response::text("Sorry, City 'Atlantis' not found"));
}

#[tokio::test]
async fn test_historical_climate_scenario() {
    let server = MockServer::start().await;
    let runtime = runtime_with(&server, Arc::new(MirrorGenerator::default())).await;

    let query = "historical climate of Coimbatore";
    assert_eq!(runtime.dispatcher().classify(query), Intent::HistoricalWeather);

    let response = runtime.dispatch(query).await.unwrap();
    assert!(response.summary().contains("monsoon season June-September"));
    // No HTTP traffic for history questions
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_facts_from_sqlite_store() {
    let server = MockServer::start().await;
    let runtime = runtime_with(&server, Arc::new(MirrorGenerator::default())).await;

    let response = runtime
        .dispatch("Give me facts about renewable energy")
        .await
        .unwrap();

    let payload = response.payload().unwrap();
    assert_eq!(payload["topic"], "renewable energy");
    assert_eq!(payload["facts"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_general_queries_reach_text_generator() {
    let server = MockServer::start().await;
    let llm = Arc::new(MirrorGenerator::default());
    let runtime = runtime_with(&server, llm.clone()).await;

    let response = runtime.dispatch("abc").await.unwrap();
    assert_eq!(response, Response::text("cba"));
    assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_generator_failure_surfaces_unchanged() {
    let server = MockServer::start().await;
    let runtime = runtime_with(&server, Arc::new(DownGenerator)).await;

    let err = runtime.dispatch("write me a haiku").await.unwrap_err();
    match err {
        DispatchError::Handler(e) => {
            assert!(format!("{:#}", e).contains("quota exhausted"));
        }
        other => panic!("expected handler failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_configured_rules_replace_defaults() {
    let server = MockServer::start().await;
    let mut settings = Settings::default();
    settings.dispatch.rules = Some(vec![intentus::dispatch::RuleConfig {
        name: "only-facts".to_string(),
        intent: Intent::Facts,
        keywords: vec!["tell me about".to_string()],
        context: vec![],
        pattern: None,
    }]);

    let weather_config = WeatherConfig {
        base_url: server.uri(),
        ..WeatherConfig::default()
    };
    let context = HandlerContext::new(
        Arc::new(MirrorGenerator::default()),
        Arc::new(WeatherClient::new(&weather_config, "k".to_string()).unwrap()),
        Arc::new(InMemoryRetriever::new()),
        Arc::new(SqliteFactStore::open_in_memory().unwrap()),
    );
    let runtime = Runtime::with_context(settings, context).unwrap();

    assert_eq!(
        runtime.dispatcher().classify("tell me about artificial intelligence"),
        Intent::Facts
    );
    // Financial phrases are no longer special
    assert_eq!(
        runtime.dispatcher().classify("simple interest on 100 at 1% for 1 year"),
        Intent::General
    );
}

#[tokio::test]
async fn test_batch_dispatch_in_input_order() {
    let server = MockServer::start().await;
    let runtime = runtime_with(&server, Arc::new(MirrorGenerator::default())).await;

    let results = runtime
        .dispatch_all(vec![
            "simple interest on 1000 at 5% for 2 years".to_string(),
            "xyz".to_string(),
            "facts about climate change".to_string(),
        ])
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(
        results[0].as_ref().unwrap().summary(),
        "Simple Interest = 100.00"
    );
    assert_eq!(results[1].as_ref().unwrap(), &Response::text("zyx"));
    assert_eq!(results[2].as_ref().unwrap().summary().lines().count(), 6);
}

#[tokio::test]
async fn test_file_backed_fact_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("facts.db");

    let store = SqliteFactStore::open(&db).unwrap();
    store.insert("rust", "Rust has no garbage collector.").unwrap();
    drop(store);

    let reopened = SqliteFactStore::open(&db).unwrap();
    assert_eq!(reopened.count().unwrap(), 1);
}

#[tokio::test]
async fn test_runtime_without_credentials_serves_offline_intents() {
    for key in ["OPENWEATHER_API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY", "GEMINI_API_KEY_SECONDARY"] {
        std::env::remove_var(key);
    }
    let mut settings = Settings::default();
    settings.facts.database_path = None;

    let runtime = Runtime::init(settings).await.unwrap();

    let response = runtime
        .dispatch("simple interest on 100 at 5% for 2 years")
        .await
        .unwrap();
    assert_eq!(response.summary(), "Simple Interest = 10.00");

    // Only the call that needs the missing key fails
    let err = runtime
        .dispatch("current weather in Paris")
        .await
        .unwrap_err();
    assert!(matches!(err, DispatchError::Handler(_)));
    assert!(err.to_string().contains("OPENWEATHER_API_KEY"));

    let facts = runtime.dispatch("facts about renewable energy").await.unwrap();
    assert_eq!(facts.payload().unwrap()["facts"].as_array().unwrap().len(), 3);
}
