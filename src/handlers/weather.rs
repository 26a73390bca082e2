//! Real-time and forecast weather handlers

use crate::core::weather::WeatherMode;
use crate::dispatch::{Handler, HandlerContext, Response};
use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;

/// Ends a city name: a trailing time word, punctuation, or end of input
const CITY_END: &str = r"(?:\s+(?:for|today|tonight|tomorrow|now|right now|this|next|on|in|at|over|during)\b|\s*[?.!,]|\s*$)";

/// Words that introduce a city name
static CITY_HEADS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"(?i)\b(?:weather|forecast|temperature|climate|rain|humidity)\s+(?:in|for|at|of)\s+",
        r"(?i)\b(?:in|for|at)\s+",
    ]
    .iter()
    .map(|head| Regex::new(head).expect("city pattern is valid"))
    .collect()
});

/// City name anchored right after a head, shortest run of letters up to `CITY_END`
static CITY_BODY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!("{}{}", r"(?i)^(\p{L}[\p{L} '-]*?)", CITY_END)).expect("city pattern is valid")
});

/// "Tokyo weather", "Paris's forecast"
static CITY_BEFORE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\p{L}[\p{L}'-]*?)(?:'s)?\s+(?:weather|forecast|temperature)\b")
        .expect("city pattern is valid")
});

const NOT_A_CITY: &[&str] = &[
    "a", "an", "the", "my", "me", "it", "what", "what's", "whats", "how", "current", "currently",
    "today", "tonight", "tomorrow", "now", "right now", "this week", "next week", "weather",
    "forecast", "there", "here", "local",
];

/// Where and what kind of weather the user asked about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherRequest {
    pub city: String,
    pub mode: WeatherMode,
}

impl WeatherRequest {
    pub fn from_query(query: &str, mode: WeatherMode, default_city: &str) -> Self {
        let city = extract_city(query).unwrap_or_else(|| default_city.to_string());
        Self { city, mode }
    }
}

/// First plausible city name in the query.
///
/// Every head occurrence is tried in order, so "at the moment in Paris"
/// skips "the moment" and lands on "Paris".
pub fn extract_city(query: &str) -> Option<String> {
    CITY_HEADS
        .iter()
        .find_map(|head| {
            head.find_iter(query).find_map(|m| {
                let captures = CITY_BODY.captures(&query[m.end()..])?;
                accept_city(captures.get(1)?.as_str())
            })
        })
        .or_else(|| {
            CITY_BEFORE_KEYWORD
                .captures_iter(query)
                .find_map(|captures| accept_city(captures.get(1)?.as_str()))
        })
}

fn accept_city(candidate: &str) -> Option<String> {
    let city = candidate.trim();
    let lowered = city.to_lowercase();
    let first_word = lowered.split_whitespace().next()?;
    if NOT_A_CITY.contains(&lowered.as_str()) || NOT_A_CITY.contains(&first_word) {
        return None;
    }
    tracing::debug!("[WeatherHandler] Extracted city: {}", city);
    Some(city.to_string())
}

pub struct WeatherHandler {
    mode: WeatherMode,
}

impl WeatherHandler {
    pub fn new(mode: WeatherMode) -> Self {
        Self { mode }
    }

    pub fn realtime() -> Self {
        Self::new(WeatherMode::Current)
    }

    pub fn forecast() -> Self {
        Self::new(WeatherMode::Forecast)
    }
}

#[async_trait]
impl Handler for WeatherHandler {
    async fn handle(&self, query: &str, ctx: &HandlerContext) -> Result<Response> {
        let request = WeatherRequest::from_query(query, self.mode, &ctx.default_city);
        let payload = ctx.weather.fetch(&request.city, request.mode).await?;

        let summary = payload.summary();
        if payload.is_error() {
            return Ok(Response::text(summary));
        }

        Ok(Response::structured(
            summary,
            json!({
                "city": request.city,
                "mode": request.mode,
                "data": payload,
            }),
        ))
    }
}
