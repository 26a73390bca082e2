use crate::config::WeatherConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherMode {
    Current,
    Forecast,
}

impl WeatherMode {
    fn endpoint(self) -> &'static str {
        match self {
            WeatherMode::Current => "weather",
            WeatherMode::Forecast => "forecast",
        }
    }
}

impl fmt::Display for WeatherMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WeatherMode::Current => write!(f, "current"),
            WeatherMode::Forecast => write!(f, "forecast"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temp: f64,
    #[serde(default)]
    pub humidity: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    pub name: String,
    pub main: Readings,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastCity {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    #[serde(default)]
    pub dt_txt: Option<String>,
    pub main: Readings,
    #[serde(default)]
    pub weather: Vec<Condition>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReport {
    pub city: ForecastCity,
    #[serde(default)]
    pub list: Vec<ForecastEntry>,
}

/// Weather data as returned by the service, or the service's refusal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WeatherPayload {
    Current(CurrentWeather),
    Forecast(ForecastReport),
    Error { message: String },
}

fn describe(conditions: &[Condition]) -> &str {
    conditions
        .first()
        .map(|c| c.description.as_str())
        .unwrap_or("unknown conditions")
}

impl WeatherPayload {
    pub fn summary(&self) -> String {
        match self {
            WeatherPayload::Current(current) => {
                let mut text = format!(
                    "Current weather in {} is {:.0}°C with {}.",
                    current.name,
                    current.main.temp,
                    describe(&current.weather)
                );
                if let Some(humidity) = current.main.humidity {
                    text.push_str(&format!(" Humidity: {:.0}%", humidity));
                }
                text
            }
            WeatherPayload::Forecast(report) => match report.list.first() {
                Some(entry) => format!(
                    "Weather forecast for {}: {:.0}°C with {}",
                    report.city.name,
                    entry.main.temp,
                    describe(&entry.weather)
                ),
                None => format!("No forecast data available for {}.", report.city.name),
            },
            WeatherPayload::Error { message } => format!("Sorry, {}", message),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, WeatherPayload::Error { .. })
    }
}

/// Location-based weather lookup consumed by the weather handlers
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self, city: &str, mode: WeatherMode) -> Result<WeatherPayload>;
}

/// OpenWeather REST client
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl WeatherClient {
    /// Build a client; without a key every fetch fails instead of construction
    pub fn new(config: &WeatherConfig, api_key: impl Into<Option<String>>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client for weather service")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into().filter(|key| !key.trim().is_empty()),
        })
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn fetch(&self, city: &str, mode: WeatherMode) -> Result<WeatherPayload> {
        let api_key = self
            .api_key
            .as_deref()
            .context("OPENWEATHER_API_KEY environment variable not set")?;
        let url = format!("{}/{}", self.base_url, mode.endpoint());
        tracing::info!("[WeatherClient] Fetching {} data for {}", mode, city);

        let response = self
            .client
            .get(&url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .send()
            .await
            .with_context(|| format!("Weather request for '{}' failed", city))?;

        let status = response.status();
        let message = match status {
            s if s.is_success() => None,
            StatusCode::UNAUTHORIZED => Some("Invalid API key".to_string()),
            StatusCode::NOT_FOUND => Some(format!("City '{}' not found", city)),
            other => Some(format!("API error: {}", other.as_u16())),
        };
        if let Some(message) = message {
            tracing::warn!("[WeatherClient] {} ({})", message, status);
            return Ok(WeatherPayload::Error { message });
        }

        let payload = match mode {
            WeatherMode::Current => WeatherPayload::Current(
                response
                    .json::<CurrentWeather>()
                    .await
                    .context("Failed to decode current weather")?,
            ),
            WeatherMode::Forecast => WeatherPayload::Forecast(
                response
                    .json::<ForecastReport>()
                    .await
                    .context("Failed to decode weather forecast")?,
            ),
        };

        tracing::info!("[WeatherClient] Successfully fetched data for {}", city);
        Ok(payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WeatherClient {
        let config = WeatherConfig {
            base_url: server.uri(),
            ..WeatherConfig::default()
        };
        WeatherClient::new(&config, "test-key".to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_current_weather() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/weather"))
            .and(query_param("q", "Paris"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "Paris",
                "main": {"temp": 18.4, "humidity": 62},
                "weather": [{"description": "light rain"}]
            })))
            .mount(&server)
            .await;

        let payload = client_for(&server)
            .fetch("Paris", WeatherMode::Current)
            .await
            .unwrap();

        assert_eq!(
            payload.summary(),
            "Current weather in Paris is 18°C with light rain. Humidity: 62%"
        );
    }

    #[tokio::test]
    async fn test_fetch_forecast_uses_first_entry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "city": {"name": "London"},
                "list": [
                    {"dt_txt": "2024-05-01 12:00:00", "main": {"temp": 14.6}, "weather": [{"description": "overcast clouds"}]},
                    {"dt_txt": "2024-05-01 15:00:00", "main": {"temp": 16.0}, "weather": [{"description": "clear sky"}]}
                ]
            })))
            .mount(&server)
            .await;

        let payload = client_for(&server)
            .fetch("London", WeatherMode::Forecast)
            .await
            .unwrap();

        assert_eq!(
            payload.summary(),
            "Weather forecast for London: 15°C with overcast clouds"
        );
    }

    #[tokio::test]
    async fn test_unknown_city_becomes_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let payload = client_for(&server)
            .fetch("Atlantis", WeatherMode::Current)
            .await
            .unwrap();

        assert!(payload.is_error());
        assert_eq!(payload.summary(), "Sorry, City 'Atlantis' not found");
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let config = WeatherConfig {
            base_url: server.uri(),
            ..WeatherConfig::default()
        };
        let client = WeatherClient::new(&config, None::<String>).unwrap();
        let err = client.fetch("Paris", WeatherMode::Current).await.unwrap_err();
        assert!(err.to_string().contains("OPENWEATHER_API_KEY"));
    }

    #[tokio::test]
    async fn test_rejected_key_becomes_error_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let payload = client_for(&server)
            .fetch("Paris", WeatherMode::Current)
            .await
            .unwrap();

        assert_eq!(
            payload,
            WeatherPayload::Error {
                message: "Invalid API key".to_string()
            }
        );
    }
}
