use super::error::ParseIntentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The closed set of purposes a query can be routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Intent {
    Financial,
    General,
    RealtimeWeather,
    ForecastWeather,
    HistoricalWeather,
    Facts,
}

impl Intent {
    pub const ALL: [Intent; 6] = [
        Intent::Financial,
        Intent::General,
        Intent::RealtimeWeather,
        Intent::ForecastWeather,
        Intent::HistoricalWeather,
        Intent::Facts,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Financial => "financial",
            Intent::General => "general",
            Intent::RealtimeWeather => "realtime-weather",
            Intent::ForecastWeather => "forecast-weather",
            Intent::HistoricalWeather => "historical-weather",
            Intent::Facts => "facts",
        }
    }

    pub fn is_weather(self) -> bool {
        matches!(
            self,
            Intent::RealtimeWeather | Intent::ForecastWeather | Intent::HistoricalWeather
        )
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Intent {
    type Err = ParseIntentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == wanted)
            .ok_or_else(|| ParseIntentError(s.to_string()))
    }
}
