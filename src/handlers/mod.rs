//! Intent handlers
//!
//! Information Hiding:
//! - Argument parsing and prompt construction stay inside each handler
//! - Handlers reach external services only through `HandlerContext`

pub mod facts;
pub mod financial;
pub mod general;
pub mod historical;
pub mod weather;

pub use facts::FactsHandler;
pub use financial::FinancialHandler;
pub use general::GeneralHandler;
pub use historical::HistoricalHandler;
pub use weather::WeatherHandler;

use crate::dispatch::{Dispatcher, Intent};
use std::sync::Arc;

/// Bind the built-in handler for every intent
pub fn register_defaults(dispatcher: &mut Dispatcher) {
    dispatcher.register(Intent::Financial, Arc::new(FinancialHandler));
    dispatcher.register(Intent::General, Arc::new(GeneralHandler::new()));
    dispatcher.register(Intent::RealtimeWeather, Arc::new(WeatherHandler::realtime()));
    dispatcher.register(Intent::ForecastWeather, Arc::new(WeatherHandler::forecast()));
    dispatcher.register(Intent::HistoricalWeather, Arc::new(HistoricalHandler));
    dispatcher.register(Intent::Facts, Arc::new(FactsHandler));
}
