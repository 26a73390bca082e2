//! External service clients
//!
//! Information Hiding:
//! - HTTP protocols and credential handling hidden behind capability traits
//! - Handlers depend on `TextGenerator` and `WeatherSource`, never on reqwest

pub mod llm;
pub mod weather;

pub use llm::{ChatMessage, LLMClient, TextGenerator};
pub use weather::{WeatherClient, WeatherMode, WeatherPayload, WeatherSource};
