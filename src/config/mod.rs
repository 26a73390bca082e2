mod settings;

pub use settings::{
    DispatchConfig, FactsConfig, LLMConfig, LoggingConfig, RetrievalConfig, Settings,
    WeatherConfig,
};
