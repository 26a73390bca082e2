use super::intent::Intent;
use thiserror::Error;

/// Failures surfaced by [`Dispatcher::dispatch`](super::Dispatcher::dispatch)
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The query classified to an intent nobody registered a handler for
    #[error("no handler registered for intent '{intent}'")]
    Configuration { intent: Intent },

    /// The handler or one of its collaborators failed; passed through as-is
    #[error(transparent)]
    Handler(anyhow::Error),
}

impl DispatchError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, DispatchError::Configuration { .. })
    }
}

#[derive(Debug, Error)]
pub enum RuleError {
    #[error("invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    #[error("rule '{0}' needs at least one of keywords, context or pattern")]
    Empty(String),
}

#[derive(Debug, Error)]
#[error("unknown intent '{0}'")]
pub struct ParseIntentError(pub String);
