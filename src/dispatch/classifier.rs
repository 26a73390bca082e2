//! Rule-based Intent Classifier
//!
//! Rules are evaluated in order and the first match wins, so the order of the
//! list decides overlapping queries. Evaluation is pure: no I/O, no state.

use super::error::RuleError;
use super::intent::Intent;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

/// Words that put a query in weather territory
const WEATHER_CONTEXT: &[&str] = &[
    "weather",
    "temperature",
    "forecast",
    "rain",
    "raining",
    "climate",
    "humidity",
    "humid",
    "wind",
    "snow",
    "sunny",
    "storm",
];

/// Lower-case and collapse whitespace so phrases match across spacing
pub fn normalize(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Phrase occurs in `haystack` with word boundaries on both sides
fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    haystack.match_indices(phrase).any(|(start, _)| {
        let end = start + phrase.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

#[derive(Debug, Clone)]
pub enum Predicate {
    /// Any keyword or phrase is present as whole words
    Any(Vec<String>),
    /// Every sub-predicate holds
    All(Vec<Predicate>),
    /// Case-insensitive regular expression
    Pattern(Regex),
}

impl Predicate {
    pub fn any<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Predicate::Any(
            keywords
                .into_iter()
                .map(|k| normalize(k.as_ref()))
                .filter(|k| !k.is_empty())
                .collect(),
        )
    }

    pub fn all(predicates: Vec<Predicate>) -> Self {
        Predicate::All(predicates)
    }

    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map(Predicate::Pattern)
    }

    /// Evaluate against an already normalized query
    pub fn matches(&self, normalized: &str) -> bool {
        match self {
            Predicate::Any(keywords) => keywords.iter().any(|k| contains_phrase(normalized, k)),
            Predicate::All(predicates) => {
                !predicates.is_empty() && predicates.iter().all(|p| p.matches(normalized))
            }
            Predicate::Pattern(regex) => regex.is_match(normalized),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub intent: Intent,
    pub predicate: Predicate,
}

impl Rule {
    pub fn new(name: impl Into<String>, intent: Intent, predicate: Predicate) -> Self {
        Self {
            name: name.into(),
            intent,
            predicate,
        }
    }
}

/// Declarative rule as written in configuration.
///
/// A rule matches when every populated field matches: any of `keywords`,
/// any of `context`, and `pattern`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleConfig {
    pub name: String,
    pub intent: Intent,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub context: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
}

impl RuleConfig {
    pub fn compile(&self) -> Result<Rule, RuleError> {
        let mut parts = Vec::new();
        if !self.keywords.is_empty() {
            parts.push(Predicate::any(&self.keywords));
        }
        if !self.context.is_empty() {
            parts.push(Predicate::any(&self.context));
        }
        if let Some(pattern) = &self.pattern {
            let predicate = Predicate::pattern(pattern).map_err(|source| RuleError::InvalidPattern {
                rule: self.name.clone(),
                source,
            })?;
            parts.push(predicate);
        }

        let predicate = match parts.len() {
            0 => return Err(RuleError::Empty(self.name.clone())),
            1 => parts.remove(0),
            _ => Predicate::all(parts),
        };
        Ok(Rule::new(self.name.clone(), self.intent, predicate))
    }
}

/// Outcome of classifying one query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub intent: Intent,
    /// Winning rule, `None` when the default intent was used
    pub rule: Option<String>,
    /// Other intents whose rules also matched but lost on order
    pub shadowed: Vec<Intent>,
}

impl Classification {
    pub fn is_default(&self) -> bool {
        self.rule.is_none()
    }

    pub fn is_ambiguous(&self) -> bool {
        !self.shadowed.is_empty()
    }
}

/// Ordered rule list with a fallback intent
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<Rule>,
    default_intent: Intent,
}

impl Classifier {
    pub fn new(rules: Vec<Rule>, default_intent: Intent) -> Self {
        Self {
            rules,
            default_intent,
        }
    }

    /// Built-in rules: financial, facts, then the weather family
    /// (realtime before forecast before historical), defaulting to general
    pub fn standard() -> Self {
        let weather = || Predicate::any(WEATHER_CONTEXT);

        let rules = vec![
            Rule::new(
                "financial",
                Intent::Financial,
                Predicate::any([
                    "simple interest",
                    "compound interest",
                    "future value",
                    "present value",
                ]),
            ),
            Rule::new(
                "facts",
                Intent::Facts,
                Predicate::any(["facts about", "fact about", "facts on", "facts for", "statistics on"]),
            ),
            Rule::new(
                "weather-realtime",
                Intent::RealtimeWeather,
                Predicate::all(vec![
                    weather(),
                    Predicate::any(["current", "currently", "today", "now", "right now"]),
                ]),
            ),
            Rule::new(
                "weather-forecast",
                Intent::ForecastWeather,
                Predicate::all(vec![
                    weather(),
                    Predicate::any(["forecast", "tomorrow", "next", "will it", "upcoming"]),
                ]),
            ),
            Rule::new(
                "weather-historical",
                Intent::HistoricalWeather,
                Predicate::all(vec![
                    weather(),
                    Predicate::any(["historical", "history", "climate", "past", "trends", "average"]),
                ]),
            ),
            Rule::new("weather-any", Intent::RealtimeWeather, weather()),
        ];

        Self::new(rules, Intent::General)
    }

    pub fn from_configs(configs: &[RuleConfig], default_intent: Intent) -> Result<Self, RuleError> {
        let rules = configs
            .iter()
            .map(RuleConfig::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(rules, default_intent))
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn default_intent(&self) -> Intent {
        self.default_intent
    }

    pub fn classify(&self, query: &str) -> Intent {
        let normalized = normalize(query);
        self.rules
            .iter()
            .find(|rule| rule.predicate.matches(&normalized))
            .map(|rule| rule.intent)
            .unwrap_or(self.default_intent)
    }

    /// Same decision as [`classify`](Self::classify) plus which rule won and what it shadowed
    pub fn explain(&self, query: &str) -> Classification {
        let normalized = normalize(query);
        let mut matched = self
            .rules
            .iter()
            .filter(|rule| rule.predicate.matches(&normalized));

        let Some(winner) = matched.next() else {
            return Classification {
                intent: self.default_intent,
                rule: None,
                shadowed: Vec::new(),
            };
        };

        let mut shadowed = Vec::new();
        for rule in matched {
            if rule.intent != winner.intent && !shadowed.contains(&rule.intent) {
                shadowed.push(rule.intent);
            }
        }

        Classification {
            intent: winner.intent,
            rule: Some(winner.name.clone()),
            shadowed,
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::standard()
    }
}
