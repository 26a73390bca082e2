//! Financial calculator for interest and time-value-of-money questions

use crate::dispatch::{Handler, HandlerContext, Response};
use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use serde_json::json;

/// principal, rate%, time
static THREE_ARGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.?\d*).+?(\d+\.?\d*)%.+?(\d+)").expect("three-argument regex is valid")
});

/// principal, rate%, time, periods
static FOUR_ARGS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+\.?\d*).+?(\d+\.?\d*)%.+?(\d+).+?(\d+)").expect("four-argument regex is valid")
});

const UNPARSED: &str = "I couldn't parse your financial query. Please provide it clearly.";

pub fn simple_interest(principal: f64, rate: f64, time: f64) -> f64 {
    principal * (rate / 100.0) * time
}

pub fn compound_interest(principal: f64, rate: f64, time: f64, periods: u32) -> f64 {
    let periods = f64::from(periods);
    let amount = principal * (1.0 + (rate / 100.0) / periods).powf(periods * time);
    amount - principal
}

pub fn future_value(principal: f64, rate: f64, time: f64) -> f64 {
    principal * (1.0 + rate / 100.0).powf(time)
}

pub fn present_value(future: f64, rate: f64, time: f64) -> f64 {
    future / (1.0 + rate / 100.0).powf(time)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "calculation", rename_all = "snake_case")]
pub enum Calculation {
    SimpleInterest { principal: f64, rate: f64, time: f64 },
    CompoundInterest { principal: f64, rate: f64, time: f64, periods: u32 },
    FutureValue { principal: f64, rate: f64, time: f64 },
    PresentValue { future_value: f64, rate: f64, time: f64 },
}

fn numbers<const N: usize>(regex: &Regex, text: &str) -> Option<[f64; N]> {
    let captures = regex.captures(text)?;
    let mut values = [0.0; N];
    for (slot, value) in values.iter_mut().enumerate() {
        *value = captures.get(slot + 1)?.as_str().parse().ok()?;
    }
    Some(values)
}

impl Calculation {
    /// Pick the calculation by phrase, then pull its arguments out in order
    pub fn parse(query: &str) -> Option<Self> {
        let query = query.to_lowercase();

        if query.contains("simple interest") {
            let [principal, rate, time] = numbers(&THREE_ARGS, &query)?;
            Some(Calculation::SimpleInterest { principal, rate, time })
        } else if query.contains("compound interest") {
            let [principal, rate, time, periods] = numbers(&FOUR_ARGS, &query)?;
            if periods < 1.0 {
                return None;
            }
            Some(Calculation::CompoundInterest {
                principal,
                rate,
                time,
                periods: periods as u32,
            })
        } else if query.contains("future value") {
            let [principal, rate, time] = numbers(&THREE_ARGS, &query)?;
            Some(Calculation::FutureValue { principal, rate, time })
        } else if query.contains("present value") {
            let [future_value, rate, time] = numbers(&THREE_ARGS, &query)?;
            Some(Calculation::PresentValue { future_value, rate, time })
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Calculation::SimpleInterest { .. } => "Simple Interest",
            Calculation::CompoundInterest { .. } => "Compound Interest",
            Calculation::FutureValue { .. } => "Future Value",
            Calculation::PresentValue { .. } => "Present Value",
        }
    }

    pub fn evaluate(&self) -> f64 {
        match *self {
            Calculation::SimpleInterest { principal, rate, time } => {
                simple_interest(principal, rate, time)
            }
            Calculation::CompoundInterest {
                principal,
                rate,
                time,
                periods,
            } => compound_interest(principal, rate, time, periods),
            Calculation::FutureValue { principal, rate, time } => {
                future_value(principal, rate, time)
            }
            Calculation::PresentValue {
                future_value: fv,
                rate,
                time,
            } => present_value(fv, rate, time),
        }
    }
}

pub struct FinancialHandler;

#[async_trait]
impl Handler for FinancialHandler {
    async fn handle(&self, query: &str, _ctx: &HandlerContext) -> Result<Response> {
        let Some(calculation) = Calculation::parse(query) else {
            tracing::debug!("[FinancialHandler] Could not parse arguments from '{}'", query);
            return Ok(Response::text(UNPARSED));
        };

        let result = calculation.evaluate();
        let summary = format!("{} = {:.2}", calculation.label(), result);
        Ok(Response::structured(
            summary,
            json!({
                "input": calculation,
                "result": (result * 100.0).round() / 100.0,
            }),
        ))
    }
}
