use anyhow::Result;
use clap::Parser;
use intentus::cli::{Cli, Commands};
use intentus::{build_classifier, utils, DispatchError, Runtime, Settings};
use std::process::ExitCode;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    dotenvy::dotenv().ok();

    let settings = Settings::new()?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify { query } => handle_classify(&settings, &query),
        Commands::Rules => handle_rules(&settings),
        Commands::Route { query, json } => {
            let runtime = Runtime::init(settings).await?;
            let result = handle_route(&runtime, &query, json).await;
            runtime.teardown();
            result
        }
        Commands::Batch { file, concurrency } => {
            let mut settings = settings;
            if let Some(concurrency) = concurrency {
                settings.dispatch.concurrency = concurrency;
            }
            let runtime = Runtime::init(settings).await?;
            let result = handle_batch(&runtime, &file).await;
            runtime.teardown();
            result
        }
    }
}

fn handle_classify(settings: &Settings, query: &str) -> Result<ExitCode> {
    let classifier = build_classifier(settings)?;
    utils::print_classification(query, &classifier.explain(query));
    Ok(ExitCode::SUCCESS)
}

fn handle_rules(settings: &Settings) -> Result<ExitCode> {
    let classifier = build_classifier(settings)?;
    utils::print_header("Classification rules (first match wins)");
    for (index, rule) in classifier.rules().iter().enumerate() {
        utils::print_rule(index + 1, rule);
    }
    utils::print_info(&format!("Default: {}", classifier.default_intent()));
    Ok(ExitCode::SUCCESS)
}

async fn handle_route(runtime: &Runtime, query: &str, json: bool) -> Result<ExitCode> {
    match runtime.dispatch(query).await {
        Ok(response) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                utils::print_response(&response);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_failure(&e)),
    }
}

async fn handle_batch(runtime: &Runtime, file: &str) -> Result<ExitCode> {
    utils::print_info(&format!(
        "Dispatching queries from {} with concurrency {}",
        file,
        runtime.settings().dispatch.concurrency
    ));

    let file = File::open(file).await?;
    let mut lines = BufReader::new(file).lines();

    let mut queries = vec![];
    while let Some(line) = lines.next_line().await? {
        if !line.trim().is_empty() {
            queries.push(line);
        }
    }

    let results = runtime.dispatch_all(queries.clone()).await;

    let mut exit = ExitCode::SUCCESS;
    for (i, (query, result)) in queries.iter().zip(results).enumerate() {
        utils::print_success(&format!("\n[{}] {}", i + 1, query));
        match result {
            Ok(response) => utils::print_response(&response),
            Err(e) => {
                if e.is_configuration() {
                    exit = ExitCode::FAILURE;
                }
                report_failure(&e);
            }
        }
    }

    Ok(exit)
}

fn report_failure(error: &DispatchError) -> ExitCode {
    match error {
        DispatchError::Configuration { .. } => {
            utils::print_error(&format!("Configuration error: {}", error));
            ExitCode::FAILURE
        }
        DispatchError::Handler(e) => {
            tracing::debug!("Handler failed: {:?}", e);
            utils::print_error(&format!("Sorry, I encountered an error: {:#}", e));
            ExitCode::SUCCESS
        }
    }
}
