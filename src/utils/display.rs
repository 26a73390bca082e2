use crate::dispatch::{Classification, Response, Rule};
use colored::*;

pub fn print_header(text: &str) {
    println!("\n{}", text.bright_cyan().bold());
    println!("{}", "=".repeat(text.chars().count()).bright_cyan());
}

pub fn print_success(text: &str) {
    println!("{}", text.green());
}

pub fn print_error(text: &str) {
    eprintln!("{}", text.red().bold());
}

pub fn print_info(text: &str) {
    println!("{}", text.blue());
}

pub fn print_classification(query: &str, classification: &Classification) {
    println!("{} {}", "Query:".bold(), query);
    println!(
        "{} {}",
        "Intent:".bold(),
        classification.intent.to_string().green().bold()
    );
    match &classification.rule {
        Some(rule) => println!("{} {}", "Rule:".bold(), rule),
        None => println!("{} {}", "Rule:".bold(), "(default)".dimmed()),
    }
    if classification.is_ambiguous() {
        let shadowed: Vec<String> = classification
            .shadowed
            .iter()
            .map(ToString::to_string)
            .collect();
        println!(
            "{} {}",
            "Also matched:".yellow(),
            shadowed.join(", ").yellow()
        );
    }
}

pub fn print_rule(position: usize, rule: &Rule) {
    println!(
        "{:>2}. {} -> {}",
        position,
        rule.name.bold(),
        rule.intent.to_string().green()
    );
}

pub fn print_response(response: &Response) {
    match response {
        Response::Text(text) => println!("{}", text),
        Response::Structured { summary, .. } => println!("{}", summary.bold()),
    }
}
