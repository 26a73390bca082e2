use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "intentus")]
#[command(author, version, about = "Route free-text queries to intent handlers", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show which intent a query classifies to, without calling any service
    Classify { query: String },

    /// Dispatch a single query and print the handler's response
    Route {
        query: String,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dispatch every non-empty line of a file
    Batch {
        file: String,

        /// Overrides `dispatch.concurrency` from settings
        #[arg(short, long)]
        concurrency: Option<usize>,
    },

    /// List the active classification rules in evaluation order
    Rules,
}
