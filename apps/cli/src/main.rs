//! apiscout CLI — find an API's documentation and load it into a knowledge base.
//!
//! Searches the web, lets a language model pick and filter documentation
//! links, ingests them into a collection, and prints a summary of the API.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
