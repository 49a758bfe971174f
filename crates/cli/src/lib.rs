pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "tally",
    about = "Tally sales assistant CLI",
    long_about = "Ask sales questions, inspect intent rules and configuration, and check remote readiness.",
    after_help = "Examples:\n  tally ask \"What were total sales in Q1 2024?\"\n  tally ask --json --local-only \"sales by region\"\n  tally doctor --json"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Answer a sales question using the remote service or the bundled dataset")]
    Ask {
        #[arg(help = "Natural-language question")]
        question: String,
        #[arg(long, help = "Emit the full resolution outcome as JSON")]
        json: bool,
        #[arg(long, help = "Skip the remote analysis service")]
        local_only: bool,
    },
    #[command(about = "List the keyword rules used for local answers, in evaluation order")]
    Intents,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, the bundled dataset, and remote endpoint reachability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Ask { question, json, local_only } => {
            commands::ask::run(&question, json, local_only)
        }
        Command::Intents => {
            commands::CommandResult { exit_code: 0, output: commands::intents::run() }
        }
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
