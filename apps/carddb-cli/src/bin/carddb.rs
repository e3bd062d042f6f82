use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use carddb_cli::app::{bootstrap, describe_tools, documents, is_exit_command, parse_call_line};
use carddb_cli::output::{self, OutputEvent};
use carddb_core::config::Config;

#[derive(Parser, Debug)]
#[command(name = "carddb", version, about = "Search a directory of service-provider business cards")]
struct Cli {
    /// Directory holding config.toml (defaults to the working directory)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Environment overlay to apply, e.g. `dev` loads config.dev.toml (defaults to RUST_ENV)
    #[arg(long, global = true)]
    env: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the tools with their argument schemas
    Tools,
    /// Invoke one tool and print its JSON response
    Call {
        tool: String,
        /// JSON object with the tool arguments
        args: Option<String>,
    },
    /// Read `<tool> [json-args]` lines from stdin until `exit` or EOF
    Repl,
    /// Print the retrieval document of every catalog record as JSON lines
    Documents,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let base = cli.config_dir.clone().unwrap_or_else(|| PathBuf::from("."));
    let config = Config::load_for_env(&base, cli.env.as_deref())?;

    match cli.command {
        Command::Tools => {
            let registry = bootstrap(&config)?;
            println!("{}", serde_json::to_string_pretty(&describe_tools(&registry))?);
        }
        Command::Call { tool, args } => {
            let registry = bootstrap(&config)?;
            let args = match args {
                Some(raw) => serde_json::from_str(&raw).context("arguments must be a JSON object")?,
                None => serde_json::Value::Null,
            };
            let response = registry.call(&tool, args)?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Command::Repl => repl(&config)?,
        Command::Documents => {
            for doc in documents(&config)? {
                println!("{}", serde_json::to_string(&doc)?);
            }
        }
    }
    Ok(())
}

fn repl(config: &Config) -> anyhow::Result<()> {
    let registry = bootstrap(config)?;
    let (tx, rx) = output::channel();
    let printer = output::spawn_printer(rx, io::stdout());

    for line in io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() { continue; }
        if is_exit_command(trimmed) { break; }

        let reply = parse_call_line(trimmed)
            .and_then(|(tool, args)| Ok(registry.call(tool, args)?))
            .and_then(|response| Ok(serde_json::to_string_pretty(&response)?));
        match reply {
            Ok(text) => output::emit(&tx, [text])?,
            Err(e) => {
                warn!(error = %e, "call failed");
                tx.send(OutputEvent::Chunk("error: ".to_string()))?;
                output::emit(&tx, [format!("{e:#}")])?;
            }
        }
    }

    drop(tx);
    printer.join().map_err(|_| anyhow::anyhow!("printer thread panicked"))??;
    Ok(())
}
