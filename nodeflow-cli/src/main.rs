//! nodeflow CLI - evaluate, validate and serve workflow graphs.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::evaluate::EvaluateOptions;
use nodeflow_engine::observability::{init_tracing, TracingConfig};

/// nodeflow - typed node workflow evaluation.
#[derive(Parser)]
#[command(name = "nodeflow")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a workflow file (YAML, or JSON by extension)
    Evaluate {
        /// Path to the workflow file
        file: String,

        /// Stop at the first node failure
        #[arg(long)]
        strict: bool,

        /// Per-node time budget in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Maximum number of nodes running at once
        #[arg(long)]
        max_concurrent: Option<usize>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a workflow file without evaluating it
    Validate {
        /// Path to the workflow file
        file: String,
    },

    /// Start the nodeflow API server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long, env = "NODEFLOW_HOST", default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, env = "NODEFLOW_PORT", default_value = "8080")]
        port: u16,
    },

    /// List the registered node types
    NodeTypes {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,
}

fn setup_logging(verbosity: u8) -> Result<()> {
    let mut config = TracingConfig::for_verbosity(verbosity);

    // Explicit environment settings win over -v
    if let Ok(format) = std::env::var("NODEFLOW_LOG_FORMAT") {
        config = config.with_format(format.parse().map_err(anyhow::Error::msg)?);
    }
    if let Ok(filter) = std::env::var("NODEFLOW_LOG_LEVEL").or_else(|_| std::env::var("RUST_LOG")) {
        config = config.with_filter(filter);
    }

    init_tracing(&config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    match cli.command {
        Commands::Evaluate {
            file,
            strict,
            timeout_ms,
            max_concurrent,
            json,
        } => {
            let options = EvaluateOptions {
                strict,
                timeout_ms,
                max_concurrent,
                json,
            };
            commands::evaluate::run(&file, options).await
        }
        Commands::Validate { file } => commands::validate::run(&file).await,
        Commands::Serve { host, port } => commands::serve::run(&host, port).await,
        Commands::NodeTypes { json } => commands::node_types::run(json),
        Commands::Version => commands::version::run(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_evaluate_flags() {
        let cli = Cli::try_parse_from([
            "nodeflow",
            "-vv",
            "evaluate",
            "flow.yaml",
            "--strict",
            "--timeout-ms",
            "500",
            "--max-concurrent",
            "4",
        ])
        .unwrap();

        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Evaluate {
                file,
                strict,
                timeout_ms,
                max_concurrent,
                json,
            } => {
                assert_eq!(file, "flow.yaml");
                assert!(strict);
                assert_eq!(timeout_ms, Some(500));
                assert_eq!(max_concurrent, Some(4));
                assert!(!json);
            }
            _ => panic!("expected evaluate"),
        }
    }

    #[test]
    fn parses_serve_short_flags() {
        let cli = Cli::try_parse_from(["nodeflow", "serve", "-H", "127.0.0.1", "-p", "9000"]).unwrap();
        match cli.command {
            Commands::Serve { host, port } => {
                assert_eq!(host, "127.0.0.1");
                assert_eq!(port, 9000);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn node_types_subcommand_name() {
        let cli = Cli::try_parse_from(["nodeflow", "node-types"]).unwrap();
        assert!(matches!(cli.command, Commands::NodeTypes { json: false }));
    }
}
