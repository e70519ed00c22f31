//! Version command - show version information.

use anyhow::Result;

/// Version information.
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Run the version command.
pub fn run() -> Result<()> {
    println!("nodeflow - workflow graph evaluation engine");
    println!();
    println!("Version:     {VERSION}");
    println!(
        "Platform:    {} / {}",
        std::env::consts::OS,
        std::env::consts::ARCH
    );
    println!();
    println!("Components:");
    println!("  nodeflow-core    Values, workflow definitions, errors, computation registry");
    println!("  nodeflow-engine  Graph model, scheduler, executor, engine, HTTP API");
    println!("  nodeflow-nodes   Standard computations");
    println!("  nodeflow-cli     Command-line interface");

    Ok(())
}
