use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;

mod cli;

use cli::Cli;
use toolsync::config::Config;
use toolsync::engine::{BatchEvent, BatchReport, Engine};

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolsync")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("toolsync.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let env = env_logger::Env::default().default_filter_or(level.unwrap_or("info"));
    env_logger::Builder::from_env(env)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn print_block(title: &str, body: &str) {
    println!("{}", title);
    for line in body.lines() {
        println!("     {}", line);
    }
    println!();
}

fn list_tools(config: &Config) {
    println!("Supported tools:");
    for name in config.tool_names() {
        println!("    {}", name);
    }
}

fn print_errors(report: &BatchReport) {
    if !report.has_errors() {
        return;
    }
    println!();
    println!("{}", "Errors:".red());
    for (name, error) in &report.errors {
        println!("    Tool '{}' - {}", name, error);
    }
}

/// Returns whether every tool completed without error
async fn run_application(cli: &Cli, config: &Config) -> Result<bool> {
    info!("Starting application");
    let verbose = cli.verbosity();

    if verbose >= 2 {
        if let Some(path) = &cli.config {
            println!("Configuration file: '{}'", path.display());
            println!();
        }
    }

    let defaults = config.merged_defaults();
    if verbose >= 2 {
        let yaml = serde_yaml::to_string(&defaults).context("Failed to render defaults")?;
        print_block("Defaults:", &yaml);
    }

    let Some(verb) = cli.verb() else {
        list_tools(config);
        return Ok(true);
    };

    let tools = config.select_tools(&cli.tools);
    if tools.is_empty() {
        println!("Tool(s) not found!");
        return Ok(true);
    }
    println!("{}", "Processing tools...".cyan());

    if verbose >= 2 {
        let mut names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
        names.sort_unstable();
        println!("Tools to process:");
        for name in names {
            println!("    {}", name);
        }
        println!();
    }

    let engine = Engine::new(defaults, verb, cli.action_options())
        .context("Failed to initialize HTTP client")?
        .with_workers(config.workers.unwrap_or(0));

    let report = engine
        .run(tools, |event| match event {
            BatchEvent::ToolDone(tool) => {
                for line in &tool.outputs {
                    println!("{}", line);
                }
            }
            BatchEvent::RefreshStarted(dir) => {
                if verbose >= 2 {
                    println!();
                    println!("Updating repo: {}", dir.display());
                    println!();
                }
            }
        })
        .await;

    info!(
        "Processed {} tools, {} errors",
        report.processed,
        report.errors.len()
    );
    print_errors(&report);
    Ok(!report.has_errors())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the configured level is known
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    let clean = run_application(&cli, &config)
        .await
        .context("Application failed")?;

    if !clean {
        std::process::exit(1);
    }
    Ok(())
}
