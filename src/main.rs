use anyhow::{Context, Result};
use clap::Parser;
use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use msh::config::Config;
use msh::shell::{EditorSource, Shell, StreamSource, EXIT_STARTUP_FAILURE};

/// msh - a minimal shell with runtime-loadable plugins
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Directory containing plugin libraries
    #[arg(short, long)]
    plugin_dir: Option<PathBuf>,

    /// Plugin to load before the first prompt (repeatable)
    #[arg(short, long = "load", value_name = "NAME")]
    load: Vec<String>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    match run(args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("msh: {e:#}");
            ExitCode::from(EXIT_STARTUP_FAILURE)
        }
    }
}

fn run(args: Args) -> Result<u8> {
    // Logs go to stderr so they never interleave with command output
    let log_level = if args.debug { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to set global default subscriber")?;

    let mut config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::load_default()?,
    };
    if let Some(dir) = args.plugin_dir {
        config.plugins.dir = dir;
    }
    config.plugins.autoload.extend(args.load);
    debug!("Configuration: {:?}", config);

    let mut shell = Shell::from_config(&config);
    let mut diagnostics = std::io::stderr();
    shell.autoload(&config.plugins.autoload, &mut diagnostics);

    let shutdown = if std::io::stdin().is_terminal() {
        let mut source = EditorSource::new(&config)?;
        shell.run(&mut source, &mut diagnostics)
    } else {
        let mut source = StreamSource::new(std::io::stdin().lock(), std::io::stdout());
        shell.run(&mut source, &mut diagnostics)
    };

    Ok(shutdown.code())
}

