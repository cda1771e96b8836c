use anyhow::Result;
use clap::{Parser, ValueEnum};
use starlight_core::tracing::{InstrumentationConfig, init_tracing};
use starlight_daemon::Settings;
use starlight_daemon::commands::Commands;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;

/// Starlight - session client and backend proxy
#[derive(Parser, Debug)]
#[command(name = "starlight", author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (TOML or YAML)
    #[arg(short = 'c', long = "config", global = true)]
    config: Option<PathBuf>,

    /// Override the configured log level
    #[arg(short = 'l', long, global = true)]
    log_level: Option<LogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = load_cli(None, std::env::args_os()).unwrap_or_else(|e| e.exit());

    let settings = Settings::load(cli.config.as_deref())?;

    let instrumentation_config = InstrumentationConfig {
        service_name: "starlight".to_string(),
        service_version: env!("CARGO_PKG_VERSION").to_string(),
        log_level: cli
            .log_level
            .map(|level| level.as_filter().to_string())
            .unwrap_or_else(|| settings.logging.level.clone()),
        json: settings.logging.json,
    };
    init_tracing(&instrumentation_config)?;
    debug!(?settings, "Configuration loaded");

    cli.command.execute(settings).await
}

/// Load `.env` first so `env`-backed arguments such as the password see it
fn load_cli<I, T>(env_file: Option<&Path>, args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    if let Some(path) = env_file {
        dotenvy::from_path(path).ok();
    } else {
        dotenvy::dotenv().ok();
    }
    Cli::try_parse_from(args)
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}
