//! CLI commands module
//!
//! This module contains all CLI command implementations.

pub mod config;
pub mod doctor;
pub mod export;
mod interactive;
pub mod modules;
pub mod status;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rx_client::{ExportApi, HttpExportApi};
use rx_core::config::Config;
use rx_core::modules::OperationalModules;
use std::path::{Path, PathBuf};
use tracing::debug;

/// rx-export - Longitudinal export requests for the platform server
#[derive(Debug, Parser)]
#[command(name = "rx-export")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server base URL, overriding the configuration
    #[arg(long, global = true, env = "RX_SERVER_URL")]
    pub server_url: Option<String>,

    /// Auth token, overriding the configuration
    #[arg(long, global = true, env = "RX_AUTH_TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Build and submit a longitudinal export request
    Export(export::ExportArgs),

    /// Show export job statuses
    Status(status::StatusArgs),

    /// Inspect operational modules
    #[command(subcommand)]
    Modules(modules::ModulesCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(config::ConfigCommand),

    /// Diagnose configuration and server access
    Doctor(doctor::DoctorArgs),
}

/// Settings shared by every command
pub struct AppContext {
    pub config: Config,
    /// Config file in effect, if any
    pub config_path: Option<PathBuf>,
    /// Path given with --config
    pub explicit_config: Option<PathBuf>,
}

impl AppContext {
    fn load(
        explicit_config: Option<&Path>,
        server_url: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Self> {
        let config_path = Config::discover(explicit_config);
        let mut config = match &config_path {
            Some(path) => Config::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => Config::default(),
        };
        if let Some(url) = server_url {
            config.server.base_url = url.to_string();
        }
        if let Some(token) = auth_token {
            config.server.auth_token = Some(token.to_string());
        }
        config.validate()?;
        debug!("Using server {}", config.server.base_url);

        Ok(Self {
            config,
            config_path,
            explicit_config: explicit_config.map(Path::to_path_buf),
        })
    }

    /// HTTP client for the configured server
    pub fn api(&self) -> Result<HttpExportApi> {
        HttpExportApi::new(&self.config.server, self.config.export.status_page_size)
            .context("Failed to create server client")
    }
}

/// Load operational modules from a snapshot file or the server
pub async fn load_modules(
    api: &impl ExportApi,
    file: Option<&Path>,
) -> Result<OperationalModules> {
    match file {
        Some(path) => OperationalModules::load(path)
            .with_context(|| format!("Failed to load operational modules from {}", path.display())),
        None => {
            let raw = api
                .fetch_operational_modules()
                .await
                .context("Failed to fetch operational modules")?;
            OperationalModules::from_raw(raw).context("Server sent invalid operational modules")
        }
    }
}

/// Run the CLI application
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    setup_logging(cli.verbose);

    // Config commands must work even when the current config is broken
    let command = match cli.command {
        Commands::Config(cmd) => {
            if cli.no_color {
                colored::control::set_override(false);
            }
            return config::execute(cmd, cli.config.as_deref());
        }
        command => command,
    };

    let ctx = AppContext::load(
        cli.config.as_deref(),
        cli.server_url.as_deref(),
        cli.auth_token.as_deref(),
    )?;

    if cli.no_color || !ctx.config.output.color {
        colored::control::set_override(false);
    }

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime.block_on(dispatch(command, &ctx))
}

/// Dispatch to command handler
async fn dispatch(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Export(args) => export::execute(args, ctx).await,
        Commands::Status(args) => status::execute(args, ctx).await,
        Commands::Modules(cmd) => modules::execute(cmd, ctx).await,
        Commands::Doctor(args) => doctor::execute(args, ctx).await,
        Commands::Config(cmd) => config::execute(cmd, ctx.explicit_config.as_deref()),
    }
}

fn setup_logging(verbosity: u8) {
    use tracing_subscriber::EnvFilter;

    let filter = match verbosity {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_help_text() {
        let cmd = Cli::command();
        assert!(cmd.get_about().is_some());
    }

    #[test]
    fn test_config_overrides() {
        let missing = Path::new("/nonexistent/rx-export.toml");
        assert!(AppContext::load(Some(missing), None, None).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nbase_url = \"http://localhost:1\"\n").unwrap();

        let ctx =
            AppContext::load(Some(&path), Some("https://app.example.org"), Some("abc")).unwrap();
        assert_eq!(ctx.config.server.base_url, "https://app.example.org");
        assert_eq!(ctx.config.server.auth_token.as_deref(), Some("abc"));
    }
}
