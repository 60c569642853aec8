//! Config command
//!
//! Manage rx-export configuration.

use anyhow::{Context, Result};
use clap::Subcommand;
use rx_core::config::{Config, LOCAL_CONFIG_PATH};
use std::fs;
use std::path::{Path, PathBuf};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the configuration file in effect
    Path,

    /// Reset to default configuration
    Reset {
        /// Force reset without confirmation
        #[arg(long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigCommand::Show { json } => show_config(explicit, json),
        ConfigCommand::Path => show_path(explicit),
        ConfigCommand::Reset { force } => reset_config(explicit, force),
        ConfigCommand::Validate => validate_config(explicit),
    }
}

/// File that `reset` writes to when nothing exists yet
fn target_path(explicit: Option<&Path>) -> PathBuf {
    Config::discover(explicit).unwrap_or_else(|| PathBuf::from(LOCAL_CONFIG_PATH))
}

fn show_config(explicit: Option<&Path>, as_json: bool) -> Result<()> {
    use colored::Colorize;

    let path = Config::discover(explicit);
    let config = match &path {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    if as_json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("{}", "Configuration:".bold().underline());
    match &path {
        Some(path) => println!("{}", path.display().to_string().dimmed()),
        None => println!("{}", "(defaults, no config file found)".dimmed()),
    }
    println!();
    print!("{}", config.to_toml()?);

    Ok(())
}

fn show_path(explicit: Option<&Path>) -> Result<()> {
    match Config::discover(explicit) {
        Some(path) => println!("{}", path.display()),
        None => {
            use colored::Colorize;
            eprintln!(
                "{} No config file found. Run '{}' to create {}.",
                "⚠".yellow(),
                "rx-export config reset".cyan(),
                LOCAL_CONFIG_PATH
            );
        }
    }
    Ok(())
}

fn reset_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    use colored::Colorize;

    let config_path = target_path(explicit);

    if !force {
        use dialoguer::Confirm;

        let confirmed = Confirm::new()
            .with_prompt(format!("Reset {} to defaults?", config_path.display()))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("Reset cancelled.");
            return Ok(());
        }
    }

    // Backup existing
    if config_path.exists() {
        let backup_path = format!(
            "{}.backup-{}",
            config_path.display(),
            chrono::Local::now().format("%Y%m%d-%H%M%S")
        );
        fs::copy(&config_path, &backup_path)?;
        println!("{} Backed up to {}", "✓".green(), backup_path);
    }

    let content = format!(
        "# rx-export configuration\n# auth_token may also come from RX_AUTH_TOKEN\n\n{}",
        Config::default().to_toml()?
    );

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&config_path, content)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    println!(
        "{} Configuration reset to defaults at {}",
        "✓".green(),
        config_path.display()
    );

    Ok(())
}

fn validate_config(explicit: Option<&Path>) -> Result<()> {
    use colored::Colorize;

    let Some(config_path) = Config::discover(explicit) else {
        eprintln!(
            "{} No config file found, defaults will be used",
            "⚠".yellow()
        );
        return Ok(());
    };

    let config = Config::load(&config_path)?;
    println!("{} {} is valid", "✓".green(), config_path.display());

    if config.server.auth_token.is_none() {
        println!(
            "{} server.auth_token is not set; RX_AUTH_TOKEN must be provided",
            "⚠".yellow()
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_path_prefers_explicit() {
        let explicit = Path::new("/tmp/rx-export-test.toml");
        assert_eq!(target_path(Some(explicit)), explicit);
    }

    #[test]
    fn test_reset_writes_loadable_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        reset_config(Some(&path), true).unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.export.refresh_delay_ms, 1000);
        assert_eq!(config.server.base_url, Config::default().server.base_url);
    }

    #[test]
    fn test_reset_backs_up_existing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[export]\nrefresh_delay_ms = 5\n").unwrap();

        reset_config(Some(&path), true).unwrap();

        let backups = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".backup-"))
            .count();
        assert_eq!(backups, 1);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server]\nbase_url = \"ftp://example.org\"\n").unwrap();
        assert!(validate_config(Some(&path)).is_err());
    }
}
