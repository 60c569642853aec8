//! Modules command
//!
//! Inspect the operational modules that drive export options.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use rx_client::ExportApi;
use rx_core::modules::OperationalModules;
use std::fs;
use std::path::PathBuf;

use super::{load_modules, AppContext};

/// Modules subcommands
#[derive(Debug, Subcommand)]
pub enum ModulesCommand {
    /// Show subject types with their programs and encounter types
    Show {
        /// Read a saved snapshot instead of the server
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,

        /// Show as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that every form mapping refers to known entities
    Validate {
        /// Read a saved snapshot instead of the server
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Save the server's operational modules for offline use
    Save {
        /// Output file
        #[arg(long, short, default_value = "operational-modules.json")]
        output: PathBuf,
    },
}

/// Execute the modules command
pub async fn execute(cmd: ModulesCommand, ctx: &AppContext) -> Result<()> {
    let api = ctx.api()?;
    match cmd {
        ModulesCommand::Show { file, json } => {
            let modules = load_modules(&api, file.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary(&modules))?);
            } else {
                print_tree(&modules);
            }
            Ok(())
        }
        ModulesCommand::Validate { file } => {
            let modules = load_modules(&api, file.as_deref()).await?;
            println!(
                "{} Operational modules are consistent ({} subject types, {} programs, {} encounter types)",
                "✓".green(),
                modules.subject_types().len(),
                modules.programs().len(),
                modules.encounter_types().len()
            );
            Ok(())
        }
        ModulesCommand::Save { output } => {
            let raw = api
                .fetch_operational_modules()
                .await
                .context("Failed to fetch operational modules")?;
            OperationalModules::from_raw(raw.clone())
                .context("Server sent invalid operational modules")?;
            fs::write(&output, serde_json::to_string_pretty(&raw)?)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("{} Saved to {}", "✓".green(), output.display());
            Ok(())
        }
    }
}

/// Nested view of the table, keyed by names
fn summary(modules: &OperationalModules) -> serde_json::Value {
    let subjects: Vec<serde_json::Value> = modules
        .subject_types()
        .iter()
        .map(|subject| {
            let programs: Vec<serde_json::Value> = modules
                .programs_for(&subject.uuid)
                .into_iter()
                .map(|program| {
                    let encounters: Vec<&str> = modules
                        .program_encounter_types_for(&subject.uuid, &program.uuid)
                        .into_iter()
                        .map(|e| e.name.as_str())
                        .collect();
                    serde_json::json!({
                        "uuid": program.uuid,
                        "name": program.name,
                        "encounterTypes": encounters,
                    })
                })
                .collect();
            let general: Vec<&str> = modules
                .general_encounter_types_for(&subject.uuid)
                .into_iter()
                .map(|e| e.name.as_str())
                .collect();
            serde_json::json!({
                "uuid": subject.uuid,
                "name": subject.name,
                "type": subject.kind.to_string(),
                "group": subject.is_group(),
                "programs": programs,
                "encounterTypes": general,
            })
        })
        .collect();
    serde_json::json!({ "subjectTypes": subjects })
}

fn print_tree(modules: &OperationalModules) {
    println!("{}", "Operational modules".bold().underline());
    if modules.subject_types().is_empty() {
        println!("  {}", "No subject types configured.".dimmed());
        return;
    }

    for subject in modules.subject_types() {
        let group = if subject.is_group() { " [group]" } else { "" };
        println!(
            "  {} ({}){}",
            subject.name.bold(),
            subject.kind,
            group.cyan()
        );
        for program in modules.programs_for(&subject.uuid) {
            println!("    {} {}", "program".dimmed(), program.name);
            for encounter in modules.program_encounter_types_for(&subject.uuid, &program.uuid) {
                println!("      {} {}", "encounter".dimmed(), encounter.name);
            }
        }
        for encounter in modules.general_encounter_types_for(&subject.uuid) {
            println!("    {} {}", "encounter".dimmed(), encounter.name);
        }
    }
}
