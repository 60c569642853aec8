//! Status command
//!
//! Show the export job status list.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Args;
use colored::Colorize;
use rx_client::ExportApi;
use rx_core::jobs::{JobState, JobStatus, JobStatusPage};
use rx_core::modules::OperationalModules;
use std::fmt::Write;
use std::path::PathBuf;

use super::{load_modules, AppContext};

/// Arguments for the status command
#[derive(Debug, Args)]
pub struct StatusArgs {
    /// Page number, starting at 0
    #[arg(long, short, default_value_t = 0)]
    pub page: u32,

    /// Print the raw page as JSON
    #[arg(long)]
    pub json: bool,

    /// Resolve names from a saved operational modules snapshot
    #[arg(long, value_name = "FILE")]
    pub modules: Option<PathBuf>,
}

/// Execute the status command
pub async fn execute(args: StatusArgs, ctx: &AppContext) -> Result<()> {
    let api = ctx.api()?;
    let page = api
        .fetch_job_statuses(args.page)
        .await
        .context("Failed to fetch export job statuses")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
        return Ok(());
    }

    // Names are a nicety; fall back to raw ids if modules cannot be loaded
    let modules = match load_modules(&api, args.modules.as_deref()).await {
        Ok(modules) => Some(modules),
        Err(err) => {
            tracing::warn!("Showing ids instead of names: {:#}", err);
            None
        }
    };

    print_page(&page, modules.as_ref(), &ctx.config.output.date_format);
    Ok(())
}

/// Print a status page as a list of jobs
pub fn print_page(page: &JobStatusPage, modules: Option<&OperationalModules>, date_format: &str) {
    println!(
        "{} (page {} of {}, {} total)",
        "Export jobs".bold().underline(),
        page.number.saturating_add(1),
        page.total_pages.max(1),
        page.total_elements
    );

    if page.content.is_empty() {
        println!("  {}", "No export jobs yet.".dimmed());
        return;
    }

    for job in &page.content {
        println!(
            "  {} {} {}",
            state_marker(job.status),
            job.uuid.short().dimmed(),
            describe(job, modules)
        );
        let created = job
            .create_time
            .map(|t| format_time(t, date_format))
            .unwrap_or_else(|| "-".to_string());
        let mut details = format!("created {}", created);
        if let Some(duration) = job.duration() {
            details.push_str(&format!(", took {}s", duration.num_seconds()));
        }
        println!("      {}", details.dimmed());
        if let Some(message) = job.exit_message.as_deref().filter(|m| !m.is_empty()) {
            println!("      {}", message.red());
        }
    }

    let running = page.in_progress().count();
    if running > 0 {
        println!("  {} still running", format!("{} job(s)", running).yellow());
    }

    if !page.is_last() {
        println!(
            "  Use '{}' for older jobs.",
            format!("rx-export status --page {}", page.number.saturating_add(1)).cyan()
        );
    }
}

/// Format with the configured pattern, falling back to RFC 3339
fn format_time(time: DateTime<Utc>, date_format: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", time.format(date_format)) {
        Ok(()) => out,
        Err(_) => time.to_rfc3339(),
    }
}

fn state_marker(state: JobState) -> colored::ColoredString {
    let label = format!("{:<9}", state.to_string());
    match state {
        JobState::Completed => label.green(),
        JobState::Failed | JobState::Abandoned => label.red(),
        JobState::Stopped | JobState::Unknown => label.dimmed(),
        JobState::Starting | JobState::Started | JobState::Stopping => label.yellow(),
    }
}

/// One-line summary of what a job exports
fn describe(job: &JobStatus, modules: Option<&OperationalModules>) -> String {
    let mut parts = Vec::new();
    if let Some(report_type) = &job.report_type {
        parts.push(report_type.clone());
    }
    if let Some(id) = &job.subject_type_uuid {
        parts.push(match modules {
            Some(m) => m.subject_type_name(id),
            None => id.to_string(),
        });
    }
    if let Some(id) = &job.program_uuid {
        parts.push(match modules {
            Some(m) => m.program_name(id),
            None => id.to_string(),
        });
    }
    if let Some(id) = &job.encounter_type_uuid {
        parts.push(match modules {
            Some(m) => m.encounter_type_name(id),
            None => id.to_string(),
        });
    }
    parts.join(" / ")
}
