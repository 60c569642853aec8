//! Export command
//!
//! Build a longitudinal export request, check it, and submit it.

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

use rx_client::{ExportApi, Submitter};
use rx_core::modules::OperationalModules;
use rx_core::request::{
    request_body, validate_address_level_ids, ExportAction, ExportRequest, SubmissionCheck,
};
use rx_core::types::{AddressLevelId, ReportType};

use super::{interactive, load_modules, status, AppContext};

/// Report type options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportTypeArg {
    /// Subject registrations
    Registration,
    /// Program enrolments
    Enrolment,
    /// Encounters, within a program or general
    Encounter,
    /// Group subjects and their members
    GroupSubject,
}

impl From<ReportTypeArg> for ReportType {
    fn from(arg: ReportTypeArg) -> Self {
        match arg {
            ReportTypeArg::Registration => ReportType::Registration,
            ReportTypeArg::Enrolment => ReportType::Enrolment,
            ReportTypeArg::Encounter => ReportType::Encounter,
            ReportTypeArg::GroupSubject => ReportType::GroupSubject,
        }
    }
}

/// Arguments for the export command
#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Report type
    #[arg(long, short = 't', value_enum)]
    pub report_type: Option<ReportTypeArg>,

    /// Subject type uuid or name
    #[arg(long, short)]
    pub subject_type: Option<String>,

    /// Program uuid or name
    #[arg(long, short)]
    pub program: Option<String>,

    /// Encounter type uuid or name
    #[arg(long, short)]
    pub encounter_type: Option<String>,

    /// Earliest date (yyyy-mm-dd or dd/mm/yyyy)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Latest date (yyyy-mm-dd or dd/mm/yyyy)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Address level id to filter by (repeatable)
    #[arg(long = "address-level", value_name = "ID")]
    pub address_levels: Vec<String>,

    /// Include voided entries
    #[arg(long)]
    pub include_voided: bool,

    /// Read operational modules from a saved snapshot instead of the server
    #[arg(long, value_name = "FILE")]
    pub modules: Option<PathBuf>,

    /// Prompt for every field
    #[arg(
        long,
        short,
        conflicts_with_all = [
            "report_type",
            "subject_type",
            "program",
            "encounter_type",
            "start_date",
            "end_date",
            "address_levels",
            "include_voided",
        ]
    )]
    pub interactive: bool,

    /// Print the request body instead of submitting it
    #[arg(long)]
    pub dry_run: bool,

    /// Do not wait for the status refresh after submitting
    #[arg(long)]
    pub no_wait: bool,
}

impl ExportArgs {
    /// Turn flags into reducer actions, resolving names through the modules
    pub fn actions(&self, modules: &OperationalModules) -> Vec<ExportAction> {
        let mut actions = Vec::new();

        if let Some(report_type) = self.report_type {
            actions.push(ExportAction::ReportType(report_type.into()));
        }
        if let Some(subject) = &self.subject_type {
            let id = modules
                .find_subject_type(subject)
                .map(|s| s.uuid.clone())
                .unwrap_or_else(|| subject.as_str().into());
            actions.push(ExportAction::SubjectType(Some(id)));
        }
        if let Some(program) = &self.program {
            let id = modules
                .find_program(program)
                .map(|p| p.uuid.clone())
                .unwrap_or_else(|| program.as_str().into());
            actions.push(ExportAction::Program(Some(id)));
        }
        if let Some(encounter_type) = &self.encounter_type {
            let id = modules
                .find_encounter_type(encounter_type)
                .map(|e| e.uuid.clone())
                .unwrap_or_else(|| encounter_type.as_str().into());
            actions.push(ExportAction::EncounterType(Some(id)));
        }
        if let Some(start) = &self.start_date {
            actions.push(ExportAction::StartDateText(start.clone()));
        }
        if let Some(end) = &self.end_date {
            actions.push(ExportAction::EndDateText(end.clone()));
        }
        if !self.address_levels.is_empty() {
            let ids: Vec<AddressLevelId> = self
                .address_levels
                .iter()
                .map(|id| AddressLevelId::from(id.as_str()))
                .collect();
            actions.push(ExportAction::AddressLevelError(validate_address_level_ids(&ids)));
            actions.push(ExportAction::AddressLevelIds(ids));
        }
        if self.include_voided {
            actions.push(ExportAction::IncludeVoided(true));
        }

        actions
    }
}

/// Execute the export command
pub async fn execute(args: ExportArgs, ctx: &AppContext) -> Result<()> {
    use colored::Colorize;

    let api = ctx.api()?;
    let modules = load_modules(&api, args.modules.as_deref()).await?;

    let initial = ExportRequest::with_include_voided(ctx.config.export.include_voided);
    let request = if args.interactive {
        interactive::fill(&modules, initial)?
    } else {
        initial.reduce_all(args.actions(&modules))
    };

    // Request fields first, so an incomplete request never touches the server
    let check = SubmissionCheck::evaluate(&modules, None, &request);
    for blocker in &check.blockers {
        eprintln!("{} {}", "✗".red(), blocker);
    }

    if args.dry_run {
        let body = serde_json::to_string_pretty(&request_body(&request))?;
        println!("{}", body);
        if !check.can_submit() {
            eprintln!(
                "{} Request would not be accepted for submission",
                "⚠".yellow()
            );
        }
        return Ok(());
    }

    if !check.can_submit() {
        bail!(
            "Export request is incomplete ({} problem{})",
            check.blockers.len(),
            if check.blockers.len() == 1 { "" } else { "s" }
        );
    }

    let user = api
        .fetch_user_info()
        .await
        .context("Failed to fetch user info")?;
    let check = SubmissionCheck::evaluate(&modules, Some(&user), &request);
    if let Some(blocker) = check.blockers.first() {
        bail!("{}", blocker);
    }

    let submitter = Submitter::new(api, ctx.config.export.refresh_delay());

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message("Starting export job...");
    spinner.enable_steady_tick(Duration::from_millis(100));
    let outcome = submitter.submit(&request).await;
    spinner.finish_and_clear();

    let refresh = match outcome {
        Ok(refresh) => refresh,
        Err(err) => {
            eprintln!("{} {}", "✗".red(), err.user_message());
            return Err(err).context("Export submission failed");
        }
    };

    eprintln!(
        "{} Export job started ({})",
        "✓".green(),
        request
            .report_type
            .map(|t| t.name())
            .unwrap_or_default()
            .cyan()
    );

    if args.no_wait {
        refresh.cancel();
        eprintln!("Run '{}' to follow progress.", "rx-export status".cyan());
        return Ok(());
    }

    let page = refresh.wait().await.context("Failed to refresh job statuses")?;
    status::print_page(&page, Some(&modules), &ctx.config.output.date_format);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        args: ExportArgs,
    }

    fn modules() -> OperationalModules {
        OperationalModules::from_json(
            r#"{
                "subjectTypes": [{"uuid": "st-1", "name": "Patient", "type": "Person"}],
                "programs": [{"uuid": "pr-1", "name": "TB"}],
                "encounterTypes": [{"uuid": "et-1", "name": "Visit"}],
                "formMappings": [
                    {"subjectTypeUUID": "st-1", "programUUID": "pr-1", "encounterTypeUUID": "et-1", "formType": "ProgramEncounter"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_report_type_values() {
        assert!(ReportTypeArg::from_str("registration", true).is_ok());
        assert!(ReportTypeArg::from_str("group-subject", true).is_ok());
        assert!(ReportTypeArg::from_str("visit", true).is_err());
    }

    #[test]
    fn test_names_resolved_to_uuids() {
        let cli = TestCli::parse_from([
            "test",
            "--report-type",
            "encounter",
            "--subject-type",
            "patient",
            "--program",
            "TB",
            "--encounter-type",
            "Visit",
        ]);
        let request = ExportRequest::new().reduce_all(cli.args.actions(&modules()));
        assert_eq!(request.subject_type, Some("st-1".into()));
        assert_eq!(request.program, Some("pr-1".into()));
        assert_eq!(request.encounter_type, Some("et-1".into()));
    }

    #[test]
    fn test_unknown_names_passed_through() {
        let cli = TestCli::parse_from(["test", "-t", "enrolment", "-s", "Household"]);
        let request = ExportRequest::new().reduce_all(cli.args.actions(&modules()));
        assert_eq!(request.subject_type, Some("Household".into()));
    }

    #[test]
    fn test_blank_address_level_sets_error() {
        let cli = TestCli::parse_from(["test", "--address-level", "A1", "--address-level", " "]);
        let request = ExportRequest::new().reduce_all(cli.args.actions(&modules()));
        assert!(request.address_level_error.is_some());
        assert_eq!(request.address_level_ids.len(), 2);
    }

    #[test]
    fn test_include_voided_flag() {
        let cli = TestCli::parse_from(["test", "--include-voided"]);
        let request = ExportRequest::new().reduce_all(cli.args.actions(&modules()));
        assert!(request.include_voided);
    }

    #[test]
    fn test_interactive_conflicts_with_fields() {
        assert!(TestCli::try_parse_from(["test", "--interactive", "-t", "encounter"]).is_err());
    }

    #[test]
    fn test_interactive_conflicts_with_filters() {
        assert!(
            TestCli::try_parse_from(["test", "--interactive", "--start-date", "2024-01-01"])
                .is_err()
        );
        assert!(TestCli::try_parse_from(["test", "-i", "--end-date", "2024-12-31"]).is_err());
        assert!(TestCli::try_parse_from(["test", "-i", "--address-level", "A1"]).is_err());
        assert!(TestCli::try_parse_from(["test", "-i", "--include-voided"]).is_err());
        assert!(TestCli::try_parse_from(["test", "-i", "--dry-run", "--no-wait"]).is_ok());
    }
}
