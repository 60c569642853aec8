//! Interactive request builder
//!
//! Each answer is fed through the reducer and the next prompt's choices
//! are derived again from the updated request.

use anyhow::{bail, Result};
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use rx_core::modules::OperationalModules;
use rx_core::request::{
    applicable_options, validate_address_level_ids, ExportAction, ExportRequest,
    INVALID_DATE_MESSAGE,
};
use rx_core::types::{AddressLevelId, ReportType};

/// Prompt for every field of the request
pub fn fill(modules: &OperationalModules, initial: ExportRequest) -> Result<ExportRequest> {
    let theme = ColorfulTheme::default();
    let mut request = initial;

    let names: Vec<&str> = ReportType::ALL.iter().map(|t| t.name()).collect();
    let index = Select::with_theme(&theme)
        .with_prompt("Report type")
        .items(&names)
        .default(0)
        .interact()?;
    request = request.reduce(ExportAction::ReportType(ReportType::ALL[index]));

    let options = applicable_options(modules, &request);
    if options.subject_type_options.is_empty() {
        bail!(
            "No subject types available for {} exports",
            ReportType::ALL[index]
        );
    }
    let names: Vec<&str> = options
        .subject_type_options
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    let index = Select::with_theme(&theme)
        .with_prompt("Subject type")
        .items(&names)
        .default(0)
        .interact()?;
    let subject = options.subject_type_options[index].uuid.clone();
    request = request.reduce(ExportAction::SubjectType(Some(subject)));

    if request.report_type.is_some_and(|t| t.allows_program()) {
        let options = applicable_options(modules, &request);
        let required = request.report_type.is_some_and(|t| t.requires_program());
        if options.program_options.is_empty() {
            if required {
                bail!("The selected subject type has no programs");
            }
        } else {
            let mut names: Vec<&str> = options
                .program_options
                .iter()
                .map(|p| p.name.as_str())
                .collect();
            if !required {
                names.insert(0, "(no program)");
            }
            let index = Select::with_theme(&theme)
                .with_prompt("Program")
                .items(&names)
                .default(0)
                .interact()?;
            let program = match (required, index) {
                (false, 0) => None,
                (false, i) => Some(options.program_options[i - 1].uuid.clone()),
                (true, i) => Some(options.program_options[i].uuid.clone()),
            };
            request = request.reduce(ExportAction::Program(program));
        }
    }

    if request.report_type.is_some_and(|t| t.requires_encounter_type()) {
        let options = applicable_options(modules, &request);
        if options.encounter_type_options.is_empty() {
            bail!("No encounter types available for this selection");
        }
        let names: Vec<&str> = options
            .encounter_type_options
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        let index = Select::with_theme(&theme)
            .with_prompt("Encounter type")
            .items(&names)
            .default(0)
            .interact()?;
        let encounter_type = options.encounter_type_options[index].uuid.clone();
        request = request.reduce(ExportAction::EncounterType(Some(encounter_type)));
    }

    request = prompt_date(&theme, request, DateEnd::Start)?;
    request = prompt_date(&theme, request, DateEnd::End)?;
    request = request.reduce(ExportAction::CloseDatePickers);

    loop {
        let raw: String = Input::with_theme(&theme)
            .with_prompt("Address level ids (comma separated, empty for all)")
            .allow_empty(true)
            .interact_text()?;
        let ids: Vec<AddressLevelId> = if raw.trim().is_empty() {
            Vec::new()
        } else {
            raw.split(',').map(|id| AddressLevelId::from(id.trim())).collect()
        };
        let error = validate_address_level_ids(&ids);
        request = request
            .reduce(ExportAction::AddressLevelError(error.clone()))
            .reduce(ExportAction::AddressLevelIds(ids));
        match error {
            Some(message) => eprintln!("{}", message),
            None => break,
        }
    }

    let include_voided = Confirm::with_theme(&theme)
        .with_prompt("Include voided entries?")
        .default(request.include_voided)
        .interact()?;
    request = request.reduce(ExportAction::IncludeVoided(include_voided));

    Ok(request)
}

#[derive(Clone, Copy)]
enum DateEnd {
    Start,
    End,
}

/// Ask for a date until it parses or is left empty
fn prompt_date(
    theme: &ColorfulTheme,
    mut request: ExportRequest,
    end: DateEnd,
) -> Result<ExportRequest> {
    let prompt = match end {
        DateEnd::Start => "Start date",
        DateEnd::End => "End date",
    };
    loop {
        let raw: String = Input::with_theme(theme)
            .with_prompt(format!("{} (yyyy-mm-dd, empty for none)", prompt))
            .allow_empty(true)
            .interact_text()?;
        let (next, invalid) = match end {
            DateEnd::Start => {
                let next = request.reduce(ExportAction::StartDateText(raw));
                let invalid = next.start_date.is_invalid();
                (next, invalid)
            }
            DateEnd::End => {
                let next = request.reduce(ExportAction::EndDateText(raw));
                let invalid = next.end_date.is_invalid();
                (next, invalid)
            }
        };
        request = next;
        if !invalid {
            return Ok(request);
        }
        eprintln!("{}", INVALID_DATE_MESSAGE);
    }
}
