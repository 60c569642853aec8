//! Selectable options derived from the operational modules

use super::state::ExportRequest;
use crate::modules::{EncounterType, OperationalModules, Program, SubjectType};
use crate::types::ReportType;

/// Option lists for the selections that depend on earlier choices
///
/// Always computed on demand from the modules and the request; never stored
/// on the request, so it cannot go stale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApplicableOptions<'a> {
    pub subject_type_options: Vec<&'a SubjectType>,
    pub program_options: Vec<&'a Program>,
    pub encounter_type_options: Vec<&'a EncounterType>,
}

impl ApplicableOptions<'_> {
    /// Whether nothing can be picked at all
    pub fn is_empty(&self) -> bool {
        self.subject_type_options.is_empty()
            && self.program_options.is_empty()
            && self.encounter_type_options.is_empty()
    }
}

/// Derive the options a request can currently choose from
pub fn applicable_options<'a>(
    modules: &'a OperationalModules,
    request: &ExportRequest,
) -> ApplicableOptions<'a> {
    let subject_type_options = match request.report_type {
        None => Vec::new(),
        Some(report_type) if report_type.requires_group_subject() => modules
            .subject_types()
            .iter()
            .filter(|s| s.is_group())
            .collect(),
        Some(_) => modules.subject_types().iter().collect(),
    };

    let program_options = request
        .subject_type
        .as_ref()
        .map(|subject| modules.programs_for(subject))
        .unwrap_or_default();

    let encounter_type_options = match (&request.report_type, &request.subject_type) {
        (Some(ReportType::Encounter), Some(subject)) => match &request.program {
            Some(program) => modules.program_encounter_types_for(subject, program),
            None => modules.general_encounter_types_for(subject),
        },
        _ => Vec::new(),
    };

    ApplicableOptions {
        subject_type_options,
        program_options,
        encounter_type_options,
    }
}
