//! Submission guard and address-level validation

use super::options::applicable_options;
use super::state::ExportRequest;
use crate::modules::OperationalModules;
use crate::types::{AddressLevelId, ReportType};
use crate::user::{PrivilegeType, UserInfo};
use std::fmt;

/// Reason an export request cannot be submitted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Blocker {
    MissingReportType,
    MissingSubjectType,
    SubjectTypeNotApplicable,
    MissingProgram,
    ProgramNotApplicable,
    MissingEncounterType,
    EncounterTypeNotApplicable,
    InvalidStartDate,
    InvalidEndDate,
    StartAfterEnd,
    AddressLevel(String),
    MissingPrivilege(PrivilegeType),
}

impl fmt::Display for Blocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Blocker::MissingReportType => write!(f, "Select a report type"),
            Blocker::MissingSubjectType => write!(f, "Select a subject type"),
            Blocker::SubjectTypeNotApplicable => {
                write!(f, "Subject type is not available for this report type")
            }
            Blocker::MissingProgram => write!(f, "Select a program"),
            Blocker::ProgramNotApplicable => {
                write!(f, "Program is not available for this subject type")
            }
            Blocker::MissingEncounterType => write!(f, "Select an encounter type"),
            Blocker::EncounterTypeNotApplicable => {
                write!(f, "Encounter type is not available for this selection")
            }
            Blocker::InvalidStartDate => write!(f, "Start date is invalid"),
            Blocker::InvalidEndDate => write!(f, "End date is invalid"),
            Blocker::StartAfterEnd => write!(f, "Start date is after end date"),
            Blocker::AddressLevel(message) => write!(f, "{}", message),
            Blocker::MissingPrivilege(privilege) => {
                write!(f, "User lacks the {} privilege", privilege)
            }
        }
    }
}

/// Outcome of checking a request before submission
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionCheck {
    pub blockers: Vec<Blocker>,
}

impl SubmissionCheck {
    /// Collect every reason the request cannot be submitted
    ///
    /// The user is optional so a request can be checked before user info
    /// has been fetched; in that case the privilege is not checked.
    pub fn evaluate(
        modules: &OperationalModules,
        user: Option<&UserInfo>,
        request: &ExportRequest,
    ) -> Self {
        let mut blockers = Vec::new();

        if let Some(user) = user {
            if !user.has_privilege(PrivilegeType::Analytics) {
                blockers.push(Blocker::MissingPrivilege(PrivilegeType::Analytics));
            }
        }

        match request.report_type {
            None => blockers.push(Blocker::MissingReportType),
            Some(report_type) => check_selection(modules, request, report_type, &mut blockers),
        }

        if request.start_date.is_invalid() {
            blockers.push(Blocker::InvalidStartDate);
        }
        if request.end_date.is_invalid() {
            blockers.push(Blocker::InvalidEndDate);
        }
        if let (Some(start), Some(end)) = (request.start_date.date(), request.end_date.date()) {
            if start > end {
                blockers.push(Blocker::StartAfterEnd);
            }
        }

        if let Some(message) = &request.address_level_error {
            blockers.push(Blocker::AddressLevel(message.clone()));
        }

        Self { blockers }
    }

    pub fn can_submit(&self) -> bool {
        self.blockers.is_empty()
    }
}

fn check_selection(
    modules: &OperationalModules,
    request: &ExportRequest,
    report_type: ReportType,
    blockers: &mut Vec<Blocker>,
) {
    let options = applicable_options(modules, request);

    let Some(subject) = &request.subject_type else {
        blockers.push(Blocker::MissingSubjectType);
        return;
    };
    if !options.subject_type_options.iter().any(|s| &s.uuid == subject) {
        blockers.push(Blocker::SubjectTypeNotApplicable);
    }

    if report_type.allows_program() {
        match &request.program {
            None if report_type.requires_program() => blockers.push(Blocker::MissingProgram),
            Some(program) if !options.program_options.iter().any(|p| &p.uuid == program) => {
                blockers.push(Blocker::ProgramNotApplicable)
            }
            _ => {}
        }
    }

    if report_type.requires_encounter_type() {
        match &request.encounter_type {
            None => blockers.push(Blocker::MissingEncounterType),
            Some(encounter_type)
                if !options
                    .encounter_type_options
                    .iter()
                    .any(|e| &e.uuid == encounter_type) =>
            {
                blockers.push(Blocker::EncounterTypeNotApplicable)
            }
            Some(_) => {}
        }
    }
}

/// Error message for an address-level selection, if it is not usable
pub fn validate_address_level_ids(ids: &[AddressLevelId]) -> Option<String> {
    if ids.iter().any(|id| id.as_str().trim().is_empty()) {
        return Some("Address level id cannot be blank".to_string());
    }
    None
}
