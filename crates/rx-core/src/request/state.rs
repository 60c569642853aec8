//! Export request state and its reducer

use super::dates::DateField;
use crate::types::{AddressLevelId, EncounterTypeId, ProgramId, ReportType, SubjectTypeId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Parameters the user has selected for a longitudinal export
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    pub report_type: Option<ReportType>,
    pub subject_type: Option<SubjectTypeId>,
    pub program: Option<ProgramId>,
    pub encounter_type: Option<EncounterTypeId>,
    pub start_date: DateField,
    pub end_date: DateField,
    /// Selected address levels in selection order; empty means no filter
    pub address_level_ids: Vec<AddressLevelId>,
    pub address_level_error: Option<String>,
    pub include_voided: bool,
}

/// Named updates accepted by [`ExportRequest::reduce`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportAction {
    ReportType(ReportType),
    SubjectType(Option<SubjectTypeId>),
    Program(Option<ProgramId>),
    EncounterType(Option<EncounterTypeId>),
    DateRange {
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    StartDateText(String),
    EndDateText(String),
    CloseDatePickers,
    AddressLevelIds(Vec<AddressLevelId>),
    AddressLevelError(Option<String>),
    IncludeVoided(bool),
    Clear,
}

impl ExportRequest {
    /// Empty request as shown when the export screen opens
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty request with a preset include-voided flag
    pub fn with_include_voided(include_voided: bool) -> Self {
        Self {
            include_voided,
            ..Self::default()
        }
    }

    /// Compute the next state for an action
    ///
    /// Changing an upstream selection always clears the selections that
    /// depend on it: report type and subject type clear program and
    /// encounter type, program clears encounter type.
    pub fn reduce(&self, action: ExportAction) -> Self {
        trace!(?action, "Reducing export request");
        let mut next = self.clone();
        match action {
            ExportAction::ReportType(report_type) => {
                next.report_type = Some(report_type);
                next.program = None;
                next.encounter_type = None;
            }
            ExportAction::SubjectType(subject_type) => {
                next.subject_type = subject_type;
                next.program = None;
                next.encounter_type = None;
            }
            ExportAction::Program(program) => {
                next.program = program;
                next.encounter_type = None;
            }
            ExportAction::EncounterType(encounter_type) => {
                next.encounter_type = encounter_type;
            }
            ExportAction::DateRange { start, end } => {
                next.start_date = DateField::from_date(start);
                next.end_date = DateField::from_date(end);
            }
            ExportAction::StartDateText(raw) => {
                next.start_date = DateField::from_text(&raw);
            }
            ExportAction::EndDateText(raw) => {
                next.end_date = DateField::from_text(&raw);
            }
            ExportAction::CloseDatePickers => {
                next.start_date = next.start_date.closed();
                next.end_date = next.end_date.closed();
            }
            ExportAction::AddressLevelIds(ids) => {
                next.address_level_ids = dedup_in_order(ids);
            }
            ExportAction::AddressLevelError(message) => {
                next.address_level_error = message.filter(|m| !m.trim().is_empty());
            }
            ExportAction::IncludeVoided(flag) => {
                next.include_voided = flag;
            }
            ExportAction::Clear => {
                next = Self::default();
            }
        }
        next
    }

    /// Apply actions left to right
    pub fn reduce_all(&self, actions: impl IntoIterator<Item = ExportAction>) -> Self {
        actions
            .into_iter()
            .fold(self.clone(), |state, action| state.reduce(action))
    }
}

fn dedup_in_order(ids: Vec<AddressLevelId>) -> Vec<AddressLevelId> {
    let mut out: Vec<AddressLevelId> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(&id) {
            out.push(id);
        }
    }
    out
}
