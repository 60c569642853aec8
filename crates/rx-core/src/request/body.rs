//! Wire payload for starting an export job

use super::dates::utc_midnight;
use super::state::ExportRequest;
use crate::types::{AddressLevelId, EncounterTypeId, ProgramId, ReportType, SubjectTypeId};
use serde::{Deserialize, Serialize};

/// JSON body accepted by the export endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub report_type: Option<ReportType>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub subject_type: Option<SubjectTypeId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub program: Option<ProgramId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub encounter_type: Option<EncounterTypeId>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub end_date: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub address_level_ids: Vec<AddressLevelId>,
    pub include_voided: bool,
}

impl RequestBody {
    /// Map request state to the payload
    ///
    /// Program and encounter type are only carried for report types that use
    /// them, so a stale selection can never leak into another report type.
    pub fn from_request(request: &ExportRequest) -> Self {
        let report_type = request.report_type;
        let program = report_type
            .filter(ReportType::allows_program)
            .and(request.program.clone());
        let encounter_type = report_type
            .filter(ReportType::requires_encounter_type)
            .and(request.encounter_type.clone());

        Self {
            report_type,
            subject_type: request.subject_type.clone(),
            program,
            encounter_type,
            start_date: request.start_date.date().map(utc_midnight),
            end_date: request.end_date.date().map(utc_midnight),
            address_level_ids: request.address_level_ids.clone(),
            include_voided: request.include_voided,
        }
    }
}

/// Build the payload for a request
pub fn request_body(request: &ExportRequest) -> RequestBody {
    RequestBody::from_request(request)
}
