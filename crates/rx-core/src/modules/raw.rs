//! Wire format of the operational modules endpoint

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Operational modules exactly as the server sends them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOperationalModules {
    #[serde(default)]
    pub subject_types: Vec<RawSubjectType>,
    #[serde(default)]
    pub programs: Vec<RawProgram>,
    #[serde(default)]
    pub encounter_types: Vec<RawEncounterType>,
    #[serde(default)]
    pub form_mappings: Vec<RawFormMapping>,
    /// Fields this client does not use (forms, addressLevelTypes, ...)
    #[serde(flatten, default)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSubjectType {
    pub uuid: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub group: bool,
    #[serde(default)]
    pub voided: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawProgram {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub voided: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEncounterType {
    pub uuid: String,
    pub name: String,
    #[serde(default)]
    pub voided: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawFormMapping {
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(rename = "subjectTypeUUID", default)]
    pub subject_type_uuid: Option<String>,
    #[serde(rename = "programUUID", default)]
    pub program_uuid: Option<String>,
    #[serde(rename = "encounterTypeUUID", default)]
    pub encounter_type_uuid: Option<String>,
    #[serde(rename = "formType", default)]
    pub form_type: Option<String>,
    #[serde(default)]
    pub voided: bool,
}

impl RawFormMapping {
    /// Label used in error messages
    pub fn label(&self) -> String {
        self.uuid.clone().unwrap_or_else(|| "<no uuid>".to_string())
    }
}
