//! Validated lookup table built from raw operational modules

use super::model::{EncounterType, FormType, Program, SubjectKind, SubjectType};
use super::raw::{RawFormMapping, RawOperationalModules};
use crate::error::{Result, RxError};
use crate::types::{EncounterTypeId, ProgramId, SubjectTypeId};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// What one subject type can be exported with
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SubjectTypeModules {
    programs: HashSet<ProgramId>,
    general_encounter_types: HashSet<EncounterTypeId>,
    program_encounter_types: HashMap<ProgramId, HashSet<EncounterTypeId>>,
}

/// Ids of voided entities, kept so mappings to them can be skipped
#[derive(Debug, Default)]
struct VoidedIds {
    subject_types: HashSet<String>,
    programs: HashSet<String>,
    encounter_types: HashSet<String>,
}

/// Read-only snapshot of an organisation's subject types, programs and
/// encounter types, indexed by subject type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationalModules {
    subject_types: Vec<SubjectType>,
    programs: Vec<Program>,
    encounter_types: Vec<EncounterType>,
    by_subject: HashMap<SubjectTypeId, SubjectTypeModules>,
}

impl OperationalModules {
    /// Build the table, rejecting form mappings that point at unknown entities
    ///
    /// Voided entities and voided mappings are dropped before validation.
    /// A live mapping that names a voided entity is skipped with a warning.
    pub fn from_raw(raw: RawOperationalModules) -> Result<Self> {
        let voided = VoidedIds {
            subject_types: voided_ids(raw.subject_types.iter().map(|s| (s.voided, &s.uuid))),
            programs: voided_ids(raw.programs.iter().map(|p| (p.voided, &p.uuid))),
            encounter_types: voided_ids(raw.encounter_types.iter().map(|e| (e.voided, &e.uuid))),
        };

        let subject_types: Vec<SubjectType> = raw
            .subject_types
            .into_iter()
            .filter(|s| !s.voided)
            .map(|s| SubjectType {
                uuid: SubjectTypeId(s.uuid),
                kind: SubjectKind::parse(s.kind.as_deref()),
                name: s.name,
                group: s.group,
            })
            .collect();
        let programs: Vec<Program> = raw
            .programs
            .into_iter()
            .filter(|p| !p.voided)
            .map(|p| Program {
                uuid: ProgramId(p.uuid),
                name: p.name,
            })
            .collect();
        let encounter_types: Vec<EncounterType> = raw
            .encounter_types
            .into_iter()
            .filter(|e| !e.voided)
            .map(|e| EncounterType {
                uuid: EncounterTypeId(e.uuid),
                name: e.name,
            })
            .collect();

        let mut modules = Self {
            subject_types,
            programs,
            encounter_types,
            by_subject: HashMap::new(),
        };

        for subject in &modules.subject_types {
            modules
                .by_subject
                .insert(subject.uuid.clone(), SubjectTypeModules::default());
        }

        let mut skipped = 0usize;
        for mapping in raw.form_mappings.iter().filter(|m| !m.voided) {
            if !modules.apply_mapping(mapping, &voided)? {
                skipped += 1;
            }
        }

        info!(
            "Loaded operational modules: {} subject types, {} programs, {} encounter types",
            modules.subject_types.len(),
            modules.programs.len(),
            modules.encounter_types.len()
        );
        debug!("Ignored {} form mappings that do not shape export options", skipped);

        Ok(modules)
    }

    /// Parse the server JSON and build the table
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawOperationalModules = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    /// Load a saved snapshot from disk
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RxError::FileNotFound(path.to_path_buf()));
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
            .map_err(|e| e.with_context(format!("Invalid operational modules {}", path.display())))
    }

    /// Record one mapping; returns false when it does not shape export options
    fn apply_mapping(&mut self, mapping: &RawFormMapping, voided: &VoidedIds) -> Result<bool> {
        match FormType::parse(mapping.form_type.as_deref()) {
            FormType::Other => return Ok(false),
            FormType::ProgramEnrolment => {
                let (Some(subject), Some(program)) = (
                    self.resolve_subject(mapping, voided)?,
                    self.resolve_program(mapping, voided)?,
                ) else {
                    return Ok(false);
                };
                self.entry(&subject).programs.insert(program);
            }
            FormType::ProgramEncounter => {
                let (Some(subject), Some(program), Some(encounter_type)) = (
                    self.resolve_subject(mapping, voided)?,
                    self.resolve_program(mapping, voided)?,
                    self.resolve_encounter_type(mapping, voided)?,
                ) else {
                    return Ok(false);
                };
                let entry = self.entry(&subject);
                entry.programs.insert(program.clone());
                entry
                    .program_encounter_types
                    .entry(program)
                    .or_default()
                    .insert(encounter_type);
            }
            FormType::Encounter => {
                let (Some(subject), Some(encounter_type)) = (
                    self.resolve_subject(mapping, voided)?,
                    self.resolve_encounter_type(mapping, voided)?,
                ) else {
                    return Ok(false);
                };
                self.entry(&subject)
                    .general_encounter_types
                    .insert(encounter_type);
            }
        }
        Ok(true)
    }

    fn entry(&mut self, subject: &SubjectTypeId) -> &mut SubjectTypeModules {
        self.by_subject.entry(subject.clone()).or_default()
    }

    fn resolve_subject(
        &self,
        mapping: &RawFormMapping,
        voided: &VoidedIds,
    ) -> Result<Option<SubjectTypeId>> {
        let id = required(mapping, mapping.subject_type_uuid.as_deref(), "subject type")?;
        let uuid = SubjectTypeId::from(id);
        if self.subject_type(&uuid).is_some() {
            return Ok(Some(uuid));
        }
        skip_voided(mapping, "subject type", id, &voided.subject_types).map(|()| None)
    }

    fn resolve_program(
        &self,
        mapping: &RawFormMapping,
        voided: &VoidedIds,
    ) -> Result<Option<ProgramId>> {
        let id = required(mapping, mapping.program_uuid.as_deref(), "program")?;
        let uuid = ProgramId::from(id);
        if self.program(&uuid).is_some() {
            return Ok(Some(uuid));
        }
        skip_voided(mapping, "program", id, &voided.programs).map(|()| None)
    }

    fn resolve_encounter_type(
        &self,
        mapping: &RawFormMapping,
        voided: &VoidedIds,
    ) -> Result<Option<EncounterTypeId>> {
        let id = required(mapping, mapping.encounter_type_uuid.as_deref(), "encounter type")?;
        let uuid = EncounterTypeId::from(id);
        if self.encounter_type(&uuid).is_some() {
            return Ok(Some(uuid));
        }
        skip_voided(mapping, "encounter type", id, &voided.encounter_types).map(|()| None)
    }

    /// All subject types, in server order
    pub fn subject_types(&self) -> &[SubjectType] {
        &self.subject_types
    }

    /// All programs, in server order
    pub fn programs(&self) -> &[Program] {
        &self.programs
    }

    /// All encounter types, in server order
    pub fn encounter_types(&self) -> &[EncounterType] {
        &self.encounter_types
    }

    pub fn subject_type(&self, id: &SubjectTypeId) -> Option<&SubjectType> {
        self.subject_types.iter().find(|s| &s.uuid == id)
    }

    pub fn program(&self, id: &ProgramId) -> Option<&Program> {
        self.programs.iter().find(|p| &p.uuid == id)
    }

    pub fn encounter_type(&self, id: &EncounterTypeId) -> Option<&EncounterType> {
        self.encounter_types.iter().find(|e| &e.uuid == id)
    }

    /// Find a subject type by uuid, or by name ignoring case
    pub fn find_subject_type(&self, key: &str) -> Option<&SubjectType> {
        let key = key.trim();
        self.subject_types
            .iter()
            .find(|s| s.uuid.as_str() == key)
            .or_else(|| self.subject_types.iter().find(|s| s.name.eq_ignore_ascii_case(key)))
    }

    /// Find a program by uuid, or by name ignoring case
    pub fn find_program(&self, key: &str) -> Option<&Program> {
        let key = key.trim();
        self.programs
            .iter()
            .find(|p| p.uuid.as_str() == key)
            .or_else(|| self.programs.iter().find(|p| p.name.eq_ignore_ascii_case(key)))
    }

    /// Find an encounter type by uuid, or by name ignoring case
    pub fn find_encounter_type(&self, key: &str) -> Option<&EncounterType> {
        let key = key.trim();
        self.encounter_types
            .iter()
            .find(|e| e.uuid.as_str() == key)
            .or_else(|| self.encounter_types.iter().find(|e| e.name.eq_ignore_ascii_case(key)))
    }

    /// Programs subjects of this type can be enrolled in
    pub fn programs_for(&self, subject: &SubjectTypeId) -> Vec<&Program> {
        match self.by_subject.get(subject) {
            Some(entry) => self
                .programs
                .iter()
                .filter(|p| entry.programs.contains(&p.uuid))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Encounter types recorded directly against the subject, outside any program
    pub fn general_encounter_types_for(&self, subject: &SubjectTypeId) -> Vec<&EncounterType> {
        match self.by_subject.get(subject) {
            Some(entry) => self
                .encounter_types
                .iter()
                .filter(|e| entry.general_encounter_types.contains(&e.uuid))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Encounter types recorded within a program enrolment of this subject type
    pub fn program_encounter_types_for(
        &self,
        subject: &SubjectTypeId,
        program: &ProgramId,
    ) -> Vec<&EncounterType> {
        let Some(types) = self
            .by_subject
            .get(subject)
            .and_then(|entry| entry.program_encounter_types.get(program))
        else {
            return Vec::new();
        };
        self.encounter_types
            .iter()
            .filter(|e| types.contains(&e.uuid))
            .collect()
    }

    /// Display name of a subject type, falling back to its id
    pub fn subject_type_name(&self, id: &SubjectTypeId) -> String {
        self.subject_type(id)
            .map(|s| s.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Display name of a program, falling back to its id
    pub fn program_name(&self, id: &ProgramId) -> String {
        self.program(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Display name of an encounter type, falling back to its id
    pub fn encounter_type_name(&self, id: &EncounterTypeId) -> String {
        self.encounter_type(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| id.to_string())
    }
}

fn required<'a>(mapping: &RawFormMapping, value: Option<&'a str>, kind: &str) -> Result<&'a str> {
    value.filter(|v| !v.trim().is_empty()).ok_or_else(|| {
        RxError::Validation(format!(
            "Form mapping {} of type {} has no {}",
            mapping.label(),
            mapping.form_type.as_deref().unwrap_or("?"),
            kind
        ))
    })
}

fn voided_ids<'a>(entities: impl Iterator<Item = (bool, &'a String)>) -> HashSet<String> {
    entities
        .filter(|(voided, _)| *voided)
        .map(|(_, uuid)| uuid.clone())
        .collect()
}

/// Ok when `id` names a voided entity, so the mapping can be dropped
fn skip_voided(
    mapping: &RawFormMapping,
    kind: &'static str,
    id: &str,
    voided: &HashSet<String>,
) -> Result<()> {
    if !voided.contains(id) {
        return Err(unknown(mapping, kind, id));
    }
    warn!(
        "Skipping form mapping {}: {} {} is voided",
        mapping.label(),
        kind,
        id
    );
    Ok(())
}

fn unknown(mapping: &RawFormMapping, kind: &'static str, id: &str) -> RxError {
    RxError::UnknownReference {
        kind,
        id: id.to_string(),
        mapping: mapping.label(),
    }
}
