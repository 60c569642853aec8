//! Typed operational module entities

use crate::types::{EncounterTypeId, ProgramId, SubjectTypeId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of subject a subject type registers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectKind {
    Person,
    Individual,
    Group,
    Household,
    User,
}

impl SubjectKind {
    /// Parse the server's `type` string; unknown kinds fall back to Individual
    pub fn parse(s: Option<&str>) -> Self {
        match s.map(str::trim) {
            Some(k) if k.eq_ignore_ascii_case("person") => SubjectKind::Person,
            Some(k) if k.eq_ignore_ascii_case("group") => SubjectKind::Group,
            Some(k) if k.eq_ignore_ascii_case("household") => SubjectKind::Household,
            Some(k) if k.eq_ignore_ascii_case("user") => SubjectKind::User,
            _ => SubjectKind::Individual,
        }
    }

    /// Whether subjects of this kind have members
    pub fn is_group(&self) -> bool {
        matches!(self, SubjectKind::Group | SubjectKind::Household)
    }
}

impl fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubjectKind::Person => "Person",
            SubjectKind::Individual => "Individual",
            SubjectKind::Group => "Group",
            SubjectKind::Household => "Household",
            SubjectKind::User => "User",
        };
        write!(f, "{}", s)
    }
}

/// A registrable subject type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectType {
    pub uuid: SubjectTypeId,
    pub name: String,
    pub kind: SubjectKind,
    /// Explicit group flag from the server, independent of `kind`
    pub group: bool,
}

impl SubjectType {
    /// Whether this subject type can be exported as a group subject
    pub fn is_group(&self) -> bool {
        self.group || self.kind.is_group()
    }
}

/// A program subjects can be enrolled in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub uuid: ProgramId,
    pub name: String,
}

/// A kind of encounter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterType {
    pub uuid: EncounterTypeId,
    pub name: String,
}

/// Form mapping type, only the ones that shape export options are distinguished
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormType {
    ProgramEnrolment,
    ProgramEncounter,
    Encounter,
    Other,
}

impl FormType {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("ProgramEnrolment") => FormType::ProgramEnrolment,
            Some("ProgramEncounter") => FormType::ProgramEncounter,
            Some("Encounter") => FormType::Encounter,
            _ => FormType::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_kind_parse() {
        assert_eq!(SubjectKind::parse(Some("Person")), SubjectKind::Person);
        assert_eq!(SubjectKind::parse(Some("household")), SubjectKind::Household);
        assert_eq!(SubjectKind::parse(Some("Mystery")), SubjectKind::Individual);
        assert_eq!(SubjectKind::parse(None), SubjectKind::Individual);
    }

    #[test]
    fn test_group_detection() {
        let household = SubjectType {
            uuid: "h".into(),
            name: "Household".to_string(),
            kind: SubjectKind::Household,
            group: false,
        };
        assert!(household.is_group());

        let flagged = SubjectType {
            uuid: "f".into(),
            name: "Farm".to_string(),
            kind: SubjectKind::Individual,
            group: true,
        };
        assert!(flagged.is_group());

        let person = SubjectType {
            uuid: "p".into(),
            name: "Patient".to_string(),
            kind: SubjectKind::Person,
            group: false,
        };
        assert!(!person.is_group());
    }

    #[test]
    fn test_form_type_parse() {
        assert_eq!(FormType::parse(Some("ProgramEncounter")), FormType::ProgramEncounter);
        assert_eq!(FormType::parse(Some("IndividualProfile")), FormType::Other);
        assert_eq!(FormType::parse(None), FormType::Other);
    }
}
