//! Core type definitions for rx-export

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl $name {
            /// Create an id from a string
            pub fn from_string(s: impl Into<String>) -> Self {
                $name(s.into())
            }

            /// Get the string value
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }
    };
}

string_id!(
    /// Server uuid of a subject type
    SubjectTypeId
);
string_id!(
    /// Server uuid of a program
    ProgramId
);
string_id!(
    /// Server uuid of an encounter type
    EncounterTypeId
);
string_id!(
    /// Identifier of a node in the address-level hierarchy
    AddressLevelId
);

/// Unique identifier of an export job
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JobId(pub Uuid);

impl JobId {
    /// Create from UUID string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(JobId(Uuid::parse_str(s)?))
    }

    /// First eight characters, enough to tell jobs apart in a listing
    pub fn short(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Category of longitudinal export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportType {
    Registration,
    Enrolment,
    Encounter,
    GroupSubject,
}

impl ReportType {
    /// All report types in display order
    pub const ALL: [ReportType; 4] = [
        ReportType::Registration,
        ReportType::Enrolment,
        ReportType::Encounter,
        ReportType::GroupSubject,
    ];

    /// Wire and display name
    pub fn name(&self) -> &'static str {
        match self {
            ReportType::Registration => "Registration",
            ReportType::Enrolment => "Enrolment",
            ReportType::Encounter => "Encounter",
            ReportType::GroupSubject => "GroupSubject",
        }
    }

    /// Whether a program selection is meaningful for this report type
    pub fn allows_program(&self) -> bool {
        matches!(self, ReportType::Enrolment | ReportType::Encounter)
    }

    /// Whether a program must be selected before submitting
    pub fn requires_program(&self) -> bool {
        matches!(self, ReportType::Enrolment)
    }

    /// Whether an encounter type is meaningful (and required) for this report type
    pub fn requires_encounter_type(&self) -> bool {
        matches!(self, ReportType::Encounter)
    }

    /// Whether only group subject types may be selected
    pub fn requires_group_subject(&self) -> bool {
        matches!(self, ReportType::GroupSubject)
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ReportType {
    type Err = crate::RxError;

    fn from_str(s: &str) -> crate::Result<Self> {
        ReportType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| crate::RxError::Validation(format!("Unknown report type: {}", s)))
    }
}
