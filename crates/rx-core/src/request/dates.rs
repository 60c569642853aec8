//! Date filter fields

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Message stored on a date field whose text could not be parsed
pub const INVALID_DATE_MESSAGE: &str = "Invalid date format, use yyyy-mm-dd or dd/mm/yyyy";

/// Accepted input patterns, tried in order
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// What the user has put into a date picker
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateInput {
    #[default]
    Unset,
    Valid(NaiveDate),
    /// Text that did not parse, kept until the picker is closed
    Invalid(String),
}

/// A date filter together with its validation message
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateField {
    pub input: DateInput,
    pub error: Option<String>,
}

impl DateField {
    /// Field holding a typed date (or nothing)
    pub fn from_date(date: Option<NaiveDate>) -> Self {
        Self {
            input: date.map(DateInput::Valid).unwrap_or_default(),
            error: None,
        }
    }

    /// Field built from user text
    ///
    /// Blank text clears the field. Unparseable text is kept and flagged.
    pub fn from_text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::default();
        }
        match parse_date(trimmed) {
            Some(date) => Self::from_date(Some(date)),
            None => Self {
                input: DateInput::Invalid(trimmed.to_string()),
                error: Some(INVALID_DATE_MESSAGE.to_string()),
            },
        }
    }

    /// Drop an unparseable value and its error, as closing the picker does
    pub fn closed(&self) -> Self {
        match &self.input {
            DateInput::Invalid(_) => Self::default(),
            other => Self {
                input: other.clone(),
                error: None,
            },
        }
    }

    /// The selected date, when it is valid
    pub fn date(&self) -> Option<NaiveDate> {
        match self.input {
            DateInput::Valid(date) => Some(date),
            _ => None,
        }
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self.input, DateInput::Invalid(_)) || self.error.is_some()
    }
}

/// Parse a date in one of the accepted formats
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s.trim(), fmt).ok())
}

/// UTC midnight of the date, as sent to the server
pub fn utc_midnight(date: NaiveDate) -> String {
    format!("{}T00:00:00.000Z", date.format("%Y-%m-%d"))
}
