//! Operational modules lookup table
//!
//! The server describes what an organisation has configured (subject types,
//! programs, encounter types) as a loosely-typed blob whose relationships
//! live in form mappings. This module parses that blob once, validates every
//! reference, and exposes typed lookups used to derive the selectable
//! options of an export request.
//!
//! # Example
//!
//! ```ignore
//! use rx_core::modules::OperationalModules;
//!
//! let modules = OperationalModules::load(Path::new("modules.json"))?;
//! for program in modules.programs_for(&subject_type_id) {
//!     println!("{}", program.name);
//! }
//! ```

mod model;
mod raw;
mod table;

pub use model::{EncounterType, FormType, Program, SubjectKind, SubjectType};
pub use raw::{
    RawEncounterType, RawFormMapping, RawOperationalModules, RawProgram, RawSubjectType,
};
pub use table::OperationalModules;
