//! rx-core - Core library for rx-export
//!
//! This crate provides the business logic behind a longitudinal export
//! request: the typed operational-modules lookup table, the export request
//! reducer, option derivation, request-body construction and the submission
//! guard. Everything here is synchronous and free of I/O except config and
//! snapshot loading.

pub mod error;
pub mod types;
pub mod config;
pub mod modules;
pub mod request;
pub mod jobs;
pub mod user;

pub use error::{Result, RxError};
pub use types::*;
