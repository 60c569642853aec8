//! rx-export - Longitudinal export CLI
//!
//! Builds export requests against a platform server's operational modules,
//! submits them, and shows export job statuses.
//!
//! ## Quick Start
//!
//! ```bash
//! # Point at a server
//! rx-export config reset
//! $EDITOR .rx-export/config.toml
//!
//! # Preview a payload
//! rx-export export --report-type encounter --subject-type Patient \
//!     --program TB --encounter-type "Monthly Visit" --dry-run
//!
//! # Submit interactively, then check progress
//! rx-export export --interactive
//! rx-export status
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
