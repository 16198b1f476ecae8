//! Report formatters for scan results.
//!
//! - [`text`]: coloured table for terminals
//! - [`json`]: machine-readable report for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupescan::engine::begin_scan;
//! use dupescan::error::ExitCode;
//! use dupescan::output::JsonOutput;
//! use dupescan::scanner::RootSet;
//! use dupescan::session::ScanSession;
//!
//! let roots: RootSet = ["."].into_iter().collect();
//! let handle = begin_scan(&roots).unwrap();
//! let mut session = ScanSession::new();
//! let outcome = handle.drain_into(&mut session).unwrap();
//!
//! let report = session.current_groups();
//! let output = JsonOutput::new(&report, &outcome, ExitCode::for_scan(&outcome, &report));
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
