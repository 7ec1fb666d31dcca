//! Flat-file report artifacts for Dramaturg.
//!
//! Analysis runs leave plain text reports, one JSON result and an index in a
//! single output directory. Nothing here is read back by the pipeline.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod reports;

pub use reports::{FINAL_REPORT_FILE, INDEX_FILE, RESULT_FILE, ReportStore};
