pub mod errors;
pub mod models;
pub mod pipeline;

#[cfg(test)]
mod pipeline_tests;

pub use errors::WortkartenError;
pub use models::{ Classification, Record, Tier };
pub use pipeline::{ BatchReport, PatternIssue, RecordFailure };
