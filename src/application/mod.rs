// Application layer: run orchestration and report rendering

pub mod pipeline;
pub mod report;

pub use pipeline::{GrindAnalysisService, RunError, RunOutcome, RunSettings};
pub use report::{format_decimal, report_file_name, MAX_PRECISION, write_workbook, ExpectationTable, ReportError};
