//! Product information shown at the top of every report.
//!
//! ICT station files are named `YYYYMMDD_<board serial>.TXT`. The run date
//! comes from that prefix; program and line are not encoded in the name and
//! always come from configuration.

use chrono::NaiveDate;
use tracing::debug;

pub const DEFAULT_PROGRAM: &str = "AUT1077-HC00";
pub const DEFAULT_LINE: &str = "Line 9";

const RUN_DATE_FORMAT: &str = "%d-%b-%y";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportMetadata {
    pub program: String,
    pub smt_run: String,
    pub smt_line: String,
}

/// Values used for whatever the file name cannot supply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataDefaults {
    pub program: String,
    pub smt_line: String,
}

impl Default for MetadataDefaults {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            smt_line: DEFAULT_LINE.to_string(),
        }
    }
}

/// Fields entered by the operator; each one replaces the derived value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataOverrides {
    pub program: Option<String>,
    pub smt_run: Option<String>,
    pub smt_line: Option<String>,
}

impl MetadataOverrides {
    pub fn apply(&self, mut metadata: ReportMetadata) -> ReportMetadata {
        if let Some(program) = &self.program {
            metadata.program = program.clone();
        }
        if let Some(smt_run) = &self.smt_run {
            metadata.smt_run = smt_run.clone();
        }
        if let Some(smt_line) = &self.smt_line {
            metadata.smt_line = smt_line.clone();
        }
        metadata
    }
}

/// Format a date the way reports show the SMT run, e.g. `27-Jun-25`.
pub fn format_run_date(date: NaiveDate) -> String {
    date.format(RUN_DATE_FORMAT).to_string()
}

/// Parse the `YYYYMMDD` prefix of a file name.
///
/// Returns `None` when the name is shorter than eight characters, when any
/// of the first eight is not an ASCII digit, or when the digits do not form
/// a calendar date.
pub fn run_date_from_filename(filename: &str) -> Option<NaiveDate> {
    let prefix = filename.get(..8)?;
    if !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = prefix[0..4].parse().ok()?;
    let month: u32 = prefix[4..6].parse().ok()?;
    let day: u32 = prefix[6..8].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Build report metadata for `filename`, falling back to `today` as the
/// run date when the name carries no usable date prefix.
pub fn extract_metadata(
    filename: &str,
    defaults: &MetadataDefaults,
    today: NaiveDate,
) -> ReportMetadata {
    let run_date = run_date_from_filename(filename).unwrap_or_else(|| {
        debug!(file = filename, "no date prefix in file name, using today");
        today
    });

    ReportMetadata {
        program: defaults.program.clone(),
        smt_run: format_run_date(run_date),
        smt_line: defaults.smt_line.clone(),
    }
}
