use crate::error::{Error, Result};
use crate::metadata::{self, MetadataDefaults, MetadataOverrides};
use crate::reader;
use crate::writer;
use chrono::NaiveDate;
use glob::{glob_with, MatchOptions, Pattern};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

pub const DEFAULT_PREFIX: &str = "Test_Report_";
const REPORT_EXTENSION: &str = "xlsx";

/// Everything a conversion needs besides the input files.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub output_dir: PathBuf,
    pub prefix: String,
    pub defaults: MetadataDefaults,
    pub overrides: MetadataOverrides,
}

impl ConvertConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            prefix: DEFAULT_PREFIX.to_string(),
            defaults: MetadataDefaults::default(),
            overrides: MetadataOverrides::default(),
        }
    }
}

/// Outcome of one converted file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub output: PathBuf,
    pub records: usize,
    pub tally: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: usize,
    pub failed: usize,
    pub output_dir: PathBuf,
}

pub fn output_path_for(input: &Path, config: &ConvertConfig) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy())
        .unwrap_or_default();
    config
        .output_dir
        .join(format!("{}{}.{}", config.prefix, stem, REPORT_EXTENSION))
}

/// Read one record file, derive its metadata and write its report.
pub fn convert_file(input: &Path, config: &ConvertConfig, today: NaiveDate) -> Result<FileReport> {
    let filename = display_name(input);
    let record_set = reader::read_records(input)?;
    info!(
        file = %filename,
        records = record_set.records.len(),
        missing_columns = record_set.missing.len(),
        "read records"
    );

    let derived = metadata::extract_metadata(&filename, &config.defaults, today);
    let metadata = config.overrides.apply(derived);

    let output = output_path_for(input, config);
    writer::write_report(&record_set.records, &metadata, &output)?;

    Ok(FileReport {
        output,
        records: record_set.records.len(),
        tally: record_set.result_tally(),
    })
}

/// Convert each input in turn. A failing file is logged and counted; it
/// never stops the remaining files.
pub fn convert_files(inputs: &[PathBuf], config: &ConvertConfig, today: NaiveDate) -> BatchSummary {
    let mut summary = BatchSummary {
        output_dir: config.output_dir.clone(),
        ..Default::default()
    };

    for input in inputs {
        let name = display_name(input);
        info!(file = %name, "processing");

        match convert_file(input, config, today) {
            Ok(report) => {
                info!(
                    file = %name,
                    output = %report.output.display(),
                    records = report.records,
                    "converted"
                );
                for (result, count) in &report.tally {
                    info!(file = %name, result = %result, count, "result summary");
                }
                summary.processed += 1;
            }
            Err(e) => {
                error!(file = %name, error = %e, "failed to convert");
                summary.failed += 1;
            }
        }
    }

    summary
}

/// Files in `dir` whose extension matches `extension`, ignoring case.
pub fn find_inputs(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::FileNotFound(dir.to_path_buf()));
    }

    let pattern = format!(
        "{}/*.{}",
        Pattern::escape(&dir.to_string_lossy()),
        Pattern::escape(extension.trim_start_matches('.'))
    );
    let options = MatchOptions {
        case_sensitive: false,
        ..MatchOptions::new()
    };

    let mut files: Vec<PathBuf> = glob_with(&pattern, options)?
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Unattended scan of `input_dir`. Nothing is written when no inputs match.
pub fn run_batch(
    input_dir: &Path,
    extension: &str,
    config: &ConvertConfig,
    today: NaiveDate,
) -> Result<BatchSummary> {
    let inputs = find_inputs(input_dir, extension)?;
    if inputs.is_empty() {
        warn!(dir = %input_dir.display(), extension, "no input files found");
        return Ok(BatchSummary {
            output_dir: config.output_dir.clone(),
            ..Default::default()
        });
    }

    info!(count = inputs.len(), dir = %input_dir.display(), "found input files");
    for input in &inputs {
        debug!(file = %display_name(input), "queued");
    }

    run_convert(&inputs, config, today)
}

/// Convert an explicit list of files, creating the output directory first.
pub fn run_convert(
    inputs: &[PathBuf],
    config: &ConvertConfig,
    today: NaiveDate,
) -> Result<BatchSummary> {
    if inputs.is_empty() {
        return Ok(BatchSummary {
            output_dir: config.output_dir.clone(),
            ..Default::default()
        });
    }

    fs::create_dir_all(&config.output_dir)?;
    Ok(convert_files(inputs, config, today))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
