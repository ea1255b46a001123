use crate::error::{Error, Result};
use csv::{ReaderBuilder, Trim};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// A column of an ICT result file, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Result,
    Board,
    Type,
    Part,
    ActVal,
    StdVal,
    HL,
    LL,
    Mode,
    Range,
    TestVal,
}

impl Field {
    pub const ALL: [Field; 11] = [
        Field::Result,
        Field::Board,
        Field::Type,
        Field::Part,
        Field::ActVal,
        Field::StdVal,
        Field::HL,
        Field::LL,
        Field::Mode,
        Field::Range,
        Field::TestVal,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Result => "Result",
            Field::Board => "Board",
            Field::Type => "Type",
            Field::Part => "Part",
            Field::ActVal => "ActVal",
            Field::StdVal => "StdVal",
            Field::HL => "HL",
            Field::LL => "LL",
            Field::Mode => "Mode",
            Field::Range => "Range",
            Field::TestVal => "TestVal",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// One tested component. Columns absent from the source file read as "".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    values: [String; 11],
}

impl Record {
    pub fn get(&self, field: Field) -> &str {
        &self.values[field.index()]
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) -> &mut Self {
        self.values[field.index()] = value.into();
        self
    }

    /// True when the trimmed, uppercased `Result` is exactly `PASS`.
    pub fn is_pass(&self) -> bool {
        self.get(Field::Result).trim().to_uppercase() == "PASS"
    }
}

/// All records of one input file.
#[derive(Debug, Clone)]
pub struct RecordSet {
    pub records: Vec<Record>,
    pub missing: Vec<Field>,
}

impl RecordSet {
    /// Number of records per distinct `Result` value, most frequent first.
    /// Empty results are not counted.
    pub fn result_tally(&self) -> Vec<(String, usize)> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for record in &self.records {
            let result = record.get(Field::Result);
            if !result.trim().is_empty() {
                *counts.entry(result).or_default() += 1;
            }
        }

        let mut tally: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(result, count)| (result.to_string(), count))
            .collect();
        tally.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tally
    }
}

/// Read a comma-separated ICT result file.
///
/// Header names are trimmed and leading whitespace before each value is
/// skipped. Expected columns missing from the header produce a single
/// warning and read as empty values; unknown columns are ignored.
pub fn read_records(path: &Path) -> Result<RecordSet> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let raw = fs::read(path)?;
    let cleaned = skip_initial_space(&raw);
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(cleaned.as_slice());

    let headers = reader.headers().map_err(|e| invalid(path, e))?.clone();
    if headers.iter().all(str::is_empty) {
        return Err(Error::InvalidRecords {
            path: path.to_path_buf(),
            details: "no header row".to_string(),
        });
    }

    let mut columns = Vec::with_capacity(Field::ALL.len());
    let mut missing = Vec::new();
    for field in Field::ALL {
        match headers.iter().position(|h| h == field.name()) {
            Some(idx) => columns.push((field, idx)),
            None => missing.push(field),
        }
    }

    if !missing.is_empty() {
        let names: Vec<&str> = missing.iter().map(|f| f.name()).collect();
        warn!(
            file = %path.display(),
            missing = %names.join(", "),
            "missing expected columns"
        );
    }

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| invalid(path, e))?;
        let mut record = Record::default();
        for &(field, idx) in &columns {
            if let Some(value) = row.get(idx) {
                record.set(field, value);
            }
        }
        records.push(record);
    }

    debug!(file = %path.display(), records = records.len(), "parsed records");

    Ok(RecordSet {
        records,
        missing,
    })
}

/// Drop spaces and tabs at the start of every unquoted field, so that a
/// quoted value following `, ` is still read as one field.
fn skip_initial_space(raw: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(raw.len());
    let mut in_quotes = false;
    let mut field_start = true;

    for &byte in raw {
        if field_start && (byte == b' ' || byte == b'\t') {
            continue;
        }
        field_start = false;
        match byte {
            b'"' => in_quotes = !in_quotes,
            b',' | b'\n' if !in_quotes => field_start = true,
            _ => {}
        }
        out.push(byte);
    }
    out
}

fn invalid(path: &Path, err: csv::Error) -> Error {
    Error::InvalidRecords {
        path: path.to_path_buf(),
        details: err.to_string(),
    }
}
