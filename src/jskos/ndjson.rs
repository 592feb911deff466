//! Line-by-line validation of NDJSON files of JSKOS records

use std::fs;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde_json::Value;
use tracing::{debug, warn};

use super::{JskosValidator, RecordOutcome};
use crate::error::{DataciteError, Result};

/// Outcome for one non-blank input line
#[derive(Debug, Clone, PartialEq)]
pub struct LineReport {
    /// 1-based line number
    pub line: usize,
    pub outcome: RecordOutcome,
}

/// Tally of a validation run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationSummary {
    pub valid: usize,
    pub invalid: usize,
    pub skipped: usize,
    /// Per-line outcomes, in input order
    pub reports: Vec<LineReport>,
}

impl ValidationSummary {
    fn record(&mut self, line: usize, outcome: RecordOutcome) {
        if outcome.is_valid() {
            self.valid += 1;
        } else if outcome.is_invalid() {
            self.invalid += 1;
        } else {
            self.skipped += 1;
        }
        self.reports.push(LineReport { line, outcome });
    }

    /// Number of records seen, skipped ones included
    pub fn total(&self) -> usize {
        self.valid + self.invalid + self.skipped
    }

    pub fn all_valid(&self) -> bool {
        self.invalid == 0
    }

    /// Reports of records that failed
    pub fn failures(&self) -> impl Iterator<Item = &LineReport> {
        self.reports.iter().filter(|r| r.outcome.is_invalid())
    }
}

/// Validate every line of an NDJSON stream
pub fn validate_reader<R: BufRead>(
    validator: &JskosValidator,
    reader: R,
) -> Result<ValidationSummary> {
    let mut summary = ValidationSummary::default();

    for (index, bytes) in reader.split(b'\n').enumerate() {
        let line_no = index + 1;
        let outcome = match String::from_utf8(bytes?) {
            Ok(line) if line.trim().is_empty() => continue,
            Ok(line) => match serde_json::from_str::<Value>(&line) {
                Ok(record) => validator.check(&record),
                Err(e) => RecordOutcome::Malformed(e.to_string()),
            },
            Err(e) => RecordOutcome::Malformed(format!("invalid UTF-8: {}", e)),
        };

        match &outcome {
            RecordOutcome::Skipped(found) => {
                warn!(line = line_no, "skipping record with unknown type {}", found);
            }
            RecordOutcome::Malformed(reason) => {
                warn!(line = line_no, "malformed record: {}", reason);
            }
            other => debug!(line = line_no, valid = other.is_valid(), "checked record"),
        }

        summary.record(line_no, outcome);
    }

    Ok(summary)
}

/// Validate an NDJSON file
pub fn validate_file(
    validator: &JskosValidator,
    path: impl AsRef<Path>,
) -> Result<ValidationSummary> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DataciteError::not_found("NDJSON file", path));
    }
    let file = fs::File::open(path)?;
    validate_reader(validator, BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jskos::RecordKind;

    const MAPPING: &str = r#"{"from":{"memberSet":[{"uri":"https://example.org/a"}]},"to":{"memberSet":[{"uri":"http://schema.org/name"}]},"type":["http://www.w3.org/2004/02/skos/core#closeMatch"]}"#;

    #[test]
    fn test_tally() {
        let validator = JskosValidator::new().unwrap();
        let input = format!(
            "{}\n\n{{\"type\":[\"skos:exactMatch\"],\"to\":{{\"memberSet\":[]}}}}\n{{\"type\":\"other\"}}\nnot json\n",
            MAPPING
        );
        let summary = validate_reader(&validator, input.as_bytes()).unwrap();

        assert_eq!(summary.valid, 1);
        assert_eq!(summary.invalid, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.total(), 4);
        assert!(!summary.all_valid());

        let lines: Vec<usize> = summary.reports.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![1, 3, 4, 5]);
        assert_eq!(summary.reports[0].outcome, RecordOutcome::Valid(RecordKind::Mapping));
        assert_eq!(summary.failures().count(), 2);
    }

    #[test]
    fn test_invalid_utf8_line_is_malformed() {
        let validator = JskosValidator::new().unwrap();
        let mut input = Vec::new();
        input.extend_from_slice(MAPPING.as_bytes());
        input.extend_from_slice(b"\n{\"x\":\"\xff\"}\n");
        input.extend_from_slice(MAPPING.as_bytes());
        input.extend_from_slice(b"\r\n");

        let summary = validate_reader(&validator, input.as_slice()).unwrap();
        assert_eq!(summary.valid, 2);
        assert_eq!(summary.invalid, 1);
        assert!(matches!(
            &summary.reports[1].outcome,
            RecordOutcome::Malformed(reason) if reason.starts_with("invalid UTF-8")
        ));
        assert_eq!(summary.reports[2].line, 3);
    }

    #[test]
    fn test_empty_input() {
        let validator = JskosValidator::new().unwrap();
        let summary = validate_reader(&validator, "".as_bytes()).unwrap();
        assert_eq!(summary, ValidationSummary::default());
        assert!(summary.all_valid());
    }

    #[test]
    fn test_missing_file() {
        let validator = JskosValidator::new().unwrap();
        let result = validate_file(&validator, "does/not/exist.ndjson");
        assert!(matches!(result, Err(DataciteError::NotFound { .. })));
    }
}
