use anyhow::{anyhow, Context, Result};
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};
use vitalwatch_common::types::{MeasurementRecord, MeasurementValue, RecordType};
use vitalwatch_storage::DataStore;

/// Outcome of one ingestion run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestReport {
    pub accepted: usize,
    pub malformed: usize,
    pub rejected: usize,
}

/// Parses one `patientId,value,label,timestamp` line.
///
/// Values are `systolic/diastolic` for pairs, `a;b;c` for vectors, and a
/// plain number otherwise.
pub fn parse_line(line: &str) -> Result<MeasurementRecord> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [patient_id, value, label, timestamp] = fields.as_slice() else {
        return Err(anyhow!("expected 4 fields, found {}", fields.len()));
    };

    let patient_id: u32 = patient_id
        .parse()
        .with_context(|| format!("invalid patient id '{patient_id}'"))?;
    let value = parse_value(value)?;
    if label.is_empty() {
        return Err(anyhow!("empty record label"));
    }
    let timestamp: i64 = timestamp
        .parse()
        .with_context(|| format!("invalid timestamp '{timestamp}'"))?;

    Ok(MeasurementRecord::new(
        patient_id,
        RecordType::from_label(label),
        value,
        timestamp,
    ))
}

fn parse_number(raw: &str) -> Result<f64> {
    raw.trim()
        .parse()
        .with_context(|| format!("invalid number '{raw}'"))
}

fn parse_value(raw: &str) -> Result<MeasurementValue> {
    if let Some((systolic, diastolic)) = raw.split_once('/') {
        return Ok(MeasurementValue::from((
            parse_number(systolic)?,
            parse_number(diastolic)?,
        )));
    }
    if raw.contains(';') {
        let values = raw.split(';').map(parse_number).collect::<Result<Vec<_>>>()?;
        return Ok(MeasurementValue::from(values));
    }
    Ok(MeasurementValue::from(parse_number(raw)?))
}

/// Reads a measurement file into `store`.
///
/// Blank lines are skipped. Unparseable lines and measurements the store
/// rejects are logged and counted; only I/O failures abort the run.
pub async fn ingest_file(path: impl AsRef<Path>, store: &DataStore) -> Result<IngestReport> {
    let path = path.as_ref();
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open measurement file '{}'", path.display()))?;
    let mut lines = BufReader::new(file).lines();
    let mut report = IngestReport::default();
    let mut line_no = 0usize;

    while let Some(line) = lines
        .next_line()
        .await
        .with_context(|| format!("Failed to read '{}'", path.display()))?
    {
        line_no += 1;
        if line.trim().is_empty() {
            continue;
        }

        let record = match parse_line(&line) {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Skipping malformed measurement line");
                report.malformed += 1;
                continue;
            }
        };

        match store.add_measurement(record) {
            Ok(()) => report.accepted += 1,
            Err(e) => {
                tracing::warn!(line = line_no, error = %e, "Measurement rejected");
                report.rejected += 1;
            }
        }
    }

    tracing::info!(
        path = %path.display(),
        accepted = report.accepted,
        malformed = report.malformed,
        rejected = report.rejected,
        "Measurement file ingested"
    );
    Ok(report)
}
