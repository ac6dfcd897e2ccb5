// sluice-core/src/infrastructure/delimited.rs
//
// Comma-delimited reading and writing. Minimal quoting (the csv crate
// default), no synthesized header, records may have differing lengths.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::atomic_write;

/// Serialize records to CSV bytes.
pub fn encode_records<I, R, F>(records: I) -> Result<Vec<u8>, InfrastructureError>
where
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record)?;
    }
    writer
        .into_inner()
        .map_err(|e| InfrastructureError::Io(e.into_error()))
}

/// Write records to `path`, replacing any existing file.
pub fn write_records<P, I, R, F>(path: P, records: I) -> Result<(), InfrastructureError>
where
    P: AsRef<Path>,
    I: IntoIterator<Item = R>,
    R: IntoIterator<Item = F>,
    F: AsRef<[u8]>,
{
    let bytes = encode_records(records)?;
    debug!(path = ?path.as_ref(), bytes = bytes.len(), "Writing delimited file");
    atomic_write(path, bytes)
}

/// Load every record of `path` into memory. The first line is data, not a
/// header. A blank line is an empty record rather than being skipped, so an
/// extra blank line makes two files differ.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<Vec<String>>, InfrastructureError> {
    let content = fs::read_to_string(path.as_ref())?;

    let mut rows = Vec::new();
    let mut pending = String::new();
    for line in content.split_inclusive('\n') {
        pending.push_str(line);
        // Odd quote count: the newline sits inside a quoted field.
        if pending.matches('"').count() % 2 == 1 {
            continue;
        }
        rows.push(parse_record(&pending)?);
        pending.clear();
    }
    if !pending.is_empty() {
        rows.push(parse_record(&pending)?);
    }
    Ok(rows)
}

fn parse_record(raw: &str) -> Result<Vec<String>, InfrastructureError> {
    if raw.trim_end_matches(['\r', '\n']).is_empty() {
        return Ok(Vec::new());
    }
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(raw.as_bytes());
    match reader.records().next() {
        Some(record) => Ok(record?.iter().map(str::to_string).collect()),
        None => Ok(Vec::new()),
    }
}
