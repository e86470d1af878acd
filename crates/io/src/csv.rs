// CSV decode/encode for comparison sources and exports

use std::collections::HashSet;
use std::io::Read;
use std::path::Path;

use rowmatch_recon::model::{Dataset, Record, Row};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CsvError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("{name}: malformed CSV: {source}")]
    Malformed { name: String, source: csv::Error },
    #[error("{name}: duplicate header '{header}'")]
    DuplicateHeader { name: String, header: String },
    #[error("CSV encode error: {0}")]
    Encode(#[from] csv::Error),
}

const UTF8_BOM: &str = "\u{feff}";

/// Read a CSV file into a dataset named after the file.
pub fn decode_file(path: &Path) -> Result<Dataset, CsvError> {
    let mut file = std::fs::File::open(path).map_err(|source| CsvError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|source| CsvError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    decode(&name, &bytes)
}

/// Decode CSV bytes. The first record is the header row; an empty input
/// yields a dataset with no headers.
pub fn decode(name: &str, bytes: &[u8]) -> Result<Dataset, CsvError> {
    let content = to_utf8(bytes);
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(&content);
    let delimiter = sniff_delimiter(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut records = reader.records();

    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|source| CsvError::Malformed {
                name: name.to_string(),
                source,
            })?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Ok(Dataset::new(name, Vec::new(), Vec::new())),
    };

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(CsvError::DuplicateHeader {
                name: name.to_string(),
                header: header.clone(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in records {
        let record = record.map_err(|source| CsvError::Malformed {
            name: name.to_string(),
            source,
        })?;
        // Blank lines come through as a single empty field
        if record.len() == 1 && record.get(0).is_some_and(str::is_empty) {
            continue;
        }
        rows.push(Row::new(record.iter().map(str::to_string).collect()));
    }

    Ok(Dataset::new(name, headers, rows))
}

/// Encode records under `headers`. Fields a record lacks are written empty.
pub fn encode(headers: &[String], records: &[Record]) -> Result<Vec<u8>, CsvError> {
    let mut writer = csv::WriterBuilder::new().from_writer(Vec::new());

    writer.write_record(headers)?;
    for record in records {
        writer.write_record(headers.iter().map(|h| record.get(h).unwrap_or("")))?;
    }

    writer
        .into_inner()
        .map_err(|e| CsvError::Encode(csv::Error::from(e.into_error())))
}

pub fn encode_to_file(path: &Path, headers: &[String], records: &[Record]) -> Result<(), CsvError> {
    let bytes = encode(headers, records)?;
    std::fs::write(path, bytes).map_err(|source| CsvError::Write {
        path: path.display().to_string(),
        source,
    })
}

/// Decode as UTF-8, falling back to Windows-1252 (common for Excel-exported CSVs).
fn to_utf8(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

/// Candidate delimiters in preference order; an earlier one wins a tied score.
const DELIMITERS: [u8; 4] = [b'\t', b';', b',', b'|'];

/// Records sampled per candidate.
const SNIFF_RECORDS: usize = 10;

/// Pick the candidate that splits the header row into the most fields and
/// keeps the sampled records at that width. Falls back to comma.
fn sniff_delimiter(content: &str) -> u8 {
    let mut best: Option<(usize, u8)> = None;
    for delim in DELIMITERS {
        let Some(score) = delimiter_score(content, delim) else {
            continue;
        };
        if best.map_or(true, |(best_score, _)| score > best_score) {
            best = Some((score, delim));
        }
    }
    best.map_or(b',', |(_, delim)| delim)
}

/// Header width times the number of sampled records sharing it. `None` when
/// the header row does not split at all.
fn delimiter_score(content: &str, delim: u8) -> Option<usize> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delim)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let widths: Vec<usize> = reader
        .records()
        .take(SNIFF_RECORDS)
        .map_while(Result::ok)
        .map(|record| record.len())
        .collect();

    let width = widths.first().copied().filter(|&w| w > 1)?;
    Some(width * widths.iter().filter(|&&w| w == width).count())
}
