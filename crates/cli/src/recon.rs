//! `rowmatch run` / `rowmatch validate`: job-file driven two-source comparison.

use std::path::{Path, PathBuf};

use rowmatch_io::{decode, encode_to_file};
use rowmatch_recon::model::{DuplicateRecord, Record};
use rowmatch_recon::{compare, ComparisonResult, Dataset, JobConfig, Side, TracingObserver};

use crate::exit_codes::{
    recon_exit_code, EXIT_RECON_INVALID_CONFIG, EXIT_RECON_MISMATCH, EXIT_RECON_RUNTIME,
};
use crate::CliError;

pub const MISSING_IN_A_FILE: &str = "missing_in_a.csv";
pub const MISSING_IN_B_FILE: &str = "missing_in_b.csv";
pub const DUPLICATES_A_FILE: &str = "duplicates_a.csv";
pub const DUPLICATES_B_FILE: &str = "duplicates_b.csv";

fn recon_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

fn load_job(job_path: &Path) -> Result<JobConfig, CliError> {
    let job_str = std::fs::read_to_string(job_path)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot read job file: {e}")))?;

    JobConfig::from_toml(&job_str).map_err(|e| {
        recon_err(EXIT_RECON_INVALID_CONFIG, e.to_string())
            .with_hint("a job needs [source_a], [source_b] and at least one [[keys]] entry")
    })
}

/// Decode one side's CSV, resolving its path relative to the job file.
fn load_source(base_dir: &Path, job: &JobConfig, side: Side) -> Result<Dataset, CliError> {
    let source = job.source(side);
    let path = base_dir.join(&source.file);

    let bytes = std::fs::read(&path).map_err(|e| {
        recon_err(EXIT_RECON_RUNTIME, format!("cannot read {}: {e}", path.display()))
    })?;

    let dataset = decode(source.display_name(), &bytes)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, e.to_string()))?;

    tracing::debug!(
        side = %side,
        path = %path.display(),
        headers = dataset.headers.len(),
        rows = dataset.rows.len(),
        "decoded source"
    );
    Ok(dataset)
}

pub fn cmd_run(
    job_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    export_dir: Option<PathBuf>,
) -> Result<(), CliError> {
    let job = load_job(&job_path)?;
    let base_dir = job_path.parent().unwrap_or_else(|| Path::new("."));

    let a = load_source(base_dir, &job, Side::A)?;
    let b = load_source(base_dir, &job, Side::B)?;

    let result = compare(&a, &b, &job.comparison, &TracingObserver)
        .map_err(|e| recon_err(recon_exit_code(&e), e.to_string()))?;

    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("JSON serialization error: {e}")))?;

    if let Some(ref path) = output_file {
        std::fs::write(path, &json_str)
            .map_err(|e| recon_err(EXIT_RECON_RUNTIME, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    if let Some(ref dir) = export_dir {
        write_exports(dir, &a, &b, &result)?;
        eprintln!("exported discrepancy lists to {}", dir.display());
    }

    print_summary(&job, &result);

    if !result.stats.is_reconciled() {
        return Err(recon_err(EXIT_RECON_MISMATCH, "discrepancies found"));
    }
    Ok(())
}

/// Human summary to stderr.
fn print_summary(job: &JobConfig, result: &ComparisonResult) {
    let s = &result.stats;
    let label = if job.name.is_empty() { "comparison" } else { job.name.as_str() };

    eprintln!(
        "{label}: {} matched key(s), {} row(s) missing in {}, {} row(s) missing in {}",
        s.matched, s.missing_in_a, result.source_a_name, s.missing_in_b, result.source_b_name,
    );
    eprintln!(
        "  {}: {} rows, {} unique, {} duplicate(s), {} skipped",
        result.source_a_name, s.total_a, s.valid_unique_a, s.duplicates_a, s.skipped_a,
    );
    eprintln!(
        "  {}: {} rows, {} unique, {} duplicate(s), {} skipped",
        result.source_b_name, s.total_b, s.valid_unique_b, s.duplicates_b, s.skipped_b,
    );
}

/// Rows missing on one side are written under the headers of the side they
/// came from; duplicate lists gain a trailing Count column.
fn write_exports(
    dir: &Path,
    a: &Dataset,
    b: &Dataset,
    result: &ComparisonResult,
) -> Result<(), CliError> {
    std::fs::create_dir_all(dir).map_err(|e| {
        recon_err(EXIT_RECON_RUNTIME, format!("cannot create {}: {e}", dir.display()))
    })?;

    export(&dir.join(MISSING_IN_A_FILE), &b.headers, &result.rows_missing_in_a)?;
    export(&dir.join(MISSING_IN_B_FILE), &a.headers, &result.rows_missing_in_b)?;
    export(
        &dir.join(DUPLICATES_A_FILE),
        &with_count(&a.headers),
        &export_records(&result.duplicated_rows_a),
    )?;
    export(
        &dir.join(DUPLICATES_B_FILE),
        &with_count(&b.headers),
        &export_records(&result.duplicated_rows_b),
    )?;
    Ok(())
}

fn export(path: &Path, headers: &[String], records: &[Record]) -> Result<(), CliError> {
    encode_to_file(path, headers, records).map_err(|e| recon_err(EXIT_RECON_RUNTIME, e.to_string()))
}

fn with_count(headers: &[String]) -> Vec<String> {
    let mut headers = headers.to_vec();
    headers.push(DuplicateRecord::COUNT_FIELD.to_string());
    headers
}

fn export_records(duplicates: &[DuplicateRecord]) -> Vec<Record> {
    duplicates.iter().map(DuplicateRecord::to_export_record).collect()
}

pub fn cmd_validate(job_path: PathBuf) -> Result<(), CliError> {
    let job = load_job(&job_path)?;
    let name = if job.name.is_empty() { "(unnamed)" } else { job.name.as_str() };

    eprintln!(
        "valid: job '{}' comparing '{}' and '{}' on {} key field(s)",
        name,
        job.source_a.display_name(),
        job.source_b.display_name(),
        job.comparison.key_mappings.len(),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_column_is_appended() {
        let headers = vec!["ID".to_string(), "NAME".to_string()];
        assert_eq!(with_count(&headers), vec!["ID", "NAME", "Count"]);
    }

    #[test]
    fn missing_job_file_is_runtime_error() {
        let err = load_job(Path::new("/no/such/job.toml")).unwrap_err();
        assert_eq!(err.code, EXIT_RECON_RUNTIME);
        assert!(err.message.contains("cannot read job file"));
    }
}
