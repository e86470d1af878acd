use std::collections::BTreeSet;
use std::sync::Mutex;

use rowmatch_recon::config::{ComparisonConfig, JobConfig, NormalizationRules, SideRules};
use rowmatch_recon::model::{Dataset, KeyMapping};
use rowmatch_recon::{compare, Level, NoopObserver, ReconError};

fn set(fields: &[&str]) -> BTreeSet<String> {
    fields.iter().map(|f| (*f).to_string()).collect()
}

// -------------------------------------------------------------------------
// Scenarios
// -------------------------------------------------------------------------

#[test]
fn leading_zeros_on_a_match_plain_ids_on_b() {
    let a = Dataset::from_pairs("crm", &["ID", "NAME"], &[vec![("ID", "007"), ("NAME", "Alice")]]);
    let b = Dataset::from_pairs("billing", &["CUST", "NAME"], &[vec![("CUST", "7"), ("NAME", "Alice")]]);
    let rules = NormalizationRules {
        a: SideRules {
            remove_leading_zeros: true,
            leading_zero_fields: set(&["ID"]),
            ..SideRules::default()
        },
        ..NormalizationRules::default()
    };
    let config = ComparisonConfig::new(vec![KeyMapping::new("ID", "CUST")], rules);

    let result = compare(&a, &b, &config, &NoopObserver).unwrap();
    assert_eq!(result.stats.matched, 1);
    assert_eq!(result.stats.missing_in_a, 0);
    assert_eq!(result.stats.missing_in_b, 0);
    assert!(result.stats.is_reconciled());
}

#[test]
fn whitespace_duplicates_collapse() {
    let a = Dataset::from_pairs("a", &["V"], &[vec![("V", "  X  ")], vec![("V", "X")]]);
    let b = Dataset::from_pairs("b", &["V"], &[vec![("V", "X")]]);
    let config = ComparisonConfig::new(
        vec![KeyMapping::new("V", "V")],
        NormalizationRules {
            trim_whitespace: true,
            ..NormalizationRules::default()
        },
    );

    let result = compare(&a, &b, &config, &NoopObserver).unwrap();
    assert_eq!(result.stats.duplicates_a, 1);
    assert_eq!(result.stats.valid_unique_a, 1);
    assert_eq!(result.stats.total_a, 2);
    assert_eq!(result.duplicated_rows_a.len(), 1);
    assert_eq!(result.duplicated_rows_a[0].count, 2);
    // The duplicate report carries the first occurrence as decoded
    assert_eq!(result.duplicated_rows_a[0].record.get("V"), Some("  X  "));
}

#[test]
fn abbreviated_upper_case_date_matches_iso() {
    let a = Dataset::from_pairs("a", &["ID", "DT"], &[vec![("ID", "1"), ("DT", "3-DEC-25")]]);
    let b = Dataset::from_pairs("b", &["ID", "WHEN"], &[vec![("ID", "1"), ("WHEN", "2025-12-03")]]);
    let rules = NormalizationRules {
        a: SideRules {
            normalize_dates: true,
            date_fields: set(&["DT"]),
            ..SideRules::default()
        },
        ..NormalizationRules::default()
    };
    let config = ComparisonConfig::new(
        vec![KeyMapping::new("ID", "ID"), KeyMapping::new("DT", "WHEN")],
        rules,
    );

    let result = compare(&a, &b, &config, &NoopObserver).unwrap();
    assert_eq!(result.stats.matched, 1);
    assert!(result.stats.is_reconciled());
}

#[test]
fn unmatched_key_lists_all_its_rows() {
    let a = Dataset::from_pairs(
        "a",
        &["ID", "NOTE"],
        &[
            vec![("ID", "100"), ("NOTE", "first")],
            vec![("ID", "200"), ("NOTE", "x")],
            vec![("ID", "100"), ("NOTE", "second")],
        ],
    );
    let b = Dataset::from_pairs("b", &["ID"], &[vec![("ID", "200")]]);
    let config = ComparisonConfig::new(vec![KeyMapping::new("ID", "ID")], NormalizationRules::default());

    let result = compare(&a, &b, &config, &NoopObserver).unwrap();
    assert_eq!(result.keys_only_in_a, vec!["100"]);
    assert_eq!(result.stats.keys_only_in_a, 1);
    assert_eq!(result.stats.missing_in_b, 2);
    let notes: Vec<_> = result
        .rows_missing_in_b
        .iter()
        .map(|r| r.get("NOTE").unwrap_or(""))
        .collect();
    assert_eq!(notes, vec!["first", "second"]);
}

#[test]
fn empty_key_mappings_rejected_before_processing() {
    let a = Dataset::from_pairs("a", &["ID"], &[vec![("ID", "1")]]);
    let b = Dataset::from_pairs("b", &["ID"], &[vec![("ID", "1")]]);
    let log = Mutex::new(Vec::new());
    let observer = |level: Level, msg: &str| log.lock().unwrap().push((level, msg.to_string()));

    let err = compare(&a, &b, &ComparisonConfig::default(), &observer).unwrap_err();
    assert!(matches!(err, ReconError::EmptyKeyMappings));

    let log = log.into_inner().unwrap();
    assert_eq!(log.len(), 1, "only the validation failure is reported");
    assert_eq!(log[0].0, Level::Error);
}

// -------------------------------------------------------------------------
// Job file -> run
// -------------------------------------------------------------------------

#[test]
fn job_file_drives_comparison() {
    let job = JobConfig::from_toml(
        r#"
name = "Customers"

[source_a]
name = "crm"
file = "crm.csv"

[source_b]
name = "billing"
file = "billing.csv"

[[keys]]
a = "ID"
b = "CUST"

[rules]
trim_whitespace = true

[rules.a]
remove_leading_zeros = true
leading_zero_fields = ["ID"]

[rules.b]
normalize_dates = true
date_fields = ["SINCE"]
"#,
    )
    .unwrap();

    let a = Dataset::from_pairs(
        job.source_a.display_name(),
        &["ID", "SINCE"],
        &[
            vec![("ID", "0042"), ("SINCE", "2024-01-05")],
            vec![("ID", "0043"), ("SINCE", "2024-02-01")],
        ],
    );
    let b = Dataset::from_pairs(
        job.source_b.display_name(),
        &["CUST", "SINCE"],
        &[
            vec![("CUST", " 42 "), ("SINCE", "5/1/2024")],
            vec![("CUST", "44"), ("SINCE", "01/03/2024")],
        ],
    );

    let result = compare(&a, &b, &job.comparison, &NoopObserver).unwrap();
    assert_eq!(result.source_a_name, "crm");
    assert_eq!(result.source_b_name, "billing");
    assert_eq!(result.stats.matched, 1);
    assert_eq!(result.keys_only_in_a, vec!["43"]);
    assert_eq!(result.keys_only_in_b, vec!["44"]);
    // Reported rows carry normalized values
    assert_eq!(result.rows_missing_in_a[0].get("SINCE"), Some("2024-03-01"));
}

#[test]
fn multi_field_keys_require_every_part() {
    let a = Dataset::from_pairs(
        "a",
        &["ID", "REGION"],
        &[vec![("ID", "1"), ("REGION", "EU")], vec![("ID", "1"), ("REGION", "US")]],
    );
    let b = Dataset::from_pairs(
        "b",
        &["CUST", "AREA"],
        &[vec![("CUST", "1"), ("AREA", "EU")]],
    );
    let config = ComparisonConfig::new(
        vec![KeyMapping::new("ID", "CUST"), KeyMapping::new("REGION", "AREA")],
        NormalizationRules::default(),
    );

    let result = compare(&a, &b, &config, &NoopObserver).unwrap();
    assert_eq!(result.stats.matched, 1);
    assert_eq!(result.keys_only_in_a, vec!["1|US"]);
    assert_eq!(result.stats.missing_in_a, 0);
}

#[test]
fn result_serializes_rows_as_plain_objects() {
    let a = Dataset::from_pairs("a", &["ID", "NAME"], &[vec![("ID", "1"), ("NAME", "Ann")]]);
    let b = Dataset::from_pairs("b", &["ID"], &[]);
    let config = ComparisonConfig::new(vec![KeyMapping::new("ID", "ID")], NormalizationRules::default());

    let result = compare(&a, &b, &config, &NoopObserver).unwrap();
    let json: serde_json::Value = serde_json::to_value(&result).unwrap();
    assert_eq!(json["rows_missing_in_b"][0]["NAME"], "Ann");
    assert_eq!(json["stats"]["missing_in_b"], 1);
    assert_eq!(json["stats"]["total_b"], 0);
    assert_eq!(json["source_a_name"], "a");
}
