//! Per-field value normalization.
//!
//! `normalize` is pure and total: every failure path falls back to the
//! value as produced by the earlier steps.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::NormalizationRules;
use crate::model::Side;

/// `3-DEC-25`, `03-dec-2025`: month abbreviation that needs re-casing.
static DAY_MONTH_ABBREV_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{1,2}-[A-Za-z]{3}-\d{2,4}$").unwrap());

static STRICT_ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Characters any listed format can produce. chrono itself tolerates signed
/// years and embedded spaces, which none of the patterns allow.
static DATE_CHARSET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Za-z/:-]+$").unwrap());

/// Exclusive bounds on an accepted parsed year.
const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

const CANONICAL_DATE: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    Date,
    DateTime,
}

/// A candidate format: the display pattern and the chrono format it maps to.
#[derive(Debug, Clone, Copy)]
pub struct DateFormat {
    pub pattern: &'static str,
    chrono: &'static str,
    shape: Shape,
}

/// Attempt order. First parse with a sane year wins.
pub const DATE_FORMATS: [DateFormat; 12] = [
    DateFormat { pattern: "d/M/yyyy", chrono: "%d/%m/%Y", shape: Shape::Date },
    DateFormat { pattern: "dd/MM/yyyy", chrono: "%d/%m/%Y", shape: Shape::Date },
    DateFormat { pattern: "d-M-yyyy", chrono: "%d-%m-%Y", shape: Shape::Date },
    DateFormat { pattern: "dd-MM-yyyy", chrono: "%d-%m-%Y", shape: Shape::Date },
    DateFormat { pattern: "yyyy-MM-dd", chrono: "%Y-%m-%d", shape: Shape::Date },
    DateFormat { pattern: "yyyy-MM-dd'T'HH:mm:ss", chrono: "%Y-%m-%dT%H:%M:%S", shape: Shape::DateTime },
    DateFormat { pattern: "M/d/yyyy", chrono: "%m/%d/%Y", shape: Shape::Date },
    DateFormat { pattern: "MM/dd/yyyy", chrono: "%m/%d/%Y", shape: Shape::Date },
    DateFormat { pattern: "d-MMM-yy", chrono: "%d-%b-%y", shape: Shape::Date },
    DateFormat { pattern: "dd-MMM-yy", chrono: "%d-%b-%y", shape: Shape::Date },
    DateFormat { pattern: "d-MMM-yyyy", chrono: "%d-%b-%Y", shape: Shape::Date },
    DateFormat { pattern: "dd-MMM-yyyy", chrono: "%d-%b-%Y", shape: Shape::Date },
];

impl DateFormat {
    fn parse(&self, value: &str) -> Option<NaiveDate> {
        match self.shape {
            Shape::Date => NaiveDate::parse_from_str(value, self.chrono).ok(),
            Shape::DateTime => NaiveDateTime::parse_from_str(value, self.chrono)
                .ok()
                .map(|dt| dt.date()),
        }
    }
}

/// Normalize one raw value for `field` on `side`.
///
/// Steps run in a fixed order: edge trim, global whitespace strip,
/// leading-zero strip, date canonicalization.
pub fn normalize(raw: &str, field: &str, side: Side, rules: &NormalizationRules) -> String {
    let side_rules = rules.side(side);

    let mut value = raw.trim().to_string();

    if rules.trim_whitespace {
        value.retain(|c| !c.is_whitespace());
    }

    // An all-zero value becomes empty.
    if side_rules.strips_leading_zeros(field) {
        value = value.trim_start_matches('0').to_string();
    }

    if side_rules.parses_dates(field) {
        if let Some(date) = parse_date(&value) {
            value = date.format(CANONICAL_DATE).to_string();
        }
    }

    value
}

/// Resolve a date from a mixed-locale business value, or `None`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    if !DATE_CHARSET.is_match(value) {
        return None;
    }

    let recased;
    let value = if DAY_MONTH_ABBREV_YEAR.is_match(value) {
        recased = title_case_month(value);
        recased.as_str()
    } else {
        value
    };

    if STRICT_ISO_DATE.is_match(value) {
        if let Ok(date) = NaiveDate::parse_from_str(value, CANONICAL_DATE) {
            return Some(date);
        }
    }

    DATE_FORMATS.iter().find_map(|format| {
        format
            .parse(value)
            .filter(|date| date.year() > MIN_YEAR && date.year() < MAX_YEAR)
    })
}

/// `3-DEC-25` -> `3-Dec-25`.
fn title_case_month(value: &str) -> String {
    let mut parts = value.splitn(3, '-');
    let (Some(day), Some(month), Some(year)) = (parts.next(), parts.next(), parts.next()) else {
        return value.to_string();
    };

    let mut chars = month.chars();
    let month: String = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    };

    format!("{day}-{month}-{year}")
}
