use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;

use super::dates::parse_calendar_date;

/// Canonical name of the categorical priority column.
pub const PRIORITY_LEVEL: &str = "priority_level";
/// Canonical name of the follow-up date column.
pub const FOLLOW_UP_DATE: &str = "follow_up_date";

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a client record
// ---------------------------------------------------------------------------

/// One cell of a client record.
///
/// Cells load as `Text` or `Null`; only the follow-up date column is ever
/// coerced to `Date`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldValue {
    Null,
    Text(String),
    Date(NaiveDate),
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{s}"),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// The cell as a calendar date. Text is coerced on the fly so that
    /// records which skipped [`super::filter::parse_follow_up_dates`] still
    /// compare correctly.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Text(s) => parse_calendar_date(s),
            FieldValue::Null => None,
        }
    }

    /// Text written back out on export: nulls become empty cells.
    pub fn to_csv_field(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            other => other.to_string(),
        }
    }
}

/// Fold a raw header to its lookup key: trimmed and lower-cased.
pub fn canonical_column_name(raw: &str) -> String {
    raw.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
        .to_lowercase()
}

// ---------------------------------------------------------------------------
// ClientRecord – one row of the dataset
// ---------------------------------------------------------------------------

/// A single client row keyed by canonical column name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientRecord {
    pub fields: BTreeMap<String, FieldValue>,
}

impl ClientRecord {
    pub fn get(&self, column: &str) -> Option<&FieldValue> {
        self.fields.get(column)
    }

    /// Priority label exactly as written, if present and non-null.
    pub fn priority_level(&self) -> Option<&str> {
        self.get(PRIORITY_LEVEL).and_then(FieldValue::as_text)
    }

    pub fn follow_up_date(&self) -> Option<NaiveDate> {
        self.get(FOLLOW_UP_DATE).and_then(FieldValue::as_date)
    }
}

// ---------------------------------------------------------------------------
// Dataset – one retrieval worth of client records
// ---------------------------------------------------------------------------

/// Ordered client records plus the ordered canonical column list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub records: Vec<ClientRecord>,
}

impl Dataset {
    /// Build a dataset from raw headers and positional rows.
    ///
    /// Headers are folded to canonical form. When two headers fold to the
    /// same name the later cell wins and the column is listed once.
    pub fn from_rows<S: AsRef<str>>(headers: &[S], rows: Vec<Vec<FieldValue>>) -> Self {
        let names: Vec<String> = headers
            .iter()
            .map(|h| canonical_column_name(h.as_ref()))
            .collect();

        let mut seen = BTreeSet::new();
        let columns: Vec<String> = names
            .iter()
            .filter(|name| seen.insert(name.as_str()))
            .cloned()
            .collect();

        let records = rows
            .into_iter()
            .map(|cells| ClientRecord {
                fields: names.iter().cloned().zip(cells).collect(),
            })
            .collect();

        Dataset { columns, records }
    }

    /// A dataset with the same columns holding `records`.
    pub fn with_records(&self, records: Vec<ClientRecord>) -> Self {
        Dataset {
            columns: self.columns.clone(),
            records,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// FilterCriteria
// ---------------------------------------------------------------------------

/// One filter pass: which priorities to keep and the inclusive date bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub selected_priorities: BTreeSet<String>,
    pub max_follow_up_date: NaiveDate,
}
