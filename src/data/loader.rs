use std::fmt;

use log::{debug, info};
use reqwest::blocking::Client;

use super::error::DatasetError;
use super::model::{Dataset, FieldValue};

/// Cell texts read as missing values, matched against the whole cell.
pub const NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// StorageLocation / ObjectStore
// ---------------------------------------------------------------------------

/// A CSV object addressed by bucket and key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StorageLocation {
    pub bucket: String,
    pub key: String,
}

impl StorageLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Both parts must be non-blank before anything is requested.
    pub fn validate(&self) -> Result<(), DatasetError> {
        if self.bucket.trim().is_empty() || self.key.trim().is_empty() {
            return Err(DatasetError::MissingLocation);
        }
        Ok(())
    }

    /// Expand a URL template containing `{bucket}` and `{key}`.
    pub fn url(&self, template: &str) -> String {
        template
            .replace("{bucket}", self.bucket.trim())
            .replace("{key}", self.key.trim().trim_start_matches('/'))
    }
}

impl fmt::Display for StorageLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            self.bucket.trim(),
            self.key.trim().trim_start_matches('/')
        )
    }
}

/// Unauthenticated reads of public objects over HTTP(S).
#[derive(Debug, Clone)]
pub struct ObjectStore {
    http: Client,
    url_template: String,
}

impl ObjectStore {
    pub fn new(http: Client, url_template: impl Into<String>) -> Self {
        Self {
            http,
            url_template: url_template.into(),
        }
    }

    pub fn url_for(&self, location: &StorageLocation) -> String {
        location.url(&self.url_template)
    }

    /// One blocking GET of the object's bytes. Non-success statuses fail.
    pub fn fetch(&self, location: &StorageLocation) -> Result<Vec<u8>, DatasetError> {
        location.validate()?;
        let url = self.url_for(location);
        debug!("GET {url}");

        let response = self
            .http
            .get(&url)
            .send()
            .map_err(|source| DatasetError::Retrieval {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DatasetError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .map_err(|source| DatasetError::Retrieval {
                url: url.clone(),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Fetch the object at `location` and parse it into a [`Dataset`].
///
/// A header-only object yields an empty dataset, not an error.
pub fn load_dataset(
    store: &ObjectStore,
    location: &StorageLocation,
) -> Result<Dataset, DatasetError> {
    let bytes = store.fetch(location)?;
    let dataset = parse_csv(&bytes)?;
    info!(
        "Loaded {} client record(s) with columns {:?} from {location}",
        dataset.len(),
        dataset.columns
    );
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// CSV parsing
// ---------------------------------------------------------------------------

/// CSV layout: one header row, then one client per row.
///
/// Short rows are padded with nulls; rows longer than the header are
/// rejected, as is a payload with no header at all.
pub fn parse_csv(bytes: &[u8]) -> Result<Dataset, DatasetError> {
    if bytes.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(DatasetError::parse("no columns to parse from payload"));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| DatasetError::parse(format!("reading CSV header: {e}")))?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let width = headers.len();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record =
            result.map_err(|e| DatasetError::parse(format!("CSV row {}: {e}", row_no + 1)))?;

        if record.len() > width {
            return Err(DatasetError::parse(format!(
                "CSV row {}: expected {width} fields, saw {}",
                row_no + 1,
                record.len()
            )));
        }

        let mut cells: Vec<FieldValue> = record.iter().map(cell_value).collect();
        cells.resize(width, FieldValue::Null);
        rows.push(cells);
    }

    Ok(Dataset::from_rows(&headers, rows))
}

fn cell_value(raw: &str) -> FieldValue {
    if NULL_MARKERS.contains(&raw) {
        FieldValue::Null
    } else {
        FieldValue::Text(raw.to_string())
    }
}
