use thiserror::Error;

/// Failures of a single load of the client dataset.
///
/// An empty dataset is not an error; see [`super::filter::FilterOutcome::Empty`].
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Please enter both a bucket and an object key")]
    MissingLocation,

    #[error("Could not retrieve {url}: {source}")]
    Retrieval {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Storage responded with HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Malformed CSV payload: {reason}")]
    Parse { reason: String },
}

impl DatasetError {
    pub(crate) fn parse(reason: impl Into<String>) -> Self {
        DatasetError::Parse {
            reason: reason.into(),
        }
    }

    /// Whether the error came from the storage side rather than the payload.
    pub fn is_retrieval(&self) -> bool {
        matches!(
            self,
            DatasetError::Retrieval { .. } | DatasetError::Status { .. }
        )
    }
}
