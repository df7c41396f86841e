use std::path::PathBuf;

// ---------------------------------------------------------------------------
// Pipeline errors
// ---------------------------------------------------------------------------

/// Errors raised by ingestion and by derived-metric computation.
///
/// `DataSource` and `Schema` abort a load. `InsufficientData` only affects the
/// single figure being computed; callers render it as "not available".
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("cannot read data file '{}': {source}", path.display())]
    DataSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid table: {0}")]
    Schema(String),

    #[error("insufficient data for {what}: need at least {required}, got {available}")]
    InsufficientData {
        what: String,
        required: usize,
        available: usize,
    },
}

impl DataError {
    /// Whether the error should abort the whole session rather than one figure.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DataError::InsufficientData { .. })
    }

    pub(crate) fn schema(msg: impl Into<String>) -> Self {
        DataError::Schema(msg.into())
    }

    pub(crate) fn insufficient(what: impl Into<String>, required: usize, available: usize) -> Self {
        DataError::InsufficientData {
            what: what.into(),
            required,
            available,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_source_message_names_the_path() {
        let err = DataError::DataSource {
            path: PathBuf::from("data/covid_data.csv"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        let msg = err.to_string();
        assert!(msg.contains("data/covid_data.csv"), "{msg}");
        assert!(err.is_fatal());
    }

    #[test]
    fn insufficient_data_is_recoverable() {
        let err = DataError::insufficient("correlation matrix", 2, 1);
        assert!(!err.is_fatal());
        assert_eq!(
            err.to_string(),
            "insufficient data for correlation matrix: need at least 2, got 1"
        );
    }
}
