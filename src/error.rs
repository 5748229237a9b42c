use thiserror::Error;

/// Everything that can go wrong between the vendor and a lookup result.
///
/// Each pipeline stage surfaces exactly one of these kinds and never
/// recovers on its own; the caller decides whether to retry.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or unusable credential/configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport failure or a non-success HTTP status from the vendor.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The archive, XML index, or cached CSV is not in the expected shape.
    #[error("format error: {0}")]
    Format(String),

    /// Exact-code lookup miss.
    #[error("no company with corp_code {0:?}")]
    NotFound(String),

    /// The vendor answered with a non-success status envelope.
    #[error("vendor rejected request (status {status}): {message}")]
    Api { status: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        match e.into_kind() {
            csv::ErrorKind::Io(io) => Error::Io(io),
            kind => Error::Format(format!("csv: {kind:?}")),
        }
    }
}

impl Error {
    /// Vendor status `013`, "no data for this query". Range queries use
    /// this to tell an empty year apart from a real failure.
    pub fn is_no_data(&self) -> bool {
        matches!(self, Error::Api { status, .. } if status == "013")
    }
}
