/// Failure taxonomy surfaced to the calling orchestration layer. The
/// `Display` form leads with the class name so boundary failure records
/// carry `"<ClassName>: <message>"`.
#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    /// A required setting or environment value is missing.
    #[error("ConfigurationError: {0}")]
    Configuration(String),

    /// A remote fetch did not return a success response.
    #[error("FetchError: {0}")]
    Fetch(String),

    /// Malformed CSV/YAML input or a missing expected key.
    #[error("ParseError: {0}")]
    Parse(String),

    /// Any failure reported by the remote file-store collaborator.
    #[error("StoreError: {0}")]
    Store(String),

    /// A local filesystem read or write failed.
    #[error("IoError: {0}")]
    Io(String),
}
