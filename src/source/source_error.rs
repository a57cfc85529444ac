use thiserror::Error;

/// Why a sheet could not be turned into records. Any of these ends that load.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP {status} fetching {url}")]
    Http { status: u16, url: String },
    #[error("IO error: {0}")]
    Io(String),
    #[error("Sheet parse error: {0}")]
    Parse(String),
    #[error("Sheet is missing required column '{0}'")]
    MissingColumn(String),
    #[error("Source configuration error: {0}")]
    Config(String),
}
