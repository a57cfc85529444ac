// src/source/table_source.rs
use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::source::sheet::{parse_table, Table};
use crate::source::SourceError;

const USER_AGENT: &str = concat!("listing_map/", env!("CARGO_PKG_VERSION"));

/// Where a sheet comes from. Fetching is the only thing a source does;
/// parsing and ingestion are shared.
pub trait TableSource: Send + Sync {
    fn describe(&self) -> String;

    fn fetch_text(&self) -> Result<String, SourceError>;

    fn fetch_table(&self) -> Result<Table, SourceError> {
        let text = self.fetch_text()?;
        debug!(source = %self.describe(), bytes = text.len(), "sheet fetched");
        parse_table(&text)
    }
}

/// Published-sheet CSV export over HTTP(S).
pub struct HttpTableSource {
    client: Client,
    url: Url,
}

impl HttpTableSource {
    pub fn new(url: Url) -> Result<Self, SourceError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        Ok(Self { client, url })
    }
}

impl TableSource for HttpTableSource {
    fn describe(&self) -> String {
        self.url.to_string()
    }

    fn fetch_text(&self) -> Result<String, SourceError> {
        let resp = self
            .client
            .get(self.url.clone())
            .send()
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(SourceError::Http {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }

        resp.text()
            .map_err(|e| SourceError::Network(e.to_string()))
    }
}

/// A CSV file on disk; handy for local runs.
pub struct FileTableSource {
    path: PathBuf,
}

impl FileTableSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TableSource for FileTableSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch_text(&self) -> Result<String, SourceError> {
        std::fs::read_to_string(&self.path)
            .map_err(|e| SourceError::Io(format!("{}: {e}", self.path.display())))
    }
}

/// Sheet text held in memory.
#[cfg(test)]
pub struct InlineTableSource(pub String);

#[cfg(test)]
impl TableSource for InlineTableSource {
    fn describe(&self) -> String {
        "inline".to_string()
    }

    fn fetch_text(&self) -> Result<String, SourceError> {
        Ok(self.0.clone())
    }
}

/// `http(s)://…` becomes an HTTP source, `file://…` or a bare path a file source.
pub fn source_for(location: &str) -> Result<Box<dyn TableSource>, SourceError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(SourceError::Config("empty sheet location".into()));
    }

    match Url::parse(location) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {
            Ok(Box::new(HttpTableSource::new(url)?))
        }
        Ok(url) if url.scheme() == "file" => {
            let path = url
                .to_file_path()
                .map_err(|_| SourceError::Config(format!("bad file URL '{location}'")))?;
            Ok(Box::new(FileTableSource::new(path)))
        }
        Ok(url) if url.scheme().len() > 1 => Err(SourceError::Config(format!(
            "unsupported scheme '{}' in '{location}'",
            url.scheme()
        ))),
        // Relative paths, and Windows drive letters parsed as one-letter schemes.
        _ => Ok(Box::new(FileTableSource::new(location))),
    }
}
