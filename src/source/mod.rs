mod sheet;
mod ingest;
mod loader;
mod source_error;
mod table_source;

#[cfg(test)]
pub use sheet::parse_table;
pub use sheet::Table;
pub use loader::DatasetLoader;
pub use source_error::SourceError;
pub use table_source::{source_for, TableSource};

#[cfg(test)]
pub use table_source::InlineTableSource;
