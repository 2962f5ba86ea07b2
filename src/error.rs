use std::path::PathBuf;

/// Fatal failures while building a [`PopulationTable`](crate::types::PopulationTable).
///
/// Unparsable population cells are not errors; they become missing values.
#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("failed to read {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("unexpected source layout: {0}")]
    Format(#[from] FormatError),
}

impl NormalizeError {
    /// Load failures (missing file, I/O, undecodable bytes) as opposed to a
    /// file that was read but does not have the expected shape.
    pub fn is_load_error(&self) -> bool {
        matches!(self, NormalizeError::Load { .. } | NormalizeError::Csv(_))
    }
}

/// The source was readable but its shape changed upstream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    #[error("expected two header rows, found {found}")]
    MissingHeader { found: usize },

    #[error("first column header is '{found}', expected '{expected}'")]
    RegionHeader { expected: String, found: String },

    #[error("no data columns after the region column")]
    NoDataColumns,

    #[error("column {column} has no period label")]
    EmptyPeriod { column: usize },

    #[error("column {column} has no measurement kind")]
    EmptyKind { column: usize },

    #[error("malformed composite key '{key}': {reason}")]
    MalformedKey { key: String, reason: &'static str },

    #[error("malformed period label '{0}'")]
    MalformedPeriod(String),

    #[error("unmapped measurement kind '{0}'")]
    UnmappedKind(String),

    #[error("row {row} has {found} fields, expected {expected}")]
    RowWidth { row: u64, found: usize, expected: usize },
}
