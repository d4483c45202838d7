//! `unirec-io` — source readers for the reconciliation engine.
//!
//! Each reader turns one configured source into an ordered sequence of raw
//! field-name→value records. Row order defines the engine's 1-based row
//! index, so readers never reorder or drop rows.

use std::fmt;
use std::path::{Path, PathBuf};

use unirec_engine::config::{SourceConfig, SourceType};
use unirec_engine::record::RawRecord;

pub mod api;
pub mod csv;
pub mod pdf;
pub mod xlsx;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum SourceError {
    /// File unreachable or unreadable.
    Io { path: String, message: String },
    /// Container parsed but its structure is malformed.
    Parse { path: String, message: String },
    /// HTTP fetch failure (connect, status, body decode).
    Http { url: String, message: String },
    /// API payload has an unsupported shape.
    Payload(String),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, message } => write!(f, "cannot read {path}: {message}"),
            Self::Parse { path, message } => write!(f, "cannot parse {path}: {message}"),
            Self::Http { url, message } => write!(f, "fetch {url} failed: {message}"),
            Self::Payload(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SourceError {}

impl SourceError {
    pub(crate) fn io(path: &Path, err: impl fmt::Display) -> Self {
        Self::Io {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }

    pub(crate) fn parse(path: &Path, err: impl fmt::Display) -> Self {
        Self::Parse {
            path: path.display().to_string(),
            message: err.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

/// Read one configured source into raw records. Relative paths resolve
/// against `base_dir` (conventionally the config file's directory); API
/// sources may name an `http(s)` URL instead of a path.
pub fn read_source(source: &SourceConfig, base_dir: &Path) -> Result<Vec<RawRecord>, SourceError> {
    match source.kind {
        SourceType::Csv => self::csv::read_csv(&resolve(base_dir, &source.path)),
        SourceType::Excel => xlsx::read_excel(&resolve(base_dir, &source.path)),
        SourceType::Api => api::read_api(&source.path, base_dir),
        SourceType::Pdf => pdf::read_pdf_table(&resolve(base_dir, &source.path)),
    }
}

/// Column discovery for a source: the sorted union of field names over a
/// sample of up to `max_rows` rows, plus the total row count.
pub fn peek_columns(
    source: &SourceConfig,
    base_dir: &Path,
    max_rows: usize,
) -> Result<(Vec<String>, usize), SourceError> {
    let rows = read_source(source, base_dir)?;
    let sample = &rows[..rows.len().min(max_rows)];
    let mut columns: Vec<String> = sample
        .iter()
        .flat_map(|r| r.fields.keys().cloned())
        .collect();
    columns.sort_unstable();
    columns.dedup();
    Ok((columns, rows.len()))
}

fn resolve(base_dir: &Path, path: &str) -> PathBuf {
    base_dir.join(path)
}
