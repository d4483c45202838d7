use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (no sources, bad threshold, duplicate name, etc.).
    ConfigValidation(String),
    /// A configured source has no loaded records.
    MissingSource(String),
    /// Source read failure (unreachable path, malformed container).
    Source { source: String, message: String },
    /// IO error (report write, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::MissingSource(name) => write!(f, "source '{name}': no records loaded"),
            Self::Source { source, message } => write!(f, "source '{source}': {message}"),
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
