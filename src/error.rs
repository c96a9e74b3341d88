use thiserror::Error;

/// Errors raised by the series store, selection state and controller.
///
/// Every variant is a caller contract violation, such as toggling a series
/// that was never added. They are surfaced to the caller, never swallowed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("no series named '{0}'")]
    NotFound(String),
}

/// Errors raised while turning a source file into a series.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("cannot read workbook: {0}")]
    Excel(String),
    #[error("cannot read archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("unsupported file format: .{0}")]
    UnsupportedFormat(String),
    #[error("column '{0}' not found")]
    MissingColumn(&'static str),
    #[error("non-numeric value '{value}' in column '{column}' at row {row}")]
    NonNumeric {
        column: &'static str,
        row: usize,
        value: String,
    },
    #[error("no data found")]
    NoData,
    #[error("series '{name}' was already loaded from {first_source}")]
    DuplicateName { name: String, first_source: String },
}

/// Errors raised while parsing a session command.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("unterminated quote in series name")]
    UnterminatedQuote,
    #[error("'{0}' expects a series name")]
    MissingSeries(&'static str),
    #[error("expected on/off, got '{0}'")]
    InvalidSwitch(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value: {0}")]
    Invalid(String),
}
