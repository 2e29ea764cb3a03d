use thiserror::Error;

/// Errors from theme catalogs and strict resolution.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ThemeError {
    /// No theme with this name exists in the catalog.
    #[error("unknown theme: {0}")]
    UnknownTheme(String),

    /// No button preset with this id exists in the catalog.
    #[error("unknown button preset: {0}")]
    UnknownButton(String),

    /// Two button presets share an id.
    #[error("duplicate button preset id: {0}")]
    DuplicateButton(String),

    /// A catalog file could not be parsed.
    #[error("catalog parse error: {0}")]
    Parse(String),
}

impl From<toml::de::Error> for ThemeError {
    fn from(e: toml::de::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ThemeError>;
