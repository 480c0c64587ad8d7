use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreErrorCode {
    Io,
    Format,
    Transport,
    Catalog,
    UnsupportedOperation,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code:?}: {message}")]
pub struct CoreError {
    pub code: CoreErrorCode,
    pub message: String,
}

impl CoreError {
    pub fn new(code: CoreErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Structural failure while decoding a save. `section` names the envelope
/// key (or `envelope` for the outer object) and `path` locates the offending
/// value inside that section, e.g. `$.data.mults.hacking`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{section} at {path}: {detail}")]
pub struct FormatError {
    pub section: String,
    pub path: String,
    pub detail: String,
}

impl FormatError {
    pub fn new(
        section: impl Into<String>,
        path: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            section: section.into(),
            path: path.into(),
            detail: detail.into(),
        }
    }
}

impl From<FormatError> for CoreError {
    fn from(err: FormatError) -> Self {
        CoreError::new(CoreErrorCode::Format, err.to_string())
    }
}
