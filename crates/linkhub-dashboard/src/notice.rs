use std::fmt;

use serde::Serialize;

/// Severity of a [`Notice`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A non-blocking, user-facing message about a command outcome.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    /// Command that produced the notice.
    pub command: &'static str,
    pub title: String,
    pub message: String,
}

impl Notice {
    /// The notice shown when the store fails a read or write.
    pub fn remote_failure(command: &'static str, detail: impl fmt::Display) -> Self {
        Self {
            level: NoticeLevel::Error,
            command,
            title: "An error occurred.".to_string(),
            message: detail.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.title, self.command, self.message)
    }
}
