//! Error taxonomy for the search-and-download pipeline

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("{0}")]
    DependencyInstall(String),

    #[error("No query provided. Aborting.")]
    EmptyQuery,

    #[error("request failed: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("no albums or EPs found for \"{0}\"")]
    NoResults(String),

    #[error("{0}")]
    Download(String),

    #[error("terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    /// Prefix printed in front of the error on the single failure line.
    pub fn context(&self) -> &'static str {
        match self {
            AppError::DependencyInstall(_) => "error installing/verifying tools",
            AppError::EmptyQuery
            | AppError::Transport(_)
            | AppError::MalformedResponse(_)
            | AppError::NoResults(_) => "error searching for items",
            AppError::Download(_) => "error downloading items",
            AppError::Terminal(_) => "error running program",
        }
    }

    /// Errors the user can recover from without leaving the prompt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::EmptyQuery)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Transport(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Terminal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_groups_errors_by_phase() {
        assert_eq!(
            AppError::DependencyInstall("yt-dlp missing".into()).context(),
            "error installing/verifying tools"
        );
        assert_eq!(AppError::Transport("timeout".into()).context(), "error searching for items");
        assert_eq!(AppError::NoResults("x".into()).context(), "error searching for items");
        assert_eq!(AppError::Download("exit 1".into()).context(), "error downloading items");
    }

    #[test]
    fn only_empty_query_is_recoverable() {
        assert!(AppError::EmptyQuery.is_recoverable());
        assert!(!AppError::Transport("x".into()).is_recoverable());
        assert!(!AppError::Download("x".into()).is_recoverable());
    }
}
