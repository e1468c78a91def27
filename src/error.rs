use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitguyError {
    #[error("Not a git repository")]
    NotARepository,

    #[error("No changes found")]
    NoChanges,

    #[error("Invalid edit at {start}..{end}: {reason}")]
    InvalidEdit {
        start: usize,
        end: usize,
        reason: &'static str,
    },

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    #[error(
        "OpenRouter API key not configured. Set via --api-key flag, OPENROUTER_API_KEY env var, or `gitguy config set-key`"
    )]
    MissingApiKey,

    #[error("API request failed: {0}")]
    Api(String),

    #[error("Malformed model response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, GitguyError>;
