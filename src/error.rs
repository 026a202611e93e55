use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Record store upsert failed for batch {batch}: {message}")]
    Sink { batch: usize, message: String },
}

impl PipeError {
    /// Get an actionable hint for how to resolve this error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            PipeError::Config(_) => Some(
                "Run `offerpipe config init` to create a default config, or set OFFERPIPE_CONFIG"
            ),
            PipeError::Input(_) => Some(
                "The input file must contain one JSON page payload per line:\n  {\"url\": \"...\", \"pageText\": \"...\"}"
            ),
            PipeError::Sink { .. } => Some(
                "Check the [sink] section of your config and the OFFERPIPE_API_KEY environment variable.\nRows already written to CSV are unaffected."
            ),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipeError>;
