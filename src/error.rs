use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("api error ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("missing api key (tried: {0})")]
    MissingApiKey(String),
    #[error("prompt set is empty")]
    EmptyPromptSet,
    #[error("model {0:?} is not in the catalog")]
    UnknownModel(String),
    #[error("images per prompt must be between 1 and 4, got {0}")]
    InvalidVariantCount(u32),
    #[error("failed after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        #[source]
        source: Box<Error>,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
