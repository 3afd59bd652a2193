use thiserror::Error;

#[derive(Debug, Error)]
pub enum CitizensError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error ({code}): {message}")]
    ApiError {
        code: String,
        message: String,
        hint: Option<String>,
    },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Unrecognized filter key: {0}")]
    InvalidFilterKey(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Filter controller is no longer running")]
    ControllerClosed,

    #[error("{0}")]
    Other(String),
}

impl CitizensError {
    /// Create an API error with an optional hint
    pub fn api_error(code: impl Into<String>, message: impl Into<String>, hint: Option<String>) -> Self {
        Self::ApiError {
            code: code.into(),
            message: message.into(),
            hint,
        }
    }

    /// Get user-friendly hint for the error
    pub fn hint(&self) -> Option<String> {
        match self {
            Self::ApiError { hint, .. } => hint.clone(),
            Self::Network(_) => Some(
                "Check that the citizens API is reachable, then change a filter or run 'retry'."
                    .to_string(),
            ),
            Self::InvalidFilterKey(_) => Some(
                "Valid keys: search, name, last_name, mother_name, father_name, \
                 national_identifier, birth_city, gender, address_city"
                    .to_string(),
            ),
            Self::Config(_) => Some("Run 'citizens config path' to locate the configuration file.".to_string()),
            _ => None,
        }
    }

    /// Whether the error came from talking to the data source.
    ///
    /// Transport failures clear the result page and are shown as a transient banner.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::ApiError { .. })
    }
}

pub type Result<T> = std::result::Result<T, CitizensError>;
