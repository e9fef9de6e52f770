#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{platform} returned {detail}")]
    Upstream { platform: String, detail: String },

    #[error("{platform} listing is missing required field '{field}'")]
    Mapping {
        platform: String,
        field: &'static str,
    },

    #[error("Vacancy id is not an integer: {0}")]
    InvalidVacancyId(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn mapping(platform: &str, field: &'static str) -> Self {
        AppError::Mapping {
            platform: platform.to_string(),
            field,
        }
    }
}
