use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnchorError {
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    #[error("YAML parsing error: {0}")]
    YamlParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl From<figment::Error> for AnchorError {
    fn from(err: figment::Error) -> Self {
        AnchorError::Config(Box::new(err))
    }
}
