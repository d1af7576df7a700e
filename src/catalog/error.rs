use thiserror::Error;

use crate::orbit::OrbitError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog read error: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Invalid TLE format in {file}: {message}")]
    InvalidTle { file: String, message: String },
    #[error("{0}")]
    Orbit(#[from] OrbitError),
    #[error("no valid satellites in {0}")]
    Empty(String),
    #[error("satellite not found: {0}")]
    NotFound(String),
}
