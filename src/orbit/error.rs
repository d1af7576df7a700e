use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OrbitError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(
        "kepler solver did not converge after {iterations} iterations (M = {mean_anomaly} rad, e = {eccentricity})"
    )]
    Convergence {
        mean_anomaly: f64,
        eccentricity: f64,
        iterations: usize,
    },
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
}

impl OrbitError {
    pub fn validation(message: impl Into<String>) -> Self {
        OrbitError::Validation(message.into())
    }

    pub fn arithmetic(message: impl Into<String>) -> Self {
        OrbitError::Arithmetic(message.into())
    }
}
