//! Errors raised while loading configuration.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read level file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid level JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("field of view must be in (0, 360] degrees, got {0}")]
    FieldOfView(f32),
    #[error("obstacle {index}: radius must be positive, got {radius}")]
    ObstacleRadius { index: usize, radius: f32 },
    #[error("agent {index}: {source}")]
    Agent {
        index: usize,
        #[source]
        source: Box<ConfigError>,
    },
}
