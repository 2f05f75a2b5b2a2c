use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoinError {
    #[error("{operation}: invalid geometry: {reason}")]
    InvalidGeometry {
        operation: &'static str,
        reason: String,
    },

    #[error("{}: dimension mismatch, expected {}x{} but got {}x{}", .operation, .expected.0, .expected.1, .actual.0, .actual.1)]
    DimensionMismatch {
        operation: &'static str,
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("{operation}: seed ({x}, {y}) lies outside the {width}x{height} buffer")]
    SeedOutOfBounds {
        operation: &'static str,
        x: i64,
        y: i64,
        width: u32,
        height: u32,
    },

    #[error("{operation}: invalid parameter: {reason}")]
    InvalidParameter {
        operation: &'static str,
        reason: String,
    },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CoinError>;
