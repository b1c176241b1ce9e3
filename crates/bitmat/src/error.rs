use thiserror::Error;

use crate::types::ColorConfig;

#[derive(Error, Debug)]
pub enum BitmatError {
    #[error("Matrix has degenerate dimensions {rows}x{cols}")]
    EmptyMat { rows: u32, cols: u32 },

    #[error("Unsupported color configuration: {0}")]
    UnsupportedConfig(ColorConfig),

    #[error("{operation} does not support {channels}-channel input")]
    UnsupportedFormat {
        operation: &'static str,
        channels: usize,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BitmatError>;
