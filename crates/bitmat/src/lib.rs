//! # Bitmap / Matrix Bridge
//!
//! Converts packed pixel images into 8-bit matrices and back, and wraps a
//! handful of `imageproc` routines (grayscale, Gaussian blur, Canny, fixed
//! and adaptive threshold) behind that conversion.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use bitmat::{Mat, PixelImage, Canny};
//!
//! let image = PixelImage::open("photo.png")?;
//!
//! let mut mat = Mat::default();
//! let edges = mat.canny(&image, &Canny::default())?;
//! assert!(mat.is_gray());
//!
//! edges.save("edges.png")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Conversion only
//!
//! ```rust,no_run
//! use bitmat::{image_to_mat, mat_to_image, ColorConfig, PixelImage};
//!
//! let image = PixelImage::open("photo.png")?;
//! let mat = image_to_mat(&image)?;
//! let back = mat_to_image(&mat, ColorConfig::Rgb565)?;
//! assert_eq!(back.width(), mat.cols());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bridge;
pub mod command;
pub mod error;
pub mod filters;
pub mod mat;
pub mod ops;
pub mod pixel;
pub mod traits;
pub mod types;

pub use bridge::{image_to_mat, mat_to_image};
pub use command::FilterCommand;
pub use error::{BitmatError, Result};
pub use filters::*;
pub use mat::Mat;
pub use pixel::PixelImage;
pub use traits::*;
pub use types::*;
