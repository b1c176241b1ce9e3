use image::GrayImage;
use tracing::debug;

use crate::{
    bridge,
    error::{BitmatError, Result},
    filters::{AdaptiveThreshold, Canny, GaussianBlur, Threshold},
    ops,
    pixel::PixelImage,
    traits::MatFilter,
    types::{ColorConfig, ColorConversion, MatType},
};

/// Row-major matrix of 8-bit elements with interleaved channels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mat {
    rows: u32,
    cols: u32,
    mat_type: MatType,
    data: Vec<u8>,
}

impl Mat {
    /// Create a zero-filled matrix
    pub fn new(rows: u32, cols: u32, mat_type: MatType) -> Self {
        let len = rows as usize * cols as usize * mat_type.channels();
        Self {
            rows,
            cols,
            mat_type,
            data: vec![0; len],
        }
    }

    pub fn from_raw(rows: u32, cols: u32, mat_type: MatType, data: Vec<u8>) -> Result<Self> {
        let expected = rows as usize * cols as usize * mat_type.channels();
        if data.len() != expected {
            return Err(BitmatError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            mat_type,
            data,
        })
    }

    pub fn from_image(image: &PixelImage) -> Result<Self> {
        bridge::image_to_mat(image)
    }

    pub fn from_gray_image(image: GrayImage) -> Self {
        let (cols, rows) = image.dimensions();
        Self {
            rows,
            cols,
            mat_type: MatType::Cv8UC1,
            data: image.into_raw(),
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn mat_type(&self) -> MatType {
        self.mat_type
    }

    pub fn channels(&self) -> usize {
        self.mat_type.channels()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0 || self.cols == 0
    }

    /// Channel values of the element at `(row, col)`.
    ///
    /// Panics if the position is outside the matrix.
    pub fn at(&self, row: u32, col: u32) -> &[u8] {
        assert!(row < self.rows && col < self.cols, "({row}, {col}) out of bounds");
        let channels = self.channels();
        let offset = (row as usize * self.cols as usize + col as usize) * channels;
        &self.data[offset..offset + channels]
    }

    /// Copy a single-channel matrix into a `GrayImage`
    pub fn to_gray_image(&self) -> Result<GrayImage> {
        if !self.is_gray() {
            return Err(BitmatError::UnsupportedFormat {
                operation: "to_gray_image",
                channels: self.channels(),
            });
        }
        GrayImage::from_raw(self.cols, self.rows, self.data.clone()).ok_or(BitmatError::BufferSize {
            expected: self.rows as usize * self.cols as usize,
            actual: self.data.len(),
        })
    }

    pub fn to_image(&self, config: ColorConfig) -> Result<PixelImage> {
        bridge::mat_to_image(self, config)
    }

    /// Convert to an `Argb8888` image
    pub fn to_bitmap(&self) -> Result<PixelImage> {
        self.to_image(ColorConfig::default())
    }

    /// Load `image` into this matrix and reduce it to a single intensity channel
    pub fn to_gray(&mut self, image: &PixelImage) -> Result<()> {
        *self = bridge::image_to_mat(image)?;
        let conversion = match self.channels() {
            3 => ColorConversion::RgbToGray,
            4 => ColorConversion::RgbaToGray,
            channels => {
                return Err(BitmatError::UnsupportedFormat {
                    operation: "to_gray",
                    channels,
                });
            }
        };
        *self = ops::cvt_color(self, conversion)?;
        Ok(())
    }

    pub fn is_gray(&self) -> bool {
        self.mat_type == MatType::Cv8UC1
    }

    /// Load `image`, run `filter` and return the result as an `Argb8888` image.
    ///
    /// The matrix holds the filtered data afterwards.
    pub fn apply<F: MatFilter + ?Sized>(&mut self, image: &PixelImage, filter: &F) -> Result<PixelImage> {
        if filter.requires_gray() {
            self.to_gray(image)?;
        } else {
            *self = bridge::image_to_mat(image)?;
        }
        debug!(filter = filter.name(), rows = self.rows, cols = self.cols, "Applying filter");
        *self = filter.apply(self)?;
        self.to_bitmap()
    }

    pub fn gaussian_blur(&mut self, image: &PixelImage, params: &GaussianBlur) -> Result<PixelImage> {
        self.apply(image, params)
    }

    pub fn canny(&mut self, image: &PixelImage, params: &Canny) -> Result<PixelImage> {
        self.apply(image, params)
    }

    pub fn threshold(&mut self, image: &PixelImage, params: &Threshold) -> Result<PixelImage> {
        self.apply(image, params)
    }

    pub fn adaptive_threshold(&mut self, image: &PixelImage, params: &AdaptiveThreshold) -> Result<PixelImage> {
        self.apply(image, params)
    }
}
