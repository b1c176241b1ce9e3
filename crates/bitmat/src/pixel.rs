use std::path::Path;

use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::{
    error::{BitmatError, Result},
    mat::Mat,
    types::ColorConfig,
};

/// Packed pixel buffer owned by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelImage {
    width: u32,
    height: u32,
    config: ColorConfig,
    data: Vec<u8>,
}

impl PixelImage {
    /// Create a zero-filled image
    pub fn new(width: u32, height: u32, config: ColorConfig) -> Self {
        let len = width as usize * height as usize * config.bytes_per_pixel();
        Self {
            width,
            height,
            config,
            data: vec![0; len],
        }
    }

    /// Wrap an existing pixel buffer, checking its length against the dimensions
    pub fn from_raw(width: u32, height: u32, config: ColorConfig, data: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * config.bytes_per_pixel();
        if data.len() != expected {
            return Err(BitmatError::BufferSize {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            config,
            data,
        })
    }

    pub fn from_rgba8(image: RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            config: ColorConfig::Argb8888,
            data: image.into_raw(),
        }
    }

    /// Load an image file and store it as `Argb8888`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let image = image::open(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Loaded pixel image");
        Ok(Self::from_rgba8(image.to_rgba8()))
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_rgba8()?.save(path.as_ref())?;
        debug!(path = %path.as_ref().display(), "Saved pixel image");
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn config(&self) -> ColorConfig {
        self.config
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Expand to straight RGBA. `Alpha8` renders black with the mask as alpha.
    pub fn to_rgba8(&self) -> Result<RgbaImage> {
        let rgba: Vec<u8> = match self.config {
            ColorConfig::Argb8888 => self.data.clone(),
            ColorConfig::Rgb565 => self
                .data
                .chunks_exact(2)
                .flat_map(|px| {
                    let [r, g, b] = unpack_rgb565(u16::from_le_bytes([px[0], px[1]]));
                    [r, g, b, u8::MAX]
                })
                .collect(),
            ColorConfig::Alpha8 => self.data.iter().flat_map(|&a| [0, 0, 0, a]).collect(),
        };
        RgbaImage::from_raw(self.width, self.height, rgba).ok_or(BitmatError::BufferSize {
            expected: self.width as usize * self.height as usize * 4,
            actual: self.data.len() / self.config.bytes_per_pixel() * 4,
        })
    }

    /// RGBA value at `(x, y)`, or `None` outside the image
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let bpp = self.config.bytes_per_pixel();
        let offset = (y as usize * self.width as usize + x as usize) * bpp;
        let px = &self.data[offset..offset + bpp];
        Some(match self.config {
            ColorConfig::Argb8888 => Rgba([px[0], px[1], px[2], px[3]]),
            ColorConfig::Rgb565 => {
                let [r, g, b] = unpack_rgb565(u16::from_le_bytes([px[0], px[1]]));
                Rgba([r, g, b, u8::MAX])
            }
            ColorConfig::Alpha8 => Rgba([0, 0, 0, px[0]]),
        })
    }

    /// Convert into a fresh RGBA matrix
    pub fn to_mat(&self) -> Result<Mat> {
        crate::bridge::image_to_mat(self)
    }
}

impl From<RgbaImage> for PixelImage {
    fn from(image: RgbaImage) -> Self {
        Self::from_rgba8(image)
    }
}

/// Expand a 565 pixel by shifting, without replicating high bits into the low ones
pub(crate) fn unpack_rgb565(value: u16) -> [u8; 3] {
    let r = ((value >> 11) << 3) as u8;
    let g = (((value >> 5) & 0x3f) << 2) as u8;
    let b = ((value & 0x1f) << 3) as u8;
    [r, g, b]
}

pub(crate) fn pack_rgb565(r: u8, g: u8, b: u8) -> u16 {
    (u16::from(r & 0xf8) << 8) | (u16::from(g & 0xfc) << 3) | (u16::from(b) >> 3)
}
