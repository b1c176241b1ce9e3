use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

/// Pixel encoding of a [`PixelImage`](crate::pixel::PixelImage)
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ColorConfig {
    /// 32 bits per pixel, bytes laid out as R, G, B, A
    #[default]
    Argb8888,
    /// 16 bits per pixel, little-endian `RRRRRGGG GGGBBBBB`
    Rgb565,
    /// 8 bits per pixel, alpha mask only
    Alpha8,
}

impl ColorConfig {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Argb8888 => 4,
            Self::Rgb565 => 2,
            Self::Alpha8 => 1,
        }
    }
}

/// Element type tag of a [`Mat`](crate::mat::Mat). All elements are 8-bit unsigned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum MatType {
    /// Single-channel intensity
    #[default]
    Cv8UC1,
    /// Interleaved R, G, B
    Cv8UC3,
    /// Interleaved R, G, B, A
    Cv8UC4,
}

impl MatType {
    pub fn channels(self) -> usize {
        match self {
            Self::Cv8UC1 => 1,
            Self::Cv8UC3 => 3,
            Self::Cv8UC4 => 4,
        }
    }

    pub fn from_channels(channels: usize) -> Option<Self> {
        match channels {
            1 => Some(Self::Cv8UC1),
            3 => Some(Self::Cv8UC3),
            4 => Some(Self::Cv8UC4),
            _ => None,
        }
    }
}

/// Width and height of a convolution kernel
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct KernelSize {
    pub width: u32,
    pub height: u32,
}

impl KernelSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn square(size: u32) -> Self {
        Self::new(size, size)
    }
}

#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ThresholdType {
    /// `max_value` above the threshold, 0 otherwise
    #[default]
    Binary,
    /// 0 above the threshold, `max_value` otherwise
    BinaryInv,
    /// Threshold above the threshold, source otherwise
    Trunc,
    /// Source above the threshold, 0 otherwise
    ToZero,
    /// 0 above the threshold, source otherwise
    ToZeroInv,
}

/// How the local threshold is computed for adaptive thresholding
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AdaptiveMethod {
    /// Mean of the block neighbourhood minus `c`
    #[default]
    MeanC,
    /// Gaussian-weighted mean of the block neighbourhood minus `c`
    GaussianC,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorConversion {
    RgbToGray,
    RgbaToGray,
    GrayToRgba,
    RgbToRgba,
    RgbaToRgb,
}

impl ColorConversion {
    pub fn source_channels(self) -> usize {
        match self {
            Self::RgbToGray | Self::RgbToRgba => 3,
            Self::RgbaToGray | Self::RgbaToRgb => 4,
            Self::GrayToRgba => 1,
        }
    }

    pub fn target_type(self) -> MatType {
        match self {
            Self::RgbToGray | Self::RgbaToGray => MatType::Cv8UC1,
            Self::RgbaToRgb => MatType::Cv8UC3,
            Self::GrayToRgba | Self::RgbToRgba => MatType::Cv8UC4,
        }
    }
}
