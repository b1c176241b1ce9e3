use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use tracing::debug;

use crate::{
    error::Result,
    filters::{AdaptiveThreshold, Canny, GaussianBlur, Threshold},
    mat::Mat,
    pixel::PixelImage,
};

/// One filter invocation, selectable from configuration
#[derive(
    Debug, Clone,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq,
)]
#[serde(tag = "type", content = "params")]
#[strum(serialize_all = "snake_case")]
pub enum FilterCommand {
    /// Reduce to a single intensity channel
    #[serde(rename = "gray")]
    Gray,

    #[serde(rename = "gaussian_blur")]
    GaussianBlur(GaussianBlur),

    #[serde(rename = "canny")]
    Canny(Canny),

    #[serde(rename = "threshold")]
    Threshold(Threshold),

    #[serde(rename = "adaptive_threshold")]
    AdaptiveThreshold(AdaptiveThreshold),
}

impl FilterCommand {
    /// Get the JSON schema for all commands
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FilterCommand)
    }

    pub fn command_names() -> &'static [&'static str] {
        <Self as VariantNames>::VARIANTS
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Gray => "Convert the image to grayscale",
            Self::GaussianBlur(_) => "Blur the colour image with a Gaussian kernel",
            Self::Canny(_) => "Detect edges with the Canny algorithm on the grayscale image",
            Self::Threshold(_) => "Apply a fixed-level threshold to the grayscale image",
            Self::AdaptiveThreshold(_) => "Threshold the grayscale image against local neighbourhood means",
        }
    }

    /// Run the command on a fresh working matrix and return an `Argb8888` image
    pub fn run(&self, image: &PixelImage) -> Result<PixelImage> {
        debug!(command = %self, "Running filter command");
        let mut mat = Mat::default();
        match self {
            Self::Gray => {
                mat.to_gray(image)?;
                mat.to_bitmap()
            }
            Self::GaussianBlur(params) => mat.gaussian_blur(image, params),
            Self::Canny(params) => mat.canny(image, params),
            Self::Threshold(params) => mat.threshold(image, params),
            Self::AdaptiveThreshold(params) => mat.adaptive_threshold(image, params),
        }
    }
}
