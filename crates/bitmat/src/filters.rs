use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    mat::Mat,
    ops,
    traits::MatFilter,
    types::{AdaptiveMethod, KernelSize, ThresholdType},
};

/// Gaussian blur over all colour channels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct GaussianBlur {
    pub kernel_size: KernelSize,
    /// Standard deviation along x; `0` derives it from the kernel width
    pub sigma_x: f64,
    /// Standard deviation along y; `0` uses `sigma_x`
    pub sigma_y: f64,
}

impl Default for GaussianBlur {
    fn default() -> Self {
        Self {
            kernel_size: KernelSize::square(125),
            sigma_x: 0.0,
            sigma_y: 0.0,
        }
    }
}

impl MatFilter for GaussianBlur {
    fn name(&self) -> &'static str {
        "gaussian_blur"
    }

    // Blur runs on the colour matrix
    fn requires_gray(&self) -> bool {
        false
    }

    fn apply(&self, src: &Mat) -> Result<Mat> {
        ops::gaussian_blur(src, self.kernel_size, self.sigma_x, self.sigma_y)
    }
}

/// Canny edge detection with hysteresis thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Canny {
    pub threshold1: f64,
    pub threshold2: f64,
}

impl Default for Canny {
    fn default() -> Self {
        Self {
            threshold1: 20.0,
            threshold2: 255.0,
        }
    }
}

impl MatFilter for Canny {
    fn name(&self) -> &'static str {
        "canny"
    }

    fn apply(&self, src: &Mat) -> Result<Mat> {
        ops::canny(src, self.threshold1, self.threshold2)
    }
}

/// Fixed-level threshold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Threshold {
    pub thresh: f64,
    pub max_value: f64,
    pub kind: ThresholdType,
}

impl Default for Threshold {
    fn default() -> Self {
        Self {
            thresh: 50.0,
            max_value: 255.0,
            kind: ThresholdType::Binary,
        }
    }
}

impl MatFilter for Threshold {
    fn name(&self) -> &'static str {
        "threshold"
    }

    fn apply(&self, src: &Mat) -> Result<Mat> {
        ops::threshold(src, self.thresh, self.max_value, self.kind)
    }
}

/// Threshold against the local neighbourhood mean
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AdaptiveThreshold {
    pub max_value: f64,
    pub method: AdaptiveMethod,
    /// Only `binary` and `binary_inv` are accepted
    pub kind: ThresholdType,
    /// Odd neighbourhood size, at least 3
    pub block_size: u32,
    /// Constant subtracted from the mean
    pub c: f64,
}

impl Default for AdaptiveThreshold {
    fn default() -> Self {
        Self {
            max_value: 255.0,
            method: AdaptiveMethod::MeanC,
            kind: ThresholdType::Binary,
            block_size: 11,
            c: 12.0,
        }
    }
}

impl MatFilter for AdaptiveThreshold {
    fn name(&self) -> &'static str {
        "adaptive_threshold"
    }

    fn apply(&self, src: &Mat) -> Result<Mat> {
        ops::adaptive_threshold(src, self.max_value, self.method, self.kind, self.block_size, self.c)
    }
}
