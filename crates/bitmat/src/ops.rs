//! Matrix-level processing routines.
//!
//! Each routine takes the working matrix, delegates the pixel work to
//! `imageproc` where it provides the algorithm, and returns a new matrix.

use image::{GrayImage, ImageBuffer, Luma};
use imageproc::filter::{box_filter, separable_filter};

use crate::{
    error::{BitmatError, Result},
    mat::Mat,
    types::{AdaptiveMethod, ColorConversion, KernelSize, MatType, ThresholdType},
};

/// BT.601 luma weights in 14-bit fixed point
const GRAY_SHIFT: u32 = 14;
const R_WEIGHT: u32 = 4899;
const G_WEIGHT: u32 = 9617;
const B_WEIGHT: u32 = 1868;

/// Longest blur kernel or adaptive block accepted along one axis
pub const MAX_KERNEL_LENGTH: u32 = 65535;

type FloatPlane = ImageBuffer<Luma<f32>, Vec<f32>>;

fn ensure_not_empty(src: &Mat) -> Result<()> {
    if src.is_empty() {
        return Err(BitmatError::EmptyMat {
            rows: src.rows(),
            cols: src.cols(),
        });
    }
    Ok(())
}

fn require_gray(src: &Mat, operation: &'static str) -> Result<()> {
    ensure_not_empty(src)?;
    if !src.is_gray() {
        return Err(BitmatError::UnsupportedFormat {
            operation,
            channels: src.channels(),
        });
    }
    Ok(())
}

fn gray_input(src: &Mat, operation: &'static str) -> Result<GrayImage> {
    require_gray(src, operation)?;
    src.to_gray_image()
}

fn saturate(value: f64) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    let weighted = u32::from(r) * R_WEIGHT + u32::from(g) * G_WEIGHT + u32::from(b) * B_WEIGHT;
    ((weighted + (1 << (GRAY_SHIFT - 1))) >> GRAY_SHIFT) as u8
}

/// Convert between colour layouts
pub fn cvt_color(src: &Mat, conversion: ColorConversion) -> Result<Mat> {
    if src.channels() != conversion.source_channels() {
        return Err(BitmatError::UnsupportedFormat {
            operation: "cvt_color",
            channels: src.channels(),
        });
    }

    let pixels = src.data().chunks_exact(src.channels());
    let data: Vec<u8> = match conversion {
        ColorConversion::RgbToGray | ColorConversion::RgbaToGray => {
            pixels.map(|px| luma(px[0], px[1], px[2])).collect()
        }
        ColorConversion::GrayToRgba => pixels.flat_map(|px| [px[0], px[0], px[0], u8::MAX]).collect(),
        ColorConversion::RgbToRgba => pixels.flat_map(|px| [px[0], px[1], px[2], u8::MAX]).collect(),
        ColorConversion::RgbaToRgb => pixels.flat_map(|px| [px[0], px[1], px[2]]).collect(),
    };

    Mat::from_raw(src.rows(), src.cols(), conversion.target_type(), data)
}

/// Normalised 1-D Gaussian kernel of odd length `size`.
///
/// A non-positive `sigma` is derived from the size. When `sigma` is too small
/// for the weights to be represented the kernel collapses to a single centre tap.
pub fn gaussian_kernel(size: u32, sigma: f64) -> Vec<f32> {
    let sigma = if sigma > 0.0 {
        sigma
    } else {
        0.3 * ((f64::from(size) - 1.0) * 0.5 - 1.0) + 0.8
    };
    let scale = -0.5 / (sigma * sigma);
    let center = (f64::from(size) - 1.0) * 0.5;

    let weights: Vec<f64> = (0..size)
        .map(|i| {
            let x = f64::from(i) - center;
            // -inf * 0 is NaN
            if x == 0.0 { 1.0 } else { (scale * x * x).exp() }
        })
        .collect();
    let sum: f64 = weights.iter().sum();
    if !(sum.is_finite() && sum > 0.0) {
        let mut delta = vec![0.0; size as usize];
        if let Some(tap) = delta.get_mut(size as usize / 2) {
            *tap = 1.0;
        }
        return delta;
    }
    weights.into_iter().map(|w| (w / sum) as f32).collect()
}

fn resolve_kernel_length(size: u32, sigma: f64, axis: &str) -> Result<u32> {
    if !sigma.is_finite() {
        return Err(BitmatError::InvalidParameter(format!(
            "sigma for kernel {axis} must be finite, got {sigma}"
        )));
    }
    let size = if size == 0 && sigma > 0.0 {
        let derived = (sigma * 6.0 + 1.0).round();
        if derived > f64::from(MAX_KERNEL_LENGTH) {
            return Err(BitmatError::InvalidParameter(format!(
                "sigma {sigma} derives a kernel {axis} above {MAX_KERNEL_LENGTH}"
            )));
        }
        derived as u32 | 1
    } else {
        size
    };
    if size == 0 || size % 2 == 0 {
        return Err(BitmatError::InvalidParameter(format!(
            "kernel {axis} must be odd and positive, got {size}"
        )));
    }
    if size > MAX_KERNEL_LENGTH {
        return Err(BitmatError::InvalidParameter(format!(
            "kernel {axis} must be at most {MAX_KERNEL_LENGTH}, got {size}"
        )));
    }
    Ok(size)
}

/// Gaussian blur with an explicit kernel size, applied to every channel.
///
/// A zero kernel dimension is derived from the matching sigma; a zero
/// `sigma_y` takes the value of `sigma_x`. Borders are replicated.
pub fn gaussian_blur(src: &Mat, ksize: KernelSize, sigma_x: f64, sigma_y: f64) -> Result<Mat> {
    ensure_not_empty(src)?;
    let sigma_y = if sigma_y <= 0.0 { sigma_x } else { sigma_y };
    let width = resolve_kernel_length(ksize.width, sigma_x, "width")?;
    let height = resolve_kernel_length(ksize.height, sigma_y, "height")?;

    let h_kernel = gaussian_kernel(width, sigma_x);
    let v_kernel = gaussian_kernel(height, sigma_y);

    let channels = src.channels();
    let mut data = vec![0u8; src.data().len()];
    for channel in 0..channels {
        let values: Vec<f32> = src
            .data()
            .iter()
            .skip(channel)
            .step_by(channels)
            .map(|&v| f32::from(v))
            .collect();
        let plane = FloatPlane::from_raw(src.cols(), src.rows(), values).ok_or(BitmatError::BufferSize {
            expected: src.rows() as usize * src.cols() as usize,
            actual: src.data().len() / channels,
        })?;

        let blurred = separable_filter(&plane, &h_kernel, &v_kernel);
        for (i, value) in blurred.into_raw().into_iter().enumerate() {
            data[i * channels + channel] = saturate(f64::from(value));
        }
    }

    Mat::from_raw(src.rows(), src.cols(), src.mat_type(), data)
}

/// Canny edge detection on a single-channel matrix. Edges are 255, the rest 0.
pub fn canny(src: &Mat, threshold1: f64, threshold2: f64) -> Result<Mat> {
    let gray = gray_input(src, "canny")?;
    if threshold1 < 0.0 || threshold2 < 0.0 {
        return Err(BitmatError::InvalidParameter(format!(
            "canny thresholds must be non-negative, got {threshold1} and {threshold2}"
        )));
    }
    let low = threshold1.min(threshold2) as f32;
    let high = threshold1.max(threshold2) as f32;
    Ok(Mat::from_gray_image(imageproc::edges::canny(&gray, low, high)))
}

/// Fixed-level threshold of a single-channel matrix.
///
/// Elements strictly greater than `thresh` count as above the threshold.
pub fn threshold(src: &Mat, thresh: f64, max_value: f64, kind: ThresholdType) -> Result<Mat> {
    require_gray(src, "threshold")?;
    let max_value = saturate(max_value);
    let truncated = thresh.floor().clamp(0.0, 255.0) as u8;

    let data = src
        .data()
        .iter()
        .map(|&v| {
            let above = f64::from(v) > thresh;
            match (kind, above) {
                (ThresholdType::Binary, true) | (ThresholdType::BinaryInv, false) => max_value,
                (ThresholdType::Binary, false) | (ThresholdType::BinaryInv, true) => 0,
                (ThresholdType::Trunc, true) => truncated,
                (ThresholdType::ToZero, true) | (ThresholdType::ToZeroInv, false) => v,
                (ThresholdType::Trunc, false) => v,
                (ThresholdType::ToZero, false) | (ThresholdType::ToZeroInv, true) => 0,
            }
        })
        .collect();

    Mat::from_raw(src.rows(), src.cols(), MatType::Cv8UC1, data)
}

/// Threshold each element against the mean of its `block_size` neighbourhood minus `c`.
pub fn adaptive_threshold(
    src: &Mat,
    max_value: f64,
    method: AdaptiveMethod,
    kind: ThresholdType,
    block_size: u32,
    c: f64,
) -> Result<Mat> {
    let gray = gray_input(src, "adaptive_threshold")?;
    if block_size < 3 || block_size % 2 == 0 {
        return Err(BitmatError::InvalidParameter(format!(
            "block size must be odd and greater than 1, got {block_size}"
        )));
    }
    if block_size > MAX_KERNEL_LENGTH {
        return Err(BitmatError::InvalidParameter(format!(
            "block size must be at most {MAX_KERNEL_LENGTH}, got {block_size}"
        )));
    }
    let invert = match kind {
        ThresholdType::Binary => false,
        ThresholdType::BinaryInv => true,
        other => {
            return Err(BitmatError::InvalidParameter(format!(
                "adaptive threshold supports binary and binary_inv, got {other}"
            )));
        }
    };
    let max_value = saturate(max_value);

    let mean = match method {
        AdaptiveMethod::MeanC => {
            let radius = block_size / 2;
            Mat::from_gray_image(box_filter(&gray, radius, radius))
        }
        AdaptiveMethod::GaussianC => gaussian_blur(src, KernelSize::square(block_size), 0.0, 0.0)?,
    };

    let data = src
        .data()
        .iter()
        .zip(mean.data())
        .map(|(&v, &m)| {
            let above = f64::from(v) > f64::from(m) - c;
            if above != invert { max_value } else { 0 }
        })
        .collect();

    Mat::from_raw(src.rows(), src.cols(), MatType::Cv8UC1, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_mat(rows: u32, cols: u32, f: impl Fn(u32, u32) -> u8) -> Mat {
        let data = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| f(r, c))
            .collect();
        Mat::from_raw(rows, cols, MatType::Cv8UC1, data).unwrap()
    }

    #[test]
    fn test_cvt_color_channel_checks() {
        let rgb = Mat::from_raw(1, 1, MatType::Cv8UC3, vec![255, 0, 0]).unwrap();
        let gray = cvt_color(&rgb, ColorConversion::RgbToGray).unwrap();
        assert_eq!(gray.data(), &[76]);

        let rgba = cvt_color(&gray, ColorConversion::GrayToRgba).unwrap();
        assert_eq!(rgba.data(), &[76, 76, 76, 255]);
        assert_eq!(cvt_color(&rgba, ColorConversion::RgbaToRgb).unwrap().data(), &[76, 76, 76]);

        let err = cvt_color(&gray, ColorConversion::RgbaToGray).unwrap_err();
        assert!(matches!(err, BitmatError::UnsupportedFormat { channels: 1, .. }));
    }

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_gaussian_kernel_is_normalised() {
        for size in [1, 3, 7, 125] {
            let kernel = gaussian_kernel(size, 0.0);
            assert_eq!(kernel.len(), size as usize);
            let sum: f32 = kernel.iter().sum();
            assert!((sum - 1.0).abs() < 1e-4);
            assert!((kernel[0] - kernel[size as usize - 1]).abs() < 1e-7);
        }
    }

    #[test]
    fn test_gaussian_blur_rejects_bad_kernels() {
        let mat = gray_mat(4, 4, |_, _| 10);
        assert!(matches!(
            gaussian_blur(&mat, KernelSize::square(4), 0.0, 0.0),
            Err(BitmatError::InvalidParameter(_))
        ));
        assert!(matches!(
            gaussian_blur(&mat, KernelSize::square(0), 0.0, 0.0),
            Err(BitmatError::InvalidParameter(_))
        ));
        assert!(gaussian_blur(&mat, KernelSize::square(0), 1.5, 0.0).is_ok());
        assert!(matches!(
            gaussian_blur(&mat, KernelSize::square(MAX_KERNEL_LENGTH + 2), 0.0, 0.0),
            Err(BitmatError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_gaussian_blur_rejects_unusable_sigma() {
        let mat = gray_mat(4, 4, |_, _| 10);
        assert!(matches!(
            gaussian_blur(&mat, KernelSize::square(0), 1e9, 0.0),
            Err(BitmatError::InvalidParameter(_))
        ));
        for sigma in [f64::NAN, f64::INFINITY] {
            assert!(matches!(
                gaussian_blur(&mat, KernelSize::square(3), sigma, 0.0),
                Err(BitmatError::InvalidParameter(_))
            ));
            assert!(matches!(
                gaussian_blur(&mat, KernelSize::square(3), 1.0, sigma),
                Err(BitmatError::InvalidParameter(_))
            ));
        }
    }

    #[test]
    fn test_tiny_sigma_keeps_image() {
        let mat = gray_mat(1, 3, |_, c| (c as u8 + 1) * 10);
        for width in [1, 3] {
            let blurred = gaussian_blur(&mat, KernelSize::new(width, 1), 1e-200, 0.0).unwrap();
            assert_eq!(blurred.data(), &[10, 20, 30]);
        }

        assert_eq!(gaussian_kernel(3, 1e-200), vec![0.0, 1.0, 0.0]);
        assert_eq!(gaussian_kernel(4, 1e-200), vec![0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_gaussian_blur_smooths_step() {
        let mat = gray_mat(1, 8, |_, c| if c < 4 { 0 } else { 200 });
        let blurred = gaussian_blur(&mat, KernelSize::new(5, 1), 0.0, 0.0).unwrap();

        assert_eq!(blurred.at(0, 0), &[0]);
        assert_eq!(blurred.at(0, 7), &[200]);
        let left = blurred.at(0, 3)[0];
        let right = blurred.at(0, 4)[0];
        assert!(left > 0 && left < 100, "left of edge was {left}");
        assert!(right > 100 && right < 200, "right of edge was {right}");
    }

    #[test]
    fn test_threshold_kinds() {
        let mat = Mat::from_raw(1, 4, MatType::Cv8UC1, vec![0, 50, 51, 200]).unwrap();
        let run = |kind| threshold(&mat, 50.0, 255.0, kind).unwrap().into_raw();

        assert_eq!(run(ThresholdType::Binary), vec![0, 0, 255, 255]);
        assert_eq!(run(ThresholdType::BinaryInv), vec![255, 255, 0, 0]);
        assert_eq!(run(ThresholdType::Trunc), vec![0, 50, 50, 50]);
        assert_eq!(run(ThresholdType::ToZero), vec![0, 0, 51, 200]);
        assert_eq!(run(ThresholdType::ToZeroInv), vec![0, 50, 0, 0]);
    }

    #[test]
    fn test_threshold_requires_gray() {
        let mat = Mat::new(2, 2, MatType::Cv8UC4);
        let err = threshold(&mat, 50.0, 255.0, ThresholdType::Binary).unwrap_err();
        assert!(matches!(err, BitmatError::UnsupportedFormat { channels: 4, .. }));

        let empty = Mat::default();
        assert!(matches!(
            threshold(&empty, 50.0, 255.0, ThresholdType::Binary),
            Err(BitmatError::EmptyMat { .. })
        ));
    }

    #[test]
    fn test_adaptive_threshold_marks_dark_side_of_edge() {
        let mat = gray_mat(8, 8, |_, c| if c < 4 { 0 } else { 200 });
        let result = adaptive_threshold(&mat, 255.0, AdaptiveMethod::MeanC, ThresholdType::Binary, 3, 12.0).unwrap();

        for row in 0..8 {
            for col in 0..8 {
                let expected: u8 = if col == 3 { 0 } else { 255 };
                assert_eq!(result.at(row, col), &[expected], "at ({row}, {col})");
            }
        }

        let inverted =
            adaptive_threshold(&mat, 255.0, AdaptiveMethod::MeanC, ThresholdType::BinaryInv, 3, 12.0).unwrap();
        assert_eq!(inverted.at(0, 3), &[255]);
        assert_eq!(inverted.at(0, 0), &[0]);
    }

    #[test]
    fn test_adaptive_threshold_gaussian_method() {
        let mat = gray_mat(8, 8, |_, c| if c < 4 { 0 } else { 200 });
        let result =
            adaptive_threshold(&mat, 255.0, AdaptiveMethod::GaussianC, ThresholdType::Binary, 5, 12.0).unwrap();
        assert_eq!(result.at(4, 0), &[255]);
        assert_eq!(result.at(4, 3), &[0]);
        assert_eq!(result.at(4, 7), &[255]);
    }

    #[test]
    fn test_adaptive_threshold_parameter_checks() {
        let mat = gray_mat(4, 4, |_, _| 0);
        for block_size in [0, 1, 4] {
            assert!(matches!(
                adaptive_threshold(&mat, 255.0, AdaptiveMethod::MeanC, ThresholdType::Binary, block_size, 2.0),
                Err(BitmatError::InvalidParameter(_))
            ));
        }
        assert!(matches!(
            adaptive_threshold(&mat, 255.0, AdaptiveMethod::MeanC, ThresholdType::Trunc, 3, 2.0),
            Err(BitmatError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_adaptive_threshold_rejects_oversized_block() {
        let mat = gray_mat(2, 2, |_, _| 0);
        for method in [AdaptiveMethod::MeanC, AdaptiveMethod::GaussianC] {
            for block_size in [u32::MAX, MAX_KERNEL_LENGTH + 2] {
                assert!(matches!(
                    adaptive_threshold(&mat, 255.0, method, ThresholdType::Binary, block_size, 2.0),
                    Err(BitmatError::InvalidParameter(_))
                ));
            }
        }

        // blocks wider than the image are fine
        let result = adaptive_threshold(&mat, 255.0, AdaptiveMethod::MeanC, ThresholdType::Binary, 9, 2.0).unwrap();
        assert_eq!(result.data(), &[255, 255, 255, 255]);
    }

    #[test]
    fn test_canny_finds_square_outline() {
        let mat = gray_mat(32, 32, |r, c| if (8..24).contains(&r) && (8..24).contains(&c) { 255 } else { 0 });
        let edges = canny(&mat, 20.0, 255.0).unwrap();

        assert!(edges.is_gray());
        assert!(edges.data().iter().all(|&v| v == 0 || v == 255));
        assert!(edges.data().iter().any(|&v| v == 255));
        assert_eq!(edges.at(0, 0), &[0]);
        assert_eq!(edges.at(16, 16), &[0]);
    }

    #[test]
    fn test_canny_threshold_order_and_sign() {
        let mat = gray_mat(32, 32, |r, c| if (8..24).contains(&r) && (8..24).contains(&c) { 255 } else { 0 });
        let forward = canny(&mat, 20.0, 255.0).unwrap();
        let swapped = canny(&mat, 255.0, 20.0).unwrap();
        assert_eq!(forward, swapped);

        for (t1, t2) in [(-1.0, 10.0), (10.0, -1.0)] {
            assert!(matches!(canny(&mat, t1, t2), Err(BitmatError::InvalidParameter(_))));
        }
    }

    #[test]
    fn test_canny_on_uniform_image_is_blank() {
        let mat = gray_mat(16, 16, |_, _| 90);
        let edges = canny(&mat, 20.0, 255.0).unwrap();
        assert!(edges.data().iter().all(|&v| v == 0));
    }
}
