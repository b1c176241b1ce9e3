//! Conversion between [`PixelImage`] and [`Mat`].

use tracing::debug;

use crate::{
    error::{BitmatError, Result},
    mat::Mat,
    pixel::{PixelImage, pack_rgb565, unpack_rgb565},
    types::{ColorConfig, MatType},
};

/// Copy a pixel image into a new `Cv8UC4` matrix.
///
/// `Argb8888` is copied byte for byte, `Rgb565` is expanded with opaque alpha.
/// `Alpha8` images cannot be decoded into colour channels.
pub fn image_to_mat(image: &PixelImage) -> Result<Mat> {
    let data = match image.config() {
        ColorConfig::Argb8888 => image.data().to_vec(),
        ColorConfig::Rgb565 => image
            .data()
            .chunks_exact(2)
            .flat_map(|px| {
                let [r, g, b] = unpack_rgb565(u16::from_le_bytes([px[0], px[1]]));
                [r, g, b, u8::MAX]
            })
            .collect(),
        config @ ColorConfig::Alpha8 => return Err(BitmatError::UnsupportedConfig(config)),
    };

    debug!(
        width = image.width(),
        height = image.height(),
        config = %image.config(),
        "Converted image to matrix"
    );
    Mat::from_raw(image.height(), image.width(), MatType::Cv8UC4, data)
}

/// Allocate a `cols x rows` image in `config` and copy the matrix into it.
pub fn mat_to_image(mat: &Mat, config: ColorConfig) -> Result<PixelImage> {
    if mat.is_empty() {
        return Err(BitmatError::EmptyMat {
            rows: mat.rows(),
            cols: mat.cols(),
        });
    }

    let channels = mat.channels();
    let rgb = mat.data().chunks_exact(channels).map(|px| match px {
        [v] => [*v, *v, *v, u8::MAX],
        [r, g, b] => [*r, *g, *b, u8::MAX],
        [r, g, b, a] => [*r, *g, *b, *a],
        _ => unreachable!("matrix elements always have 1, 3 or 4 channels"),
    });

    let data: Vec<u8> = match config {
        ColorConfig::Argb8888 => rgb.flatten().collect(),
        ColorConfig::Rgb565 => rgb
            .flat_map(|[r, g, b, _]| pack_rgb565(r, g, b).to_le_bytes())
            .collect(),
        ColorConfig::Alpha8 => return Err(BitmatError::UnsupportedConfig(config)),
    };

    debug!(
        rows = mat.rows(),
        cols = mat.cols(),
        channels,
        config = %config,
        "Converted matrix to image"
    );
    PixelImage::from_raw(mat.cols(), mat.rows(), config, data)
}
