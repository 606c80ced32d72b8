/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Compressed image containers in and out of the bridge
//!
//! Reading recognises PNG and (with the `jpeg` feature) JPEG by their
//! magic bytes and always produces 8 bit luminance. Writing produces 8
//! bit grayscale PNG.
use log::trace;
use zune_barcode::image::rgb_to_luminance;
use zune_barcode::Bitmap;
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_core::options::EncoderOptions;
use zune_core::result::DecodingResult;
use zune_png::{PngDecoder, PngEncoder};

use crate::errors::BridgeError;
use crate::view::{BufferView, PixelLayout};

const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];
const JPEG_MAGIC: [u8; 3] = [0xFF, 0xD8, 0xFF];

/// Container formats [`load_pixels`] understands
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    PNG,
    JPEG
}

impl ImageFormat {
    /// Guess the container from the first bytes of `bytes`
    pub fn guess(bytes: &[u8]) -> Option<ImageFormat> {
        if bytes.starts_with(&PNG_MAGIC) {
            Some(ImageFormat::PNG)
        } else if bytes.starts_with(&JPEG_MAGIC) {
            Some(ImageFormat::JPEG)
        } else {
            None
        }
    }
}

/// An 8 bit luminance image owned by the bridge for one call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedPixels {
    width:  usize,
    height: usize,
    pixels: Vec<u8>
}

impl OwnedPixels {
    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Borrow the pixels as a view for the readers
    pub fn view(&self) -> Result<BufferView<'_>, BridgeError> {
        BufferView::new(&self.pixels, self.width, self.height, None, PixelLayout::Lum)
    }
}

/// Reduce interleaved samples to one luminance byte per pixel
fn to_luminance(samples: &[u8], colorspace: ColorSpace) -> Result<Vec<u8>, BridgeError> {
    let luma = match colorspace {
        ColorSpace::Luma => samples.to_vec(),
        ColorSpace::LumaA => samples.chunks_exact(2).map(|px| px[0]).collect(),
        ColorSpace::RGB => samples
            .chunks_exact(3)
            .map(|px| rgb_to_luminance(px[0], px[1], px[2]))
            .collect(),
        ColorSpace::RGBA => samples
            .chunks_exact(4)
            .map(|px| rgb_to_luminance(px[0], px[1], px[2]))
            .collect(),
        other => {
            return Err(BridgeError::ImageLoad(format!(
                "unsupported colorspace {other:?}"
            )))
        }
    };
    Ok(luma)
}

fn load_png(bytes: &[u8]) -> Result<OwnedPixels, BridgeError> {
    let mut decoder = PngDecoder::new(bytes);
    decoder.decode_headers()?;

    let (width, height) = decoder
        .get_dimensions()
        .ok_or_else(|| BridgeError::ImageLoad("PNG headers carry no dimensions".to_string()))?;
    let colorspace = decoder
        .get_colorspace()
        .ok_or_else(|| BridgeError::ImageLoad("PNG headers carry no colorspace".to_string()))?;

    let samples = match decoder.decode()? {
        DecodingResult::U8(data) => data,
        // keep the high byte of sixteen bit samples
        DecodingResult::U16(data) => data.iter().map(|x| (x >> 8) as u8).collect(),
        _ => return Err(BridgeError::ImageLoad("unsupported PNG sample type".to_string()))
    };
    trace!("PNG {width}x{height} {colorspace:?}");

    Ok(OwnedPixels {
        width,
        height,
        pixels: to_luminance(&samples, colorspace)?
    })
}

#[cfg(feature = "jpeg")]
fn load_jpeg(bytes: &[u8]) -> Result<OwnedPixels, BridgeError> {
    use zune_core::options::DecoderOptions;
    use zune_jpeg::JpegDecoder;

    let options = DecoderOptions::default().jpeg_set_out_colorspace(ColorSpace::Luma);
    let mut decoder = JpegDecoder::new_with_options(bytes, options);
    let pixels = decoder.decode()?;

    let (width, height) = decoder
        .dimensions()
        .ok_or_else(|| BridgeError::ImageLoad("JPEG headers carry no dimensions".to_string()))?;
    trace!("JPEG {width}x{height}");

    // the decoder falls back to colour for a few exotic inputs
    let colorspace = match pixels.len() / (width * height).max(1) {
        3 => ColorSpace::RGB,
        4 => ColorSpace::RGBA,
        _ => ColorSpace::Luma
    };
    Ok(OwnedPixels {
        width,
        height,
        pixels: to_luminance(&pixels, colorspace)?
    })
}

#[cfg(not(feature = "jpeg"))]
fn load_jpeg(_: &[u8]) -> Result<OwnedPixels, BridgeError> {
    Err(BridgeError::ImageLoad(
        "JPEG support was not compiled in".to_string()
    ))
}

/// Decode a compressed image into owned luminance pixels
///
/// # Errors
/// [`ImageLoad`](crate::errors::ErrorKind::ImageLoad) class errors when
/// the container is not recognised or its codec rejects the data.
pub fn load_pixels(bytes: &[u8]) -> Result<OwnedPixels, BridgeError> {
    let pixels = match ImageFormat::guess(bytes) {
        Some(ImageFormat::PNG) => load_png(bytes)?,
        Some(ImageFormat::JPEG) => load_jpeg(bytes)?,
        None => {
            return Err(BridgeError::ImageLoad(
                "input is not a PNG or JPEG image".to_string()
            ))
        }
    };
    if pixels.pixels.len() < pixels.width * pixels.height {
        return Err(BridgeError::ImageLoad(
            "decoded image is smaller than its headers claim".to_string()
        ));
    }
    Ok(pixels)
}

/// Compress a rendered bitmap as an 8 bit grayscale PNG
pub fn encode_png(bitmap: &Bitmap) -> Vec<u8> {
    let options = EncoderOptions::new(
        bitmap.width(),
        bitmap.height(),
        ColorSpace::Luma,
        BitDepth::Eight
    );
    PngEncoder::new(bitmap.pixels(), options).encode()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn containers_are_sniffed() {
        assert_eq!(ImageFormat::guess(&PNG_MAGIC), Some(ImageFormat::PNG));
        assert_eq!(ImageFormat::guess(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::JPEG));
        assert_eq!(ImageFormat::guess(b"GIF89a"), None);
        assert_eq!(ImageFormat::guess(&[]), None);
    }

    #[test]
    fn non_images_fail_to_load() {
        let err = load_pixels(b"definitely not an image").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ImageLoad);

        // right magic, garbage after it
        let mut broken = PNG_MAGIC.to_vec();
        broken.extend_from_slice(&[0; 16]);
        assert_eq!(load_pixels(&broken).unwrap_err().kind(), ErrorKind::ImageLoad);
    }

    #[test]
    fn colour_is_reduced_to_luminance() {
        let rgb = [255, 255, 255, 0, 0, 0];
        assert_eq!(to_luminance(&rgb, ColorSpace::RGB).unwrap(), [255, 0]);
        let luma_a = [10, 255, 20, 0];
        assert_eq!(to_luminance(&luma_a, ColorSpace::LumaA).unwrap(), [10, 20]);
        assert!(to_luminance(&rgb, ColorSpace::CMYK).is_err());
    }
}
