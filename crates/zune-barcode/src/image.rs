/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Borrowed pixel input for the readers
use crate::errors::BarcodeError;

/// Memory layout of a single pixel
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PixelFormat {
    /// One luminance byte
    Lum,
    /// Luminance followed by alpha
    LumA,
    RGB,
    BGR,
    RGBA,
    BGRA
}

impl PixelFormat {
    /// Bytes occupied by one pixel
    pub const fn components(self) -> usize {
        match self {
            PixelFormat::Lum => 1,
            PixelFormat::LumA => 2,
            PixelFormat::RGB | PixelFormat::BGR => 3,
            PixelFormat::RGBA | PixelFormat::BGRA => 4
        }
    }
}

/// Rec. 601 luma with integer weights summing to 1024
#[inline(always)]
pub fn rgb_to_luminance(r: u8, g: u8, b: u8) -> u8 {
    ((306 * u32::from(r) + 601 * u32::from(g) + 117 * u32::from(b) + 512) >> 10) as u8
}

/// A non owning view over caller pixels
///
/// The view never copies, readers sample through [`luminance`](Self::luminance)
/// which converts colour pixels on the fly.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a> {
    data:       &'a [u8],
    width:      usize,
    height:     usize,
    row_stride: usize,
    format:     PixelFormat
}

impl<'a> ImageView<'a> {
    /// Create a view, `row_stride` of `None` means tightly packed rows
    ///
    /// # Errors
    /// When dimensions are zero, the stride is shorter than a row or the
    /// buffer can not hold `height` rows.
    pub fn new(
        data: &'a [u8], width: usize, height: usize, format: PixelFormat, row_stride: Option<usize>
    ) -> Result<ImageView<'a>, BarcodeError> {
        if width == 0 || height == 0 {
            return Err(BarcodeError::InvalidInput(format!(
                "image dimensions must be non zero, found {width}x{height}"
            )));
        }
        let row_bytes = width
            .checked_mul(format.components())
            .ok_or(BarcodeError::GenericStatic("image width overflows"))?;
        let row_stride = row_stride.unwrap_or(row_bytes);

        if row_stride < row_bytes {
            return Err(BarcodeError::InvalidInput(format!(
                "row stride {row_stride} is smaller than a row of {row_bytes} bytes"
            )));
        }
        // last row need not be padded to the full stride
        let needed = row_stride
            .checked_mul(height - 1)
            .and_then(|x| x.checked_add(row_bytes))
            .ok_or(BarcodeError::GenericStatic("image size overflows"))?;

        if data.len() < needed {
            return Err(BarcodeError::InvalidInput(format!(
                "buffer of {} bytes is too small for a {width}x{height} {format:?} image, expected at least {needed}",
                data.len()
            )));
        }
        Ok(ImageView {
            data,
            width,
            height,
            row_stride,
            format
        })
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub const fn format(&self) -> PixelFormat {
        self.format
    }

    /// Luminance of the pixel at `(x, y)`
    #[inline]
    pub fn luminance(&self, x: usize, y: usize) -> u8 {
        let offset = y * self.row_stride + x * self.format.components();
        let px = &self.data[offset..offset + self.format.components()];

        match self.format {
            PixelFormat::Lum | PixelFormat::LumA => px[0],
            PixelFormat::RGB | PixelFormat::RGBA => rgb_to_luminance(px[0], px[1], px[2]),
            PixelFormat::BGR | PixelFormat::BGRA => rgb_to_luminance(px[2], px[1], px[0])
        }
    }

    /// Luminance of a whole row
    pub fn luminance_row(&self, y: usize, out: &mut Vec<u8>) {
        out.clear();
        if self.format == PixelFormat::Lum {
            let start = y * self.row_stride;
            out.extend_from_slice(&self.data[start..start + self.width]);
            return;
        }
        out.extend((0..self.width).map(|x| self.luminance(x, y)));
    }
}

/// An owned single channel image, produced by downscaling
#[derive(Clone, Debug)]
pub struct LumImage {
    pub(crate) data:   Vec<u8>,
    pub(crate) width:  usize,
    pub(crate) height: usize
}

impl LumImage {
    pub fn view(&self) -> ImageView<'_> {
        ImageView {
            data:       &self.data,
            width:      self.width,
            height:     self.height,
            row_stride: self.width,
            format:     PixelFormat::Lum
        }
    }

    /// Box filter `view` down by an integer `factor`
    pub fn downscaled(view: &ImageView, factor: usize) -> Option<LumImage> {
        let factor = factor.max(2);
        let width = view.width() / factor;
        let height = view.height() / factor;
        if width == 0 || height == 0 {
            return None;
        }
        let area = (factor * factor) as u32;
        let mut data = Vec::with_capacity(width * height);

        for y in 0..height {
            for x in 0..width {
                let mut sum = 0u32;
                for dy in 0..factor {
                    for dx in 0..factor {
                        sum += u32::from(view.luminance(x * factor + dx, y * factor + dy));
                    }
                }
                data.push((sum / area) as u8);
            }
        }
        Some(LumImage {
            data,
            width,
            height
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_buffers() {
        let data = [0u8; 12];
        assert!(ImageView::new(&data, 2, 2, PixelFormat::RGB, None).is_ok());
        assert!(ImageView::new(&data, 2, 2, PixelFormat::RGBA, None).is_err());
        assert!(ImageView::new(&data, 0, 2, PixelFormat::Lum, None).is_err());
        assert!(ImageView::new(&data, 4, 2, PixelFormat::Lum, Some(3)).is_err());
        // padded rows, last row unpadded
        assert!(ImageView::new(&data, 3, 2, PixelFormat::Lum, Some(8)).is_ok());
    }

    #[test]
    fn converts_colour_to_luminance() {
        let data = [255, 0, 0, 255, 0, 0, 255, 255];
        let view = ImageView::new(&data, 2, 1, PixelFormat::RGBA, None).unwrap();
        assert_eq!(view.luminance(0, 0), rgb_to_luminance(255, 0, 0));
        assert_eq!(view.luminance(1, 0), rgb_to_luminance(0, 0, 255));
        assert_eq!(rgb_to_luminance(255, 255, 255), 255);
        assert_eq!(rgb_to_luminance(0, 0, 0), 0);
    }

    #[test]
    fn downscale_averages() {
        let data = [0, 0, 255, 255, 0, 0, 255, 255];
        let view = ImageView::new(&data, 4, 2, PixelFormat::Lum, None).unwrap();
        let small = LumImage::downscaled(&view, 2).unwrap();
        assert_eq!((small.width, small.height), (2, 1));
        assert_eq!(small.data, vec![0, 255]);
    }
}
