/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Borrowed views over caller owned pixel buffers
use zune_barcode::{ImageView, PixelFormat};

use crate::errors::BridgeError;

/// Memory layout of one pixel in a raw buffer
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum PixelLayout {
    /// One luminance byte
    #[default]
    Lum = 0,
    /// Red, green and blue bytes
    RGB = 1,
    /// Red, green, blue and alpha bytes, the layout of canvas `ImageData`
    RGBA = 2
}

impl PixelLayout {
    pub fn from_raw(value: u32) -> Option<PixelLayout> {
        match value {
            0 => Some(PixelLayout::Lum),
            1 => Some(PixelLayout::RGB),
            2 => Some(PixelLayout::RGBA),
            _ => None
        }
    }

    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    /// Bytes per pixel
    pub const fn channels(self) -> usize {
        match self {
            PixelLayout::Lum => 1,
            PixelLayout::RGB => 3,
            PixelLayout::RGBA => 4
        }
    }

    const fn to_pixel_format(self) -> PixelFormat {
        match self {
            PixelLayout::Lum => PixelFormat::Lum,
            PixelLayout::RGB => PixelFormat::RGB,
            PixelLayout::RGBA => PixelFormat::RGBA
        }
    }
}

/// A non owning view over pixels the caller keeps ownership of
///
/// The view is checked once on construction, readers never copy the
/// buffer and the view can not outlive it.
#[derive(Copy, Clone, Debug)]
pub struct BufferView<'a> {
    view:   ImageView<'a>,
    layout: PixelLayout
}

impl<'a> BufferView<'a> {
    /// Describe `data` as `height` rows of `width` pixels
    ///
    /// `stride` is the distance between rows in bytes, `None` means
    /// rows are tightly packed.
    ///
    /// # Errors
    /// When a dimension is zero or `data` is too short to hold the
    /// described image.
    pub fn new(
        data: &'a [u8], width: usize, height: usize, stride: Option<usize>, layout: PixelLayout
    ) -> Result<BufferView<'a>, BridgeError> {
        let view = ImageView::new(data, width, height, layout.to_pixel_format(), stride)?;
        Ok(BufferView { view, layout })
    }

    pub fn width(&self) -> usize {
        self.view.width()
    }

    pub fn height(&self) -> usize {
        self.view.height()
    }

    pub const fn layout(&self) -> PixelLayout {
        self.layout
    }

    /// The engine's view over the same memory
    pub const fn image_view(&self) -> &ImageView<'a> {
        &self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn sizes_are_checked() {
        let data = [0_u8; 12];
        assert!(BufferView::new(&data, 2, 2, None, PixelLayout::RGB).is_ok());
        assert!(BufferView::new(&data, 3, 1, None, PixelLayout::RGBA).is_ok());

        let err = BufferView::new(&data, 2, 2, None, PixelLayout::RGBA).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Engine);
        assert!(BufferView::new(&data, 0, 2, None, PixelLayout::Lum).is_err());
    }

    #[test]
    fn strided_rows() {
        // two rows of three pixels, five bytes apart, last row unpadded
        let data = [0_u8; 8];
        let view = BufferView::new(&data, 3, 2, Some(5), PixelLayout::Lum).unwrap();
        assert_eq!(view.width(), 3);
        assert_eq!(view.image_view().height(), 2);
        assert!(BufferView::new(&data, 3, 2, Some(2), PixelLayout::Lum).is_err());
    }
}
