/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! The multi pass reading driver
//!
//! One call binarizes the image (and its downscaled copies when
//! enabled), runs the matrix and linear readers on the plain and the
//! inverted bit matrix, and for linear symbols also on the matrix
//! turned by a quarter. Results from later passes that repeat an
//! earlier symbol are dropped.
use crate::bitmatrix::BitMatrix;
use crate::config::ReaderConfig;
use crate::format::BarcodeFormat;
use crate::geometry::{PointI, Position};
use crate::image::{ImageView, LumImage};
use crate::log::debug;
use crate::oned;
use crate::qr;
use crate::symbol::Barcode;

const LINEAR_FORMATS: [BarcodeFormat; 4] = [
    BarcodeFormat::Code128,
    BarcodeFormat::EAN13,
    BarcodeFormat::EAN8,
    BarcodeFormat::UPCA
];

/// One image the readers run on and how to map its coordinates back
struct Pass<'a> {
    view:  ImageView<'a>,
    scale: i32
}

fn scale_position(position: &Position, scale: i32) -> Position {
    position.map(|p| PointI::new(p.x * scale, p.y * scale))
}

/// Undo a clockwise quarter turn of an image that was `height` rows tall
fn unrotate_position(position: &Position, height: usize) -> Position {
    let h = height as i32;
    position.map(|p| PointI::new(p.y, h - 1 - p.x))
}

struct Collector {
    max:      usize,
    found:    Vec<Barcode>,
    failures: Vec<Barcode>
}

impl Collector {
    fn is_full(&self) -> bool {
        self.found.len() >= self.max
    }

    fn add(&mut self, barcode: Barcode) {
        if barcode.error().is_some() {
            if !self.failures.iter().any(|f| f.same_symbol(&barcode)) {
                self.failures.push(barcode);
            }
            return;
        }
        if self.is_full() || self.found.iter().any(|f| f.same_symbol(&barcode)) {
            return;
        }
        self.found.push(barcode);
    }

    /// Valid symbols first, then failures that do not sit on a valid symbol
    fn finish(mut self) -> Vec<Barcode> {
        for failure in self.failures {
            if self.found.len() >= self.max {
                break;
            }
            let center = failure.position().center();
            let covered = self.found.iter().any(|f| {
                let corners = f.position().corners();
                let size = f64::from((corners[1].x - corners[0].x).abs() + (corners[3].y - corners[0].y).abs());
                f.position().center().distance(center) < size.max(8.0)
            });
            if !covered {
                self.found.push(failure);
            }
        }
        self.found
    }
}

fn read_matrix(matrix: &BitMatrix, config: &ReaderConfig, pass: &Pass, inverted: bool, out: &mut Collector) {
    let formats = config.get_effective_formats();

    if formats.contains(BarcodeFormat::QRCode) && !out.is_full() {
        let denoised;
        let qr_matrix = if config.get_try_denoise() {
            denoised = matrix.closed();
            &denoised
        } else {
            matrix
        };
        for mut barcode in qr::reader::read(qr_matrix, config, out.max - out.found.len()) {
            barcode.set_position(scale_position(barcode.position(), pass.scale));
            barcode.set_inverted(inverted);
            out.add(barcode);
        }
    }

    if LINEAR_FORMATS.iter().any(|f| formats.contains(*f)) && !out.is_full() {
        for mut barcode in oned::read(matrix, config, out.max - out.found.len()) {
            barcode.set_position(scale_position(barcode.position(), pass.scale));
            barcode.set_inverted(inverted);
            out.add(barcode);
        }
        if config.get_try_rotate() && !out.is_full() {
            let rotated = matrix.rotated(1);
            for mut barcode in oned::read(&rotated, config, out.max - out.found.len()) {
                let position = unrotate_position(barcode.position(), matrix.height());
                barcode.set_position(scale_position(&position, pass.scale));
                barcode.set_inverted(inverted);
                out.add(barcode);
            }
        }
    }
}

/// Read every supported symbol in `image`
///
/// Returns at most `max_number_of_symbols` results (zero means no
/// limit). Symbols that were located but did not decode are included
/// only when `return_errors` is set.
pub fn read_barcodes(image: &ImageView, config: &ReaderConfig) -> Vec<Barcode> {
    let max = match config.get_max_number_of_symbols() {
        0 => usize::MAX,
        n => usize::from(n)
    };
    let mut out = Collector {
        max,
        found: Vec::new(),
        failures: Vec::new()
    };

    // downscaled copies, each from the previous one
    let mut pyramid: Vec<(LumImage, i32)> = Vec::new();
    if config.get_try_downscale() {
        let threshold = usize::from(config.get_downscale_threshold());
        let factor = usize::from(config.get_downscale_factor());
        let mut scale = 1;
        let mut size = image.width().max(image.height());
        while size > threshold {
            let next = match pyramid.last() {
                Some((level, _)) => LumImage::downscaled(&level.view(), factor),
                None => LumImage::downscaled(image, factor)
            };
            let Some(next) = next else {
                break;
            };
            scale *= factor as i32;
            size = next.view().width().max(next.view().height());
            pyramid.push((next, scale));
        }
    }
    let passes: Vec<Pass> = core::iter::once(Pass { view: *image, scale: 1 })
        .chain(pyramid.iter().map(|(level, scale)| Pass {
            view:  level.view(),
            scale: *scale
        }))
        .collect();

    for pass in &passes {
        let mut matrix = config.get_binarizer().binarize(&pass.view);
        read_matrix(&matrix, config, pass, false, &mut out);

        if config.get_try_invert() && !out.is_full() {
            matrix.invert();
            read_matrix(&matrix, config, pass, true, &mut out);
        }
        if out.is_full() || (!out.found.is_empty() && !config.get_try_harder()) {
            break;
        }
    }

    let mut results = out.finish();
    for barcode in results.iter_mut() {
        barcode.set_text_mode(config.get_text_mode());
        barcode.content_mut().set_hint(config.get_character_set());
    }
    debug!(
        "read {} symbols from {}x{} image in {} passes",
        results.len(),
        image.width(),
        image.height(),
        passes.len()
    );
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::BarcodeFormats;
    use crate::image::PixelFormat;
    use crate::qr::encoder::{encode, QrOptions};

    fn render(matrix: &BitMatrix, scale: usize, margin: usize) -> (Vec<u8>, usize, usize) {
        let width = matrix.width() * scale + 2 * margin;
        let height = matrix.height() * scale + 2 * margin;
        let mut pixels = vec![255u8; width * height];
        for y in 0..matrix.height() * scale {
            for x in 0..matrix.width() * scale {
                if matrix.get(x / scale, y / scale) {
                    pixels[(y + margin) * width + x + margin] = 0;
                }
            }
        }
        (pixels, width, height)
    }

    #[test]
    fn reads_qr_and_inverted_qr() {
        let symbol = encode(b"HELLO", &QrOptions::default()).unwrap();
        let (mut pixels, width, height) = render(&symbol.modules, 4, 16);
        let view = ImageView::new(&pixels, width, height, PixelFormat::Lum, None).unwrap();
        let results = read_barcodes(&view, &ReaderConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text(), "HELLO");
        assert!(!results[0].is_inverted());

        pixels.iter_mut().for_each(|p| *p = 255 - *p);
        let view = ImageView::new(&pixels, width, height, PixelFormat::Lum, None).unwrap();
        let results = read_barcodes(&view, &ReaderConfig::default());
        assert_eq!(results.len(), 1);
        assert!(results[0].is_inverted());

        let no_invert = ReaderConfig::default().set_try_invert(false);
        assert!(read_barcodes(&view, &no_invert).is_empty());
    }

    #[test]
    fn format_filter_and_vertical_linear() {
        let bars = oned::code128::encode(b"VERTICAL", false, false).unwrap();
        let mut tall = BitMatrix::new(bars.width(), 30);
        for y in 0..30 {
            for x in 0..bars.width() {
                tall.set(x, y, bars.get(x, 0));
            }
        }
        let turned = tall.rotated(1);
        let (pixels, width, height) = render(&turned, 2, 20);
        let view = ImageView::new(&pixels, width, height, PixelFormat::Lum, None).unwrap();

        let results = read_barcodes(&view, &ReaderConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].format(), BarcodeFormat::Code128);
        assert_eq!(results[0].text(), "VERTICAL");
        assert!(results[0].line_count() >= 2);

        let qr_only = ReaderConfig::default().set_formats(BarcodeFormats::from(BarcodeFormat::QRCode));
        assert!(read_barcodes(&view, &qr_only).is_empty());
        let no_rotate = ReaderConfig::default().set_try_rotate(false);
        assert!(read_barcodes(&view, &no_rotate).is_empty());
    }

    #[test]
    fn large_images_use_the_pyramid() {
        let symbol = encode(b"BIG", &QrOptions::default()).unwrap();
        let (pixels, width, height) = render(&symbol.modules, 30, 60);
        assert!(width > 500);
        let view = ImageView::new(&pixels, width, height, PixelFormat::Lum, None).unwrap();
        let results = read_barcodes(&view, &ReaderConfig::default().set_try_harder(false));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text(), "BIG");
        let corner = results[0].position().top_left;
        assert!((corner.x - 60).abs() <= 6 && (corner.y - 60).abs() <= 6, "{corner:?}");
    }
}
