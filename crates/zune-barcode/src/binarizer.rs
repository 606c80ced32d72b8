/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Conversion of luminance images to dark/light bit matrices
use crate::bitmatrix::BitMatrix;
use crate::image::ImageView;

/// Method used to decide whether a pixel is dark or light
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Binarizer {
    /// Threshold each 8x8 block against the mean of its 5x5 block
    /// neighbourhood, robust against uneven lighting
    #[default]
    LocalAverage = 0,
    /// A single threshold from the valley of the luminance histogram
    GlobalHistogram = 1,
    /// Everything at or below 127 is dark
    FixedThreshold = 2,
    /// Only exact zero is dark, for images that already are binary
    BoolCast = 3
}

impl Binarizer {
    pub fn from_raw(value: u32) -> Option<Binarizer> {
        match value {
            0 => Some(Binarizer::LocalAverage),
            1 => Some(Binarizer::GlobalHistogram),
            2 => Some(Binarizer::FixedThreshold),
            3 => Some(Binarizer::BoolCast),
            _ => None
        }
    }

    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            Binarizer::LocalAverage => "LocalAverage",
            Binarizer::GlobalHistogram => "GlobalHistogram",
            Binarizer::FixedThreshold => "FixedThreshold",
            Binarizer::BoolCast => "BoolCast"
        }
    }

    /// Binarize a whole image
    pub fn binarize(self, view: &ImageView) -> BitMatrix {
        match self {
            Binarizer::LocalAverage => local_average(view),
            Binarizer::GlobalHistogram => {
                let threshold = histogram_threshold(view).unwrap_or(127);
                threshold_image(view, threshold)
            }
            Binarizer::FixedThreshold => threshold_image(view, 127),
            Binarizer::BoolCast => {
                let mut matrix = BitMatrix::new(view.width(), view.height());
                for y in 0..view.height() {
                    for x in 0..view.width() {
                        matrix.set(x, y, view.luminance(x, y) == 0);
                    }
                }
                matrix
            }
        }
    }
}

fn threshold_image(view: &ImageView, threshold: u8) -> BitMatrix {
    let mut matrix = BitMatrix::new(view.width(), view.height());
    for y in 0..view.height() {
        for x in 0..view.width() {
            matrix.set(x, y, view.luminance(x, y) <= threshold);
        }
    }
    matrix
}

const LUMINANCE_BITS: usize = 5;
const LUMINANCE_SHIFT: usize = 8 - LUMINANCE_BITS;
const LUMINANCE_BUCKETS: usize = 1 << LUMINANCE_BITS;

/// Find the black point as the deepest valley between the two
/// most prominent peaks of a coarse luminance histogram
///
/// Returns `None` when the image has a single dominant tone.
pub(crate) fn histogram_threshold(view: &ImageView) -> Option<u8> {
    let mut buckets = [0u32; LUMINANCE_BUCKETS];
    let height = view.height();
    let width = view.width();

    // sample a few rows, the full image is overkill
    for i in 1..5 {
        let y = height * i / 5;
        for x in width / 5..(width * 4 / 5).max(width / 5 + 1).min(width) {
            buckets[usize::from(view.luminance(x, y.min(height - 1))) >> LUMINANCE_SHIFT] += 1;
        }
    }

    let (first_peak, _) = buckets
        .iter()
        .enumerate()
        .max_by_key(|(_, count)| **count)?;

    // second peak is scored by its distance from the first
    let mut second_peak = 0;
    let mut second_score = 0u64;
    for (x, count) in buckets.iter().enumerate() {
        let distance = x.abs_diff(first_peak) as u64;
        let score = u64::from(*count) * distance * distance;
        if score > second_score {
            second_peak = x;
            second_score = score;
        }
    }
    let (low, high) = if first_peak > second_peak {
        (second_peak, first_peak)
    } else {
        (first_peak, second_peak)
    };
    if high - low <= LUMINANCE_BUCKETS / 16 {
        return None;
    }

    let max_bucket = u64::from(buckets[first_peak]);
    let mut best_valley = high - 1;
    let mut best_score = -1i64;
    for x in (low + 1..high).rev() {
        let from_low = (x - low) as i64;
        let score = from_low * from_low * (high - x) as i64 * (max_bucket as i64 - i64::from(buckets[x]));
        if score > best_score {
            best_valley = x;
            best_score = score;
        }
    }
    Some(((best_valley << LUMINANCE_SHIFT) as u8).saturating_add(1 << (LUMINANCE_SHIFT - 1)))
}

const BLOCK_SIZE_POWER: usize = 3;
const BLOCK_SIZE: usize = 1 << BLOCK_SIZE_POWER;
const MINIMUM_DIMENSION: usize = BLOCK_SIZE * 5;
const MIN_DYNAMIC_RANGE: u32 = 24;

fn local_average(view: &ImageView) -> BitMatrix {
    let width = view.width();
    let height = view.height();

    if width < MINIMUM_DIMENSION || height < MINIMUM_DIMENSION {
        let threshold = histogram_threshold(view).unwrap_or(127);
        return threshold_image(view, threshold);
    }
    let sub_width = (width + BLOCK_SIZE - 1) >> BLOCK_SIZE_POWER;
    let sub_height = (height + BLOCK_SIZE - 1) >> BLOCK_SIZE_POWER;

    let black_points = block_black_points(view, sub_width, sub_height);
    let mut matrix = BitMatrix::new(width, height);

    for by in 0..sub_height {
        let top = (by << BLOCK_SIZE_POWER).min(height - BLOCK_SIZE);
        let cy = by.clamp(2, sub_height - 3);

        for bx in 0..sub_width {
            let left = (bx << BLOCK_SIZE_POWER).min(width - BLOCK_SIZE);
            let cx = bx.clamp(2, sub_width - 3);

            let mut sum = 0u32;
            for ny in cy - 2..=cy + 2 {
                for nx in cx - 2..=cx + 2 {
                    sum += black_points[ny * sub_width + nx];
                }
            }
            let threshold = sum / 25;

            for y in top..top + BLOCK_SIZE {
                for x in left..left + BLOCK_SIZE {
                    matrix.set(x, y, u32::from(view.luminance(x, y)) <= threshold);
                }
            }
        }
    }
    matrix
}

/// Mean luminance per block, low contrast blocks borrow from their neighbours
fn block_black_points(view: &ImageView, sub_width: usize, sub_height: usize) -> Vec<u32> {
    let width = view.width();
    let height = view.height();
    let mut points = vec![0u32; sub_width * sub_height];

    for by in 0..sub_height {
        let top = (by << BLOCK_SIZE_POWER).min(height - BLOCK_SIZE);
        for bx in 0..sub_width {
            let left = (bx << BLOCK_SIZE_POWER).min(width - BLOCK_SIZE);

            let mut sum = 0u32;
            let mut min = u32::MAX;
            let mut max = 0u32;
            for y in top..top + BLOCK_SIZE {
                for x in left..left + BLOCK_SIZE {
                    let pixel = u32::from(view.luminance(x, y));
                    sum += pixel;
                    min = min.min(pixel);
                    max = max.max(pixel);
                }
            }
            let mut average = sum >> (2 * BLOCK_SIZE_POWER);

            if max - min <= MIN_DYNAMIC_RANGE {
                // flat block, assume it is light unless its neighbours say otherwise
                average = min / 2;
                if by > 0 && bx > 0 {
                    let neighbours = (points[(by - 1) * sub_width + bx]
                        + 2 * points[by * sub_width + bx - 1]
                        + points[(by - 1) * sub_width + bx - 1])
                        / 4;
                    if min < neighbours {
                        average = neighbours;
                    }
                }
            }
            points[by * sub_width + bx] = average;
        }
    }
    points
}

/// Binarize a single row of luminance values against a threshold from
/// its own histogram, used by the linear readers on noisy rows
pub fn binarize_row(row: &[u8]) -> Vec<bool> {
    if row.is_empty() {
        return Vec::new();
    }
    let min = *row.iter().min().unwrap_or(&0);
    let max = *row.iter().max().unwrap_or(&255);
    let threshold = ((u16::from(min) + u16::from(max)) / 2) as u8;
    row.iter().map(|x| *x <= threshold).collect()
}

/// Run lengths of alternating colours
///
/// The first run is always light, it has length zero when the row
/// starts dark, so even indices are light runs and odd ones dark.
pub fn runs(row: &[bool]) -> Vec<usize> {
    let mut out = Vec::with_capacity(64);
    let mut current = false;
    let mut length = 0;

    for &px in row {
        if px == current {
            length += 1;
        } else {
            out.push(length);
            current = px;
            length = 1;
        }
    }
    out.push(length);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::PixelFormat;

    fn striped_image(width: usize, height: usize) -> Vec<u8> {
        // vertical stripes four pixels wide, with some noise
        let mut out = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let noise = ((x * 7 + y * 13) % 11) as u8;
                out.push(if (x / 4) % 2 == 0 { 20 + noise } else { 220 + noise });
            }
        }
        out
    }

    #[test]
    fn all_binarizers_find_stripes() {
        let (w, h) = (64, 48);
        let data = striped_image(w, h);
        let view = ImageView::new(&data, w, h, PixelFormat::Lum, None).unwrap();

        for binarizer in [
            Binarizer::LocalAverage,
            Binarizer::GlobalHistogram,
            Binarizer::FixedThreshold
        ] {
            let m = binarizer.binarize(&view);
            for y in [0, 10, 47] {
                for x in 0..w {
                    assert_eq!(m.get(x, y), (x / 4) % 2 == 0, "{binarizer:?} at {x},{y}");
                }
            }
        }
    }

    #[test]
    fn bool_cast_only_takes_zero() {
        let data = [0, 1, 255, 0];
        let view = ImageView::new(&data, 4, 1, PixelFormat::Lum, None).unwrap();
        let m = Binarizer::BoolCast.binarize(&view);
        assert_eq!(m.row(0), &[true, false, false, true]);
    }

    #[test]
    fn run_lengths() {
        assert_eq!(runs(&[true, true, false, true]), vec![0, 2, 1, 1]);
        assert_eq!(runs(&[false, false, true]), vec![2, 1]);
        assert_eq!(binarize_row(&[10, 200, 10]), vec![true, false, true]);
    }
}
