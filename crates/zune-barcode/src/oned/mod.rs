/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Linear (one dimensional) symbologies
//!
//! Readers work on single scan lines. Every line is reduced to run
//! lengths, handed to each enabled row decoder, and hits of the same
//! symbol on neighbouring lines are merged into one result whose
//! line count says how many lines agreed.
use crate::bitmatrix::BitMatrix;
use crate::config::ReaderConfig;
use crate::content::Content;
use crate::format::{BarcodeFormat, BarcodeFormats};
use crate::geometry::{PointI, Position};
use crate::log::trace;
use crate::symbol::Barcode;

pub mod code128;
pub mod upc_ean;

/// Lines scanned without `try_harder`
const MAX_LINES: usize = 15;

/// Run lengths of a scan line plus where each run starts
pub struct Row {
    runs:   Vec<usize>,
    starts: Vec<usize>
}

impl Row {
    pub fn new(bits: &[bool]) -> Row {
        let runs = crate::binarizer::runs(bits);
        let mut starts = Vec::with_capacity(runs.len());
        let mut position = 0;
        for run in &runs {
            starts.push(position);
            position += run;
        }
        Row { runs, starts }
    }

    /// Number of runs, even indices are light
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn run(&self, i: usize) -> usize {
        self.runs[i]
    }

    pub fn runs(&self, from: usize, count: usize) -> &[usize] {
        &self.runs[from..from + count]
    }

    /// Pixel offset of the first pixel of run `i`
    pub fn start(&self, i: usize) -> usize {
        self.starts[i]
    }

    /// Pixel offset one past the last pixel of runs `from..from + count`
    pub fn width(&self, from: usize, count: usize) -> usize {
        self.runs(from, count).iter().sum()
    }
}

/// A symbol decoded from one scan line
#[derive(Clone, Debug)]
pub struct LineHit {
    pub format:      BarcodeFormat,
    pub content:     Content,
    /// First pixel of the start pattern
    pub left:        usize,
    /// One past the last pixel of the stop pattern
    pub right:       usize,
    pub reader_init: bool
}

/// Average deviation of `counters` from the module widths in `pattern`,
/// relative to the total width
///
/// Returns infinity when a single element is off by more than
/// `max_individual` modules.
pub(crate) fn pattern_variance(counters: &[usize], pattern: &[u8], max_individual: f64) -> f64 {
    let total: usize = counters.iter().sum();
    let modules: usize = pattern.iter().map(|x| usize::from(*x)).sum();
    if total < modules {
        return f64::INFINITY;
    }
    let unit = total as f64 / modules as f64;
    let max_individual = max_individual * unit;

    let mut variance = 0.0;
    for (counter, width) in counters.iter().zip(pattern) {
        let deviation = (*counter as f64 - f64::from(*width) * unit).abs();
        if deviation > max_individual {
            return f64::INFINITY;
        }
        variance += deviation;
    }
    variance / total as f64
}

/// Index of the best match in `patterns` if it is below `max_variance`
pub(crate) fn best_pattern<const N: usize>(
    counters: &[usize], patterns: &[[u8; N]], max_variance: f64, max_individual: f64
) -> Option<usize> {
    let mut best = None;
    let mut best_variance = max_variance;
    for (i, pattern) in patterns.iter().enumerate() {
        let variance = pattern_variance(counters, pattern, max_individual);
        if variance < best_variance {
            best_variance = variance;
            best = Some(i);
        }
    }
    best
}

/// Append modules described by run widths, alternating colours
pub(crate) fn append_widths(modules: &mut Vec<bool>, widths: &[u8], start_dark: bool) {
    let mut dark = start_dark;
    for width in widths {
        modules.extend(core::iter::repeat(dark).take(usize::from(*width)));
        dark = !dark;
    }
}

/// Turn a module row into a single row matrix
pub(crate) fn modules_to_matrix(modules: &[bool]) -> BitMatrix {
    let mut matrix = BitMatrix::new(modules.len(), 1);
    for (x, dark) in modules.iter().enumerate() {
        matrix.set(x, 0, *dark);
    }
    matrix
}

fn decode_line(bits: &[bool], formats: BarcodeFormats, config: &ReaderConfig) -> Vec<LineHit> {
    let row = Row::new(bits);
    let mut hits = Vec::new();
    if formats.contains(BarcodeFormat::Code128) {
        hits.extend(code128::decode_row(&row));
    }
    if [BarcodeFormat::EAN13, BarcodeFormat::EAN8, BarcodeFormat::UPCA]
        .iter()
        .any(|f| formats.contains(*f))
    {
        hits.extend(upc_ean::decode_row(&row, formats, config.get_ean_add_on_symbol()));
    }
    hits
}

struct Track {
    hit:      LineHit,
    reversed: bool,
    top:      usize,
    bottom:   usize,
    lines:    i32
}

impl Track {
    fn matches(&self, hit: &LineHit, reversed: bool) -> bool {
        self.reversed == reversed
            && self.hit.format == hit.format
            && self.hit.content.bytes() == hit.content.bytes()
            && hit.left < self.hit.right
            && self.hit.left < hit.right
    }

    fn position(&self, width: usize) -> Position {
        let (top, bottom) = (self.top as i32, self.bottom as i32);
        if self.reversed {
            // pixel offsets were taken on the mirrored line
            let left = (width - self.hit.right) as i32;
            let right = (width - self.hit.left) as i32;
            return Position::new(
                PointI::new(right, bottom),
                PointI::new(left, bottom),
                PointI::new(left, top),
                PointI::new(right, top)
            );
        }
        Position::rect(self.hit.left as i32, top, self.hit.right as i32, bottom)
    }
}

/// Lines to scan, starting in the middle and moving outward
fn scan_lines(height: usize, try_harder: bool) -> Vec<usize> {
    let step = (height >> if try_harder { 8 } else { 5 }).max(1);
    let max_lines = if try_harder { height } else { MAX_LINES };
    let middle = height / 2;

    let mut lines = Vec::with_capacity(max_lines);
    for i in 0..max_lines {
        let offset = step * ((i + 1) / 2);
        let y = if i % 2 == 0 {
            middle.checked_add(offset)
        } else {
            middle.checked_sub(offset)
        };
        match y {
            Some(y) if y < height => lines.push(y),
            _ => break
        }
    }
    lines
}

/// Read linear symbols from the rows of `matrix`
pub fn read(matrix: &BitMatrix, config: &ReaderConfig, max_symbols: usize) -> Vec<Barcode> {
    let formats = config.get_effective_formats();
    let width = matrix.width();
    let lines = if config.get_is_pure() {
        vec![matrix.height() / 2]
    } else {
        scan_lines(matrix.height(), config.get_try_harder())
    };
    let min_lines = if config.get_is_pure() {
        1
    } else {
        usize::from(config.get_min_line_count()).clamp(1, lines.len().max(1)) as i32
    };
    let mut tracks: Vec<Track> = Vec::new();

    for y in lines {
        let forward = matrix.row(y);
        let mut hits: Vec<(LineHit, bool)> = decode_line(forward, formats, config)
            .into_iter()
            .map(|hit| (hit, false))
            .collect();
        if hits.is_empty() && config.get_try_harder() {
            let backward: Vec<bool> = forward.iter().rev().copied().collect();
            hits.extend(decode_line(&backward, formats, config).into_iter().map(|hit| (hit, true)));
        }
        for (hit, reversed) in hits {
            match tracks.iter_mut().find(|t| t.matches(&hit, reversed)) {
                Some(track) => {
                    track.top = track.top.min(y);
                    track.bottom = track.bottom.max(y);
                    track.lines += 1;
                }
                None => tracks.push(Track {
                    hit,
                    reversed,
                    top: y,
                    bottom: y,
                    lines: 1
                })
            }
        }
    }
    trace!("{} linear symbol tracks", tracks.len());

    tracks
        .into_iter()
        .filter(|t| t.lines >= min_lines)
        .take(max_symbols)
        .map(|track| {
            let position = track.position(width);
            Barcode::new(track.hit.format, track.hit.content.clone(), position)
                .with_line_count(track.lines)
                .with_reader_init(track.hit.reader_init)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variance_of_exact_and_scaled_patterns() {
        assert_eq!(pattern_variance(&[2, 2, 6, 2, 2], &[1, 1, 3, 1, 1], 0.7), 0.0);
        assert!(pattern_variance(&[2, 2, 2, 2, 2], &[1, 1, 3, 1, 1], 0.7).is_infinite());
        assert_eq!(best_pattern(&[3, 3, 3], &[[1, 2, 1], [1, 1, 1]], 0.3, 0.7), Some(1));
    }

    #[test]
    fn rows_know_their_offsets() {
        let row = Row::new(&[false, false, true, true, true, false, true]);
        assert_eq!(row.len(), 4);
        assert_eq!(row.start(1), 2);
        assert_eq!(row.width(1, 2), 4);
        assert_eq!(row.run(3), 1);
    }

    #[test]
    fn lines_fan_out_from_the_middle() {
        assert_eq!(&scan_lines(100, false)[..3], &[50, 47, 53]);
        assert_eq!(scan_lines(100, false).len(), MAX_LINES);
        let lines = scan_lines(64, true);
        assert_eq!(lines.len(), 64);
        assert_eq!(&lines[..3], &[32, 31, 33]);
    }
}
