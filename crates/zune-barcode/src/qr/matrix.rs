/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Module layout shared by the writer and the reader
//!
//! Coordinates are `(x, y)` with `x` the column and `y` the row.
use crate::bitmatrix::BitMatrix;
use crate::qr::format_info::{format_bits, version_bits};
use crate::qr::version::{alignment_positions, dimension, EcLevel};

/// A symbol under construction, module values plus a mask of
/// which modules belong to function patterns
pub struct Layout {
    pub modules:     BitMatrix,
    pub is_function: BitMatrix,
    pub version:     u8
}

impl Layout {
    /// Draw every function pattern of `version`, format and version
    /// information included
    pub fn new(version: u8, level: EcLevel, mask: u8) -> Layout {
        let size = dimension(version);
        let mut layout = Layout {
            modules: BitMatrix::square(size),
            is_function: BitMatrix::square(size),
            version
        };
        layout.draw_timing();
        layout.draw_finder(3, 3);
        layout.draw_finder(size - 4, 3);
        layout.draw_finder(3, size - 4);
        layout.draw_alignment();
        layout.draw_format(level, mask);
        layout.draw_version();
        layout
    }

    /// Only the function mask matters, used by the reader
    pub fn functions_only(version: u8) -> BitMatrix {
        Layout::new(version, EcLevel::L, 0).is_function
    }

    fn set_function(&mut self, x: usize, y: usize, dark: bool) {
        self.modules.set(x, y, dark);
        self.is_function.set(x, y, true);
    }

    fn draw_timing(&mut self) {
        let size = self.modules.width();
        for i in 0..size {
            self.set_function(6, i, i % 2 == 0);
            self.set_function(i, 6, i % 2 == 0);
        }
    }

    /// Finder pattern plus separator centred on `(x, y)`
    fn draw_finder(&mut self, x: usize, y: usize) {
        let size = self.modules.width() as isize;
        for dy in -4isize..=4 {
            for dx in -4isize..=4 {
                let (xx, yy) = (x as isize + dx, y as isize + dy);
                if xx < 0 || yy < 0 || xx >= size || yy >= size {
                    continue;
                }
                let distance = dx.abs().max(dy.abs());
                self.set_function(xx as usize, yy as usize, distance != 2 && distance != 4);
            }
        }
    }

    fn draw_alignment(&mut self) {
        let positions = alignment_positions(self.version);
        let count = positions.len();

        for (i, &cx) in positions.iter().enumerate() {
            for (j, &cy) in positions.iter().enumerate() {
                // corners taken by finder patterns
                if (i == 0 && j == 0) || (i == 0 && j == count - 1) || (i == count - 1 && j == 0) {
                    continue;
                }
                for dy in -2isize..=2 {
                    for dx in -2isize..=2 {
                        let dark = dx.abs().max(dy.abs()) != 1;
                        self.set_function(
                            (cx as isize + dx) as usize,
                            (cy as isize + dy) as usize,
                            dark
                        );
                    }
                }
            }
        }
    }

    fn draw_format(&mut self, level: EcLevel, mask: u8) {
        let bits = format_bits(level, mask);
        let size = self.modules.width();

        for copy in format_positions(size) {
            for (i, (x, y)) in copy.iter().enumerate() {
                self.set_function(*x, *y, (bits >> i) & 1 != 0);
            }
        }
        // always dark
        self.set_function(8, size - 8, true);
    }

    fn draw_version(&mut self) {
        if self.version < 7 {
            return;
        }
        let bits = version_bits(self.version);
        let size = self.modules.width();

        for copy in version_positions(size) {
            for (i, (x, y)) in copy.iter().enumerate() {
                self.set_function(*x, *y, (bits >> i) & 1 != 0);
            }
        }
    }
}

/// Positions of the 15 format bits, least significant first, for
/// the copy around the top left finder and the split copy
pub fn format_positions(size: usize) -> [[(usize, usize); 15]; 2] {
    let mut first = [(0, 0); 15];
    let mut second = [(0, 0); 15];

    for (i, pos) in first.iter_mut().enumerate() {
        *pos = match i {
            0..=5 => (8, i),
            6 => (8, 7),
            7 => (8, 8),
            8 => (7, 8),
            _ => (14 - i, 8)
        };
    }
    for (i, pos) in second.iter_mut().enumerate() {
        *pos = if i < 8 {
            (size - 1 - i, 8)
        } else {
            (8, size - 15 + i)
        };
    }
    [first, second]
}

/// Positions of the 18 version bits, least significant first, for
/// the block near the top right and the one near the bottom left
pub fn version_positions(size: usize) -> [[(usize, usize); 18]; 2] {
    let mut top_right = [(0, 0); 18];
    let mut bottom_left = [(0, 0); 18];

    for i in 0..18 {
        let a = size - 11 + i % 3;
        let b = i / 3;
        top_right[i] = (a, b);
        bottom_left[i] = (b, a);
    }
    [top_right, bottom_left]
}

/// Data module positions in placement order
///
/// Pairs of columns are walked from the right edge in a zigzag,
/// skipping the vertical timing pattern and all function modules.
pub fn data_positions(is_function: &BitMatrix) -> Vec<(usize, usize)> {
    let size = is_function.width();
    let mut out = Vec::with_capacity(size * size);
    let mut right = size as isize - 1;

    while right >= 1 {
        if right == 6 {
            right = 5;
        }
        let upward = ((right + 1) & 2) == 0;
        for vert in 0..size {
            let y = if upward { size - 1 - vert } else { vert };
            for j in 0..2 {
                let x = (right - j) as usize;
                if !is_function.get(x, y) {
                    out.push((x, y));
                }
            }
        }
        right -= 2;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::version::raw_data_modules;

    #[test]
    fn data_modules_match_capacity() {
        for version in [1u8, 2, 6, 7, 14, 40] {
            let mask = Layout::functions_only(version);
            assert_eq!(
                data_positions(&mask).len(),
                raw_data_modules(version),
                "version {version}"
            );
        }
    }

    #[test]
    fn finder_corners_are_dark() {
        let layout = Layout::new(1, EcLevel::M, 0);
        let m = &layout.modules;
        assert!(m.get(0, 0) && m.get(20, 0) && m.get(0, 20));
        assert!(!m.get(7, 0) && !m.get(13, 0));
        assert!(m.get(8, 13));
        // timing pattern alternates
        assert!(m.get(8, 6) && !m.get(9, 6) && m.get(10, 6));
    }
}
