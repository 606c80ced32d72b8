/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A two dimensional grid of on/off cells
//!
//! Used both for binarized images (`true` is a dark pixel) and
//! for symbol module grids (`true` is a dark module).

use std::fmt::{Debug, Formatter};

#[derive(Clone, PartialEq, Eq, Default)]
pub struct BitMatrix {
    width:  usize,
    height: usize,
    bits:   Vec<bool>
}

impl BitMatrix {
    /// Create a matrix with every cell cleared
    pub fn new(width: usize, height: usize) -> BitMatrix {
        BitMatrix {
            width,
            height,
            bits: vec![false; width * height]
        }
    }

    /// Create a square matrix
    pub fn square(dimension: usize) -> BitMatrix {
        BitMatrix::new(dimension, dimension)
    }

    /// Build a matrix from rows of `'#'`/`'X'` (set) and anything else (unset)
    ///
    /// Mostly useful for tests and small fixed patterns, all rows must
    /// have the same length.
    pub fn from_ascii(rows: &[&str]) -> BitMatrix {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.chars().count());
        let mut matrix = BitMatrix::new(width, height);

        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate().take(width) {
                matrix.set(x, y, matches!(c, '#' | 'X'));
            }
        }
        matrix
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.bits[y * self.width + x]
    }

    /// Like [`get`](Self::get) but out of range coordinates read as unset
    #[inline]
    pub fn get_checked(&self, x: isize, y: isize) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        self.get(x as usize, y as usize)
    }

    #[inline(always)]
    pub fn set(&mut self, x: usize, y: usize, value: bool) {
        self.bits[y * self.width + x] = value;
    }

    #[inline]
    pub fn flip(&mut self, x: usize, y: usize) {
        let idx = y * self.width + x;
        self.bits[idx] = !self.bits[idx];
    }

    /// Set every cell in the rectangle starting at `(left, top)`
    pub fn set_region(&mut self, left: usize, top: usize, width: usize, height: usize) {
        for y in top..(top + height).min(self.height) {
            for x in left..(left + width).min(self.width) {
                self.set(x, y, true);
            }
        }
    }

    /// A single row of the matrix
    pub fn row(&self, y: usize) -> &[bool] {
        &self.bits[y * self.width..(y + 1) * self.width]
    }

    /// A single column of the matrix, copied out
    pub fn column(&self, x: usize) -> Vec<bool> {
        (0..self.height).map(|y| self.get(x, y)).collect()
    }

    /// Number of set cells
    pub fn count_set(&self) -> usize {
        self.bits.iter().filter(|x| **x).count()
    }

    /// Flip every cell
    pub fn invert(&mut self) {
        self.bits.iter_mut().for_each(|x| *x = !*x);
    }

    /// Swap rows and columns
    pub fn transposed(&self) -> BitMatrix {
        let mut out = BitMatrix::new(self.height, self.width);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(y, x, self.get(x, y));
            }
        }
        out
    }

    /// Rotate clockwise by `quarter_turns * 90` degrees
    pub fn rotated(&self, quarter_turns: u8) -> BitMatrix {
        match quarter_turns % 4 {
            0 => self.clone(),
            1 => {
                let mut out = BitMatrix::new(self.height, self.width);
                for y in 0..self.height {
                    for x in 0..self.width {
                        out.set(self.height - 1 - y, x, self.get(x, y));
                    }
                }
                out
            }
            2 => {
                let mut out = BitMatrix::new(self.width, self.height);
                for y in 0..self.height {
                    for x in 0..self.width {
                        out.set(self.width - 1 - x, self.height - 1 - y, self.get(x, y));
                    }
                }
                out
            }
            _ => self.rotated(2).rotated(1)
        }
    }

    /// Surround the matrix with `margin` unset cells on every side
    pub fn with_margin(&self, margin: usize) -> BitMatrix {
        let mut out = BitMatrix::new(self.width + 2 * margin, self.height + 2 * margin);
        for y in 0..self.height {
            for x in 0..self.width {
                out.set(x + margin, y + margin, self.get(x, y));
            }
        }
        out
    }

    /// Bounding box of set cells as `(left, top, width, height)`
    pub fn enclosing_rect(&self) -> Option<(usize, usize, usize, usize)> {
        let (mut left, mut top) = (self.width, self.height);
        let (mut right, mut bottom) = (0, 0);
        let mut found = false;

        for y in 0..self.height {
            for x in 0..self.width {
                if self.get(x, y) {
                    found = true;
                    left = left.min(x);
                    right = right.max(x);
                    top = top.min(y);
                    bottom = bottom.max(y);
                }
            }
        }
        found.then(|| (left, top, right - left + 1, bottom - top + 1))
    }

    /// Morphological closing with a 3x3 cross, fills isolated unset
    /// specks inside dark areas
    pub fn closed(&self) -> BitMatrix {
        let dilate = |src: &BitMatrix| {
            let mut out = src.clone();
            for y in 0..src.height {
                for x in 0..src.width {
                    let (xi, yi) = (x as isize, y as isize);
                    let hit = src.get(x, y)
                        || src.get_checked(xi - 1, yi)
                        || src.get_checked(xi + 1, yi)
                        || src.get_checked(xi, yi - 1)
                        || src.get_checked(xi, yi + 1);
                    out.set(x, y, hit);
                }
            }
            out
        };
        let mut dilated = dilate(self);
        // erosion is dilation of the complement
        dilated.invert();
        let mut eroded = dilate(&dilated);
        eroded.invert();
        eroded
    }

    /// Cells as luminance bytes, set cells are black (0)
    pub fn to_luma(&self) -> Vec<u8> {
        self.bits.iter().map(|x| if *x { 0 } else { 255 }).collect()
    }
}

impl Debug for BitMatrix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "BitMatrix {}x{}", self.width, self.height)?;
        for y in 0..self.height {
            let row: String = self
                .row(y)
                .iter()
                .map(|x| if *x { '#' } else { '.' })
                .collect();
            writeln!(f, "{row}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_and_transpose() {
        let m = BitMatrix::from_ascii(&["#..", "..."]);

        let r1 = m.rotated(1);
        assert_eq!((r1.width(), r1.height()), (2, 3));
        assert!(r1.get(1, 0));

        let r2 = m.rotated(2);
        assert!(r2.get(2, 1));
        assert_eq!(m.rotated(4), m);
        assert_eq!(m.rotated(1).rotated(3), m);

        let t = m.transposed();
        assert!(t.get(0, 0));
        assert_eq!(t.transposed(), m);
    }

    #[test]
    fn closing_fills_holes() {
        let m = BitMatrix::from_ascii(&["#####", "#####", "##.##", "#####", "#####"]);
        let closed = m.closed();
        assert!(closed.get(2, 2));
        assert_eq!(closed.count_set(), 25);
    }

    #[test]
    fn bounding_box() {
        let m = BitMatrix::from_ascii(&["....", ".#..", "..#.", "...."]);
        assert_eq!(m.enclosing_rect(), Some((1, 1, 2, 2)));
        assert_eq!(BitMatrix::new(3, 3).enclosing_rect(), None);
    }
}
