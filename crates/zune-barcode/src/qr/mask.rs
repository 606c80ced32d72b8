/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Data mask patterns and the penalty used to pick one
use crate::bitmatrix::BitMatrix;

const N1: u32 = 3;
const N2: u32 = 3;
const N3: u32 = 40;
const N4: u32 = 10;

/// Whether mask pattern `mask` flips the module in column `x`, row `y`
#[inline]
pub fn is_masked(mask: u8, x: usize, y: usize) -> bool {
    match mask {
        0 => (x + y) % 2 == 0,
        1 => y % 2 == 0,
        2 => x % 3 == 0,
        3 => (x + y) % 3 == 0,
        4 => (x / 3 + y / 2) % 2 == 0,
        5 => (x * y) % 2 + (x * y) % 3 == 0,
        6 => ((x * y) % 2 + (x * y) % 3) % 2 == 0,
        _ => ((x + y) % 2 + (x * y) % 3) % 2 == 0
    }
}

/// Penalty score of a finished symbol, lower is better
pub fn penalty(matrix: &BitMatrix) -> u32 {
    let rows: Vec<Vec<bool>> = (0..matrix.height()).map(|y| matrix.row(y).to_vec()).collect();
    let columns: Vec<Vec<bool>> = (0..matrix.width()).map(|x| matrix.column(x)).collect();

    let mut score = 0;
    for line in rows.iter().chain(columns.iter()) {
        score += run_penalty(line) + finder_penalty(line);
    }
    score + block_penalty(matrix) + balance_penalty(matrix)
}

/// Runs of five or more modules of the same colour
fn run_penalty(line: &[bool]) -> u32 {
    let mut score = 0;
    let mut run = 0;
    let mut previous = None;

    for &module in line {
        if Some(module) == previous {
            run += 1;
        } else {
            if run >= 5 {
                score += N1 + (run - 5);
            }
            previous = Some(module);
            run = 1;
        }
    }
    if run >= 5 {
        score += N1 + (run - 5);
    }
    score
}

/// 2x2 blocks of one colour
fn block_penalty(matrix: &BitMatrix) -> u32 {
    let mut score = 0;
    for y in 0..matrix.height().saturating_sub(1) {
        for x in 0..matrix.width().saturating_sub(1) {
            let c = matrix.get(x, y);
            if c == matrix.get(x + 1, y) && c == matrix.get(x, y + 1) && c == matrix.get(x + 1, y + 1) {
                score += N2;
            }
        }
    }
    score
}

/// Finder like 1:1:3:1:1 patterns with four light modules on one side
fn finder_penalty(line: &[bool]) -> u32 {
    const PATTERN: [bool; 7] = [true, false, true, true, true, false, true];
    let light = |from: isize, to: isize| {
        let from = from.max(0) as usize;
        let to = (to.max(0) as usize).min(line.len());
        line[from.min(to)..to].iter().all(|x| !x)
    };

    let mut score = 0;
    for start in 0..line.len().saturating_sub(6) {
        if line[start..start + 7] == PATTERN {
            let s = start as isize;
            if light(s - 4, s) || light(s + 7, s + 11) {
                score += N3;
            }
        }
    }
    score
}

/// Deviation of the dark module ratio from 50%, in steps of 5%
fn balance_penalty(matrix: &BitMatrix) -> u32 {
    let total = matrix.width() * matrix.height();
    if total == 0 {
        return 0;
    }
    let dark = matrix.count_set();
    let variance = (dark * 2).abs_diff(total) * 10 / total;
    variance as u32 * N4
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mask_patterns() {
        assert!(is_masked(0, 0, 0));
        assert!(!is_masked(0, 1, 0));
        assert!(is_masked(1, 5, 2));
        assert!(is_masked(2, 3, 1));
        assert!(!is_masked(2, 1, 3));
    }

    #[test]
    fn penalties_of_simple_lines() {
        assert_eq!(run_penalty(&[true; 5]), 3);
        assert_eq!(run_penalty(&[true, true, false, false, false, false, false, false]), 4);
        let finder = [false, false, false, false, true, false, true, true, true, false, true];
        assert_eq!(finder_penalty(&finder), 40);

        let half = BitMatrix::from_ascii(&["#.", ".#"]);
        assert_eq!(balance_penalty(&half), 0);
        assert_eq!(block_penalty(&BitMatrix::from_ascii(&["##", "##"])), 3);
    }
}
