/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! EAN-13, EAN-8 and UPC-A
//!
//! UPC-A is an EAN-13 with a leading zero, it is reported as UPC-A
//! whenever that format was asked for.
use crate::bitmatrix::BitMatrix;
use crate::config::EanAddOnSymbol;
use crate::content::{Content, SymbologyIdentifier};
use crate::errors::BarcodeError;
use crate::format::{BarcodeFormat, BarcodeFormats};
use crate::oned::{append_widths, best_pattern, modules_to_matrix, pattern_variance, LineHit, Row};

const MAX_AVG_VARIANCE: f64 = 0.48;
const MAX_INDIVIDUAL_VARIANCE: f64 = 0.7;

/// Digit patterns as space, bar, space, bar widths; right hand digits
/// use the same widths starting with a bar
#[rustfmt::skip]
const L_PATTERNS: [[u8; 4]; 10] = [
    [3, 2, 1, 1], [2, 2, 2, 1], [2, 1, 2, 2], [1, 4, 1, 1], [1, 1, 3, 2],
    [1, 2, 3, 1], [1, 1, 1, 4], [1, 3, 1, 2], [1, 2, 1, 3], [3, 1, 1, 2],
];

/// L patterns followed by the G (even parity) patterns, each G
/// being an L reversed
const L_AND_G_PATTERNS: [[u8; 4]; 20] = {
    let mut out = [[0u8; 4]; 20];
    let mut i = 0;
    while i < 10 {
        out[i] = L_PATTERNS[i];
        let l = L_PATTERNS[i];
        out[i + 10] = [l[3], l[2], l[1], l[0]];
        i += 1;
    }
    out
};

/// Parity of the six left digits of an EAN-13, bit `5 - i` set
/// when digit `i` uses a G pattern, indexed by the implied first digit
const FIRST_DIGIT_ENCODINGS: [u8; 10] = [0x00, 0x0B, 0x0D, 0x0E, 0x13, 0x19, 0x1C, 0x15, 0x16, 0x1A];

/// Parity of the five EAN-5 add-on digits indexed by its check value
const EAN5_PARITY: [u8; 10] = [0x18, 0x14, 0x12, 0x11, 0x0C, 0x06, 0x03, 0x0A, 0x09, 0x05];

const GUARD: [u8; 3] = [1, 1, 1];
const MIDDLE_GUARD: [u8; 5] = [1, 1, 1, 1, 1];
const ADD_ON_GUARD: [u8; 3] = [1, 1, 2];

/// Runs of a full EAN-13 from start guard to end guard
const EAN13_RUNS: usize = 3 + 24 + 5 + 24 + 3;
const EAN8_RUNS: usize = 3 + 16 + 5 + 16 + 3;

/// Standard mod 10 check digit of all `digits`, weights 3 and 1
/// from the right
pub fn check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, d)| u32::from(*d) * if i % 2 == 0 { 3 } else { 1 })
        .sum();
    ((10 - sum % 10) % 10) as u8
}

fn guard_matches(row: &Row, from: usize, guard: &[u8]) -> bool {
    pattern_variance(row.runs(from, guard.len()), guard, MAX_INDIVIDUAL_VARIANCE) < MAX_AVG_VARIANCE
}

/// Decode `count` digits starting at run `from`, returning digits and
/// the parity bits of the left half
fn read_digits(row: &Row, from: usize, count: usize, with_g: bool) -> Option<(Vec<u8>, u8)> {
    let mut digits = Vec::with_capacity(count);
    let mut parity = 0u8;
    for i in 0..count {
        let counters = row.runs(from + i * 4, 4);
        let index = if with_g {
            best_pattern(counters, &L_AND_G_PATTERNS, MAX_AVG_VARIANCE, MAX_INDIVIDUAL_VARIANCE)?
        } else {
            best_pattern(counters, &L_PATTERNS, MAX_AVG_VARIANCE, MAX_INDIVIDUAL_VARIANCE)?
        };
        digits.push((index % 10) as u8);
        parity = (parity << 1) | u8::from(index >= 10);
    }
    Some((digits, parity))
}

struct Symbol {
    format: BarcodeFormat,
    digits: Vec<u8>,
    /// First run after the end guard
    end:    usize
}

fn decode_at(row: &Row, start: usize, runs: usize) -> Option<Symbol> {
    if start + runs > row.len() || !guard_matches(row, start, &GUARD) {
        return None;
    }
    let half = (runs - 11) / 8;
    let module = row.width(start, runs) as f64 / if half == 6 { 95.0 } else { 67.0 };

    // quiet zones of at least the guard width on both sides
    let quiet = 3.0 * module;
    if start == 0 || (row.run(start - 1) as f64) < quiet {
        return None;
    }
    let end = start + runs;
    if end < row.len() && (row.run(end) as f64) < quiet {
        return None;
    }
    if end >= row.len() {
        return None;
    }

    let left_start = start + 3;
    let middle = left_start + half * 4;
    let right_start = middle + 5;
    if !guard_matches(row, middle, &MIDDLE_GUARD) || !guard_matches(row, right_start + half * 4, &GUARD) {
        return None;
    }

    let (left, parity) = read_digits(row, left_start, half, half == 6)?;
    let (right, _) = read_digits(row, right_start, half, false)?;

    let mut digits = Vec::with_capacity(13);
    let format = if half == 6 {
        let first = FIRST_DIGIT_ENCODINGS.iter().position(|p| *p == parity)?;
        digits.push(first as u8);
        BarcodeFormat::EAN13
    } else {
        if parity != 0 {
            return None;
        }
        BarcodeFormat::EAN8
    };
    digits.extend(left);
    digits.extend(right);

    let (payload, check) = digits.split_at(digits.len() - 1);
    if check_digit(payload) != check[0] {
        return None;
    }
    Some(Symbol { format, digits, end })
}

/// EAN-5 or EAN-2 supplement following the end guard at run `gap`
fn decode_add_on(row: &Row, gap: usize, module: f64) -> Option<(Vec<u8>, usize)> {
    let gap_modules = row.run(gap) as f64 / module;
    if !(5.0..=15.0).contains(&gap_modules) {
        return None;
    }
    let guard = gap + 1;
    for count in [5usize, 2] {
        // guard, digits of four runs, separators of two runs
        let runs = 3 + count * 4 + (count - 1) * 2;
        if guard + runs > row.len() || !guard_matches(row, guard, &ADD_ON_GUARD) {
            continue;
        }
        let mut digits = Vec::with_capacity(count);
        let mut parity = 0u8;
        let mut ok = true;
        for i in 0..count {
            let from = guard + 3 + i * 6;
            let counters = row.runs(from, 4);
            match best_pattern(counters, &L_AND_G_PATTERNS, MAX_AVG_VARIANCE, MAX_INDIVIDUAL_VARIANCE) {
                Some(index) => {
                    digits.push((index % 10) as u8);
                    parity = (parity << 1) | u8::from(index >= 10);
                }
                None => {
                    ok = false;
                    break;
                }
            }
        }
        if !ok {
            continue;
        }
        let valid = if count == 5 {
            let d: Vec<u32> = digits.iter().map(|x| u32::from(*x)).collect();
            let check = (3 * (d[0] + d[2] + d[4]) + 9 * (d[1] + d[3])) % 10;
            EAN5_PARITY[check as usize] == parity
        } else {
            let value = u32::from(digits[0]) * 10 + u32::from(digits[1]);
            (value % 4) as u8 == parity
        };
        if valid {
            return Some((digits, guard + runs));
        }
    }
    None
}

fn digits_to_ascii(digits: &[u8]) -> Vec<u8> {
    digits.iter().map(|d| b'0' + d).collect()
}

/// Every EAN/UPC symbol on a scan line
pub fn decode_row(row: &Row, formats: BarcodeFormats, add_on: EanAddOnSymbol) -> Vec<LineHit> {
    let mut hits = Vec::new();
    let mut i = 1;

    while i < row.len() {
        let symbol = [EAN13_RUNS, EAN8_RUNS]
            .iter()
            .find_map(|runs| decode_at(row, i, *runs));
        let Some(symbol) = symbol else {
            i += 2;
            continue;
        };

        let mut format = symbol.format;
        let mut text = digits_to_ascii(&symbol.digits);
        if format == BarcodeFormat::EAN13 && text[0] == b'0' && formats.contains(BarcodeFormat::UPCA) {
            format = BarcodeFormat::UPCA;
            text.remove(0);
        }
        let mut right = row.start(symbol.end);
        let mut next = symbol.end + 1;
        let mut modifier = if format == BarcodeFormat::EAN8 { b'4' } else { b'0' };

        if add_on != EanAddOnSymbol::Ignore {
            let module = row.width(i, symbol.end - i) as f64 / if symbol.digits.len() == 13 { 95.0 } else { 67.0 };
            match decode_add_on(row, symbol.end, module) {
                Some((digits, end)) => {
                    text.push(b' ');
                    text.extend(digits_to_ascii(&digits));
                    right = row.start(end - 1) + row.run(end - 1);
                    next = end + 1;
                    modifier = b'3';
                }
                None if add_on == EanAddOnSymbol::Require => {
                    i = symbol.end + 1;
                    continue;
                }
                None => {}
            }
        }

        if formats.contains(format) {
            hits.push(LineHit {
                format,
                content: Content::from_bytes(&text, SymbologyIdentifier::new(b'E', modifier, 0)),
                left: row.start(i),
                right,
                reader_init: false
            });
        }
        i = if next % 2 == 1 { next } else { next + 1 };
    }
    hits
}

fn parse_digits(text: &str, format: BarcodeFormat, len: usize) -> Result<Vec<u8>, BarcodeError> {
    if !text.bytes().all(|c| c.is_ascii_digit()) {
        return Err(BarcodeError::InvalidInput(format!("{format} accepts digits only")));
    }
    let mut digits: Vec<u8> = text.bytes().map(|c| c - b'0').collect();
    match digits.len() {
        n if n == len - 1 => {
            digits.push(check_digit(&digits));
            Ok(digits)
        }
        n if n == len => {
            if check_digit(&digits[..len - 1]) != digits[len - 1] {
                return Err(BarcodeError::Checksum(format!("{format} check digit mismatch")));
            }
            Ok(digits)
        }
        n => Err(BarcodeError::InvalidInput(format!(
            "{format} needs {} or {len} digits, got {n}",
            len - 1
        )))
    }
}

/// Module row of an EAN-13, EAN-8 or UPC-A, without quiet zones
///
/// The check digit is appended when missing and verified otherwise.
pub fn encode(text: &str, format: BarcodeFormat) -> Result<(BitMatrix, String), BarcodeError> {
    let mut digits = match format {
        BarcodeFormat::EAN13 => parse_digits(text, format, 13)?,
        BarcodeFormat::EAN8 => parse_digits(text, format, 8)?,
        BarcodeFormat::UPCA => parse_digits(text, format, 12)?,
        _ => return Err(BarcodeError::Unsupported(format!("{format} is not an EAN/UPC format")))
    };
    let canonical = String::from_utf8(digits_to_ascii(&digits)).unwrap_or_default();
    if format == BarcodeFormat::UPCA {
        digits.insert(0, 0);
    }

    let mut modules = Vec::with_capacity(95);
    append_widths(&mut modules, &GUARD, true);
    let (left, right, parity) = if format == BarcodeFormat::EAN8 {
        (&digits[..4], &digits[4..], 0)
    } else {
        (&digits[1..7], &digits[7..], FIRST_DIGIT_ENCODINGS[usize::from(digits[0])])
    };
    for (i, digit) in left.iter().enumerate() {
        let even = (parity >> (left.len() - 1 - i)) & 1 == 1;
        let index = usize::from(*digit) + if even { 10 } else { 0 };
        append_widths(&mut modules, &L_AND_G_PATTERNS[index], false);
    }
    append_widths(&mut modules, &MIDDLE_GUARD, false);
    for digit in right {
        append_widths(&mut modules, &L_PATTERNS[usize::from(*digit)], true);
    }
    append_widths(&mut modules, &GUARD, true);

    Ok((modules_to_matrix(&modules), canonical))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(matrix: &BitMatrix, quiet: usize, scale: usize) -> Vec<bool> {
        let mut bits = vec![false; quiet * scale];
        for x in 0..matrix.width() {
            bits.extend(core::iter::repeat(matrix.get(x, 0)).take(scale));
        }
        bits.extend(vec![false; quiet * scale]);
        bits
    }

    #[test]
    fn check_digits() {
        assert_eq!(check_digit(&[4, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3]), 1);
        assert_eq!(check_digit(&[9, 6, 3, 8, 5, 0, 7]), 4);
    }

    #[test]
    fn ean13_and_upca() {
        let (matrix, text) = encode("400638133393", BarcodeFormat::EAN13).unwrap();
        assert_eq!(text, "4006381333931");
        assert_eq!(matrix.width(), 95);

        let row = Row::new(&scan(&matrix, 10, 2));
        let hits = decode_row(&row, BarcodeFormats::all(), EanAddOnSymbol::Ignore);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].format, BarcodeFormat::EAN13);
        assert_eq!(hits[0].content.bytes(), b"4006381333931");
        assert_eq!((hits[0].left, hits[0].right), (20, 210));

        let (matrix, text) = encode("03600029145", BarcodeFormat::UPCA).unwrap();
        assert_eq!(text, "036000291452");
        let row = Row::new(&scan(&matrix, 9, 3));
        let hits = decode_row(&row, BarcodeFormats::all(), EanAddOnSymbol::Ignore);
        assert_eq!(hits[0].format, BarcodeFormat::UPCA);
        assert_eq!(hits[0].content.bytes(), b"036000291452");
        assert_eq!(hits[0].content.symbology().to_string(false), "]E0");

        let only_ean: BarcodeFormats = [BarcodeFormat::EAN13].into_iter().collect();
        let hits = decode_row(&row, only_ean, EanAddOnSymbol::Ignore);
        assert_eq!(hits[0].content.bytes(), b"0036000291452");
    }

    #[test]
    fn ean8() {
        let (matrix, text) = encode("9638507", BarcodeFormat::EAN8).unwrap();
        assert_eq!(text, "96385074");
        assert_eq!(matrix.width(), 67);
        let row = Row::new(&scan(&matrix, 7, 1));
        let hits = decode_row(&row, BarcodeFormats::all(), EanAddOnSymbol::Ignore);
        assert_eq!(hits[0].format, BarcodeFormat::EAN8);
        assert_eq!(hits[0].content.symbology().to_string(false), "]E4");
    }

    #[test]
    fn add_on_policy() {
        let (matrix, _) = encode("400638133393", BarcodeFormat::EAN13).unwrap();
        let mut bits = scan(&matrix, 10, 1);
        bits.truncate(10 + 95);
        bits.extend([false; 9]);
        // EAN-2 "12": 12 % 4 == 0, both digits in L parity
        append_bits(&mut bits, &ADD_ON_GUARD, true);
        append_bits(&mut bits, &L_PATTERNS[1], false);
        append_bits(&mut bits, &[1, 1], false);
        append_bits(&mut bits, &L_PATTERNS[2], false);
        bits.extend([false; 10]);

        let row = Row::new(&bits);
        let read = decode_row(&row, BarcodeFormats::all(), EanAddOnSymbol::Read);
        assert_eq!(read[0].content.bytes(), b"4006381333931 12");
        assert_eq!(read[0].content.symbology().to_string(false), "]E3");

        let ignored = decode_row(&row, BarcodeFormats::all(), EanAddOnSymbol::Ignore);
        assert_eq!(ignored[0].content.bytes(), b"4006381333931");

        let plain = Row::new(&scan(&matrix, 10, 1));
        assert!(decode_row(&plain, BarcodeFormats::all(), EanAddOnSymbol::Require).is_empty());
    }

    fn append_bits(bits: &mut Vec<bool>, widths: &[u8], dark: bool) {
        append_widths(bits, widths, dark);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(encode("12345", BarcodeFormat::EAN13).is_err());
        assert!(encode("4006381333932", BarcodeFormat::EAN13).is_err());
        assert!(encode("40063813339A", BarcodeFormat::EAN13).is_err());
        assert!(encode("1234567", BarcodeFormat::QRCode).is_err());
    }
}
