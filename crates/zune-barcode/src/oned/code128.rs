/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Code 128
use crate::bitmatrix::BitMatrix;
use crate::content::{Content, SymbologyIdentifier};
use crate::errors::BarcodeError;
use crate::format::BarcodeFormat;
use crate::log::trace;
use crate::oned::{append_widths, best_pattern, modules_to_matrix, LineHit, Row};

const MAX_AVG_VARIANCE: f64 = 0.25;
const MAX_INDIVIDUAL_VARIANCE: f64 = 0.7;

const FNC3: u8 = 96;
const FNC2: u8 = 97;
const SHIFT: u8 = 98;
const CODE_C: u8 = 99;
/// CODE B in set A and C, FNC4 in set B
const CODE_B: u8 = 100;
/// CODE A in set B and C, FNC4 in set A
const CODE_A: u8 = 101;
const FNC1: u8 = 102;
const START_A: u8 = 103;
const START_B: u8 = 104;
const START_C: u8 = 105;
const STOP: u8 = 106;

/// Bar/space widths of every symbol character, the stop character
/// is followed by a final two module bar
#[rustfmt::skip]
const PATTERNS: [[u8; 6]; 107] = [
    [2, 1, 2, 2, 2, 2], [2, 2, 2, 1, 2, 2], [2, 2, 2, 2, 2, 1], [1, 2, 1, 2, 2, 3], [1, 2, 1, 3, 2, 2],
    [1, 3, 1, 2, 2, 2], [1, 2, 2, 2, 1, 3], [1, 2, 2, 3, 1, 2], [1, 3, 2, 2, 1, 2], [2, 2, 1, 2, 1, 3],
    [2, 2, 1, 3, 1, 2], [2, 3, 1, 2, 1, 2], [1, 1, 2, 2, 3, 2], [1, 2, 2, 1, 3, 2], [1, 2, 2, 2, 3, 1],
    [1, 1, 3, 2, 2, 2], [1, 2, 3, 1, 2, 2], [1, 2, 3, 2, 2, 1], [2, 2, 3, 2, 1, 1], [2, 2, 1, 1, 3, 2],
    [2, 2, 1, 2, 3, 1], [2, 1, 3, 2, 1, 2], [2, 2, 3, 1, 1, 2], [3, 1, 2, 1, 3, 1], [3, 1, 1, 2, 2, 2],
    [3, 2, 1, 1, 2, 2], [3, 2, 1, 2, 2, 1], [3, 1, 2, 2, 1, 2], [3, 2, 2, 1, 1, 2], [3, 2, 2, 2, 1, 1],
    [2, 1, 2, 1, 2, 3], [2, 1, 2, 3, 2, 1], [2, 3, 2, 1, 2, 1], [1, 1, 1, 3, 2, 3], [1, 3, 1, 1, 2, 3],
    [1, 3, 1, 3, 2, 1], [1, 1, 2, 3, 1, 3], [1, 3, 2, 1, 1, 3], [1, 3, 2, 3, 1, 1], [2, 1, 1, 3, 1, 3],
    [2, 3, 1, 1, 1, 3], [2, 3, 1, 3, 1, 1], [1, 1, 2, 1, 3, 3], [1, 1, 2, 3, 3, 1], [1, 3, 2, 1, 3, 1],
    [1, 1, 3, 1, 2, 3], [1, 1, 3, 3, 2, 1], [1, 3, 3, 1, 2, 1], [3, 1, 3, 1, 2, 1], [2, 1, 1, 3, 3, 1],
    [2, 3, 1, 1, 3, 1], [2, 1, 3, 1, 1, 3], [2, 1, 3, 3, 1, 1], [2, 1, 3, 1, 3, 1], [3, 1, 1, 1, 2, 3],
    [3, 1, 1, 3, 2, 1], [3, 3, 1, 1, 2, 1], [3, 1, 2, 1, 1, 3], [3, 1, 2, 3, 1, 1], [3, 3, 2, 1, 1, 1],
    [3, 1, 4, 1, 1, 1], [2, 2, 1, 4, 1, 1], [4, 3, 1, 1, 1, 1], [1, 1, 1, 2, 2, 4], [1, 1, 1, 4, 2, 2],
    [1, 2, 1, 1, 2, 4], [1, 2, 1, 4, 2, 1], [1, 4, 1, 1, 2, 2], [1, 4, 1, 2, 2, 1], [1, 1, 2, 2, 1, 4],
    [1, 1, 2, 4, 1, 2], [1, 2, 2, 1, 1, 4], [1, 2, 2, 4, 1, 1], [1, 4, 2, 1, 1, 2], [1, 4, 2, 2, 1, 1],
    [2, 4, 1, 2, 1, 1], [2, 2, 1, 1, 1, 4], [4, 1, 3, 1, 1, 1], [2, 4, 1, 1, 1, 2], [1, 3, 4, 1, 1, 1],
    [1, 1, 1, 2, 4, 2], [1, 2, 1, 1, 4, 2], [1, 2, 1, 2, 4, 1], [1, 1, 4, 2, 1, 2], [1, 2, 4, 1, 1, 2],
    [1, 2, 4, 2, 1, 1], [4, 1, 1, 2, 1, 2], [4, 2, 1, 1, 1, 2], [4, 2, 1, 2, 1, 1], [2, 1, 2, 1, 4, 1],
    [2, 1, 4, 1, 2, 1], [4, 1, 2, 1, 2, 1], [1, 1, 1, 1, 4, 3], [1, 1, 1, 3, 4, 1], [1, 3, 1, 1, 4, 1],
    [1, 1, 4, 1, 1, 3], [1, 1, 4, 3, 1, 1], [4, 1, 1, 1, 1, 3], [4, 1, 1, 3, 1, 1], [1, 1, 3, 1, 4, 1],
    [1, 1, 4, 1, 3, 1], [3, 1, 1, 1, 4, 1], [4, 1, 1, 1, 3, 1], [2, 1, 1, 4, 1, 2], [2, 1, 1, 2, 1, 4],
    [2, 1, 1, 2, 3, 2], [2, 3, 3, 1, 1, 1],
];

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CodeSet {
    A,
    B,
    C
}

/// Symbol values from start to stop, start included, checksum and
/// stop excluded, plus the pixel extent
fn read_values(row: &Row, start: usize) -> Option<(Vec<u8>, usize)> {
    let start_code = best_pattern(row.runs(start, 6), &PATTERNS[103..106], MAX_AVG_VARIANCE, MAX_INDIVIDUAL_VARIANCE)?;
    // quiet zone of at least half the start character
    if row.run(start - 1) < row.width(start, 6) / 2 {
        return None;
    }
    let mut values = vec![START_A + start_code as u8];
    let mut i = start + 6;

    loop {
        if i + 7 > row.len() {
            return None;
        }
        let value = best_pattern(row.runs(i, 6), &PATTERNS, MAX_AVG_VARIANCE, MAX_INDIVIDUAL_VARIANCE)? as u8;
        if value == STOP {
            // final bar of the stop character, then the trailing quiet zone
            let module = row.width(i, 6) as f64 / 11.0;
            let bar = row.run(i + 6) as f64;
            if (bar - 2.0 * module).abs() > module {
                return None;
            }
            let end = i + 7;
            if end < row.len() && (row.run(end) as f64) < 5.0 * module {
                return None;
            }
            break;
        }
        if (START_A..=START_C).contains(&value) {
            return None;
        }
        values.push(value);
        i += 6;
    }
    // start, checksum and at least nothing else
    if values.len() < 2 {
        return None;
    }
    let check = values.pop()?;
    let sum = values
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, v)| acc + u32::from(*v) * (i as u32).max(1));
    if sum % 103 != u32::from(check) {
        trace!("code 128 checksum mismatch");
        return None;
    }
    Some((values, row.start(i + 6) + row.run(i + 6)))
}

struct Decoded {
    content:     Content,
    reader_init: bool
}

/// Turn symbol values (start character first) into content
fn interpret(values: &[u8]) -> Option<Decoded> {
    let mut set = match values.first()? {
        &START_A => CodeSet::A,
        &START_B => CodeSet::B,
        _ => CodeSet::C
    };
    let mut symbology = SymbologyIdentifier::new(b'C', b'0', 0);
    let mut bytes: Vec<u8> = Vec::with_capacity(values.len() * 2);
    let mut reader_init = false;
    let mut shifted = false;
    let mut fnc4_next = false;
    let mut fnc4_latch = false;

    for (position, &value) in values[1..].iter().enumerate() {
        let current = match (shifted, set) {
            (true, CodeSet::A) => CodeSet::B,
            (true, CodeSet::B) => CodeSet::A,
            _ => set
        };
        shifted = false;

        if value == FNC1 {
            if bytes.is_empty() {
                symbology.modifier = b'1';
                symbology.gs1 = true;
            } else if symbology.modifier == b'0'
                && ((bytes.len() == 1 && bytes[0].is_ascii_alphabetic())
                    || (bytes.len() == 2 && bytes.iter().all(u8::is_ascii_digit)))
            {
                symbology.modifier = b'2';
            } else {
                bytes.push(0x1D);
            }
            continue;
        }
        match current {
            CodeSet::C => match value {
                0..=99 => bytes.extend_from_slice(format!("{value:02}").as_bytes()),
                CODE_B => set = CodeSet::B,
                CODE_A => set = CodeSet::A,
                _ => return None
            },
            CodeSet::A | CodeSet::B => match value {
                0..=95 => {
                    let mut ch = match current {
                        CodeSet::A if value >= 64 => value - 64,
                        _ => value + 32
                    };
                    if fnc4_latch != fnc4_next {
                        ch += 128;
                    }
                    fnc4_next = false;
                    bytes.push(ch);
                }
                FNC3 => {
                    if position == 0 {
                        reader_init = true;
                    }
                }
                FNC2 => {}
                SHIFT => shifted = true,
                CODE_C => set = CodeSet::C,
                CODE_B if current == CodeSet::A => set = CodeSet::B,
                CODE_A if current == CodeSet::B => set = CodeSet::A,
                CODE_A | CODE_B => {
                    // FNC4, twice in a row toggles the latch
                    if fnc4_next {
                        fnc4_latch = !fnc4_latch;
                        fnc4_next = false;
                    } else {
                        fnc4_next = true;
                    }
                }
                _ => return None
            }
        }
    }
    Some(Decoded {
        content: Content::from_bytes(&bytes, symbology),
        reader_init
    })
}

/// Every Code 128 symbol on a scan line
pub fn decode_row(row: &Row) -> Vec<LineHit> {
    let mut hits = Vec::new();
    let mut i = 1;

    while i + 6 < row.len() {
        let Some((values, right)) = read_values(row, i) else {
            i += 2;
            continue;
        };
        if let Some(decoded) = interpret(&values) {
            hits.push(LineHit {
                format:      BarcodeFormat::Code128,
                content:     decoded.content,
                left:        row.start(i),
                right,
                reader_init: decoded.reader_init
            });
            // skip past the stop character
            i += 6 * (values.len() + 1) + 7 + 1;
        } else {
            i += 2;
        }
    }
    hits
}

fn digit_run(data: &[u8], from: usize) -> usize {
    data[from..].iter().take_while(|b| b.is_ascii_digit()).count()
}

/// Set a character below 128 needs, `None` when both A and B hold it
fn required_set(ch: u8) -> Option<CodeSet> {
    match ch {
        0..=31 => Some(CodeSet::A),
        96..=127 => Some(CodeSet::B),
        _ => None
    }
}

/// Symbol values for `data`, start character first, checksum and stop excluded
///
/// Runs of four or more digits are packed in set C, everything else
/// uses set B unless control characters call for set A.
fn values_for(data: &[u8], gs1: bool, reader_init: bool) -> Vec<u8> {
    let leading_digits = digit_run(data, 0);
    let starts_numeric =
        leading_digits >= 4 || (leading_digits == data.len() && leading_digits >= 2 && leading_digits % 2 == 0);

    let mut set = if starts_numeric && !reader_init {
        CodeSet::C
    } else if data.first().map_or(false, |b| required_set(b & 0x7F) == Some(CodeSet::A)) {
        CodeSet::A
    } else {
        CodeSet::B
    };
    let mut values = vec![match set {
        CodeSet::A => START_A,
        CodeSet::B => START_B,
        CodeSet::C => START_C
    }];
    if reader_init {
        values.push(FNC3);
    }
    if gs1 {
        values.push(FNC1);
    }

    let mut p = 0;
    while p < data.len() {
        let byte = data[p];
        if gs1 && byte == 0x1D {
            values.push(FNC1);
            p += 1;
            continue;
        }
        if set == CodeSet::C {
            if digit_run(data, p) >= 2 {
                values.push((data[p] - b'0') * 10 + (data[p + 1] - b'0'));
                p += 2;
                continue;
            }
            let next = required_set(byte & 0x7F).unwrap_or(CodeSet::B);
            values.push(if next == CodeSet::A { CODE_A } else { CODE_B });
            set = next;
            continue;
        }

        let run = digit_run(data, p);
        if run >= 4 && run % 2 == 0 {
            values.push(CODE_C);
            set = CodeSet::C;
            continue;
        }
        let ch = byte & 0x7F;
        if let Some(needed) = required_set(ch) {
            if needed != set {
                values.push(if needed == CodeSet::A { CODE_A } else { CODE_B });
                set = needed;
            }
        }
        if byte >= 128 {
            // FNC4 shares its value with the switch to the other set
            values.push(if set == CodeSet::A { CODE_A } else { CODE_B });
        }
        values.push(match set {
            CodeSet::A if ch < 32 => ch + 64,
            _ => ch - 32
        });
        p += 1;
    }
    values
}

/// Module row of a Code 128 symbol, without quiet zones
///
/// With `gs1` set, GS (0x1D) bytes become FNC1 separators and the
/// symbol starts with FNC1. `reader_init` adds FNC3.
pub fn encode(data: &[u8], gs1: bool, reader_init: bool) -> Result<BitMatrix, BarcodeError> {
    if data.is_empty() {
        return Err(BarcodeError::InvalidInput("Code 128 needs at least one character".to_string()));
    }
    let values = values_for(data, gs1, reader_init);
    if values.len() > 80 {
        return Err(BarcodeError::InvalidInput(format!(
            "{} symbol characters exceed the Code 128 limit",
            values.len()
        )));
    }
    let check = values
        .iter()
        .enumerate()
        .fold(0u32, |acc, (i, v)| acc + u32::from(*v) * (i as u32).max(1))
        % 103;

    let mut modules = Vec::with_capacity((values.len() + 2) * 11 + 2);
    for value in values.iter().chain(core::iter::once(&(check as u8))) {
        append_widths(&mut modules, &PATTERNS[usize::from(*value)], true);
    }
    append_widths(&mut modules, &PATTERNS[usize::from(STOP)], true);
    append_widths(&mut modules, &[2], true);
    Ok(modules_to_matrix(&modules))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(matrix: &BitMatrix, scale: usize) -> Row {
        let mut bits = vec![false; 10 * scale];
        for x in 0..matrix.width() {
            bits.extend(core::iter::repeat(matrix.get(x, 0)).take(scale));
        }
        bits.extend(vec![false; 10 * scale]);
        Row::new(&bits)
    }

    fn round_trip(data: &[u8], gs1: bool, reader_init: bool) -> LineHit {
        let matrix = encode(data, gs1, reader_init).unwrap();
        let hits = decode_row(&scan(&matrix, 2));
        assert_eq!(hits.len(), 1, "{data:?}");
        hits.into_iter().next().unwrap()
    }

    #[test]
    fn picks_code_sets() {
        assert_eq!(values_for(b"1234", false, false), [START_C, 12, 34]);
        assert_eq!(values_for(b"AB12", false, false), [START_B, 33, 34, 17, 18]);
        assert_eq!(values_for(b"AB123456", false, false), [START_B, 33, 34, CODE_C, 12, 34, 56]);
        assert_eq!(values_for(b"\x01a", false, false), [START_A, 65, CODE_B, 65]);
    }

    #[test]
    fn reference_width() {
        // start, three data characters, check, stop
        let matrix = encode(b"ABC", false, false).unwrap();
        assert_eq!(matrix.width(), 11 * 5 + 13);
    }

    #[test]
    fn round_trips() {
        for data in [
            &b"Code 128"[..],
            b"0123456789",
            b"x1234567y",
            b"tab\there",
            b"lower and UPPER 42",
            b"\xE9t\xE9"
        ] {
            let hit = round_trip(data, false, false);
            assert_eq!(hit.content.bytes(), data);
            assert_eq!(hit.content.symbology().to_string(false), "]C0");
            assert!(!hit.reader_init);
        }
    }

    #[test]
    fn gs1_and_reader_init() {
        let hit = round_trip(b"0101234567890128\x1D10ABC", true, false);
        assert_eq!(hit.content.bytes(), b"0101234567890128\x1D10ABC");
        assert_eq!(hit.content.symbology().to_string(false), "]C1");

        let hit = round_trip(b"INIT", false, true);
        assert!(hit.reader_init);
        assert_eq!(hit.content.bytes(), b"INIT");
    }

    #[test]
    fn extent_and_errors() {
        let matrix = encode(b"EDGE", false, false).unwrap();
        let hits = decode_row(&scan(&matrix, 3));
        assert_eq!(hits[0].left, 30);
        assert_eq!(hits[0].right, 30 + matrix.width() * 3);

        assert!(encode(b"", false, false).is_err());
        assert!(encode(&[b'A'; 100], false, false).is_err());
    }
}
