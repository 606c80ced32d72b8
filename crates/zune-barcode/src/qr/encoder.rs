/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! QR Code symbol construction
use crate::bitmatrix::BitMatrix;
use crate::errors::BarcodeError;
use crate::log::trace;
use crate::qr::mask::{is_masked, penalty};
use crate::qr::matrix::{data_positions, Layout};
use crate::qr::reed_solomon;
use crate::qr::version::{char_count_bits, BlockLayout, EcLevel, MAX_VERSION, MIN_VERSION};
use crate::qr::{
    ALPHANUMERIC_CHARSET, MODE_ALPHANUMERIC, MODE_BYTE, MODE_ECI, MODE_FNC1_FIRST, MODE_KANJI,
    MODE_NUMERIC, MODE_STRUCTURED_APPEND
};

/// Structured append header of one symbol in a sequence
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SequenceHeader {
    /// Position of this symbol, starting at zero
    pub index:  u8,
    /// Number of symbols in the sequence, at most 16
    pub count:  u8,
    /// XOR of every byte of the complete message
    pub parity: u8
}

/// Options for a single QR symbol
#[derive(Copy, Clone, Debug, Default)]
pub struct QrOptions {
    /// Error correction level, `None` means L
    pub level:    Option<EcLevel>,
    /// Force a version instead of picking the smallest that fits
    pub version:  Option<u8>,
    /// Force a mask instead of picking the one with the least penalty
    pub mask:     Option<u8>,
    /// ECI designator written ahead of the data
    pub eci:      Option<u32>,
    /// Data is a GS1 element string with GS as field separator
    pub gs1:      bool,
    /// Data is Shift_JIS text, written in Kanji mode when [`is_kanji`] holds
    pub kanji:    bool,
    pub sequence: Option<SequenceHeader>
}

/// A finished QR symbol without quiet zone
#[derive(Clone, Debug)]
pub struct QrSymbol {
    pub modules: BitMatrix,
    pub version: u8,
    pub level:   EcLevel,
    pub mask:    u8
}

struct BitBuffer {
    bits: Vec<bool>
}

impl BitBuffer {
    fn new() -> BitBuffer {
        BitBuffer { bits: Vec::with_capacity(256) }
    }

    fn append(&mut self, value: u32, len: usize) {
        for i in (0..len).rev() {
            self.bits.push((value >> i) & 1 != 0);
        }
    }

    fn len(&self) -> usize {
        self.bits.len()
    }

    fn to_bytes(&self) -> Vec<u8> {
        self.bits
            .chunks(8)
            .map(|chunk| {
                chunk
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (i, bit)| acc | (u8::from(*bit) << (7 - i)))
            })
            .collect()
    }
}

fn alphanumeric_value(c: u8) -> Option<u32> {
    ALPHANUMERIC_CHARSET
        .iter()
        .position(|x| *x == c)
        .map(|x| x as u32)
}

/// The data stream as it will be written, with the GS1 field
/// separator mapped to `%` for the alphanumeric mode
fn alphanumeric_form(data: &[u8], gs1: bool) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(data.len());
    for &c in data {
        match c {
            0x1D if gs1 => out.push(b'%'),
            b'%' if gs1 => out.extend_from_slice(b"%%"),
            c if alphanumeric_value(c).is_some() => out.push(c),
            _ => return None
        }
    }
    Some(out)
}

/// The 13 bit Kanji mode value of a Shift_JIS double byte character
fn kanji_value(pair: &[u8]) -> Option<u32> {
    let &[hi, lo] = pair else { return None };
    let code = u32::from(hi) << 8 | u32::from(lo);
    let offset = match code {
        0x8140..=0x9FFC => code - 0x8140,
        0xE040..=0xEBBF => code - 0xC140,
        _ => return None
    };
    Some((offset >> 8) * 0xC0 + (offset & 0xFF))
}

/// Whether `data` is a non empty run of Shift_JIS double byte
/// characters that Kanji mode can hold
pub fn is_kanji(data: &[u8]) -> bool {
    !data.is_empty() && data.len() % 2 == 0 && data.chunks(2).all(|x| kanji_value(x).is_some())
}

enum Segment {
    Numeric(Vec<u8>),
    Alphanumeric(Vec<u8>),
    Byte(Vec<u8>),
    /// 13 bit values, one per character
    Kanji(Vec<u32>)
}

impl Segment {
    /// Pick the most compact single mode able to hold `data`
    fn choose(data: &[u8], gs1: bool, kanji: bool) -> Segment {
        if kanji && is_kanji(data) {
            return Segment::Kanji(data.chunks(2).filter_map(kanji_value).collect());
        }
        if !data.is_empty() && data.iter().all(u8::is_ascii_digit) {
            return Segment::Numeric(data.to_vec());
        }
        if !data.is_empty() {
            if let Some(alnum) = alphanumeric_form(data, gs1) {
                return Segment::Alphanumeric(alnum);
            }
        }
        Segment::Byte(data.to_vec())
    }

    fn mode(&self) -> u8 {
        match self {
            Segment::Numeric(_) => MODE_NUMERIC,
            Segment::Alphanumeric(_) => MODE_ALPHANUMERIC,
            Segment::Byte(_) => MODE_BYTE,
            Segment::Kanji(_) => MODE_KANJI
        }
    }

    fn char_count(&self) -> usize {
        match self {
            Segment::Numeric(d) | Segment::Alphanumeric(d) | Segment::Byte(d) => d.len(),
            Segment::Kanji(k) => k.len()
        }
    }

    fn data_bits(&self) -> usize {
        match self {
            Segment::Numeric(d) => d.len() / 3 * 10 + [0, 4, 7][d.len() % 3],
            Segment::Alphanumeric(d) => d.len() / 2 * 11 + (d.len() % 2) * 6,
            Segment::Byte(d) => d.len() * 8,
            Segment::Kanji(k) => k.len() * 13
        }
    }

    fn write(&self, buffer: &mut BitBuffer, version: u8) {
        buffer.append(u32::from(self.mode()), 4);
        buffer.append(self.char_count() as u32, char_count_bits(self.mode(), version));

        match self {
            Segment::Numeric(digits) => {
                for chunk in digits.chunks(3) {
                    let value = chunk
                        .iter()
                        .fold(0u32, |acc, d| acc * 10 + u32::from(d - b'0'));
                    buffer.append(value, chunk.len() * 3 + 1);
                }
            }
            Segment::Alphanumeric(chars) => {
                for pair in chars.chunks(2) {
                    // every byte was validated when the segment was built
                    let values: Vec<u32> = pair.iter().filter_map(|c| alphanumeric_value(*c)).collect();
                    if values.len() == 2 {
                        buffer.append(values[0] * 45 + values[1], 11);
                    } else if let Some(v) = values.first() {
                        buffer.append(*v, 6);
                    }
                }
            }
            Segment::Byte(bytes) => {
                for b in bytes {
                    buffer.append(u32::from(*b), 8);
                }
            }
            Segment::Kanji(values) => {
                for v in values {
                    buffer.append(*v, 13);
                }
            }
        }
    }
}

fn eci_bits(eci: u32) -> usize {
    match eci {
        0..=127 => 8,
        128..=16383 => 16,
        _ => 24
    }
}

fn write_eci(buffer: &mut BitBuffer, eci: u32) {
    buffer.append(u32::from(MODE_ECI), 4);
    match eci {
        0..=127 => buffer.append(eci, 8),
        128..=16383 => buffer.append(0b10 << 14 | eci, 16),
        _ => buffer.append(0b110 << 21 | eci, 24)
    }
}

/// Encode `data` into a QR symbol
pub fn encode(data: &[u8], options: &QrOptions) -> Result<QrSymbol, BarcodeError> {
    let level = options.level.unwrap_or(EcLevel::L);
    if let Some(eci) = options.eci {
        if eci > 999_999 {
            return Err(BarcodeError::InvalidInput(format!("invalid ECI designator {eci}")));
        }
    }
    if let Some(seq) = options.sequence {
        if seq.count == 0 || seq.count > 16 || seq.index >= seq.count {
            return Err(BarcodeError::InvalidInput(format!(
                "invalid structured append position {} of {}",
                seq.index, seq.count
            )));
        }
    }
    let segment = Segment::choose(data, options.gs1, options.kanji);

    let header_bits = options.sequence.map_or(0, |_| 20)
        + options.eci.map_or(0, |e| 4 + eci_bits(e))
        + if options.gs1 { 4 } else { 0 };

    let fits = |version: u8| {
        let cc_bits = char_count_bits(segment.mode(), version);
        let needed = header_bits + 4 + cc_bits + segment.data_bits();
        segment.char_count() < (1usize << cc_bits)
            && needed <= BlockLayout::new(version, level).data_codewords() * 8
    };
    let version = match options.version {
        Some(v) if (MIN_VERSION..=MAX_VERSION).contains(&v) => {
            if !fits(v) {
                return Err(BarcodeError::InvalidInput(format!(
                    "data does not fit in a version {v} symbol"
                )));
            }
            v
        }
        Some(v) => return Err(BarcodeError::InvalidInput(format!("invalid QR version {v}"))),
        None => (MIN_VERSION..=MAX_VERSION)
            .find(|v| fits(*v))
            .ok_or(BarcodeError::GenericStatic("data too long for a QR Code symbol"))?
    };

    let layout = BlockLayout::new(version, level);
    let capacity_bits = layout.data_codewords() * 8;

    let mut buffer = BitBuffer::new();
    if let Some(seq) = options.sequence {
        buffer.append(u32::from(MODE_STRUCTURED_APPEND), 4);
        buffer.append(u32::from(seq.index), 4);
        buffer.append(u32::from(seq.count - 1), 4);
        buffer.append(u32::from(seq.parity), 8);
    }
    if let Some(eci) = options.eci {
        write_eci(&mut buffer, eci);
    }
    if options.gs1 {
        buffer.append(u32::from(MODE_FNC1_FIRST), 4);
    }
    segment.write(&mut buffer, version);

    // terminator, byte alignment and pad codewords
    let terminator = (capacity_bits - buffer.len()).min(4);
    buffer.append(0, terminator);
    let align = (8 - buffer.len() % 8) % 8;
    buffer.append(0, align);
    let pad_count = (capacity_bits - buffer.len()) / 8;
    for pad in [0xEC, 0x11].into_iter().cycle().take(pad_count) {
        buffer.append(pad, 8);
    }
    let codewords = interleave(&buffer.to_bytes(), &layout);

    trace!(
        "QR version {version}-{} with {} codewords",
        level.name(),
        codewords.len()
    );

    let masks: Vec<u8> = match options.mask {
        Some(m) if m < 8 => vec![m],
        Some(m) => return Err(BarcodeError::InvalidInput(format!("invalid mask pattern {m}"))),
        None => (0..8).collect()
    };
    let mut best: Option<(u32, QrSymbol)> = None;

    for mask in masks {
        let modules = place(&codewords, version, level, mask);
        let score = penalty(&modules);
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((
                score,
                QrSymbol {
                    modules,
                    version,
                    level,
                    mask
                }
            ));
        }
    }
    best.map(|(_, symbol)| symbol)
        .ok_or(BarcodeError::GenericStatic("no mask pattern evaluated"))
}

/// Split data into blocks, append error correction and interleave
fn interleave(data: &[u8], layout: &BlockLayout) -> Vec<u8> {
    let mut blocks = Vec::with_capacity(layout.blocks);
    let mut offset = 0;
    for i in 0..layout.blocks {
        let len = layout.data_len(i);
        let block = &data[offset..offset + len];
        blocks.push((block.to_vec(), reed_solomon::encode(block, layout.ec_per_block)));
        offset += len;
    }
    let mut out = Vec::with_capacity(layout.total_codewords);
    for i in 0..=layout.short_data_len {
        for (block, _) in &blocks {
            if let Some(b) = block.get(i) {
                out.push(*b);
            }
        }
    }
    for i in 0..layout.ec_per_block {
        for (_, ec) in &blocks {
            out.push(ec[i]);
        }
    }
    out
}

fn place(codewords: &[u8], version: u8, level: EcLevel, mask: u8) -> BitMatrix {
    let mut layout = Layout::new(version, level, mask);
    let positions = data_positions(&layout.is_function);

    for (i, (x, y)) in positions.into_iter().enumerate() {
        // remainder bits past the last codeword stay light before masking
        let bit = codewords
            .get(i / 8)
            .map_or(false, |byte| (byte >> (7 - i % 8)) & 1 != 0);
        layout.modules.set(x, y, bit ^ is_masked(mask, x, y));
    }
    layout.modules
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_smallest_version() {
        let symbol = encode(b"HELLO WORLD", &QrOptions::default()).unwrap();
        assert_eq!(symbol.version, 1);
        assert_eq!(symbol.modules.width(), 21);
        assert_eq!(symbol.level, EcLevel::L);

        let long = vec![b'a'; 100];
        let symbol = encode(&long, &QrOptions {
            level: Some(EcLevel::H),
            ..QrOptions::default()
        })
        .unwrap();
        // version 9-H holds at most 98 bytes
        assert_eq!(symbol.version, 10);
    }

    #[test]
    fn reference_codewords() {
        // "01234567" at 1-M, the standard's worked example
        let segment = Segment::choose(b"01234567", false, false);
        let mut buffer = BitBuffer::new();
        segment.write(&mut buffer, 1);
        let bytes = buffer.to_bytes();
        assert_eq!(&bytes[..5], &[0x10, 0x20, 0x0C, 0x56, 0x61]);
    }

    #[test]
    fn rejects_oversized_and_bad_options() {
        let huge = vec![0u8; 4000];
        assert!(encode(&huge, &QrOptions::default()).is_err());
        let bad_sequence = QrOptions {
            sequence: Some(SequenceHeader {
                index:  3,
                count:  3,
                parity: 0
            }),
            ..QrOptions::default()
        };
        assert!(encode(b"A", &bad_sequence).is_err());
    }

    #[test]
    fn kanji_values() {
        // the two characters of the ISO/IEC 18004 Kanji example
        assert_eq!(kanji_value(&[0x93, 0x5F]), Some(0x0D9F));
        assert_eq!(kanji_value(&[0xE4, 0xAA]), Some(0x1AAA));
        assert_eq!(kanji_value(&[0x41, 0x42]), None);
        assert!(is_kanji(&[0x93, 0x5F, 0xE4, 0xAA]));
        assert!(!is_kanji(&[0x93, 0x5F, 0xE4]));
        assert!(!is_kanji(&[]));
    }
}
