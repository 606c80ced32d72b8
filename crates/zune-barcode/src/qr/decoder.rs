/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoding of a sampled QR module grid
use crate::bitmatrix::BitMatrix;
use crate::charset::CharacterSet;
use crate::content::{Content, SymbologyIdentifier};
use crate::errors::BarcodeError;
use crate::log::trace;
use crate::qr::format_info::{decode_format, decode_version, FormatInfo};
use crate::qr::mask::is_masked;
use crate::qr::matrix::{data_positions, format_positions, version_positions, Layout};
use crate::qr::reed_solomon;
use crate::qr::version::{char_count_bits, version_for_dimension, BlockLayout, EcLevel};
use crate::qr::{
    ALPHANUMERIC_CHARSET, MODE_ALPHANUMERIC, MODE_BYTE, MODE_ECI, MODE_FNC1_FIRST,
    MODE_FNC1_SECOND, MODE_HANZI, MODE_KANJI, MODE_NUMERIC, MODE_STRUCTURED_APPEND,
    MODE_TERMINATOR
};

/// Structured append header found in a symbol
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SequenceInfo {
    pub index:  u8,
    pub count:  u8,
    pub parity: u8
}

/// Everything recovered from a module grid
#[derive(Clone, Debug)]
pub struct DecodedGrid {
    pub content:  Content,
    pub version:  u8,
    pub level:    EcLevel,
    pub mirrored: bool,
    pub sequence: Option<SequenceInfo>
}

fn format_error(msg: &str) -> BarcodeError {
    BarcodeError::Format(msg.to_string())
}

/// Read the format information, the only part of the symbol
/// that tells a real QR code from something that merely looks like one
pub fn read_format(grid: &BitMatrix) -> Option<FormatInfo> {
    let [first, second] = format_positions(grid.width());
    let read = |positions: &[(usize, usize)]| {
        positions
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, (x, y))| acc | (u32::from(grid.get(*x, *y)) << i))
    };
    decode_format(read(&first), read(&second))
}

fn read_version(grid: &BitMatrix, provisional: u8) -> u8 {
    if provisional < 7 {
        return provisional;
    }
    let [top_right, bottom_left] = version_positions(grid.width());
    let read = |positions: &[(usize, usize)]| {
        positions
            .iter()
            .enumerate()
            .fold(0u32, |acc, (i, (x, y))| acc | (u32::from(grid.get(*x, *y)) << i))
    };
    match decode_version(read(&top_right), read(&bottom_left)) {
        Some(v) if v == provisional => v,
        // the dimension is what we sampled with, trust it over a damaged block
        _ => provisional
    }
}

/// Decode a square grid of modules, one cell per module, without quiet zone
///
/// A grid that fails is retried transposed, which is how a mirrored
/// symbol appears.
pub fn decode_grid(grid: &BitMatrix, hint: CharacterSet) -> Result<DecodedGrid, BarcodeError> {
    match decode_oriented(grid, hint) {
        Ok(decoded) => Ok(decoded),
        Err(first) => match decode_oriented(&grid.transposed(), hint) {
            Ok(mut decoded) => {
                decoded.mirrored = true;
                Ok(decoded)
            }
            Err(_) => Err(first)
        }
    }
}

fn decode_oriented(grid: &BitMatrix, hint: CharacterSet) -> Result<DecodedGrid, BarcodeError> {
    if grid.width() != grid.height() {
        return Err(format_error("QR symbol must be square"));
    }
    let provisional = version_for_dimension(grid.width())
        .ok_or_else(|| format_error("invalid QR symbol dimension"))?;
    let format = read_format(grid).ok_or_else(|| format_error("unreadable format information"))?;
    let version = read_version(grid, provisional);

    let codewords = read_codewords(grid, version, format.mask);
    let data = correct(&codewords, version, format.level)?;

    let (content, sequence) = parse_bitstream(&data, version, hint)?;
    trace!(
        "decoded QR {version}-{} with {} payload bytes",
        format.level.name(),
        content.bytes().len()
    );
    Ok(DecodedGrid {
        content,
        version,
        level: format.level,
        mirrored: false,
        sequence
    })
}

fn read_codewords(grid: &BitMatrix, version: u8, mask: u8) -> Vec<u8> {
    let is_function = Layout::functions_only(version);
    let positions = data_positions(&is_function);
    let total = BlockLayout::new(version, EcLevel::L).total_codewords;

    let mut out = vec![0u8; total];
    for (i, (x, y)) in positions.into_iter().take(total * 8).enumerate() {
        let bit = grid.get(x, y) ^ is_masked(mask, x, y);
        out[i / 8] |= u8::from(bit) << (7 - i % 8);
    }
    out
}

/// De-interleave the blocks, run error correction and return the data codewords
fn correct(codewords: &[u8], version: u8, level: EcLevel) -> Result<Vec<u8>, BarcodeError> {
    let layout = BlockLayout::new(version, level);
    let mut blocks: Vec<Vec<u8>> = (0..layout.blocks)
        .map(|i| Vec::with_capacity(layout.data_len(i) + layout.ec_per_block))
        .collect();

    let mut source = codewords.iter();
    for i in 0..=layout.short_data_len {
        for (b, block) in blocks.iter_mut().enumerate() {
            if i < layout.data_len(b) {
                block.push(*source.next().ok_or_else(|| format_error("truncated codewords"))?);
            }
        }
    }
    for _ in 0..layout.ec_per_block {
        for block in blocks.iter_mut() {
            block.push(*source.next().ok_or_else(|| format_error("truncated codewords"))?);
        }
    }

    let mut data = Vec::with_capacity(layout.data_codewords());
    for (b, block) in blocks.iter_mut().enumerate() {
        let corrected = reed_solomon::decode(block, layout.ec_per_block)?;
        if corrected > 0 {
            trace!("corrected {corrected} codewords in block {b}");
        }
        data.extend_from_slice(&block[..layout.data_len(b)]);
    }
    Ok(data)
}

struct BitSource<'a> {
    data:     &'a [u8],
    position: usize
}

impl<'a> BitSource<'a> {
    fn new(data: &'a [u8]) -> BitSource<'a> {
        BitSource { data, position: 0 }
    }

    fn available(&self) -> usize {
        self.data.len() * 8 - self.position
    }

    fn read(&mut self, count: usize) -> Result<u32, BarcodeError> {
        if count > self.available() {
            return Err(format_error("bitstream ended inside a segment"));
        }
        let mut value = 0u32;
        for _ in 0..count {
            let byte = self.data[self.position / 8];
            let bit = (byte >> (7 - self.position % 8)) & 1;
            value = (value << 1) | u32::from(bit);
            self.position += 1;
        }
        Ok(value)
    }
}

fn parse_eci(bits: &mut BitSource) -> Result<u32, BarcodeError> {
    let first = bits.read(8)?;
    if first & 0x80 == 0 {
        return Ok(first & 0x7F);
    }
    if first & 0xC0 == 0x80 {
        return Ok(((first & 0x3F) << 8) | bits.read(8)?);
    }
    if first & 0xE0 == 0xC0 {
        return Ok(((first & 0x1F) << 16) | bits.read(16)?);
    }
    Err(format_error("invalid ECI designator"))
}

/// Parse the data codewords into payload bytes
fn parse_bitstream(
    data: &[u8], version: u8, hint: CharacterSet
) -> Result<(Content, Option<SequenceInfo>), BarcodeError> {
    let mut bits = BitSource::new(data);
    let mut symbology = SymbologyIdentifier::new(b'Q', b'1', 1);
    let mut content = Content::new(symbology);
    content.set_hint(hint);
    let mut sequence = None;

    while bits.available() >= 4 {
        let mode = bits.read(4)? as u8;
        match mode {
            MODE_TERMINATOR => break,
            MODE_FNC1_FIRST => {
                symbology.modifier = b'3';
                symbology.gs1 = true;
            }
            MODE_FNC1_SECOND => {
                symbology.modifier = b'5';
                let indicator = bits.read(8)?;
                // application indicator is either two digits or a letter
                match indicator {
                    0..=99 => content.append(format!("{indicator:02}").as_bytes()),
                    165..=190 | 197..=222 => content.push((indicator - 100) as u8),
                    _ => return Err(format_error("invalid AIM application indicator"))
                }
            }
            MODE_STRUCTURED_APPEND => {
                let index = bits.read(4)? as u8;
                let count = bits.read(4)? as u8 + 1;
                let parity = bits.read(8)? as u8;
                sequence = Some(SequenceInfo { index, count, parity });
            }
            MODE_ECI => {
                let eci = parse_eci(&mut bits)?;
                content.switch_encoding(eci);
            }
            MODE_NUMERIC => {
                let count = bits.read(char_count_bits(mode, version))? as usize;
                parse_numeric(&mut bits, count, &mut content)?;
            }
            MODE_ALPHANUMERIC => {
                let count = bits.read(char_count_bits(mode, version))? as usize;
                parse_alphanumeric(&mut bits, count, symbology.gs1, &mut content)?;
            }
            MODE_BYTE => {
                let count = bits.read(char_count_bits(mode, version))? as usize;
                for _ in 0..count {
                    content.push(bits.read(8)? as u8);
                }
            }
            MODE_KANJI => {
                let count = bits.read(char_count_bits(mode, version))? as usize;
                parse_kanji(&mut bits, count, &mut content)?;
            }
            MODE_HANZI => {
                return Err(BarcodeError::Format("Hanzi mode is not supported".to_string()));
            }
            _ => return Err(format_error("invalid segment mode"))
        }
    }
    content.set_symbology(symbology);
    Ok((content, sequence))
}

fn parse_numeric(bits: &mut BitSource, mut count: usize, content: &mut Content) -> Result<(), BarcodeError> {
    let mut push_digits = |value: u32, digits: usize, content: &mut Content| -> Result<(), BarcodeError> {
        if value >= 10u32.pow(digits as u32) {
            return Err(format_error("invalid numeric segment"));
        }
        content.append(format!("{value:0digits$}").as_bytes());
        Ok(())
    };
    while count >= 3 {
        let value = bits.read(10)?;
        push_digits(value, 3, content)?;
        count -= 3;
    }
    match count {
        2 => push_digits(bits.read(7)?, 2, content),
        1 => push_digits(bits.read(4)?, 1, content),
        _ => Ok(())
    }
}

fn alphanumeric_char(value: u32) -> Result<u8, BarcodeError> {
    ALPHANUMERIC_CHARSET
        .get(value as usize)
        .copied()
        .ok_or_else(|| format_error("invalid alphanumeric value"))
}

fn parse_alphanumeric(
    bits: &mut BitSource, mut count: usize, gs1: bool, content: &mut Content
) -> Result<(), BarcodeError> {
    let mut chars = Vec::with_capacity(count);
    while count >= 2 {
        let value = bits.read(11)?;
        chars.push(alphanumeric_char(value / 45)?);
        chars.push(alphanumeric_char(value % 45)?);
        count -= 2;
    }
    if count == 1 {
        chars.push(alphanumeric_char(bits.read(6)?)?);
    }
    if !gs1 {
        content.append(&chars);
        return Ok(());
    }
    // in GS1 mode "%%" is a literal percent sign, a single one the separator
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == b'%' {
            if chars.get(i + 1) == Some(&b'%') {
                content.push(b'%');
                i += 2;
                continue;
            }
            content.push(0x1D);
        } else {
            content.push(chars[i]);
        }
        i += 1;
    }
    Ok(())
}

fn parse_kanji(bits: &mut BitSource, count: usize, content: &mut Content) -> Result<(), BarcodeError> {
    // reassembled as Shift_JIS byte pairs
    let mut pairs = Vec::with_capacity(count * 2);
    for _ in 0..count {
        let value = bits.read(13)?;
        let mut assembled = ((value / 0xC0) << 8) | (value % 0xC0);
        assembled += if assembled < 0x1F00 { 0x8140 } else { 0xC140 };
        pairs.push((assembled >> 8) as u8);
        pairs.push((assembled & 0xFF) as u8);
    }
    content.append_in(CharacterSet::Shift_JIS, &pairs);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentType, TextMode};
    use crate::qr::encoder::{encode, QrOptions, SequenceHeader};

    #[test]
    fn decodes_what_the_encoder_wrote() {
        for (text, level) in [
            ("HELLO", EcLevel::L),
            ("0123456789012345", EcLevel::M),
            ("lower case bytes", EcLevel::Q),
            ("Some longer text that needs a larger symbol, well past version 7 territory, \
              to exercise version information blocks and multiple error correction blocks", EcLevel::H)
        ] {
            let symbol = encode(text.as_bytes(), &QrOptions {
                level: Some(level),
                ..QrOptions::default()
            })
            .unwrap();
            let decoded = decode_grid(&symbol.modules, CharacterSet::Unknown).unwrap();
            assert_eq!(decoded.content.text(TextMode::Plain), text);
            assert_eq!(decoded.level, level);
            assert_eq!(decoded.version, symbol.version);
            assert!(!decoded.mirrored);
        }
    }

    #[test]
    fn repairs_damage_and_mirrors() {
        let symbol = encode(b"DAMAGE TEST", &QrOptions {
            level: Some(EcLevel::H),
            ..QrOptions::default()
        })
        .unwrap();
        let mut damaged = symbol.modules.clone();
        for x in 9..13 {
            damaged.flip(x, 12);
        }
        let decoded = decode_grid(&damaged, CharacterSet::Unknown).unwrap();
        assert_eq!(decoded.content.bytes(), b"DAMAGE TEST");

        let mirrored = decode_grid(&symbol.modules.transposed(), CharacterSet::Unknown).unwrap();
        assert!(mirrored.mirrored);
        assert_eq!(mirrored.content.bytes(), b"DAMAGE TEST");
    }

    #[test]
    fn headers_survive() {
        let symbol = encode(b"01\x1D21ABC%", &QrOptions {
            eci: Some(26),
            gs1: true,
            sequence: Some(SequenceHeader {
                index:  1,
                count:  3,
                parity: 0x42
            }),
            ..QrOptions::default()
        })
        .unwrap();
        let decoded = decode_grid(&symbol.modules, CharacterSet::Unknown).unwrap();
        assert_eq!(decoded.content.bytes(), b"01\x1D21ABC%");
        assert_eq!(decoded.content.content_type(), ContentType::GS1);
        assert!(decoded.content.has_eci());
        assert_eq!(decoded.content.symbology().to_string(true), "]Q4");
        assert_eq!(
            decoded.sequence,
            Some(SequenceInfo {
                index:  1,
                count:  3,
                parity: 0x42
            })
        );
    }

    #[test]
    fn kanji_mode_is_shift_jis() {
        let symbol = encode(&[0x93, 0x5F, 0xE4, 0xAA], &QrOptions {
            kanji: true,
            ..QrOptions::default()
        })
        .unwrap();
        let decoded = decode_grid(&symbol.modules, CharacterSet::Unknown).unwrap();
        assert_eq!(decoded.content.bytes(), [0x93, 0x5F, 0xE4, 0xAA]);
        assert!(!decoded.content.has_eci());
        assert_eq!(decoded.content.text(TextMode::Plain), "点茗");
    }

    #[test]
    fn kanji_segment_from_the_bitstream() {
        // mode 1000, count 2, 0x0D9F, 0x1AAA, terminator
        let data = [0b1000_0000, 0b0010_0110, 0b1100_1111, 0b1110_1010, 0b1010_1000, 0b0000_0000];
        let (content, sequence) = parse_bitstream(&data, 1, CharacterSet::Unknown).unwrap();
        assert!(sequence.is_none());
        assert_eq!(content.text(TextMode::Plain), "点茗");
    }

    #[test]
    fn garbage_is_rejected() {
        let grid = BitMatrix::square(21);
        assert!(decode_grid(&grid, CharacterSet::Unknown).is_err());
        assert!(decode_grid(&BitMatrix::square(22), CharacterSet::Unknown).is_err());
    }
}
