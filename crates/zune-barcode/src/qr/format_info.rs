/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! BCH protected format and version information
use crate::qr::version::{EcLevel, MAX_VERSION};

const FORMAT_INFO_MASK: u32 = 0x5412;
const FORMAT_GENERATOR: u32 = 0x537;
const VERSION_GENERATOR: u32 = 0x1F25;
/// Codes differ in at least 7 bits, so 3 flipped bits are correctable
const MAX_BIT_ERRORS: u32 = 3;

/// The 15 bit masked format word for a level and mask pattern
pub fn format_bits(level: EcLevel, mask: u8) -> u32 {
    let data = (level.format_bits() << 3) | u32::from(mask & 7);
    let mut rem = data;
    for _ in 0..10 {
        rem = (rem << 1) ^ ((rem >> 9) * FORMAT_GENERATOR);
    }
    ((data << 10) | (rem & 0x3FF)) ^ FORMAT_INFO_MASK
}

/// The 18 bit version word, only present for version 7 and up
pub fn version_bits(version: u8) -> u32 {
    let data = u32::from(version);
    let mut rem = data;
    for _ in 0..12 {
        rem = (rem << 1) ^ ((rem >> 11) * VERSION_GENERATOR);
    }
    (data << 12) | (rem & 0xFFF)
}

/// Decoded format information
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FormatInfo {
    pub level: EcLevel,
    pub mask:  u8
}

/// Find the format information closest to either of the two copies
/// read from a symbol
pub fn decode_format(copy1: u32, copy2: u32) -> Option<FormatInfo> {
    let mut best: Option<(u32, FormatInfo)> = None;

    for data in 0..32u32 {
        let level = EcLevel::from_format_bits(data >> 3);
        let mask = (data & 7) as u8;
        let code = format_bits(level, mask);

        for copy in [copy1, copy2] {
            let distance = (copy ^ code).count_ones();
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, FormatInfo { level, mask }));
            }
        }
    }
    best.filter(|(d, _)| *d <= MAX_BIT_ERRORS).map(|(_, info)| info)
}

/// Find the version closest to either of the two version blocks
pub fn decode_version(copy1: u32, copy2: u32) -> Option<u8> {
    let mut best: Option<(u32, u8)> = None;

    for version in 7..=MAX_VERSION {
        let code = version_bits(version);
        for copy in [copy1, copy2] {
            let distance = (copy ^ code).count_ones();
            if best.map_or(true, |(d, _)| distance < d) {
                best = Some((distance, version));
            }
        }
    }
    best.filter(|(d, _)| *d <= MAX_BIT_ERRORS).map(|(_, v)| v)
}
