/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Symbol versions, error correction levels and block layouts
use crate::errors::BarcodeError;

pub const MIN_VERSION: u8 = 1;
pub const MAX_VERSION: u8 = 40;

/// Error correction level of a QR symbol
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EcLevel {
    /// Recovers about 7% of codewords
    L,
    /// About 15%
    M,
    /// About 25%
    Q,
    /// About 30%
    H
}

impl EcLevel {
    /// Value stored in the format information
    pub const fn format_bits(self) -> u32 {
        match self {
            EcLevel::L => 1,
            EcLevel::M => 0,
            EcLevel::Q => 3,
            EcLevel::H => 2
        }
    }

    pub const fn from_format_bits(bits: u32) -> EcLevel {
        match bits & 3 {
            0 => EcLevel::M,
            1 => EcLevel::L,
            2 => EcLevel::H,
            _ => EcLevel::Q
        }
    }

    const fn ordinal(self) -> usize {
        match self {
            EcLevel::L => 0,
            EcLevel::M => 1,
            EcLevel::Q => 2,
            EcLevel::H => 3
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            EcLevel::L => "L",
            EcLevel::M => "M",
            EcLevel::Q => "Q",
            EcLevel::H => "H"
        }
    }

    /// Parse a level given either as a letter or as a digit `0..=8`
    ///
    /// Digits are a percentage-ish scale shared by several symbologies,
    /// 0-1 is L, 2-3 is M, 4-5 is Q and 6-8 is H. An empty string
    /// returns `None` so the writer can pick its default.
    pub fn parse(level: &str) -> Result<Option<EcLevel>, BarcodeError> {
        let level = level.trim();
        match level.to_ascii_uppercase().as_str() {
            "" => Ok(None),
            "L" | "0" | "1" => Ok(Some(EcLevel::L)),
            "M" | "2" | "3" => Ok(Some(EcLevel::M)),
            "Q" | "4" | "5" => Ok(Some(EcLevel::Q)),
            "H" | "6" | "7" | "8" => Ok(Some(EcLevel::H)),
            _ => Err(BarcodeError::InvalidInput(format!(
                "invalid error correction level: {level}"
            )))
        }
    }
}

#[rustfmt::skip]
const ECC_CODEWORDS_PER_BLOCK: [[u8; 41]; 4] = [
    [0, 7, 10, 15, 20, 26, 18, 20, 24, 30, 18, 20, 24, 26, 30, 22, 24, 28, 30, 28, 28, 28, 28, 30, 30, 26, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30],
    [0, 10, 16, 26, 18, 24, 16, 18, 22, 22, 26, 30, 22, 22, 24, 24, 28, 28, 26, 26, 26, 26, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28, 28],
    [0, 13, 22, 18, 26, 18, 24, 18, 22, 20, 24, 28, 26, 24, 20, 30, 24, 28, 28, 26, 30, 28, 30, 30, 30, 30, 28, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30],
    [0, 17, 28, 22, 16, 22, 28, 26, 26, 24, 28, 24, 28, 22, 24, 24, 30, 28, 28, 26, 28, 30, 24, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30, 30],
];

#[rustfmt::skip]
const NUM_ERROR_CORRECTION_BLOCKS: [[u8; 41]; 4] = [
    [0, 1, 1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4, 4, 6, 6, 6, 6, 7, 8, 8, 9, 9, 10, 12, 12, 12, 13, 14, 15, 16, 17, 18, 19, 19, 20, 21, 22, 24, 25],
    [0, 1, 1, 1, 2, 2, 4, 4, 4, 5, 5, 5, 8, 9, 9, 10, 10, 11, 13, 14, 16, 17, 17, 18, 20, 21, 23, 25, 26, 28, 29, 31, 33, 35, 37, 38, 40, 43, 45, 47, 49],
    [0, 1, 1, 2, 2, 4, 4, 6, 6, 8, 8, 8, 10, 12, 16, 12, 17, 16, 18, 21, 20, 23, 23, 25, 27, 29, 34, 34, 35, 38, 40, 43, 45, 48, 51, 53, 56, 59, 62, 65, 68],
    [0, 1, 1, 2, 4, 4, 4, 5, 6, 8, 8, 11, 11, 16, 16, 18, 16, 19, 21, 25, 25, 25, 34, 30, 32, 35, 37, 40, 42, 45, 48, 51, 54, 57, 60, 63, 66, 70, 74, 77, 81],
];

/// Width and height in modules of a symbol of `version`
pub const fn dimension(version: u8) -> usize {
    17 + 4 * version as usize
}

/// Version of a symbol that is `dimension` modules wide
pub fn version_for_dimension(dimension: usize) -> Option<u8> {
    if dimension < 21 || dimension % 4 != 1 {
        return None;
    }
    let version = (dimension - 17) / 4;
    u8::try_from(version)
        .ok()
        .filter(|v| (MIN_VERSION..=MAX_VERSION).contains(v))
}

/// Centre coordinates of the alignment patterns, ascending
pub fn alignment_positions(version: u8) -> Vec<usize> {
    if version == 1 {
        return Vec::new();
    }
    let v = usize::from(version);
    let count = v / 7 + 2;
    let step = (v * 8 + count * 3 + 5) / (count * 4 - 4) * 2;
    let size = dimension(version);

    let mut out: Vec<usize> = (0..count - 1).map(|i| size - 7 - i * step).collect();
    out.push(6);
    out.reverse();
    out
}

/// Number of modules available for data and error correction
pub fn raw_data_modules(version: u8) -> usize {
    let v = usize::from(version);
    let mut result = (16 * v + 128) * v + 64;
    if v >= 2 {
        let count = v / 7 + 2;
        result -= (25 * count - 10) * count - 55;
        if v >= 7 {
            result -= 36;
        }
    }
    result
}

/// How the codewords of a symbol are split into blocks
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BlockLayout {
    /// Total number of blocks
    pub blocks:          usize,
    /// Error correction codewords in every block
    pub ec_per_block:    usize,
    /// Data codewords in a short block, long blocks carry one more
    pub short_data_len:  usize,
    /// Number of short blocks, they come first
    pub short_blocks:    usize,
    pub total_codewords: usize
}

impl BlockLayout {
    pub fn new(version: u8, level: EcLevel) -> BlockLayout {
        let v = usize::from(version);
        let blocks = usize::from(NUM_ERROR_CORRECTION_BLOCKS[level.ordinal()][v]);
        let ec_per_block = usize::from(ECC_CODEWORDS_PER_BLOCK[level.ordinal()][v]);
        let total_codewords = raw_data_modules(version) / 8;
        let short_blocks = blocks - total_codewords % blocks;
        let short_len = total_codewords / blocks;

        BlockLayout {
            blocks,
            ec_per_block,
            short_data_len: short_len - ec_per_block,
            short_blocks,
            total_codewords
        }
    }

    /// Total number of data codewords
    pub fn data_codewords(&self) -> usize {
        self.total_codewords - self.ec_per_block * self.blocks
    }

    /// Data codewords in block `index`
    pub fn data_len(&self, index: usize) -> usize {
        if index < self.short_blocks {
            self.short_data_len
        } else {
            self.short_data_len + 1
        }
    }
}

/// Width of the character count field for a segment mode
pub fn char_count_bits(mode: u8, version: u8) -> usize {
    let group = match version {
        1..=9 => 0,
        10..=26 => 1,
        _ => 2
    };
    let bits: [usize; 3] = match mode {
        0b0001 => [10, 12, 14],
        0b0010 => [9, 11, 13],
        0b0100 => [8, 16, 16],
        0b1000 => [8, 10, 12],
        _ => [0, 0, 0]
    };
    bits[group]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alignment_positions_match_the_table() {
        assert!(alignment_positions(1).is_empty());
        assert_eq!(alignment_positions(2), vec![6, 18]);
        assert_eq!(alignment_positions(7), vec![6, 22, 38]);
        assert_eq!(alignment_positions(10), vec![6, 28, 50]);
        assert_eq!(alignment_positions(32), vec![6, 34, 60, 86, 112, 138]);
    }

    #[test]
    fn data_capacities() {
        assert_eq!(BlockLayout::new(1, EcLevel::L).data_codewords(), 19);
        assert_eq!(BlockLayout::new(1, EcLevel::M).data_codewords(), 16);
        assert_eq!(BlockLayout::new(1, EcLevel::H).data_codewords(), 9);
        assert_eq!(BlockLayout::new(5, EcLevel::Q).data_codewords(), 62);
        assert_eq!(BlockLayout::new(40, EcLevel::L).data_codewords(), 2956);
        assert_eq!(BlockLayout::new(40, EcLevel::H).data_codewords(), 1276);

        let layout = BlockLayout::new(5, EcLevel::Q);
        assert_eq!((layout.short_blocks, layout.short_data_len), (2, 15));
        assert_eq!(layout.data_len(3), 16);
    }

    #[test]
    fn levels_and_dimensions() {
        assert_eq!(EcLevel::parse("q").unwrap(), Some(EcLevel::Q));
        assert_eq!(EcLevel::parse("7").unwrap(), Some(EcLevel::H));
        assert_eq!(EcLevel::parse("").unwrap(), None);
        assert!(EcLevel::parse("X").is_err());
        for level in [EcLevel::L, EcLevel::M, EcLevel::Q, EcLevel::H] {
            assert_eq!(EcLevel::from_format_bits(level.format_bits()), level);
        }
        assert_eq!(version_for_dimension(21), Some(1));
        assert_eq!(version_for_dimension(177), Some(40));
        assert_eq!(version_for_dimension(23), None);
    }
}
