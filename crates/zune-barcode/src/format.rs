/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Barcode formats and format sets
//!
//! Formats are a closed set with explicit discriminants, new
//! formats are appended and existing values are never renumbered.
//! Names follow the canonical spelling (`QRCode`, `EAN13`), labels
//! the human readable one (`QR Code`, `EAN-13`), both are accepted
//! when parsing together with a handful of deprecated aliases.
#![allow(clippy::upper_case_acronyms)]

use std::collections::HashMap;
use std::fmt::{Debug, Display, Formatter};
use std::sync::OnceLock;

use crate::errors::BarcodeError;

const LINEAR: u8 = 1 << 0;
const MATRIX: u8 = 1 << 1;
const READ: u8 = 1 << 2;
const WRITE: u8 = 1 << 3;
const GS1: u8 = 1 << 4;
const RETAIL: u8 = 1 << 5;
const INDUSTRIAL: u8 = 1 << 6;

/// A single barcode symbology or one of its variants
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum BarcodeFormat {
    /// No format, used for failed reads and unset writer formats
    None = 0,
    Codabar = 1,
    Code39 = 2,
    Code39Std = 3,
    Code39Ext = 4,
    Code32 = 5,
    PZN = 6,
    Code93 = 7,
    Code128 = 8,
    ITF = 9,
    ITF14 = 10,
    DataBar = 11,
    DataBarOmni = 12,
    DataBarStk = 13,
    DataBarStkOmni = 14,
    DataBarLtd = 15,
    DataBarExp = 16,
    DataBarExpStk = 17,
    EANUPC = 18,
    EAN13 = 19,
    EAN8 = 20,
    EAN5 = 21,
    EAN2 = 22,
    ISBN = 23,
    UPCA = 24,
    UPCE = 25,
    OtherBarcode = 26,
    DXFilmEdge = 27,
    PDF417 = 28,
    CompactPDF417 = 29,
    MicroPDF417 = 30,
    Aztec = 31,
    AztecCode = 32,
    AztecRune = 33,
    QRCode = 34,
    QRCodeModel1 = 35,
    QRCodeModel2 = 36,
    MicroQRCode = 37,
    RMQRCode = 38,
    DataMatrix = 39,
    MaxiCode = 40
}

struct FormatInfo {
    format: BarcodeFormat,
    name:   &'static str,
    label:  &'static str,
    /// Symbology family, formats sharing it are variants of each other
    family: u8,
    flags:  u8
}

#[rustfmt::skip]
const FORMAT_TABLE: [FormatInfo; 40] = [
    FormatInfo { format: BarcodeFormat::Codabar,        name: "Codabar",        label: "Codabar",                  family: b'F', flags: LINEAR | READ | WRITE },
    FormatInfo { format: BarcodeFormat::Code39,         name: "Code39",         label: "Code 39",                  family: b'A', flags: LINEAR | READ | WRITE | INDUSTRIAL },
    FormatInfo { format: BarcodeFormat::Code39Std,      name: "Code39Std",      label: "Code 39 Standard",         family: b'A', flags: LINEAR | READ | WRITE | INDUSTRIAL },
    FormatInfo { format: BarcodeFormat::Code39Ext,      name: "Code39Ext",      label: "Code 39 Extended",         family: b'A', flags: LINEAR | READ | INDUSTRIAL },
    FormatInfo { format: BarcodeFormat::Code32,         name: "Code32",         label: "Code 32",                  family: b'A', flags: LINEAR | READ | INDUSTRIAL },
    FormatInfo { format: BarcodeFormat::PZN,            name: "PZN",            label: "Pharmazentralnummer",      family: b'A', flags: LINEAR | READ | INDUSTRIAL },
    FormatInfo { format: BarcodeFormat::Code93,         name: "Code93",         label: "Code 93",                  family: b'G', flags: LINEAR | READ | WRITE | INDUSTRIAL },
    FormatInfo { format: BarcodeFormat::Code128,        name: "Code128",        label: "Code 128",                 family: b'C', flags: LINEAR | READ | WRITE | GS1 | INDUSTRIAL },
    FormatInfo { format: BarcodeFormat::ITF,            name: "ITF",            label: "ITF",                      family: b'I', flags: LINEAR | READ | WRITE | INDUSTRIAL },
    FormatInfo { format: BarcodeFormat::ITF14,          name: "ITF14",          label: "ITF-14",                   family: b'I', flags: LINEAR | READ | INDUSTRIAL },
    FormatInfo { format: BarcodeFormat::DataBar,        name: "DataBar",        label: "DataBar",                  family: b'e', flags: LINEAR | READ | GS1 | RETAIL },
    FormatInfo { format: BarcodeFormat::DataBarOmni,    name: "DataBarOmni",    label: "DataBar Omni",             family: b'e', flags: LINEAR | READ | GS1 | RETAIL },
    FormatInfo { format: BarcodeFormat::DataBarStk,     name: "DataBarStk",     label: "DataBar Stacked",          family: b'e', flags: LINEAR | READ | GS1 | RETAIL },
    FormatInfo { format: BarcodeFormat::DataBarStkOmni, name: "DataBarStkOmni", label: "DataBar Stacked Omni",     family: b'e', flags: LINEAR | READ | GS1 | RETAIL },
    FormatInfo { format: BarcodeFormat::DataBarLtd,     name: "DataBarLtd",     label: "DataBar Limited",          family: b'e', flags: LINEAR | READ | GS1 | RETAIL },
    FormatInfo { format: BarcodeFormat::DataBarExp,     name: "DataBarExp",     label: "DataBar Expanded",         family: b'e', flags: LINEAR | READ | GS1 | RETAIL },
    FormatInfo { format: BarcodeFormat::DataBarExpStk,  name: "DataBarExpStk",  label: "DataBar Expanded Stacked", family: b'e', flags: LINEAR | READ | GS1 | RETAIL },
    FormatInfo { format: BarcodeFormat::EANUPC,         name: "EANUPC",         label: "EAN/UPC",                  family: b'E', flags: LINEAR | READ | RETAIL },
    FormatInfo { format: BarcodeFormat::EAN13,          name: "EAN13",          label: "EAN-13",                   family: b'E', flags: LINEAR | READ | WRITE | RETAIL },
    FormatInfo { format: BarcodeFormat::EAN8,           name: "EAN8",           label: "EAN-8",                    family: b'E', flags: LINEAR | READ | WRITE | RETAIL },
    FormatInfo { format: BarcodeFormat::EAN5,           name: "EAN5",           label: "EAN-5",                    family: b'E', flags: LINEAR | RETAIL },
    FormatInfo { format: BarcodeFormat::EAN2,           name: "EAN2",           label: "EAN-2",                    family: b'E', flags: LINEAR | RETAIL },
    FormatInfo { format: BarcodeFormat::ISBN,           name: "ISBN",           label: "ISBN",                     family: b'E', flags: LINEAR | READ | RETAIL },
    FormatInfo { format: BarcodeFormat::UPCA,           name: "UPCA",           label: "UPC-A",                    family: b'E', flags: LINEAR | READ | WRITE | RETAIL },
    FormatInfo { format: BarcodeFormat::UPCE,           name: "UPCE",           label: "UPC-E",                    family: b'E', flags: LINEAR | READ | WRITE | RETAIL },
    FormatInfo { format: BarcodeFormat::OtherBarcode,   name: "OtherBarcode",   label: "Other barcode",            family: b'X', flags: READ },
    FormatInfo { format: BarcodeFormat::DXFilmEdge,     name: "DXFilmEdge",     label: "DX Film Edge",             family: b'X', flags: LINEAR | READ },
    FormatInfo { format: BarcodeFormat::PDF417,         name: "PDF417",         label: "PDF417",                   family: b'L', flags: MATRIX | READ | WRITE },
    FormatInfo { format: BarcodeFormat::CompactPDF417,  name: "CompactPDF417",  label: "Compact PDF417",           family: b'L', flags: MATRIX | READ },
    FormatInfo { format: BarcodeFormat::MicroPDF417,    name: "MicroPDF417",    label: "MicroPDF417",              family: b'L', flags: MATRIX },
    FormatInfo { format: BarcodeFormat::Aztec,          name: "Aztec",          label: "Aztec",                    family: b'z', flags: MATRIX | READ | GS1 },
    FormatInfo { format: BarcodeFormat::AztecCode,      name: "AztecCode",      label: "Aztec Code",               family: b'z', flags: MATRIX | READ | WRITE | GS1 },
    FormatInfo { format: BarcodeFormat::AztecRune,      name: "AztecRune",      label: "Aztec Rune",               family: b'z', flags: MATRIX | READ },
    FormatInfo { format: BarcodeFormat::QRCode,         name: "QRCode",         label: "QR Code",                  family: b'Q', flags: MATRIX | READ | WRITE | GS1 },
    FormatInfo { format: BarcodeFormat::QRCodeModel1,   name: "QRCodeModel1",   label: "QR Code Model 1",          family: b'Q', flags: MATRIX | READ },
    FormatInfo { format: BarcodeFormat::QRCodeModel2,   name: "QRCodeModel2",   label: "QR Code Model 2",          family: b'Q', flags: MATRIX | READ },
    FormatInfo { format: BarcodeFormat::MicroQRCode,    name: "MicroQRCode",    label: "Micro QR Code",            family: b'Q', flags: MATRIX | READ },
    FormatInfo { format: BarcodeFormat::RMQRCode,       name: "RMQRCode",       label: "rMQR Code",                family: b'Q', flags: MATRIX | READ | GS1 },
    FormatInfo { format: BarcodeFormat::DataMatrix,     name: "DataMatrix",     label: "Data Matrix",              family: b'd', flags: MATRIX | READ | WRITE | GS1 },
    FormatInfo { format: BarcodeFormat::MaxiCode,       name: "MaxiCode",       label: "MaxiCode",                 family: b'U', flags: MATRIX | READ },
];

/// Named groups accepted wherever a format list is parsed
#[rustfmt::skip]
const META_FORMATS: [(&str, &str, u8); 8] = [
    ("All",           "All",            0),
    ("AllReadable",   "All Readable",   READ),
    ("AllCreatable",  "All Creatable",  WRITE),
    ("AllLinear",     "All Linear",     LINEAR),
    ("AllMatrix",     "All Matrix",     MATRIX),
    ("AllGS1",        "All GS1",        GS1),
    ("AllRetail",     "All Retail",     RETAIL),
    ("AllIndustrial", "All Industrial", INDUSTRIAL),
];

/// Deprecated spellings and what they stand for
const ALIASES: [(&str, &str); 6] = [
    ("Any", "All"),
    ("Linear-Codes", "AllLinear"),
    ("Matrix-Codes", "AllMatrix"),
    ("DataBarExpanded", "DataBarExp"),
    ("DataBarLimited", "DataBarLtd"),
    ("rMQRCode", "RMQRCode")
];

impl BarcodeFormat {
    /// Convert a raw discriminant coming from outside the crate
    ///
    /// Returns `None` for values that do not name a format,
    /// note that `0` maps to [`BarcodeFormat::None`]
    pub fn from_raw(value: u32) -> Option<BarcodeFormat> {
        if value == 0 {
            return Some(BarcodeFormat::None);
        }
        FORMAT_TABLE
            .get(usize::try_from(value).ok()?.checked_sub(1)?)
            .map(|x| x.format)
    }

    /// The raw discriminant of this format
    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    fn info(self) -> Option<&'static FormatInfo> {
        match self {
            BarcodeFormat::None => None,
            fmt => FORMAT_TABLE.get(fmt as usize - 1)
        }
    }

    /// Canonical name, e.g. `QRCode`
    pub fn name(self) -> &'static str {
        self.info().map_or("None", |x| x.name)
    }

    /// Human readable label, e.g. `QR Code`
    pub fn label(self) -> &'static str {
        self.info().map_or("None", |x| x.label)
    }

    /// Whether this is a one dimensional (linear) symbology
    pub fn is_linear(self) -> bool {
        self.info().map_or(false, |x| x.flags & LINEAR != 0)
    }

    /// Whether this is a two dimensional (matrix) symbology
    pub fn is_matrix(self) -> bool {
        self.info().map_or(false, |x| x.flags & MATRIX != 0)
    }

    /// Whether the symbology is able to carry GS1 element strings
    pub fn supports_gs1(self) -> bool {
        self.info().map_or(false, |x| x.flags & GS1 != 0)
    }

    /// Whether this engine can locate and decode the format
    pub const fn can_read(self) -> bool {
        matches!(
            self,
            BarcodeFormat::QRCode
                | BarcodeFormat::QRCodeModel2
                | BarcodeFormat::Code128
                | BarcodeFormat::EAN13
                | BarcodeFormat::EAN8
                | BarcodeFormat::UPCA
        )
    }

    /// Whether this engine can create symbols of this format
    pub const fn can_create(self) -> bool {
        matches!(
            self,
            BarcodeFormat::QRCode
                | BarcodeFormat::Code128
                | BarcodeFormat::EAN13
                | BarcodeFormat::EAN8
                | BarcodeFormat::UPCA
        )
    }

    /// All formats of the same symbology family, including `self`
    pub fn family(self) -> BarcodeFormats {
        let mut set = BarcodeFormats::empty();
        if let Some(info) = self.info() {
            for entry in FORMAT_TABLE.iter().filter(|x| x.family == info.family) {
                set.insert(entry.format);
            }
        }
        set
    }

    /// Whether this is the root entry of its symbology family,
    /// selecting a root selects every variant of the family
    fn is_family_root(self) -> bool {
        matches!(
            self,
            BarcodeFormat::Codabar
                | BarcodeFormat::Code39
                | BarcodeFormat::Code93
                | BarcodeFormat::Code128
                | BarcodeFormat::ITF
                | BarcodeFormat::DataBar
                | BarcodeFormat::EANUPC
                | BarcodeFormat::OtherBarcode
                | BarcodeFormat::PDF417
                | BarcodeFormat::Aztec
                | BarcodeFormat::QRCode
                | BarcodeFormat::DataMatrix
                | BarcodeFormat::MaxiCode
        )
    }

    /// Parse a single format name, label or alias
    ///
    /// Meta groups such as `AllLinear` are not single formats and are
    /// rejected here, use [`BarcodeFormats::parse`] for them.
    pub fn parse(name: &str) -> Result<BarcodeFormat, BarcodeError> {
        match lookup(name) {
            Some(Selector::Single(fmt)) => Ok(fmt),
            _ => Err(BarcodeError::Unsupported(format!("Unsupported format: {name}")))
        }
    }

    /// Every real format, in discriminant order
    pub fn all() -> impl Iterator<Item = BarcodeFormat> {
        FORMAT_TABLE.iter().map(|x| x.format)
    }
}

impl Display for BarcodeFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of barcode formats
///
/// An empty set is a valid value and readers interpret it
/// as "every format".
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarcodeFormats {
    bits: u64
}

impl BarcodeFormats {
    pub const fn empty() -> BarcodeFormats {
        BarcodeFormats { bits: 0 }
    }

    /// Every format in the table
    pub fn all() -> BarcodeFormats {
        BarcodeFormat::all().collect()
    }

    /// Every format matching a flag group
    fn with_flag(flag: u8) -> BarcodeFormats {
        FORMAT_TABLE
            .iter()
            .filter(|x| flag == 0 || x.flags & flag != 0)
            .map(|x| x.format)
            .collect()
    }

    /// The formats this engine can read
    pub fn readable() -> BarcodeFormats {
        BarcodeFormat::all().filter(|x| x.can_read()).collect()
    }

    /// Raw bitmask, bit `n` set means format with discriminant `n` is present
    pub const fn bits(self) -> u64 {
        self.bits
    }

    /// Build a set from a raw bitmask, unknown bits are discarded
    pub fn from_bits_truncate(bits: u64) -> BarcodeFormats {
        BarcodeFormat::all()
            .filter(|x| bits & (1 << (*x as u64)) != 0)
            .collect()
    }

    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    pub const fn contains(self, format: BarcodeFormat) -> bool {
        !matches!(format, BarcodeFormat::None) && self.bits & (1 << (format as u64)) != 0
    }

    pub fn insert(&mut self, format: BarcodeFormat) {
        if format != BarcodeFormat::None {
            self.bits |= 1 << (format as u64);
        }
    }

    pub fn remove(&mut self, format: BarcodeFormat) {
        self.bits &= !(1 << (format as u64));
    }

    pub const fn union(self, other: BarcodeFormats) -> BarcodeFormats {
        BarcodeFormats { bits: self.bits | other.bits }
    }

    pub const fn intersection(self, other: BarcodeFormats) -> BarcodeFormats {
        BarcodeFormats { bits: self.bits & other.bits }
    }

    pub fn len(self) -> usize {
        self.bits.count_ones() as usize
    }

    pub fn iter(self) -> impl Iterator<Item = BarcodeFormat> {
        BarcodeFormat::all().filter(move |x| self.contains(*x))
    }

    /// Expand family roots to every variant of the family
    ///
    /// `QRCode` in a reader selector means any QR flavour, this
    /// returns the set a reader should actually look for.
    pub fn expanded(self) -> BarcodeFormats {
        let mut out = self;
        for fmt in self.iter().filter(|x| x.is_family_root()) {
            out = out.union(fmt.family());
        }
        out
    }

    /// Parse a list of formats separated by `,`, `|` or whitespace
    ///
    /// Names, labels, meta groups (`AllLinear`) and deprecated aliases
    /// are all accepted and matching ignores case, `-`, `_` and spaces.
    /// An empty string gives an empty set.
    pub fn parse(list: &str) -> Result<BarcodeFormats, BarcodeError> {
        let mut formats = BarcodeFormats::empty();

        for token in list.split([',', '|', '\n']).map(str::trim) {
            if token.is_empty() {
                continue;
            }
            // whole token first, so that labels with spaces match
            if let Some(selector) = lookup(token) {
                formats = formats.union(selector.to_set());
                continue;
            }
            for word in token.split_whitespace() {
                match lookup(word) {
                    Some(selector) => formats = formats.union(selector.to_set()),
                    None => {
                        return Err(BarcodeError::Unsupported(format!(
                            "Unsupported format: {word}"
                        )))
                    }
                }
            }
        }
        Ok(formats)
    }
}

impl FromIterator<BarcodeFormat> for BarcodeFormats {
    fn from_iter<T: IntoIterator<Item = BarcodeFormat>>(iter: T) -> Self {
        let mut set = BarcodeFormats::empty();
        for fmt in iter {
            set.insert(fmt);
        }
        set
    }
}

impl From<BarcodeFormat> for BarcodeFormats {
    fn from(value: BarcodeFormat) -> Self {
        let mut set = BarcodeFormats::empty();
        set.insert(value);
        set
    }
}

impl Debug for BarcodeFormats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl Display for BarcodeFormats {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.iter().map(|x| x.name()).collect();
        f.write_str(&names.join(", "))
    }
}

#[derive(Copy, Clone)]
enum Selector {
    Single(BarcodeFormat),
    Group(u8)
}

impl Selector {
    fn to_set(self) -> BarcodeFormats {
        match self {
            Selector::Single(fmt) => fmt.into(),
            Selector::Group(flag) => BarcodeFormats::with_flag(flag)
        }
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '-' | '_' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Name lookup table, built on first use and never mutated afterwards
fn name_table() -> &'static HashMap<String, Selector> {
    static TABLE: OnceLock<HashMap<String, Selector>> = OnceLock::new();

    TABLE.get_or_init(|| {
        let mut table = HashMap::new();

        for info in &FORMAT_TABLE {
            table.insert(normalize(info.name), Selector::Single(info.format));
            table.insert(normalize(info.label), Selector::Single(info.format));
        }
        for (name, label, flag) in META_FORMATS {
            table.insert(normalize(name), Selector::Group(flag));
            table.insert(normalize(label), Selector::Group(flag));
        }
        for (alias, target) in ALIASES {
            if let Some(selector) = table.get(&normalize(target)).copied() {
                table.insert(normalize(alias), selector);
            }
        }
        table
    })
}

fn lookup(name: &str) -> Option<Selector> {
    name_table().get(&normalize(name)).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_values_are_stable() {
        assert_eq!(BarcodeFormat::from_raw(0), Some(BarcodeFormat::None));
        assert_eq!(BarcodeFormat::from_raw(34), Some(BarcodeFormat::QRCode));
        assert_eq!(BarcodeFormat::from_raw(40), Some(BarcodeFormat::MaxiCode));
        assert_eq!(BarcodeFormat::from_raw(41), None);
        assert_eq!(BarcodeFormat::from_raw(u32::MAX), None);

        for fmt in BarcodeFormat::all() {
            assert_eq!(BarcodeFormat::from_raw(fmt.to_raw()), Some(fmt));
        }
    }

    #[test]
    fn parse_names_labels_and_aliases() {
        assert_eq!(BarcodeFormat::parse("QRCode").unwrap(), BarcodeFormat::QRCode);
        assert_eq!(BarcodeFormat::parse("QR Code").unwrap(), BarcodeFormat::QRCode);
        assert_eq!(BarcodeFormat::parse("ean-13").unwrap(), BarcodeFormat::EAN13);
        assert_eq!(
            BarcodeFormat::parse("DataBarExpanded").unwrap(),
            BarcodeFormat::DataBarExp
        );
        assert!(BarcodeFormat::parse("AllLinear").is_err());
        assert!(BarcodeFormat::parse("Bogus").is_err());
    }

    #[test]
    fn parse_lists() {
        let set = BarcodeFormats::parse("QRCode, EAN-13|Code 128").unwrap();
        assert_eq!(set.len(), 3);
        assert!(set.contains(BarcodeFormat::Code128));

        let linear = BarcodeFormats::parse("Linear-Codes").unwrap();
        assert!(linear.contains(BarcodeFormat::EAN8));
        assert!(!linear.contains(BarcodeFormat::QRCode));

        assert!(BarcodeFormats::parse("").unwrap().is_empty());
        assert_eq!(BarcodeFormats::parse("Any").unwrap(), BarcodeFormats::all());
        assert!(BarcodeFormats::parse("QRCode, Nope").is_err());
    }

    #[test]
    fn family_roots_expand() {
        let set = BarcodeFormats::from(BarcodeFormat::EANUPC).expanded();
        assert!(set.contains(BarcodeFormat::EAN13));
        assert!(set.contains(BarcodeFormat::UPCA));
        assert!(!set.contains(BarcodeFormat::Code128));

        // a variant does not pull in its siblings
        let set = BarcodeFormats::from(BarcodeFormat::EAN8).expanded();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn bits_round_trip() {
        let set = BarcodeFormats::parse("QRCode,Code128").unwrap();
        assert_eq!(BarcodeFormats::from_bits_truncate(set.bits()), set);
        assert_eq!(BarcodeFormats::from_bits_truncate(1).len(), 0);
    }
}
