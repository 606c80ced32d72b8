/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Building abstract symbols from text or bytes
//!
//! A [`Symbol`] is the module matrix of one barcode plus what a
//! renderer needs to draw it. It is built once per request, rendering
//! it any number of times does not re-encode the payload.
use crate::bitmatrix::BitMatrix;
use crate::charset::CharacterSet;
use crate::errors::BarcodeError;
use crate::format::BarcodeFormat;
use crate::log::{debug, trace};
use crate::oned::{code128, upc_ean};
use crate::qr::encoder::{QrOptions, SequenceHeader};
use crate::qr::{self, EcLevel};

/// Quiet zone of matrix symbols, in modules
const MATRIX_QUIET_ZONE: usize = 4;
/// Quiet zone of linear symbols, in modules
const LINEAR_QUIET_ZONE: usize = 10;

/// What a symbol should carry
#[derive(Copy, Clone, Debug)]
pub enum Payload<'a> {
    /// Text, converted with the configured character set
    Text(&'a str),
    /// Bytes written as they are
    Bytes(&'a [u8])
}

/// Options consumed while building a symbol
///
/// ```
/// use zune_barcode::{BarcodeFormat, CreatorConfig};
///
/// let config = CreatorConfig::new(BarcodeFormat::QRCode).set_ec_level("Q");
/// assert_eq!(config.get_ec_level(), "Q");
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CreatorConfig {
    format:            BarcodeFormat,
    /// Mark the symbol as a reader programming symbol
    ///
    /// - Default value: false
    reader_init:       bool,
    /// Prefer square matrices for formats with rectangular variants
    ///
    /// - Default value: false
    force_square:      bool,
    /// Error correction level, empty means the format's default
    ec_level:          String,
    /// Character set text payloads are converted to
    ///
    /// - Default value: UTF8
    character_set:     CharacterSet,
    /// The payload is a GS1 element string with GS separators
    gs1:               bool,
    structured_append: Option<(u8, u8, u8)>
}

impl Default for CreatorConfig {
    fn default() -> Self {
        CreatorConfig::new(BarcodeFormat::QRCode)
    }
}

impl CreatorConfig {
    pub fn new(format: BarcodeFormat) -> CreatorConfig {
        CreatorConfig {
            format,
            reader_init: false,
            force_square: false,
            ec_level: String::new(),
            character_set: CharacterSet::UTF8,
            gs1: false,
            structured_append: None
        }
    }

    pub const fn get_format(&self) -> BarcodeFormat {
        self.format
    }

    pub const fn get_reader_init(&self) -> bool {
        self.reader_init
    }

    pub const fn get_force_square(&self) -> bool {
        self.force_square
    }

    pub fn get_ec_level(&self) -> &str {
        &self.ec_level
    }

    pub const fn get_character_set(&self) -> CharacterSet {
        self.character_set
    }

    pub const fn get_gs1(&self) -> bool {
        self.gs1
    }

    /// Structured append position as `(index, count, parity)`
    pub const fn get_structured_append(&self) -> Option<(u8, u8, u8)> {
        self.structured_append
    }

    pub fn set_format(mut self, format: BarcodeFormat) -> Self {
        self.format = format;
        self
    }

    pub fn set_reader_init(mut self, yes: bool) -> Self {
        self.reader_init = yes;
        self
    }

    pub fn set_force_square(mut self, yes: bool) -> Self {
        self.force_square = yes;
        self
    }

    pub fn set_ec_level(mut self, level: impl Into<String>) -> Self {
        self.ec_level = level.into();
        self
    }

    pub fn set_character_set(mut self, charset: CharacterSet) -> Self {
        self.character_set = charset;
        self
    }

    pub fn set_gs1(mut self, yes: bool) -> Self {
        self.gs1 = yes;
        self
    }

    pub fn set_structured_append(mut self, index: u8, count: u8, parity: u8) -> Self {
        self.structured_append = Some((index, count, parity));
        self
    }
}

/// A barcode ready to be rendered
#[derive(Clone, Debug)]
pub struct Symbol {
    format:     BarcodeFormat,
    modules:    BitMatrix,
    text:       String,
    quiet_zone: usize,
    ec_level:   String,
    version:    String
}

impl Symbol {
    pub const fn format(&self) -> BarcodeFormat {
        self.format
    }

    /// The modules without quiet zone, linear symbols are one row tall
    pub const fn modules(&self) -> &BitMatrix {
        &self.modules
    }

    /// Human readable text printed under linear symbols
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Required blank border on every side, in modules
    pub const fn quiet_zone(&self) -> usize {
        self.quiet_zone
    }

    pub fn ec_level(&self) -> &str {
        &self.ec_level
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn is_linear(&self) -> bool {
        self.modules.height() == 1
    }
}

fn unsupported(format: BarcodeFormat) -> BarcodeError {
    BarcodeError::Unsupported(format!("Unsupported format: {format}"))
}

/// Whether ASCII text is stored unchanged by `charset`
const fn is_ascii_compatible(charset: CharacterSet) -> bool {
    !matches!(
        charset,
        CharacterSet::UTF16BE | CharacterSet::UTF16LE | CharacterSet::UTF32BE | CharacterSet::UTF32LE
    )
}

fn create_qr(payload: Payload, config: &CreatorConfig) -> Result<Symbol, BarcodeError> {
    let level = match EcLevel::parse(&config.ec_level)? {
        Some(level) => level,
        None => EcLevel::L
    };
    let (data, eci, kanji) = match payload {
        Payload::Text(text) => {
            let charset = match config.character_set {
                CharacterSet::Unknown => CharacterSet::UTF8,
                charset => charset
            };
            let data = charset.encode(text)?;
            // Kanji mode implies Shift_JIS
            let kanji = charset == CharacterSet::Shift_JIS && qr::encoder::is_kanji(&data);
            // plain ASCII reads the same in the default set
            let eci = if kanji || (text.is_ascii() && is_ascii_compatible(charset)) {
                None
            } else {
                charset.to_eci()
            };
            (data, eci, kanji)
        }
        Payload::Bytes(bytes) => (bytes.to_vec(), None, false)
    };
    let sequence = config
        .structured_append
        .map(|(index, count, parity)| SequenceHeader { index, count, parity });
    let options = QrOptions {
        level: Some(level),
        eci: if config.gs1 { None } else { eci },
        gs1: config.gs1,
        kanji,
        sequence,
        ..QrOptions::default()
    };
    let symbol = qr::encoder::encode(&data, &options)?;
    trace!(
        "QR version {} level {:?} mask {}",
        symbol.version,
        symbol.level,
        symbol.mask
    );
    Ok(Symbol {
        format:     BarcodeFormat::QRCode,
        modules:    symbol.modules,
        text:       String::new(),
        quiet_zone: MATRIX_QUIET_ZONE,
        ec_level:   symbol.level.name().to_string(),
        version:    symbol.version.to_string()
    })
}

fn create_code128(payload: Payload, config: &CreatorConfig) -> Result<Symbol, BarcodeError> {
    let data = match payload {
        Payload::Text(text) => CharacterSet::ISO8859_1.encode(text)?,
        Payload::Bytes(bytes) => bytes.to_vec()
    };
    let modules = code128::encode(&data, config.gs1, config.reader_init)?;
    let text = data
        .iter()
        .filter(|b| !b.is_ascii_control())
        .map(|&b| char::from(b))
        .collect();
    Ok(Symbol {
        format: BarcodeFormat::Code128,
        modules,
        text,
        quiet_zone: LINEAR_QUIET_ZONE,
        ec_level: String::new(),
        version: String::new()
    })
}

fn create_ean(payload: Payload, format: BarcodeFormat) -> Result<Symbol, BarcodeError> {
    let text = match payload {
        Payload::Text(text) => text,
        Payload::Bytes(bytes) => core::str::from_utf8(bytes)
            .map_err(|_| BarcodeError::InvalidInput(format!("{format} takes digits only")))?
    };
    let (modules, text) = upc_ean::encode(text, format)?;
    Ok(Symbol {
        format,
        modules,
        text,
        quiet_zone: LINEAR_QUIET_ZONE,
        ec_level: String::new(),
        version: String::new()
    })
}

/// Build the symbol for `payload`
///
/// Fails with [`BarcodeError::Unsupported`] for formats this engine can
/// not create and with [`BarcodeError::InvalidInput`] when the payload
/// does not fit the format.
pub fn create_barcode(payload: Payload, config: &CreatorConfig) -> Result<Symbol, BarcodeError> {
    let format = config.format;
    let symbol = match format {
        BarcodeFormat::QRCode | BarcodeFormat::QRCodeModel2 => create_qr(payload, config)?,
        BarcodeFormat::Code128 => create_code128(payload, config)?,
        BarcodeFormat::EAN13 | BarcodeFormat::EAN8 | BarcodeFormat::UPCA => create_ean(payload, format)?,
        _ => return Err(unsupported(format))
    };
    debug!(
        "created {} symbol of {}x{} modules",
        symbol.format,
        symbol.modules.width(),
        symbol.modules.height()
    );
    Ok(symbol)
}

/// Split `data` over `parts` QR symbols linked by structured append
///
/// Every symbol carries the same parity byte, the XOR of the whole
/// message, so readers can tell sequences apart.
pub fn create_structured_append(
    data: &[u8], parts: u8, config: &CreatorConfig
) -> Result<Vec<Symbol>, BarcodeError> {
    if !matches!(config.format, BarcodeFormat::QRCode | BarcodeFormat::QRCodeModel2) {
        return Err(unsupported(config.format));
    }
    if parts == 0 || parts > 16 || usize::from(parts) > data.len() {
        return Err(BarcodeError::InvalidInput(format!(
            "can not split {} bytes into {parts} symbols",
            data.len()
        )));
    }
    let parity = data.iter().fold(0u8, |acc, b| acc ^ b);
    let chunk = data.len().div_ceil(usize::from(parts));

    let mut chunks: Vec<&[u8]> = data.chunks(chunk).collect();
    // rounding up may leave fewer chunks than parts
    while chunks.len() < usize::from(parts) {
        let Some(pos) = chunks.iter().position(|c| c.len() > 1) else {
            break;
        };
        let (a, b) = chunks[pos].split_at(chunks[pos].len() / 2);
        chunks.splice(pos..=pos, [a, b]);
    }
    chunks
        .iter()
        .enumerate()
        .map(|(index, part)| {
            let part_config = config
                .clone()
                .set_structured_append(index as u8, parts, parity);
            create_barcode(Payload::Bytes(part), &part_config)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::decoder::decode_grid;

    #[test]
    fn qr_from_text() {
        let symbol = create_barcode(Payload::Text("HELLO"), &CreatorConfig::default()).unwrap();
        assert_eq!(symbol.format(), BarcodeFormat::QRCode);
        assert_eq!(symbol.modules().width(), 21);
        assert_eq!(symbol.ec_level(), "L");
        assert_eq!(symbol.version(), "1");
        assert_eq!(symbol.quiet_zone(), 4);
        assert!(!symbol.is_linear());

        let grid = decode_grid(symbol.modules(), CharacterSet::Unknown).unwrap();
        assert_eq!(grid.content.bytes(), b"HELLO");
        assert!(!grid.content.has_eci());
    }

    #[test]
    fn qr_levels_and_eci() {
        let config = CreatorConfig::default().set_ec_level("h");
        let symbol = create_barcode(Payload::Text("h\u{e9}llo"), &config).unwrap();
        assert_eq!(symbol.ec_level(), "H");
        let grid = decode_grid(symbol.modules(), CharacterSet::Unknown).unwrap();
        assert!(grid.content.has_eci());
        assert_eq!(grid.content.bytes(), "h\u{e9}llo".as_bytes());

        let config = CreatorConfig::default().set_ec_level("5");
        let symbol = create_barcode(Payload::Text("x"), &config).unwrap();
        assert_eq!(symbol.ec_level(), "Q");

        let config = CreatorConfig::default().set_ec_level("Z");
        assert!(matches!(
            create_barcode(Payload::Text("x"), &config),
            Err(BarcodeError::InvalidInput(_))
        ));
    }

    #[test]
    fn linear_symbols_carry_text() {
        let config = CreatorConfig::new(BarcodeFormat::Code128);
        let symbol = create_barcode(Payload::Text("Code 128"), &config).unwrap();
        assert!(symbol.is_linear());
        assert_eq!(symbol.text(), "Code 128");
        assert_eq!(symbol.quiet_zone(), 10);

        let config = CreatorConfig::new(BarcodeFormat::EAN13);
        let symbol = create_barcode(Payload::Bytes(b"400638133393"), &config).unwrap();
        assert_eq!(symbol.text(), "4006381333931");
        assert_eq!(symbol.modules().width(), 95);
    }

    #[test]
    fn unsupported_formats() {
        for format in [BarcodeFormat::None, BarcodeFormat::PDF417, BarcodeFormat::Aztec] {
            let err = create_barcode(Payload::Text("x"), &CreatorConfig::new(format)).unwrap_err();
            assert!(matches!(err, BarcodeError::Unsupported(_)));
            assert!(err.message().starts_with("Unsupported format: "));
        }
    }

    #[test]
    fn structured_append_parts() {
        let data = b"a message split over several symbols";
        let symbols = create_structured_append(data, 3, &CreatorConfig::default()).unwrap();
        assert_eq!(symbols.len(), 3);

        let mut joined = Vec::new();
        for (i, symbol) in symbols.iter().enumerate() {
            let grid = decode_grid(symbol.modules(), CharacterSet::Unknown).unwrap();
            let sequence = grid.sequence.unwrap();
            assert_eq!(usize::from(sequence.index), i);
            assert_eq!(sequence.count, 3);
            joined.extend_from_slice(grid.content.bytes());
        }
        assert_eq!(joined, data);

        assert!(create_structured_append(b"ab", 3, &CreatorConfig::default()).is_err());
        let code128 = CreatorConfig::new(BarcodeFormat::Code128);
        assert!(create_structured_append(data, 2, &code128).is_err());
    }
}
