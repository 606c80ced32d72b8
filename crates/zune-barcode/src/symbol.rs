/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A single located (and possibly decoded) symbol
use crate::bitmatrix::BitMatrix;
use crate::content::{Content, ContentType, SymbologyIdentifier, TextMode};
use crate::errors::BarcodeError;
use crate::format::BarcodeFormat;
use crate::geometry::Position;

/// Structured append bookkeeping of a symbol
///
/// Symbols that are not part of a sequence carry `index == -1`
/// and `count == -1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuredAppendInfo {
    pub index: i32,
    pub count: i32,
    pub id:    String
}

impl Default for StructuredAppendInfo {
    fn default() -> Self {
        StructuredAppendInfo {
            index: -1,
            count: -1,
            id:    String::new()
        }
    }
}

/// The outcome of reading one symbol
///
/// A symbol that was located but failed to decode is still reported
/// with its position and an [`error`](Barcode::error), readers drop
/// these unless asked to return errors.
#[derive(Clone, Debug)]
pub struct Barcode {
    format:            BarcodeFormat,
    content:           Content,
    error:             Option<BarcodeError>,
    position:          Position,
    ec_level:          String,
    version:           String,
    mirrored:          bool,
    inverted:          bool,
    reader_init:       bool,
    line_count:        i32,
    structured_append: StructuredAppendInfo,
    text_mode:         TextMode,
    symbol:            Option<BitMatrix>
}

impl Barcode {
    pub fn new(format: BarcodeFormat, content: Content, position: Position) -> Barcode {
        Barcode {
            format,
            content,
            error: None,
            position,
            ec_level: String::new(),
            version: String::new(),
            mirrored: false,
            inverted: false,
            reader_init: false,
            line_count: 0,
            structured_append: StructuredAppendInfo::default(),
            text_mode: TextMode::default(),
            symbol: None
        }
    }

    /// A symbol that was located but could not be decoded
    pub fn failed(format: BarcodeFormat, error: BarcodeError, position: Position) -> Barcode {
        let mut barcode = Barcode::new(format, Content::default(), position);
        barcode.error = Some(error);
        barcode
    }

    pub fn with_ec_level(mut self, level: impl Into<String>) -> Self {
        self.ec_level = level.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_mirrored(mut self, yes: bool) -> Self {
        self.mirrored = yes;
        self
    }

    pub fn with_reader_init(mut self, yes: bool) -> Self {
        self.reader_init = yes;
        self
    }

    pub fn with_line_count(mut self, count: i32) -> Self {
        self.line_count = count;
        self
    }

    pub fn with_structured_append(mut self, info: StructuredAppendInfo) -> Self {
        self.structured_append = info;
        self
    }

    pub fn with_symbol(mut self, symbol: BitMatrix) -> Self {
        self.symbol = Some(symbol);
        self
    }

    pub(crate) fn set_inverted(&mut self, yes: bool) {
        self.inverted = yes;
    }

    pub(crate) fn set_text_mode(&mut self, mode: TextMode) {
        self.text_mode = mode;
    }

    pub(crate) fn set_position(&mut self, position: Position) {
        self.position = position;
    }

    pub(crate) fn content_mut(&mut self) -> &mut Content {
        &mut self.content
    }

    pub(crate) fn take_symbol(&mut self) -> Option<BitMatrix> {
        self.symbol.take()
    }

    pub fn is_valid(&self) -> bool {
        self.format != BarcodeFormat::None && self.error.is_none()
    }

    pub const fn format(&self) -> BarcodeFormat {
        self.format
    }

    pub const fn error(&self) -> Option<&BarcodeError> {
        self.error.as_ref()
    }

    pub fn bytes(&self) -> &[u8] {
        self.content.bytes()
    }

    pub fn bytes_eci(&self) -> Vec<u8> {
        self.content.bytes_eci()
    }

    /// Text in the mode configured when reading
    pub fn text(&self) -> String {
        self.content.text(self.text_mode)
    }

    /// Text in an explicit mode
    pub fn text_as(&self, mode: TextMode) -> String {
        self.content.text(mode)
    }

    pub fn content_type(&self) -> ContentType {
        self.content.content_type()
    }

    pub fn has_eci(&self) -> bool {
        self.content.has_eci()
    }

    pub fn symbology_identifier(&self) -> String {
        self.content.symbology().to_string(self.content.has_eci())
    }

    pub(crate) fn symbology(&self) -> SymbologyIdentifier {
        self.content.symbology()
    }

    pub const fn position(&self) -> &Position {
        &self.position
    }

    pub fn orientation(&self) -> i32 {
        self.position.orientation()
    }

    pub fn ec_level(&self) -> &str {
        &self.ec_level
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub const fn is_mirrored(&self) -> bool {
        self.mirrored
    }

    pub const fn is_inverted(&self) -> bool {
        self.inverted
    }

    pub const fn reader_init(&self) -> bool {
        self.reader_init
    }

    pub const fn line_count(&self) -> i32 {
        self.line_count
    }

    pub const fn structured_append(&self) -> &StructuredAppendInfo {
        &self.structured_append
    }

    pub const fn sequence_index(&self) -> i32 {
        self.structured_append.index
    }

    pub const fn sequence_size(&self) -> i32 {
        self.structured_append.count
    }

    pub fn sequence_id(&self) -> &str {
        &self.structured_append.id
    }

    /// Module grid of the symbol, present only when requested
    pub const fn symbol(&self) -> Option<&BitMatrix> {
        self.symbol.as_ref()
    }

    /// Whether two reads are the same physical symbol, used to drop
    /// duplicates found by different scan passes
    pub(crate) fn same_symbol(&self, other: &Barcode) -> bool {
        if self.format != other.format || self.bytes() != other.bytes() {
            return false;
        }
        if self.error.is_some() != other.error.is_some() {
            return false;
        }
        let center = self.position.center();
        let other_center = other.position.center();
        let size = f64::from(
            (self.position.top_right.x - self.position.top_left.x).abs()
                + (self.position.bottom_left.y - self.position.top_left.y).abs()
        )
        .max(8.0);
        // linear codes are found once per scan line, so any overlap counts
        self.format.is_linear() || center.distance(other_center) < size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_symbols_are_invalid() {
        let barcode = Barcode::failed(
            BarcodeFormat::QRCode,
            BarcodeError::Checksum("too many errors".to_string()),
            Position::rect(0, 0, 20, 20)
        );
        assert!(!barcode.is_valid());
        assert_eq!(barcode.sequence_size(), -1);
        assert_eq!(barcode.text(), "");
        assert_eq!(barcode.symbology_identifier(), "");
    }

    #[test]
    fn valid_symbol_reports_content() {
        let content = Content::from_bytes(b"ABC", SymbologyIdentifier::new(b'Q', b'1', 1));
        let barcode = Barcode::new(BarcodeFormat::QRCode, content, Position::rect(0, 0, 20, 20))
            .with_ec_level("M")
            .with_version("1");
        assert!(barcode.is_valid());
        assert_eq!(barcode.text(), "ABC");
        assert_eq!(barcode.symbology_identifier(), "]Q1");
        assert_eq!(barcode.orientation(), 0);
    }
}
