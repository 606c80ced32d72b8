/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Records returned across the boundary
//!
//! Every record owns its buffers and carries [`SCHEMA_VERSION`]. Fields
//! are only ever added, with defaults that keep older readers working.
use zune_barcode::{BarcodeFormat, ContentType};

use crate::errors::ErrorDescriptor;
use crate::SCHEMA_VERSION;

/// A pixel coordinate
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Point {
    pub x: i32,
    pub y: i32
}

/// Corners of a symbol in image coordinates
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Quadrilateral {
    pub top_left:     Point,
    pub top_right:    Point,
    pub bottom_right: Point,
    pub bottom_left:  Point
}

/// An 8 bit luminance image owned by a result
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct LumaImage {
    pub width:  usize,
    pub height: usize,
    pub pixels: Vec<u8>
}

impl LumaImage {
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
}

/// The outcome of decoding one symbol
///
/// Symbols outside a structured append sequence report a sequence
/// size of 1, index 0 and an empty id.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DecodedSymbol {
    pub schema_version:       u32,
    pub is_valid:             bool,
    /// Empty unless decoding this symbol, or the whole call, failed
    pub error:                ErrorDescriptor,
    pub format:               BarcodeFormat,
    /// Payload as stored in the symbol
    pub bytes:                Vec<u8>,
    /// Payload in ECI protocol form, with ECI escape sequences
    pub bytes_eci:            Vec<u8>,
    pub text:                 String,
    pub ec_level:             String,
    pub content_type:         ContentType,
    pub has_eci:              bool,
    pub position:             Quadrilateral,
    /// Rotation in degrees
    pub orientation:          i32,
    pub is_mirrored:          bool,
    pub is_inverted:          bool,
    pub symbology_identifier: String,
    pub sequence_size:        i32,
    pub sequence_index:       i32,
    pub sequence_id:          String,
    pub reader_init:          bool,
    /// Scan lines a linear symbol was seen on
    pub line_count:           i32,
    pub version:              String,
    /// Module grid of the symbol, only when requested
    pub symbol_image:         Option<LumaImage>
}

impl Default for DecodedSymbol {
    fn default() -> Self {
        DecodedSymbol {
            schema_version:       SCHEMA_VERSION,
            is_valid:             false,
            error:                ErrorDescriptor::default(),
            format:               BarcodeFormat::None,
            bytes:                Vec::new(),
            bytes_eci:            Vec::new(),
            text:                 String::new(),
            ec_level:             String::new(),
            content_type:         ContentType::default(),
            has_eci:              false,
            position:             Quadrilateral::default(),
            orientation:          0,
            is_mirrored:          false,
            is_inverted:          false,
            symbology_identifier: String::new(),
            sequence_size:        1,
            sequence_index:       0,
            sequence_id:          String::new(),
            reader_init:          false,
            line_count:           0,
            version:              String::new(),
            symbol_image:         None
        }
    }
}

impl DecodedSymbol {
    /// A result that only reports `error`
    pub fn from_error(error: ErrorDescriptor) -> DecodedSymbol {
        DecodedSymbol {
            error,
            ..DecodedSymbol::default()
        }
    }
}

/// The outcome of an encode call
///
/// When creation or rendering failed, `error` is set and every
/// representation is empty.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EncodedSymbol {
    pub schema_version: u32,
    pub error:          ErrorDescriptor,
    pub format:         BarcodeFormat,
    /// SVG document, when requested
    pub svg:            String,
    /// Block character art, when requested
    pub utf8:           String,
    /// PNG file bytes, when requested
    pub image:          Vec<u8>,
    /// The rendered bitmap, always produced on success
    pub bitmap:         LumaImage,
    /// One byte per module, 0 for dark, without quiet zone
    pub symbol:         LumaImage,
    pub ec_level:       String,
    pub version:        String
}

impl Default for EncodedSymbol {
    fn default() -> Self {
        EncodedSymbol {
            schema_version: SCHEMA_VERSION,
            error:          ErrorDescriptor::default(),
            format:         BarcodeFormat::None,
            svg:            String::new(),
            utf8:           String::new(),
            image:          Vec::new(),
            bitmap:         LumaImage::default(),
            symbol:         LumaImage::default(),
            ec_level:       String::new(),
            version:        String::new()
        }
    }
}

impl EncodedSymbol {
    pub fn from_error(error: ErrorDescriptor) -> EncodedSymbol {
        EncodedSymbol {
            error,
            ..EncodedSymbol::default()
        }
    }

    pub fn is_valid(&self) -> bool {
        self.error.is_empty()
    }
}
