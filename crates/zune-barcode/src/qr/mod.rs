/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! QR Code (ISO/IEC 18004) reading and writing
//!
//! Versions 1 to 40 are supported at all four error correction
//! levels, including ECI, FNC1 and structured append headers.
//! Micro QR and rMQR are not handled.
pub use version::EcLevel;

pub mod decoder;
pub mod detector;
pub mod encoder;
pub mod format_info;
pub mod mask;
pub mod matrix;
pub mod reader;
pub mod reed_solomon;
pub mod version;

// segment mode indicators, four bits each
pub(crate) const MODE_TERMINATOR: u8 = 0b0000;
pub(crate) const MODE_NUMERIC: u8 = 0b0001;
pub(crate) const MODE_ALPHANUMERIC: u8 = 0b0010;
pub(crate) const MODE_STRUCTURED_APPEND: u8 = 0b0011;
pub(crate) const MODE_BYTE: u8 = 0b0100;
pub(crate) const MODE_FNC1_FIRST: u8 = 0b0101;
pub(crate) const MODE_ECI: u8 = 0b0111;
pub(crate) const MODE_KANJI: u8 = 0b1000;
pub(crate) const MODE_FNC1_SECOND: u8 = 0b1001;
pub(crate) const MODE_HANZI: u8 = 0b1101;

/// Characters encodable in alphanumeric mode, by value
#[rustfmt::skip]
pub(crate) const ALPHANUMERIC_CHARSET: &[u8; 45] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:";
