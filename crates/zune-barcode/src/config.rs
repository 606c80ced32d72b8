/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Reader configuration
use crate::binarizer::Binarizer;
use crate::charset::CharacterSet;
use crate::content::TextMode;
use crate::format::BarcodeFormats;

/// What to do with the two or five digit add-on next to an EAN/UPC symbol
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum EanAddOnSymbol {
    /// Read the main symbol and ignore any add-on
    #[default]
    Ignore = 0,
    /// Read the add-on when present
    Read = 1,
    /// Only report symbols that carry an add-on
    Require = 2
}

impl EanAddOnSymbol {
    pub fn from_raw(value: u32) -> Option<EanAddOnSymbol> {
        match value {
            0 => Some(EanAddOnSymbol::Ignore),
            1 => Some(EanAddOnSymbol::Read),
            2 => Some(EanAddOnSymbol::Require),
            _ => None
        }
    }

    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            EanAddOnSymbol::Ignore => "Ignore",
            EanAddOnSymbol::Read => "Read",
            EanAddOnSymbol::Require => "Require"
        }
    }
}

/// Options influencing how [`read_barcodes`](crate::read_barcodes)
/// searches an image
///
/// Construct with [`ReaderConfig::default`] and refine with the
/// `set_*` builders, e.g.
///
/// ```
/// use zune_barcode::{BarcodeFormat, ReaderConfig};
///
/// let config = ReaderConfig::default()
///     .set_formats(BarcodeFormat::QRCode.into())
///     .set_try_rotate(false);
/// assert!(!config.get_try_rotate());
/// ```
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReaderConfig {
    /// Formats to look for, empty means every readable format
    ///
    /// - Default value: empty
    formats:                    BarcodeFormats,
    /// Spend more time looking for symbols, scans more lines
    /// for linear codes and tries a second binarizer
    ///
    /// - Default value: true
    try_harder:                 bool,
    /// Also look for symbols rotated by 90, 180 and 270 degrees
    ///
    /// - Default value: true
    try_rotate:                 bool,
    /// Also look for light-on-dark symbols
    ///
    /// - Default value: true
    try_invert:                 bool,
    /// Retry on downscaled copies of large images
    ///
    /// - Default value: true
    try_downscale:              bool,
    /// Close small gaps in the binarized image before searching
    ///
    /// - Default value: false
    try_denoise:                bool,
    /// The image contains exactly one axis aligned symbol with
    /// nothing around it but its quiet zone
    ///
    /// - Default value: false
    is_pure:                    bool,
    binarizer:                  Binarizer,
    /// Images whose larger side exceeds this are candidates for downscaling
    ///
    /// - Default value: 500
    downscale_threshold:        u16,
    /// Scale factor used for each downscaling step
    ///
    /// - Default value: 3
    downscale_factor:           u8,
    /// Number of scan lines a linear symbol has to be seen on
    ///
    /// - Default value: 2
    min_line_count:             u8,
    /// Stop after this many symbols, 0 means no limit
    ///
    /// - Default value: 255
    max_number_of_symbols:      u8,
    try_code39_extended_mode:   bool,
    validate_optional_checksum: bool,
    /// Report symbols that were located but failed to decode
    ///
    /// - Default value: false
    return_errors:              bool,
    ean_add_on_symbol:          EanAddOnSymbol,
    text_mode:                  TextMode,
    /// Character set assumed for payloads without an ECI,
    /// `Unknown` means guess
    character_set:              CharacterSet,
    /// Attach the sampled module grid to every result
    ///
    /// - Default value: false
    return_symbol_image:        bool
}

impl Default for ReaderConfig {
    fn default() -> Self {
        ReaderConfig {
            formats:                    BarcodeFormats::empty(),
            try_harder:                 true,
            try_rotate:                 true,
            try_invert:                 true,
            try_downscale:              true,
            try_denoise:                false,
            is_pure:                    false,
            binarizer:                  Binarizer::LocalAverage,
            downscale_threshold:        500,
            downscale_factor:           3,
            min_line_count:             2,
            max_number_of_symbols:      255,
            try_code39_extended_mode:   true,
            validate_optional_checksum: false,
            return_errors:              false,
            ean_add_on_symbol:          EanAddOnSymbol::Ignore,
            text_mode:                  TextMode::HRI,
            character_set:              CharacterSet::Unknown,
            return_symbol_image:        false
        }
    }
}

impl ReaderConfig {
    pub const fn get_formats(&self) -> BarcodeFormats {
        self.formats
    }

    /// The formats a reader should actually look for, an empty
    /// selector resolves to every readable format
    pub fn get_effective_formats(&self) -> BarcodeFormats {
        if self.formats.is_empty() {
            BarcodeFormats::readable()
        } else {
            self.formats.expanded()
        }
    }

    pub const fn get_try_harder(&self) -> bool {
        self.try_harder
    }

    pub const fn get_try_rotate(&self) -> bool {
        self.try_rotate
    }

    pub const fn get_try_invert(&self) -> bool {
        self.try_invert
    }

    pub const fn get_try_downscale(&self) -> bool {
        self.try_downscale
    }

    pub const fn get_try_denoise(&self) -> bool {
        self.try_denoise
    }

    pub const fn get_is_pure(&self) -> bool {
        self.is_pure
    }

    pub const fn get_binarizer(&self) -> Binarizer {
        self.binarizer
    }

    pub const fn get_downscale_threshold(&self) -> u16 {
        self.downscale_threshold
    }

    pub const fn get_downscale_factor(&self) -> u8 {
        self.downscale_factor
    }

    pub const fn get_min_line_count(&self) -> u8 {
        self.min_line_count
    }

    pub const fn get_max_number_of_symbols(&self) -> u8 {
        self.max_number_of_symbols
    }

    pub const fn get_try_code39_extended_mode(&self) -> bool {
        self.try_code39_extended_mode
    }

    pub const fn get_validate_optional_checksum(&self) -> bool {
        self.validate_optional_checksum
    }

    pub const fn get_return_errors(&self) -> bool {
        self.return_errors
    }

    pub const fn get_ean_add_on_symbol(&self) -> EanAddOnSymbol {
        self.ean_add_on_symbol
    }

    pub const fn get_text_mode(&self) -> TextMode {
        self.text_mode
    }

    pub const fn get_character_set(&self) -> CharacterSet {
        self.character_set
    }

    pub const fn get_return_symbol_image(&self) -> bool {
        self.return_symbol_image
    }

    pub fn set_formats(mut self, formats: BarcodeFormats) -> Self {
        self.formats = formats;
        self
    }

    pub fn set_try_harder(mut self, yes: bool) -> Self {
        self.try_harder = yes;
        self
    }

    pub fn set_try_rotate(mut self, yes: bool) -> Self {
        self.try_rotate = yes;
        self
    }

    pub fn set_try_invert(mut self, yes: bool) -> Self {
        self.try_invert = yes;
        self
    }

    pub fn set_try_downscale(mut self, yes: bool) -> Self {
        self.try_downscale = yes;
        self
    }

    pub fn set_try_denoise(mut self, yes: bool) -> Self {
        self.try_denoise = yes;
        self
    }

    pub fn set_is_pure(mut self, yes: bool) -> Self {
        self.is_pure = yes;
        self
    }

    pub fn set_binarizer(mut self, binarizer: Binarizer) -> Self {
        self.binarizer = binarizer;
        self
    }

    pub fn set_downscale_threshold(mut self, threshold: u16) -> Self {
        self.downscale_threshold = threshold;
        self
    }

    /// Set the downscale factor, values below 2 are raised to 2
    pub fn set_downscale_factor(mut self, factor: u8) -> Self {
        self.downscale_factor = factor.max(2);
        self
    }

    pub fn set_min_line_count(mut self, count: u8) -> Self {
        self.min_line_count = count;
        self
    }

    pub fn set_max_number_of_symbols(mut self, count: u8) -> Self {
        self.max_number_of_symbols = count;
        self
    }

    pub fn set_try_code39_extended_mode(mut self, yes: bool) -> Self {
        self.try_code39_extended_mode = yes;
        self
    }

    pub fn set_validate_optional_checksum(mut self, yes: bool) -> Self {
        self.validate_optional_checksum = yes;
        self
    }

    pub fn set_return_errors(mut self, yes: bool) -> Self {
        self.return_errors = yes;
        self
    }

    pub fn set_ean_add_on_symbol(mut self, symbol: EanAddOnSymbol) -> Self {
        self.ean_add_on_symbol = symbol;
        self
    }

    pub fn set_text_mode(mut self, mode: TextMode) -> Self {
        self.text_mode = mode;
        self
    }

    pub fn set_character_set(mut self, charset: CharacterSet) -> Self {
        self.character_set = charset;
        self
    }

    pub fn set_return_symbol_image(mut self, yes: bool) -> Self {
        self.return_symbol_image = yes;
        self
    }
}
