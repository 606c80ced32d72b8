/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decode and encode request options
//!
//! Both records follow the same shape: private fields, `get_*`
//! accessors and chained `set_*` builders. Values arriving as raw
//! integers go through the `*_raw` setters, which fall back to the
//! documented default for anything out of range.
use zune_barcode::{
    BarcodeFormat, BarcodeFormats, Binarizer, CharacterSet, CreatorConfig, EanAddOnSymbol,
    ReaderConfig, RenderConfig, TextMode
};

use crate::errors::BridgeError;

/// Which formats a decode call accepts
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatSelector {
    /// A typed set, empty means every format
    Formats(BarcodeFormats),
    /// Names, labels or groups separated by `,`, `|` or spaces,
    /// checked when the call starts
    Names(String)
}

impl Default for FormatSelector {
    fn default() -> Self {
        FormatSelector::Formats(BarcodeFormats::empty())
    }
}

impl FormatSelector {
    /// The selected set, unknown names are an unsupported format error
    pub fn resolve(&self) -> Result<BarcodeFormats, BridgeError> {
        match self {
            FormatSelector::Formats(formats) => Ok(*formats),
            FormatSelector::Names(names) => BarcodeFormats::parse(names)
                .map_err(|e| BridgeError::UnsupportedFormat(e.message().to_string()))
        }
    }
}

/// The single format an encode call should produce
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FormatRequest {
    Format(BarcodeFormat),
    /// A discriminant received from the host
    Raw(u32),
    /// A name or label received from the host
    Name(String)
}

impl Default for FormatRequest {
    fn default() -> Self {
        FormatRequest::Format(BarcodeFormat::None)
    }
}

impl FormatRequest {
    /// The requested format if the engine can create it
    pub fn resolve(&self) -> Result<BarcodeFormat, BridgeError> {
        let format = match self {
            FormatRequest::Format(format) => *format,
            FormatRequest::Raw(raw) => BarcodeFormat::from_raw(*raw)
                .ok_or_else(|| BridgeError::UnsupportedFormat(format!("Unsupported format: {raw}")))?,
            FormatRequest::Name(name) => BarcodeFormat::parse(name)
                .map_err(|e| BridgeError::UnsupportedFormat(e.message().to_string()))?
        };
        if !format.can_create() {
            return Err(BridgeError::UnsupportedFormat(format!("Unsupported format: {format}")));
        }
        Ok(format)
    }
}

/// Options of a decode call
///
/// ```
/// use zune_barcode_bridge::ReaderOptions;
///
/// let options = ReaderOptions::default().set_format_names("QRCode, EAN-13").set_try_rotate(false);
/// assert!(!options.get_try_rotate());
/// assert_eq!(options.get_max_number_of_symbols(), 255);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReaderOptions {
    /// Accepted symbologies
    ///
    /// - Default value: every format
    formats:                    FormatSelector,
    /// - Default value: true
    try_harder:                 bool,
    /// - Default value: true
    try_rotate:                 bool,
    /// - Default value: true
    try_invert:                 bool,
    /// - Default value: true
    try_downscale:              bool,
    /// - Default value: false
    try_denoise:                bool,
    /// - Default value: false
    is_pure:                    bool,
    /// - Default value: true
    try_code39_extended_mode:   bool,
    /// - Default value: false
    validate_optional_checksum: bool,
    /// Include symbols that were found but failed to decode
    ///
    /// - Default value: false
    return_errors:              bool,
    /// - Default value: 500
    downscale_threshold:        u16,
    /// - Default value: 3
    downscale_factor:           u8,
    /// - Default value: 2
    min_line_count:             u8,
    /// Stop after this many symbols, 0 means no limit
    ///
    /// - Default value: 255
    max_number_of_symbols:      u8,
    binarizer:                  Binarizer,
    ean_add_on_symbol:          EanAddOnSymbol,
    text_mode:                  TextMode,
    /// Character set of payloads without ECI, `Unknown` guesses
    character_set:              CharacterSet,
    /// Attach the module grid of each symbol to its result
    ///
    /// - Default value: false
    return_symbol_image:        bool
}

impl Default for ReaderOptions {
    fn default() -> Self {
        let config = ReaderConfig::default();
        ReaderOptions {
            formats:                    FormatSelector::default(),
            try_harder:                 config.get_try_harder(),
            try_rotate:                 config.get_try_rotate(),
            try_invert:                 config.get_try_invert(),
            try_downscale:              config.get_try_downscale(),
            try_denoise:                config.get_try_denoise(),
            is_pure:                    config.get_is_pure(),
            try_code39_extended_mode:   config.get_try_code39_extended_mode(),
            validate_optional_checksum: config.get_validate_optional_checksum(),
            return_errors:              config.get_return_errors(),
            downscale_threshold:        config.get_downscale_threshold(),
            downscale_factor:           config.get_downscale_factor(),
            min_line_count:             config.get_min_line_count(),
            max_number_of_symbols:      config.get_max_number_of_symbols(),
            binarizer:                  config.get_binarizer(),
            ean_add_on_symbol:          config.get_ean_add_on_symbol(),
            text_mode:                  config.get_text_mode(),
            character_set:              config.get_character_set(),
            return_symbol_image:        config.get_return_symbol_image()
        }
    }
}

impl ReaderOptions {
    pub fn get_formats(&self) -> &FormatSelector {
        &self.formats
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

    pub const fn get_try_code39_extended_mode(&self) -> bool {
        self.try_code39_extended_mode
    }

    pub const fn get_validate_optional_checksum(&self) -> bool {
        self.validate_optional_checksum
    }

    pub const fn get_return_errors(&self) -> bool {
        self.return_errors
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

    pub const fn get_binarizer(&self) -> Binarizer {
        self.binarizer
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
        self.formats = FormatSelector::Formats(formats);
        self
    }

    /// Select formats by name, the list is checked when decoding starts
    pub fn set_format_names(mut self, names: impl Into<String>) -> Self {
        self.formats = FormatSelector::Names(names.into());
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

    pub fn set_downscale_threshold(mut self, threshold: u16) -> Self {
        self.downscale_threshold = threshold;
        self
    }

    pub fn set_downscale_factor(mut self, factor: u8) -> Self {
        self.downscale_factor = factor;
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

    pub fn set_binarizer(mut self, binarizer: Binarizer) -> Self {
        self.binarizer = binarizer;
        self
    }

    pub fn set_binarizer_raw(self, raw: u32) -> Self {
        self.set_binarizer(Binarizer::from_raw(raw).unwrap_or_default())
    }

    pub fn set_ean_add_on_symbol(mut self, symbol: EanAddOnSymbol) -> Self {
        self.ean_add_on_symbol = symbol;
        self
    }

    pub fn set_ean_add_on_symbol_raw(self, raw: u32) -> Self {
        self.set_ean_add_on_symbol(EanAddOnSymbol::from_raw(raw).unwrap_or_default())
    }

    pub fn set_text_mode(mut self, mode: TextMode) -> Self {
        self.text_mode = mode;
        self
    }

    pub fn set_text_mode_raw(self, raw: u32) -> Self {
        self.set_text_mode(TextMode::from_raw(raw).unwrap_or_default())
    }

    pub fn set_character_set(mut self, charset: CharacterSet) -> Self {
        self.character_set = charset;
        self
    }

    pub fn set_character_set_raw(self, raw: u32) -> Self {
        self.set_character_set(CharacterSet::from_raw(raw).unwrap_or_default())
    }

    pub fn set_return_symbol_image(mut self, yes: bool) -> Self {
        self.return_symbol_image = yes;
        self
    }

    /// The engine configuration for these options
    ///
    /// Fails when the format selector names an unknown format.
    pub fn to_config(&self) -> Result<ReaderConfig, BridgeError> {
        Ok(ReaderConfig::default()
            .set_formats(self.formats.resolve()?)
            .set_try_harder(self.try_harder)
            .set_try_rotate(self.try_rotate)
            .set_try_invert(self.try_invert)
            .set_try_downscale(self.try_downscale)
            .set_try_denoise(self.try_denoise)
            .set_is_pure(self.is_pure)
            .set_try_code39_extended_mode(self.try_code39_extended_mode)
            .set_validate_optional_checksum(self.validate_optional_checksum)
            .set_return_errors(self.return_errors)
            .set_downscale_threshold(self.downscale_threshold)
            .set_downscale_factor(self.downscale_factor)
            .set_min_line_count(self.min_line_count)
            .set_max_number_of_symbols(self.max_number_of_symbols)
            .set_binarizer(self.binarizer)
            .set_ean_add_on_symbol(self.ean_add_on_symbol)
            .set_text_mode(self.text_mode)
            .set_character_set(self.character_set)
            .set_return_symbol_image(self.return_symbol_image))
    }
}

/// Options of an encode call
///
/// Creation options are used once to build the symbol, rendering
/// options are applied to every representation that is produced.
///
/// ```
/// use zune_barcode::BarcodeFormat;
/// use zune_barcode_bridge::WriterOptions;
///
/// let options = WriterOptions::new(BarcodeFormat::QRCode).set_scale(4).set_with_svg(false);
/// assert_eq!(options.get_scale(), 4);
/// ```
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WriterOptions {
    /// The one format to create, unset is an error
    format:           FormatRequest,
    /// - Default value: false
    reader_init:      bool,
    /// - Default value: false
    force_square:     bool,
    /// `L`, `M`, `Q`, `H` or a digit `0..=8`, empty picks the default
    ec_level:         String,
    /// Character set text is converted to
    ///
    /// - Default value: UTF8
    character_set:    CharacterSet,
    /// - Default value: false
    gs1:              bool,
    /// Pixels per module, 0 derives it from `size_hint`
    ///
    /// - Default value: 0
    scale:            u16,
    /// Minimum width in pixels when `scale` is 0
    ///
    /// - Default value: 200
    size_hint:        u16,
    /// Clockwise quarter turns
    rotate:           i32,
    /// - Default value: false
    with_hrt:         bool,
    /// - Default value: true
    with_quiet_zones: bool,
    /// Produce the SVG representation
    ///
    /// - Default value: true
    with_svg:         bool,
    /// Produce the block character representation
    ///
    /// - Default value: false
    with_utf8:        bool,
    /// Produce the PNG representation
    ///
    /// - Default value: true
    with_image:       bool
}

impl Default for WriterOptions {
    fn default() -> Self {
        let render = RenderConfig::default();
        WriterOptions {
            format:           FormatRequest::default(),
            reader_init:      false,
            force_square:     false,
            ec_level:         String::new(),
            character_set:    CharacterSet::UTF8,
            gs1:              false,
            scale:            render.get_scale(),
            size_hint:        render.get_size_hint(),
            rotate:           0,
            with_hrt:         render.get_with_hrt(),
            with_quiet_zones: render.get_with_quiet_zones(),
            with_svg:         true,
            with_utf8:        false,
            with_image:       true
        }
    }
}

impl WriterOptions {
    pub fn new(format: BarcodeFormat) -> WriterOptions {
        WriterOptions::default().set_format(format)
    }

    pub fn get_format(&self) -> &FormatRequest {
        &self.format
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

    pub const fn get_scale(&self) -> u16 {
        self.scale
    }

    pub const fn get_size_hint(&self) -> u16 {
        self.size_hint
    }

    pub const fn get_rotate(&self) -> i32 {
        self.rotate
    }

    pub const fn get_with_hrt(&self) -> bool {
        self.with_hrt
    }

    pub const fn get_with_quiet_zones(&self) -> bool {
        self.with_quiet_zones
    }

    pub const fn get_with_svg(&self) -> bool {
        self.with_svg
    }

    pub const fn get_with_utf8(&self) -> bool {
        self.with_utf8
    }

    pub const fn get_with_image(&self) -> bool {
        self.with_image
    }

    pub fn set_format(mut self, format: BarcodeFormat) -> Self {
        self.format = FormatRequest::Format(format);
        self
    }

    /// Request a format by discriminant, checked when encoding starts
    pub fn set_format_raw(mut self, raw: u32) -> Self {
        self.format = FormatRequest::Raw(raw);
        self
    }

    /// Request a format by name or label, checked when encoding starts
    pub fn set_format_name(mut self, name: impl Into<String>) -> Self {
        self.format = FormatRequest::Name(name.into());
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

    /// Set the character set by discriminant, unknown values select UTF-8
    pub fn set_character_set_raw(self, raw: u32) -> Self {
        self.set_character_set(CharacterSet::from_raw(raw).unwrap_or(CharacterSet::UTF8))
    }

    pub fn set_gs1(mut self, yes: bool) -> Self {
        self.gs1 = yes;
        self
    }

    pub fn set_scale(mut self, scale: u16) -> Self {
        self.scale = scale;
        self
    }

    pub fn set_size_hint(mut self, hint: u16) -> Self {
        self.size_hint = hint;
        self
    }

    pub fn set_rotate(mut self, quarter_turns: i32) -> Self {
        self.rotate = quarter_turns;
        self
    }

    pub fn set_with_hrt(mut self, yes: bool) -> Self {
        self.with_hrt = yes;
        self
    }

    pub fn set_with_quiet_zones(mut self, yes: bool) -> Self {
        self.with_quiet_zones = yes;
        self
    }

    pub fn set_with_svg(mut self, yes: bool) -> Self {
        self.with_svg = yes;
        self
    }

    pub fn set_with_utf8(mut self, yes: bool) -> Self {
        self.with_utf8 = yes;
        self
    }

    pub fn set_with_image(mut self, yes: bool) -> Self {
        self.with_image = yes;
        self
    }

    /// Creation half of the options
    ///
    /// Fails with an unsupported format error when the format is unset,
    /// unknown or can not be created.
    pub fn to_creator_config(&self) -> Result<CreatorConfig, BridgeError> {
        Ok(CreatorConfig::new(self.format.resolve()?)
            .set_reader_init(self.reader_init)
            .set_force_square(self.force_square)
            .set_ec_level(self.ec_level.as_str())
            .set_character_set(self.character_set)
            .set_gs1(self.gs1))
    }

    /// Rendering half of the options
    pub fn to_render_config(&self) -> RenderConfig {
        RenderConfig::default()
            .set_scale(self.scale)
            .set_size_hint(self.size_hint)
            .set_rotate(self.rotate)
            .set_with_hrt(self.with_hrt)
            .set_with_quiet_zones(self.with_quiet_zones)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    #[test]
    fn reader_defaults_match_the_engine() {
        let options = ReaderOptions::default();
        assert!(options.get_try_harder());
        assert!(!options.get_is_pure());
        assert_eq!(options.get_downscale_threshold(), 500);
        assert_eq!(options.get_min_line_count(), 2);
        assert_eq!(options.get_text_mode(), TextMode::HRI);
        assert_eq!(options.get_character_set(), CharacterSet::Unknown);
        assert!(options.to_config().unwrap().get_formats().is_empty());
    }

    #[test]
    fn raw_values_fall_back_to_defaults() {
        let options = ReaderOptions::default()
            .set_binarizer_raw(2)
            .set_text_mode_raw(99)
            .set_character_set_raw(1000);
        assert_eq!(options.get_binarizer(), Binarizer::FixedThreshold);
        assert_eq!(options.get_text_mode(), TextMode::HRI);
        assert_eq!(options.get_character_set(), CharacterSet::Unknown);
    }

    #[test]
    fn format_names_are_checked_on_use() {
        let options = ReaderOptions::default().set_format_names("QR Code | EAN-13");
        let formats = options.to_config().unwrap().get_formats();
        assert!(formats.contains(BarcodeFormat::QRCode));
        assert!(formats.contains(BarcodeFormat::EAN13));
        assert!(!formats.contains(BarcodeFormat::Code128));

        let err = ReaderOptions::default()
            .set_format_names("QRCode, Bogus")
            .to_config()
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn writer_format_must_be_creatable() {
        assert_eq!(
            WriterOptions::default().to_creator_config().unwrap_err().kind(),
            ErrorKind::UnsupportedFormat
        );
        for options in [
            WriterOptions::default().set_format_raw(9999),
            WriterOptions::default().set_format_name("Bogus"),
            WriterOptions::new(BarcodeFormat::DataMatrix)
        ] {
            let err = options.to_creator_config().unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
            assert!(err.message().starts_with("Unsupported format: "));
        }
        let config = WriterOptions::default()
            .set_format_name("ean-13")
            .to_creator_config()
            .unwrap();
        assert_eq!(config.get_format(), BarcodeFormat::EAN13);
    }
}
