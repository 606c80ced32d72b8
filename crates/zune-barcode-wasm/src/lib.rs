/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Javascript bindings for the barcode bridge
//!
//! Options are classes with property setters, results are classes with
//! property getters. Every buffer a getter returns is a fresh copy
//! owned by javascript.
use log::{debug, info};
use wasm_bindgen::prelude::*;
use web_time::Instant;
use zune_barcode::{BarcodeFormat, CharacterSet};
use zune_barcode_bridge::{
    DecodedSymbol, EncodedSymbol, LumaImage, ReaderOptions, WriterOptions
};

use crate::enums::{
    WasmBinarizer, WasmContentType, WasmEanAddOnSymbol, WasmErrorKind, WasmPixelLayout,
    WasmTextMode
};
use crate::utils::set_panic_hook;

pub mod enums;
mod utils;

#[wasm_bindgen(start)]
pub fn setup()
{
    wasm_logger::init(wasm_logger::Config::default());
    set_panic_hook();
    info!("zune-barcode-wasm is live");
}

/// Options of a decode call
#[wasm_bindgen(js_name=ReaderOptions)]
#[derive(Clone, Default)]
pub struct WasmReaderOptions
{
    options: ReaderOptions
}

impl WasmReaderOptions
{
    fn update(&mut self, f: impl FnOnce(ReaderOptions) -> ReaderOptions)
    {
        self.options = f(std::mem::take(&mut self.options));
    }
}

#[wasm_bindgen(js_class=ReaderOptions)]
impl WasmReaderOptions
{
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmReaderOptions
    {
        WasmReaderOptions::default()
    }

    /// Format names, labels or groups, e.g. `"QRCode, EAN-13"`
    #[wasm_bindgen(setter)]
    pub fn set_formats(&mut self, names: String)
    {
        self.update(|o| o.set_format_names(names));
    }
    #[wasm_bindgen(setter = tryHarder)]
    pub fn set_try_harder(&mut self, yes: bool)
    {
        self.update(|o| o.set_try_harder(yes));
    }
    #[wasm_bindgen(setter = tryRotate)]
    pub fn set_try_rotate(&mut self, yes: bool)
    {
        self.update(|o| o.set_try_rotate(yes));
    }
    #[wasm_bindgen(setter = tryInvert)]
    pub fn set_try_invert(&mut self, yes: bool)
    {
        self.update(|o| o.set_try_invert(yes));
    }
    #[wasm_bindgen(setter = tryDownscale)]
    pub fn set_try_downscale(&mut self, yes: bool)
    {
        self.update(|o| o.set_try_downscale(yes));
    }
    #[wasm_bindgen(setter = tryDenoise)]
    pub fn set_try_denoise(&mut self, yes: bool)
    {
        self.update(|o| o.set_try_denoise(yes));
    }
    #[wasm_bindgen(setter = isPure)]
    pub fn set_is_pure(&mut self, yes: bool)
    {
        self.update(|o| o.set_is_pure(yes));
    }
    #[wasm_bindgen(setter = tryCode39ExtendedMode)]
    pub fn set_try_code39_extended_mode(&mut self, yes: bool)
    {
        self.update(|o| o.set_try_code39_extended_mode(yes));
    }
    #[wasm_bindgen(setter = validateOptionalChecksum)]
    pub fn set_validate_optional_checksum(&mut self, yes: bool)
    {
        self.update(|o| o.set_validate_optional_checksum(yes));
    }
    #[wasm_bindgen(setter = returnErrors)]
    pub fn set_return_errors(&mut self, yes: bool)
    {
        self.update(|o| o.set_return_errors(yes));
    }
    #[wasm_bindgen(setter = downscaleThreshold)]
    pub fn set_downscale_threshold(&mut self, threshold: u16)
    {
        self.update(|o| o.set_downscale_threshold(threshold));
    }
    #[wasm_bindgen(setter = downscaleFactor)]
    pub fn set_downscale_factor(&mut self, factor: u8)
    {
        self.update(|o| o.set_downscale_factor(factor));
    }
    #[wasm_bindgen(setter = minLineCount)]
    pub fn set_min_line_count(&mut self, count: u8)
    {
        self.update(|o| o.set_min_line_count(count));
    }
    #[wasm_bindgen(setter = maxNumberOfSymbols)]
    pub fn set_max_number_of_symbols(&mut self, count: u8)
    {
        self.update(|o| o.set_max_number_of_symbols(count));
    }
    #[wasm_bindgen(setter)]
    pub fn set_binarizer(&mut self, binarizer: WasmBinarizer)
    {
        self.update(|o| o.set_binarizer(binarizer.to_binarizer()));
    }
    #[wasm_bindgen(setter = eanAddOnSymbol)]
    pub fn set_ean_add_on_symbol(&mut self, add_on: WasmEanAddOnSymbol)
    {
        self.update(|o| o.set_ean_add_on_symbol(add_on.to_add_on()));
    }
    #[wasm_bindgen(setter = textMode)]
    pub fn set_text_mode(&mut self, mode: WasmTextMode)
    {
        self.update(|o| o.set_text_mode(mode.to_text_mode()));
    }
    /// Charset name, unknown names fall back to detection
    #[wasm_bindgen(setter = characterSet)]
    pub fn set_character_set(&mut self, name: String)
    {
        let charset = CharacterSet::from_name(&name).unwrap_or_default();
        self.update(|o| o.set_character_set(charset));
    }
    #[wasm_bindgen(setter = returnSymbolImage)]
    pub fn set_return_symbol_image(&mut self, yes: bool)
    {
        self.update(|o| o.set_return_symbol_image(yes));
    }
    #[wasm_bindgen(getter = maxNumberOfSymbols)]
    pub fn get_max_number_of_symbols(&self) -> u8
    {
        self.options.get_max_number_of_symbols()
    }
    #[wasm_bindgen(getter)]
    pub fn binarizer(&self) -> WasmBinarizer
    {
        WasmBinarizer::from_binarizer(self.options.get_binarizer())
    }
    #[wasm_bindgen(getter = eanAddOnSymbol)]
    pub fn ean_add_on_symbol(&self) -> WasmEanAddOnSymbol
    {
        WasmEanAddOnSymbol::from_add_on(self.options.get_ean_add_on_symbol())
    }
    #[wasm_bindgen(getter = textMode)]
    pub fn text_mode(&self) -> WasmTextMode
    {
        WasmTextMode::from_text_mode(self.options.get_text_mode())
    }
}

/// Options of an encode call
#[wasm_bindgen(js_name=WriterOptions)]
#[derive(Clone, Default)]
pub struct WasmWriterOptions
{
    options: WriterOptions
}

impl WasmWriterOptions
{
    fn update(&mut self, f: impl FnOnce(WriterOptions) -> WriterOptions)
    {
        self.options = f(std::mem::take(&mut self.options));
    }
}

#[wasm_bindgen(js_class=WriterOptions)]
impl WasmWriterOptions
{
    /// Options for `format`, a name or label such as `"QRCode"`
    #[wasm_bindgen(constructor)]
    pub fn new(format: Option<String>) -> WasmWriterOptions
    {
        let mut options = WasmWriterOptions::default();
        if let Some(format) = format
        {
            options.set_format(format);
        }
        options
    }

    #[wasm_bindgen(setter)]
    pub fn set_format(&mut self, name: String)
    {
        self.update(|o| o.set_format_name(name));
    }
    #[wasm_bindgen(setter = readerInit)]
    pub fn set_reader_init(&mut self, yes: bool)
    {
        self.update(|o| o.set_reader_init(yes));
    }
    /// Accepted for compatibility, no supported format is rectangular
    #[wasm_bindgen(setter = forceSquare)]
    pub fn set_force_square(&mut self, yes: bool)
    {
        self.update(|o| o.set_force_square(yes));
    }
    #[wasm_bindgen(setter = ecLevel)]
    pub fn set_ec_level(&mut self, level: String)
    {
        self.update(|o| o.set_ec_level(level));
    }
    /// Charset name, unknown names fall back to UTF-8
    #[wasm_bindgen(setter = characterSet)]
    pub fn set_character_set(&mut self, name: String)
    {
        let charset = CharacterSet::from_name(&name).unwrap_or(CharacterSet::UTF8);
        self.update(|o| o.set_character_set(charset));
    }
    #[wasm_bindgen(setter)]
    pub fn set_gs1(&mut self, yes: bool)
    {
        self.update(|o| o.set_gs1(yes));
    }
    #[wasm_bindgen(setter)]
    pub fn set_scale(&mut self, scale: u16)
    {
        self.update(|o| o.set_scale(scale));
    }
    #[wasm_bindgen(setter = sizeHint)]
    pub fn set_size_hint(&mut self, hint: u16)
    {
        self.update(|o| o.set_size_hint(hint));
    }
    /// Clockwise quarter turns
    #[wasm_bindgen(setter)]
    pub fn set_rotate(&mut self, quarter_turns: i32)
    {
        self.update(|o| o.set_rotate(quarter_turns));
    }
    #[wasm_bindgen(setter = withHRT)]
    pub fn set_with_hrt(&mut self, yes: bool)
    {
        self.update(|o| o.set_with_hrt(yes));
    }
    #[wasm_bindgen(setter = withQuietZones)]
    pub fn set_with_quiet_zones(&mut self, yes: bool)
    {
        self.update(|o| o.set_with_quiet_zones(yes));
    }
    #[wasm_bindgen(setter = withSVG)]
    pub fn set_with_svg(&mut self, yes: bool)
    {
        self.update(|o| o.set_with_svg(yes));
    }
    #[wasm_bindgen(setter = withUTF8)]
    pub fn set_with_utf8(&mut self, yes: bool)
    {
        self.update(|o| o.set_with_utf8(yes));
    }
    #[wasm_bindgen(setter = withImage)]
    pub fn set_with_image(&mut self, yes: bool)
    {
        self.update(|o| o.set_with_image(yes));
    }
}

fn format_name(format: BarcodeFormat) -> String
{
    format.name().to_string()
}

fn corners(result: &DecodedSymbol) -> Vec<i32>
{
    let p = &result.position;
    [p.top_left, p.top_right, p.bottom_right, p.bottom_left]
        .iter()
        .flat_map(|c| [c.x, c.y])
        .collect()
}

/// One decoded, or with `returnErrors` failed, symbol
#[wasm_bindgen(js_name=DecodedSymbol)]
pub struct WasmDecodedSymbol
{
    result: DecodedSymbol
}

#[wasm_bindgen(js_class=DecodedSymbol)]
impl WasmDecodedSymbol
{
    #[wasm_bindgen(getter = schemaVersion)]
    pub fn schema_version(&self) -> u32
    {
        self.result.schema_version
    }
    #[wasm_bindgen(getter = isValid)]
    pub fn is_valid(&self) -> bool
    {
        self.result.is_valid
    }
    #[wasm_bindgen(getter = errorKind)]
    pub fn error_kind(&self) -> WasmErrorKind
    {
        self.result.error.kind.into()
    }
    /// `"<Kind>: <message>"`, empty when nothing failed
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> String
    {
        self.result.error.to_string()
    }
    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String
    {
        format_name(self.result.format)
    }
    #[wasm_bindgen(getter)]
    pub fn bytes(&self) -> Vec<u8>
    {
        self.result.bytes.clone()
    }
    #[wasm_bindgen(getter = bytesECI)]
    pub fn bytes_eci(&self) -> Vec<u8>
    {
        self.result.bytes_eci.clone()
    }
    #[wasm_bindgen(getter)]
    pub fn text(&self) -> String
    {
        self.result.text.clone()
    }
    #[wasm_bindgen(getter = ecLevel)]
    pub fn ec_level(&self) -> String
    {
        self.result.ec_level.clone()
    }
    #[wasm_bindgen(getter = contentType)]
    pub fn content_type(&self) -> WasmContentType
    {
        self.result.content_type.into()
    }
    #[wasm_bindgen(getter = hasECI)]
    pub fn has_eci(&self) -> bool
    {
        self.result.has_eci
    }
    /// Corners as `[x0, y0, x1, y1, ...]`, clockwise from top left
    #[wasm_bindgen(getter)]
    pub fn position(&self) -> Vec<i32>
    {
        corners(&self.result)
    }
    #[wasm_bindgen(getter)]
    pub fn orientation(&self) -> i32
    {
        self.result.orientation
    }
    #[wasm_bindgen(getter = isMirrored)]
    pub fn is_mirrored(&self) -> bool
    {
        self.result.is_mirrored
    }
    #[wasm_bindgen(getter = isInverted)]
    pub fn is_inverted(&self) -> bool
    {
        self.result.is_inverted
    }
    #[wasm_bindgen(getter = symbologyIdentifier)]
    pub fn symbology_identifier(&self) -> String
    {
        self.result.symbology_identifier.clone()
    }
    #[wasm_bindgen(getter = sequenceSize)]
    pub fn sequence_size(&self) -> i32
    {
        self.result.sequence_size
    }
    #[wasm_bindgen(getter = sequenceIndex)]
    pub fn sequence_index(&self) -> i32
    {
        self.result.sequence_index
    }
    #[wasm_bindgen(getter = sequenceId)]
    pub fn sequence_id(&self) -> String
    {
        self.result.sequence_id.clone()
    }
    #[wasm_bindgen(getter = readerInit)]
    pub fn reader_init(&self) -> bool
    {
        self.result.reader_init
    }
    #[wasm_bindgen(getter = lineCount)]
    pub fn line_count(&self) -> i32
    {
        self.result.line_count
    }
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> String
    {
        self.result.version.clone()
    }
    /// Module grid as luminance, one byte per module
    #[wasm_bindgen(getter = symbolImage)]
    pub fn symbol_image(&self) -> Option<WasmLumaImage>
    {
        self.result.symbol_image.clone().map(|image| WasmLumaImage { image })
    }
}

/// An 8 bit grayscale image
#[wasm_bindgen(js_name=LumaImage)]
pub struct WasmLumaImage
{
    image: LumaImage
}

#[wasm_bindgen(js_class=LumaImage)]
impl WasmLumaImage
{
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> usize
    {
        self.image.width
    }
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> usize
    {
        self.image.height
    }
    #[wasm_bindgen(getter)]
    pub fn pixels(&self) -> Vec<u8>
    {
        self.image.pixels.clone()
    }
}

/// The representations produced by an encode call
#[wasm_bindgen(js_name=EncodedSymbol)]
pub struct WasmEncodedSymbol
{
    result: EncodedSymbol
}

#[wasm_bindgen(js_class=EncodedSymbol)]
impl WasmEncodedSymbol
{
    #[wasm_bindgen(getter = schemaVersion)]
    pub fn schema_version(&self) -> u32
    {
        self.result.schema_version
    }
    #[wasm_bindgen(getter = isValid)]
    pub fn is_valid(&self) -> bool
    {
        self.result.is_valid()
    }
    #[wasm_bindgen(getter = errorKind)]
    pub fn error_kind(&self) -> WasmErrorKind
    {
        self.result.error.kind.into()
    }
    #[wasm_bindgen(getter)]
    pub fn error(&self) -> String
    {
        self.result.error.to_string()
    }
    #[wasm_bindgen(getter)]
    pub fn format(&self) -> String
    {
        format_name(self.result.format)
    }
    #[wasm_bindgen(getter)]
    pub fn svg(&self) -> String
    {
        self.result.svg.clone()
    }
    #[wasm_bindgen(getter)]
    pub fn utf8(&self) -> String
    {
        self.result.utf8.clone()
    }
    /// PNG file bytes
    #[wasm_bindgen(getter)]
    pub fn image(&self) -> Vec<u8>
    {
        self.result.image.clone()
    }
    #[wasm_bindgen(getter)]
    pub fn bitmap(&self) -> WasmLumaImage
    {
        WasmLumaImage {
            image: self.result.bitmap.clone()
        }
    }
    #[wasm_bindgen(getter)]
    pub fn symbol(&self) -> WasmLumaImage
    {
        WasmLumaImage {
            image: self.result.symbol.clone()
        }
    }
    #[wasm_bindgen(getter = ecLevel)]
    pub fn ec_level(&self) -> String
    {
        self.result.ec_level.clone()
    }
    #[wasm_bindgen(getter)]
    pub fn version(&self) -> String
    {
        self.result.version.clone()
    }
}

fn wrap_decoded(results: Vec<DecodedSymbol>, start: Instant) -> Vec<WasmDecodedSymbol>
{
    debug!("Decoded {} result(s) in {:?}", results.len(), start.elapsed());
    results
        .into_iter()
        .map(|result| WasmDecodedSymbol { result })
        .collect()
}

fn wrap_encoded(result: EncodedSymbol, start: Instant) -> WasmEncodedSymbol
{
    debug!("Encoded {} in {:?}", result.format, start.elapsed());
    WasmEncodedSymbol { result }
}

/// Read barcodes from a PNG or JPEG file
#[wasm_bindgen(js_name = decodeFromCompressedImage)]
pub fn decode_from_compressed_image(
    bytes: &[u8], options: &WasmReaderOptions
) -> Vec<WasmDecodedSymbol>
{
    let start = Instant::now();
    let results = zune_barcode_bridge::decode_from_compressed_image(bytes, &options.options);
    wrap_decoded(results, start)
}

/// Read barcodes from raw pixels such as canvas `ImageData.data`
#[wasm_bindgen(js_name = decodeFromRawPixels)]
pub fn decode_from_raw_pixels(
    bytes: &[u8], width: usize, height: usize, layout: WasmPixelLayout,
    options: &WasmReaderOptions
) -> Vec<WasmDecodedSymbol>
{
    let start = Instant::now();
    let results = zune_barcode_bridge::decode_from_raw_pixels(
        bytes,
        width,
        height,
        layout.into(),
        &options.options
    );
    wrap_decoded(results, start)
}

#[wasm_bindgen(js_name = encodeTextToRepresentations)]
pub fn encode_text_to_representations(text: &str, options: &WasmWriterOptions)
    -> WasmEncodedSymbol
{
    let start = Instant::now();
    let result = zune_barcode_bridge::encode_text_to_representations(text, &options.options);
    wrap_encoded(result, start)
}

#[wasm_bindgen(js_name = encodeBytesToRepresentations)]
pub fn encode_bytes_to_representations(bytes: &[u8], options: &WasmWriterOptions)
    -> WasmEncodedSymbol
{
    let start = Instant::now();
    let result = zune_barcode_bridge::encode_bytes_to_representations(bytes, &options.options);
    wrap_encoded(result, start)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn hello_through_the_bindings()
    {
        let mut writer = WasmWriterOptions::new(Some("QRCode".to_string()));
        writer.set_scale(4);
        writer.set_with_utf8(true);
        let encoded = encode_text_to_representations("HELLO", &writer);
        assert!(encoded.is_valid());
        assert!(!encoded.utf8().is_empty());

        let bitmap = encoded.bitmap();
        let results = decode_from_raw_pixels(
            &bitmap.pixels(),
            bitmap.width(),
            bitmap.height(),
            WasmPixelLayout::Lum,
            &WasmReaderOptions::new()
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text(), "HELLO");
        assert_eq!(results[0].format(), "QRCode");
        assert_eq!(results[0].position().len(), 8);
    }

    #[test]
    fn errors_surface_as_kinds()
    {
        let options = WasmWriterOptions::new(Some("NoSuchFormat".to_string()));
        let encoded = encode_text_to_representations("HELLO", &options);
        assert_eq!(encoded.error_kind(), WasmErrorKind::UnsupportedFormat);
        assert!(encoded.error().starts_with("UnsupportedFormatError: "));

        let results = decode_from_compressed_image(b"nope", &WasmReaderOptions::new());
        assert_eq!(results[0].error_kind(), WasmErrorKind::ImageLoad);
    }
}
