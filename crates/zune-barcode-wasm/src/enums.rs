/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

#![allow(clippy::upper_case_acronyms)]

use wasm_bindgen::prelude::wasm_bindgen;
use zune_barcode::{Binarizer, ContentType, EanAddOnSymbol, TextMode};
use zune_barcode_bridge::{ErrorKind, PixelLayout};

/// A 1 to 1 mapping of the binarizers
/// but with the `wasm_bindgen` attribute.
#[wasm_bindgen(js_name=Binarizer)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WasmBinarizer
{
    LocalAverage = 0,
    GlobalHistogram = 1,
    FixedThreshold = 2,
    BoolCast = 3
}

impl WasmBinarizer
{
    pub fn from_binarizer(binarizer: Binarizer) -> WasmBinarizer
    {
        match binarizer
        {
            Binarizer::LocalAverage => Self::LocalAverage,
            Binarizer::GlobalHistogram => Self::GlobalHistogram,
            Binarizer::FixedThreshold => Self::FixedThreshold,
            Binarizer::BoolCast => Self::BoolCast
        }
    }
    pub fn to_binarizer(self) -> Binarizer
    {
        match self
        {
            WasmBinarizer::LocalAverage => Binarizer::LocalAverage,
            WasmBinarizer::GlobalHistogram => Binarizer::GlobalHistogram,
            WasmBinarizer::FixedThreshold => Binarizer::FixedThreshold,
            WasmBinarizer::BoolCast => Binarizer::BoolCast
        }
    }
}

#[wasm_bindgen(js_name=EanAddOnSymbol)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WasmEanAddOnSymbol
{
    Ignore = 0,
    Read = 1,
    Require = 2
}

impl WasmEanAddOnSymbol
{
    pub fn from_add_on(add_on: EanAddOnSymbol) -> WasmEanAddOnSymbol
    {
        match add_on
        {
            EanAddOnSymbol::Ignore => Self::Ignore,
            EanAddOnSymbol::Read => Self::Read,
            EanAddOnSymbol::Require => Self::Require
        }
    }
    pub fn to_add_on(self) -> EanAddOnSymbol
    {
        match self
        {
            WasmEanAddOnSymbol::Ignore => EanAddOnSymbol::Ignore,
            WasmEanAddOnSymbol::Read => EanAddOnSymbol::Read,
            WasmEanAddOnSymbol::Require => EanAddOnSymbol::Require
        }
    }
}

#[wasm_bindgen(js_name=TextMode)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WasmTextMode
{
    Plain = 0,
    ECI = 1,
    HRI = 2,
    Hex = 3,
    Escaped = 4
}

impl WasmTextMode
{
    pub fn from_text_mode(mode: TextMode) -> WasmTextMode
    {
        match mode
        {
            TextMode::Plain => Self::Plain,
            TextMode::ECI => Self::ECI,
            TextMode::HRI => Self::HRI,
            TextMode::Hex => Self::Hex,
            TextMode::Escaped => Self::Escaped
        }
    }
    pub fn to_text_mode(self) -> TextMode
    {
        match self
        {
            WasmTextMode::Plain => TextMode::Plain,
            WasmTextMode::ECI => TextMode::ECI,
            WasmTextMode::HRI => TextMode::HRI,
            WasmTextMode::Hex => TextMode::Hex,
            WasmTextMode::Escaped => TextMode::Escaped
        }
    }
}

/// Classification of a decoded payload
#[wasm_bindgen(js_name=ContentType)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WasmContentType
{
    Text = 0,
    Binary = 1,
    Mixed = 2,
    GS1 = 3,
    ISO15434 = 4,
    UnknownECI = 5
}

impl From<ContentType> for WasmContentType
{
    fn from(value: ContentType) -> Self
    {
        match value
        {
            ContentType::Text => WasmContentType::Text,
            ContentType::Binary => WasmContentType::Binary,
            ContentType::Mixed => WasmContentType::Mixed,
            ContentType::GS1 => WasmContentType::GS1,
            ContentType::ISO15434 => WasmContentType::ISO15434,
            ContentType::UnknownECI => WasmContentType::UnknownECI
        }
    }
}

/// Layout of the pixels handed to `decodeFromRawPixels`
#[wasm_bindgen(js_name=PixelLayout)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WasmPixelLayout
{
    Lum = 0,
    RGB = 1,
    /// What `CanvasRenderingContext2D.getImageData` returns
    RGBA = 2
}

impl From<WasmPixelLayout> for PixelLayout
{
    fn from(value: WasmPixelLayout) -> Self
    {
        match value
        {
            WasmPixelLayout::Lum => PixelLayout::Lum,
            WasmPixelLayout::RGB => PixelLayout::RGB,
            WasmPixelLayout::RGBA => PixelLayout::RGBA
        }
    }
}

#[wasm_bindgen(js_name=ErrorKind)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum WasmErrorKind
{
    None = 0,
    UnsupportedFormat = 1,
    ImageLoad = 2,
    Engine = 3,
    Unknown = 4,
    Format = 5,
    Checksum = 6
}

impl From<ErrorKind> for WasmErrorKind
{
    fn from(value: ErrorKind) -> Self
    {
        match value
        {
            ErrorKind::None => WasmErrorKind::None,
            ErrorKind::UnsupportedFormat => WasmErrorKind::UnsupportedFormat,
            ErrorKind::ImageLoad => WasmErrorKind::ImageLoad,
            ErrorKind::Engine => WasmErrorKind::Engine,
            ErrorKind::Unknown => WasmErrorKind::Unknown,
            ErrorKind::Format => WasmErrorKind::Format,
            ErrorKind::Checksum => WasmErrorKind::Checksum
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn discriminants_match_the_bridge()
    {
        for raw in 0..4
        {
            let binarizer = Binarizer::from_raw(raw).unwrap();
            let wasm = WasmBinarizer::from_binarizer(binarizer);
            assert_eq!(wasm as u32, raw);
            assert_eq!(wasm.to_binarizer(), binarizer);
        }
        for raw in 0..5
        {
            let mode = TextMode::from_raw(raw).unwrap();
            assert_eq!(WasmTextMode::from_text_mode(mode) as u32, raw);
        }
        for raw in 0..7
        {
            let kind = ErrorKind::from_raw(raw).unwrap();
            assert_eq!(WasmErrorKind::from(kind) as u32, raw);
        }
        assert_eq!(PixelLayout::from(WasmPixelLayout::RGBA), PixelLayout::RGBA);
    }
}
