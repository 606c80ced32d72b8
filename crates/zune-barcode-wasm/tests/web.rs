/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Test suite for the Web and headless browsers.

#![cfg(target_arch = "wasm32")]

use wasm_bindgen_test::*;
use zune_barcode_wasm::enums::{WasmErrorKind, WasmPixelLayout};
use zune_barcode_wasm::*;

#[wasm_bindgen_test]
fn png_round_trip()
{
    let mut writer = WasmWriterOptions::new(Some("QR Code".to_string()));
    writer.set_scale(4);
    let encoded = encode_text_to_representations("HELLO", &writer);
    assert!(encoded.is_valid());
    assert!(encoded.svg().starts_with("<?xml"));
    assert!(encoded.svg().contains("<svg xmlns="));

    let results = decode_from_compressed_image(&encoded.image(), &WasmReaderOptions::new());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text(), "HELLO");
    assert_eq!(results[0].error_kind(), WasmErrorKind::None);
}

#[wasm_bindgen_test]
fn short_buffers_are_reported()
{
    let results = decode_from_raw_pixels(&[0; 3], 2, 2, WasmPixelLayout::RGBA, &WasmReaderOptions::new());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].error_kind(), WasmErrorKind::Engine);
}
