/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decode calls
//!
//! Each call returns a list of records and never fails as a whole.
//! When nothing could be attempted (bad options, an unreadable image, a
//! short buffer, a fault inside the engine) the list holds exactly one
//! record whose `error` says why.
use log::{debug, warn};
use zune_barcode::read_barcodes;

use crate::errors::BridgeError;
use crate::guard::guarded;
use crate::marshal::decoded_symbol;
use crate::options::ReaderOptions;
use crate::raster::load_pixels;
use crate::result::DecodedSymbol;
use crate::view::{BufferView, PixelLayout};

fn failed_call(err: &BridgeError) -> Vec<DecodedSymbol> {
    warn!("Decode call failed: {err}");
    vec![DecodedSymbol::from_error(err.to_descriptor())]
}

/// Read every symbol `options` asks for from `view`
///
/// Results are in the order the engine reported them, at most
/// `max_number_of_symbols` of them. Records for symbols that were
/// located but failed to decode are only present with
/// `return_errors`.
pub fn decode(view: &BufferView, options: &ReaderOptions) -> Vec<DecodedSymbol> {
    let config = match options.to_config() {
        Ok(config) => config,
        Err(err) => return failed_call(&err)
    };

    let outcome = guarded(|| {
        read_barcodes(view.image_view(), &config)
            .iter()
            .map(decoded_symbol)
            .collect::<Vec<_>>()
    });
    match outcome {
        Ok(symbols) => {
            debug!(
                "Found {} symbol(s) in a {}x{} {:?} image",
                symbols.len(),
                view.width(),
                view.height(),
                view.layout()
            );
            symbols
        }
        Err(desc) => vec![DecodedSymbol::from_error(desc)]
    }
}

/// Read symbols from a PNG or JPEG file held in memory
///
/// An input that is not a supported image yields a single
/// `ImageLoad` error record.
pub fn decode_from_compressed_image(bytes: &[u8], options: &ReaderOptions) -> Vec<DecodedSymbol> {
    let pixels = match guarded(|| load_pixels(bytes)) {
        Ok(Ok(pixels)) => pixels,
        Ok(Err(err)) => return failed_call(&err),
        Err(desc) => return vec![DecodedSymbol::from_error(desc)]
    };
    match pixels.view() {
        Ok(view) => decode(&view, options),
        Err(err) => failed_call(&err)
    }
}

/// Read symbols from tightly packed raw pixels
///
/// `bytes` must hold at least `width * height * layout.channels()`
/// bytes, anything shorter yields a single `Engine` error record.
pub fn decode_from_raw_pixels(
    bytes: &[u8], width: usize, height: usize, layout: PixelLayout, options: &ReaderOptions
) -> Vec<DecodedSymbol> {
    match BufferView::new(bytes, width, height, None, layout) {
        Ok(view) => decode(&view, options),
        Err(err) => failed_call(&err)
    }
}
