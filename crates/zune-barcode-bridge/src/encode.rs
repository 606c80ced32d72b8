/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Encode calls
//!
//! The symbol is built once from the creation options, then every
//! requested representation is rendered from it. A failure anywhere
//! leaves every representation empty and sets `error`.
use log::{debug, warn};
use zune_barcode::{
    create_barcode, create_structured_append, render_bitmap, render_svg, render_utf8, Payload,
    Symbol
};

use crate::errors::{BridgeError, ErrorDescriptor};
use crate::guard::guarded;
use crate::marshal::{bitmap_image, matrix_image};
use crate::options::WriterOptions;
use crate::raster::encode_png;
use crate::result::EncodedSymbol;

fn represent(symbol: &Symbol, options: &WriterOptions) -> Result<EncodedSymbol, BridgeError> {
    let config = options.to_render_config();
    let bitmap = render_bitmap(symbol, &config)?;

    let image = if options.get_with_image() {
        encode_png(&bitmap)
    } else {
        Vec::new()
    };
    let svg = if options.get_with_svg() {
        render_svg(symbol, &config)
    } else {
        String::new()
    };
    let utf8 = if options.get_with_utf8() {
        render_utf8(symbol, &config)
    } else {
        String::new()
    };
    debug!(
        "Rendered {} as a {}x{} bitmap",
        symbol.format(),
        bitmap.width(),
        bitmap.height()
    );

    Ok(EncodedSymbol {
        format: symbol.format(),
        svg,
        utf8,
        image,
        bitmap: bitmap_image(bitmap),
        symbol: matrix_image(symbol.modules()),
        ec_level: symbol.ec_level().to_string(),
        version: symbol.version().to_string(),
        ..EncodedSymbol::default()
    })
}

fn failed_call(err: &BridgeError) -> EncodedSymbol {
    warn!("Encode call failed: {err}");
    EncodedSymbol::from_error(err.to_descriptor())
}

fn settle(outcome: Result<Result<EncodedSymbol, BridgeError>, ErrorDescriptor>) -> EncodedSymbol {
    match outcome {
        Ok(Ok(encoded)) => encoded,
        Ok(Err(err)) => failed_call(&err),
        Err(desc) => EncodedSymbol::from_error(desc)
    }
}

/// Build one symbol for `payload` and render what `options` asks for
pub fn encode(payload: Payload, options: &WriterOptions) -> EncodedSymbol {
    let config = match options.to_creator_config() {
        Ok(config) => config,
        Err(err) => return failed_call(&err)
    };
    settle(guarded(|| -> Result<EncodedSymbol, BridgeError> {
        let symbol = create_barcode(payload, &config)?;
        represent(&symbol, options)
    }))
}

/// Encode `text`, converted with the options' character set
pub fn encode_text_to_representations(text: &str, options: &WriterOptions) -> EncodedSymbol {
    encode(Payload::Text(text), options)
}

/// Encode raw `bytes` as binary content
pub fn encode_bytes_to_representations(bytes: &[u8], options: &WriterOptions) -> EncodedSymbol {
    encode(Payload::Bytes(bytes), options)
}

/// Split `bytes` over `parts` linked QR symbols, one record per symbol
///
/// A failure yields a single error record.
pub fn encode_structured_append(
    bytes: &[u8], parts: u8, options: &WriterOptions
) -> Vec<EncodedSymbol> {
    let config = match options.to_creator_config() {
        Ok(config) => config,
        Err(err) => return vec![failed_call(&err)]
    };
    let outcome = guarded(|| -> Result<Vec<EncodedSymbol>, BridgeError> {
        create_structured_append(bytes, parts, &config)?
            .iter()
            .map(|symbol| represent(symbol, options))
            .collect()
    });
    match outcome {
        Ok(Ok(symbols)) => symbols,
        Ok(Err(err)) => vec![failed_call(&err)],
        Err(desc) => vec![EncodedSymbol::from_error(desc)]
    }
}
