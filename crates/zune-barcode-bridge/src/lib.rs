/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Total decode and encode calls over `zune-barcode`
//!
//! This crate is the layer a host on the other side of an isolation
//! boundary (a wasm module, a C caller, a CLI) talks to. Every call
//!
//! - takes its options as plain records with documented defaults,
//! - borrows its input only for the duration of the call,
//! - returns records that own all their buffers,
//! - and never fails or panics as a whole, failures are reported in
//!   the `error` field of the returned records.
//!
//! # Example
//! ```
//! use zune_barcode::BarcodeFormat;
//! use zune_barcode_bridge::{
//!     decode_from_raw_pixels, encode_text_to_representations, PixelLayout, ReaderOptions,
//!     WriterOptions
//! };
//!
//! let options = WriterOptions::new(BarcodeFormat::QRCode).set_scale(4);
//! let encoded = encode_text_to_representations("HELLO", &options);
//! assert!(encoded.is_valid());
//!
//! let bitmap = &encoded.bitmap;
//! let results = decode_from_raw_pixels(
//!     &bitmap.pixels,
//!     bitmap.width,
//!     bitmap.height,
//!     PixelLayout::Lum,
//!     &ReaderOptions::default()
//! );
//! assert_eq!(results[0].text, "HELLO");
//! ```
//!
//! # Features
//! - `jpeg`: Accept JPEG input in [`decode_from_compressed_image`],
//!   enabled by default
//! - `serde`: Serialize results and (de)serialize options
#![forbid(unsafe_code)]

pub use decode::{decode, decode_from_compressed_image, decode_from_raw_pixels};
pub use encode::{
    encode, encode_bytes_to_representations, encode_structured_append,
    encode_text_to_representations
};
pub use errors::{BridgeError, ErrorDescriptor, ErrorKind};
pub use marshal::{decoded_symbol, merge_structured_append};
pub use options::{FormatRequest, FormatSelector, ReaderOptions, WriterOptions};
pub use raster::{encode_png, load_pixels, ImageFormat, OwnedPixels};
pub use result::{DecodedSymbol, EncodedSymbol, LumaImage, Point, Quadrilateral};
pub use view::{BufferView, PixelLayout};

mod decode;
mod encode;
pub mod errors;
mod guard;
mod marshal;
pub mod options;
mod raster;
pub mod result;
mod view;

/// Version of the result record layout
///
/// Bumped whenever a field is added to a result record.
pub const SCHEMA_VERSION: u32 = 1;
