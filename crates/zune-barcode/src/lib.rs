/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! A small barcode reading and writing engine
//!
//! This crate locates and decodes barcodes in luminance or colour
//! images and creates barcode symbols that can be rendered as
//! bitmaps, SVG documents or block character text.
//!
//! It currently supports
//!
//! - QR Code, versions 1 to 40, reading and writing
//! - Code 128, reading and writing
//! - EAN-13, EAN-8 and UPC-A with EAN-2/EAN-5 add-ons, reading and writing
//!
//! Every other symbology has a [`BarcodeFormat`] so that options and
//! results can name it, but reading skips it and writing refuses it.
//!
//! # Example
//!
//! ```
//! use zune_barcode::{create_barcode, read_barcodes, render_bitmap};
//! use zune_barcode::{CreatorConfig, ImageView, Payload, PixelFormat, ReaderConfig, RenderConfig};
//!
//! let symbol = create_barcode(Payload::Text("HELLO"), &CreatorConfig::default()).unwrap();
//! let bitmap = render_bitmap(&symbol, &RenderConfig::default().set_scale(4)).unwrap();
//!
//! let view = ImageView::new(bitmap.pixels(), bitmap.width(), bitmap.height(), PixelFormat::Lum, None).unwrap();
//! let results = read_barcodes(&view, &ReaderConfig::default());
//! assert_eq!(results[0].text(), "HELLO");
//! ```
//!
//! # Features
//!  - `log`: Routes the internal log macros to the `log` crate,
//!     without it they compile to nothing
//!
//!  - `serde`: Derives serialization for formats, charsets and
//!     the option records
#![forbid(unsafe_code)]
#![macro_use]

pub use crate::charset::CharacterSet;
pub use crate::config::{EanAddOnSymbol, ReaderConfig};
pub use crate::content::{ContentType, TextMode};
pub use crate::errors::BarcodeError;
pub use crate::format::{BarcodeFormat, BarcodeFormats};
pub use crate::image::{ImageView, PixelFormat};
pub use crate::reader::read_barcodes;
pub use crate::render::{render_bitmap, render_svg, render_utf8, Bitmap, RenderConfig};
pub use crate::symbol::{Barcode, StructuredAppendInfo};
pub use crate::writer::{create_barcode, create_structured_append, CreatorConfig, Payload, Symbol};
pub use binarizer::Binarizer;
pub use geometry::{PointI, Position};

pub mod binarizer;
pub mod bitmatrix;
pub mod charset;
pub mod config;
pub mod content;
pub mod errors;
pub mod format;
pub mod geometry;
pub mod image;
#[cfg(not(feature = "log"))]
pub mod log;
#[cfg(feature = "log")]
pub use log;
pub mod oned;
pub mod qr;
pub mod reader;
pub mod render;
pub mod symbol;
pub mod writer;
