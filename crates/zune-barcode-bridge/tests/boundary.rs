/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use nanorand::{Rng, WyRand};
use zune_barcode::{BarcodeFormat, CharacterSet};
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_core::options::EncoderOptions;
use zune_png::PngEncoder;
use zune_barcode_bridge::{
    decode_from_compressed_image, decode_from_raw_pixels, encode_bytes_to_representations,
    encode_structured_append, encode_text_to_representations, merge_structured_append,
    DecodedSymbol, ErrorKind, LumaImage, PixelLayout, ReaderOptions, WriterOptions
};

fn read(image: &LumaImage, options: &ReaderOptions) -> Vec<DecodedSymbol> {
    decode_from_raw_pixels(&image.pixels, image.width, image.height, PixelLayout::Lum, options)
}

fn qr(text: &str, scale: u16) -> LumaImage {
    let options = WriterOptions::new(BarcodeFormat::QRCode).set_scale(scale);
    let encoded = encode_text_to_representations(text, &options);
    assert!(encoded.is_valid(), "{}", encoded.error);
    encoded.bitmap
}

#[test]
fn hello_round_trip() {
    let options = WriterOptions::new(BarcodeFormat::QRCode).set_scale(4);
    let encoded = encode_text_to_representations("HELLO", &options);

    assert!(encoded.is_valid());
    assert_eq!(encoded.format, BarcodeFormat::QRCode);
    assert!(encoded.svg.starts_with("<?xml"));
    assert!(encoded.svg.contains("<svg xmlns="));
    assert!(encoded.utf8.is_empty());
    assert!(!encoded.image.is_empty());
    assert_eq!(encoded.bitmap.width, (21 + 8) * 4);
    assert_eq!(encoded.symbol.width, 21);

    let results = read(&encoded.bitmap, &ReaderOptions::default());
    assert_eq!(results.len(), 1);
    let hello = &results[0];
    assert!(hello.is_valid);
    assert!(hello.error.is_empty());
    assert_eq!(hello.format, BarcodeFormat::QRCode);
    assert_eq!(hello.text, "HELLO");
    assert_eq!(hello.bytes, b"HELLO");
    assert_eq!(hello.sequence_size, 1);
    assert_eq!(hello.sequence_index, 0);
    assert!(hello.sequence_id.is_empty());
    assert!(hello.symbol_image.is_none());
}

#[test]
fn png_output_reads_back() {
    let options = WriterOptions::new(BarcodeFormat::QRCode).set_scale(3).set_with_svg(false);
    let encoded = encode_text_to_representations("over the wire", &options);
    assert!(encoded.svg.is_empty());

    let results = decode_from_compressed_image(&encoded.image, &ReaderOptions::default());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "over the wire");
}

#[test]
fn colour_buffers_are_accepted() {
    let image = qr("RGBA", 3);
    let rgba: Vec<u8> = image.pixels.iter().flat_map(|&p| [p, p, p, 255]).collect();

    let results = decode_from_raw_pixels(
        &rgba,
        image.width,
        image.height,
        PixelLayout::RGBA,
        &ReaderOptions::default()
    );
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "RGBA");
}

fn png(image: &LumaImage, colorspace: ColorSpace, depth: BitDepth) -> Vec<u8> {
    let samples: Vec<u8> = image
        .pixels
        .iter()
        .flat_map(|&p| match colorspace {
            ColorSpace::RGB => vec![p, p, p],
            ColorSpace::RGBA => vec![p, p, p, 255],
            _ => vec![p]
        })
        .collect();
    let samples = match depth {
        // big endian, low byte mirrors the high one
        BitDepth::Sixteen => samples.iter().flat_map(|&s| [s, s]).collect(),
        _ => samples
    };
    let options = EncoderOptions::new(image.width, image.height, colorspace, depth);
    PngEncoder::new(&samples, options).encode()
}

#[cfg(feature = "jpeg")]
fn jpeg(image: &LumaImage, colour: jpeg_encoder::ColorType) -> Vec<u8> {
    let samples: Vec<u8> = match colour {
        jpeg_encoder::ColorType::Rgb => image.pixels.iter().flat_map(|&p| [p, p, p]).collect(),
        _ => image.pixels.clone()
    };
    let mut out = Vec::new();
    let encoder = jpeg_encoder::Encoder::new(&mut out, 95);
    encoder
        .encode(&samples, image.width as u16, image.height as u16, colour)
        .unwrap();
    out
}

#[test]
fn png_layouts_are_ingested() {
    let image = qr("PNG LAYOUTS", 4);
    let cases = [
        (ColorSpace::Luma, BitDepth::Sixteen),
        (ColorSpace::RGB, BitDepth::Eight),
        (ColorSpace::RGBA, BitDepth::Eight),
        (ColorSpace::RGB, BitDepth::Sixteen)
    ];
    for (colorspace, depth) in cases {
        let file = png(&image, colorspace, depth);
        let results = decode_from_compressed_image(&file, &ReaderOptions::default());
        assert_eq!(results.len(), 1, "{colorspace:?} {depth:?}");
        assert!(results[0].is_valid, "{colorspace:?} {depth:?}: {}", results[0].error);
        assert_eq!(results[0].text, "PNG LAYOUTS");
    }
}

#[cfg(feature = "jpeg")]
#[test]
fn jpeg_images_are_ingested() {
    let image = qr("JPEG", 5);
    for colour in [jpeg_encoder::ColorType::Luma, jpeg_encoder::ColorType::Rgb] {
        let file = jpeg(&image, colour);
        let results = decode_from_compressed_image(&file, &ReaderOptions::default());
        assert_eq!(results.len(), 1, "{colour:?}");
        assert!(results[0].is_valid, "{colour:?}: {}", results[0].error);
        assert_eq!(results[0].text, "JPEG");
    }
}

#[test]
fn kanji_text_round_trip() {
    let options = WriterOptions::new(BarcodeFormat::QRCode)
        .set_character_set(CharacterSet::Shift_JIS)
        .set_scale(3);
    let encoded = encode_text_to_representations("点茗", &options);
    assert!(encoded.is_valid(), "{}", encoded.error);

    let results = read(&encoded.bitmap, &ReaderOptions::default());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].text, "点茗");
    assert_eq!(results[0].bytes, [0x93, 0x5F, 0xE4, 0xAA]);
    assert!(!results[0].has_eci);
}

#[test]
fn eci_text_in_regional_sets() {
    let cases = [
        (CharacterSet::Cp1251, "Привет"),
        (CharacterSet::EUC_KR, "안녕하세요"),
        (CharacterSet::Big5, "條碼")
    ];
    for (charset, text) in cases {
        let options = WriterOptions::new(BarcodeFormat::QRCode)
            .set_character_set(charset)
            .set_scale(3);
        let encoded = encode_text_to_representations(text, &options);
        assert!(encoded.is_valid(), "{charset:?}: {}", encoded.error);

        let results = read(&encoded.bitmap, &ReaderOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text, text, "{charset:?}");
        assert!(results[0].has_eci);
    }
}

#[test]
fn unrepresentable_text_is_an_engine_error() {
    let options = WriterOptions::new(BarcodeFormat::QRCode).set_character_set(CharacterSet::Shift_JIS);
    let encoded = encode_text_to_representations("شكرا", &options);
    assert!(!encoded.is_valid());
    assert_eq!(encoded.error.kind, ErrorKind::Engine);
    assert!(encoded.image.is_empty());
}

#[test]
fn random_bytes_round_trip() {
    let mut rng = WyRand::new_seed(42);

    for _ in 0..8 {
        let len = rng.generate_range(1_usize..40);
        let mut data = vec![0_u8; len];
        rng.fill(&mut data);

        let options = WriterOptions::new(BarcodeFormat::QRCode).set_scale(3);
        let encoded = encode_bytes_to_representations(&data, &options);
        assert!(encoded.is_valid());

        let results = read(&encoded.bitmap, &ReaderOptions::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].bytes, data);
    }
}

#[test]
fn linear_symbols_round_trip() {
    let options = WriterOptions::new(BarcodeFormat::EAN13).set_scale(2).set_with_utf8(true);
    let encoded = encode_text_to_representations("400638133393", &options);
    assert!(encoded.is_valid(), "{}", encoded.error);
    assert!(!encoded.utf8.is_empty());

    let results = read(&encoded.bitmap, &ReaderOptions::default().set_format_names("EAN-13"));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].format, BarcodeFormat::EAN13);
    assert_eq!(results[0].text, "4006381333931");
}

#[test]
fn result_count_is_limited() {
    let a = qr("FIRST", 4);
    let b = qr("SECOND", 4);

    let width = a.width + b.width;
    let height = a.height.max(b.height);
    let mut pixels = vec![255_u8; width * height];
    for y in 0..a.height {
        pixels[y * width..y * width + a.width].copy_from_slice(&a.pixels[y * a.width..(y + 1) * a.width]);
    }
    for y in 0..b.height {
        let row = y * width + a.width;
        pixels[row..row + b.width].copy_from_slice(&b.pixels[y * b.width..(y + 1) * b.width]);
    }
    let canvas = LumaImage {
        width,
        height,
        pixels
    };

    assert_eq!(read(&canvas, &ReaderOptions::default()).len(), 2);
    for max in [1, 2] {
        let options = ReaderOptions::default().set_max_number_of_symbols(max);
        assert!(read(&canvas, &options).len() <= usize::from(max));
    }
}

#[test]
fn damaged_symbols_only_with_return_errors() {
    let options = WriterOptions::new(BarcodeFormat::QRCode)
        .set_ec_level("L")
        .set_scale(4);
    let mut image = encode_text_to_representations("HELLO WORLD", &options).bitmap;

    // invert six by six data modules in the middle of the symbol
    let quiet = 4 * 4;
    for y in quiet + 9 * 4..quiet + 15 * 4 {
        for x in quiet + 9 * 4..quiet + 15 * 4 {
            let p = &mut image.pixels[y * image.width + x];
            *p = 255 - *p;
        }
    }

    assert!(read(&image, &ReaderOptions::default()).is_empty());

    let results = read(&image, &ReaderOptions::default().set_return_errors(true));
    assert!(!results.is_empty());
    for result in results {
        assert!(!result.is_valid);
        assert!(matches!(result.error.kind, ErrorKind::Checksum | ErrorKind::Format));
        assert!(result.text.is_empty());
    }
}

#[test]
fn structured_append_parts() {
    let data = b"one message spread over three symbols";
    let options = WriterOptions::new(BarcodeFormat::QRCode).set_scale(3);
    let encoded = encode_structured_append(data, 3, &options);
    assert_eq!(encoded.len(), 3);

    let mut parts = Vec::new();
    for symbol in &encoded {
        assert!(symbol.is_valid());
        let mut results = read(&symbol.bitmap, &ReaderOptions::default());
        assert_eq!(results.len(), 1);
        parts.push(results.remove(0));
    }
    for (i, part) in parts.iter().enumerate() {
        assert_eq!(part.sequence_size, 3);
        assert_eq!(part.sequence_index, i as i32);
        assert_eq!(part.sequence_id, parts[0].sequence_id);
    }

    parts.reverse();
    let merged = merge_structured_append(&parts).unwrap();
    assert_eq!(merged.bytes, data);
    assert_eq!(merged.sequence_size, 1);
}

#[test]
fn non_images_are_image_load_errors() {
    let results = decode_from_compressed_image(b"%PDF-1.7 not a raster", &ReaderOptions::default());
    assert_eq!(results.len(), 1);
    assert!(!results[0].is_valid);
    assert_eq!(results[0].error.kind, ErrorKind::ImageLoad);
    assert!(results[0].bytes.is_empty());
}

#[test]
fn short_buffers_are_engine_errors() {
    let results = decode_from_raw_pixels(&[0; 10], 4, 4, PixelLayout::Lum, &ReaderOptions::default());
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].error.kind, ErrorKind::Engine);
}

#[test]
fn unknown_decode_formats_fail_the_call() {
    let image = qr("HELLO", 2);
    let results = read(&image, &ReaderOptions::default().set_format_names("QRCode, NotAFormat"));
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].error.kind, ErrorKind::UnsupportedFormat);
}

#[test]
fn unsupported_encode_formats() {
    let out_of_range = WriterOptions::default().set_format_raw(9999);
    let unset = WriterOptions::default();
    let unwritable = WriterOptions::new(BarcodeFormat::Aztec);

    for options in [out_of_range, unset, unwritable] {
        let encoded = encode_text_to_representations("HELLO", &options);
        assert!(!encoded.is_valid());
        assert_eq!(encoded.error.kind, ErrorKind::UnsupportedFormat);
        assert!(encoded.svg.is_empty());
        assert!(encoded.utf8.is_empty());
        assert!(encoded.image.is_empty());
        assert!(encoded.bitmap.is_empty());
    }

    let encoded = encode_text_to_representations("HELLO", &WriterOptions::new(BarcodeFormat::Aztec));
    assert_eq!(encoded.error.message, "Unsupported format: Aztec");
}

#[test]
fn invalid_payloads_are_engine_errors() {
    let options = WriterOptions::new(BarcodeFormat::EAN13);
    let encoded = encode_text_to_representations("not digits", &options);
    assert_eq!(encoded.error.kind, ErrorKind::Engine);
    assert!(encoded.image.is_empty());
}

#[cfg(feature = "serde")]
#[test]
fn results_serialize() {
    let encoded = encode_text_to_representations("JSON", &WriterOptions::new(BarcodeFormat::QRCode));
    let results = read(&encoded.bitmap, &ReaderOptions::default());

    let value = serde_json::to_value(&results).unwrap();
    assert_eq!(value[0]["text"], "JSON");
    assert_eq!(value[0]["schema_version"], 1);
    assert_eq!(value[0]["error"]["kind"], "None");
}
