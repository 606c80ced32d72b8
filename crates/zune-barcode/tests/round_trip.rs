/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use nanorand::{Rng, WyRand};
use zune_barcode::{
    create_barcode, read_barcodes, render_bitmap, Barcode, BarcodeFormat, Bitmap, CreatorConfig,
    ImageView, Payload, PixelFormat, ReaderConfig, RenderConfig
};

fn read(bitmap: &Bitmap, config: &ReaderConfig) -> Vec<Barcode> {
    let view = ImageView::new(
        bitmap.pixels(),
        bitmap.width(),
        bitmap.height(),
        PixelFormat::Lum,
        None
    )
    .unwrap();
    read_barcodes(&view, config)
}

fn render(payload: Payload, creator: &CreatorConfig, scale: u16) -> Bitmap {
    let symbol = create_barcode(payload, creator).unwrap();
    render_bitmap(&symbol, &RenderConfig::default().set_scale(scale)).unwrap()
}

#[test]
fn random_qr_payloads() {
    let mut rng = WyRand::new_seed(0x5eed);
    let levels = ["L", "M", "Q", "H"];

    for _ in 0..12 {
        let len = rng.generate_range(1_usize..60);
        let mut data = vec![0_u8; len];
        rng.fill(&mut data);
        let level = levels[rng.generate_range(0_usize..4)];

        let creator = CreatorConfig::new(BarcodeFormat::QRCode).set_ec_level(level);
        let bitmap = render(Payload::Bytes(&data), &creator, 3);
        let results = read(&bitmap, &ReaderConfig::default());

        assert_eq!(results.len(), 1, "{len} bytes at level {level}");
        assert_eq!(results[0].bytes(), &data[..]);
        assert_eq!(results[0].ec_level(), level);
    }
}

#[test]
fn random_code128_text() {
    let mut rng = WyRand::new_seed(128);

    for _ in 0..10 {
        let len = rng.generate_range(1_usize..=20);
        let text: String = (0..len)
            .map(|_| char::from(rng.generate_range(32_u8..127)))
            .collect();

        let bitmap = render(Payload::Text(&text), &CreatorConfig::new(BarcodeFormat::Code128), 2);
        let results = read(&bitmap, &ReaderConfig::default());

        assert_eq!(results.len(), 1, "{text:?}");
        assert_eq!(results[0].format(), BarcodeFormat::Code128);
        assert_eq!(results[0].text(), text);
    }
}

#[test]
fn random_ean13_numbers() {
    let mut rng = WyRand::new_seed(13);

    for _ in 0..8 {
        let mut digits = String::new();
        digits.push(char::from(b'0' + rng.generate_range(1_u8..10)));
        for _ in 0..11 {
            digits.push(char::from(b'0' + rng.generate_range(0_u8..10)));
        }
        let symbol = create_barcode(Payload::Text(&digits), &CreatorConfig::new(BarcodeFormat::EAN13)).unwrap();
        let bitmap = render_bitmap(&symbol, &RenderConfig::default().set_scale(2)).unwrap();
        let results = read(&bitmap, &ReaderConfig::default());

        assert_eq!(results.len(), 1, "{digits}");
        assert_eq!(results[0].format(), BarcodeFormat::EAN13);
        assert_eq!(results[0].text(), symbol.text());
        assert!(results[0].text().starts_with(&digits));
        assert_eq!(results[0].symbology_identifier(), "]E0");
    }
}

#[test]
fn rotated_renderings_still_read() {
    let symbol = create_barcode(Payload::Text("TURN"), &CreatorConfig::default()).unwrap();
    for turns in 0..4 {
        let config = RenderConfig::default().set_scale(4).set_rotate(turns);
        let bitmap = render_bitmap(&symbol, &config).unwrap();
        let results = read(&bitmap, &ReaderConfig::default());
        assert_eq!(results.len(), 1, "{turns} quarter turns");
        assert_eq!(results[0].text(), "TURN");
    }
}

#[test]
fn symbol_limit_is_honoured() {
    let a = render(Payload::Text("FIRST"), &CreatorConfig::default(), 4);
    let b = render(Payload::Text("SECOND"), &CreatorConfig::default(), 4);

    // both symbols side by side on one canvas
    let width = a.width() + b.width();
    let height = a.height().max(b.height());
    let mut pixels = vec![255_u8; width * height];
    for y in 0..a.height() {
        for x in 0..a.width() {
            pixels[y * width + x] = a.get(x, y);
        }
    }
    for y in 0..b.height() {
        for x in 0..b.width() {
            pixels[y * width + a.width() + x] = b.get(x, y);
        }
    }
    let view = ImageView::new(&pixels, width, height, PixelFormat::Lum, None).unwrap();

    let all = read_barcodes(&view, &ReaderConfig::default());
    let mut texts: Vec<String> = all.iter().map(|r| r.text()).collect();
    texts.sort();
    assert_eq!(texts, ["FIRST", "SECOND"]);

    let one = read_barcodes(&view, &ReaderConfig::default().set_max_number_of_symbols(1));
    assert_eq!(one.len(), 1);
}
