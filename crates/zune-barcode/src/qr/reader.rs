/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Locate and decode every QR symbol in a binarized image
use crate::bitmatrix::BitMatrix;
use crate::config::ReaderConfig;
use crate::format::BarcodeFormat;
use crate::log::{debug, trace};
use crate::qr::decoder::{decode_grid, DecodedGrid};
use crate::qr::detector::{detect_pure, find_finder_patterns, finder_triples, sample_triple, Detection};
use crate::symbol::{Barcode, StructuredAppendInfo};

fn to_barcode(decoded: DecodedGrid, detection: Detection, config: &ReaderConfig) -> Barcode {
    let mut barcode = Barcode::new(BarcodeFormat::QRCode, decoded.content, detection.position)
        .with_ec_level(decoded.level.name())
        .with_version(decoded.version.to_string())
        .with_mirrored(decoded.mirrored);

    if let Some(sequence) = decoded.sequence {
        barcode = barcode.with_structured_append(StructuredAppendInfo {
            index: i32::from(sequence.index),
            count: i32::from(sequence.count),
            id:    sequence.parity.to_string()
        });
    }
    if config.get_return_symbol_image() {
        let grid = if decoded.mirrored {
            detection.grid.transposed()
        } else {
            detection.grid
        };
        barcode = barcode.with_symbol(grid);
    }
    barcode
}

/// Read up to `max_symbols` QR symbols from `matrix`
///
/// Symbols that were located but did not decode are included only
/// when the configuration asks for errors.
pub fn read(matrix: &BitMatrix, config: &ReaderConfig, max_symbols: usize) -> Vec<Barcode> {
    let charset = config.get_character_set();

    if config.get_is_pure() {
        let Some(detection) = detect_pure(matrix) else {
            return Vec::new();
        };
        return match decode_grid(&detection.grid, charset) {
            Ok(decoded) => vec![to_barcode(decoded, detection, config)],
            Err(e) if config.get_return_errors() => {
                vec![Barcode::failed(BarcodeFormat::QRCode, e, detection.position)]
            }
            Err(e) => {
                debug!("pure QR symbol did not decode: {e}");
                Vec::new()
            }
        };
    }

    let patterns = find_finder_patterns(matrix, config.get_try_harder());
    let triples = finder_triples(&patterns);
    let mut used = vec![false; patterns.len()];
    let mut results = Vec::new();
    let mut failures: Vec<([usize; 3], Barcode)> = Vec::new();

    for triple in &triples {
        if results.len() >= max_symbols {
            break;
        }
        if triple.indices.iter().any(|i| used[*i]) {
            continue;
        }
        let Some(detection) = sample_triple(matrix, triple) else {
            continue;
        };
        match decode_grid(&detection.grid, charset) {
            Ok(decoded) => {
                triple.indices.iter().for_each(|i| used[*i] = true);
                results.push(to_barcode(decoded, detection, config));
            }
            Err(e) => {
                trace!("finder triple {:?} did not decode: {e}", triple.indices);
                let overlaps = failures
                    .iter()
                    .any(|(indices, _)| indices.iter().any(|i| triple.indices.contains(i)));
                if config.get_return_errors() && !overlaps {
                    failures.push((
                        triple.indices,
                        Barcode::failed(BarcodeFormat::QRCode, e, detection.position)
                    ));
                }
            }
        }
    }
    // a failure is only reported when none of its finders decoded later on
    for (indices, barcode) in failures {
        if results.len() >= max_symbols {
            break;
        }
        if indices.iter().all(|i| !used[*i]) {
            results.push(barcode);
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::qr::encoder::{encode, QrOptions, SequenceHeader};

    fn paste(canvas: &mut BitMatrix, symbol: &BitMatrix, left: usize, top: usize, scale: usize) {
        for y in 0..symbol.height() {
            for x in 0..symbol.width() {
                if symbol.get(x, y) {
                    canvas.set_region(left + x * scale, top + y * scale, scale, scale);
                }
            }
        }
    }

    #[test]
    fn reads_a_sequence_of_symbols() {
        let message = b"ABCDEFGHIJKLMNO";
        let parity = message.iter().fold(0u8, |acc, x| acc ^ x);
        let mut canvas = BitMatrix::new(3 * 120 + 20, 140);

        for (i, chunk) in message.chunks(5).enumerate() {
            let symbol = encode(chunk, &QrOptions {
                sequence: Some(SequenceHeader {
                    index: i as u8,
                    count: 3,
                    parity
                }),
                ..QrOptions::default()
            })
            .unwrap();
            paste(&mut canvas, &symbol.modules, 20 + i * 120, 20, 4);
        }
        let config = ReaderConfig::default();
        let mut results = read(&canvas, &config, 255);
        assert_eq!(results.len(), 3);

        results.sort_by_key(|r| r.sequence_index());
        for (i, result) in results.iter().enumerate() {
            assert!(result.is_valid());
            assert_eq!(result.sequence_index(), i as i32);
            assert_eq!(result.sequence_size(), 3);
            assert_eq!(result.sequence_id(), parity.to_string());
            assert_eq!(result.bytes(), &message[i * 5..i * 5 + 5]);
        }
    }

    #[test]
    fn respects_the_symbol_limit_and_pure_mode() {
        let symbol = encode(b"LIMIT", &QrOptions::default()).unwrap();
        let mut canvas = BitMatrix::new(260, 120);
        paste(&mut canvas, &symbol.modules, 10, 10, 4);
        paste(&mut canvas, &symbol.modules, 140, 10, 4);
        assert_eq!(read(&canvas, &ReaderConfig::default(), 1).len(), 1);
        assert_eq!(read(&canvas, &ReaderConfig::default(), 5).len(), 2);

        let mut single = BitMatrix::new(120, 120);
        paste(&mut single, &symbol.modules, 8, 8, 4);
        let config = ReaderConfig::default().set_is_pure(true).set_return_symbol_image(true);
        let results = read(&single, &config, 1);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].text(), "LIMIT");
        assert_eq!(results[0].symbol(), Some(&symbol.modules));
    }
}
