/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Copying engine output into owned result records
//!
//! Nothing returned from here borrows from the input buffer or from
//! the engine, every byte is copied into the record.
use zune_barcode::bitmatrix::BitMatrix;
use zune_barcode::{Barcode, Bitmap, PointI, Position};

use crate::errors::ErrorDescriptor;
use crate::result::{DecodedSymbol, LumaImage, Point, Quadrilateral};

fn point(p: PointI) -> Point {
    Point { x: p.x, y: p.y }
}

fn quadrilateral(position: &Position) -> Quadrilateral {
    Quadrilateral {
        top_left:     point(position.top_left),
        top_right:    point(position.top_right),
        bottom_right: point(position.bottom_right),
        bottom_left:  point(position.bottom_left)
    }
}

pub(crate) fn matrix_image(matrix: &BitMatrix) -> LumaImage {
    LumaImage {
        width:  matrix.width(),
        height: matrix.height(),
        pixels: matrix.to_luma()
    }
}

pub(crate) fn bitmap_image(bitmap: Bitmap) -> LumaImage {
    LumaImage {
        width:  bitmap.width(),
        height: bitmap.height(),
        pixels: bitmap.into_pixels()
    }
}

/// Copy one engine result into a record
///
/// Symbols outside a sequence are normalised to size 1, index 0 and
/// an empty id.
pub fn decoded_symbol(barcode: &Barcode) -> DecodedSymbol {
    let (sequence_size, sequence_index, sequence_id) = if barcode.sequence_size() > 1 {
        (
            barcode.sequence_size(),
            barcode.sequence_index().max(0),
            barcode.sequence_id().to_string()
        )
    } else {
        (1, 0, String::new())
    };
    let error = match barcode.error() {
        Some(err) => ErrorDescriptor::from_engine(err),
        None => ErrorDescriptor::default()
    };

    DecodedSymbol {
        is_valid: barcode.is_valid(),
        error,
        format: barcode.format(),
        bytes: barcode.bytes().to_vec(),
        bytes_eci: barcode.bytes_eci(),
        text: barcode.text(),
        ec_level: barcode.ec_level().to_string(),
        content_type: barcode.content_type(),
        has_eci: barcode.has_eci(),
        position: quadrilateral(barcode.position()),
        orientation: barcode.orientation(),
        is_mirrored: barcode.is_mirrored(),
        is_inverted: barcode.is_inverted(),
        symbology_identifier: barcode.symbology_identifier(),
        sequence_size,
        sequence_index,
        sequence_id,
        reader_init: barcode.reader_init(),
        line_count: barcode.line_count(),
        version: barcode.version().to_string(),
        symbol_image: barcode.symbol().map(matrix_image),
        ..DecodedSymbol::default()
    }
}

/// Join the parts of one structured append sequence into a single
/// result
///
/// `parts` may be in any order and may contain unrelated results, the
/// first valid sequence part decides which sequence is merged. Returns
/// `None` unless every part of that sequence is present and valid.
/// Decode calls never merge on their own, this is for hosts that want
/// the whole message.
pub fn merge_structured_append(parts: &[DecodedSymbol]) -> Option<DecodedSymbol> {
    let first = parts.iter().find(|p| p.is_valid && p.sequence_size > 1)?;
    let size = first.sequence_size;

    let mut sequence: Vec<&DecodedSymbol> = parts
        .iter()
        .filter(|p| {
            p.sequence_size == size && p.sequence_id == first.sequence_id && p.format == first.format
        })
        .collect();
    sequence.sort_by_key(|p| p.sequence_index);
    sequence.dedup_by_key(|p| p.sequence_index);

    let complete = sequence.len() == size as usize
        && sequence
            .iter()
            .enumerate()
            .all(|(i, p)| p.is_valid && p.sequence_index == i as i32);
    if !complete {
        return None;
    }

    let mut merged = DecodedSymbol {
        is_valid: true,
        format: first.format,
        ec_level: first.ec_level.clone(),
        content_type: first.content_type,
        position: sequence[0].position,
        orientation: sequence[0].orientation,
        symbology_identifier: sequence[0].symbology_identifier.clone(),
        version: first.version.clone(),
        ..DecodedSymbol::default()
    };
    for part in sequence {
        merged.bytes.extend_from_slice(&part.bytes);
        merged.bytes_eci.extend_from_slice(&part.bytes_eci);
        merged.text.push_str(&part.text);
        merged.has_eci |= part.has_eci;
        merged.is_mirrored |= part.is_mirrored;
        merged.is_inverted |= part.is_inverted;
    }
    Some(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use zune_barcode::BarcodeFormat;

    fn part(index: i32, size: i32, id: &str, text: &str) -> DecodedSymbol {
        DecodedSymbol {
            is_valid: true,
            format: BarcodeFormat::QRCode,
            bytes: text.as_bytes().to_vec(),
            text: text.to_string(),
            sequence_size: size,
            sequence_index: index,
            sequence_id: id.to_string(),
            ..DecodedSymbol::default()
        }
    }

    #[test]
    fn merges_in_index_order() {
        let parts = [
            part(2, 3, "7", "baz"),
            part(0, 3, "7", "foo"),
            part(0, 2, "9", "other"),
            part(1, 3, "7", "bar")
        ];
        let merged = merge_structured_append(&parts).unwrap();
        assert_eq!(merged.text, "foobarbaz");
        assert_eq!(merged.bytes, b"foobarbaz");
        assert_eq!(merged.sequence_size, 1);
        assert_eq!(merged.sequence_index, 0);
        assert!(merged.sequence_id.is_empty());
    }

    #[test]
    fn incomplete_sequences_do_not_merge() {
        assert!(merge_structured_append(&[]).is_none());
        assert!(merge_structured_append(&[part(0, 3, "7", "a"), part(2, 3, "7", "c")]).is_none());
        assert!(merge_structured_append(&[part(0, 1, "", "single")]).is_none());

        let mut broken = part(1, 2, "7", "b");
        broken.is_valid = false;
        assert!(merge_structured_append(&[part(0, 2, "7", "a"), broken]).is_none());
    }
}
