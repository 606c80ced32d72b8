/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::fs::read;

use zune_barcode_bridge::{
    decode_from_compressed_image, encode_text_to_representations, ErrorKind, ReaderOptions,
    WriterOptions
};

use crate::{cases_path, TestEntry};

/// Returns a description of what went wrong, if anything did
fn run_case(case: &TestEntry) -> Option<String> {
    let mut options = WriterOptions::default()
        .set_format_name(case.format.as_str())
        .set_scale(case.scale.unwrap_or(0));
    if let Some(level) = &case.ec_level {
        options = options.set_ec_level(level.as_str());
    }
    let encoded = encode_text_to_representations(&case.text, &options);

    if let Some(kind) = case.expect_error {
        if encoded.error.kind != kind.to_kind() {
            return Some(format!("expected {kind:?}, got {:?}", encoded.error));
        }
        if !encoded.image.is_empty() || !encoded.svg.is_empty() {
            return Some("representations present on error".to_string());
        }
        return None;
    }
    if encoded.error.kind != ErrorKind::None {
        return Some(format!("encoding failed: {}", encoded.error));
    }

    let results = decode_from_compressed_image(&encoded.image, &ReaderOptions::default());
    let [result] = results.as_slice() else {
        return Some(format!("expected one result, got {}", results.len()));
    };
    if result.format != encoded.format {
        return Some(format!("read as {}, written as {}", result.format, encoded.format));
    }
    if let Some(text) = &case.expect_text {
        if &result.text != text {
            return Some(format!("read {:?}, expected {text:?}", result.text));
        }
    }
    if let Some(symbology) = &case.symbology {
        if &result.symbology_identifier != symbology {
            return Some(format!("symbology {:?}", result.symbology_identifier));
        }
    }
    None
}

#[test]
fn test_round_trip_cases() {
    let file = cases_path().join("round_trip.json");
    let json_file = read(file).unwrap();
    let cases: Vec<TestEntry> = serde_json::from_slice(&json_file).unwrap();
    assert!(!cases.is_empty());

    let mut failures = Vec::new();
    for case in &cases {
        if let Some(reason) = run_case(case) {
            eprintln!("Case {} failed: {reason}\nConfig:{case:#?}\n", case.name);
            failures.push(case.name.clone());
        }
    }
    if !failures.is_empty() {
        panic!("Errors found during round trips\n {:#?}", failures);
    }
}
