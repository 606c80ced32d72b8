/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

use std::path::{Path, PathBuf};

use serde::Deserialize;
use zune_barcode_bridge::ErrorKind;

mod round_trip;

#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
pub enum JsonErrorKind {
    UnsupportedFormat,
    ImageLoad,
    Engine,
    Unknown,
    Format,
    Checksum
}

impl JsonErrorKind {
    pub fn to_kind(self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat => ErrorKind::UnsupportedFormat,
            Self::ImageLoad => ErrorKind::ImageLoad,
            Self::Engine => ErrorKind::Engine,
            Self::Unknown => ErrorKind::Unknown,
            Self::Format => ErrorKind::Format,
            Self::Checksum => ErrorKind::Checksum
        }
    }
}

/// One encode then decode case
#[derive(Clone, Deserialize, Debug)]
pub struct TestEntry {
    pub name:         String,
    pub text:         String,
    pub format:       String,
    pub ec_level:     Option<String>,
    pub scale:        Option<u16>,
    pub expect_text:  Option<String>,
    pub symbology:    Option<String>,
    pub expect_error: Option<JsonErrorKind>
}

pub fn cases_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests")
}
