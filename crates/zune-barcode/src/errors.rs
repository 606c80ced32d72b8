/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors produced while reading or creating barcodes
use core::fmt::{Debug, Display, Formatter};

/// Possible errors that can occur while reading
/// or writing a barcode
#[derive(Clone, PartialEq, Eq)]
pub enum BarcodeError {
    /// The symbol was located but its structure is invalid,
    /// e.g. unreadable format information or a truncated bitstream
    Format(String),
    /// Error correction could not repair the symbol or a
    /// check digit did not match
    Checksum(String),
    /// The symbology is known but this engine can not handle it
    Unsupported(String),
    /// The contents can not be represented by the requested symbology
    InvalidInput(String),
    /// Static error messages
    GenericStatic(&'static str)
}

impl BarcodeError {
    /// Short name of the error class, stable across releases
    pub const fn class_name(&self) -> &'static str {
        match self {
            Self::Format(_) => "FormatError",
            Self::Checksum(_) => "ChecksumError",
            Self::Unsupported(_) => "Unsupported",
            Self::InvalidInput(_) | Self::GenericStatic(_) => "EngineError"
        }
    }

    /// The message without the class prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Format(msg)
            | Self::Checksum(msg)
            | Self::Unsupported(msg)
            | Self::InvalidInput(msg) => msg,
            Self::GenericStatic(msg) => msg
        }
    }
}

impl Debug for BarcodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Format(msg) => writeln!(f, "Invalid symbol structure: {msg}"),
            Self::Checksum(msg) => writeln!(f, "Checksum failure: {msg}"),
            Self::Unsupported(msg) => writeln!(f, "Unsupported: {msg}"),
            Self::InvalidInput(msg) => writeln!(f, "Invalid input: {msg}"),
            Self::GenericStatic(msg) => writeln!(f, "{msg}")
        }
    }
}

impl Display for BarcodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.class_name(), self.message())
    }
}

impl std::error::Error for BarcodeError {}

impl From<&'static str> for BarcodeError {
    fn from(val: &'static str) -> Self {
        Self::GenericStatic(val)
    }
}
