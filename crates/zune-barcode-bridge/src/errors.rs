/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Errors raised inside the bridge and the descriptors they
//! are translated into at the boundary
use std::fmt::{Debug, Display, Formatter};

use zune_barcode::BarcodeError;
#[cfg(feature = "jpeg")]
use zune_jpeg::errors::DecodeErrors;
use zune_png::error::PngDecodeErrors;

/// Classification of a failure, as seen by the host
///
/// Discriminants are part of the boundary schema, new kinds are
/// appended and existing ones never renumbered.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ErrorKind {
    /// No error
    #[default]
    None = 0,
    /// The requested format is unknown or can not be handled
    UnsupportedFormat = 1,
    /// The input bytes are not a decodable raster image
    ImageLoad = 2,
    /// The engine rejected the input or its options
    Engine = 3,
    /// A fault that could not be classified
    Unknown = 4,
    /// A located symbol had an invalid structure
    Format = 5,
    /// A located symbol failed error correction or a check digit
    Checksum = 6
}

impl ErrorKind {
    pub fn from_raw(value: u32) -> Option<ErrorKind> {
        Some(match value {
            0 => ErrorKind::None,
            1 => ErrorKind::UnsupportedFormat,
            2 => ErrorKind::ImageLoad,
            3 => ErrorKind::Engine,
            4 => ErrorKind::Unknown,
            5 => ErrorKind::Format,
            6 => ErrorKind::Checksum,
            _ => return None
        })
    }

    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            ErrorKind::None => "",
            ErrorKind::UnsupportedFormat => "UnsupportedFormatError",
            ErrorKind::ImageLoad => "ImageLoadError",
            ErrorKind::Engine => "EngineError",
            ErrorKind::Unknown => "UnknownError",
            ErrorKind::Format => "FormatError",
            ErrorKind::Checksum => "ChecksumError"
        }
    }
}

/// Errors possible while serving a bridge call
pub enum BridgeError {
    /// The format is unknown or the engine can not handle it
    UnsupportedFormat(String),
    /// The compressed image container was not recognised
    ImageLoad(String),
    /// The engine failed
    Engine(BarcodeError),
    /// The PNG decoder rejected the image
    PngDecode(PngDecodeErrors),
    /// The JPEG decoder rejected the image
    #[cfg(feature = "jpeg")]
    JpegDecode(DecodeErrors),
    /// A panic or any other fault without a better description
    Unknown(String)
}

impl BridgeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::ImageLoad(_) | Self::PngDecode(_) => ErrorKind::ImageLoad,
            #[cfg(feature = "jpeg")]
            Self::JpegDecode(_) => ErrorKind::ImageLoad,
            Self::Engine(err) => match err {
                BarcodeError::Unsupported(_) => ErrorKind::UnsupportedFormat,
                BarcodeError::Format(_) => ErrorKind::Format,
                BarcodeError::Checksum(_) => ErrorKind::Checksum,
                _ => ErrorKind::Engine
            },
            Self::Unknown(_) => ErrorKind::Unknown
        }
    }

    /// Message shown to the host, without the kind prefix
    pub fn message(&self) -> String {
        match self {
            Self::UnsupportedFormat(msg) | Self::ImageLoad(msg) | Self::Unknown(msg) => msg.clone(),
            Self::Engine(err) => err.message().to_string(),
            Self::PngDecode(err) => format!("could not decode PNG: {err:?}").trim_end().to_string(),
            #[cfg(feature = "jpeg")]
            Self::JpegDecode(err) => format!("could not decode JPEG: {err:?}").trim_end().to_string()
        }
    }

    pub fn to_descriptor(&self) -> ErrorDescriptor {
        ErrorDescriptor::new(self.kind(), self.message())
    }
}

impl Debug for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedFormat(msg) => writeln!(f, "Unsupported format: {msg}"),
            Self::ImageLoad(msg) => writeln!(f, "Could not load image: {msg}"),
            Self::Engine(err) => writeln!(f, "Engine error: {err:?}"),
            Self::PngDecode(err) => writeln!(f, "PNG error: {err:?}"),
            #[cfg(feature = "jpeg")]
            Self::JpegDecode(err) => writeln!(f, "JPEG error: {err:?}"),
            Self::Unknown(msg) => writeln!(f, "Unknown error: {msg}")
        }
    }
}

impl Display for BridgeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind().name(), self.message())
    }
}

impl std::error::Error for BridgeError {}

impl From<BarcodeError> for BridgeError {
    fn from(value: BarcodeError) -> Self {
        Self::Engine(value)
    }
}

impl From<PngDecodeErrors> for BridgeError {
    fn from(value: PngDecodeErrors) -> Self {
        Self::PngDecode(value)
    }
}

#[cfg(feature = "jpeg")]
impl From<DecodeErrors> for BridgeError {
    fn from(value: DecodeErrors) -> Self {
        Self::JpegDecode(value)
    }
}

/// An inspectable failure carried by result records
///
/// The empty descriptor (kind [`ErrorKind::None`], no message) means
/// that nothing failed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorDescriptor {
    pub kind:    ErrorKind,
    pub message: String
}

impl ErrorDescriptor {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> ErrorDescriptor {
        ErrorDescriptor {
            kind,
            message: message.into()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind == ErrorKind::None
    }

    pub(crate) fn from_engine(err: &BarcodeError) -> ErrorDescriptor {
        BridgeError::Engine(err.clone()).to_descriptor()
    }
}

impl Display for ErrorDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        write!(f, "{}: {}", self.kind.name(), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_keep_their_class() {
        let err = BridgeError::from(BarcodeError::Checksum("too many errors".to_string()));
        assert_eq!(err.kind(), ErrorKind::Checksum);
        assert_eq!(err.to_string(), "ChecksumError: too many errors");

        let err = BridgeError::from(BarcodeError::Unsupported("Unsupported format: Aztec".to_string()));
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(err.message(), "Unsupported format: Aztec");

        let err = BridgeError::from(BarcodeError::InvalidInput("bad".to_string()));
        assert_eq!(err.kind(), ErrorKind::Engine);
    }

    #[test]
    fn descriptors() {
        assert!(ErrorDescriptor::default().is_empty());
        assert_eq!(ErrorDescriptor::default().to_string(), "");

        let desc = BridgeError::ImageLoad("not an image".to_string()).to_descriptor();
        assert_eq!(desc.kind, ErrorKind::ImageLoad);
        assert_eq!(desc.to_string(), "ImageLoadError: not an image");
    }

    #[test]
    fn kinds_round_trip_through_raw() {
        for raw in 0..7 {
            assert_eq!(ErrorKind::from_raw(raw).map(ErrorKind::to_raw), Some(raw));
        }
        assert_eq!(ErrorKind::from_raw(7), None);
    }
}
