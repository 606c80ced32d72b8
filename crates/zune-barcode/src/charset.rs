/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Character sets and their Extended Channel Interpretation numbers
#![allow(non_camel_case_types, clippy::upper_case_acronyms)]

use std::fmt::{Display, Formatter};

use encoding_rs::Encoding;

use crate::errors::BarcodeError;

/// Character sets a symbol's payload may be interpreted in
///
/// `Unknown` asks readers to guess the encoding and writers
/// to pick their symbology default.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum CharacterSet {
    #[default]
    Unknown = 0,
    ASCII = 1,
    ISO8859_1 = 2,
    ISO8859_2 = 3,
    ISO8859_3 = 4,
    ISO8859_4 = 5,
    ISO8859_5 = 6,
    ISO8859_6 = 7,
    ISO8859_7 = 8,
    ISO8859_8 = 9,
    ISO8859_9 = 10,
    ISO8859_10 = 11,
    ISO8859_11 = 12,
    ISO8859_13 = 13,
    ISO8859_14 = 14,
    ISO8859_15 = 15,
    ISO8859_16 = 16,
    Cp437 = 17,
    Cp1250 = 18,
    Cp1251 = 19,
    Cp1252 = 20,
    Cp1256 = 21,
    Shift_JIS = 22,
    Big5 = 23,
    GB2312 = 24,
    GB18030 = 25,
    EUC_JP = 26,
    EUC_KR = 27,
    UTF16BE = 28,
    UTF8 = 29,
    UTF16LE = 30,
    UTF32BE = 31,
    UTF32LE = 32,
    BINARY = 33
}

#[rustfmt::skip]
const CHARSETS: [(CharacterSet, &str); 34] = [
    (CharacterSet::Unknown, "Unknown"),
    (CharacterSet::ASCII, "ASCII"),
    (CharacterSet::ISO8859_1, "ISO8859_1"),
    (CharacterSet::ISO8859_2, "ISO8859_2"),
    (CharacterSet::ISO8859_3, "ISO8859_3"),
    (CharacterSet::ISO8859_4, "ISO8859_4"),
    (CharacterSet::ISO8859_5, "ISO8859_5"),
    (CharacterSet::ISO8859_6, "ISO8859_6"),
    (CharacterSet::ISO8859_7, "ISO8859_7"),
    (CharacterSet::ISO8859_8, "ISO8859_8"),
    (CharacterSet::ISO8859_9, "ISO8859_9"),
    (CharacterSet::ISO8859_10, "ISO8859_10"),
    (CharacterSet::ISO8859_11, "ISO8859_11"),
    (CharacterSet::ISO8859_13, "ISO8859_13"),
    (CharacterSet::ISO8859_14, "ISO8859_14"),
    (CharacterSet::ISO8859_15, "ISO8859_15"),
    (CharacterSet::ISO8859_16, "ISO8859_16"),
    (CharacterSet::Cp437, "Cp437"),
    (CharacterSet::Cp1250, "Cp1250"),
    (CharacterSet::Cp1251, "Cp1251"),
    (CharacterSet::Cp1252, "Cp1252"),
    (CharacterSet::Cp1256, "Cp1256"),
    (CharacterSet::Shift_JIS, "Shift_JIS"),
    (CharacterSet::Big5, "Big5"),
    (CharacterSet::GB2312, "GB2312"),
    (CharacterSet::GB18030, "GB18030"),
    (CharacterSet::EUC_JP, "EUC_JP"),
    (CharacterSet::EUC_KR, "EUC_KR"),
    (CharacterSet::UTF16BE, "UTF16BE"),
    (CharacterSet::UTF8, "UTF8"),
    (CharacterSet::UTF16LE, "UTF16LE"),
    (CharacterSet::UTF32BE, "UTF32BE"),
    (CharacterSet::UTF32LE, "UTF32LE"),
    (CharacterSet::BINARY, "BINARY"),
];

/// Code page 437 characters for bytes 0x80..=0xFF
#[rustfmt::skip]
const CP437_HIGH: [char; 128] = [
    'Ç', 'ü', 'é', 'â', 'ä', 'à', 'å', 'ç', 'ê', 'ë', 'è', 'ï', 'î', 'ì', 'Ä', 'Å',
    'É', 'æ', 'Æ', 'ô', 'ö', 'ò', 'û', 'ù', 'ÿ', 'Ö', 'Ü', '¢', '£', '¥', '₧', 'ƒ',
    'á', 'í', 'ó', 'ú', 'ñ', 'Ñ', 'ª', 'º', '¿', '⌐', '¬', '½', '¼', '¡', '«', '»',
    '░', '▒', '▓', '│', '┤', '╡', '╢', '╖', '╕', '╣', '║', '╗', '╝', '╜', '╛', '┐',
    '└', '┴', '┬', '├', '─', '┼', '╞', '╟', '╚', '╔', '╩', '╦', '╠', '═', '╬', '╧',
    '╨', '╤', '╥', '╙', '╘', '╒', '╓', '╫', '╪', '┘', '┌', '█', '▄', '▌', '▐', '▀',
    'α', 'ß', 'Γ', 'π', 'Σ', 'σ', 'µ', 'τ', 'Φ', 'Θ', 'Ω', 'δ', '∞', 'φ', 'ε', '∩',
    '≡', '±', '≥', '≤', '⌠', '⌡', '÷', '≈', '°', '∙', '·', '√', 'ⁿ', '²', '■', '\u{a0}',
];

impl CharacterSet {
    /// Convert a raw discriminant, unknown values give `None`
    pub fn from_raw(value: u32) -> Option<CharacterSet> {
        CHARSETS
            .get(usize::try_from(value).ok()?)
            .map(|(set, _)| *set)
    }

    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    pub fn name(self) -> &'static str {
        CHARSETS[self as usize].1
    }

    /// Parse a character set name, case insensitive
    ///
    /// Besides the canonical names this accepts the common IANA
    /// spellings (`UTF-8`, `ISO-8859-1`, `Shift_JIS`, `UnicodeBig`).
    pub fn from_name(name: &str) -> Option<CharacterSet> {
        let norm: String = name
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .flat_map(char::to_lowercase)
            .collect();

        match norm.as_str() {
            "unicodebig" | "utf16" => return Some(CharacterSet::UTF16BE),
            "latin1" => return Some(CharacterSet::ISO8859_1),
            "sjis" => return Some(CharacterSet::Shift_JIS),
            "usascii" => return Some(CharacterSet::ASCII),
            "windows1252" => return Some(CharacterSet::Cp1252),
            _ => ()
        }
        CHARSETS
            .iter()
            .find(|(_, n)| n.replace('_', "").to_lowercase() == norm)
            .map(|(set, _)| *set)
    }

    /// Map an ECI designator to a character set
    ///
    /// Designators that are valid ECIs but not character sets, and
    /// unassigned ones, return [`CharacterSet::Unknown`].
    pub const fn from_eci(eci: u32) -> CharacterSet {
        match eci {
            0 | 2 => CharacterSet::Cp437,
            1 | 3 => CharacterSet::ISO8859_1,
            4 => CharacterSet::ISO8859_2,
            5 => CharacterSet::ISO8859_3,
            6 => CharacterSet::ISO8859_4,
            7 => CharacterSet::ISO8859_5,
            8 => CharacterSet::ISO8859_6,
            9 => CharacterSet::ISO8859_7,
            10 => CharacterSet::ISO8859_8,
            11 => CharacterSet::ISO8859_9,
            12 => CharacterSet::ISO8859_10,
            13 => CharacterSet::ISO8859_11,
            15 => CharacterSet::ISO8859_13,
            16 => CharacterSet::ISO8859_14,
            17 => CharacterSet::ISO8859_15,
            18 => CharacterSet::ISO8859_16,
            20 => CharacterSet::Shift_JIS,
            21 => CharacterSet::Cp1250,
            22 => CharacterSet::Cp1251,
            23 => CharacterSet::Cp1252,
            24 => CharacterSet::Cp1256,
            25 => CharacterSet::UTF16BE,
            26 => CharacterSet::UTF8,
            27 | 170 => CharacterSet::ASCII,
            28 => CharacterSet::Big5,
            29 => CharacterSet::GB2312,
            30 => CharacterSet::EUC_KR,
            32 => CharacterSet::GB18030,
            33 => CharacterSet::UTF16LE,
            34 => CharacterSet::UTF32BE,
            35 => CharacterSet::UTF32LE,
            899 => CharacterSet::BINARY,
            _ => CharacterSet::Unknown
        }
    }

    /// The preferred ECI designator for this character set
    pub const fn to_eci(self) -> Option<u32> {
        Some(match self {
            CharacterSet::Cp437 => 2,
            CharacterSet::ISO8859_1 => 3,
            CharacterSet::ISO8859_2 => 4,
            CharacterSet::ISO8859_3 => 5,
            CharacterSet::ISO8859_4 => 6,
            CharacterSet::ISO8859_5 => 7,
            CharacterSet::ISO8859_6 => 8,
            CharacterSet::ISO8859_7 => 9,
            CharacterSet::ISO8859_8 => 10,
            CharacterSet::ISO8859_9 => 11,
            CharacterSet::ISO8859_10 => 12,
            CharacterSet::ISO8859_11 => 13,
            CharacterSet::ISO8859_13 => 15,
            CharacterSet::ISO8859_14 => 16,
            CharacterSet::ISO8859_15 => 17,
            CharacterSet::ISO8859_16 => 18,
            CharacterSet::Shift_JIS => 20,
            CharacterSet::Cp1250 => 21,
            CharacterSet::Cp1251 => 22,
            CharacterSet::Cp1252 => 23,
            CharacterSet::Cp1256 => 24,
            CharacterSet::UTF16BE => 25,
            CharacterSet::UTF8 => 26,
            CharacterSet::ASCII => 27,
            CharacterSet::Big5 => 28,
            CharacterSet::GB2312 => 29,
            CharacterSet::EUC_KR => 30,
            CharacterSet::GB18030 => 32,
            CharacterSet::UTF16LE => 33,
            CharacterSet::UTF32BE => 34,
            CharacterSet::UTF32LE => 35,
            CharacterSet::BINARY => 899,
            CharacterSet::Unknown | CharacterSet::EUC_JP => return None
        })
    }

    /// The WHATWG encoding that implements this set
    ///
    /// ISO-8859-9 and ISO-8859-11 map to their Windows supersets,
    /// see [`CharacterSet::has_c1_controls`].
    fn whatwg(self) -> Option<&'static Encoding> {
        Some(match self {
            CharacterSet::ISO8859_2 => encoding_rs::ISO_8859_2,
            CharacterSet::ISO8859_3 => encoding_rs::ISO_8859_3,
            CharacterSet::ISO8859_4 => encoding_rs::ISO_8859_4,
            CharacterSet::ISO8859_5 => encoding_rs::ISO_8859_5,
            CharacterSet::ISO8859_6 => encoding_rs::ISO_8859_6,
            CharacterSet::ISO8859_7 => encoding_rs::ISO_8859_7,
            CharacterSet::ISO8859_8 => encoding_rs::ISO_8859_8,
            CharacterSet::ISO8859_9 => encoding_rs::WINDOWS_1254,
            CharacterSet::ISO8859_10 => encoding_rs::ISO_8859_10,
            CharacterSet::ISO8859_11 => encoding_rs::WINDOWS_874,
            CharacterSet::ISO8859_13 => encoding_rs::ISO_8859_13,
            CharacterSet::ISO8859_14 => encoding_rs::ISO_8859_14,
            CharacterSet::ISO8859_15 => encoding_rs::ISO_8859_15,
            CharacterSet::ISO8859_16 => encoding_rs::ISO_8859_16,
            CharacterSet::Cp1250 => encoding_rs::WINDOWS_1250,
            CharacterSet::Cp1251 => encoding_rs::WINDOWS_1251,
            CharacterSet::Cp1252 => encoding_rs::WINDOWS_1252,
            CharacterSet::Cp1256 => encoding_rs::WINDOWS_1256,
            CharacterSet::Shift_JIS => encoding_rs::SHIFT_JIS,
            CharacterSet::Big5 => encoding_rs::BIG5,
            // GBK is the WHATWG reading of the GB2312 label
            CharacterSet::GB2312 => encoding_rs::GBK,
            CharacterSet::GB18030 => encoding_rs::GB18030,
            CharacterSet::EUC_JP => encoding_rs::EUC_JP,
            CharacterSet::EUC_KR => encoding_rs::EUC_KR,
            _ => return None
        })
    }

    /// Bytes 0x80..=0x9F are C1 controls in this set but printable
    /// in the encoding [`CharacterSet::whatwg`] returns for it
    const fn has_c1_controls(self) -> bool {
        matches!(self, CharacterSet::ISO8859_9 | CharacterSet::ISO8859_11)
    }

    /// Decode bytes into text
    ///
    /// `Unknown` and `BINARY` are read as Latin-1, invalid
    /// sequences become U+FFFD.
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            CharacterSet::UTF8 => String::from_utf8_lossy(bytes).into_owned(),
            CharacterSet::UTF16BE => decode_utf16(bytes, u16::from_be_bytes),
            CharacterSet::UTF16LE => decode_utf16(bytes, u16::from_le_bytes),
            CharacterSet::UTF32BE => decode_utf32(bytes, u32::from_be_bytes),
            CharacterSet::UTF32LE => decode_utf32(bytes, u32::from_le_bytes),
            CharacterSet::ASCII => bytes
                .iter()
                .map(|&b| if b < 0x80 { char::from(b) } else { char::REPLACEMENT_CHARACTER })
                .collect(),
            CharacterSet::Cp437 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0xFF => CP437_HIGH[usize::from(b - 0x80)],
                    _ => char::from(b)
                })
                .collect(),
            CharacterSet::ISO8859_1 | CharacterSet::BINARY | CharacterSet::Unknown => {
                bytes.iter().map(|&b| char::from(b)).collect()
            }
            other => match other.whatwg() {
                Some(encoding) => {
                    let (text, _) = encoding.decode_without_bom_handling(bytes);
                    if !other.has_c1_controls() {
                        return text.into_owned();
                    }
                    // single byte sets decode to one char per byte
                    text.chars()
                        .zip(bytes)
                        .map(|(c, &b)| if (0x80..=0x9F).contains(&b) { char::from(b) } else { c })
                        .collect()
                }
                None => bytes.iter().map(|&b| char::from(b)).collect()
            }
        }
    }

    /// Encode text into bytes of this character set
    ///
    /// `Unknown` encodes as UTF-8. Text with characters the set can
    /// not represent is an [`BarcodeError::InvalidInput`].
    pub fn encode(self, text: &str) -> Result<Vec<u8>, BarcodeError> {
        let unrepresentable = |c: char| {
            BarcodeError::InvalidInput(format!(
                "character {c:?} can not be represented in {}",
                self.name()
            ))
        };
        match self {
            CharacterSet::UTF8 | CharacterSet::Unknown => Ok(text.as_bytes().to_vec()),
            CharacterSet::UTF16BE => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            CharacterSet::UTF16LE => Ok(text.encode_utf16().flat_map(u16::to_le_bytes).collect()),
            CharacterSet::UTF32BE => Ok(text.chars().flat_map(|c| u32::from(c).to_be_bytes()).collect()),
            CharacterSet::UTF32LE => Ok(text.chars().flat_map(|c| u32::from(c).to_le_bytes()).collect()),
            CharacterSet::ASCII => text
                .chars()
                .map(|c| if c.is_ascii() { Ok(c as u8) } else { Err(unrepresentable(c)) })
                .collect(),
            CharacterSet::ISO8859_1 | CharacterSet::BINARY => text
                .chars()
                .map(|c| u8::try_from(u32::from(c)).map_err(|_| unrepresentable(c)))
                .collect(),
            CharacterSet::Cp437 => text
                .chars()
                .map(|c| {
                    if c.is_ascii() {
                        return Ok(c as u8);
                    }
                    match CP437_HIGH.iter().position(|x| *x == c) {
                        // position is below 128
                        Some(pos) => Ok(0x80 + pos as u8),
                        None => Err(unrepresentable(c))
                    }
                })
                .collect(),
            other => {
                let encoding = other.whatwg().ok_or_else(|| {
                    BarcodeError::InvalidInput(format!("no encoder for {}", other.name()))
                })?;
                let (bytes, _, unmappable) = encoding.encode(text);
                let c1 = other.has_c1_controls() && bytes.iter().any(|b| (0x80..=0x9F).contains(b));
                if unmappable || c1 {
                    // report the first character that does not survive
                    let culprit = text
                        .chars()
                        .find(|c| {
                            let mut buf = [0; 4];
                            let (one, _, bad) = encoding.encode(c.encode_utf8(&mut buf));
                            bad || (other.has_c1_controls() && one.iter().any(|b| (0x80..=0x9F).contains(b)))
                        })
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    return Err(unrepresentable(culprit));
                }
                Ok(bytes.into_owned())
            }
        }
    }

    /// Guess the character set of a payload without an ECI
    ///
    /// Valid UTF-8 containing multi byte sequences is taken as UTF-8,
    /// anything else as ISO-8859-1 which is the default for most
    /// symbologies.
    pub fn guess(bytes: &[u8]) -> CharacterSet {
        if bytes.is_ascii() {
            return CharacterSet::ISO8859_1;
        }
        if core::str::from_utf8(bytes).is_ok() {
            return CharacterSet::UTF8;
        }
        CharacterSet::ISO8859_1
    }
}

impl Display for CharacterSet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

fn decode_utf16(bytes: &[u8], read: fn([u8; 2]) -> u16) -> String {
    let units = bytes.chunks_exact(2).map(|x| read([x[0], x[1]]));
    let mut out: String = char::decode_utf16(units)
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if bytes.len() % 2 != 0 {
        out.push(char::REPLACEMENT_CHARACTER);
    }
    out
}

fn decode_utf32(bytes: &[u8], read: fn([u8; 4]) -> u32) -> String {
    let mut out: String = bytes
        .chunks_exact(4)
        .map(|x| char::from_u32(read([x[0], x[1], x[2], x[3]])).unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    if bytes.len() % 4 != 0 {
        out.push(char::REPLACEMENT_CHARACTER);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eci_mapping_is_consistent() {
        for raw in 0..34 {
            let set = CharacterSet::from_raw(raw).unwrap();
            if let Some(eci) = set.to_eci() {
                assert_eq!(CharacterSet::from_eci(eci), set, "{set}");
            }
        }
        assert_eq!(CharacterSet::from_eci(170), CharacterSet::ASCII);
        assert_eq!(CharacterSet::from_eci(14), CharacterSet::Unknown);
        assert_eq!(CharacterSet::from_raw(34), None);
    }

    #[test]
    fn names() {
        assert_eq!(CharacterSet::from_name("utf-8"), Some(CharacterSet::UTF8));
        assert_eq!(CharacterSet::from_name("ISO-8859-1"), Some(CharacterSet::ISO8859_1));
        assert_eq!(CharacterSet::from_name("UnicodeBig"), Some(CharacterSet::UTF16BE));
        assert_eq!(CharacterSet::from_name("Shift_JIS"), Some(CharacterSet::Shift_JIS));
        assert_eq!(CharacterSet::from_name("klingon"), None);
    }

    #[test]
    fn transcode_round_trip() {
        let text = "Grüße €";
        for set in [
            CharacterSet::UTF8,
            CharacterSet::UTF16BE,
            CharacterSet::UTF16LE,
            CharacterSet::UTF32BE,
            CharacterSet::UTF32LE,
            CharacterSet::ISO8859_15,
            CharacterSet::Cp1252
        ] {
            let bytes = set.encode(text).unwrap();
            assert_eq!(set.decode(&bytes), text, "{set}");
        }
        // no euro sign in latin-1
        assert!(CharacterSet::ISO8859_1.encode(text).is_err());
        assert!(CharacterSet::ASCII.encode("é").is_err());
    }

    #[test]
    fn multi_byte_and_regional_sets() {
        // the Kanji example of ISO/IEC 18004
        assert_eq!(CharacterSet::Shift_JIS.decode(&[0x93, 0x5F, 0xE4, 0xAA]), "点茗");
        assert_eq!(
            CharacterSet::Shift_JIS.encode("点茗").unwrap(),
            [0x93, 0x5F, 0xE4, 0xAA]
        );
        for (set, text) in [
            (CharacterSet::Shift_JIS, "バーコード"),
            (CharacterSet::EUC_JP, "バーコード"),
            (CharacterSet::Big5, "條碼"),
            (CharacterSet::GB2312, "条码"),
            (CharacterSet::GB18030, "条码"),
            (CharacterSet::EUC_KR, "바코드"),
            (CharacterSet::Cp1251, "Штрихкод"),
            (CharacterSet::ISO8859_5, "Штрихкод"),
            (CharacterSet::ISO8859_2, "Čárový kód"),
            (CharacterSet::Cp1250, "Kod kreskowy łąć"),
            (CharacterSet::ISO8859_7, "Γραμμωτός"),
            (CharacterSet::Cp1256, "رمز شريطي"),
            (CharacterSet::Cp437, "Straße ░▒▓"),
            (CharacterSet::ISO8859_9, "Barkod İşaret")
        ] {
            let bytes = set.encode(text).unwrap();
            assert_ne!(bytes, text.as_bytes(), "{set}");
            assert_eq!(set.decode(&bytes), text, "{set}");
        }
        assert!(CharacterSet::Big5.encode("رمز").is_err());
    }

    #[test]
    fn every_set_encodes_ascii() {
        for raw in 0..34 {
            let set = CharacterSet::from_raw(raw).unwrap();
            let bytes = set.encode("A").unwrap();
            assert_eq!(set.decode(&bytes), "A", "{set}");
        }
    }

    #[test]
    fn c1_controls_stay_controls() {
        // windows-1254 would read 0x80 as a euro sign
        assert_eq!(CharacterSet::ISO8859_9.decode(&[0x80, 0xDD]), "\u{80}İ");
        let err = CharacterSet::ISO8859_9.encode("5 €").unwrap_err();
        assert!(matches!(err, BarcodeError::InvalidInput(_)));
        assert!(format!("{err}").contains('€'));
    }

    #[test]
    fn guessing() {
        assert_eq!(CharacterSet::guess(b"HELLO"), CharacterSet::ISO8859_1);
        assert_eq!(CharacterSet::guess("ü".as_bytes()), CharacterSet::UTF8);
        assert_eq!(CharacterSet::guess(&[0xFC]), CharacterSet::ISO8859_1);
    }
}
