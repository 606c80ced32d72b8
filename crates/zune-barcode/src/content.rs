/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Decoded symbol payloads and their textual renderings
//!
//! A [`Content`] keeps the raw bytes of a symbol together with the
//! ECI switches found while decoding, text is only produced on request
//! in one of the [`TextMode`] renderings.
use std::fmt::Write;

use crate::charset::CharacterSet;

/// ECI designator reported for anything decoded as text
const ECI_UTF8: u32 = 26;
/// ECI designator for uninterpreted bytes
const ECI_BINARY: u32 = 899;

/// How the payload bytes are turned into the result text
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum TextMode {
    /// Bytes transcoded to UTF-8 following the ECI segments
    Plain = 0,
    /// Standard conforming ECI protocol output, prefixed with the
    /// symbology identifier and with `\` doubled
    ECI = 1,
    /// Human readable interpretation, GS1 element strings become `(AI)value`
    #[default]
    HRI = 2,
    /// Bytes as upper case hex pairs separated by spaces
    Hex = 3,
    /// Like `Plain` but control characters are written as `<GS>`
    Escaped = 4
}

impl TextMode {
    pub fn from_raw(value: u32) -> Option<TextMode> {
        match value {
            0 => Some(TextMode::Plain),
            1 => Some(TextMode::ECI),
            2 => Some(TextMode::HRI),
            3 => Some(TextMode::Hex),
            4 => Some(TextMode::Escaped),
            _ => None
        }
    }

    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            TextMode::Plain => "Plain",
            TextMode::ECI => "ECI",
            TextMode::HRI => "HRI",
            TextMode::Hex => "Hex",
            TextMode::Escaped => "Escaped"
        }
    }

    pub fn from_name(name: &str) -> Option<TextMode> {
        [
            TextMode::Plain,
            TextMode::ECI,
            TextMode::HRI,
            TextMode::Hex,
            TextMode::Escaped
        ]
        .into_iter()
        .find(|x| x.name().eq_ignore_ascii_case(name))
    }
}

/// Classification of a payload
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ContentType {
    #[default]
    Text = 0,
    Binary = 1,
    Mixed = 2,
    GS1 = 3,
    ISO15434 = 4,
    UnknownECI = 5
}

impl ContentType {
    pub fn from_raw(value: u32) -> Option<ContentType> {
        match value {
            0 => Some(ContentType::Text),
            1 => Some(ContentType::Binary),
            2 => Some(ContentType::Mixed),
            3 => Some(ContentType::GS1),
            4 => Some(ContentType::ISO15434),
            5 => Some(ContentType::UnknownECI),
            _ => None
        }
    }

    pub const fn to_raw(self) -> u32 {
        self as u32
    }

    pub const fn name(self) -> &'static str {
        match self {
            ContentType::Text => "Text",
            ContentType::Binary => "Binary",
            ContentType::Mixed => "Mixed",
            ContentType::GS1 => "GS1",
            ContentType::ISO15434 => "ISO15434",
            ContentType::UnknownECI => "UnknownECI"
        }
    }
}

/// Symbology identifier as defined by ISO/IEC 15424, e.g. `]Q1`
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SymbologyIdentifier {
    /// Symbology character, `Q` for QR Code, `C` for Code 128
    pub code:                u8,
    /// Modifier character, `'0'` and up
    pub modifier:            u8,
    /// Added to the modifier when the payload contains an ECI
    pub eci_modifier_offset: u8,
    /// The payload is a GS1 element string
    pub gs1:                 bool
}

impl SymbologyIdentifier {
    pub const fn new(code: u8, modifier: u8, eci_modifier_offset: u8) -> SymbologyIdentifier {
        SymbologyIdentifier {
            code,
            modifier,
            eci_modifier_offset,
            gs1: false
        }
    }

    /// Render as `]` + code + modifier, or an empty string when unset
    pub fn to_string(&self, has_eci: bool) -> String {
        if self.code <= b' ' {
            return String::new();
        }
        let modifier = if has_eci {
            self.modifier + self.eci_modifier_offset
        } else {
            self.modifier
        };
        format!("]{}{}", char::from(self.code), char::from(modifier))
    }
}

/// What decides the character set of the bytes after a switch
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Designation {
    /// An ECI found in the symbol
    Eci(u32),
    /// Implied by the segment mode, QR Kanji segments are Shift_JIS
    Mode(CharacterSet),
    /// Back to the hinted or guessed set
    Fallback
}

/// Raw symbol payload with its ECI segments
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Content {
    bytes:      Vec<u8>,
    /// `(start offset, designation)` in increasing offset order
    encodings:  Vec<(usize, Designation)>,
    symbology:  SymbologyIdentifier,
    /// Character set assumed for bytes not covered by an ECI
    hint:       CharacterSet
}

impl Content {
    pub fn new(symbology: SymbologyIdentifier) -> Content {
        Content {
            symbology,
            ..Content::default()
        }
    }

    /// Content holding plain bytes with no ECI
    pub fn from_bytes(bytes: &[u8], symbology: SymbologyIdentifier) -> Content {
        let mut content = Content::new(symbology);
        content.append(bytes);
        content
    }

    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub fn append(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Bytes from now on are in the character set named by `eci`
    pub fn switch_encoding(&mut self, eci: u32) {
        self.switch(Designation::Eci(eci));
    }

    /// Append bytes whose character set is fixed by the segment mode
    ///
    /// Bytes appended afterwards go back to the previous character set.
    /// This is not an ECI, [`Content::has_eci`] is unaffected.
    pub fn append_in(&mut self, charset: CharacterSet, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let previous = self.encodings.last().map_or(Designation::Fallback, |x| x.1);
        self.switch(Designation::Mode(charset));
        self.append(bytes);
        self.switch(previous);
    }

    fn switch(&mut self, designation: Designation) {
        let offset = self.bytes.len();
        // a switch directly after another one replaces it
        if let Some(last) = self.encodings.last_mut() {
            if last.0 == offset {
                last.1 = designation;
                return;
            }
        }
        self.encodings.push((offset, designation));
    }

    /// Fall back character set for bytes not covered by an ECI
    pub fn set_hint(&mut self, hint: CharacterSet) {
        self.hint = hint;
    }

    pub fn set_symbology(&mut self, symbology: SymbologyIdentifier) {
        self.symbology = symbology;
    }

    pub fn symbology(&self) -> SymbologyIdentifier {
        self.symbology
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn has_eci(&self) -> bool {
        self.encodings
            .iter()
            .any(|(_, d)| matches!(d, Designation::Eci(_)))
    }

    /// Whether every ECI names a character set we can transcode
    pub fn can_process(&self) -> bool {
        self.encodings.iter().all(|(_, d)| match d {
            Designation::Eci(eci) => *eci == ECI_BINARY || CharacterSet::from_eci(*eci) != CharacterSet::Unknown,
            _ => true
        })
    }

    /// `(charset, byte range)` for every non empty segment of the payload
    fn blocks(&self) -> Vec<(CharacterSet, core::ops::Range<usize>)> {
        let mut spans = Vec::with_capacity(self.encodings.len() + 1);
        let first = self.encodings.first().map_or(self.bytes.len(), |x| x.0);
        spans.push((Designation::Fallback, 0..first));

        for (i, (start, designation)) in self.encodings.iter().enumerate() {
            let end = self
                .encodings
                .get(i + 1)
                .map_or(self.bytes.len(), |x| x.0);
            spans.push((*designation, *start..end));
        }
        spans.retain(|(_, range)| !range.is_empty());

        let fixed = |d: &Designation| match d {
            Designation::Mode(cs) => Some(*cs),
            Designation::Eci(eci) => match CharacterSet::from_eci(*eci) {
                CharacterSet::Unknown => None,
                cs => Some(cs)
            },
            Designation::Fallback => None
        };
        let fallback = if self.hint != CharacterSet::Unknown {
            self.hint
        } else {
            // guess from the bytes nothing else claims
            let unclaimed: Vec<u8> = spans
                .iter()
                .filter(|(d, _)| fixed(d).is_none())
                .flat_map(|(_, range)| self.bytes[range.clone()].iter().copied())
                .collect();
            CharacterSet::guess(&unclaimed)
        };
        spans
            .into_iter()
            .map(|(d, range)| (fixed(&d).unwrap_or(fallback), range))
            .collect()
    }

    /// Classify the payload
    pub fn content_type(&self) -> ContentType {
        if self.bytes.is_empty() {
            return ContentType::Text;
        }
        if !self.can_process() {
            return ContentType::UnknownECI;
        }
        if self.symbology.gs1 {
            return ContentType::GS1;
        }
        if self.bytes.starts_with(b"[)>\x1E") {
            return ContentType::ISO15434;
        }
        let mut binary = 0;
        for (charset, range) in self.blocks() {
            if charset == CharacterSet::BINARY {
                binary += range.len();
                continue;
            }
            binary += self.bytes[range]
                .iter()
                .filter(|c| is_binary_byte(**c))
                .count();
        }
        match binary {
            0 => ContentType::Text,
            n if n == self.bytes.len() => ContentType::Binary,
            _ => ContentType::Mixed
        }
    }

    fn render(&self, with_eci: bool) -> String {
        if self.bytes.is_empty() || !self.can_process() {
            return String::new();
        }
        let mut out = String::with_capacity(self.bytes.len() + 8);
        if with_eci {
            out.push_str(&self.symbology.to_string(true));
        }
        let mut last_eci = None;

        for (charset, range) in self.blocks() {
            let text = charset.decode(&self.bytes[range]);
            if !with_eci {
                out.push_str(&text);
                continue;
            }
            let eci = if charset == CharacterSet::BINARY {
                ECI_BINARY
            } else {
                ECI_UTF8
            };
            if last_eci != Some(eci) {
                let _ = write!(out, "\\{eci:06}");
            }
            last_eci = Some(eci);
            for c in text.chars() {
                out.push(c);
                if c == '\\' {
                    out.push(c);
                }
            }
        }
        out
    }

    /// Render the payload as text
    pub fn text(&self, mode: TextMode) -> String {
        match mode {
            TextMode::Plain => self.render(false),
            TextMode::ECI => self.render(true),
            TextMode::HRI => match self.content_type() {
                ContentType::GS1 => {
                    let plain = self.render(false);
                    hri_from_gs1(&plain).unwrap_or(plain)
                }
                ContentType::Text => self.render(false),
                _ => self.text(TextMode::Escaped)
            },
            TextMode::Hex => self
                .bytes
                .iter()
                .map(|x| format!("{x:02X}"))
                .collect::<Vec<_>>()
                .join(" "),
            TextMode::Escaped => escape_non_graphical(&self.render(false))
        }
    }

    /// The ECI protocol rendering as bytes, see [`TextMode::ECI`]
    pub fn bytes_eci(&self) -> Vec<u8> {
        self.render(true).into_bytes()
    }
}

fn is_binary_byte(c: u8) -> bool {
    (c < 0x20 && !matches!(c, b'\t' | b'\n' | b'\r' | 0x04 | 0x1D | 0x1E)) || c == 0x7F
}

const ASCII_CONTROL_NAMES: [&str; 32] = [
    "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "BEL", "BS", "HT", "LF", "VT", "FF", "CR",
    "SO", "SI", "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", "CAN", "EM", "SUB", "ESC",
    "FS", "GS", "RS", "US"
];

/// Replace control characters with `<NAME>` and other invisible
/// code points with `<U+XXXX>`
pub fn escape_non_graphical(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match u32::from(c) {
            x @ 0..=0x1F => {
                let _ = write!(out, "<{}>", ASCII_CONTROL_NAMES[x as usize]);
            }
            0x7F => out.push_str("<DEL>"),
            x @ 0x80..=0x9F => {
                let _ = write!(out, "<U+{x:02X}>");
            }
            _ => out.push(c)
        }
    }
    out
}

/// `(AI prefix, AI length, fixed data length)`, variable length
/// fields are terminated by GS or the end of the data
#[rustfmt::skip]
const GS1_AI_TABLE: [(&str, usize, Option<usize>); 33] = [
    ("00", 2, Some(18)), ("01", 2, Some(14)), ("02", 2, Some(14)), ("03", 2, Some(14)),
    ("04", 2, Some(16)), ("10", 2, None),     ("11", 2, Some(6)),  ("12", 2, Some(6)),
    ("13", 2, Some(6)),  ("15", 2, Some(6)),  ("16", 2, Some(6)),  ("17", 2, Some(6)),
    ("20", 2, Some(2)),  ("21", 2, None),     ("22", 2, None),     ("24", 3, None),
    ("25", 3, None),     ("30", 2, None),     ("31", 4, Some(6)),  ("32", 4, Some(6)),
    ("33", 4, Some(6)),  ("34", 4, Some(6)),  ("35", 4, Some(6)),  ("36", 4, Some(6)),
    ("37", 2, None),     ("39", 4, None),     ("40", 3, None),     ("41", 3, Some(13)),
    ("42", 3, None),     ("70", 4, None),     ("71", 3, None),     ("80", 4, None),
    ("90", 2, None),
];

/// Turn a GS1 element string into its `(AI)value` form
///
/// Returns `None` when the data does not parse as element strings.
pub fn hri_from_gs1(plain: &str) -> Option<String> {
    let data = plain.as_bytes();
    let mut out = String::with_capacity(plain.len() + 8);
    let mut i = 0;

    while i < data.len() {
        let prefix = data.get(i..i + 2)?;
        // 91..99 are company internal and share the variable layout of 90
        let key: &[u8] = if prefix[0] == b'9' { b"90" } else { prefix };
        let (_, ai_len, fixed) = GS1_AI_TABLE
            .iter()
            .find(|(p, _, _)| p.as_bytes() == key)?;

        let ai = data.get(i..i + ai_len)?;
        if !ai.iter().all(u8::is_ascii_digit) {
            return None;
        }
        i += ai_len;

        let end = match fixed {
            Some(len) => i + len,
            None => data[i..]
                .iter()
                .position(|x| *x == 0x1D)
                .map_or(data.len(), |p| i + p)
        };
        let value = data.get(i..end)?;
        out.push('(');
        out.push_str(core::str::from_utf8(ai).ok()?);
        out.push(')');
        out.push_str(core::str::from_utf8(value).ok()?);

        i = end;
        // separator after a field, mandatory for variable ones
        if data.get(i) == Some(&0x1D) {
            i += 1;
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QR: SymbologyIdentifier = SymbologyIdentifier::new(b'Q', b'1', 1);

    #[test]
    fn plain_text_without_eci() {
        let content = Content::from_bytes(b"HELLO", QR);
        assert_eq!(content.text(TextMode::Plain), "HELLO");
        assert_eq!(content.text(TextMode::HRI), "HELLO");
        assert_eq!(content.text(TextMode::Hex), "48 45 4C 4C 4F");
        assert_eq!(content.content_type(), ContentType::Text);
        assert!(!content.has_eci());
        assert_eq!(content.bytes_eci(), b"]Q2\\000026HELLO".to_vec());
    }

    #[test]
    fn eci_segments_are_transcoded() {
        let mut content = Content::new(QR);
        content.switch_encoding(26);
        content.append("Grüße \\".as_bytes());
        assert!(content.has_eci());
        assert_eq!(content.text(TextMode::Plain), "Grüße \\");
        assert_eq!(content.text(TextMode::ECI), "]Q2\\000026Grüße \\\\");
    }

    #[test]
    fn kanji_segments_read_as_shift_jis() {
        let mut content = Content::new(QR);
        content.append(b"No. ");
        content.append_in(CharacterSet::Shift_JIS, &[0x93, 0x5F, 0xE4, 0xAA]);
        content.append("ü".as_bytes());
        assert!(!content.has_eci());
        // the trailing bytes are still guessed as UTF-8
        assert_eq!(content.text(TextMode::Plain), "No. 点茗ü");
        assert_eq!(content.content_type(), ContentType::Text);

        let mut hinted = Content::new(QR);
        hinted.set_hint(CharacterSet::ISO8859_1);
        hinted.append_in(CharacterSet::Shift_JIS, &[0x93, 0x5F]);
        hinted.append(&[0xFC]);
        assert_eq!(hinted.text(TextMode::Plain), "点ü");
    }

    #[test]
    fn eci_segments_in_regional_sets() {
        let mut content = Content::new(QR);
        content.switch_encoding(22);
        content.append(&CharacterSet::Cp1251.encode("Привет").unwrap());
        content.switch_encoding(20);
        content.append(&[0x83, 0x6F]);
        assert!(content.can_process());
        assert_eq!(content.text(TextMode::Plain), "Приветバ");
    }

    #[test]
    fn unknown_eci_is_flagged() {
        let mut content = Content::new(QR);
        content.switch_encoding(14);
        content.append(b"abc");
        assert_eq!(content.content_type(), ContentType::UnknownECI);
        assert_eq!(content.text(TextMode::Plain), "");
    }

    #[test]
    fn binary_and_mixed() {
        assert_eq!(
            Content::from_bytes(&[0, 1, 2], QR).content_type(),
            ContentType::Binary
        );
        assert_eq!(
            Content::from_bytes(b"ab\x01", QR).content_type(),
            ContentType::Mixed
        );
        assert_eq!(
            Content::from_bytes(b"ab\x01", QR).text(TextMode::Escaped),
            "ab<SOH>"
        );
        assert_eq!(
            Content::from_bytes(b"[)>\x1E06", QR).content_type(),
            ContentType::ISO15434
        );
    }

    #[test]
    fn gs1_human_readable() {
        let mut symbology = SymbologyIdentifier::new(b'C', b'1', 0);
        symbology.gs1 = true;
        let content = Content::from_bytes(b"0109501101530003172012311012A\x1D21XYZ", symbology);
        assert_eq!(content.content_type(), ContentType::GS1);
        assert_eq!(
            content.text(TextMode::HRI),
            "(01)09501101530003(17)201231(10)12A(21)XYZ"
        );
        assert_eq!(hri_from_gs1("01123"), None);
    }
}
