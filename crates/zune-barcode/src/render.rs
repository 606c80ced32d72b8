/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

//! Turning a [`Symbol`] into pixels, SVG or terminal text
//!
//! All renderers take the same [`RenderConfig`] and never modify the
//! symbol, so one symbol can be rendered into several forms.
use crate::bitmatrix::BitMatrix;
use crate::errors::BarcodeError;
use crate::log::trace;
use crate::writer::Symbol;

/// Height of linear symbols in modules
const LINEAR_HEIGHT: usize = 50;
/// Rows of a linear symbol in block art, two rows share a line
const LINEAR_TEXT_ROWS: usize = 6;
/// Largest bitmap a renderer will allocate, in pixels
const MAX_PIXELS: usize = 1 << 26;

const GLYPH_WIDTH: usize = 5;
const GLYPH_HEIGHT: usize = 7;
/// Glyph plus one column of spacing
const GLYPH_ADVANCE: usize = GLYPH_WIDTH + 1;
/// Text band under a linear symbol, glyph plus one row above and below
const TEXT_BAND: usize = GLYPH_HEIGHT + 2;

/// Rows of each glyph, bit 4 is the leftmost column
#[rustfmt::skip]
const GLYPHS: [(char, [u8; 7]); 45] = [
    ('0', [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
    ('1', [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('2', [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
    ('3', [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E]),
    ('4', [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
    ('5', [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
    ('6', [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
    ('7', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
    ('9', [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
    ('A', [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('B', [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E]),
    ('C', [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E]),
    ('D', [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C]),
    ('E', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F]),
    ('F', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]),
    ('G', [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F]),
    ('H', [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11]),
    ('I', [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('J', [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C]),
    ('K', [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F]),
    ('M', [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11]),
    ('N', [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11]),
    ('O', [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('P', [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]),
    ('Q', [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D]),
    ('R', [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11]),
    ('S', [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E]),
    ('T', [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04]),
    ('U', [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E]),
    ('V', [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04]),
    ('W', [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A]),
    ('X', [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11]),
    ('Y', [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04]),
    ('Z', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F]),
    ('-', [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C]),
    ('/', [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00]),
    ('(', [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02]),
    (')', [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08]),
    ('+', [0x00, 0x04, 0x04, 0x1F, 0x04, 0x04, 0x00]),
    (':', [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00]),
    ('%', [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03]),
    ('$', [0x04, 0x0F, 0x14, 0x0E, 0x05, 0x1E, 0x04]),
];

fn glyph(c: char) -> Option<&'static [u8; 7]> {
    let c = c.to_ascii_uppercase();
    GLYPHS.iter().find(|(g, _)| *g == c).map(|(_, rows)| rows)
}

/// Options applied each time a symbol is drawn
///
/// ```
/// use zune_barcode::RenderConfig;
///
/// let config = RenderConfig::default().set_scale(4).set_with_quiet_zones(false);
/// assert_eq!(config.get_scale(), 4);
/// ```
#[derive(Copy, Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RenderConfig {
    /// Pixels per module, 0 derives it from the size hint
    ///
    /// - Default value: 0
    scale:            u16,
    /// Minimum width of the rendered image in pixels, used when
    /// the scale is 0
    ///
    /// - Default value: 200
    size_hint:        u16,
    /// Clockwise quarter turns
    ///
    /// - Default value: 0
    rotate:           u8,
    /// Print the human readable text under linear symbols
    ///
    /// - Default value: false
    with_hrt:         bool,
    /// Surround the symbol with its quiet zone
    ///
    /// - Default value: true
    with_quiet_zones: bool
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            scale:            0,
            size_hint:        200,
            rotate:           0,
            with_hrt:         false,
            with_quiet_zones: true
        }
    }
}

impl RenderConfig {
    pub const fn get_scale(&self) -> u16 {
        self.scale
    }

    pub const fn get_size_hint(&self) -> u16 {
        self.size_hint
    }

    pub const fn get_rotate(&self) -> u8 {
        self.rotate
    }

    pub const fn get_with_hrt(&self) -> bool {
        self.with_hrt
    }

    pub const fn get_with_quiet_zones(&self) -> bool {
        self.with_quiet_zones
    }

    pub fn set_scale(mut self, scale: u16) -> Self {
        self.scale = scale;
        self
    }

    pub fn set_size_hint(mut self, hint: u16) -> Self {
        self.size_hint = hint;
        self
    }

    /// Set the rotation in quarter turns, values wrap around
    pub fn set_rotate(mut self, quarter_turns: i32) -> Self {
        self.rotate = quarter_turns.rem_euclid(4) as u8;
        self
    }

    pub fn set_with_hrt(mut self, yes: bool) -> Self {
        self.with_hrt = yes;
        self
    }

    pub fn set_with_quiet_zones(mut self, yes: bool) -> Self {
        self.with_quiet_zones = yes;
        self
    }

    /// Pixels per module for a symbol `width` modules wide
    fn scale_for(&self, width: usize) -> usize {
        match self.scale {
            0 => usize::from(self.size_hint).div_ceil(width.max(1)).max(1),
            scale => usize::from(scale)
        }
    }
}

/// An 8 bit luminance image, 0 is dark and 255 is light
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width:  usize,
    height: usize,
    pixels: Vec<u8>
}

impl Bitmap {
    fn blank(width: usize, height: usize) -> Result<Bitmap, BarcodeError> {
        match width.checked_mul(height) {
            Some(size) if size <= MAX_PIXELS => Ok(Bitmap {
                width,
                height,
                pixels: vec![255; size]
            }),
            _ => Err(BarcodeError::InvalidInput(format!(
                "a {width}x{height} bitmap is too large to render"
            )))
        }
    }

    pub const fn width(&self) -> usize {
        self.width
    }

    pub const fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    fn fill(&mut self, left: usize, top: usize, width: usize, height: usize) {
        for y in top..(top + height).min(self.height) {
            let row = &mut self.pixels[y * self.width..(y + 1) * self.width];
            for p in row.iter_mut().take((left + width).min(self.width)).skip(left) {
                *p = 0;
            }
        }
    }

    /// Rotate clockwise by quarter turns
    fn rotated(&self, quarter_turns: u8) -> Bitmap {
        let (w, h) = (self.width, self.height);
        match quarter_turns % 4 {
            0 => self.clone(),
            2 => Bitmap {
                width:  w,
                height: h,
                pixels: self.pixels.iter().rev().copied().collect()
            },
            turns => {
                let mut pixels = vec![255; w * h];
                for y in 0..h {
                    for x in 0..w {
                        let (nx, ny) = if turns == 1 { (h - 1 - y, x) } else { (y, w - 1 - x) };
                        pixels[ny * h + nx] = self.pixels[y * w + x];
                    }
                }
                Bitmap {
                    width: h,
                    height: w,
                    pixels
                }
            }
        }
    }
}

/// Module matrix as drawn, with linear symbols stretched to bars
fn layout(symbol: &Symbol, config: &RenderConfig, linear_rows: usize) -> BitMatrix {
    let modules = symbol.modules();
    let matrix = if symbol.is_linear() {
        let mut bars = BitMatrix::new(modules.width(), linear_rows);
        for y in 0..linear_rows {
            for x in 0..modules.width() {
                bars.set(x, y, modules.get(x, 0));
            }
        }
        bars
    } else {
        modules.clone()
    };
    if config.with_quiet_zones {
        matrix.with_margin(symbol.quiet_zone())
    } else {
        matrix
    }
}

fn hrt_text(symbol: &Symbol, config: &RenderConfig) -> Option<String> {
    if config.with_hrt && symbol.is_linear() && !symbol.text().is_empty() {
        return Some(symbol.text().to_string());
    }
    None
}

/// Render `symbol` into a luminance bitmap
pub fn render_bitmap(symbol: &Symbol, config: &RenderConfig) -> Result<Bitmap, BarcodeError> {
    let matrix = layout(symbol, config, LINEAR_HEIGHT);
    let scale = config.scale_for(matrix.width());
    let text = hrt_text(symbol, config);
    let band = if text.is_some() { TEXT_BAND * scale } else { 0 };

    let mut bitmap = Bitmap::blank(matrix.width() * scale, matrix.height() * scale + band)?;
    for y in 0..matrix.height() {
        let row = matrix.row(y);
        let mut x = 0;
        while x < row.len() {
            if !row[x] {
                x += 1;
                continue;
            }
            let start = x;
            while x < row.len() && row[x] {
                x += 1;
            }
            bitmap.fill(start * scale, y * scale, (x - start) * scale, scale);
        }
    }

    if let Some(text) = text {
        let chars: Vec<char> = text.chars().collect();
        let text_width = chars.len() * GLYPH_ADVANCE * scale;
        let left = bitmap.width.saturating_sub(text_width) / 2;
        let top = matrix.height() * scale + scale;
        for (i, c) in chars.iter().enumerate() {
            let Some(rows) = glyph(*c) else {
                continue;
            };
            let cx = left + i * GLYPH_ADVANCE * scale;
            for (gy, bits) in rows.iter().enumerate() {
                for gx in 0..GLYPH_WIDTH {
                    if bits & (0x10 >> gx) != 0 {
                        bitmap.fill(cx + gx * scale, top + gy * scale, scale, scale);
                    }
                }
            }
        }
    }
    trace!(
        "rendered {} at {}x{} pixels, scale {}",
        symbol.format(),
        bitmap.width,
        bitmap.height,
        scale
    );
    Ok(bitmap.rotated(config.rotate))
}

/// Render `symbol` as an SVG document
///
/// The drawing uses one unit per module, width and height attributes
/// carry the pixel size the bitmap renderer would produce.
pub fn render_svg(symbol: &Symbol, config: &RenderConfig) -> String {
    let matrix = layout(symbol, config, LINEAR_HEIGHT);
    let scale = config.scale_for(matrix.width());
    let text = hrt_text(symbol, config);
    let (w, mut h) = (matrix.width(), matrix.height());
    if text.is_some() {
        h += TEXT_BAND;
    }
    let (vw, vh) = if config.rotate % 2 == 1 { (h, w) } else { (w, h) };

    let mut path = String::new();
    for y in 0..matrix.height() {
        let row = matrix.row(y);
        let mut x = 0;
        while x < row.len() {
            if !row[x] {
                x += 1;
                continue;
            }
            let start = x;
            while x < row.len() && row[x] {
                x += 1;
            }
            path.push_str(&format!("M{start},{y}h{}v1h-{}z", x - start, x - start));
        }
    }

    let transform = match config.rotate % 4 {
        1 => format!(" transform=\"translate({h} 0) rotate(90)\""),
        2 => format!(" transform=\"translate({w} {h}) rotate(180)\""),
        3 => format!(" transform=\"translate(0 {w}) rotate(270)\""),
        _ => String::new()
    };

    let mut svg = String::with_capacity(path.len() + 512);
    svg.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    svg.push_str(&format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{}\" height=\"{}\" viewBox=\"0 0 {vw} {vh}\" shape-rendering=\"crispEdges\">\n",
        vw * scale,
        vh * scale
    ));
    svg.push_str(&format!("<rect width=\"{vw}\" height=\"{vh}\" fill=\"#FFFFFF\"/>\n"));
    svg.push_str(&format!("<g{transform}>\n"));
    svg.push_str(&format!("<path d=\"{path}\" fill=\"#000000\"/>\n"));
    if let Some(text) = text {
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" font-family=\"monospace\" font-size=\"{GLYPH_HEIGHT}\">{}</text>\n",
            w / 2,
            matrix.height() + GLYPH_HEIGHT + 1,
            escape_xml(&text)
        ));
    }
    svg.push_str("</g>\n</svg>\n");
    svg
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c)
        }
    }
    out
}

/// Render `symbol` as lines of block characters, two module rows
/// per line
///
/// Dark modules are drawn as filled blocks, scale and text are ignored.
pub fn render_utf8(symbol: &Symbol, config: &RenderConfig) -> String {
    let matrix = layout(symbol, config, LINEAR_TEXT_ROWS).rotated(config.rotate);
    let mut out = String::with_capacity((matrix.width() + 1) * matrix.height().div_ceil(2) * 3);
    for y in (0..matrix.height()).step_by(2) {
        for x in 0..matrix.width() {
            let top = matrix.get(x, y);
            let bottom = y + 1 < matrix.height() && matrix.get(x, y + 1);
            out.push(match (top, bottom) {
                (true, true) => '\u{2588}',
                (true, false) => '\u{2580}',
                (false, true) => '\u{2584}',
                (false, false) => ' '
            });
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::BarcodeFormat;
    use crate::writer::{create_barcode, CreatorConfig, Payload};

    fn qr(text: &str) -> Symbol {
        create_barcode(Payload::Text(text), &CreatorConfig::default()).unwrap()
    }

    fn code128(text: &str) -> Symbol {
        create_barcode(Payload::Text(text), &CreatorConfig::new(BarcodeFormat::Code128)).unwrap()
    }

    #[test]
    fn bitmap_scale_and_quiet_zone() {
        let symbol = qr("HELLO");
        let config = RenderConfig::default().set_scale(4);
        let bitmap = render_bitmap(&symbol, &config).unwrap();
        assert_eq!(bitmap.width(), (21 + 8) * 4);
        assert_eq!(bitmap.height(), (21 + 8) * 4);
        // quiet zone then the finder pattern corner
        assert_eq!(bitmap.get(15, 15), 255);
        assert_eq!(bitmap.get(16, 16), 0);

        let bare = render_bitmap(&symbol, &config.set_with_quiet_zones(false)).unwrap();
        assert_eq!(bare.width(), 21 * 4);
        assert_eq!(bare.get(0, 0), 0);
    }

    #[test]
    fn scale_from_size_hint() {
        let symbol = qr("HELLO");
        let bitmap = render_bitmap(&symbol, &RenderConfig::default()).unwrap();
        assert!(bitmap.width() >= 200);
        assert_eq!(bitmap.width() % 29, 0);

        let config = RenderConfig::default().set_scale(0).set_size_hint(0);
        assert_eq!(render_bitmap(&symbol, &config).unwrap().width(), 29);
    }

    #[test]
    fn rotation_swaps_sides() {
        let symbol = code128("ROTATE");
        let config = RenderConfig::default().set_scale(1);
        let upright = render_bitmap(&symbol, &config).unwrap();
        let turned = render_bitmap(&symbol, &config.set_rotate(1)).unwrap();
        assert_eq!(upright.width(), turned.height());
        assert_eq!(upright.height(), turned.width());
        // first bar, 10 modules in, becomes a row 10 modules from the top
        assert_eq!(upright.get(10, 20), 0);
        assert_eq!(turned.get(20, 10), 0);
        assert_eq!(turned.get(20, 9), 255);

        let half = render_bitmap(&symbol, &config.set_rotate(-2)).unwrap();
        assert_eq!(half.get(half.width() - 11, 20), 0);
    }

    #[test]
    fn hrt_adds_a_text_band() {
        let symbol = code128("HRT 42");
        let config = RenderConfig::default().set_scale(2);
        let plain = render_bitmap(&symbol, &config).unwrap();
        let with_text = render_bitmap(&symbol, &config.set_with_hrt(true)).unwrap();
        assert_eq!(with_text.height(), plain.height() + TEXT_BAND * 2);
        let band = &with_text.pixels()[plain.pixels().len()..];
        assert!(band.iter().any(|p| *p == 0));

        // matrix symbols have no text
        let matrix = render_bitmap(&qr("x"), &config.set_with_hrt(true)).unwrap();
        assert_eq!(matrix.width(), matrix.height());
    }

    #[test]
    fn svg_document() {
        let symbol = code128("<&>");
        let config = RenderConfig::default().set_scale(3).set_with_hrt(true);
        let svg = render_svg(&symbol, &config);
        let width = symbol.modules().width() + 20;
        assert!(svg.starts_with("<?xml"));
        assert!(svg.contains(&format!("width=\"{}\"", width * 3)));
        assert!(svg.contains("&lt;&amp;&gt;"));
        assert!(svg.trim_end().ends_with("</svg>"));

        let turned = render_svg(&symbol, &config.set_rotate(1));
        assert!(turned.contains("rotate(90)"));
        assert!(turned.contains(&format!("height=\"{}\"", width * 3)));
    }

    #[test]
    fn block_art() {
        let symbol = qr("HELLO");
        let art = render_utf8(&symbol, &RenderConfig::default());
        let lines: Vec<&str> = art.lines().collect();
        assert_eq!(lines.len(), 15);
        assert!(lines.iter().all(|l| l.chars().count() == 29));
        assert!(lines[0].chars().all(|c| c == ' '));
        // rows 4 and 5 are both the finder's top edge and its dark ring
        assert!(lines[2].starts_with("    \u{2588}"));
    }
}
