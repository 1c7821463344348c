// SPDX-License-Identifier: GPL-3.0-or-later

use crate::{Color, Coord, Ili9225, Res, Transport};

/// A character ready to plot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Glyph {
    /// Set dots, relative to the cursor, in font units.
    pub dots: Vec<(i32, i32)>,
    /// Side of the square block drawn for each dot.
    pub size: u32,
    /// Horizontal cursor advance in pixels.
    pub advance: i32,
}

impl Glyph {
    fn blank(advance: i32) -> Self {
        Self {
            dots: Vec::new(),
            size: 1,
            advance,
        }
    }
}

pub trait GlyphSource {
    fn glyph(&self, c: char) -> Glyph;

    /// Line distance for `'\n'`.
    fn y_advance(&self) -> i32;
}

/// Fixed-cell font: one byte per column, most significant bit on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedFont<'a> {
    pub data: &'a [u8],
    pub width: u8,
    pub height: u8,
    pub first: u8,
    pub last: u8,
    /// Blank columns between characters.
    pub gap: u8,
    pub size: u8,
}

impl<'a> FixedFont<'a> {
    pub const fn new(data: &'a [u8], width: u8, height: u8, first: u8, last: u8) -> Self {
        Self {
            data,
            width,
            height,
            first,
            last,
            gap: 1,
            size: 1,
        }
    }

    pub fn with_size(mut self, size: u8) -> Self {
        self.size = size.max(1);
        self
    }

    pub fn with_gap(mut self, gap: u8) -> Self {
        self.gap = gap;
        self
    }

    fn columns(&self, c: char) -> Option<&'a [u8]> {
        let code = u8::try_from(u32::from(c)).ok()?;
        if code < self.first || code > self.last {
            return None;
        }
        let start = (code - self.first) as usize * self.width as usize;
        self.data.get(start..start + self.width as usize)
    }
}

impl GlyphSource for FixedFont<'_> {
    // Characters outside the font still take up a cell.
    fn glyph(&self, c: char) -> Glyph {
        let size = self.size.max(1) as i32;
        let advance = (self.width as i32 + self.gap as i32) * size;
        let Some(columns) = self.columns(c) else {
            return Glyph::blank(advance);
        };
        let rows = self.height.min(8) as i32;
        let dots = columns
            .iter()
            .enumerate()
            .flat_map(|(col, &bits)| {
                (0..rows)
                    .filter(move |row| bits & (0x80u8 >> row) != 0)
                    .map(move |row| (col as i32, row))
            })
            .collect();
        Glyph {
            dots,
            size: size as u32,
            advance,
        }
    }

    fn y_advance(&self) -> i32 {
        (self.height as i32 + self.gap as i32) * self.size.max(1) as i32
    }
}

/// Glyph metrics of a proportional font. Offsets are relative to the
/// cursor on the baseline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GfxGlyph {
    /// Byte offset of the first bitmap row.
    pub offset: usize,
    pub width: u8,
    pub height: u8,
    pub x_advance: u8,
    pub x_offset: i8,
    pub y_offset: i8,
}

/// Proportional font. Glyph bitmaps are packed row-major, most
/// significant bit first, without padding between rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfxFont {
    pub bitmap: Vec<u8>,
    pub glyphs: Vec<GfxGlyph>,
    pub first: u8,
    pub last: u8,
    pub y_advance: u8,
}

impl GfxFont {
    /// Rasterize the glyphs `first..=last` of a TrueType font at `size`
    /// pixels. Dots with at least half coverage are set.
    pub fn from_ttf(data: Vec<u8>, size: f32, first: u8, last: u8) -> Res<Self> {
        let font = rusttype::Font::try_from_vec(data).ok_or("cannot load font data")?;
        let scale = rusttype::Scale::uniform(size);
        let v_metrics = font.v_metrics(scale);
        let y_advance = (v_metrics.ascent - v_metrics.descent + v_metrics.line_gap).ceil();

        let mut bitmap = Vec::new();
        let mut glyphs = Vec::new();
        for code in first..=last {
            let glyph = font.glyph(code as char).scaled(scale);
            let x_advance = glyph.h_metrics().advance_width.round();
            // baseline at y = 0
            let glyph = glyph.positioned(rusttype::point(0.0, 0.0));
            let mut entry = GfxGlyph {
                offset: bitmap.len(),
                x_advance: x_advance.clamp(0.0, 255.0) as u8,
                ..GfxGlyph::default()
            };
            if let Some(bb) = glyph.pixel_bounding_box() {
                let (w, h) = (bb.width() as usize, bb.height() as usize);
                let mut bits = vec![false; w * h];
                glyph.draw(|x, y, v| {
                    if v >= 0.5 {
                        bits[y as usize * w + x as usize] = true;
                    }
                });
                bitmap.extend(bits.chunks(8).map(|chunk| {
                    chunk
                        .iter()
                        .enumerate()
                        .fold(0u8, |byte, (i, &set)| if set { byte | 0x80u8 >> i } else { byte })
                }));
                entry.width = u8::try_from(w)?;
                entry.height = u8::try_from(h)?;
                entry.x_offset = i8::try_from(bb.min.x)?;
                entry.y_offset = i8::try_from(bb.min.y)?;
            }
            glyphs.push(entry);
        }
        log::debug!(
            glyphs = glyphs.len(),
            bytes = bitmap.len();
            "rasterized {size}px font, characters {first:#04x}..={last:#04x}"
        );

        Ok(Self {
            bitmap,
            glyphs,
            first,
            last,
            y_advance: y_advance.clamp(0.0, 255.0) as u8,
        })
    }

    fn lookup(&self, c: char) -> Option<&GfxGlyph> {
        let code = u8::try_from(u32::from(c)).ok()?;
        if code < self.first || code > self.last {
            return None;
        }
        self.glyphs.get((code - self.first) as usize)
    }
}

impl GlyphSource for GfxFont {
    fn glyph(&self, c: char) -> Glyph {
        let Some(g) = self.lookup(c) else {
            return Glyph::blank(0);
        };
        let (w, h) = (g.width as usize, g.height as usize);
        let mut dots = Vec::new();
        for bit in 0..w * h {
            let Some(&byte) = self.bitmap.get(g.offset + bit / 8) else {
                break;
            };
            if byte & (0x80u8 >> (bit % 8)) != 0 {
                let (col, row) = ((bit % w) as i32, (bit / w) as i32);
                dots.push((g.x_offset as i32 + col, g.y_offset as i32 + row));
            }
        }
        Glyph {
            dots,
            size: 1,
            advance: g.x_advance as i32,
        }
    }

    fn y_advance(&self) -> i32 {
        self.y_advance as i32
    }
}

const fn msb_top<const N: usize>(lsb_top: [u8; N]) -> [u8; N] {
    let mut out = [0u8; N];
    let mut i = 0;
    while i < N {
        out[i] = lsb_top[i].reverse_bits();
        i += 1;
    }
    out
}

#[rustfmt::skip]
const FONT_5X8_DATA: [u8; 95 * 5] = msb_top([
    0x00, 0x00, 0x00, 0x00, 0x00, // ' '
    0x00, 0x00, 0x5f, 0x00, 0x00, // '!'
    0x00, 0x07, 0x00, 0x07, 0x00, // '"'
    0x14, 0x7f, 0x14, 0x7f, 0x14, // '#'
    0x24, 0x2a, 0x7f, 0x2a, 0x12, // '$'
    0x23, 0x13, 0x08, 0x64, 0x62, // '%'
    0x36, 0x49, 0x55, 0x22, 0x50, // '&'
    0x00, 0x05, 0x03, 0x00, 0x00, // '''
    0x00, 0x1c, 0x22, 0x41, 0x00, // '('
    0x00, 0x41, 0x22, 0x1c, 0x00, // ')'
    0x14, 0x08, 0x3e, 0x08, 0x14, // '*'
    0x08, 0x08, 0x3e, 0x08, 0x08, // '+'
    0x00, 0x50, 0x30, 0x00, 0x00, // ','
    0x08, 0x08, 0x08, 0x08, 0x08, // '-'
    0x00, 0x60, 0x60, 0x00, 0x00, // '.'
    0x20, 0x10, 0x08, 0x04, 0x02, // '/'
    0x3e, 0x51, 0x49, 0x45, 0x3e, // '0'
    0x00, 0x42, 0x7f, 0x40, 0x00, // '1'
    0x42, 0x61, 0x51, 0x49, 0x46, // '2'
    0x21, 0x41, 0x45, 0x4b, 0x31, // '3'
    0x18, 0x14, 0x12, 0x7f, 0x10, // '4'
    0x27, 0x45, 0x45, 0x45, 0x39, // '5'
    0x3c, 0x4a, 0x49, 0x49, 0x30, // '6'
    0x01, 0x71, 0x09, 0x05, 0x03, // '7'
    0x36, 0x49, 0x49, 0x49, 0x36, // '8'
    0x06, 0x49, 0x49, 0x29, 0x1e, // '9'
    0x00, 0x36, 0x36, 0x00, 0x00, // ':'
    0x00, 0x56, 0x36, 0x00, 0x00, // ';'
    0x08, 0x14, 0x22, 0x41, 0x00, // '<'
    0x14, 0x14, 0x14, 0x14, 0x14, // '='
    0x00, 0x41, 0x22, 0x14, 0x08, // '>'
    0x02, 0x01, 0x51, 0x09, 0x06, // '?'
    0x32, 0x49, 0x79, 0x41, 0x3e, // '@'
    0x7e, 0x11, 0x11, 0x11, 0x7e, // 'A'
    0x7f, 0x49, 0x49, 0x49, 0x36, // 'B'
    0x3e, 0x41, 0x41, 0x41, 0x22, // 'C'
    0x7f, 0x41, 0x41, 0x22, 0x1c, // 'D'
    0x7f, 0x49, 0x49, 0x49, 0x41, // 'E'
    0x7f, 0x09, 0x09, 0x09, 0x01, // 'F'
    0x3e, 0x41, 0x49, 0x49, 0x7a, // 'G'
    0x7f, 0x08, 0x08, 0x08, 0x7f, // 'H'
    0x00, 0x41, 0x7f, 0x41, 0x00, // 'I'
    0x20, 0x40, 0x41, 0x3f, 0x01, // 'J'
    0x7f, 0x08, 0x14, 0x22, 0x41, // 'K'
    0x7f, 0x40, 0x40, 0x40, 0x40, // 'L'
    0x7f, 0x02, 0x0c, 0x02, 0x7f, // 'M'
    0x7f, 0x04, 0x08, 0x10, 0x7f, // 'N'
    0x3e, 0x41, 0x41, 0x41, 0x3e, // 'O'
    0x7f, 0x09, 0x09, 0x09, 0x06, // 'P'
    0x3e, 0x41, 0x51, 0x21, 0x5e, // 'Q'
    0x7f, 0x09, 0x19, 0x29, 0x46, // 'R'
    0x46, 0x49, 0x49, 0x49, 0x31, // 'S'
    0x01, 0x01, 0x7f, 0x01, 0x01, // 'T'
    0x3f, 0x40, 0x40, 0x40, 0x3f, // 'U'
    0x1f, 0x20, 0x40, 0x20, 0x1f, // 'V'
    0x3f, 0x40, 0x38, 0x40, 0x3f, // 'W'
    0x63, 0x14, 0x08, 0x14, 0x63, // 'X'
    0x07, 0x08, 0x70, 0x08, 0x07, // 'Y'
    0x61, 0x51, 0x49, 0x45, 0x43, // 'Z'
    0x00, 0x7f, 0x41, 0x41, 0x00, // '['
    0x02, 0x04, 0x08, 0x10, 0x20, // '\'
    0x00, 0x41, 0x41, 0x7f, 0x00, // ']'
    0x04, 0x02, 0x01, 0x02, 0x04, // '^'
    0x40, 0x40, 0x40, 0x40, 0x40, // '_'
    0x00, 0x01, 0x02, 0x04, 0x00, // '`'
    0x20, 0x54, 0x54, 0x54, 0x78, // 'a'
    0x7f, 0x48, 0x44, 0x44, 0x38, // 'b'
    0x38, 0x44, 0x44, 0x44, 0x20, // 'c'
    0x38, 0x44, 0x44, 0x48, 0x7f, // 'd'
    0x38, 0x54, 0x54, 0x54, 0x18, // 'e'
    0x08, 0x7e, 0x09, 0x01, 0x02, // 'f'
    0x0c, 0x52, 0x52, 0x52, 0x3e, // 'g'
    0x7f, 0x08, 0x04, 0x04, 0x78, // 'h'
    0x00, 0x44, 0x7d, 0x40, 0x00, // 'i'
    0x20, 0x40, 0x44, 0x3d, 0x00, // 'j'
    0x7f, 0x10, 0x28, 0x44, 0x00, // 'k'
    0x00, 0x41, 0x7f, 0x40, 0x00, // 'l'
    0x7c, 0x04, 0x18, 0x04, 0x78, // 'm'
    0x7c, 0x08, 0x04, 0x04, 0x78, // 'n'
    0x38, 0x44, 0x44, 0x44, 0x38, // 'o'
    0x7c, 0x14, 0x14, 0x14, 0x08, // 'p'
    0x08, 0x14, 0x14, 0x18, 0x7c, // 'q'
    0x7c, 0x08, 0x04, 0x04, 0x08, // 'r'
    0x48, 0x54, 0x54, 0x54, 0x20, // 's'
    0x04, 0x3f, 0x44, 0x40, 0x20, // 't'
    0x3c, 0x40, 0x40, 0x20, 0x7c, // 'u'
    0x1c, 0x20, 0x40, 0x20, 0x1c, // 'v'
    0x3c, 0x40, 0x30, 0x40, 0x3c, // 'w'
    0x44, 0x28, 0x10, 0x28, 0x44, // 'x'
    0x0c, 0x50, 0x50, 0x50, 0x3c, // 'y'
    0x44, 0x64, 0x54, 0x4c, 0x44, // 'z'
    0x00, 0x08, 0x36, 0x41, 0x00, // '{'
    0x00, 0x00, 0x7f, 0x00, 0x00, // '|'
    0x00, 0x41, 0x36, 0x08, 0x00, // '}'
    0x10, 0x08, 0x08, 0x10, 0x08, // '~'
]);

/// 5x8 ASCII font covering `' '..='~'`.
pub const FONT_5X8: FixedFont<'static> = FixedFont::new(&FONT_5X8_DATA, 5, 8, 0x20, 0x7e);

impl<T: Transport> Ili9225<T> {
    /// Draw one character with its cell origin at (x, y). Returns the
    /// horizontal advance.
    pub fn draw_char<F: GlyphSource + ?Sized>(
        &mut self,
        x: i32,
        y: i32,
        c: char,
        font: &F,
        color: Color,
    ) -> Res<i32> {
        let glyph = font.glyph(c);
        let size = glyph.size.max(1) as i32;
        for &(dx, dy) in &glyph.dots {
            let (px, py) = (x + dx * size, y + dy * size);
            for by in 0..size {
                for bx in 0..size {
                    self.draw_pixel(px + bx, py + by, color)?;
                }
            }
        }
        Ok(glyph.advance)
    }

    /// Draw a string and return the cursor after the last character.
    pub fn draw_text<F: GlyphSource + ?Sized>(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        font: &F,
        color: Color,
    ) -> Res<Coord> {
        let mut cursor = Coord::new(x, y);
        if self.extents().is_none() {
            return Ok(cursor);
        }
        for c in text.chars() {
            if c == '\n' {
                cursor.x = x;
                cursor.y += font.y_advance();
                continue;
            }
            cursor.x += self.draw_char(cursor.x, cursor.y, c, font, color)?;
        }
        Ok(cursor)
    }
}
