// SPDX-License-Identifier: GPL-3.0-or-later

pub type Rgba = rgb::RGBA<u8>;

/// 16-bit packed RGB565 color: [rrrr rggg] [gggb bbbb].
pub type Color = u16;

pub const BLACK: Color = 0x0000;
pub const WHITE: Color = 0xffff;
pub const RED: Color = 0xf800;
pub const GREEN: Color = 0x07e0;
pub const BLUE: Color = 0x001f;
pub const YELLOW: Color = 0xffe0;
pub const CYAN: Color = 0x07ff;
pub const MAGENTA: Color = 0xf81f;

/// Pack an 8-bit per channel color, dropping the low bits of each channel.
pub fn from_rgb(r: u8, g: u8, b: u8) -> Color {
    ((r as u16 & 0xf8) << 8) | ((g as u16 & 0xfc) << 3) | (b as u16 >> 3)
}

/// Expand to 8 bits per channel, replicating the high bits into the low ones
/// so that full-scale values map to 0xff.
pub fn to_rgba(c: Color) -> Rgba {
    let r = ((c >> 11) & 0x1f) as u8;
    let g = ((c >> 5) & 0x3f) as u8;
    let b = (c & 0x1f) as u8;
    Rgba::new((r << 3) | (r >> 2), (g << 2) | (g >> 4), (b << 3) | (b >> 2), 255)
}

/// Parse a color name or a hex value (`0xf800`, `#f800`, `f800`).
pub fn parse(s: &str) -> Option<Color> {
    let named = match s.to_ascii_lowercase().as_str() {
        "black" => Some(BLACK),
        "white" => Some(WHITE),
        "red" => Some(RED),
        "green" => Some(GREEN),
        "blue" => Some(BLUE),
        "yellow" => Some(YELLOW),
        "cyan" => Some(CYAN),
        "magenta" => Some(MAGENTA),
        _ => None,
    };
    named.or_else(|| {
        let hex = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .or_else(|| s.strip_prefix('#'))
            .unwrap_or(s);
        u16::from_str_radix(hex, 16).ok()
    })
}
