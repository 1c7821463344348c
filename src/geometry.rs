// SPDX-License-Identifier: GPL-3.0-or-later

use std::cmp::{max, min};

use crate::registers::{ENTRY_AM, ENTRY_ID0, ENTRY_ID1};

/// A rectangle in signed device coordinates; may lie partly off the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Intersect with a `width` x `height` panel. Returns `None` when
    /// nothing of the rectangle is left.
    #[inline]
    pub fn clip(&self, width: u16, height: u16) -> Option<Window> {
        if self.is_empty() || width == 0 || height == 0 {
            return None;
        }
        let x2 = self.x as i64 + self.w as i64 - 1;
        let y2 = self.y as i64 + self.h as i64 - 1;
        let x1 = max(self.x as i64, 0);
        let y1 = max(self.y as i64, 0);
        let x2 = min(x2, width as i64 - 1);
        let y2 = min(y2, height as i64 - 1);
        if x1 > x2 || y1 > y2 {
            return None;
        }
        Some(Window::new(x1 as u16, y1 as u16, x2 as u16, y2 as u16))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "@{},{}+{}x{}", self.x, self.y, self.w, self.h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "@{},{}", self.x, self.y)
    }
}

/// GRAM addressing window with inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Window {
    pub fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn full(width: u16, height: u16) -> Self {
        Self::new(0, 0, width.saturating_sub(1), height.saturating_sub(1))
    }

    /// Order the corners and clamp them to a `width` x `height` panel.
    pub fn clamped(x1: i32, y1: i32, x2: i32, y2: i32, width: u16, height: u16) -> Self {
        let clamp = |v: i32, extent: u16| v.clamp(0, extent.saturating_sub(1) as i32) as u16;
        let (x1, x2) = (min(x1, x2), max(x1, x2));
        let (y1, y2) = (min(y1, y2), max(y1, y2));
        Self::new(
            clamp(x1, width),
            clamp(y1, height),
            clamp(x2, width),
            clamp(y2, height),
        )
    }

    pub fn width(&self) -> usize {
        self.x2.saturating_sub(self.x1) as usize + 1
    }

    pub fn height(&self) -> usize {
        self.y2.saturating_sub(self.y1) as usize + 1
    }

    pub fn area(&self) -> usize {
        self.width() * self.height()
    }

    pub fn origin(&self) -> (u16, u16) {
        (self.x1, self.y1)
    }

    pub fn contains(&self, x: u16, y: u16) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }

    /// Address counter step after one GRAM word: move right, wrap to the
    /// left edge of the next row past the right edge, and back to the top
    /// row past the bottom edge.
    #[inline]
    pub fn advance(&self, (x, y): (u16, u16)) -> (u16, u16) {
        if x >= self.x2 {
            if y >= self.y2 {
                (self.x1, self.y1)
            } else {
                (self.x1, y + 1)
            }
        } else {
            (x + 1, y)
        }
    }

    /// Same as calling [`Window::advance`] `n` times from a cursor inside
    /// the window.
    pub fn advance_by(&self, (x, y): (u16, u16), n: usize) -> (u16, u16) {
        let w = self.width();
        let offset = (y.saturating_sub(self.y1) as usize) * w + x.saturating_sub(self.x1) as usize;
        let offset = (offset + n) % self.area();
        (self.x1 + (offset % w) as u16, self.y1 + (offset / w) as u16)
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}..{},{}]", self.x1, self.y1, self.x2, self.y2)
    }
}

/// How the GRAM address counter moves, as set by the entry mode register.
///
/// GRAM is addressed in native (portrait) coordinates. Callers draw in
/// logical coordinates: logical x runs along the fast axis of the counter
/// and logical y along the slow one, so a row-major stream of logical
/// pixels lands where it was meant to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOrder {
    /// AM: the vertical counter is the fast one.
    pub vertical: bool,
    /// ID0: the horizontal counter counts up.
    pub x_increment: bool,
    /// ID1: the vertical counter counts up.
    pub y_increment: bool,
}

impl ScanOrder {
    pub const ROW_MAJOR: ScanOrder = ScanOrder {
        vertical: false,
        x_increment: true,
        y_increment: true,
    };

    pub fn from_entry_mode(value: u16) -> Self {
        Self {
            vertical: value & ENTRY_AM != 0,
            x_increment: value & ENTRY_ID0 != 0,
            y_increment: value & ENTRY_ID1 != 0,
        }
    }

    /// Logical size for a GRAM size, or the other way round.
    pub fn swap_axes(&self, width: u16, height: u16) -> (u16, u16) {
        if self.vertical {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// GRAM address of a logical pixel on a `gram_w` x `gram_h` panel.
    pub fn to_gram(&self, (x, y): (u16, u16), gram_w: u16, gram_h: u16) -> (u16, u16) {
        let (gx, gy) = if self.vertical { (y, x) } else { (x, y) };
        let flip = |v: u16, extent: u16| extent.saturating_sub(1).saturating_sub(v);
        (
            if self.x_increment { gx } else { flip(gx, gram_w) },
            if self.y_increment { gy } else { flip(gy, gram_h) },
        )
    }

    /// GRAM window covering a logical window, and the address the counter
    /// must start from so that the logical origin is written first.
    pub fn gram_window(&self, w: Window, gram_w: u16, gram_h: u16) -> (Window, (u16, u16)) {
        let start = self.to_gram((w.x1, w.y1), gram_w, gram_h);
        let end = self.to_gram((w.x2, w.y2), gram_w, gram_h);
        let window = Window::new(
            min(start.0, end.0),
            min(start.1, end.1),
            max(start.0, end.0),
            max(start.1, end.1),
        );
        (window, start)
    }

    /// Counter position after one GRAM word written at `cursor` inside the
    /// GRAM window `w`.
    pub fn advance(&self, w: Window, (x, y): (u16, u16)) -> (u16, u16) {
        let step_x = |x: u16| step(x, w.x1, w.x2, self.x_increment);
        let step_y = |y: u16| step(y, w.y1, w.y2, self.y_increment);
        if self.vertical {
            match step_y(y) {
                (y, true) => (step_x(x).0, y),
                (y, false) => (x, y),
            }
        } else {
            match step_x(x) {
                (x, true) => (x, step_y(y).0),
                (x, false) => (x, y),
            }
        }
    }
}

// One counter step between `lo` and `hi`; the flag tells whether it wrapped.
fn step(v: u16, lo: u16, hi: u16, up: bool) -> (u16, bool) {
    match up {
        true if v >= hi => (lo, true),
        true => (v + 1, false),
        false if v <= lo => (hi, true),
        false => (v - 1, false),
    }
}
