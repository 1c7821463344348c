// SPDX-License-Identifier: GPL-3.0-or-later

use std::path::Path;

use xxhash_rust::xxh3::xxh3_64;

use crate::colors::{self, Color};
use crate::{Res, Rgba};

/// A grid of RGB565 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Framebuffer {
    width: u16,
    height: u16,
    buffer: Vec<Color>,
}

impl Framebuffer {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            buffer: vec![colors::BLACK; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.buffer
    }

    #[inline]
    fn offset(&self, x: u16, y: u16) -> Option<usize> {
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Color> {
        self.offset(x, y).map(|i| self.buffer[i])
    }

    /// Store a pixel; returns false if (x, y) is outside the buffer.
    pub fn set(&mut self, x: u16, y: u16, c: Color) -> bool {
        match self.offset(x, y) {
            Some(i) => {
                self.buffer[i] = c;
                true
            }
            None => false,
        }
    }

    pub fn fill(&mut self, c: Color) {
        self.buffer.fill(c);
    }

    pub fn row(&self, y: u16) -> &[Color] {
        let start = y as usize * self.width as usize;
        &self.buffer[start..start + self.width as usize]
    }

    /// Coordinates of every pixel with color `c`, in row-major order.
    pub fn find(&self, c: Color) -> Vec<(u16, u16)> {
        let w = self.width as usize;
        self.buffer
            .iter()
            .enumerate()
            .filter(|&(_, &p)| p == c)
            .map(|(i, _)| ((i % w) as u16, (i / w) as u16))
            .collect()
    }

    /// Coordinates where `self` and `other` differ. Buffers of different
    /// geometry differ everywhere.
    pub fn diff(&self, other: &Framebuffer) -> Vec<(u16, u16)> {
        if self.width != other.width || self.height != other.height {
            return (0..self.height)
                .flat_map(|y| (0..self.width).map(move |x| (x, y)))
                .collect();
        }
        let w = self.width as usize;
        self.buffer
            .iter()
            .zip(&other.buffer)
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| ((i % w) as u16, (i / w) as u16))
            .collect()
    }

    /// Pixels as big-endian bytes, the order they travel on the wire.
    pub fn to_be_bytes(&self) -> Vec<u8> {
        self.buffer.iter().flat_map(|c| c.to_be_bytes()).collect()
    }

    pub fn digest(&self) -> u64 {
        let mut bytes = Vec::with_capacity(4 + 2 * self.buffer.len());
        bytes.extend(self.width.to_be_bytes());
        bytes.extend(self.height.to_be_bytes());
        bytes.extend(self.to_be_bytes());
        xxh3_64(&bytes)
    }

    pub fn to_rgba(&self) -> Vec<Rgba> {
        self.buffer.iter().map(|&c| colors::to_rgba(c)).collect()
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Res<()> {
        lodepng::encode32_file(
            path,
            &self.to_rgba(),
            self.width as usize,
            self.height as usize,
        )?;
        Ok(())
    }
}
