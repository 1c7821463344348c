// SPDX-License-Identifier: GPL-3.0-or-later

use std::error::Error;
use std::thread;
use std::time::Duration;

use serde::Deserialize;

pub use crate::colors::{Color, Rgba};
pub use crate::config::{Config, PinConfig};
pub use crate::decoder::{Ili9225Mirror, MirrorStats, ProtocolError};
pub use crate::fonts::{FixedFont, GfxFont, GfxGlyph, Glyph, GlyphSource, FONT_5X8};
pub use crate::framebuffer::Framebuffer;
pub use crate::geometry::{Coord, Rect, ScanOrder, Window};
pub use crate::ili9225::{DeviceState, Ili9225, Rejected};
pub use crate::transaction::{Mode, Recorder, Tee, Transaction};
pub use crate::viewer::{FrameSink, JsonLineSink, PngSink, TcpViewer, ViewerMessage};

pub mod colors;
pub mod config;
mod decoder;
mod fonts;
mod framebuffer;
mod geometry;
mod ili9225;
mod raster;
pub mod registers;
pub mod serial_port;
mod transaction;
mod viewer;

pub type Res<T> = Result<T, Box<dyn Error>>;

/// Low reset pulse and the settle time required after releasing it.
pub const RESET_LOW: Duration = Duration::from_millis(10);
pub const RESET_SETTLE: Duration = Duration::from_millis(120);

/// Panel orientation: {portrait, landscape} x {normal, reversed} x {mirrored, not}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    #[default]
    Portrait,
    Landscape,
    ReversePortrait,
    ReverseLandscape,
    MirrorPortrait,
    MirrorLandscape,
    ReverseMirrorPortrait,
    ReverseMirrorLandscape,
}

impl Rotation {
    pub const ALL: [Rotation; 8] = [
        Rotation::Portrait,
        Rotation::Landscape,
        Rotation::ReversePortrait,
        Rotation::ReverseLandscape,
        Rotation::MirrorPortrait,
        Rotation::MirrorLandscape,
        Rotation::ReverseMirrorPortrait,
        Rotation::ReverseMirrorLandscape,
    ];

    pub fn is_landscape(self) -> bool {
        matches!(
            self,
            Rotation::Landscape
                | Rotation::ReverseLandscape
                | Rotation::MirrorLandscape
                | Rotation::ReverseMirrorLandscape
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorOrder {
    #[default]
    Rgb,
    Bgr,
}

/// The byte-stream and pin contract the driver needs from the hardware.
///
/// Implementations must be synchronous and order-preserving: every call
/// completes before the next one is issued.
pub trait Transport {
    /// Drive the command/data select line.
    fn select_mode(&mut self, mode: Mode) -> Res<()>;

    /// Assert (`true`) or release (`false`) chip select.
    fn select_chip(&mut self, active: bool) -> Res<()>;

    /// Clock out a buffer while the chip is selected.
    fn write_bytes(&mut self, data: &[u8]) -> Res<()>;

    /// Drive the reset line; `false` holds the controller in reset.
    fn set_reset(&mut self, level: bool) -> Res<()>;

    /// Hardware reset: low for [`RESET_LOW`], then high and wait [`RESET_SETTLE`].
    fn reset_pulse(&mut self) -> Res<()> {
        self.set_reset(false)?;
        thread::sleep(RESET_LOW);
        self.set_reset(true)?;
        thread::sleep(RESET_SETTLE);
        Ok(())
    }
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn select_mode(&mut self, mode: Mode) -> Res<()> {
        T::select_mode(self, mode)
    }

    fn select_chip(&mut self, active: bool) -> Res<()> {
        T::select_chip(self, active)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Res<()> {
        T::write_bytes(self, data)
    }

    fn set_reset(&mut self, level: bool) -> Res<()> {
        T::set_reset(self, level)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn select_mode(&mut self, mode: Mode) -> Res<()> {
        T::select_mode(self, mode)
    }

    fn select_chip(&mut self, active: bool) -> Res<()> {
        T::select_chip(self, active)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Res<()> {
        T::write_bytes(self, data)
    }

    fn set_reset(&mut self, level: bool) -> Res<()> {
        T::set_reset(self, level)
    }
}
