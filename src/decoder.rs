// SPDX-License-Identifier: GPL-3.0-or-later

//! Software mirror of the ILI9225 register protocol.
//!
//! [`Ili9225Mirror`] sits where the panel would: it implements [`Transport`],
//! watches the same command/data strobes the hardware would see and rebuilds
//! GRAM in a [`Framebuffer`] with the native panel geometry. The address
//! counter steps the way the entry mode register says, so a rotated picture
//! is stored exactly as the glass would show it. Anything the real
//! controller would not accept is reported as a [`ProtocolError`].

use std::collections::BTreeMap;

use thiserror::Error;

use crate::registers::{self, ENTRY_POWER_ON};
use crate::transaction;
use crate::viewer::FrameSink;
use crate::{Framebuffer, Mode, Res, ScanOrder, Transaction, Transport, Window};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("data strobe without a preceding command")]
    DataWithoutCommand,
    #[error("command 0x{0:02x} does not address a mapped register")]
    UnmappedRegister(u8),
    #[error("command strobe carries {0} bytes, expected 1")]
    CommandLength(usize),
    #[error("data strobe carries {0} bytes, expected whole 16-bit words")]
    OddPayload(usize),
    #[error("bytes written while chip select is inactive")]
    ChipNotSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    CommandLatched(u8),
    DataAccumulating(u8),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MirrorStats {
    pub commands: usize,
    pub words: usize,
    pub pixels: usize,
    /// GRAM words addressed outside the framebuffer.
    pub dropped: usize,
}

pub struct Ili9225Mirror {
    label: String,
    gram: Framebuffer,
    window: Window,
    cursor: (u16, u16),
    scan: ScanOrder,
    state: State,
    mode: Mode,
    selected: bool,
    registers: BTreeMap<u8, u16>,
    dirty: bool,
    stats: MirrorStats,
}

impl Ili9225Mirror {
    /// A mirror of a `width` x `height` panel in its native orientation.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            label: String::from("ili9225-mirror"),
            gram: Framebuffer::new(width, height),
            window: Window::full(width, height),
            cursor: (0, 0),
            scan: ScanOrder::from_entry_mode(ENTRY_POWER_ON),
            state: State::Idle,
            mode: Mode::default(),
            selected: false,
            registers: BTreeMap::new(),
            dirty: false,
            stats: MirrorStats::default(),
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    /// Panel memory in native coordinates.
    pub fn gram(&self) -> &Framebuffer {
        &self.gram
    }

    /// The picture in the logical coordinates of the current entry mode,
    /// i.e. the coordinates the driver draws in.
    pub fn framebuffer(&self) -> Framebuffer {
        if self.scan == ScanOrder::ROW_MAJOR {
            return self.gram.clone();
        }
        let (gram_w, gram_h) = (self.gram.width(), self.gram.height());
        let (width, height) = self.scan.swap_axes(gram_w, gram_h);
        let mut fb = Framebuffer::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let (gx, gy) = self.scan.to_gram((x, y), gram_w, gram_h);
                if let Some(c) = self.gram.get(gx, gy) {
                    fb.set(x, y, c);
                }
            }
        }
        fb
    }

    pub fn scan_order(&self) -> ScanOrder {
        self.scan
    }

    pub fn window(&self) -> Window {
        self.window
    }

    pub fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    /// Last value written to a non-GRAM register.
    pub fn register(&self, reg: u8) -> Option<u16> {
        self.registers.get(&reg).copied()
    }

    pub fn stats(&self) -> MirrorStats {
        self.stats
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Feed one transaction through the protocol state machine.
    pub fn apply(&mut self, t: Transaction) -> Result<(), ProtocolError> {
        match t {
            Transaction::Command(reg) => {
                if !registers::is_mapped(reg) {
                    return Err(ProtocolError::UnmappedRegister(reg));
                }
                log::trace!(target: self.label.as_str(), reg = reg; "latch {}", registers::name(reg));
                self.stats.commands += 1;
                self.state = State::CommandLatched(reg);
            }
            Transaction::Data(word) => {
                let reg = match self.state {
                    State::Idle => return Err(ProtocolError::DataWithoutCommand),
                    State::CommandLatched(reg) | State::DataAccumulating(reg) => reg,
                };
                self.stats.words += 1;
                self.state = State::DataAccumulating(reg);
                self.write_register(reg, word);
            }
        }
        Ok(())
    }

    fn write_register(&mut self, reg: u8, word: u16) {
        match reg {
            registers::GRAM_DATA => return self.write_pixel(word),
            registers::HORIZONTAL_WINDOW_ADDR1 => self.window.x2 = word,
            registers::HORIZONTAL_WINDOW_ADDR2 => self.window.x1 = word,
            registers::VERTICAL_WINDOW_ADDR1 => self.window.y2 = word,
            registers::VERTICAL_WINDOW_ADDR2 => self.window.y1 = word,
            registers::RAM_ADDR_SET1 => self.cursor.0 = word,
            registers::RAM_ADDR_SET2 => self.cursor.1 = word,
            registers::ENTRY_MODE => self.scan = ScanOrder::from_entry_mode(word),
            _ => {}
        }
        log::trace!(target: self.label.as_str(), reg = reg, value = word; "write {}", registers::name(reg));
        self.registers.insert(reg, word);
    }

    fn write_pixel(&mut self, color: u16) {
        let (x, y) = self.cursor;
        if self.gram.set(x, y, color) {
            self.stats.pixels += 1;
            self.dirty = true;
        } else {
            self.stats.dropped += 1;
            log::trace!(target: self.label.as_str(), x = x, y = y; "GRAM write outside framebuffer");
        }
        self.cursor = self.scan.advance(self.window, self.cursor);
    }

    // Power-on state after a reset pulse. GRAM content survives.
    fn reset(&mut self) {
        self.window = Window::full(self.gram.width(), self.gram.height());
        self.cursor = (0, 0);
        self.scan = ScanOrder::from_entry_mode(ENTRY_POWER_ON);
        self.state = State::Idle;
        self.registers.clear();
        log::debug!(target: self.label.as_str(), "reset");
    }

    /// Hand the current picture to `sink` if any pixel was written since the
    /// last successful flush. Returns whether a frame was sent. On error the
    /// picture stays dirty and goes out on the next flush.
    pub fn flush(&mut self, sink: &mut dyn FrameSink) -> Res<bool> {
        if !self.dirty {
            log::trace!(target: self.label.as_str(), "framebuffer clean, skipping flush");
            return Ok(false);
        }
        sink.send(&self.framebuffer())?;
        self.dirty = false;
        log::debug!(target: self.label.as_str(), pixels = self.stats.pixels; "framebuffer flushed");
        Ok(true)
    }
}

impl Transport for Ili9225Mirror {
    fn select_mode(&mut self, mode: Mode) -> Res<()> {
        self.mode = mode;
        Ok(())
    }

    fn select_chip(&mut self, active: bool) -> Res<()> {
        self.selected = active;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Res<()> {
        if !self.selected {
            return Err(ProtocolError::ChipNotSelected.into());
        }
        match self.mode {
            Mode::Command => match data {
                [reg] => self.apply(Transaction::Command(*reg))?,
                _ => return Err(ProtocolError::CommandLength(data.len()).into()),
            },
            Mode::Data => {
                for word in transaction::words(data)? {
                    self.apply(Transaction::Data(word))?;
                }
            }
        }
        Ok(())
    }

    fn set_reset(&mut self, level: bool) -> Res<()> {
        if !level {
            self.reset();
        }
        Ok(())
    }
}
