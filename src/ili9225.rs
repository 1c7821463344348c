// SPDX-License-Identifier: GPL-3.0-or-later

//! Register-level encoder for the ILI9225 controller.
//!
//! Every drawing operation becomes a sequence of command strobes (one
//! register address each) and data strobes (16-bit words, big-endian).
//! Bad calls are logged and dropped so that a display loop keeps running;
//! only transport failures are returned to the caller.

use std::iter;
use std::thread;

use thiserror::Error;

use crate::registers::{self, InitStep, INIT_SEQUENCE};
use crate::{
    colors, Color, ColorOrder, Coord, Mode, PinConfig, Rect, Res, Rotation, ScanOrder, Transport,
    Window,
};

// Words per data strobe when streaming a burst.
const BURST_WORDS: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("device is not initialized")]
    Unconfigured,
    #[error("invalid pin configuration: {0}")]
    Pins(String),
    #[error("invalid panel size {0}x{1}")]
    Dimensions(u16, u16),
    #[error("pixel {0} outside {1}x{2}")]
    Pixel(Coord, u16, u16),
    #[error("line {0} to {1} misses {2}x{3}")]
    Line(Coord, Coord, u16, u16),
    #[error("rectangle {0} outside {1}x{2}")]
    Rect(Rect, u16, u16),
    #[error("circle {0} radius {1} does not fit {2}x{3}")]
    Circle(Coord, i32, u16, u16),
    #[error("invalid radius {0}")]
    Radius(i32),
    #[error("{what} {rect} needs {needed} bytes or words, got {got}")]
    ShortData {
        what: &'static str,
        rect: Rect,
        needed: usize,
        got: usize,
    },
}

impl Rejected {
    /// Whether the device itself is unusable, as opposed to one bad call.
    pub fn is_config(&self) -> bool {
        matches!(
            self,
            Rejected::Unconfigured | Rejected::Pins(_) | Rejected::Dimensions(..)
        )
    }
}

/// What the encoder knows about the panel once it is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceState {
    /// Logical size for the current rotation.
    pub width: u16,
    pub height: u16,
    pub rotation: Rotation,
    pub color_order: ColorOrder,
    pub pins: PinConfig,
    pub window: Window,
    pub cursor: (u16, u16),
}

pub struct Ili9225<T: Transport> {
    port: T,
    label: String,
    pins: PinConfig,
    state: Option<DeviceState>,
}

impl<T: Transport> Ili9225<T> {
    /// Create an unconfigured device; nothing is sent until
    /// [`Ili9225::initialize`].
    pub fn new(port: T, pins: PinConfig) -> Self {
        Self {
            port,
            label: String::from("ili9225"),
            pins,
            state: None,
        }
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_string();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn transport(&self) -> &T {
        &self.port
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.port
    }

    pub fn into_inner(self) -> T {
        self.port
    }

    pub fn state(&self) -> Option<&DeviceState> {
        self.state.as_ref()
    }

    /// Logical (width, height), or `None` before initialization.
    pub fn screen_size(&self) -> Option<(u16, u16)> {
        self.state.as_ref().map(|s| (s.width, s.height))
    }

    fn log_rejection(&self, why: &Rejected) {
        let target = self.label.as_str();
        if why.is_config() {
            log::error!(target: target, "{why}");
        } else if let Rejected::Pixel(..) = why {
            log::trace!(target: target, "dropped: {why}");
        } else {
            log::debug!(target: target, "dropped: {why}");
        }
    }

    /// Log a dropped operation. Always `Ok`, so callers can
    /// `return self.reject(...)`.
    pub(crate) fn reject(&self, why: Rejected) -> Res<()> {
        self.log_rejection(&why);
        Ok(())
    }

    // Panel size, or None (logged) when the device is unconfigured.
    pub(crate) fn extents(&self) -> Option<(u16, u16)> {
        let size = self.screen_size();
        if size.is_none() {
            self.log_rejection(&Rejected::Unconfigured);
        }
        size
    }

    /// Reset the controller and run the power-on register sequence.
    ///
    /// `width` x `height` is the native (portrait) panel size; landscape
    /// rotations swap the logical dimensions. On a configuration error the
    /// device stays unconfigured.
    pub fn initialize(&mut self, width: u16, height: u16, rotation: Rotation) -> Res<()> {
        if width == 0 || height == 0 {
            return self.reject(Rejected::Dimensions(width, height));
        }
        if let Err(e) = self.pins.validate() {
            return self.reject(Rejected::Pins(e.to_string()));
        }
        log::info!(target: self.label.as_str(), width = width, height = height; "initializing panel");
        log::debug!(
            target: self.label.as_str(),
            spi = self.pins.spi,
            sck = self.pins.sck,
            mosi = self.pins.mosi,
            miso = self.pins.miso,
            cs = self.pins.cs,
            dc = self.pins.dc,
            reset = self.pins.reset;
            "pin roles"
        );
        self.state = None;

        self.port.reset_pulse()?;
        for step in INIT_SEQUENCE {
            match *step {
                InitStep::Write(reg, value) => self.write_register(reg, value)?,
                InitStep::Delay(d) => thread::sleep(d),
            }
        }
        self.write_register(
            registers::ENTRY_MODE,
            registers::entry_mode(rotation, ColorOrder::Rgb),
        )?;

        let (width, height) = if rotation.is_landscape() {
            (height, width)
        } else {
            (width, height)
        };
        self.state = Some(DeviceState {
            width,
            height,
            rotation,
            color_order: ColorOrder::Rgb,
            pins: self.pins,
            window: Window::full(width, height),
            cursor: (0, 0),
        });
        log::info!(target: self.label.as_str(), width = width, height = height; "panel ready");
        Ok(())
    }

    fn write_command(&mut self, reg: u8) -> Res<()> {
        self.port.select_mode(Mode::Command)?;
        self.port.select_chip(true)?;
        self.port.write_bytes(&[reg])?;
        self.port.select_chip(false)
    }

    fn write_data(&mut self, word: u16) -> Res<()> {
        self.port.select_mode(Mode::Data)?;
        self.port.select_chip(true)?;
        self.port.write_bytes(&word.to_be_bytes())?;
        self.port.select_chip(false)
    }

    /// One command strobe followed by one data word.
    pub fn write_register(&mut self, reg: u8, value: u16) -> Res<()> {
        self.write_command(reg)?;
        self.write_data(value)
    }

    /// Clamp the corners to the panel and open the window for GRAM writes.
    pub fn set_window(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Res<()> {
        let Some((width, height)) = self.extents() else {
            return Ok(());
        };
        self.open_window(Window::clamped(x1, y1, x2, y2, width, height))
    }

    // Window bounds, address counter, then GRAM write mode. `w` is in
    // logical coordinates; the registers take GRAM addresses, and the
    // counter starts at the corner holding the logical origin. The window
    // registers come in end/start pairs.
    fn open_window(&mut self, w: Window) -> Res<()> {
        let (gram, start) = match &self.state {
            Some(state) => {
                let scan = ScanOrder::from_entry_mode(registers::entry_mode(
                    state.rotation,
                    state.color_order,
                ));
                let (gram_w, gram_h) = scan.swap_axes(state.width, state.height);
                scan.gram_window(w, gram_w, gram_h)
            }
            None => (w, w.origin()),
        };
        self.write_register(registers::HORIZONTAL_WINDOW_ADDR1, gram.x2)?;
        self.write_register(registers::HORIZONTAL_WINDOW_ADDR2, gram.x1)?;
        self.write_register(registers::VERTICAL_WINDOW_ADDR1, gram.y2)?;
        self.write_register(registers::VERTICAL_WINDOW_ADDR2, gram.y1)?;
        self.write_register(registers::RAM_ADDR_SET1, start.0)?;
        self.write_register(registers::RAM_ADDR_SET2, start.1)?;
        self.write_command(registers::GRAM_DATA)?;
        if let Some(state) = self.state.as_mut() {
            state.window = w;
            state.cursor = w.origin();
        }
        Ok(())
    }

    // Stream words into the open window inside a single chip-select frame.
    fn stream<I: Iterator<Item = u16>>(&mut self, words: I) -> Res<()> {
        let mut buf = Vec::with_capacity(2 * BURST_WORDS);
        let mut count = 0;
        self.port.select_mode(Mode::Data)?;
        self.port.select_chip(true)?;
        for word in words {
            buf.extend_from_slice(&word.to_be_bytes());
            count += 1;
            if buf.len() == 2 * BURST_WORDS {
                self.port.write_bytes(&buf)?;
                buf.clear();
            }
        }
        if !buf.is_empty() {
            self.port.write_bytes(&buf)?;
        }
        self.port.select_chip(false)?;
        if let Some(state) = self.state.as_mut() {
            state.cursor = state.window.advance_by(state.cursor, count);
        }
        Ok(())
    }

    /// Push raw pixels into the currently open window.
    pub fn write_pixels(&mut self, pixels: &[Color]) -> Res<()> {
        if self.extents().is_none() || pixels.is_empty() {
            return Ok(());
        }
        self.stream(pixels.iter().copied())
    }

    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Color) -> Res<()> {
        let Some((width, height)) = self.extents() else {
            return Ok(());
        };
        if x < 0 || y < 0 || x >= width as i32 || y >= height as i32 {
            return self.reject(Rejected::Pixel(Coord::new(x, y), width, height));
        }
        let (x, y) = (x as u16, y as u16);
        self.open_window(Window::new(x, y, x, y))?;
        self.write_data(color)?;
        if let Some(state) = self.state.as_mut() {
            state.cursor = state.window.advance(state.cursor);
        }
        Ok(())
    }

    /// Fill the part of the rectangle that lies on the panel, opening the
    /// window once.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: u32, h: u32, color: Color) -> Res<()> {
        let Some((width, height)) = self.extents() else {
            return Ok(());
        };
        let rect = Rect::new(x, y, w, h);
        let Some(window) = rect.clip(width, height) else {
            return self.reject(Rejected::Rect(rect, width, height));
        };
        self.open_window(window)?;
        self.stream(iter::repeat(color).take(window.area()))
    }

    pub fn fill_screen(&mut self, color: Color) -> Res<()> {
        let Some((width, height)) = self.extents() else {
            return Ok(());
        };
        self.fill_rect(0, 0, width as u32, height as u32, color)
    }

    pub fn refresh_display(&mut self) -> Res<()> {
        self.fill_screen(colors::BLACK)
    }

    /// Blit a row-major RGB565 image, clipped to the panel.
    pub fn draw_image(&mut self, x: i32, y: i32, w: u32, h: u32, pixels: &[Color]) -> Res<()> {
        let Some((width, height)) = self.extents() else {
            return Ok(());
        };
        let rect = Rect::new(x, y, w, h);
        let needed = w as usize * h as usize;
        if pixels.len() < needed {
            return self.reject(Rejected::ShortData {
                what: "image",
                rect,
                needed,
                got: pixels.len(),
            });
        }
        let Some(window) = rect.clip(width, height) else {
            return self.reject(Rejected::Rect(rect, width, height));
        };
        self.open_window(window)?;
        let (dx, dy) = ((window.x1 as i32 - x) as usize, (window.y1 as i32 - y) as usize);
        let stride = w as usize;
        let rows = (0..window.height()).flat_map(|row| {
            let start = (dy + row) * stride + dx;
            pixels[start..start + window.width()].iter().copied()
        });
        self.stream(rows)
    }

    fn write_entry_mode(&mut self, rotation: Rotation, order: ColorOrder) -> Res<()> {
        self.write_register(registers::ENTRY_MODE, registers::entry_mode(rotation, order))
    }

    /// Change the scan orientation. Width and height swap when the new
    /// rotation changes between portrait and landscape. The panel content is
    /// not redrawn; call [`Ili9225::refresh_display`] for that.
    pub fn set_rotation(&mut self, rotation: Rotation) -> Res<()> {
        let Some(state) = self.state.clone() else {
            return self.reject(Rejected::Unconfigured);
        };
        if state.rotation == rotation {
            return Ok(());
        }
        self.write_entry_mode(rotation, state.color_order)?;
        log::debug!(target: self.label.as_str(), "rotation {:?} -> {:?}", state.rotation, rotation);
        if let Some(state) = self.state.as_mut() {
            if state.rotation.is_landscape() != rotation.is_landscape() {
                (state.width, state.height) = (state.height, state.width);
                state.window = Window::full(state.width, state.height);
                state.cursor = state.window.origin();
            }
            state.rotation = rotation;
        }
        Ok(())
    }

    pub fn set_color_order(&mut self, order: ColorOrder) -> Res<()> {
        let Some(state) = self.state.clone() else {
            return self.reject(Rejected::Unconfigured);
        };
        if state.color_order == order {
            return Ok(());
        }
        self.write_entry_mode(state.rotation, order)?;
        if let Some(state) = self.state.as_mut() {
            state.color_order = order;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::*;
    use crate::{Ili9225Mirror, JsonLineSink, Recorder, Tee, Transaction};

    fn recorder_device() -> Res<Ili9225<Recorder>> {
        let mut dev = Ili9225::new(Recorder::new(), PinConfig::default());
        dev.initialize(PANEL_WIDTH, PANEL_HEIGHT, Rotation::Portrait)?;
        dev.transport_mut().clear();
        Ok(dev)
    }

    fn mirror_device(rotation: Rotation) -> Res<Ili9225<Ili9225Mirror>> {
        let mirror = Ili9225Mirror::new(PANEL_WIDTH, PANEL_HEIGHT);
        let mut dev = Ili9225::new(mirror, PinConfig::default());
        dev.initialize(PANEL_WIDTH, PANEL_HEIGHT, rotation)?;
        Ok(dev)
    }

    fn window_writes(x1: u16, y1: u16, x2: u16, y2: u16) -> Vec<Transaction> {
        use Transaction::*;
        vec![
            Command(HORIZONTAL_WINDOW_ADDR1),
            Data(x2),
            Command(HORIZONTAL_WINDOW_ADDR2),
            Data(x1),
            Command(VERTICAL_WINDOW_ADDR1),
            Data(y2),
            Command(VERTICAL_WINDOW_ADDR2),
            Data(y1),
            Command(RAM_ADDR_SET1),
            Data(x1),
            Command(RAM_ADDR_SET2),
            Data(y1),
            Command(GRAM_DATA),
        ]
    }

    #[test]
    fn test_initialize_sequence() -> Res<()> {
        let mut dev = Ili9225::new(Recorder::new(), PinConfig::default());
        dev.initialize(176, 220, Rotation::Portrait)?;
        let rec = dev.transport();
        assert_eq!(rec.resets(), 1);

        let mut expected = Vec::new();
        for step in INIT_SEQUENCE {
            if let InitStep::Write(reg, value) = *step {
                expected.push(Transaction::Command(reg));
                expected.push(Transaction::Data(value));
            }
        }
        expected.push(Transaction::Command(ENTRY_MODE));
        expected.push(Transaction::Data(ENTRY_ID1 | ENTRY_ID0));
        assert_eq!(rec.transactions(), expected.as_slice());
        // every strobe in its own chip-select frame
        assert_eq!(rec.frames(), expected.len());
        assert_eq!(dev.screen_size(), Some((176, 220)));
        Ok(())
    }

    #[test]
    fn test_initialize_landscape_swaps_size() -> Res<()> {
        let dev = mirror_device(Rotation::Landscape)?;
        assert_eq!(dev.screen_size(), Some((220, 176)));
        let fb = dev.transport().framebuffer();
        assert_eq!((fb.width(), fb.height()), (220, 176));
        let gram = dev.transport().gram();
        assert_eq!((gram.width(), gram.height()), (176, 220));
        assert_eq!(
            dev.transport().register(ENTRY_MODE),
            Some(ENTRY_AM | ENTRY_ID1)
        );
        Ok(())
    }

    #[test]
    fn test_initialize_rejects_bad_config() -> Res<()> {
        let pins = PinConfig {
            reset: 3,
            ..PinConfig::default()
        };
        let mut dev = Ili9225::new(Recorder::new(), pins);
        dev.initialize(176, 220, Rotation::Portrait)?;
        assert!(dev.state().is_none());
        assert_eq!(dev.transport().resets(), 0);

        let mut dev = Ili9225::new(Recorder::new(), PinConfig::default());
        dev.initialize(0, 220, Rotation::Portrait)?;
        assert!(dev.state().is_none());
        assert!(dev.transport().transactions().is_empty());
        Ok(())
    }

    #[test]
    fn test_unconfigured_device_drops_everything() -> Res<()> {
        let mut dev = Ili9225::new(Recorder::new(), PinConfig::default());
        dev.draw_pixel(1, 1, colors::RED)?;
        dev.fill_rect(0, 0, 10, 10, colors::RED)?;
        dev.set_window(0, 0, 5, 5)?;
        dev.write_pixels(&[1, 2, 3])?;
        dev.set_rotation(Rotation::Landscape)?;
        dev.set_color_order(ColorOrder::Bgr)?;
        dev.refresh_display()?;
        assert!(dev.transport().transactions().is_empty());
        Ok(())
    }

    #[test]
    fn test_set_window() -> Res<()> {
        let mut dev = recorder_device()?;
        dev.set_window(10, 20, 30, 40)?;
        assert_eq!(dev.transport().transactions(), window_writes(10, 20, 30, 40));
        let state = dev.state().unwrap();
        assert_eq!(state.window, Window::new(10, 20, 30, 40));
        assert_eq!(state.cursor, (10, 20));
        Ok(())
    }

    #[test]
    fn test_set_window_clamps() -> Res<()> {
        let mut dev = recorder_device()?;
        dev.set_window(200, 300, -5, 10)?;
        assert_eq!(dev.transport().transactions(), window_writes(0, 10, 175, 219));
        Ok(())
    }

    #[test]
    fn test_draw_pixel() -> Res<()> {
        let mut dev = recorder_device()?;
        dev.draw_pixel(5, 7, 0xabcd)?;
        let mut expected = window_writes(5, 7, 5, 7);
        expected.push(Transaction::Data(0xabcd));
        assert_eq!(dev.transport().transactions(), expected);

        dev.transport_mut().clear();
        for (x, y) in [(-1, 0), (0, -1), (176, 0), (0, 220)] {
            dev.draw_pixel(x, y, colors::WHITE)?;
        }
        assert!(dev.transport().transactions().is_empty());
        Ok(())
    }

    #[test]
    fn test_fill_rect_opens_window_once() -> Res<()> {
        let mut dev = recorder_device()?;
        dev.fill_rect(170, 215, 20, 20, colors::GREEN)?;
        let rec = dev.transport();
        let mut expected = window_writes(170, 215, 175, 219);
        expected.extend(iter::repeat(Transaction::Data(colors::GREEN)).take(30));
        assert_eq!(rec.transactions(), expected);
        // 13 window strobes + one burst frame
        assert_eq!(rec.frames(), 14);
        Ok(())
    }

    #[test]
    fn test_fill_rect_out_of_range() -> Res<()> {
        let mut dev = recorder_device()?;
        dev.fill_rect(176, 0, 10, 10, colors::RED)?;
        dev.fill_rect(-10, 5, 10, 10, colors::RED)?;
        dev.fill_rect(5, 5, 0, 10, colors::RED)?;
        assert!(dev.transport().transactions().is_empty());
        Ok(())
    }

    #[test]
    fn test_burst_is_chunked() -> Res<()> {
        let mut dev = recorder_device()?;
        dev.set_window(0, 0, 175, 219)?;
        dev.transport_mut().clear();
        let pixels: Vec<Color> = (0..600).collect();
        dev.write_pixels(&pixels)?;
        let words: Vec<Transaction> = pixels.iter().map(|&p| Transaction::Data(p)).collect();
        assert_eq!(dev.transport().transactions(), words);
        assert_eq!(dev.transport().frames(), 1);
        assert_eq!(dev.state().unwrap().cursor, (600 % 176, 600 / 176));
        Ok(())
    }

    #[test]
    fn test_clear_then_pixel() -> Res<()> {
        let mut dev = mirror_device(Rotation::Portrait)?;
        dev.fill_rect(0, 0, 176, 220, colors::BLACK)?;
        let cleared = dev.transport().framebuffer();
        dev.draw_pixel(88, 110, 0xf800)?;
        let fb = dev.transport().framebuffer();
        assert_eq!(cleared.diff(&fb), vec![(88, 110)]);
        assert_eq!(fb.get(88, 110), Some(0xf800));
        Ok(())
    }

    #[test]
    fn test_pixels_land_where_drawn() -> Res<()> {
        let mut dev = mirror_device(Rotation::Portrait)?;
        let points = [(0, 0), (175, 0), (0, 219), (175, 219), (42, 97)];
        for (i, &(x, y)) in points.iter().enumerate() {
            dev.draw_pixel(x, y, 0x1000 + i as Color)?;
        }
        let fb = dev.transport().framebuffer();
        for (i, &(x, y)) in points.iter().enumerate() {
            assert_eq!(fb.get(x as u16, y as u16), Some(0x1000 + i as Color));
        }
        Ok(())
    }

    #[test]
    fn test_fill_rect_exact_clip() -> Res<()> {
        let mut dev = mirror_device(Rotation::Portrait)?;
        dev.fill_rect(-3, 200, 10, 40, colors::CYAN)?;
        let fb = dev.transport().framebuffer();
        let cyan = fb.find(colors::CYAN);
        assert_eq!(cyan.len(), 7 * 20);
        assert!(cyan.iter().all(|&(x, y)| x < 7 && y >= 200));
        Ok(())
    }

    #[test]
    fn test_draw_image() -> Res<()> {
        let mut dev = mirror_device(Rotation::Portrait)?;
        let image: Vec<Color> = (1..=12).collect();
        // 4x3 image hanging off the left edge by one column
        dev.draw_image(-1, 5, 4, 3, &image)?;
        let fb = dev.transport().framebuffer();
        assert_eq!(fb.row(5)[..4], [2, 3, 4, 0]);
        assert_eq!(fb.row(6)[..4], [6, 7, 8, 0]);
        assert_eq!(fb.row(7)[..4], [10, 11, 12, 0]);

        // too few pixels for 4x4: dropped
        dev.transport_mut().flush(&mut JsonLineSink::new(std::io::sink()))?;
        dev.draw_image(0, 0, 4, 4, &image)?;
        assert!(!dev.transport().is_dirty());
        Ok(())
    }

    #[test]
    fn test_set_rotation() -> Res<()> {
        let mut dev = recorder_device()?;
        dev.set_rotation(Rotation::Portrait)?;
        assert!(dev.transport().transactions().is_empty());

        dev.set_rotation(Rotation::ReverseLandscape)?;
        assert_eq!(
            dev.transport().transactions(),
            &[
                Transaction::Command(ENTRY_MODE),
                Transaction::Data(ENTRY_AM | ENTRY_ID0)
            ]
        );
        assert_eq!(dev.screen_size(), Some((220, 176)));

        dev.transport_mut().clear();
        dev.set_rotation(Rotation::MirrorLandscape)?;
        assert_eq!(dev.transport().transactions().len(), 2);
        assert_eq!(dev.screen_size(), Some((220, 176)));

        dev.set_rotation(Rotation::MirrorPortrait)?;
        assert_eq!(dev.screen_size(), Some((176, 220)));
        Ok(())
    }

    #[test]
    fn test_set_color_order() -> Res<()> {
        let mut dev = recorder_device()?;
        dev.set_color_order(ColorOrder::Rgb)?;
        assert!(dev.transport().transactions().is_empty());
        dev.set_color_order(ColorOrder::Bgr)?;
        dev.set_color_order(ColorOrder::Bgr)?;
        assert_eq!(
            dev.transport().transactions(),
            &[
                Transaction::Command(ENTRY_MODE),
                Transaction::Data(ENTRY_BGR | ENTRY_ID1 | ENTRY_ID0)
            ]
        );
        Ok(())
    }

    #[test]
    fn test_landscape_drawing() -> Res<()> {
        let mut dev = mirror_device(Rotation::Portrait)?;
        dev.set_rotation(Rotation::Landscape)?;
        dev.refresh_display()?;
        dev.draw_pixel(219, 175, colors::MAGENTA)?;
        dev.draw_pixel(219, 176, colors::MAGENTA)?;
        let fb = dev.transport().framebuffer();
        assert_eq!((fb.width(), fb.height()), (220, 176));
        assert_eq!(fb.find(colors::MAGENTA), vec![(219, 175)]);
        assert_eq!(dev.transport().stats().dropped, 0);
        Ok(())
    }

    #[test]
    fn test_fill_screen_and_refresh() -> Res<()> {
        let mut dev = mirror_device(Rotation::Portrait)?;
        dev.fill_screen(colors::YELLOW)?;
        assert_eq!(dev.transport().framebuffer().find(colors::YELLOW).len(), 176 * 220);
        dev.refresh_display()?;
        assert_eq!(dev.transport().framebuffer().find(colors::BLACK).len(), 176 * 220);
        Ok(())
    }

    #[test]
    fn test_every_rotation_addresses_gram_in_range() -> Res<()> {
        for rotation in Rotation::ALL {
            let mirror = Ili9225Mirror::new(PANEL_WIDTH, PANEL_HEIGHT);
            let mut dev = Ili9225::new(Tee::new(mirror, Recorder::new()), PinConfig::default());
            dev.initialize(PANEL_WIDTH, PANEL_HEIGHT, rotation)?;
            let (width, height) = dev.screen_size().unwrap();
            dev.fill_rect(0, 0, width as u32, height as u32, colors::BLUE)?;
            let points = [(0, 0), (width - 1, 0), (0, height - 1), (width - 1, height - 1), (37, 11)];
            for (i, &(x, y)) in points.iter().enumerate() {
                dev.draw_pixel(x as i32, y as i32, 0x1000 + i as Color)?;
            }
            let image: Vec<Color> = (1..=6).collect();
            dev.draw_image(50, 60, 3, 2, &image)?;

            let (mirror, recorder) = dev.into_inner().into_inner();
            let mut latched = None;
            for t in recorder.transactions() {
                match *t {
                    Transaction::Command(reg) => latched = Some(reg),
                    Transaction::Data(v) => match latched {
                        Some(HORIZONTAL_WINDOW_ADDR1 | HORIZONTAL_WINDOW_ADDR2 | RAM_ADDR_SET1) => {
                            assert!(v < PANEL_WIDTH, "{rotation:?}: x address {v}")
                        }
                        Some(VERTICAL_WINDOW_ADDR1 | VERTICAL_WINDOW_ADDR2 | RAM_ADDR_SET2) => {
                            assert!(v < PANEL_HEIGHT, "{rotation:?}: y address {v}")
                        }
                        _ => {}
                    },
                }
            }

            assert_eq!(mirror.stats().dropped, 0, "{rotation:?}");
            let fb = mirror.framebuffer();
            assert_eq!((fb.width(), fb.height()), (width, height), "{rotation:?}");
            for (i, &(x, y)) in points.iter().enumerate() {
                assert_eq!(fb.get(x, y), Some(0x1000 + i as Color), "{rotation:?} ({x}, {y})");
            }
            assert_eq!(fb.row(60)[50..53], [1, 2, 3], "{rotation:?}");
            assert_eq!(fb.row(61)[50..53], [4, 5, 6], "{rotation:?}");
            assert_eq!(fb.find(colors::BLUE).len(), width as usize * height as usize - 11);
        }
        Ok(())
    }

    #[test]
    fn test_landscape_pixel_lands_on_turned_gram() -> Res<()> {
        let mut dev = mirror_device(Rotation::Landscape)?;
        dev.draw_pixel(10, 20, colors::RED)?;
        assert_eq!(dev.transport().register(HORIZONTAL_WINDOW_ADDR1), Some(155));
        assert_eq!(dev.transport().register(VERTICAL_WINDOW_ADDR1), Some(10));
        assert_eq!(dev.transport().gram().find(colors::RED), vec![(155, 10)]);

        // a landscape row runs down a GRAM column
        dev.fill_rect(0, 0, 220, 1, colors::GREEN)?;
        let gram = dev.transport().gram();
        let column: Vec<_> = gram.find(colors::GREEN);
        assert_eq!(column.len(), 220);
        assert!(column.iter().all(|&(x, _)| x == 175));
        Ok(())
    }
}
