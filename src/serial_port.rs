// SPDX-License-Identifier: GPL-3.0-or-later

//! Transport over a USB-serial SPI bridge.
//!
//! Each strobe travels as one frame:
//!
//! ```text
//! 'C' len:u16be payload    command bytes, sent with D/C low and CS asserted
//! 'D' len:u16be payload    data bytes, sent with D/C high and CS asserted
//! 'R' level:u8             drive the reset line
//! ```

use std::io::Write;
use std::time::Duration;

use crate::decoder::ProtocolError;
use crate::{Mode, Res, Transport};

/// USB serial number reported by the bridge firmware.
pub const BRIDGE_SERIAL: &str = "ILI9225BRIDGE";

pub const BAUD_RATE: u32 = 921_600;

const MAX_PAYLOAD: usize = u16::MAX as usize;

pub struct SerialBridge<P: Write> {
    port: P,
    mode: Mode,
    selected: bool,
}

impl SerialBridge<Box<dyn serialport::SerialPort>> {
    /// Open the bridge on `portname`, or find it by serial number when
    /// `portname` is `"AUTO"`.
    pub fn open(portname: &str) -> Res<Self> {
        let name = match portname {
            "AUTO" => detect(BRIDGE_SERIAL)?,
            name => name.to_string(),
        };
        log::info!(port = name.as_str(), baud = BAUD_RATE; "opening serial bridge");
        let port = serialport::new(&name, BAUD_RATE)
            .timeout(Duration::from_millis(1000))
            .open()?;
        Ok(Self::new(port))
    }
}

impl<P: Write> SerialBridge<P> {
    pub fn new(port: P) -> Self {
        Self {
            port,
            mode: Mode::default(),
            selected: false,
        }
    }

    pub fn into_inner(self) -> P {
        self.port
    }

    fn frame(&mut self, tag: u8, payload: &[u8]) -> Res<()> {
        for chunk in payload.chunks(MAX_PAYLOAD) {
            self.port.write_all(&[tag])?;
            self.port.write_all(&(chunk.len() as u16).to_be_bytes())?;
            self.port.write_all(chunk)?;
        }
        Ok(())
    }
}

impl<P: Write> Transport for SerialBridge<P> {
    fn select_mode(&mut self, mode: Mode) -> Res<()> {
        self.mode = mode;
        Ok(())
    }

    fn select_chip(&mut self, active: bool) -> Res<()> {
        self.selected = active;
        if !active {
            self.port.flush()?;
        }
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Res<()> {
        if !self.selected {
            return Err(ProtocolError::ChipNotSelected.into());
        }
        match self.mode {
            Mode::Command => self.frame(b'C', data),
            Mode::Data => self.frame(b'D', data),
        }
    }

    fn set_reset(&mut self, level: bool) -> Res<()> {
        self.port.write_all(&[b'R', level as u8])?;
        self.port.flush()?;
        Ok(())
    }
}

/// Name of the serial port whose USB serial number is `ser`.
pub fn detect(ser: &str) -> Res<String> {
    for p in serialport::available_ports()? {
        if let serialport::SerialPortType::UsbPort(info) = p.port_type {
            let serial = info.serial_number.as_ref().map_or("", String::as_str);
            if serial == ser {
                return Ok(p.port_name);
            }
        }
    }
    Err(format!("no serial device matching {}", ser).into())
}
