// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use crate::registers::{PANEL_HEIGHT, PANEL_WIDTH};
use crate::{ColorOrder, Res, Rotation};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub label: String,
    pub width: u16,
    pub height: u16,
    pub rotation: Rotation,
    pub color_order: ColorOrder,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            label: String::from("ili9225"),
            width: PANEL_WIDTH,
            height: PANEL_HEIGHT,
            rotation: Rotation::Portrait,
            color_order: ColorOrder::Rgb,
        }
    }
}

/// Explicit pin roles. Each role is wired to its own pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    pub spi: u8,
    pub sck: u8,
    pub mosi: u8,
    pub miso: u8,
    pub cs: u8,
    pub dc: u8,
    pub reset: u8,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            spi: 0,
            sck: 2,
            mosi: 3,
            miso: 4,
            cs: 5,
            dc: 6,
            reset: 7,
        }
    }
}

impl PinConfig {
    pub fn roles(&self) -> [(&'static str, u8); 6] {
        [
            ("sck", self.sck),
            ("mosi", self.mosi),
            ("miso", self.miso),
            ("cs", self.cs),
            ("dc", self.dc),
            ("reset", self.reset),
        ]
    }

    pub fn validate(&self) -> Res<()> {
        let roles = self.roles();
        for (i, (a, pin)) in roles.iter().enumerate() {
            if let Some((b, _)) = roles[i + 1..].iter().find(|(_, p)| p == pin) {
                return Err(format!("pin {pin} assigned to both {a} and {b}").into());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            host: String::from("127.0.0.1"),
            port: 9225,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub pins: PinConfig,
    pub viewer: ViewerConfig,
}

pub fn load<P: AsRef<Path>>(path: P) -> Res<Config> {
    let file = File::open(path)?;
    let config: Config = serde_yaml::from_reader(BufReader::new(file))?;
    Ok(config)
}

pub fn parse(s: &str) -> Res<Config> {
    Ok(serde_yaml::from_str(s)?)
}
