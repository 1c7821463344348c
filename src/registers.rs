// SPDX-License-Identifier: GPL-3.0-or-later

//! ILI9225 register map, entry mode encoding and the power-on sequence.
//!
//! Addresses follow the ILI9225 datasheet (V0.22). The encoder and the
//! mirror both take their register numbers from here.

use std::time::Duration;

use crate::{ColorOrder, Rotation};

pub const START_OSC: u8 = 0x00;
pub const DRIVER_OUTPUT_CTRL: u8 = 0x01;
pub const LCD_AC_DRIVING_CTRL: u8 = 0x02;
pub const ENTRY_MODE: u8 = 0x03;
pub const DISP_CTRL1: u8 = 0x07;
pub const DISP_CTRL2: u8 = 0x08;
pub const FRAME_CYCLE_CTRL: u8 = 0x0b;
pub const INTERFACE_CTRL: u8 = 0x0c;
pub const OSC_CTRL: u8 = 0x0f;
pub const POWER_CTRL1: u8 = 0x10;
pub const POWER_CTRL2: u8 = 0x11;
pub const POWER_CTRL3: u8 = 0x12;
pub const POWER_CTRL4: u8 = 0x13;
pub const POWER_CTRL5: u8 = 0x14;
pub const VCI_RECYCLING: u8 = 0x15;
pub const RAM_ADDR_SET1: u8 = 0x20; // GRAM x
pub const RAM_ADDR_SET2: u8 = 0x21; // GRAM y
pub const GRAM_DATA: u8 = 0x22;
pub const SOFTWARE_RESET: u8 = 0x28;
pub const GATE_SCAN_CTRL: u8 = 0x30;
pub const VERTICAL_SCROLL_CTRL1: u8 = 0x31;
pub const VERTICAL_SCROLL_CTRL2: u8 = 0x32;
pub const VERTICAL_SCROLL_CTRL3: u8 = 0x33;
pub const PARTIAL_DRIVING_POS1: u8 = 0x34;
pub const PARTIAL_DRIVING_POS2: u8 = 0x35;
pub const HORIZONTAL_WINDOW_ADDR1: u8 = 0x36; // window x end
pub const HORIZONTAL_WINDOW_ADDR2: u8 = 0x37; // window x start
pub const VERTICAL_WINDOW_ADDR1: u8 = 0x38; // window y end
pub const VERTICAL_WINDOW_ADDR2: u8 = 0x39; // window y start
pub const GAMMA_CTRL1: u8 = 0x50;
pub const GAMMA_CTRL2: u8 = 0x51;
pub const GAMMA_CTRL3: u8 = 0x52;
pub const GAMMA_CTRL4: u8 = 0x53;
pub const GAMMA_CTRL5: u8 = 0x54;
pub const GAMMA_CTRL6: u8 = 0x55;
pub const GAMMA_CTRL7: u8 = 0x56;
pub const GAMMA_CTRL8: u8 = 0x57;
pub const GAMMA_CTRL9: u8 = 0x58;
pub const GAMMA_CTRL10: u8 = 0x59;

// Entry mode bits
pub const ENTRY_BGR: u16 = 1 << 12;
pub const ENTRY_ID1: u16 = 1 << 5;
pub const ENTRY_ID0: u16 = 1 << 4;
pub const ENTRY_AM: u16 = 1 << 3;

/// Entry mode after reset: BGR, both counters counting up, horizontal first.
pub const ENTRY_POWER_ON: u16 = ENTRY_BGR | ENTRY_ID1 | ENTRY_ID0;

/// Native panel geometry (portrait).
pub const PANEL_WIDTH: u16 = 176;
pub const PANEL_HEIGHT: u16 = 220;

/// Whether `reg` names a register the controller implements.
pub fn is_mapped(reg: u8) -> bool {
    matches!(
        reg,
        START_OSC..=ENTRY_MODE
            | DISP_CTRL1
            | DISP_CTRL2
            | FRAME_CYCLE_CTRL
            | INTERFACE_CTRL
            | OSC_CTRL..=VCI_RECYCLING
            | RAM_ADDR_SET1..=GRAM_DATA
            | SOFTWARE_RESET
            | GATE_SCAN_CTRL..=VERTICAL_WINDOW_ADDR2
            | GAMMA_CTRL1..=GAMMA_CTRL10
    )
}

pub fn name(reg: u8) -> &'static str {
    match reg {
        START_OSC => "START_OSC",
        DRIVER_OUTPUT_CTRL => "DRIVER_OUTPUT_CTRL",
        LCD_AC_DRIVING_CTRL => "LCD_AC_DRIVING_CTRL",
        ENTRY_MODE => "ENTRY_MODE",
        DISP_CTRL1 => "DISP_CTRL1",
        DISP_CTRL2 => "DISP_CTRL2",
        FRAME_CYCLE_CTRL => "FRAME_CYCLE_CTRL",
        INTERFACE_CTRL => "INTERFACE_CTRL",
        OSC_CTRL => "OSC_CTRL",
        POWER_CTRL1..=POWER_CTRL5 => "POWER_CTRL",
        VCI_RECYCLING => "VCI_RECYCLING",
        RAM_ADDR_SET1 => "RAM_ADDR_SET1",
        RAM_ADDR_SET2 => "RAM_ADDR_SET2",
        GRAM_DATA => "GRAM_DATA",
        SOFTWARE_RESET => "SOFTWARE_RESET",
        GATE_SCAN_CTRL => "GATE_SCAN_CTRL",
        VERTICAL_SCROLL_CTRL1..=VERTICAL_SCROLL_CTRL3 => "VERTICAL_SCROLL_CTRL",
        PARTIAL_DRIVING_POS1 | PARTIAL_DRIVING_POS2 => "PARTIAL_DRIVING_POS",
        HORIZONTAL_WINDOW_ADDR1 => "HORIZONTAL_WINDOW_ADDR1",
        HORIZONTAL_WINDOW_ADDR2 => "HORIZONTAL_WINDOW_ADDR2",
        VERTICAL_WINDOW_ADDR1 => "VERTICAL_WINDOW_ADDR1",
        VERTICAL_WINDOW_ADDR2 => "VERTICAL_WINDOW_ADDR2",
        GAMMA_CTRL1..=GAMMA_CTRL10 => "GAMMA_CTRL",
        _ => "UNMAPPED",
    }
}

/// Entry mode value for an orientation and color order.
///
/// AM selects vertical addressing for the landscape variants. ID0 makes
/// the horizontal address counter count up, ID1 the vertical one.
///
/// | rotation                 | logical (x, y) lands at GRAM |
/// |--------------------------|------------------------------|
/// | portrait                 | (x, y)                       |
/// | landscape                | (175 - y, x)                 |
/// | reverse portrait         | (175 - x, 219 - y)           |
/// | reverse landscape        | (y, 219 - x)                 |
/// | mirror portrait          | (175 - x, y)                 |
/// | mirror landscape         | (y, x)                       |
/// | reverse mirror portrait  | (x, 219 - y)                 |
/// | reverse mirror landscape | (175 - y, 219 - x)           |
pub fn entry_mode(rotation: Rotation, order: ColorOrder) -> u16 {
    let bits = match rotation {
        Rotation::Portrait => ENTRY_ID1 | ENTRY_ID0,
        Rotation::Landscape => ENTRY_AM | ENTRY_ID1,
        Rotation::ReversePortrait => 0,
        Rotation::ReverseLandscape => ENTRY_AM | ENTRY_ID0,
        Rotation::MirrorPortrait => ENTRY_ID1,
        Rotation::MirrorLandscape => ENTRY_AM | ENTRY_ID1 | ENTRY_ID0,
        Rotation::ReverseMirrorPortrait => ENTRY_ID0,
        Rotation::ReverseMirrorLandscape => ENTRY_AM,
    };
    match order {
        ColorOrder::Rgb => bits,
        ColorOrder::Bgr => bits | ENTRY_BGR,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    Write(u8, u16),
    Delay(Duration),
}

const fn ms(n: u64) -> InitStep {
    InitStep::Delay(Duration::from_millis(n))
}

/// Register programming after the hardware reset. Order and delays are
/// mandated by the panel vendor.
pub const INIT_SEQUENCE: &[InitStep] = &[
    InitStep::Write(DISP_CTRL1, 0x0000),
    InitStep::Write(DISP_CTRL2, 0x0808),
    InitStep::Write(FRAME_CYCLE_CTRL, 0x1100),
    InitStep::Write(INTERFACE_CTRL, 0x0000),
    InitStep::Write(OSC_CTRL, 0x0d01),
    ms(10),
    InitStep::Write(VCI_RECYCLING, 0x0020),
    InitStep::Write(RAM_ADDR_SET1, 0x0000),
    InitStep::Write(RAM_ADDR_SET2, 0x0000),
    InitStep::Write(POWER_CTRL1, 0x0a00),
    InitStep::Write(POWER_CTRL2, 0x1038),
    ms(10),
    InitStep::Write(POWER_CTRL3, 0x1121),
    InitStep::Write(POWER_CTRL4, 0x0066),
    InitStep::Write(POWER_CTRL5, 0x5f00),
    InitStep::Write(GATE_SCAN_CTRL, 0x0000),
    InitStep::Write(VERTICAL_SCROLL_CTRL1, 0x00db),
    InitStep::Write(VERTICAL_SCROLL_CTRL2, 0x0000),
    InitStep::Write(VERTICAL_SCROLL_CTRL3, 0x0000),
    InitStep::Write(PARTIAL_DRIVING_POS1, 0x00db),
    InitStep::Write(PARTIAL_DRIVING_POS2, 0x0000),
    InitStep::Write(HORIZONTAL_WINDOW_ADDR1, 0x00af),
    InitStep::Write(HORIZONTAL_WINDOW_ADDR2, 0x0000),
    InitStep::Write(VERTICAL_WINDOW_ADDR1, 0x00db),
    InitStep::Write(VERTICAL_WINDOW_ADDR2, 0x0000),
    InitStep::Write(GAMMA_CTRL1, 0x0000),
    InitStep::Write(GAMMA_CTRL2, 0x0807),
    InitStep::Write(GAMMA_CTRL3, 0x0a02),
    InitStep::Write(GAMMA_CTRL4, 0x020a),
    InitStep::Write(GAMMA_CTRL5, 0x0708),
    InitStep::Write(GAMMA_CTRL6, 0x0205),
    InitStep::Write(GAMMA_CTRL7, 0x0006),
    InitStep::Write(GAMMA_CTRL8, 0x0502),
    InitStep::Write(GAMMA_CTRL9, 0x0404),
    InitStep::Write(GAMMA_CTRL10, 0x040b),
    InitStep::Write(DISP_CTRL1, 0x0012),
    ms(10),
    InitStep::Write(DISP_CTRL1, 0x0017),
];
