// SPDX-License-Identifier: GPL-3.0-or-later

use crate::decoder::ProtocolError;
use crate::{Res, Transport};

/// State of the command/data select line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Command,
    Data,
}

impl Default for Mode {
    // The select line idles high (data) after power-up.
    fn default() -> Self {
        Mode::Data
    }
}

/// One unit of the register protocol: a register address or a 16-bit word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transaction {
    Command(u8),
    Data(u16),
}

impl Transaction {
    pub fn mode(&self) -> Mode {
        match self {
            Transaction::Command(_) => Mode::Command,
            Transaction::Data(_) => Mode::Data,
        }
    }
}

impl std::fmt::Display for Transaction {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Transaction::Command(reg) => write!(f, "C:{reg:02x}"),
            Transaction::Data(word) => write!(f, "D:{word:04x}"),
        }
    }
}

/// Split a data strobe into big-endian 16-bit words.
pub(crate) fn words(data: &[u8]) -> Result<impl Iterator<Item = u16> + '_, ProtocolError> {
    if data.len() % 2 != 0 {
        return Err(ProtocolError::OddPayload(data.len()));
    }
    Ok(data.chunks_exact(2).map(|w| u16::from_be_bytes([w[0], w[1]])))
}

/// Transport that records the transaction stream it is given.
#[derive(Debug, Default)]
pub struct Recorder {
    mode: Mode,
    selected: bool,
    resets: usize,
    frames: usize,
    transactions: Vec<Transaction>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Number of completed reset pulses.
    pub fn resets(&self) -> usize {
        self.resets
    }

    /// Number of chip-select frames seen.
    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn take(&mut self) -> Vec<Transaction> {
        std::mem::take(&mut self.transactions)
    }

    pub fn clear(&mut self) {
        self.transactions.clear();
        self.frames = 0;
    }
}

impl Transport for Recorder {
    fn select_mode(&mut self, mode: Mode) -> Res<()> {
        self.mode = mode;
        Ok(())
    }

    fn select_chip(&mut self, active: bool) -> Res<()> {
        if active && !self.selected {
            self.frames += 1;
        }
        self.selected = active;
        Ok(())
    }

    fn write_bytes(&mut self, data: &[u8]) -> Res<()> {
        if !self.selected {
            return Err(ProtocolError::ChipNotSelected.into());
        }
        match self.mode {
            Mode::Command => self
                .transactions
                .extend(data.iter().map(|&b| Transaction::Command(b))),
            Mode::Data => self.transactions.extend(words(data)?.map(Transaction::Data)),
        }
        Ok(())
    }

    fn set_reset(&mut self, level: bool) -> Res<()> {
        if level {
            self.resets += 1;
        }
        Ok(())
    }
}

/// Duplicates every strobe to two transports, `first` then `second`.
pub struct Tee<A, B> {
    first: A,
    second: B,
}

impl<A: Transport, B: Transport> Tee<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }

    pub fn into_inner(self) -> (A, B) {
        (self.first, self.second)
    }
}

impl<A: Transport, B: Transport> Transport for Tee<A, B> {
    fn select_mode(&mut self, mode: Mode) -> Res<()> {
        self.first.select_mode(mode)?;
        self.second.select_mode(mode)
    }

    fn select_chip(&mut self, active: bool) -> Res<()> {
        self.first.select_chip(active)?;
        self.second.select_chip(active)
    }

    fn write_bytes(&mut self, data: &[u8]) -> Res<()> {
        self.first.write_bytes(data)?;
        self.second.write_bytes(data)
    }

    fn set_reset(&mut self, level: bool) -> Res<()> {
        self.first.set_reset(level)?;
        self.second.set_reset(level)
    }
}
