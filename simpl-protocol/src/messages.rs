//! Command identifiers and typed payloads
//!
//! The codec itself treats commands as opaque bytes. This module names the
//! ones the firmware defines and encodes the payloads that go with them.

use crate::frame::{Frame, FrameError};

/// Reserved "no command" value
pub const CMD_NONE: u8 = 0x00;
/// Joystick state report, see [`JoystickState`]
pub const CMD_JOYSTICK_STATE: u8 = 0x01;

/// Known commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Reserved, never a real request
    None,
    /// Joystick state report
    JoystickState,
    /// Application-defined command this crate does not know about
    Other(u8),
}

impl Command {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            CMD_NONE => Command::None,
            CMD_JOYSTICK_STATE => Command::JoystickState,
            other => Command::Other(other),
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Command::None => CMD_NONE,
            Command::JoystickState => CMD_JOYSTICK_STATE,
            Command::Other(byte) => byte,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Command::None)
    }
}

/// Joystick report payload size
pub const JOYSTICK_STATE_LEN: usize = 28;

/// Full joystick/gamepad state.
///
/// Wire layout, little-endian:
/// ```text
/// [0..8]   buttons bitmap
/// [8..10]  x        [10..12] y        [12..14] z
/// [14..16] rz       [16..18] rx       [18..20] ry
/// [20..22] slider1  [22..24] slider2
/// [24] hat4  [25] hat3  [26] hat2  [27] hat1
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickState {
    pub buttons: u64,
    pub x: u16,
    pub y: u16,
    pub z: u16,
    pub rx: u16,
    pub ry: u16,
    pub rz: u16,
    pub slider1: u16,
    pub slider2: u16,
    pub hat1: u8,
    pub hat2: u8,
    pub hat3: u8,
    pub hat4: u8,
}

impl JoystickState {
    /// Encode into the fixed 28-byte payload
    pub fn to_payload(&self) -> [u8; JOYSTICK_STATE_LEN] {
        let mut out = [0u8; JOYSTICK_STATE_LEN];
        out[0..8].copy_from_slice(&self.buttons.to_le_bytes());

        let axes = [
            self.x,
            self.y,
            self.z,
            self.rz,
            self.rx,
            self.ry,
            self.slider1,
            self.slider2,
        ];
        for (chunk, axis) in out[8..24].chunks_exact_mut(2).zip(axes) {
            chunk.copy_from_slice(&axis.to_le_bytes());
        }

        out[24] = self.hat4;
        out[25] = self.hat3;
        out[26] = self.hat2;
        out[27] = self.hat1;
        out
    }

    /// Decode from a payload. Trailing bytes are ignored.
    pub fn from_payload(payload: &[u8]) -> Result<Self, FrameError> {
        let payload = payload
            .get(..JOYSTICK_STATE_LEN)
            .ok_or(FrameError::InvalidPayload)?;

        let mut buttons = [0u8; 8];
        buttons.copy_from_slice(&payload[0..8]);
        let axis = |offset: usize| u16::from_le_bytes([payload[offset], payload[offset + 1]]);

        Ok(Self {
            buttons: u64::from_le_bytes(buttons),
            x: axis(8),
            y: axis(10),
            z: axis(12),
            rz: axis(14),
            rx: axis(16),
            ry: axis(18),
            slider1: axis(20),
            slider2: axis(22),
            hat4: payload[24],
            hat3: payload[25],
            hat2: payload[26],
            hat1: payload[27],
        })
    }

    /// Wrap this state in a [`CMD_JOYSTICK_STATE`] frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::new(CMD_JOYSTICK_STATE, &self.to_payload())
    }

    /// Parse a joystick state out of a received frame
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        if frame.command != CMD_JOYSTICK_STATE {
            return Err(FrameError::InvalidPayload);
        }
        Self::from_payload(&frame.payload)
    }
}
