//! Frame constants and builders for the SIMPL protocol.
//!
//! Frame format:
//! - HEADER (1 byte): 0xAF start-of-frame sentinel
//! - LENGTH (1 byte): payload length (0-255), see [`LengthField`]
//! - COMMAND (1 byte): application opcode, 0 is reserved
//! - PAYLOAD (LENGTH bytes): opaque data
//! - CHECKSUM (1 byte): XOR of HEADER, LENGTH, COMMAND and all PAYLOAD bytes

use heapless::Vec;

use crate::checksum::checksum;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Start-of-frame sentinel
pub const HEADER: u8 = 0xAF;

/// Largest frame the transport can carry in one unit (GATT attribute limit)
pub const MAX_FRAME: usize = 260;

/// Maximum payload size in bytes.
///
/// Bounded by the transport unit and by the one-byte length field.
pub const MAX_PAYLOAD: usize = if MAX_FRAME - 3 > u8::MAX as usize {
    u8::MAX as usize
} else {
    MAX_FRAME - 3
};

/// HEADER + LENGTH + COMMAND + CHECKSUM
pub const FRAME_OVERHEAD: usize = 4;

/// Length field value written by [`pack_fixed`]
pub const FIXED_LENGTH: u8 = 3;

/// Size of a frame built by [`pack_fixed`]
pub const FIXED_FRAME_SIZE: usize = 5;

/// How the LENGTH byte is interpreted.
///
/// Deployed peers disagree on this, so a session and the builders are told
/// which convention the other end speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LengthField {
    /// LENGTH counts payload bytes only
    #[default]
    Payload,
    /// LENGTH counts COMMAND + PAYLOAD + CHECKSUM (payload + 2), as written by
    /// the constant-size frame and older firmware
    Inclusive,
}

impl LengthField {
    /// Bytes counted by LENGTH that are not payload
    const fn extra(self) -> usize {
        match self {
            LengthField::Payload => 0,
            LengthField::Inclusive => 2,
        }
    }

    /// Largest payload this convention can describe
    pub const fn max_payload(self) -> usize {
        MAX_PAYLOAD - self.extra()
    }

    /// LENGTH byte for a payload of `payload_len` bytes
    pub fn encode(self, payload_len: usize) -> Result<u8, FrameError> {
        if payload_len > self.max_payload() {
            return Err(FrameError::SizeExceeded);
        }
        Ok((payload_len + self.extra()) as u8)
    }

    /// Payload length described by a received LENGTH byte, if it is coherent
    pub fn decode(self, field: u8) -> Option<usize> {
        (field as usize).checked_sub(self.extra())
    }
}

/// Errors that can occur while building frames or decoding payloads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload exceeds [`MAX_PAYLOAD`]
    SizeExceeded,
    /// Output buffer cannot hold the encoded frame
    CapacityViolation,
    /// Payload is too short or malformed for the requested message
    InvalidPayload,
}

/// Build a constant-size frame carrying one data byte.
///
/// The LENGTH byte is always [`FIXED_LENGTH`], i.e. the frame is written in the
/// [`LengthField::Inclusive`] convention that existing peers expect for it.
pub fn pack_fixed(command: u8, data: u8) -> [u8; FIXED_FRAME_SIZE] {
    let mut frame = [HEADER, FIXED_LENGTH, command, data, 0];
    frame[FIXED_FRAME_SIZE - 1] = checksum(&frame[..FIXED_FRAME_SIZE - 1]);
    frame
}

/// Encode `command` and `payload` into `out`.
///
/// Returns the number of bytes written (`payload.len() + 4`). Nothing is
/// written when the payload is too large or `out` is too small.
pub fn pack_variable(command: u8, payload: &[u8], out: &mut [u8]) -> Result<usize, FrameError> {
    pack_with(LengthField::Payload, command, payload, out)
}

/// [`pack_variable`] for a peer using the given LENGTH convention
pub fn pack_with(
    length_field: LengthField,
    command: u8,
    payload: &[u8],
    out: &mut [u8],
) -> Result<usize, FrameError> {
    let length = length_field.encode(payload.len())?;

    let frame_len = payload.len() + FRAME_OVERHEAD;
    let out = out
        .get_mut(..frame_len)
        .ok_or(FrameError::CapacityViolation)?;

    let (body, crc) = out.split_at_mut(frame_len - 1);
    body[0] = HEADER;
    body[1] = length;
    body[2] = command;
    body[3..].copy_from_slice(payload);
    crc[0] = checksum(body);

    Ok(frame_len)
}

/// Encode `command` and `payload` into a fresh fixed-capacity buffer
pub fn pack_to_vec(command: u8, payload: &[u8]) -> Result<Vec<u8, MAX_FRAME>, FrameError> {
    let mut buffer = [0u8; MAX_FRAME];
    let len = pack_variable(command, payload, &mut buffer)?;
    Vec::from_slice(&buffer[..len]).map_err(|_| FrameError::CapacityViolation)
}

/// An owned command and payload, copied out of the parser or built for sending
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Application opcode
    pub command: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD>,
}

impl Frame {
    /// Create a new frame with the given command and payload
    pub fn new(command: u8, payload: &[u8]) -> Result<Self, FrameError> {
        let payload = Vec::from_slice(payload).map_err(|_| FrameError::SizeExceeded)?;
        Ok(Self { command, payload })
    }

    /// Create a frame with no payload
    pub fn empty(command: u8) -> Self {
        Self {
            command,
            payload: Vec::new(),
        }
    }

    /// Total encoded size of this frame
    pub fn encoded_len(&self) -> usize {
        self.payload.len() + FRAME_OVERHEAD
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        pack_variable(self.command, &self.payload, buffer)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME>, FrameError> {
        pack_to_vec(self.command, &self.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_payload_fits_length_byte() {
        assert_eq!(MAX_PAYLOAD, 255);
        assert!(MAX_PAYLOAD + FRAME_OVERHEAD <= MAX_FRAME);
    }

    #[test]
    fn test_pack_fixed() {
        let frame = pack_fixed(1, 0x2A);
        assert_eq!(frame, [0xAF, 0x03, 0x01, 0x2A, 0xAF ^ 0x03 ^ 0x01 ^ 0x2A]);
    }

    #[test]
    fn test_pack_fixed_is_per_call() {
        let a = pack_fixed(1, 0x01);
        let b = pack_fixed(2, 0x02);
        // Each call owns its output; a later call never clobbers an earlier one.
        assert_eq!(a[2], 1);
        assert_eq!(b[2], 2);
    }

    #[test]
    fn test_pack_variable() {
        let mut buf = [0u8; 16];
        let len = pack_variable(1, &[0x10, 0x20, 0x30], &mut buf).unwrap();

        assert_eq!(len, 7);
        assert_eq!(&buf[..6], &[0xAF, 0x03, 0x01, 0x10, 0x20, 0x30]);
        assert_eq!(buf[6], 0xAF ^ 0x03 ^ 0x01 ^ 0x10 ^ 0x20 ^ 0x30);
    }

    #[test]
    fn test_pack_variable_empty_payload() {
        let mut buf = [0u8; 4];
        let len = pack_variable(0x20, &[], &mut buf).unwrap();

        assert_eq!(len, 4);
        assert_eq!(buf, [HEADER, 0, 0x20, HEADER ^ 0x20]);
    }

    #[test]
    fn test_pack_variable_max_payload() {
        let payload = [0x55u8; MAX_PAYLOAD];
        let mut buf = [0u8; MAX_FRAME];
        let len = pack_variable(7, &payload, &mut buf).unwrap();

        assert_eq!(len, MAX_PAYLOAD + FRAME_OVERHEAD);
        assert_eq!(buf[1], MAX_PAYLOAD as u8);
    }

    #[test]
    fn test_pack_variable_size_exceeded() {
        let payload = [0u8; MAX_PAYLOAD + 1];
        let mut buf = [0xEEu8; MAX_FRAME + 8];
        let result = pack_variable(7, &payload, &mut buf);

        assert_eq!(result, Err(FrameError::SizeExceeded));
        assert!(buf.iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_pack_variable_capacity_violation() {
        let mut buf = [0xEEu8; 6];
        let result = pack_variable(1, &[0x10, 0x20, 0x30], &mut buf);

        assert_eq!(result, Err(FrameError::CapacityViolation));
        assert!(buf.iter().all(|&b| b == 0xEE));
    }

    #[test]
    fn test_pack_variable_exact_capacity() {
        let mut buf = [0u8; 7];
        assert_eq!(pack_variable(1, &[0x10, 0x20, 0x30], &mut buf), Ok(7));
    }

    #[test]
    fn test_pack_fixed_equals_inclusive_pack() {
        let mut buf = [0u8; FIXED_FRAME_SIZE];
        let len = pack_with(LengthField::Inclusive, 1, &[0x2A], &mut buf).unwrap();

        assert_eq!(len, FIXED_FRAME_SIZE);
        assert_eq!(buf, pack_fixed(1, 0x2A));
    }

    #[test]
    fn test_inclusive_limits() {
        assert_eq!(LengthField::Inclusive.max_payload(), 253);
        assert_eq!(LengthField::Inclusive.encode(253), Ok(255));
        assert_eq!(
            LengthField::Inclusive.encode(254),
            Err(FrameError::SizeExceeded)
        );
        assert_eq!(LengthField::Inclusive.decode(1), None);
        assert_eq!(LengthField::Inclusive.decode(3), Some(1));
        assert_eq!(LengthField::Payload.decode(0), Some(0));
    }

    #[test]
    fn test_frame_encode_matches_builder() {
        let frame = Frame::new(0x21, &[1, 2, 3, 4, 5]).unwrap();
        let encoded = frame.encode_to_vec().unwrap();
        let direct = pack_to_vec(0x21, &[1, 2, 3, 4, 5]).unwrap();

        assert_eq!(encoded, direct);
        assert_eq!(encoded.len(), frame.encoded_len());
    }

    #[test]
    fn test_frame_payload_too_large() {
        let large_payload = [0u8; MAX_PAYLOAD + 1];
        assert_eq!(Frame::new(1, &large_payload), Err(FrameError::SizeExceeded));
    }

    #[test]
    fn test_frame_empty() {
        let frame = Frame::empty(0x24);
        assert!(frame.payload.is_empty());
        assert_eq!(frame.encoded_len(), FRAME_OVERHEAD);
    }
}
