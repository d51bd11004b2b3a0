//! Incremental frame parser.
//!
//! A [`ProtocolSession`] is fed one byte at a time and reports a
//! [`ParseEvent`] for every byte. Anything that does not look like a frame is
//! dropped until the next [`HEADER`] byte, so the stream resynchronizes on its
//! own after corruption or a lost byte.

use heapless::Vec;

use crate::checksum::Checksum;
use crate::frame::{Frame, FrameError, LengthField, HEADER, MAX_PAYLOAD};

/// Parser position within the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseState {
    /// Waiting for HEADER; initial state and the state after every frame
    WaitHeader,
    /// Got HEADER, waiting for LENGTH
    ReadLength,
    /// Got LENGTH, waiting for COMMAND
    ReadCommand,
    /// Reading payload bytes
    ReadPayload,
    /// Waiting for CHECKSUM
    ReadChecksum,
}

/// A decoded frame borrowed from the session buffer.
///
/// The payload is only valid until the next byte is fed; use
/// [`FrameRef::to_frame`] to keep it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameRef<'a> {
    pub command: u8,
    pub payload: &'a [u8],
}

impl FrameRef<'_> {
    /// Copy the frame out of the session buffer
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::new(self.command, self.payload)
    }
}

/// Result of feeding one byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseEvent<'a> {
    /// Byte consumed, no frame completed
    NoEvent,
    /// A complete frame with a valid checksum
    FrameReady(FrameRef<'a>),
    /// A well-formed frame whose checksum did not match; payload discarded
    ChecksumError,
}

impl ParseEvent<'_> {
    pub fn is_none(&self) -> bool {
        matches!(self, ParseEvent::NoEvent)
    }
}

/// Outcome of a single step, without the borrow on the payload buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Pending,
    Frame,
    ChecksumMismatch,
}

/// Per-connection parsing state.
///
/// `N` is the payload capacity. It defaults to [`MAX_PAYLOAD`]; smaller
/// transports (a 23 byte BLE MTU, say) can use a smaller session, and LENGTH
/// bytes above `N` are rejected before any payload byte is stored.
#[derive(Debug, Clone)]
pub struct ProtocolSession<const N: usize = MAX_PAYLOAD> {
    state: ParseState,
    length_field: LengthField,
    buffer: Vec<u8, N>,
    pending_length: u8,
    pending_command: u8,
    checksum: Checksum,
    last_command: u8,
    last_length: u8,
    connected: bool,
    checksum_error_count: u32,
    invalid_length_count: u32,
    frames_received: u32,
}

impl<const N: usize> Default for ProtocolSession<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> ProtocolSession<N> {
    const CAPACITY_FITS_LENGTH: () = assert!(
        N <= MAX_PAYLOAD,
        "session capacity must fit the one-byte LENGTH field"
    );

    /// Create a session for a peer using payload-only LENGTH
    pub const fn new() -> Self {
        Self::with_length_field(LengthField::Payload)
    }

    /// Create a session for a peer using the given LENGTH convention
    pub const fn with_length_field(length_field: LengthField) -> Self {
        #[allow(clippy::let_unit_value)]
        let () = Self::CAPACITY_FITS_LENGTH;

        Self {
            state: ParseState::WaitHeader,
            length_field,
            buffer: Vec::new(),
            pending_length: 0,
            pending_command: 0,
            checksum: Checksum::new(),
            last_command: 0,
            last_length: 0,
            connected: false,
            checksum_error_count: 0,
            invalid_length_count: 0,
            frames_received: 0,
        }
    }

    /// Drop any partially received frame.
    ///
    /// Counters and the connected flag are left alone.
    pub fn reset(&mut self) {
        self.state = ParseState::WaitHeader;
        self.buffer.clear();
        self.pending_length = 0;
        self.pending_command = 0;
        self.checksum = Checksum::new();
    }

    /// Feed a single byte to the parser
    pub fn feed(&mut self, byte: u8) -> ParseEvent<'_> {
        let outcome = self.step(byte);
        self.event(outcome)
    }

    /// Feed bytes until the first event.
    ///
    /// Returns how many bytes were consumed and the event that stopped the
    /// scan, or [`ParseEvent::NoEvent`] if every byte was consumed quietly.
    /// Bytes after the event are left for the next call.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> (usize, ParseEvent<'_>) {
        for (index, &byte) in bytes.iter().enumerate() {
            let outcome = self.step(byte);
            if outcome != Outcome::Pending {
                return (index + 1, self.event(outcome));
            }
        }
        (bytes.len(), ParseEvent::NoEvent)
    }

    fn event(&self, outcome: Outcome) -> ParseEvent<'_> {
        match outcome {
            Outcome::Pending => ParseEvent::NoEvent,
            Outcome::Frame => ParseEvent::FrameReady(FrameRef {
                command: self.pending_command,
                payload: &self.buffer,
            }),
            Outcome::ChecksumMismatch => ParseEvent::ChecksumError,
        }
    }

    fn step(&mut self, byte: u8) -> Outcome {
        match self.state {
            ParseState::WaitHeader => {
                // Anything else is line noise until a frame starts
                if byte == HEADER {
                    self.buffer.clear();
                    self.checksum = Checksum::new();
                    self.checksum.push(byte);
                    self.state = ParseState::ReadLength;
                }
                Outcome::Pending
            }
            ParseState::ReadLength => {
                match self.length_field.decode(byte) {
                    Some(len) if len <= N => {
                        self.pending_length = len as u8;
                        self.buffer.clear();
                        self.checksum.push(byte);
                        self.state = ParseState::ReadCommand;
                    }
                    _ => {
                        self.invalid_length_count = self.invalid_length_count.wrapping_add(1);
                        self.state = ParseState::WaitHeader;
                    }
                }
                Outcome::Pending
            }
            ParseState::ReadCommand => {
                self.pending_command = byte;
                self.checksum.push(byte);
                self.state = if self.pending_length == 0 {
                    ParseState::ReadChecksum
                } else {
                    ParseState::ReadPayload
                };
                Outcome::Pending
            }
            ParseState::ReadPayload => {
                if self.buffer.push(byte).is_err() {
                    self.reset();
                    return Outcome::Pending;
                }
                self.checksum.push(byte);
                if self.buffer.len() == self.pending_length as usize {
                    self.state = ParseState::ReadChecksum;
                }
                Outcome::Pending
            }
            ParseState::ReadChecksum => {
                self.state = ParseState::WaitHeader;

                if byte == self.checksum.value() {
                    self.connected = true;
                    self.frames_received = self.frames_received.wrapping_add(1);
                    self.last_command = self.pending_command;
                    self.last_length = self.pending_length;
                    Outcome::Frame
                } else {
                    self.connected = false;
                    self.checksum_error_count = self.checksum_error_count.wrapping_add(1);
                    self.buffer.clear();
                    Outcome::ChecksumMismatch
                }
            }
        }
    }

    pub fn state(&self) -> ParseState {
        self.state
    }

    pub fn length_field(&self) -> LengthField {
        self.length_field
    }

    /// True if the most recent complete frame passed its checksum
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Number of checksum failures seen over the session's lifetime
    pub fn checksum_error_count(&self) -> u32 {
        self.checksum_error_count
    }

    /// Number of LENGTH bytes rejected as out of range
    pub fn invalid_length_count(&self) -> u32 {
        self.invalid_length_count
    }

    /// Number of frames decoded successfully
    pub fn frames_received(&self) -> u32 {
        self.frames_received
    }

    /// Command of the last decoded frame (0 before the first one)
    pub fn last_command(&self) -> u8 {
        self.last_command
    }

    /// Payload length of the last decoded frame
    pub fn last_length(&self) -> u8 {
        self.last_length
    }
}
