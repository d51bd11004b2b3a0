//! SIMPL framing protocol
//!
//! A small framing codec for exchanging command + payload messages between a
//! microcontroller and a peer over a lossy byte stream (UART, BLE
//! characteristic). It builds outbound frames and decodes inbound ones one
//! byte at a time, resynchronizing on its own after corruption.
//!
//! # Protocol Overview
//!
//! ```text
//! ┌────────┬────────┬─────────┬─────────────┬──────────┐
//! │ HEADER │ LENGTH │ COMMAND │ PAYLOAD     │ CHECKSUM │
//! │ 0xAF   │ 1B     │ 1B      │ 0–255B      │ 1B       │
//! └────────┴────────┴─────────┴─────────────┴──────────┘
//! ```
//!
//! CHECKSUM is the XOR of every byte before it. LENGTH counts payload bytes
//! by default; see [`LengthField`] for peers that count differently.
//!
//! Decoding state lives in a caller-owned [`ProtocolSession`], one per
//! connection. The builders write into caller buffers or return by value, so
//! independent encodes never share storage.

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod frame;
pub mod messages;
pub mod parser;

pub use checksum::{checksum, Checksum};
pub use frame::{
    pack_fixed, pack_to_vec, pack_variable, pack_with, Frame, FrameError, LengthField,
    FIXED_FRAME_SIZE, FRAME_OVERHEAD, HEADER, MAX_FRAME, MAX_PAYLOAD,
};
pub use messages::{Command, JoystickState};
pub use parser::{FrameRef, ParseEvent, ParseState, ProtocolSession};
