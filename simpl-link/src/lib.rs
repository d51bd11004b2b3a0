//! SIMPL link layer
//!
//! Glue between a [`simpl_protocol::ProtocolSession`] and the two things it
//! talks to: a byte transport (UART, BLE characteristic) and the application's
//! command dispatcher.
//!
//! ```text
//! ┌────────────┐  bytes   ┌──────────────────┐  (cmd, payload)  ┌────────────┐
//! │ ByteSource │ ───────► │ Link / Session   │ ───────────────► │ Dispatch   │
//! └────────────┘          └──────────────────┘                  └────────────┘
//! ┌────────────┐  frames           │
//! │ FrameSink  │ ◄─────────────────┘
//! └────────────┘
//! ```
//!
//! One [`Link`] per connection; nothing is shared between links.

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod config;
pub mod dispatch;
pub mod link;
pub mod transport;

pub use config::{ConfigError, LinkConfig};
pub use dispatch::Dispatch;
pub use link::{Link, LinkError, PollStats};
pub use transport::{ByteSource, FrameSink, IoTransport, Transport};
