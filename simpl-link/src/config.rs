//! Link configuration
//!
//! Describes the transport the link runs over and the peer on the other end.
//! Hosts can keep it in their own config files via the `serde` feature.

use simpl_protocol::{LengthField, FIXED_FRAME_SIZE, FRAME_OVERHEAD, MAX_FRAME};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Shortest transmit interval peers are expected to handle (ms)
pub const MIN_TX_INTERVAL_MS: u16 = 10;

/// Longest transmit interval before peers consider the link idle (ms)
pub const MAX_TX_INTERVAL_MS: u16 = 250;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// MTU cannot carry even a constant-size frame
    MtuTooSmall,
    /// Transmit interval outside 10-250 ms
    IntervalOutOfRange,
    /// Receiving session cannot hold the largest payload the MTU allows
    SessionTooSmall,
}

/// Link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Largest frame the transport carries in one unit
    pub mtu: u16,
    /// How the peer interprets the LENGTH byte
    pub length_field: LengthField,
    /// Interval between periodic reports from the application (ms)
    pub tx_interval_ms: u16,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            mtu: MAX_FRAME as u16,
            length_field: LengthField::Payload,
            tx_interval_ms: 100,
        }
    }
}

impl LinkConfig {
    /// Configuration for a BLE characteristic with the given ATT MTU.
    ///
    /// Three bytes of every ATT packet are protocol overhead.
    pub fn ble(att_mtu: u16) -> Self {
        Self {
            mtu: att_mtu.saturating_sub(3),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if (self.mtu as usize) < FIXED_FRAME_SIZE {
            return Err(ConfigError::MtuTooSmall);
        }
        if !(MIN_TX_INTERVAL_MS..=MAX_TX_INTERVAL_MS).contains(&self.tx_interval_ms) {
            return Err(ConfigError::IntervalOutOfRange);
        }
        Ok(())
    }

    /// Largest payload one outbound frame may carry
    pub fn max_payload(&self) -> usize {
        (self.mtu as usize)
            .saturating_sub(FRAME_OVERHEAD)
            .min(self.length_field.max_payload())
    }
}
