//! XOR checksum used to seal every frame.
//!
//! The checksum byte is the XOR of every byte that precedes it in the frame:
//! header, length, command and payload. The accumulator starts at zero.

/// XOR-reduce a byte range.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0, |acc, &byte| acc ^ byte)
}

/// Running XOR accumulator.
///
/// The parser folds bytes in as they arrive so the received checksum can be
/// validated without re-reading the frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Checksum(u8);

impl Checksum {
    pub const fn new() -> Self {
        Self(0)
    }

    /// Fold a single byte into the accumulator
    pub fn push(&mut self, byte: u8) {
        self.0 ^= byte;
    }

    /// Fold a byte range into the accumulator
    pub fn update(&mut self, bytes: &[u8]) {
        self.0 ^= checksum(bytes);
    }

    pub const fn value(&self) -> u8 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_range_is_zero() {
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn test_fixed_frame_checksum() {
        let bytes = [0xAF, 0x03, 0x01, 0x2A];
        assert_eq!(checksum(&bytes), 0xAF ^ 0x03 ^ 0x01 ^ 0x2A);
    }

    #[test]
    fn test_running_matches_oneshot() {
        let bytes = [0xAF, 0x03, 0x01, 0x10, 0x20, 0x30];

        let mut running = Checksum::new();
        running.push(bytes[0]);
        running.push(bytes[1]);
        running.update(&bytes[2..]);

        assert_eq!(running.value(), checksum(&bytes));
    }

    #[test]
    fn test_self_cancelling() {
        // A sealed frame, checksum byte included, folds to zero
        let frame = [0xAF, 0x01, 0x05, 0x7E];
        let sealed = checksum(&frame);
        let mut all = Checksum::new();
        all.update(&frame);
        all.push(sealed);
        assert_eq!(all.value(), 0);
    }
}
