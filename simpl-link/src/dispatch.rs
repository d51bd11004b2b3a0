//! Hand-off point for decoded frames
//!
//! The link does not interpret commands. Whatever implements [`Dispatch`]
//! decides what a `(command, payload)` pair means.

/// Receiver of link events
pub trait Dispatch {
    /// A frame passed its checksum.
    ///
    /// `payload` borrows the session buffer and is only valid for this call.
    fn on_frame(&mut self, command: u8, payload: &[u8]);

    /// A frame failed its checksum. `error_count` is the session total.
    fn on_checksum_error(&mut self, error_count: u32) {
        let _ = error_count;
    }
}

impl<F> Dispatch for F
where
    F: FnMut(u8, &[u8]),
{
    fn on_frame(&mut self, command: u8, payload: &[u8]) {
        self(command, payload)
    }
}
