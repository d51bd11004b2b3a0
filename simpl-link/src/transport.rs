//! Byte transport abstractions
//!
//! The link reads inbound bytes one at a time and writes whole frames. Serial
//! and BLE drivers implement these traits directly, or go through
//! [`IoTransport`] if they already speak `embedded-io`.

use embedded_io::{Read, ReadReady, Write};

/// Inbound byte stream
pub trait ByteSource {
    /// Error type for receive operations
    type Error;

    /// Take the next received byte.
    ///
    /// Never blocks: returns `Ok(None)` when nothing is pending.
    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error>;
}

/// Outbound frame sink
pub trait FrameSink {
    /// Error type for transmit operations
    type Error;

    /// Queue a complete frame for transmission
    fn send_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error>;

    /// Flush any buffered data
    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Combined transport
///
/// For links where one peripheral provides both directions with a single
/// error type.
pub trait Transport: ByteSource + FrameSink<Error = <Self as ByteSource>::Error> {}

// Blanket implementation
impl<T> Transport for T where T: ByteSource + FrameSink<Error = <T as ByteSource>::Error> {}

/// Adapter for any `embedded-io` reader/writer (UART drivers, USB CDC, ...)
#[derive(Debug)]
pub struct IoTransport<T> {
    io: T,
}

impl<T> IoTransport<T> {
    pub fn new(io: T) -> Self {
        Self { io }
    }

    pub fn inner(&self) -> &T {
        &self.io
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.io
    }

    pub fn into_inner(self) -> T {
        self.io
    }
}

impl<T: Read + ReadReady> ByteSource for IoTransport<T> {
    type Error = T::Error;

    fn read_byte(&mut self) -> Result<Option<u8>, Self::Error> {
        if !self.io.read_ready()? {
            return Ok(None);
        }

        let mut buf = [0u8; 1];
        match self.io.read(&mut buf)? {
            0 => Ok(None),
            _ => Ok(Some(buf[0])),
        }
    }
}

impl<T: Write> FrameSink for IoTransport<T> {
    type Error = T::Error;

    fn send_frame(&mut self, frame: &[u8]) -> Result<(), Self::Error> {
        self.io.write_all(frame)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.io.flush()
    }
}
