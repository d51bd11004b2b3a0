//! Link driver
//!
//! Owns one [`ProtocolSession`] per connection, pumps received bytes through
//! it and hands decoded frames to the dispatcher. Outbound frames are built
//! in a call-local buffer and written to the transport in one piece.

use simpl_protocol::{
    pack_with, Frame, FrameError, ParseEvent, ProtocolSession, FIXED_FRAME_SIZE, MAX_FRAME,
    MAX_PAYLOAD,
};

use crate::config::{ConfigError, LinkConfig};
use crate::dispatch::Dispatch;
use crate::transport::{ByteSource, Transport};

/// Maximum bytes consumed by a single [`Link::poll`]
const RX_BUDGET: usize = 64;

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// Transport read or write failed
    Transport(E),
    /// Outbound frame could not be built
    Frame(FrameError),
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(e: FrameError) -> Self {
        LinkError::Frame(e)
    }
}

/// What a single [`Link::poll`] did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollStats {
    /// Bytes fed to the session
    pub bytes: usize,
    /// Frames delivered to the dispatcher
    pub frames: usize,
    /// Frames dropped on checksum mismatch
    pub checksum_errors: usize,
}

/// A transport, a dispatcher and the session between them
pub struct Link<T, D, const N: usize = MAX_PAYLOAD> {
    transport: T,
    dispatch: D,
    session: ProtocolSession<N>,
    config: LinkConfig,
}

type Error<T> = LinkError<<T as ByteSource>::Error>;

impl<T, D, const N: usize> Link<T, D, N>
where
    T: Transport,
    D: Dispatch,
{
    /// Create a link.
    ///
    /// Fails if the config is invalid or allows frames larger than the
    /// session can receive.
    pub fn new(transport: T, dispatch: D, config: LinkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        if config.max_payload() > N {
            return Err(ConfigError::SessionTooSmall);
        }
        debug!(
            "Link up: mtu {}, max payload {}",
            config.mtu,
            config.max_payload()
        );

        Ok(Self {
            transport,
            dispatch,
            session: ProtocolSession::with_length_field(config.length_field),
            config,
        })
    }

    /// Feed pending bytes from the transport into the session.
    ///
    /// Stops when the transport has nothing more or after a fixed byte
    /// budget, so a chatty peer cannot starve the caller.
    pub fn poll(&mut self) -> Result<PollStats, Error<T>> {
        let mut stats = PollStats::default();

        while stats.bytes < RX_BUDGET {
            let Some(byte) = self.transport.read_byte().map_err(LinkError::Transport)? else {
                break;
            };
            stats.bytes += 1;

            let was_connected = self.session.is_connected();
            let mut checksum_failed = false;

            match self.session.feed(byte) {
                ParseEvent::FrameReady(frame) => {
                    trace!(
                        "RX frame: cmd {}, {} bytes",
                        frame.command,
                        frame.payload.len()
                    );
                    stats.frames += 1;
                    self.dispatch.on_frame(frame.command, frame.payload);
                }
                ParseEvent::ChecksumError => checksum_failed = true,
                ParseEvent::NoEvent => {}
            }

            if checksum_failed {
                let count = self.session.checksum_error_count();
                warn!("Checksum mismatch ({} total)", count);
                stats.checksum_errors += 1;
                self.dispatch.on_checksum_error(count);
            }

            match (was_connected, self.session.is_connected()) {
                (false, true) => info!("Peer connected"),
                (true, false) => warn!("Peer link degraded"),
                _ => {}
            }
        }

        Ok(stats)
    }

    /// Encode and send a variable-size frame
    ///
    /// Returns the number of bytes handed to the transport
    pub fn send(&mut self, command: u8, payload: &[u8]) -> Result<usize, Error<T>> {
        if payload.len() > self.config.max_payload() {
            warn!(
                "TX payload of {} bytes exceeds link limit {}",
                payload.len(),
                self.config.max_payload()
            );
            return Err(LinkError::Frame(FrameError::SizeExceeded));
        }

        let mut buf = [0u8; MAX_FRAME];
        let len = pack_with(self.config.length_field, command, payload, &mut buf)?;
        self.transport
            .send_frame(&buf[..len])
            .map_err(LinkError::Transport)?;

        trace!("TX frame: cmd {}, {} bytes", command, len);
        Ok(len)
    }

    /// Send a prepared [`Frame`]
    pub fn send_frame(&mut self, frame: &Frame) -> Result<usize, Error<T>> {
        self.send(frame.command, &frame.payload)
    }

    /// Send a constant-size frame carrying one data byte.
    ///
    /// LENGTH follows the peer's convention, so an inclusive peer receives
    /// exactly [`simpl_protocol::pack_fixed`] and a payload-only peer a
    /// one-byte payload frame.
    pub fn send_fixed(&mut self, command: u8, data: u8) -> Result<(), Error<T>> {
        let mut frame = [0u8; FIXED_FRAME_SIZE];
        pack_with(self.config.length_field, command, &[data], &mut frame)?;
        self.transport
            .send_frame(&frame)
            .map_err(LinkError::Transport)?;

        trace!("TX fixed: cmd {}, data {}", command, data);
        Ok(())
    }

    /// Flush the transport
    pub fn flush(&mut self) -> Result<(), Error<T>> {
        self.transport.flush().map_err(LinkError::Transport)
    }

    /// Drop any partially received frame
    pub fn resync(&mut self) {
        debug!("Link resync");
        self.session.reset();
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn session(&self) -> &ProtocolSession<N> {
        &self.session
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatch
    }

    pub fn dispatcher_mut(&mut self) -> &mut D {
        &mut self.dispatch
    }

    /// Tear the link down, returning the transport and dispatcher
    pub fn into_parts(self) -> (T, D) {
        (self.transport, self.dispatch)
    }
}
