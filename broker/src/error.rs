// Copyright (c) 2021 Xu Shaohua <shaohua@biofan.org>. All rights reserved.
// Use of this source is governed by Apache-2.0 License that can be found
// in the LICENSE file.

use std::fmt::{self, Display};
use std::io;

/// Kinds of failure a session (or, for `Startup`, the broker process
/// itself) can hit. `OutboxFull` deliberately has no variant here: per the
/// error taxonomy it drops a single enqueue and the session continues, so
/// it is a `log::warn!` call site, never an `Err`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Peer closed the socket cleanly between packets.
    ConnectionClosed,
    /// A socket read or write syscall failed.
    Io,
    /// VBI overflow, unknown packet type, unknown property id, truncated
    /// field, or any other codec-level decode failure.
    MalformedPacket,
    /// Non-CONNECT as the first packet, or a SUBSCRIBE with zero topics.
    ProtocolError,
    /// Bind, listen, or accept failed at broker startup.
    StartupFailure,
}

#[derive(Clone, Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
}

impl Error {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    #[must_use]
    pub const fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    #[must_use]
    pub fn connection_closed() -> Self {
        Self::new(ErrorKind::ConnectionClosed, "peer closed the connection")
    }

    #[must_use]
    pub fn protocol_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ProtocolError, message)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for Error {}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::connection_closed()
        } else {
            Self::new(ErrorKind::Io, err.to_string())
        }
    }
}

impl From<codec::DecodeError> for Error {
    fn from(err: codec::DecodeError) -> Self {
        Self::new(ErrorKind::MalformedPacket, err.to_string())
    }
}

impl From<codec::EncodeError> for Error {
    fn from(err: codec::EncodeError) -> Self {
        Self::new(ErrorKind::MalformedPacket, err.to_string())
    }
}
