//! # Error Types
//!
//! Error handling for the game packet engine.
//!
//! This module defines every error variant that can surface while framing,
//! routing, decoding or encoding packets, from low-level I/O failures to
//! registry construction mistakes.
//!
//! ## Error Categories
//! - **I/O Errors**: socket failures
//! - **Frame Errors**: bad length prefixes, oversized frames (fatal for the connection)
//! - **Decode Errors**: truncated fields, malformed text or mask blocks (fatal for one frame only)
//! - **Registry Errors**: opcode tables that violate the id bounds or uniqueness
//! - **Session Errors**: closed connections, idle timeouts, full outbound queues
//!
//! ## Example Usage
//! ```rust
//! use game_protocol::core::buffer::PacketReader;
//! use game_protocol::error::{ProtocolError, Result};
//!
//! fn read_object_id(frame: &[u8]) -> Result<i32> {
//!     PacketReader::new(frame).read_i32()
//! }
//!
//! match read_object_id(&[0x01, 0x02]) {
//!     Err(ProtocolError::Truncated { needed, remaining }) => {
//!         assert_eq!((needed, remaining), (4, 2));
//!     }
//!     other => panic!("unexpected: {other:?}"),
//! }
//! ```

use crate::protocol::opcode::OpcodeSpace;
use std::io;
use thiserror::Error;

/// Error message constants shared by log lines and error payloads.
pub mod constants {
    /// Frame errors
    pub const ERR_INVALID_FRAME_LENGTH: &str = "Invalid frame length";
    pub const ERR_OVERSIZED_PACKET: &str = "Packet exceeds maximum frame size";

    /// Connection errors
    pub const ERR_CONNECTION_CLOSED: &str = "Connection closed";
    pub const ERR_CONNECTION_TIMEOUT: &str = "Connection timed out (no activity)";
    pub const ERR_QUEUE_FULL: &str = "Outbound queue full";
    pub const ERR_TIMEOUT: &str = "Operation timed out";

    /// Text decoding
    pub const ERR_UNTERMINATED_STRING: &str = "String is missing its terminator";
    pub const ERR_INVALID_UTF16: &str = "String is not valid UTF-16";
}

// ProtocolError is the primary error type for all packet engine operations
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Truncated read: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    #[error("Malformed string: {0}")]
    MalformedString(&'static str),

    #[error("Malformed mask block {bit}: {reason}")]
    MalformedBlock { bit: u8, reason: String },

    #[error("Invalid frame length: {0}")]
    InvalidFrameLength(usize),

    #[error("Packet too large: {0} bytes")]
    OversizedPacket(usize),

    #[error("Opcode {id:#x} out of range for the {space} space")]
    OpcodeOutOfRange { space: OpcodeSpace, id: u32 },

    #[error("Opcode {id:#x} registered twice in the {space} space")]
    DuplicateOpcode { space: OpcodeSpace, id: u16 },

    #[error("Opcode {0:#04x} is reserved for the extended space marker")]
    ReservedOpcode(u8),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timed out (no activity)")]
    ConnectionTimeout,

    #[error("Outbound queue full")]
    OutboundQueueFull,

    #[error("Timeout occurred")]
    Timeout,

    #[error("Request rejected: {0}")]
    Rejected(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Custom error: {0}")]
    Custom(String),
}

impl ProtocolError {
    /// Whether the error leaves the connection unusable.
    ///
    /// Decode failures only poison the frame they came from; everything that
    /// touches the byte stream or the outbound queue ends the connection.
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            ProtocolError::Io(_)
                | ProtocolError::InvalidFrameLength(_)
                | ProtocolError::ConnectionClosed
                | ProtocolError::ConnectionTimeout
                | ProtocolError::OutboundQueueFull
        )
    }
}

/// Type alias for Results using ProtocolError
pub type Result<T> = std::result::Result<T, ProtocolError>;
