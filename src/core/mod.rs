//! # Core Packet Components
//!
//! Low-level byte handling shared by every packet.
//!
//! ## Components
//! - **Buffer**: little-endian readers/writers, UTF-16 text
//! - **Codec**: Tokio codec for length-prefixed frames
//! - **Mask**: optional-block payloads selected by a 32-bit flag field
//!
//! ## Wire Format
//! ```text
//! [Length(2)] [Opcode(1) | Marker(1) SubId(2)] [Payload(N)]
//! ```
//!
//! ## Safety
//! - Maximum frame size: 65535 bytes (the length prefix is 16 bits)
//! - Every read is bounds-checked against the current frame

pub mod buffer;
pub mod codec;
pub mod mask;
