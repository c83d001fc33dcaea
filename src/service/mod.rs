//! # Service Layer
//!
//! Per-connection runtime: the [`Session`](session::Session) value game code
//! sees, and the task that reads, dispatches and writes for it.

pub mod connection;
pub mod session;

pub use connection::{serve_connection, CloseReason, ServiceContext};
pub use session::{PacketSender, Session};
