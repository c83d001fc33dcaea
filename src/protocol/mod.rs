//! # Protocol Layer
//!
//! Everything between a frame body and a request handler.
//!
//! ## Components
//! - **Opcode**: primary and extended ids and their header encoding
//! - **State**: session phases and the sets opcodes are legal in
//! - **Registry**: immutable opcode tables built once at startup
//! - **Request**: the trait every client request implements
//! - **Dispatcher**: resolve, gate, decode and run one frame
//! - **Outbound**: the trait every server packet implements

pub mod dispatcher;
pub mod opcode;
pub mod outbound;
pub mod registry;
pub mod request;
pub mod state;
