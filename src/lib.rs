//! # game-protocol
//!
//! Client-facing packet engine of a persistent multiplayer game server.
//!
//! Bytes come in as length-prefixed frames, are routed through a two-space
//! opcode registry gated by the session phase, decoded into typed requests
//! and run against a [`GameWorld`](packets::world::GameWorld). Outbound
//! packets are serialized per send, including masked packets whose layout is
//! chosen block by block at encode time.
//!
//! ## Modules
//! - `core`: byte readers/writers, frame codec, masked blocks
//! - `protocol`: opcodes, session phases, registry, dispatcher
//! - `packets`: concrete requests, server packets, opcode tables
//! - `service`: session value and per-connection loop
//! - `transport`: TCP listener
//! - `config`, `error`, `utils`: configuration, errors, logging and metrics
//!
//! ## Example
//! ```no_run
//! use game_protocol::config::NetworkConfig;
//! use game_protocol::packets::{tables, world::NullWorld};
//! use game_protocol::protocol::dispatcher::Dispatcher;
//! use game_protocol::service::ServiceContext;
//! use std::sync::Arc;
//!
//! # async fn run() -> game_protocol::error::Result<()> {
//! let config = NetworkConfig::from_file("gameserver.toml")?;
//! config.validate_strict()?;
//! game_protocol::utils::logging::init_logging(&config.logging)?;
//!
//! let registry = Arc::new(tables::game_registry()?);
//! let dispatcher = Dispatcher::new(registry, config.diagnostics.clone());
//! let ctx = ServiceContext::new(config, dispatcher, Arc::new(NullWorld));
//! game_protocol::transport::tcp::start_server(ctx).await
//! # }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod packets;
pub mod protocol;
pub mod service;
pub mod transport;
pub mod utils;

pub use error::{ProtocolError, Result};
