//! # Game Packets
//!
//! Concrete client requests, server packets and the opcode tables that bind
//! them together.
//!
//! - `client`: request types the dispatcher instantiates
//! - `server`: packets game code hands to a session's sender
//! - `tables`: the opcode registry of the supported client build
//! - `world`: the [`GameWorld`](world::GameWorld) trait requests call into

use crate::core::buffer::{PacketReader, PacketWriter};
use crate::error::Result;

pub mod client;
pub mod server;
pub mod tables;
pub mod world;

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    pub fn read(reader: &mut PacketReader<'_>) -> Result<Self> {
        Ok(Self {
            x: reader.read_i32()?,
            y: reader.read_i32()?,
            z: reader.read_i32()?,
        })
    }

    pub fn write(&self, writer: &mut PacketWriter) {
        writer.write_i32(self.x);
        writer.write_i32(self.y);
        writer.write_i32(self.z);
    }
}
