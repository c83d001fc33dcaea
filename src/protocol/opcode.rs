//! Opcode ids and the two numeric spaces they live in.
//!
//! The primary space is addressed by the first body byte. One primary value,
//! the extended marker, is reserved: it is followed by a little-endian `u16`
//! sub-id that addresses the extended space.

use crate::core::buffer::{PacketReader, PacketWriter};
use crate::error::Result;
use std::fmt;

/// Which table an opcode id is looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpcodeSpace {
    Primary,
    Extended,
}

impl OpcodeSpace {
    /// Largest id the space can address on the wire.
    pub const fn max_id(self) -> u32 {
        match self {
            OpcodeSpace::Primary => u8::MAX as u32,
            OpcodeSpace::Extended => u16::MAX as u32,
        }
    }
}

impl fmt::Display for OpcodeSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpcodeSpace::Primary => f.write_str("primary"),
            OpcodeSpace::Extended => f.write_str("extended"),
        }
    }
}

/// A concrete opcode: one primary byte, or an extended sub-id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Primary(u8),
    Extended(u16),
}

impl Opcode {
    pub fn space(self) -> OpcodeSpace {
        match self {
            Opcode::Primary(_) => OpcodeSpace::Primary,
            Opcode::Extended(_) => OpcodeSpace::Extended,
        }
    }

    pub fn id(self) -> u16 {
        match self {
            Opcode::Primary(id) => u16::from(id),
            Opcode::Extended(id) => id,
        }
    }

    /// Header length on the wire.
    pub fn header_len(self) -> usize {
        match self {
            Opcode::Primary(_) => 1,
            Opcode::Extended(_) => 3,
        }
    }

    /// Parse the opcode header at the front of a frame body.
    pub fn read(reader: &mut PacketReader<'_>, marker: u8) -> Result<Self> {
        let first = reader.read_u8()?;
        if first == marker {
            Ok(Opcode::Extended(reader.read_u16()?))
        } else {
            Ok(Opcode::Primary(first))
        }
    }

    /// Write the opcode header, using `marker` for extended ids.
    pub fn write(self, writer: &mut PacketWriter, marker: u8) {
        match self {
            Opcode::Primary(id) => writer.write_u8(id),
            Opcode::Extended(id) => {
                writer.write_u8(marker);
                writer.write_u16(id);
            }
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Opcode::Primary(id) => write!(f, "0x{id:02X}"),
            Opcode::Extended(id) => write!(f, "EX 0x{id:04X}"),
        }
    }
}
