//! Session handshake and teardown packets.

use crate::core::buffer::PacketWriter;
use crate::protocol::opcode::Opcode;
use crate::protocol::outbound::ServerPacket;

/// Answer to the client's protocol version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPacket {
    pub accepted: bool,
    pub key: [u8; 8],
    pub server_id: i32,
    pub obfuscation_key: i32,
}

impl KeyPacket {
    pub fn accept(key: [u8; 8], server_id: i32) -> Self {
        Self {
            accepted: true,
            key,
            server_id,
            obfuscation_key: 0,
        }
    }

    pub fn reject() -> Self {
        Self {
            accepted: false,
            key: [0; 8],
            server_id: 0,
            obfuscation_key: 0,
        }
    }
}

impl ServerPacket for KeyPacket {
    fn opcode(&self) -> Opcode {
        Opcode::Primary(0x2E)
    }

    fn write_body(&self, writer: &mut PacketWriter) {
        writer.write_bool(self.accepted);
        writer.write_bytes(&self.key);
        writer.write_i32(1); // cipher enabled
        writer.write_i32(self.server_id);
        writer.write_u8(1);
        writer.write_i32(self.obfuscation_key);
        writer.write_u8(0);
    }

    fn size_hint(&self) -> usize {
        23
    }
}

/// Tells the client to drop back to the login screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LeaveWorld;

impl ServerPacket for LeaveWorld {
    fn opcode(&self) -> Opcode {
        Opcode::Primary(0x84)
    }

    fn write_body(&self, _writer: &mut PacketWriter) {}

    fn size_hint(&self) -> usize {
        0
    }
}
