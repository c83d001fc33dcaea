//! Outbound packets.

use crate::config::SERVER_EXTENDED_MARKER;
use crate::core::buffer::PacketWriter;
use crate::protocol::opcode::Opcode;
use bytes::Bytes;

/// A server to client packet.
pub trait ServerPacket {
    fn opcode(&self) -> Opcode;

    /// Write everything after the opcode header.
    fn write_body(&self, writer: &mut PacketWriter);

    /// Expected body size, used to presize the buffer.
    fn size_hint(&self) -> usize {
        64
    }
}

/// Serialize a packet into a frame body (opcode header included, length
/// prefix not). Extended opcodes use the server-side marker.
pub fn encode_packet<P>(packet: &P) -> Bytes
where
    P: ServerPacket + ?Sized,
{
    let opcode = packet.opcode();
    let mut writer = PacketWriter::with_capacity(opcode.header_len() + packet.size_hint());
    opcode.write(&mut writer, SERVER_EXTENDED_MARKER);
    packet.write_body(&mut writer);
    writer.freeze()
}
