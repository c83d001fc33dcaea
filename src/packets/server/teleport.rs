use crate::core::buffer::PacketWriter;
use crate::packets::Location;
use crate::protocol::opcode::Opcode;
use crate::protocol::outbound::ServerPacket;

/// Moves a creature to its new location after a teleport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExTeleportToLocationActivate {
    pub object_id: i32,
    pub location: Location,
    pub heading: i32,
}

impl ServerPacket for ExTeleportToLocationActivate {
    fn opcode(&self) -> Opcode {
        Opcode::Extended(0x0142)
    }

    fn write_body(&self, writer: &mut PacketWriter) {
        writer.write_i32(self.object_id);
        self.location.write(writer);
        writer.write_i32(0);
        writer.write_i32(self.heading);
        writer.write_i32(0);
    }

    fn size_hint(&self) -> usize {
        28
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::outbound::encode_packet;

    #[test]
    fn writes_extended_header_and_coordinates() {
        let packet = ExTeleportToLocationActivate {
            object_id: 0x1000_0001,
            location: Location::new(-100, 200, -3000),
            heading: 512,
        };
        let body = encode_packet(&packet);
        assert_eq!(&body[..3], &[0xFE, 0x42, 0x01]);
        assert_eq!(body.len(), 3 + 28);
        assert_eq!(&body[7..11], &(-100i32).to_le_bytes());
        assert_eq!(&body[23..27], &512i32.to_le_bytes());
    }
}
