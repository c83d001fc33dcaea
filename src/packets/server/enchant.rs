use crate::core::buffer::PacketWriter;
use crate::protocol::opcode::Opcode;
use crate::protocol::outbound::ServerPacket;

/// Verdict on the item a client placed in the enchant window.
/// `result` is the item's object id on success and 0 on refusal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExPutEnchantTargetItemResult {
    pub result: i32,
}

impl ServerPacket for ExPutEnchantTargetItemResult {
    fn opcode(&self) -> Opcode {
        Opcode::Extended(0x0081)
    }

    fn write_body(&self, writer: &mut PacketWriter) {
        writer.write_i32(self.result);
    }

    fn size_hint(&self) -> usize {
        4
    }
}
