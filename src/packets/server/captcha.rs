use crate::core::buffer::PacketWriter;
use crate::protocol::opcode::Opcode;
use crate::protocol::outbound::ServerPacket;
use bytes::Bytes;

/// Carries a captcha picture rendered elsewhere. The image bytes are framed
/// as they are; this layer never looks inside them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExCaptchaImage {
    pub captcha_id: i64,
    pub remaining_attempts: u8,
    pub image: Bytes,
}

impl ServerPacket for ExCaptchaImage {
    fn opcode(&self) -> Opcode {
        Opcode::Extended(0x01E3)
    }

    fn write_body(&self, writer: &mut PacketWriter) {
        writer.write_i64(self.captcha_id);
        writer.write_u8(self.remaining_attempts);
        writer.write_u32(self.image.len() as u32);
        writer.write_bytes(&self.image);
    }

    fn size_hint(&self) -> usize {
        13 + self.image.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::outbound::encode_packet;

    #[test]
    fn image_is_copied_verbatim() {
        let image = Bytes::from_static(b"DDS \x7c\x00\x00\x00");
        let body = encode_packet(&ExCaptchaImage {
            captcha_id: 9,
            remaining_attempts: 3,
            image: image.clone(),
        });
        assert_eq!(&body[..3], &[0xFE, 0xE3, 0x01]);
        assert_eq!(&body[12..16], &(image.len() as u32).to_le_bytes());
        assert_eq!(&body[16..], &image[..]);
    }
}
