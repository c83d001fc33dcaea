use crate::core::buffer::PacketReader;
use crate::error::{ProtocolError, Result};
use crate::packets::Location;
use crate::protocol::request::{ClientRequest, RequestContext};

/// Sent once the client finished loading the world.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnterWorld;

impl ClientRequest for EnterWorld {
    fn read(&mut self, _reader: &mut PacketReader<'_>) -> Result<()> {
        // Trailing route trace bytes are not used.
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.enter_world(ctx.session)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestKeyMapping;

impl ClientRequest for RequestKeyMapping {
    fn read(&mut self, _reader: &mut PacketReader<'_>) -> Result<()> {
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.key_mapping(ctx.session)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Attack {
    pub object_id: i32,
    pub origin: Location,
    pub shift_click: bool,
}

impl ClientRequest for Attack {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.object_id = reader.read_i32()?;
        self.origin = Location::read(reader)?;
        self.shift_click = reader.read_bool()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.attack(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MoveBackwardToLocation {
    pub target: Location,
    pub origin: Location,
    /// Older clients omit it; missing means keyboard movement.
    pub by_mouse: bool,
}

impl ClientRequest for MoveBackwardToLocation {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.target = Location::read(reader)?;
        self.origin = Location::read(reader)?;
        self.by_mouse = reader.remaining() >= 4 && reader.read_i32()? == 1;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.move_to_location(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestItemList;

impl ClientRequest for RequestItemList {
    fn read(&mut self, _reader: &mut PacketReader<'_>) -> Result<()> {
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.item_list(ctx.session)
    }
}

/// Chat channel of a [`Say2`] message.
pub const CHAT_WHISPER: i32 = 2;

const MAX_CHAT_LENGTH: usize = 105;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Say2 {
    pub text: String,
    pub channel: i32,
    /// Recipient name, whispers only.
    pub target: Option<String>,
}

impl ClientRequest for Say2 {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.text = reader.read_string()?;
        self.channel = reader.read_i32()?;
        if self.channel == CHAT_WHISPER {
            self.target = Some(reader.read_string()?);
        }
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        if self.text.chars().count() > MAX_CHAT_LENGTH {
            return Err(ProtocolError::Rejected(format!(
                "chat message of {} characters",
                self.text.chars().count()
            )));
        }
        ctx.world.say(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestManorList;

impl ClientRequest for RequestManorList {
    fn read(&mut self, _reader: &mut PacketReader<'_>) -> Result<()> {
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.manor_list(ctx.session)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExElementalSpiritInfo {
    pub spirit_type: u8,
}

impl ClientRequest for ExElementalSpiritInfo {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.spirit_type = reader.read_u8()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.elemental_spirit_info(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExRequestTeleport {
    pub teleport_id: i32,
}

impl ClientRequest for ExRequestTeleport {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.teleport_id = reader.read_i32()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.teleport(ctx.session, &self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::PacketWriter;

    fn read<T: ClientRequest + Default>(writer: &PacketWriter) -> Result<T> {
        let mut request = T::default();
        request.read(&mut PacketReader::new(writer.as_slice()))?;
        Ok(request)
    }

    #[test]
    fn whisper_carries_a_target() {
        let mut writer = PacketWriter::new();
        writer.write_string("hi");
        writer.write_i32(CHAT_WHISPER);
        writer.write_string("Bob");
        let say: Say2 = read(&writer).unwrap();
        assert_eq!(say.target.as_deref(), Some("Bob"));

        let mut writer = PacketWriter::new();
        writer.write_string("hi all");
        writer.write_i32(0);
        let say: Say2 = read(&writer).unwrap();
        assert_eq!(say.target, None);
    }

    #[test]
    fn move_accepts_missing_mode() {
        let mut writer = PacketWriter::new();
        Location::new(1, 2, 3).write(&mut writer);
        Location::new(4, 5, 6).write(&mut writer);
        let movement: MoveBackwardToLocation = read(&writer).unwrap();
        assert!(!movement.by_mouse);

        writer.write_i32(1);
        let movement: MoveBackwardToLocation = read(&writer).unwrap();
        assert!(movement.by_mouse);
        assert_eq!(movement.target, Location::new(1, 2, 3));
    }

    #[test]
    fn attack_needs_all_fields() {
        let mut writer = PacketWriter::new();
        writer.write_i32(0x1000_0042);
        Location::new(0, 0, 0).write(&mut writer);
        assert!(read::<Attack>(&writer).is_err());
        writer.write_bool(true);
        assert!(read::<Attack>(&writer).unwrap().shift_click);
    }
}
