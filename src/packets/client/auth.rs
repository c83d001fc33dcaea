//! Requests sent before the character enters the world: version check,
//! account login, and the character lobby.

use crate::core::buffer::PacketReader;
use crate::error::Result;
use crate::protocol::request::{ClientRequest, RequestContext};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProtocolVersion {
    pub version: i32,
}

impl ClientRequest for ProtocolVersion {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.version = reader.read_i32()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.protocol_version(ctx.session, &self)
    }
}

/// Session keys handed out by the login server.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct AuthLogin {
    pub account: String,
    pub play_key2: i32,
    pub play_key1: i32,
    pub login_key1: i32,
    pub login_key2: i32,
}

impl ClientRequest for AuthLogin {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.account = reader.read_string()?.to_lowercase();
        self.play_key2 = reader.read_i32()?;
        self.play_key1 = reader.read_i32()?;
        self.login_key1 = reader.read_i32()?;
        self.login_key2 = reader.read_i32()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.auth_login(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Logout;

impl ClientRequest for Logout {
    fn read(&mut self, _reader: &mut PacketReader<'_>) -> Result<()> {
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.logout(ctx.session)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CharacterCreate {
    pub name: String,
    pub race: i32,
    pub female: bool,
    pub class_id: i32,
    pub hair_style: i32,
    pub hair_color: i32,
    pub face: i32,
}

impl ClientRequest for CharacterCreate {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.name = reader.read_string()?;
        self.race = reader.read_i32()?;
        self.female = reader.read_i32()? != 0;
        self.class_id = reader.read_i32()?;
        // Six base stats follow; the template decides them.
        reader.skip(24)?;
        self.hair_style = reader.read_i32()?;
        self.hair_color = reader.read_i32()?;
        self.face = reader.read_i32()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.character_create(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CharacterDelete {
    pub slot: i32,
}

impl ClientRequest for CharacterDelete {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.slot = reader.read_i32()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.character_delete(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CharacterSelect {
    pub slot: i32,
}

impl ClientRequest for CharacterSelect {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.slot = reader.read_i32()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.character_select(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NewCharacter;

impl ClientRequest for NewCharacter {
    fn read(&mut self, _reader: &mut PacketReader<'_>) -> Result<()> {
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.new_character(ctx.session)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestGotoLobby;

impl ClientRequest for RequestGotoLobby {
    fn read(&mut self, _reader: &mut PacketReader<'_>) -> Result<()> {
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.goto_lobby(ctx.session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::buffer::PacketWriter;

    #[test]
    fn auth_login_lowercases_account() {
        let mut writer = PacketWriter::new();
        writer.write_string("Admin");
        for key in [1, 2, 3, 4] {
            writer.write_i32(key);
        }
        let mut request = AuthLogin::default();
        request
            .read(&mut PacketReader::new(writer.as_slice()))
            .unwrap();
        assert_eq!(request.account, "admin");
        assert_eq!(
            (request.play_key2, request.play_key1, request.login_key1, request.login_key2),
            (1, 2, 3, 4)
        );
    }

    #[test]
    fn character_create_skips_base_stats() {
        let mut writer = PacketWriter::new();
        writer.write_string("Nova");
        for value in [3, 1, 44] {
            writer.write_i32(value);
        }
        writer.write_bytes(&[0xFF; 24]);
        for value in [2, 1, 0] {
            writer.write_i32(value);
        }
        let mut request = CharacterCreate::default();
        request
            .read(&mut PacketReader::new(writer.as_slice()))
            .unwrap();
        assert_eq!(request.name, "Nova");
        assert!(request.female);
        assert_eq!(request.class_id, 44);
        assert_eq!((request.hair_style, request.hair_color, request.face), (2, 1, 0));
    }

    #[test]
    fn short_protocol_version_is_truncated() {
        let mut request = ProtocolVersion::default();
        assert!(request.read(&mut PacketReader::new(&[0x01, 0x02])).is_err());
    }
}
