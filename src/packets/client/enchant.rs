use crate::core::buffer::PacketReader;
use crate::error::Result;
use crate::protocol::request::{ClientRequest, RequestContext};

/// Item dropped into the enchant window.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestExTryToPutEnchantTargetItem {
    pub object_id: i32,
}

impl ClientRequest for RequestExTryToPutEnchantTargetItem {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.object_id = reader.read_i32()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.put_enchant_target_item(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestExCancelEnchantItem;

impl ClientRequest for RequestExCancelEnchantItem {
    fn read(&mut self, _reader: &mut PacketReader<'_>) -> Result<()> {
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.cancel_enchant(ctx.session)
    }
}
