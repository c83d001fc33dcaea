use crate::core::buffer::PacketReader;
use crate::error::Result;
use crate::protocol::request::{ClientRequest, RequestContext};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestCaptchaAnswer {
    pub captcha_id: i64,
    pub answer: i32,
}

impl ClientRequest for RequestCaptchaAnswer {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.captcha_id = reader.read_i64()?;
        self.answer = reader.read_i32()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.captcha_answer(ctx.session, &self)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RequestRefreshCaptchaImage {
    pub captcha_id: i64,
}

impl ClientRequest for RequestRefreshCaptchaImage {
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()> {
        self.captcha_id = reader.read_i64()?;
        Ok(())
    }

    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()> {
        ctx.world.refresh_captcha(ctx.session, &self)
    }
}
