//! Inbound request handlers.
//!
//! Every client packet type implements [`ClientRequest`]: the dispatcher
//! creates a fresh value through the registry, lets it read its fields from
//! the rest of the frame, then runs it against the session that sent it.

use crate::core::buffer::PacketReader;
use crate::error::Result;
use crate::packets::world::GameWorld;
use crate::service::session::Session;
use std::fmt;

/// A decoded client packet that knows how to act on itself.
pub trait ClientRequest: Send + fmt::Debug {
    /// Read the packet fields. The opcode header is already consumed.
    fn read(&mut self, reader: &mut PacketReader<'_>) -> Result<()>;

    /// Act on the request. Runs on the task that owns the connection, so the
    /// next frame of the same client waits until this returns.
    fn run(self: Box<Self>, ctx: &mut RequestContext<'_>) -> Result<()>;
}

/// Constructor bound to a registry entry.
pub type RequestFactory = fn() -> Box<dyn ClientRequest>;

/// [`RequestFactory`] for any defaultable request type.
pub fn new_request<T>() -> Box<dyn ClientRequest>
where
    T: ClientRequest + Default + 'static,
{
    Box::<T>::default()
}

/// What a running request can reach.
pub struct RequestContext<'a> {
    pub session: &'a mut Session,
    pub world: &'a dyn GameWorld,
}

impl<'a> RequestContext<'a> {
    pub fn new(session: &'a mut Session, world: &'a dyn GameWorld) -> Self {
        Self { session, world }
    }
}
