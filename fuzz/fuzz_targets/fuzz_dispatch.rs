#![no_main]

use game_protocol::packets::tables::game_registry;
use game_protocol::packets::world::NullWorld;
use game_protocol::protocol::dispatcher::Dispatcher;
use game_protocol::protocol::request::RequestContext;
use game_protocol::protocol::state::ConnectionState;
use game_protocol::service::{PacketSender, Session};
use libfuzzer_sys::fuzz_target;
use std::sync::Arc;

fuzz_target!(|data: &[u8]| {
    // First byte picks the session phase, the rest is the frame body
    let Some((phase, frame)) = data.split_first() else {
        return;
    };
    let Ok(registry) = game_registry() else {
        return;
    };
    let dispatcher = Dispatcher::new(Arc::new(registry), Default::default());
    let (sender, _rx) = PacketSender::channel(64, 65535);
    let Ok(peer) = "127.0.0.1:7777".parse() else {
        return;
    };
    let mut session = Session::new(1, peer, sender);
    session.set_state(ConnectionState::ALL[*phase as usize % ConnectionState::ALL.len()]);

    let mut ctx = RequestContext::new(&mut session, &NullWorld);
    assert!(dispatcher.dispatch(frame, &mut ctx).is_ok());
});
