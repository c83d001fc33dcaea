use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use game_protocol::config::CLIENT_EXTENDED_MARKER;
use game_protocol::packets::tables::game_registry;
use game_protocol::packets::world::NullWorld;
use game_protocol::protocol::dispatcher::Dispatcher;
use game_protocol::protocol::request::RequestContext;
use game_protocol::protocol::state::ConnectionState;
use game_protocol::service::{PacketSender, Session};
use std::sync::Arc;

#[allow(clippy::unwrap_used)]
fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    let dispatcher = Dispatcher::new(Arc::new(game_registry().unwrap()), Default::default());
    let (sender, _rx) = PacketSender::channel(1024, 4096);
    let mut session = Session::new(1, "127.0.0.1:7777".parse().unwrap(), sender);
    session.set_state(ConnectionState::InGame);

    let frames: [(&str, Vec<u8>); 4] = [
        (
            "attack",
            vec![0x01, 1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0, 4, 0, 0, 0, 0],
        ),
        ("extended", vec![CLIENT_EXTENDED_MARKER, 0x4F, 0x01, 0x01]),
        ("unrecognized", vec![CLIENT_EXTENDED_MARKER, 0xEE, 0xFF]),
        ("illegal_state", vec![0x0E, 0x0F, 0x01, 0x00, 0x00]),
    ];

    group.throughput(Throughput::Elements(1));
    for (name, frame) in &frames {
        group.bench_function(*name, |b| {
            b.iter(|| {
                let mut ctx = RequestContext::new(&mut session, &NullWorld);
                dispatcher.dispatch(frame, &mut ctx).unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
