//! End-to-end tests over real TCP connections

#![allow(clippy::expect_used, clippy::unwrap_used)]

use bytes::{BufMut, Bytes, BytesMut};
use futures::{SinkExt, StreamExt};
use game_protocol::config::{NetworkConfig, CLIENT_EXTENDED_MARKER};
use game_protocol::core::codec::FrameCodec;
use game_protocol::error::Result;
use game_protocol::packets::client::{AuthLogin, ProtocolVersion};
use game_protocol::packets::server::{KeyPacket, LeaveWorld};
use game_protocol::packets::tables::game_registry;
use game_protocol::packets::world::GameWorld;
use game_protocol::protocol::dispatcher::Dispatcher;
use game_protocol::protocol::state::ConnectionState;
use game_protocol::service::{ServiceContext, Session};
use game_protocol::transport::tcp::serve;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;

const PROTOCOL: i32 = 447;

struct LoginWorld;

impl GameWorld for LoginWorld {
    fn protocol_version(&self, session: &mut Session, request: &ProtocolVersion) -> Result<()> {
        if request.version == PROTOCOL {
            session.send(&KeyPacket::accept([7; 8], 1))
        } else {
            session.close_with(&KeyPacket::reject())
        }
    }

    fn auth_login(&self, session: &mut Session, _request: &AuthLogin) -> Result<()> {
        session.set_state(ConnectionState::Authenticated);
        Ok(())
    }

    fn logout(&self, session: &mut Session) -> Result<()> {
        session.close_with(&LeaveWorld)
    }
}

struct Server {
    addr: SocketAddr,
    shutdown: mpsc::Sender<()>,
    handle: JoinHandle<Result<()>>,
}

async fn start(configure: impl FnOnce(&mut NetworkConfig)) -> Server {
    let config = NetworkConfig::default_with_overrides(|config| {
        config.server.shutdown_timeout = Duration::from_secs(2);
        configure(config);
    });
    let dispatcher = Dispatcher::new(
        Arc::new(game_registry().unwrap()),
        config.diagnostics.clone(),
    );
    let ctx = ServiceContext::new(config, dispatcher, Arc::new(LoginWorld));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown, shutdown_rx) = mpsc::channel(1);
    let handle = tokio::spawn(serve(listener, ctx, shutdown_rx));
    Server {
        addr,
        shutdown,
        handle,
    }
}

async fn connect(addr: SocketAddr) -> Framed<TcpStream, FrameCodec> {
    Framed::new(TcpStream::connect(addr).await.unwrap(), FrameCodec::default())
}

fn protocol_version(version: i32) -> Bytes {
    let mut body = BytesMut::new();
    body.put_u8(0x0E);
    body.put_i32_le(version);
    body.freeze()
}

async fn next_frame(client: &mut Framed<TcpStream, FrameCodec>) -> Option<BytesMut> {
    tokio::time::timeout(Duration::from_secs(5), client.next())
        .await
        .expect("server did not answer in time")
        .map(|frame| frame.unwrap())
}

#[tokio::test]
async fn protocol_version_gets_key_packet() {
    let server = start(|_| {}).await;
    let mut client = connect(server.addr).await;

    client.send(protocol_version(PROTOCOL)).await.unwrap();
    let frame = next_frame(&mut client).await.unwrap();
    assert_eq!(frame[0], 0x2E);
    assert_eq!(frame[1], 1);
    assert_eq!(&frame[2..10], &[7; 8]);

    server.shutdown.send(()).await.unwrap();
    server.handle.await.unwrap().unwrap();
}

#[tokio::test]
async fn unknown_frames_keep_the_connection_open() {
    let server = start(|_| {}).await;
    let mut client = connect(server.addr).await;

    client
        .send(Bytes::from_static(&[CLIENT_EXTENDED_MARKER, 0xEE, 0xFF]))
        .await
        .unwrap();
    // In-game request while still connected: dropped
    client.send(Bytes::from_static(&[0x14])).await.unwrap();
    client.send(protocol_version(PROTOCOL)).await.unwrap();

    let frame = next_frame(&mut client).await.unwrap();
    assert_eq!(frame[0], 0x2E);
}

#[tokio::test]
async fn rejected_version_closes_after_reply() {
    let server = start(|_| {}).await;
    let mut client = connect(server.addr).await;

    client.send(protocol_version(1)).await.unwrap();
    let frame = next_frame(&mut client).await.unwrap();
    assert_eq!(&frame[..2], &[0x2E, 0]);
    assert!(next_frame(&mut client).await.is_none());
}

#[tokio::test]
async fn logout_flushes_leave_world_then_closes() {
    let server = start(|_| {}).await;
    let mut client = connect(server.addr).await;

    let mut login = BytesMut::new();
    login.put_u8(0x2B);
    for unit in "tester".encode_utf16().chain(std::iter::once(0)) {
        login.put_u16_le(unit);
    }
    for key in [1, 2, 3, 4] {
        login.put_i32_le(key);
    }
    client.send(login.freeze()).await.unwrap();
    client.send(Bytes::from_static(&[0x00])).await.unwrap();

    let frame = next_frame(&mut client).await.unwrap();
    assert_eq!(&frame[..], &[0x84]);
    assert!(next_frame(&mut client).await.is_none());
}

#[tokio::test]
async fn violation_limit_disconnects() {
    let server = start(|config| config.server.violation_limit = 3).await;
    let mut client = connect(server.addr).await;

    for _ in 0..3 {
        client.send(Bytes::from_static(&[0xFA])).await.unwrap();
    }
    assert!(next_frame(&mut client).await.is_none());
}

#[tokio::test]
async fn bad_frame_length_disconnects() {
    let server = start(|_| {}).await;
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(&[0x01, 0x00]).await.unwrap();

    let mut client = Framed::new(stream, FrameCodec::default());
    assert!(next_frame(&mut client).await.is_none());
}

#[tokio::test]
async fn idle_clients_are_dropped() {
    let server = start(|config| config.server.idle_timeout = Duration::from_millis(200)).await;
    let mut client = connect(server.addr).await;
    assert!(next_frame(&mut client).await.is_none());
}

#[tokio::test]
async fn shutdown_closes_open_connections() {
    let server = start(|_| {}).await;
    let mut client = connect(server.addr).await;
    client.send(protocol_version(PROTOCOL)).await.unwrap();
    next_frame(&mut client).await.unwrap();

    server.shutdown.send(()).await.unwrap();
    assert!(next_frame(&mut client).await.is_none());
    tokio::time::timeout(Duration::from_secs(5), server.handle)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
}
