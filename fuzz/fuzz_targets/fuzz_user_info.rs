#![no_main]

use game_protocol::core::buffer::PacketReader;
use game_protocol::packets::server::UserInfo;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Declared block lengths must never read past the payload
    let _ = UserInfo::decode(PacketReader::new(data));
});
