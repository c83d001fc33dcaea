//! Integration tests for masked-block encoding

#![allow(clippy::expect_used, clippy::unwrap_used)]

use game_protocol::core::buffer::{utf16_len, PacketReader, PacketWriter};
use game_protocol::core::mask::{MaskBlock, MaskedEncoder, MaskedLayout, MaskedReader};
use game_protocol::packets::server::user_info::{DecodedUserInfo, Position};
use game_protocol::packets::server::{UserInfo, UserInfoBlock, UserInfoData};
use game_protocol::protocol::outbound::encode_packet;

/// Two-block packet: A is a fixed 8-byte value, B carries a name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    A,
    B,
}

impl MaskBlock for Block {
    const ORDER: &'static [Self] = &[Block::A, Block::B];

    fn bit(self) -> u8 {
        match self {
            Block::A => 0,
            Block::B => 1,
        }
    }
}

struct Pair {
    value: i64,
    name: String,
}

const B_BASE: usize = 4;

impl MaskedLayout for Pair {
    type Block = Block;

    fn declared_len(&self, block: Block) -> usize {
        match block {
            Block::A => 2 + 8,
            Block::B => B_BASE + utf16_len(&self.name),
        }
    }

    fn write_block(&self, block: Block, writer: &mut PacketWriter) {
        match block {
            Block::A => writer.write_i64(self.value),
            Block::B => writer.write_string(&self.name),
        }
    }
}

fn pair() -> Pair {
    Pair {
        value: 0x0102_0304_0506_0708,
        name: "Tom".into(),
    }
}

#[test]
fn only_selected_block_is_emitted() {
    let layout = pair();
    let mut encoder = MaskedEncoder::new(0);
    encoder.add(&layout, Block::B);

    let mut writer = PacketWriter::new();
    writer.write_u8(0x99); // header
    encoder.write(&layout, &mut writer);

    let expected: Vec<u8> = vec![
        0x99, // header
        0x40, 0x00, 0x00, 0x00, // mask: bit 1 only
        0x0A, 0x00, // declared length: base + 6
        b'T', 0x00, b'o', 0x00, b'm', 0x00, // three characters
        0x00, 0x00, // terminator
    ];
    assert_eq!(writer.as_slice(), &expected[..]);
    assert_eq!(encoder.size(), B_BASE + 6);
}

#[test]
fn empty_mask_writes_only_the_mask() {
    let layout = pair();
    let encoder = MaskedEncoder::<Block>::new(5);
    let mut writer = PacketWriter::new();
    encoder.write(&layout, &mut writer);
    assert_eq!(writer.as_slice(), &[0, 0, 0, 0]);
    assert_eq!(encoder.size(), 5);
}

#[test]
fn full_mask_writes_blocks_in_bit_order() {
    let layout = pair();
    let mut encoder = MaskedEncoder::new(0);
    // Selection order does not matter
    encoder.add(&layout, Block::B);
    encoder.add(&layout, Block::A);
    let mut writer = PacketWriter::new();
    encoder.write(&layout, &mut writer);

    let bytes = writer.as_slice();
    assert_eq!(&bytes[..4], &[0xC0, 0, 0, 0]);
    assert_eq!(&bytes[4..6], &10u16.to_le_bytes());
    assert_eq!(&bytes[6..14], &layout.value.to_le_bytes());
    assert_eq!(&bytes[14..16], &10u16.to_le_bytes());
    assert_eq!(bytes.len(), 4 + 10 + 10);

    let mut blocks = MaskedReader::new(PacketReader::new(bytes)).unwrap();
    let mut a = blocks.next().unwrap().unwrap();
    assert_eq!(a.reader.read_i64().unwrap(), layout.value);
    let mut b = blocks.next().unwrap().unwrap();
    assert_eq!(b.reader.read_string().unwrap(), "Tom");
    assert!(blocks.next().is_none());
}

#[test]
fn encoding_is_deterministic() {
    let data = UserInfoData {
        position: Position {
            x: 1,
            y: 2,
            z: 3,
            vehicle_id: 0,
        },
        ..Default::default()
    };
    let first = encode_packet(&UserInfo::full(42, data.clone()));
    let second = encode_packet(&UserInfo::full(42, data));
    assert_eq!(first, second);
}

fn decode(packet: &UserInfo) -> DecodedUserInfo {
    let body = encode_packet(packet);
    assert_eq!(body[0], 0x32);
    UserInfo::decode(PacketReader::new(&body[1..])).unwrap()
}

#[test]
fn user_info_without_blocks() {
    let packet = UserInfo::new(7, UserInfoData::default());
    let body = encode_packet(&packet);
    // opcode, object id, size, block type count, mask
    assert_eq!(body.len(), 1 + 4 + 4 + 2 + 4);
    assert_eq!(&body[5..9], &5i32.to_le_bytes());
    assert_eq!(&body[11..15], &[0, 0, 0, 0]);
    assert!(decode(&packet).mask.is_empty());
}

#[test]
fn user_info_full_round_trip() {
    let mut data = UserInfoData::default();
    data.basic.name = "Zephyrine".into();
    data.basic.level = 85;
    data.max.hp = 12_000;
    data.progress.exp = 9_876_543_210;
    data.progress.exp_percent = 0.25;
    data.combat.has_weapon = true;
    data.combat.m_critical = 4;
    data.speeds.run = 126;
    data.move_multiplier = 1.5;
    data.collision_height = 23.5;
    data.clan.title = "Warden".into();
    data.social.hero = true;
    data.social.pvp_kills = 300;
    data.name_color = 0x00FF_FFFF;
    data.inventory_limit = 125;
    data.rank = 2;
    data.elemental_defense[3] = 40;
    data.vitality.vitality_points = 35_000;
    data.slots.agathion = 1;
    data.spirits.defense = [5, 6, 7, 8];
    data.stat_points.usable = 3;
    data.elixirs_used = 2;
    data.vanguard_mount = 1;

    let packet = UserInfo::full(0x1000_0005, data.clone());
    let decoded = decode(&packet);

    assert_eq!(decoded.object_id, 0x1000_0005);
    assert_eq!(decoded.size as usize, packet.size());
    assert_eq!(decoded.block_types, 29);
    for block in UserInfoBlock::ORDER {
        assert!(decoded.contains(*block), "{block:?}");
    }
    assert_eq!(decoded.data, data);
}

#[test]
fn user_info_partial_update_skips_absent_blocks() {
    let mut data = UserInfoData::default();
    data.basic.name = "Ilya".into();
    data.max.hp = 500;
    data.position.z = -2_000;
    data.rank = 1;

    let packet = UserInfo::new(3, data.clone()).with_blocks(&[
        UserInfoBlock::Position,
        UserInfoBlock::Ranking,
    ]);
    let decoded = decode(&packet);

    assert_eq!(decoded.data.position, data.position);
    assert_eq!(decoded.data.rank, 1);
    assert_eq!(decoded.data.max.hp, 0);
    assert!(decoded.data.basic.name.is_empty());
    assert_eq!(packet.size(), 5 + 18 + 6);
}
