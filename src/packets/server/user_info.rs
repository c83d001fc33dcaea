//! # UserInfo
//!
//! The player's own character sheet, sent as a masked packet so that a small
//! change (a new position, a hit point tick) only carries the blocks that
//! changed.
//!
//! ## Wire Format
//! ```text
//! [Opcode 0x32] [ObjectId(4)] [Size(4)] [BlockTypes(2)] [Mask(4)] {Block}*
//! ```
//!
//! `Size` is announced before the blocks, so it is accumulated while blocks
//! are selected: a base of 5 plus the declared length of every selected
//! block. `BlockTypes` advertises how many block kinds the client build knows
//! about, not how many are present.

use crate::core::buffer::{utf16_len, PacketReader, PacketWriter};
use crate::core::mask::{BlockMask, MaskBlock, MaskedEncoder, MaskedLayout, MaskedReader};
use crate::error::Result;
use crate::protocol::opcode::Opcode;
use crate::protocol::outbound::ServerPacket;

const BASE_SIZE: usize = 5;
const BLOCK_TYPE_COUNT: u16 = UserInfoBlock::ORDER.len() as u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserInfoBlock {
    Relation,
    BasicInfo,
    BaseStats,
    MaxHpCpMp,
    CurrentHpMpCpExpSp,
    EnchantLevel,
    Appearance,
    Status,
    Stats,
    Elementals,
    Position,
    Speed,
    Multiplier,
    ColRadiusHeight,
    AtkElemental,
    Clan,
    Social,
    VitaFame,
    Slots,
    Movements,
    Color,
    InventoryLimit,
    TrueHero,
    AttSpirits,
    Ranking,
    StatPoints,
    StatAbilities,
    ElixirUsed,
    VanguardMount,
}

impl UserInfoBlock {
    /// Declared length without any text contribution.
    pub const fn fixed_len(self) -> usize {
        match self {
            UserInfoBlock::Relation => 6,
            UserInfoBlock::BasicInfo => 23,
            UserInfoBlock::BaseStats => 18,
            UserInfoBlock::MaxHpCpMp => 14,
            UserInfoBlock::CurrentHpMpCpExpSp => 38,
            UserInfoBlock::EnchantLevel => 5,
            UserInfoBlock::Appearance => 19,
            UserInfoBlock::Status => 6,
            UserInfoBlock::Stats => 64,
            UserInfoBlock::Elementals => 14,
            UserInfoBlock::Position => 18,
            UserInfoBlock::Speed => 18,
            UserInfoBlock::Multiplier => 18,
            UserInfoBlock::ColRadiusHeight => 18,
            UserInfoBlock::AtkElemental => 5,
            UserInfoBlock::Clan => 32,
            UserInfoBlock::Social => 30,
            UserInfoBlock::VitaFame => 19,
            UserInfoBlock::Slots => 12,
            UserInfoBlock::Movements => 4,
            UserInfoBlock::Color => 10,
            UserInfoBlock::InventoryLimit => 13,
            UserInfoBlock::TrueHero => 9,
            UserInfoBlock::AttSpirits => 34,
            UserInfoBlock::Ranking => 6,
            UserInfoBlock::StatPoints => 16,
            UserInfoBlock::StatAbilities => 18,
            UserInfoBlock::ElixirUsed => 6,
            UserInfoBlock::VanguardMount => 3,
        }
    }

    pub fn from_bit(bit: u8) -> Option<Self> {
        Self::ORDER.iter().copied().find(|block| block.bit() == bit)
    }
}

impl MaskBlock for UserInfoBlock {
    const ORDER: &'static [Self] = &[
        UserInfoBlock::Relation,
        UserInfoBlock::BasicInfo,
        UserInfoBlock::BaseStats,
        UserInfoBlock::MaxHpCpMp,
        UserInfoBlock::CurrentHpMpCpExpSp,
        UserInfoBlock::EnchantLevel,
        UserInfoBlock::Appearance,
        UserInfoBlock::Status,
        UserInfoBlock::Stats,
        UserInfoBlock::Elementals,
        UserInfoBlock::Position,
        UserInfoBlock::Speed,
        UserInfoBlock::Multiplier,
        UserInfoBlock::ColRadiusHeight,
        UserInfoBlock::AtkElemental,
        UserInfoBlock::Clan,
        UserInfoBlock::Social,
        UserInfoBlock::VitaFame,
        UserInfoBlock::Slots,
        UserInfoBlock::Movements,
        UserInfoBlock::Color,
        UserInfoBlock::InventoryLimit,
        UserInfoBlock::TrueHero,
        UserInfoBlock::AttSpirits,
        UserInfoBlock::Ranking,
        UserInfoBlock::StatPoints,
        UserInfoBlock::StatAbilities,
        UserInfoBlock::ElixirUsed,
        UserInfoBlock::VanguardMount,
    ];

    fn bit(self) -> u8 {
        self as u8
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicInfo {
    pub name: String,
    pub is_gm: bool,
    pub race: u8,
    pub female: bool,
    pub root_class_id: i32,
    pub class_id: i32,
    pub level: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseStats {
    pub str: u16,
    pub dex: u16,
    pub con: u16,
    pub int: u16,
    pub wit: u16,
    pub men: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Vitals {
    pub hp: i32,
    pub mp: i32,
    pub cp: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Progress {
    pub current: Vitals,
    pub sp: i64,
    pub exp: i64,
    /// Fraction of the current level already earned, 0.0 to 1.0.
    pub exp_percent: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Appearance {
    pub hair_style: i32,
    pub hair_color: i32,
    pub face: i32,
    pub hair_accessory: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status {
    pub mount_type: u8,
    pub private_store: u8,
    pub can_craft: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CombatStats {
    pub has_weapon: bool,
    pub p_atk: i32,
    pub p_atk_spd: i32,
    pub p_def: i32,
    pub evasion: i32,
    pub accuracy: i32,
    pub critical: i32,
    pub m_atk: i32,
    pub m_atk_spd: i32,
    pub m_evasion: i32,
    pub m_def: i32,
    pub m_accuracy: i32,
    pub m_critical: i32,
    pub weapon_bonus_p_atk: i32,
    pub weapon_bonus_m_atk: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub vehicle_id: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Speeds {
    pub run: u16,
    pub walk: u16,
    pub swim_run: u16,
    pub swim_walk: u16,
    pub flying_mount_run: u16,
    pub flying_mount_walk: u16,
    pub fly_run: u16,
    pub fly_walk: u16,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClanInfo {
    pub title: String,
    pub pledge_type: u16,
    pub clan_id: i32,
    pub crest_large_id: i32,
    pub crest_id: i32,
    pub privileges: i32,
    pub is_leader: bool,
    pub ally_id: i32,
    pub ally_crest_id: i32,
    pub in_matching_room: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Social {
    pub pvp_flag: u8,
    pub reputation: i32,
    pub noble: bool,
    pub hero: bool,
    pub pledge_class: u8,
    pub pk_kills: i32,
    pub pvp_kills: i32,
    pub recommendations_left: u16,
    pub recommendations_received: u16,
    pub clan_rank: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VitalityFame {
    pub vitality_points: i32,
    pub vitality_bonus: u8,
    pub fame: i32,
    pub raidboss_points: i32,
    pub seal_gauge: u16,
}

/// Extra equipment slots unlocked by the character.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Slots {
    pub talisman: u8,
    pub brooch_jewel: u8,
    pub team: u8,
    pub agathion: u8,
    pub artifact: u8,
}

/// Elemental spirit attack and defense, in fire, water, wind, earth order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpiritStats {
    pub attack: [i32; 4],
    pub defense: [i32; 4],
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatPoints {
    pub usable: u16,
    pub allotted: BaseStats,
}

/// Field values of every block. Blocks that are not selected are never
/// written, so their fields can stay at their defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserInfoData {
    pub relation: u32,
    pub basic: BasicInfo,
    pub base_stats: BaseStats,
    pub max: Vitals,
    pub progress: Progress,
    pub weapon_enchant: u8,
    pub armor_set_enchant: u8,
    pub appearance: Appearance,
    pub status: Status,
    pub combat: CombatStats,
    pub elemental_defense: [u16; 6],
    pub position: Position,
    pub speeds: Speeds,
    pub move_multiplier: f64,
    pub attack_speed_multiplier: f64,
    pub collision_radius: f64,
    pub collision_height: f64,
    pub attack_element: u8,
    pub attack_element_power: u16,
    pub clan: ClanInfo,
    pub social: Social,
    pub vitality: VitalityFame,
    pub slots: Slots,
    /// 0 on land, 1 in water, 2 on a flying mount.
    pub environment: u8,
    pub running: bool,
    pub name_color: i32,
    pub title_color: i32,
    pub inventory_limit: u16,
    pub cursed_weapon_level: u8,
    pub true_hero: bool,
    pub spirits: SpiritStats,
    pub rank: i32,
    pub stat_points: StatPoints,
    /// Stat bonus on top of the template base and the allotted points.
    pub stat_bonus: BaseStats,
    pub elixirs_used: u16,
    pub vanguard_mount: u8,
}

impl MaskedLayout for UserInfoData {
    type Block = UserInfoBlock;

    fn declared_len(&self, block: UserInfoBlock) -> usize {
        match block {
            UserInfoBlock::BasicInfo => block.fixed_len() + utf16_len(&self.basic.name),
            UserInfoBlock::Clan => block.fixed_len() + utf16_len(&self.clan.title),
            _ => block.fixed_len(),
        }
    }

    fn write_block(&self, block: UserInfoBlock, w: &mut PacketWriter) {
        match block {
            UserInfoBlock::Relation => w.write_u32(self.relation),
            UserInfoBlock::BasicInfo => {
                let basic = &self.basic;
                w.write_string(&basic.name);
                w.write_bool(basic.is_gm);
                w.write_u8(basic.race);
                w.write_bool(basic.female);
                w.write_i32(basic.root_class_id);
                w.write_i32(basic.class_id);
                w.write_i32(basic.level);
                w.write_i32(basic.class_id);
            }
            UserInfoBlock::BaseStats => {
                write_base_stats(w, &self.base_stats);
                w.write_u32(0);
            }
            UserInfoBlock::MaxHpCpMp => write_vitals(w, &self.max),
            UserInfoBlock::CurrentHpMpCpExpSp => {
                write_vitals(w, &self.progress.current);
                w.write_i64(self.progress.sp);
                w.write_i64(self.progress.exp);
                w.write_f64(self.progress.exp_percent);
            }
            UserInfoBlock::EnchantLevel => {
                w.write_u8(self.weapon_enchant);
                w.write_u8(self.armor_set_enchant);
                w.write_u8(0);
            }
            UserInfoBlock::Appearance => {
                let look = &self.appearance;
                w.write_i32(look.hair_style);
                w.write_i32(look.hair_color);
                w.write_i32(look.face);
                w.write_bool(look.hair_accessory);
                w.write_i32(look.hair_color + 1);
            }
            UserInfoBlock::Status => {
                w.write_u8(self.status.mount_type);
                w.write_u8(self.status.private_store);
                w.write_bool(self.status.can_craft);
                w.write_u8(0);
            }
            UserInfoBlock::Stats => {
                let c = &self.combat;
                w.write_u16(if c.has_weapon { 40 } else { 20 });
                for value in [
                    c.p_atk,
                    c.p_atk_spd,
                    c.p_def,
                    c.evasion,
                    c.accuracy,
                    c.critical,
                    c.m_atk,
                    c.m_atk_spd,
                    c.p_atk_spd,
                    c.m_evasion,
                    c.m_def,
                    c.m_accuracy,
                    c.m_critical,
                    c.weapon_bonus_p_atk,
                    c.weapon_bonus_m_atk,
                ] {
                    w.write_i32(value);
                }
            }
            UserInfoBlock::Elementals => {
                for value in self.elemental_defense {
                    w.write_u16(value);
                }
            }
            UserInfoBlock::Position => {
                let p = &self.position;
                for value in [p.x, p.y, p.z, p.vehicle_id] {
                    w.write_i32(value);
                }
            }
            UserInfoBlock::Speed => {
                let s = &self.speeds;
                for value in [
                    s.run,
                    s.walk,
                    s.swim_run,
                    s.swim_walk,
                    s.flying_mount_run,
                    s.flying_mount_walk,
                    s.fly_run,
                    s.fly_walk,
                ] {
                    w.write_u16(value);
                }
            }
            UserInfoBlock::Multiplier => {
                w.write_f64(self.move_multiplier);
                w.write_f64(self.attack_speed_multiplier);
            }
            UserInfoBlock::ColRadiusHeight => {
                w.write_f64(self.collision_radius);
                w.write_f64(self.collision_height);
            }
            UserInfoBlock::AtkElemental => {
                w.write_u8(self.attack_element);
                w.write_u16(self.attack_element_power);
            }
            UserInfoBlock::Clan => {
                let clan = &self.clan;
                w.write_string(&clan.title);
                w.write_u16(clan.pledge_type);
                w.write_i32(clan.clan_id);
                w.write_i32(clan.crest_large_id);
                w.write_i32(clan.crest_id);
                w.write_i32(clan.privileges);
                w.write_bool(clan.is_leader);
                w.write_i32(clan.ally_id);
                w.write_i32(clan.ally_crest_id);
                w.write_bool(clan.in_matching_room);
            }
            UserInfoBlock::Social => {
                let s = &self.social;
                w.write_u8(s.pvp_flag);
                w.write_i32(s.reputation);
                w.write_bool(s.noble);
                w.write_u8(if s.hero { 2 } else { 0 });
                w.write_u8(s.pledge_class);
                w.write_i32(s.pk_kills);
                w.write_i32(s.pvp_kills);
                w.write_u16(s.recommendations_left);
                w.write_u16(s.recommendations_received);
                w.write_i32(s.clan_rank);
                w.write_i32(0);
            }
            UserInfoBlock::VitaFame => {
                let v = &self.vitality;
                w.write_i32(v.vitality_points);
                w.write_u8(v.vitality_bonus);
                w.write_i32(v.fame);
                w.write_i32(v.raidboss_points);
                w.write_u8(0);
                w.write_u16(v.seal_gauge);
                w.write_u8(0);
            }
            UserInfoBlock::Slots => {
                let slots = &self.slots;
                w.write_u8(slots.talisman);
                w.write_u8(slots.brooch_jewel);
                w.write_u8(slots.team);
                w.write_i32(0);
                // Charm slots: a presence flag, then the count past the first
                w.write_bool(slots.agathion > 0);
                w.write_u8(slots.agathion.saturating_sub(1));
                w.write_u8(slots.artifact);
            }
            UserInfoBlock::Movements => {
                w.write_u8(self.environment);
                w.write_bool(self.running);
            }
            UserInfoBlock::Color => {
                w.write_i32(self.name_color);
                w.write_i32(self.title_color);
            }
            UserInfoBlock::InventoryLimit => {
                w.write_u16(0);
                w.write_u16(0);
                w.write_u16(self.inventory_limit);
                w.write_u8(self.cursed_weapon_level);
                w.write_bytes(&[0; 4]);
            }
            UserInfoBlock::TrueHero => {
                w.write_i32(0);
                w.write_u16(0);
                w.write_u8(if self.true_hero { 100 } else { 0 });
            }
            UserInfoBlock::AttSpirits => {
                for value in self.spirits.attack.iter().chain(&self.spirits.defense) {
                    w.write_i32(*value);
                }
            }
            UserInfoBlock::Ranking => w.write_i32(self.rank),
            UserInfoBlock::StatPoints => {
                w.write_u16(self.stat_points.usable);
                write_base_stats(w, &self.stat_points.allotted);
            }
            UserInfoBlock::StatAbilities => {
                write_base_stats(w, &self.stat_bonus);
                w.write_u32(0);
            }
            UserInfoBlock::ElixirUsed => {
                w.write_u16(self.elixirs_used);
                w.write_u16(0);
            }
            UserInfoBlock::VanguardMount => w.write_u8(self.vanguard_mount),
        }
    }
}

fn write_vitals(w: &mut PacketWriter, vitals: &Vitals) {
    w.write_i32(vitals.hp);
    w.write_i32(vitals.mp);
    w.write_i32(vitals.cp);
}

fn write_base_stats(w: &mut PacketWriter, stats: &BaseStats) {
    for value in [stats.str, stats.dex, stats.con, stats.int, stats.wit, stats.men] {
        w.write_u16(value);
    }
}

fn read_base_stats(r: &mut PacketReader<'_>) -> Result<BaseStats> {
    Ok(BaseStats {
        str: r.read_u16()?,
        dex: r.read_u16()?,
        con: r.read_u16()?,
        int: r.read_u16()?,
        wit: r.read_u16()?,
        men: r.read_u16()?,
    })
}

fn read_vitals(r: &mut PacketReader<'_>) -> Result<Vitals> {
    Ok(Vitals {
        hp: r.read_i32()?,
        mp: r.read_i32()?,
        cp: r.read_i32()?,
    })
}

impl UserInfoData {
    /// Fill the fields of one block from its body. Bytes past the fields
    /// this build knows are left unread.
    fn read_block(&mut self, block: UserInfoBlock, r: &mut PacketReader<'_>) -> Result<()> {
        match block {
            UserInfoBlock::Relation => self.relation = r.read_u32()?,
            UserInfoBlock::BasicInfo => {
                self.basic = BasicInfo {
                    name: r.read_string()?,
                    is_gm: r.read_bool()?,
                    race: r.read_u8()?,
                    female: r.read_bool()?,
                    root_class_id: r.read_i32()?,
                    class_id: r.read_i32()?,
                    level: r.read_i32()?,
                };
            }
            UserInfoBlock::BaseStats => self.base_stats = read_base_stats(r)?,
            UserInfoBlock::MaxHpCpMp => self.max = read_vitals(r)?,
            UserInfoBlock::CurrentHpMpCpExpSp => {
                self.progress = Progress {
                    current: read_vitals(r)?,
                    sp: r.read_i64()?,
                    exp: r.read_i64()?,
                    exp_percent: r.read_f64()?,
                };
            }
            UserInfoBlock::EnchantLevel => {
                self.weapon_enchant = r.read_u8()?;
                self.armor_set_enchant = r.read_u8()?;
            }
            UserInfoBlock::Appearance => {
                self.appearance = Appearance {
                    hair_style: r.read_i32()?,
                    hair_color: r.read_i32()?,
                    face: r.read_i32()?,
                    hair_accessory: r.read_bool()?,
                };
            }
            UserInfoBlock::Status => {
                self.status = Status {
                    mount_type: r.read_u8()?,
                    private_store: r.read_u8()?,
                    can_craft: r.read_bool()?,
                };
            }
            UserInfoBlock::Stats => {
                let has_weapon = r.read_u16()? == 40;
                let mut values = [0i32; 15];
                for value in values.iter_mut() {
                    *value = r.read_i32()?;
                }
                self.combat = CombatStats {
                    has_weapon,
                    p_atk: values[0],
                    p_atk_spd: values[1],
                    p_def: values[2],
                    evasion: values[3],
                    accuracy: values[4],
                    critical: values[5],
                    m_atk: values[6],
                    m_atk_spd: values[7],
                    m_evasion: values[9],
                    m_def: values[10],
                    m_accuracy: values[11],
                    m_critical: values[12],
                    weapon_bonus_p_atk: values[13],
                    weapon_bonus_m_atk: values[14],
                };
            }
            UserInfoBlock::Elementals => {
                for value in self.elemental_defense.iter_mut() {
                    *value = r.read_u16()?;
                }
            }
            UserInfoBlock::Position => {
                self.position = Position {
                    x: r.read_i32()?,
                    y: r.read_i32()?,
                    z: r.read_i32()?,
                    vehicle_id: r.read_i32()?,
                };
            }
            UserInfoBlock::Speed => {
                self.speeds = Speeds {
                    run: r.read_u16()?,
                    walk: r.read_u16()?,
                    swim_run: r.read_u16()?,
                    swim_walk: r.read_u16()?,
                    flying_mount_run: r.read_u16()?,
                    flying_mount_walk: r.read_u16()?,
                    fly_run: r.read_u16()?,
                    fly_walk: r.read_u16()?,
                };
            }
            UserInfoBlock::Multiplier => {
                self.move_multiplier = r.read_f64()?;
                self.attack_speed_multiplier = r.read_f64()?;
            }
            UserInfoBlock::ColRadiusHeight => {
                self.collision_radius = r.read_f64()?;
                self.collision_height = r.read_f64()?;
            }
            UserInfoBlock::AtkElemental => {
                self.attack_element = r.read_u8()?;
                self.attack_element_power = r.read_u16()?;
            }
            UserInfoBlock::Clan => {
                self.clan = ClanInfo {
                    title: r.read_string()?,
                    pledge_type: r.read_u16()?,
                    clan_id: r.read_i32()?,
                    crest_large_id: r.read_i32()?,
                    crest_id: r.read_i32()?,
                    privileges: r.read_i32()?,
                    is_leader: r.read_bool()?,
                    ally_id: r.read_i32()?,
                    ally_crest_id: r.read_i32()?,
                    in_matching_room: r.read_bool()?,
                };
            }
            UserInfoBlock::Social => {
                self.social = Social {
                    pvp_flag: r.read_u8()?,
                    reputation: r.read_i32()?,
                    noble: r.read_bool()?,
                    hero: r.read_u8()? != 0,
                    pledge_class: r.read_u8()?,
                    pk_kills: r.read_i32()?,
                    pvp_kills: r.read_i32()?,
                    recommendations_left: r.read_u16()?,
                    recommendations_received: r.read_u16()?,
                    clan_rank: r.read_i32()?,
                };
            }
            UserInfoBlock::VitaFame => {
                let vitality_points = r.read_i32()?;
                let vitality_bonus = r.read_u8()?;
                let fame = r.read_i32()?;
                let raidboss_points = r.read_i32()?;
                r.skip(1)?;
                self.vitality = VitalityFame {
                    vitality_points,
                    vitality_bonus,
                    fame,
                    raidboss_points,
                    seal_gauge: r.read_u16()?,
                };
            }
            UserInfoBlock::Slots => {
                let talisman = r.read_u8()?;
                let brooch_jewel = r.read_u8()?;
                let team = r.read_u8()?;
                r.skip(4)?;
                let has_charm = r.read_bool()?;
                let extra_charms = r.read_u8()?;
                self.slots = Slots {
                    talisman,
                    brooch_jewel,
                    team,
                    agathion: if has_charm { extra_charms.saturating_add(1) } else { 0 },
                    artifact: r.read_u8()?,
                };
            }
            UserInfoBlock::Movements => {
                self.environment = r.read_u8()?;
                self.running = r.read_bool()?;
            }
            UserInfoBlock::Color => {
                self.name_color = r.read_i32()?;
                self.title_color = r.read_i32()?;
            }
            UserInfoBlock::InventoryLimit => {
                r.skip(4)?;
                self.inventory_limit = r.read_u16()?;
                self.cursed_weapon_level = r.read_u8()?;
            }
            UserInfoBlock::TrueHero => {
                r.skip(6)?;
                self.true_hero = r.read_u8()? != 0;
            }
            UserInfoBlock::AttSpirits => {
                for value in self.spirits.attack.iter_mut() {
                    *value = r.read_i32()?;
                }
                for value in self.spirits.defense.iter_mut() {
                    *value = r.read_i32()?;
                }
            }
            UserInfoBlock::Ranking => self.rank = r.read_i32()?,
            UserInfoBlock::StatPoints => {
                self.stat_points = StatPoints {
                    usable: r.read_u16()?,
                    allotted: read_base_stats(r)?,
                };
            }
            UserInfoBlock::StatAbilities => self.stat_bonus = read_base_stats(r)?,
            UserInfoBlock::ElixirUsed => self.elixirs_used = r.read_u16()?,
            UserInfoBlock::VanguardMount => self.vanguard_mount = r.read_u8()?,
        }
        Ok(())
    }
}

/// A `UserInfo` packet with a fixed set of selected blocks.
///
/// The field values are frozen at construction: block sizes are added to the
/// announced total as blocks are selected, so the data behind them must not
/// change afterwards.
#[derive(Debug, Clone)]
pub struct UserInfo {
    object_id: i32,
    data: UserInfoData,
    encoder: MaskedEncoder<UserInfoBlock>,
}

impl UserInfo {
    /// No blocks selected yet.
    pub fn new(object_id: i32, data: UserInfoData) -> Self {
        Self {
            object_id,
            data,
            encoder: MaskedEncoder::new(BASE_SIZE),
        }
    }

    /// Every block selected.
    pub fn full(object_id: i32, data: UserInfoData) -> Self {
        let mut packet = Self::new(object_id, data);
        packet.encoder.add_all(&packet.data);
        packet
    }

    pub fn add(&mut self, block: UserInfoBlock) {
        self.encoder.add(&self.data, block);
    }

    pub fn with(mut self, block: UserInfoBlock) -> Self {
        self.add(block);
        self
    }

    pub fn with_blocks(mut self, blocks: &[UserInfoBlock]) -> Self {
        for block in blocks {
            self.add(*block);
        }
        self
    }

    pub fn contains(&self, block: UserInfoBlock) -> bool {
        self.encoder.contains(block)
    }

    pub fn mask(&self) -> BlockMask {
        self.encoder.mask()
    }

    /// The announced size field.
    pub fn size(&self) -> usize {
        self.encoder.size()
    }

    pub fn data(&self) -> &UserInfoData {
        &self.data
    }

    /// Parse a payload (opcode header already consumed). Blocks this build
    /// does not know are stepped over by their declared length.
    pub fn decode(mut reader: PacketReader<'_>) -> Result<DecodedUserInfo> {
        let object_id = reader.read_i32()?;
        let size = reader.read_i32()?;
        let block_types = reader.read_u16()?;
        let mut blocks = MaskedReader::new(reader)?;
        let mask = blocks.mask();
        let mut data = UserInfoData::default();
        for block in &mut blocks {
            let mut block = block?;
            if let Some(kind) = UserInfoBlock::from_bit(block.bit) {
                data.read_block(kind, &mut block.reader)?;
            }
        }
        Ok(DecodedUserInfo {
            object_id,
            size,
            block_types,
            mask,
            data,
        })
    }
}

impl ServerPacket for UserInfo {
    fn opcode(&self) -> Opcode {
        Opcode::Primary(0x32)
    }

    fn write_body(&self, writer: &mut PacketWriter) {
        writer.write_i32(self.object_id);
        writer.write_i32(self.encoder.size() as i32);
        writer.write_u16(BLOCK_TYPE_COUNT);
        self.encoder.write(&self.data, writer);
    }

    fn size_hint(&self) -> usize {
        6 + self.encoder.size()
    }
}

/// Result of [`UserInfo::decode`]. Fields of absent blocks keep their
/// defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedUserInfo {
    pub object_id: i32,
    pub size: i32,
    pub block_types: u16,
    pub mask: BlockMask,
    pub data: UserInfoData,
}

impl DecodedUserInfo {
    pub fn contains(&self, block: UserInfoBlock) -> bool {
        self.mask.contains(block.bit())
    }
}
