//! Opcode tables of the supported client build.
//!
//! Rows with `None` as their factory are opcodes the client sends that have
//! no request type yet; they are recognized and dropped.

use crate::config::CLIENT_EXTENDED_MARKER;
use crate::error::Result;
use crate::packets::client::*;
use crate::protocol::registry::{OpcodeDef, OpcodeRegistry};
use crate::protocol::request::{new_request, RequestFactory};
use crate::protocol::state::{ConnectionState, StateSet};

const CONNECTED: StateSet = StateSet::of(&[ConnectionState::Connected]);
const AUTHENTICATED: StateSet = StateSet::of(&[ConnectionState::Authenticated]);
const ENTERING: StateSet = StateSet::of(&[ConnectionState::Entering]);
const IN_GAME: StateSet = StateSet::IN_GAME;
const AUTHENTICATED_OR_IN_GAME: StateSet =
    StateSet::of(&[ConnectionState::Authenticated, ConnectionState::InGame]);
const ENTERING_OR_IN_GAME: StateSet =
    StateSet::of(&[ConnectionState::Entering, ConnectionState::InGame]);

const fn def(id: u32, name: &'static str, factory: RequestFactory, states: StateSet) -> OpcodeDef {
    OpcodeDef::new(id, name, Some(factory), states)
}

const fn unimplemented(id: u32, name: &'static str, states: StateSet) -> OpcodeDef {
    OpcodeDef::new(id, name, None, states)
}

/// Primary space.
pub const CLIENT_PACKETS: &[OpcodeDef] = &[
    def(0x00, "LOGOUT", new_request::<Logout>, AUTHENTICATED_OR_IN_GAME),
    def(0x01, "ATTACK", new_request::<Attack>, IN_GAME),
    unimplemented(0x03, "REQUEST_START_PLEDGE_WAR", IN_GAME),
    def(0x0C, "CHARACTER_CREATE", new_request::<CharacterCreate>, AUTHENTICATED),
    def(0x0D, "CHARACTER_DELETE", new_request::<CharacterDelete>, AUTHENTICATED),
    def(0x0E, "PROTOCOL_VERSION", new_request::<ProtocolVersion>, CONNECTED),
    def(
        0x0F,
        "MOVE_BACKWARD_TO_LOCATION",
        new_request::<MoveBackwardToLocation>,
        IN_GAME,
    ),
    def(0x11, "ENTER_WORLD", new_request::<EnterWorld>, ENTERING),
    def(0x12, "CHARACTER_SELECT", new_request::<CharacterSelect>, AUTHENTICATED),
    def(0x13, "NEW_CHARACTER", new_request::<NewCharacter>, AUTHENTICATED),
    def(0x14, "REQUEST_ITEM_LIST", new_request::<RequestItemList>, IN_GAME),
    def(0x2B, "AUTH_LOGIN", new_request::<AuthLogin>, CONNECTED),
    def(0x49, "SAY2", new_request::<Say2>, IN_GAME),
];

/// Extended space, reached through [`CLIENT_EXTENDED_MARKER`].
pub const EX_CLIENT_PACKETS: &[OpcodeDef] = &[
    def(0x01, "REQUEST_MANOR_LIST", new_request::<RequestManorList>, IN_GAME),
    def(0x21, "REQUEST_KEY_MAPPING", new_request::<RequestKeyMapping>, ENTERING_OR_IN_GAME),
    def(0x33, "REQUEST_GOTO_LOBBY", new_request::<RequestGotoLobby>, AUTHENTICATED),
    def(
        0x49,
        "REQUEST_EX_TRY_TO_PUT_ENCHANT_TARGET_ITEM",
        new_request::<RequestExTryToPutEnchantTargetItem>,
        IN_GAME,
    ),
    def(
        0x4B,
        "REQUEST_EX_CANCEL_ENCHANT_ITEM",
        new_request::<RequestExCancelEnchantItem>,
        IN_GAME,
    ),
    unimplemented(0x103, "EX_SEND_CLIENT_INI", AUTHENTICATED),
    def(0x10E, "REQUEST_CAPTCHA_ANSWER", new_request::<RequestCaptchaAnswer>, IN_GAME),
    def(
        0x10F,
        "REQUEST_REFRESH_CAPTCHA_IMAGE",
        new_request::<RequestRefreshCaptchaImage>,
        IN_GAME,
    ),
    def(0x14F, "EX_ELEMENTAL_SPIRIT_INFO", new_request::<ExElementalSpiritInfo>, IN_GAME),
    unimplemented(0x15D, "EX_USER_BAN_INFO", IN_GAME),
    def(0x166, "EX_REQUEST_TELEPORT", new_request::<ExRequestTeleport>, IN_GAME),
];

/// Registry for the supported client build.
pub fn game_registry() -> Result<OpcodeRegistry> {
    OpcodeRegistry::builder(CLIENT_EXTENDED_MARKER)
        .primary_table(CLIENT_PACKETS)
        .extended_table(EX_CLIENT_PACKETS)
        .build()
}
