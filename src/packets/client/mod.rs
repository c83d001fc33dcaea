//! Client to server requests.
//!
//! Each request reads its own fields and hands itself to the matching
//! [`GameWorld`](crate::packets::world::GameWorld) callback. None of them
//! change the session phase on their own.

pub mod auth;
pub mod captcha;
pub mod enchant;
pub mod world;

pub use auth::{
    AuthLogin, CharacterCreate, CharacterDelete, CharacterSelect, Logout, NewCharacter,
    ProtocolVersion, RequestGotoLobby,
};
pub use captcha::{RequestCaptchaAnswer, RequestRefreshCaptchaImage};
pub use enchant::{RequestExCancelEnchantItem, RequestExTryToPutEnchantTargetItem};
pub use world::{
    Attack, EnterWorld, ExElementalSpiritInfo, ExRequestTeleport, MoveBackwardToLocation,
    RequestItemList, RequestKeyMapping, RequestManorList, Say2,
};
