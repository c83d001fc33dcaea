//! Boundary between the protocol engine and the game.
//!
//! Requests decode themselves and then call one method of [`GameWorld`].
//! Everything behind that call (accounts, characters, combat, persistence)
//! belongs to the implementor. Phase changes happen here too: an
//! implementation moves the session forward with
//! [`Session::set_state`](crate::service::session::Session::set_state) once
//! login or world entry succeeds.
//!
//! Every callback defaults to doing nothing, so an implementation only
//! overrides what it supports.

use crate::error::Result;
use crate::packets::client::{
    Attack, AuthLogin, CharacterCreate, CharacterDelete, CharacterSelect, ExElementalSpiritInfo,
    ExRequestTeleport, MoveBackwardToLocation, ProtocolVersion, RequestCaptchaAnswer,
    RequestExTryToPutEnchantTargetItem, RequestRefreshCaptchaImage, Say2,
};
use crate::service::session::Session;

#[allow(unused_variables)]
pub trait GameWorld: Send + Sync {
    /// A connection was accepted. Returning an error refuses it.
    fn on_connect(&self, session: &mut Session) -> Result<()> {
        Ok(())
    }

    /// The connection is gone; the session can no longer send.
    fn on_disconnect(&self, session: &mut Session) {}

    fn protocol_version(&self, session: &mut Session, request: &ProtocolVersion) -> Result<()> {
        Ok(())
    }

    fn auth_login(&self, session: &mut Session, request: &AuthLogin) -> Result<()> {
        Ok(())
    }

    fn logout(&self, session: &mut Session) -> Result<()> {
        Ok(())
    }

    fn character_create(&self, session: &mut Session, request: &CharacterCreate) -> Result<()> {
        Ok(())
    }

    fn character_delete(&self, session: &mut Session, request: &CharacterDelete) -> Result<()> {
        Ok(())
    }

    fn character_select(&self, session: &mut Session, request: &CharacterSelect) -> Result<()> {
        Ok(())
    }

    fn new_character(&self, session: &mut Session) -> Result<()> {
        Ok(())
    }

    fn goto_lobby(&self, session: &mut Session) -> Result<()> {
        Ok(())
    }

    fn enter_world(&self, session: &mut Session) -> Result<()> {
        Ok(())
    }

    fn key_mapping(&self, session: &mut Session) -> Result<()> {
        Ok(())
    }

    fn attack(&self, session: &mut Session, request: &Attack) -> Result<()> {
        Ok(())
    }

    fn move_to_location(
        &self,
        session: &mut Session,
        request: &MoveBackwardToLocation,
    ) -> Result<()> {
        Ok(())
    }

    fn item_list(&self, session: &mut Session) -> Result<()> {
        Ok(())
    }

    fn say(&self, session: &mut Session, request: &Say2) -> Result<()> {
        Ok(())
    }

    fn manor_list(&self, session: &mut Session) -> Result<()> {
        Ok(())
    }

    fn put_enchant_target_item(
        &self,
        session: &mut Session,
        request: &RequestExTryToPutEnchantTargetItem,
    ) -> Result<()> {
        Ok(())
    }

    fn cancel_enchant(&self, session: &mut Session) -> Result<()> {
        Ok(())
    }

    fn captcha_answer(&self, session: &mut Session, request: &RequestCaptchaAnswer) -> Result<()> {
        Ok(())
    }

    fn refresh_captcha(
        &self,
        session: &mut Session,
        request: &RequestRefreshCaptchaImage,
    ) -> Result<()> {
        Ok(())
    }

    fn elemental_spirit_info(
        &self,
        session: &mut Session,
        request: &ExElementalSpiritInfo,
    ) -> Result<()> {
        Ok(())
    }

    fn teleport(&self, session: &mut Session, request: &ExRequestTeleport) -> Result<()> {
        Ok(())
    }
}

/// A world that accepts connections and ignores every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWorld;

impl GameWorld for NullWorld {}
