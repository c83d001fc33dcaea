//! Server to client packets.

pub mod captcha;
pub mod enchant;
pub mod item_list;
pub mod session;
pub mod teleport;
pub mod user_info;

pub use captcha::ExCaptchaImage;
pub use enchant::ExPutEnchantTargetItemResult;
pub use item_list::{ItemList, ItemRecord};
pub use session::{KeyPacket, LeaveWorld};
pub use teleport::ExTeleportToLocationActivate;
pub use user_info::{UserInfo, UserInfoBlock, UserInfoData};
