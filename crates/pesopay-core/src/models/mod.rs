//! Data models for PesoPay entities.
//!
//! - `UserProfile`: the authenticated account, overwritten wholesale on
//!   every login or profile fetch
//! - `LinkedCard`, `LinkedAccount`: linked payment instruments
//! - `NewCard`, `NewAccount`: payloads for linking new instruments

pub mod user;
pub mod wallet;

pub use user::UserProfile;
pub use wallet::{LinkedAccount, LinkedCard, NewAccount, NewCard};
