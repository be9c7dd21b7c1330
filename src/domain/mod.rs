//! Domain Layer
//!
//! Entities shared by the wishlist core and its remote collaborators.
//! This layer has NO external dependencies (except serde for serialization).

mod entity;
mod item;
mod user;
mod wishlist;

pub use entity::{Entity, RemoteError, RemoteResult, WishlistError};
pub use item::{Condition, Item, ItemId};
pub use user::{User, UserId};
pub use wishlist::{Wishlist, WishlistEntry, WishlistState};
