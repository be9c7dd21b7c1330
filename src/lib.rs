//! SwapShop Wishlist
//!
//! Client-side wishlist synchronization for the storefront.
//! Layered architecture:
//! - domain: entities and errors
//! - remote: access to the persistence services
//! - store: the single local copy of the wishlist
//! - membership, mutation, session: reads, optimistic toggles, lifecycle
//! - context: composition root used by the UI

pub mod config;
pub mod context;
pub mod domain;
pub mod item_details;
pub mod membership;
pub mod mutation;
pub mod remote;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, WishlistConfig};
pub use context::{Notice, WishlistContext};
pub use domain::{
    Condition, Item, ItemId, RemoteError, User, UserId, Wishlist, WishlistEntry, WishlistError,
    WishlistState,
};
pub use membership::Affordance;
pub use mutation::ToggleOutcome;
pub use remote::{HttpRemoteStore, MemoryRemoteStore, RemoteStore};
pub use session::{LoadOutcome, SessionSource};
