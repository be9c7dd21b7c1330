//! Membership Queries
//!
//! "Is this item saved?" answered from the store's current snapshot, so that
//! optimistic changes and rollbacks show up immediately.

use std::sync::Arc;

use crate::domain::{ItemId, WishlistState};
use crate::store::WishlistStore;

/// What a per-item wishlist button should offer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affordance {
    /// No authenticated user
    Hidden,
    /// Wishlist not loaded yet
    Loading,
    /// A toggle for this item is awaiting the remote store
    Pending,
    Add,
    Remove,
}

impl Affordance {
    pub fn label(&self) -> &'static str {
        match self {
            Affordance::Hidden => "",
            Affordance::Loading => "Loading...",
            Affordance::Pending => "Saving...",
            Affordance::Add => "Add to Wishlist",
            Affordance::Remove => "Remove from Wishlist",
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Affordance::Add | Affordance::Remove)
    }
}

#[derive(Clone)]
pub struct Membership {
    store: Arc<WishlistStore>,
}

impl Membership {
    pub fn new(store: Arc<WishlistStore>) -> Self {
        Self { store }
    }

    pub fn is_member(&self, item_id: &ItemId) -> bool {
        self.store.read(|state| is_member_of(state, item_id))
    }

    /// Button state for an item; `in_flight` comes from the mutation engine
    pub fn affordance(&self, item_id: &ItemId, in_flight: bool) -> Affordance {
        self.store.read(|state| match state {
            WishlistState::SignedOut => Affordance::Hidden,
            WishlistState::Loading { .. } | WishlistState::Failed { .. } => Affordance::Loading,
            WishlistState::Ready(_) if in_flight => Affordance::Pending,
            WishlistState::Ready(w) if w.contains(item_id) => Affordance::Remove,
            WishlistState::Ready(_) => Affordance::Add,
        })
    }
}

/// Membership in a given snapshot, for observers holding a watch receiver
pub fn is_member_of(state: &WishlistState, item_id: &ItemId) -> bool {
    state.wishlist().is_some_and(|w| w.contains(item_id))
}
