//! Domain Layer - Core Entity Trait and Errors
//!
//! Every entity carries a stable identifier. Errors are split between what the
//! remote store can report and what the wishlist core reports to the UI.

use serde::{Deserialize, Serialize};

use super::item::ItemId;

/// Core trait for all domain entities
pub trait Entity: Sized + Send + Sync + Clone {
    /// The type of the entity's unique identifier
    type Id: Clone + Eq + std::hash::Hash + Send + Sync;

    /// Returns the entity's unique identifier
    fn id(&self) -> &Self::Id;
}

/// Result type for remote store operations
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failures reported by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RemoteError {
    /// The requested resource does not exist
    NotFound(String),
    /// Transport failure or timeout
    Network(String),
    /// Remote-side invariant violation
    Conflict(String),
}

impl std::fmt::Display for RemoteError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RemoteError::NotFound(msg) => write!(f, "Not found: {}", msg),
            RemoteError::Network(msg) => write!(f, "Network error: {}", msg),
            RemoteError::Conflict(msg) => write!(f, "Conflict: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {}

/// Errors surfaced by wishlist operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WishlistError {
    /// No wishlist is loaded for an authenticated user
    NotLoaded,
    /// A toggle for this item is still awaiting the remote store
    Busy(ItemId),
    /// The remote store rejected or never answered the request
    Remote(RemoteError),
}

impl WishlistError {
    /// Whether re-triggering the same action may succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            WishlistError::NotLoaded => false,
            WishlistError::Busy(_) => true,
            WishlistError::Remote(RemoteError::NotFound(_)) => false,
            WishlistError::Remote(_) => true,
        }
    }
}

impl std::fmt::Display for WishlistError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WishlistError::NotLoaded => write!(f, "Wishlist is not loaded"),
            WishlistError::Busy(id) => write!(f, "Wishlist update for item {} is still in progress", id),
            WishlistError::Remote(e) => write!(f, "Error adding or removing item from wishlist: {}", e),
        }
    }
}

impl std::error::Error for WishlistError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WishlistError::Remote(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RemoteError> for WishlistError {
    fn from(e: RemoteError) -> Self {
        WishlistError::Remote(e)
    }
}
