//! Remote Store - Core Trait
//!
//! The request/response contract the wishlist core consumes.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{Item, ItemId, RemoteError, RemoteResult, User, UserId, Wishlist};

/// Read/write access to the persistence services
///
/// `add_item` and `remove_item` must be idempotent: adding a present item and
/// removing an absent one both succeed.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Authoritative wishlist for a user; a missing wishlist is empty, not an error
    async fn fetch_wishlist(&self, user_id: &UserId) -> RemoteResult<Wishlist>;

    /// Persist a new entry for `item`
    async fn add_item(&self, user_id: &UserId, item: &Item) -> RemoteResult<()>;

    /// Delete the entry for `item_id`
    async fn remove_item(&self, user_id: &UserId, item_id: &ItemId) -> RemoteResult<()>;

    /// Item lookup by identifier
    async fn get_item(&self, item_id: &ItemId) -> RemoteResult<Item>;

    /// User lookup by identifier
    async fn get_user(&self, user_id: &UserId) -> RemoteResult<User>;
}

/// Bound a remote call; an elapsed deadline is reported as a network failure
pub async fn with_timeout<T, F>(limit: Duration, request: F) -> RemoteResult<T>
where
    F: Future<Output = RemoteResult<T>>,
{
    match tokio::time::timeout(limit, request).await {
        Ok(result) => result,
        Err(_) => Err(RemoteError::Network(format!(
            "request timed out after {} ms",
            limit.as_millis()
        ))),
    }
}
