//! In-Memory Remote Store
//!
//! Process-local stand-in for the persistence services. Can be switched
//! offline to make every call fail with a network error.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    Item, ItemId, RemoteError, RemoteResult, User, UserId, Wishlist, WishlistEntry,
};
use super::traits::RemoteStore;

#[derive(Default)]
pub struct MemoryRemoteStore {
    wishlists: Mutex<HashMap<UserId, Vec<WishlistEntry>>>,
    items: Mutex<HashMap<ItemId, Item>>,
    users: Mutex<HashMap<UserId, User>>,
    offline: AtomicBool,
}

impl MemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub async fn insert_item(&self, item: Item) {
        self.items.lock().await.insert(item.id.clone(), item);
    }

    pub async fn insert_user(&self, user: User) {
        self.users.lock().await.insert(user.id.clone(), user);
    }

    /// Overwrite the stored wishlist for a user
    pub async fn seed_wishlist(&self, user_id: &UserId, entries: Vec<WishlistEntry>) {
        self.wishlists.lock().await.insert(user_id.clone(), entries);
    }

    /// Item identifiers currently stored for a user, in order
    pub async fn stored_ids(&self, user_id: &UserId) -> Vec<ItemId> {
        self.wishlists
            .lock()
            .await
            .get(user_id)
            .map(|entries| entries.iter().map(|e| e.item_id.clone()).collect())
            .unwrap_or_default()
    }

    fn ensure_online(&self) -> RemoteResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::Network("remote store is offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn fetch_wishlist(&self, user_id: &UserId) -> RemoteResult<Wishlist> {
        self.ensure_online()?;
        let wishlists = self.wishlists.lock().await;
        let entries = wishlists.get(user_id).cloned().unwrap_or_default();
        Ok(Wishlist::from_entries(user_id.clone(), entries))
    }

    async fn add_item(&self, user_id: &UserId, item: &Item) -> RemoteResult<()> {
        self.ensure_online()?;
        let mut wishlists = self.wishlists.lock().await;
        let entries = wishlists.entry(user_id.clone()).or_default();
        if !entries.iter().any(|e| e.item_id == item.id) {
            entries.push(WishlistEntry::from_item(item));
        }
        Ok(())
    }

    async fn remove_item(&self, user_id: &UserId, item_id: &ItemId) -> RemoteResult<()> {
        self.ensure_online()?;
        if let Some(entries) = self.wishlists.lock().await.get_mut(user_id) {
            entries.retain(|e| &e.item_id != item_id);
        }
        Ok(())
    }

    async fn get_item(&self, item_id: &ItemId) -> RemoteResult<Item> {
        self.ensure_online()?;
        self.items
            .lock()
            .await
            .get(item_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("item {}", item_id)))
    }

    async fn get_user(&self, user_id: &UserId) -> RemoteResult<User> {
        self.ensure_online()?;
        self.users
            .lock()
            .await
            .get(user_id)
            .cloned()
            .ok_or_else(|| RemoteError::NotFound(format!("user {}", user_id)))
    }
}
