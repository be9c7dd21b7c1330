//! Test Support
//!
//! A remote store whose calls can be held open and released with a chosen
//! outcome, so overlapping operations run in a fixed order on one thread.
//! Calls are keyed `"{op}#{n}"`, counting from 1 per operation
//! (`fetch`, `add`, `remove`).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::oneshot;

use crate::domain::{
    Item, ItemId, RemoteError, RemoteResult, User, UserId, Wishlist, WishlistEntry,
};
use crate::remote::{MemoryRemoteStore, RemoteStore};

/// How a held call finishes
#[derive(Debug)]
pub enum Release {
    /// Run against the inner store
    Proceed,
    Fail(RemoteError),
    /// Fetch only: answer with these entries
    Respond(Vec<WishlistEntry>),
}

#[derive(Default)]
pub struct ScriptedRemote {
    pub inner: MemoryRemoteStore,
    gates: Mutex<HashMap<String, oneshot::Receiver<Release>>>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Hold the call with this key until the returned sender fires
    pub fn hold(&self, key: &str) -> oneshot::Sender<Release> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().insert(key.to_string(), rx);
        tx
    }

    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().unwrap().get(op).copied().unwrap_or(0)
    }

    async fn gate(&self, op: &'static str) -> Release {
        let key = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(op).or_default();
            *n += 1;
            format!("{}#{}", op, n)
        };
        let held = self.gates.lock().unwrap().remove(&key);
        match held {
            Some(rx) => rx.await.unwrap_or(Release::Proceed),
            None => Release::Proceed,
        }
    }
}

#[async_trait]
impl RemoteStore for ScriptedRemote {
    async fn fetch_wishlist(&self, user_id: &UserId) -> RemoteResult<Wishlist> {
        // The server answers at request time; the gate only delays delivery.
        let answer = self.inner.fetch_wishlist(user_id).await;
        match self.gate("fetch").await {
            Release::Proceed => answer,
            Release::Fail(e) => Err(e),
            Release::Respond(entries) => Ok(Wishlist::from_entries(user_id.clone(), entries)),
        }
    }

    async fn add_item(&self, user_id: &UserId, item: &Item) -> RemoteResult<()> {
        match self.gate("add").await {
            Release::Fail(e) => Err(e),
            _ => self.inner.add_item(user_id, item).await,
        }
    }

    async fn remove_item(&self, user_id: &UserId, item_id: &ItemId) -> RemoteResult<()> {
        match self.gate("remove").await {
            Release::Fail(e) => Err(e),
            _ => self.inner.remove_item(user_id, item_id).await,
        }
    }

    async fn get_item(&self, item_id: &ItemId) -> RemoteResult<Item> {
        self.inner.get_item(item_id).await
    }

    async fn get_user(&self, user_id: &UserId) -> RemoteResult<User> {
        self.inner.get_user(user_id).await
    }
}

pub fn item(id: &str) -> Item {
    Item::new(id, format!("Item {}", id), 10.0)
}

pub fn entry(id: &str) -> WishlistEntry {
    WishlistEntry::from_item(&item(id))
}

pub fn network_error() -> RemoteError {
    RemoteError::Network("connection reset".to_string())
}
