//! Wishlist Context
//!
//! Composition root handed to UI collaborators: one store, the engines that
//! change it, and the latest user-visible notice.

use std::sync::Arc;
use std::time::Duration;

use log::info;
use tokio::sync::watch;

use crate::config::WishlistConfig;
use crate::domain::{Item, ItemId, RemoteResult, UserId, WishlistError, WishlistState};
use crate::item_details::{load_item_details, ItemDetails};
use crate::membership::{Affordance, Membership};
use crate::mutation::{MutationEngine, ToggleOutcome};
use crate::remote::RemoteStore;
use crate::session::{LoadOutcome, SessionBinding, SessionSource};
use crate::store::WishlistStore;

#[cfg(test)]
mod tests;

/// A dismissible message about a failed wishlist action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub message: String,
    /// Re-triggering the action may succeed
    pub retryable: bool,
}

impl From<&WishlistError> for Notice {
    fn from(e: &WishlistError) -> Self {
        Self {
            message: e.to_string(),
            retryable: e.is_retryable(),
        }
    }
}

pub struct WishlistContext {
    store: Arc<WishlistStore>,
    membership: Membership,
    mutations: MutationEngine,
    session: SessionBinding,
    remote: Arc<dyn RemoteStore>,
    timeout: Duration,
    notice: watch::Sender<Option<Notice>>,
}

impl WishlistContext {
    pub fn new(remote: Arc<dyn RemoteStore>, config: &WishlistConfig) -> Self {
        Self::with_timeout(remote, config.request_timeout())
    }

    pub fn with_timeout(remote: Arc<dyn RemoteStore>, timeout: Duration) -> Self {
        let store = Arc::new(WishlistStore::new());
        let (notice, _) = watch::channel(None);
        Self {
            membership: Membership::new(store.clone()),
            mutations: MutationEngine::new(store.clone(), remote.clone(), timeout),
            session: SessionBinding::new(store.clone(), remote.clone(), timeout),
            store,
            remote,
            timeout,
            notice,
        }
    }

    // ========================
    // Reads
    // ========================

    pub fn get(&self) -> WishlistState {
        self.store.get()
    }

    /// Saved item count for the navigation badge; zero until loaded
    pub fn count(&self) -> usize {
        self.store.count()
    }

    pub fn subscribe(&self) -> watch::Receiver<WishlistState> {
        self.store.subscribe()
    }

    pub fn is_member(&self, item_id: &ItemId) -> bool {
        self.membership.is_member(item_id)
    }

    pub fn affordance(&self, item_id: &ItemId) -> Affordance {
        self.membership
            .affordance(item_id, self.mutations.is_in_flight(item_id))
    }

    // ========================
    // Actions
    // ========================

    pub async fn toggle(&self, item: &Item) -> Result<ToggleOutcome, WishlistError> {
        let result = self.mutations.toggle(item).await;
        self.report(&result);
        result
    }

    /// Sign-in
    pub async fn login(&self, user_id: UserId) -> Result<LoadOutcome, WishlistError> {
        self.dismiss_notice();
        let result = self.session.establish(user_id).await;
        self.report(&result);
        result
    }

    /// Session restore from a persisted credential, or any auth change
    pub async fn restore(&self, source: &dyn SessionSource) -> Result<Option<LoadOutcome>, WishlistError> {
        let result = self.session.sync(source).await;
        self.report(&result);
        result
    }

    pub async fn reload(&self) -> Result<LoadOutcome, WishlistError> {
        let result = self.session.reload().await;
        self.report(&result);
        result
    }

    /// Sign-out
    pub fn logout(&self) {
        self.session.end();
        self.dismiss_notice();
        info!("Wishlist cleared on logout");
    }

    pub async fn item_details(&self, item_id: &ItemId) -> RemoteResult<ItemDetails> {
        load_item_details(self.remote.as_ref(), item_id, self.timeout).await
    }

    // ========================
    // Notices
    // ========================

    pub fn notice(&self) -> Option<Notice> {
        self.notice.borrow().clone()
    }

    pub fn subscribe_notices(&self) -> watch::Receiver<Option<Notice>> {
        self.notice.subscribe()
    }

    pub fn dismiss_notice(&self) {
        self.notice.send_if_modified(|n| n.take().is_some());
    }

    fn report<T>(&self, result: &Result<T, WishlistError>) {
        match result {
            // A rejected double-click is not worth a message
            Err(WishlistError::Busy(_)) => {}
            Err(e) => {
                self.notice.send_replace(Some(Notice::from(e)));
            }
            Ok(_) => {}
        }
    }
}
