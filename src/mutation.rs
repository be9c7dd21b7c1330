//! Optimistic Mutations
//!
//! A toggle changes the store first and asks the remote store second. When the
//! remote call fails (or times out) the change is undone for that item only.
//! At most one toggle per item is in flight; a second one is rejected.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};

use crate::domain::{Item, ItemId, UserId, WishlistEntry, WishlistError};
use crate::remote::{with_timeout, RemoteStore};
use crate::store::{SessionToken, WishlistStore};

/// How a toggle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// Item saved and confirmed
    Added,
    /// Item unsaved and confirmed
    Removed,
    /// The session ended while the request was in flight; its result was ignored
    Discarded,
}

#[derive(Debug)]
enum Operation {
    Add,
    Remove { position: usize, entry: WishlistEntry },
}

/// An optimistic change awaiting confirmation
#[derive(Debug)]
struct PendingMutation {
    session: SessionToken,
    user_id: UserId,
    item_id: ItemId,
    operation: Operation,
}

impl PendingMutation {
    fn confirmed(&self) -> ToggleOutcome {
        match self.operation {
            Operation::Add => ToggleOutcome::Added,
            Operation::Remove { .. } => ToggleOutcome::Removed,
        }
    }

    /// Apply the inverse of the optimistic change
    fn rollback(self, store: &WishlistStore) -> bool {
        match self.operation {
            Operation::Add => store.revert_add(self.session, &self.item_id),
            Operation::Remove { position, entry } => store.revert_remove(self.session, position, entry),
        }
    }
}

/// Releases the item when the toggle finishes, even if it was cancelled
struct InFlight<'a> {
    items: &'a Mutex<HashSet<ItemId>>,
    store: &'a WishlistStore,
    item_id: ItemId,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.store.settle(&self.item_id);
        self.items
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.item_id);
    }
}

pub struct MutationEngine {
    store: Arc<WishlistStore>,
    remote: Arc<dyn RemoteStore>,
    timeout: Duration,
    in_flight: Mutex<HashSet<ItemId>>,
}

impl MutationEngine {
    pub fn new(store: Arc<WishlistStore>, remote: Arc<dyn RemoteStore>, timeout: Duration) -> Self {
        Self {
            store,
            remote,
            timeout,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    fn in_flight(&self) -> MutexGuard<'_, HashSet<ItemId>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_in_flight(&self, item_id: &ItemId) -> bool {
        self.in_flight().contains(item_id)
    }

    fn claim(&self, item_id: &ItemId) -> Result<InFlight<'_>, WishlistError> {
        if !self.in_flight().insert(item_id.clone()) {
            return Err(WishlistError::Busy(item_id.clone()));
        }
        Ok(InFlight {
            items: &self.in_flight,
            store: &self.store,
            item_id: item_id.clone(),
        })
    }

    /// Save `item` if it is not in the wishlist, unsave it otherwise
    pub async fn toggle(&self, item: &Item) -> Result<ToggleOutcome, WishlistError> {
        let user_id = self
            .store
            .read(|s| s.wishlist().map(|w| w.user_id().clone()))
            .ok_or(WishlistError::NotLoaded)?;
        let _claim = self.claim(&item.id)?;
        let session = self.store.session();

        let operation = match self.store.optimistic_remove(&item.id) {
            Some((position, entry)) => Operation::Remove { position, entry },
            None => {
                self.store.optimistic_add(WishlistEntry::from_item(item));
                Operation::Add
            }
        };
        let pending = PendingMutation {
            session,
            user_id,
            item_id: item.id.clone(),
            operation,
        };
        debug!("Optimistic {:?} applied for user {}", pending.operation, pending.user_id);

        let result = match &pending.operation {
            Operation::Add => {
                with_timeout(self.timeout, self.remote.add_item(&pending.user_id, item)).await
            }
            Operation::Remove { .. } => {
                with_timeout(self.timeout, self.remote.remove_item(&pending.user_id, &item.id)).await
            }
        };

        if self.store.session() != session {
            info!("Discarding wishlist update for item {} from an ended session", item.id);
            return Ok(ToggleOutcome::Discarded);
        }

        match result {
            Ok(()) => {
                self.store.settle(&pending.item_id);
                let outcome = pending.confirmed();
                debug!("Wishlist update for item {} confirmed: {:?}", item.id, outcome);
                Ok(outcome)
            }
            Err(e) => {
                warn!("Wishlist update for item {} failed, rolling back: {}", item.id, e);
                pending.rollback(&self.store);
                Err(WishlistError::Remote(e))
            }
        }
    }
}
