//! Wishlist Store
//!
//! The single in-memory copy of what the UI shows as wishlisted. Observers
//! subscribe through a watch channel and see every change before the mutating
//! call returns. Reads and writes never suspend.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use crate::domain::{ItemId, UserId, Wishlist, WishlistEntry, WishlistState};

/// Identifies one authenticated session; bumped on every login and logout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionToken(u64);

/// Issued when a fetch starts; its result only lands if nothing newer happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    session: SessionToken,
    seq: u64,
    revision: u64,
}

impl FetchTicket {
    pub fn session(&self) -> SessionToken {
        self.session
    }
}

/// An optimistic change whose remote call has not finished
#[derive(Debug, Clone)]
enum PendingChange {
    Add(WishlistEntry),
    Remove(ItemId),
}

impl PendingChange {
    fn item_id(&self) -> &ItemId {
        match self {
            PendingChange::Add(entry) => &entry.item_id,
            PendingChange::Remove(item_id) => item_id,
        }
    }

    fn replay(&self, wishlist: &mut Wishlist) {
        match self {
            PendingChange::Add(entry) => {
                wishlist.insert(entry.clone());
            }
            PendingChange::Remove(item_id) => {
                wishlist.remove(item_id);
            }
        }
    }
}

#[derive(Default)]
struct Tokens {
    session: u64,
    latest_fetch: u64,
    /// Bumped on every change to the visible state
    revision: u64,
    /// In application order
    pending: Vec<PendingChange>,
}

impl Tokens {
    fn untrack(&mut self, item_id: &ItemId) {
        self.pending.retain(|change| change.item_id() != item_id);
    }

    fn next_session(&mut self) -> u64 {
        self.session += 1;
        self.revision += 1;
        self.pending.clear();
        self.session
    }
}

pub struct WishlistStore {
    state: watch::Sender<WishlistState>,
    tokens: Mutex<Tokens>,
}

impl Default for WishlistStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WishlistStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(WishlistState::SignedOut);
        Self {
            state,
            tokens: Mutex::new(Tokens::default()),
        }
    }

    fn tokens(&self) -> MutexGuard<'_, Tokens> {
        self.tokens.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ========================
    // Reads
    // ========================

    /// Current snapshot
    pub fn get(&self) -> WishlistState {
        self.state.borrow().clone()
    }

    /// Inspect the snapshot without cloning it
    pub fn read<R>(&self, f: impl FnOnce(&WishlistState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub fn count(&self) -> usize {
        self.read(WishlistState::count)
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.read(|s| s.user_id().cloned())
    }

    pub fn subscribe(&self) -> watch::Receiver<WishlistState> {
        self.state.subscribe()
    }

    pub fn session(&self) -> SessionToken {
        SessionToken(self.tokens().session)
    }

    // ========================
    // Local Mutations
    // ========================

    /// Atomic swap to a loaded wishlist
    pub fn replace(&self, wishlist: Wishlist) {
        let mut tokens = self.tokens();
        tokens.revision += 1;
        self.state.send_replace(WishlistState::Ready(wishlist));
    }

    /// Append an entry; no-op if present or not loaded. Returns whether it changed.
    pub fn apply_add(&self, entry: WishlistEntry) -> bool {
        let mut tokens = self.tokens();
        self.modify(&mut tokens, |w| w.insert(entry))
    }

    /// Drop an entry; no-op if absent or not loaded. Returns its former slot.
    pub fn apply_remove(&self, item_id: &ItemId) -> Option<(usize, WishlistEntry)> {
        let mut tokens = self.tokens();
        let mut removed = None;
        self.modify(&mut tokens, |w| {
            removed = w.remove(item_id);
            removed.is_some()
        });
        removed
    }

    /// Add ahead of the remote call. Fetches that land before `settle` keep the entry.
    pub(crate) fn optimistic_add(&self, entry: WishlistEntry) -> bool {
        let mut tokens = self.tokens();
        tokens.untrack(&entry.item_id);
        tokens.pending.push(PendingChange::Add(entry.clone()));
        self.modify(&mut tokens, |w| w.insert(entry))
    }

    /// Remove ahead of the remote call; nothing is tracked when the entry is absent
    pub(crate) fn optimistic_remove(&self, item_id: &ItemId) -> Option<(usize, WishlistEntry)> {
        let mut tokens = self.tokens();
        let mut removed = None;
        self.modify(&mut tokens, |w| {
            removed = w.remove(item_id);
            removed.is_some()
        });
        if removed.is_some() {
            tokens.untrack(item_id);
            tokens.pending.push(PendingChange::Remove(item_id.clone()));
        }
        removed
    }

    /// The remote call for this item finished; stop replaying its change
    pub(crate) fn settle(&self, item_id: &ItemId) {
        self.tokens().untrack(item_id);
    }

    #[cfg(test)]
    pub(crate) fn pending_count(&self) -> usize {
        self.tokens().pending.len()
    }

    /// Undo an optimistic add, unless the session has moved on
    pub(crate) fn revert_add(&self, session: SessionToken, item_id: &ItemId) -> bool {
        let mut tokens = self.tokens();
        if tokens.session != session.0 {
            return false;
        }
        tokens.untrack(item_id);
        self.modify(&mut tokens, |w| w.remove(item_id).is_some())
    }

    /// Undo an optimistic remove at its former slot, unless the session has moved on
    pub(crate) fn revert_remove(&self, session: SessionToken, position: usize, entry: WishlistEntry) -> bool {
        let mut tokens = self.tokens();
        if tokens.session != session.0 {
            return false;
        }
        tokens.untrack(&entry.item_id);
        self.modify(&mut tokens, |w| w.insert_at(position, entry))
    }

    fn modify(&self, tokens: &mut Tokens, f: impl FnOnce(&mut Wishlist) -> bool) -> bool {
        let changed = self.state.send_if_modified(|state| match state {
            WishlistState::Ready(w) => f(w),
            _ => false,
        });
        if changed {
            tokens.revision += 1;
        }
        changed
    }

    // ========================
    // Session Lifecycle
    // ========================

    /// Start a session for `user_id`; the state reads as loading until a fetch lands
    pub(crate) fn begin_session(&self, user_id: UserId) -> SessionToken {
        let mut tokens = self.tokens();
        let session = tokens.next_session();
        self.state.send_replace(WishlistState::Loading { user_id });
        SessionToken(session)
    }

    /// Back to signed out; outstanding fetches and mutations become stale
    pub fn reset(&self) {
        let mut tokens = self.tokens();
        tokens.next_session();
        self.state.send_replace(WishlistState::SignedOut);
    }

    /// Register a fetch for the given session. A failed initial load goes back to loading.
    pub(crate) fn begin_fetch(&self, session: SessionToken) -> Option<FetchTicket> {
        let mut tokens = self.tokens();
        if tokens.session != session.0 {
            return None;
        }
        let changed = self.state.send_if_modified(|state| match state {
            WishlistState::Failed { user_id, .. } => {
                *state = WishlistState::Loading { user_id: user_id.clone() };
                true
            }
            _ => false,
        });
        if changed {
            tokens.revision += 1;
        }
        tokens.latest_fetch += 1;
        Some(FetchTicket {
            session,
            seq: tokens.latest_fetch,
            revision: tokens.revision,
        })
    }

    /// Land a fetch result if the ticket is still the newest and nothing changed since.
    /// Optimistic changes still in flight are replayed on top of it.
    pub(crate) fn complete_fetch(&self, ticket: FetchTicket, mut wishlist: Wishlist) -> bool {
        let mut tokens = self.tokens();
        if !is_current(&tokens, &ticket) {
            return false;
        }
        for change in &tokens.pending {
            change.replay(&mut wishlist);
        }
        tokens.revision += 1;
        self.state.send_replace(WishlistState::Ready(wishlist));
        true
    }

    /// Whether a result for this ticket would still land
    pub(crate) fn is_fresh(&self, ticket: &FetchTicket) -> bool {
        is_current(&self.tokens(), ticket)
    }

    /// Record a failed initial load. A failed reload keeps the loaded snapshot.
    pub(crate) fn fail_fetch(&self, ticket: FetchTicket, message: String) -> bool {
        let mut tokens = self.tokens();
        if !is_current(&tokens, &ticket) {
            return false;
        }
        let changed = self.state.send_if_modified(|state| match state {
            WishlistState::Loading { user_id } => {
                *state = WishlistState::Failed {
                    user_id: user_id.clone(),
                    message,
                };
                true
            }
            _ => false,
        });
        if changed {
            tokens.revision += 1;
        }
        changed
    }
}

fn is_current(tokens: &Tokens, ticket: &FetchTicket) -> bool {
    tokens.session == ticket.session.0
        && tokens.latest_fetch == ticket.seq
        && tokens.revision == ticket.revision
}
