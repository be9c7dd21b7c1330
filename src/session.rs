//! Session Lifecycle
//!
//! Loads the wishlist when a user signs in (or a saved session is restored)
//! and clears it on sign-out. Fetch results that arrive after a newer fetch,
//! a local change, or a session change are dropped.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::domain::{RemoteError, UserId, Wishlist, WishlistError, WishlistState};
use crate::remote::{with_timeout, RemoteStore};
use crate::store::{SessionToken, WishlistStore};

/// Accessor for the authenticated user, provided by the auth flow
pub trait SessionSource: Send + Sync {
    fn current_user(&self) -> Option<UserId>;
}

impl SessionSource for Option<UserId> {
    fn current_user(&self) -> Option<UserId> {
        self.clone()
    }
}

/// Whether a fetch result reached the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// Something newer happened while the fetch was outstanding
    Superseded,
}

pub struct SessionBinding {
    store: Arc<WishlistStore>,
    remote: Arc<dyn RemoteStore>,
    timeout: Duration,
}

impl SessionBinding {
    pub fn new(store: Arc<WishlistStore>, remote: Arc<dyn RemoteStore>, timeout: Duration) -> Self {
        Self { store, remote, timeout }
    }

    /// Sign-in or session restore: show loading, then the fetched wishlist
    pub async fn establish(&self, user_id: UserId) -> Result<LoadOutcome, WishlistError> {
        info!("Starting wishlist session for user {}", user_id);
        let session = self.store.begin_session(user_id.clone());
        self.load(session, user_id).await
    }

    /// Fetch again for the current user, keeping the current snapshot visible
    pub async fn reload(&self) -> Result<LoadOutcome, WishlistError> {
        let user_id = self.store.current_user().ok_or(WishlistError::NotLoaded)?;
        self.load(self.store.session(), user_id).await
    }

    /// Sign-out
    pub fn end(&self) {
        if let Some(user_id) = self.store.current_user() {
            info!("Ending wishlist session for user {}", user_id);
        }
        self.store.reset();
    }

    /// Follow the auth flow: start, switch or end the session to match `source`.
    /// A failed load for the same user is retried. Returns `None` when nothing
    /// had to be loaded.
    pub async fn sync(&self, source: &dyn SessionSource) -> Result<Option<LoadOutcome>, WishlistError> {
        match (source.current_user(), self.store.current_user()) {
            (Some(next), Some(current)) if next == current => {
                if self.store.read(|s| matches!(s, WishlistState::Failed { .. })) {
                    self.reload().await.map(Some)
                } else {
                    Ok(None)
                }
            }
            (Some(next), _) => self.establish(next).await.map(Some),
            (None, Some(_)) => {
                self.end();
                Ok(None)
            }
            (None, None) => Ok(None),
        }
    }

    async fn load(&self, session: SessionToken, user_id: UserId) -> Result<LoadOutcome, WishlistError> {
        let Some(ticket) = self.store.begin_fetch(session) else {
            return Ok(LoadOutcome::Superseded);
        };

        let fetched = match with_timeout(self.timeout, self.remote.fetch_wishlist(&user_id)).await {
            Err(RemoteError::NotFound(_)) => Ok(Wishlist::empty(user_id.clone())),
            other => other,
        };

        match fetched {
            Ok(wishlist) => {
                let count = wishlist.count();
                if self.store.complete_fetch(ticket, wishlist) {
                    debug!("Loaded {} wishlist entries for user {}", count, user_id);
                    Ok(LoadOutcome::Applied)
                } else {
                    debug!("Dropped stale wishlist fetch for user {}", user_id);
                    Ok(LoadOutcome::Superseded)
                }
            }
            Err(e) => {
                if !self.store.is_fresh(&ticket) {
                    debug!("Ignoring failure of stale wishlist fetch for user {}: {}", user_id, e);
                    return Ok(LoadOutcome::Superseded);
                }
                warn!("Failed to load wishlist for user {}: {}", user_id, e);
                self.store.fail_fetch(ticket, e.to_string());
                Err(WishlistError::Remote(e))
            }
        }
    }
}
