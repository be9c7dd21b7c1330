//! Wishlist Entities
//!
//! A user's saved items, in insertion order, with no repeated item identifier.

use serde::{Deserialize, Serialize};

use super::item::{Item, ItemId};
use super::user::UserId;

/// A saved item, denormalized for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    #[serde(rename = "id", alias = "_id")]
    pub item_id: ItemId,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub thumbnail: Option<String>,
}

impl WishlistEntry {
    pub fn from_item(item: &Item) -> Self {
        Self {
            item_id: item.id.clone(),
            name: item.name.clone(),
            price: item.price,
            thumbnail: item.thumbnail.clone(),
        }
    }
}

impl From<&Item> for WishlistEntry {
    fn from(item: &Item) -> Self {
        Self::from_item(item)
    }
}

/// Ordered set of entries belonging to one user
#[derive(Debug, Clone, PartialEq)]
pub struct Wishlist {
    user_id: UserId,
    entries: Vec<WishlistEntry>,
}

impl Wishlist {
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            entries: Vec::new(),
        }
    }

    /// Build from a remote listing; later duplicates of an identifier are dropped
    pub fn from_entries(user_id: UserId, entries: impl IntoIterator<Item = WishlistEntry>) -> Self {
        let mut wishlist = Self::empty(user_id);
        for entry in entries {
            wishlist.insert(entry);
        }
        wishlist
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item_id: &ItemId) -> bool {
        self.position(item_id).is_some()
    }

    pub fn position(&self, item_id: &ItemId) -> Option<usize> {
        self.entries.iter().position(|e| &e.item_id == item_id)
    }

    pub fn get(&self, item_id: &ItemId) -> Option<&WishlistEntry> {
        self.entries.iter().find(|e| &e.item_id == item_id)
    }

    /// Append unless already present. Returns whether the list changed.
    pub(crate) fn insert(&mut self, entry: WishlistEntry) -> bool {
        if self.contains(&entry.item_id) {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Insert at `index` (clamped) unless already present
    pub(crate) fn insert_at(&mut self, index: usize, entry: WishlistEntry) -> bool {
        if self.contains(&entry.item_id) {
            return false;
        }
        let index = index.min(self.entries.len());
        self.entries.insert(index, entry);
        true
    }

    /// Remove by identifier, returning the former position and entry
    pub(crate) fn remove(&mut self, item_id: &ItemId) -> Option<(usize, WishlistEntry)> {
        let index = self.position(item_id)?;
        Some((index, self.entries.remove(index)))
    }
}

/// What the UI sees when it asks for the wishlist
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WishlistState {
    /// No authenticated user
    #[default]
    SignedOut,
    /// Initial fetch for the user is outstanding
    Loading { user_id: UserId },
    /// Initial fetch failed; a reload may recover
    Failed { user_id: UserId, message: String },
    /// Loaded, possibly carrying unconfirmed optimistic changes
    Ready(Wishlist),
}

impl WishlistState {
    pub fn wishlist(&self) -> Option<&Wishlist> {
        match self {
            WishlistState::Ready(w) => Some(w),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, WishlistState::Ready(_))
    }

    /// Authenticated user this state belongs to
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            WishlistState::SignedOut => None,
            WishlistState::Loading { user_id } | WishlistState::Failed { user_id, .. } => Some(user_id),
            WishlistState::Ready(w) => Some(w.user_id()),
        }
    }

    /// Number of saved items; zero until loaded
    pub fn count(&self) -> usize {
        self.wishlist().map_or(0, Wishlist::count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str) -> WishlistEntry {
        WishlistEntry::from_item(&Item::new(id, format!("Item {}", id), 10.0))
    }

    #[test]
    fn test_from_entries_drops_duplicates() {
        let w = Wishlist::from_entries(
            UserId::from("u1"),
            vec![entry("a"), entry("b"), entry("a")],
        );
        assert_eq!(w.count(), 2);
        assert_eq!(w.entries()[0].item_id.as_str(), "a");
        assert_eq!(w.entries()[1].item_id.as_str(), "b");
    }

    #[test]
    fn test_insert_is_idempotent() {
        let mut w = Wishlist::empty(UserId::from("u1"));
        assert!(w.insert(entry("a")));
        assert!(!w.insert(entry("a")));
        assert_eq!(w.count(), 1);
    }

    #[test]
    fn test_remove_reports_position() {
        let mut w = Wishlist::from_entries(UserId::from("u1"), vec![entry("a"), entry("b"), entry("c")]);
        let (index, removed) = w.remove(&ItemId::from("b")).unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.item_id.as_str(), "b");
        assert!(w.remove(&ItemId::from("b")).is_none());
    }

    #[test]
    fn test_insert_at_clamps() {
        let mut w = Wishlist::from_entries(UserId::from("u1"), vec![entry("a")]);
        assert!(w.insert_at(5, entry("b")));
        assert!(w.insert_at(0, entry("c")));
        let ids: Vec<_> = w.entries().iter().map(|e| e.item_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_state_markers() {
        let loading = WishlistState::Loading { user_id: UserId::from("u1") };
        assert!(!loading.is_loaded());
        assert_eq!(loading.count(), 0);
        assert_eq!(loading.user_id(), Some(&UserId::from("u1")));
        assert_eq!(WishlistState::default(), WishlistState::SignedOut);

        let ready = WishlistState::Ready(Wishlist::empty(UserId::from("u1")));
        assert!(ready.is_loaded());
        assert_ne!(ready, loading);
    }

    #[test]
    fn test_entry_wire_format() {
        let e: WishlistEntry = serde_json::from_str(r#"{"_id": "x1", "name": "Lamp", "price": 5.0, "condition": "new"}"#).unwrap();
        assert_eq!(e.item_id.as_str(), "x1");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["id"], "x1");
    }
}
