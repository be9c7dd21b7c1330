//! Item Details
//!
//! Loads an item together with its seller's contact information.

use std::time::Duration;

use log::warn;

use crate::domain::{Item, ItemId, RemoteResult, User};
use crate::remote::{with_timeout, RemoteStore};

pub const SELLER_UNAVAILABLE: &str = "Seller information is not available";

#[derive(Debug, Clone, PartialEq)]
pub struct ItemDetails {
    pub item: Item,
    pub seller: Option<User>,
    /// Message to show in place of the seller section
    pub notice: Option<String>,
}

/// A missing item is an error; a missing seller only produces a notice
pub async fn load_item_details(
    remote: &dyn RemoteStore,
    item_id: &ItemId,
    timeout: Duration,
) -> RemoteResult<ItemDetails> {
    let item = with_timeout(timeout, remote.get_item(item_id)).await?;

    let Some(owner_id) = item.owner_id.clone() else {
        return Ok(ItemDetails {
            item,
            seller: None,
            notice: Some(SELLER_UNAVAILABLE.to_string()),
        });
    };

    match with_timeout(timeout, remote.get_user(&owner_id)).await {
        Ok(seller) => Ok(ItemDetails {
            item,
            seller: Some(seller),
            notice: None,
        }),
        Err(e) => {
            warn!("Seller {} of item {} unavailable: {}", owner_id, item_id, e);
            Ok(ItemDetails {
                item,
                seller: None,
                notice: Some(SELLER_UNAVAILABLE.to_string()),
            })
        }
    }
}
