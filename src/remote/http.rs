//! HTTP Remote Store
//!
//! JSON-over-HTTP client for the storefront REST API.

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::WishlistConfig;
use crate::domain::{
    Item, ItemId, RemoteError, RemoteResult, User, UserId, Wishlist, WishlistEntry,
};
use super::traits::RemoteStore;

/// Unreserved URL characters stay as-is inside a path segment
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

// ========================
// Wire Structs
// ========================

#[derive(Deserialize)]
struct WishlistBody {
    #[serde(default)]
    items: Vec<WishlistEntry>,
}

#[derive(Deserialize)]
struct WishlistResponse {
    wishlist: Option<WishlistBody>,
}

#[derive(Deserialize)]
struct ItemResponse {
    item: Item,
}

#[derive(Deserialize)]
struct UserResponse {
    user: User,
}

#[derive(Serialize)]
struct AddItemArgs<'a> {
    #[serde(rename = "itemId")]
    item_id: &'a ItemId,
}

// ========================
// Client
// ========================

pub struct HttpRemoteStore {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
}

impl HttpRemoteStore {
    pub fn new(config: &WishlistConfig) -> RemoteResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| RemoteError::Network(format!("Failed to build client: {}", e)))?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_token: config.auth_token.clone(),
        })
    }

    fn url(&self, segments: &[&str]) -> String {
        build_url(&self.base_url, segments)
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match &self.auth_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }
}

fn build_url(base_url: &str, segments: &[&str]) -> String {
    let mut url = base_url.to_string();
    for segment in segments {
        url.push('/');
        url.extend(utf8_percent_encode(segment, SEGMENT));
    }
    url
}

/// Map a non-success status to the remote error taxonomy
fn classify(status: StatusCode, what: &str) -> RemoteError {
    match status {
        StatusCode::NOT_FOUND => RemoteError::NotFound(what.to_string()),
        StatusCode::CONFLICT => RemoteError::Conflict(what.to_string()),
        other => RemoteError::Network(format!("{} returned {}", what, other)),
    }
}

async fn send(builder: RequestBuilder, what: &str) -> RemoteResult<Response> {
    let response = builder
        .send()
        .await
        .map_err(|e| RemoteError::Network(format!("{}: {}", what, e)))?;
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(classify(response.status(), what))
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response, what: &str) -> RemoteResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| RemoteError::Network(format!("{}: invalid response: {}", what, e)))
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn fetch_wishlist(&self, user_id: &UserId) -> RemoteResult<Wishlist> {
        let what = format!("wishlist of user {}", user_id);
        let url = self.url(&["wishlist", user_id.as_str()]);
        match send(self.request(Method::GET, url), &what).await {
            Ok(response) => {
                let body: WishlistResponse = decode(response, &what).await?;
                let entries = body.wishlist.map(|w| w.items).unwrap_or_default();
                Ok(Wishlist::from_entries(user_id.clone(), entries))
            }
            Err(RemoteError::NotFound(_)) => Ok(Wishlist::empty(user_id.clone())),
            Err(e) => Err(e),
        }
    }

    async fn add_item(&self, user_id: &UserId, item: &Item) -> RemoteResult<()> {
        let what = format!("add item {} for user {}", item.id, user_id);
        let url = self.url(&["wishlist", user_id.as_str(), "items"]);
        let request = self
            .request(Method::POST, url)
            .json(&AddItemArgs { item_id: &item.id });
        match send(request, &what).await {
            Ok(_) | Err(RemoteError::Conflict(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn remove_item(&self, user_id: &UserId, item_id: &ItemId) -> RemoteResult<()> {
        let what = format!("remove item {} for user {}", item_id, user_id);
        let url = self.url(&["wishlist", user_id.as_str(), "items", item_id.as_str()]);
        match send(self.request(Method::DELETE, url), &what).await {
            Ok(_) | Err(RemoteError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    async fn get_item(&self, item_id: &ItemId) -> RemoteResult<Item> {
        let what = format!("item {}", item_id);
        let url = self.url(&["items", item_id.as_str()]);
        let response = send(self.request(Method::GET, url), &what).await?;
        let body: ItemResponse = decode(response, &what).await?;
        Ok(body.item)
    }

    async fn get_user(&self, user_id: &UserId) -> RemoteResult<User> {
        let what = format!("user {}", user_id);
        let url = self.url(&["users", user_id.as_str()]);
        let response = send(self.request(Method::GET, url), &what).await?;
        let body: UserResponse = decode(response, &what).await?;
        Ok(body.user)
    }
}
