//! Remote Store Layer
//!
//! Access to wishlist, item and user storage. Implementations hold no
//! wishlist state of their own beyond what the backing service keeps.

mod traits;
mod http;
mod memory;


pub use traits::{with_timeout, RemoteStore};
pub use http::HttpRemoteStore;
pub use memory::MemoryRemoteStore;
