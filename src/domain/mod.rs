//! Domain types shared by the cache, the account workflows and the API.

pub mod comics;
pub mod credentials;
pub mod error;
pub mod wishlist;
