//! Spice Hub client library.
//!
//! Everything the web frontends and the CLI need to talk to the outside:
//!
//! - [`ApiClient`] - typed REST client with bearer-token forwarding
//! - [`IdentityClient`] - GoTrue-compatible sign-in, sign-up, and lookup
//! - [`ensure_backend_user`] - mirror identity users into the backend
//! - [`GuestCart`] / [`GuestWishlist`] - local collections of guest shoppers
//! - [`CartStore`] / [`WishlistStore`] - state holders that re-fetch after
//!   every mutation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod error;
pub mod guest;
pub mod identity;
pub mod stores;
pub mod sync;

pub use api::ApiClient;
pub use error::ClientError;
pub use guest::{GuestCart, GuestCartEntry, GuestWishlist};
pub use identity::{
    AuthSession, IdentityClient, IdentityUser, SessionTokens, SignUp, UserMetadata,
};
pub use stores::{CartLine, CartStore, WishlistStore};
pub use sync::{ensure_backend_user, new_user_from_identity};
