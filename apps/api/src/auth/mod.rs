//! Authentication and authorization.
//!
//! Tokens are opaque bearer strings; only their SHA-256 digest is stored.
//! Every handler resolves its caller through one of the extractors in
//! `extractor` and then applies the rules in `permissions`.

mod crypto;
pub mod extractor;
pub mod handlers;
pub mod password;
pub mod permissions;
pub mod session;

pub use crypto::{hash_password, verify_password};
pub use extractor::{AdminUser, AuthUser, MaybeUser};
