//! Client-side state for the nukesul storefront and back-office.
//!
//! Owns everything a browser client would keep in memory or local storage:
//! the cart, the admin token, the catalog browser's phase and the admin
//! console's forms. Persistence goes through [`KeyValueStore`] so tests can
//! swap in [`MemoryStore`].

pub mod admin;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod error;
pub mod persistence;
pub mod scroll_spy;

pub use admin::{AdminConsole, AdminGate, AdminOptions, AdminTab};
pub use auth::AuthSession;
pub use cart::Cart;
pub use catalog::{BrowserOptions, CatalogBrowser, CheckoutBadge, Phase, SizeOption};
pub use error::StoreError;
pub use persistence::{keys, FileStore, KeyValueStore, MemoryStore};
pub use scroll_spy::SectionBox;
