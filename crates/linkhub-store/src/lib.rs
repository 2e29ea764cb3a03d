//! Hierarchical document store for LinkHub.
//!
//! The remote store is a JSON tree addressed by slash-delimited paths. It
//! supports whole-subtree reads, atomic multi-path patches, subtree
//! subscriptions that re-deliver the full subtree after every write touching
//! it, and store-generated child keys.
//!
//! # Modules
//!
//! - [`error`] — Error types for store operations
//! - [`traits`] — The [`DocumentStore`] trait and the [`Subscription`] handle
//! - [`tree`] — Pure path operations over a `serde_json::Value` tree
//! - [`memory`] — In-memory [`InMemoryDocumentStore`] with JSON persistence

pub mod error;
pub mod memory;
pub mod traits;
pub mod tree;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryDocumentStore;
pub use traits::{DocumentStore, Subscription};
