//! Foundation types for LinkHub.
//!
//! This crate provides the document model shared by every other LinkHub
//! crate: the typed [`Profile`] snapshot, identifiers, slash-delimited
//! [`DocPath`]s into the remote document store, atomic multi-path
//! [`Patch`]es, and the client-side validation rules applied before a write
//! ever leaves the process.
//!
//! # Key Types
//!
//! - [`Profile`] — Typed snapshot of one user's profile document
//! - [`CustomLink`] / [`LinkFields`] — A stored custom link and its editable fields
//! - [`ProfileId`] / [`LinkId`] — Path-safe identifiers
//! - [`DocPath`] — Slash-delimited path into the hierarchical store
//! - [`Patch`] — Atomic path → value (or delete) write set
//! - [`SocialProvider`] — Catalog of supported social link providers

pub mod error;
pub mod ids;
pub mod patch;
pub mod path;
pub mod profile;
pub mod social;
pub mod validation;

pub use error::{Result, TypeError, ValidationError};
pub use ids::{LinkId, ProfileId};
pub use patch::Patch;
pub use path::DocPath;
pub use profile::{
    decode_bio, decode_custom_links, encode_bio, Customizations, CustomLink, LinkFields, Links,
    Profile, ThemeSettings, DEFAULT_BASE_THEME,
};
pub use social::SocialProvider;
