//! Theme resolution for LinkHub.
//!
//! A profile stores only a base theme name and a few overrides. This crate
//! owns the catalog of named themes and button presets and turns a
//! profile's [`ThemeSettings`](linkhub_types::ThemeSettings) into the
//! concrete [`ResolvedTheme`] a renderer paints.
//!
//! # Key Types
//!
//! - [`ThemeCatalog`] — Named base themes plus button presets, built-in or loaded from TOML
//! - [`ThemeResolver`] — Overlays customizations on a base theme
//! - [`ResolvedTheme`] — The derived style; never persisted

pub mod catalog;
pub mod error;
pub mod model;
pub mod resolver;

pub use catalog::ThemeCatalog;
pub use error::{Result, ThemeError};
pub use model::{
    Background, ButtonPreset, ButtonRow, CoverType, HoverStyle, LinkStyle, ResolvedTheme,
    Rounding, Shadow, Theme, TRANSPARENT,
};
pub use resolver::{apply_button, ThemeResolver};
