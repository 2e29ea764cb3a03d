//! Ordered custom link list for LinkHub.
//!
//! Custom links are stored as an unordered keyed collection with an integer
//! `position` per entry. This crate turns that collection into a
//! deterministic display order and plans position changes (neighbour swaps,
//! appends, renumbering after removal) as [`PositionPlan`]s that callers
//! submit as a single atomic write.
//!
//! Everything here is pure: no I/O, no shared state.

pub mod error;
pub mod order;
pub mod plan;

pub use error::{LinkError, Result};
pub use order::{ordered, Direction, LinkOrder, OrderedLink, Visibility};
pub use plan::PositionPlan;
