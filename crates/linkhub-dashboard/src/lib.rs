//! The LinkHub dashboard engine.
//!
//! A [`Dashboard`] binds one profile document in a
//! [`DocumentStore`](linkhub_store::DocumentStore) to an editing session:
//!
//! - a change-filtered snapshot that only emits when the typed profile
//!   actually changes ([`LiveSnapshot`])
//! - a busy flag for the UI ([`BusyFlag`])
//! - the mutation command set ([`Mutation`]), each command one atomic write
//! - non-blocking [`Notice`]s when the store fails a command
//!
//! Profile creation and the read-only public projection live here too.

pub mod busy;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod notice;
pub mod profile;
pub mod session;
pub mod snapshot;
pub mod view;

pub use busy::{BusyFlag, BusyGuard};
pub use command::{Mutation, PlanContext, Planned};
pub use config::{DashboardConfig, RemovalPolicy};
pub use dashboard::{Dashboard, Receipt};
pub use error::{DashboardError, DashboardResult};
pub use notice::{Notice, NoticeLevel};
pub use profile::{create_profile, find_by_username, profile_path, NewProfile};
pub use session::Session;
pub use snapshot::{LiveSnapshot, Offer, SnapshotStream};
pub use view::{PublicProfile, SocialLinkView};
