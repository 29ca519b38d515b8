//! # rsvpd-store
//!
//! The registration store for rsvpd: an in-memory owner of the registrant,
//! waitlist and invite collections with capacity-checked mutations, a
//! durable JSON snapshot behind a [`SnapshotStore`] trait, and change-event
//! emission for the sync relay.
//!
//! ## Overview
//!
//! All mutations flow through [`RegistrationStore`]:
//! - `register` / `add_to_waitlist` / `add_invite` for public submissions
//! - `promote_waitlist` and the `move_*` family for admin moves
//! - `edit_registrant` (delete-then-reinsert, timestamp preserved)
//! - `delete_*` for removals
//!
//! Each successful mutation persists the snapshot before returning and then
//! publishes a [`rsvpd_core::ChangeEvent`] to the broadcaster; delivery to
//! external mirrors is someone else's job.

mod snapshot;
mod state;
mod store;

pub use snapshot::{FileSnapshotStore, NullSnapshotStore, SnapshotStore};
pub use state::{CohortBuckets, StoreSnapshot};
pub use store::{
    NewRegistrant, NewWaitlistEntry, RegistrantUpdate, RegistrationStore, SubmissionLimits,
};

/// Type alias for a shareable snapshot store instance.
pub type DynSnapshotStore = std::sync::Arc<dyn SnapshotStore>;
