pub mod capacity;
pub mod catalog;
pub mod classifier;
pub mod cohort;
pub mod entities;
pub mod error;
pub mod events;
pub mod time;

pub use capacity::{CapacityPlanner, OccurrenceAvailability};
pub use catalog::{EventCatalog, EventOccurrence};
pub use classifier::{Publication, PublicationClassifier};
pub use cohort::{Cohort, CohortCounts};
pub use entities::{
    EntityKind, InviteEntry, RecordKey, Registrant, WaitlistEntry, word_count,
};
pub use error::{CoreError, ErrorCategory, Result};
pub use events::{ChangeAction, ChangeEvent, EntityRecord, EventBroadcaster};
pub use crate::time::{Timestamp, now_utc};
