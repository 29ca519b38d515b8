//! Change-event system: typed mutation events plus the broadcaster that
//! decouples store mutations from relay delivery.

mod broadcaster;
mod types;

pub use broadcaster::EventBroadcaster;
pub use types::{ChangeAction, ChangeEvent, EntityRecord};
