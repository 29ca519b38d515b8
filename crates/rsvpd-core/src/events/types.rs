//! Change events emitted by the registration store.
//!
//! Every successful mutation produces one event (edits produce two: a delete
//! followed by a new). The relay drains these from the broadcaster and
//! mirrors them outward; nothing in the mutation path waits on delivery.

use crate::entities::{EntityKind, InviteEntry, RecordKey, Registrant, WaitlistEntry};
use crate::time::{self, Timestamp};
use serde::{Deserialize, Serialize};

/// Action carried by a change event; `as_str` is the wire `action` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    New,
    BulkExport,
    MoveToWaitlist,
    MoveToInvite,
    MoveToRegistrant,
    Delete,
}

impl ChangeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAction::New => "new",
            ChangeAction::BulkExport => "bulk_export",
            ChangeAction::MoveToWaitlist => "move_to_waitlist",
            ChangeAction::MoveToInvite => "move_to_invite",
            ChangeAction::MoveToRegistrant => "move_to_registrant",
            ChangeAction::Delete => "delete",
        }
    }
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A typed record attached to a change event.
///
/// For moves the record is in its destination form (a promotion carries the
/// new registrant, not the old waitlist entry); `kind` on the event names
/// the source collection the action applies to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "lowercase")]
pub enum EntityRecord {
    Registrant(Registrant),
    Waitlist(WaitlistEntry),
    Invite(InviteEntry),
}

impl EntityRecord {
    pub fn email(&self) -> &str {
        match self {
            EntityRecord::Registrant(r) => &r.email,
            EntityRecord::Waitlist(w) => &w.email,
            EntityRecord::Invite(i) => &i.email,
        }
    }
}

/// Event representing one mutation of the registration store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Source collection the action applies to.
    pub kind: EntityKind,
    pub action: ChangeAction,
    /// Affected records; one for ordinary mutations, the full collection
    /// for bulk exports.
    pub records: Vec<EntityRecord>,
    /// Identity in the source collection, for moves and deletes.
    pub source_key: Option<RecordKey>,
    /// Identity in the destination collection, for moves.
    pub dest_key: Option<RecordKey>,
    pub timestamp: Timestamp,
}

impl ChangeEvent {
    pub fn new(kind: EntityKind, action: ChangeAction, records: Vec<EntityRecord>) -> Self {
        Self {
            kind,
            action,
            records,
            source_key: None,
            dest_key: None,
            timestamp: time::now_utc(),
        }
    }

    /// Create a "new record" event.
    pub fn created(kind: EntityKind, record: EntityRecord) -> Self {
        Self::new(kind, ChangeAction::New, vec![record])
    }

    /// Create a "record deleted" event.
    pub fn deleted(kind: EntityKind, record: EntityRecord, key: RecordKey) -> Self {
        Self::new(kind, ChangeAction::Delete, vec![record]).with_source(key)
    }

    /// Create a move event carrying the record in destination form.
    pub fn moved(
        kind: EntityKind,
        action: ChangeAction,
        record: EntityRecord,
        source_key: RecordKey,
        dest_key: Option<RecordKey>,
    ) -> Self {
        let mut event = Self::new(kind, action, vec![record]).with_source(source_key);
        event.dest_key = dest_key;
        event
    }

    /// Create a bulk-export event over a whole collection.
    pub fn bulk_export(kind: EntityKind, records: Vec<EntityRecord>) -> Self {
        Self::new(kind, ChangeAction::BulkExport, records)
    }

    pub fn with_source(mut self, key: RecordKey) -> Self {
        self.source_key = Some(key);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cohort::Cohort;
    use std::str::FromStr;

    fn invite() -> InviteEntry {
        InviteEntry {
            name: "Ada Example".into(),
            email: "ada@example.com".into(),
            requested_at: Timestamp::from_str("2026-01-10T12:00:00Z").unwrap(),
        }
    }

    #[test]
    fn test_action_wire_names() {
        assert_eq!(ChangeAction::New.as_str(), "new");
        assert_eq!(ChangeAction::BulkExport.as_str(), "bulk_export");
        assert_eq!(ChangeAction::MoveToWaitlist.as_str(), "move_to_waitlist");
        assert_eq!(ChangeAction::MoveToInvite.as_str(), "move_to_invite");
        assert_eq!(
            ChangeAction::MoveToRegistrant.as_str(),
            "move_to_registrant"
        );
        assert_eq!(ChangeAction::Delete.as_str(), "delete");
    }

    #[test]
    fn test_action_serde_matches_as_str() {
        for action in [
            ChangeAction::New,
            ChangeAction::BulkExport,
            ChangeAction::MoveToWaitlist,
            ChangeAction::MoveToInvite,
            ChangeAction::MoveToRegistrant,
            ChangeAction::Delete,
        ] {
            let json = serde_json::to_string(&action).unwrap();
            assert_eq!(json, format!("\"{}\"", action.as_str()));
        }
    }

    #[test]
    fn test_created_event() {
        let event = ChangeEvent::created(EntityKind::Invite, EntityRecord::Invite(invite()));
        assert_eq!(event.kind, EntityKind::Invite);
        assert_eq!(event.action, ChangeAction::New);
        assert_eq!(event.records.len(), 1);
        assert!(event.source_key.is_none());
        assert!(event.dest_key.is_none());
    }

    #[test]
    fn test_moved_event_carries_both_keys() {
        let record = EntityRecord::Registrant(Registrant {
            name: "Ada Example".into(),
            email: "ada@example.com".into(),
            phone: None,
            professional_title: None,
            bio: "Writes.".into(),
            food_allergies: None,
            photo: None,
            cohort: Cohort::A,
            event_id: "date1".into(),
            submitted_at: Timestamp::from_str("2026-02-01T09:00:00Z").unwrap(),
            moved_from_waitlist: true,
        });
        let source = RecordKey::new(
            "ada@example.com",
            Timestamp::from_str("2026-01-10T12:00:00Z").unwrap(),
        );
        let dest = RecordKey::new(
            "ada@example.com",
            Timestamp::from_str("2026-02-01T09:00:00Z").unwrap(),
        );
        let event = ChangeEvent::moved(
            EntityKind::Waitlist,
            ChangeAction::MoveToRegistrant,
            record,
            source.clone(),
            Some(dest.clone()),
        );
        assert_eq!(event.source_key, Some(source));
        assert_eq!(event.dest_key, Some(dest));
        assert_eq!(event.kind, EntityKind::Waitlist);
    }

    #[test]
    fn test_event_serde_roundtrip() {
        let event = ChangeEvent::created(EntityKind::Invite, EntityRecord::Invite(invite()));
        let json = serde_json::to_string(&event).unwrap();
        let parsed: ChangeEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.kind, EntityKind::Invite);
        assert_eq!(parsed.records[0].email(), "ada@example.com");
    }
}
