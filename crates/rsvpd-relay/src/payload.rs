//! Wire payload construction.
//!
//! One generic mapping per entity kind replaces the per-collection
//! handler duplication of older relay implementations: every event,
//! whatever its source, renders to the same envelope
//! `{type, action, data, exportDate, totalCount}`.

use rsvpd_core::{
    ChangeEvent, EntityRecord, EventCatalog, InviteEntry, Registrant, WaitlistEntry, now_utc,
};
use serde_json::{Value, json};

/// Render a registrant in its outbound form. `photo_link` is the already
/// resolved URL (or empty string) replacing the raw photo payload.
pub fn registrant_wire(r: &Registrant, catalog: &EventCatalog, photo_link: &str) -> Value {
    json!({
        "name": r.name,
        "email": r.email,
        "phone": r.phone.as_deref().unwrap_or(""),
        "professionalTitle": r.professional_title.as_deref().unwrap_or(""),
        "bio": r.bio,
        "foodAllergies": r.food_allergies.as_deref().unwrap_or(""),
        "date": catalog.label_for(&r.event_id),
        "location": catalog.get(&r.event_id).map(|o| o.location.clone()).unwrap_or_default(),
        "dateId": r.event_id,
        "group": r.cohort,
        "timestamp": r.submitted_at,
        "photoLink": photo_link,
    })
}

pub fn waitlist_wire(w: &WaitlistEntry, photo_link: &str) -> Value {
    json!({
        "name": w.name,
        "email": w.email,
        "phone": w.phone.as_deref().unwrap_or(""),
        "professionalTitle": w.professional_title.as_deref().unwrap_or(""),
        "bio": w.bio,
        "foodAllergies": w.food_allergies.as_deref().unwrap_or(""),
        "classification": w.cohort,
        "preferredDates": w.preferred_events,
        "timestamp": w.added_at,
        "photoLink": photo_link,
    })
}

pub fn invite_wire(i: &InviteEntry) -> Value {
    json!({
        "name": i.name,
        "email": i.email,
        "timestamp": i.requested_at,
    })
}

/// Render one record with its resolved photo link.
pub fn record_wire(record: &EntityRecord, catalog: &EventCatalog, photo_link: &str) -> Value {
    match record {
        EntityRecord::Registrant(r) => registrant_wire(r, catalog, photo_link),
        EntityRecord::Waitlist(w) => waitlist_wire(w, photo_link),
        EntityRecord::Invite(i) => invite_wire(i),
    }
}

/// The outbound envelope for one change event.
pub fn envelope(event: &ChangeEvent, data: Vec<Value>) -> Value {
    let total = data.len();
    json!({
        "type": event.kind,
        "action": event.action,
        "data": data,
        "exportDate": now_utc(),
        "totalCount": total,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsvpd_core::{
        ChangeAction, Cohort, EntityKind, EventOccurrence, Timestamp,
    };
    use std::str::FromStr;

    fn catalog() -> EventCatalog {
        EventCatalog::new(vec![
            EventOccurrence::new("date1", "March 19, 2026", "New York"),
        ])
        .unwrap()
    }

    fn registrant() -> Registrant {
        Registrant {
            name: "Ada Example".into(),
            email: "ada@example.com".into(),
            phone: None,
            professional_title: Some("Editor".into()),
            bio: "Writes.".into(),
            food_allergies: Some("peanuts".into()),
            photo: Some("data:image/jpeg;base64,AAAA".into()),
            cohort: Cohort::A,
            event_id: "date1".into(),
            submitted_at: Timestamp::from_str("2026-01-10T12:00:00Z").unwrap(),
            moved_from_waitlist: false,
        }
    }

    #[test]
    fn test_registrant_wire_fields() {
        let wire = registrant_wire(&registrant(), &catalog(), "https://img.example.com/a.jpg");
        assert_eq!(wire["name"], "Ada Example");
        assert_eq!(wire["phone"], "");
        assert_eq!(wire["professionalTitle"], "Editor");
        assert_eq!(wire["foodAllergies"], "peanuts");
        assert_eq!(wire["date"], "March 19, 2026");
        assert_eq!(wire["location"], "New York");
        assert_eq!(wire["dateId"], "date1");
        assert_eq!(wire["group"], "cohort-a");
        assert_eq!(wire["timestamp"], "2026-01-10T12:00:00Z");
        assert_eq!(wire["photoLink"], "https://img.example.com/a.jpg");
        // the raw photo payload never leaves the system
        assert!(wire.get("photo").is_none());
    }

    #[test]
    fn test_registrant_wire_unknown_occurrence_degrades() {
        let mut r = registrant();
        r.event_id = "gone".into();
        let wire = registrant_wire(&r, &catalog(), "");
        assert_eq!(wire["date"], "gone");
        assert_eq!(wire["location"], "");
    }

    #[test]
    fn test_waitlist_wire_fields() {
        let w = WaitlistEntry {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            phone: Some("555-0100".into()),
            professional_title: None,
            bio: "Builds.".into(),
            food_allergies: None,
            photo: None,
            cohort: Cohort::C,
            preferred_events: vec!["date1".into(), "date2".into()],
            added_at: Timestamp::from_str("2026-02-01T08:00:00Z").unwrap(),
        };
        let wire = waitlist_wire(&w, "");
        assert_eq!(wire["classification"], "cohort-c");
        assert_eq!(wire["preferredDates"], json!(["date1", "date2"]));
        assert_eq!(wire["timestamp"], "2026-02-01T08:00:00Z");
        assert!(wire.get("dateId").is_none());
    }

    #[test]
    fn test_invite_wire_fields() {
        let i = InviteEntry {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            requested_at: Timestamp::from_str("2026-02-01T08:00:00Z").unwrap(),
        };
        let wire = invite_wire(&i);
        assert_eq!(
            wire,
            json!({
                "name": "Grace",
                "email": "grace@example.com",
                "timestamp": "2026-02-01T08:00:00Z",
            })
        );
    }

    #[test]
    fn test_envelope_shape() {
        let event = ChangeEvent::created(
            EntityKind::Registrants,
            EntityRecord::Registrant(registrant()),
        );
        let wire = registrant_wire(&registrant(), &catalog(), "");
        let env = envelope(&event, vec![wire]);
        assert_eq!(env["type"], "registrants");
        assert_eq!(env["action"], "new");
        assert_eq!(env["totalCount"], 1);
        assert!(env["data"].is_array());
        assert!(env["exportDate"].is_string());
    }

    #[test]
    fn test_envelope_action_names() {
        let event = ChangeEvent::new(EntityKind::Waitlist, ChangeAction::BulkExport, vec![]);
        let env = envelope(&event, vec![]);
        assert_eq!(env["action"], "bulk_export");
        assert_eq!(env["totalCount"], 0);
    }
}
