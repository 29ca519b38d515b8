//! CSV rendering for the admin export downloads.

use rsvpd_core::{EventCatalog, Registrant, WaitlistEntry};

const REGISTRANT_HEADERS: [&str; 9] = [
    "Name",
    "Email",
    "Phone",
    "Professional Title",
    "Bio",
    "Food Allergies",
    "Date",
    "Location",
    "Group",
];

const WAITLIST_HEADERS: [&str; 9] = [
    "Name",
    "Email",
    "Phone",
    "Professional Title",
    "Bio",
    "Food Allergies",
    "Classification",
    "Preferred Dates",
    "Date Added",
];

fn field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn row(values: &[String]) -> String {
    values
        .iter()
        .map(|v| field(v))
        .collect::<Vec<_>>()
        .join(",")
}

pub fn registrants_csv(catalog: &EventCatalog, registrants: &[Registrant]) -> String {
    let mut lines = vec![REGISTRANT_HEADERS.join(",")];
    for r in registrants {
        lines.push(row(&[
            r.name.clone(),
            r.email.clone(),
            r.phone.clone().unwrap_or_default(),
            r.professional_title.clone().unwrap_or_default(),
            r.bio.clone(),
            r.food_allergies.clone().unwrap_or_default(),
            catalog.label_for(&r.event_id),
            catalog
                .get(&r.event_id)
                .map(|o| o.location.clone())
                .unwrap_or_default(),
            r.cohort.as_str().to_string(),
        ]));
    }
    lines.join("\n")
}

pub fn waitlist_csv(catalog: &EventCatalog, entries: &[WaitlistEntry]) -> String {
    let mut lines = vec![WAITLIST_HEADERS.join(",")];
    for w in entries {
        let preferred = w
            .preferred_events
            .iter()
            .map(|id| catalog.label_for(id))
            .collect::<Vec<_>>()
            .join("; ");
        lines.push(row(&[
            w.name.clone(),
            w.email.clone(),
            w.phone.clone().unwrap_or_default(),
            w.professional_title.clone().unwrap_or_default(),
            w.bio.clone(),
            w.food_allergies.clone().unwrap_or_default(),
            w.cohort.as_str().to_string(),
            preferred,
            w.added_at.to_string(),
        ]));
    }
    lines.join("\n")
}

/// Date stamp for download filenames, e.g. `2026-08-07`.
pub fn today_stamp() -> String {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    time::OffsetDateTime::now_utc()
        .date()
        .format(&format)
        .unwrap_or_else(|_| "export".to_string())
}
