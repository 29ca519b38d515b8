use crate::cohort::Cohort;
use crate::time::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three entity collections owned by the registration store.
///
/// `as_str` yields the wire `type` value of the relay payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Registrants,
    Waitlist,
    Invite,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Registrants => "registrants",
            EntityKind::Waitlist => "waitlist",
            EntityKind::Invite => "invite",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Identity key for registrants and waitlist entries: email plus the
/// timestamp assigned when the record entered its collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordKey {
    pub email: String,
    pub timestamp: Timestamp,
}

impl RecordKey {
    pub fn new(email: impl Into<String>, timestamp: Timestamp) -> Self {
        Self {
            email: email.into(),
            timestamp,
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.email, self.timestamp)
    }
}

/// A confirmed attendee of one event occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registrant {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_title: Option<String>,
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_allergies: Option<String>,
    /// Base64 data URI as submitted, or an http(s) URL once mirrored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub cohort: Cohort,
    pub event_id: String,
    pub submitted_at: Timestamp,
    #[serde(default)]
    pub moved_from_waitlist: bool,
}

impl Registrant {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.email.clone(), self.submitted_at.clone())
    }
}

/// An attendee waiting for a seat in one of their preferred occurrences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub professional_title: Option<String>,
    pub bio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_allergies: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    pub cohort: Cohort,
    pub preferred_events: Vec<String>,
    pub added_at: Timestamp,
}

impl WaitlistEntry {
    pub fn key(&self) -> RecordKey {
        RecordKey::new(self.email.clone(), self.added_at.clone())
    }
}

/// Terminal invite-request record; never promoted further.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteEntry {
    pub name: String,
    pub email: String,
    pub requested_at: Timestamp,
}

/// Word count used for the bio length limit.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
