//! In-memory shape of the store and its serialized snapshot.

use rsvpd_core::{Cohort, CohortCounts, InviteEntry, Registrant, WaitlistEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The three cohort buckets of one event occurrence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortBuckets {
    #[serde(default)]
    pub cohort_a: Vec<Registrant>,
    #[serde(default)]
    pub cohort_b: Vec<Registrant>,
    #[serde(default)]
    pub cohort_c: Vec<Registrant>,
}

impl CohortBuckets {
    pub fn bucket(&self, cohort: Cohort) -> &Vec<Registrant> {
        match cohort {
            Cohort::A => &self.cohort_a,
            Cohort::B => &self.cohort_b,
            Cohort::C => &self.cohort_c,
        }
    }

    pub fn bucket_mut(&mut self, cohort: Cohort) -> &mut Vec<Registrant> {
        match cohort {
            Cohort::A => &mut self.cohort_a,
            Cohort::B => &mut self.cohort_b,
            Cohort::C => &mut self.cohort_c,
        }
    }

    pub fn counts(&self) -> CohortCounts {
        CohortCounts::new(
            self.cohort_a.len() as u32,
            self.cohort_b.len() as u32,
            self.cohort_c.len() as u32,
        )
    }

    pub fn iter_all(&self) -> impl Iterator<Item = (Cohort, &Registrant)> {
        Cohort::ALL
            .into_iter()
            .flat_map(move |c| self.bucket(c).iter().map(move |r| (c, r)))
    }
}

/// Everything the store owns, as persisted to the local snapshot file:
/// registrations keyed by occurrence and cohort, the waitlist and invite
/// arrays, and the runtime-configured webhook URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    #[serde(default)]
    pub registrations: HashMap<String, CohortBuckets>,
    #[serde(default)]
    pub waitlist: Vec<WaitlistEntry>,
    #[serde(default)]
    pub invites: Vec<InviteEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl StoreSnapshot {
    /// Counts per occurrence, derived from the buckets.
    pub fn counts(&self) -> HashMap<String, CohortCounts> {
        self.registrations
            .iter()
            .map(|(id, buckets)| (id.clone(), buckets.counts()))
            .collect()
    }

    /// Whether `email` is currently held by a registrant or waitlist entry.
    /// Invites are a separate terminal list and do not count.
    pub fn email_active(&self, email: &str) -> bool {
        self.registrations
            .values()
            .any(|b| b.iter_all().any(|(_, r)| r.email == email))
            || self.waitlist.iter().any(|w| w.email == email)
    }
}
