//! The registration store: sole owner of the registrant, waitlist and
//! invite collections.
//!
//! Every mutation validates against current state (capacity is re-checked
//! just-in-time, never trusted from an earlier read), applies, persists the
//! snapshot, and only then emits a change event. Mutations serialize on a
//! single write lock and run to completion before returning; relay delivery
//! is fully detached.

use std::collections::HashMap;
use std::sync::Arc;

use rsvpd_core::{
    CapacityPlanner, ChangeAction, ChangeEvent, Cohort, CohortCounts, CoreError, EntityKind,
    EntityRecord, EventBroadcaster, EventCatalog, InviteEntry, OccurrenceAvailability, RecordKey,
    Registrant, Result, WaitlistEntry, now_utc, word_count,
};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::info;

use crate::snapshot::SnapshotStore;
use crate::state::StoreSnapshot;

/// Validation limits applied to public submissions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionLimits {
    /// Maximum bio length, in words.
    pub bio_word_limit: usize,
    /// Maximum decoded photo size, in bytes.
    pub photo_max_bytes: usize,
}

impl Default for SubmissionLimits {
    fn default() -> Self {
        Self {
            bio_word_limit: 250,
            photo_max_bytes: 10_000_000,
        }
    }
}

/// A registration submission, with the cohort already derived by the
/// classifier at submission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRegistrant {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub professional_title: Option<String>,
    pub bio: String,
    #[serde(default)]
    pub food_allergies: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    pub cohort: Cohort,
    pub event_id: String,
}

/// A waitlist submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWaitlistEntry {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub professional_title: Option<String>,
    pub bio: String,
    #[serde(default)]
    pub food_allergies: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    pub cohort: Cohort,
    pub preferred_events: Vec<String>,
}

/// Full replacement of a registrant's fields, used by the admin edit.
/// The original submission timestamp is always preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrantUpdate {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub professional_title: Option<String>,
    pub bio: String,
    #[serde(default)]
    pub food_allergies: Option<String>,
    #[serde(default)]
    pub photo: Option<String>,
    pub cohort: Cohort,
    pub event_id: String,
}

pub struct RegistrationStore {
    planner: CapacityPlanner,
    limits: SubmissionLimits,
    state: RwLock<StoreSnapshot>,
    snapshots: Arc<dyn SnapshotStore>,
    broadcaster: Arc<EventBroadcaster>,
}

impl RegistrationStore {
    /// Open the store, loading any persisted snapshot and seeding empty
    /// buckets for every catalog occurrence.
    pub async fn open(
        catalog: Arc<EventCatalog>,
        limits: SubmissionLimits,
        snapshots: Arc<dyn SnapshotStore>,
        broadcaster: Arc<EventBroadcaster>,
    ) -> Result<Self> {
        let mut snapshot = snapshots.load().await?.unwrap_or_default();
        for occ in catalog.iter() {
            snapshot.registrations.entry(occ.id.clone()).or_default();
        }
        info!(
            backend = snapshots.backend_name(),
            occurrences = catalog.len(),
            waitlist = snapshot.waitlist.len(),
            invites = snapshot.invites.len(),
            "Registration store opened"
        );
        Ok(Self {
            planner: CapacityPlanner::new(catalog),
            limits,
            state: RwLock::new(snapshot),
            snapshots,
            broadcaster,
        })
    }

    pub fn catalog(&self) -> &EventCatalog {
        self.planner.catalog()
    }

    pub fn broadcaster(&self) -> &Arc<EventBroadcaster> {
        &self.broadcaster
    }

    // ==================== Mutations ====================

    /// Register an attendee for an occurrence.
    ///
    /// Availability is re-validated against current counts at call time so
    /// a submission based on stale counts fails instead of overbooking.
    pub async fn register(&self, new: NewRegistrant) -> Result<Registrant> {
        self.validate_person(&new.name, &new.email, &new.bio, new.photo.as_deref())?;

        let mut state = self.state.write().await;
        if state.email_active(&new.email) {
            return Err(CoreError::duplicate_email(&new.email));
        }
        self.planner
            .check_open(&new.event_id, new.cohort, &state.counts())?;

        let registrant = Registrant {
            name: new.name,
            email: new.email,
            phone: new.phone,
            professional_title: new.professional_title,
            bio: new.bio,
            food_allergies: new.food_allergies,
            photo: new.photo,
            cohort: new.cohort,
            event_id: new.event_id.clone(),
            submitted_at: now_utc(),
            moved_from_waitlist: false,
        };

        let mut next = state.clone();
        next.registrations
            .entry(new.event_id)
            .or_default()
            .bucket_mut(new.cohort)
            .push(registrant.clone());
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::created(
            EntityKind::Registrants,
            EntityRecord::Registrant(registrant.clone()),
        ));
        info!(email = %registrant.email, event_id = %registrant.event_id, cohort = %registrant.cohort, "Registrant added");
        Ok(registrant)
    }

    /// Add an attendee to the waitlist. At least one preferred occurrence
    /// is required.
    pub async fn add_to_waitlist(&self, new: NewWaitlistEntry) -> Result<WaitlistEntry> {
        self.validate_person(&new.name, &new.email, &new.bio, new.photo.as_deref())?;
        if new.preferred_events.is_empty() {
            return Err(CoreError::validation(
                "at least one preferred occurrence is required for the waitlist",
            ));
        }
        for id in &new.preferred_events {
            self.catalog().require(id)?;
        }

        let mut state = self.state.write().await;
        if state.email_active(&new.email) {
            return Err(CoreError::duplicate_email(&new.email));
        }

        let entry = WaitlistEntry {
            name: new.name,
            email: new.email,
            phone: new.phone,
            professional_title: new.professional_title,
            bio: new.bio,
            food_allergies: new.food_allergies,
            photo: new.photo,
            cohort: new.cohort,
            preferred_events: new.preferred_events,
            added_at: now_utc(),
        };

        let mut next = state.clone();
        next.waitlist.push(entry.clone());
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::created(
            EntityKind::Waitlist,
            EntityRecord::Waitlist(entry.clone()),
        ));
        info!(email = %entry.email, cohort = %entry.cohort, "Waitlist entry added");
        Ok(entry)
    }

    /// Record a direct invite request.
    pub async fn add_invite(&self, name: &str, email: &str) -> Result<InviteEntry> {
        if name.trim().is_empty() || email.trim().is_empty() {
            return Err(CoreError::validation("name and email are required"));
        }

        let mut state = self.state.write().await;
        let entry = InviteEntry {
            name: name.to_string(),
            email: email.to_string(),
            requested_at: now_utc(),
        };

        let mut next = state.clone();
        next.invites.push(entry.clone());
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::created(
            EntityKind::Invite,
            EntityRecord::Invite(entry.clone()),
        ));
        Ok(entry)
    }

    /// Promote a waitlist entry into a registrant bucket.
    ///
    /// The per-cohort cap is the binding constraint here, independent of
    /// the overall-capacity rule used at registration time.
    pub async fn promote_waitlist(
        &self,
        key: &RecordKey,
        event_id: &str,
        cohort: Cohort,
    ) -> Result<Registrant> {
        let mut state = self.state.write().await;
        let index = find_waitlist(&state, key)
            .ok_or_else(|| CoreError::not_found("waitlist entry", key.to_string()))?;
        self.planner.check_bucket(event_id, cohort, &state.counts())?;

        let mut next = state.clone();
        let entry = next.waitlist.remove(index);
        let registrant = Registrant {
            name: entry.name,
            email: entry.email,
            phone: entry.phone,
            professional_title: entry.professional_title,
            bio: entry.bio,
            food_allergies: entry.food_allergies,
            photo: entry.photo,
            cohort,
            event_id: event_id.to_string(),
            submitted_at: now_utc(),
            moved_from_waitlist: true,
        };
        next.registrations
            .entry(event_id.to_string())
            .or_default()
            .bucket_mut(cohort)
            .push(registrant.clone());
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::moved(
            EntityKind::Waitlist,
            ChangeAction::MoveToRegistrant,
            EntityRecord::Registrant(registrant.clone()),
            key.clone(),
            Some(registrant.key()),
        ));
        info!(email = %registrant.email, event_id, cohort = %cohort, "Waitlist entry promoted");
        Ok(registrant)
    }

    /// Move a registrant back to the waitlist. Without explicit preferred
    /// occurrences, every catalog occurrence is pre-selected.
    pub async fn move_registrant_to_waitlist(
        &self,
        key: &RecordKey,
        preferred: Option<Vec<String>>,
    ) -> Result<WaitlistEntry> {
        let preferred = match preferred {
            Some(ids) if !ids.is_empty() => {
                for id in &ids {
                    self.catalog().require(id)?;
                }
                ids
            }
            _ => self.catalog().ids(),
        };

        let mut state = self.state.write().await;
        let (event_id, cohort, index) = find_registrant(&state, key)
            .ok_or_else(|| CoreError::not_found("registrant", key.to_string()))?;

        let mut next = state.clone();
        let registrant = next
            .registrations
            .get_mut(&event_id)
            .expect("bucket exists for found registrant")
            .bucket_mut(cohort)
            .remove(index);
        let entry = WaitlistEntry {
            name: registrant.name,
            email: registrant.email,
            phone: registrant.phone,
            professional_title: registrant.professional_title,
            bio: registrant.bio,
            food_allergies: registrant.food_allergies,
            photo: registrant.photo,
            cohort: registrant.cohort,
            preferred_events: preferred,
            added_at: now_utc(),
        };
        next.waitlist.push(entry.clone());
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::moved(
            EntityKind::Registrants,
            ChangeAction::MoveToWaitlist,
            EntityRecord::Waitlist(entry.clone()),
            key.clone(),
            Some(entry.key()),
        ));
        Ok(entry)
    }

    /// Move a registrant to the terminal invite list.
    pub async fn move_registrant_to_invite(&self, key: &RecordKey) -> Result<InviteEntry> {
        let mut state = self.state.write().await;
        let (event_id, cohort, index) = find_registrant(&state, key)
            .ok_or_else(|| CoreError::not_found("registrant", key.to_string()))?;

        let mut next = state.clone();
        let registrant = next
            .registrations
            .get_mut(&event_id)
            .expect("bucket exists for found registrant")
            .bucket_mut(cohort)
            .remove(index);
        let entry = InviteEntry {
            name: registrant.name,
            email: registrant.email,
            // The original submission time doubles as the request time so
            // downstream mirrors keep a stable identity.
            requested_at: registrant.submitted_at,
        };
        next.invites.push(entry.clone());
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::moved(
            EntityKind::Registrants,
            ChangeAction::MoveToInvite,
            EntityRecord::Invite(entry.clone()),
            key.clone(),
            None,
        ));
        Ok(entry)
    }

    /// Move a waitlist entry to the terminal invite list.
    pub async fn move_waitlist_to_invite(&self, key: &RecordKey) -> Result<InviteEntry> {
        let mut state = self.state.write().await;
        let index = find_waitlist(&state, key)
            .ok_or_else(|| CoreError::not_found("waitlist entry", key.to_string()))?;

        let mut next = state.clone();
        let entry = next.waitlist.remove(index);
        let invite = InviteEntry {
            name: entry.name,
            email: entry.email,
            requested_at: entry.added_at,
        };
        next.invites.push(invite.clone());
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::moved(
            EntityKind::Waitlist,
            ChangeAction::MoveToInvite,
            EntityRecord::Invite(invite.clone()),
            key.clone(),
            None,
        ));
        Ok(invite)
    }

    pub async fn delete_registrant(&self, key: &RecordKey) -> Result<()> {
        let mut state = self.state.write().await;
        let (event_id, cohort, index) = find_registrant(&state, key)
            .ok_or_else(|| CoreError::not_found("registrant", key.to_string()))?;

        let mut next = state.clone();
        let registrant = next
            .registrations
            .get_mut(&event_id)
            .expect("bucket exists for found registrant")
            .bucket_mut(cohort)
            .remove(index);
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::deleted(
            EntityKind::Registrants,
            EntityRecord::Registrant(registrant),
            key.clone(),
        ));
        Ok(())
    }

    pub async fn delete_waitlist(&self, key: &RecordKey) -> Result<()> {
        let mut state = self.state.write().await;
        let index = find_waitlist(&state, key)
            .ok_or_else(|| CoreError::not_found("waitlist entry", key.to_string()))?;

        let mut next = state.clone();
        let entry = next.waitlist.remove(index);
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::deleted(
            EntityKind::Waitlist,
            EntityRecord::Waitlist(entry),
            key.clone(),
        ));
        Ok(())
    }

    pub async fn delete_invite(&self, email: &str) -> Result<()> {
        let mut state = self.state.write().await;
        let index = state
            .invites
            .iter()
            .position(|i| i.email == email)
            .ok_or_else(|| CoreError::not_found("invite", email))?;

        let mut next = state.clone();
        let entry = next.invites.remove(index);
        let key = RecordKey::new(entry.email.clone(), entry.requested_at.clone());
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::deleted(
            EntityKind::Invite,
            EntityRecord::Invite(entry),
            key,
        ));
        Ok(())
    }

    /// Edit a registrant, possibly moving it to another occurrence or
    /// cohort.
    ///
    /// Implemented as delete-then-reinsert with the original submission
    /// timestamp preserved, and replayed outward as a `delete` followed by
    /// a `new`. Downstream mirrors key deletions by the original identity,
    /// so that ordering must hold.
    pub async fn edit_registrant(
        &self,
        key: &RecordKey,
        update: RegistrantUpdate,
    ) -> Result<Registrant> {
        self.validate_person(&update.name, &update.email, &update.bio, update.photo.as_deref())?;
        self.catalog().require(&update.event_id)?;

        let mut state = self.state.write().await;
        let (event_id, cohort, index) = find_registrant(&state, key)
            .ok_or_else(|| CoreError::not_found("registrant", key.to_string()))?;
        if update.email != key.email && state.email_active(&update.email) {
            return Err(CoreError::duplicate_email(&update.email));
        }

        let mut next = state.clone();
        let original = next
            .registrations
            .get_mut(&event_id)
            .expect("bucket exists for found registrant")
            .bucket_mut(cohort)
            .remove(index);
        let updated = Registrant {
            name: update.name,
            email: update.email,
            phone: update.phone,
            professional_title: update.professional_title,
            bio: update.bio,
            food_allergies: update.food_allergies,
            photo: update.photo,
            cohort: update.cohort,
            event_id: update.event_id.clone(),
            submitted_at: original.submitted_at.clone(),
            moved_from_waitlist: original.moved_from_waitlist,
        };
        next.registrations
            .entry(update.event_id)
            .or_default()
            .bucket_mut(update.cohort)
            .push(updated.clone());
        self.commit(&mut state, next).await?;

        self.broadcaster.send(ChangeEvent::deleted(
            EntityKind::Registrants,
            EntityRecord::Registrant(original),
            key.clone(),
        ));
        self.broadcaster.send(ChangeEvent::created(
            EntityKind::Registrants,
            EntityRecord::Registrant(updated.clone()),
        ));
        Ok(updated)
    }

    /// Replay a whole collection outward as a `bulk_export` event.
    /// Returns the number of records included.
    pub async fn push_bulk_export(&self, kind: EntityKind) -> Result<usize> {
        let state = self.state.read().await;
        let records: Vec<EntityRecord> = match kind {
            EntityKind::Registrants => self
                .flattened(&state)
                .into_iter()
                .map(EntityRecord::Registrant)
                .collect(),
            EntityKind::Waitlist => state
                .waitlist
                .iter()
                .cloned()
                .map(EntityRecord::Waitlist)
                .collect(),
            EntityKind::Invite => state
                .invites
                .iter()
                .cloned()
                .map(EntityRecord::Invite)
                .collect(),
        };
        let count = records.len();
        self.broadcaster
            .send(ChangeEvent::bulk_export(kind, records));
        Ok(count)
    }

    /// Set (or clear) the runtime-configured webhook URL; persisted with
    /// the data snapshot.
    pub async fn set_webhook_url(&self, url: Option<String>) -> Result<()> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        next.webhook_url = url;
        self.commit(&mut state, next).await
    }

    // ==================== Reads ====================

    pub async fn webhook_url(&self) -> Option<String> {
        self.state.read().await.webhook_url.clone()
    }

    pub async fn counts(&self) -> HashMap<String, CohortCounts> {
        self.state.read().await.counts()
    }

    /// Occurrences open to `cohort`, computed over current counts.
    pub async fn available_for(&self, cohort: Cohort) -> Vec<OccurrenceAvailability> {
        let counts = self.counts().await;
        self.planner.available(cohort, &counts)
    }

    /// Every occurrence annotated with live counts, for the dashboard.
    pub async fn overview(&self) -> Vec<OccurrenceAvailability> {
        let counts = self.counts().await;
        self.planner.overview(&counts)
    }

    /// Registrants flattened in catalog order, optionally filtered by a
    /// case-insensitive search term (name, email, title) and occurrence.
    pub async fn registrants(&self, query: Option<&str>, event_id: Option<&str>) -> Vec<Registrant> {
        let state = self.state.read().await;
        let needle = query.map(str::to_lowercase);
        self.flattened(&state)
            .into_iter()
            .filter(|r| event_id.is_none_or(|id| r.event_id == id))
            .filter(|r| {
                needle.as_deref().is_none_or(|q| {
                    r.name.to_lowercase().contains(q)
                        || r.email.to_lowercase().contains(q)
                        || r.professional_title
                            .as_deref()
                            .is_some_and(|t| t.to_lowercase().contains(q))
                })
            })
            .collect()
    }

    pub async fn waitlist(&self) -> Vec<WaitlistEntry> {
        self.state.read().await.waitlist.clone()
    }

    pub async fn invites(&self) -> Vec<InviteEntry> {
        self.state.read().await.invites.clone()
    }

    /// A full copy of the owned state, for the JSON export.
    pub async fn snapshot(&self) -> StoreSnapshot {
        self.state.read().await.clone()
    }

    // ==================== Internals ====================

    /// Persist `next` and commit it as the current state. On persistence
    /// failure the in-memory state is left untouched, so the mutation
    /// fails atomically.
    async fn commit(
        &self,
        state: &mut tokio::sync::RwLockWriteGuard<'_, StoreSnapshot>,
        next: StoreSnapshot,
    ) -> Result<()> {
        self.snapshots.save(&next).await?;
        **state = next;
        Ok(())
    }

    fn validate_person(
        &self,
        name: &str,
        email: &str,
        bio: &str,
        photo: Option<&str>,
    ) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CoreError::validation("name is required"));
        }
        if email.trim().is_empty() {
            return Err(CoreError::validation("email is required"));
        }
        if bio.trim().is_empty() {
            return Err(CoreError::validation("bio is required"));
        }
        if word_count(bio) > self.limits.bio_word_limit {
            return Err(CoreError::validation(format!(
                "bio must be {} words or less",
                self.limits.bio_word_limit
            )));
        }
        if let Some(photo) = photo {
            if estimated_photo_bytes(photo) > self.limits.photo_max_bytes {
                return Err(CoreError::validation(format!(
                    "photo must be smaller than {} bytes",
                    self.limits.photo_max_bytes
                )));
            }
        }
        Ok(())
    }

    fn flattened(&self, state: &StoreSnapshot) -> Vec<Registrant> {
        let mut out = Vec::new();
        for occ in self.catalog().iter() {
            if let Some(buckets) = state.registrations.get(&occ.id) {
                for cohort in Cohort::ALL {
                    out.extend(buckets.bucket(cohort).iter().cloned());
                }
            }
        }
        out
    }
}

impl std::fmt::Debug for RegistrationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegistrationStore")
            .field("backend", &self.snapshots.backend_name())
            .field("occurrences", &self.catalog().len())
            .finish()
    }
}

/// Estimated decoded size of a photo payload. Data URIs are measured on
/// their base64 payload; plain URLs on the string itself.
fn estimated_photo_bytes(photo: &str) -> usize {
    if photo.starts_with("data:") {
        let payload = photo.split_once(',').map_or("", |(_, p)| p);
        payload.len() * 3 / 4
    } else {
        photo.len()
    }
}

fn find_registrant(state: &StoreSnapshot, key: &RecordKey) -> Option<(String, Cohort, usize)> {
    for (event_id, buckets) in &state.registrations {
        for cohort in Cohort::ALL {
            if let Some(index) = buckets
                .bucket(cohort)
                .iter()
                .position(|r| r.email == key.email && r.submitted_at == key.timestamp)
            {
                return Some((event_id.clone(), cohort, index));
            }
        }
    }
    None
}

fn find_waitlist(state: &StoreSnapshot, key: &RecordKey) -> Option<usize> {
    state
        .waitlist
        .iter()
        .position(|w| w.email == key.email && w.added_at == key.timestamp)
}
