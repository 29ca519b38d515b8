use crate::catalog::{EventCatalog, EventOccurrence};
use crate::cohort::{Cohort, CohortCounts};
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// One occurrence annotated with live counts for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OccurrenceAvailability {
    #[serde(flatten)]
    pub occurrence: EventOccurrence,
    pub counts: CohortCounts,
    pub total: u32,
    pub max_per_cohort: u32,
}

/// Decides which occurrences are still open to a cohort.
///
/// Pure function over a snapshot of counts; no side effects. Callers
/// re-invoke it just-in-time before mutating so stale counts are never
/// trusted.
#[derive(Debug, Clone)]
pub struct CapacityPlanner {
    catalog: Arc<EventCatalog>,
}

impl CapacityPlanner {
    pub fn new(catalog: Arc<EventCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &EventCatalog {
        &self.catalog
    }

    fn annotate(occ: &EventOccurrence, counts: CohortCounts) -> OccurrenceAvailability {
        OccurrenceAvailability {
            occurrence: occ.clone(),
            counts,
            total: counts.total(),
            max_per_cohort: occ.max_per_cohort(),
        }
    }

    /// All occurrences in catalog order, annotated with counts.
    pub fn overview(
        &self,
        counts: &HashMap<String, CohortCounts>,
    ) -> Vec<OccurrenceAvailability> {
        self.catalog
            .iter()
            .map(|occ| {
                Self::annotate(occ, counts.get(&occ.id).copied().unwrap_or_default())
            })
            .collect()
    }

    /// Occurrences still open to `cohort`, in catalog order.
    ///
    /// An occurrence is open iff the total is under capacity AND the
    /// cohort's bucket is under the per-cohort cap. If the returned list is
    /// empty, the caller offers the waitlist path with every occurrence id
    /// pre-selected as preferred.
    pub fn available(
        &self,
        cohort: Cohort,
        counts: &HashMap<String, CohortCounts>,
    ) -> Vec<OccurrenceAvailability> {
        self.catalog
            .iter()
            .filter_map(|occ| {
                let occ_counts = counts.get(&occ.id).copied().unwrap_or_default();
                let open = occ_counts.total() < occ.capacity
                    && occ_counts.get(cohort) < occ.max_per_cohort();
                open.then(|| Self::annotate(occ, occ_counts))
            })
            .collect()
    }

    /// Validate that `event_id` has room for `cohort` under the full rule
    /// (total capacity and per-cohort cap). Used by `register`.
    pub fn check_open(
        &self,
        event_id: &str,
        cohort: Cohort,
        counts: &HashMap<String, CohortCounts>,
    ) -> Result<()> {
        let occ = self.catalog.require(event_id)?;
        let occ_counts = counts.get(event_id).copied().unwrap_or_default();
        if occ_counts.total() >= occ.capacity || occ_counts.get(cohort) >= occ.max_per_cohort() {
            return Err(CoreError::capacity_exceeded(event_id, cohort.as_str()));
        }
        Ok(())
    }

    /// Validate only the per-cohort cap, ignoring total capacity.
    ///
    /// This mirrors the per-bucket cap applied when promoting from the
    /// waitlist; the bucket cap is the binding constraint at move time.
    pub fn check_bucket(
        &self,
        event_id: &str,
        cohort: Cohort,
        counts: &HashMap<String, CohortCounts>,
    ) -> Result<()> {
        let occ = self.catalog.require(event_id)?;
        let occ_counts = counts.get(event_id).copied().unwrap_or_default();
        if occ_counts.get(cohort) >= occ.max_per_cohort() {
            return Err(CoreError::capacity_exceeded(event_id, cohort.as_str()));
        }
        Ok(())
    }
}
