use crate::cohort::Cohort;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// One scheduled instance of the event: a specific date and location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventOccurrence {
    pub id: String,
    /// Display date, e.g. "March 19, 2026".
    pub label: String,
    pub location: String,
    #[serde(default = "default_capacity")]
    pub capacity: u32,
}

fn default_capacity() -> u32 {
    14
}

impl EventOccurrence {
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            location: location.into(),
            capacity: default_capacity(),
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    /// Per-cohort cap: the capacity split evenly across cohorts, rounded up.
    pub fn max_per_cohort(&self) -> u32 {
        self.capacity.div_ceil(Cohort::COUNT)
    }
}

/// Immutable list of event occurrences, fixed at startup.
#[derive(Debug, Clone)]
pub struct EventCatalog {
    occurrences: Vec<EventOccurrence>,
}

impl EventCatalog {
    pub fn new(occurrences: Vec<EventOccurrence>) -> Result<Self> {
        if occurrences.is_empty() {
            return Err(CoreError::configuration(
                "event catalog must contain at least one occurrence",
            ));
        }
        for occ in &occurrences {
            if occ.id.is_empty() {
                return Err(CoreError::configuration("occurrence id must not be empty"));
            }
            if occ.capacity == 0 {
                return Err(CoreError::configuration(format!(
                    "occurrence {} must have capacity > 0",
                    occ.id
                )));
            }
        }
        let mut ids: Vec<&str> = occurrences.iter().map(|o| o.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        if ids.len() != occurrences.len() {
            return Err(CoreError::configuration("occurrence ids must be unique"));
        }
        Ok(Self { occurrences })
    }

    pub fn get(&self, id: &str) -> Option<&EventOccurrence> {
        self.occurrences.iter().find(|o| o.id == id)
    }

    /// Like `get`, but maps a missing occurrence to the domain error.
    pub fn require(&self, id: &str) -> Result<&EventOccurrence> {
        self.get(id)
            .ok_or_else(|| CoreError::unknown_occurrence(id))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Occurrences in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &EventOccurrence> {
        self.occurrences.iter()
    }

    pub fn ids(&self) -> Vec<String> {
        self.occurrences.iter().map(|o| o.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    /// Display label for an occurrence id; falls back to the id itself for
    /// ids that are no longer in the catalog.
    pub fn label_for(&self, id: &str) -> String {
        self.get(id)
            .map(|o| o.label.clone())
            .unwrap_or_else(|| id.to_string())
    }
}
