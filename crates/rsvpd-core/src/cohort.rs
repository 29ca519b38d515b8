use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classification bucket assigned to each registrant.
///
/// There are exactly three cohorts. `B` is the middle cohort and the
/// tie-break default of the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cohort {
    #[serde(rename = "cohort-a")]
    A,
    #[serde(rename = "cohort-b")]
    B,
    #[serde(rename = "cohort-c")]
    C,
}

impl Cohort {
    /// All cohorts, in stable bucket order.
    pub const ALL: [Cohort; 3] = [Cohort::A, Cohort::B, Cohort::C];

    /// Number of cohorts; the per-cohort cap divides capacity by this.
    pub const COUNT: u32 = 3;

    /// The middle cohort, used as the classifier tie-break.
    pub fn middle() -> Self {
        Cohort::B
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Cohort::A => "cohort-a",
            Cohort::B => "cohort-b",
            Cohort::C => "cohort-c",
        }
    }

    /// Bucket index, used by counts and collection layouts.
    pub fn index(&self) -> usize {
        match self {
            Cohort::A => 0,
            Cohort::B => 1,
            Cohort::C => 2,
        }
    }
}

impl fmt::Display for Cohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Cohort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cohort-a" | "a" | "A" => Ok(Cohort::A),
            "cohort-b" | "b" | "B" => Ok(Cohort::B),
            "cohort-c" | "c" | "C" => Ok(Cohort::C),
            other => Err(CoreError::validation(format!("unknown cohort: {other}"))),
        }
    }
}

/// Per-cohort occupancy counts for one event occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CohortCounts {
    pub cohort_a: u32,
    pub cohort_b: u32,
    pub cohort_c: u32,
}

impl CohortCounts {
    pub fn new(cohort_a: u32, cohort_b: u32, cohort_c: u32) -> Self {
        Self {
            cohort_a,
            cohort_b,
            cohort_c,
        }
    }

    pub fn get(&self, cohort: Cohort) -> u32 {
        match cohort {
            Cohort::A => self.cohort_a,
            Cohort::B => self.cohort_b,
            Cohort::C => self.cohort_c,
        }
    }

    pub fn set(&mut self, cohort: Cohort, count: u32) {
        match cohort {
            Cohort::A => self.cohort_a = count,
            Cohort::B => self.cohort_b = count,
            Cohort::C => self.cohort_c = count,
        }
    }

    pub fn total(&self) -> u32 {
        self.cohort_a + self.cohort_b + self.cohort_c
    }
}
