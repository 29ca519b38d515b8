use crate::cohort::Cohort;
use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};

/// A publication an attendee can select, pre-tagged with its cohort lean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    pub name: String,
    pub lean: Cohort,
}

impl Publication {
    pub fn new(name: impl Into<String>, lean: Cohort) -> Self {
        Self {
            name: name.into(),
            lean,
        }
    }
}

/// Maps a set of selected publications to a cohort.
///
/// The cohort with a strict majority over both others wins; with no strict
/// majority the entry defaults to the middle cohort. The assignment happens
/// once at submission time; stored records carry the cohort as opaque data.
#[derive(Debug, Clone)]
pub struct PublicationClassifier {
    roster: Vec<Publication>,
}

impl PublicationClassifier {
    pub fn new(roster: Vec<Publication>) -> Result<Self> {
        if roster.is_empty() {
            return Err(CoreError::configuration(
                "publication roster must not be empty",
            ));
        }
        Ok(Self { roster })
    }

    pub fn roster(&self) -> &[Publication] {
        &self.roster
    }

    fn lean_of(&self, name: &str) -> Option<Cohort> {
        self.roster
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.lean)
    }

    /// Classify a selection of publication names.
    ///
    /// Unknown names are ignored for counting. An empty selection is a
    /// validation error; callers must block submission in that case.
    pub fn classify(&self, selected: &[String]) -> Result<Cohort> {
        if selected.is_empty() {
            return Err(CoreError::validation(
                "at least one publication must be selected",
            ));
        }

        let mut counts = [0u32; 3];
        for name in selected {
            if let Some(lean) = self.lean_of(name) {
                counts[lean.index()] += 1;
            }
        }

        let a = counts[Cohort::A.index()];
        let b = counts[Cohort::B.index()];
        let c = counts[Cohort::C.index()];

        if a > b && a > c {
            Ok(Cohort::A)
        } else if c > a && c > b {
            Ok(Cohort::C)
        } else {
            Ok(Cohort::middle())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> PublicationClassifier {
        PublicationClassifier::new(vec![
            Publication::new("The Meridian Review", Cohort::A),
            Publication::new("Harbor Quarterly", Cohort::A),
            Publication::new("The Commons Ledger", Cohort::A),
            Publication::new("The Plumb Line", Cohort::B),
            Publication::new("Summit Dispatch", Cohort::C),
            Publication::new("The Standard Bearer", Cohort::C),
            Publication::new("Heritage Journal", Cohort::C),
        ])
        .unwrap()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_one_lean_yields_that_cohort() {
        let c = classifier();
        assert_eq!(
            c.classify(&names(&["The Meridian Review", "Harbor Quarterly"]))
                .unwrap(),
            Cohort::A
        );
        assert_eq!(
            c.classify(&names(&["Summit Dispatch", "Heritage Journal"]))
                .unwrap(),
            Cohort::C
        );
    }

    #[test]
    fn test_strict_majority_wins() {
        let c = classifier();
        let cohort = c
            .classify(&names(&[
                "The Meridian Review",
                "Harbor Quarterly",
                "Summit Dispatch",
            ]))
            .unwrap();
        assert_eq!(cohort, Cohort::A);
    }

    #[test]
    fn test_tie_defaults_to_middle() {
        let c = classifier();
        let cohort = c
            .classify(&names(&["The Meridian Review", "Summit Dispatch"]))
            .unwrap();
        assert_eq!(cohort, Cohort::B);
    }

    #[test]
    fn test_middle_majority_is_middle() {
        let c = classifier();
        assert_eq!(c.classify(&names(&["The Plumb Line"])).unwrap(), Cohort::B);
    }

    #[test]
    fn test_empty_selection_is_validation_error() {
        let c = classifier();
        let err = c.classify(&[]).unwrap_err();
        assert!(matches!(err, CoreError::Validation { .. }));
    }

    #[test]
    fn test_unknown_names_are_ignored() {
        let c = classifier();
        let cohort = c
            .classify(&names(&["Unknown Gazette", "Summit Dispatch"]))
            .unwrap();
        assert_eq!(cohort, Cohort::C);
    }

    #[test]
    fn test_only_unknown_names_defaults_to_middle() {
        let c = classifier();
        assert_eq!(
            c.classify(&names(&["Unknown Gazette"])).unwrap(),
            Cohort::B
        );
    }

    #[test]
    fn test_empty_roster_rejected() {
        assert!(PublicationClassifier::new(vec![]).is_err());
    }
}
