//! Age classification rule synthesis.
//!
//! Builds an ordered, boundary-labeled bucketing rule from a list of integer
//! breakpoints `b1 < b2 < … < bn`: `"<b1"`, `"b1-b2"` … inclusive on both
//! ends, `">bn"`. Classification applies first-match-wins over the declared
//! order, so an age equal to an interior breakpoint lands in the earlier of
//! the two bands that contain it. That precedence is load-bearing for
//! downstream output and is pinned by a regression test below.

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BandRule {
    Below(i32),
    Between(i32, i32),
    Above(i32),
}

impl BandRule {
    fn matches(self, age: i32) -> bool {
        match self {
            Self::Below(b) => age < b,
            Self::Between(lo, hi) => age >= lo && age <= hi,
            Self::Above(b) => age > b,
        }
    }
}

#[derive(Debug, Clone)]
struct AgeBand {
    label: String,
    rule: BandRule,
}

/// An ordered set of labeled age bands derived from breakpoints.
#[derive(Debug, Clone)]
pub struct AgeBands {
    bands: Vec<AgeBand>,
}

impl AgeBands {
    /// Build the rule set for the given breakpoints. `n` breakpoints yield
    /// `n + 1` bands. An empty list is a caller contract violation.
    pub fn from_breakpoints(breakpoints: &[i32]) -> Result<Self> {
        let first = *breakpoints.first().ok_or_else(|| {
            Error::InvalidConfiguration("the age breakpoint list cannot be empty".into())
        })?;
        let last = *breakpoints.last().unwrap();

        let mut bands = Vec::with_capacity(breakpoints.len() + 1);
        bands.push(AgeBand {
            label: format!("<{first}"),
            rule: BandRule::Below(first),
        });
        for pair in breakpoints.windows(2) {
            bands.push(AgeBand {
                label: format!("{}-{}", pair[0], pair[1]),
                rule: BandRule::Between(pair[0], pair[1]),
            });
        }
        bands.push(AgeBand {
            label: format!(">{last}"),
            rule: BandRule::Above(last),
        });

        Ok(Self { bands })
    }

    /// Classify an age into the first band whose rule matches it.
    ///
    /// Total over all integers: for ascending breakpoints the bands cover the
    /// whole axis, and the open-ended top band backstops anything else.
    pub fn classify(&self, age: i32) -> &str {
        self.bands
            .iter()
            .find(|band| band.rule.matches(age))
            .unwrap_or_else(|| self.bands.last().expect("bands are never empty"))
            .label
            .as_str()
    }

    /// Band labels in declared order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|band| band.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_breakpoints_rejected() {
        let err = AgeBands::from_breakpoints(&[]).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration(_)));
    }

    #[test]
    fn breakpoints_yield_n_plus_one_labels() {
        let bands = AgeBands::from_breakpoints(&[5, 18, 65]).unwrap();
        let labels: Vec<&str> = bands.labels().collect();
        assert_eq!(labels, vec!["<5", "5-18", "18-65", ">65"]);
    }

    #[test]
    fn classification_is_total() {
        let bands = AgeBands::from_breakpoints(&[5, 18, 65]).unwrap();
        for age in -5..130 {
            // every age must land somewhere
            assert!(!bands.classify(age).is_empty(), "age {age} unclassified");
        }
        assert_eq!(bands.classify(-1), "<5");
        assert_eq!(bands.classify(0), "<5");
        assert_eq!(bands.classify(12), "5-18");
        assert_eq!(bands.classify(64), "18-65");
        assert_eq!(bands.classify(66), ">65");
    }

    #[test]
    fn interior_breakpoint_takes_earlier_band() {
        // age 18 satisfies both "5-18" and "18-65"; declared order wins
        let bands = AgeBands::from_breakpoints(&[5, 18, 65]).unwrap();
        assert_eq!(bands.classify(5), "5-18");
        assert_eq!(bands.classify(18), "5-18");
        assert_eq!(bands.classify(65), "18-65");
    }

    #[test]
    fn single_breakpoint() {
        let bands = AgeBands::from_breakpoints(&[65]).unwrap();
        let labels: Vec<&str> = bands.labels().collect();
        assert_eq!(labels, vec!["<65", ">65"]);
        assert_eq!(bands.classify(65), ">65"); // no inclusive band covers 65 itself
    }
}
