//! Area reference data and the cascading location selector.
//!
//! The dataset is a flat list of `(region, district, covered_area)` records.
//! Dropdown options are derived on demand:
//!
//! ```text
//! divisions() ──pick──> districts_for(division) ──pick──> cities_for(division, district)
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// One district of a region and the localities it covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AreaRecord {
    pub region: String,
    pub district: String,
    #[serde(default)]
    pub covered_area: Vec<String>,
}

impl AreaRecord {
    pub fn new<I, S>(region: &str, district: &str, covered_area: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            region: region.to_string(),
            district: district.to_string(),
            covered_area: covered_area.into_iter().map(Into::into).collect(),
        }
    }
}

/// Read-only view over the area dataset that derives cascading options.
///
/// Cloning is cheap; the records are shared.
#[derive(Debug, Clone, Default)]
pub struct LocationSelector {
    areas: Arc<Vec<AreaRecord>>,
}

impl LocationSelector {
    pub fn new(areas: Vec<AreaRecord>) -> Self {
        Self {
            areas: Arc::new(areas),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }

    pub fn records(&self) -> &[AreaRecord] {
        &self.areas
    }

    /// Distinct regions, in the order they first appear.
    pub fn divisions(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.areas
            .iter()
            .map(|a| a.region.as_str())
            .filter(|region| seen.insert(*region))
            .collect()
    }

    /// Districts of `division` in dataset order. Empty when unset or unknown.
    pub fn districts_for(&self, division: &str) -> Vec<&str> {
        if division.is_empty() {
            return Vec::new();
        }
        self.areas
            .iter()
            .filter(|a| a.region == division)
            .map(|a| a.district.as_str())
            .collect()
    }

    /// Covered localities of the `(division, district)` pair. Empty when no record matches.
    pub fn cities_for(&self, division: &str, district: &str) -> &[String] {
        self.areas
            .iter()
            .find(|a| a.region == division && a.district == district)
            .map(|a| a.covered_area.as_slice())
            .unwrap_or(&[])
    }

    /// True when `city` is offered for the `(division, district)` pair.
    pub fn is_consistent(&self, division: &str, district: &str, city: &str) -> bool {
        self.cities_for(division, district)
            .iter()
            .any(|c| c == city)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LocationSelector {
        LocationSelector::new(vec![
            AreaRecord::new("Dhaka", "Gazipur", ["Tongi", "Sreepur"]),
            AreaRecord::new("Chattogram", "Cox's Bazar", ["Teknaf", "Ukhia"]),
            AreaRecord::new("Dhaka", "Narayanganj", ["Rupganj", "Sonargaon"]),
            AreaRecord::new("Chattogram", "Feni", ["Chhagalnaiya"]),
            AreaRecord::new("Sylhet", "Moulvibazar", Vec::<String>::new()),
        ])
    }

    #[test]
    fn test_divisions_are_distinct_regions() {
        let selector = sample();
        let divisions = selector.divisions();
        assert_eq!(divisions, vec!["Dhaka", "Chattogram", "Sylhet"]);

        let unique: HashSet<_> = divisions.iter().collect();
        assert_eq!(unique.len(), divisions.len());

        let regions: HashSet<&str> = selector
            .records()
            .iter()
            .map(|a| a.region.as_str())
            .collect();
        let divisions: HashSet<&str> = divisions.into_iter().collect();
        assert_eq!(regions, divisions);
    }

    #[test]
    fn test_districts_follow_dataset_order() {
        let selector = sample();
        assert_eq!(
            selector.districts_for("Dhaka"),
            vec!["Gazipur", "Narayanganj"]
        );
        assert_eq!(
            selector.districts_for("Chattogram"),
            vec!["Cox's Bazar", "Feni"]
        );
    }

    #[test]
    fn test_districts_for_unset_or_unknown_division() {
        let selector = sample();
        assert!(selector.districts_for("").is_empty());
        assert!(selector.districts_for("Barishal").is_empty());
        assert!(selector.districts_for("dhaka").is_empty());
    }

    #[test]
    fn test_cities_for_absent_pair_is_empty() {
        let selector = sample();
        assert!(selector.cities_for("Dhaka", "Feni").is_empty());
        assert!(selector.cities_for("", "").is_empty());
        assert!(selector.cities_for("Rangpur", "Dinajpur").is_empty());
        assert!(selector.cities_for("Sylhet", "Moulvibazar").is_empty());
    }

    #[test]
    fn test_single_record_cascade() {
        let selector = LocationSelector::new(vec![AreaRecord::new(
            "Dhaka",
            "Gazipur",
            ["Tongi", "Sreepur"],
        )]);
        assert_eq!(selector.districts_for("Dhaka"), vec!["Gazipur"]);
        assert_eq!(
            selector.cities_for("Dhaka", "Gazipur").to_vec(),
            vec!["Tongi".to_string(), "Sreepur".to_string()]
        );
    }

    #[test]
    fn test_empty_dataset() {
        let selector = LocationSelector::default();
        assert!(selector.is_empty());
        assert!(selector.divisions().is_empty());
        assert!(selector.districts_for("Dhaka").is_empty());
    }

    #[test]
    fn test_consistency_check() {
        let selector = sample();
        assert!(selector.is_consistent("Dhaka", "Gazipur", "Tongi"));
        assert!(!selector.is_consistent("Chattogram", "Gazipur", "Tongi"));
        assert!(!selector.is_consistent("Dhaka", "Gazipur", "Teknaf"));
    }

    #[test]
    fn test_deserialize_dataset() {
        let json = r#"[
            {"region":"Dhaka","district":"Gazipur","covered_area":["Tongi","Sreepur"]},
            {"region":"Khulna","district":"Jessore"}
        ]"#;
        let records: Vec<AreaRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[1].covered_area.is_empty());
    }
}
