use crate::domain::{Coordinate, Facility, NOT_AVAILABLE, RawElement, UNNAMED_FACILITY, floor_km, round_km};
use crate::geometry::geodesic_km;
use rayon::prelude::*;
use serde::Deserialize;
use tracing::debug;

use super::fallback::{address, tag_or};

fn default_financial_keywords() -> Vec<String> {
    [
        "state bank",
        "hdfc bank",
        "icici bank",
        "axis bank",
        "canara bank",
        "corporation bank",
        "syndicate bank",
        "yes bank",
        "reserve bank",
        "south indian bank",
        "union bank",
        "indian bank",
        "punjab bank",
    ]
    .map(String::from)
    .to_vec()
}

fn default_medical_keywords() -> Vec<String> {
    [
        "hospital",
        "clinic",
        "blood bank",
        "blood donation",
        "blood center",
        "medical",
        "health",
        "blood centre",
    ]
    .map(String::from)
    .to_vec()
}

fn default_healthcare_marker() -> String {
    "blood".to_string()
}

/// Name heuristics separating medical facilities from similarly named banks.
///
/// Matching is case-insensitive substring search; lists are checked in order.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordRules {
    /// Name fragments that mark a financial institution; these win over medical keywords
    #[serde(default = "default_financial_keywords")]
    pub financial_keywords: Vec<String>,
    /// Name or amenity fragments that mark a medical facility
    #[serde(default = "default_medical_keywords")]
    pub medical_keywords: Vec<String>,
    /// Substring of `healthcare` / `healthcare:speciality` that also qualifies
    #[serde(default = "default_healthcare_marker")]
    pub healthcare_marker: String,
}

impl Default for KeywordRules {
    fn default() -> Self {
        Self {
            financial_keywords: default_financial_keywords(),
            medical_keywords: default_medical_keywords(),
            healthcare_marker: default_healthcare_marker(),
        }
    }
}

impl KeywordRules {
    fn normalized(self) -> Self {
        let lower = |v: Vec<String>| v.into_iter().map(|s| s.to_lowercase()).collect();
        Self {
            financial_keywords: lower(self.financial_keywords),
            medical_keywords: lower(self.medical_keywords),
            healthcare_marker: self.healthcare_marker.to_lowercase(),
        }
    }
}

/// Why an element was not accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    OutsideRadius,
    FinancialInstitution,
    NotMedical,
}

/// Outcome of classifying a single element
#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Accepted(Facility),
    Rejected(RejectReason),
}

impl Classification {
    pub fn into_facility(self) -> Option<Facility> {
        match self {
            Classification::Accepted(facility) => Some(facility),
            Classification::Rejected(_) => None,
        }
    }
}

/// Stateless accept/reject decision for candidate elements
#[derive(Debug, Clone)]
pub struct FacilityClassifier {
    rules: KeywordRules,
}

impl Default for FacilityClassifier {
    fn default() -> Self {
        Self::new(KeywordRules::default())
    }
}

impl FacilityClassifier {
    pub fn new(rules: KeywordRules) -> Self {
        Self {
            rules: rules.normalized(),
        }
    }

    /// Classify one element against the search center.
    ///
    /// Steps, in order: true-radius prefilter, financial exclusion,
    /// medical inclusion, then materialization.
    pub fn classify(&self, element: &RawElement, center: Coordinate, radius_km: f64) -> Classification {
        let distance_km = geodesic_km(center, element.point);
        if distance_km > radius_km {
            return Classification::Rejected(RejectReason::OutsideRadius);
        }

        let name = element.tag("name").unwrap_or(UNNAMED_FACILITY);
        let name_lower = name.to_lowercase();
        let amenity = element.tag("amenity").unwrap_or_default().to_lowercase();

        if amenity == "bank" || contains_any(&name_lower, &self.rules.financial_keywords) {
            return Classification::Rejected(RejectReason::FinancialInstitution);
        }

        let medical_keyword = self
            .rules
            .medical_keywords
            .iter()
            .any(|kw| name_lower.contains(kw.as_str()) || amenity.contains(kw.as_str()));

        if !medical_keyword && !self.has_healthcare_marker(element) {
            return Classification::Rejected(RejectReason::NotMedical);
        }

        Classification::Accepted(Facility {
            name: name.to_string(),
            address: address(element),
            phone: tag_or(element, &["phone", "contact:phone"], NOT_AVAILABLE).to_string(),
            coordinate: element.point,
            // Rounding must not push an accepted facility past the radius
            distance_km: round_km(distance_km).min(floor_km(radius_km)),
            opening_hours: tag_or(element, &["opening_hours"], NOT_AVAILABLE).to_string(),
            website: tag_or(element, &["website", "contact:website"], NOT_AVAILABLE).to_string(),
            facility_type: tag_or(element, &["amenity", "healthcare"], "medical_facility")
                .to_string(),
        })
    }

    /// Classify every element, keeping accepted facilities in input order
    pub fn accept_all(&self, elements: &[RawElement], center: Coordinate, radius_km: f64) -> Vec<Facility> {
        elements
            .par_iter()
            .filter_map(|element| match self.classify(element, center, radius_km) {
                Classification::Accepted(facility) => Some(facility),
                Classification::Rejected(reason) => {
                    debug!(id = element.id, ?reason, "rejected candidate");
                    None
                }
            })
            .collect()
    }

    fn has_healthcare_marker(&self, element: &RawElement) -> bool {
        let marker = self.rules.healthcare_marker.as_str();
        ["healthcare", "healthcare:speciality"].iter().any(|key| {
            element
                .tag(key)
                .is_some_and(|v| v.to_lowercase().contains(marker))
        })
    }
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| haystack.contains(n.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ElementKind, Tags};

    const CENTER: Coordinate = Coordinate {
        lat: 12.97,
        lon: 77.59,
    };

    fn element(id: u64, lat: f64, lon: f64, pairs: &[(&str, &str)]) -> RawElement {
        let tags: Tags = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RawElement::new(ElementKind::Node, id, Coordinate::new(lat, lon), tags)
    }

    fn near(pairs: &[(&str, &str)]) -> RawElement {
        element(1, 12.971, 77.595, pairs)
    }

    #[test]
    fn test_accepts_blood_bank() {
        let classifier = FacilityClassifier::default();
        let e = near(&[("amenity", "blood_bank"), ("name", "Red Cross Blood Bank")]);

        let facility = classifier.classify(&e, CENTER, 5.0).into_facility().unwrap();
        assert_eq!(facility.name, "Red Cross Blood Bank");
        assert_eq!(facility.facility_type, "blood_bank");
        assert!((facility.distance_km - 0.55).abs() < 0.02);
        assert_eq!(facility.phone, "N/A");
        assert_eq!(facility.opening_hours, "N/A");
        assert_eq!(facility.website, "N/A");
        assert_eq!(facility.address, "");
    }

    #[test]
    fn test_rejects_outside_radius() {
        let classifier = FacilityClassifier::default();
        // Inside the flat bbox corner (0.04°, 0.04°) but ~6.2 km away
        let e = element(1, 13.01, 77.63, &[("amenity", "blood_bank")]);
        assert_eq!(
            classifier.classify(&e, CENTER, 5.0),
            Classification::Rejected(RejectReason::OutsideRadius)
        );
    }

    #[test]
    fn test_bank_amenity_always_excluded() {
        let classifier = FacilityClassifier::default();
        let e = near(&[
            ("amenity", "bank"),
            ("name", "State Bank Blood Donation Branch"),
            ("healthcare", "blood_donation"),
        ]);
        assert_eq!(
            classifier.classify(&e, CENTER, 5.0),
            Classification::Rejected(RejectReason::FinancialInstitution)
        );

        let e = near(&[("amenity", "BANK"), ("name", "City Hospital")]);
        assert_eq!(
            classifier.classify(&e, CENTER, 5.0),
            Classification::Rejected(RejectReason::FinancialInstitution)
        );
    }

    #[test]
    fn test_financial_name_beats_medical_keyword() {
        let classifier = FacilityClassifier::default();
        let e = near(&[("amenity", "clinic"), ("name", "HDFC Bank Health Camp")]);
        assert_eq!(
            classifier.classify(&e, CENTER, 5.0),
            Classification::Rejected(RejectReason::FinancialInstitution)
        );
    }

    #[test]
    fn test_healthcare_tag_qualifies() {
        let classifier = FacilityClassifier::default();
        let e = near(&[("healthcare", "centre"), ("healthcare:speciality", "Blood"), ("name", "Sankalp")]);

        let facility = classifier.classify(&e, CENTER, 5.0).into_facility().unwrap();
        assert_eq!(facility.facility_type, "centre");
    }

    #[test]
    fn test_not_medical() {
        let classifier = FacilityClassifier::default();
        let e = near(&[("amenity", "community_centre"), ("name", "Rotary Hall")]);
        assert_eq!(
            classifier.classify(&e, CENTER, 5.0),
            Classification::Rejected(RejectReason::NotMedical)
        );
    }

    #[test]
    fn test_unnamed_element_uses_default_name() {
        let classifier = FacilityClassifier::default();
        let e = near(&[("amenity", "blood_bank")]);
        let facility = classifier.classify(&e, CENTER, 5.0).into_facility().unwrap();
        assert_eq!(facility.name, "Unnamed Blood Center");
    }

    #[test]
    fn test_field_fallbacks() {
        let classifier = FacilityClassifier::default();
        let e = near(&[
            ("healthcare", "blood_donation"),
            ("name", "Lions Blood Centre"),
            ("contact:phone", "+91 80 2222"),
            ("contact:website", "https://lions.example.org"),
            ("opening_hours", "Mo-Sa 09:00-17:00"),
            ("addr:street", "MG Road"),
            ("addr:city", "Bengaluru"),
        ]);

        let facility = classifier.classify(&e, CENTER, 5.0).into_facility().unwrap();
        assert_eq!(facility.phone, "+91 80 2222");
        assert_eq!(facility.website, "https://lions.example.org");
        assert_eq!(facility.opening_hours, "Mo-Sa 09:00-17:00");
        assert_eq!(facility.address, "MG Road, Bengaluru");
        assert_eq!(facility.facility_type, "blood_donation");
    }

    #[test]
    fn test_medical_facility_type_default() {
        let classifier = FacilityClassifier::default();
        let e = near(&[("name", "Jeevan Medical Trust")]);
        let facility = classifier.classify(&e, CENTER, 5.0).into_facility().unwrap();
        assert_eq!(facility.facility_type, "medical_facility");
    }

    #[test]
    fn test_custom_rules_are_case_insensitive() {
        let rules = KeywordRules {
            financial_keywords: vec!["ACME Bank".to_string()],
            ..KeywordRules::default()
        };
        let classifier = FacilityClassifier::new(rules);
        let e = near(&[("amenity", "hospital"), ("name", "Acme Bank Hospital")]);
        assert_eq!(
            classifier.classify(&e, CENTER, 5.0),
            Classification::Rejected(RejectReason::FinancialInstitution)
        );

        // The default denylist no longer applies
        let e = near(&[("amenity", "hospital"), ("name", "Canara Bank Hospital")]);
        assert!(classifier.classify(&e, CENTER, 5.0).into_facility().is_some());
    }

    #[test]
    fn test_accept_all_is_order_independent() {
        let classifier = FacilityClassifier::default();
        let elements = vec![
            element(1, 12.971, 77.595, &[("amenity", "blood_bank")]),
            element(2, 12.975, 77.59, &[("amenity", "bank"), ("name", "Yes Bank")]),
            element(3, 12.96, 77.58, &[("amenity", "hospital"), ("name", "Victoria Hospital")]),
            element(4, 13.2, 77.9, &[("amenity", "blood_bank")]),
            element(5, 12.98, 77.6, &[("amenity", "cafe"), ("name", "Blood Orange")]),
        ];
        let mut reversed = elements.clone();
        reversed.reverse();

        let mut forward: Vec<String> = classifier
            .accept_all(&elements, CENTER, 5.0)
            .into_iter()
            .map(|f| f.name)
            .collect();
        let mut backward: Vec<String> = classifier
            .accept_all(&reversed, CENTER, 5.0)
            .into_iter()
            .map(|f| f.name)
            .collect();
        forward.sort();
        backward.sort();

        assert_eq!(forward, vec!["Unnamed Blood Center", "Victoria Hospital"]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_accept_all_keeps_input_order() {
        let classifier = FacilityClassifier::default();
        let elements: Vec<RawElement> = (0..20)
            .map(|i| {
                element(
                    i,
                    12.97 + i as f64 * 0.001,
                    77.59,
                    &[("amenity", "blood_bank")],
                )
            })
            .collect();

        let accepted = classifier.accept_all(&elements, CENTER, 5.0);
        assert_eq!(accepted.len(), 20);
        for pair in accepted.windows(2) {
            assert!(pair[0].coordinate.lat < pair[1].coordinate.lat);
        }
    }

    #[test]
    fn test_distance_at_the_radius_stays_two_decimal() {
        let classifier = FacilityClassifier::default();
        for i in 1..=20 {
            let e = element(i, 12.97 + i as f64 * 0.0013, 77.59, &[("amenity", "blood_bank")]);
            // Radius exactly at the facility, with all its decimals
            let radius_km = geodesic_km(CENTER, e.point);

            let facility = classifier.classify(&e, CENTER, radius_km).into_facility().unwrap();
            assert!(facility.distance_km <= radius_km);
            assert_eq!(facility.distance_km, round_km(facility.distance_km));
        }
    }
}
