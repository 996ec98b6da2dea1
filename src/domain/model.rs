use crate::utils::error::{ReferralError, Result};
use crate::utils::validation::{validate_non_empty_string, validate_range, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// 經緯度座標（度）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Range checks are applied at the boundaries through [`Validate`].
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl Validate for Coordinate {
    fn validate(&self) -> Result<()> {
        validate_range("latitude", self.latitude, -90.0, 90.0)?;
        validate_range("longitude", self.longitude, -180.0, 180.0)?;
        Ok(())
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub name: String,
    pub location: Coordinate,
    pub available_capacity: u32,
    /// 外部收件表單位址，核心只當作不透明字串
    pub submission_endpoint: String,
}

impl Facility {
    pub fn is_eligible(&self) -> bool {
        self.available_capacity > 0
    }
}

impl Validate for Facility {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("facility.name", &self.name)?;
        self.location.validate()?;
        validate_non_empty_string("facility.submission_endpoint", &self.submission_endpoint)?;
        Ok(())
    }
}

/// Read-only, ordered facility directory. Names are unique.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacilityDirectory {
    facilities: Vec<Facility>,
}

impl FacilityDirectory {
    pub fn new(facilities: Vec<Facility>) -> Result<Self> {
        let mut seen = HashSet::new();
        for facility in &facilities {
            facility.validate()?;
            if !seen.insert(facility.name.as_str()) {
                return Err(ReferralError::DuplicateFacility {
                    name: facility.name.clone(),
                });
            }
        }
        Ok(Self { facilities })
    }

    pub fn as_slice(&self) -> &[Facility] {
        &self.facilities
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Facility> {
        self.facilities.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Facility> {
        self.facilities.iter().find(|f| f.name == name)
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }
}

impl<'a> IntoIterator for &'a FacilityDirectory {
    type Item = &'a Facility;
    type IntoIter = std::slice::Iter<'a, Facility>;

    fn into_iter(self) -> Self::IntoIter {
        self.facilities.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SelectionResult<'a> {
    Selected {
        facility: &'a Facility,
        distance_km: f64,
    },
    NoEligibleFacility,
}

impl<'a> SelectionResult<'a> {
    pub fn facility(&self) -> Option<&'a Facility> {
        match *self {
            Self::Selected { facility, .. } => Some(facility),
            Self::NoEligibleFacility => None,
        }
    }

    pub fn distance_km(&self) -> Option<f64> {
        match *self {
            Self::Selected { distance_km, .. } => Some(distance_km),
            Self::NoEligibleFacility => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VitalSigns {
    pub blood_pressure: String,
    pub temperature: String,
    pub pulse_rate: String,
    pub oxygen_saturation: String,
    pub respiratory_rate: String,
}

/// 使用者輸入的表單內容，建立後不可變
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionDraft {
    patient_name: String,
    vitals: VitalSigns,
    summary: String,
}

impl SubmissionDraft {
    pub fn new(
        patient_name: impl Into<String>,
        vitals: VitalSigns,
        summary: impl Into<String>,
    ) -> Result<Self> {
        let patient_name = patient_name.into().trim().to_string();
        if patient_name.is_empty() {
            return Err(ReferralError::ValidationError {
                message: "patient name cannot be empty".to_string(),
            });
        }

        Ok(Self {
            patient_name,
            vitals,
            summary: summary.into(),
        })
    }

    pub fn patient_name(&self) -> &str {
        &self.patient_name
    }

    pub fn vitals(&self) -> &VitalSigns {
        &self.vitals
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralRequest {
    pub draft: SubmissionDraft,
    pub location_query: String,
}

impl ReferralRequest {
    pub fn new(draft: SubmissionDraft, location_query: impl Into<String>) -> Self {
        Self {
            draft,
            location_query: location_query.into(),
        }
    }
}

/// Archived form of a completed referral.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub patient_name: String,
    pub vitals: VitalSigns,
    pub summary: String,
    pub referred_to: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl PatientRecord {
    pub fn from_draft(
        draft: &SubmissionDraft,
        referred_to: Option<&str>,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            patient_name: draft.patient_name().to_string(),
            vitals: draft.vitals().clone(),
            summary: draft.summary().to_string(),
            referred_to: referred_to.map(str::to_string),
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facility(name: &str, lat: f64, lon: f64, capacity: u32) -> Facility {
        Facility {
            name: name.to_string(),
            location: Coordinate::new(lat, lon),
            available_capacity: capacity,
            submission_endpoint: format!("https://forms.example.com/{}", name),
        }
    }

    #[test]
    fn test_coordinate_validation() {
        assert!(Coordinate::new(5.6, -0.3).validate().is_ok());
        assert!(Coordinate::new(-90.0, 180.0).validate().is_ok());
        assert!(Coordinate::new(91.0, 0.0).validate().is_err());
        assert!(Coordinate::new(0.0, -180.5).validate().is_err());
    }

    #[test]
    fn test_directory_rejects_duplicate_names() {
        let result = FacilityDirectory::new(vec![
            facility("A", 5.5, -0.2, 1),
            facility("A", 6.0, -1.0, 3),
        ]);
        assert!(matches!(result, Err(ReferralError::DuplicateFacility { name }) if name == "A"));
    }

    #[test]
    fn test_directory_rejects_out_of_range_location() {
        assert!(FacilityDirectory::new(vec![facility("Far", 95.0, 0.0, 1)]).is_err());
    }

    #[test]
    fn test_directory_preserves_order() {
        let directory = FacilityDirectory::new(vec![
            facility("B", 6.0, -1.0, 0),
            facility("A", 5.5, -0.2, 1),
        ])
        .unwrap();

        let names: Vec<&str> = directory.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A"]);
        assert!(!directory.get("B").unwrap().is_eligible());
        assert!(directory.get("C").is_none());
    }

    #[test]
    fn test_draft_requires_patient_name() {
        assert!(SubmissionDraft::new("  ", VitalSigns::default(), "").is_err());

        let draft = SubmissionDraft::new(" Ama Mensah ", VitalSigns::default(), "stable").unwrap();
        assert_eq!(draft.patient_name(), "Ama Mensah");
    }
}
