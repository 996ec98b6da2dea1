pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::{DocumentArchive, HttpFormSubmitter, LocalStorage, NominatimGeocoder};
pub use config::ReferralConfig;
pub use crate::core::{
    distance::haversine_km,
    referral::{Referral, ReferralEngine, ReferralOutcome},
    route::RouteBuilder,
    selector::{rank_eligible, select_nearest},
};
pub use domain::model::{
    Coordinate, Facility, FacilityDirectory, PatientRecord, ReferralRequest, SelectionResult,
    SubmissionDraft, VitalSigns,
};
pub use utils::error::{ReferralError, Result};
