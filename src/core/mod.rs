pub mod distance;
pub mod referral;
pub mod route;
pub mod selector;

pub use crate::domain::model::{Coordinate, Facility, FacilityDirectory, SelectionResult};
pub use crate::domain::ports::{FormSubmitter, Geocoder, RecordArchive, Storage};
pub use crate::utils::error::Result;
