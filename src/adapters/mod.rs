// Adapters layer: concrete implementations for external systems (storage, http).

pub mod archive;
pub mod geocoder;
pub mod storage;
pub mod submitter;

pub use archive::DocumentArchive;
pub use geocoder::NominatimGeocoder;
pub use storage::LocalStorage;
pub use submitter::HttpFormSubmitter;
