use crate::core::route::RouteBuilder;
use crate::core::selector::{rank_eligible, select_nearest};
use crate::domain::model::{
    Coordinate, Facility, FacilityDirectory, PatientRecord, ReferralRequest, SelectionResult,
};
use crate::domain::ports::{FormSubmitter, Geocoder, RecordArchive};
use crate::utils::error::Result;
use url::Url;

#[derive(Debug, Clone, PartialEq)]
pub struct Referral {
    pub location: Coordinate,
    pub facility: Facility,
    pub distance_km: f64,
    pub route_url: Url,
    /// `None` on a dry run
    pub archive_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReferralOutcome {
    LocationNotFound { query: String },
    NoFacilityAvailable { location: Coordinate },
    Referred(Referral),
}

/// 串接 geocode -> select -> submit -> archive
pub struct ReferralEngine<G: Geocoder, F: FormSubmitter, A: RecordArchive> {
    geocoder: G,
    submitter: F,
    archive: A,
    directory: FacilityDirectory,
    routes: RouteBuilder,
    dry_run: bool,
}

impl<G: Geocoder, F: FormSubmitter, A: RecordArchive> ReferralEngine<G, F, A> {
    pub fn new(
        geocoder: G,
        submitter: F,
        archive: A,
        directory: FacilityDirectory,
        routes: RouteBuilder,
    ) -> Self {
        Self {
            geocoder,
            submitter,
            archive,
            directory,
            routes,
            dry_run: false,
        }
    }

    /// Dry runs stop after selection: nothing is submitted or archived.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn directory(&self) -> &FacilityDirectory {
        &self.directory
    }

    pub async fn locate(&self, query: &str) -> Result<Option<Coordinate>> {
        tracing::debug!("Geocoding location: {}", query);
        self.geocoder.geocode(query).await
    }

    pub fn nearest(&self, location: Coordinate) -> SelectionResult<'_> {
        select_nearest(location, &self.directory)
    }

    pub fn rank(&self, location: Coordinate) -> Vec<(&Facility, f64)> {
        rank_eligible(location, &self.directory)
    }

    pub async fn refer(&self, request: &ReferralRequest) -> Result<ReferralOutcome> {
        let draft = &request.draft;
        tracing::info!("🚑 Starting referral for patient: {}", draft.patient_name());

        let Some(location) = self.locate(&request.location_query).await? else {
            tracing::warn!("📍 Location not found: {}", request.location_query);
            return Ok(ReferralOutcome::LocationNotFound {
                query: request.location_query.clone(),
            });
        };
        tracing::info!("📍 Resolved '{}' to {}", request.location_query, location);

        let (facility, distance_km) = match self.nearest(location) {
            SelectionResult::Selected {
                facility,
                distance_km,
            } => (facility, distance_km),
            SelectionResult::NoEligibleFacility => {
                tracing::warn!(
                    "🏥 No facility with available capacity among {} entries",
                    self.directory.len()
                );
                return Ok(ReferralOutcome::NoFacilityAvailable { location });
            }
        };
        tracing::info!(
            "🏥 Selected {} ({:.1} km, {} beds available)",
            facility.name,
            distance_km,
            facility.available_capacity
        );

        let route_url = self.routes.route_url(location, &facility.name);

        let archive_key = if self.dry_run {
            tracing::info!("🔍 DRY RUN - skipping submission and archive");
            None
        } else {
            // 送出前先確認姓名可歸檔
            self.archive.key_for(draft.patient_name())?;

            self.submitter
                .submit(&facility.submission_endpoint, draft)
                .await?;
            tracing::info!("📨 Submitted vitals to {}", facility.name);

            let record =
                PatientRecord::from_draft(draft, Some(facility.name.as_str()), chrono::Utc::now());
            let key = self.archive.store(&record).await?;
            tracing::info!("📁 Archived record as {}", key);
            Some(key)
        };

        Ok(ReferralOutcome::Referred(Referral {
            location,
            facility: facility.clone(),
            distance_km,
            route_url,
            archive_key,
        }))
    }

    pub async fn recall(&self, patient_name: &str) -> Result<Option<PatientRecord>> {
        let record = self.archive.fetch(patient_name).await?;
        if record.is_none() {
            tracing::info!("No vital signs found for {}", patient_name);
        }
        Ok(record)
    }
}
