use crate::domain::model::{ReferralRequest, SubmissionDraft, VitalSigns};
use crate::utils::error::Result;
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "vital-referral")]
#[command(
    about = "Record vital signs and refer the patient to the nearest hospital with free beds"
)]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "referral.toml", global = true)]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Record vitals, pick a hospital, submit and archive
    Refer(ReferArgs),
    /// Show the archived vitals of a patient
    Recall {
        #[arg(long)]
        patient_name: String,
    },
    /// Show the nearest hospital with capacity without submitting anything
    Nearest(NearestArgs),
    /// List the loaded facility directory
    Facilities,
}

#[derive(Debug, Clone, Args)]
pub struct ReferArgs {
    #[arg(long)]
    pub patient_name: String,

    #[arg(long, help = "Blood pressure (mmHg)")]
    pub blood_pressure: String,

    #[arg(long)]
    pub temperature: String,

    #[arg(long)]
    pub pulse_rate: String,

    #[arg(long)]
    pub oxygen_saturation: String,

    #[arg(long)]
    pub respiratory_rate: String,

    #[arg(long, default_value = "")]
    pub summary: String,

    /// Current location as free text, e.g. "Osu, Accra"
    #[arg(long)]
    pub location: String,

    /// Geocode and select only; nothing is submitted or archived
    #[arg(long)]
    pub dry_run: bool,
}

impl ReferArgs {
    pub fn to_request(&self) -> Result<ReferralRequest> {
        let vitals = VitalSigns {
            blood_pressure: self.blood_pressure.clone(),
            temperature: self.temperature.clone(),
            pulse_rate: self.pulse_rate.clone(),
            oxygen_saturation: self.oxygen_saturation.clone(),
            respiratory_rate: self.respiratory_rate.clone(),
        };
        let draft = SubmissionDraft::new(self.patient_name.clone(), vitals, self.summary.clone())?;
        Ok(ReferralRequest::new(draft, self.location.clone()))
    }
}

#[derive(Debug, Clone, Args)]
pub struct NearestArgs {
    #[arg(long, conflicts_with_all = ["lat", "lon"], required_unless_present_all = ["lat", "lon"])]
    pub location: Option<String>,

    #[arg(long, requires = "lon", allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// List every facility with capacity, nearest first
    #[arg(long)]
    pub all: bool,
}
