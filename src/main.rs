use anyhow::Context;
use clap::Parser;
use vital_referral::adapters::archive::render_document;
use vital_referral::config::cli::{Command, NearestArgs, ReferArgs};
use vital_referral::config::directory::load_directory;
use vital_referral::utils::error::{ErrorSeverity, ReferralError};
use vital_referral::utils::{logger, validation::Validate};
use vital_referral::{
    CliConfig, Coordinate, DocumentArchive, HttpFormSubmitter, LocalStorage, NominatimGeocoder,
    ReferralConfig, ReferralEngine, ReferralOutcome, RouteBuilder, SelectionResult,
};

type Engine = ReferralEngine<NominatimGeocoder, HttpFormSubmitter, DocumentArchive<LocalStorage>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting vital-referral");
    tracing::debug!("CLI config: {:?}", cli);

    let config = ReferralConfig::from_file(&cli.config).with_context(|| {
        format!(
            "failed to load config file '{}'; make sure it exists and is valid TOML",
            cli.config
        )
    })?;

    // 驗證配置
    if let Err(e) = config.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    let engine = match build_engine(&config) {
        Ok(engine) => engine,
        Err(e) => exit_with(e),
    };

    let result = match &cli.command {
        Command::Refer(args) => refer(engine, args).await,
        Command::Recall { patient_name } => recall(&engine, patient_name).await,
        Command::Nearest(args) => nearest(&engine, args).await,
        Command::Facilities => {
            list_facilities(&engine);
            Ok(())
        }
    };

    if let Err(e) = result {
        exit_with(e);
    }

    Ok(())
}

fn build_engine(config: &ReferralConfig) -> vital_referral::Result<Engine> {
    let directory = load_directory(config)?;
    let geocoder = NominatimGeocoder::new(&config.geocoder)?;
    let submitter = HttpFormSubmitter::new(config.submission.clone())?;
    let archive = DocumentArchive::new(LocalStorage::new(config.archive_path()));
    let routes = RouteBuilder::new(config.maps_base_url())?;

    Ok(ReferralEngine::new(geocoder, submitter, archive, directory, routes))
}

async fn refer(engine: Engine, args: &ReferArgs) -> vital_referral::Result<()> {
    let request = args.to_request()?;
    let engine = engine.with_dry_run(args.dry_run);

    match engine.refer(&request).await? {
        ReferralOutcome::LocationNotFound { query } => {
            println!("📍 Location not found: {}", query);
        }
        ReferralOutcome::NoFacilityAvailable { location } => {
            println!("🏥 No hospital with available beds near {}", location);
        }
        ReferralOutcome::Referred(referral) => {
            println!(
                "🏥 Nearest hospital with available beds: {} ({:.1} km)",
                referral.facility.name, referral.distance_km
            );
            println!("🗺️  Route: {}", referral.route_url);
            match referral.archive_key {
                Some(key) => {
                    println!("📨 Vitals sent to {}", referral.facility.name);
                    println!("📁 Record archived as {}", key);
                }
                None => println!("🔍 Dry run: nothing was submitted or archived"),
            }
        }
    }
    Ok(())
}

async fn recall(engine: &Engine, patient_name: &str) -> vital_referral::Result<()> {
    match engine.recall(patient_name).await? {
        Some(record) => print!("{}", render_document(&record)),
        None => println!("No vital signs found for {}.", patient_name),
    }
    Ok(())
}

async fn nearest(engine: &Engine, args: &NearestArgs) -> vital_referral::Result<()> {
    let location = match (&args.location, args.lat, args.lon) {
        (Some(query), _, _) => match engine.locate(query).await? {
            Some(location) => location,
            None => {
                println!("📍 Location not found: {}", query);
                return Ok(());
            }
        },
        (None, Some(lat), Some(lon)) => {
            let location = Coordinate::new(lat, lon);
            location.validate()?;
            location
        }
        _ => {
            return Err(ReferralError::ValidationError {
                message: "either --location or both --lat and --lon are required".to_string(),
            })
        }
    };

    if args.all {
        let ranked = engine.rank(location);
        if ranked.is_empty() {
            println!("🏥 No hospital with available beds near {}", location);
        }
        for (rank, (facility, distance_km)) in ranked.iter().enumerate() {
            println!(
                "{:>2}. {} ({:.1} km, {} beds)",
                rank + 1,
                facility.name,
                distance_km,
                facility.available_capacity
            );
        }
        return Ok(());
    }

    match engine.nearest(location) {
        SelectionResult::Selected {
            facility,
            distance_km,
        } => println!(
            "🏥 {} ({:.1} km, {} beds)",
            facility.name, distance_km, facility.available_capacity
        ),
        SelectionResult::NoEligibleFacility => {
            println!("🏥 No hospital with available beds near {}", location)
        }
    }
    Ok(())
}

fn list_facilities(engine: &Engine) {
    println!("📋 Facility directory ({} entries):", engine.directory().len());
    for facility in engine.directory() {
        println!(
            "  {} @ {} - {} beds - {}",
            facility.name,
            facility.location,
            facility.available_capacity,
            facility.submission_endpoint
        );
    }
}

fn exit_with(e: ReferralError) -> ! {
    // 記錄詳細錯誤信息
    tracing::error!(
        "❌ Referral failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    // 根據錯誤嚴重程度決定退出碼
    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2,
        ErrorSeverity::High => 1,
        ErrorSeverity::Critical => 3,
    };
    std::process::exit(exit_code)
}
