use chrono::{Datelike, Local, NaiveDate};
use fleet_intake::config::AppConfig;
use fleet_intake::error::AppError;
use fleet_intake::telemetry;
use fleet_intake::workflows::intake::domain::{
    Address, Business, CargoType, CoveragePreferences, Deductible, Driver, EntityType,
    LiabilityLimit, LossHistory, OperatingRadius, Operations, PriorInsurance, RiskProfile,
    SafetyProgramComponent, ShoppingReason, Vehicle, VehicleBodyType,
};
use fleet_intake::workflows::intake::{
    accept_upload, document_count, AssemblyError, DocumentCompiler, DocumentType,
    InMemoryStore, InMemoryUploadStore, IntakeSession, KnockoutQuestion, PackageAssembler,
    PersistenceAdapter, ResumeChoice, SessionBootstrap, TarGzArchive, Transition,
};
use std::sync::Arc;

use crate::cli::DemoArgs;

const SAMPLE_AUTHORITY_LETTER: &[u8] = b"%PDF-1.4\n% operating authority letter placeholder\n%%EOF\n";

pub async fn run(args: DemoArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let persistence = PersistenceAdapter::new(Arc::new(InMemoryStore::new()), config.intake.save_debounce);
    let mut session = SessionBootstrap::open(persistence)
        .start(ResumeChoice::Discard)
        .with_today(today);

    println!("Fleet intake demo ({} vehicles, evaluated {today})", args.vehicles);

    for question in KnockoutQuestion::ordered() {
        session.set_knockout(question, Some(false))?;
    }
    step(&mut session)?;

    session.edit(|data| data.risk_profile = sample_risk_profile(args.vehicles))?;
    step(&mut session)?;

    session.edit(|data| {
        data.business = sample_business(today);
        data.operations = sample_operations();
        data.vehicles = (0..args.vehicles).map(sample_vehicle).collect();
        data.drivers = vec![
            sample_driver("Dana Whitfield", "D1234567", today, 41),
            sample_driver("Marcus Ortega", "D7654321", today, 35),
        ];
        data.prior_insurance = PriorInsurance {
            currently_insured: Some(true),
            carrier_name: Some("Great Plains Mutual".to_string()),
            policy_number: Some("GPM-448812".to_string()),
            annual_premium: Some(48_250.0),
            shopping_reason: Some(ShoppingReason::RenewalComingUp),
            ..PriorInsurance::default()
        };
        data.loss_history = LossHistory {
            has_claims: Some(false),
            claims: Vec::new(),
        };
        data.coverage_preferences = CoveragePreferences {
            liability_limit: Some(LiabilityLimit::OneMillion),
            comprehensive_deductible: Some(Deductible::TwentyFiveHundred),
            collision_deductible: Some(Deductible::TwentyFiveHundred),
            hired_auto_coverage: Some(true),
            non_owned_auto_coverage: Some(true),
            ..CoveragePreferences::default()
        };
    })?;
    step(&mut session)?;

    let uploads = Arc::new(InMemoryUploadStore::new());
    let letter = accept_upload(
        uploads.as_ref(),
        DocumentType::AuthorityLetter,
        "operating-authority.pdf",
        "application/pdf",
        SAMPLE_AUTHORITY_LETTER.to_vec(),
    )?;
    session.attach_document(letter)?;
    step(&mut session)?;

    let snapshot = session.snapshot();
    println!("Documents in package: {}", document_count(&snapshot));

    let assembler = Arc::new(PackageAssembler::new(
        DocumentCompiler::default(),
        TarGzArchive::default(),
        uploads,
    ));
    let package = assembler
        .assemble_in_background(snapshot, today)?
        .await
        .map_err(|error| AssemblyError::Worker(error.to_string()))??;

    std::fs::create_dir_all(&args.out)?;
    let path = args.out.join(&package.file_name);
    std::fs::write(&path, &package.bytes)?;

    println!("Package written to {}", path.display());
    for entry in &package.entries {
        println!("  - {entry}");
    }
    Ok(())
}

fn step(session: &mut IntakeSession<InMemoryStore>) -> Result<(), AppError> {
    let stage = session.current_stage();
    match session.advance()? {
        Transition::Advanced { to, .. } => println!("{stage} complete, moving to {to}"),
        Transition::Submitted => println!("{stage} complete, intake submitted"),
    }
    Ok(())
}

/// Same calendar day `years` earlier; Feb 29 falls back to Feb 28.
fn years_before(today: NaiveDate, years: i32) -> Option<NaiveDate> {
    let year = today.year() - years;
    today
        .with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, today.month(), 28))
}

fn sample_address() -> Address {
    Address {
        street: "4100 Industrial Pkwy".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip: "50313".to_string(),
        county: Some("Polk".to_string()),
    }
}

fn sample_risk_profile(fleet_size: usize) -> RiskProfile {
    RiskProfile {
        hazmat: Some(false),
        radius: Some(OperatingRadius::Regional),
        fleet_size: Some(u32::try_from(fleet_size.max(1)).unwrap_or(1000)),
        cargo_types: [CargoType::GeneralFreight, CargoType::DryVan].into_iter().collect(),
        leases_on_to_carrier: Some(false),
        new_venture: Some(false),
        accidents_last3_years: Some(0),
        ..RiskProfile::default()
    }
}

fn sample_business(today: NaiveDate) -> Business {
    Business {
        legal_name: "Prairie Line Freight LLC".to_string(),
        mailing_address: sample_address(),
        phone: "(515) 555-0142".to_string(),
        fein: "42-1234567".to_string(),
        entity_type: Some(EntityType::Llc),
        website: Some("https://prairieline.example".to_string()),
        date_started: years_before(today, 12),
        dot_number: "3141592".to_string(),
        mc_number: Some("MC-778812".to_string()),
        annual_revenue: Some(2_400_000.0),
        full_time_employees: Some(14),
        part_time_employees: Some(2),
        ..Business::default()
    }
}

fn sample_operations() -> Operations {
    Operations {
        cargo_description: "Palletized dry goods for regional distribution centers".to_string(),
        states_of_operation: ["IA", "MN", "NE", "MO"].into_iter().map(str::to_string).collect(),
        crosses_state_lines: Some(true),
        has_safety_program: Some(true),
        safety_program_components: [
            SafetyProgramComponent::SafetyManual,
            SafetyProgramComponent::MonthlyMeetings,
        ]
        .into_iter()
        .collect(),
        has_maintenance_program: Some(true),
        has_telematics: Some(false),
        checks_mvrs: Some(true),
        family_drivers: Some(false),
        ..Operations::default()
    }
}

fn sample_vehicle(index: usize) -> Vehicle {
    Vehicle {
        year: Some(2019 + (index % 5) as i32),
        make: "Freightliner".to_string(),
        model: "Cascadia".to_string(),
        vin: format!("1FUJGLDR{:09}", index + 1),
        body_type: Some(VehicleBodyType::Tractor),
        gvw: Some(80_000),
        stated_value: Some(95_000.0),
        radius: Some(OperatingRadius::Regional),
        for_hire: Some(true),
        ..Vehicle::default()
    }
}

fn sample_driver(name: &str, license: &str, today: NaiveDate, age: i32) -> Driver {
    Driver {
        full_name: name.to_string(),
        date_of_birth: years_before(today, age),
        license_number: license.to_string(),
        license_state: Some("IA".to_string()),
        years_experience: Some(12),
        date_hired: years_before(today, 4),
        ..Driver::default()
    }
}
