use std::io::Read;
use std::sync::Arc;
use std::time::Duration;

use axum::response::Response;
use axum::Router;
use chrono::{NaiveDate, Utc};
use serde_json::Value;

use crate::workflows::intake::domain::{
    Address, Business, CargoType, CoveragePreferences, Deductible, DocumentType, Driver,
    EntityType, IntakeData, Knockout, LiabilityLimit, LossHistory, OperatingRadius, Operations,
    PriorInsurance, RiskProfile, UploadFormat, UploadedDocument, Vehicle, VehicleBodyType,
};
use crate::workflows::intake::{
    intake_router, InMemoryStore, InMemoryUploadStore, IntakeService, IntakeSession,
    PersistenceAdapter, UploadStore, ValidationContext,
};

pub(super) const QUIET_PERIOD: Duration = Duration::from_millis(2_000);

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date")
}

pub(super) fn ctx() -> ValidationContext {
    ValidationContext::new(today())
}

pub(super) fn date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    Some(NaiveDate::from_ymd_opt(year, month, day).expect("valid date"))
}

pub(super) fn address() -> Address {
    Address {
        street: "4100 Industrial Pkwy".to_string(),
        city: "Des Moines".to_string(),
        state: "IA".to_string(),
        zip: "50313".to_string(),
        county: Some("Polk".to_string()),
    }
}

pub(super) fn cleared_knockout() -> Knockout {
    Knockout {
        authority_revoked: Some(false),
        safety_rating_unsatisfactory: Some(false),
        driver_license_revoked: Some(false),
        fraud_conviction: Some(false),
        bankruptcy_filed: Some(false),
        insurance_cancelled_non_payment: Some(false),
    }
}

pub(super) fn risk_profile() -> RiskProfile {
    RiskProfile {
        hazmat: Some(false),
        radius: Some(OperatingRadius::Regional),
        fleet_size: Some(6),
        cargo_types: [CargoType::GeneralFreight, CargoType::DryVan].into_iter().collect(),
        leases_on_to_carrier: Some(false),
        new_venture: Some(false),
        accidents_last3_years: Some(1),
        ..RiskProfile::default()
    }
}

pub(super) fn business() -> Business {
    Business {
        legal_name: "Prairie Line Freight LLC".to_string(),
        mailing_address: address(),
        phone: "(515) 555-0142".to_string(),
        fein: "42-1234567".to_string(),
        entity_type: Some(EntityType::Llc),
        website: Some("https://prairieline.example".to_string()),
        date_started: date(2013, 9, 1),
        dot_number: "3141592".to_string(),
        mc_number: Some("MC-778812".to_string()),
        annual_revenue: Some(2_400_000.0),
        full_time_employees: Some(14),
        part_time_employees: Some(2),
        ..Business::default()
    }
}

pub(super) fn operations() -> Operations {
    Operations {
        cargo_description: "Palletized dry goods".to_string(),
        states_of_operation: ["IA", "MN", "NE"].into_iter().map(str::to_string).collect(),
        crosses_state_lines: Some(true),
        has_safety_program: Some(false),
        has_maintenance_program: Some(true),
        has_telematics: Some(false),
        checks_mvrs: Some(true),
        family_drivers: Some(false),
        ..Operations::default()
    }
}

/// Vehicle `number` (1-based) with a VIN that ends in that number.
pub(super) fn vehicle(number: usize) -> Vehicle {
    Vehicle {
        year: Some(2020),
        make: "Freightliner".to_string(),
        model: "Cascadia".to_string(),
        vin: vin(number),
        body_type: Some(VehicleBodyType::Tractor),
        gvw: Some(80_000),
        stated_value: Some(95_000.0),
        radius: Some(OperatingRadius::Regional),
        for_hire: Some(true),
        ..Vehicle::default()
    }
}

pub(super) fn vin(number: usize) -> String {
    format!("1FUJGLDR{number:09}")
}

pub(super) fn driver(name: &str) -> Driver {
    Driver {
        full_name: name.to_string(),
        date_of_birth: date(1984, 3, 2),
        license_number: "D1234567".to_string(),
        license_state: Some("IA".to_string()),
        years_experience: Some(12),
        date_hired: date(2021, 1, 11),
        ..Driver::default()
    }
}

pub(super) fn upload(document_type: DocumentType, file_name: &str, reference: &str) -> UploadedDocument {
    UploadedDocument {
        document_type,
        file_name: file_name.to_string(),
        file_size: 64,
        format: UploadFormat::Pdf,
        uploaded_at: Utc::now(),
        file_reference: reference.to_string(),
    }
}

/// Intake that passes stages 1 to 3; documents are left empty.
pub(super) fn complete_intake(vehicles: usize) -> IntakeData {
    IntakeData {
        knockout: cleared_knockout(),
        risk_profile: risk_profile(),
        business: business(),
        operations: operations(),
        vehicles: (1..=vehicles).map(vehicle).collect(),
        drivers: vec![driver("Dana Whitfield"), driver("Marcus Ortega")],
        prior_insurance: PriorInsurance {
            currently_insured: Some(true),
            carrier_name: Some("Great Plains Mutual".to_string()),
            policy_number: Some("GPM-448812".to_string()),
            annual_premium: Some(48_250.0),
            ..PriorInsurance::default()
        },
        loss_history: LossHistory {
            has_claims: Some(false),
            claims: Vec::new(),
        },
        coverage_preferences: CoveragePreferences {
            liability_limit: Some(LiabilityLimit::OneMillion),
            comprehensive_deductible: Some(Deductible::TwentyFiveHundred),
            collision_deductible: Some(Deductible::OneThousand),
            hired_auto_coverage: Some(true),
            non_owned_auto_coverage: Some(false),
            ..CoveragePreferences::default()
        },
        documents: Vec::new(),
    }
}

/// Stores a small PDF upload and returns its record.
pub(super) fn stored_upload(
    uploads: &InMemoryUploadStore,
    document_type: DocumentType,
    file_name: &str,
) -> UploadedDocument {
    let reference = uploads
        .put(format!("%PDF-1.4 {file_name}").into_bytes())
        .expect("upload stored");
    upload(document_type, file_name, &reference)
}

pub(super) fn session_with(store: Arc<InMemoryStore>) -> IntakeSession<InMemoryStore> {
    IntakeSession::new(PersistenceAdapter::new(store, QUIET_PERIOD)).with_today(today())
}

pub(super) fn session() -> IntakeSession<InMemoryStore> {
    session_with(Arc::new(InMemoryStore::new()))
}

pub(super) type TestService = IntakeService<InMemoryStore, InMemoryUploadStore>;

pub(super) fn service_with(session: IntakeSession<InMemoryStore>) -> (Arc<TestService>, Arc<InMemoryUploadStore>) {
    let uploads = Arc::new(InMemoryUploadStore::new());
    let service = Arc::new(IntakeService::new(session, Arc::clone(&uploads)));
    (service, uploads)
}

pub(super) fn router_for(service: Arc<TestService>) -> Router {
    intake_router(service)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body readable");
    serde_json::from_slice(&body).expect("json body")
}

/// Unpacks a gzip tar into `(name, bytes)` pairs in archive order.
pub(super) fn unpack(bytes: &[u8]) -> Vec<(String, Vec<u8>)> {
    let decoder = flate2::read::GzDecoder::new(bytes);
    let mut archive = tar::Archive::new(decoder);
    archive
        .entries()
        .expect("archive entries")
        .map(|entry| {
            let mut entry = entry.expect("archive entry");
            let name = entry
                .path()
                .expect("entry path")
                .to_string_lossy()
                .into_owned();
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).expect("entry contents");
            (name, contents)
        })
        .collect()
}

pub(super) fn contains(haystack: &[u8], needle: &str) -> bool {
    haystack
        .windows(needle.len())
        .any(|window| window == needle.as_bytes())
}
