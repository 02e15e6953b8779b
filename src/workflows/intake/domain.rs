use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Two-letter codes accepted for addresses, license states, and operating jurisdictions.
pub const US_STATE_CODES: [&str; 51] = [
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC",
];

pub fn is_us_state(code: &str) -> bool {
    US_STATE_CODES.contains(&code)
}

/// Whole calendar years from `start` to `today`, reduced by one when the anniversary
/// has not yet been reached this year.
pub fn completed_years(start: NaiveDate, today: NaiveDate) -> i32 {
    let mut years = today.year() - start.year();
    if (today.month(), today.day()) < (start.month(), start.day()) {
        years -= 1;
    }
    years
}

/// Canonical record of everything collected during one intake session.
///
/// Every section is always present; unanswered questions are `None` or empty
/// collections rather than missing keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IntakeData {
    pub knockout: Knockout,
    pub risk_profile: RiskProfile,
    pub business: Business,
    pub operations: Operations,
    pub vehicles: Vec<Vehicle>,
    pub drivers: Vec<Driver>,
    pub prior_insurance: PriorInsurance,
    pub loss_history: LossHistory,
    pub coverage_preferences: CoveragePreferences,
    pub documents: Vec<UploadedDocument>,
}

impl IntakeData {
    /// Clears repeating sub-records whose owning "has X" flag is false.
    pub fn normalize(&mut self) {
        for driver in &mut self.drivers {
            if !driver.has_accidents {
                driver.accidents.clear();
            }
            if !driver.has_violations {
                driver.violations.clear();
            }
        }
    }

    pub fn garaging_address(&self) -> &Address {
        match (&self.business.garaging_address_different, &self.business.garaging_address) {
            (true, Some(address)) => address,
            _ => &self.business.mailing_address,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub county: Option<String>,
}

impl Address {
    /// Single-line rendering: `street, city, ST zip`.
    pub fn one_line(&self) -> String {
        format!("{}, {}, {} {}", self.street, self.city, self.state, self.zip)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum KnockoutQuestion {
    AuthorityRevoked,
    SafetyRatingUnsatisfactory,
    DriverLicenseRevoked,
    FraudConviction,
    BankruptcyFiled,
    InsuranceCancelledNonPayment,
}

impl KnockoutQuestion {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::AuthorityRevoked,
            Self::SafetyRatingUnsatisfactory,
            Self::DriverLicenseRevoked,
            Self::FraudConviction,
            Self::BankruptcyFiled,
            Self::InsuranceCancelledNonPayment,
        ]
    }

    pub const fn field_name(self) -> &'static str {
        match self {
            Self::AuthorityRevoked => "authorityRevoked",
            Self::SafetyRatingUnsatisfactory => "safetyRatingUnsatisfactory",
            Self::DriverLicenseRevoked => "driverLicenseRevoked",
            Self::FraudConviction => "fraudConviction",
            Self::BankruptcyFiled => "bankruptcyFiled",
            Self::InsuranceCancelledNonPayment => "insuranceCancelledNonPayment",
        }
    }

    pub const fn prompt(self) -> &'static str {
        match self {
            Self::AuthorityRevoked => {
                "Has your operating authority (DOT/MC) ever been revoked or suspended?"
            }
            Self::SafetyRatingUnsatisfactory => {
                "Is your current DOT Safety Rating \"Unsatisfactory\"?"
            }
            Self::DriverLicenseRevoked => {
                "Has any driver had their license revoked in the last 5 years?"
            }
            Self::FraudConviction => "Has your business been convicted of fraud?",
            Self::BankruptcyFiled => "Has your business filed for bankruptcy in the last 5 years?",
            Self::InsuranceCancelledNonPayment => {
                "Has your insurance been cancelled for non-payment in the last 3 years?"
            }
        }
    }
}

/// Six disqualifying screening questions. Any `Some(true)` disqualifies the applicant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Knockout {
    pub authority_revoked: Option<bool>,
    pub safety_rating_unsatisfactory: Option<bool>,
    pub driver_license_revoked: Option<bool>,
    pub fraud_conviction: Option<bool>,
    pub bankruptcy_filed: Option<bool>,
    pub insurance_cancelled_non_payment: Option<bool>,
}

impl Knockout {
    pub fn answer(&self, question: KnockoutQuestion) -> Option<bool> {
        match question {
            KnockoutQuestion::AuthorityRevoked => self.authority_revoked,
            KnockoutQuestion::SafetyRatingUnsatisfactory => self.safety_rating_unsatisfactory,
            KnockoutQuestion::DriverLicenseRevoked => self.driver_license_revoked,
            KnockoutQuestion::FraudConviction => self.fraud_conviction,
            KnockoutQuestion::BankruptcyFiled => self.bankruptcy_filed,
            KnockoutQuestion::InsuranceCancelledNonPayment => self.insurance_cancelled_non_payment,
        }
    }

    pub fn set(&mut self, question: KnockoutQuestion, answer: Option<bool>) {
        let slot = match question {
            KnockoutQuestion::AuthorityRevoked => &mut self.authority_revoked,
            KnockoutQuestion::SafetyRatingUnsatisfactory => &mut self.safety_rating_unsatisfactory,
            KnockoutQuestion::DriverLicenseRevoked => &mut self.driver_license_revoked,
            KnockoutQuestion::FraudConviction => &mut self.fraud_conviction,
            KnockoutQuestion::BankruptcyFiled => &mut self.bankruptcy_filed,
            KnockoutQuestion::InsuranceCancelledNonPayment => {
                &mut self.insurance_cancelled_non_payment
            }
        };
        *slot = answer;
    }

    pub fn all_answered(&self) -> bool {
        KnockoutQuestion::ordered()
            .iter()
            .all(|question| self.answer(*question).is_some())
    }

    pub fn is_disqualifying(&self) -> bool {
        KnockoutQuestion::ordered()
            .iter()
            .any(|question| self.answer(*question) == Some(true))
    }

    pub fn triggered(&self) -> Vec<KnockoutQuestion> {
        KnockoutQuestion::ordered()
            .into_iter()
            .filter(|question| self.answer(*question) == Some(true))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HazmatType {
    Flammables,
    Corrosives,
    Explosives,
    Radioactive,
    Other,
}

impl HazmatType {
    pub const fn code(self) -> &'static str {
        match self {
            Self::Flammables => "flammables",
            Self::Corrosives => "corrosives",
            Self::Explosives => "explosives",
            Self::Radioactive => "radioactive",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CargoType {
    GeneralFreight,
    Refrigerated,
    DryVan,
    Flatbed,
    Tanker,
    AutoHauler,
    HouseholdGoods,
    Intermodal,
    Oversized,
    Other,
}

impl CargoType {
    pub const fn code(self) -> &'static str {
        match self {
            Self::GeneralFreight => "general_freight",
            Self::Refrigerated => "refrigerated",
            Self::DryVan => "dry_van",
            Self::Flatbed => "flatbed",
            Self::Tanker => "tanker",
            Self::AutoHauler => "auto_hauler",
            Self::HouseholdGoods => "household_goods",
            Self::Intermodal => "intermodal",
            Self::Oversized => "oversized",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatingRadius {
    Local,
    Regional,
    LongRegional,
    LongHaul,
}

impl OperatingRadius {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Local => "Local (<50 miles)",
            Self::Regional => "Regional (50-200 miles)",
            Self::LongRegional => "Long Regional (200-500 miles)",
            Self::LongHaul => "Long Haul (500+ miles)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskProfile {
    pub hazmat: Option<bool>,
    pub hazmat_types: BTreeSet<HazmatType>,
    pub radius: Option<OperatingRadius>,
    pub fleet_size: Option<u32>,
    pub cargo_types: BTreeSet<CargoType>,
    pub leases_on_to_carrier: Option<bool>,
    pub motor_carrier_leased_to: Option<String>,
    pub refrigerated_cargo: Option<bool>,
    pub reefer_breakdown_coverage: Option<bool>,
    pub trailer_interchange: Option<bool>,
    pub trailer_interchange_count: Option<u32>,
    pub trailer_interchange_zones: Option<String>,
    pub trailer_interchange_radius: Option<u32>,
    pub new_venture: Option<bool>,
    pub accidents_last3_years: Option<u32>,
    pub es_market_flags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Individual,
    Partnership,
    Corporation,
    Llc,
    Other,
}

impl EntityType {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Individual,
            Self::Partnership,
            Self::Corporation,
            Self::Llc,
            Self::Other,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual/Sole Proprietor",
            Self::Partnership => "Partnership",
            Self::Corporation => "Corporation",
            Self::Llc => "Limited Liability Company (LLC)",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    pub legal_name: String,
    pub dba: Option<String>,
    pub mailing_address: Address,
    pub phone: String,
    pub fein: String,
    pub entity_type: Option<EntityType>,
    pub website: Option<String>,
    pub date_started: Option<NaiveDate>,
    pub dot_number: String,
    pub mc_number: Option<String>,
    pub annual_revenue: Option<f64>,
    pub full_time_employees: Option<u32>,
    pub part_time_employees: Option<u32>,
    pub garaging_address_different: bool,
    pub garaging_address: Option<Address>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyProgramComponent {
    SafetyManual,
    SafetyDirector,
    MonthlyMeetings,
    OshaCompliance,
}

impl SafetyProgramComponent {
    pub const fn code(self) -> &'static str {
        match self {
            Self::SafetyManual => "safety_manual",
            Self::SafetyDirector => "safety_director",
            Self::MonthlyMeetings => "monthly_meetings",
            Self::OshaCompliance => "osha_compliance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TelematicsFeature {
    DriverSafety,
    FuelTracking,
    MaintenanceAlerts,
    MileageTracking,
    GpsTracking,
}

impl TelematicsFeature {
    pub const fn code(self) -> &'static str {
        match self {
            Self::DriverSafety => "driver_safety",
            Self::FuelTracking => "fuel_tracking",
            Self::MaintenanceAlerts => "maintenance_alerts",
            Self::MileageTracking => "mileage_tracking",
            Self::GpsTracking => "gps_tracking",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operations {
    pub cargo_description: String,
    pub states_of_operation: BTreeSet<String>,
    pub crosses_state_lines: Option<bool>,
    pub has_safety_program: Option<bool>,
    pub safety_program_components: BTreeSet<SafetyProgramComponent>,
    pub has_maintenance_program: Option<bool>,
    pub has_telematics: Option<bool>,
    pub telematics_features: BTreeSet<TelematicsFeature>,
    pub telematics_fleet_percentage: Option<u32>,
    pub checks_mvrs: Option<bool>,
    pub family_drivers: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleBodyType {
    Tractor,
    StraightTruck,
    BoxTruck,
    Flatbed,
    Tanker,
    DumpTruck,
    Other,
}

impl VehicleBodyType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Tractor => "Tractor",
            Self::StraightTruck => "Straight Truck",
            Self::BoxTruck => "Box Truck",
            Self::Flatbed => "Flatbed",
            Self::Tanker => "Tanker",
            Self::DumpTruck => "Dump Truck",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lienholder {
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub year: Option<i32>,
    pub make: String,
    pub model: String,
    pub vin: String,
    pub body_type: Option<VehicleBodyType>,
    pub gvw: Option<u32>,
    pub stated_value: Option<f64>,
    pub radius: Option<OperatingRadius>,
    pub for_hire: Option<bool>,
    pub has_lienholder: bool,
    pub lienholder: Option<Lienholder>,
    pub use_business_garaging_address: bool,
    pub garaging_address: Option<Address>,
    pub vin_pending: bool,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            year: None,
            make: String::new(),
            model: String::new(),
            vin: String::new(),
            body_type: None,
            gvw: None,
            stated_value: None,
            radius: None,
            for_hire: None,
            has_lienholder: false,
            lienholder: None,
            use_business_garaging_address: true,
            garaging_address: None,
            vin_pending: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationType {
    Speeding,
    RecklessDriving,
    DuiDwi,
    LogbookViolation,
    Other,
}

impl ViolationType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Speeding => "Speeding",
            Self::RecklessDriving => "Reckless Driving",
            Self::DuiDwi => "DUI/DWI",
            Self::LogbookViolation => "Logbook Violation",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accident {
    pub date: Option<NaiveDate>,
    pub description: String,
    pub at_fault: bool,
    pub amount_paid: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub violation_type: ViolationType,
    pub description: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub full_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub license_number: String,
    pub license_state: Option<String>,
    pub years_experience: Option<u32>,
    pub date_hired: Option<NaiveDate>,
    pub has_accidents: bool,
    pub accidents: Vec<Accident>,
    pub has_violations: bool,
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShoppingReason {
    RenewalComingUp,
    WantBetterRates,
    NeedHigherLimits,
    NonRenewed,
    Cancelled,
    Other,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorInsurance {
    pub currently_insured: Option<bool>,
    pub carrier_name: Option<String>,
    pub policy_number: Option<String>,
    pub annual_premium: Option<f64>,
    pub effective_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub shopping_reason: Option<ShoppingReason>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClaimType {
    Collision,
    CargoDamage,
    BodilyInjuryLiability,
    PropertyDamageLiability,
    Comprehensive,
    Other,
}

impl ClaimType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Collision => "Collision",
            Self::CargoDamage => "Cargo Damage",
            Self::BodilyInjuryLiability => "Bodily Injury Liability",
            Self::PropertyDamageLiability => "Property Damage Liability",
            Self::Comprehensive => "Comprehensive",
            Self::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    pub date_of_loss: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub claim_type: ClaimType,
    pub description: String,
    pub amount_paid: f64,
    pub amount_reserved: f64,
    pub still_open: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LossHistory {
    pub has_claims: Option<bool>,
    pub claims: Vec<Claim>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiabilityLimit {
    #[serde(rename = "500000")]
    FiveHundredThousand,
    #[serde(rename = "750000")]
    SevenFiftyThousand,
    #[serde(rename = "1000000")]
    OneMillion,
    #[serde(rename = "other")]
    Other,
}

impl LiabilityLimit {
    /// Dollar amount of a preset limit; `None` for the custom variant.
    pub const fn amount(self) -> Option<u64> {
        match self {
            Self::FiveHundredThousand => Some(500_000),
            Self::SevenFiftyThousand => Some(750_000),
            Self::OneMillion => Some(1_000_000),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Deductible {
    #[serde(rename = "1000")]
    OneThousand,
    #[serde(rename = "2500")]
    TwentyFiveHundred,
    #[serde(rename = "5000")]
    FiveThousand,
    #[serde(rename = "other")]
    Other,
}

impl Deductible {
    pub const fn amount(self) -> Option<u64> {
        match self {
            Self::OneThousand => Some(1_000),
            Self::TwentyFiveHundred => Some(2_500),
            Self::FiveThousand => Some(5_000),
            Self::Other => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveragePreferences {
    pub liability_limit: Option<LiabilityLimit>,
    pub liability_limit_other: Option<f64>,
    pub comprehensive_deductible: Option<Deductible>,
    pub comprehensive_deductible_other: Option<f64>,
    pub collision_deductible: Option<Deductible>,
    pub collision_deductible_other: Option<f64>,
    pub hired_auto_coverage: Option<bool>,
    pub non_owned_auto_coverage: Option<bool>,
}

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    LossRuns,
    AuthorityLetter,
    VehicleSchedule,
    DriverList,
    CurrentDecPage,
    IftaCredentials,
}

impl DocumentType {
    pub const fn code(self) -> &'static str {
        match self {
            Self::LossRuns => "loss_runs",
            Self::AuthorityLetter => "authority_letter",
            Self::VehicleSchedule => "vehicle_schedule",
            Self::DriverList => "driver_list",
            Self::CurrentDecPage => "current_dec_page",
            Self::IftaCredentials => "ifta_credentials",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LossRuns => "Loss Runs",
            Self::AuthorityLetter => "MC/DOT Authority Letter",
            Self::VehicleSchedule => "Vehicle Schedule",
            Self::DriverList => "Driver List",
            Self::CurrentDecPage => "Current Dec Page",
            Self::IftaCredentials => "IFTA Credentials",
        }
    }

    /// Prefix used for the file inside a submission package.
    pub const fn package_prefix(self) -> &'static str {
        match self {
            Self::LossRuns => "Loss_Runs",
            Self::AuthorityLetter => "MC_DOT_Authority_Letter",
            Self::VehicleSchedule => "Vehicle_Schedule",
            Self::DriverList => "Driver_List",
            Self::CurrentDecPage => "Current_Dec_Page",
            Self::IftaCredentials => "IFTA_Credentials",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code.trim() {
            "loss_runs" => Some(Self::LossRuns),
            "authority_letter" => Some(Self::AuthorityLetter),
            "vehicle_schedule" => Some(Self::VehicleSchedule),
            "driver_list" => Some(Self::DriverList),
            "current_dec_page" => Some(Self::CurrentDecPage),
            "ifta_credentials" => Some(Self::IftaCredentials),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadFormat {
    Pdf,
    Jpeg,
    Png,
}

impl UploadFormat {
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub file_name: String,
    pub file_size: u64,
    pub format: UploadFormat,
    pub uploaded_at: DateTime<Utc>,
    pub file_reference: String,
}
