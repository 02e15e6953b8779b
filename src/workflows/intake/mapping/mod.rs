//! Projection of the intake record onto the fixed field schemas of the
//! ACORD 125 application, the ACORD 127 trucking supplement, and the
//! ACORD 129 vehicle continuation.

pub mod format;

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    completed_years, Address, Driver, EntityType, IntakeData, KnockoutQuestion, Vehicle,
};

/// Vehicles and drivers listed directly on the supplement.
pub const SUPPLEMENT_CAPACITY: usize = 4;
/// Loss slots on the application.
pub const CLAIM_SLOTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Application,
    TruckingSupplement,
    VehicleContinuation,
}

impl DocumentKind {
    pub const fn form_number(self) -> &'static str {
        match self {
            Self::Application => "125",
            Self::TruckingSupplement => "127",
            Self::VehicleContinuation => "129",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            Self::Application => "ACORD 125 - Commercial Insurance Application",
            Self::TruckingSupplement => "ACORD 127 - Business Auto / Trucking Supplement",
            Self::VehicleContinuation => "ACORD 129 - Vehicle Schedule (Continuation)",
        }
    }

    /// Kinds to render for `data`, in package order. The continuation only
    /// appears when vehicles overflow the supplement.
    pub fn required_for(data: &IntakeData) -> Vec<Self> {
        let mut kinds = vec![Self::Application, Self::TruckingSupplement];
        if data.vehicles.len() > SUPPLEMENT_CAPACITY {
            kinds.push(Self::VehicleContinuation);
        }
        kinds
    }
}

/// One projected field value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Text(String),
    Number(i64),
    YesNo(bool),
    Empty,
}

impl FieldValue {
    fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value)
        }
    }

    fn optional_text(value: Option<impl Into<String>>) -> Self {
        value.map_or(Self::Empty, Self::text)
    }

    fn number(value: Option<impl Into<i64>>) -> Self {
        value.map_or(Self::Empty, |value| Self::Number(value.into()))
    }

    fn flag(value: Option<bool>) -> Self {
        value.map_or(Self::Empty, Self::YesNo)
    }

    fn date(value: Option<NaiveDate>) -> Self {
        value.map_or(Self::Empty, |value| Self::Text(format::date(value)))
    }

    fn currency(value: Option<f64>) -> Self {
        value.map_or(Self::Empty, |value| Self::Text(format::currency(value)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => write!(f, "{number}"),
            Self::YesNo(true) => f.write_str("Yes"),
            Self::YesNo(false) => f.write_str("No"),
            Self::Empty => Ok(()),
        }
    }
}

pub type FieldList = Vec<(String, FieldValue)>;

#[derive(Default)]
struct Fields(FieldList);

impl Fields {
    fn put(&mut self, name: impl Into<String>, value: FieldValue) {
        self.0.push((name.into(), value));
    }
}

/// Projects `data` onto the field schema of `kind`.
///
/// Every schema slot is emitted; missing answers map to [`FieldValue::Empty`].
/// `today` anchors the years-in-business calculation.
pub fn project(data: &IntakeData, kind: DocumentKind, today: NaiveDate) -> FieldList {
    let mut fields = Fields::default();
    match kind {
        DocumentKind::Application => application(data, today, &mut fields),
        DocumentKind::TruckingSupplement => supplement(data, &mut fields),
        DocumentKind::VehicleContinuation => continuation(data, &mut fields),
    }
    fields.0
}

fn application(data: &IntakeData, today: NaiveDate, fields: &mut Fields) {
    let business = &data.business;
    let mailing = &business.mailing_address;

    fields.put("NamedInsured", FieldValue::text(business.legal_name.as_str()));
    fields.put("DBA", FieldValue::optional_text(business.dba.as_deref()));
    fields.put("MailingAddress", FieldValue::text(mailing.street.as_str()));
    fields.put("City", FieldValue::text(mailing.city.as_str()));
    fields.put("State", FieldValue::text(mailing.state.as_str()));
    fields.put("ZIP", FieldValue::text(mailing.zip.as_str()));
    fields.put("Phone", FieldValue::text(business.phone.as_str()));
    fields.put("Website", FieldValue::optional_text(business.website.as_deref()));
    fields.put("FEIN", FieldValue::text(business.fein.as_str()));

    for (name, entity) in [
        ("Individual", EntityType::Individual),
        ("Partnership", EntityType::Partnership),
        ("Corporation", EntityType::Corporation),
        ("LLC", EntityType::Llc),
        ("Other", EntityType::Other),
    ] {
        fields.put(name, FieldValue::YesNo(business.entity_type == Some(entity)));
    }

    fields.put(
        "YearsInBusiness",
        FieldValue::number(business.date_started.map(|started| completed_years(started, today))),
    );
    fields.put("AnnualRevenue", FieldValue::currency(business.annual_revenue));
    fields.put("FullTimeEmployees", FieldValue::number(business.full_time_employees));
    fields.put("PartTimeEmployees", FieldValue::number(business.part_time_employees));

    let mut description = format!(
        "{}\nDOT: {}",
        data.operations.cargo_description, business.dot_number
    );
    if let Some(mc) = business.mc_number.as_deref().filter(|mc| !mc.is_empty()) {
        description.push_str(&format!(" | MC: {mc}"));
    }
    fields.put("DescriptionOfOperations", FieldValue::text(description));
    fields.put("DOTNumber", FieldValue::text(business.dot_number.as_str()));
    fields.put("MCNumber", FieldValue::optional_text(business.mc_number.as_deref()));

    let prior = &data.prior_insurance;
    fields.put("CurrentlyInsured", FieldValue::flag(prior.currently_insured));
    fields.put("PriorCarrier", FieldValue::optional_text(prior.carrier_name.as_deref()));
    fields.put("PolicyNumber", FieldValue::optional_text(prior.policy_number.as_deref()));
    fields.put("EffectiveDate", FieldValue::date(prior.effective_date));
    fields.put("ExpirationDate", FieldValue::date(prior.expiration_date));
    fields.put("AnnualPremium", FieldValue::currency(prior.annual_premium));

    let coverage = &data.coverage_preferences;
    fields.put(
        "LiabilityLimit",
        FieldValue::optional_text(format::liability_limit(
            coverage.liability_limit,
            coverage.liability_limit_other,
        )),
    );
    fields.put(
        "ComprehensiveDeductible",
        FieldValue::optional_text(format::deductible(
            coverage.comprehensive_deductible,
            coverage.comprehensive_deductible_other,
        )),
    );
    fields.put(
        "CollisionDeductible",
        FieldValue::optional_text(format::deductible(
            coverage.collision_deductible,
            coverage.collision_deductible_other,
        )),
    );
    fields.put("HiredAuto", FieldValue::flag(coverage.hired_auto_coverage));
    fields.put("NonOwnedAuto", FieldValue::flag(coverage.non_owned_auto_coverage));
    fields.put("Truckers", FieldValue::YesNo(true));
    fields.put("MotorCarrier", FieldValue::YesNo(true));

    for slot in 0..CLAIM_SLOTS {
        let prefix = format!("LossClaim{}", slot + 1);
        let claim = data.loss_history.claims.get(slot);
        fields.put(
            format!("{prefix}_Date"),
            FieldValue::date(claim.and_then(|claim| claim.date_of_loss)),
        );
        fields.put(
            format!("{prefix}_Type"),
            FieldValue::optional_text(claim.map(|claim| claim.claim_type.label())),
        );
        fields.put(
            format!("{prefix}_AmountPaid"),
            FieldValue::currency(claim.map(|claim| claim.amount_paid)),
        );
        fields.put(
            format!("{prefix}_AmountReserved"),
            FieldValue::currency(claim.map(|claim| claim.amount_reserved)),
        );
        fields.put(
            format!("{prefix}_Description"),
            FieldValue::optional_text(claim.map(|claim| claim.description.as_str())),
        );
    }

    for (name, question) in [
        ("AuthorityRevoked", KnockoutQuestion::AuthorityRevoked),
        ("SafetyRatingUnsatisfactory", KnockoutQuestion::SafetyRatingUnsatisfactory),
        ("DriverLicenseRevoked", KnockoutQuestion::DriverLicenseRevoked),
        ("FraudConviction", KnockoutQuestion::FraudConviction),
        ("BankruptcyFiled", KnockoutQuestion::BankruptcyFiled),
        ("InsuranceCancelled", KnockoutQuestion::InsuranceCancelledNonPayment),
    ] {
        fields.put(name, FieldValue::flag(data.knockout.answer(question)));
    }
}

fn supplement(data: &IntakeData, fields: &mut Fields) {
    let business = &data.business;
    let risk = &data.risk_profile;
    let ops = &data.operations;
    let garaging = data.garaging_address();

    fields.put("NamedInsured", FieldValue::text(business.legal_name.as_str()));
    fields.put("DOTNumber", FieldValue::text(business.dot_number.as_str()));
    fields.put("MCNumber", FieldValue::optional_text(business.mc_number.as_deref()));
    fields.put("GaragingAddress", FieldValue::text(garaging.street.as_str()));
    fields.put("GaragingCity", FieldValue::text(garaging.city.as_str()));
    fields.put("GaragingState", FieldValue::text(garaging.state.as_str()));
    fields.put("GaragingZIP", FieldValue::text(garaging.zip.as_str()));

    fields.put("Q1_InterstateCommerce", FieldValue::flag(ops.crosses_state_lines));
    fields.put(
        "Q2_RadiusOfOperation",
        FieldValue::optional_text(risk.radius.map(|radius| radius.label())),
    );
    fields.put("Q3_MaintenanceProgram", FieldValue::flag(ops.has_maintenance_program));
    fields.put(
        "Q4_StatesOfOperation",
        FieldValue::text(
            ops.states_of_operation
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(", "),
        ),
    );
    fields.put(
        "Q5_CargoTypes",
        FieldValue::text(format::joined_codes(risk.cargo_types.iter().map(|cargo| cargo.code()))),
    );
    fields.put("Q6_FleetSize", FieldValue::number(risk.fleet_size));
    fields.put("Q7_HazmatCargo", FieldValue::flag(risk.hazmat));
    fields.put(
        "Q7a_HazmatTypes",
        FieldValue::text(format::joined_codes(risk.hazmat_types.iter().map(|kind| kind.code()))),
    );
    fields.put("Q8_RefrigeratedCargo", FieldValue::flag(risk.refrigerated_cargo));
    fields.put("Q8a_ReeferBreakdown", FieldValue::flag(risk.reefer_breakdown_coverage));
    fields.put("Q9_TrailerInterchange", FieldValue::flag(risk.trailer_interchange));
    fields.put("Q9a_TrailerCount", FieldValue::number(risk.trailer_interchange_count));
    fields.put(
        "Q9b_TrailerZones",
        FieldValue::optional_text(risk.trailer_interchange_zones.as_deref()),
    );
    fields.put("Q9c_TrailerRadius", FieldValue::number(risk.trailer_interchange_radius));
    fields.put("Q10_ChecksMVRs", FieldValue::flag(ops.checks_mvrs));
    fields.put("Q11_FamilyDrivers", FieldValue::flag(ops.family_drivers));
    fields.put("Q12_LeasesOn", FieldValue::flag(risk.leases_on_to_carrier));
    fields.put(
        "Q12a_MotorCarrier",
        FieldValue::optional_text(risk.motor_carrier_leased_to.as_deref()),
    );
    fields.put("Q13_NewVenture", FieldValue::flag(risk.new_venture));
    fields.put("Q14_Accidents3Years", FieldValue::number(risk.accidents_last3_years));
    fields.put("Q15_SafetyProgram", FieldValue::flag(ops.has_safety_program));
    fields.put(
        "Q15a_SafetyComponents",
        FieldValue::text(format::joined_codes(
            ops.safety_program_components.iter().map(|component| component.code()),
        )),
    );
    fields.put("Q17_Telematics", FieldValue::flag(ops.has_telematics));
    fields.put(
        "Q17a_TelematicsFeatures",
        FieldValue::text(format::joined_codes(
            ops.telematics_features.iter().map(|feature| feature.code()),
        )),
    );
    fields.put("Q17b_FleetPercentage", FieldValue::number(ops.telematics_fleet_percentage));

    for slot in 0..SUPPLEMENT_CAPACITY {
        driver_fields(slot + 1, data.drivers.get(slot), fields);
    }
    for slot in 0..SUPPLEMENT_CAPACITY {
        vehicle_fields(slot + 1, data.vehicles.get(slot), garaging, fields);
    }
}

fn continuation(data: &IntakeData, fields: &mut Fields) {
    let policy_number = data
        .prior_insurance
        .policy_number
        .as_deref()
        .filter(|number| !number.trim().is_empty())
        .unwrap_or("TBD");
    fields.put("NamedInsured", FieldValue::text(data.business.legal_name.as_str()));
    fields.put("PolicyNumber", FieldValue::text(policy_number));

    let garaging = data.garaging_address();
    for (offset, vehicle) in data.vehicles.iter().enumerate().skip(SUPPLEMENT_CAPACITY) {
        vehicle_fields(offset + 1, Some(vehicle), garaging, fields);
    }
}

fn driver_fields(number: usize, driver: Option<&Driver>, fields: &mut Fields) {
    let prefix = format!("Driver{number}");
    fields.put(
        format!("{prefix}_Name"),
        FieldValue::optional_text(driver.map(|driver| driver.full_name.as_str())),
    );
    fields.put(
        format!("{prefix}_DOB"),
        FieldValue::date(driver.and_then(|driver| driver.date_of_birth)),
    );
    fields.put(
        format!("{prefix}_License"),
        FieldValue::optional_text(driver.map(|driver| driver.license_number.as_str())),
    );
    fields.put(
        format!("{prefix}_State"),
        FieldValue::optional_text(driver.and_then(|driver| driver.license_state.as_deref())),
    );
    fields.put(
        format!("{prefix}_Experience"),
        FieldValue::number(driver.and_then(|driver| driver.years_experience)),
    );
    fields.put(
        format!("{prefix}_DateHired"),
        FieldValue::date(driver.and_then(|driver| driver.date_hired)),
    );
    fields.put(
        format!("{prefix}_Violations"),
        FieldValue::optional_text(driver.map(violation_summary)),
    );
    fields.put(
        format!("{prefix}_Accidents"),
        FieldValue::optional_text(driver.map(accident_summary)),
    );
}

fn optional_date(value: Option<NaiveDate>) -> String {
    value.map(format::date).unwrap_or_default()
}

fn violation_summary(driver: &Driver) -> String {
    if driver.violations.is_empty() {
        return "None".to_string();
    }
    driver
        .violations
        .iter()
        .map(|violation| {
            format!(
                "{}: {}",
                optional_date(violation.date),
                violation.violation_type.label()
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn accident_summary(driver: &Driver) -> String {
    if driver.accidents.is_empty() {
        return "None".to_string();
    }
    driver
        .accidents
        .iter()
        .map(|accident| {
            format!(
                "{}: {} ({})",
                optional_date(accident.date),
                accident.description,
                if accident.at_fault { "At-Fault" } else { "Not At-Fault" }
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn vehicle_fields(number: usize, vehicle: Option<&Vehicle>, business_garaging: &Address, fields: &mut Fields) {
    let prefix = format!("Vehicle{number}");
    fields.put(
        format!("{prefix}_Year"),
        FieldValue::number(vehicle.and_then(|vehicle| vehicle.year)),
    );
    fields.put(
        format!("{prefix}_Make"),
        FieldValue::optional_text(vehicle.map(|vehicle| vehicle.make.as_str())),
    );
    fields.put(
        format!("{prefix}_Model"),
        FieldValue::optional_text(vehicle.map(|vehicle| vehicle.model.as_str())),
    );
    fields.put(
        format!("{prefix}_VIN"),
        FieldValue::optional_text(vehicle.map(|vehicle| vehicle.vin.as_str())),
    );
    fields.put(
        format!("{prefix}_BodyType"),
        FieldValue::optional_text(vehicle.and_then(|vehicle| vehicle.body_type).map(|body| body.label())),
    );
    fields.put(
        format!("{prefix}_GVW"),
        FieldValue::optional_text(
            vehicle
                .and_then(|vehicle| vehicle.gvw)
                .map(|gvw| format::group_thousands(u64::from(gvw))),
        ),
    );
    fields.put(
        format!("{prefix}_Value"),
        FieldValue::currency(vehicle.and_then(|vehicle| vehicle.stated_value)),
    );
    fields.put(
        format!("{prefix}_Radius"),
        FieldValue::optional_text(vehicle.and_then(|vehicle| vehicle.radius).map(|radius| radius.label())),
    );
    fields.put(
        format!("{prefix}_ForHire"),
        FieldValue::flag(vehicle.and_then(|vehicle| vehicle.for_hire)),
    );

    let garaging = vehicle.and_then(|vehicle| {
        if vehicle.use_business_garaging_address {
            Some(business_garaging)
        } else {
            vehicle.garaging_address.as_ref()
        }
    });
    fields.put(
        format!("{prefix}_Garaging"),
        FieldValue::optional_text(garaging.map(Address::one_line)),
    );

    let lienholder = vehicle.map(|vehicle| match (&vehicle.lienholder, vehicle.has_lienholder) {
        (Some(lienholder), true) => {
            format!("{}, {}", lienholder.name, lienholder.address.one_line())
        }
        _ => "None".to_string(),
    });
    fields.put(format!("{prefix}_Lienholder"), FieldValue::optional_text(lienholder));
}
