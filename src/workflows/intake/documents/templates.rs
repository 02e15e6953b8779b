use std::collections::HashMap;

use chrono::NaiveDate;

use super::layout::{LaidOutDocument, LayoutCursor};
use super::RenderError;
use crate::workflows::intake::mapping::{format, DocumentKind, FieldList, FieldValue, CLAIM_SLOTS, SUPPLEMENT_CAPACITY};

enum Block {
    Section(&'static str),
    Group(String),
    Note(&'static str),
    Field { label: &'static str, name: String },
    Gap(f32),
}

fn field(label: &'static str, name: impl Into<String>) -> Block {
    Block::Field {
        label,
        name: name.into(),
    }
}

const DRIVER_ROWS: &[(&str, &str)] = &[
    ("Name", "Name"),
    ("Date of Birth", "DOB"),
    ("License Number", "License"),
    ("License State", "State"),
    ("Years Experience", "Experience"),
    ("Date Hired", "DateHired"),
    ("Violations", "Violations"),
    ("Accidents", "Accidents"),
];

const VEHICLE_ROWS: &[(&str, &str)] = &[
    ("Year", "Year"),
    ("Make", "Make"),
    ("Model", "Model"),
    ("VIN", "VIN"),
    ("Body Type", "BodyType"),
    ("GVW", "GVW"),
    ("Stated Value", "Value"),
    ("Radius", "Radius"),
    ("For Hire", "ForHire"),
    ("Garaging Address", "Garaging"),
    ("Lienholder", "Lienholder"),
];

const CLAIM_ROWS: &[(&str, &str)] = &[
    ("Date of Loss", "Date"),
    ("Type", "Type"),
    ("Amount Paid", "AmountPaid"),
    ("Amount Reserved", "AmountReserved"),
    ("Description", "Description"),
];

fn repeated(blocks: &mut Vec<Block>, heading: &str, prefix: &str, number: usize, rows: &[(&'static str, &str)]) {
    blocks.push(Block::Group(format!("{heading} #{number}")));
    for &(label, suffix) in rows {
        blocks.push(field(label, format!("{prefix}{number}_{suffix}")));
    }
    blocks.push(Block::Gap(10.0));
}

fn application_blocks() -> Vec<Block> {
    let mut blocks = vec![
        Block::Section("Named Insured"),
        field("Business Name", "NamedInsured"),
        field("DBA", "DBA"),
        field("Mailing Address", "MailingAddress"),
        field("City", "City"),
        field("State", "State"),
        field("ZIP", "ZIP"),
        field("Phone", "Phone"),
        field("Website", "Website"),
        field("FEIN", "FEIN"),
        Block::Section("Entity Type"),
        field("Individual", "Individual"),
        field("Partnership", "Partnership"),
        field("Corporation", "Corporation"),
        field("LLC", "LLC"),
        field("Other", "Other"),
        Block::Section("Business Information"),
        field("Years in Business", "YearsInBusiness"),
        field("Annual Revenue", "AnnualRevenue"),
        field("Full-Time Employees", "FullTimeEmployees"),
        field("Part-Time Employees", "PartTimeEmployees"),
        field("Description of Operations", "DescriptionOfOperations"),
        field("USDOT Number", "DOTNumber"),
        field("MC Number", "MCNumber"),
        Block::Section("Prior Insurance"),
        field("Currently Insured", "CurrentlyInsured"),
        field("Prior Carrier", "PriorCarrier"),
        field("Policy Number", "PolicyNumber"),
        field("Effective Date", "EffectiveDate"),
        field("Expiration Date", "ExpirationDate"),
        field("Annual Premium", "AnnualPremium"),
        Block::Section("Coverage Requested"),
        field("Liability Limit", "LiabilityLimit"),
        field("Comprehensive Deductible", "ComprehensiveDeductible"),
        field("Collision Deductible", "CollisionDeductible"),
        field("Hired Auto", "HiredAuto"),
        field("Non-Owned Auto", "NonOwnedAuto"),
        field("Truckers", "Truckers"),
        field("Motor Carrier", "MotorCarrier"),
        Block::Section("Loss History"),
    ];
    for number in 1..=CLAIM_SLOTS {
        repeated(&mut blocks, "Claim", "LossClaim", number, CLAIM_ROWS);
    }
    blocks.extend([
        Block::Section("Screening Questions"),
        field("Authority Revoked", "AuthorityRevoked"),
        field("Unsatisfactory Safety Rating", "SafetyRatingUnsatisfactory"),
        field("Driver License Revoked", "DriverLicenseRevoked"),
        field("Fraud Conviction", "FraudConviction"),
        field("Bankruptcy Filed", "BankruptcyFiled"),
        field("Insurance Cancelled", "InsuranceCancelled"),
    ]);
    blocks
}

fn supplement_blocks() -> Vec<Block> {
    let mut blocks = vec![
        Block::Section("Named Insured"),
        field("Business Name", "NamedInsured"),
        field("USDOT Number", "DOTNumber"),
        field("MC Number", "MCNumber"),
        Block::Section("Garaging Location"),
        field("Street", "GaragingAddress"),
        field("City", "GaragingCity"),
        field("State", "GaragingState"),
        field("ZIP", "GaragingZIP"),
        Block::Section("Operations"),
        field("1. Interstate commerce", "Q1_InterstateCommerce"),
        field("2. Radius of operation", "Q2_RadiusOfOperation"),
        field("3. Maintenance program", "Q3_MaintenanceProgram"),
        field("4. States of operation", "Q4_StatesOfOperation"),
        field("5. Cargo types", "Q5_CargoTypes"),
        field("6. Fleet size", "Q6_FleetSize"),
        field("7. Hazardous materials", "Q7_HazmatCargo"),
        field("7a. Hazmat classes", "Q7a_HazmatTypes"),
        field("8. Refrigerated cargo", "Q8_RefrigeratedCargo"),
        field("8a. Reefer breakdown coverage", "Q8a_ReeferBreakdown"),
        field("9. Trailer interchange", "Q9_TrailerInterchange"),
        field("9a. Trailers interchanged", "Q9a_TrailerCount"),
        field("9b. Interchange zones", "Q9b_TrailerZones"),
        field("9c. Interchange radius", "Q9c_TrailerRadius"),
        field("10. MVRs checked", "Q10_ChecksMVRs"),
        field("11. Family members drive", "Q11_FamilyDrivers"),
        field("12. Leased on to a carrier", "Q12_LeasesOn"),
        field("12a. Motor carrier", "Q12a_MotorCarrier"),
        field("13. New venture", "Q13_NewVenture"),
        field("14. Accidents (3 years)", "Q14_Accidents3Years"),
        field("15. Safety program", "Q15_SafetyProgram"),
        field("15a. Program components", "Q15a_SafetyComponents"),
        field("17. Telematics", "Q17_Telematics"),
        field("17a. Telematics features", "Q17a_TelematicsFeatures"),
        field("17b. Fleet coverage (%)", "Q17b_FleetPercentage"),
        Block::Section("Driver Schedule"),
    ];
    for number in 1..=SUPPLEMENT_CAPACITY {
        repeated(&mut blocks, "Driver", "Driver", number, DRIVER_ROWS);
    }
    blocks.push(Block::Section("Vehicle Schedule"));
    for number in 1..=SUPPLEMENT_CAPACITY {
        repeated(&mut blocks, "Vehicle", "Vehicle", number, VEHICLE_ROWS);
    }
    blocks
}

fn continuation_blocks(fields: &FieldList) -> Vec<Block> {
    let mut blocks = vec![
        Block::Section("Named Insured"),
        field("Business Name", "NamedInsured"),
        field("Policy Number", "PolicyNumber"),
        Block::Gap(20.0),
        Block::Section("Vehicle Schedule Continuation"),
        Block::Note("The following vehicles are in addition to the vehicles listed on ACORD 127."),
        Block::Gap(6.0),
    ];
    let numbers = fields.iter().filter_map(|(name, _)| {
        name.strip_prefix("Vehicle")?
            .strip_suffix("_Year")?
            .parse::<usize>()
            .ok()
    });
    for number in numbers {
        repeated(&mut blocks, "Vehicle", "Vehicle", number, VEHICLE_ROWS);
    }
    blocks
}

/// Lays out `fields` on the fixed template for `kind`.
pub fn lay_out(
    kind: DocumentKind,
    fields: &FieldList,
    generated_on: NaiveDate,
) -> Result<LaidOutDocument, RenderError> {
    let values: HashMap<&str, &FieldValue> =
        fields.iter().map(|(name, value)| (name.as_str(), value)).collect();
    let blocks = match kind {
        DocumentKind::Application => application_blocks(),
        DocumentKind::TruckingSupplement => supplement_blocks(),
        DocumentKind::VehicleContinuation => continuation_blocks(fields),
    };

    let mut layout = LayoutCursor::new(kind.title());
    layout.heading(kind.title(), &format!("Generated: {}", format::date(generated_on)));
    for block in blocks {
        match block {
            Block::Section(title) => layout.section(title),
            Block::Group(title) => layout.group(&title),
            Block::Note(text) => layout.note(text),
            Block::Gap(points) => layout.gap(points),
            Block::Field { label, name } => {
                let value = values.get(name.as_str()).ok_or_else(|| RenderError::MissingField {
                    kind,
                    field: name.clone(),
                })?;
                layout.field(label, &value.to_string());
            }
        }
    }

    Ok(layout.finish(&format!("ACORD {}", kind.form_number())))
}
