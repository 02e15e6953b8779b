use chrono::Datelike;

use super::rules::{
    dot_pattern, fein_pattern, has_text, mc_pattern, phone_pattern, vin_pattern,
    website_pattern, zip_pattern, Checks, Requirement, Trigger,
};
use super::{Validate, ValidationContext};
use crate::workflows::intake::domain::{
    completed_years, is_us_state, Accident, Address, Business, Claim, CoveragePreferences,
    Deductible, Driver, Knockout, KnockoutQuestion, Lienholder, LiabilityLimit, LossHistory, Operations,
    PriorInsurance, RiskProfile, UploadedDocument, Vehicle, Violation, MAX_UPLOAD_BYTES,
};

const MIN_VEHICLE_YEAR: i32 = 1990;
const MIN_DRIVER_AGE: i32 = 18;
const MAX_DRIVER_AGE: i32 = 100;

impl Validate for Address {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        checks.text_required("street", &self.street, "Street address is required");
        checks.text_max("street", &self.street, 200, "Street address must be less than 200 characters");
        checks.text_required("city", &self.city, "City is required");
        checks.text_max("city", &self.city, 100, "City must be less than 100 characters");
        if checks.text_required("state", &self.state, "State is required") && !is_us_state(&self.state) {
            checks.fail("state", "Please select a valid US state");
        }
        if checks.text_required("zip", &self.zip, "ZIP code is required") {
            checks.shape("zip", &self.zip, zip_pattern(), "ZIP code must be in format 12345 or 12345-6789");
        }
    }
}

impl Validate for Knockout {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        for question in KnockoutQuestion::ordered() {
            if self.answer(question).is_none() {
                checks.fail(question.field_name(), format!("Please answer: {}", question.prompt()));
            }
        }
    }
}

const RISK_PROFILE_REQUIREMENTS: &[Requirement<RiskProfile>] = &[
    Requirement {
        trigger: Trigger::Flag { read: |risk: &RiskProfile| risk.hazmat, equals: true },
        dependent: "hazmatTypes",
        present: |risk: &RiskProfile| !risk.hazmat_types.is_empty(),
        message: "Please select at least one hazmat type when hauling hazardous materials",
    },
    Requirement {
        trigger: Trigger::Flag { read: |risk: &RiskProfile| risk.leases_on_to_carrier, equals: true },
        dependent: "motorCarrierLeasedTo",
        present: |risk: &RiskProfile| has_text(&risk.motor_carrier_leased_to),
        message: "Please provide the motor carrier you lease to",
    },
];

impl Validate for RiskProfile {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        checks.min("fleetSize", self.fleet_size, 1, "Fleet size must be at least 1");
        checks.max("fleetSize", self.fleet_size, 1000, "Fleet size cannot exceed 1000");
        checks.optional_text_max(
            "motorCarrierLeasedTo",
            self.motor_carrier_leased_to.as_deref(),
            200,
            "Motor carrier name must be less than 200 characters",
        );
        checks.min("trailerInterchangeCount", self.trailer_interchange_count, 1, "Trailer count must be at least 1");
        checks.max("trailerInterchangeCount", self.trailer_interchange_count, 100, "Trailer count cannot exceed 100");
        checks.optional_text_max(
            "trailerInterchangeZones",
            self.trailer_interchange_zones.as_deref(),
            500,
            "Zones must be less than 500 characters",
        );
        checks.min("trailerInterchangeRadius", self.trailer_interchange_radius, 1, "Radius must be at least 1 mile");
        checks.max("trailerInterchangeRadius", self.trailer_interchange_radius, 3000, "Radius cannot exceed 3000 miles");
        checks.max("accidentsLast3Years", self.accidents_last3_years, 100, "Accident count cannot exceed 100");

        checks.requirements(self, RISK_PROFILE_REQUIREMENTS);
    }
}

const BUSINESS_REQUIREMENTS: &[Requirement<Business>] = &[Requirement {
    trigger: Trigger::Matches(|business: &Business| business.garaging_address_different),
    dependent: "garagingAddress",
    present: |business: &Business| business.garaging_address.is_some(),
    message: "Please provide the garaging address",
}];

impl Validate for Business {
    fn check(&self, ctx: &ValidationContext, checks: &mut Checks) {
        checks.text_required("legalName", &self.legal_name, "Legal business name is required");
        checks.text_max("legalName", &self.legal_name, 200, "Legal business name must be less than 200 characters");
        checks.optional_text_max("dba", self.dba.as_deref(), 200, "DBA name must be less than 200 characters");
        checks.nested("mailingAddress", &self.mailing_address, ctx);

        if checks.text_required("phone", &self.phone, "Phone number is required") {
            checks.shape("phone", &self.phone, phone_pattern(), "Please enter a valid phone number");
        }
        if checks.text_required("fein", &self.fein, "Federal Employer Identification Number (FEIN) is required") {
            checks.shape("fein", &self.fein, fein_pattern(), "FEIN must be in format XX-XXXXXXX (e.g., 12-3456789)");
        }
        if let Some(website) = self.website.as_deref() {
            checks.text_max("website", website, 200, "Website URL must be less than 200 characters");
            checks.shape("website", website, website_pattern(), "Please enter a valid website URL");
        }
        checks.required("dateStarted", &self.date_started, "Date business started is required");
        if checks.text_required("dotNumber", &self.dot_number, "USDOT Number is required") {
            checks.shape("dotNumber", &self.dot_number, dot_pattern(), "USDOT Number must be exactly 7 digits");
        }
        if let Some(mc_number) = self.mc_number.as_deref() {
            checks.shape("mcNumber", mc_number, mc_pattern(), "MC Number must be in format MC-XXXXXX or XXXXXX");
        }
        checks.min("annualRevenue", self.annual_revenue, 0.0, "Annual revenue cannot be negative");
        checks.max("annualRevenue", self.annual_revenue, 1_000_000_000.0, "Annual revenue cannot exceed $1 billion");
        checks.max("fullTimeEmployees", self.full_time_employees, 10_000, "Employee count cannot exceed 10,000");
        checks.max("partTimeEmployees", self.part_time_employees, 10_000, "Employee count cannot exceed 10,000");
        if let Some(garaging) = &self.garaging_address {
            if self.garaging_address_different {
                checks.nested("garagingAddress", garaging, ctx);
            }
        }

        checks.requirements(self, BUSINESS_REQUIREMENTS);
    }
}

const OPERATIONS_REQUIREMENTS: &[Requirement<Operations>] = &[
    Requirement {
        trigger: Trigger::Flag { read: |ops: &Operations| ops.has_safety_program, equals: true },
        dependent: "safetyProgramComponents",
        present: |ops: &Operations| !ops.safety_program_components.is_empty(),
        message: "Please select at least one safety program component",
    },
    Requirement {
        trigger: Trigger::Flag { read: |ops: &Operations| ops.has_telematics, equals: true },
        dependent: "telematicsFeatures",
        present: |ops: &Operations| !ops.telematics_features.is_empty(),
        message: "Please select at least one telematics feature",
    },
];

impl Validate for Operations {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        checks.text_max(
            "cargoDescription",
            &self.cargo_description,
            1000,
            "Cargo description must be less than 1000 characters",
        );
        if self.states_of_operation.iter().any(|code| !is_us_state(code)) {
            checks.fail("statesOfOperation", "Please select a valid US state");
        }
        checks.max(
            "telematicsFleetPercentage",
            self.telematics_fleet_percentage,
            100,
            "Fleet percentage cannot exceed 100%",
        );

        checks.requirements(self, OPERATIONS_REQUIREMENTS);
    }
}

impl Validate for Lienholder {
    fn check(&self, ctx: &ValidationContext, checks: &mut Checks) {
        checks.text_required("name", &self.name, "Lienholder name is required");
        checks.text_max("name", &self.name, 200, "Lienholder name must be less than 200 characters");
        checks.nested("address", &self.address, ctx);
    }
}

const VEHICLE_REQUIREMENTS: &[Requirement<Vehicle>] = &[
    Requirement {
        trigger: Trigger::Matches(|vehicle: &Vehicle| vehicle.has_lienholder),
        dependent: "lienholder",
        present: |vehicle: &Vehicle| vehicle.lienholder.is_some(),
        message: "Please provide lienholder information",
    },
    Requirement {
        trigger: Trigger::Matches(|vehicle: &Vehicle| !vehicle.use_business_garaging_address),
        dependent: "garagingAddress",
        present: |vehicle: &Vehicle| vehicle.garaging_address.is_some(),
        message: "Please provide the vehicle garaging address",
    },
];

impl Validate for Vehicle {
    fn check(&self, ctx: &ValidationContext, checks: &mut Checks) {
        checks.min("year", self.year, MIN_VEHICLE_YEAR, "Vehicle year must be 1990 or later");
        checks.max("year", self.year, ctx.today.year() + 1, "Vehicle year cannot be in the far future");
        checks.text_max("make", &self.make, 100, "Make must be less than 100 characters");
        checks.text_max("model", &self.model, 100, "Model must be less than 100 characters");
        if !self.vin.is_empty() {
            if self.vin.chars().count() != 17 {
                checks.fail("vin", "VIN must be exactly 17 characters");
            } else {
                checks.shape("vin", &self.vin, vin_pattern(), "VIN must be 17 alphanumeric characters (excluding I, O, Q)");
            }
        }
        checks.max("gvw", self.gvw, 200_000, "GVW cannot exceed 200,000 lbs");
        checks.min("statedValue", self.stated_value, 0.0, "Stated value cannot be negative");
        checks.max("statedValue", self.stated_value, 2_000_000.0, "Stated value cannot exceed $2,000,000");
        if let (true, Some(lienholder)) = (self.has_lienholder, &self.lienholder) {
            checks.nested("lienholder", lienholder, ctx);
        }
        if let (false, Some(garaging)) = (self.use_business_garaging_address, &self.garaging_address) {
            checks.nested("garagingAddress", garaging, ctx);
        }

        checks.requirements(self, VEHICLE_REQUIREMENTS);
    }
}

impl Validate for Accident {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        checks.required("date", &self.date, "Accident date is required");
        checks.text_required("description", &self.description, "Accident description is required");
        checks.text_max("description", &self.description, 500, "Description must be less than 500 characters");
        checks.min("amountPaid", self.amount_paid, 0.0, "Amount paid cannot be negative");
    }
}

impl Validate for Violation {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        checks.required("date", &self.date, "Violation date is required");
        checks.optional_text_max("description", self.description.as_deref(), 500, "Description must be less than 500 characters");
        checks.optional_text_max("location", self.location.as_deref(), 200, "Location must be less than 200 characters");
    }
}

const DRIVER_REQUIREMENTS: &[Requirement<Driver>] = &[
    Requirement {
        trigger: Trigger::Matches(|driver: &Driver| driver.has_accidents),
        dependent: "accidents",
        present: |driver: &Driver| !driver.accidents.is_empty(),
        message: "Please provide accident details",
    },
    Requirement {
        trigger: Trigger::Matches(|driver: &Driver| driver.has_violations),
        dependent: "violations",
        present: |driver: &Driver| !driver.violations.is_empty(),
        message: "Please provide violation details",
    },
];

impl Validate for Driver {
    fn check(&self, ctx: &ValidationContext, checks: &mut Checks) {
        checks.text_required("fullName", &self.full_name, "Driver name is required");
        checks.text_max("fullName", &self.full_name, 200, "Driver name must be less than 200 characters");
        if checks.required("dateOfBirth", &self.date_of_birth, "Date of birth is required") {
            let age = self
                .date_of_birth
                .map(|born| completed_years(born, ctx.today))
                .unwrap_or_default();
            if !(MIN_DRIVER_AGE..=MAX_DRIVER_AGE).contains(&age) {
                checks.fail("dateOfBirth", "Driver must be between 18 and 100 years old");
            }
        }
        checks.text_required("licenseNumber", &self.license_number, "License number is required");
        checks.text_max("licenseNumber", &self.license_number, 50, "License number must be less than 50 characters");
        if let Some(state) = self.license_state.as_deref() {
            if !is_us_state(state) {
                checks.fail("licenseState", "Please select a valid US state");
            }
        }
        checks.max("yearsExperience", self.years_experience, 70, "Years of experience cannot exceed 70");
        checks.required("dateHired", &self.date_hired, "Date hired is required");
        if self.has_accidents {
            checks.each("accidents", &self.accidents, ctx);
        }
        if self.has_violations {
            checks.each("violations", &self.violations, ctx);
        }

        checks.requirements(self, DRIVER_REQUIREMENTS);
    }
}

const PRIOR_INSURANCE_REQUIREMENTS: &[Requirement<PriorInsurance>] = &[Requirement {
    trigger: Trigger::Flag { read: |prior: &PriorInsurance| prior.currently_insured, equals: true },
    dependent: "carrierName",
    present: |prior: &PriorInsurance| has_text(&prior.carrier_name),
    message: "Please provide your current insurance carrier name",
}];

impl Validate for PriorInsurance {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        checks.optional_text_max("carrierName", self.carrier_name.as_deref(), 200, "Carrier name must be less than 200 characters");
        checks.optional_text_max("policyNumber", self.policy_number.as_deref(), 50, "Policy number must be less than 50 characters");
        checks.min("annualPremium", self.annual_premium, 0.0, "Annual premium cannot be negative");
        checks.max("annualPremium", self.annual_premium, 10_000_000.0, "Annual premium cannot exceed $10 million");

        checks.requirements(self, PRIOR_INSURANCE_REQUIREMENTS);
    }
}

impl Validate for Claim {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        checks.required("dateOfLoss", &self.date_of_loss, "Date of loss is required");
        checks.text_required("description", &self.description, "Claim description is required");
        checks.text_max("description", &self.description, 500, "Description must be less than 500 characters");
        checks.min("amountPaid", Some(self.amount_paid), 0.0, "Amount paid cannot be negative");
        checks.min("amountReserved", Some(self.amount_reserved), 0.0, "Amount reserved cannot be negative");
    }
}

const LOSS_HISTORY_REQUIREMENTS: &[Requirement<LossHistory>] = &[Requirement {
    trigger: Trigger::Flag { read: |history: &LossHistory| history.has_claims, equals: true },
    dependent: "claims",
    present: |history: &LossHistory| !history.claims.is_empty(),
    message: "Please provide claim details",
}];

impl Validate for LossHistory {
    fn check(&self, ctx: &ValidationContext, checks: &mut Checks) {
        if self.has_claims == Some(true) {
            checks.each("claims", &self.claims, ctx);
        }

        checks.requirements(self, LOSS_HISTORY_REQUIREMENTS);
    }
}

const COVERAGE_REQUIREMENTS: &[Requirement<CoveragePreferences>] = &[
    Requirement {
        trigger: Trigger::Matches(|coverage: &CoveragePreferences| coverage.liability_limit == Some(LiabilityLimit::Other)),
        dependent: "liabilityLimitOther",
        present: |coverage: &CoveragePreferences| coverage.liability_limit_other.is_some(),
        message: "Please provide a custom liability limit",
    },
    Requirement {
        trigger: Trigger::Matches(|coverage: &CoveragePreferences| coverage.comprehensive_deductible == Some(Deductible::Other)),
        dependent: "comprehensiveDeductibleOther",
        present: |coverage: &CoveragePreferences| coverage.comprehensive_deductible_other.is_some(),
        message: "Please provide a custom comprehensive deductible",
    },
    Requirement {
        trigger: Trigger::Matches(|coverage: &CoveragePreferences| coverage.collision_deductible == Some(Deductible::Other)),
        dependent: "collisionDeductibleOther",
        present: |coverage: &CoveragePreferences| coverage.collision_deductible_other.is_some(),
        message: "Please provide a custom collision deductible",
    },
];

impl Validate for CoveragePreferences {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        checks.min("liabilityLimitOther", self.liability_limit_other, 100_000.0, "Liability limit must be at least $100,000");
        checks.max("liabilityLimitOther", self.liability_limit_other, 10_000_000.0, "Liability limit cannot exceed $10 million");
        for (field, value) in [
            ("comprehensiveDeductibleOther", self.comprehensive_deductible_other),
            ("collisionDeductibleOther", self.collision_deductible_other),
        ] {
            checks.min(field, value, 0.0, "Deductible cannot be negative");
            checks.max(field, value, 50_000.0, "Deductible cannot exceed $50,000");
        }

        checks.requirements(self, COVERAGE_REQUIREMENTS);
    }
}

impl Validate for UploadedDocument {
    fn check(&self, _ctx: &ValidationContext, checks: &mut Checks) {
        checks.text_required("fileName", &self.file_name, "File name is required");
        checks.text_max("fileName", &self.file_name, 255, "File name must be less than 255 characters");
        if self.file_size == 0 {
            checks.fail("fileSize", "File size must be greater than 0");
        }
        if self.file_size > MAX_UPLOAD_BYTES {
            checks.fail("fileSize", "File size cannot exceed 10MB");
        }
    }
}
