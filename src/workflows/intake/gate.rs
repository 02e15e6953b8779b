use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::domain::{DocumentType, IntakeData, Knockout};
use super::validation::{validate_at, FieldError, FieldPath, ValidationContext, ValidationReport};

pub const DISQUALIFIED_MESSAGE: &str =
    "Based on your answers, we cannot provide an online quote. Please call us to discuss your options.";

/// Document types that must be uploaded before submission.
pub const REQUIRED_DOCUMENTS: &[DocumentType] = &[DocumentType::AuthorityLetter];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Knockout,
    RiskProfile,
    BusinessBundle,
    Documents,
}

impl Stage {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Knockout,
            Self::RiskProfile,
            Self::BusinessBundle,
            Self::Documents,
        ]
    }

    pub const fn number(self) -> u8 {
        match self {
            Self::Knockout => 1,
            Self::RiskProfile => 2,
            Self::BusinessBundle => 3,
            Self::Documents => 4,
        }
    }

    pub const fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Knockout),
            2 => Some(Self::RiskProfile),
            3 => Some(Self::BusinessBundle),
            4 => Some(Self::Documents),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Knockout => "Quick Questions",
            Self::RiskProfile => "Your Risk Profile",
            Self::BusinessBundle => "Business Details",
            Self::Documents => "Upload Documents",
        }
    }

    fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    fn previous(self) -> Option<Self> {
        self.number().checked_sub(1).and_then(Self::from_number)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage {} ({})", self.number(), self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateStatus {
    InProgress,
    Disqualified,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Advanced { from: Stage, to: Stage },
    Submitted,
}

#[derive(Debug, thiserror::Error)]
pub enum NavigationError {
    #[error("{stage} is incomplete ({} errors)", .errors.len())]
    Invalid {
        stage: Stage,
        errors: Vec<FieldError>,
    },
    #[error("navigation is suspended while a screening answer disqualifies the applicant")]
    Disqualified,
    #[error("intake has already been submitted")]
    Submitted,
    #[error("{requested} has not been reached yet (furthest is {highest})")]
    StageLocked { requested: Stage, highest: Stage },
    #[error("there is no stage {0}")]
    OutOfRange(u8),
}

/// Builds the full validation report for one stage of the intake.
pub fn validate_stage(stage: Stage, data: &IntakeData, ctx: &ValidationContext) -> ValidationReport {
    let root = FieldPath::root();
    let mut report = ValidationReport::passed();
    let stage_error = |path: &str, message: String| FieldError {
        path: FieldPath::new(path),
        message,
    };

    match stage {
        Stage::Knockout => {
            report.merge(validate_at(&data.knockout, root.field("knockout"), ctx));
            let knockout = &data.knockout;
            let mut stage_errors = Vec::new();
            if !knockout.all_answered() {
                stage_errors.push(stage_error(
                    "knockout",
                    "Please answer all screening questions".to_string(),
                ));
            } else if knockout.is_disqualifying() {
                stage_errors.push(stage_error("knockout", DISQUALIFIED_MESSAGE.to_string()));
            }
            report.merge(ValidationReport::from_errors(stage_errors));
        }
        Stage::RiskProfile => {
            report.merge(validate_at(&data.risk_profile, root.field("riskProfile"), ctx));
            let profile = &data.risk_profile;
            let mut missing = Vec::new();
            if profile.hazmat.is_none() {
                missing.push("hazmat question");
            }
            if profile.radius.is_none() {
                missing.push("radius of operation");
            }
            if profile.fleet_size.is_none() {
                missing.push("fleet size");
            }
            if profile.cargo_types.is_empty() {
                missing.push("cargo types");
            }
            if !missing.is_empty() {
                report.merge(ValidationReport::from_errors(vec![stage_error(
                    "riskProfile",
                    format!("Please complete: {}", missing.join(", ")),
                )]));
            }
        }
        Stage::BusinessBundle => {
            report.merge(validate_at(&data.business, root.field("business"), ctx));
            report.merge(validate_at(&data.operations, root.field("operations"), ctx));
            let vehicles = root.field("vehicles");
            for (position, vehicle) in data.vehicles.iter().enumerate() {
                report.merge(validate_at(vehicle, vehicles.index(position), ctx));
            }
            let drivers = root.field("drivers");
            for (position, driver) in data.drivers.iter().enumerate() {
                report.merge(validate_at(driver, drivers.index(position), ctx));
            }
            report.merge(validate_at(&data.prior_insurance, root.field("priorInsurance"), ctx));
            report.merge(validate_at(&data.loss_history, root.field("lossHistory"), ctx));
            report.merge(validate_at(
                &data.coverage_preferences,
                root.field("coveragePreferences"),
                ctx,
            ));

            let mut minimums = Vec::new();
            if data.vehicles.is_empty() {
                minimums.push(stage_error("vehicles", "Please add at least one vehicle".to_string()));
            }
            if data.drivers.is_empty() {
                minimums.push(stage_error("drivers", "Please add at least one driver".to_string()));
            }
            report.merge(ValidationReport::from_errors(minimums));
        }
        Stage::Documents => {
            let documents = root.field("documents");
            for (position, document) in data.documents.iter().enumerate() {
                report.merge(validate_at(document, documents.index(position), ctx));
            }
            let missing: Vec<String> = REQUIRED_DOCUMENTS
                .iter()
                .filter(|required| {
                    !data
                        .documents
                        .iter()
                        .any(|document| document.document_type == **required)
                })
                .map(|required| required.code().replace('_', " "))
                .collect();
            if !missing.is_empty() {
                report.merge(ValidationReport::from_errors(vec![stage_error(
                    "documents",
                    format!("Please upload required documents: {}", missing.join(", ")),
                )]));
            }
        }
    }

    report
}

/// Checks a finished record end to end: no knockout answer may disqualify
/// and every stage must validate.
pub fn verify_submission(data: &IntakeData, ctx: &ValidationContext) -> Result<(), NavigationError> {
    if data.knockout.is_disqualifying() {
        return Err(NavigationError::Disqualified);
    }
    for stage in Stage::ordered() {
        let report = validate_stage(stage, data, ctx);
        if !report.valid {
            return Err(NavigationError::Invalid {
                stage,
                errors: report.errors,
            });
        }
    }
    Ok(())
}

/// Navigation state for the four-stage intake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageGate {
    current: Stage,
    highest: Stage,
    disqualified: bool,
    submitted: bool,
    errors: Vec<FieldError>,
}

impl Default for StageGate {
    fn default() -> Self {
        Self {
            current: Stage::Knockout,
            highest: Stage::Knockout,
            disqualified: false,
            submitted: false,
            errors: Vec::new(),
        }
    }
}

impl StageGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Gate for a session whose data already exists (a restored snapshot).
    pub fn for_data(knockout: &Knockout) -> Self {
        let mut gate = Self::default();
        gate.refresh_disqualification(knockout);
        gate
    }

    pub fn current_stage(&self) -> Stage {
        self.current
    }

    pub fn highest_stage(&self) -> Stage {
        self.highest
    }

    pub fn is_disqualified(&self) -> bool {
        self.disqualified
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn status(&self) -> GateStatus {
        if self.disqualified {
            GateStatus::Disqualified
        } else if self.submitted {
            GateStatus::Submitted
        } else {
            GateStatus::InProgress
        }
    }

    /// Errors from the most recent failed advance; cleared by a successful one.
    pub fn stage_errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Re-derives the disqualified status from the knockout answers.
    /// Returns `true` when the status changed.
    pub fn refresh_disqualification(&mut self, knockout: &Knockout) -> bool {
        let disqualified = knockout.is_disqualifying();
        if disqualified == self.disqualified {
            return false;
        }

        self.disqualified = disqualified;
        if disqualified {
            info!(triggered = ?knockout.triggered(), "applicant disqualified by screening answer");
        } else {
            info!("disqualification cleared");
            self.errors.clear();
        }
        true
    }

    pub fn advance(
        &mut self,
        data: &IntakeData,
        ctx: &ValidationContext,
    ) -> Result<Transition, NavigationError> {
        self.ensure_navigable()?;

        let report = validate_stage(self.current, data, ctx);
        if !report.valid {
            debug!(stage = self.current.number(), errors = report.errors.len(), "advance blocked");
            self.errors = report.errors.clone();
            return Err(NavigationError::Invalid {
                stage: self.current,
                errors: report.errors,
            });
        }

        self.errors.clear();
        match self.current.next() {
            Some(next) => {
                let from = self.current;
                self.current = next;
                self.highest = self.highest.max(next);
                debug!(from = from.number(), to = next.number(), "stage advanced");
                Ok(Transition::Advanced { from, to: next })
            }
            None => {
                self.submitted = true;
                info!("intake submitted");
                Ok(Transition::Submitted)
            }
        }
    }

    pub fn retreat(&mut self) -> Result<Stage, NavigationError> {
        self.ensure_navigable()?;
        if let Some(previous) = self.current.previous() {
            debug!(from = self.current.number(), to = previous.number(), "stage retreated");
            self.current = previous;
        }
        Ok(self.current)
    }

    pub fn jump_to(&mut self, number: u8) -> Result<Stage, NavigationError> {
        self.ensure_navigable()?;
        let requested = Stage::from_number(number).ok_or(NavigationError::OutOfRange(number))?;
        if requested > self.highest {
            return Err(NavigationError::StageLocked {
                requested,
                highest: self.highest,
            });
        }
        self.current = requested;
        Ok(requested)
    }

    fn ensure_navigable(&mut self) -> Result<(), NavigationError> {
        if self.submitted {
            return Err(NavigationError::Submitted);
        }
        if self.disqualified {
            self.errors = vec![FieldError {
                path: FieldPath::new("knockout"),
                message: DISQUALIFIED_MESSAGE.to_string(),
            }];
            return Err(NavigationError::Disqualified);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::intake::domain::KnockoutQuestion;

    fn answered(value: bool) -> Knockout {
        let mut knockout = Knockout::default();
        for question in KnockoutQuestion::ordered() {
            knockout.set(question, Some(value));
        }
        knockout
    }

    fn ctx() -> ValidationContext {
        ValidationContext::new(chrono::NaiveDate::from_ymd_opt(2025, 6, 15).expect("valid date"))
    }

    #[test]
    fn stage_numbers_round_trip_and_stay_bounded() {
        for stage in Stage::ordered() {
            assert_eq!(Stage::from_number(stage.number()), Some(stage));
        }
        assert_eq!(Stage::from_number(0), None);
        assert_eq!(Stage::from_number(5), None);
        assert_eq!(Stage::Knockout.previous(), None);
        assert_eq!(Stage::Documents.next(), None);
    }

    #[test]
    fn unanswered_knockout_blocks_advance_and_keeps_stage() {
        let mut gate = StageGate::new();
        let data = IntakeData::default();

        match gate.advance(&data, &ctx()) {
            Err(NavigationError::Invalid { stage: Stage::Knockout, errors }) => {
                assert_eq!(
                    errors.last().map(|error| error.message.as_str()),
                    Some("Please answer all screening questions")
                );
            }
            other => panic!("expected invalid knockout stage, got {other:?}"),
        }
        assert_eq!(gate.current_stage(), Stage::Knockout);
        assert!(!gate.stage_errors().is_empty());
    }

    #[test]
    fn successful_advance_clears_errors_and_raises_highest() {
        let mut gate = StageGate::new();
        let mut data = IntakeData::default();
        let _ = gate.advance(&data, &ctx());
        assert!(!gate.stage_errors().is_empty());

        data.knockout = answered(false);
        let transition = gate.advance(&data, &ctx()).expect("knockout passes");

        assert_eq!(
            transition,
            Transition::Advanced {
                from: Stage::Knockout,
                to: Stage::RiskProfile
            }
        );
        assert!(gate.stage_errors().is_empty());
        assert_eq!(gate.highest_stage(), Stage::RiskProfile);
    }

    #[test]
    fn jump_is_limited_to_highest_reached_stage() {
        let mut gate = StageGate::new();
        let data = IntakeData {
            knockout: answered(false),
            ..IntakeData::default()
        };
        gate.advance(&data, &ctx()).expect("advance");
        gate.retreat().expect("retreat");
        assert_eq!(gate.current_stage(), Stage::Knockout);

        assert_eq!(gate.jump_to(2).expect("reached"), Stage::RiskProfile);
        match gate.jump_to(3) {
            Err(NavigationError::StageLocked { requested: Stage::BusinessBundle, highest: Stage::RiskProfile }) => {}
            other => panic!("expected locked stage, got {other:?}"),
        }
        match gate.jump_to(9) {
            Err(NavigationError::OutOfRange(9)) => {}
            other => panic!("expected out of range, got {other:?}"),
        }
    }

    #[test]
    fn retreat_at_first_stage_is_a_no_op() {
        let mut gate = StageGate::new();
        assert_eq!(gate.retreat().expect("retreat"), Stage::Knockout);
    }

    #[test]
    fn disqualification_tracks_every_flag_combination() {
        let mut gate = StageGate::new();
        for mask in 0u8..64 {
            let mut knockout = answered(false);
            for (bit, question) in KnockoutQuestion::ordered().into_iter().enumerate() {
                if mask & (1 << bit) != 0 {
                    knockout.set(question, Some(true));
                }
            }
            gate.refresh_disqualification(&knockout);
            assert_eq!(gate.is_disqualified(), mask != 0, "mask {mask:#08b}");
        }
    }

    #[test]
    fn disqualified_gate_suppresses_navigation_until_flags_clear() {
        let mut knockout = answered(false);
        knockout.set(KnockoutQuestion::BankruptcyFiled, Some(true));
        let data = IntakeData {
            knockout,
            ..IntakeData::default()
        };
        let mut gate = StageGate::for_data(&data.knockout);
        assert_eq!(gate.status(), GateStatus::Disqualified);

        assert!(matches!(gate.advance(&data, &ctx()), Err(NavigationError::Disqualified)));
        assert!(matches!(gate.retreat(), Err(NavigationError::Disqualified)));
        assert_eq!(gate.stage_errors()[0].message, DISQUALIFIED_MESSAGE);

        assert!(gate.refresh_disqualification(&answered(false)));
        assert_eq!(gate.status(), GateStatus::InProgress);
        assert!(gate.stage_errors().is_empty());
    }

    #[test]
    fn disqualification_outranks_submission_in_status() {
        let mut gate = StageGate {
            current: Stage::Documents,
            highest: Stage::Documents,
            submitted: true,
            ..StageGate::default()
        };
        assert_eq!(gate.status(), GateStatus::Submitted);

        let mut knockout = answered(false);
        knockout.set(KnockoutQuestion::FraudConviction, Some(true));
        gate.refresh_disqualification(&knockout);
        assert_eq!(gate.status(), GateStatus::Disqualified);
    }

    #[test]
    fn verify_submission_rejects_disqualified_and_incomplete_records() {
        let mut data = IntakeData {
            knockout: answered(false),
            ..IntakeData::default()
        };
        match verify_submission(&data, &ctx()) {
            Err(NavigationError::Invalid { stage, .. }) => assert_eq!(stage, Stage::RiskProfile),
            other => panic!("expected incomplete risk profile, got {other:?}"),
        }

        data.knockout.set(KnockoutQuestion::AuthorityRevoked, Some(true));
        assert!(matches!(
            verify_submission(&data, &ctx()),
            Err(NavigationError::Disqualified)
        ));
    }

    #[test]
    fn missing_authority_letter_names_required_type() {
        let report = validate_stage(Stage::Documents, &IntakeData::default(), &ctx());
        assert_eq!(
            report.messages(),
            vec!["Please upload required documents: authority letter"]
        );
    }

    #[test]
    fn empty_fleet_reports_structural_minimums() {
        let report = validate_stage(Stage::BusinessBundle, &IntakeData::default(), &ctx());
        assert!(report.has_error_at("vehicles"));
        assert!(report.has_error_at("drivers"));
        assert!(report.has_error_at("business.legalName"));
    }
}
