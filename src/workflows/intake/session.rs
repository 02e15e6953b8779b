use chrono::NaiveDate;
use serde_json::Value;
use tracing::{debug, info};

use super::domain::{IntakeData, KnockoutQuestion, UploadedDocument};
use super::gate::{GateStatus, NavigationError, Stage, StageGate, Transition};
use super::persistence::{PersistenceAdapter, SnapshotStore};
use super::validation::{FieldError, FieldPath, ValidationContext, ValidationReport};

#[derive(Debug, thiserror::Error)]
pub enum FieldAccessError {
    #[error("`{0}` is not a valid field path")]
    InvalidPath(String),
    #[error("no field at `{0}`")]
    UnknownField(String),
    #[error("value rejected for `{path}`: {reason}")]
    Rejected { path: String, reason: String },
    #[error(transparent)]
    Locked(#[from] NavigationError),
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

/// Single-writer owner of one applicant's intake record and navigation state.
pub struct IntakeSession<S: SnapshotStore> {
    data: IntakeData,
    gate: StageGate,
    persistence: PersistenceAdapter<S>,
    restored: bool,
    today: Option<NaiveDate>,
}

impl<S> IntakeSession<S>
where
    S: SnapshotStore + 'static,
{
    /// Fresh session with default answers. Does not touch the store.
    pub fn new(persistence: PersistenceAdapter<S>) -> Self {
        Self {
            data: IntakeData::default(),
            gate: StageGate::new(),
            persistence,
            restored: false,
            today: None,
        }
    }

    fn restored_from(persistence: PersistenceAdapter<S>, data: IntakeData) -> Self {
        let gate = StageGate::for_data(&data.knockout);
        Self {
            data,
            gate,
            persistence,
            restored: true,
            today: None,
        }
    }

    /// Pins the date used by age and model-year rules.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn validation_context(&self) -> ValidationContext {
        match self.today {
            Some(today) => ValidationContext::new(today),
            None => ValidationContext::current(),
        }
    }

    pub fn data(&self) -> &IntakeData {
        &self.data
    }

    /// Owned copy of the current record, detached from later edits.
    pub fn snapshot(&self) -> IntakeData {
        self.data.clone()
    }

    pub fn is_restored(&self) -> bool {
        self.restored
    }

    pub fn persistence(&self) -> &PersistenceAdapter<S> {
        &self.persistence
    }

    /// Applies a mutation, then normalizes, re-checks knockout answers, and
    /// schedules a snapshot write. A submitted record is frozen.
    pub fn edit<R>(&mut self, mutate: impl FnOnce(&mut IntakeData) -> R) -> Result<R, NavigationError> {
        if self.gate.is_submitted() {
            return Err(NavigationError::Submitted);
        }
        let result = mutate(&mut self.data);
        self.commit();
        Ok(result)
    }

    pub fn set_knockout(&mut self, question: KnockoutQuestion, answer: Option<bool>) -> Result<(), NavigationError> {
        self.edit(|data| data.knockout.set(question, answer))
    }

    pub fn attach_document(&mut self, document: UploadedDocument) -> Result<(), NavigationError> {
        self.edit(|data| data.documents.push(document))
    }

    /// Reads the value at a serde path such as `vehicles[0].vin`.
    pub fn field(&self, path: &str) -> Result<Value, FieldAccessError> {
        let pointer = pointer_for(path)?;
        let tree = serde_json::to_value(&self.data)?;
        tree.pointer(&pointer)
            .cloned()
            .ok_or_else(|| FieldAccessError::UnknownField(path.to_string()))
    }

    /// Replaces the value at an existing serde path. The whole record must
    /// still deserialize afterwards or nothing changes.
    pub fn set_field(&mut self, path: &str, value: Value) -> Result<(), FieldAccessError> {
        if self.gate.is_submitted() {
            return Err(NavigationError::Submitted.into());
        }
        let pointer = pointer_for(path)?;
        let mut tree = serde_json::to_value(&self.data)?;
        let slot = tree
            .pointer_mut(&pointer)
            .ok_or_else(|| FieldAccessError::UnknownField(path.to_string()))?;
        *slot = value;

        let updated: IntakeData =
            serde_json::from_value(tree).map_err(|error| FieldAccessError::Rejected {
                path: path.to_string(),
                reason: error.to_string(),
            })?;
        debug!(path, "field updated");
        self.edit(|data| *data = updated)?;
        Ok(())
    }

    pub fn current_stage(&self) -> Stage {
        self.gate.current_stage()
    }

    pub fn highest_stage(&self) -> Stage {
        self.gate.highest_stage()
    }

    pub fn status(&self) -> GateStatus {
        self.gate.status()
    }

    pub fn is_disqualified(&self) -> bool {
        self.gate.is_disqualified()
    }

    pub fn is_submitted(&self) -> bool {
        self.gate.is_submitted()
    }

    pub fn stage_errors(&self) -> &[FieldError] {
        self.gate.stage_errors()
    }

    /// Validation report for the current stage without navigating.
    pub fn check_current_stage(&self) -> ValidationReport {
        super::gate::validate_stage(self.gate.current_stage(), &self.data, &self.validation_context())
    }

    pub fn advance(&mut self) -> Result<Transition, NavigationError> {
        let ctx = self.validation_context();
        let transition = self.gate.advance(&self.data, &ctx)?;
        if transition == Transition::Submitted {
            self.persistence.flush();
        }
        Ok(transition)
    }

    pub fn retreat(&mut self) -> Result<Stage, NavigationError> {
        self.gate.retreat()
    }

    pub fn jump_to(&mut self, stage: u8) -> Result<Stage, NavigationError> {
        self.gate.jump_to(stage)
    }

    /// Clears the stored snapshot and starts over from defaults.
    pub fn restart(&mut self) {
        info!("intake session restarted");
        self.persistence.clear();
        self.data = IntakeData::default();
        self.gate = StageGate::new();
        self.restored = false;
    }

    fn commit(&mut self) {
        self.data.normalize();
        self.gate.refresh_disqualification(&self.data.knockout);
        self.persistence.save(&self.data);
    }
}

fn pointer_for(path: &str) -> Result<String, FieldAccessError> {
    FieldPath::new(path)
        .to_pointer()
        .ok_or_else(|| FieldAccessError::InvalidPath(path.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResumeChoice {
    Resume,
    Discard,
}

/// Start-of-session handshake: loads the prior snapshot once and lets the
/// caller resume it verbatim or discard it.
pub struct SessionBootstrap<S: SnapshotStore> {
    persistence: PersistenceAdapter<S>,
    prior: Option<IntakeData>,
}

impl<S> SessionBootstrap<S>
where
    S: SnapshotStore + 'static,
{
    pub fn open(persistence: PersistenceAdapter<S>) -> Self {
        let prior = persistence.load();
        Self { persistence, prior }
    }

    pub fn has_prior_session(&self) -> bool {
        self.prior.is_some()
    }

    pub fn prior(&self) -> Option<&IntakeData> {
        self.prior.as_ref()
    }

    pub fn start(self, choice: ResumeChoice) -> IntakeSession<S> {
        match choice {
            ResumeChoice::Resume => self.resume(),
            ResumeChoice::Discard => self.discard(),
        }
    }

    pub fn resume(self) -> IntakeSession<S> {
        match self.prior {
            Some(data) => {
                info!("resuming saved intake session");
                IntakeSession::restored_from(self.persistence, data)
            }
            None => IntakeSession::new(self.persistence),
        }
    }

    pub fn discard(self) -> IntakeSession<S> {
        if self.prior.is_some() {
            info!("discarding saved intake session");
        }
        self.persistence.clear();
        IntakeSession::new(self.persistence)
    }
}
