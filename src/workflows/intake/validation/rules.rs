use std::sync::OnceLock;

use regex::Regex;

use super::{FieldError, FieldPath, Validate, ValidationContext};

static ZIP: OnceLock<Regex> = OnceLock::new();
static PHONE: OnceLock<Regex> = OnceLock::new();
static FEIN: OnceLock<Regex> = OnceLock::new();
static DOT_NUMBER: OnceLock<Regex> = OnceLock::new();
static MC_NUMBER: OnceLock<Regex> = OnceLock::new();
static VIN: OnceLock<Regex> = OnceLock::new();
static WEBSITE: OnceLock<Regex> = OnceLock::new();

fn compiled(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static validation pattern compiles"))
}

pub(crate) fn zip_pattern() -> &'static Regex {
    compiled(&ZIP, r"^\d{5}(-\d{4})?$")
}

pub(crate) fn phone_pattern() -> &'static Regex {
    compiled(&PHONE, r"^[\d\s\-().]{10,20}$")
}

pub(crate) fn fein_pattern() -> &'static Regex {
    compiled(&FEIN, r"^\d{2}-\d{7}$")
}

pub(crate) fn dot_pattern() -> &'static Regex {
    compiled(&DOT_NUMBER, r"^\d{7}$")
}

pub(crate) fn mc_pattern() -> &'static Regex {
    compiled(&MC_NUMBER, r"^(MC-?)?\d{1,7}$")
}

pub(crate) fn vin_pattern() -> &'static Regex {
    compiled(&VIN, r"(?i)^[A-HJ-NPR-Z0-9]{17}$")
}

pub(crate) fn website_pattern() -> &'static Regex {
    compiled(&WEBSITE, r"^https?://[^\s/$.?#][^\s]*$")
}

/// Condition under which a [`Requirement`] fires.
pub enum Trigger<T> {
    /// Fires when the tri-state flag read from the entity equals `equals`.
    Flag {
        read: fn(&T) -> Option<bool>,
        equals: bool,
    },
    /// Fires when the predicate holds (enumerated "other" choices).
    Matches(fn(&T) -> bool),
}

impl<T> Trigger<T> {
    fn fires(&self, entity: &T) -> bool {
        match self {
            Trigger::Flag { read, equals } => read(entity) == Some(*equals),
            Trigger::Matches(predicate) => predicate(entity),
        }
    }
}

/// One row of a conditional-requiredness table: when `trigger` fires on the
/// entity, `dependent` must be present, otherwise `message` is reported at the
/// dependent field's path.
pub struct Requirement<T> {
    pub trigger: Trigger<T>,
    pub dependent: &'static str,
    pub present: fn(&T) -> bool,
    pub message: &'static str,
}

/// Error accumulator scoped to one entity path.
#[derive(Debug)]
pub struct Checks {
    base: FieldPath,
    errors: Vec<FieldError>,
}

impl Checks {
    pub fn new(base: FieldPath) -> Self {
        Self {
            base,
            errors: Vec::new(),
        }
    }

    pub fn finish(self) -> Vec<FieldError> {
        self.errors
    }

    pub fn base(&self) -> &FieldPath {
        &self.base
    }

    pub fn fail(&mut self, field: &str, message: impl Into<String>) {
        let path = if field.is_empty() {
            self.base.clone()
        } else {
            self.base.field(field)
        };
        self.errors.push(FieldError {
            path,
            message: message.into(),
        });
    }

    /// Reports `message` when the trimmed text is empty. Returns whether text was present.
    pub fn text_required(&mut self, field: &str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.fail(field, message);
            false
        } else {
            true
        }
    }

    pub fn text_max(&mut self, field: &str, value: &str, max: usize, message: &str) {
        if value.chars().count() > max {
            self.fail(field, message);
        }
    }

    pub fn optional_text_max(&mut self, field: &str, value: Option<&str>, max: usize, message: &str) {
        if let Some(value) = value {
            self.text_max(field, value, max, message);
        }
    }

    /// Applies `pattern` to non-empty text only; presence is a separate rule.
    pub fn shape(&mut self, field: &str, value: &str, pattern: &Regex, message: &str) {
        if !value.is_empty() && !pattern.is_match(value) {
            self.fail(field, message);
        }
    }

    pub fn required<V>(&mut self, field: &str, value: &Option<V>, message: &str) -> bool {
        if value.is_none() {
            self.fail(field, message);
            false
        } else {
            true
        }
    }

    pub fn min<N: PartialOrd + Copy>(&mut self, field: &str, value: Option<N>, min: N, message: &str) {
        if matches!(value, Some(value) if value < min) {
            self.fail(field, message);
        }
    }

    pub fn max<N: PartialOrd + Copy>(&mut self, field: &str, value: Option<N>, max: N, message: &str) {
        if matches!(value, Some(value) if value > max) {
            self.fail(field, message);
        }
    }

    pub fn nested<E: Validate + ?Sized>(&mut self, field: &str, entity: &E, ctx: &ValidationContext) {
        let mut child = Checks::new(self.base.field(field));
        entity.check(ctx, &mut child);
        self.errors.extend(child.finish());
    }

    pub fn each<E: Validate>(&mut self, field: &str, items: &[E], ctx: &ValidationContext) {
        let list = self.base.field(field);
        for (position, item) in items.iter().enumerate() {
            let mut child = Checks::new(list.index(position));
            item.check(ctx, &mut child);
            self.errors.extend(child.finish());
        }
    }

    /// Evaluates a requirement table in declaration order.
    pub fn requirements<T>(&mut self, entity: &T, table: &[Requirement<T>]) {
        for rule in table {
            if rule.trigger.fires(entity) && !(rule.present)(entity) {
                self.fail(rule.dependent, rule.message);
            }
        }
    }
}

pub(crate) fn has_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|text| !text.trim().is_empty())
}
