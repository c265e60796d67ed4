//! The interactive calculator: form state, the Idle/Validating/Computing
//! state machine, and the one validate+compute path every trigger uses.

use std::fmt;

use crate::form::{Field, FieldErrors, FormInput};
use crate::models::{BmiRecord, NewPreference, Preference, Unit};
use crate::service::BmiService;

#[derive(Debug, Clone, PartialEq)]
pub enum CalcFailure {
    /// One or more fields failed validation; nothing was computed.
    Invalid(FieldErrors),
    /// The record store refused the measurement.
    Rejected(String),
}

impl CalcFailure {
    /// Errors keyed by field; store rejections land under [`Field::General`].
    #[must_use]
    pub fn field_errors(&self) -> FieldErrors {
        match self {
            Self::Invalid(errors) => errors.clone(),
            Self::Rejected(msg) => FieldErrors::general(msg.clone()),
        }
    }
}

impl fmt::Display for CalcFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid(errors) => write!(f, "{errors}"),
            Self::Rejected(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for CalcFailure {}

#[derive(Debug, Clone, PartialEq)]
pub enum CalcState {
    /// Nothing to compute.
    Idle,
    /// Input changed; waiting for it to settle.
    Validating,
    /// Validation passed and the record is being created.
    Computing,
    Ready(BmiRecord),
    Failed(CalcFailure),
}

impl CalcState {
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Idle | Self::Ready(_) | Self::Failed(_))
    }

    #[must_use]
    pub fn record(&self) -> Option<&BmiRecord> {
        match self {
            Self::Ready(rec) => Some(rec),
            _ => None,
        }
    }
}

/// Progress reported by an evaluation, tagged with the form revision it
/// was started from.
#[derive(Debug, Clone, PartialEq)]
pub enum Progress {
    Computing {
        revision: u64,
    },
    Finished {
        revision: u64,
        outcome: Result<BmiRecord, CalcFailure>,
    },
}

impl Progress {
    #[must_use]
    pub fn revision(&self) -> u64 {
        match self {
            Self::Computing { revision } | Self::Finished { revision, .. } => *revision,
        }
    }
}

/// What the caller should do after an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Start (or restart) the debounce timer for this revision.
    Schedule(u64),
    /// Every tracked field is empty; drop any pending evaluation.
    Clear,
    /// Text did not change.
    Unchanged,
}

/// Validate `form`, create the record, and remember the unit and height.
///
/// `on_computing` fires once validation has passed, before the store is
/// called.
pub async fn evaluate_with<F>(
    service: &BmiService,
    form: &FormInput,
    on_computing: F,
) -> Result<BmiRecord, CalcFailure>
where
    F: FnOnce(),
{
    let measurement = form.validate().map_err(|errors| {
        tracing::warn!(%errors, "calculator: input rejected");
        CalcFailure::Invalid(errors)
    })?;
    on_computing();

    let record = service
        .create_calculation(&measurement.to_new_record())
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "calculator: store rejected measurement");
            CalcFailure::Rejected(e.to_string())
        })?;

    service
        .remember(NewPreference {
            default_unit: Some(measurement.unit),
            saved_height: Some(measurement.height_cm),
            theme: None,
        })
        .await;
    Ok(record)
}

pub async fn evaluate(service: &BmiService, form: &FormInput) -> Result<BmiRecord, CalcFailure> {
    evaluate_with(service, form, || {}).await
}

#[derive(Debug, Clone)]
pub struct Calculator {
    form: FormInput,
    state: CalcState,
    revision: u64,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new(Unit::Metric)
    }
}

impl Calculator {
    #[must_use]
    pub fn new(unit: Unit) -> Self {
        Self {
            form: FormInput::new(unit),
            state: CalcState::Idle,
            revision: 0,
        }
    }

    #[must_use]
    pub fn from_preference(pref: &Preference) -> Self {
        Self {
            form: FormInput::from_preference(pref),
            state: CalcState::Idle,
            revision: 0,
        }
    }

    #[must_use]
    pub fn form(&self) -> &FormInput {
        &self.form
    }

    #[must_use]
    pub fn state(&self) -> &CalcState {
        &self.state
    }

    #[must_use]
    pub fn unit(&self) -> Unit {
        self.form.unit
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_field(&mut self, field: Field, value: &str) -> Trigger {
        if !self.form.set(field, value) {
            return Trigger::Unchanged;
        }
        self.revision += 1;
        if self.form.has_input() {
            self.state = CalcState::Validating;
            Trigger::Schedule(self.revision)
        } else {
            self.state = CalcState::Idle;
            Trigger::Clear
        }
    }

    /// Switch units. Every field is cleared and the calculator goes idle,
    /// even if `unit` is the current one.
    pub fn switch_unit(&mut self, unit: Unit) {
        self.form = FormInput::new(unit);
        self.state = CalcState::Idle;
        self.revision += 1;
    }

    pub fn toggle_unit(&mut self) -> Unit {
        let unit = self.form.unit.toggled();
        self.switch_unit(unit);
        unit
    }

    /// Begin an immediate evaluation, superseding any pending one.
    pub fn begin(&mut self) -> u64 {
        self.revision += 1;
        self.state = CalcState::Validating;
        self.revision
    }

    /// Apply progress from an evaluation. Progress from an older revision is
    /// ignored and `false` is returned.
    pub fn apply(&mut self, progress: Progress) -> bool {
        if progress.revision() != self.revision {
            return false;
        }
        self.state = match progress {
            Progress::Computing { .. } => CalcState::Computing,
            Progress::Finished {
                outcome: Ok(record),
                ..
            } => CalcState::Ready(record),
            Progress::Finished {
                outcome: Err(failure),
                ..
            } => CalcState::Failed(failure),
        };
        true
    }
}
