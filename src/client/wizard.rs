//! Five-step registration form.
//!
//! Each step owns a fixed, ordered list of required fields (see
//! [`Step::required_fields`]). Moving forward is gated on the current step;
//! jumping to a step through [`RegistrationWizard::go_to`] is not. Submission
//! re-checks the whole form and reports every incomplete step.

use std::collections::{HashMap, HashSet};
use std::fmt;

use tracing::{debug, info};

use super::{error::ClientError, session::SessionHolder};
use crate::auth::{dto::RegisterRequest, validation::is_valid_email};
use crate::users::{
    lenient::{parse_number, parse_pesticide, split_list},
    profile::{FarmerProfile, PublicUser},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Field {
    FullName,
    Email,
    Password,
    Phone,
    Communication,
    Language,
    FarmName,
    FarmLocation,
    FarmSize,
    PrimaryCrops,
    SecondaryCrops,
    SprayerType,
    IotDevices,
    Machinery,
    Pesticides,
    FertilizerPreference,
    MonthlyExpenditure,
}

/// How a field's value is checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    Optional,
    Required,
    Email,
    /// Must pick one of the offered options.
    Selection,
    /// Required, numeric, not negative.
    Amount,
}

impl Field {
    pub fn rule(self) -> Rule {
        match self {
            Field::Communication | Field::SecondaryCrops => Rule::Optional,
            Field::Email => Rule::Email,
            Field::Language => Rule::Selection,
            Field::FarmSize | Field::MonthlyExpenditure => Rule::Amount,
            _ => Rule::Required,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Field::FullName => "Full name",
            Field::Email => "Email",
            Field::Password => "Password",
            Field::Phone => "Phone number",
            Field::Communication => "Preferred communication",
            Field::Language => "Language",
            Field::FarmName => "Farm name",
            Field::FarmLocation => "Farm location",
            Field::FarmSize => "Farm size",
            Field::PrimaryCrops => "Primary crops",
            Field::SecondaryCrops => "Secondary crops",
            Field::SprayerType => "Sprayer type",
            Field::IotDevices => "IoT devices",
            Field::Machinery => "Machinery",
            Field::Pesticides => "Pesticides",
            Field::FertilizerPreference => "Fertilizer preference",
            Field::MonthlyExpenditure => "Monthly expenditure",
        }
    }

    /// Validation message for `value`, or `None` when it is acceptable.
    pub fn check(self, value: &str) -> Option<String> {
        let v = value.trim();
        match self.rule() {
            Rule::Optional => None,
            _ if v.is_empty() && self.rule() == Rule::Selection => {
                Some(format!("Please select a {}", self.label().to_lowercase()))
            }
            _ if v.is_empty() => Some(format!("{} is required", self.label())),
            Rule::Email if !is_valid_email(v) => Some("Please enter a valid email".into()),
            Rule::Amount => match parse_number(v) {
                Ok(Some(n)) if n.is_finite() && n >= 0.0 => None,
                Ok(Some(n)) if n.is_finite() => {
                    Some(format!("{} cannot be negative", self.label()))
                }
                _ => Some(format!("{} must be a number", self.label())),
            },
            _ => None,
        }
    }
}

const REQUIRED: [&[Field]; 5] = [
    &[
        Field::FullName,
        Field::Email,
        Field::Password,
        Field::Phone,
        Field::Language,
    ],
    &[Field::FarmName, Field::FarmLocation, Field::FarmSize],
    &[Field::PrimaryCrops],
    &[Field::SprayerType, Field::IotDevices, Field::Machinery],
    &[
        Field::Pesticides,
        Field::FertilizerPreference,
        Field::MonthlyExpenditure,
    ],
];

/// A step number, always in `1..=5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Step(u8);

impl Step {
    pub const FIRST: Step = Step(1);
    pub const LAST: Step = Step(5);

    pub fn new(n: u8) -> Option<Step> {
        (1..=5).contains(&n).then_some(Step(n))
    }

    pub fn number(self) -> u8 {
        self.0
    }

    pub fn required_fields(self) -> &'static [Field] {
        REQUIRED[self.index()]
    }

    pub fn all() -> impl Iterator<Item = Step> {
        (1..=5).map(Step)
    }

    fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn join_steps(steps: &[Step]) -> String {
    steps
        .iter()
        .map(Step::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, thiserror::Error)]
pub enum WizardError {
    #[error("Please complete the required fields in step {step}")]
    StepIncomplete { step: Step, fields: Vec<Field> },

    #[error("Please fill all required fields (incomplete steps: {})", join_steps(.steps))]
    FormIncomplete { steps: Vec<Step> },

    #[error("Registration already submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Submit(#[from] ClientError),
}

/// Draft state of the registration form.
#[derive(Debug, Clone)]
pub struct RegistrationWizard {
    step: Step,
    values: HashMap<Field, String>,
    touched: HashSet<Field>,
    submitted: bool,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        Self {
            step: Step::FIRST,
            values: HashMap::new(),
            touched: HashSet::new(),
            submitted: false,
        }
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_step(&self) -> Step {
        self.step
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
        self.touched.insert(field);
    }

    pub fn value(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_touched(&self, field: Field) -> bool {
        self.touched.contains(&field)
    }

    pub fn field_error(&self, field: Field) -> Option<String> {
        field.check(self.value(field))
    }

    /// The error to show next to a field: only once the user has touched it.
    pub fn visible_error(&self, field: Field) -> Option<String> {
        if self.is_touched(field) {
            self.field_error(field)
        } else {
            None
        }
    }

    pub fn invalid_fields(&self, step: Step) -> Vec<Field> {
        step.required_fields()
            .iter()
            .copied()
            .filter(|f| self.field_error(*f).is_some())
            .collect()
    }

    pub fn is_step_valid(&self, step: Step) -> bool {
        self.invalid_fields(step).is_empty()
    }

    pub fn incomplete_steps(&self) -> Vec<Step> {
        Step::all().filter(|s| !self.is_step_valid(*s)).collect()
    }

    fn touch_step(&mut self, step: Step) {
        self.touched.extend(step.required_fields().iter().copied());
    }

    /// Advances one step when the current one is valid. On failure every
    /// required field of the current step is marked touched so its error
    /// shows, and the step does not change.
    pub fn next(&mut self) -> Result<Step, WizardError> {
        let fields = self.invalid_fields(self.step);
        if !fields.is_empty() {
            self.touch_step(self.step);
            return Err(WizardError::StepIncomplete {
                step: self.step,
                fields,
            });
        }
        self.step = Step::new(self.step.0 + 1).unwrap_or(Step::LAST);
        Ok(self.step)
    }

    pub fn previous(&mut self) -> Step {
        self.step = Step::new(self.step.0.saturating_sub(1)).unwrap_or(Step::FIRST);
        self.step
    }

    /// Jumps straight to `step` without validating anything.
    pub fn go_to(&mut self, step: Step) {
        self.step = step;
    }

    /// Builds the request body from the draft. Fails with the incomplete
    /// steps when any required field is missing or malformed.
    pub fn to_request(&self) -> Result<RegisterRequest, WizardError> {
        let steps = self.incomplete_steps();
        if !steps.is_empty() {
            return Err(WizardError::FormIncomplete { steps });
        }

        let text = |f: Field| self.value(f).trim().to_string();
        let opt = |f: Field| Some(text(f)).filter(|s| !s.is_empty());
        let amount = |f: Field| parse_number(self.value(f)).ok().flatten();

        Ok(RegisterRequest {
            email: text(Field::Email),
            password: self.value(Field::Password).to_string(),
            profile: FarmerProfile {
                full_name: text(Field::FullName),
                phone: text(Field::Phone),
                communication: opt(Field::Communication),
                language: opt(Field::Language),
                farm_name: opt(Field::FarmName),
                farm_location: opt(Field::FarmLocation),
                farm_size: amount(Field::FarmSize),
                primary_crops: split_list(self.value(Field::PrimaryCrops)),
                secondary_crops: split_list(self.value(Field::SecondaryCrops)),
                sprayer_type: opt(Field::SprayerType),
                iot_devices: split_list(self.value(Field::IotDevices)),
                machinery: split_list(self.value(Field::Machinery)),
                pesticides: split_list(self.value(Field::Pesticides))
                    .iter()
                    .map(|p| parse_pesticide(p))
                    .filter(|p| !p.name.is_empty())
                    .collect(),
                fertilizer_preference: opt(Field::FertilizerPreference),
                monthly_expenditure: amount(Field::MonthlyExpenditure),
                farming_experience: None,
            },
        })
    }

    /// Validates the whole form and registers through `session`, which signs
    /// the new user in. Success discards the draft; a server rejection leaves
    /// it intact so the user can correct it and resubmit.
    pub async fn submit(&mut self, session: &SessionHolder) -> Result<PublicUser, WizardError> {
        if self.submitted {
            return Err(WizardError::AlreadySubmitted);
        }

        let req = match self.to_request() {
            Ok(req) => req,
            Err(e) => {
                for step in Step::all() {
                    self.touch_step(step);
                }
                debug!(error = %e, "registration form incomplete");
                return Err(e);
            }
        };

        let user = session.register(&req).await?;
        self.submitted = true;
        // the draft, password included, does not outlive a successful submit
        self.values.clear();
        self.touched.clear();
        info!(user_id = %user.id, "registration submitted");
        Ok(user)
    }
}
