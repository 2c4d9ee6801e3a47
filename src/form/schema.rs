//! Field definitions and the validation schema for the request form.
//!
//! Each field maps to an ordered list of rules. Evaluation stops at the first
//! failing rule of a field, so `required` is always reported before length or
//! range problems.

use std::collections::BTreeMap;

use crate::domain::{BloodGroup, BloodRequest};
use crate::error::{BloodRequestError, Result};
use crate::session::Identity;

/// Fields of the blood request form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    PatientName,
    BloodGroup,
    Amount,
    HospitalName,
    Date,
    UserDivision,
    UserDistrict,
    UserCity,
    PhoneNo,
    Notes,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::PatientName,
        Field::BloodGroup,
        Field::Amount,
        Field::HospitalName,
        Field::Date,
        Field::UserDivision,
        Field::UserDistrict,
        Field::UserCity,
        Field::PhoneNo,
        Field::Notes,
    ];

    /// Wire name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::PatientName => "patientName",
            Field::BloodGroup => "bloodGroup",
            Field::Amount => "amount",
            Field::HospitalName => "hospitalName",
            Field::Date => "date",
            Field::UserDivision => "userDivision",
            Field::UserDistrict => "userDistrict",
            Field::UserCity => "userCity",
            Field::PhoneNo => "phoneNo",
            Field::Notes => "notes",
        }
    }

    /// Fields whose options are derived from this one and must be cleared when it changes.
    pub fn dependents(&self) -> &'static [Field] {
        match self {
            Field::UserDivision => &[Field::UserDistrict, Field::UserCity],
            Field::UserDistrict => &[Field::UserCity],
            _ => &[],
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Field {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("Unknown form field: {}", s))
    }
}

/// Raw values as entered, keyed by field. Unset fields read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<Field, String>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: Field) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn clear(&mut self, field: Field) {
        self.values.remove(&field);
    }

    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        self.set(field, value);
        self
    }
}

/// Per-field error messages. Fields without an entry are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: BTreeMap<Field, String>,
}

impl FieldErrors {
    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(f, m)| (*f, m.as_str()))
    }

    pub fn set(&mut self, field: Field, message: Option<String>) {
        match message {
            Some(message) => {
                self.errors.insert(field, message);
            }
            None => {
                self.errors.remove(&field);
            }
        }
    }

    pub fn clear(&mut self) {
        self.errors.clear();
    }
}

/// A constraint on a single field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Non-empty after trimming whitespace
    Required,
    /// Exactly one of the listed strings
    OneOf(Vec<String>),
    /// Parses as an integer
    Numeric,
    /// Integer at least this large
    Min(i64),
    /// At least this many characters
    MinLength(usize),
}

impl Check {
    /// Whether `value` satisfies this check. Only `Required` rejects empty values.
    ///
    /// Blank input counts as empty. `MinLength` counts the raw input, every
    /// other check sees the trimmed value.
    pub fn passes(&self, value: &str) -> bool {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return !matches!(self, Check::Required);
        }
        match self {
            Check::Required => true,
            Check::OneOf(allowed) => allowed.iter().any(|a| a == trimmed),
            Check::Numeric => trimmed.parse::<i64>().is_ok(),
            Check::Min(min) => trimmed.parse::<i64>().is_ok_and(|n| n >= *min),
            Check::MinLength(len) => value.chars().count() >= *len,
        }
    }
}

/// A check paired with the message shown when it fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub check: Check,
    pub message: String,
}

impl Rule {
    pub fn new(check: Check, message: &str) -> Self {
        Self {
            check,
            message: message.to_string(),
        }
    }
}

/// Mapping from field to its ordered rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSchema {
    rules: BTreeMap<Field, Vec<Rule>>,
}

impl ValidationSchema {
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    /// Attach `rules` to `field`, replacing any rules it had.
    pub fn register(mut self, field: Field, rules: Vec<Rule>) -> Self {
        self.rules.insert(field, rules);
        self
    }

    /// The rules of the blood request form.
    pub fn blood_request() -> Self {
        let groups = BloodGroup::ALL.iter().map(|g| g.as_str().to_string()).collect();
        Self::empty()
            .register(
                Field::PatientName,
                vec![Rule::new(Check::Required, "Patient name is required")],
            )
            .register(
                Field::BloodGroup,
                vec![
                    Rule::new(Check::Required, "Blood group is required"),
                    Rule::new(Check::OneOf(groups), "Blood group is required"),
                ],
            )
            .register(
                Field::Amount,
                vec![
                    Rule::new(Check::Required, "Amount is required"),
                    Rule::new(Check::Numeric, "Amount is required"),
                    Rule::new(Check::Min(1), "Amount is required"),
                ],
            )
            .register(
                Field::HospitalName,
                vec![Rule::new(Check::Required, "Hospital name is required")],
            )
            .register(
                Field::Date,
                vec![Rule::new(Check::Required, "Date is required")],
            )
            .register(
                Field::UserDivision,
                vec![Rule::new(Check::Required, "Division is required")],
            )
            .register(
                Field::UserDistrict,
                vec![Rule::new(Check::Required, "District is required")],
            )
            .register(
                Field::UserCity,
                vec![Rule::new(Check::Required, "City / Upazila is required")],
            )
            .register(
                Field::PhoneNo,
                vec![
                    Rule::new(Check::Required, "Phone number is required"),
                    Rule::new(Check::MinLength(11), "Must be 11 digits"),
                ],
            )
    }

    /// First failing rule's message for `field`, if any.
    pub fn validate_field(&self, field: Field, values: &FormValues) -> Option<&str> {
        let value = values.get(field);
        self.rules
            .get(&field)?
            .iter()
            .find(|rule| !rule.check.passes(value))
            .map(|rule| rule.message.as_str())
    }

    /// Evaluate every registered field.
    pub fn validate(&self, values: &FormValues) -> FieldErrors {
        let mut errors = FieldErrors::default();
        for field in self.rules.keys() {
            errors.set(
                *field,
                self.validate_field(*field, values).map(str::to_string),
            );
        }
        errors
    }

    /// Validate and, if everything passes, build the record to submit.
    pub fn compose(&self, values: &FormValues, user: Option<&Identity>) -> Result<BloodRequest> {
        let mut errors = self.validate(values);

        let blood_group = values.get(Field::BloodGroup).trim().parse::<BloodGroup>();
        let amount = values
            .get(Field::Amount)
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|n| *n >= 1);

        if errors.get(Field::BloodGroup).is_none() && blood_group.is_err() {
            errors.set(Field::BloodGroup, Some("Blood group is required".to_string()));
        }
        if errors.get(Field::Amount).is_none() && amount.is_none() {
            errors.set(Field::Amount, Some("Amount is required".to_string()));
        }

        match (blood_group, amount) {
            (Ok(blood_group), Some(amount)) if errors.is_empty() => {
                let text = |field: Field| values.get(field).trim().to_string();
                let notes = text(Field::Notes);
                Ok(BloodRequest {
                    patient_name: text(Field::PatientName),
                    blood_group,
                    amount,
                    hospital_name: text(Field::HospitalName),
                    date: text(Field::Date),
                    user_division: text(Field::UserDivision),
                    user_district: text(Field::UserDistrict),
                    user_city: text(Field::UserCity),
                    // Sent as typed so the submitted length is the validated one
                    phone_no: values.get(Field::PhoneNo).to_string(),
                    notes: (!notes.is_empty()).then_some(notes),
                    user: user.map(|u| u.as_str().to_string()),
                })
            }
            _ => Err(BloodRequestError::Validation(errors)),
        }
    }
}

impl Default for ValidationSchema {
    fn default() -> Self {
        Self::blood_request()
    }
}
