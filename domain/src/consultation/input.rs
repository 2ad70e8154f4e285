//! Consultation input value objects and structural validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Oldest age accepted for a consultation
pub const MAX_AGE: u32 = 150;

/// Structural problems with a consultation input.
///
/// These are the only failures surfaced to the caller as errors; every
/// later degradation is recovered inside the pipeline.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("vital `{0}` must be a finite number")]
    NonFiniteVital(&'static str),

    #[error("vital `{0}` cannot be negative")]
    NegativeVital(&'static str),

    #[error("spo2 must be a percentage between 0 and 100, got {0}")]
    Spo2OutOfRange(f64),

    #[error("age must be between 0 and {MAX_AGE}, got {0}")]
    AgeOutOfRange(u32),

    #[error("unknown sex value: {0} (expected M, F, O or U)")]
    UnknownSex(String),
}

/// Sex as recorded in the de-identified case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "M")]
    Male,
    #[serde(rename = "F")]
    Female,
    #[serde(rename = "O")]
    Other,
    #[serde(rename = "U")]
    Unknown,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "M",
            Sex::Female => "F",
            Sex::Other => "O",
            Sex::Unknown => "U",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Sex::Male => "male",
            Sex::Female => "female",
            Sex::Other => "other",
            Sex::Unknown => "unspecified",
        }
    }
}

impl std::str::FromStr for Sex {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Sex::Male),
            "f" | "female" => Ok(Sex::Female),
            "o" | "other" => Ok(Sex::Other),
            "u" | "unknown" => Ok(Sex::Unknown),
            _ => Err(ValidationError::UnknownSex(s.to_string())),
        }
    }
}

/// Optional structured vital signs.
///
/// Absent fields are excluded from emergency evaluation; they are never
/// read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    /// Heart rate in beats per minute
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate: Option<f64>,
    /// Peripheral oxygen saturation in percent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spo2: Option<f64>,
    /// Systolic blood pressure in mmHg
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub systolic_bp: Option<f64>,
}

impl Vitals {
    pub fn with_heart_rate(mut self, bpm: f64) -> Self {
        self.heart_rate = Some(bpm);
        self
    }

    pub fn with_spo2(mut self, percent: f64) -> Self {
        self.spo2 = Some(percent);
        self
    }

    pub fn with_systolic_bp(mut self, mmhg: f64) -> Self {
        self.systolic_bp = Some(mmhg);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.heart_rate.is_none() && self.spo2.is_none() && self.systolic_bp.is_none()
    }

    fn validate(&self) -> Result<(), ValidationError> {
        for (name, value) in [
            ("heart_rate", self.heart_rate),
            ("spo2", self.spo2),
            ("systolic_bp", self.systolic_bp),
        ] {
            let Some(value) = value else { continue };
            if !value.is_finite() {
                return Err(ValidationError::NonFiniteVital(name));
            }
            if value < 0.0 {
                return Err(ValidationError::NegativeVital(name));
            }
        }
        if let Some(spo2) = self.spo2
            && spo2 > 100.0
        {
            return Err(ValidationError::Spo2OutOfRange(spo2));
        }
        Ok(())
    }
}

/// A consultation request (Value Object)
///
/// The narrative has already been stripped of identifying content by the
/// client. Once constructed the input is immutable; the builder methods
/// consume and re-validate.
///
/// An empty narrative is structurally valid here: the emergency gate must
/// still see the vitals. Whether an empty narrative may proceed to the
/// council is decided by the pipeline after the gate clears.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultationInput {
    narrative: String,
    vitals: Vitals,
    #[serde(skip_serializing_if = "Option::is_none")]
    age: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sex: Option<Sex>,
}

impl ConsultationInput {
    /// Create a new consultation input, validating the vitals.
    pub fn new(narrative: impl Into<String>, vitals: Vitals) -> Result<Self, ValidationError> {
        vitals.validate()?;
        Ok(Self {
            narrative: narrative.into(),
            vitals,
            age: None,
            sex: None,
        })
    }

    pub fn with_age(mut self, age: u32) -> Result<Self, ValidationError> {
        if age > MAX_AGE {
            return Err(ValidationError::AgeOutOfRange(age));
        }
        self.age = Some(age);
        Ok(self)
    }

    pub fn with_sex(mut self, sex: Sex) -> Self {
        self.sex = Some(sex);
        self
    }

    pub fn narrative(&self) -> &str {
        &self.narrative
    }

    pub fn vitals(&self) -> &Vitals {
        &self.vitals
    }

    pub fn age(&self) -> Option<u32> {
        self.age
    }

    pub fn sex(&self) -> Option<Sex> {
        self.sex
    }

    /// Whether the narrative contains anything besides whitespace
    pub fn has_narrative(&self) -> bool {
        !self.narrative.trim().is_empty()
    }

    /// "Patient: 54-year-old male" style line, if any demographics are known
    pub fn demographics_line(&self) -> Option<String> {
        match (self.age, self.sex) {
            (Some(age), Some(sex)) => Some(format!(
                "Patient: {}-year-old {}",
                age,
                sex.display_name()
            )),
            (Some(age), None) => Some(format!("Patient: {}-year-old", age)),
            (None, Some(sex)) => Some(format!("Patient sex: {}", sex.display_name())),
            (None, None) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_with_vitals() {
        let vitals = Vitals::default()
            .with_heart_rate(72.0)
            .with_spo2(98.0)
            .with_systolic_bp(118.0);
        let input = ConsultationInput::new("mild headache for two days", vitals).unwrap();
        assert_eq!(input.narrative(), "mild headache for two days");
        assert_eq!(input.vitals().heart_rate, Some(72.0));
        assert!(input.has_narrative());
    }

    #[test]
    fn test_rejects_non_finite_vitals() {
        let vitals = Vitals::default().with_heart_rate(f64::NAN);
        assert_eq!(
            ConsultationInput::new("palpitations", vitals),
            Err(ValidationError::NonFiniteVital("heart_rate"))
        );
    }

    #[test]
    fn test_rejects_negative_vitals() {
        let vitals = Vitals::default().with_systolic_bp(-10.0);
        assert_eq!(
            ConsultationInput::new("dizzy", vitals),
            Err(ValidationError::NegativeVital("systolic_bp"))
        );
    }

    #[test]
    fn test_rejects_spo2_above_hundred() {
        let vitals = Vitals::default().with_spo2(104.0);
        assert_eq!(
            ConsultationInput::new("short of breath", vitals),
            Err(ValidationError::Spo2OutOfRange(104.0))
        );
    }

    #[test]
    fn test_age_bounds() {
        let input = ConsultationInput::new("cough", Vitals::default()).unwrap();
        assert!(input.clone().with_age(150).is_ok());
        assert_eq!(
            input.with_age(151),
            Err(ValidationError::AgeOutOfRange(151))
        );
    }

    #[test]
    fn test_empty_narrative_is_structurally_valid() {
        let input = ConsultationInput::new("   ", Vitals::default()).unwrap();
        assert!(!input.has_narrative());
    }

    #[test]
    fn test_sex_parsing() {
        assert_eq!("F".parse::<Sex>().unwrap(), Sex::Female);
        assert_eq!("male".parse::<Sex>().unwrap(), Sex::Male);
        assert!(matches!(
            "x".parse::<Sex>(),
            Err(ValidationError::UnknownSex(_))
        ));
    }

    #[test]
    fn test_demographics_line() {
        let input = ConsultationInput::new("back pain", Vitals::default())
            .unwrap()
            .with_age(54)
            .unwrap()
            .with_sex(Sex::Male);
        assert_eq!(
            input.demographics_line().as_deref(),
            Some("Patient: 54-year-old male")
        );

        let bare = ConsultationInput::new("back pain", Vitals::default()).unwrap();
        assert!(bare.demographics_line().is_none());
    }

    #[test]
    fn test_vitals_deserialize_absent_fields() {
        let vitals: Vitals = serde_json::from_str(r#"{"spo2": 97}"#).unwrap();
        assert_eq!(vitals.spo2, Some(97.0));
        assert!(vitals.heart_rate.is_none());
        assert!(!vitals.is_empty());
        assert!(Vitals::default().is_empty());
    }
}
