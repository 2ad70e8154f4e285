//! Deterministic emergency evaluation of vitals and symptom text.
//!
//! The gate is a pure function: no I/O, no clock, no randomness. Identical
//! input always yields an identical verdict. Conditions are OR-combined and
//! there is no confidence threshold, so any single match is sufficient.
//!
//! | Condition | Triggers when |
//! |-----------|---------------|
//! | Heart rate | outside 40–150 bpm |
//! | SpO₂ | below 90 % |
//! | Systolic BP | outside 80–180 mmHg |
//! | Narrative | contains any phrase of the table (case-insensitive) |

use crate::consultation::Vitals;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Heart rate range (bpm) considered safe
pub const HEART_RATE_RANGE: RangeInclusive<f64> = 40.0..=150.0;

/// Lowest SpO₂ (%) considered safe
pub const SPO2_FLOOR: f64 = 90.0;

/// Systolic blood pressure range (mmHg) considered safe
pub const SYSTOLIC_BP_RANGE: RangeInclusive<f64> = 80.0..=180.0;

/// Fixed high-risk phrase table, matched as lowercase substrings.
///
/// Configuration may append to this table but never remove from it.
pub const EMERGENCY_PHRASES: &[&str] = &[
    "severe chest pain",
    "crushing chest pain",
    "chest pain radiating",
    "can only speak in short sentences",
    "severe shortness of breath",
    "unable to breathe",
    "not breathing",
    "uncontrollable bleeding",
    "uncontrolled bleeding",
    "severe bleeding",
    "coughing up blood",
    "sudden weakness",
    "sudden numbness",
    "slurred speech",
    "facial drooping",
    "sudden severe headache",
    "worst headache of life",
    "severe head injury",
    "loss of consciousness",
    "overdose",
    "toxic ingestion",
    "severe allergic reaction",
    "anaphylaxis",
    "throat swelling",
    "rigid abdomen",
    "suicidal thoughts",
    "seizure",
    "convulsion",
];

const ADVISORY_PREFIX: &str =
    "EMERGENCY DETECTED. Please call emergency services (112/911) immediately.";

/// Outcome of the emergency gate. Exactly one per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyVerdict {
    pub is_emergency: bool,
    /// Matched conditions joined by `"; "`, empty when clear
    pub reason: String,
    /// Message to show the user, empty when clear
    pub advisory_message: String,
    /// Every matched condition, in evaluation order
    #[serde(default)]
    pub triggers: Vec<String>,
    /// One code per trigger (`heart_rate`, `spo2`, `systolic_bp`, `phrase:<index>`).
    /// Codes never contain narrative text.
    #[serde(default)]
    pub trigger_codes: Vec<String>,
}

impl EmergencyVerdict {
    /// A verdict with no matching condition
    pub fn clear() -> Self {
        Self {
            is_emergency: false,
            reason: String::new(),
            advisory_message: String::new(),
            triggers: Vec::new(),
            trigger_codes: Vec::new(),
        }
    }

    fn from_triggers(matched: Vec<(String, String)>) -> Self {
        if matched.is_empty() {
            return Self::clear();
        }
        let (trigger_codes, triggers): (Vec<String>, Vec<String>) = matched.into_iter().unzip();
        let reason = triggers.join("; ");
        Self {
            is_emergency: true,
            advisory_message: format!("{} Reason: {}", ADVISORY_PREFIX, reason),
            reason,
            triggers,
            trigger_codes,
        }
    }
}

/// Evaluates vitals and narrative against fixed thresholds and a phrase table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmergencyGate {
    phrases: Vec<String>,
}

impl Default for EmergencyGate {
    fn default() -> Self {
        Self {
            phrases: EMERGENCY_PHRASES.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl EmergencyGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append phrases to the fixed table (lowercased, blanks and duplicates skipped).
    pub fn with_extra_phrases<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for phrase in phrases {
            let phrase = phrase.as_ref().trim().to_lowercase();
            if !phrase.is_empty() && !self.phrases.contains(&phrase) {
                self.phrases.push(phrase);
            }
        }
        self
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Evaluate one request. Vitals are checked first (heart rate, SpO₂,
    /// systolic BP), then phrases in table order; all matches are reported.
    pub fn evaluate(&self, vitals: &Vitals, symptom_text: &str) -> EmergencyVerdict {
        let mut triggers = Self::vital_triggers(vitals);

        let lower_text = symptom_text.to_lowercase();
        triggers.extend(
            self.phrases
                .iter()
                .enumerate()
                .filter(|(_, phrase)| lower_text.contains(phrase.as_str()))
                .map(|(index, phrase)| {
                    (format!("phrase:{}", index), format!("Emergency phrase: {}", phrase))
                }),
        );

        EmergencyVerdict::from_triggers(triggers)
    }

    fn vital_triggers(vitals: &Vitals) -> Vec<(String, String)> {
        let mut triggers = Vec::new();

        if let Some(hr) = vitals.heart_rate
            && !HEART_RATE_RANGE.contains(&hr)
        {
            triggers.push(("heart_rate".to_string(), format!("Critical heart rate: {} bpm", hr)));
        }
        if let Some(spo2) = vitals.spo2
            && spo2 < SPO2_FLOOR
        {
            triggers.push(("spo2".to_string(), format!("Critical SpO2: {}%", spo2)));
        }
        if let Some(sbp) = vitals.systolic_bp
            && !SYSTOLIC_BP_RANGE.contains(&sbp)
        {
            triggers.push((
                "systolic_bp".to_string(),
                format!("Critical blood pressure: {} mmHg systolic", sbp),
            ));
        }

        triggers
    }
}

/// Evaluate against the fixed table only.
pub fn evaluate(vitals: &Vitals, symptom_text: &str) -> EmergencyVerdict {
    EmergencyGate::default().evaluate(vitals, symptom_text)
}
