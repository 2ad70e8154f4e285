//! Deterministic lexicon classifier over the cardiac triage categories.
//!
//! Each category owns a list of lowercase cue phrases. The category with the
//! most matching cues wins; confidence is its share of all matches. Ties go
//! to the category listed first, so the more urgent reading wins.

use async_trait::async_trait;
use council_application::{AdapterError, SymptomClassifier};
use council_domain::{ClassificationResult, SeverityLevel};
use tracing::debug;

/// Confidence reported when no cue matches at all
pub const NO_MATCH_CONFIDENCE: f64 = 0.5;

struct Category {
    key: &'static str,
    label: &'static str,
    severity: SeverityLevel,
    action: &'static str,
    cues: &'static [&'static str],
}

const NON_CARDIAC: usize = 4;

const CATEGORIES: [Category; 5] = [
    Category {
        key: "cardiac_emergency",
        label: "Cardiac Emergency",
        severity: SeverityLevel::Critical,
        action: "Seek emergency care immediately. Call 112/911.",
        cues: &[
            "crushing",
            "radiating to left arm",
            "radiating to jaw",
            "radiating to back",
            "tearing",
            "substernal",
            "retrosternal",
            "diaphoresis",
            "cold sweat",
            "st elevation",
            "troponin",
            "impending doom",
            "feeling of doom",
            "cardiac arrest",
            "no pulse",
            "severe chest",
            "hemodynamic instability",
        ],
    },
    Category {
        key: "cardiac_chronic",
        label: "Chronic Cardiac Condition",
        severity: SeverityLevel::Moderate,
        action: "Schedule cardiology consultation. Monitor symptoms.",
        cues: &[
            "on exertion",
            "exertional",
            "relieved by rest",
            "ankle swelling",
            "leg edema",
            "edema",
            "orthopnea",
            "nocturnal dyspnea",
            "heart failure",
            "stable angina",
            "coronary artery disease",
            "murmur",
            "cardiomyopathy",
            "ejection fraction",
            "regurgitation",
            "stenosis",
            "exercise intolerance",
            "worsening breathlessness",
        ],
    },
    Category {
        key: "cardiac_arrhythmia",
        label: "Cardiac Arrhythmia",
        severity: SeverityLevel::Moderate,
        action: "ECG and Holter monitoring recommended. Cardiology referral.",
        cues: &[
            "palpitation",
            "irregular heartbeat",
            "irregular pulse",
            "irregular rhythm",
            "rapid heartbeat",
            "racing heart",
            "skipped heartbeat",
            "skipped beats",
            "fluttering",
            "atrial fibrillation",
            "afib",
            "tachycardia",
            "bradycardia",
            "slow heart rate",
            "rapid heart rate",
            "premature ventricular",
            "pacemaker",
        ],
    },
    Category {
        key: "cardiac_risk",
        label: "Cardiovascular Risk Factors",
        severity: SeverityLevel::LowModerate,
        action: "Lifestyle modifications and risk factor management.",
        cues: &[
            "high blood pressure",
            "hypertension",
            "cholesterol",
            "ldl",
            "triglycerides",
            "diabetes",
            "prediabetes",
            "blood sugar",
            "obesity",
            "bmi",
            "family history",
            "smoker",
            "smoking",
            "sedentary",
            "metabolic syndrome",
            "calcium score",
        ],
    },
    Category {
        key: "non_cardiac",
        label: "Non-Cardiac",
        severity: SeverityLevel::Low,
        action: "Evaluate for other causes. Primary care follow-up.",
        cues: &[
            "heartburn",
            "acid reflux",
            "after eating",
            "antacid",
            "stomach",
            "cough",
            "sputum",
            "fever",
            "sore throat",
            "nasal congestion",
            "chest wall",
            "pressing on ribs",
            "after heavy lifting",
            "muscle pain",
            "panic attack",
            "anxiety",
            "hyperventilation",
            "headache",
            "back pain",
            "diarrhea",
            "rash",
            "joint pain",
            "insomnia",
            "urinary",
        ],
    },
];

/// Local, offline implementation of the classifier port.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSymptomClassifier;

impl KeywordSymptomClassifier {
    pub fn new() -> Self {
        Self
    }

    /// Classify synchronously; the port wrapper only adds the async signature.
    pub fn classify_text(&self, symptom_text: &str) -> ClassificationResult {
        let text = symptom_text.to_lowercase();

        let matches: Vec<Vec<&'static str>> = CATEGORIES
            .iter()
            .map(|category| {
                category
                    .cues
                    .iter()
                    .copied()
                    .filter(|cue| text.contains(cue))
                    .collect()
            })
            .collect();

        let total: usize = matches.iter().map(Vec::len).sum();

        // max_by_key keeps the last maximum; iterate in reverse so ties favour table order
        let winner = matches
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, hits)| hits.len())
            .map(|(index, _)| index);

        let winner = match winner {
            Some(index) if total > 0 => index,
            _ => {
                return Self::result(&CATEGORIES[NON_CARDIAC], NO_MATCH_CONFIDENCE)
                    .with_rationale("no cardiac cues recognised");
            }
        };
        let hits = &matches[winner];

        let confidence = hits.len() as f64 / total as f64;
        debug!(
            category = CATEGORIES[winner].key,
            hits = hits.len(),
            total,
            "Keyword classification"
        );

        Self::result(&CATEGORIES[winner], confidence)
            .with_rationale(format!("matched: {}", hits.join(", ")))
    }

    fn result(category: &Category, confidence: f64) -> ClassificationResult {
        ClassificationResult::new(
            category.key,
            category.label,
            category.severity,
            confidence,
        )
        .with_recommended_action(category.action)
    }
}

#[async_trait]
impl SymptomClassifier for KeywordSymptomClassifier {
    async fn classify(&self, symptom_text: &str) -> Result<ClassificationResult, AdapterError> {
        Ok(self.classify_text(symptom_text))
    }
}
