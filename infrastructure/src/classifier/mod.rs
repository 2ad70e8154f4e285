//! Symptom classifier adapters.

mod keyword;

pub use keyword::{KeywordSymptomClassifier, NO_MATCH_CONFIDENCE};
