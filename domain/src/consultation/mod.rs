//! Consultation input: the de-identified narrative plus optional vitals
//! and demographics submitted for one request.

pub mod input;

pub use input::{ConsultationInput, Sex, ValidationError, Vitals};
