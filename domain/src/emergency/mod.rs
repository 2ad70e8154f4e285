//! Emergency gate: deterministic, non-ML pre-check that can terminate a
//! consultation before anything leaves the device.

pub mod gate;

pub use gate::{EMERGENCY_PHRASES, EmergencyGate, EmergencyVerdict, evaluate};
