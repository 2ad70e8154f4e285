//! Reasoning-engine gateways.

pub mod openai_compatible;

pub use openai_compatible::{OpenAiCompatibleConfig, OpenAiCompatibleGateway, OpenAiCompatibleSession};
