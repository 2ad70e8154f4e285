//! CLI command definitions

use clap::{Parser, ValueEnum};
use council_domain::{FeedbackPolarity, Sex};
use std::path::PathBuf;

/// Output format for consultation results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Every pipeline event as it arrives
    Events,
    /// Only the final opinion
    Summary,
    /// The aggregated report as JSON
    Json,
}

impl From<OutputFormat> for council_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Events => Self::Events,
            OutputFormat::Summary => Self::Summary,
            OutputFormat::Json => Self::Json,
        }
    }
}

/// CLI arguments for clinical-council
#[derive(Parser, Debug)]
#[command(name = "clinical-council")]
#[command(author, version, about = "Clinical Council - three reasoning engines deliberate on a symptom description")]
#[command(long_about = r#"
Clinical Council screens a symptom description for emergencies and then lets a
council of reasoning engines deliberate on it.

The process has three stages:
1. Divergence: three members produce independent differentials in parallel
2. Convergence: a reviewer ranks the anonymized answers
3. Synthesis: a chairman writes the final opinion

Emergencies (alarming vitals or phrases) stop the pipeline before any engine is
contacted and exit with status 2.

Configuration files are loaded from (in priority order):
1. COUNCIL_* environment variables
2. --config <path>     Explicit config file
3. ./council.toml      Project-level config
4. ~/.config/clinical-council/config.toml   Global config

Example:
  clinical-council "Palpitations for two days, worse after coffee"
  clinical-council --heart-rate 118 --spo2 96 --age 54 --sex F "Racing heart and dizziness"
  clinical-council -o json "Ankle swelling and breathlessness when lying flat"
"#)]
pub struct Cli {
    /// Free-text description of the symptoms
    pub symptoms: String,

    /// Heart rate in beats per minute
    #[arg(long, value_name = "BPM")]
    pub heart_rate: Option<f64>,

    /// Peripheral oxygen saturation in percent
    #[arg(long, value_name = "PERCENT")]
    pub spo2: Option<f64>,

    /// Systolic blood pressure in mmHg
    #[arg(long, value_name = "MMHG")]
    pub systolic_bp: Option<f64>,

    /// Patient age in years
    #[arg(long)]
    pub age: Option<u32>,

    /// Patient sex (M, F, O, U)
    #[arg(long)]
    pub sex: Option<Sex>,

    /// Output format (defaults to the config file, then `events`)
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Write operational logs to this file instead of stderr
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Rate the final opinion (helpful, unhelpful)
    #[arg(long, value_name = "POLARITY")]
    pub feedback: Option<FeedbackPolarity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_invocation() {
        let cli = Cli::try_parse_from([
            "clinical-council",
            "--heart-rate",
            "118",
            "--spo2",
            "96.5",
            "--age",
            "54",
            "--sex",
            "F",
            "-o",
            "summary",
            "-vv",
            "--feedback",
            "helpful",
            "Racing heart and dizziness",
        ])
        .unwrap();

        assert_eq!(cli.symptoms, "Racing heart and dizziness");
        assert_eq!(cli.heart_rate, Some(118.0));
        assert_eq!(cli.spo2, Some(96.5));
        assert_eq!(cli.age, Some(54));
        assert_eq!(cli.sex, Some(Sex::Female));
        assert_eq!(cli.output, Some(OutputFormat::Summary));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.feedback, Some(FeedbackPolarity::Helpful));
        assert!(!cli.quiet);
    }

    #[test]
    fn test_symptoms_required() {
        assert!(Cli::try_parse_from(["clinical-council"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_sex() {
        assert!(Cli::try_parse_from(["clinical-council", "--sex", "X", "cough"]).is_err());
    }

    #[test]
    fn test_output_format_conversion() {
        assert_eq!(
            council_domain::OutputFormat::from(OutputFormat::Json),
            council_domain::OutputFormat::Json
        );
    }
}
