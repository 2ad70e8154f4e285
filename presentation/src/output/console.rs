//! Console output formatter for consultation results

use colored::Colorize;
use council_domain::{
    ClassificationResult, ConsultationReport, ConvergenceReport, EmergencyVerdict, EventPayload,
    MemberJudgments, PipelineEvent, PipelineStage, RetrievalSummary, StageStatus, SynthesisResult,
};

const DISCLAIMER: &str = "This is decision support, not a diagnosis. Always consult a qualified clinician.";

/// Formats verdicts, events and reports for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Emergency verdict, printed instead of any council output
    pub fn format_verdict(verdict: &EmergencyVerdict) -> String {
        let mut output = String::new();

        let line = "!".repeat(60);
        output.push_str(&format!(
            "{}\n{:^60}\n{}\n\n",
            line.red().bold(),
            "EMERGENCY".red().bold(),
            line.red().bold()
        ));
        output.push_str(&format!("{}\n", verdict.advisory_message.bold()));

        if !verdict.triggers.is_empty() {
            output.push_str(&format!("\n{}\n", "Triggered by:".red().bold()));
            for trigger in &verdict.triggers {
                output.push_str(&format!("  * {}\n", trigger));
            }
        }

        output.push_str(&format!("\n{}\n", line.red().bold()));
        output
    }

    /// One line (or block) per pipeline event
    pub fn format_event(event: &PipelineEvent) -> String {
        if event.status == StageStatus::Running {
            return format!(
                "{} {}...",
                "->".cyan(),
                Self::stage_display_name(event.stage).bold()
            );
        }

        match (&event.stage, &event.data) {
            (PipelineStage::Done, _) => format!("{}", "Consultation complete.".green().bold()),
            (_, Some(EventPayload::Classification(result))) => {
                Self::format_classification(result.as_ref())
            }
            (_, Some(EventPayload::Retrieval(summary))) => Self::format_retrieval(summary.as_ref()),
            (_, Some(EventPayload::Divergence(judgments))) => Self::format_divergence(judgments),
            (_, Some(EventPayload::Convergence(report))) => Self::format_convergence(report),
            (_, Some(EventPayload::Synthesis(result))) => Self::format_synthesis(result),
            (stage, None) => format!("{} {}", "v".green(), Self::stage_display_name(*stage)),
        }
    }

    fn format_classification(result: Option<&ClassificationResult>) -> String {
        match result {
            Some(result) => format!(
                "{} {} {} (severity: {}, confidence: {:.0}%)",
                "v".green(),
                "Classification:".cyan().bold(),
                result.label,
                result.severity,
                result.confidence * 100.0
            ),
            None => format!(
                "{} {} unavailable",
                "-".yellow(),
                "Classification:".cyan().bold()
            ),
        }
    }

    fn format_retrieval(summary: Option<&RetrievalSummary>) -> String {
        match summary {
            Some(summary) if summary.topics.is_empty() => format!(
                "{} {} no matching knowledge",
                "v".green(),
                "Retrieval:".cyan().bold()
            ),
            Some(summary) => format!(
                "{} {} {} document(s): {}",
                "v".green(),
                "Retrieval:".cyan().bold(),
                summary.documents_found,
                summary.topics.join(", ")
            ),
            None => format!("{} {} unavailable", "-".yellow(), "Retrieval:".cyan().bold()),
        }
    }

    fn format_divergence(judgments: &MemberJudgments) -> String {
        let mut output = Self::section_header("Stage 1: Divergence");
        for (id, judgment) in judgments.iter() {
            let marker = if judgment.is_fallback() {
                "x".red()
            } else {
                "v".green()
            };
            output.push_str(&format!(
                "  {} {} {}\n",
                marker,
                format!("{}:", id).yellow().bold(),
                judgment.summary_line()
            ));
            if judgment.red_flag {
                output.push_str(&format!("      {}\n", "red flag raised".red().bold()));
            }
        }
        output
    }

    fn format_convergence(report: &ConvergenceReport) -> String {
        let mut output = Self::section_header("Stage 2: Convergence");
        let members = report
            .ranked_members
            .iter()
            .map(|id| id.as_str())
            .collect::<Vec<_>>()
            .join(" > ");
        output.push_str(&format!(
            "  {} {} ({})\n",
            "Ranking:".bold(),
            report.ranking.display_order(),
            members
        ));
        if report.ranking.is_fallback() {
            output.push_str(&format!(
                "  {}\n",
                "reviewer unavailable, ranked by member confidence".dimmed()
            ));
        } else if !report.ranking.rationale.is_empty() {
            output.push_str(&format!("  {}\n", report.ranking.rationale.dimmed()));
        }
        output
    }

    /// Chairman opinion block
    pub fn format_synthesis(result: &SynthesisResult) -> String {
        let mut output = Self::section_header("Stage 3: Synthesis");

        if result.red_flag {
            output.push_str(&format!(
                "\n{}\n",
                "RED FLAG: the council recommends prompt in-person evaluation."
                    .red()
                    .bold()
            ));
        }

        output.push_str(&format!("\n{}\n", result.summary));

        if !result.final_differentials.is_empty() {
            output.push_str(&format!("\n{}\n", "Differentials:".cyan().bold()));
            for (i, differential) in result.final_differentials.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, differential));
            }
        }

        if !result.recommended_next_steps.is_empty() {
            output.push_str(&format!("\n{}\n", "Next Steps:".cyan().bold()));
            for step in &result.recommended_next_steps {
                output.push_str(&format!("  * {}\n", step));
            }
        }

        output.push_str(&format!(
            "\n{} {:.0}%",
            "Confidence:".dimmed(),
            result.confidence * 100.0
        ));
        if result.is_fallback() {
            output.push_str(&format!(" {}", "(chairman unavailable, best member answer)".dimmed()));
        }
        output.push('\n');

        output
    }

    /// Final opinion only (concise output)
    pub fn format_summary(report: &ConsultationReport) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "{}\n",
            "=== Clinical Council Opinion ===".cyan().bold()
        ));

        match &report.synthesis {
            Some(synthesis) => output.push_str(&Self::format_synthesis(synthesis)),
            None => output.push_str(&format!(
                "\n{}\n",
                "The consultation ended before an opinion was produced.".yellow()
            )),
        }

        let degraded = report.degraded_count();
        if degraded > 0 {
            output.push_str(&format!(
                "{}\n",
                format!("{} council step(s) used a fallback.", degraded).dimmed()
            ));
        }

        output.push_str(&Self::format_footer());
        output
    }

    /// Format as JSON
    pub fn format_json(report: &ConsultationReport) -> String {
        serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
    }

    /// Emergency verdict as JSON
    pub fn format_verdict_json(verdict: &EmergencyVerdict) -> String {
        serde_json::to_string_pretty(verdict).unwrap_or_else(|_| "{}".to_string())
    }

    fn stage_display_name(stage: PipelineStage) -> &'static str {
        match stage {
            PipelineStage::Classification => "Classification",
            PipelineStage::RagRetrieval => "Knowledge retrieval",
            PipelineStage::Divergence => "Stage 1: Divergence",
            PipelineStage::Convergence => "Stage 2: Convergence",
            PipelineStage::Synthesis => "Stage 3: Synthesis",
            PipelineStage::Done => "Done",
        }
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    /// Disclaimer closing every rendered opinion
    pub fn format_footer() -> String {
        format!("\n{}\n{}\n", DISCLAIMER.dimmed(), "=".repeat(60).cyan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_domain::{
        AliasLabel, AliasMap, EmergencyGate, MemberJudgment, RankingResult, SeverityLevel, Vitals,
    };

    fn judgments() -> MemberJudgments {
        MemberJudgments::new(
            MemberJudgment::new(vec!["Stable angina".into()], vec!["ECG".into()], 0.8, false),
            MemberJudgment::fallback("timed out", None),
            MemberJudgment::new(vec!["GERD".into()], vec!["PPI trial".into()], 0.4, true),
        )
    }

    #[test]
    fn test_verdict_lists_triggers() {
        let verdict = EmergencyGate::default()
            .evaluate(&Vitals::default().with_spo2(85.0), "crushing chest pain");
        let output = ConsoleFormatter::format_verdict(&verdict);
        assert!(output.contains("EMERGENCY"));
        assert!(output.contains("112/911"));
        assert!(output.contains("crushing chest pain"));
    }

    #[test]
    fn test_running_event() {
        let output = ConsoleFormatter::format_event(&PipelineEvent::running(PipelineStage::Divergence));
        assert!(output.contains("Stage 1: Divergence"));
    }

    #[test]
    fn test_omitted_pre_stages() {
        let output = ConsoleFormatter::format_event(&PipelineEvent::classification(None));
        assert!(output.contains("unavailable"));
        let output = ConsoleFormatter::format_event(&PipelineEvent::retrieval(None));
        assert!(output.contains("unavailable"));
    }

    #[test]
    fn test_classification_event() {
        let result = ClassificationResult::new(
            "cardiac_arrhythmia",
            "Cardiac Arrhythmia",
            SeverityLevel::Moderate,
            0.87,
        );
        let output = ConsoleFormatter::format_event(&PipelineEvent::classification(Some(result)));
        assert!(output.contains("Cardiac Arrhythmia"));
        assert!(output.contains("87%"));
    }

    #[test]
    fn test_divergence_marks_fallback_and_red_flag() {
        let event = PipelineEvent::complete(
            PipelineStage::Divergence,
            EventPayload::Divergence(judgments()),
        );
        let output = ConsoleFormatter::format_event(&event);
        assert!(output.contains("member_a:"));
        assert!(output.contains("Stable angina"));
        assert!(output.contains("red flag raised"));
    }

    #[test]
    fn test_convergence_shows_identities() {
        let aliases = AliasMap::from_labels([AliasLabel::B, AliasLabel::A, AliasLabel::C]).unwrap();
        let ranking = RankingResult::fallback(&judgments(), &aliases, "reviewer timed out");
        let report = ConvergenceReport {
            ranked_members: ranking.ranked_members(&aliases),
            ranking,
        };
        let output = ConsoleFormatter::format_event(&PipelineEvent::complete(
            PipelineStage::Convergence,
            EventPayload::Convergence(report),
        ));
        assert!(output.contains("member_a > member_c > member_b"));
        assert!(output.contains("ranked by member confidence"));
    }

    #[test]
    fn test_summary_without_synthesis() {
        let report = ConsultationReport::default();
        let output = ConsoleFormatter::format_summary(&report);
        assert!(output.contains("ended before an opinion"));
        assert!(output.contains("not a diagnosis"));
    }

    #[test]
    fn test_summary_with_fallback_synthesis() {
        let judgments = judgments();
        let synthesis = SynthesisResult::from_top_judgment(&judgments.member_a, "chairman failed")
            .with_council_red_flags(&judgments);
        let report = ConsultationReport {
            divergence: Some(judgments),
            synthesis: Some(synthesis),
            completed: true,
            ..Default::default()
        };
        let output = ConsoleFormatter::format_summary(&report);
        assert!(output.contains("RED FLAG"));
        assert!(output.contains("Stable angina"));
        assert!(output.contains("chairman unavailable"));
        assert!(output.contains("2 council step(s) used a fallback."));
    }

    #[test]
    fn test_json_report() {
        let report = ConsultationReport {
            completed: true,
            ..Default::default()
        };
        let value: serde_json::Value =
            serde_json::from_str(&ConsoleFormatter::format_json(&report)).unwrap();
        assert_eq!(value["completed"], true);
        assert!(value["synthesis"].is_null());
    }
}
