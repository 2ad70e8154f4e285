//! Progress reporting for a running consultation

use colored::Colorize;
use council_domain::{PipelineEvent, PipelineStage, StageStatus};
use indicatif::{ProgressBar, ProgressStyle};

/// Stages that advance the bar: two pre-stages and three council stages
const TRACKED_STAGES: u64 = 5;

/// Observes pipeline events and renders progress
pub trait EventObserver {
    fn on_event(&self, event: &PipelineEvent);

    /// Print a line without corrupting the progress display
    fn println(&self, line: &str);

    fn finish(&self);
}

/// Reports progress with an indicatif bar driven by pipeline events
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let bar = ProgressBar::new(TRACKED_STAGES);
        bar.set_style(Self::stage_style());
        bar.set_prefix("Council");
        bar.set_message("Screening...");
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }

    fn stage_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn stage_message(stage: PipelineStage) -> &'static str {
        match stage {
            PipelineStage::Classification => "Classifying symptoms",
            PipelineStage::RagRetrieval => "Retrieving knowledge",
            PipelineStage::Divergence => "Members deliberating",
            PipelineStage::Convergence => "Reviewer ranking",
            PipelineStage::Synthesis => "Chairman synthesizing",
            PipelineStage::Done => "Done",
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl EventObserver for ProgressReporter {
    fn on_event(&self, event: &PipelineEvent) {
        match (event.stage, event.status) {
            (PipelineStage::Done, _) => {
                self.bar.set_position(TRACKED_STAGES);
                self.bar
                    .finish_with_message(format!("{}", "Consultation complete!".green()));
            }
            (stage, StageStatus::Running) => {
                self.bar.set_message(format!("{}...", Self::stage_message(stage)));
            }
            (stage, StageStatus::Complete) => {
                self.bar.inc(1);
                self.bar
                    .set_message(format!("{} {}", "v".green(), Self::stage_message(stage)));
            }
        }
    }

    fn println(&self, line: &str) {
        self.bar.println(line);
    }

    fn finish(&self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}

/// Plain output, no progress display
pub struct SimpleProgress;

impl EventObserver for SimpleProgress {
    fn on_event(&self, _event: &PipelineEvent) {}

    fn println(&self, line: &str) {
        println!("{}", line);
    }

    fn finish(&self) {}
}
