//! Run Consultation use case
//!
//! Orchestrates the full consultation: emergency gate, advisory pre-stage,
//! council stages, and the ordered event stream that reports them.
//!
//! # Event order
//!
//! ```text
//! classification / rag_retrieval   (either order, both before divergence)
//! divergence   running → complete
//! convergence  running → complete
//! synthesis    running → complete
//! done                              (exactly once, always last)
//! ```
//!
//! If the gate triggers, no stream is opened and nothing is sent to any
//! reasoning engine.

use crate::config::CouncilConfig;
use crate::ports::audit_logger::{AuditEvent, AuditLogger, NoAuditLogger};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::retrieval_engine::RetrievalEngine;
use crate::ports::symptom_classifier::SymptomClassifier;
use crate::use_cases::run_council::CouncilStageEngine;
use council_domain::{
    AliasMap, ClassificationResult, ConsultationInput, ConsultationReport, EmergencyVerdict,
    EventPayload, PipelineEvent, PipelineStage, PromptTemplate, RetrievalContext,
    ValidationError,
};
use futures::Stream;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Fatal consultation errors, raised before any stream is opened
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsultationError {
    #[error("Invalid consultation input: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Symptom description is empty")]
    EmptyNarrative,
}

/// Outcome of submitting a consultation
pub enum Submission {
    /// The gate triggered; the council never ran
    Emergency(EmergencyVerdict),
    /// The council is running; events arrive on the stream
    Streaming(EventStream),
}

/// Receiving end of a consultation's ordered event stream.
///
/// Dropping the stream cancels the consultation: outstanding engine calls
/// are abandoned and no further events are produced.
pub struct EventStream {
    receiver: mpsc::Receiver<PipelineEvent>,
    cancellation: CancellationToken,
    finished: bool,
}

impl EventStream {
    fn new(receiver: mpsc::Receiver<PipelineEvent>, cancellation: CancellationToken) -> Self {
        Self {
            receiver,
            cancellation,
            finished: false,
        }
    }

    /// Next event, or `None` once `done` has been delivered or the
    /// consultation was cancelled
    pub async fn recv(&mut self) -> Option<PipelineEvent> {
        if self.finished || self.cancellation.is_cancelled() {
            return None;
        }
        let event = tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => None,
            event = self.receiver.recv() => event,
        };
        match event {
            Some(event) => {
                self.finished = event.is_done();
                Some(event)
            }
            None => {
                self.finished = true;
                None
            }
        }
    }

    /// Stop the consultation. Events already produced are discarded.
    pub fn cancel(&self) {
        self.cancellation.cancel();
    }

    /// Token that cancels this consultation when triggered
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    /// Drain the stream and fold it into a report
    pub async fn collect_report(mut self) -> ConsultationReport {
        let mut report = ConsultationReport::default();
        while let Some(event) = self.recv().await {
            report.apply(&event);
        }
        report
    }

    /// Adapt into a `futures::Stream`
    pub fn into_stream(self) -> impl Stream<Item = PipelineEvent> {
        futures::stream::unfold(self, |mut stream| async move {
            stream.recv().await.map(|event| (event, stream))
        })
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}

/// The receiver went away or the consultation was cancelled
struct StreamClosed;

/// Use case for running a consultation
pub struct ConsultationPipeline<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    classifier: Arc<dyn SymptomClassifier>,
    retriever: Arc<dyn RetrievalEngine>,
    config: Arc<CouncilConfig>,
    audit: Arc<dyn AuditLogger>,
    cancellation_token: Option<CancellationToken>,
}

impl<G: LlmGateway + 'static> ConsultationPipeline<G> {
    pub fn new(
        gateway: Arc<G>,
        classifier: Arc<dyn SymptomClassifier>,
        retriever: Arc<dyn RetrievalEngine>,
        config: Arc<CouncilConfig>,
    ) -> Self {
        Self {
            gateway,
            classifier,
            retriever,
            config,
            audit: Arc::new(NoAuditLogger),
            cancellation_token: None,
        }
    }

    pub fn with_audit_logger(mut self, audit: Arc<dyn AuditLogger>) -> Self {
        self.audit = audit;
        self
    }

    /// Parent token: cancelling it cancels every consultation in flight
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = Some(token);
        self
    }

    /// Evaluate the gate and, if clear, start the council.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn submit(&self, input: ConsultationInput) -> Result<Submission, ConsultationError> {
        let verdict = self
            .config
            .gate()
            .evaluate(input.vitals(), input.narrative());

        self.audit.log(AuditEvent::new(
            "emergency_verdict",
            json!({
                "is_emergency": verdict.is_emergency,
                "triggers": verdict.trigger_codes,
                "narrative_chars": input.narrative().chars().count(),
            }),
        ));

        if verdict.is_emergency {
            warn!("Emergency detected: {}", verdict.reason);
            return Ok(Submission::Emergency(verdict));
        }

        if !input.has_narrative() {
            return Err(ConsultationError::EmptyNarrative);
        }

        let cancellation = match &self.cancellation_token {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let (tx, rx) = mpsc::channel(self.config.params().event_buffer.max(1));

        let run = ConsultationRun {
            engine: CouncilStageEngine::new(
                Arc::clone(&self.gateway),
                Arc::clone(&self.config),
                Arc::clone(&self.audit),
            ),
            classifier: Arc::clone(&self.classifier),
            retriever: Arc::clone(&self.retriever),
            config: Arc::clone(&self.config),
            audit: Arc::clone(&self.audit),
            tx,
        };

        let token = cancellation.clone();
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("Consultation cancelled");
                }
                _ = run.execute(input) => {}
            }
        });

        Ok(Submission::Streaming(EventStream::new(rx, cancellation)))
    }
}

/// State owned by one spawned consultation task
struct ConsultationRun<G: LlmGateway + 'static> {
    engine: CouncilStageEngine<G>,
    classifier: Arc<dyn SymptomClassifier>,
    retriever: Arc<dyn RetrievalEngine>,
    config: Arc<CouncilConfig>,
    audit: Arc<dyn AuditLogger>,
    tx: mpsc::Sender<PipelineEvent>,
}

impl<G: LlmGateway + 'static> ConsultationRun<G> {
    async fn execute(self, input: ConsultationInput) {
        let started = Instant::now();
        debug!(
            "Consultation started, bounded by {:?}",
            self.config.params().worst_case_latency()
        );
        match self.stages(&input).await {
            Ok(report) => {
                info!(
                    "Consultation complete in {}ms ({} degraded results)",
                    started.elapsed().as_millis(),
                    report.degraded_count()
                );
                self.audit.log(AuditEvent::new(
                    "consultation_complete",
                    json!({
                        "elapsed_ms": started.elapsed().as_millis() as u64,
                        "degraded": report.degraded_count(),
                        "red_flag": report.synthesis.as_ref().is_some_and(|s| s.red_flag),
                    }),
                ));
            }
            Err(StreamClosed) => {
                debug!("Event receiver dropped, abandoning consultation");
            }
        }
    }

    async fn stages(&self, input: &ConsultationInput) -> Result<ConsultationReport, StreamClosed> {
        let mut report = ConsultationReport::default();
        let params = self.config.params();

        // Pre-stage: both adapters concurrently, each event sent on completion
        let classify = async {
            let result = self.classify(input.narrative()).await;
            self.emit(PipelineEvent::classification(result.clone())).await?;
            Ok::<_, StreamClosed>(result)
        };
        let retrieve = async {
            let result = self.retrieve(input.narrative()).await;
            self.emit(PipelineEvent::retrieval(result.as_ref().map(RetrievalContext::summary)))
                .await?;
            Ok::<_, StreamClosed>(result)
        };
        let (classification, retrieval) = tokio::try_join!(classify, retrieve)?;
        report.classification = classification.clone();
        report.retrieval = retrieval.as_ref().map(RetrievalContext::summary);

        let case_prompt = PromptTemplate::case_prompt(
            input,
            classification.as_ref(),
            retrieval.as_ref(),
            params.excerpt_chars,
        );

        // Stage 1
        let judgments = self
            .timed(PipelineStage::Divergence, self.engine.divergence(&case_prompt))
            .await?;
        self.emit(PipelineEvent::complete(
            PipelineStage::Divergence,
            EventPayload::Divergence(judgments.clone()),
        ))
        .await?;

        // Stage 2: fresh aliases for this consultation only
        let aliases = AliasMap::assign();
        let convergence = self
            .timed(
                PipelineStage::Convergence,
                self.engine.convergence(&case_prompt, &judgments, &aliases),
            )
            .await?;
        self.emit(PipelineEvent::complete(
            PipelineStage::Convergence,
            EventPayload::Convergence(convergence.clone()),
        ))
        .await?;

        // Stage 3
        let synthesis = self
            .timed(
                PipelineStage::Synthesis,
                self.engine.synthesis(&case_prompt, &judgments, &convergence),
            )
            .await?;
        self.emit(PipelineEvent::complete(
            PipelineStage::Synthesis,
            EventPayload::Synthesis(synthesis.clone()),
        ))
        .await?;

        self.emit(PipelineEvent::done()).await?;

        report.divergence = Some(judgments);
        report.convergence = Some(convergence);
        report.synthesis = Some(synthesis);
        report.completed = true;
        Ok(report)
    }

    /// Emit `running`, await the stage, and record its duration
    async fn timed<T>(
        &self,
        stage: PipelineStage,
        work: impl Future<Output = T>,
    ) -> Result<T, StreamClosed> {
        self.emit(PipelineEvent::running(stage)).await?;
        let started = Instant::now();
        let output = work.await;
        self.audit.log(AuditEvent::new(
            "stage_complete",
            json!({
                "stage": stage.as_str(),
                "elapsed_ms": started.elapsed().as_millis() as u64,
            }),
        ));
        Ok(output)
    }

    async fn emit(&self, event: PipelineEvent) -> Result<(), StreamClosed> {
        self.tx.send(event).await.map_err(|_| StreamClosed)
    }

    async fn classify(&self, narrative: &str) -> Option<ClassificationResult> {
        let timeout = self.config.params().classification_timeout;
        let cause = match tokio::time::timeout(timeout, self.classifier.classify(narrative)).await {
            Ok(Ok(result)) => {
                debug!("Classified as {} ({})", result.category, result.severity);
                return Some(result);
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", timeout),
        };
        self.record_prestage_degraded(PipelineStage::Classification, &cause);
        None
    }

    async fn retrieve(&self, narrative: &str) -> Option<RetrievalContext> {
        let params = self.config.params();
        let timeout = params.retrieval_timeout;
        let cause = match tokio::time::timeout(timeout, self.retriever.retrieve(narrative, params.top_k)).await {
            Ok(Ok(hits)) => {
                let context = RetrievalContext::new(hits, params.top_k);
                debug!("Retrieved {} documents", context.len());
                return Some(context);
            }
            Ok(Err(e)) => e.to_string(),
            Err(_) => format!("timed out after {:?}", timeout),
        };
        self.record_prestage_degraded(PipelineStage::RagRetrieval, &cause);
        None
    }

    fn record_prestage_degraded(&self, stage: PipelineStage, cause: &str) {
        warn!(stage = %stage, cause = %cause, "Pre-stage degraded, omitting result");
        self.audit.log(AuditEvent::new(
            "prestage_degraded",
            json!({ "stage": stage.as_str(), "cause": cause }),
        ));
    }
}
