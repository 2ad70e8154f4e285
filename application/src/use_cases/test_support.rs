//! Hand-written test doubles shared by the use case tests

use crate::ports::AdapterError;
use crate::ports::audit_logger::{AuditEvent, AuditLogger};
use crate::ports::feedback_sink::{FeedbackError, FeedbackSink};
use crate::ports::llm_gateway::{GatewayError, LlmGateway, LlmSession};
use crate::ports::retrieval_engine::RetrievalEngine;
use crate::ports::symptom_classifier::SymptomClassifier;
use async_trait::async_trait;
use council_domain::{
    ClassificationResult, EngineBinding, FeedbackSubmission, Model, PromptTemplate, RetrievalHit,
    SeverityLevel,
};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ==================== Reply Scripts ====================

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Text(String),
    Fail,
    Delayed(Duration, String),
}

impl Reply {
    pub(crate) fn text(s: impl Into<String>) -> Self {
        Reply::Text(s.into())
    }

    pub(crate) fn delayed(delay: Duration, s: impl Into<String>) -> Self {
        Reply::Delayed(delay, s.into())
    }
}

pub(crate) fn member_reply(differentials: &[&str], confidence: f64, red_flag: bool) -> String {
    json!({
        "differentials": differentials,
        "next_steps": ["Primary care follow-up"],
        "confidence": confidence,
        "red_flag": red_flag,
    })
    .to_string()
}

pub(crate) fn chairman_reply(red_flag: bool, summary: &str) -> String {
    json!({
        "final_differentials": ["Tension headache"],
        "recommended_next_steps": ["Hydration", "Primary care follow-up"],
        "confidence": 0.7,
        "red_flag": red_flag,
        "summary": summary,
    })
    .to_string()
}

// ==================== Gateway ====================

type Recorded = Arc<Mutex<Vec<(String, String)>>>;

/// Gateway that answers per role (detected from the system prompt) and,
/// for members, per model.
pub(crate) struct ScriptedGateway {
    members: HashMap<String, Reply>,
    reviewer: Reply,
    chairman: Reply,
    recorded: Recorded,
    calls: Arc<AtomicUsize>,
}

impl ScriptedGateway {
    pub(crate) fn new() -> Self {
        Self {
            members: HashMap::new(),
            reviewer: Reply::text(r#"{"ranking": ["A", "B", "C"], "reasoning": "A is most complete"}"#),
            chairman: Reply::text(chairman_reply(false, "Most likely a tension-type headache.")),
            recorded: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(crate) fn member(mut self, model: Model, reply: Reply) -> Self {
        self.members.insert(model.to_string(), reply);
        self
    }

    pub(crate) fn reviewer(mut self, reply: Reply) -> Self {
        self.reviewer = reply;
        self
    }

    pub(crate) fn chairman(mut self, reply: Reply) -> Self {
        self.chairman = reply;
        self
    }

    /// `(role, prompt)` for every message sent
    pub(crate) fn recorded(&self) -> Recorded {
        Arc::clone(&self.recorded)
    }

    pub(crate) fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl LlmGateway for ScriptedGateway {
    async fn create_session_with_system_prompt(
        &self,
        binding: &EngineBinding,
        system_prompt: &str,
    ) -> Result<Box<dyn LlmSession>, GatewayError> {
        let (role, reply) = if system_prompt == PromptTemplate::member_system() {
            let reply = self
                .members
                .get(binding.model.as_str())
                .cloned()
                .unwrap_or_else(|| Reply::text(member_reply(&["Tension headache"], 0.6, false)));
            (format!("member:{}", binding.model), reply)
        } else if system_prompt == PromptTemplate::review_system() {
            ("reviewer".to_string(), self.reviewer.clone())
        } else if system_prompt == PromptTemplate::chairman_system() {
            ("chairman".to_string(), self.chairman.clone())
        } else {
            return Err(GatewayError::Other(format!("unexpected system prompt: {}", system_prompt)));
        };

        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            model: binding.model.clone(),
            role,
            reply,
            recorded: Arc::clone(&self.recorded),
        }))
    }
}

struct ScriptedSession {
    model: Model,
    role: String,
    reply: Reply,
    recorded: Recorded,
}

#[async_trait]
impl LlmSession for ScriptedSession {
    fn model(&self) -> &Model {
        &self.model
    }

    async fn send(&self, content: &str) -> Result<String, GatewayError> {
        self.recorded
            .lock()
            .unwrap()
            .push((self.role.clone(), content.to_string()));
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Fail => Err(GatewayError::RequestFailed("scripted failure".to_string())),
            Reply::Delayed(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
        }
    }
}

// ==================== Pre-stage Adapters ====================

pub(crate) struct FixedClassifier {
    pub(crate) delay: Duration,
    pub(crate) fail: bool,
}

impl FixedClassifier {
    pub(crate) fn ok() -> Self {
        Self {
            delay: Duration::ZERO,
            fail: false,
        }
    }
}

#[async_trait]
impl SymptomClassifier for FixedClassifier {
    async fn classify(&self, _symptom_text: &str) -> Result<ClassificationResult, AdapterError> {
        tokio::time::sleep(self.delay).await;
        if self.fail {
            return Err(AdapterError::Failed("classifier crashed".to_string()));
        }
        Ok(ClassificationResult::new("non_cardiac", "Non-Cardiac", SeverityLevel::Low, 0.82))
    }
}

pub(crate) struct FixedRetrieval {
    pub(crate) delay: Duration,
}

#[async_trait]
impl RetrievalEngine for FixedRetrieval {
    async fn retrieve(&self, _symptom_text: &str, _k: usize) -> Result<Vec<RetrievalHit>, AdapterError> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![
            RetrievalHit::new("Tension headache", "Band-like bilateral pain.", 0.7, "kb"),
            RetrievalHit::new("Migraine", "Unilateral throbbing pain.", 0.9, "kb"),
            RetrievalHit::new("Sinusitis", "Facial pressure.", 0.2, "kb"),
            RetrievalHit::new("Cluster headache", "Orbital pain.", 0.1, "kb"),
        ])
    }
}

// ==================== Audit & Feedback ====================

#[derive(Default)]
pub(crate) struct RecordingAuditLogger {
    events: Mutex<Vec<(&'static str, Value)>>,
}

impl RecordingAuditLogger {
    pub(crate) fn event_types(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().iter().map(|(t, _)| *t).collect()
    }

    pub(crate) fn payloads(&self, event_type: &str) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(t, _)| *t == event_type)
            .map(|(_, p)| p.clone())
            .collect()
    }
}

impl AuditLogger for RecordingAuditLogger {
    fn log(&self, event: AuditEvent) {
        self.events
            .lock()
            .unwrap()
            .push((event.event_type, event.payload));
    }
}

#[derive(Default)]
pub(crate) struct RecordingFeedbackSink {
    pub(crate) submissions: Mutex<Vec<FeedbackSubmission>>,
    pub(crate) fail: bool,
}

#[async_trait]
impl FeedbackSink for RecordingFeedbackSink {
    async fn submit(&self, submission: &FeedbackSubmission) -> Result<(), FeedbackError> {
        if self.fail {
            return Err(FeedbackError::Rejected {
                status: 503,
                message: "unavailable".to_string(),
            });
        }
        self.submissions.lock().unwrap().push(submission.clone());
        Ok(())
    }
}
