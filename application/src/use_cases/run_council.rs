//! Council stage engine
//!
//! Runs the three council stages against the configured reasoning engines.
//! Every engine call has its own timeout; a failed, late or malformed reply
//! is replaced by a deterministic fallback, so no stage ever fails outright.

use crate::config::CouncilConfig;
use crate::ports::audit_logger::{AuditEvent, AuditLogger};
use crate::ports::llm_gateway::{GatewayError, LlmGateway};
use council_domain::{
    AliasLabel, AliasMap, ConvergenceReport, CouncilRole, EngineBinding, MemberIdentity,
    MemberJudgment, MemberJudgments, PipelineStage, PromptTemplate, RankingResult,
    ResponseParseError, SynthesisResult, parse_member_judgment, parse_ranking, parse_synthesis,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Why a single engine call produced no usable result
#[derive(Error, Debug)]
pub enum EngineCallError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("engine error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("malformed reply: {source}")]
    Malformed {
        source: ResponseParseError,
        reply: String,
    },
}

impl EngineCallError {
    fn malformed(reply: &str) -> impl FnOnce(ResponseParseError) -> Self + '_ {
        move |source| EngineCallError::Malformed {
            source,
            reply: reply.to_string(),
        }
    }

    /// The engine's reply, when one arrived but could not be used
    pub fn raw_reply(&self) -> Option<&str> {
        match self {
            EngineCallError::Malformed { reply, .. } => Some(reply),
            _ => None,
        }
    }
}

/// Executes Divergence, Convergence and Synthesis
pub struct CouncilStageEngine<G: LlmGateway + 'static> {
    gateway: Arc<G>,
    config: Arc<CouncilConfig>,
    audit: Arc<dyn AuditLogger>,
}

impl<G: LlmGateway + 'static> CouncilStageEngine<G> {
    pub fn new(gateway: Arc<G>, config: Arc<CouncilConfig>, audit: Arc<dyn AuditLogger>) -> Self {
        Self {
            gateway,
            config,
            audit,
        }
    }

    /// Stage 1: query all three members in parallel.
    ///
    /// Always returns one judgment per identity. Waits for every call to
    /// succeed or fall back before returning.
    pub async fn divergence(&self, case_prompt: &str) -> MemberJudgments {
        info!("Stage 1: Divergence");
        let timeout = self.config.params().member_timeout;
        let mut join_set = JoinSet::new();

        for id in MemberIdentity::ALL {
            let gateway = Arc::clone(&self.gateway);
            let binding = self.config.bindings().member(id).clone();
            let prompt = case_prompt.to_string();

            join_set.spawn(async move {
                let result = Self::call_engine(
                    gateway.as_ref(),
                    &binding,
                    PromptTemplate::member_system(),
                    &prompt,
                    timeout,
                )
                .await
                .and_then(|reply| {
                    parse_member_judgment(&reply).map_err(EngineCallError::malformed(&reply))
                });
                (id, result)
            });
        }

        let mut judgments: HashMap<MemberIdentity, MemberJudgment> = HashMap::new();

        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((id, Ok(judgment))) => {
                    info!("Member {} responded successfully", id);
                    judgments.insert(id, judgment);
                }
                Ok((id, Err(e))) => {
                    self.record_degraded(PipelineStage::Divergence, CouncilRole::Member(id), &e);
                    judgments.insert(id, MemberJudgment::fallback(e.to_string(), e.raw_reply()));
                }
                Err(e) => {
                    warn!("Task join error: {}", e);
                }
            }
        }

        MemberJudgments::from_fn(|id| {
            judgments
                .remove(&id)
                .unwrap_or_else(|| MemberJudgment::fallback("member task did not complete", None))
        })
    }

    /// Stage 2: the reviewer ranks anonymized summaries.
    ///
    /// The reviewer sees alias labels only. The result is de-anonymized
    /// before it leaves this method.
    pub async fn convergence(
        &self,
        case_prompt: &str,
        judgments: &MemberJudgments,
        aliases: &AliasMap,
    ) -> ConvergenceReport {
        info!("Stage 2: Convergence");

        let summaries: Vec<(AliasLabel, String)> = aliases
            .entries()
            .into_iter()
            .map(|(label, id)| (label, judgments.get(id).summary_line()))
            .collect();
        let prompt = PromptTemplate::review_prompt(case_prompt, &summaries);

        let result = Self::call_engine(
            self.gateway.as_ref(),
            self.config.bindings().for_role(CouncilRole::Reviewer),
            PromptTemplate::review_system(),
            &prompt,
            self.config.params().reviewer_timeout,
        )
        .await
        .and_then(|reply| {
            parse_ranking(&reply)
                .and_then(|parsed| RankingResult::from_order(parsed.order, parsed.rationale))
                .map_err(EngineCallError::malformed(&reply))
        });

        let ranking = match result {
            Ok(ranking) => {
                debug!("Reviewer ranking: {}", ranking.display_order());
                ranking
            }
            Err(e) => {
                self.record_degraded(PipelineStage::Convergence, CouncilRole::Reviewer, &e);
                RankingResult::fallback(judgments, aliases, e.to_string())
            }
        };

        let ranked_members = ranking.ranked_members(aliases);
        ConvergenceReport {
            ranking,
            ranked_members,
        }
    }

    /// Stage 3: the chairman synthesizes from the top-ranked judgment.
    ///
    /// `red_flag` is the OR of the chairman's flag and every member flag.
    pub async fn synthesis(
        &self,
        case_prompt: &str,
        judgments: &MemberJudgments,
        convergence: &ConvergenceReport,
    ) -> SynthesisResult {
        info!("Stage 3: Synthesis");

        let top = judgments.get(convergence.ranked_members[0]);
        let prompt = PromptTemplate::synthesis_prompt(case_prompt, top, &convergence.ranking);

        let result = Self::call_engine(
            self.gateway.as_ref(),
            self.config.bindings().for_role(CouncilRole::Chairman),
            PromptTemplate::chairman_system(),
            &prompt,
            self.config.params().chairman_timeout,
        )
        .await
        .and_then(|reply| parse_synthesis(&reply).map_err(EngineCallError::malformed(&reply)));

        let synthesis = match result {
            Ok(parsed) => SynthesisResult::from_parsed(parsed),
            Err(e) => {
                self.record_degraded(PipelineStage::Synthesis, CouncilRole::Chairman, &e);
                SynthesisResult::from_top_judgment(top, e.to_string())
            }
        };

        synthesis.with_council_red_flags(judgments)
    }

    /// One engine call under its own timeout budget
    async fn call_engine(
        gateway: &G,
        binding: &EngineBinding,
        system_prompt: &str,
        prompt: &str,
        timeout: Duration,
    ) -> Result<String, EngineCallError> {
        let call = async {
            let session = gateway
                .create_session_with_system_prompt(binding, system_prompt)
                .await?;
            session.send(prompt).await
        };

        match tokio::time::timeout(timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(EngineCallError::Timeout(timeout)),
        }
    }

    fn record_degraded(&self, stage: PipelineStage, role: CouncilRole, cause: &EngineCallError) {
        let model = self.config.bindings().for_role(role).model.to_string();
        warn!(
            stage = %stage,
            role = %role,
            model = %model,
            cause = %cause,
            "Engine call degraded, substituting fallback"
        );
        self.audit.log(AuditEvent::new(
            "engine_degraded",
            json!({
                "stage": stage.as_str(),
                "role": role.to_string(),
                "model": model,
                "cause": cause.to_string(),
            }),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineParams;
    use crate::use_cases::test_support::{
        RecordingAuditLogger, Reply, ScriptedGateway, chairman_reply, member_reply,
    };
    use council_domain::{CouncilBindings, EmergencyGate, FALLBACK_NEXT_STEP, Model, RAW_REPLY_CHARS};

    fn engine(gateway: ScriptedGateway) -> (CouncilStageEngine<ScriptedGateway>, Arc<RecordingAuditLogger>) {
        let audit = Arc::new(RecordingAuditLogger::default());
        let config = CouncilConfig::new(
            CouncilBindings::default(),
            PipelineParams::default(),
            EmergencyGate::default(),
        )
        .unwrap();
        (
            CouncilStageEngine::new(Arc::new(gateway), Arc::new(config), audit.clone()),
            audit,
        )
    }

    fn aliases() -> AliasMap {
        AliasMap::from_labels([AliasLabel::A, AliasLabel::B, AliasLabel::C]).unwrap()
    }

    #[tokio::test]
    async fn test_divergence_all_members_succeed() {
        let gateway = ScriptedGateway::new()
            .member(Model::Llama33Versatile, Reply::text(member_reply(&["Migraine"], 0.8, false)))
            .member(Model::Llama31Instant, Reply::text(member_reply(&["Tension headache"], 0.6, false)))
            .member(Model::Qwen3, Reply::text(member_reply(&["Sinusitis"], 0.4, false)));
        let (engine, audit) = engine(gateway);

        let judgments = engine.divergence("mild headache").await;
        assert_eq!(judgments.member_a.differentials, vec!["Migraine"]);
        assert_eq!(judgments.member_b.differentials, vec!["Tension headache"]);
        assert_eq!(judgments.member_c.differentials, vec!["Sinusitis"]);
        assert_eq!(judgments.fallback_count(), 0);
        assert!(audit.event_types().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_divergence_substitutes_fallbacks() {
        let gateway = ScriptedGateway::new()
            .member(Model::Llama33Versatile, Reply::text("I think it's a migraine"))
            .member(Model::Llama31Instant, Reply::Fail)
            .member(
                Model::Qwen3,
                Reply::delayed(Duration::from_secs(120), member_reply(&["x"], 0.5, false)),
            );
        let (engine, audit) = engine(gateway);

        let judgments = engine.divergence("mild headache").await;
        assert_eq!(judgments.fallback_count(), 3);
        for (_, judgment) in judgments.iter() {
            assert!(judgment.differentials.is_empty());
            assert_eq!(judgment.next_steps, vec![FALLBACK_NEXT_STEP]);
            assert_eq!(judgment.confidence, 0.0);
            assert!(!judgment.red_flag);
        }
        assert_eq!(audit.event_types(), vec!["engine_degraded"; 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_records_the_failure() {
        let prose = format!("I think it's a migraine, probably. {}", "Rest well. ".repeat(60));
        let gateway = ScriptedGateway::new()
            .member(Model::Llama33Versatile, Reply::text(prose.clone()))
            .member(Model::Llama31Instant, Reply::Fail)
            .member(
                Model::Qwen3,
                Reply::delayed(Duration::from_secs(120), member_reply(&["x"], 0.5, false)),
            );
        let (engine, _) = engine(gateway);

        let judgments = engine.divergence("mild headache").await;

        let raw = judgments.member_a.raw_text.as_deref().unwrap();
        assert!(raw.starts_with("I think it's a migraine, probably."));
        assert_eq!(raw.chars().count(), RAW_REPLY_CHARS);
        assert!(prose.starts_with(raw));

        // No reply arrived: the cause is recorded instead
        let failed = judgments.member_b.raw_text.as_deref().unwrap();
        assert!(failed.starts_with("engine error"));
        let late = judgments.member_c.raw_text.as_deref().unwrap();
        assert!(late.starts_with("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_divergence_timeout_is_per_member() {
        // Each member gets the full budget; a slow member doesn't starve the others
        let gateway = ScriptedGateway::new()
            .member(
                Model::Llama33Versatile,
                Reply::delayed(Duration::from_secs(25), member_reply(&["a"], 0.5, false)),
            )
            .member(
                Model::Llama31Instant,
                Reply::delayed(Duration::from_secs(29), member_reply(&["b"], 0.5, false)),
            )
            .member(
                Model::Qwen3,
                Reply::delayed(Duration::from_secs(31), member_reply(&["c"], 0.5, false)),
            );
        let (engine, _) = engine(gateway);

        let judgments = engine.divergence("case").await;
        assert!(!judgments.member_a.is_fallback());
        assert!(!judgments.member_b.is_fallback());
        assert!(judgments.member_c.is_fallback());
    }

    #[tokio::test]
    async fn test_convergence_sees_only_labels() {
        let gateway = ScriptedGateway::new()
            .reviewer(Reply::text(r#"{"ranking": ["C", "A", "B"], "reasoning": "C is best"}"#));
        let recorded = gateway.recorded();
        let (engine, _) = engine(gateway);

        let judgments = MemberJudgments::new(
            MemberJudgment::new(vec!["a".into()], vec![], 0.5, false),
            MemberJudgment::new(vec!["b".into()], vec![], 0.5, false),
            MemberJudgment::new(vec!["c".into()], vec![], 0.5, false),
        );
        let aliases = AliasMap::from_labels([AliasLabel::B, AliasLabel::C, AliasLabel::A]).unwrap();
        let report = engine.convergence("case", &judgments, &aliases).await;

        assert!(!report.ranking.is_fallback());
        assert_eq!(
            report.ranked_members,
            [MemberIdentity::MemberB, MemberIdentity::MemberC, MemberIdentity::MemberA]
        );

        let prompts = recorded.lock().unwrap();
        let (_, review_prompt) = prompts.iter().find(|(role, _)| role == "reviewer").unwrap();
        assert!(review_prompt.contains("  A: Differentials: c"));
        assert!(review_prompt.contains("  B: Differentials: a"));
        for forbidden in ["member_a", "member_b", "member_c", "llama", "qwen"] {
            assert!(!review_prompt.contains(forbidden), "reviewer saw {}", forbidden);
        }
    }

    #[tokio::test]
    async fn test_convergence_rejects_non_permutation() {
        let gateway = ScriptedGateway::new()
            .reviewer(Reply::text(r#"{"ranking": ["A", "A", "B"], "reasoning": "dup"}"#));
        let (engine, audit) = engine(gateway);

        let judgments = MemberJudgments::new(
            MemberJudgment::new(vec![], vec![], 0.1, false),
            MemberJudgment::new(vec![], vec![], 0.9, false),
            MemberJudgment::new(vec![], vec![], 0.5, false),
        );
        let report = engine.convergence("case", &judgments, &aliases()).await;

        assert!(report.ranking.is_fallback());
        assert_eq!(
            report.ranked_members,
            [MemberIdentity::MemberB, MemberIdentity::MemberC, MemberIdentity::MemberA]
        );
        assert_eq!(audit.event_types(), vec!["engine_degraded"]);
    }

    #[tokio::test]
    async fn test_synthesis_ors_member_red_flags() {
        let gateway = ScriptedGateway::new().chairman(Reply::text(chairman_reply(false, "Likely benign.")));
        let (engine, _) = engine(gateway);

        let judgments = MemberJudgments::new(
            MemberJudgment::new(vec!["a".into()], vec![], 0.5, false),
            MemberJudgment::new(vec!["b".into()], vec![], 0.5, false),
            MemberJudgment::new(vec!["c".into()], vec![], 0.5, true),
        );
        let convergence = ConvergenceReport {
            ranking: RankingResult::from_order(vec![AliasLabel::A, AliasLabel::B, AliasLabel::C], "")
                .unwrap(),
            ranked_members: MemberIdentity::ALL,
        };
        let synthesis = engine.synthesis("case", &judgments, &convergence).await;
        assert!(!synthesis.is_fallback());
        assert_eq!(synthesis.summary, "Likely benign.");
        assert!(synthesis.red_flag);
    }

    #[tokio::test]
    async fn test_synthesis_falls_back_to_top_judgment() {
        let gateway = ScriptedGateway::new().chairman(Reply::text(chairman_reply(false, "")));
        let (engine, _) = engine(gateway);

        let judgments = MemberJudgments::new(
            MemberJudgment::new(vec!["a".into()], vec!["step a".into()], 0.3, false),
            MemberJudgment::new(vec!["b".into()], vec!["step b".into()], 0.9, false),
            MemberJudgment::new(vec!["c".into()], vec!["step c".into()], 0.5, false),
        );
        let convergence = ConvergenceReport {
            ranking: RankingResult::from_order(vec![AliasLabel::B, AliasLabel::A, AliasLabel::C], "")
                .unwrap(),
            ranked_members: [
                MemberIdentity::MemberB,
                MemberIdentity::MemberA,
                MemberIdentity::MemberC,
            ],
        };
        let synthesis = engine.synthesis("case", &judgments, &convergence).await;
        assert!(synthesis.is_fallback());
        assert_eq!(synthesis.final_differentials, vec!["b"]);
        assert_eq!(synthesis.recommended_next_steps, vec!["step b"]);
        assert!(!synthesis.summary.is_empty());
    }
}
