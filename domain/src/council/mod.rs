//! Council deliberation entities.
//!
//! Three members reason independently (divergence), a reviewer ranks their
//! anonymized answers (convergence) and a chairman merges the result
//! (synthesis). Every stage has a deterministic fallback so a consultation
//! always ends with a complete set of results.

pub mod alias;
pub mod identity;
pub mod judgment;
pub mod parsing;
pub mod ranking;
pub mod synthesis;

pub use alias::{AliasLabel, AliasMap};
pub use identity::{CouncilBindings, CouncilRole, EngineBinding, MemberIdentity};
pub use judgment::{
    FALLBACK_NEXT_STEP, MemberJudgment, MemberJudgments, RAW_REPLY_CHARS, ResultOrigin,
};
pub use parsing::{
    ParsedRanking, ParsedSynthesis, ResponseParseError, extract_json_object, parse_member_judgment,
    parse_ranking, parse_synthesis,
};
pub use ranking::{FALLBACK_RANKING_RATIONALE, RankingResult};
pub use synthesis::SynthesisResult;
