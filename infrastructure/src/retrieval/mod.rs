//! Knowledge retrieval adapters.

mod knowledge_base;

pub use knowledge_base::{KnowledgeBaseError, KnowledgeBaseRetriever, KnowledgeEntry};
