pub mod audit_log;
pub mod content_generator;
pub mod line_store;
pub mod llm_service;
pub mod publishing_session;
pub mod topic_store;

pub use audit_log::AuditLog;
pub use content_generator::{ContentGenerator, GenerationRequest};
pub use line_store::{FileLineStore, LineStore, MemoryLineStore};
pub use llm_service::LlmService;
pub use publishing_session::{PublishOutcome, PublishingSession, SessionHandle, SessionState};
pub use topic_store::TopicStore;
