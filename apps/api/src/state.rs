use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::chat::memory::ConversationStore;
use crate::config::Config;
use crate::knowledge::CompanyKnowledge;
use crate::llm_client::ChatModel;
use crate::resume::report::HrContact;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Per-session chat history. Default: Redis.
    pub conversations: Arc<dyn ConversationStore>,
    pub s3: S3Client,
    /// Default: `LlmClient` against the Anthropic Messages API.
    pub model: Arc<dyn ChatModel>,
    /// Static company profile unless `KNOWLEDGE_SEARCH_URL` is set.
    pub knowledge: Arc<dyn CompanyKnowledge>,
    pub config: Config,
}

impl AppState {
    pub fn hr_contact(&self) -> HrContact<'_> {
        HrContact {
            email: &self.config.hr_contact_email,
            phone: &self.config.hr_contact_phone,
        }
    }
}

#[cfg(test)]
impl AppState {
    /// State backed by in-memory collaborators and a pool that fails on first use.
    pub fn for_tests(model: Arc<dyn ChatModel>) -> Self {
        use aws_sdk_s3::config::{BehaviorVersion, Region};

        use crate::chat::memory::testing::InMemoryConversationStore;
        use crate::knowledge::StaticKnowledgeBase;

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .build();

        AppState {
            db: crate::db::lazy_test_pool(),
            conversations: Arc::new(InMemoryConversationStore::default()),
            s3: S3Client::from_conf(s3_config),
            model,
            knowledge: Arc::new(StaticKnowledgeBase::with_company_profile()),
            config: Config::for_tests(),
        }
    }
}
